//! Deferred frame demo
//!
//! Builds the prepass -> SSAO -> scene -> debug quad graph, runs it against the
//! dummy backend and prints the execution order and recorded commands.
//!
//! ```bash
//! cargo run --example deferred_frame -- --frames 3 --msaa 8
//! RUST_LOG=trace cargo run --example deferred_frame -- --show-rejections
//! ```

use clap::{Parser, ValueEnum};
use glam::Vec3;

use graph_renderer::backend::dummy::{BackendCommand, DummyBackend};
use graph_renderer::backend::{BufferHandle, CullMode, SampleCount, TextureFormat};
use graph_renderer::render_graph::*;
use graph_renderer::scene::{Camera, DirectionalLight, FrameUniforms};
use graph_renderer::RendererConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CliSamples {
    #[value(name = "1")]
    X1,
    #[value(name = "2")]
    X2,
    #[value(name = "4")]
    X4,
    #[value(name = "8")]
    X8,
}

impl From<CliSamples> for SampleCount {
    fn from(samples: CliSamples) -> Self {
        match samples {
            CliSamples::X1 => SampleCount::X1,
            CliSamples::X2 => SampleCount::X2,
            CliSamples::X4 => SampleCount::X4,
            CliSamples::X8 => SampleCount::X8,
        }
    }
}

/// Render graph demo on the dummy backend.
#[derive(Parser, Debug)]
#[command(name = "deferred_frame", version)]
struct Args {
    /// Render target width in pixels.
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Render target height in pixels.
    #[arg(long, default_value = "720")]
    height: u32,

    /// Number of frames to record.
    #[arg(long, default_value = "1")]
    frames: u32,

    /// MSAA sample count for the scene pass.
    #[arg(long, default_value = "4", value_enum)]
    msaa: CliSamples,

    /// Disable ambient occlusion in the scene pass.
    #[arg(long)]
    no_ssao: bool,

    /// Also try to add miswired nodes and print why they are rejected.
    #[arg(long)]
    show_rejections: bool,
}

struct Frame {
    graph: RenderGraph,
    uniforms: ResourceHandle,
    scene_color: ResourceHandle,
    ssao: ResourceHandle,
}

fn build_graph(width: u32, height: u32) -> GraphResult<Frame> {
    let mut graph = RenderGraph::new();

    let uniforms = graph.add_resource(UniformBufferResource::for_type::<FrameUniforms>());
    let model = graph.add_resource(ModelResource {
        name: "sponza".into(),
        vertex_buffer: BufferHandle::new(1),
        instance_buffer: BufferHandle::new(2),
        index_buffer: BufferHandle::new(3),
        meshes: vec![
            MeshRange {
                index_count: 3_000,
                vertex_count: 1_200,
                instance_count: 1,
            },
            MeshRange {
                index_count: 600,
                vertex_count: 240,
                instance_count: 4,
            },
        ],
    });
    let skybox = graph.add_resource(
        ExternalTextureResource::new("textures/sky.hdr", TextureFormat::Rgba32Float)
            .with_flags(TextureFlags::CUBEMAP | TextureFlags::HDR),
    );
    let materials = graph.add_resource(
        ExternalTextureResource::new(
            "textures/sponza_albedo.png",
            TextureFormat::Rgba8UnormSrgb,
        )
        .with_flags(TextureFlags::MIPMAPS),
    );

    let mut transient =
        |format| graph.add_resource(EmptyTextureResource::new(width, height, format));
    let depth = transient(TextureFormat::Depth32Float);
    let normals = transient(TextureFormat::Rgba16Float);
    let ssao = transient(TextureFormat::R32Float);
    let scene_color = transient(TextureFormat::Rgba16Float);
    let scene_depth = transient(TextureFormat::Depth32Float);
    let debug_color = transient(TextureFormat::Bgra8UnormSrgb);

    let model_vs =
        graph.add_pipeline(ShaderPack::new("shaders/model.vert").with_binding(0, 0, uniforms));
    let quad_vs = graph.add_pipeline(ShaderPack::new("shaders/quad.vert"));
    let prepass_fs = graph.add_pipeline(ShaderPack::new("shaders/prepass.frag"));
    let ssao_fs = graph.add_pipeline(
        ShaderPack::new("shaders/ssao.frag")
            .with_binding(0, 0, uniforms)
            .with_binding(1, 0, depth)
            .with_binding(1, 1, normals),
    );
    let scene_fs = graph.add_pipeline(
        ShaderPack::new("shaders/scene.frag")
            .with_binding(0, 0, uniforms)
            .with_binding(1, 0, vec![materials])
            .with_binding(2, 0, skybox)
            .with_binding(2, 1, ssao),
    );
    let debug_fs =
        graph.add_pipeline(ShaderPack::new("shaders/debug_quad.frag").with_binding(0, 0, ssao));

    // Added out of order on purpose; the graph sorts it out
    graph.add_node(
        RenderNode::new("debug quad", quad_vs, debug_fs, |ctx| {
            ctx.draw_screenspace_quad()
        })
        .with_color_target(debug_color),
    )?;
    graph.add_node(
        RenderNode::new("scene", model_vs, scene_fs, move |ctx| {
            ctx.draw_skybox();
            ctx.draw_model(model);
        })
        .with_color_target(scene_color)
        .with_depth_target(scene_depth)
        .with_cull_mode(CullMode::Back)
        .with_msaa(true),
    )?;
    graph.add_node(
        RenderNode::new("ssao", quad_vs, ssao_fs, |ctx| ctx.draw_screenspace_quad())
            .with_color_target(ssao),
    )?;
    graph.add_node(
        RenderNode::new("prepass", model_vs, prepass_fs, move |ctx| ctx.draw_model(model))
            .with_color_target(normals)
            .with_depth_target(depth)
            .with_cull_mode(CullMode::Back),
    )?;

    Ok(Frame {
        graph,
        uniforms,
        scene_color,
        ssao,
    })
}

fn show_rejections(frame: &mut Frame) {
    let graph = &mut frame.graph;
    let vs = graph.add_pipeline(ShaderPack::new("shaders/quad.vert"));

    let feedback_fs =
        graph.add_pipeline(ShaderPack::new("shaders/blur.frag").with_binding(0, 0, frame.ssao));
    let feedback = RenderNode::new("in-place blur", vs, feedback_fs, |ctx| {
        ctx.draw_screenspace_quad()
    })
    .with_color_target(frame.ssao);
    if let Err(err) = graph.add_node(feedback) {
        println!("rejected: {err}");
    }

    // Reads the scene output and writes the occlusion buffer the scene reads
    let cycle_fs = graph.add_pipeline(
        ShaderPack::new("shaders/reproject.frag").with_binding(0, 0, frame.scene_color),
    );
    let cycle = RenderNode::new("temporal ao", vs, cycle_fs, |ctx| ctx.draw_screenspace_quad())
        .with_color_target(frame.ssao);
    if let Err(err) = graph.add_node(cycle) {
        println!("rejected: {err}");
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut frame = build_graph(args.width, args.height)?;
    if args.show_rejections {
        show_rejections(&mut frame);
    }
    let uniforms = frame.uniforms;

    let config = RendererConfig {
        msaa_samples: args.msaa.into(),
        extent: (args.width, args.height),
        ..Default::default()
    };
    let mut backend = DummyBackend::new();
    let mut executor = RenderGraphExecutor::new(frame.graph, config, &mut backend)?;

    let order: Vec<_> = executor
        .execution_order()
        .into_iter()
        .map(|handle| executor.graph().node(handle).name.clone())
        .collect();
    println!("execution order: {}", order.join(" -> "));

    let mut camera = Camera::new(Vec3::new(0.0, 1.5, 6.0), Vec3::new(0.0, 1.0, 0.0));
    camera.set_aspect(args.width, args.height);
    let light = DirectionalLight {
        direction: Vec3::new(-0.3, -1.0, -0.2),
        color: Vec3::new(1.0, 0.95, 0.9),
        intensity: 3.0,
    };

    executor
        .graph()
        .add_frame_begin_action(|| log::info!("frame-begin: shader packs reloaded"));

    for _ in 0..args.frames {
        let data = FrameUniforms::new(&camera, &light, (args.width, args.height))
            .with_ssao(!args.no_ssao);
        executor.write_uniform_pod(&mut backend, uniforms, &data)?;
        executor.run_frame(&mut backend)?;
    }

    let draws = backend
        .commands()
        .iter()
        .filter(|cmd| {
            matches!(
                cmd,
                BackendCommand::Draw { .. } | BackendCommand::DrawIndexed { .. }
            )
        })
        .count();
    println!(
        "recorded {} frames: {} node scopes, {} draw calls, {} commands total",
        executor.frame_count(),
        backend.recorded_nodes().len(),
        draws,
        backend.commands().len()
    );
    Ok(())
}
