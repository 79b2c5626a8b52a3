//! Common fixtures for render graph integration tests.
//!
//! Builds the deferred frame used throughout the tests: a depth/normal
//! prepass, screen-space ambient occlusion, the lit scene with a skybox, and a
//! debug quad showing the occlusion buffer.

#![allow(dead_code)]

use std::collections::BTreeSet;

use graph_renderer::backend::{BufferHandle, CullMode, TextureFormat};
use graph_renderer::render_graph::*;
use graph_renderer::scene::FrameUniforms;

// ============================================================================
// Deferred Frame
// ============================================================================

/// Handles of everything registered by [`deferred_frame`]
pub struct DeferredFrame {
    pub graph: RenderGraph,
    pub uniforms: ResourceHandle,
    pub model: ResourceHandle,
    pub skybox: ResourceHandle,
    pub depth: ResourceHandle,
    pub normals: ResourceHandle,
    pub ssao: ResourceHandle,
    pub scene_color: ResourceHandle,
    pub scene_depth: ResourceHandle,
    pub debug_color: ResourceHandle,
    pub nodes: Vec<RenderNodeHandle>,
}

/// Node names of the deferred frame, in insertion order
pub const DEFERRED_NODES: [&str; 4] = ["prepass", "ssao", "scene", "debug quad"];

/// Meshes of the test model: (index count, vertex count, instance count)
pub const MODEL_MESHES: [(u32, u32, u32); 3] = [(36, 24, 1), (6, 4, 2), (120, 60, 1)];

/// Build the deferred frame, adding its nodes in the given order of
/// [`DEFERRED_NODES`] indices
pub fn deferred_frame_in_order(order: [usize; 4]) -> DeferredFrame {
    let mut graph = RenderGraph::new();
    let extent = (320, 180);

    let uniforms = graph.add_resource(UniformBufferResource::for_type::<FrameUniforms>());
    let model = graph.add_resource(ModelResource {
        name: "helmet".into(),
        vertex_buffer: BufferHandle::new(1000),
        instance_buffer: BufferHandle::new(1001),
        index_buffer: BufferHandle::new(1002),
        meshes: MODEL_MESHES
            .iter()
            .map(|&(index_count, vertex_count, instance_count)| MeshRange {
                index_count,
                vertex_count,
                instance_count,
            })
            .collect(),
    });
    let skybox = graph.add_resource(
        ExternalTextureResource::new("textures/sky.hdr", TextureFormat::Rgba32Float)
            .with_flags(TextureFlags::CUBEMAP | TextureFlags::HDR),
    );
    let albedo = graph.add_resource(
        ExternalTextureResource::new("textures/albedo.png", TextureFormat::Rgba8UnormSrgb)
            .with_flags(TextureFlags::MIPMAPS),
    );
    let orm = graph.add_resource(ExternalTextureResource::swizzled(
        ["textures/ao.png", "textures/roughness.png", "textures/metallic.png"],
        TextureFormat::Rgba8Unorm,
    ));

    let transient = |graph: &mut RenderGraph, format| {
        graph.add_resource(EmptyTextureResource::new(extent.0, extent.1, format))
    };
    let depth = transient(&mut graph, TextureFormat::Depth32Float);
    let normals = transient(&mut graph, TextureFormat::Rgba16Float);
    let ssao = transient(&mut graph, TextureFormat::R32Float);
    let scene_color = transient(&mut graph, TextureFormat::Rgba16Float);
    let scene_depth = transient(&mut graph, TextureFormat::Depth32Float);
    let debug_color = transient(&mut graph, TextureFormat::Bgra8UnormSrgb);

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
            .with_binding(1, 0, vec![albedo, orm])
            .with_binding(2, 0, skybox)
            .with_binding(2, 1, ssao),
    );
    let debug_fs =
        graph.add_pipeline(ShaderPack::new("shaders/debug.frag").with_binding(0, 0, ssao));

    let mut pending = vec![
        Some(
            RenderNode::new("prepass", model_vs, prepass_fs, move |ctx| ctx.draw_model(model))
                .with_color_target(normals)
                .with_depth_target(depth)
                .with_cull_mode(CullMode::Back),
        ),
        Some(
            RenderNode::new("ssao", quad_vs, ssao_fs, |ctx| ctx.draw_screenspace_quad())
                .with_color_target(ssao),
        ),
        Some(
            RenderNode::new("scene", model_vs, scene_fs, move |ctx| {
                ctx.draw_skybox();
                ctx.draw_model(model);
            })
            .with_color_target(scene_color)
            .with_depth_target(scene_depth)
            .with_cull_mode(CullMode::Back)
            .with_msaa(true),
        ),
        Some(
            RenderNode::new("debug quad", quad_vs, debug_fs, |ctx| ctx.draw_screenspace_quad())
                .with_color_target(debug_color),
        ),
    ];

    let nodes = order
        .iter()
        .map(|&i| {
            let node = pending[i].take().expect("each node is added once");
            graph.add_node(node).expect("deferred frame is a valid graph")
        })
        .collect();

    DeferredFrame {
        graph,
        uniforms,
        model,
        skybox,
        depth,
        normals,
        ssao,
        scene_color,
        scene_depth,
        debug_color,
        nodes,
    }
}

pub fn deferred_frame() -> DeferredFrame {
    deferred_frame_in_order([0, 1, 2, 3])
}

// ============================================================================
// Helpers
// ============================================================================

/// Empty shader pack plus one sampling `reads`
pub fn shaders(
    graph: &mut RenderGraph,
    reads: &[ResourceHandle],
) -> (ResourceHandle, ResourceHandle) {
    let vs = graph.add_pipeline(ShaderPack::new("shaders/test.vert"));
    let fs = graph.add_pipeline(
        reads
            .iter()
            .enumerate()
            .fold(ShaderPack::new("shaders/test.frag"), |pack, (slot, &r)| {
                pack.with_binding(0, slot, r)
            }),
    );
    (vs, fs)
}

pub fn transient_texture(graph: &mut RenderGraph) -> ResourceHandle {
    graph.add_resource(EmptyTextureResource::new(64, 64, TextureFormat::Rgba8Unorm))
}

/// Node writing `writes` and sampling `reads`
pub fn simple_node(
    graph: &mut RenderGraph,
    name: &str,
    writes: &[ResourceHandle],
    reads: &[ResourceHandle],
) -> RenderNode {
    let (vs, fs) = shaders(graph, reads);
    RenderNode::new(name, vs, fs, |ctx| ctx.draw_screenspace_quad())
        .with_color_targets(writes.iter().copied())
}

/// Assert that `order` lists every node once, each after its dependencies
pub fn assert_topologically_valid(graph: &RenderGraph, order: &[RenderNodeHandle]) {
    let unique: BTreeSet<_> = order.iter().copied().collect();
    assert_eq!(unique.len(), order.len(), "duplicate node in {order:?}");
    assert_eq!(order.len(), graph.node_count(), "missing node in {order:?}");

    for (position, &handle) in order.iter().enumerate() {
        for dep in graph.dependencies(handle) {
            let dep_position = order.iter().position(|h| h == dep).unwrap();
            assert!(
                dep_position < position,
                "'{}' must run before '{}'",
                graph.node(*dep).name,
                graph.node(handle).name
            );
        }
    }
}
