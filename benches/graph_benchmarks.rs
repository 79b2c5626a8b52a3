use criterion::{black_box, criterion_group, criterion_main, Criterion};

use graph_renderer::backend::TextureFormat;
use graph_renderer::render_graph::{EmptyTextureResource, RenderGraph, RenderNode, ShaderPack};

/// Chain of `len` nodes, each sampling the previous node's target.
/// Every insertion re-runs the full cycle check.
fn build_chain(len: usize) -> RenderGraph {
    let mut graph = RenderGraph::new();
    let vs = graph.add_pipeline(ShaderPack::new("quad.vert"));
    let mut previous = None;

    for i in 0..len {
        let target =
            graph.add_resource(EmptyTextureResource::new(64, 64, TextureFormat::Rgba8Unorm));
        let mut fs = ShaderPack::new("chain.frag");
        if let Some(previous) = previous {
            fs = fs.with_binding(0, 0, previous);
        }
        let fs = graph.add_pipeline(fs);
        graph
            .add_node(
                RenderNode::new(format!("pass_{i}"), vs, fs, |ctx| ctx.draw_screenspace_quad())
                    .with_color_target(target),
            )
            .unwrap();
        previous = Some(target);
    }
    graph
}

/// `width` independent producers feeding one composite node
fn build_fan_in(width: usize) -> RenderGraph {
    let mut graph = RenderGraph::new();
    let vs = graph.add_pipeline(ShaderPack::new("quad.vert"));
    let empty = graph.add_pipeline(ShaderPack::new("produce.frag"));

    let mut targets = Vec::with_capacity(width);
    for i in 0..width {
        let target =
            graph.add_resource(EmptyTextureResource::new(64, 64, TextureFormat::Rgba16Float));
        graph
            .add_node(
                RenderNode::new(format!("producer_{i}"), vs, empty, |_| {})
                    .with_color_target(target),
            )
            .unwrap();
        targets.push(target);
    }

    let composite =
        graph.add_pipeline(ShaderPack::new("composite.frag").with_binding(0, 0, targets));
    graph
        .add_node(RenderNode::new("composite", vs, composite, |ctx| {
            ctx.draw_screenspace_quad()
        }))
        .unwrap();
    graph
}

// ---------------------------------------------------------------------------
// Graph construction
// ---------------------------------------------------------------------------

fn bench_build_chain(c: &mut Criterion) {
    c.bench_function("render_graph_build_32_node_chain", |b| {
        b.iter(|| black_box(build_chain(32)));
    });
}

fn bench_build_fan_in(c: &mut Criterion) {
    c.bench_function("render_graph_build_32_node_fan_in", |b| {
        b.iter(|| black_box(build_fan_in(32)));
    });
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

fn bench_topo_sort(c: &mut Criterion) {
    let chain = build_chain(64);
    c.bench_function("render_graph_topo_sort_64_node_chain", |b| {
        b.iter(|| black_box(chain.get_topo_sorted()));
    });

    let fan_in = build_fan_in(64);
    c.bench_function("render_graph_topo_sort_64_node_fan_in", |b| {
        b.iter(|| black_box(fan_in.get_topo_sorted()));
    });
}

criterion_group!(benches, bench_build_chain, bench_build_fan_in, bench_topo_sort);
criterion_main!(benches);
