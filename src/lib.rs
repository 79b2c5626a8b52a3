//! Graph Renderer - the render graph core of a deferred 3D renderer
//!
//! Render passes are declared as nodes that write color/depth targets and
//! sample resources through their shaders' descriptor sets. The graph derives
//! the execution order from those reads and writes, and rejects wiring that
//! would make the frame ill-defined.
//!
//! # Features
//! - Typed resource registry (uniform buffers, external and transient textures,
//!   models, shader packs)
//! - Dependency derivation with target/shader-input aliasing and cycle checks
//! - Topological ordering and a frame-begin action queue
//! - Backend-agnostic executor, with a dummy backend and optional Vulkan recording via ash
//!
//! ```
//! use graph_renderer::render_graph::*;
//! use graph_renderer::backend::TextureFormat;
//!
//! let mut graph = RenderGraph::new();
//! let color = graph.add_resource(EmptyTextureResource::new(256, 256, TextureFormat::Rgba8Unorm));
//! let vs = graph.add_pipeline(ShaderPack::new("quad.vert"));
//! let write = graph.add_pipeline(ShaderPack::new("write.frag"));
//! let read = graph.add_pipeline(ShaderPack::new("read.frag").with_binding(0, 0, color));
//!
//! let producer = graph
//!     .add_node(
//!         RenderNode::new("producer", vs, write, |ctx| ctx.draw_screenspace_quad())
//!             .with_color_target(color),
//!     )
//!     .unwrap();
//! let consumer = graph
//!     .add_node(RenderNode::new("consumer", vs, read, |ctx| ctx.draw_screenspace_quad()))
//!     .unwrap();
//! assert_eq!(graph.get_topo_sorted(), vec![producer, consumer]);
//! ```

pub mod backend;
pub mod geometry;
pub mod render_graph;
pub mod scene;

pub use backend::dummy::DummyBackend;
pub use render_graph::{
    GraphError, GraphResult, RenderGraph, RenderGraphExecutor, RenderNode, RenderNodeHandle,
    ResourceHandle,
};

use backend::types::SampleCount;

/// Configuration for executing a render graph
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Sample count for nodes that enable MSAA; other nodes use one sample
    pub msaa_samples: SampleCount,
    /// Number of frames recorded ahead of the GPU
    pub frames_in_flight: u32,
    /// Viewport size passed to every node scope
    pub extent: (u32, u32),
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            msaa_samples: SampleCount::X4,
            frames_in_flight: 3,
            extent: (1280, 720),
        }
    }
}
