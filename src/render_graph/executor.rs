//! Render graph executor

use crate::backend::traits::*;
use crate::backend::types::*;
use crate::geometry::FixedGeometryBuffers;
use crate::render_graph::context::RenderPassContext;
use crate::render_graph::error::GraphError;
use crate::render_graph::graph::RenderGraph;
use crate::render_graph::node::RenderNodeHandle;
use crate::render_graph::resource::ResourceHandle;
use crate::RendererConfig;
use thiserror::Error;

/// Failure while preparing or recording a frame
#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Per-node state prepared once when the executor is built
struct PreparedNode<P> {
    handle: RenderNodeHandle,
    descriptor: NodePipelineDescriptor,
    pipeline: P,
}

/// Executor for running a finished render graph on a backend.
///
/// Owns the graph: the node order and pipelines are fixed at construction.
/// Rebuild the executor when the pass structure changes.
pub struct RenderGraphExecutor<B: GraphicsBackend> {
    graph: RenderGraph,
    config: RendererConfig,
    nodes: Vec<PreparedNode<B::Pipeline>>,
    fixed: FixedGeometryBuffers,
    frame_count: u64,
}

impl<B: GraphicsBackend> RenderGraphExecutor<B> {
    /// Sort the graph, create one pipeline per node and upload the fixed geometry
    pub fn new(
        graph: RenderGraph,
        config: RendererConfig,
        backend: &mut B,
    ) -> ExecutorResult<Self> {
        let order = graph.get_topo_sorted();

        let mut nodes = Vec::with_capacity(order.len());
        for handle in order {
            let descriptor = graph.pipeline_descriptor(handle, &config)?;
            let pipeline = backend.create_node_pipeline(&descriptor)?;
            nodes.push(PreparedNode {
                handle,
                descriptor,
                pipeline,
            });
        }
        let fixed = FixedGeometryBuffers::upload(backend)?;

        log::info!(
            "Render graph ready: {} nodes [{}]",
            nodes.len(),
            nodes
                .iter()
                .map(|node| node.descriptor.label.as_str())
                .collect::<Vec<_>>()
                .join(" -> ")
        );

        Ok(Self {
            graph,
            config,
            nodes,
            fixed,
            frame_count: 0,
        })
    }

    /// Record one frame.
    ///
    /// Frame-begin actions run first, in enqueue order; then every node is
    /// recorded inside its own backend scope, in dependency order.
    pub fn run_frame(&mut self, backend: &mut B) -> ExecutorResult<()> {
        let actions = self.graph.run_frame_begin_actions();
        if actions > 0 {
            log::debug!("Ran {actions} frame-begin actions");
        }

        let frames_in_flight = u64::from(self.config.frames_in_flight.max(1));
        let frame_index = (self.frame_count % frames_in_flight) as u32;

        for prepared in &self.nodes {
            let node = self.graph.node(prepared.handle);
            let scope = NodeScope {
                label: &prepared.descriptor.label,
                color_formats: &prepared.descriptor.color_formats,
                depth_format: prepared.descriptor.depth_format,
                color_targets: &node.color_targets,
                depth_target: node.depth_target,
                vertex_bindings: &self.graph.pipeline(node.vertex_shader).descriptor_sets,
                fragment_bindings: &self.graph.pipeline(node.fragment_shader).descriptor_sets,
                dependencies: self.graph.dependencies(prepared.handle),
                samples: prepared.descriptor.samples,
                extent: self.config.extent,
                frame_index,
            };

            log::trace!("Recording node '{}'", node.name);
            backend.begin_node(&scope, &prepared.pipeline)?;
            {
                let registry = self.graph.registry();
                let mut ctx = RenderPassContext::new(&mut *backend, registry, &self.fixed);
                node.record(&mut ctx);
            }
            backend.end_node()?;
        }

        self.frame_count += 1;
        Ok(())
    }

    /// Upload this frame's contents of a uniform buffer resource.
    ///
    /// `data` must be exactly as long as the registered buffer.
    pub fn write_uniform(
        &self,
        backend: &mut B,
        handle: ResourceHandle,
        data: &[u8],
    ) -> ExecutorResult<()> {
        let buffer = self.graph.try_uniform_buffer(handle)?;
        if buffer.size != data.len() as u64 {
            return Err(GraphError::UniformSizeMismatch {
                handle,
                expected: buffer.size,
                actual: data.len() as u64,
            }
            .into());
        }
        backend.write_uniform(handle, data)?;
        Ok(())
    }

    /// Typed variant of [`write_uniform`](Self::write_uniform)
    pub fn write_uniform_pod<T: bytemuck::Pod>(
        &self,
        backend: &mut B,
        handle: ResourceHandle,
        value: &T,
    ) -> ExecutorResult<()> {
        self.write_uniform(backend, handle, bytemuck::bytes_of(value))
    }

    /// Node handles in the order they are recorded
    pub fn execution_order(&self) -> Vec<RenderNodeHandle> {
        self.nodes.iter().map(|node| node.handle).collect()
    }

    pub fn graph(&self) -> &RenderGraph {
        &self.graph
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Change the viewport extent passed to node scopes, e.g. after a resize
    pub fn set_extent(&mut self, width: u32, height: u32) {
        self.config.extent = (width, height);
    }

    /// Give the graph back, e.g. to extend it and build a new executor
    pub fn into_graph(self) -> RenderGraph {
        self.graph
    }
}
