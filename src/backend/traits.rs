//! Core backend abstraction traits
//!
//! The render graph never touches API objects directly. A backend implements
//! these traits and the executor drives it in topologically sorted node order.

use crate::backend::types::*;
use crate::render_graph::ResourceHandle;
use std::ops::Range;
use thiserror::Error;

/// Backend error type
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to create pipeline: {0}")]
    PipelineCreationFailed(String),
    #[error("Failed to create buffer: {0}")]
    BufferCreationFailed(String),
    #[error("Failed to record commands: {0}")]
    RecordingFailed(String),
    #[error("Out of memory")]
    OutOfMemory,
    #[error("Device lost")]
    DeviceLost,
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Handle to a GPU buffer owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(u64);

impl BufferHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Draw-level command recording.
///
/// This is the only surface a node body reaches (through
/// [`RenderPassContext`](crate::render_graph::RenderPassContext)), so it stays object safe.
pub trait CommandRecorder {
    /// Bind a vertex buffer to a slot
    fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferHandle, offset: u64);

    /// Bind the index buffer
    fn set_index_buffer(&mut self, buffer: BufferHandle, offset: u64, format: IndexFormat);

    /// Draw primitives
    fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>);

    /// Draw indexed primitives
    fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>);
}

/// Graphics backend driven by [`RenderGraphExecutor`](crate::render_graph::RenderGraphExecutor)
pub trait GraphicsBackend: CommandRecorder {
    /// Backend-specific pipeline object, one per render node
    type Pipeline;

    /// Create the graphics pipeline for a render node
    fn create_node_pipeline(
        &mut self,
        desc: &NodePipelineDescriptor,
    ) -> BackendResult<Self::Pipeline>;

    /// Create a device-local vertex buffer with initial contents
    fn create_vertex_buffer(&mut self, label: &str, data: &[u8]) -> BackendResult<BufferHandle>;

    /// Replace the contents of a uniform buffer resource for the current frame
    fn write_uniform(&mut self, resource: ResourceHandle, data: &[u8]) -> BackendResult<()>;

    /// Open the recording scope of one node.
    ///
    /// Attaches the scope's targets, binds the pipeline and both stages'
    /// descriptor sets. Barriers against the writes of `scope.dependencies`
    /// must be in place once this returns.
    fn begin_node(&mut self, scope: &NodeScope<'_>, pipeline: &Self::Pipeline) -> BackendResult<()>;

    /// Close the recording scope opened by the last `begin_node`
    fn end_node(&mut self) -> BackendResult<()>;
}
