//! Dummy backend for testing and development.
//!
//! Performs no GPU work. Every call is appended to a command log that tests
//! and tools can inspect.

use crate::backend::traits::*;
use crate::backend::types::*;
use crate::render_graph::{RenderNodeHandle, ResourceHandle};
use std::collections::BTreeSet;
use std::ops::Range;

/// One call made on a [`DummyBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    CreatePipeline {
        label: String,
        samples: SampleCount,
    },
    CreateVertexBuffer {
        label: String,
        buffer: BufferHandle,
        size: usize,
    },
    WriteUniform {
        resource: ResourceHandle,
        size: usize,
    },
    BeginNode {
        label: String,
        frame_index: u32,
        color_targets: Vec<ResourceHandle>,
        depth_target: Option<ResourceHandle>,
        /// Resources bound by either shader stage
        sampled: BTreeSet<ResourceHandle>,
        dependencies: Vec<RenderNodeHandle>,
    },
    EndNode,
    SetVertexBuffer {
        slot: u32,
        buffer: BufferHandle,
    },
    SetIndexBuffer {
        buffer: BufferHandle,
        format: IndexFormat,
    },
    Draw {
        vertices: Range<u32>,
        instances: Range<u32>,
    },
    DrawIndexed {
        indices: Range<u32>,
        base_vertex: i32,
        instances: Range<u32>,
    },
}

/// Dummy GPU backend
#[derive(Debug, Default)]
pub struct DummyBackend {
    commands: Vec<BackendCommand>,
    next_buffer: u64,
    open_node: Option<String>,
    failing_pipeline: Option<String>,
}

impl DummyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make pipeline creation fail for the node labelled `label`
    pub fn with_failing_pipeline(mut self, label: impl Into<String>) -> Self {
        self.failing_pipeline = Some(label.into());
        self
    }

    pub fn name(&self) -> &'static str {
        "Dummy Backend"
    }

    /// Every call recorded so far, oldest first
    pub fn commands(&self) -> &[BackendCommand] {
        &self.commands
    }

    /// Take the recorded calls, leaving the log empty
    pub fn take_commands(&mut self) -> Vec<BackendCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Labels of the node scopes opened so far, in order
    pub fn recorded_nodes(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                BackendCommand::BeginNode { label, .. } => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl CommandRecorder for DummyBackend {
    fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferHandle, _offset: u64) {
        self.commands
            .push(BackendCommand::SetVertexBuffer { slot, buffer });
    }

    fn set_index_buffer(&mut self, buffer: BufferHandle, _offset: u64, format: IndexFormat) {
        self.commands
            .push(BackendCommand::SetIndexBuffer { buffer, format });
    }

    fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>) {
        self.commands.push(BackendCommand::Draw {
            vertices,
            instances,
        });
    }

    fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>) {
        self.commands.push(BackendCommand::DrawIndexed {
            indices,
            base_vertex,
            instances,
        });
    }
}

impl GraphicsBackend for DummyBackend {
    type Pipeline = NodePipelineDescriptor;

    fn create_node_pipeline(
        &mut self,
        desc: &NodePipelineDescriptor,
    ) -> BackendResult<Self::Pipeline> {
        if self.failing_pipeline.as_deref() == Some(desc.label.as_str()) {
            return Err(BackendError::PipelineCreationFailed(format!(
                "{} (injected failure)",
                desc.label
            )));
        }
        log::trace!(
            "DummyBackend: creating pipeline {:?} ({} color targets, depth: {:?})",
            desc.label,
            desc.color_formats.len(),
            desc.depth_format
        );
        self.commands.push(BackendCommand::CreatePipeline {
            label: desc.label.clone(),
            samples: desc.samples,
        });
        Ok(desc.clone())
    }

    fn create_vertex_buffer(&mut self, label: &str, data: &[u8]) -> BackendResult<BufferHandle> {
        let buffer = BufferHandle::new(self.next_buffer);
        self.next_buffer += 1;
        log::trace!(
            "DummyBackend: creating vertex buffer {:?} (size: {})",
            label,
            data.len()
        );
        self.commands.push(BackendCommand::CreateVertexBuffer {
            label: label.to_string(),
            buffer,
            size: data.len(),
        });
        Ok(buffer)
    }

    fn write_uniform(&mut self, resource: ResourceHandle, data: &[u8]) -> BackendResult<()> {
        self.commands.push(BackendCommand::WriteUniform {
            resource,
            size: data.len(),
        });
        Ok(())
    }

    fn begin_node(
        &mut self,
        scope: &NodeScope<'_>,
        _pipeline: &Self::Pipeline,
    ) -> BackendResult<()> {
        if let Some(open) = &self.open_node {
            return Err(BackendError::RecordingFailed(format!(
                "node '{}' begun while '{}' is still open",
                scope.label, open
            )));
        }
        self.open_node = Some(scope.label.to_string());
        self.commands.push(BackendCommand::BeginNode {
            label: scope.label.to_string(),
            frame_index: scope.frame_index,
            color_targets: scope.color_targets.to_vec(),
            depth_target: scope.depth_target,
            sampled: scope.sampled_resources(),
            dependencies: scope.dependencies.iter().copied().collect(),
        });
        Ok(())
    }

    fn end_node(&mut self) -> BackendResult<()> {
        if self.open_node.take().is_none() {
            return Err(BackendError::RecordingFailed(
                "end_node without an open node".into(),
            ));
        }
        self.commands.push(BackendCommand::EndNode);
        Ok(())
    }
}
