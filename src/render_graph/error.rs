//! Render graph error types

use crate::render_graph::node::RenderNodeHandle;
use crate::render_graph::resource::{ResourceHandle, ResourceKind};
use thiserror::Error;

/// Errors raised while building or querying a render graph
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A node samples a resource it also renders to
    #[error(
        "invalid render node '{node}': cannot use a target as a shader resource ({})",
        list_handles(.resources)
    )]
    TargetUsedAsShaderResource {
        node: String,
        resources: Vec<ResourceHandle>,
    },

    /// The dependency graph contains a cycle; `node` depends on `dependency`
    /// which is still on the traversal stack
    #[error(
        "invalid render graph: illegal cycle in dependency graph ('{node}' depends on '{dependency}')"
    )]
    CyclicDependency { node: String, dependency: String },

    #[error("unknown {kind} {handle}")]
    UnknownResource {
        handle: ResourceHandle,
        kind: ResourceKind,
    },

    #[error("unknown render node {handle}")]
    UnknownNode { handle: RenderNodeHandle },

    #[error("uniform buffer {handle} holds {expected} bytes, got {actual}")]
    UniformSizeMismatch {
        handle: ResourceHandle,
        expected: u64,
        actual: u64,
    },
}

impl GraphError {
    /// Whether the error describes a miswired graph (aliasing or cycle)
    pub fn is_invalid_graph(&self) -> bool {
        matches!(
            self,
            GraphError::TargetUsedAsShaderResource { .. } | GraphError::CyclicDependency { .. }
        )
    }
}

pub type GraphResult<T> = Result<T, GraphError>;

fn list_handles(handles: &[ResourceHandle]) -> String {
    handles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GraphError::TargetUsedAsShaderResource {
            node: "ssao".into(),
            resources: vec![ResourceHandle(3), ResourceHandle(5)],
        };
        assert_eq!(
            err.to_string(),
            "invalid render node 'ssao': cannot use a target as a shader resource (resource #3, resource #5)"
        );
        assert!(err.is_invalid_graph());

        let err = GraphError::UnknownResource {
            handle: ResourceHandle(7),
            kind: ResourceKind::Model,
        };
        assert_eq!(err.to_string(), "unknown model resource #7");
        assert!(!err.is_invalid_graph());
    }
}
