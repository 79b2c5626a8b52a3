//! Render Graph System
//!
//! Render passes declared as nodes of a directed acyclic graph. Dependencies
//! are derived from which node writes a resource and which node samples it;
//! the graph rejects nodes that would alias a target with a shader input or
//! close a cycle, and yields a valid execution order.

pub mod context;
pub mod error;
pub mod executor;
pub mod graph;
pub mod node;
pub mod resource;
pub mod shader;

pub use context::*;
pub use error::*;
pub use executor::*;
pub use graph::*;
pub use node::*;
pub use resource::*;
pub use shader::*;
