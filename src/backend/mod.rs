//! Backend abstraction layer
//!
//! Provides the traits a GPU backend implements to execute a render graph,
//! plus a dummy backend for tests and tools.

pub mod dummy;
pub mod traits;
pub mod types;

#[cfg(feature = "vulkan")]
pub mod vulkan;

pub use traits::*;
pub use types::*;
