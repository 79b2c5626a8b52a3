//! Render node (pass) definitions for the render graph

use crate::backend::types::CullMode;
use crate::render_graph::context::RenderPassContext;
use crate::render_graph::resource::ResourceHandle;
use std::collections::BTreeSet;
use std::fmt;

/// Unique identifier for a render node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderNodeHandle(pub(crate) u32);

impl RenderNodeHandle {
    pub fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for RenderNodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node #{}", self.0)
    }
}

/// Per-node rasterization settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CustomNodeConfig {
    pub cull_mode: CullMode,
    /// Rasterize with the renderer's MSAA sample count instead of one sample
    pub use_msaa: bool,
}

/// Recording callback of a node, invoked once per frame inside the node's scope.
///
/// `Send + Sync` so an executor may record nodes on worker threads.
pub type NodeBody = Box<dyn Fn(&mut RenderPassContext<'_>) + Send + Sync>;

/// A single pass of the render graph
pub struct RenderNode {
    /// Name for diagnostics
    pub name: String,
    /// Registered vertex [`ShaderPack`](crate::render_graph::ShaderPack)
    pub vertex_shader: ResourceHandle,
    /// Registered fragment [`ShaderPack`](crate::render_graph::ShaderPack)
    pub fragment_shader: ResourceHandle,
    pub color_targets: Vec<ResourceHandle>,
    pub depth_target: Option<ResourceHandle>,
    pub custom_config: CustomNodeConfig,
    body: NodeBody,
}

impl RenderNode {
    pub fn new<F>(
        name: impl Into<String>,
        vertex_shader: ResourceHandle,
        fragment_shader: ResourceHandle,
        body: F,
    ) -> Self
    where
        F: Fn(&mut RenderPassContext<'_>) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            vertex_shader,
            fragment_shader,
            color_targets: Vec::new(),
            depth_target: None,
            custom_config: CustomNodeConfig::default(),
            body: Box::new(body),
        }
    }

    pub fn with_color_target(mut self, target: ResourceHandle) -> Self {
        self.color_targets.push(target);
        self
    }

    pub fn with_color_targets(mut self, targets: impl IntoIterator<Item = ResourceHandle>) -> Self {
        self.color_targets.extend(targets);
        self
    }

    pub fn with_depth_target(mut self, target: ResourceHandle) -> Self {
        self.depth_target = Some(target);
        self
    }

    pub fn with_cull_mode(mut self, cull_mode: CullMode) -> Self {
        self.custom_config.cull_mode = cull_mode;
        self
    }

    pub fn with_msaa(mut self, use_msaa: bool) -> Self {
        self.custom_config.use_msaa = use_msaa;
        self
    }

    /// Color targets and the depth target, deduplicated
    pub fn get_all_targets_set(&self) -> BTreeSet<ResourceHandle> {
        self.color_targets
            .iter()
            .copied()
            .chain(self.depth_target)
            .collect()
    }

    /// Run the node body
    pub fn record(&self, ctx: &mut RenderPassContext<'_>) {
        (self.body)(ctx);
    }
}

impl fmt::Debug for RenderNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderNode")
            .field("name", &self.name)
            .field("vertex_shader", &self.vertex_shader)
            .field("fragment_shader", &self.fragment_shader)
            .field("color_targets", &self.color_targets)
            .field("depth_target", &self.depth_target)
            .field("custom_config", &self.custom_config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &mut RenderPassContext<'_>) {}

    #[test]
    fn test_targets_set_includes_depth() {
        let node = RenderNode::new("prepass", ResourceHandle(0), ResourceHandle(1), noop)
            .with_color_targets([ResourceHandle(5), ResourceHandle(6)])
            .with_depth_target(ResourceHandle(7));

        let targets: Vec<_> = node.get_all_targets_set().into_iter().collect();
        assert_eq!(targets, vec![ResourceHandle(5), ResourceHandle(6), ResourceHandle(7)]);
    }

    #[test]
    fn test_targets_set_dedupes() {
        let node = RenderNode::new("debug", ResourceHandle(0), ResourceHandle(1), noop)
            .with_color_target(ResourceHandle(5))
            .with_color_target(ResourceHandle(5));

        assert_eq!(node.color_targets.len(), 2);
        assert_eq!(node.get_all_targets_set().len(), 1);
    }

    #[test]
    fn test_custom_config() {
        let node = RenderNode::new("scene", ResourceHandle(0), ResourceHandle(1), noop)
            .with_cull_mode(CullMode::Back)
            .with_msaa(true);

        assert_eq!(
            node.custom_config,
            CustomNodeConfig {
                cull_mode: CullMode::Back,
                use_msaa: true
            }
        );
        assert!(format!("{node:?}").contains("scene"));
    }
}
