//! Common types shared between the graph and backends

use crate::render_graph::{DescriptorBinding, RenderNodeHandle, ResourceHandle};
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};
use std::collections::BTreeSet;

/// Texture format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    R8Unorm,
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    Bgra8UnormSrgb,
    Rgba16Float,
    Rgba32Float,
    R32Float,
    Rg32Float,
    Depth32Float,
    Depth24PlusStencil8,
}

impl TextureFormat {
    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            TextureFormat::Depth32Float | TextureFormat::Depth24PlusStencil8
        )
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::R8Unorm => 1,
            TextureFormat::Rgba8Unorm
            | TextureFormat::Rgba8UnormSrgb
            | TextureFormat::Bgra8Unorm
            | TextureFormat::Bgra8UnormSrgb
            | TextureFormat::Depth32Float
            | TextureFormat::Depth24PlusStencil8
            | TextureFormat::R32Float => 4,
            TextureFormat::Rgba16Float | TextureFormat::Rg32Float => 8,
            TextureFormat::Rgba32Float => 16,
        }
    }
}

/// Cull mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullMode {
    #[default]
    None,
    Front,
    Back,
}

/// Index format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFormat {
    Uint16,
    Uint32,
}

/// Rasterization sample count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SampleCount {
    #[default]
    X1,
    X2,
    X4,
    X8,
}

impl SampleCount {
    pub fn count(&self) -> u32 {
        match self {
            SampleCount::X1 => 1,
            SampleCount::X2 => 2,
            SampleCount::X4 => 4,
            SampleCount::X8 => 8,
        }
    }
}

/// Everything a backend needs to build the graphics pipeline of one render node.
///
/// Formats are resolved from the node's targets, in target order.
#[derive(Debug, Clone, PartialEq)]
pub struct NodePipelineDescriptor {
    pub label: String,
    pub vertex_shader: String,
    pub fragment_shader: String,
    pub color_formats: Vec<TextureFormat>,
    /// `None` disables depth testing and depth writes.
    pub depth_format: Option<TextureFormat>,
    pub cull_mode: CullMode,
    pub samples: SampleCount,
}

/// Per-node recording scope information handed to the backend every frame.
///
/// Carries what a backend needs to open the node's rendering scope: the
/// images to attach, the resources to bind to each descriptor set slot, and
/// the nodes whose writes must be visible before the node's draws run.
#[derive(Debug, Clone, Copy)]
pub struct NodeScope<'a> {
    pub label: &'a str,
    pub color_formats: &'a [TextureFormat],
    pub depth_format: Option<TextureFormat>,
    /// Color attachments, in the same order as `color_formats`
    pub color_targets: &'a [ResourceHandle],
    pub depth_target: Option<ResourceHandle>,
    /// Vertex shader descriptor sets, indexed `[set][slot]`
    pub vertex_bindings: &'a [Vec<DescriptorBinding>],
    /// Fragment shader descriptor sets, indexed `[set][slot]`
    pub fragment_bindings: &'a [Vec<DescriptorBinding>],
    /// Nodes recorded earlier in the frame whose targets this node samples
    pub dependencies: &'a BTreeSet<RenderNodeHandle>,
    pub samples: SampleCount,
    pub extent: (u32, u32),
    /// Frame slot in `0..frames_in_flight`
    pub frame_index: u32,
}

impl NodeScope<'_> {
    /// Every resource bound by either shader stage
    pub fn sampled_resources(&self) -> BTreeSet<ResourceHandle> {
        self.vertex_bindings
            .iter()
            .chain(self.fragment_bindings)
            .flatten()
            .flat_map(|binding| binding.handles().iter().copied())
            .collect()
    }
}

/// Vertex of the fixed screen-covering quad
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ScreenQuadVertex {
    pub position: Vec2,
    pub uv: Vec2,
}

/// Vertex of the fixed skybox cube
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SkyboxVertex {
    pub position: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_formats() {
        assert!(TextureFormat::Depth32Float.is_depth());
        assert!(TextureFormat::Depth24PlusStencil8.is_depth());
        assert!(!TextureFormat::Rgba16Float.is_depth());
    }

    #[test]
    fn test_vertex_sizes() {
        assert_eq!(std::mem::size_of::<ScreenQuadVertex>(), 16);
        assert_eq!(std::mem::size_of::<SkyboxVertex>(), 12);
        assert_eq!(SampleCount::X4.count(), 4);
    }

    #[test]
    fn test_scope_sampled_resources_cover_both_stages() {
        let vertex = vec![vec![DescriptorBinding::Single(ResourceHandle(0))]];
        let fragment = vec![
            vec![
                DescriptorBinding::Empty,
                DescriptorBinding::Array(vec![ResourceHandle(4), ResourceHandle(2)]),
            ],
            vec![DescriptorBinding::Single(ResourceHandle(0))],
        ];
        let dependencies = BTreeSet::from([RenderNodeHandle(1)]);
        let scope = NodeScope {
            label: "scene",
            color_formats: &[TextureFormat::Rgba16Float],
            depth_format: Some(TextureFormat::Depth32Float),
            color_targets: &[ResourceHandle(5)],
            depth_target: Some(ResourceHandle(6)),
            vertex_bindings: &vertex,
            fragment_bindings: &fragment,
            dependencies: &dependencies,
            samples: SampleCount::X4,
            extent: (64, 64),
            frame_index: 0,
        };

        assert_eq!(
            scope.sampled_resources(),
            BTreeSet::from([ResourceHandle(0), ResourceHandle(2), ResourceHandle(4)])
        );
    }
}
