//! Shader stage descriptions and their descriptor bindings

use crate::render_graph::resource::ResourceHandle;
use std::collections::BTreeSet;

/// Contents of one descriptor set slot
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DescriptorBinding {
    /// Unused slot
    #[default]
    Empty,
    Single(ResourceHandle),
    /// Descriptor array, e.g. a material texture table
    Array(Vec<ResourceHandle>),
}

impl DescriptorBinding {
    /// Every resource referenced by this slot.
    ///
    /// This is the single place where slot contents are turned into handles.
    pub fn handles(&self) -> &[ResourceHandle] {
        match self {
            DescriptorBinding::Empty => &[],
            DescriptorBinding::Single(handle) => std::slice::from_ref(handle),
            DescriptorBinding::Array(handles) => handles,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.handles().is_empty()
    }
}

impl From<ResourceHandle> for DescriptorBinding {
    fn from(handle: ResourceHandle) -> Self {
        DescriptorBinding::Single(handle)
    }
}

impl From<Vec<ResourceHandle>> for DescriptorBinding {
    fn from(handles: Vec<ResourceHandle>) -> Self {
        DescriptorBinding::Array(handles)
    }
}

/// One shader stage and the resources bound to it, per descriptor set and slot.
///
/// Registered through [`RenderGraph::add_pipeline`](crate::RenderGraph::add_pipeline).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPack {
    /// Opaque shader path, handed to the backend untouched
    pub path: String,
    pub descriptor_sets: Vec<Vec<DescriptorBinding>>,
}

impl ShaderPack {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            descriptor_sets: Vec::new(),
        }
    }

    /// Bind `binding` at `(set, slot)`, padding skipped sets and slots with empty bindings
    pub fn with_binding(
        mut self,
        set: usize,
        slot: usize,
        binding: impl Into<DescriptorBinding>,
    ) -> Self {
        if self.descriptor_sets.len() <= set {
            self.descriptor_sets.resize_with(set + 1, Vec::new);
        }
        let bindings = &mut self.descriptor_sets[set];
        if bindings.len() <= slot {
            bindings.resize_with(slot + 1, DescriptorBinding::default);
        }
        bindings[slot] = binding.into();
        self
    }

    pub fn binding(&self, set: usize, slot: usize) -> Option<&DescriptorBinding> {
        self.descriptor_sets.get(set)?.get(slot)
    }

    /// All resources this stage reads, across every set and slot
    pub fn get_bound_resources_set(&self) -> BTreeSet<ResourceHandle> {
        self.descriptor_sets
            .iter()
            .flatten()
            .flat_map(|binding| binding.handles().iter().copied())
            .collect()
    }
}
