//! Graph resources and the registry that hands out their handles

use crate::backend::traits::BufferHandle;
use crate::backend::types::TextureFormat;
use crate::render_graph::error::{GraphError, GraphResult};
use crate::render_graph::shader::ShaderPack;
use std::collections::HashMap;
use std::fmt;

/// Unique identifier for a render graph resource.
///
/// All resource kinds share one counter, so a handle identifies a resource
/// regardless of its kind and two handles of different kinds never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceHandle(pub(crate) u32);

impl ResourceHandle {
    pub fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource #{}", self.0)
    }
}

/// Texture creation flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureFlags(u32);

impl TextureFlags {
    pub const NONE: Self = Self(0);
    pub const MIPMAPS: Self = Self(1 << 0);
    pub const CUBEMAP: Self = Self(1 << 1);
    pub const HDR: Self = Self(1 << 2);
    /// Channels are assembled from separate single-channel source files
    pub const SWIZZLE: Self = Self(1 << 3);

    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn bits(&self) -> u32 {
        self.0
    }
}

impl std::ops::BitOr for TextureFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Uniform buffer whose contents are supplied by the caller every frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformBufferResource {
    pub size: u64,
}

impl UniformBufferResource {
    pub fn new(size: u64) -> Self {
        Self { size }
    }

    /// Uniform buffer sized for `T`
    pub fn for_type<T: bytemuck::Pod>() -> Self {
        Self::new(std::mem::size_of::<T>() as u64)
    }
}

/// Texture loaded from one or more files on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTextureResource {
    /// Opaque paths, passed through untouched to the loader
    pub paths: Vec<String>,
    pub format: TextureFormat,
    pub flags: TextureFlags,
}

impl ExternalTextureResource {
    pub fn new(path: impl Into<String>, format: TextureFormat) -> Self {
        Self {
            paths: vec![path.into()],
            format,
            flags: TextureFlags::NONE,
        }
    }

    /// Texture whose channels come from separate files (e.g. AO, roughness, metallic)
    pub fn swizzled<I, S>(paths: I, format: TextureFormat) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            format,
            flags: TextureFlags::SWIZZLE,
        }
    }

    pub fn with_flags(mut self, flags: TextureFlags) -> Self {
        self.flags = self.flags | flags;
        self
    }
}

/// Texture without a source file; its contents are produced by graph execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyTextureResource {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub flags: TextureFlags,
}

impl EmptyTextureResource {
    pub fn new(width: u32, height: u32, format: TextureFormat) -> Self {
        Self {
            width,
            height,
            format,
            flags: TextureFlags::NONE,
        }
    }

    pub fn with_flags(mut self, flags: TextureFlags) -> Self {
        self.flags = self.flags | flags;
        self
    }
}

/// Geometry counts of one mesh inside a model's combined buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshRange {
    pub index_count: u32,
    pub vertex_count: u32,
    pub instance_count: u32,
}

/// Externally loaded mesh and material data already resident on the GPU.
///
/// Meshes are laid out contiguously, in order, in the vertex, index and
/// instance buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResource {
    pub name: String,
    pub vertex_buffer: BufferHandle,
    pub instance_buffer: BufferHandle,
    pub index_buffer: BufferHandle,
    pub meshes: Vec<MeshRange>,
}

/// Resource kind, used for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    UniformBuffer,
    ExternalTexture,
    EmptyTexture,
    Model,
    Pipeline,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::UniformBuffer => "uniform buffer",
            ResourceKind::ExternalTexture => "external texture",
            ResourceKind::EmptyTexture => "empty texture",
            ResourceKind::Model => "model",
            ResourceKind::Pipeline => "shader pack",
        };
        f.write_str(name)
    }
}

/// A resource description that can be stored in a [`ResourceRegistry`]
pub trait GraphResource: Sized {
    const KIND: ResourceKind;

    fn storage(registry: &ResourceRegistry) -> &HashMap<ResourceHandle, Self>;

    fn storage_mut(registry: &mut ResourceRegistry) -> &mut HashMap<ResourceHandle, Self>;
}

macro_rules! graph_resource {
    ($ty:ty, $kind:expr, $field:ident) => {
        impl GraphResource for $ty {
            const KIND: ResourceKind = $kind;

            fn storage(registry: &ResourceRegistry) -> &HashMap<ResourceHandle, Self> {
                &registry.$field
            }

            fn storage_mut(registry: &mut ResourceRegistry) -> &mut HashMap<ResourceHandle, Self> {
                &mut registry.$field
            }
        }
    };
}

graph_resource!(UniformBufferResource, ResourceKind::UniformBuffer, uniform_buffers);
graph_resource!(ExternalTextureResource, ResourceKind::ExternalTexture, external_textures);
graph_resource!(EmptyTextureResource, ResourceKind::EmptyTexture, empty_textures);
graph_resource!(ModelResource, ResourceKind::Model, models);
graph_resource!(ShaderPack, ResourceKind::Pipeline, pipelines);

/// Typed collections of resource descriptions.
///
/// Pure bookkeeping: nothing here touches the GPU. Resources are never removed;
/// a registry lives as long as the graph configuration it describes.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    next_handle: u32,
    uniform_buffers: HashMap<ResourceHandle, UniformBufferResource>,
    external_textures: HashMap<ResourceHandle, ExternalTextureResource>,
    empty_textures: HashMap<ResourceHandle, EmptyTextureResource>,
    models: HashMap<ResourceHandle, ModelResource>,
    pipelines: HashMap<ResourceHandle, ShaderPack>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn new_handle(&mut self) -> ResourceHandle {
        let handle = ResourceHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Store a resource description and return its fresh handle
    pub fn add<R: GraphResource>(&mut self, resource: R) -> ResourceHandle {
        let handle = self.new_handle();
        R::storage_mut(self).insert(handle, resource);
        log::debug!("Registered {} as {}", R::KIND, handle);
        handle
    }

    /// Look up a resource of kind `R`
    pub fn try_get<R: GraphResource>(&self, handle: ResourceHandle) -> GraphResult<&R> {
        R::storage(self)
            .get(&handle)
            .ok_or(GraphError::UnknownResource {
                handle,
                kind: R::KIND,
            })
    }

    /// Look up a resource of kind `R`.
    ///
    /// # Panics
    ///
    /// If `handle` is not a registered resource of that kind. A stale or foreign
    /// handle is a bug at the call site.
    #[track_caller]
    pub fn get<R: GraphResource>(&self, handle: ResourceHandle) -> &R {
        match self.try_get(handle) {
            Ok(resource) => resource,
            Err(err) => panic!("{err}"),
        }
    }

    /// Kind of a registered resource
    pub fn kind_of(&self, handle: ResourceHandle) -> Option<ResourceKind> {
        if self.uniform_buffers.contains_key(&handle) {
            Some(ResourceKind::UniformBuffer)
        } else if self.external_textures.contains_key(&handle) {
            Some(ResourceKind::ExternalTexture)
        } else if self.empty_textures.contains_key(&handle) {
            Some(ResourceKind::EmptyTexture)
        } else if self.models.contains_key(&handle) {
            Some(ResourceKind::Model)
        } else if self.pipelines.contains_key(&handle) {
            Some(ResourceKind::Pipeline)
        } else {
            None
        }
    }

    pub fn contains(&self, handle: ResourceHandle) -> bool {
        self.kind_of(handle).is_some()
    }

    /// Total number of registered resources across all kinds
    pub fn len(&self) -> usize {
        self.uniform_buffers.len()
            + self.external_textures.len()
            + self.empty_textures.len()
            + self.models.len()
            + self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn uniform_buffers(
        &self,
    ) -> impl Iterator<Item = (ResourceHandle, &UniformBufferResource)> {
        self.uniform_buffers.iter().map(|(&h, r)| (h, r))
    }

    pub fn external_textures(
        &self,
    ) -> impl Iterator<Item = (ResourceHandle, &ExternalTextureResource)> {
        self.external_textures.iter().map(|(&h, r)| (h, r))
    }

    pub fn empty_textures(&self) -> impl Iterator<Item = (ResourceHandle, &EmptyTextureResource)> {
        self.empty_textures.iter().map(|(&h, r)| (h, r))
    }

    pub fn models(&self) -> impl Iterator<Item = (ResourceHandle, &ModelResource)> {
        self.models.iter().map(|(&h, r)| (h, r))
    }

    pub fn pipelines(&self) -> impl Iterator<Item = (ResourceHandle, &ShaderPack)> {
        self.pipelines.iter().map(|(&h, r)| (h, r))
    }
}
