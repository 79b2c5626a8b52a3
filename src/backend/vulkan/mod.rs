//! Vulkan command recording using ash
//!
//! Device, swapchain and memory management stay with the application; this
//! module converts graph types to Vulkan enums and records node draw commands
//! into a command buffer the caller owns.

use crate::backend::traits::*;
use crate::backend::types::*;
use ash::vk;
use std::collections::HashMap;

pub fn convert_format(format: TextureFormat) -> vk::Format {
    match format {
        TextureFormat::R8Unorm => vk::Format::R8_UNORM,
        TextureFormat::Rgba8Unorm => vk::Format::R8G8B8A8_UNORM,
        TextureFormat::Rgba8UnormSrgb => vk::Format::R8G8B8A8_SRGB,
        TextureFormat::Bgra8Unorm => vk::Format::B8G8R8A8_UNORM,
        TextureFormat::Bgra8UnormSrgb => vk::Format::B8G8R8A8_SRGB,
        TextureFormat::Rgba16Float => vk::Format::R16G16B16A16_SFLOAT,
        TextureFormat::Rgba32Float => vk::Format::R32G32B32A32_SFLOAT,
        TextureFormat::R32Float => vk::Format::R32_SFLOAT,
        TextureFormat::Rg32Float => vk::Format::R32G32_SFLOAT,
        TextureFormat::Depth32Float => vk::Format::D32_SFLOAT,
        TextureFormat::Depth24PlusStencil8 => vk::Format::D24_UNORM_S8_UINT,
    }
}

pub fn convert_cull_mode(mode: CullMode) -> vk::CullModeFlags {
    match mode {
        CullMode::None => vk::CullModeFlags::NONE,
        CullMode::Front => vk::CullModeFlags::FRONT,
        CullMode::Back => vk::CullModeFlags::BACK,
    }
}

pub fn convert_sample_count(samples: SampleCount) -> vk::SampleCountFlags {
    match samples {
        SampleCount::X1 => vk::SampleCountFlags::TYPE_1,
        SampleCount::X2 => vk::SampleCountFlags::TYPE_2,
        SampleCount::X4 => vk::SampleCountFlags::TYPE_4,
        SampleCount::X8 => vk::SampleCountFlags::TYPE_8,
    }
}

pub fn convert_index_format(format: IndexFormat) -> vk::IndexType {
    match format {
        IndexFormat::Uint16 => vk::IndexType::UINT16,
        IndexFormat::Uint32 => vk::IndexType::UINT32,
    }
}

/// Vulkan buffers addressable through [`BufferHandle`]s
#[derive(Debug, Default)]
pub struct BufferTable {
    buffers: HashMap<BufferHandle, vk::Buffer>,
}

impl BufferTable {
    pub fn insert(&mut self, handle: BufferHandle, buffer: vk::Buffer) {
        self.buffers.insert(handle, buffer);
    }

    /// # Panics
    ///
    /// If `handle` was never registered. Recording on would draw with
    /// whatever buffer is still bound from an earlier call.
    #[track_caller]
    pub fn resolve(&self, handle: BufferHandle) -> vk::Buffer {
        match self.buffers.get(&handle) {
            Some(buffer) => *buffer,
            None => panic!("VulkanRecorder: buffer {} is not registered", handle.raw()),
        }
    }
}

/// Draw recording into a caller-owned command buffer.
///
/// The command buffer must be in the recording state, inside a dynamic
/// rendering scope with the node's pipeline bound.
pub struct VulkanRecorder {
    device: ash::Device,
    command_buffer: vk::CommandBuffer,
    buffers: BufferTable,
}

impl VulkanRecorder {
    pub fn new(device: ash::Device, command_buffer: vk::CommandBuffer) -> Self {
        Self {
            device,
            command_buffer,
            buffers: BufferTable::default(),
        }
    }

    /// Make a Vulkan buffer addressable through `handle`
    pub fn register_buffer(&mut self, handle: BufferHandle, buffer: vk::Buffer) {
        self.buffers.insert(handle, buffer);
    }

    /// Record into another command buffer, e.g. the next frame in flight
    pub fn set_command_buffer(&mut self, command_buffer: vk::CommandBuffer) {
        self.command_buffer = command_buffer;
    }

    pub fn command_buffer(&self) -> vk::CommandBuffer {
        self.command_buffer
    }

    /// Full-target viewport and scissor for a node scope
    pub fn set_viewport_and_scissor(&mut self, (width, height): (u32, u32)) {
        let viewport = vk::Viewport {
            x: 0.0,
            y: 0.0,
            width: width as f32,
            height: height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        };
        let scissor = vk::Rect2D {
            offset: vk::Offset2D { x: 0, y: 0 },
            extent: vk::Extent2D { width, height },
        };
        unsafe {
            self.device
                .cmd_set_viewport(self.command_buffer, 0, &[viewport]);
            self.device.cmd_set_scissor(self.command_buffer, 0, &[scissor]);
        }
    }
}

impl CommandRecorder for VulkanRecorder {
    fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferHandle, offset: u64) {
        let buffer = self.buffers.resolve(buffer);
        unsafe {
            self.device
                .cmd_bind_vertex_buffers(self.command_buffer, slot, &[buffer], &[offset]);
        }
    }

    fn set_index_buffer(&mut self, buffer: BufferHandle, offset: u64, format: IndexFormat) {
        let buffer = self.buffers.resolve(buffer);
        unsafe {
            self.device.cmd_bind_index_buffer(
                self.command_buffer,
                buffer,
                offset,
                convert_index_format(format),
            );
        }
    }

    fn draw(&mut self, vertices: std::ops::Range<u32>, instances: std::ops::Range<u32>) {
        unsafe {
            self.device.cmd_draw(
                self.command_buffer,
                vertices.end - vertices.start,
                instances.end - instances.start,
                vertices.start,
                instances.start,
            );
        }
    }

    fn draw_indexed(
        &mut self,
        indices: std::ops::Range<u32>,
        base_vertex: i32,
        instances: std::ops::Range<u32>,
    ) {
        unsafe {
            self.device.cmd_draw_indexed(
                self.command_buffer,
                indices.end - indices.start,
                instances.end - instances.start,
                indices.start,
                base_vertex,
                instances.start,
            );
        }
    }
}
