//! Fixed geometry drawn by render node bodies: the screen-space quad and the skybox cube

use crate::backend::traits::{BackendResult, BufferHandle, GraphicsBackend};
use crate::backend::types::{ScreenQuadVertex, SkyboxVertex};
use glam::{Vec2, Vec3};

const fn quad_vertex(x: f32, y: f32, u: f32, v: f32) -> ScreenQuadVertex {
    ScreenQuadVertex {
        position: Vec2::new(x, y),
        uv: Vec2::new(u, v),
    }
}

const fn sky(x: f32, y: f32, z: f32) -> SkyboxVertex {
    SkyboxVertex {
        position: Vec3::new(x, y, z),
    }
}

/// Two triangles covering the whole viewport, in clip space
pub const SCREEN_SPACE_QUAD_VERTICES: [ScreenQuadVertex; 6] = [
    quad_vertex(-1.0, 1.0, 0.0, 1.0),
    quad_vertex(1.0, 1.0, 1.0, 1.0),
    quad_vertex(-1.0, -1.0, 0.0, 0.0),
    quad_vertex(-1.0, -1.0, 0.0, 0.0),
    quad_vertex(1.0, 1.0, 1.0, 1.0),
    quad_vertex(1.0, -1.0, 1.0, 0.0),
];

/// Unit cube, 12 inward-facing triangles
pub const SKYBOX_VERTICES: [SkyboxVertex; 36] = [
    // -Z
    sky(-1.0, 1.0, -1.0),
    sky(-1.0, -1.0, -1.0),
    sky(1.0, -1.0, -1.0),
    sky(1.0, -1.0, -1.0),
    sky(1.0, 1.0, -1.0),
    sky(-1.0, 1.0, -1.0),
    // -X
    sky(-1.0, -1.0, 1.0),
    sky(-1.0, -1.0, -1.0),
    sky(-1.0, 1.0, -1.0),
    sky(-1.0, 1.0, -1.0),
    sky(-1.0, 1.0, 1.0),
    sky(-1.0, -1.0, 1.0),
    // +X
    sky(1.0, -1.0, -1.0),
    sky(1.0, -1.0, 1.0),
    sky(1.0, 1.0, 1.0),
    sky(1.0, 1.0, 1.0),
    sky(1.0, 1.0, -1.0),
    sky(1.0, -1.0, -1.0),
    // +Z
    sky(-1.0, -1.0, 1.0),
    sky(-1.0, 1.0, 1.0),
    sky(1.0, 1.0, 1.0),
    sky(1.0, 1.0, 1.0),
    sky(1.0, -1.0, 1.0),
    sky(-1.0, -1.0, 1.0),
    // +Y
    sky(-1.0, 1.0, -1.0),
    sky(1.0, 1.0, -1.0),
    sky(1.0, 1.0, 1.0),
    sky(1.0, 1.0, 1.0),
    sky(-1.0, 1.0, 1.0),
    sky(-1.0, 1.0, -1.0),
    // -Y
    sky(-1.0, -1.0, -1.0),
    sky(-1.0, -1.0, 1.0),
    sky(1.0, -1.0, -1.0),
    sky(1.0, -1.0, -1.0),
    sky(-1.0, -1.0, 1.0),
    sky(1.0, -1.0, 1.0),
];

/// GPU vertex buffers holding the fixed geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedGeometryBuffers {
    pub screen_quad: BufferHandle,
    pub skybox: BufferHandle,
}

impl FixedGeometryBuffers {
    /// Upload both vertex buffers through the backend
    pub fn upload<B: GraphicsBackend>(backend: &mut B) -> BackendResult<Self> {
        let screen_quad = backend.create_vertex_buffer(
            "screen-space quad",
            bytemuck::cast_slice(&SCREEN_SPACE_QUAD_VERTICES),
        )?;
        let skybox =
            backend.create_vertex_buffer("skybox", bytemuck::cast_slice(&SKYBOX_VERTICES))?;

        Ok(Self {
            screen_quad,
            skybox,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quad_covers_clip_space() {
        for vertex in SCREEN_SPACE_QUAD_VERTICES {
            assert_eq!(vertex.position.abs(), Vec2::ONE);
            assert!(vertex.uv.x == 0.0 || vertex.uv.x == 1.0);
        }
    }

    #[test]
    fn test_skybox_is_unit_cube() {
        assert_eq!(SKYBOX_VERTICES.len(), 36);
        for vertex in SKYBOX_VERTICES {
            assert_eq!(vertex.position.abs(), Vec3::ONE);
        }
    }
}
