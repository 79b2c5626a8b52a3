//! Camera pose and the per-frame uniform block derived from it

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};

/// Perspective camera, read-only from the renderer's point of view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.0, 4.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 60f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.01,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            ..Default::default()
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// View matrix with the translation stripped, for geometry at infinity (skybox)
    pub fn static_view_matrix(&self) -> Mat4 {
        Mat4::from_mat3(Mat3::from_mat4(self.view_matrix()))
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn clipping_planes(&self) -> (f32, f32) {
        (self.near, self.far)
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }
}

/// Sun-like light shared by every node of a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Direction the light travels in
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::NEG_X,
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

/// Per-frame uniform block read by the graph's shaders.
///
/// Layout is std140-compatible: every field is 16-byte aligned or packed into
/// the tail vec4s.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view: Mat4,
    pub proj: Mat4,
    pub inverse_view: Mat4,
    pub inverse_proj: Mat4,
    pub inverse_view_proj: Mat4,
    pub static_view: Mat4,
    /// xyz = position, w = 1
    pub camera_position: Vec4,
    /// xyz = direction, w = intensity
    pub light_direction: Vec4,
    pub light_color: Vec4,
    pub window_size: [u32; 2],
    /// (near, far)
    pub clip_planes: Vec2,
    pub flags: u32,
    /// Free parameter for shader debugging
    pub debug_number: f32,
    pub _padding: [u32; 2],
}

impl FrameUniforms {
    /// Screen-space ambient occlusion is applied by the scene pass
    pub const USE_SSAO: u32 = 1 << 0;

    pub fn new(camera: &Camera, light: &DirectionalLight, window_size: (u32, u32)) -> Self {
        let view = camera.view_matrix();
        let proj = camera.projection_matrix();
        let (near, far) = camera.clipping_planes();

        Self {
            view,
            proj,
            inverse_view: view.inverse(),
            inverse_proj: proj.inverse(),
            inverse_view_proj: (proj * view).inverse(),
            static_view: camera.static_view_matrix(),
            camera_position: camera.position.extend(1.0),
            light_direction: light.direction.normalize_or_zero().extend(light.intensity),
            light_color: light.color.extend(1.0),
            window_size: [window_size.0, window_size.1],
            clip_planes: Vec2::new(near, far),
            flags: 0,
            debug_number: 0.0,
            _padding: [0; 2],
        }
    }

    pub fn with_ssao(mut self, enabled: bool) -> Self {
        if enabled {
            self.flags |= Self::USE_SSAO;
        } else {
            self.flags &= !Self::USE_SSAO;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout() {
        assert_eq!(std::mem::size_of::<FrameUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 464);
    }

    #[test]
    fn test_static_view_has_no_translation() {
        let camera = Camera::new(Vec3::new(3.0, 2.0, 1.0), Vec3::ZERO);
        let static_view = camera.static_view_matrix();
        assert_eq!(static_view.w_axis, Vec4::W);
        assert_eq!(static_view.x_axis, camera.view_matrix().x_axis.truncate().extend(0.0));
    }

    #[test]
    fn test_inverse_view_proj_round_trips() {
        let camera = Camera::default();
        let uniforms = FrameUniforms::new(&camera, &DirectionalLight::default(), (1280, 720));
        let identity = uniforms.inverse_view_proj * uniforms.proj * uniforms.view;
        assert!(identity.abs_diff_eq(Mat4::IDENTITY, 1e-3));
        assert_eq!(uniforms.clip_planes, Vec2::new(0.01, 100.0));
        assert_eq!(uniforms.window_size, [1280, 720]);
    }

    #[test]
    fn test_ssao_flag() {
        let uniforms = FrameUniforms::new(&Camera::default(), &DirectionalLight::default(), (1, 1))
            .with_ssao(true);
        assert_eq!(uniforms.flags & FrameUniforms::USE_SSAO, FrameUniforms::USE_SSAO);
        assert_eq!(uniforms.with_ssao(false).flags, 0);
    }
}
