//! Recording context handed to render node bodies

use crate::backend::traits::CommandRecorder;
use crate::backend::types::IndexFormat;
use crate::geometry::{FixedGeometryBuffers, SCREEN_SPACE_QUAD_VERTICES, SKYBOX_VERTICES};
use crate::render_graph::resource::{ModelResource, ResourceHandle, ResourceRegistry};

/// Draw helpers available to a node body while its scope is open.
///
/// Only borrowed for the duration of one node's recording. Resource
/// descriptions and the underlying recorder stay private:
///
/// ```compile_fail
/// fn body(ctx: &mut graph_renderer::render_graph::RenderPassContext<'_>) {
///     let _ = ctx.registry();
/// }
/// ```
pub struct RenderPassContext<'a> {
    recorder: &'a mut dyn CommandRecorder,
    registry: &'a ResourceRegistry,
    fixed: &'a FixedGeometryBuffers,
}

impl<'a> RenderPassContext<'a> {
    pub fn new(
        recorder: &'a mut dyn CommandRecorder,
        registry: &'a ResourceRegistry,
        fixed: &'a FixedGeometryBuffers,
    ) -> Self {
        Self {
            recorder,
            registry,
            fixed,
        }
    }

    /// Draw every mesh of a registered model.
    ///
    /// Vertices go to slot 0, per-instance data to slot 1. Meshes are drawn in
    /// order with running index, vertex and instance offsets.
    ///
    /// # Panics
    ///
    /// If `model` is not a registered model, or if its running index or
    /// instance counts overflow `u32`, or its running vertex count overflows
    /// `i32`.
    #[track_caller]
    pub fn draw_model(&mut self, model: ResourceHandle) {
        let model: &ModelResource = self.registry.get(model);

        self.recorder.set_vertex_buffer(0, model.vertex_buffer, 0);
        self.recorder.set_vertex_buffer(1, model.instance_buffer, 0);
        self.recorder.set_index_buffer(model.index_buffer, 0, IndexFormat::Uint32);

        let mut index_offset = 0u32;
        let mut vertex_offset = 0i32;
        let mut instance_offset = 0u32;
        for (i, mesh) in model.meshes.iter().enumerate() {
            let index_end = index_offset
                .checked_add(mesh.index_count)
                .unwrap_or_else(|| offset_overflow(&model.name, "index", i));
            let instance_end = instance_offset
                .checked_add(mesh.instance_count)
                .unwrap_or_else(|| offset_overflow(&model.name, "instance", i));

            self.recorder.draw_indexed(
                index_offset..index_end,
                vertex_offset,
                instance_offset..instance_end,
            );

            index_offset = index_end;
            instance_offset = instance_end;
            vertex_offset = i32::try_from(mesh.vertex_count)
                .ok()
                .and_then(|count| vertex_offset.checked_add(count))
                .unwrap_or_else(|| offset_overflow(&model.name, "vertex", i));
        }
    }

    /// Draw a quad covering the whole target
    pub fn draw_screenspace_quad(&mut self) {
        self.recorder.set_vertex_buffer(0, self.fixed.screen_quad, 0);
        self.recorder.draw(0..SCREEN_SPACE_QUAD_VERTICES.len() as u32, 0..1);
    }

    pub fn draw_skybox(&mut self) {
        self.recorder.set_vertex_buffer(0, self.fixed.skybox, 0);
        self.recorder.draw(0..SKYBOX_VERTICES.len() as u32, 0..1);
    }
}

fn offset_overflow(model: &str, what: &str, mesh: usize) -> ! {
    panic!("model '{model}': {what} offset overflows at mesh {mesh}")
}
