// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::calls::{GlCall, GlObjectKind};
use prism_core::renderer::{BackendKind, Capabilities};
use raw_window_handle::RawWindowHandle;
use std::fmt::Debug;

/// The native OpenGL context a [`GlRenderer`](super::GlRenderer) drives.
///
/// Implementations own the platform context and forward each call to the GL
/// function of the same name. Creating, compiling and linking are separate methods
/// because they return names or logs.
pub trait GlContext: Debug {
    /// Makes the context current on the calling thread.
    fn make_current(&mut self) -> Result<(), String>;

    /// Queries the version and extension set. Called once, when the renderer is
    /// created.
    fn extensions(&self) -> GlExtensions;

    /// Creates a window surface sharing this context.
    fn create_surface(
        &mut self,
        window: RawWindowHandle,
        width: u32,
        height: u32,
    ) -> Result<u32, String>;

    /// Generates a new object name.
    fn create_object(&mut self, kind: GlObjectKind) -> u32;

    /// Issues one state change, draw or deletion.
    fn issue(&mut self, call: GlCall);

    /// Compiles `source` into `shader`, returning the info log on failure.
    fn compile_shader(&mut self, shader: u32, source: &str) -> Result<(), String>;

    /// Links `program`, returning the info log on failure.
    fn link_program(&mut self, program: u32) -> Result<(), String>;

    /// Location of a uniform of a linked program, `None` if it is not active.
    fn uniform_location(&mut self, program: u32, name: &str) -> Option<i32>;

    /// Index of a uniform block of a linked program, `None` if it is not active.
    fn uniform_block_index(&mut self, program: u32, name: &str) -> Option<u32>;
}

/// The API flavour of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlProfile {
    /// Desktop OpenGL, core profile.
    Desktop,
    /// OpenGL ES.
    Es,
}

/// Version and extension queries of a context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlExtensions {
    /// Desktop core or ES.
    pub profile: GlProfile,
    /// `GL_MAJOR_VERSION`.
    pub major_version: u32,
    /// `GL_MINOR_VERSION`.
    pub minor_version: u32,
    /// `GL_RENDERER`, for logs.
    pub renderer_name: String,
    /// Vertex array objects (ES 3.0, `ARB_vertex_array_object`).
    pub vertex_array_object: bool,
    /// Uniform blocks (ES 3.0, `ARB_uniform_buffer_object`).
    pub uniform_buffer_object: bool,
    /// Buffer textures (ES 3.2, `ARB_texture_buffer_object`).
    pub texture_buffer_object: bool,
    /// Instanced draws and attribute divisors.
    pub instanced_arrays: bool,
    /// Indexed draws with a base vertex.
    pub draw_elements_base_vertex: bool,
    /// Draws with a base instance (`ARB_base_instance`).
    pub base_instance: bool,
    /// Draw arguments read from a bound indirect buffer.
    pub draw_indirect: bool,
    /// Tessellation control and evaluation stages.
    pub tessellation_shader: bool,
    /// Geometry stage.
    pub geometry_shader: bool,
    /// Sampler objects separate from textures.
    pub sampler_objects: bool,
    /// `glCopyImageSubData`.
    pub copy_image: bool,
    /// `glBlitFramebuffer`, used for multisample resolves.
    pub framebuffer_blit: bool,
    /// `KHR_debug` groups and messages.
    pub debug_output: bool,
    /// Indexed viewports and scissors.
    pub viewport_array: bool,
    /// `GL_MAX_COLOR_ATTACHMENTS`.
    pub max_color_attachments: u32,
    /// `GL_MAX_TEXTURE_SIZE`.
    pub max_texture_size: u32,
    /// `GL_MAX_VIEWPORTS`, 1 without viewport arrays.
    pub max_viewports: u32,
}

impl GlExtensions {
    /// A bare OpenGL ES 2.0 context.
    pub fn gles2() -> Self {
        Self {
            profile: GlProfile::Es,
            major_version: 2,
            minor_version: 0,
            renderer_name: "OpenGL ES 2.0".to_string(),
            vertex_array_object: false,
            uniform_buffer_object: false,
            texture_buffer_object: false,
            instanced_arrays: false,
            draw_elements_base_vertex: false,
            base_instance: false,
            draw_indirect: false,
            tessellation_shader: false,
            geometry_shader: false,
            sampler_objects: false,
            copy_image: false,
            framebuffer_blit: false,
            debug_output: false,
            viewport_array: false,
            max_color_attachments: 1,
            max_texture_size: 4096,
            max_viewports: 1,
        }
    }

    /// An OpenGL ES 3.0 context.
    pub fn gles3() -> Self {
        Self {
            major_version: 3,
            renderer_name: "OpenGL ES 3.0".to_string(),
            vertex_array_object: true,
            uniform_buffer_object: true,
            instanced_arrays: true,
            sampler_objects: true,
            framebuffer_blit: true,
            max_color_attachments: 4,
            max_texture_size: 8192,
            ..Self::gles2()
        }
    }

    /// A desktop OpenGL 4.6 core profile context.
    pub fn desktop() -> Self {
        Self {
            profile: GlProfile::Desktop,
            major_version: 4,
            minor_version: 6,
            renderer_name: "OpenGL 4.6 Core".to_string(),
            vertex_array_object: true,
            uniform_buffer_object: true,
            texture_buffer_object: true,
            instanced_arrays: true,
            draw_elements_base_vertex: true,
            base_instance: true,
            draw_indirect: true,
            tessellation_shader: true,
            geometry_shader: true,
            sampler_objects: true,
            copy_image: true,
            framebuffer_blit: true,
            debug_output: true,
            viewport_array: true,
            max_color_attachments: 8,
            max_texture_size: 16384,
            max_viewports: 16,
        }
    }

    /// The back end these queries describe.
    pub fn backend(&self) -> BackendKind {
        match (self.profile, self.major_version) {
            (GlProfile::Desktop, _) => BackendKind::OpenGl,
            (GlProfile::Es, major) if major >= 3 => BackendKind::OpenGles3,
            (GlProfile::Es, _) => BackendKind::OpenGles2,
        }
    }

    /// Name of the shading language accepted by `create_shader`.
    pub fn shader_language(&self) -> &'static str {
        match self.profile {
            GlProfile::Desktop => "GLSL",
            GlProfile::Es => "ESSL",
        }
    }

    /// Derives the capabilities consulted by every later operation.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            device_name: self.renderer_name.clone(),
            maximum_number_of_viewports: if self.viewport_array {
                self.max_viewports.max(1)
            } else {
                1
            },
            maximum_number_of_simultaneous_render_targets: self.max_color_attachments.max(1),
            maximum_texture_dimension: self.max_texture_size,
            uniform_buffer: self.uniform_buffer_object,
            texture_buffer: self.texture_buffer_object,
            instanced_arrays: self.instanced_arrays,
            base_vertex: self.draw_elements_base_vertex,
            base_instance: self.base_instance,
            native_indirect_draw: self.draw_indirect,
            tessellation_shaders: self.tessellation_shader,
            geometry_shaders: self.geometry_shader,
            vertex_array_objects: self.vertex_array_object,
            sampler_objects: self.sampler_objects,
            multisample_resolve: self.framebuffer_blit,
            copy_resource: self.copy_image,
            debug_markers: self.debug_output,
            wireframe_fill: self.profile == GlProfile::Desktop,
            upper_left_origin: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_map_to_backends_and_languages() {
        assert_eq!(GlExtensions::gles2().backend(), BackendKind::OpenGles2);
        assert_eq!(GlExtensions::gles3().backend(), BackendKind::OpenGles3);
        assert_eq!(GlExtensions::desktop().backend(), BackendKind::OpenGl);
        assert_eq!(GlExtensions::gles3().shader_language(), "ESSL");
        assert_eq!(GlExtensions::desktop().shader_language(), "GLSL");
    }

    #[test]
    fn gles2_capabilities_expose_every_gap() {
        let capabilities = GlExtensions::gles2().capabilities();
        assert_eq!(capabilities.maximum_number_of_viewports, 1);
        assert!(!capabilities.uniform_buffer);
        assert!(!capabilities.native_indirect_draw);
        assert!(!capabilities.vertex_array_objects);
        assert!(!capabilities.wireframe_fill);
        assert!(!capabilities.upper_left_origin);
    }

    #[test]
    fn viewport_count_needs_viewport_arrays() {
        let mut extensions = GlExtensions::desktop();
        assert_eq!(extensions.capabilities().maximum_number_of_viewports, 16);
        extensions.viewport_array = false;
        assert_eq!(extensions.capabilities().maximum_number_of_viewports, 1);
    }
}
