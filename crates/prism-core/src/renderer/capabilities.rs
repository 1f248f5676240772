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

//! Hardware and back end capabilities.
//!
//! Capabilities are computed once, when a renderer is constructed, from the native
//! context's extension queries. Every later operation consults the stored values and
//! never re-queries the context.

use crate::renderer::api::root_signature::ShaderVisibility;
use crate::renderer::api::shader::ShaderStage;
use crate::renderer::error::CapabilityError;

/// What the active back end and hardware can do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    /// Name of the device or driver, for diagnostics.
    pub device_name: String,
    /// Maximum number of simultaneously active viewports and scissor rectangles.
    pub maximum_number_of_viewports: u32,
    /// Maximum number of color attachments of one framebuffer.
    pub maximum_number_of_simultaneous_render_targets: u32,
    /// Maximum width and height of a 2D texture.
    pub maximum_texture_dimension: u32,
    /// Native uniform buffer objects. Without them uniform buffers are shadowed in
    /// system memory and uploaded as individual uniforms.
    pub uniform_buffer: bool,
    /// Texture buffers.
    pub texture_buffer: bool,
    /// Per-instance vertex attributes and instanced draws.
    pub instanced_arrays: bool,
    /// Draws with a base vertex added to every index.
    pub base_vertex: bool,
    /// Draws starting at an instance other than zero.
    pub base_instance: bool,
    /// Draw arguments read by the GPU from an indirect buffer. Without it indirect
    /// draws are emulated on the CPU, one native draw per argument record.
    pub native_indirect_draw: bool,
    /// Tessellation control and evaluation stages.
    pub tessellation_shaders: bool,
    /// Geometry stage.
    pub geometry_shaders: bool,
    /// Native vertex array objects. Without them vertex arrays are emulated by
    /// re-specifying attribute pointers on every bind.
    pub vertex_array_objects: bool,
    /// Sampler objects separate from textures.
    pub sampler_objects: bool,
    /// Multisample framebuffer resolve.
    pub multisample_resolve: bool,
    /// Resource to resource copies.
    pub copy_resource: bool,
    /// Debug groups and markers.
    pub debug_markers: bool,
    /// Wireframe polygon fill mode.
    pub wireframe_fill: bool,
    /// `true` when the native window origin is the upper left corner.
    pub upper_left_origin: bool,
}

impl Capabilities {
    /// Capabilities of a back end without any gap.
    pub fn full(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            maximum_number_of_viewports: 16,
            maximum_number_of_simultaneous_render_targets: 8,
            maximum_texture_dimension: 16384,
            uniform_buffer: true,
            texture_buffer: true,
            instanced_arrays: true,
            base_vertex: true,
            base_instance: true,
            native_indirect_draw: true,
            tessellation_shaders: true,
            geometry_shaders: true,
            vertex_array_objects: true,
            sampler_objects: true,
            multisample_resolve: true,
            copy_resource: true,
            debug_markers: true,
            wireframe_fill: true,
            upper_left_origin: true,
        }
    }

    /// Whether the given programmable stage exists.
    pub fn supports_stage(&self, stage: ShaderStage) -> bool {
        match stage {
            ShaderStage::Vertex | ShaderStage::Fragment => true,
            ShaderStage::TessellationControl | ShaderStage::TessellationEvaluation => {
                self.tessellation_shaders
            }
            ShaderStage::Geometry => self.geometry_shaders,
        }
    }

    /// Fails with [`CapabilityError::StageNotSupported`] if `stage` is missing.
    pub fn require_stage(
        &self,
        stage: ShaderStage,
        backend: &'static str,
    ) -> Result<(), CapabilityError> {
        if self.supports_stage(stage) {
            Ok(())
        } else {
            Err(CapabilityError::StageNotSupported { stage, backend })
        }
    }

    /// Checks a root parameter visibility mask.
    ///
    /// A parameter visible to at least one existing stage can be bound. A parameter
    /// visible only to missing stages is reported with the first missing stage.
    pub fn require_visibility(
        &self,
        visibility: ShaderVisibility,
        backend: &'static str,
    ) -> Result<(), CapabilityError> {
        const STAGES: [(ShaderVisibility, ShaderStage); 5] = [
            (ShaderVisibility::VERTEX, ShaderStage::Vertex),
            (
                ShaderVisibility::TESSELLATION_CONTROL,
                ShaderStage::TessellationControl,
            ),
            (
                ShaderVisibility::TESSELLATION_EVALUATION,
                ShaderStage::TessellationEvaluation,
            ),
            (ShaderVisibility::GEOMETRY, ShaderStage::Geometry),
            (ShaderVisibility::FRAGMENT, ShaderStage::Fragment),
        ];

        let mut first_missing = None;
        for (flag, stage) in STAGES {
            if !visibility.contains(flag) {
                continue;
            }
            if self.supports_stage(stage) {
                return Ok(());
            }
            first_missing.get_or_insert(stage);
        }
        match first_missing {
            Some(stage) => Err(CapabilityError::StageNotSupported { stage, backend }),
            None => Ok(()),
        }
    }

    /// Fails with [`CapabilityError::FeatureNotSupported`] unless `supported`.
    pub fn require(
        supported: bool,
        feature: &'static str,
        backend: &'static str,
    ) -> Result<(), CapabilityError> {
        if supported {
            Ok(())
        } else {
            Err(CapabilityError::FeatureNotSupported { feature, backend })
        }
    }
}
