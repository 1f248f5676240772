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

//! Shader and program validation shared by every back end.

use crate::renderer::api::resource::{ResourceHandle, ResourceType};
use crate::renderer::api::shader::{ProgramDescriptor, ShaderDescriptor, ShaderStage};
use crate::renderer::capabilities::Capabilities;
use crate::renderer::error::{BindingError, RenderError, ResourceError};
use crate::renderer::resource::{OwnsReferences, ResourceRegistry};

/// Every shader resource type.
pub const SHADER_TYPES: [ResourceType; 5] = [
    ResourceType::VertexShader,
    ResourceType::TessellationControlShader,
    ResourceType::TessellationEvaluationShader,
    ResourceType::GeometryShader,
    ResourceType::FragmentShader,
];

/// Checks a shader against the language and the stages of a back end.
pub fn validate_shader(
    descriptor: &ShaderDescriptor<'_>,
    language: &str,
    capabilities: &Capabilities,
    backend: &'static str,
) -> Result<(), RenderError> {
    if descriptor.language != language {
        return Err(BindingError::LanguageMismatch {
            expected: language.to_string(),
            found: descriptor.language.to_string(),
        }
        .into());
    }
    capabilities.require_stage(descriptor.stage, backend)?;
    Ok(())
}

/// Validates the root signature and every stage of a program description.
///
/// Each stage must be a live shader created for that stage, and all stages must be
/// written in the same language. A vertex shader is mandatory. Returns the stages in
/// pipeline order.
pub fn validate_program<T, F>(
    registry: &ResourceRegistry<T>,
    descriptor: &ProgramDescriptor,
    language_of: F,
) -> Result<Vec<(ShaderStage, ResourceHandle)>, RenderError>
where
    T: OwnsReferences,
    F: Fn(&T) -> Option<&str>,
{
    registry.validate(descriptor.root_signature, &[ResourceType::RootSignature])?;

    let mut language: Option<&str> = None;
    let mut stages = Vec::new();
    for (stage, handle) in descriptor.stages() {
        let entry = registry.validate(handle, &SHADER_TYPES)?;
        if entry.base.resource_type != stage.resource_type() {
            return Err(BindingError::StageMismatch {
                expected: stage,
                found: entry.base.resource_type,
            }
            .into());
        }
        let found = language_of(&entry.payload).unwrap_or_default();
        match language {
            Some(expected) if expected != found => {
                return Err(BindingError::LanguageMismatch {
                    expected: expected.to_string(),
                    found: found.to_string(),
                }
                .into());
            }
            _ => language = Some(found),
        }
        stages.push((stage, handle));
    }

    if !stages.iter().any(|(stage, _)| *stage == ShaderStage::Vertex) {
        return Err(ResourceError::InvalidDescription(
            "a program needs a vertex shader".to_string(),
        )
        .into());
    }
    Ok(stages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::resource::RendererId;
    use crate::renderer::api::vertex::VertexAttributes;
    use std::borrow::Cow;

    enum Payload {
        Shader(&'static str),
        Other,
    }

    impl OwnsReferences for Payload {}

    fn language_of(payload: &Payload) -> Option<&str> {
        match payload {
            Payload::Shader(language) => Some(*language),
            Payload::Other => None,
        }
    }

    fn program(
        registry: &mut ResourceRegistry<Payload>,
        vertex: ResourceHandle,
        fragment: ResourceHandle,
    ) -> ProgramDescriptor {
        ProgramDescriptor {
            root_signature: registry
                .insert(ResourceType::RootSignature, Payload::Other)
                .unwrap(),
            vertex_attributes: VertexAttributes::default(),
            vertex_shader: Some(vertex),
            tessellation_control_shader: None,
            tessellation_evaluation_shader: None,
            geometry_shader: None,
            fragment_shader: Some(fragment),
        }
    }

    #[test]
    fn shader_language_and_stage_are_checked() {
        let mut capabilities = Capabilities::full("test");
        capabilities.geometry_shaders = false;
        let descriptor = ShaderDescriptor {
            stage: ShaderStage::Geometry,
            language: Cow::Borrowed("GLSL"),
            source: Cow::Borrowed(""),
        };

        assert!(matches!(
            validate_shader(&descriptor, "ESSL", &capabilities, "test"),
            Err(RenderError::Binding(BindingError::LanguageMismatch { .. }))
        ));
        assert!(matches!(
            validate_shader(&descriptor, "GLSL", &capabilities, "test"),
            Err(RenderError::Capability(_))
        ));
    }

    #[test]
    fn program_stages_must_match_and_share_a_language() {
        let mut registry = ResourceRegistry::new(RendererId(1));
        let vertex = registry
            .insert(ResourceType::VertexShader, Payload::Shader("GLSL"))
            .unwrap();
        let fragment = registry
            .insert(ResourceType::FragmentShader, Payload::Shader("GLSL"))
            .unwrap();
        let foreign = registry
            .insert(ResourceType::FragmentShader, Payload::Shader("HLSL"))
            .unwrap();

        let valid = program(&mut registry, vertex, fragment);
        assert_eq!(
            validate_program(&registry, &valid, language_of).unwrap(),
            vec![(ShaderStage::Vertex, vertex), (ShaderStage::Fragment, fragment)]
        );

        let mixed = program(&mut registry, vertex, foreign);
        assert_eq!(
            validate_program(&registry, &mixed, language_of),
            Err(RenderError::Binding(BindingError::LanguageMismatch {
                expected: "GLSL".to_string(),
                found: "HLSL".to_string(),
            }))
        );

        let swapped = program(&mut registry, fragment, vertex);
        assert_eq!(
            validate_program(&registry, &swapped, language_of),
            Err(RenderError::Binding(BindingError::StageMismatch {
                expected: ShaderStage::Vertex,
                found: ResourceType::FragmentShader,
            }))
        );
    }
}
