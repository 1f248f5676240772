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

//! Defines the hierarchy of error types for the rendering subsystem.
//!
//! Misuse of a renderer is never fatal: ownership mismatches, missing capabilities
//! and malformed bindings are reported as values, logged as diagnostics by the
//! command dispatch loop, and leave the renderer fully usable.

use crate::renderer::api::resource::{RendererId, ResourceHandle, ResourceType};
use crate::renderer::api::root_signature::DescriptorRangeType;
use crate::renderer::api::shader::ShaderStage;
use crate::renderer::command::CommandId;
use std::fmt;

/// An error related to the lifetime, identity or contents of a resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// No live resource has this handle; it was never created or is already destroyed.
    NotFound {
        /// The stale or invalid handle.
        handle: ResourceHandle,
    },
    /// The resource belongs to another renderer instance.
    OwnershipMismatch {
        /// The foreign handle.
        handle: ResourceHandle,
        /// The renderer the operation was issued on.
        renderer: RendererId,
    },
    /// The resource exists but is of a kind the operation does not accept.
    UnexpectedType {
        /// The offending handle.
        handle: ResourceHandle,
        /// The actual type of the resource.
        found: ResourceType,
        /// The accepted types.
        expected: &'static [ResourceType],
    },
    /// The resource kind cannot be mapped.
    NotMappable {
        /// The offending handle.
        handle: ResourceHandle,
    },
    /// The resource is already mapped.
    AlreadyMapped {
        /// The offending handle.
        handle: ResourceHandle,
    },
    /// The resource is not mapped.
    NotMapped {
        /// The offending handle.
        handle: ResourceHandle,
    },
    /// An access reaches past the end of a resource.
    OutOfBounds {
        /// Start of the access in bytes.
        offset: u64,
        /// Length of the access in bytes.
        size: u64,
        /// Size of the resource in bytes.
        capacity: u64,
    },
    /// The creation description is inconsistent.
    InvalidDescription(String),
    /// A shader failed to compile or a program failed to link.
    CompilationFailed {
        /// Label of the failing object.
        label: String,
        /// Compiler or linker log.
        details: String,
    },
    /// An error originating from the native graphics API.
    BackendError(String),
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::NotFound { handle } => {
                write!(f, "Resource {handle:?} does not exist or was already destroyed")
            }
            ResourceError::OwnershipMismatch { handle, renderer } => write!(
                f,
                "Resource {handle:?} is owned by {} and cannot be used with {renderer}",
                handle.renderer()
            ),
            ResourceError::UnexpectedType {
                handle,
                found,
                expected,
            } => write!(
                f,
                "Resource {handle:?} is a {found}, expected one of {expected:?}"
            ),
            ResourceError::NotMappable { handle } => {
                write!(f, "Resource {handle:?} cannot be mapped")
            }
            ResourceError::AlreadyMapped { handle } => {
                write!(f, "Resource {handle:?} is already mapped")
            }
            ResourceError::NotMapped { handle } => {
                write!(f, "Resource {handle:?} is not mapped")
            }
            ResourceError::OutOfBounds {
                offset,
                size,
                capacity,
            } => write!(
                f,
                "Access of {size} bytes at offset {offset} exceeds the resource size of {capacity} bytes"
            ),
            ResourceError::InvalidDescription(msg) => {
                write!(f, "Invalid resource description: {msg}")
            }
            ResourceError::CompilationFailed { label, details } => {
                write!(f, "Compilation failed for '{label}': {details}")
            }
            ResourceError::BackendError(msg) => {
                write!(f, "Backend-specific resource error: {msg}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}

/// Malformed use of the root signature binding model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// A descriptor table was set before any root signature.
    RootSignatureNotSet,
    /// The parameter index does not exist in the bound root signature.
    ParameterIndexOutOfRange {
        /// The requested parameter.
        parameter_index: u32,
        /// Parameters declared by the signature.
        number_of_parameters: u32,
    },
    /// The parameter is not a descriptor table.
    NotADescriptorTable {
        /// The requested parameter.
        parameter_index: u32,
    },
    /// Descriptor tables must hold exactly one range.
    UnsupportedRangeCount {
        /// The requested parameter.
        parameter_index: u32,
        /// Ranges declared by the table.
        number_of_ranges: u32,
    },
    /// The resource does not match the range type declared by the table.
    RangeTypeMismatch {
        /// The requested parameter.
        parameter_index: u32,
        /// The declared range type.
        range_type: DescriptorRangeType,
        /// The type of the resource that was bound.
        resource_type: ResourceType,
    },
    /// No native binding location was resolved for the parameter at link time.
    UnresolvedParameter {
        /// The requested parameter.
        parameter_index: u32,
    },
    /// An indexed draw needs a bound vertex array with an index buffer.
    NoIndexBuffer,
    /// The shader language does not match the back end or the other program stages.
    LanguageMismatch {
        /// The language the back end or program expects.
        expected: String,
        /// The language that was provided.
        found: String,
    },
    /// A shader was provided for a different stage than the one it was created for.
    StageMismatch {
        /// The program slot.
        expected: ShaderStage,
        /// The resource type of the provided shader.
        found: ResourceType,
    },
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingError::RootSignatureNotSet => {
                write!(f, "No graphics root signature is set")
            }
            BindingError::ParameterIndexOutOfRange {
                parameter_index,
                number_of_parameters,
            } => write!(
                f,
                "Root parameter index {parameter_index} is out of range (signature has {number_of_parameters} parameters)"
            ),
            BindingError::NotADescriptorTable { parameter_index } => {
                write!(f, "Root parameter {parameter_index} is not a descriptor table")
            }
            BindingError::UnsupportedRangeCount {
                parameter_index,
                number_of_ranges,
            } => write!(
                f,
                "Root parameter {parameter_index} declares {number_of_ranges} descriptor ranges, only one range per table is supported"
            ),
            BindingError::RangeTypeMismatch {
                parameter_index,
                range_type,
                resource_type,
            } => write!(
                f,
                "Cannot bind a {resource_type} to root parameter {parameter_index} declared as {range_type:?}"
            ),
            BindingError::UnresolvedParameter { parameter_index } => write!(
                f,
                "Root parameter {parameter_index} has no native binding location in the bound program"
            ),
            BindingError::NoIndexBuffer => {
                write!(f, "Indexed draw without a vertex array holding an index buffer")
            }
            BindingError::LanguageMismatch { expected, found } => write!(
                f,
                "Shader language mismatch: expected '{expected}', found '{found}'"
            ),
            BindingError::StageMismatch { expected, found } => {
                write!(f, "Expected a {expected:?} shader, found a {found}")
            }
        }
    }
}

impl std::error::Error for BindingError {}

/// An operation the active back end or hardware does not support.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// The shader stage does not exist on this back end.
    StageNotSupported {
        /// The missing stage.
        stage: ShaderStage,
        /// Name of the back end.
        backend: &'static str,
    },
    /// A feature is missing from this back end.
    FeatureNotSupported {
        /// Short name of the feature.
        feature: &'static str,
        /// Name of the back end.
        backend: &'static str,
    },
    /// More simultaneous render targets were requested than supported.
    TooManyRenderTargets {
        /// Requested color attachments.
        requested: u32,
        /// Supported color attachments.
        maximum: u32,
    },
}

impl fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityError::StageNotSupported { stage, backend } => {
                write!(f, "{backend} has no {stage:?} shader stage support")
            }
            CapabilityError::FeatureNotSupported { feature, backend } => {
                write!(f, "{backend} does not support {feature}")
            }
            CapabilityError::TooManyRenderTargets { requested, maximum } => write!(
                f,
                "{requested} render targets requested, at most {maximum} are supported"
            ),
        }
    }
}

impl std::error::Error for CapabilityError {}

/// A command packet that cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The dispatch index does not name a known operation.
    UnknownCommand {
        /// The raw dispatch index.
        command_id: u32,
        /// Byte offset of the packet.
        offset: u32,
    },
    /// The argument or auxiliary region is shorter than the operation requires.
    Truncated {
        /// The operation.
        command: CommandId,
        /// Bytes required.
        expected: usize,
        /// Bytes present.
        found: usize,
    },
    /// A packet header or payload reaches past the end of the command buffer.
    MalformedPacket {
        /// Byte offset of the packet.
        offset: u32,
        /// Bytes the packet claims.
        expected: usize,
        /// Bytes left in the buffer.
        found: usize,
    },
    /// A packet links to a next packet that does not follow it.
    BrokenChain {
        /// Byte offset of the packet.
        offset: u32,
        /// The offending next offset.
        next_offset: u32,
    },
    /// An argument holds a value outside its domain.
    InvalidArgument {
        /// The operation.
        command: CommandId,
        /// What is wrong.
        details: &'static str,
    },
}

impl CommandError {
    /// Byte offset of the packet the error was found in, when it is tied to one.
    pub fn offset(&self) -> Option<u32> {
        match self {
            CommandError::UnknownCommand { offset, .. }
            | CommandError::MalformedPacket { offset, .. }
            | CommandError::BrokenChain { offset, .. } => Some(*offset),
            CommandError::Truncated { .. } | CommandError::InvalidArgument { .. } => None,
        }
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::UnknownCommand { command_id, offset } => write!(
                f,
                "Unknown dispatch index {command_id} in packet at offset {offset}"
            ),
            CommandError::Truncated {
                command,
                expected,
                found,
            } => write!(
                f,
                "{command:?} packet needs {expected} bytes, only {found} are present"
            ),
            CommandError::MalformedPacket {
                offset,
                expected,
                found,
            } => write!(
                f,
                "Packet at offset {offset} needs {expected} bytes, only {found} are left"
            ),
            CommandError::BrokenChain {
                offset,
                next_offset,
            } => write!(
                f,
                "Packet at offset {offset} links backwards to offset {next_offset}"
            ),
            CommandError::InvalidArgument { command, details } => {
                write!(f, "Invalid {command:?} argument: {details}")
            }
        }
    }
}

impl std::error::Error for CommandError {}

/// A high-level error returned by every renderer entry point.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// An operation was attempted on a renderer whose native context failed to initialize.
    NotInitialized,
    /// A failure occurred during the initialization of the graphics back end.
    InitializationFailed(String),
    /// Lifetime, ownership or content error of a resource.
    Resource(ResourceError),
    /// Malformed root signature usage.
    Binding(BindingError),
    /// Missing back end or hardware capability.
    Capability(CapabilityError),
    /// Undecodable command packet.
    Command(CommandError),
}

impl RenderError {
    /// A short category name used in diagnostics.
    pub fn category(&self) -> &'static str {
        match self {
            RenderError::NotInitialized | RenderError::InitializationFailed(_) => "initialization",
            RenderError::Resource(ResourceError::OwnershipMismatch { .. }) => "ownership",
            RenderError::Resource(_) => "resource",
            RenderError::Binding(_) => "validation",
            RenderError::Capability(_) => "capability",
            RenderError::Command(_) => "command",
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NotInitialized => {
                write!(f, "The renderer is not initialized.")
            }
            RenderError::InitializationFailed(msg) => {
                write!(f, "Failed to initialize graphics backend: {msg}")
            }
            RenderError::Resource(err) => write!(f, "Resource error: {err}"),
            RenderError::Binding(err) => write!(f, "Binding error: {err}"),
            RenderError::Capability(err) => write!(f, "Capability error: {err}"),
            RenderError::Command(err) => write!(f, "Command error: {err}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Resource(err) => Some(err),
            RenderError::Binding(err) => Some(err),
            RenderError::Capability(err) => Some(err),
            RenderError::Command(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ResourceError> for RenderError {
    fn from(err: ResourceError) -> Self {
        RenderError::Resource(err)
    }
}

impl From<BindingError> for RenderError {
    fn from(err: BindingError) -> Self {
        RenderError::Binding(err)
    }
}

impl From<CapabilityError> for RenderError {
    fn from(err: CapabilityError) -> Self {
        RenderError::Capability(err)
    }
}

impl From<CommandError> for RenderError {
    fn from(err: CommandError) -> Self {
        RenderError::Command(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn ownership_mismatch_display_names_both_renderers() {
        let handle = ResourceHandle::new(4, RendererId(1));
        let err = ResourceError::OwnershipMismatch {
            handle,
            renderer: RendererId(2),
        };
        assert_eq!(
            format!("{err}"),
            "Resource ResourceHandle(4@1) is owned by renderer#1 and cannot be used with renderer#2"
        );
    }

    #[test]
    fn render_error_wraps_binding_error() {
        let err: RenderError = BindingError::RootSignatureNotSet.into();
        assert_eq!(
            format!("{err}"),
            "Binding error: No graphics root signature is set"
        );
        assert!(err.source().is_some());
        assert_eq!(err.category(), "validation");
    }

    #[test]
    fn capability_error_display() {
        let err = CapabilityError::StageNotSupported {
            stage: ShaderStage::Geometry,
            backend: "OpenGLES3",
        };
        assert_eq!(format!("{err}"), "OpenGLES3 has no Geometry shader stage support");
        let render_err: RenderError = err.into();
        assert_eq!(render_err.category(), "capability");
    }
}
