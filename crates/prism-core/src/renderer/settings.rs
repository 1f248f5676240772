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

//! Renderer configuration loaded from RON.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The native graphics back end a renderer is created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BackendKind {
    /// No-op back end used for testing and command validation.
    #[default]
    Null,
    /// Desktop OpenGL, core profile.
    OpenGl,
    /// OpenGL ES 3.x.
    OpenGles3,
    /// OpenGL ES 2.0.
    OpenGles2,
}

impl BackendKind {
    /// Every back end kind, in declaration order.
    pub const ALL: [BackendKind; 4] = [
        BackendKind::Null,
        BackendKind::OpenGl,
        BackendKind::OpenGles3,
        BackendKind::OpenGles2,
    ];

    /// Human readable name, also used as the renderer name.
    pub const fn name(self) -> &'static str {
        match self {
            BackendKind::Null => "Null",
            BackendKind::OpenGl => "OpenGL",
            BackendKind::OpenGles3 => "OpenGLES3",
            BackendKind::OpenGles2 => "OpenGLES2",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Settings a renderer is constructed with.
///
/// Hardware capabilities are not part of the settings: they are queried once from
/// the native context when the renderer is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    /// The back end to create.
    pub backend: BackendKind,
    /// When `false`, debug marker and debug event commands are accepted and ignored.
    pub debug_markers: bool,
    /// Whether dropping the renderer logs the resources that are still alive.
    pub report_leaks: bool,
    /// Initial byte capacity of command buffers created with
    /// [`CommandBuffer::with_settings`](crate::renderer::CommandBuffer::with_settings).
    pub command_buffer_capacity: usize,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            backend: BackendKind::Null,
            debug_markers: true,
            report_leaks: true,
            command_buffer_capacity: 4096,
        }
    }
}

impl RendererSettings {
    /// Parses settings from a RON document. Missing fields keep their default value.
    pub fn from_ron_str(source: &str) -> Result<Self, SettingsError> {
        ron::from_str(source).map_err(|e| SettingsError::InvalidFormat(e.to_string()))
    }

    /// Serializes the settings to pretty-printed RON.
    pub fn to_ron_string(&self) -> Result<String, SettingsError> {
        let pretty_config = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        ron::ser::to_string_pretty(self, pretty_config)
            .map_err(|e| SettingsError::SerializationFailed(e.to_string()))
    }
}

/// An error raised while reading or writing [`RendererSettings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// The document is not valid RON or does not describe renderer settings.
    InvalidFormat(String),
    /// The settings could not be written.
    SerializationFailed(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::InvalidFormat(msg) => write!(f, "Invalid renderer settings: {msg}"),
            SettingsError::SerializationFailed(msg) => {
                write!(f, "Failed to serialize renderer settings: {msg}")
            }
        }
    }
}

impl std::error::Error for SettingsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_keeps_defaults() {
        let settings = RendererSettings::from_ron_str("(backend: OpenGles2, report_leaks: false)")
            .expect("valid settings");
        assert_eq!(settings.backend, BackendKind::OpenGles2);
        assert!(!settings.report_leaks);
        assert!(settings.debug_markers);
        assert_eq!(settings.command_buffer_capacity, 4096);
    }

    #[test]
    fn settings_survive_serialization() {
        let settings = RendererSettings {
            backend: BackendKind::OpenGl,
            debug_markers: false,
            report_leaks: true,
            command_buffer_capacity: 128,
        };
        let text = settings.to_ron_string().expect("serializable");
        assert_eq!(RendererSettings::from_ron_str(&text), Ok(settings));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let result = RendererSettings::from_ron_str("(backend: Vulkan)");
        assert!(matches!(result, Err(SettingsError::InvalidFormat(_))));
    }
}
