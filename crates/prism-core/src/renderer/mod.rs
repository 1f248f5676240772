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

//! Provides the public, backend-agnostic rendering contracts for Prism.
//!
//! This module defines the "common language" every back end speaks. It contains
//! the abstract [`traits`] ([`Renderer`], [`CommandExecutor`]), the plain
//! description structs used to create resources, the reference-counted
//! [`resource`] registry shared by every back end, the [`binding`] model that
//! maps root signatures onto native binding locations, and the [`command`]
//! packet format that lets one recording be replayed against any back end.
//!
//! The 'how' is handled by a concrete back end in the `prism-infra` crate,
//! which implements these traits.

pub mod api;
pub mod binding;
pub mod capabilities;
pub mod command;
pub mod emulation;
pub mod error;
pub mod program;
pub mod render_target;
pub mod resource;
pub mod settings;
pub mod traits;

// Re-export the most important traits and types for easier use.
pub use self::api::*;
pub use self::capabilities::Capabilities;
pub use self::command::{CommandBuffer, CommandId, DispatchTable, Rejection, SubmissionStats};
pub use self::error::{
    BindingError, CapabilityError, CommandError, RenderError, ResourceError,
};
pub use self::resource::{LeakReport, ResourceRegistry, ResourceStatistics};
pub use self::settings::{BackendKind, RendererSettings, SettingsError};
pub use self::traits::{CommandExecutor, Renderer};
