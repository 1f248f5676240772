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

//! The reference-counted resource lifetime model shared by every back end.
//!
//! Every resource lives in the [`ResourceRegistry`] of the renderer that created it.
//! A resource starts with a reference count of one; each additional owner (a bound
//! slot, a pipeline state holding its program, a framebuffer holding its
//! attachments) adds a reference, and the native object is destroyed exactly when
//! the count reaches zero.

mod registry;
mod slot;
mod statistics;

pub use self::registry::*;
pub use self::slot::*;
pub use self::statistics::*;

use crate::renderer::api::resource::{ResourceHandle, ResourceType};

/// The part of a resource shared by every kind and every back end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceBase {
    /// Stable identity of the resource, tagged with its owning renderer.
    pub handle: ResourceHandle,
    /// The kind of resource.
    pub resource_type: ResourceType,
    /// Number of owners.
    pub reference_count: u32,
}

/// Implemented by resource payloads that hold references on other resources.
///
/// When the payload is destroyed the registry releases every returned handle,
/// which may cascade into further destructions.
pub trait OwnsReferences {
    /// Handles this resource holds one reference each on.
    fn owned_references(&self) -> Vec<ResourceHandle> {
        Vec::new()
    }
}

impl OwnsReferences for () {}
