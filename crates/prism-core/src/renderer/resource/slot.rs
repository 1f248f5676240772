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

use super::{OwnsReferences, ResourceBase, ResourceRegistry};
use crate::renderer::api::resource::ResourceHandle;
use crate::renderer::error::ResourceError;

/// A piece of bound renderer state holding one reference on its resource.
///
/// Rebinding follows the swap-reference discipline: the new resource is retained
/// before the previous one is released, so rebinding the resource that is already
/// bound never drops its count to zero, even transiently.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BoundSlot {
    handle: Option<ResourceHandle>,
}

impl BoundSlot {
    /// An empty slot.
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// The bound resource, if any.
    pub fn get(&self) -> Option<ResourceHandle> {
        self.handle
    }

    /// Returns `true` if `handle` is the bound resource.
    pub fn is(&self, handle: ResourceHandle) -> bool {
        self.handle == Some(handle)
    }

    /// Binds `handle` (or unbinds with `None`).
    ///
    /// Returns `Ok(false)` without touching any reference count if `handle` is
    /// already bound. On error nothing changes.
    pub fn set<T, F>(
        &mut self,
        registry: &mut ResourceRegistry<T>,
        handle: Option<ResourceHandle>,
        destroy: F,
    ) -> Result<bool, ResourceError>
    where
        T: OwnsReferences,
        F: FnMut(ResourceBase, T),
    {
        if self.handle == handle {
            return Ok(false);
        }
        if let Some(new) = handle {
            registry.add_reference(new)?;
        }
        if let Some(previous) = std::mem::replace(&mut self.handle, handle) {
            if let Err(err) = registry.release_with(previous, destroy) {
                log::warn!("Failed to release previously bound {previous:?}: {err}");
            }
        }
        Ok(true)
    }

    /// Empties the slot and hands its reference to the caller.
    pub fn take(&mut self) -> Option<ResourceHandle> {
        self.handle.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::resource::{RendererId, ResourceType};

    #[test]
    fn rebinding_the_same_resource_keeps_its_count() {
        let mut registry = ResourceRegistry::<()>::new(RendererId::next());
        let handle = registry.insert(ResourceType::PipelineState, ()).unwrap();
        let mut slot = BoundSlot::new();

        assert_eq!(slot.set(&mut registry, Some(handle), |_, _| {}), Ok(true));
        let after_first = registry.reference_count(handle).unwrap();
        assert_eq!(slot.set(&mut registry, Some(handle), |_, _| {}), Ok(false));
        assert_eq!(registry.reference_count(handle).unwrap(), after_first);
        assert_eq!(after_first, 2);
    }

    #[test]
    fn swapping_releases_the_previous_resource() {
        let mut registry = ResourceRegistry::<()>::new(RendererId::next());
        let a = registry.insert(ResourceType::VertexArray, ()).unwrap();
        let b = registry.insert(ResourceType::VertexArray, ()).unwrap();
        let mut slot = BoundSlot::new();

        slot.set(&mut registry, Some(a), |_, _| {}).unwrap();
        registry.release(a).unwrap();
        assert_eq!(registry.reference_count(a), Ok(1));

        let mut destroyed = Vec::new();
        slot.set(&mut registry, Some(b), |base, _| destroyed.push(base.handle))
            .unwrap();
        assert_eq!(destroyed, vec![a]);
        assert!(slot.is(b));

        slot.set(&mut registry, None, |_, _| {}).unwrap();
        assert_eq!(slot.get(), None);
        assert_eq!(registry.reference_count(b), Ok(1));
    }

    #[test]
    fn failed_bind_leaves_the_slot_untouched() {
        let mut registry = ResourceRegistry::<()>::new(RendererId::next());
        let a = registry.insert(ResourceType::Framebuffer, ()).unwrap();
        let mut slot = BoundSlot::new();
        slot.set(&mut registry, Some(a), |_, _| {}).unwrap();

        let stale = ResourceHandle::new(77, registry.renderer_id());
        assert!(slot.set(&mut registry, Some(stale), |_, _| {}).is_err());
        assert!(slot.is(a));
        assert_eq!(registry.reference_count(a), Ok(2));
    }
}
