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

use super::{LeakReport, OwnsReferences, ResourceBase, ResourceStatistics};
use crate::renderer::api::resource::{RendererId, ResourceHandle, ResourceType};
use crate::renderer::error::ResourceError;
use std::collections::HashMap;

/// One live resource: the shared base plus the back end payload.
#[derive(Debug)]
pub struct ResourceEntry<T> {
    /// Identity, type and reference count.
    pub base: ResourceBase,
    /// Back end data (native object names, shadow copies, retained handles).
    pub payload: T,
}

/// The per-renderer table of live resources.
///
/// Ids start at one and are never reused, so a handle kept past the destruction of
/// its resource fails to resolve instead of aliasing a newer resource.
#[derive(Debug)]
pub struct ResourceRegistry<T> {
    renderer: RendererId,
    next_id: u32,
    entries: HashMap<u32, ResourceEntry<T>>,
    statistics: ResourceStatistics,
}

impl<T: OwnsReferences> ResourceRegistry<T> {
    /// Creates an empty registry for the given renderer.
    pub fn new(renderer: RendererId) -> Self {
        Self {
            renderer,
            next_id: 1,
            entries: HashMap::new(),
            statistics: ResourceStatistics::default(),
        }
    }

    /// The renderer owning every resource of this registry.
    pub fn renderer_id(&self) -> RendererId {
        self.renderer
    }

    /// Number of live resources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no resource is alive.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Per-type counters of alive and created resources.
    pub fn statistics(&self) -> &ResourceStatistics {
        &self.statistics
    }

    /// Registers a new resource with a reference count of one.
    pub fn insert(
        &mut self,
        resource_type: ResourceType,
        payload: T,
    ) -> Result<ResourceHandle, ResourceError> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or_else(|| {
            ResourceError::BackendError("resource id space exhausted".to_string())
        })?;

        let handle = ResourceHandle::new(id, self.renderer);
        self.entries.insert(
            id,
            ResourceEntry {
                base: ResourceBase {
                    handle,
                    resource_type,
                    reference_count: 1,
                },
                payload,
            },
        );
        self.statistics.record_created(resource_type);
        log::trace!("Created {resource_type} {handle:?}");
        Ok(handle)
    }

    /// Fails with [`ResourceError::OwnershipMismatch`] if `handle` was created by
    /// another renderer.
    pub fn check_owner(&self, handle: ResourceHandle) -> Result<(), ResourceError> {
        if handle.renderer() == self.renderer {
            Ok(())
        } else {
            Err(ResourceError::OwnershipMismatch {
                handle,
                renderer: self.renderer,
            })
        }
    }

    /// Resolves a handle after checking ownership then existence.
    pub fn get(&self, handle: ResourceHandle) -> Result<&ResourceEntry<T>, ResourceError> {
        self.check_owner(handle)?;
        self.entries
            .get(&handle.id())
            .ok_or(ResourceError::NotFound { handle })
    }

    /// Mutable variant of [`get`](Self::get).
    pub fn get_mut(
        &mut self,
        handle: ResourceHandle,
    ) -> Result<&mut ResourceEntry<T>, ResourceError> {
        self.check_owner(handle)?;
        self.entries
            .get_mut(&handle.id())
            .ok_or(ResourceError::NotFound { handle })
    }

    /// Resolves a handle and checks, in order, ownership, existence and that its type
    /// is one of `accepted`.
    pub fn validate(
        &self,
        handle: ResourceHandle,
        accepted: &'static [ResourceType],
    ) -> Result<&ResourceEntry<T>, ResourceError> {
        let entry = self.get(handle)?;
        check_type(&entry.base, accepted)?;
        Ok(entry)
    }

    /// Mutable variant of [`validate`](Self::validate).
    pub fn validate_mut(
        &mut self,
        handle: ResourceHandle,
        accepted: &'static [ResourceType],
    ) -> Result<&mut ResourceEntry<T>, ResourceError> {
        let entry = self.get_mut(handle)?;
        check_type(&entry.base, accepted)?;
        Ok(entry)
    }

    /// The type tag of a live resource.
    pub fn resource_type(&self, handle: ResourceHandle) -> Result<ResourceType, ResourceError> {
        self.get(handle).map(|entry| entry.base.resource_type)
    }

    /// The current reference count of a live resource.
    pub fn reference_count(&self, handle: ResourceHandle) -> Result<u32, ResourceError> {
        self.get(handle).map(|entry| entry.base.reference_count)
    }

    /// Adds an owner and returns the new reference count.
    pub fn add_reference(&mut self, handle: ResourceHandle) -> Result<u32, ResourceError> {
        let entry = self.get_mut(handle)?;
        entry.base.reference_count += 1;
        Ok(entry.base.reference_count)
    }

    /// Removes an owner without destroy callback. See [`release_with`](Self::release_with).
    pub fn release(&mut self, handle: ResourceHandle) -> Result<u32, ResourceError> {
        self.release_with(handle, |_, _| {})
    }

    /// Removes an owner and returns the remaining reference count.
    ///
    /// When the count reaches zero the resource leaves the registry, `destroy` is
    /// called with it exactly once, and every reference it owned is released in
    /// turn (which may destroy those resources too, through the same callback).
    pub fn release_with<F>(
        &mut self,
        handle: ResourceHandle,
        mut destroy: F,
    ) -> Result<u32, ResourceError>
    where
        F: FnMut(ResourceBase, T),
    {
        let remaining = self.decrement(handle)?;
        if remaining > 0 {
            return Ok(remaining);
        }

        let mut pending = vec![handle];
        while let Some(dead) = pending.pop() {
            let Some(entry) = self.entries.remove(&dead.id()) else {
                continue;
            };
            self.statistics.record_destroyed(entry.base.resource_type);
            log::trace!("Destroying {} {:?}", entry.base.resource_type, dead);

            let owned = entry.payload.owned_references();
            destroy(entry.base, entry.payload);

            for child in owned {
                match self.decrement(child) {
                    Ok(0) => pending.push(child),
                    Ok(_) => {}
                    Err(err) => {
                        log::warn!("{dead:?} held an invalid reference on {child:?}: {err}")
                    }
                }
            }
        }
        Ok(0)
    }

    /// Every live resource, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &ResourceEntry<T>> {
        self.entries.values()
    }

    /// Builds the report of every resource still alive.
    pub fn leak_report(&self) -> LeakReport {
        LeakReport::new(self.entries.values().map(|entry| entry.base))
    }

    fn decrement(&mut self, handle: ResourceHandle) -> Result<u32, ResourceError> {
        let entry = self.get_mut(handle)?;
        entry.base.reference_count = entry.base.reference_count.saturating_sub(1);
        Ok(entry.base.reference_count)
    }
}

fn check_type(base: &ResourceBase, accepted: &'static [ResourceType]) -> Result<(), ResourceError> {
    if accepted.contains(&base.resource_type) {
        Ok(())
    } else {
        Err(ResourceError::UnexpectedType {
            handle: base.handle,
            found: base.resource_type,
            expected: accepted,
        })
    }
}
