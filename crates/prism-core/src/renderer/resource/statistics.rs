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

use super::ResourceBase;
use crate::renderer::api::resource::{ResourceHandle, ResourceType};
use std::fmt;

/// Per-type counters of alive and created resources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceStatistics {
    alive: [u32; ResourceType::ALL.len()],
    created: [u64; ResourceType::ALL.len()],
}

impl ResourceStatistics {
    /// Counts a newly created resource.
    pub fn record_created(&mut self, resource_type: ResourceType) {
        self.alive[resource_type.index()] += 1;
        self.created[resource_type.index()] += 1;
    }

    /// Counts a destroyed resource.
    pub fn record_destroyed(&mut self, resource_type: ResourceType) {
        let alive = &mut self.alive[resource_type.index()];
        *alive = alive.saturating_sub(1);
    }

    /// Number of alive resources of `resource_type`.
    pub fn alive(&self, resource_type: ResourceType) -> u32 {
        self.alive[resource_type.index()]
    }

    /// Number of resources of `resource_type` created so far.
    pub fn created(&self, resource_type: ResourceType) -> u64 {
        self.created[resource_type.index()]
    }

    /// Number of alive resources of every type.
    pub fn total_alive(&self) -> u32 {
        self.alive.iter().sum()
    }

    /// Number of resources created so far.
    pub fn total_created(&self) -> u64 {
        self.created.iter().sum()
    }
}

/// Resources still alive when a renderer is torn down.
///
/// Leaked resources are reported, never destroyed: whoever still owns a reference
/// has to release it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeakReport {
    leaked: Vec<ResourceBase>,
}

impl LeakReport {
    /// Builds a report from the bases of the surviving resources.
    pub fn new(leaked: impl IntoIterator<Item = ResourceBase>) -> Self {
        let mut leaked: Vec<_> = leaked.into_iter().collect();
        leaked.sort_by_key(|base| base.handle.id());
        Self { leaked }
    }

    /// Number of leaked resources.
    pub fn count(&self) -> usize {
        self.leaked.len()
    }

    /// Returns `true` when nothing leaked.
    pub fn is_empty(&self) -> bool {
        self.leaked.is_empty()
    }

    /// The leaked resources, oldest first.
    pub fn resources(&self) -> &[ResourceBase] {
        &self.leaked
    }

    /// Returns `true` if `handle` is part of the report.
    pub fn contains(&self, handle: ResourceHandle) -> bool {
        self.leaked.iter().any(|base| base.handle == handle)
    }

    /// Number of leaked resources per type, for types with at least one leak.
    pub fn per_type(&self) -> Vec<(ResourceType, usize)> {
        ResourceType::ALL
            .iter()
            .filter_map(|&resource_type| {
                let count = self
                    .leaked
                    .iter()
                    .filter(|base| base.resource_type == resource_type)
                    .count();
                (count > 0).then_some((resource_type, count))
            })
            .collect()
    }

    /// Logs the report as an error, together with the per-type breakdown.
    pub fn log(&self, renderer_name: &str) {
        if self.is_empty() {
            return;
        }
        log::error!("{renderer_name}: {self}");
        for (resource_type, count) in self.per_type() {
            log::error!("  {count} x {resource_type}");
        }
    }
}

impl fmt::Display for LeakReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.count() {
            0 => write!(f, "No resource instance is still alive"),
            1 => write!(f, "1 resource instance is still alive"),
            n => write!(f, "{n} resource instances are still alive"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::resource::RendererId;

    fn base(id: u32, resource_type: ResourceType) -> ResourceBase {
        ResourceBase {
            handle: ResourceHandle::new(id, RendererId(1)),
            resource_type,
            reference_count: 1,
        }
    }

    #[test]
    fn leak_message_uses_singular_and_plural() {
        let single = LeakReport::new([base(1, ResourceType::Texture2D)]);
        assert_eq!(single.to_string(), "1 resource instance is still alive");

        let several = LeakReport::new([
            base(3, ResourceType::Texture2D),
            base(1, ResourceType::Texture2D),
            base(2, ResourceType::Program),
        ]);
        assert_eq!(several.to_string(), "3 resource instances are still alive");
        assert_eq!(
            several.per_type(),
            vec![(ResourceType::Texture2D, 2), (ResourceType::Program, 1)]
        );
        assert_eq!(several.resources()[0].handle.id(), 1);
    }

    #[test]
    fn statistics_track_alive_and_created() {
        let mut statistics = ResourceStatistics::default();
        statistics.record_created(ResourceType::IndexBuffer);
        statistics.record_created(ResourceType::IndexBuffer);
        statistics.record_destroyed(ResourceType::IndexBuffer);
        assert_eq!(statistics.alive(ResourceType::IndexBuffer), 1);
        assert_eq!(statistics.created(ResourceType::IndexBuffer), 2);
        assert_eq!(statistics.total_alive(), 1);
        assert_eq!(statistics.total_created(), 2);
    }
}
