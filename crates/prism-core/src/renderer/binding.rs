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

//! Translation of root parameters into back end binding locations.
//!
//! A program resolves every descriptor-table parameter of its root signature once,
//! at link time, into a native location (a uniform location, a uniform block index,
//! a texture unit). Binding a descriptor table later only looks the location up.

use crate::renderer::api::resource::{ResourceHandle, ResourceType};
use crate::renderer::api::root_signature::{
    DescriptorRange, DescriptorRangeType, RootParameter, RootSignatureDescriptor,
};
use crate::renderer::capabilities::Capabilities;
use crate::renderer::error::{BindingError, RenderError, ResourceError};
use crate::renderer::resource::{OwnsReferences, ResourceBase, ResourceRegistry};

/// The cached `parameter index -> native location` mapping of one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootParameterBindings<L> {
    locations: Vec<Option<L>>,
}

impl<L> Default for RootParameterBindings<L> {
    fn default() -> Self {
        Self {
            locations: Vec::new(),
        }
    }
}

impl<L: Copy> RootParameterBindings<L> {
    /// Walks every descriptor table of `signature` and resolves its range with
    /// `resolve`.
    ///
    /// Sampler ranges are skipped: sampler states are combined with the texture they
    /// apply to and need no location of their own. Tables holding more than one range
    /// are skipped too, they can never be bound. A range the program does not use
    /// resolves to `None`.
    pub fn resolve<F>(signature: &RootSignatureDescriptor, mut resolve: F) -> Self
    where
        F: FnMut(u32, &DescriptorRange) -> Option<L>,
    {
        let locations = signature
            .parameters
            .iter()
            .enumerate()
            .map(|(index, parameter)| match parameter {
                RootParameter::DescriptorTable { ranges, .. } => match ranges.as_slice() {
                    [range] if range.range_type != DescriptorRangeType::Sampler => {
                        resolve(index as u32, range)
                    }
                    _ => None,
                },
                RootParameter::Constants { .. } => None,
            })
            .collect();
        Self { locations }
    }

    /// The native location of a parameter, if the program uses it.
    pub fn location(&self, parameter_index: u32) -> Option<L> {
        self.locations
            .get(parameter_index as usize)
            .copied()
            .flatten()
    }

    /// Number of parameters the bindings were resolved for.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Returns `true` if the signature had no parameter.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Every resolved `(parameter index, location)` pair.
    pub fn iter(&self) -> impl Iterator<Item = (u32, L)> + '_ {
        self.locations
            .iter()
            .enumerate()
            .filter_map(|(index, location)| location.map(|location| (index as u32, location)))
    }
}

/// Fails unless a resource of `resource_type` may be bound to `range`.
pub fn check_range_type(
    parameter_index: u32,
    range: &DescriptorRange,
    resource_type: ResourceType,
) -> Result<(), BindingError> {
    if range.range_type.accepts(resource_type) {
        Ok(())
    } else {
        Err(BindingError::RangeTypeMismatch {
            parameter_index,
            range_type: range.range_type,
            resource_type,
        })
    }
}

/// Resolves the descriptor table at `parameter_index` for a bind.
///
/// Fails unless the parameter is a single-range table and at least one stage it is
/// visible to exists on the back end. The resource type is checked afterwards with
/// [`check_range_type`], once the resource itself was validated.
pub fn validate_descriptor_table<'a>(
    signature: &'a RootSignatureDescriptor,
    parameter_index: u32,
    capabilities: &Capabilities,
    backend: &'static str,
) -> Result<&'a DescriptorRange, RenderError> {
    let (range, visibility) = signature.descriptor_table_range(parameter_index)?;
    capabilities.require_visibility(visibility, backend)?;
    Ok(range)
}

/// Sampler states bound through sampler ranges, cached on their root signature.
///
/// Every cached sampler holds one reference, released when it is replaced or when
/// the root signature is destroyed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SamplerTable {
    samplers: Vec<Option<ResourceHandle>>,
}

impl SamplerTable {
    /// An empty table with one slot per root parameter.
    pub fn new(number_of_parameters: usize) -> Self {
        Self {
            samplers: vec![None; number_of_parameters],
        }
    }

    /// The sampler cached for a parameter.
    pub fn get(&self, parameter_index: u32) -> Option<ResourceHandle> {
        self.samplers
            .get(parameter_index as usize)
            .copied()
            .flatten()
    }

    /// Stores `sampler` for a parameter and returns the previous one, or `None` when
    /// the table has no such parameter. The caller retains `sampler` once stored and
    /// must release the returned handle.
    pub fn replace(
        &mut self,
        parameter_index: u32,
        sampler: Option<ResourceHandle>,
    ) -> Option<Option<ResourceHandle>> {
        let slot = self.samplers.get_mut(parameter_index as usize)?;
        Some(std::mem::replace(slot, sampler))
    }

    /// Every cached sampler.
    pub fn handles(&self) -> impl Iterator<Item = ResourceHandle> + '_ {
        self.samplers.iter().flatten().copied()
    }
}

/// Caches `sampler` (`None` clears) for a sampler parameter of a root signature.
///
/// The new sampler is retained once it is stored, before the previous one is
/// released. `table` extracts the sampler cache from the root signature payload;
/// without a cache or a matching slot nothing is retained. `destroy` receives the
/// previous sampler if this was its last reference.
pub fn bind_sampler_state<T, F, D>(
    registry: &mut ResourceRegistry<T>,
    root_signature: ResourceHandle,
    parameter_index: u32,
    sampler: Option<ResourceHandle>,
    table: F,
    destroy: D,
) -> Result<(), ResourceError>
where
    T: OwnsReferences,
    F: FnOnce(&mut T) -> Option<&mut SamplerTable>,
    D: FnMut(ResourceBase, T),
{
    registry.get(root_signature)?;
    if let Some(sampler) = sampler {
        registry.get(sampler)?;
    }
    let Some(previous) = registry
        .get_mut(root_signature)
        .ok()
        .and_then(|entry| table(&mut entry.payload))
        .and_then(|samplers| samplers.replace(parameter_index, sampler))
    else {
        return Ok(());
    };
    if let Some(sampler) = sampler {
        registry.add_reference(sampler)?;
    }
    if let Some(previous) = previous {
        registry.release_with(previous, destroy)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::resource::RendererId;
    use crate::renderer::api::root_signature::ShaderVisibility;
    use crate::renderer::api::shader::ShaderStage;
    use crate::renderer::error::CapabilityError;

    fn signature() -> RootSignatureDescriptor {
        RootSignatureDescriptor::new(vec![
            RootParameter::table(
                DescriptorRange::new(DescriptorRangeType::UniformBuffer, 0, "UniformBlock"),
                ShaderVisibility::VERTEX,
            ),
            RootParameter::table(
                DescriptorRange::new(DescriptorRangeType::Texture, 2, "AlbedoMap").with_sampler(2),
                ShaderVisibility::FRAGMENT,
            ),
            RootParameter::table(
                DescriptorRange::new(DescriptorRangeType::Sampler, 0, "SamplerState"),
                ShaderVisibility::FRAGMENT,
            ),
            RootParameter::table(
                DescriptorRange::new(DescriptorRangeType::Texture, 3, "Unused"),
                ShaderVisibility::FRAGMENT,
            ),
        ])
    }

    #[test]
    fn resolution_skips_samplers_and_unused_ranges() {
        let mut visited = Vec::new();
        let bindings = RootParameterBindings::resolve(&signature(), |index, range| {
            visited.push(index);
            (range.base_shader_register_name != "Unused").then_some(index as i32 * 10)
        });
        assert_eq!(visited, vec![0, 1, 3]);
        assert_eq!(bindings.len(), 4);
        assert_eq!(bindings.location(0), Some(0));
        assert_eq!(bindings.location(1), Some(10));
        assert_eq!(bindings.location(2), None);
        assert_eq!(bindings.location(3), None);
        assert_eq!(bindings.location(42), None);
        assert_eq!(bindings.iter().collect::<Vec<_>>(), vec![(0, 0), (1, 10)]);
    }

    #[test]
    fn range_type_mismatch_is_reported() {
        let range = DescriptorRange::new(DescriptorRangeType::UniformBuffer, 0, "UniformBlock");
        assert_eq!(
            check_range_type(4, &range, ResourceType::Texture2D),
            Err(BindingError::RangeTypeMismatch {
                parameter_index: 4,
                range_type: DescriptorRangeType::UniformBuffer,
                resource_type: ResourceType::Texture2D,
            })
        );
        assert!(check_range_type(4, &range, ResourceType::UniformBuffer).is_ok());
    }

    #[test]
    fn descriptor_table_validation() {
        let mut signature = signature();
        signature.parameters.push(RootParameter::table(
            DescriptorRange::new(DescriptorRangeType::UniformBuffer, 1, "HullConstants"),
            ShaderVisibility::TESSELLATION_CONTROL,
        ));
        let mut capabilities = Capabilities::full("test");
        capabilities.tessellation_shaders = false;

        let range = validate_descriptor_table(&signature, 1, &capabilities, "test").unwrap();
        assert_eq!(range.base_shader_register, 2);

        assert_eq!(
            validate_descriptor_table(&signature, 4, &capabilities, "test"),
            Err(RenderError::Capability(CapabilityError::StageNotSupported {
                stage: ShaderStage::TessellationControl,
                backend: "test",
            }))
        );
        assert!(matches!(
            validate_descriptor_table(&signature, 9, &capabilities, "test"),
            Err(RenderError::Binding(BindingError::ParameterIndexOutOfRange { .. }))
        ));

        capabilities.tessellation_shaders = true;
        assert!(validate_descriptor_table(&signature, 4, &capabilities, "test").is_ok());
    }

    #[test]
    fn sampler_table_replaces_per_parameter() {
        let mut table = SamplerTable::new(3);
        let a = ResourceHandle::new(1, RendererId(1));
        let b = ResourceHandle::new(2, RendererId(1));
        assert_eq!(table.replace(2, Some(a)), Some(None));
        assert_eq!(table.replace(2, Some(b)), Some(Some(a)));
        assert_eq!(table.get(2), Some(b));
        assert_eq!(table.replace(7, Some(a)), None);
        assert_eq!(table.handles().collect::<Vec<_>>(), vec![b]);
    }

    struct Signature(SamplerTable);

    impl OwnsReferences for Signature {
        fn owned_references(&self) -> Vec<ResourceHandle> {
            self.0.handles().collect()
        }
    }

    #[test]
    fn sampler_states_are_retained_by_their_root_signature() {
        let mut registry = ResourceRegistry::new(RendererId(1));
        let signature = registry
            .insert(ResourceType::RootSignature, Signature(SamplerTable::new(2)))
            .unwrap();
        let linear = registry
            .insert(ResourceType::SamplerState, Signature(SamplerTable::default()))
            .unwrap();
        let point = registry
            .insert(ResourceType::SamplerState, Signature(SamplerTable::default()))
            .unwrap();
        fn table(payload: &mut Signature) -> Option<&mut SamplerTable> {
            Some(&mut payload.0)
        }

        bind_sampler_state(&mut registry, signature, 1, Some(linear), table, |_, _| {}).unwrap();
        assert_eq!(registry.reference_count(linear), Ok(2));

        bind_sampler_state(&mut registry, signature, 1, Some(linear), table, |_, _| {}).unwrap();
        assert_eq!(registry.reference_count(linear), Ok(2));

        bind_sampler_state(&mut registry, signature, 1, Some(point), table, |_, _| {}).unwrap();
        assert_eq!(registry.reference_count(linear), Ok(1));
        assert_eq!(registry.reference_count(point), Ok(2));

        registry.release(point).unwrap();
        assert_eq!(registry.release(signature), Ok(0));
        assert_eq!(
            registry.reference_count(point),
            Err(ResourceError::NotFound { handle: point })
        );
    }

    #[test]
    fn test_sampler_is_not_retained_without_a_table_slot() {
        // --- 1. ARRANGE ---
        let mut registry = ResourceRegistry::new(RendererId(1));
        let signature = registry
            .insert(ResourceType::RootSignature, Signature(SamplerTable::new(1)))
            .unwrap();
        let sampler = registry
            .insert(ResourceType::SamplerState, Signature(SamplerTable::default()))
            .unwrap();
        fn no_table(_: &mut Signature) -> Option<&mut SamplerTable> {
            None
        }
        fn table(payload: &mut Signature) -> Option<&mut SamplerTable> {
            Some(&mut payload.0)
        }

        // --- 2. ACT ---
        let without_table = bind_sampler_state(
            &mut registry,
            signature,
            0,
            Some(sampler),
            no_table,
            |_, _| {},
        );
        let without_slot = bind_sampler_state(
            &mut registry,
            signature,
            4,
            Some(sampler),
            table,
            |_, _| {},
        );

        // --- 3. ASSERT ---
        assert_eq!(without_table, Ok(()));
        assert_eq!(without_slot, Ok(()));
        assert_eq!(
            registry.reference_count(sampler),
            Ok(1),
            "A sampler that was not stored must not gain a reference"
        );
        assert_eq!(
            registry.release(sampler),
            Ok(0),
            "The creator should hold the last reference"
        );
    }
}
