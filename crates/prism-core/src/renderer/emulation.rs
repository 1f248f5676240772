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

//! Software emulation of indirect draws.
//!
//! Back ends without native indirect draws keep indirect buffers in system memory
//! and reinterpret their bytes, at submission time, as an array of draw argument
//! records. Each record becomes exactly one native draw, in record order.

use crate::renderer::api::draw::{DrawArguments, DrawIndexedArguments};
use crate::renderer::capabilities::Capabilities;
use crate::renderer::error::{CapabilityError, ResourceError};
use bytemuck::Pod;

/// The native draw variant a record maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NativeDraw {
    /// Draw more or fewer than one instance.
    pub instanced: bool,
    /// Add a non-zero base vertex to every index.
    pub base_vertex: bool,
    /// Start at an instance other than zero.
    pub base_instance: bool,
}

/// A draw argument record stored in indirect buffers.
pub trait DrawRecord: Pod {
    /// Size of one record in bytes.
    const SIZE_BYTES: usize;

    /// Selects the native draw variant for this record, failing if it needs a
    /// capability the back end lacks.
    fn native_draw(
        &self,
        capabilities: &Capabilities,
        backend: &'static str,
    ) -> Result<NativeDraw, CapabilityError>;
}

fn instancing(
    instance_count: u32,
    start_instance_location: u32,
    capabilities: &Capabilities,
    backend: &'static str,
) -> Result<NativeDraw, CapabilityError> {
    let instanced = instance_count != 1;
    let base_instance = start_instance_location != 0;
    if instanced {
        Capabilities::require(capabilities.instanced_arrays, "instanced draws", backend)?;
    }
    if base_instance {
        Capabilities::require(capabilities.base_instance, "base instance draws", backend)?;
    }
    Ok(NativeDraw {
        instanced,
        base_vertex: false,
        base_instance,
    })
}

impl DrawRecord for DrawArguments {
    const SIZE_BYTES: usize = DrawArguments::SIZE_BYTES;

    fn native_draw(
        &self,
        capabilities: &Capabilities,
        backend: &'static str,
    ) -> Result<NativeDraw, CapabilityError> {
        instancing(
            self.instance_count,
            self.start_instance_location,
            capabilities,
            backend,
        )
    }
}

impl DrawRecord for DrawIndexedArguments {
    const SIZE_BYTES: usize = DrawIndexedArguments::SIZE_BYTES;

    fn native_draw(
        &self,
        capabilities: &Capabilities,
        backend: &'static str,
    ) -> Result<NativeDraw, CapabilityError> {
        let mut draw = instancing(
            self.instance_count,
            self.start_instance_location,
            capabilities,
            backend,
        )?;
        if self.base_vertex_location != 0 {
            Capabilities::require(capabilities.base_vertex, "base vertex draws", backend)?;
            draw.base_vertex = true;
        }
        Ok(draw)
    }
}

/// Reads `number_of_draws` consecutive records starting at `byte_offset`.
///
/// Every record advances the read position by exactly one record size, whatever
/// draw variant it maps to. Fails if the records do not fit in `bytes`.
pub fn emulated_draw_records<A: DrawRecord>(
    bytes: &[u8],
    byte_offset: u32,
    number_of_draws: u32,
) -> Result<Vec<A>, ResourceError> {
    let start = byte_offset as usize;
    let length = A::SIZE_BYTES * number_of_draws as usize;
    let region = start
        .checked_add(length)
        .and_then(|end| bytes.get(start..end))
        .ok_or(ResourceError::OutOfBounds {
            offset: byte_offset as u64,
            size: length as u64,
            capacity: bytes.len() as u64,
        })?;

    Ok(region
        .chunks_exact(A::SIZE_BYTES)
        .map(bytemuck::pod_read_unaligned::<A>)
        .collect())
}

/// Maps every record to its native draw variant.
///
/// All records are checked before any is returned: one unsupported record fails
/// the whole indirect draw, so nothing is drawn.
pub fn plan_emulated_draws<A: DrawRecord>(
    records: Vec<A>,
    capabilities: &Capabilities,
    backend: &'static str,
) -> Result<Vec<(A, NativeDraw)>, CapabilityError> {
    records
        .into_iter()
        .map(|record| {
            record
                .native_draw(capabilities, backend)
                .map(|draw| (record, draw))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes_of<A: Pod>(records: &[A]) -> Vec<u8> {
        bytemuck::cast_slice(records).to_vec()
    }

    #[test]
    fn records_advance_by_one_record_size_whatever_their_variant() {
        let records = [
            DrawIndexedArguments::new(3),
            DrawIndexedArguments {
                instance_count: 4,
                ..DrawIndexedArguments::new(6)
            },
            DrawIndexedArguments {
                base_vertex_location: 8,
                ..DrawIndexedArguments::new(9)
            },
            DrawIndexedArguments {
                instance_count: 0,
                ..DrawIndexedArguments::new(0)
            },
        ];
        let bytes = bytes_of(&records);
        let read = emulated_draw_records::<DrawIndexedArguments>(&bytes, 0, 4).unwrap();
        assert_eq!(read, records.to_vec());

        let tail = emulated_draw_records::<DrawIndexedArguments>(&bytes, 20, 3).unwrap();
        assert_eq!(tail, records[1..].to_vec());
    }

    #[test]
    fn unaligned_offsets_are_read() {
        let mut bytes = vec![0xAAu8; 3];
        bytes.extend_from_slice(DrawArguments::new(36).as_bytes());
        let read = emulated_draw_records::<DrawArguments>(&bytes, 3, 1).unwrap();
        assert_eq!(read, vec![DrawArguments::new(36)]);
    }

    #[test]
    fn out_of_bounds_records_are_rejected() {
        let bytes = bytes_of(&[DrawArguments::new(3)]);
        assert_eq!(
            emulated_draw_records::<DrawArguments>(&bytes, 0, 2),
            Err(ResourceError::OutOfBounds {
                offset: 0,
                size: 32,
                capacity: 16
            })
        );
        assert!(emulated_draw_records::<DrawArguments>(&bytes, u32::MAX, 1).is_err());
    }

    #[test]
    fn one_unsupported_record_fails_the_whole_draw() {
        let capabilities = Capabilities {
            base_vertex: false,
            ..Capabilities::full("test")
        };
        let records = vec![
            DrawIndexedArguments::new(3),
            DrawIndexedArguments {
                base_vertex_location: -2,
                ..DrawIndexedArguments::new(3)
            },
        ];
        assert_eq!(
            plan_emulated_draws(records, &capabilities, "test"),
            Err(CapabilityError::FeatureNotSupported {
                feature: "base vertex draws",
                backend: "test"
            })
        );
    }

    #[test]
    fn variants_follow_the_record_fields() {
        let capabilities = Capabilities::full("test");
        let planned = plan_emulated_draws(
            vec![
                DrawArguments::new(3),
                DrawArguments {
                    instance_count: 5,
                    ..DrawArguments::new(3)
                },
                DrawArguments {
                    start_instance_location: 2,
                    ..DrawArguments::new(3)
                },
            ],
            &capabilities,
            "test",
        )
        .unwrap();
        let draws: Vec<_> = planned.into_iter().map(|(_, draw)| draw).collect();
        assert_eq!(draws[0], NativeDraw::default());
        assert!(draws[1].instanced && !draws[1].base_instance);
        assert!(draws[2].base_instance && !draws[2].instanced);
    }
}
