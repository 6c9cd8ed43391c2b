//! Packing the final array blob, descriptors and index buffer.

use crate::bake::histogram::UsageHistogram;
use crate::bake::input::{BakeInput, NUM_SUBDIVISION_LEVELS, OmmFormat};
use crate::bake::pipeline::Options;
use crate::bake::workitem::{OmmWorkItem, Slot};
use crate::foundation::error::{OmmError, OmmResult};
use crate::result::{BakeResult, DEFAULT_FILL, OmmDescriptor, OmmIndexBuffer};
use crate::subdiv::bird;

const FORMATS: [OmmFormat; 2] = [OmmFormat::OC1_2State, OmmFormat::OC1_4State];

/// Payload byte length of one OMM: at least one byte, so consecutive
/// payloads stay byte-aligned.
fn payload_bytes(format: OmmFormat, level: u32) -> usize {
    let bits = bird::num_micro_triangles(level) as usize * bird::bit_count(format) as usize;
    (bits >> 3).max(1)
}

/// Walk the work items in sort order, pack every active one into the array
/// blob, then fill the per-triangle index buffer and narrow it when allowed.
pub(crate) fn serialize(
    input: &BakeInput<'_>,
    options: &Options,
    work_items: &mut [OmmWorkItem],
    array_histogram: &UsageHistogram,
    index_histogram: &UsageHistogram,
    sort_keys: &[(u64, u32)],
) -> OmmResult<BakeResult> {
    let mut desc_count = 0usize;
    let mut array_size = 0usize;
    for format in FORMATS {
        for level in 0..NUM_SUBDIVISION_LEVELS as u32 {
            let count = array_histogram.get(format, level) as usize;
            desc_count += count;
            array_size += count * payload_bytes(format, level);
        }
    }

    if array_size > u32::MAX as usize {
        return Err(OmmError::serialization(format!(
            "array data of {array_size} bytes exceeds the 32-bit offset range"
        )));
    }

    let mut omm_array_data = vec![0u8; array_size];
    let mut omm_desc_array = Vec::with_capacity(desc_count);

    let mut cursor = 0usize;
    for &(_, item_index) in sort_keys {
        let item = &mut work_items[item_index as usize];
        if item.slot != Slot::Array {
            continue;
        }
        if cursor >= array_size {
            return Err(OmmError::serialization("array data offset accounting overflowed"));
        }

        item.desc_offset = omm_desc_array.len() as u32;
        omm_desc_array.push(OmmDescriptor {
            offset: cursor as u32,
            subdivision_level: item.subdivision_level as u16,
            format: item.format.to_u16(),
        });

        let payload = &mut omm_array_data[cursor..];
        let is_2state = item.format == OmmFormat::OC1_2State;
        for u_tri in 0..bird::num_micro_triangles(item.subdivision_level) {
            let state = item.states.get(u_tri) as u8;
            let (byte_index, shift) = if is_2state {
                ((u_tri >> 3) as usize, u_tri & 7)
            } else {
                ((u_tri >> 2) as usize, (u_tri & 3) << 1)
            };
            payload[byte_index] |= state << shift;
        }

        cursor += payload_bytes(item.format, item.subdivision_level);
    }

    let triangle_count = input.indices.len() / 3;
    let mut index_buffer = vec![DEFAULT_FILL as i32; triangle_count];
    for item in work_items.iter() {
        for &primitive in &item.primitive_indices {
            index_buffer[primitive as usize] = match item.slot {
                Slot::Special(special) => special as i32,
                _ => item.desc_offset as i32,
            };
        }
    }

    let narrow = triangle_count <= i16::MAX as usize
        && !options.force_32bit_indices;
    let omm_index_buffer = if narrow {
        OmmIndexBuffer::I16(index_buffer.into_iter().map(|v| v as i16).collect())
    } else {
        OmmIndexBuffer::I32(index_buffer)
    };

    tracing::debug!(
        descriptors = omm_desc_array.len(),
        array_bytes = omm_array_data.len(),
        triangles = triangle_count,
        "serialized bake result"
    );

    Ok(BakeResult {
        omm_array_data,
        omm_desc_array,
        omm_index_buffer,
        omm_array_histogram: array_histogram.records(),
        omm_index_histogram: index_histogram.records(),
    })
}
