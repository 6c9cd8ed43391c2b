//! Duplicate and near-duplicate OMM elimination.
//!
//! Exact deduplication hashes each work item's 3-state buffer; the two
//! near-duplicate passes (locality-sensitive hashing, or a windowed
//! brute-force scan) merge items whose 3-state Hamming distance is small.
//! All hashing and sampling is seeded, so results are identical across runs
//! and thread counts.

use std::collections::BTreeSet;

use rand_mt::Mt;
use rustc_hash::{FxHashMap, FxHashSet};
use xxhash_rust::xxh64::xxh64;

use crate::bake::input::OmmFormat;
use crate::bake::pipeline::Options;
use crate::bake::state::OpacityState;
use crate::bake::workitem::{OmmWorkItem, Slot};
use crate::subdiv::bird;

const DIGEST_SEED: u64 = 42;
const LSH_RNG_SEED: u32 = 42;

/// Number of micro-triangles whose 3-state classification differs.
fn hamming_distance_3state(a: &OmmWorkItem, b: &OmmWorkItem) -> f32 {
    debug_assert_eq!(a.subdivision_level, b.subdivision_level);
    let n = bird::num_micro_triangles(a.subdivision_level);
    let mut diff = 0u32;
    for i in 0..n {
        if a.states.get3(i) != b.states.get3(i) {
            diff += 1;
        }
    }
    diff as f32
}

fn normalized_hamming_distance_3state(a: &OmmWorkItem, b: &OmmWorkItem) -> f32 {
    hamming_distance_3state(a, b) / bird::num_micro_triangles(a.subdivision_level) as f32
}

fn split_pair(items: &mut [OmmWorkItem], to: usize, from: usize) -> (&mut OmmWorkItem, &mut OmmWorkItem) {
    debug_assert_ne!(to, from);
    if to < from {
        let (l, r) = items.split_at_mut(from);
        (&mut l[to], &mut r[0])
    } else {
        let (l, r) = items.split_at_mut(to);
        (&mut r[0], &mut l[from])
    }
}

/// Merge `from` into `to`: `to` takes over the primitives, `from` is
/// disabled, and each differing micro-triangle widens `to`'s state:
/// two conflicting known states become unknown-opaque, a known state yields
/// to `from`'s unknown, and two unknowns keep `to`'s choice.
pub(crate) fn merge_work_items(items: &mut [OmmWorkItem], to: usize, from: usize) {
    let (to, from) = split_pair(items, to, from);
    debug_assert_eq!(to.subdivision_level, from.subdivision_level);

    to.primitive_indices.extend(from.primitive_indices.drain(..));
    from.slot = Slot::Disabled;

    for i in 0..bird::num_micro_triangles(from.subdivision_level) {
        let to_state = to.states.get(i);
        let from_state = from.states.get(i);
        if to_state == from_state {
            continue;
        }
        if to_state.is_known() && from_state.is_known() {
            to.states.set(i, OpacityState::UnknownOpaque);
        } else if to_state.is_known() && from_state.is_unknown() {
            to.states.set(i, from_state);
        }
        // Both unknown: keep to's state.
    }
}

/// Collapse work items whose 3-state buffers are bit-identical. The first
/// occurrence keeps the payload; later ones transfer their primitives and
/// are disabled.
pub(crate) fn deduplicate_exact(options: &Options, work_items: &mut [OmmWorkItem]) {
    if options.disable_duplicate_detection {
        return;
    }

    let mut by_digest: FxHashMap<u64, usize> = FxHashMap::default();
    let mut dupes = 0u32;
    for i in 0..work_items.len() {
        let digest = xxh64(work_items[i].states.raw3(), DIGEST_SEED);
        match by_digest.get(&digest).copied() {
            None => {
                by_digest.insert(digest, i);
            }
            Some(existing) => {
                let (to, from) = split_pair(work_items, existing, i);
                to.primitive_indices.extend(from.primitive_indices.drain(..));
                from.slot = Slot::Disabled;
                dupes += 1;
            }
        }
    }
    tracing::debug!(dupes, "exact deduplication done");
}

struct HashTable {
    bit_indices: Vec<u32>,
    item_hashes: Vec<u64>,
    buckets: FxHashMap<u64, Vec<u32>>,
}

/// Near-duplicate merging via Hamming bit-sampling LSH.
///
/// For each subdivision level, every active 4-state work item is hashed into
/// `L = ceil(n^(1/c))` tables by sampling `k` random micro-triangle states;
/// bucket neighbours within Hamming distance `r = 0.15 * d` merge into the
/// probing item. Bit indices come from a Mersenne-Twister with a fixed seed,
/// so the pass is reproducible.
pub(crate) fn deduplicate_similar_lsh(
    options: &Options,
    work_items: &mut [OmmWorkItem],
    iterations: u32,
) {
    if options.disable_duplicate_detection
        || !options.enable_near_duplicate_detection
        || options.enable_near_duplicate_detection_brute_force
    {
        return;
    }

    let mut mt = Mt::new(LSH_RNG_SEED);
    let mut merges = 0u32;

    for _attempt in 0..iterations {
        for subdivision_level in 1..=crate::bake::input::MAX_SUBDIVISION_LEVEL {
            let batch: Vec<u32> = (0..work_items.len() as u32)
                .filter(|&i| {
                    let item = &work_items[i as usize];
                    item.is_active()
                        && item.format == OmmFormat::OC1_4State
                        && item.subdivision_level == subdivision_level
                })
                .collect();
            if batch.is_empty() {
                continue;
            }

            // n points of dimensionality d; r bounds "close", c is the
            // approximation factor.
            let d = bird::num_micro_triangles(subdivision_level);
            let n = batch.len() as f32;
            let r = 0.15 * d as f32;
            let c = 4.0f32;

            let num_tables = n.powf(1.0 / c).ceil() as u32;
            if num_tables == 0 {
                continue;
            }
            let k = ((n.ln() * d as f32) / (c * r)).ceil() as u32;
            if k == 0 {
                continue;
            }

            let mut tables: Vec<HashTable> = (0..num_tables)
                .map(|_| HashTable {
                    // Masked draw, not a rejection-sampled range: d is a
                    // power of two by construction and the raw mt19937
                    // sequence keeps bakes identical across platforms.
                    bit_indices: (0..k).map(|_| mt.next_u32() & (d - 1)).collect(),
                    item_hashes: vec![0; work_items.len()],
                    buckets: FxHashMap::default(),
                })
                .collect();

            let mut signature = vec![0u8; k as usize * 4];
            for &item_index in &batch {
                let item = &work_items[item_index as usize];
                for table in &mut tables {
                    for (slot, &bit) in table.bit_indices.iter().enumerate() {
                        let state = item.states.get3(bit) as u32;
                        signature[slot * 4..slot * 4 + 4].copy_from_slice(&state.to_le_bytes());
                    }
                    let hash = xxh64(&signature, DIGEST_SEED);
                    table.item_hashes[item_index as usize] = hash;
                    table.buckets.entry(hash).or_default().push(item_index);
                }
            }

            for &item_index in &batch {
                if !work_items[item_index as usize].is_active() {
                    // Already merged away as someone else's duplicate.
                    continue;
                }

                let mut potential: BTreeSet<u32> = BTreeSet::new();
                for table in &tables {
                    let hash = table.item_hashes[item_index as usize];
                    let Some(members) = table.buckets.get(&hash) else {
                        continue;
                    };
                    for &candidate in members {
                        if candidate == item_index {
                            continue;
                        }
                        if !work_items[candidate as usize].is_active() {
                            continue;
                        }
                        if potential.len() > 3 * num_tables as usize {
                            break;
                        }
                        potential.insert(candidate);
                    }
                }

                let mut min_dist = f32::MAX;
                let mut nearest: Option<u32> = None;
                for &candidate in &potential {
                    let dist = hamming_distance_3state(
                        &work_items[item_index as usize],
                        &work_items[candidate as usize],
                    );
                    if dist < r && dist < min_dist {
                        min_dist = dist;
                        nearest = Some(candidate);
                    }
                }

                if let Some(similar) = nearest {
                    merge_work_items(work_items, item_index as usize, similar as usize);
                    merges += 1;
                }
            }
        }
    }
    tracing::debug!(merges, iterations, "LSH near-duplicate pass done");
}

/// Windowed O(n*k) near-duplicate scan, the flag-selected alternative to the
/// LSH pass. Each active 4-state item looks at up to 2048 successors and
/// merges the closest one under a 10% normalized Hamming distance.
pub(crate) fn deduplicate_similar_brute_force(options: &Options, work_items: &mut [OmmWorkItem]) {
    if options.disable_duplicate_detection
        || !options.enable_near_duplicate_detection
        || !options.enable_near_duplicate_detection_brute_force
    {
        return;
    }
    if work_items.is_empty() {
        return;
    }

    const MERGE_THRESHOLD: f32 = 0.1;
    const MAX_COMPARISONS: usize = 2048;

    let mut merged: FxHashSet<usize> = FxHashSet::default();
    for it_a in 0..work_items.len() - 1 {
        let a = &work_items[it_a];
        if !a.is_active() || a.format != OmmFormat::OC1_4State {
            continue;
        }

        let search_start = it_a + 1;
        let search_end = (search_start + MAX_COMPARISONS).min(work_items.len());

        let mut min_dist = f32::MAX;
        let mut nearest: Option<usize> = None;
        for it_b in search_start..search_end {
            let b = &work_items[it_b];
            if !b.is_active()
                || b.format != OmmFormat::OC1_4State
                || b.primitive_indices.is_empty()
                || a.subdivision_level != b.subdivision_level
                || merged.contains(&it_b)
            {
                continue;
            }

            let dist = normalized_hamming_distance_3state(a, b);
            if dist < MERGE_THRESHOLD && dist < min_dist {
                min_dist = dist;
                nearest = Some(it_b);
            }
        }

        if let Some(it_b) = nearest {
            merged.insert(it_a);
            merged.insert(it_b);
            merge_work_items(work_items, it_a, it_b);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bake/dedup.rs"]
mod tests;
