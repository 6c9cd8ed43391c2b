//! Usage histograms keyed by (format, subdivision level).

use crate::bake::input::{NUM_SUBDIVISION_LEVELS, OmmFormat};
use crate::bake::workitem::OmmWorkItem;
use crate::result::UsageRecord;

const FORMATS: [OmmFormat; 2] = [OmmFormat::OC1_2State, OmmFormat::OC1_4State];

/// Counts per (format, subdivision level).
#[derive(Default)]
pub(crate) struct UsageHistogram {
    counts: [[u32; NUM_SUBDIVISION_LEVELS]; 2],
}

impl UsageHistogram {
    fn format_row(format: OmmFormat) -> usize {
        match format {
            OmmFormat::OC1_2State => 0,
            OmmFormat::OC1_4State => 1,
        }
    }

    pub(crate) fn inc(&mut self, format: OmmFormat, level: u32, count: u32) {
        self.counts[Self::format_row(format)][level as usize] += count;
    }

    pub(crate) fn get(&self, format: OmmFormat, level: u32) -> u32 {
        self.counts[Self::format_row(format)][level as usize]
    }

    /// Wire records, format-major then level-ascending, zero entries skipped.
    pub(crate) fn records(&self) -> Vec<UsageRecord> {
        let mut out = Vec::new();
        for format in FORMATS {
            for level in 0..NUM_SUBDIVISION_LEVELS as u32 {
                let count = self.get(format, level);
                if count != 0 {
                    out.push(UsageRecord {
                        count,
                        subdivision_level: level as u16,
                        format: format.to_u16(),
                    });
                }
            }
        }
        out
    }
}

/// Build the array histogram (distinct OMMs) and the index histogram
/// (triangles referencing an OMM) over the active work items.
pub(crate) fn build_histograms(work_items: &[OmmWorkItem]) -> (UsageHistogram, UsageHistogram) {
    let mut array = UsageHistogram::default();
    let mut index = UsageHistogram::default();
    for item in work_items {
        if item.is_active() {
            array.inc(item.format, item.subdivision_level, 1);
            index.inc(item.format, item.subdivision_level, item.primitive_indices.len() as u32);
        }
    }
    (array, index)
}
