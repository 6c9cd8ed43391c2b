//! The 4-state opacity domain and per-work-item state storage.

use crate::bake::input::{OmmFormat, UnknownStatePromotion};
use crate::subdiv::bird;

/// Classification of one micro-triangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum OpacityState {
    /// Alpha test fails everywhere.
    Transparent = 0,
    /// Alpha test passes everywhere.
    Opaque = 1,
    /// Mixed, promoted towards transparent.
    UnknownTransparent = 2,
    /// Mixed, promoted towards opaque.
    UnknownOpaque = 3,
}

impl OpacityState {
    pub(crate) fn from_u8(v: u8) -> Self {
        match v & 3 {
            0 => OpacityState::Transparent,
            1 => OpacityState::Opaque,
            2 => OpacityState::UnknownTransparent,
            _ => OpacityState::UnknownOpaque,
        }
    }

    /// Whether the state is one of the two unknown variants.
    pub fn is_unknown(self) -> bool {
        matches!(self, OpacityState::UnknownTransparent | OpacityState::UnknownOpaque)
    }

    /// Whether the state is fully resolved (opaque or transparent).
    pub fn is_known(self) -> bool {
        !self.is_unknown()
    }
}

/// Per-micro-triangle sample tallies produced by a classification kernel.
///
/// After classification at least one of the two counters is non-zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OmmCoverage {
    /// Samples that passed the alpha test.
    pub opaque: u32,
    /// Samples that failed the alpha test.
    pub trans: u32,
}

/// Resolve coverage tallies into a state.
///
/// Mixed coverage resolves through `promotion`; for the 2-state format the
/// unknown states collapse immediately so the 1-bit packing stays valid.
pub fn state_from_coverage(
    format: OmmFormat,
    promotion: UnknownStatePromotion,
    cov: OmmCoverage,
) -> OpacityState {
    debug_assert!(cov.opaque > 0 || cov.trans > 0);
    if cov.opaque > 0 && cov.trans > 0 {
        let unknown = match promotion {
            UnknownStatePromotion::Majority => {
                if cov.opaque >= cov.trans {
                    OpacityState::UnknownOpaque
                } else {
                    OpacityState::UnknownTransparent
                }
            }
            UnknownStatePromotion::ForceOpaque => OpacityState::UnknownOpaque,
            UnknownStatePromotion::ForceTransparent => OpacityState::UnknownTransparent,
        };
        if format == OmmFormat::OC1_2State {
            return match unknown {
                OpacityState::UnknownOpaque => OpacityState::Opaque,
                _ => OpacityState::Transparent,
            };
        }
        unknown
    } else if cov.opaque > 0 {
        OpacityState::Opaque
    } else {
        OpacityState::Transparent
    }
}

/// Micro-triangle state storage for one work item.
///
/// Two parallel buffers: the raw 4-state classification, and its 3-state
/// projection (UnknownTransparent folded into UnknownOpaque), which is what
/// both deduplication passes hash and compare. The projection is maintained
/// on every write so the two views can never diverge.
#[derive(Clone, Debug)]
pub struct OmmStates {
    data: Vec<u8>,
    data3: Vec<u8>,
}

impl OmmStates {
    pub(crate) fn new(level: u32) -> Self {
        let n = bird::num_micro_triangles(level) as usize;
        Self {
            data: vec![0; n],
            data3: vec![0; n],
        }
    }

    pub(crate) fn set(&mut self, index: u32, state: OpacityState) {
        self.data[index as usize] = state as u8;
        let projected = if state == OpacityState::UnknownTransparent {
            OpacityState::UnknownOpaque
        } else {
            state
        };
        self.data3[index as usize] = projected as u8;
    }

    pub(crate) fn get(&self, index: u32) -> OpacityState {
        OpacityState::from_u8(self.data[index as usize])
    }

    pub(crate) fn get3(&self, index: u32) -> OpacityState {
        OpacityState::from_u8(self.data3[index as usize])
    }

    /// The 3-state buffer as raw bytes (dedup digest input).
    pub(crate) fn raw3(&self) -> &[u8] {
        &self.data3
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bake/state.rs"]
mod tests;
