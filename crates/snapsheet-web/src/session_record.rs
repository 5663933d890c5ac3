#![forbid(unsafe_code)]

//! Deterministic session recording and replay.
//!
//! [`SessionRecorder`] wraps a [`WebSheet`], forwards each [`HostInput`] and
//! writes a checkpoint after it: an FNV-1a checksum over the resulting sheet
//! state and the callbacks the input produced, chained with the previous
//! checkpoint. [`replay`] feeds the recorded inputs through a fresh sheet
//! and compares checksums.
//!
//! # Trace layout
//!
//! - **Header**: options and initial measurement (must be first).
//! - **Input**: a timestamped host event.
//! - **Checkpoint**: state checksum after the preceding input.
//! - **Summary**: checkpoint count and final chain (must be last).
//!
//! Because the checksum covers position, drag flag, and signals but not the
//! input source, a trace re-encoded with [`SessionTrace::map_inputs`] from
//! touch to mouse events must replay without mismatches.

use snapsheet_core::controller::{SheetSignal, SheetUpdate};
use snapsheet_core::geometry::SheetMeasurement;
use snapsheet_core::options::SheetOptions;

use crate::{HostInput, WebSheet};

// FNV-1a 64-bit.
const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x100000001b3;

fn fnv1a64_bytes(mut hash: u64, bytes: &[u8]) -> u64 {
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

fn fnv1a64_u64(hash: u64, v: u64) -> u64 {
    fnv1a64_bytes(hash, &v.to_le_bytes())
}

fn fnv1a64_pair(prev: u64, next: u64) -> u64 {
    let hash = FNV_OFFSET_BASIS;
    let hash = fnv1a64_u64(hash, prev);
    fnv1a64_u64(hash, next)
}

/// Checksum of the sheet state after an input, plus the signals it emitted.
#[must_use]
pub fn checksum_state(sheet: &WebSheet, update: &SheetUpdate) -> u64 {
    let controller = sheet.controller();
    let position = controller.position();
    let mut hash = FNV_OFFSET_BASIS;
    hash = fnv1a64_u64(hash, position.current_snap_index as u64);
    hash = fnv1a64_u64(hash, position.translate_y_px.to_bits());
    hash = fnv1a64_bytes(
        hash,
        &[
            u8::from(controller.is_open()),
            u8::from(controller.is_dragging()),
        ],
    );
    for signal in &update.signals {
        hash = match signal {
            SheetSignal::Close => fnv1a64_bytes(hash, b"close"),
            SheetSignal::Progress(p) => fnv1a64_u64(fnv1a64_bytes(hash, b"progress"), p.to_bits()),
        };
    }
    hash
}

/// A single record in a session trace.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceRecord {
    Header {
        options: SheetOptions,
        measurement: SheetMeasurement,
    },
    Input {
        ts_ms: u64,
        input: HostInput,
    },
    Checkpoint {
        index: u64,
        checksum: u64,
        checksum_chain: u64,
    },
    Summary {
        total_checkpoints: u64,
        final_checksum_chain: u64,
    },
}

/// A complete recorded session trace.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionTrace {
    pub records: Vec<TraceRecord>,
}

impl SessionTrace {
    pub fn checkpoint_count(&self) -> u64 {
        self.records
            .iter()
            .filter(|r| matches!(r, TraceRecord::Checkpoint { .. }))
            .count() as u64
    }

    pub fn final_checksum_chain(&self) -> Option<u64> {
        self.records.iter().rev().find_map(|r| match r {
            TraceRecord::Summary {
                final_checksum_chain,
                ..
            } => Some(*final_checksum_chain),
            _ => None,
        })
    }

    /// Copy of the trace with every input rewritten by `f`. Checkpoints are
    /// kept, so replaying the result checks that `f` preserves behavior.
    #[must_use]
    pub fn map_inputs(&self, mut f: impl FnMut(&HostInput) -> HostInput) -> Self {
        let records = self
            .records
            .iter()
            .map(|record| match record {
                TraceRecord::Input { ts_ms, input } => TraceRecord::Input {
                    ts_ms: *ts_ms,
                    input: f(input),
                },
                other => other.clone(),
            })
            .collect();
        Self { records }
    }
}

/// Records a sheet session for deterministic replay.
#[derive(Debug)]
pub struct SessionRecorder {
    sheet: WebSheet,
    records: Vec<TraceRecord>,
    checkpoints: u64,
    checksum_chain: u64,
}

impl SessionRecorder {
    /// Create a recorder and mount the sheet. The mount is checkpoint `0`.
    pub fn new(options: SheetOptions, measurement: SheetMeasurement) -> Self {
        let mut sheet = WebSheet::new(options.clone(), measurement);
        let update = sheet.mount();
        let mut recorder = Self {
            sheet,
            records: vec![TraceRecord::Header {
                options,
                measurement,
            }],
            checkpoints: 0,
            checksum_chain: 0,
        };
        recorder.checkpoint(&update);
        recorder
    }

    /// Forward one host input and record it with a checkpoint.
    pub fn push(&mut self, ts_ms: u64, input: HostInput) -> SheetUpdate {
        self.records.push(TraceRecord::Input {
            ts_ms,
            input: input.clone(),
        });
        let update = self.sheet.dispatch(input).update;
        self.checkpoint(&update);
        update
    }

    pub fn sheet(&self) -> &WebSheet {
        &self.sheet
    }

    pub fn finish(mut self) -> SessionTrace {
        self.records.push(TraceRecord::Summary {
            total_checkpoints: self.checkpoints,
            final_checksum_chain: self.checksum_chain,
        });
        SessionTrace {
            records: self.records,
        }
    }

    fn checkpoint(&mut self, update: &SheetUpdate) {
        let checksum = checksum_state(&self.sheet, update);
        let chain = fnv1a64_pair(self.checksum_chain, checksum);
        self.records.push(TraceRecord::Checkpoint {
            index: self.checkpoints,
            checksum,
            checksum_chain: chain,
        });
        self.checkpoints += 1;
        self.checksum_chain = chain;
    }
}

/// Result of replaying a session trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayResult {
    pub total_checkpoints: u64,
    pub final_checksum_chain: u64,
    /// First checkpoint whose checksum differed, if any.
    pub first_mismatch: Option<ReplayMismatch>,
}

impl ReplayResult {
    #[must_use]
    pub fn ok(&self) -> bool {
        self.first_mismatch.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayMismatch {
    pub index: u64,
    pub expected: u64,
    pub actual: u64,
}

/// Errors that can occur during replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    /// The trace is missing a header record.
    MissingHeader,
    /// A checkpoint appeared with no input before it.
    OrphanCheckpoint(u64),
}

impl core::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "trace missing header record"),
            Self::OrphanCheckpoint(index) => {
                write!(f, "checkpoint {index} has no preceding input")
            }
        }
    }
}

impl std::error::Error for ReplayError {}

/// Replay a recorded trace through a fresh sheet.
pub fn replay(trace: &SessionTrace) -> Result<ReplayResult, ReplayError> {
    let (options, measurement) = trace
        .records
        .first()
        .and_then(|r| match r {
            TraceRecord::Header {
                options,
                measurement,
            } => Some((options.clone(), *measurement)),
            _ => None,
        })
        .ok_or(ReplayError::MissingHeader)?;

    let mut sheet = WebSheet::new(options, measurement);
    let mut pending = Some(sheet.mount());
    let mut total: u64 = 0;
    let mut checksum_chain: u64 = 0;
    let mut first_mismatch = None;

    for record in &trace.records {
        match record {
            TraceRecord::Input { input, .. } => {
                pending = Some(sheet.dispatch(input.clone()).update);
            }
            TraceRecord::Checkpoint {
                index,
                checksum: expected,
                ..
            } => {
                let update = pending.take().ok_or(ReplayError::OrphanCheckpoint(*index))?;
                let actual = checksum_state(&sheet, &update);
                checksum_chain = fnv1a64_pair(checksum_chain, actual);
                if actual != *expected && first_mismatch.is_none() {
                    first_mismatch = Some(ReplayMismatch {
                        index: *index,
                        expected: *expected,
                        actual,
                    });
                }
                total += 1;
            }
            TraceRecord::Header { .. } | TraceRecord::Summary { .. } => {}
        }
    }

    Ok(ReplayResult {
        total_checkpoints: total,
        final_checksum_chain: checksum_chain,
        first_mismatch,
    })
}
