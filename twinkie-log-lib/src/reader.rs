//! Capture buffer walker: lazy iteration over records, plus the derived
//! views consumers actually want (telemetry series for charting, packet
//! summaries for textual reports, whole-file statistics).

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::constants::RECORD_SIZE;
use crate::error::TwinkieError;
use crate::frame::{CaptureFrame, MessageOutcome};
use crate::pd::{CcLine, DataRole, MessageType, PortRole, SopType, SpecRevision};

/// One telemetry tuple for charting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub time_ms: u32,
    pub cc1_voltage: u16,
    pub cc2_voltage: u16,
    pub vbus_voltage: u16,
    pub vbus_current: u16,
}

/// Packet-level view of one frame with a decoded PD message, for textual
/// reporting independent of the telemetry series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketSummary {
    pub frame_index: usize,
    pub time_ms: u32,
    pub cc_select: CcLine,
    pub sop: SopType,
    pub spec_revision: SpecRevision,
    pub port_role: PortRole,
    pub data_role: Option<DataRole>,
    pub message_type: MessageType,
    pub message_id: u8,
}

impl fmt::Display for PacketSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>6}  {}  {}  {} {:<5} {}",
            self.frame_index,
            format_time_ms(self.time_ms),
            self.cc_select,
            self.spec_revision,
            self.sop.to_string(),
            self.port_role,
        )?;
        if let Some(data_role) = self.data_role {
            write!(f, ":{data_role}")?;
        }
        write!(f, "  {}  id={}", self.message_type, self.message_id)
    }
}

/// Whole-file decode outcome counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecodeStats {
    pub frames: usize,
    pub telemetry_only: usize,
    /// Frames whose embedded message decoded (possibly with invalid
    /// objects inside).
    pub decoded_messages: usize,
    /// Frames that declared a payload the message decoder rejected.
    pub undecodable_messages: usize,
    /// Objects marked invalid across all decoded messages.
    pub invalid_objects: usize,
    pub trailing_bytes: usize,
}

impl fmt::Display for DecodeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames decoded, {} telemetry-only, {} with PD messages, \
             {} undecodable messages, {} invalid objects, {} trailing bytes",
            self.frames,
            self.telemetry_only,
            self.decoded_messages,
            self.undecodable_messages,
            self.invalid_objects,
            self.trailing_bytes
        )
    }
}

/// Walks a capture buffer as a sequence of fixed 512-byte records.
///
/// All views are lazy and restartable: each call starts a fresh pass over
/// the immutable buffer. Decoding holds no state beyond the buffer itself,
/// so repeated passes yield identical results.
#[derive(Debug, Clone)]
pub struct CaptureReader {
    buffer: Bytes,
    trailing: usize,
}

impl CaptureReader {
    pub fn new(buffer: Bytes) -> Self {
        let trailing = buffer.len() % RECORD_SIZE;
        if trailing != 0 {
            warn!(
                trailing,
                "capture length is not a multiple of {RECORD_SIZE}; ignoring trailing bytes"
            );
        }
        Self { buffer, trailing }
    }

    /// Number of complete records in the buffer.
    pub fn frame_count(&self) -> usize {
        self.buffer.len() / RECORD_SIZE
    }

    /// Bytes after the last complete record (0 for a well-formed file).
    pub fn trailing_bytes(&self) -> usize {
        self.trailing
    }

    /// The non-fatal trailing-bytes condition as a reportable error.
    pub fn check_trailing(&self) -> Result<(), TwinkieError> {
        if self.trailing == 0 {
            Ok(())
        } else {
            Err(TwinkieError::TrailingBytes {
                trailing: self.trailing,
            })
        }
    }

    /// All frames in file order, telemetry-only frames included.
    pub fn frames(&self) -> impl Iterator<Item = CaptureFrame> + '_ {
        self.buffer
            .chunks_exact(RECORD_SIZE)
            .enumerate()
            .filter_map(|(index, record)| match CaptureFrame::parse(index, record) {
                Ok(frame) => Some(frame),
                // Unreachable for full records; kept so a decode regression
                // cannot panic the whole pass.
                Err(error) => {
                    warn!(frame = index, %error, "skipping undecodable record");
                    None
                }
            })
    }

    /// Frames that declared an embedded PD message (decoded or not).
    pub fn pd_frames(&self) -> impl Iterator<Item = CaptureFrame> + '_ {
        self.frames()
            .filter(|frame| !matches!(frame.message, MessageOutcome::None))
    }

    /// Telemetry series for charting.
    pub fn telemetry(&self) -> impl Iterator<Item = TelemetrySample> + '_ {
        self.frames().map(|frame| TelemetrySample {
            time_ms: frame.telemetry.time_ms,
            cc1_voltage: frame.telemetry.cc1_voltage,
            cc2_voltage: frame.telemetry.cc2_voltage,
            vbus_voltage: frame.telemetry.vbus_voltage,
            vbus_current: frame.telemetry.vbus_current,
        })
    }

    /// Packet summaries for every frame with a decoded message.
    pub fn packet_summaries(&self) -> impl Iterator<Item = PacketSummary> + '_ {
        self.frames().filter_map(|frame| {
            let message = frame.pd_message()?;
            Some(PacketSummary {
                frame_index: frame.index,
                time_ms: frame.telemetry.time_ms,
                cc_select: frame.meta.cc_select,
                sop: frame.meta.sop,
                spec_revision: message.header.spec_revision,
                port_role: message.header.port_role,
                data_role: message.header.data_role,
                message_type: message.header.message_type,
                message_id: message.header.message_id,
            })
        })
    }

    /// Count decode outcomes across the whole file.
    pub fn statistics(&self) -> DecodeStats {
        let mut stats = DecodeStats {
            trailing_bytes: self.trailing,
            ..DecodeStats::default()
        };
        for frame in self.frames() {
            stats.frames += 1;
            match &frame.message {
                MessageOutcome::None => stats.telemetry_only += 1,
                MessageOutcome::Decoded(message) => {
                    stats.decoded_messages += 1;
                    stats.invalid_objects +=
                        message.objects.iter().filter(|o| o.is_invalid()).count();
                }
                MessageOutcome::Invalid { .. } => stats.undecodable_messages += 1,
            }
        }
        stats
    }
}

/// Render a capture timestamp as `HH:MM:SS:mmm` (wrapping at 24 h), the
/// recorder's reporting convention.
pub fn format_time_ms(ms: u32) -> String {
    let seconds = ms / 1000;
    format!(
        "{:02}:{:02}:{:02}:{:03}",
        seconds / 3600 % 24,
        seconds / 60 % 60,
        seconds % 60,
        ms % 1000
    )
}
