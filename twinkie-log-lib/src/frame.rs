//! Capture frame layer: one fixed 512-byte record from the recorder.
//!
//! The first 20 bytes are a little-endian telemetry header (timestamp, four
//! analog channels plus the CC2 current tap, packet metadata, payload
//! length). When `data_length` is nonzero the record embeds a PD message
//! starting at byte 20; the rest of the record is padding.

use bytes::Bytes;
use modular_bitfield::prelude::*;
use num_enum::FromPrimitive;
use serde::{Deserialize, Serialize};
use tracing::debug;
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::constants::FRAME_HEADER_SIZE;
use crate::error::TwinkieError;
use crate::pd::{CcLine, PdMessage, SopType};

/// Raw telemetry header, byte-exact wire layout.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct FrameHeaderRaw {
    pub time_ms: U32,
    pub cc1_v: U16,
    pub cc2_v: U16,
    pub cc2_c: U16,
    pub vbus_v: U16,
    pub vbus_c: U16,
    pub packet_meta: U16,
    pub data_length: U16,
    pub reserved: [u8; 2],
}

/// Packet metadata word (byte-swapped 16-bit bit region).
#[bitfield(bytes = 2)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacketMetaRaw {
    #[skip]
    unused: B4,
    pub cc: B2,
    pub packet_lost: bool,
    pub pd_present: bool,
    pub version: B4,
    pub sop: B4,
}

/// Decoded packet metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketMeta {
    pub sop: SopType,
    /// Protocol version nibble as reported by the recorder firmware.
    pub version: u8,
    pub pd_present: bool,
    pub packet_lost: bool,
    pub cc_select: CcLine,
}

impl From<u16> for PacketMeta {
    fn from(word: u16) -> Self {
        let raw = PacketMetaRaw::from_bytes(word.to_le_bytes());
        Self {
            sop: SopType::from_primitive(raw.sop()),
            version: raw.version(),
            pd_present: raw.pd_present(),
            packet_lost: raw.packet_lost(),
            cc_select: CcLine::from_primitive(raw.cc()),
        }
    }
}

/// Analog telemetry carried by every record, in raw recorder counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Telemetry {
    pub time_ms: u32,
    pub cc1_voltage: u16,
    pub cc2_voltage: u16,
    pub cc2_current: u16,
    pub vbus_voltage: u16,
    pub vbus_current: u16,
}

/// Result of decoding a record's embedded PD message.
///
/// Message decode and telemetry are independent failure domains: an
/// undecodable message keeps its raw payload here while the frame's
/// telemetry stays valid.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageOutcome {
    /// `data_length == 0`: the record carries telemetry only.
    None,
    Decoded(PdMessage),
    Invalid { error: TwinkieError, raw: Bytes },
}

/// One decoded capture record.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureFrame {
    /// 0-based ordinal position in the capture file.
    pub index: usize,
    pub telemetry: Telemetry,
    pub meta: PacketMeta,
    /// Raw payload byte count declared by the recorder. Presence flag for
    /// the embedded message; the message's own length comes from its
    /// header.
    pub data_length: u16,
    pub message: MessageOutcome,
}

impl CaptureFrame {
    /// Decode one record. Only a record too short for the 20-byte
    /// telemetry header is fatal; everything after that degrades to a
    /// per-field outcome.
    pub fn parse(index: usize, record: &[u8]) -> Result<Self, TwinkieError> {
        if record.len() < FRAME_HEADER_SIZE {
            return Err(TwinkieError::TruncatedRecord {
                needed: FRAME_HEADER_SIZE * 8,
                available: record.len() * 8,
            });
        }
        let raw = FrameHeaderRaw::ref_from_bytes(&record[..FRAME_HEADER_SIZE]).map_err(|_| {
            TwinkieError::TruncatedRecord {
                needed: FRAME_HEADER_SIZE * 8,
                available: record.len() * 8,
            }
        })?;

        let telemetry = Telemetry {
            time_ms: raw.time_ms.get(),
            cc1_voltage: raw.cc1_v.get(),
            cc2_voltage: raw.cc2_v.get(),
            cc2_current: raw.cc2_c.get(),
            vbus_voltage: raw.vbus_v.get(),
            vbus_current: raw.vbus_c.get(),
        };
        let meta = PacketMeta::from(raw.packet_meta.get());
        let data_length = raw.data_length.get();

        let message = if data_length == 0 {
            MessageOutcome::None
        } else {
            let payload = &record[FRAME_HEADER_SIZE..];
            match PdMessage::parse(payload, meta.sop) {
                Ok(message) => MessageOutcome::Decoded(message),
                Err(error) => {
                    debug!(frame = index, %error, "embedded PD message failed to decode");
                    let kept = payload.len().min(usize::from(data_length));
                    MessageOutcome::Invalid {
                        error,
                        raw: Bytes::copy_from_slice(&payload[..kept]),
                    }
                }
            }
        };

        Ok(Self {
            index,
            telemetry,
            meta,
            data_length,
            message,
        })
    }

    /// The embedded PD message, when one was declared and decoded.
    pub fn pd_message(&self) -> Option<&PdMessage> {
        match &self.message {
            MessageOutcome::Decoded(message) => Some(message),
            _ => None,
        }
    }
}
