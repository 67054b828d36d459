//! Common test utilities and shared imports

// Allow unused imports and dead code since this is a shared module
// used across multiple test files - not all items are used in every test file
#[allow(unused_imports)]
pub use bytes::Bytes;
#[allow(unused_imports)]
pub use twinkie_log_lib::bits::BitCursor;
#[allow(unused_imports)]
pub use twinkie_log_lib::constants::{FRAME_HEADER_SIZE, RECORD_SIZE};
#[allow(unused_imports)]
pub use twinkie_log_lib::error::TwinkieError;
#[allow(unused_imports)]
pub use twinkie_log_lib::frame::{CaptureFrame, MessageOutcome, PacketMeta};
#[allow(unused_imports)]
pub use twinkie_log_lib::objects::{
    Apdo, DataObject, RdoKind, RdoLimit, RequestObject, SinkPdo, SourcePdo, VdmCommand,
    VdmCommandType, VdmPayload,
};
#[allow(unused_imports)]
pub use twinkie_log_lib::pd::{
    CablePlug, CcLine, ControlMessageType, DataMessageType, DataRole, ExtendedMessageType,
    MessageType, PdHeader, PdMessage, PortRole, PowerRole, SopType, SpecRevision,
};
#[allow(unused_imports)]
pub use twinkie_log_lib::reader::CaptureReader;

/// Decode hex string to bytes for testing
#[allow(dead_code)]
pub fn hex_to_bytes(hex_data: &str) -> Vec<u8> {
    hex::decode(hex_data).expect("Failed to decode hex")
}

/// Assemble the packet metadata word (SOP nibble in the top bits).
#[allow(dead_code)]
pub fn meta_word(sop: u8, version: u8, pd_present: bool, packet_lost: bool, cc: u8) -> u16 {
    (u16::from(sop) << 12)
        | (u16::from(version) << 8)
        | (u16::from(pd_present) << 7)
        | (u16::from(packet_lost) << 6)
        | (u16::from(cc) << 4)
}

/// Assemble a PD header word (plain-SOP shape) as wire bytes.
#[allow(dead_code)]
#[allow(clippy::too_many_arguments)]
pub fn header_bytes(
    extended: bool,
    num_data_objects: u8,
    message_id: u8,
    role_bit: u8,
    spec: u8,
    data_role_bit: u8,
    message_type: u8,
) -> [u8; 2] {
    let word = (u16::from(extended) << 15)
        | (u16::from(num_data_objects) << 12)
        | (u16::from(message_id) << 9)
        | (u16::from(role_bit) << 8)
        | (u16::from(spec) << 6)
        | (u16::from(data_role_bit) << 5)
        | u16::from(message_type);
    word.to_le_bytes()
}

/// Build one full 512-byte record with the given telemetry, metadata word
/// and embedded payload. `data_length` is written as given, so tests can
/// exercise its presence-flag semantics independently of the payload size.
#[allow(dead_code)]
pub fn build_record(
    time_ms: u32,
    analog: [u16; 5],
    meta: u16,
    data_length: u16,
    payload: &[u8],
) -> Vec<u8> {
    let mut record = vec![0u8; RECORD_SIZE];
    record[0..4].copy_from_slice(&time_ms.to_le_bytes());
    for (slot, value) in analog.iter().enumerate() {
        let offset = 4 + slot * 2;
        record[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
    }
    record[14..16].copy_from_slice(&meta.to_le_bytes());
    record[16..18].copy_from_slice(&data_length.to_le_bytes());
    record[FRAME_HEADER_SIZE..FRAME_HEADER_SIZE + payload.len()].copy_from_slice(payload);
    record
}
