//! Tests for PD header and message decoding: the SOP-conditional header
//! shape, vocabulary dispatch, and the array-length contract.

mod common;

use common::*;

#[test]
fn test_header_shape_depends_on_sop() {
    // The same two bytes decode differently by channel: plain SOP consumes
    // 16 bits and exposes a data role; SOP' consumes 15 and shifts the
    // message type up by one bit.
    let header_bits = [0x83u8, 0x10];

    let mut cursor = BitCursor::new(&header_bits);
    let header = PdHeader::parse(&mut cursor, SopType::Sop).unwrap();
    assert!(cursor.at_end());
    assert_eq!(header.num_data_objects, 1);
    assert_eq!(header.port_role, PortRole::Port(PowerRole::Sink));
    assert_eq!(header.spec_revision, SpecRevision::V3_0);
    assert_eq!(header.data_role, Some(DataRole::Ufp));
    assert_eq!(header.message_type, MessageType::Data(DataMessageType::Bist));

    let mut cursor = BitCursor::new(&header_bits);
    let header = PdHeader::parse(&mut cursor, SopType::SopPrime).unwrap();
    assert_eq!(cursor.remaining(), 1);
    assert_eq!(header.port_role, PortRole::Cable(CablePlug::DfpUfp));
    assert_eq!(header.data_role, None);
    assert_eq!(
        header.message_type,
        MessageType::Data(DataMessageType::SrcCap)
    );
}

#[test]
fn test_role_bit_is_raw_for_other_sops() {
    // 15-bit shape: the message type sits one bit higher than on plain SOP.
    let header_bits = 0x0182u16.to_le_bytes();
    let mut cursor = BitCursor::new(&header_bits);
    let header = PdHeader::parse(&mut cursor, SopType::HardReset).unwrap();
    assert_eq!(header.port_role, PortRole::Raw(1));
    assert_eq!(header.data_role, None);
    assert_eq!(
        header.message_type,
        MessageType::Control(ControlMessageType::GoodCrc)
    );
}

#[test]
fn test_control_vocabulary_ignores_extended_flag() {
    // num_data_objects == 0 selects the control vocabulary even with the
    // extended bit set.
    let payload = header_bytes(true, 0, 0, 0, 1, 0, 1);
    let message = PdMessage::parse(&payload, SopType::Sop).unwrap();
    assert!(message.is_control());
    assert_eq!(
        message.header.message_type,
        MessageType::Control(ControlMessageType::GoodCrc)
    );
    assert!(message.objects.is_empty());
}

#[test]
fn test_data_vocabulary() {
    let mut payload = header_bytes(false, 1, 0, 1, 2, 0, 1).to_vec();
    payload.extend_from_slice(&0x0003_212Cu32.to_le_bytes());
    let message = PdMessage::parse(&payload, SopType::Sop).unwrap();
    assert_eq!(
        message.header.message_type,
        MessageType::Data(DataMessageType::SrcCap)
    );
}

#[test]
fn test_extended_vocabulary() {
    // Extended-message bodies are chunk data, kept raw.
    let mut payload = header_bytes(true, 1, 0, 0, 2, 0, 2).to_vec();
    payload.extend_from_slice(&0xAABB_CCDDu32.to_le_bytes());
    let message = PdMessage::parse(&payload, SopType::Sop).unwrap();
    assert_eq!(
        message.header.message_type,
        MessageType::Extended(ExtendedMessageType::ExtStatus)
    );
    match &message.objects[0] {
        DataObject::Raw(raw) => assert_eq!(raw.raw, 0xAABB_CCDD),
        other => panic!("Expected raw object, got {other:?}"),
    }
}

#[test]
fn test_unknown_message_types() {
    // Data vocabulary has a hole at 9..=14.
    let mut payload = header_bytes(false, 1, 0, 0, 2, 0, 9).to_vec();
    payload.extend_from_slice(&[0u8; 4]);
    assert_eq!(
        PdMessage::parse(&payload, SopType::Sop),
        Err(TwinkieError::UnknownMessageType {
            class: "data",
            value: 9
        })
    );

    // Control vocabulary ends at 22.
    let payload = header_bytes(false, 0, 0, 0, 2, 0, 23);
    assert_eq!(
        PdMessage::parse(&payload, SopType::Sop),
        Err(TwinkieError::UnknownMessageType {
            class: "control",
            value: 23
        })
    );

    // Extended vocabulary ends at 13.
    let mut payload = header_bytes(true, 1, 0, 0, 2, 0, 14).to_vec();
    payload.extend_from_slice(&[0u8; 4]);
    assert_eq!(
        PdMessage::parse(&payload, SopType::Sop),
        Err(TwinkieError::UnknownMessageType {
            class: "extended",
            value: 14
        })
    );
}

#[test]
fn test_body_length_comes_from_header() {
    // Three PDOs and four bytes of trailing padding: exactly three objects
    // decode and the wire length ignores the padding.
    let mut payload = header_bytes(false, 3, 0, 1, 2, 0, 1).to_vec();
    for _ in 0..3 {
        payload.extend_from_slice(&0x0003_212Cu32.to_le_bytes());
    }
    payload.extend_from_slice(&[0xFFu8; 4]);

    let message = PdMessage::parse(&payload, SopType::Sop).unwrap();
    assert_eq!(message.objects.len(), 3);
    assert_eq!(message.wire_len(), 2 + 12);
    assert!(
        message
            .objects
            .iter()
            .all(|o| matches!(o, DataObject::SourceCapability(_)))
    );
}

#[test]
fn test_truncated_body() {
    // Header declares two objects, body holds one.
    let mut payload = header_bytes(false, 2, 0, 1, 2, 0, 1).to_vec();
    payload.extend_from_slice(&0x0003_212Cu32.to_le_bytes());
    assert!(matches!(
        PdMessage::parse(&payload, SopType::Sop),
        Err(TwinkieError::TruncatedMessage(_))
    ));
}

#[test]
fn test_truncated_header() {
    assert!(matches!(
        PdMessage::parse(&[0x81], SopType::Sop),
        Err(TwinkieError::TruncatedMessage(_))
    ));
}

#[test]
fn test_parse_message_81112c210300() {
    // Wire capture of a one-PDO SRC_CAP as hex: header 0x1181 + fixed
    // supply PDO 0x0003212C.
    let bytes = hex_to_bytes("81112c210300");
    let message = PdMessage::parse(&bytes, SopType::Sop).unwrap();
    assert_eq!(
        message.header.message_type,
        MessageType::Data(DataMessageType::SrcCap)
    );
    assert_eq!(message.wire_len(), bytes.len());
    match &message.objects[0] {
        DataObject::SourceCapability(SourcePdo::FixedSupply(pdo)) => {
            assert_eq!(pdo.voltage_50mv, 200);
        }
        other => panic!("Expected fixed supply PDO, got {other:?}"),
    }
}

#[test]
fn test_message_id_and_extended_flag() {
    let payload = header_bytes(false, 0, 5, 1, 2, 1, 6);
    let message = PdMessage::parse(&payload, SopType::Sop).unwrap();
    assert_eq!(message.header.message_id, 5);
    assert!(!message.header.extended);
    assert_eq!(message.header.port_role, PortRole::Port(PowerRole::Source));
    assert_eq!(message.header.data_role, Some(DataRole::Dfp));
    assert_eq!(
        message.header.message_type,
        MessageType::Control(ControlMessageType::PsRdy)
    );
}
