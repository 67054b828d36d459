//! Tests for the 512-byte record layer: telemetry extraction, packet
//! metadata, and the embedded-message failure domain.

mod common;

use common::*;

#[test]
fn test_frame_with_source_capabilities() {
    // A full synthetic record: SOP packet on CC1, one fixed supply PDO
    // advertising 10 V / 3 A. data_length stays at the recorder's declared
    // value; message length still comes from the PD header.
    let mut payload = header_bytes(false, 1, 0, 1, 2, 0, 1).to_vec();
    payload.extend_from_slice(&0x0003_212Cu32.to_le_bytes());
    let record = build_record(
        1234,
        [3300, 150, 0, 5000, 1500],
        meta_word(0, 2, true, false, 1),
        2,
        &payload,
    );

    let frame = CaptureFrame::parse(0, &record).unwrap();
    assert_eq!(frame.index, 0);
    assert_eq!(frame.telemetry.time_ms, 1234);
    assert_eq!(frame.telemetry.cc1_voltage, 3300);
    assert_eq!(frame.telemetry.cc2_voltage, 150);
    assert_eq!(frame.telemetry.cc2_current, 0);
    assert_eq!(frame.telemetry.vbus_voltage, 5000);
    assert_eq!(frame.telemetry.vbus_current, 1500);
    assert_eq!(frame.meta.sop, SopType::Sop);
    assert_eq!(frame.meta.version, 2);
    assert!(frame.meta.pd_present);
    assert!(!frame.meta.packet_lost);
    assert_eq!(frame.meta.cc_select, CcLine::Cc1);
    assert_eq!(frame.data_length, 2);

    let message = frame.pd_message().expect("message should decode");
    assert_eq!(message.header.spec_revision, SpecRevision::V3_0);
    assert_eq!(message.header.port_role, PortRole::Port(PowerRole::Source));
    assert_eq!(message.header.data_role, Some(DataRole::Ufp));
    assert_eq!(
        message.header.message_type,
        MessageType::Data(DataMessageType::SrcCap)
    );
    assert_eq!(message.objects.len(), 1);
    match &message.objects[0] {
        DataObject::SourceCapability(SourcePdo::FixedSupply(pdo)) => {
            assert_eq!(pdo.voltage_v(), 10.0);
            assert_eq!(pdo.max_current_a(), 3.0);
        }
        other => panic!("Expected fixed supply PDO, got {other:?}"),
    }
}

#[test]
fn test_telemetry_only_frame() {
    let record = build_record(77, [1, 2, 3, 4, 5], meta_word(0, 2, false, false, 0), 0, &[]);
    let frame = CaptureFrame::parse(3, &record).unwrap();
    assert_eq!(frame.index, 3);
    assert_eq!(frame.message, MessageOutcome::None);
    assert!(frame.pd_message().is_none());
    assert_eq!(frame.telemetry.vbus_current, 5);
}

#[test]
fn test_sop_context_reaches_the_header() {
    // Same header bytes as a plain-SOP BIST message, but the record says
    // SOP': the cable-plug interpretation must win.
    let mut payload = 0x1083u16.to_le_bytes().to_vec();
    payload.extend_from_slice(&0x0003_212Cu32.to_le_bytes());
    let record = build_record(
        10,
        [0; 5],
        meta_word(1, 2, true, false, 2),
        6,
        &payload,
    );
    let frame = CaptureFrame::parse(0, &record).unwrap();
    assert_eq!(frame.meta.sop, SopType::SopPrime);
    let message = frame.pd_message().expect("message should decode");
    assert_eq!(message.header.port_role, PortRole::Cable(CablePlug::DfpUfp));
    assert_eq!(message.header.data_role, None);
    assert_eq!(
        message.header.message_type,
        MessageType::Data(DataMessageType::SrcCap)
    );
}

#[test]
fn test_bad_message_keeps_telemetry() {
    // Unknown control message type 23: the message is rejected but its raw
    // bytes are retained and the telemetry fields stay valid.
    let payload = header_bytes(false, 0, 0, 0, 2, 0, 23);
    let record = build_record(
        555,
        [10, 20, 30, 40, 50],
        meta_word(0, 2, true, false, 1),
        2,
        &payload,
    );

    let frame = CaptureFrame::parse(9, &record).unwrap();
    assert_eq!(frame.telemetry.time_ms, 555);
    assert_eq!(frame.telemetry.vbus_voltage, 40);
    match &frame.message {
        MessageOutcome::Invalid { error, raw } => {
            assert_eq!(
                *error,
                TwinkieError::UnknownMessageType {
                    class: "control",
                    value: 23
                }
            );
            assert_eq!(raw.as_ref(), payload.as_slice());
        }
        other => panic!("Expected invalid message outcome, got {other:?}"),
    }
}

#[test]
fn test_unknown_sop_nibble_survives() {
    let record = build_record(1, [0; 5], meta_word(9, 0, false, false, 3), 0, &[]);
    let frame = CaptureFrame::parse(0, &record).unwrap();
    assert_eq!(frame.meta.sop, SopType::Unknown(9));
    assert_eq!(frame.meta.cc_select, CcLine::Unknown(3));
    assert_eq!(frame.message, MessageOutcome::None);
}

#[test]
fn test_short_record_is_fatal() {
    let result = CaptureFrame::parse(0, &[0u8; 10]);
    assert_eq!(
        result,
        Err(TwinkieError::TruncatedRecord {
            needed: 160,
            available: 80
        })
    );
}
