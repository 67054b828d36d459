//! PD message layer: the 16-bit header and its type-dependent body.
//!
//! Header layout per USB PD R3.1 Table 6-1. The header's shape is
//! conditional on the frame's SOP type: `data_role` exists only on plain
//! SOP frames (15 bits consumed otherwise), and the role bit is a port
//! role, a cable plug or a raw bit depending on the channel.

use num_enum::{FromPrimitive, IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::Display;

use crate::bits::BitCursor;
use crate::constants::{BATTERY_STATUS_OBJECT_SIZE, DATA_OBJECT_SIZE, PD_HEADER_SIZE};
use crate::error::TwinkieError;
use crate::objects::DataObject;

/// Which logical channel a captured packet belongs to.
///
/// 4-bit field in the record metadata; values 8..=15 are outside the
/// recorder's vocabulary but are preserved so the frame's telemetry
/// survives a malformed metadata word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, FromPrimitive, Serialize, Deserialize)]
#[repr(u8)]
pub enum SopType {
    Sop = 0,
    SopPrime = 1,
    SopDoublePrime = 2,
    DebugPrime = 3,
    DebugDoublePrime = 4,
    HardReset = 5,
    CableReset = 6,
    Bist = 7,
    #[num_enum(catch_all)]
    Unknown(u8),
}

impl fmt::Display for SopType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SopType::Sop => write!(f, "SOP"),
            SopType::SopPrime => write!(f, "SOP'"),
            SopType::SopDoublePrime => write!(f, "SOP''"),
            SopType::DebugPrime => write!(f, "DBG'"),
            SopType::DebugDoublePrime => write!(f, "DBG''"),
            SopType::HardReset => write!(f, "HRST"),
            SopType::CableReset => write!(f, "CRST"),
            SopType::Bist => write!(f, "BIST"),
            SopType::Unknown(value) => write!(f, "SOP?{value}"),
        }
    }
}

/// CC line the recorder resolved for the packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, FromPrimitive, Serialize, Deserialize)]
#[repr(u8)]
pub enum CcLine {
    None = 0,
    Cc1 = 1,
    Cc2 = 2,
    #[num_enum(catch_all)]
    Unknown(u8),
}

impl fmt::Display for CcLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CcLine::None => write!(f, "---"),
            CcLine::Cc1 => write!(f, "CC1"),
            CcLine::Cc2 => write!(f, "CC2"),
            CcLine::Unknown(value) => write!(f, "CC?{value}"),
        }
    }
}

/// Port power role (header role bit on plain SOP frames).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum PowerRole {
    #[strum(to_string = "SNK")]
    Sink,
    #[strum(to_string = "SRC")]
    Source,
}

/// Cable plug (header role bit on SOP'/SOP'' frames).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum CablePlug {
    #[strum(to_string = "DFP/UFP")]
    DfpUfp,
    #[strum(to_string = "Cable")]
    CableVpd,
}

/// Port data role (only present on plain SOP frames).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum DataRole {
    #[strum(to_string = "UFP")]
    Ufp,
    #[strum(to_string = "DFP")]
    Dfp,
}

/// Meaning of the header's role bit, resolved from the SOP type.
///
/// The recorder leaves the bit's semantics undefined for SOP types other
/// than SOP/SOP'/SOP''; those decode as [`PortRole::Raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortRole {
    Port(PowerRole),
    Cable(CablePlug),
    Raw(u8),
}

impl fmt::Display for PortRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortRole::Port(role) => write!(f, "{role}"),
            PortRole::Cable(plug) => write!(f, "{plug}"),
            PortRole::Raw(bit) => write!(f, "role{bit}"),
        }
    }
}

/// Specification revision (USB PD R3.1 section 6.2.1.1.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize)]
#[repr(u8)]
pub enum SpecRevision {
    #[strum(to_string = "V1.0")]
    V1_0 = 0,
    #[strum(to_string = "V2.0")]
    V2_0 = 1,
    #[strum(to_string = "V3.0")]
    V3_0 = 2,
}

/// Control message types (USB PD R3.1 Table 6-5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum ControlMessageType {
    GoodCrc = 1,
    GotoMin = 2,
    Accept = 3,
    Reject = 4,
    Ping = 5,
    PsRdy = 6,
    GetSrcCap = 7,
    GetSnkCap = 8,
    DrSwap = 9,
    PrSwap = 10,
    VconnSwap = 11,
    Wait = 12,
    SoftReset = 13,
    DataReset = 14,
    DataResetComplete = 15,
    NotSupported = 16,
    GetSrcCapExt = 17,
    GetStatus = 18,
    FrSwap = 19,
    GetPpsStatus = 20,
    GetCountryCodes = 21,
    GetSnkCapExt = 22,
}

/// Data message types (USB PD R3.1 Table 6-6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum DataMessageType {
    SrcCap = 1,
    Request = 2,
    Bist = 3,
    SnkCap = 4,
    BatteryStatus = 5,
    Alert = 6,
    GetCountryInfo = 7,
    EnterUsb = 8,
    Vdm = 15,
}

/// Extended message types (USB PD R3.1 Table 6-53).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum ExtendedMessageType {
    ExtSrcCap = 1,
    ExtStatus = 2,
    ExtGetBatteryCap = 3,
    ExtBatteryCap = 4,
    ExtGetManufInfo = 5,
    ExtManufInfo = 6,
    ExtSecurityRequest = 7,
    ExtSecurityResponse = 8,
    ExtFwUpdateRequest = 9,
    ExtFwUpdateResponse = 10,
    ExtPpsStatus = 11,
    ExtCountryInfo = 12,
    ExtCountryCodes = 13,
}

/// Message type with its vocabulary class.
///
/// The class is chosen by the header, not by the 5-bit value alone:
/// `num_data_objects == 0` selects the control vocabulary regardless of the
/// extended flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    Control(ControlMessageType),
    Data(DataMessageType),
    Extended(ExtendedMessageType),
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Control(t) => write!(f, "ctrl msg: {t}"),
            MessageType::Data(t) => write!(f, "data msg: {t}"),
            MessageType::Extended(t) => write!(f, "extd msg: {t}"),
        }
    }
}

/// Decoded PD message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdHeader {
    pub extended: bool,
    pub num_data_objects: u8,
    pub message_id: u8,
    pub port_role: PortRole,
    pub spec_revision: SpecRevision,
    /// Present only when the enclosing frame is plain SOP.
    pub data_role: Option<DataRole>,
    pub message_type: MessageType,
}

impl PdHeader {
    /// Decode a header from a byte-swapped 2-byte region.
    ///
    /// Consumes 16 bits on plain SOP frames and 15 bits otherwise: the
    /// `data_role` bit does not exist on other channels and `message_type`
    /// shifts up accordingly.
    pub fn parse(cursor: &mut BitCursor<'_>, sop: SopType) -> Result<Self, TwinkieError> {
        let extended = cursor.take_bit()?;
        let num_data_objects = cursor.take_bits(3)? as u8;
        let message_id = cursor.take_bits(3)? as u8;

        let role_bit = cursor.take_bits(1)? as u8;
        let port_role = match sop {
            SopType::Sop => PortRole::Port(if role_bit == 1 {
                PowerRole::Source
            } else {
                PowerRole::Sink
            }),
            SopType::SopPrime | SopType::SopDoublePrime => PortRole::Cable(if role_bit == 1 {
                CablePlug::CableVpd
            } else {
                CablePlug::DfpUfp
            }),
            _ => PortRole::Raw(role_bit),
        };

        let spec_bits = cursor.take_bits(2)? as u8;
        let spec_revision =
            SpecRevision::try_from(spec_bits).map_err(|_| TwinkieError::UnknownVariant {
                field: "spec_revision",
                value: u64::from(spec_bits),
            })?;

        let data_role = if sop == SopType::Sop {
            Some(if cursor.take_bit()? { DataRole::Dfp } else { DataRole::Ufp })
        } else {
            None
        };

        let type_bits = cursor.take_bits(5)? as u8;
        let message_type = if num_data_objects == 0 {
            ControlMessageType::try_from(type_bits)
                .map(MessageType::Control)
                .map_err(|_| TwinkieError::UnknownMessageType {
                    class: "control",
                    value: type_bits,
                })?
        } else if extended {
            ExtendedMessageType::try_from(type_bits)
                .map(MessageType::Extended)
                .map_err(|_| TwinkieError::UnknownMessageType {
                    class: "extended",
                    value: type_bits,
                })?
        } else {
            DataMessageType::try_from(type_bits)
                .map(MessageType::Data)
                .map_err(|_| TwinkieError::UnknownMessageType {
                    class: "data",
                    value: type_bits,
                })?
        };

        Ok(Self {
            extended,
            num_data_objects,
            message_id,
            port_role,
            spec_revision,
            data_role,
            message_type,
        })
    }

    /// Body size in bytes of one data object for this message.
    fn object_size(&self) -> usize {
        match self.message_type {
            MessageType::Data(DataMessageType::BatteryStatus) => BATTERY_STATUS_OBJECT_SIZE,
            _ => DATA_OBJECT_SIZE,
        }
    }
}

/// One decoded PD packet: header plus exactly `num_data_objects` objects.
#[derive(Debug, Clone, PartialEq)]
pub struct PdMessage {
    pub header: PdHeader,
    pub objects: Vec<DataObject>,
}

impl PdMessage {
    /// Decode a message from the record payload following the telemetry
    /// header.
    ///
    /// The payload may extend past the message; the body length comes from
    /// the header's object count, never from the remaining buffer. Objects
    /// with unrecognized discriminants surface as [`DataObject::Invalid`]
    /// without disturbing their siblings.
    pub fn parse(payload: &[u8], sop: SopType) -> Result<Self, TwinkieError> {
        if payload.len() < PD_HEADER_SIZE {
            return Err(TwinkieError::TruncatedMessage(format!(
                "header needs {PD_HEADER_SIZE} bytes, {} available",
                payload.len()
            )));
        }
        let mut cursor = BitCursor::new(&payload[..PD_HEADER_SIZE]);
        let header = PdHeader::parse(&mut cursor, sop)?;

        let object_size = header.object_size();
        let mut objects = Vec::with_capacity(header.num_data_objects as usize);
        let mut offset = PD_HEADER_SIZE;
        for _ in 0..header.num_data_objects {
            let end = offset + object_size;
            if payload.len() < end {
                return Err(TwinkieError::TruncatedMessage(format!(
                    "body needs {} bytes, {} available",
                    end - PD_HEADER_SIZE,
                    payload.len() - PD_HEADER_SIZE
                )));
            }
            objects.push(DataObject::parse(&payload[offset..end], &header.message_type));
            offset = end;
        }

        Ok(Self { header, objects })
    }

    /// Bytes this message occupies on the wire (header plus body).
    pub fn wire_len(&self) -> usize {
        PD_HEADER_SIZE + self.objects.iter().map(DataObject::wire_size).sum::<usize>()
    }

    pub fn is_control(&self) -> bool {
        matches!(self.header.message_type, MessageType::Control(_))
    }
}
