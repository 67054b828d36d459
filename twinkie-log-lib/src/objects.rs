//! Data message objects: the 32-bit (and one 64-bit) bit-packed variants
//! carried in a PD data-message body.
//!
//! Every object type consumes its full declared width on every branch, so
//! an array of objects stays aligned even when one object's sub-variant is
//! unrecognized. Discriminants are always read before the branch; nothing
//! is probed.

use num_enum::{FromPrimitive, IntoPrimitive, TryFromPrimitive};
use std::fmt;
use strum_macros::Display;
use tracing::debug;

use crate::bits::BitCursor;
use crate::constants::{BATTERY_STATUS_OBJECT_SIZE, DATA_OBJECT_SIZE};
use crate::error::TwinkieError;
use crate::pd::{DataMessageType, MessageType};

/// Source capability entry (SRC_CAP body).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePdo {
    FixedSupply(FixedSupplyPdo),
    Battery(BatterySupplyPdo),
    VariableSupply(VariableSupplyPdo),
    Augmented(Apdo),
}

impl SourcePdo {
    pub fn parse(cursor: &mut BitCursor<'_>) -> Result<Self, TwinkieError> {
        // The 2-bit discriminant covers all four values; only the APDO
        // branch has a further discriminant that can be unknown.
        let pdo_type = cursor.take_bits(2)? as u8;
        match pdo_type {
            0 => FixedSupplyPdo::parse(cursor).map(Self::FixedSupply),
            1 => BatterySupplyPdo::parse(cursor).map(Self::Battery),
            2 => VariableSupplyPdo::parse(cursor).map(Self::VariableSupply),
            _ => Apdo::parse(cursor).map(Self::Augmented),
        }
    }
}

/// Fixed supply PDO, source (USB PD R3.1 Table 6-9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSupplyPdo {
    pub dual_role_power: bool,
    pub usb_suspend_supported: bool,
    pub unconstrained_power: bool,
    pub usb_communications_capable: bool,
    pub dual_role_data: bool,
    pub unchunked_extended_messages: bool,
    pub epr_mode_capable: bool,
    pub peak_current: u8,
    pub voltage_50mv: u16,
    pub max_current_10ma: u16,
}

impl FixedSupplyPdo {
    fn parse(cursor: &mut BitCursor<'_>) -> Result<Self, TwinkieError> {
        let dual_role_power = cursor.take_bit()?;
        let usb_suspend_supported = cursor.take_bit()?;
        let unconstrained_power = cursor.take_bit()?;
        let usb_communications_capable = cursor.take_bit()?;
        let dual_role_data = cursor.take_bit()?;
        let unchunked_extended_messages = cursor.take_bit()?;
        let epr_mode_capable = cursor.take_bit()?;
        cursor.skip(1)?;
        let peak_current = cursor.take_bits(2)? as u8;
        let voltage_50mv = cursor.take_bits(10)? as u16;
        let max_current_10ma = cursor.take_bits(10)? as u16;
        Ok(Self {
            dual_role_power,
            usb_suspend_supported,
            unconstrained_power,
            usb_communications_capable,
            dual_role_data,
            unchunked_extended_messages,
            epr_mode_capable,
            peak_current,
            voltage_50mv,
            max_current_10ma,
        })
    }

    pub fn voltage_v(&self) -> f64 {
        f64::from(self.voltage_50mv) * 0.05
    }

    pub fn max_current_a(&self) -> f64 {
        f64::from(self.max_current_10ma) * 0.01
    }
}

impl fmt::Display for FixedSupplyPdo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed {:.2} V {:.2} A", self.voltage_v(), self.max_current_a())
    }
}

/// Battery supply PDO, source (USB PD R3.1 Table 6-12).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatterySupplyPdo {
    pub max_voltage_50mv: u16,
    pub min_voltage_50mv: u16,
    pub max_power_250mw: u16,
}

impl BatterySupplyPdo {
    fn parse(cursor: &mut BitCursor<'_>) -> Result<Self, TwinkieError> {
        Ok(Self {
            max_voltage_50mv: cursor.take_bits(10)? as u16,
            min_voltage_50mv: cursor.take_bits(10)? as u16,
            max_power_250mw: cursor.take_bits(10)? as u16,
        })
    }

    pub fn max_power_w(&self) -> f64 {
        f64::from(self.max_power_250mw) * 0.25
    }
}

/// Variable supply (non-battery) PDO, source (USB PD R3.1 Table 6-11).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableSupplyPdo {
    pub max_voltage_50mv: u16,
    pub min_voltage_50mv: u16,
    pub max_current_10ma: u16,
}

impl VariableSupplyPdo {
    fn parse(cursor: &mut BitCursor<'_>) -> Result<Self, TwinkieError> {
        Ok(Self {
            max_voltage_50mv: cursor.take_bits(10)? as u16,
            min_voltage_50mv: cursor.take_bits(10)? as u16,
            max_current_10ma: cursor.take_bits(10)? as u16,
        })
    }
}

/// Augmented PDO (USB PD R3.1 Table 6-8). The 2-bit APDO type selects the
/// 28-bit remainder layout; values 2 and 3 are reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Apdo {
    SprPps(SprPpsApdo),
    EprAvs(EprAvsApdo),
}

impl Apdo {
    fn parse(cursor: &mut BitCursor<'_>) -> Result<Self, TwinkieError> {
        let apdo_type = cursor.take_bits(2)? as u8;
        match apdo_type {
            0 => SprPpsApdo::parse(cursor).map(Self::SprPps),
            1 => EprAvsApdo::parse(cursor).map(Self::EprAvs),
            value => Err(TwinkieError::UnknownVariant {
                field: "apdo_type",
                value: u64::from(value),
            }),
        }
    }
}

/// SPR programmable power supply APDO (USB PD R3.1 Table 6-13).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SprPpsApdo {
    pub power_limited: bool,
    pub max_voltage_100mv: u8,
    pub min_voltage_100mv: u8,
    pub max_current_50ma: u8,
}

impl SprPpsApdo {
    fn parse(cursor: &mut BitCursor<'_>) -> Result<Self, TwinkieError> {
        let power_limited = cursor.take_bit()?;
        cursor.skip(2)?;
        let max_voltage_100mv = cursor.take_bits(8)? as u8;
        cursor.skip(1)?;
        let min_voltage_100mv = cursor.take_bits(8)? as u8;
        cursor.skip(1)?;
        let max_current_50ma = cursor.take_bits(7)? as u8;
        Ok(Self {
            power_limited,
            max_voltage_100mv,
            min_voltage_100mv,
            max_current_50ma,
        })
    }

    pub fn max_voltage_v(&self) -> f64 {
        f64::from(self.max_voltage_100mv) * 0.1
    }

    pub fn max_current_a(&self) -> f64 {
        f64::from(self.max_current_50ma) * 0.05
    }
}

/// EPR adjustable voltage supply APDO (USB PD R3.1 Table 6-14).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EprAvsApdo {
    pub peak_current: u8,
    pub max_voltage_100mv: u16,
    pub min_voltage_100mv: u8,
    pub pdp_1w: u8,
}

impl EprAvsApdo {
    fn parse(cursor: &mut BitCursor<'_>) -> Result<Self, TwinkieError> {
        let peak_current = cursor.take_bits(2)? as u8;
        let max_voltage_100mv = cursor.take_bits(9)? as u16;
        cursor.skip(1)?;
        let min_voltage_100mv = cursor.take_bits(8)? as u8;
        let pdp_1w = cursor.take_bits(8)? as u8;
        Ok(Self {
            peak_current,
            max_voltage_100mv,
            min_voltage_100mv,
            pdp_1w,
        })
    }
}

/// Sink capability entry. SNK_CAP bodies are not auto-dispatched (the
/// recorder's logs rarely carry them); decode via [`RawObject::as_sink_pdo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkPdo {
    FixedSupply(FixedSinkPdo),
    Battery(BatterySinkPdo),
    VariableSupply(VariableSinkPdo),
    Augmented(Apdo),
}

impl SinkPdo {
    pub fn parse(region: &[u8]) -> Result<Self, TwinkieError> {
        let mut cursor = BitCursor::new(region);
        let pdo_type = cursor.take_bits(2)? as u8;
        match pdo_type {
            0 => FixedSinkPdo::parse(&mut cursor).map(Self::FixedSupply),
            1 => BatterySinkPdo::parse(&mut cursor).map(Self::Battery),
            2 => VariableSinkPdo::parse(&mut cursor).map(Self::VariableSupply),
            _ => Apdo::parse(&mut cursor).map(Self::Augmented),
        }
    }
}

/// Fixed supply PDO, sink (USB PD R3.1 Table 6-16).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSinkPdo {
    pub dual_role_power: bool,
    pub higher_capability: bool,
    pub unconstrained_power: bool,
    pub usb_communications_capable: bool,
    pub dual_role_data: bool,
    pub fast_role_swap: u8,
    pub voltage_50mv: u16,
    pub operational_current_10ma: u16,
}

impl FixedSinkPdo {
    fn parse(cursor: &mut BitCursor<'_>) -> Result<Self, TwinkieError> {
        let dual_role_power = cursor.take_bit()?;
        let higher_capability = cursor.take_bit()?;
        let unconstrained_power = cursor.take_bit()?;
        let usb_communications_capable = cursor.take_bit()?;
        let dual_role_data = cursor.take_bit()?;
        let fast_role_swap = cursor.take_bits(2)? as u8;
        cursor.skip(3)?;
        let voltage_50mv = cursor.take_bits(10)? as u16;
        let operational_current_10ma = cursor.take_bits(10)? as u16;
        Ok(Self {
            dual_role_power,
            higher_capability,
            unconstrained_power,
            usb_communications_capable,
            dual_role_data,
            fast_role_swap,
            voltage_50mv,
            operational_current_10ma,
        })
    }
}

/// Battery supply PDO, sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatterySinkPdo {
    pub max_voltage_50mv: u16,
    pub min_voltage_50mv: u16,
    pub operational_power_250mw: u16,
}

impl BatterySinkPdo {
    fn parse(cursor: &mut BitCursor<'_>) -> Result<Self, TwinkieError> {
        Ok(Self {
            max_voltage_50mv: cursor.take_bits(10)? as u16,
            min_voltage_50mv: cursor.take_bits(10)? as u16,
            operational_power_250mw: cursor.take_bits(10)? as u16,
        })
    }
}

/// Variable supply PDO, sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableSinkPdo {
    pub max_voltage_50mv: u16,
    pub min_voltage_50mv: u16,
    pub operational_current_10ma: u16,
}

impl VariableSinkPdo {
    fn parse(cursor: &mut BitCursor<'_>) -> Result<Self, TwinkieError> {
        Ok(Self {
            max_voltage_50mv: cursor.take_bits(10)? as u16,
            min_voltage_50mv: cursor.take_bits(10)? as u16,
            operational_current_10ma: cursor.take_bits(10)? as u16,
        })
    }
}

/// Which request object layout applies. The layout depends on the type of
/// the PDO the request references, which only the caller can know, so
/// request decoding is always opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdoKind {
    FixedVariable,
    Battery,
    Pps,
    Avs,
}

/// Max/min limit whose meaning is selected by the GiveBack flag already
/// read from the same object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdoLimit {
    Maximum(u16),
    Minimum(u16),
}

/// Request data object, decoded on caller opt-in (see [`RdoKind`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestObject {
    FixedVariable(FixedVariableRdo),
    Battery(BatteryRdo),
    Pps(PpsRdo),
    Avs(AvsRdo),
}

impl RequestObject {
    pub fn parse(region: &[u8], kind: RdoKind) -> Result<Self, TwinkieError> {
        let mut cursor = BitCursor::new(region);
        match kind {
            RdoKind::FixedVariable => FixedVariableRdo::parse(&mut cursor).map(Self::FixedVariable),
            RdoKind::Battery => BatteryRdo::parse(&mut cursor).map(Self::Battery),
            RdoKind::Pps => PpsRdo::parse(&mut cursor).map(Self::Pps),
            RdoKind::Avs => AvsRdo::parse(&mut cursor).map(Self::Avs),
        }
    }
}

/// Fixed and variable supply request (USB PD R3.1 Table 6-24).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedVariableRdo {
    pub object_position: u8,
    pub give_back: bool,
    pub capability_mismatch: bool,
    pub usb_communications_capable: bool,
    pub no_usb_suspend: bool,
    pub unchunked_extended_messages: bool,
    pub epr_mode_capable: bool,
    pub operating_current_10ma: u16,
    /// Maximum operating current without GiveBack, minimum with it.
    pub current_limit_10ma: RdoLimit,
}

impl FixedVariableRdo {
    fn parse(cursor: &mut BitCursor<'_>) -> Result<Self, TwinkieError> {
        let object_position = cursor.take_bits(4)? as u8;
        let give_back = cursor.take_bit()?;
        let capability_mismatch = cursor.take_bit()?;
        let usb_communications_capable = cursor.take_bit()?;
        let no_usb_suspend = cursor.take_bit()?;
        let unchunked_extended_messages = cursor.take_bit()?;
        let epr_mode_capable = cursor.take_bit()?;
        cursor.skip(2)?;
        let operating_current_10ma = cursor.take_bits(10)? as u16;
        let limit = cursor.take_bits(10)? as u16;
        let current_limit_10ma = if give_back {
            RdoLimit::Minimum(limit)
        } else {
            RdoLimit::Maximum(limit)
        };
        Ok(Self {
            object_position,
            give_back,
            capability_mismatch,
            usb_communications_capable,
            no_usb_suspend,
            unchunked_extended_messages,
            epr_mode_capable,
            operating_current_10ma,
            current_limit_10ma,
        })
    }
}

/// Battery supply request (USB PD R3.1 Table 6-26).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryRdo {
    pub object_position: u8,
    pub give_back: bool,
    pub capability_mismatch: bool,
    pub usb_communications_capable: bool,
    pub no_usb_suspend: bool,
    pub unchunked_extended_messages: bool,
    pub epr_mode_capable: bool,
    pub operating_power_250mw: u16,
    pub power_limit_250mw: RdoLimit,
}

impl BatteryRdo {
    fn parse(cursor: &mut BitCursor<'_>) -> Result<Self, TwinkieError> {
        let object_position = cursor.take_bits(4)? as u8;
        let give_back = cursor.take_bit()?;
        let capability_mismatch = cursor.take_bit()?;
        let usb_communications_capable = cursor.take_bit()?;
        let no_usb_suspend = cursor.take_bit()?;
        let unchunked_extended_messages = cursor.take_bit()?;
        let epr_mode_capable = cursor.take_bit()?;
        cursor.skip(2)?;
        let operating_power_250mw = cursor.take_bits(10)? as u16;
        let limit = cursor.take_bits(10)? as u16;
        let power_limit_250mw = if give_back {
            RdoLimit::Minimum(limit)
        } else {
            RdoLimit::Maximum(limit)
        };
        Ok(Self {
            object_position,
            give_back,
            capability_mismatch,
            usb_communications_capable,
            no_usb_suspend,
            unchunked_extended_messages,
            epr_mode_capable,
            operating_power_250mw,
            power_limit_250mw,
        })
    }
}

/// PPS request (USB PD R3.1 Table 6-27). No GiveBack on programmable
/// requests; the flag position is reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PpsRdo {
    pub object_position: u8,
    pub capability_mismatch: bool,
    pub usb_communications_capable: bool,
    pub no_usb_suspend: bool,
    pub unchunked_extended_messages: bool,
    pub epr_mode_capable: bool,
    pub output_voltage_20mv: u16,
    pub operating_current_50ma: u8,
}

impl PpsRdo {
    fn parse(cursor: &mut BitCursor<'_>) -> Result<Self, TwinkieError> {
        let object_position = cursor.take_bits(4)? as u8;
        cursor.skip(1)?;
        let capability_mismatch = cursor.take_bit()?;
        let usb_communications_capable = cursor.take_bit()?;
        let no_usb_suspend = cursor.take_bit()?;
        let unchunked_extended_messages = cursor.take_bit()?;
        let epr_mode_capable = cursor.take_bit()?;
        cursor.skip(2)?;
        let output_voltage_20mv = cursor.take_bits(11)? as u16;
        cursor.skip(2)?;
        let operating_current_50ma = cursor.take_bits(7)? as u8;
        Ok(Self {
            object_position,
            capability_mismatch,
            usb_communications_capable,
            no_usb_suspend,
            unchunked_extended_messages,
            epr_mode_capable,
            output_voltage_20mv,
            operating_current_50ma,
        })
    }
}

/// AVS request (USB PD R3.1 Table 6-28). Same shape as [`PpsRdo`] with the
/// output voltage in 25 mV steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvsRdo {
    pub object_position: u8,
    pub capability_mismatch: bool,
    pub usb_communications_capable: bool,
    pub no_usb_suspend: bool,
    pub unchunked_extended_messages: bool,
    pub epr_mode_capable: bool,
    pub output_voltage_25mv: u16,
    pub operating_current_50ma: u8,
}

impl AvsRdo {
    fn parse(cursor: &mut BitCursor<'_>) -> Result<Self, TwinkieError> {
        let object_position = cursor.take_bits(4)? as u8;
        cursor.skip(1)?;
        let capability_mismatch = cursor.take_bit()?;
        let usb_communications_capable = cursor.take_bit()?;
        let no_usb_suspend = cursor.take_bit()?;
        let unchunked_extended_messages = cursor.take_bit()?;
        let epr_mode_capable = cursor.take_bit()?;
        cursor.skip(2)?;
        let output_voltage_25mv = cursor.take_bits(11)? as u16;
        cursor.skip(2)?;
        let operating_current_50ma = cursor.take_bits(7)? as u8;
        Ok(Self {
            object_position,
            capability_mismatch,
            usb_communications_capable,
            no_usb_suspend,
            unchunked_extended_messages,
            epr_mode_capable,
            output_voltage_25mv,
            operating_current_50ma,
        })
    }
}

/// BIST data object: the mode nibble, rest reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BistObject {
    pub mode: u8,
}

impl BistObject {
    fn parse(cursor: &mut BitCursor<'_>) -> Result<Self, TwinkieError> {
        let mode = cursor.take_bits(4)? as u8;
        cursor.skip(28)?;
        Ok(Self { mode })
    }
}

/// Structured VDM command type (USB PD R3.1 Table 6-36).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum VdmCommandType {
    #[strum(to_string = "REQ")]
    Request = 0,
    #[strum(to_string = "ACK")]
    Ack = 1,
    #[strum(to_string = "NAK")]
    Nak = 2,
    #[strum(to_string = "BUSY")]
    Busy = 3,
}

/// Structured VDM command. SVID-specific commands (16..=31) and reserved
/// values are preserved through the catch-all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum VdmCommand {
    DiscoverIdentity = 1,
    DiscoverSvids = 2,
    DiscoverModes = 3,
    EnterMode = 4,
    ExitMode = 5,
    Attention = 6,
    #[num_enum(catch_all)]
    Other(u8),
}

/// Vendor-defined message object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VdmObject {
    pub vid: u16,
    pub payload: VdmPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VdmPayload {
    Structured(StructuredVdm),
    /// The remaining 15 bits, opaque to the protocol layer.
    Unstructured(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuredVdm {
    pub version_major: u8,
    pub version_minor: u8,
    pub object_position: u8,
    pub command_type: VdmCommandType,
    pub command: VdmCommand,
}

impl VdmObject {
    fn parse(cursor: &mut BitCursor<'_>) -> Result<Self, TwinkieError> {
        let vid = cursor.take_bits(16)? as u16;
        let structured = cursor.take_bit()?;
        let payload = if structured {
            let version_major = cursor.take_bits(2)? as u8;
            let version_minor = cursor.take_bits(2)? as u8;
            let object_position = cursor.take_bits(3)? as u8;
            let command_type_bits = cursor.take_bits(2)? as u8;
            let command_type = VdmCommandType::try_from(command_type_bits).map_err(|_| {
                TwinkieError::UnknownVariant {
                    field: "vdm_command_type",
                    value: u64::from(command_type_bits),
                }
            })?;
            cursor.skip(1)?;
            let command = VdmCommand::from_primitive(cursor.take_bits(5)? as u8);
            VdmPayload::Structured(StructuredVdm {
                version_major,
                version_minor,
                object_position,
                command_type,
                command,
            })
        } else {
            VdmPayload::Unstructured(cursor.take_bits(15)? as u16)
        };
        Ok(Self { vid, payload })
    }
}

/// Battery charging state (battery status object).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum ChargeStatus {
    Charging = 0,
    Discharging = 1,
    Idle = 2,
}

/// Battery status data object: the one 64-bit object in the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryStatusObject {
    /// Capacity in 0.1 Wh steps.
    pub capacity: u16,
    pub charge_status: ChargeStatus,
    pub present: bool,
    pub invalid_reference: bool,
}

impl BatteryStatusObject {
    fn parse(cursor: &mut BitCursor<'_>) -> Result<Self, TwinkieError> {
        let capacity = cursor.take_bits(16)? as u16;
        cursor.skip(4)?;
        let status_bits = cursor.take_bits(2)? as u8;
        let charge_status =
            ChargeStatus::try_from(status_bits).map_err(|_| TwinkieError::UnknownVariant {
                field: "charge_status",
                value: u64::from(status_bits),
            })?;
        let present = cursor.take_bit()?;
        let invalid_reference = cursor.take_bit()?;
        cursor.skip(40)?;
        Ok(Self {
            capacity,
            charge_status,
            present,
            invalid_reference,
        })
    }

    pub fn capacity_wh(&self) -> f64 {
        f64::from(self.capacity) * 0.1
    }
}

/// Alert data object (USB PD R3.1 Table 6-44).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertObject {
    pub extended_alert: bool,
    pub ovp: bool,
    pub source_input_change: bool,
    pub operating_condition_change: bool,
    pub otp: bool,
    pub ocp: bool,
    pub battery_status_change: bool,
    pub fixed_batteries: u8,
    pub hot_swappable_batteries: u8,
    pub extended_event_type: u8,
}

impl AlertObject {
    fn parse(cursor: &mut BitCursor<'_>) -> Result<Self, TwinkieError> {
        let extended_alert = cursor.take_bit()?;
        let ovp = cursor.take_bit()?;
        let source_input_change = cursor.take_bit()?;
        let operating_condition_change = cursor.take_bit()?;
        let otp = cursor.take_bit()?;
        let ocp = cursor.take_bit()?;
        let battery_status_change = cursor.take_bit()?;
        cursor.skip(1)?;
        let fixed_batteries = cursor.take_bits(4)? as u8;
        let hot_swappable_batteries = cursor.take_bits(4)? as u8;
        cursor.skip(12)?;
        let extended_event_type = cursor.take_bits(4)? as u8;
        Ok(Self {
            extended_alert,
            ovp,
            source_input_change,
            operating_condition_change,
            otp,
            ocp,
            battery_status_change,
            fixed_batteries,
            hot_swappable_batteries,
            extended_event_type,
        })
    }
}

/// Country code data object: two ASCII letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountryCodeObject {
    pub first: u8,
    pub second: u8,
}

impl CountryCodeObject {
    fn parse(cursor: &mut BitCursor<'_>) -> Result<Self, TwinkieError> {
        let first = cursor.take_bits(8)? as u8;
        let second = cursor.take_bits(8)? as u8;
        cursor.skip(16)?;
        Ok(Self { first, second })
    }

    pub fn code(&self) -> String {
        format!("{}{}", self.first as char, self.second as char)
    }
}

/// Enter USB data object (USB PD R3.1 Table 6-47). Sub-fields stay raw
/// integers; the reserved vocabulary churns between revisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnterUsbObject {
    pub usb_mode: u8,
    pub usb4_drd: bool,
    pub usb3_drd: bool,
    pub cable_speed: u8,
    pub cable_type: u8,
    pub cable_current: u8,
    pub pcie_supported: bool,
    pub dp_supported: bool,
    pub tbt_supported: bool,
    pub host_present: bool,
}

impl EnterUsbObject {
    fn parse(cursor: &mut BitCursor<'_>) -> Result<Self, TwinkieError> {
        cursor.skip(1)?;
        let usb_mode = cursor.take_bits(3)? as u8;
        cursor.skip(1)?;
        let usb4_drd = cursor.take_bit()?;
        let usb3_drd = cursor.take_bit()?;
        cursor.skip(1)?;
        let cable_speed = cursor.take_bits(3)? as u8;
        let cable_type = cursor.take_bits(2)? as u8;
        let cable_current = cursor.take_bits(2)? as u8;
        let pcie_supported = cursor.take_bit()?;
        let dp_supported = cursor.take_bit()?;
        let tbt_supported = cursor.take_bit()?;
        let host_present = cursor.take_bit()?;
        cursor.skip(13)?;
        Ok(Self {
            usb_mode,
            usb4_drd,
            usb3_drd,
            cable_speed,
            cable_type,
            cable_current,
            pcie_supported,
            dp_supported,
            tbt_supported,
            host_present,
        })
    }
}

/// A 32-bit object kept undecoded: REQUEST and SNK_CAP bodies, and objects
/// of extended messages (chunk data, not data objects).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawObject {
    pub raw: u32,
}

impl RawObject {
    /// The object's bytes in wire (little-endian) order.
    pub fn wire_bytes(&self) -> [u8; 4] {
        self.raw.to_le_bytes()
    }

    /// Re-parse as a request object; the caller supplies the layout kind
    /// (it depends on the PDO the request references).
    pub fn as_request(&self, kind: RdoKind) -> Result<RequestObject, TwinkieError> {
        RequestObject::parse(&self.wire_bytes(), kind)
    }

    /// Re-parse as a sink capability entry.
    pub fn as_sink_pdo(&self) -> Result<SinkPdo, TwinkieError> {
        SinkPdo::parse(&self.wire_bytes())
    }
}

/// An object whose discriminant fell outside its vocabulary. The raw bits
/// are retained for diagnostics; siblings in the same message decode
/// normally.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidObject {
    pub raw: u64,
    pub width_bits: u8,
    pub error: TwinkieError,
}

/// One decoded data object; the active variant is fixed by the enclosing
/// message type and the object's own discriminant bits.
#[derive(Debug, Clone, PartialEq)]
pub enum DataObject {
    SourceCapability(SourcePdo),
    Bist(BistObject),
    Vdm(VdmObject),
    BatteryStatus(BatteryStatusObject),
    Alert(AlertObject),
    CountryCode(CountryCodeObject),
    EnterUsb(EnterUsbObject),
    Raw(RawObject),
    Invalid(InvalidObject),
}

impl DataObject {
    /// Decode one object from its own byte region. Never fails: an
    /// unrecognized discriminant becomes [`DataObject::Invalid`] carrying
    /// the raw bits, so the enclosing array keeps its alignment and its
    /// remaining siblings.
    pub(crate) fn parse(region: &[u8], message_type: &MessageType) -> Self {
        let width = (region.len() * 8) as u32;
        let mut cursor = BitCursor::new(region);
        let raw = cursor.peek_bits(width).unwrap_or(0);

        let decoded = match message_type {
            MessageType::Data(DataMessageType::SrcCap) => {
                SourcePdo::parse(&mut cursor).map(Self::SourceCapability)
            }
            MessageType::Data(DataMessageType::Bist) => {
                BistObject::parse(&mut cursor).map(Self::Bist)
            }
            MessageType::Data(DataMessageType::Vdm) => VdmObject::parse(&mut cursor).map(Self::Vdm),
            MessageType::Data(DataMessageType::BatteryStatus) => {
                BatteryStatusObject::parse(&mut cursor).map(Self::BatteryStatus)
            }
            MessageType::Data(DataMessageType::Alert) => {
                AlertObject::parse(&mut cursor).map(Self::Alert)
            }
            MessageType::Data(DataMessageType::GetCountryInfo) => {
                CountryCodeObject::parse(&mut cursor).map(Self::CountryCode)
            }
            MessageType::Data(DataMessageType::EnterUsb) => {
                EnterUsbObject::parse(&mut cursor).map(Self::EnterUsb)
            }
            // REQUEST and SNK_CAP have schemas (RequestObject, SinkPdo) but
            // no automatic dispatch: the right layout depends on state the
            // decoder does not track. Extended-message bodies are chunk
            // data. All of these stay raw for the caller.
            _ => Ok(Self::Raw(RawObject { raw: raw as u32 })),
        };

        match decoded {
            Ok(object) => object,
            Err(error) => {
                debug!(%error, raw, "data object marked invalid");
                Self::Invalid(InvalidObject {
                    raw,
                    width_bits: width as u8,
                    error,
                })
            }
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, DataObject::Invalid(_))
    }

    /// Bytes this object occupies on the wire.
    pub fn wire_size(&self) -> usize {
        match self {
            DataObject::BatteryStatus(_) => BATTERY_STATUS_OBJECT_SIZE,
            DataObject::Invalid(invalid) => usize::from(invalid.width_bits) / 8,
            _ => DATA_OBJECT_SIZE,
        }
    }
}
