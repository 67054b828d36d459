// Wire-format constants for the recorder's capture files.

/// Size of one capture record (512 bytes, fixed by the recorder firmware)
pub const RECORD_SIZE: usize = 512;

/// Size of the telemetry header at the start of each record (20 bytes)
pub const FRAME_HEADER_SIZE: usize = 20;

/// Size of the PD message header (2 bytes)
pub const PD_HEADER_SIZE: usize = 2;

/// Size of one PD data object (4 bytes)
pub const DATA_OBJECT_SIZE: usize = 4;

/// Size of a battery status data object (8 bytes)
pub const BATTERY_STATUS_OBJECT_SIZE: usize = 8;
