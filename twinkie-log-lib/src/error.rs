use thiserror::Error;

/// The primary error type for the `twinkie-log` library.
///
/// Errors are values: invalid objects and undecodable messages keep their
/// error alongside the retained raw bits, so the enum is comparable and
/// cloneable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TwinkieError {
    #[error("truncated record: needed {needed} bits, {available} available")]
    TruncatedRecord { needed: usize, available: usize },

    #[error("truncated message: {0}")]
    TruncatedMessage(String),

    #[error("unknown value {value} for {field}")]
    UnknownVariant { field: &'static str, value: u64 },

    #[error("unknown {class} message type {value}")]
    UnknownMessageType { class: &'static str, value: u8 },

    #[error("capture length is not a multiple of the record size: {trailing} trailing bytes")]
    TrailingBytes { trailing: usize },
}
