pub mod bits;
pub mod constants;
pub mod error;
pub mod frame;
pub mod objects;
pub mod pd;
pub mod reader;

// Re-export the entry points for easy access
pub use error::TwinkieError;
pub use frame::CaptureFrame;
pub use pd::PdMessage;
pub use reader::CaptureReader;
