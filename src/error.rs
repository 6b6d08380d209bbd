//! Error definitions shared across library modules.
//! The safety hooks themselves never fail: they answer with `bool`/`Option`.
//! Errors only exist at the edges (frame construction, signal codec,
//! configuration, gateway I/O).
use thiserror_no_std::Error;

//==================================================================================FRAME_ERROR
#[derive(Error, Debug, PartialEq, Eq)]
/// Errors that can occur while building a CAN frame.
pub enum FrameError {
    /// Classic CAN frames carry at most eight bytes.
    #[error("Payload too long: {len} bytes (max 8)")]
    PayloadTooLong { len: usize },
}

//==================================================================================CONFIG_ERROR
#[derive(Error, Debug, PartialEq, Eq)]
/// Errors raised while selecting a hardware configuration.
pub enum ConfigError {
    /// The safety-model number does not map to a known Honda platform.
    #[error("Unknown hardware variant: {raw}")]
    UnknownHardware { raw: u16 },
}

//================================================================================SIGNAL_ERROR
#[derive(Error, Debug, PartialEq, Eq)]
/// Failures while decoding or packing a named signal.
pub enum SignalError {
    /// The message layout has no signal with this name.
    #[error("Signal {name} not found in {message}")]
    UnknownSignal {
        name: &'static str,
        message: &'static str,
    },
    /// The frame is shorter than the layout requires.
    #[error("Frame too short for {message}: {len} bytes, {required} required")]
    FrameTooShort {
        message: &'static str,
        len: usize,
        required: usize,
    },
    /// Value does not fit into the signal width.
    #[error("Value {value} out of range for {name}")]
    ValueOutOfRange { name: &'static str, value: i64 },
    /// Bit-level access failed.
    #[error("BitReader error: {err}")]
    BitReaderError { err: BitReaderError },
    /// Bit-level write failed.
    #[error("BitWriter error: {err}")]
    BitWriterError { err: BitWriterError },
}

impl From<BitReaderError> for SignalError {
    fn from(err: BitReaderError) -> Self {
        SignalError::BitReaderError { err }
    }
}

impl From<BitWriterError> for SignalError {
    fn from(err: BitWriterError) -> Self {
        SignalError::BitWriterError { err }
    }
}

//==================================================================================GATEWAY_ERROR
#[derive(Debug, Error)]
/// Errors surfaced by the frame-dispatch loop.
pub enum GatewayError<E: core::fmt::Debug> {
    /// Unable to receive frames from the bus.
    #[error("CAN bus receive error: {0:?}")]
    Receive(E),
    /// CAN layer refused or failed to send the frame.
    #[error("CAN bus send error: {0:?}")]
    Send(E),
}

//==================================================================================BITREADER_ERRORS
#[derive(Debug, Error, PartialEq, Eq)]
/// Errors raised during bitwise buffer reads.
pub enum BitReaderError {
    /// Attempted to read past the end of the buffer.
    #[error("Attempted to read out of bounds -> bit: {bit}, available: {available}")]
    OutOfBounds { bit: usize, available: usize },
    /// Requested more bits than the target type can hold.
    #[error("Cannot read more than {max} bits. Requested: {asked}")]
    TooLongForType { max: u8, asked: u8 },
}
//==================================================================================BITWRITER_ERRORS
#[derive(Debug, Error, PartialEq, Eq)]
/// Errors raised during bitwise writes into a buffer.
pub enum BitWriterError {
    /// Attempted to write beyond the provided capacity.
    #[error("Attempted to write out of bounds -> bit: {bit}, available: {available}")]
    OutOfBounds { bit: usize, available: usize },
    /// Field is too large for the provided type.
    #[error("Cannot write more than {max} bits. Requested: {asked}")]
    TooLongForType { max: u8, asked: u8 },
}
