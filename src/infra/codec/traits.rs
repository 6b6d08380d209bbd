//! Public traits exposed by the codec engine. They decouple frame
//! representations from the descriptor-driven decoding logic.
use crate::core::MessageDescriptor;
use crate::error::SignalError;
use crate::infra::codec::engine;

//==================================================================================SIGNAL_ACCESS
/// Anything carrying a CAN payload can expose named, decoded signals.
///
/// ```rust, ignore
/// use can_gatekeeper::protocol::messages::STEERING_CONTROL;
///
/// let torque = frame.signal(&STEERING_CONTROL, "STEER_TORQUE")?;
/// ```
pub trait SignalAccess {
    /// Raw payload bytes (only the valid `len` bytes).
    fn payload(&self) -> &[u8];

    /// Decode `name` from the payload using the `descriptor` layout.
    fn signal(
        &self,
        descriptor: &'static MessageDescriptor,
        name: &'static str,
    ) -> Result<i64, SignalError> {
        engine::decode(descriptor, self.payload(), name)
    }

    /// Boolean view of a signal: any non-zero raw value is `true`.
    fn flag(
        &self,
        descriptor: &'static MessageDescriptor,
        name: &'static str,
    ) -> Result<bool, SignalError> {
        self.signal(descriptor, name).map(|v| v != 0)
    }
}
