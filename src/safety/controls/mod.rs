//! Control-enable state machine.
//!
//! `controls_allowed` is a single bit. Everything the tracker or the gate
//! observes is turned into a [`ControlEvent`] and folded through
//! [`transition`]; actuation is then granted by [`actuation_allowed`].
use crate::safety::hardware::UnsafeMode;
use crate::safety::tracker::{VehicleState, INTERCEPTOR_THRESHOLD};

/// Observation that may move the enable state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlEvent {
    /// SET or RESUME cruise button.
    Engage,
    /// CANCEL cruise button.
    Cancel,
    /// Brake pressed on a rising edge, or held while moving.
    BrakePressed,
    /// Gas pedal rising edge.
    GasPressed,
    /// Interceptor reading crossed the threshold.
    InterceptorPressed,
    /// A tracked message failed the counter/checksum gate.
    IntegrityFault,
    /// Our steering ids showed up on the car side of the relay.
    RelayMalfunction,
}

/// Next value of `controls_allowed`.
pub fn transition(allowed: bool, event: ControlEvent, unsafe_mode: UnsafeMode) -> bool {
    match event {
        ControlEvent::Engage => true,
        ControlEvent::GasPressed | ControlEvent::InterceptorPressed => {
            allowed && unsafe_mode.gas_override()
        }
        ControlEvent::Cancel
        | ControlEvent::BrakePressed
        | ControlEvent::IntegrityFault
        | ControlEvent::RelayMalfunction => false,
    }
}

/// A pedal currently overrides actuation.
pub fn pedal_pressed(vehicle: &VehicleState, unsafe_mode: UnsafeMode) -> bool {
    let braking = vehicle.brake_pressed_prev && vehicle.vehicle_moving;
    let accelerating = vehicle.gas_pressed_prev
        || vehicle.gas_interceptor_prev > INTERCEPTOR_THRESHOLD;
    braking || (!unsafe_mode.gas_override() && accelerating)
}

/// Effective enable used by the transmit validator.
pub fn actuation_allowed(
    controls_allowed: bool,
    vehicle: &VehicleState,
    unsafe_mode: UnsafeMode,
) -> bool {
    controls_allowed && !pedal_pressed(vehicle, unsafe_mode)
}
