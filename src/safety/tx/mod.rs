//! Transmit validator: the only authority deciding whether an outbound
//! actuation frame may reach the car.
use crate::core::MessageDescriptor;
use crate::infra::codec::traits::SignalAccess;
use crate::protocol::messages::{
    CruiseButton, ACC_CONTROL, ACC_CONTROL_ID, BRAKE_COMMAND, BRAKE_COMMAND_ID, GAS_COMMAND,
    GAS_COMMAND_ID, SCM_BUTTONS, SCM_BUTTONS_ID, STEERING_CONTROL, STEERING_CONTROL_CRV,
    STEERING_CONTROL_CRV_ID, STEERING_CONTROL_ID,
};
use crate::protocol::transport::can_frame::CanFrame;
use crate::safety::hardware::{BrakeEncoding, HardwareConfig};

/// Highest `COMPUTER_BRAKE` accepted on Nidec.
pub const NIDEC_MAX_BRAKE: i64 = 255;
/// Highest brake magnitude accepted in Bosch `ACC_CONTROL`.
pub const BOSCH_MAX_BRAKE: i64 = 350;
/// Highest gas command accepted in Bosch `ACC_CONTROL`.
pub const BOSCH_MAX_GAS: i64 = 2000;
/// Gas command meaning "no gas".
pub const BOSCH_NO_GAS: i64 = -30000;

/// Why a frame was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxDenial {
    /// `(id, bus)` is not in the variant whitelist.
    NotWhitelisted,
    /// Nonzero actuation while controls are not allowed.
    ControlsNotAllowed,
    /// Actuation outside the variant limits.
    OutOfBounds,
    /// Stock AEB is being forwarded: our brake frames are blocked.
    BrakeForwarding,
    /// Frame cannot be decoded with its layout.
    Malformed,
}

/// Everything the validator reads from the safety state.
#[derive(Debug, Clone, Copy)]
pub struct TxContext<'a> {
    pub config: &'a HardwareConfig,
    /// `controls_allowed` with pedal overrides already applied.
    pub actuation_allowed: bool,
    pub fwd_brake: bool,
}

/// Validate one outbound frame. Checks run in a fixed order and the first
/// failure denies.
pub fn validate(ctx: &TxContext<'_>, frame: &CanFrame) -> Result<(), TxDenial> {
    let config = ctx.config;
    if !config.tx_allowed(frame.id, frame.bus) {
        return Err(TxDenial::NotWhitelisted);
    }
    let allowed = ctx.actuation_allowed;
    let on_pt = frame.bus == config.pt_bus;

    match (frame.id, config.brake) {
        (BRAKE_COMMAND_ID, BrakeEncoding::NidecBrakeCommand) if on_pt => {
            let brake = read(frame, &BRAKE_COMMAND, "COMPUTER_BRAKE")?;
            if ctx.fwd_brake {
                return Err(TxDenial::BrakeForwarding);
            }
            if !allowed && brake != 0 {
                return Err(TxDenial::ControlsNotAllowed);
            }
            if brake > NIDEC_MAX_BRAKE {
                return Err(TxDenial::OutOfBounds);
            }
        }
        (ACC_CONTROL_ID, BrakeEncoding::BoschAccControl) if on_pt => {
            let gas = read(frame, &ACC_CONTROL, "GAS_COMMAND")?;
            let brake = read(frame, &ACC_CONTROL, "BRAKE_REQUEST")?;
            if !allowed && (brake != 0 || gas != BOSCH_NO_GAS) {
                return Err(TxDenial::ControlsNotAllowed);
            }
            if brake.abs() > BOSCH_MAX_BRAKE || !(BOSCH_NO_GAS..=BOSCH_MAX_GAS).contains(&gas) {
                return Err(TxDenial::OutOfBounds);
            }
            // Braking and accelerating in the same frame is refused.
            if brake != 0 && gas != BOSCH_NO_GAS {
                return Err(TxDenial::OutOfBounds);
            }
        }
        (GAS_COMMAND_ID, _) if config.interceptor && on_pt => {
            let gas = read(frame, &GAS_COMMAND, "GAS_COMMAND")?;
            let gas2 = read(frame, &GAS_COMMAND, "GAS_COMMAND2")?;
            if !allowed && (gas != 0 || gas2 != 0) {
                return Err(TxDenial::ControlsNotAllowed);
            }
        }
        (STEERING_CONTROL_ID | STEERING_CONTROL_CRV_ID, _) => {
            let layout = if frame.id == STEERING_CONTROL_ID {
                &STEERING_CONTROL
            } else {
                &STEERING_CONTROL_CRV
            };
            let torque = read(frame, layout, "STEER_TORQUE")?;
            if !allowed && torque != 0 {
                return Err(TxDenial::ControlsNotAllowed);
            }
        }
        (SCM_BUTTONS_ID, BrakeEncoding::BoschAccControl) if on_pt => {
            let button = read(frame, &SCM_BUTTONS, "CRUISE_BUTTONS")?;
            if !allowed && button != i64::from(CruiseButton::CANCEL) {
                return Err(TxDenial::ControlsNotAllowed);
            }
        }
        _ => {}
    }
    Ok(())
}

fn read(
    frame: &CanFrame,
    layout: &'static MessageDescriptor,
    name: &'static str,
) -> Result<i64, TxDenial> {
    frame.signal(layout, name).map_err(|_| TxDenial::Malformed)
}
