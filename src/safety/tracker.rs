//! Vehicle-state tracker fed by validated powertrain frames.
//!
//! Keeps the latched "previous" pedal observations and emits the
//! [`ControlEvent`]s that disengage or engage assistance.
use crate::infra::codec::traits::SignalAccess;
use crate::protocol::messages::{
    by_id, CruiseButton, BRAKE_MODULE, BRAKE_MODULE_ID, ENGINE_DATA, ENGINE_DATA_ID, GAS_SENSOR,
    GAS_SENSOR_ID, POWERTRAIN_DATA, POWERTRAIN_DATA_ID, SCM_BUTTONS, SCM_BUTTONS_ID,
    SCM_BUTTONS_ILX, SCM_BUTTONS_ILX_ID,
};
use crate::protocol::transport::can_frame::CanFrame;
use crate::safety::controls::ControlEvent;
use crate::safety::hardware::HardwareConfig;

/// Interceptor reading above which the driver is considered on the gas.
pub const INTERCEPTOR_THRESHOLD: u32 = 344;
/// Speed (raw `XMISSION_SPEED`) above which the vehicle is moving.
pub const STANDSTILL_THRESHOLD: i64 = 0;

/// Latched pedal and motion observations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VehicleState {
    pub brake_pressed_prev: bool,
    pub gas_pressed_prev: bool,
    pub gas_interceptor_prev: u32,
    pub vehicle_moving: bool,
    pub gas_interceptor_detected: bool,
}

impl VehicleState {
    /// Update from one frame that passed the integrity gate on the powertrain bus.
    ///
    /// `alt_brake` selects `BRAKE_MODULE` as the brake pedal source instead of
    /// `POWERTRAIN_DATA`. Frames whose length differs from their layout are ignored.
    pub fn observe(
        &mut self,
        config: &HardwareConfig,
        alt_brake: bool,
        frame: &CanFrame,
        mut emit: impl FnMut(ControlEvent),
    ) {
        if by_id(frame.id).is_some_and(|layout| layout.length as usize != frame.len) {
            return;
        }
        match frame.id {
            SCM_BUTTONS_ID | SCM_BUTTONS_ILX_ID => {
                let layout = if frame.id == SCM_BUTTONS_ID {
                    &SCM_BUTTONS
                } else {
                    &SCM_BUTTONS_ILX
                };
                if let Ok(raw) = frame.signal(layout, "CRUISE_BUTTONS") {
                    match CruiseButton::from(raw as u8) {
                        CruiseButton::Set | CruiseButton::Resume => emit(ControlEvent::Engage),
                        CruiseButton::Cancel => emit(ControlEvent::Cancel),
                        CruiseButton::None | CruiseButton::Other(_) => {}
                    }
                }
            }
            ENGINE_DATA_ID => {
                if let Ok(speed) = frame.signal(&ENGINE_DATA, "XMISSION_SPEED") {
                    self.vehicle_moving = speed > STANDSTILL_THRESHOLD;
                }
            }
            POWERTRAIN_DATA_ID => {
                if !alt_brake {
                    if let Ok(pressed) = frame.flag(&POWERTRAIN_DATA, "BRAKE_PRESSED") {
                        self.brake(pressed, &mut emit);
                    }
                }
                if !self.gas_interceptor_detected {
                    if let Ok(pressed) = frame.flag(&POWERTRAIN_DATA, "PEDAL_GAS") {
                        if pressed && !self.gas_pressed_prev {
                            emit(ControlEvent::GasPressed);
                        }
                        self.gas_pressed_prev = pressed;
                    }
                }
            }
            BRAKE_MODULE_ID if alt_brake => {
                if let Ok(pressed) = frame.flag(&BRAKE_MODULE, "BRAKE_PRESSED") {
                    self.brake(pressed, &mut emit);
                }
            }
            GAS_SENSOR_ID if config.interceptor => {
                if let Some(value) = interceptor_reading(frame) {
                    self.gas_interceptor_detected = true;
                    if value > INTERCEPTOR_THRESHOLD
                        && self.gas_interceptor_prev <= INTERCEPTOR_THRESHOLD
                    {
                        emit(ControlEvent::InterceptorPressed);
                    }
                    self.gas_interceptor_prev = value;
                }
            }
            _ => {}
        }
    }

    fn brake(&mut self, pressed: bool, emit: &mut impl FnMut(ControlEvent)) {
        if pressed && (!self.brake_pressed_prev || self.vehicle_moving) {
            emit(ControlEvent::BrakePressed);
        }
        self.brake_pressed_prev = pressed;
    }
}

/// Average of the two interceptor sensors, the second one reading double.
fn interceptor_reading(frame: &CanFrame) -> Option<u32> {
    let gas = frame.signal(&GAS_SENSOR, "INTERCEPTOR_GAS").ok()?;
    let gas2 = frame.signal(&GAS_SENSOR, "INTERCEPTOR_GAS2").ok()?;
    Some(((gas + gas2 / 2) / 2) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::safety::hardware::HondaHardware;

    fn sensor(gas: u16) -> CanFrame {
        let gas2 = gas.wrapping_mul(2);
        let [g0, g1] = gas.to_be_bytes();
        let [h0, h1] = gas2.to_be_bytes();
        CanFrame::new(GAS_SENSOR_ID, 0, &[g0, g1, h0, h1, 0, 0]).unwrap()
    }

    #[test]
    fn interceptor_average_matches_single_sensor_reading() {
        for gas in [0u16, 1, 344, 345, 0x0FFF] {
            assert_eq!(interceptor_reading(&sensor(gas)), Some(gas as u32));
        }
    }

    #[test]
    fn interceptor_ignored_on_bosch() {
        let mut vehicle = VehicleState::default();
        let mut events = 0;
        vehicle.observe(
            HondaHardware::BoschGiraffe.config(),
            false,
            &sensor(1000),
            |_| events += 1,
        );
        assert_eq!(events, 0);
        assert!(!vehicle.gas_interceptor_detected);
    }

    #[test]
    fn frames_off_their_layout_length_are_ignored() {
        let config = HondaHardware::Nidec.config();
        let mut payload = [0u8; 8];
        payload[0] = CruiseButton::SET << 5;
        let mut vehicle = VehicleState::default();
        let mut events = 0;
        for len in [3, 5, 8] {
            let frame = CanFrame::new(SCM_BUTTONS_ID, 0, &payload[..len]).unwrap();
            vehicle.observe(config, false, &frame, |_| events += 1);
        }
        assert_eq!(events, 0);

        let frame = CanFrame::new(SCM_BUTTONS_ID, 0, &payload[..4]).unwrap();
        vehicle.observe(config, false, &frame, |e| {
            assert_eq!(e, ControlEvent::Engage);
            events += 1;
        });
        assert_eq!(events, 1);
    }

    #[test]
    fn held_brake_disengages_only_when_moving() {
        let config = HondaHardware::Nidec.config();
        let brake = CanFrame::pack(&POWERTRAIN_DATA, 0, &[("BRAKE_PRESSED", 1)]).unwrap();
        let mut vehicle = VehicleState {
            brake_pressed_prev: true,
            ..VehicleState::default()
        };
        let mut events = 0;
        vehicle.observe(config, false, &brake, |_| events += 1);
        assert_eq!(events, 0);

        vehicle.vehicle_moving = true;
        vehicle.observe(config, false, &brake, |e| {
            assert_eq!(e, ControlEvent::BrakePressed);
            events += 1;
        });
        assert_eq!(events, 1);
    }
}
