//! Session state of the Honda safety model and its three entry points:
//! [`SafetyState::rx`], [`SafetyState::tx`] and [`SafetyState::forward`].
//!
//! The state is an owned value. Nothing here blocks, allocates or fails:
//! every verdict is a plain `bool` or `Option`.
use crate::protocol::transport::can_frame::CanFrame;
use crate::safety::controls::{self, ControlEvent};
use crate::safety::forward;
use crate::safety::hardware::{is_steering_command, HardwareConfig, HondaHardware, UnsafeMode};
use crate::safety::integrity::IntegrityGate;
use crate::safety::tracker::VehicleState;
use crate::safety::tx::{self, TxContext, TxDenial};

/// `param` bit selecting `BRAKE_MODULE` as the brake pedal source.
pub const PARAM_ALT_BRAKE: i16 = 1;

/// Everything the safety model remembers between frames.
#[derive(Debug, Clone)]
pub struct SafetyState {
    config: &'static HardwareConfig,
    controls_allowed: bool,
    vehicle: VehicleState,
    unsafe_mode: UnsafeMode,
    integrity: IntegrityGate,
    fwd_brake: bool,
    relay_malfunction: bool,
    alt_brake_msg: bool,
}

impl SafetyState {
    /// Fresh session on `hardware`. `param` bit 0 selects the alternate brake message.
    pub fn new(hardware: HondaHardware, param: i16) -> Self {
        Self {
            config: hardware.config(),
            controls_allowed: false,
            vehicle: VehicleState::default(),
            unsafe_mode: UnsafeMode::DEFAULT,
            integrity: IntegrityGate::new(),
            fwd_brake: false,
            relay_malfunction: false,
            alt_brake_msg: param & PARAM_ALT_BRAKE != 0,
        }
    }

    /// Switch variant. The whole session restarts: controls drop and every
    /// latched observation is forgotten.
    pub fn select_hardware_variant(&mut self, hardware: HondaHardware, param: i16) {
        #[cfg(feature = "defmt")]
        defmt::info!("safety: hardware {} param {}", hardware, param);
        *self = Self::new(hardware, param);
    }

    //==============================================================================RX
    /// Process one received frame. Returns `false` when the frame failed the
    /// integrity gate: its content was discarded and controls were dropped.
    pub fn rx(&mut self, frame: &CanFrame) -> bool {
        let config = self.config;

        if frame.bus == config.relay_car_bus && is_steering_command(frame.id) {
            if !self.relay_malfunction {
                #[cfg(feature = "defmt")]
                defmt::error!("safety: relay malfunction, {=u32:#x} on bus {}", frame.id, frame.bus);
            }
            self.relay_malfunction = true;
            self.apply(ControlEvent::RelayMalfunction);
        }

        if let Some(check) = config.rx_check(frame.id, frame.bus, self.alt_brake_msg) {
            if let Err(_fault) = self.integrity.check(check.message, frame.as_slice()) {
                #[cfg(feature = "defmt")]
                defmt::warn!("safety: {=u32:#x} rejected ({})", frame.id, _fault);
                self.apply(ControlEvent::IntegrityFault);
                return false;
            }
        }

        if frame.bus == config.pt_bus {
            let mut allowed = self.controls_allowed;
            let unsafe_mode = self.unsafe_mode;
            self.vehicle
                .observe(config, self.alt_brake_msg, frame, |event| {
                    let next = controls::transition(allowed, event, unsafe_mode);
                    #[cfg(feature = "defmt")]
                    if next != allowed {
                        defmt::info!("safety: controls {} on {}", next, event);
                    }
                    allowed = next;
                });
            self.controls_allowed = allowed;
        }
        true
    }

    //==============================================================================TX
    /// Decide whether an outbound frame may be sent.
    pub fn tx(&self, frame: &CanFrame) -> bool {
        match self.tx_verdict(frame) {
            Ok(()) => true,
            Err(_denial) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("safety: tx {=u32:#x} denied ({})", frame.id, _denial);
                false
            }
        }
    }

    /// Same as [`tx`](Self::tx) with the reason of a denial.
    pub fn tx_verdict(&self, frame: &CanFrame) -> Result<(), TxDenial> {
        let ctx = TxContext {
            config: self.config,
            actuation_allowed: controls::actuation_allowed(
                self.controls_allowed,
                &self.vehicle,
                self.unsafe_mode,
            ),
            fwd_brake: self.fwd_brake,
        };
        tx::validate(&ctx, frame)
    }

    //==============================================================================FORWARD
    /// Destination bus for a frame with `id` received on `bus`.
    pub fn forward(&self, id: u32, bus: u8) -> Option<u8> {
        forward::destination(self.config, self.fwd_brake, id, bus)
    }

    //==============================================================================SETTERS
    pub fn set_unsafe_mode(&mut self, mode: UnsafeMode) {
        self.unsafe_mode = mode;
    }

    /// Relay the stock AEB frame and block our own brake commands. Stays set
    /// until cleared.
    pub fn set_fwd_brake(&mut self, fwd_brake: bool) {
        self.fwd_brake = fwd_brake;
    }

    /// Test harness override.
    pub fn set_controls_allowed(&mut self, allowed: bool) {
        self.controls_allowed = allowed;
    }

    /// Test harness override. Clearing it also forgets the last interceptor reading.
    pub fn set_gas_interceptor_detected(&mut self, detected: bool) {
        self.vehicle.gas_interceptor_detected = detected;
        if !detected {
            self.vehicle.gas_interceptor_prev = 0;
        }
    }

    //==============================================================================GETTERS
    pub fn controls_allowed(&self) -> bool {
        self.controls_allowed
    }

    pub fn hardware(&self) -> HondaHardware {
        self.config.hardware
    }

    pub fn config(&self) -> &'static HardwareConfig {
        self.config
    }

    pub fn gas_interceptor_detected(&self) -> bool {
        self.vehicle.gas_interceptor_detected
    }

    pub fn relay_malfunction(&self) -> bool {
        self.relay_malfunction
    }

    /// Fault count of a tracked message.
    pub fn wrong_counters(&self, id: u32) -> u8 {
        self.integrity.wrong_counters(id)
    }

    pub fn fwd_brake(&self) -> bool {
        self.fwd_brake
    }

    pub fn unsafe_mode(&self) -> UnsafeMode {
        self.unsafe_mode
    }

    pub fn alt_brake_msg(&self) -> bool {
        self.alt_brake_msg
    }

    fn apply(&mut self, event: ControlEvent) {
        self.controls_allowed = controls::transition(self.controls_allowed, event, self.unsafe_mode);
    }
}
