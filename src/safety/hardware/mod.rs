//! Hardware variants and the static configuration record each one selects.
//!
//! Everything that differs between Nidec, Bosch Giraffe and Bosch Harness
//! installs lives here as data: bus numbering, TX whitelist, relay routes,
//! tracked RX messages and the brake encoding checked on transmit.
use core::ops::BitOr;

use crate::core::MessageDescriptor;
use crate::error::ConfigError;
use crate::protocol::messages::{
    ACC_CONTROL_ID, BRAKE_COMMAND_ID, BRAKE_MODULE, ENGINE_DATA, GAS_COMMAND_ID, POWERTRAIN_DATA,
    SCM_BUTTONS, SCM_BUTTONS_ID, SCM_BUTTONS_ILX, STEERING_CONTROL_CRV_ID, STEERING_CONTROL_ID,
};

/// Lane keeping HUD.
const LKAS_HUD_ID: u32 = 0x33D;
/// ACC HUD.
const ACC_HUD_ID: u32 = 0x30C;
const BOSCH_ACC_CONTROL_AUX_ID: u32 = 0x1EF;
const BOSCH_HUD_AUX_ID: u32 = 0x39F;

//==================================================================================HARDWARE
/// Honda platform family the gatekeeper is installed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HondaHardware {
    /// Nidec radar/camera, brake commanded through `BRAKE_COMMAND`.
    Nidec,
    /// Bosch radar through the Giraffe adapter board.
    BoschGiraffe,
    /// Bosch radar through the relay harness.
    BoschHarness,
}

impl HondaHardware {
    /// Static configuration record of this variant.
    pub fn config(self) -> &'static HardwareConfig {
        match self {
            HondaHardware::Nidec => &NIDEC_CONFIG,
            HondaHardware::BoschGiraffe => &BOSCH_GIRAFFE_CONFIG,
            HondaHardware::BoschHarness => &BOSCH_HARNESS_CONFIG,
        }
    }

    /// Safety-model number, inverse of `TryFrom<u16>`.
    pub fn raw(self) -> u16 {
        match self {
            HondaHardware::Nidec => 0,
            HondaHardware::BoschGiraffe => 1,
            HondaHardware::BoschHarness => 2,
        }
    }
}

impl TryFrom<u16> for HondaHardware {
    type Error = ConfigError;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(HondaHardware::Nidec),
            1 => Ok(HondaHardware::BoschGiraffe),
            2 => Ok(HondaHardware::BoschHarness),
            _ => Err(ConfigError::UnknownHardware { raw }),
        }
    }
}

//==================================================================================UNSAFE_MODE
/// Bitmask of safety overrides requested by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnsafeMode(u8);

impl UnsafeMode {
    /// No override: every disengagement rule applies.
    pub const DEFAULT: Self = Self(0);
    /// Pressing the gas pedal (or interceptor) does not disengage nor block actuation.
    pub const DISABLE_DISENGAGE_ON_GAS: Self = Self(1);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Shorthand for the only override the Honda model honors.
    pub const fn gas_override(self) -> bool {
        self.contains(Self::DISABLE_DISENGAGE_ON_GAS)
    }
}

impl BitOr for UnsafeMode {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

//==================================================================================CONFIG
/// One tracked RX message: every frame with this id on this bus goes through
/// the counter/checksum gate, whatever its length.
#[derive(Debug)]
pub struct RxCheck {
    pub message: &'static MessageDescriptor,
    pub bus: u8,
}

impl RxCheck {
    pub fn matches(&self, id: u32, bus: u8) -> bool {
        self.message.id == id && self.bus == bus
    }
}

/// One relay direction between two buses.
#[derive(Debug)]
pub struct Route {
    pub from: u8,
    pub to: u8,
    /// Ids never relayed in this direction.
    pub blacklist: &'static [u32],
    /// Stock AEB frame, relayed only while brake forwarding is requested.
    pub stock_brake: Option<u32>,
}

/// How longitudinal commands are encoded on this variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrakeEncoding {
    /// `BRAKE_COMMAND.COMPUTER_BRAKE`, positive, plus the gas interceptor.
    NidecBrakeCommand,
    /// `ACC_CONTROL`, signed brake request sharing the frame with the gas command.
    BoschAccControl,
}

/// Static record selected by [`HondaHardware`].
#[derive(Debug)]
pub struct HardwareConfig {
    pub hardware: HondaHardware,
    /// Bus carrying the powertrain telemetry used for state tracking.
    pub pt_bus: u8,
    /// Bus on which our own steering ids must never appear.
    pub relay_car_bus: u8,
    pub tx_whitelist: &'static [(u32, u8)],
    pub routes: &'static [Route],
    pub rx_checks: &'static [RxCheck],
    /// Extra tracked message when the alternate brake source is selected.
    pub alt_brake_check: RxCheck,
    pub brake: BrakeEncoding,
    /// `GAS_SENSOR` frames are tracked and `GAS_COMMAND` is whitelisted.
    pub interceptor: bool,
}

impl HardwareConfig {
    pub fn tx_allowed(&self, id: u32, bus: u8) -> bool {
        self.tx_whitelist.iter().any(|&(i, b)| i == id && b == bus)
    }

    /// Tracked RX message matching a received frame, if any.
    pub fn rx_check(&self, id: u32, bus: u8, alt_brake: bool) -> Option<&RxCheck> {
        self.rx_checks
            .iter()
            .find(|check| check.matches(id, bus))
            .or_else(|| {
                (alt_brake && self.alt_brake_check.matches(id, bus))
                    .then_some(&self.alt_brake_check)
            })
    }

    pub fn route(&self, bus: u8) -> Option<&Route> {
        self.routes.iter().find(|route| route.from == bus)
    }
}

/// Steering command ids. Seeing one on `relay_car_bus` reveals a relay malfunction.
pub fn is_steering_command(id: u32) -> bool {
    id == STEERING_CONTROL_ID || id == STEERING_CONTROL_CRV_ID
}

//==================================================================================TABLES
static NIDEC_TX: [(u32, u8); 6] = [
    (STEERING_CONTROL_ID, 0),
    (STEERING_CONTROL_CRV_ID, 0),
    (BRAKE_COMMAND_ID, 0),
    (GAS_COMMAND_ID, 0),
    (ACC_HUD_ID, 0),
    (LKAS_HUD_ID, 0),
];

static BOSCH_HARNESS_TX: [(u32, u8); 9] = [
    (STEERING_CONTROL_ID, 0),
    (STEERING_CONTROL_ID, 1),
    (ACC_CONTROL_ID, 1),
    (BOSCH_ACC_CONTROL_AUX_ID, 1),
    (SCM_BUTTONS_ID, 1),
    (ACC_HUD_ID, 1),
    (LKAS_HUD_ID, 0),
    (LKAS_HUD_ID, 1),
    (BOSCH_HUD_AUX_ID, 1),
];

static BOSCH_GIRAFFE_TX: [(u32, u8); 9] = [
    (STEERING_CONTROL_ID, 0),
    (STEERING_CONTROL_ID, 2),
    (ACC_CONTROL_ID, 0),
    (BOSCH_ACC_CONTROL_AUX_ID, 0),
    (SCM_BUTTONS_ID, 0),
    (ACC_HUD_ID, 0),
    (LKAS_HUD_ID, 0),
    (LKAS_HUD_ID, 2),
    (BOSCH_HUD_AUX_ID, 0),
];

static NIDEC_CAMERA_BLACKLIST: [u32; 4] = [
    STEERING_CONTROL_ID,
    STEERING_CONTROL_CRV_ID,
    LKAS_HUD_ID,
    ACC_HUD_ID,
];
static BOSCH_CAMERA_BLACKLIST: [u32; 2] = [STEERING_CONTROL_ID, LKAS_HUD_ID];

static NIDEC_ROUTES: [Route; 2] = [
    Route {
        from: 0,
        to: 2,
        blacklist: &[],
        stock_brake: None,
    },
    Route {
        from: 2,
        to: 0,
        blacklist: &NIDEC_CAMERA_BLACKLIST,
        stock_brake: Some(BRAKE_COMMAND_ID),
    },
];

static BOSCH_GIRAFFE_ROUTES: [Route; 2] = [
    Route {
        from: 2,
        to: 1,
        blacklist: &[],
        stock_brake: None,
    },
    Route {
        from: 1,
        to: 2,
        blacklist: &BOSCH_CAMERA_BLACKLIST,
        stock_brake: None,
    },
];

static BOSCH_HARNESS_ROUTES: [Route; 2] = [
    Route {
        from: 0,
        to: 2,
        blacklist: &[],
        stock_brake: None,
    },
    Route {
        from: 2,
        to: 0,
        blacklist: &BOSCH_CAMERA_BLACKLIST,
        stock_brake: None,
    },
];

static PT_BUS_0_CHECKS: [RxCheck; 4] = [
    RxCheck {
        message: &SCM_BUTTONS_ILX,
        bus: 0,
    },
    RxCheck {
        message: &SCM_BUTTONS,
        bus: 0,
    },
    RxCheck {
        message: &ENGINE_DATA,
        bus: 0,
    },
    RxCheck {
        message: &POWERTRAIN_DATA,
        bus: 0,
    },
];

static PT_BUS_1_CHECKS: [RxCheck; 4] = [
    RxCheck {
        message: &SCM_BUTTONS_ILX,
        bus: 1,
    },
    RxCheck {
        message: &SCM_BUTTONS,
        bus: 1,
    },
    RxCheck {
        message: &ENGINE_DATA,
        bus: 1,
    },
    RxCheck {
        message: &POWERTRAIN_DATA,
        bus: 1,
    },
];

pub static NIDEC_CONFIG: HardwareConfig = HardwareConfig {
    hardware: HondaHardware::Nidec,
    pt_bus: 0,
    relay_car_bus: 0,
    tx_whitelist: &NIDEC_TX,
    routes: &NIDEC_ROUTES,
    rx_checks: &PT_BUS_0_CHECKS,
    alt_brake_check: RxCheck {
        message: &BRAKE_MODULE,
        bus: 0,
    },
    brake: BrakeEncoding::NidecBrakeCommand,
    interceptor: true,
};

pub static BOSCH_GIRAFFE_CONFIG: HardwareConfig = HardwareConfig {
    hardware: HondaHardware::BoschGiraffe,
    pt_bus: 0,
    relay_car_bus: 2,
    tx_whitelist: &BOSCH_GIRAFFE_TX,
    routes: &BOSCH_GIRAFFE_ROUTES,
    rx_checks: &PT_BUS_0_CHECKS,
    alt_brake_check: RxCheck {
        message: &BRAKE_MODULE,
        bus: 0,
    },
    brake: BrakeEncoding::BoschAccControl,
    interceptor: false,
};

pub static BOSCH_HARNESS_CONFIG: HardwareConfig = HardwareConfig {
    hardware: HondaHardware::BoschHarness,
    pt_bus: 1,
    relay_car_bus: 0,
    tx_whitelist: &BOSCH_HARNESS_TX,
    routes: &BOSCH_HARNESS_ROUTES,
    rx_checks: &PT_BUS_1_CHECKS,
    alt_brake_check: RxCheck {
        message: &BRAKE_MODULE,
        bus: 1,
    },
    brake: BrakeEncoding::BoschAccControl,
    interceptor: false,
};
