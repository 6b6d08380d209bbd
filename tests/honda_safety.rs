//! Behaviour of the Honda safety model on every hardware variant, driven the
//! way the car and the assistive computer would drive it.
mod helpers;

use can_gatekeeper::protocol::messages::{CruiseButton, SCM_BUTTONS_ID};
use can_gatekeeper::protocol::transport::can_frame::CanFrame;
use can_gatekeeper::safety::integrity::MAX_WRONG_COUNTERS;
use can_gatekeeper::safety::tracker::INTERCEPTOR_THRESHOLD;
use can_gatekeeper::safety::tx::{BOSCH_MAX_BRAKE, BOSCH_MAX_GAS, BOSCH_NO_GAS, NIDEC_MAX_BRAKE};
use can_gatekeeper::safety::{HondaHardware, SafetyState, UnsafeMode};
use helpers::{bosch_acc, interceptor, nidec_brake, steer, Packer};

const ALL: [HondaHardware; 3] = [
    HondaHardware::Nidec,
    HondaHardware::BoschGiraffe,
    HondaHardware::BoschHarness,
];

fn setup(hw: HondaHardware) -> (SafetyState, Packer) {
    let state = SafetyState::new(hw, 0);
    let packer = Packer::on_bus(state.config().pt_bus);
    (state, packer)
}

//==================================================================================BUTTONS
#[test]
fn set_and_resume_buttons_engage() {
    for hw in ALL {
        for button in [CruiseButton::SET, CruiseButton::RESUME] {
            let (mut state, mut packer) = setup(hw);
            assert!(state.rx(&packer.buttons(button)));
            assert!(state.controls_allowed(), "{hw:?} button {button}");
        }
    }
}

#[test]
fn cancel_button_disengages() {
    for hw in ALL {
        let (mut state, mut packer) = setup(hw);
        state.set_controls_allowed(true);
        assert!(state.rx(&packer.buttons(CruiseButton::CANCEL)));
        assert!(!state.controls_allowed());
    }
}

#[test]
fn other_buttons_leave_state_alone() {
    let (mut state, mut packer) = setup(HondaHardware::Nidec);
    state.set_controls_allowed(true);
    assert!(state.rx(&packer.buttons(0)));
    assert!(state.rx(&packer.buttons(1)));
    assert!(state.controls_allowed());
}

#[test]
fn corrupted_engage_is_ignored() {
    let (mut state, mut packer) = setup(HondaHardware::BoschGiraffe);
    let mut set = packer.buttons(CruiseButton::SET);
    set.data[3] ^= 0x01;
    assert!(!state.rx(&set));
    assert!(!state.controls_allowed());
}

#[test]
fn engage_with_wrong_length_is_rejected() {
    for hw in ALL {
        let (mut state, mut packer) = setup(hw);
        let pt = state.config().pt_bus;
        let set = packer.buttons(CruiseButton::SET);

        let mut padded = [0u8; 8];
        padded[..set.len].copy_from_slice(set.as_slice());
        padded[7] = 0xFF;
        let long = CanFrame::new(SCM_BUTTONS_ID, pt, &padded).unwrap();
        let short = CanFrame::new(SCM_BUTTONS_ID, pt, &set.as_slice()[..3]).unwrap();

        for _ in 0..10 {
            assert!(!state.rx(&long), "{hw:?}");
            assert!(!state.rx(&short), "{hw:?}");
            assert!(!state.controls_allowed(), "{hw:?}");
        }
        assert_eq!(state.wrong_counters(SCM_BUTTONS_ID), 0);

        // A malformed frame also disengages.
        state.set_controls_allowed(true);
        assert!(!state.rx(&long));
        assert!(!state.controls_allowed());

        // Well-formed frames are still accepted afterwards.
        assert!(state.rx(&packer.buttons(CruiseButton::SET)));
        assert!(state.controls_allowed());
    }
}

//==================================================================================PEDALS
#[test]
fn brake_press_disengages() {
    for hw in ALL {
        let (mut state, mut packer) = setup(hw);
        state.set_controls_allowed(true);
        assert!(state.rx(&packer.brake(true)));
        assert!(!state.controls_allowed());
    }
}

#[test]
fn held_brake_at_standstill_allows_engagement() {
    let (mut state, mut packer) = setup(HondaHardware::Nidec);
    state.rx(&packer.speed(0));
    state.rx(&packer.brake(true));
    state.set_controls_allowed(true);
    state.rx(&packer.brake(true));
    assert!(state.controls_allowed());

    // Same pedal once the car moves.
    state.rx(&packer.speed(100));
    state.rx(&packer.brake(true));
    assert!(!state.controls_allowed());
}

#[test]
fn gas_press_disengages_on_rising_edge() {
    for hw in ALL {
        let (mut state, mut packer) = setup(hw);
        state.rx(&packer.gas(0));
        state.set_controls_allowed(true);
        state.rx(&packer.gas(1));
        assert!(!state.controls_allowed());
    }
}

#[test]
fn engaging_with_gas_pressed_is_allowed() {
    for hw in ALL {
        let (mut state, mut packer) = setup(hw);
        state.rx(&packer.gas(1));
        state.set_controls_allowed(true);
        state.rx(&packer.gas(1));
        assert!(state.controls_allowed());
    }
}

#[test]
fn unsafe_mode_keeps_engagement_on_gas() {
    for hw in ALL {
        let (mut state, mut packer) = setup(hw);
        state.rx(&packer.gas(0));
        state.set_controls_allowed(true);
        state.set_unsafe_mode(UnsafeMode::DISABLE_DISENGAGE_ON_GAS);
        state.rx(&packer.gas(1));
        assert!(state.controls_allowed());
    }
}

//==================================================================================INTERCEPTOR
#[test]
fn interceptor_disengages_above_threshold() {
    let (mut state, _) = setup(HondaHardware::Nidec);
    for g in 0..0x1000u16 {
        state.rx(&interceptor(0, 0x201));
        state.set_controls_allowed(true);
        state.rx(&interceptor(g, 0x201));
        assert_eq!(
            state.controls_allowed(),
            u32::from(g) <= INTERCEPTOR_THRESHOLD,
            "gas {g}"
        );
        state.rx(&interceptor(0, 0x201));
        state.set_gas_interceptor_detected(false);
    }
}

#[test]
fn unsafe_mode_keeps_engagement_on_interceptor() {
    let (mut state, _) = setup(HondaHardware::Nidec);
    state.set_controls_allowed(true);
    state.set_unsafe_mode(UnsafeMode::DISABLE_DISENGAGE_ON_GAS);
    for g in (0..0x1000u16).step_by(7) {
        state.rx(&interceptor(g, 0x201));
        assert!(state.controls_allowed());
        state.rx(&interceptor(0, 0x201));
        state.set_gas_interceptor_detected(false);
    }
}

#[test]
fn engaging_with_interceptor_pressed_is_allowed() {
    let (mut state, _) = setup(HondaHardware::Nidec);
    state.rx(&interceptor(0x1000, 0x201));
    state.set_controls_allowed(true);
    state.rx(&interceptor(0x1000, 0x201));
    assert!(state.controls_allowed());
    assert!(state.gas_interceptor_detected());
}

#[test]
fn detected_interceptor_replaces_pedal_gas() {
    let (mut state, mut packer) = setup(HondaHardware::Nidec);
    state.rx(&interceptor(0, 0x201));
    state.set_controls_allowed(true);
    state.rx(&packer.gas(1));
    assert!(state.controls_allowed());
}

//==================================================================================TX_LIMITS
#[test]
fn brake_limits() {
    for hw in ALL {
        let (mut state, _) = setup(hw);
        let pt = state.config().pt_bus;
        for fwd_brake in [false, true] {
            if hw != HondaHardware::Nidec && fwd_brake {
                continue;
            }
            state.set_fwd_brake(fwd_brake);
            let max = if hw == HondaHardware::Nidec {
                NIDEC_MAX_BRAKE
            } else {
                BOSCH_MAX_BRAKE
            };
            for brake in 0..max + 10 {
                for allowed in [true, false] {
                    state.set_controls_allowed(allowed);
                    let expected = if fwd_brake {
                        false
                    } else if allowed {
                        brake <= max
                    } else {
                        brake == 0
                    };
                    let frame = if hw == HondaHardware::Nidec {
                        nidec_brake(brake)
                    } else {
                        bosch_acc(pt, BOSCH_NO_GAS as i16, -(brake as i16))
                    };
                    assert_eq!(state.tx(&frame), expected, "{hw:?} brake {brake}");
                }
            }
        }
        state.set_fwd_brake(false);
    }
}

#[test]
fn bosch_positive_brake_limits() {
    for hw in [HondaHardware::BoschGiraffe, HondaHardware::BoschHarness] {
        let (mut state, _) = setup(hw);
        let pt = state.config().pt_bus;
        let max = BOSCH_MAX_BRAKE as i16;

        state.set_controls_allowed(true);
        assert!(state.tx(&bosch_acc(pt, BOSCH_NO_GAS as i16, max)), "{hw:?}");
        assert!(!state.tx(&bosch_acc(pt, BOSCH_NO_GAS as i16, max + 1)), "{hw:?}");

        state.set_controls_allowed(false);
        for brake in [1, max, max + 1] {
            assert!(
                !state.tx(&bosch_acc(pt, BOSCH_NO_GAS as i16, brake)),
                "{hw:?} brake {brake}"
            );
        }
    }
}

#[test]
fn bosch_gas_limits() {
    for hw in [HondaHardware::BoschGiraffe, HondaHardware::BoschHarness] {
        let (mut state, _) = setup(hw);
        let pt = state.config().pt_bus;
        for allowed in [true, false] {
            state.set_controls_allowed(allowed);
            for gas in (BOSCH_NO_GAS..BOSCH_MAX_GAS + 2000).step_by(100) {
                let expected = if allowed {
                    gas <= BOSCH_MAX_GAS
                } else {
                    gas == BOSCH_NO_GAS
                };
                assert_eq!(state.tx(&bosch_acc(pt, gas as i16, 0)), expected);
            }
        }
    }
}

#[test]
fn interceptor_command_limits() {
    let (mut state, _) = setup(HondaHardware::Nidec);
    for gas in (0..4000u16).step_by(100) {
        for allowed in [true, false] {
            state.set_controls_allowed(allowed);
            assert_eq!(state.tx(&interceptor(gas, 0x200)), allowed || gas == 0);
        }
    }
}

#[test]
fn steering_needs_controls() {
    for hw in ALL {
        let (mut state, _) = setup(hw);
        assert!(state.tx(&steer(0, 0)));
        assert!(!state.tx(&steer(0, 0x1000)));
        state.set_controls_allowed(true);
        assert!(state.tx(&steer(0, 0x1000)));
    }
}

#[test]
fn only_whitelisted_ids_leave() {
    for hw in ALL {
        let (mut state, _) = setup(hw);
        state.set_controls_allowed(true);
        let whitelist = state.config().tx_whitelist;
        for bus in 0..3u8 {
            for id in 0..0x800u32 {
                if whitelist.contains(&(id, bus)) {
                    continue;
                }
                let frame = CanFrame::new(id, bus, &[0u8; 8]).unwrap();
                assert!(!state.tx(&frame), "{hw:?} {id:#x}@{bus}");
            }
        }
    }
}

#[test]
fn pedal_pressed_blocks_actuation() {
    for mode in [UnsafeMode::DEFAULT, UnsafeMode::DISABLE_DISENGAGE_ON_GAS] {
        for pedal in ["brake", "gas", "interceptor"] {
            for hw in ALL {
                if pedal == "interceptor" && hw != HondaHardware::Nidec {
                    continue;
                }
                let (mut state, mut packer) = setup(hw);
                state.set_unsafe_mode(mode);
                let allow = match pedal {
                    "brake" => {
                        state.rx(&packer.speed(100));
                        state.rx(&packer.brake(true));
                        false
                    }
                    "gas" => {
                        state.rx(&packer.gas(1));
                        mode.gas_override()
                    }
                    _ => {
                        let threshold = INTERCEPTOR_THRESHOLD as u16;
                        state.rx(&interceptor(threshold + 1, 0x201));
                        state.rx(&interceptor(threshold + 1, 0x201));
                        mode.gas_override()
                    }
                };

                state.set_controls_allowed(true);
                if hw == HondaHardware::Nidec {
                    assert_eq!(state.tx(&nidec_brake(NIDEC_MAX_BRAKE)), allow);
                    assert_eq!(
                        state.tx(&interceptor(INTERCEPTOR_THRESHOLD as u16, 0x200)),
                        allow
                    );
                }
                assert_eq!(state.tx(&steer(0, 0x1000)), allow, "{hw:?} {pedal} {mode:?}");
            }
        }
    }
}

//==================================================================================INTEGRITY
#[test]
fn bad_checksum_rejects_and_disengages() {
    for hw in ALL {
        let (mut state, mut packer) = setup(hw);
        for speed in [false, true] {
            state.set_controls_allowed(true);
            let mut frame = if speed { packer.speed(0) } else { packer.gas(0) };
            assert!(state.rx(&frame));
            frame.data[4..8].fill(0);
            assert!(!state.rx(&frame));
            assert!(!state.controls_allowed());
        }
    }
}

#[test]
fn counter_faults_disengage_until_recovered() {
    for hw in ALL {
        let (mut state, mut packer) = setup(hw);
        state.rx(&packer.buttons(0));
        state.rx(&packer.speed(0));
        state.rx(&packer.gas(0));

        for fault in 1..=MAX_WRONG_COUNTERS {
            packer.skip_counters();
            state.set_controls_allowed(true);
            let valid = fault < MAX_WRONG_COUNTERS;
            assert_eq!(state.rx(&packer.buttons(CruiseButton::SET)), valid);
            assert_eq!(state.rx(&packer.speed(0)), valid);
            assert_eq!(state.rx(&packer.gas(0)), valid);
            assert_eq!(state.controls_allowed(), valid);
        }

        // One in-sequence frame per message is enough to recover from the threshold.
        assert!(state.rx(&packer.speed(0)));
        assert!(state.rx(&packer.gas(0)));
        assert!(state.rx(&packer.buttons(CruiseButton::SET)));
        assert!(state.controls_allowed());
    }
}

//==================================================================================FORWARDING
#[test]
fn forwarding_routes_and_blacklists() {
    struct Case {
        hw: HondaHardware,
        fwd_brake: bool,
        lookup: &'static [(u8, u8)],
        blacklisted: &'static [(u8, u32)],
    }
    let cases = [
        Case {
            hw: HondaHardware::Nidec,
            fwd_brake: false,
            lookup: &[(0, 2), (2, 0)],
            blacklisted: &[(2, 0xE4), (2, 0x194), (2, 0x33D), (2, 0x30C), (2, 0x1FA)],
        },
        Case {
            hw: HondaHardware::Nidec,
            fwd_brake: true,
            lookup: &[(0, 2), (2, 0)],
            blacklisted: &[(2, 0xE4), (2, 0x194), (2, 0x33D), (2, 0x30C)],
        },
        Case {
            hw: HondaHardware::BoschGiraffe,
            fwd_brake: false,
            lookup: &[(1, 2), (2, 1)],
            blacklisted: &[(1, 0xE4), (1, 0x33D)],
        },
        Case {
            hw: HondaHardware::BoschHarness,
            fwd_brake: false,
            lookup: &[(0, 2), (2, 0)],
            blacklisted: &[(2, 0xE4), (2, 0x33D)],
        },
    ];

    for case in cases {
        let (mut state, _) = setup(case.hw);
        state.set_fwd_brake(case.fwd_brake);
        for bus in 0..4u8 {
            for id in 0..0x800u32 {
                let expected = if case.blacklisted.contains(&(bus, id)) {
                    None
                } else {
                    case.lookup.iter().find(|(from, _)| *from == bus).map(|(_, to)| *to)
                };
                assert_eq!(state.forward(id, bus), expected, "{:?} {id:#x}@{bus}", case.hw);
            }
        }
    }
}

//==================================================================================SCENARIO
#[test]
fn nidec_brake_scenario() {
    let (mut state, _) = setup(HondaHardware::Nidec);
    assert!(state.tx(&nidec_brake(0)));
    assert!(!state.tx(&nidec_brake(50)));
    state.set_controls_allowed(true);
    assert!(state.tx(&nidec_brake(255)));
    assert!(!state.tx(&nidec_brake(256)));
}

#[test]
fn unknown_safety_model_is_refused() {
    assert!(HondaHardware::try_from(3).is_err());
    let mut state = SafetyState::new(HondaHardware::Nidec, 0);
    state.select_hardware_variant(HondaHardware::try_from(2).unwrap(), 1);
    assert_eq!(state.hardware(), HondaHardware::BoschHarness);
    assert!(state.alt_brake_msg());
}
