/// Test doubles and frame builders shared by the integration tests.
use can_gatekeeper::core::MessageDescriptor;
use can_gatekeeper::protocol::messages::{
    BRAKE_COMMAND, ENGINE_DATA, GAS_COMMAND_ID, GAS_SENSOR_ID, POWERTRAIN_DATA, SCM_BUTTONS,
    STEERING_CONTROL,
};
use can_gatekeeper::protocol::transport::{can_frame::CanFrame, traits::can_bus::CanBus};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

#[derive(Clone)]
#[allow(dead_code)]
/// In-memory CAN bus reproducing the `CanBus` trait behavior.
pub struct MockCanBus {
    tx: mpsc::UnboundedSender<CanFrame>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<CanFrame>>>,
}

#[allow(dead_code)]
impl MockCanBus {
    /// Construct a pair of interconnected buses (DUT ↔ host).
    pub fn create_pair() -> (Self, Self) {
        let (dut_tx, host_rx) = mpsc::unbounded_channel();
        let (host_tx, dut_rx) = mpsc::unbounded_channel();

        let dut_bus = Self {
            tx: dut_tx,
            rx: Arc::new(Mutex::new(dut_rx)),
        };

        let host_bus = Self {
            tx: host_tx,
            rx: Arc::new(Mutex::new(host_rx)),
        };

        (dut_bus, host_bus)
    }

    /// Frame already sent by the peer, if any.
    pub async fn try_recv(&self) -> Option<CanFrame> {
        self.rx.lock().await.try_recv().ok()
    }
}

impl CanBus for MockCanBus {
    type Error = ();

    async fn send<'a>(&'a mut self, frame: &'a CanFrame) -> Result<(), Self::Error> {
        self.tx.send(frame.clone()).map_err(|_| ())?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<CanFrame, Self::Error> {
        let mut rx = self.rx.lock().await;
        rx.recv().await.ok_or(())
    }
}

#[derive(Default)]
#[allow(dead_code)]
/// Builds telemetry frames the way the car emits them: each message keeps its
/// own rolling counter and every frame carries a valid checksum.
pub struct Packer {
    bus: u8,
    speed_counter: i64,
    powertrain_counter: i64,
    button_counter: i64,
}

#[allow(dead_code)]
impl Packer {
    pub fn on_bus(bus: u8) -> Self {
        Self {
            bus,
            ..Self::default()
        }
    }

    fn next(counter: &mut i64) -> i64 {
        let value = *counter % 4;
        *counter += 1;
        value
    }

    /// Pack an arbitrary message on this packer's bus.
    pub fn pack(&self, descriptor: &'static MessageDescriptor, values: &[(&'static str, i64)]) -> CanFrame {
        CanFrame::pack(descriptor, self.bus, values).expect("valid signal values")
    }

    pub fn speed(&mut self, speed: i64) -> CanFrame {
        let counter = Self::next(&mut self.speed_counter);
        self.pack(&ENGINE_DATA, &[("XMISSION_SPEED", speed), ("COUNTER", counter)])
    }

    pub fn buttons(&mut self, buttons: u8) -> CanFrame {
        let counter = Self::next(&mut self.button_counter);
        self.pack(
            &SCM_BUTTONS,
            &[("CRUISE_BUTTONS", i64::from(buttons)), ("COUNTER", counter)],
        )
    }

    pub fn brake(&mut self, pressed: bool) -> CanFrame {
        let counter = Self::next(&mut self.powertrain_counter);
        self.pack(
            &POWERTRAIN_DATA,
            &[("BRAKE_PRESSED", i64::from(pressed)), ("COUNTER", counter)],
        )
    }

    pub fn gas(&mut self, gas: i64) -> CanFrame {
        let counter = Self::next(&mut self.powertrain_counter);
        self.pack(&POWERTRAIN_DATA, &[("PEDAL_GAS", gas), ("COUNTER", counter)])
    }

    /// Skip one counter value of every tracked message.
    pub fn skip_counters(&mut self) {
        self.speed_counter += 1;
        self.powertrain_counter += 1;
        self.button_counter += 1;
    }
}

#[allow(dead_code)]
/// Interceptor frame (`GAS_SENSOR` when `id` is 0x201, `GAS_COMMAND` when 0x200):
/// first sensor reads `gas`, second sensor reads twice as much.
pub fn interceptor(gas: u16, id: u32) -> CanFrame {
    assert!(id == GAS_SENSOR_ID || id == GAS_COMMAND_ID);
    let [g0, g1] = gas.to_be_bytes();
    let [h0, h1] = gas.wrapping_mul(2).to_be_bytes();
    CanFrame::new(id, 0, &[g0, g1, h0, h1, 0, 0]).expect("six bytes")
}

#[allow(dead_code)]
pub fn nidec_brake(brake: i64) -> CanFrame {
    CanFrame::pack(&BRAKE_COMMAND, 0, &[("COMPUTER_BRAKE", brake)]).expect("brake in range")
}

#[allow(dead_code)]
/// Bosch `ACC_CONTROL` as raw bytes: big-endian gas in bytes 0..2, 11-bit
/// brake request in byte 3 and the top of byte 4.
pub fn bosch_acc(bus: u8, gas: i16, brake: i16) -> CanFrame {
    let brake = (brake as u16) & 0x7FF;
    let [g0, g1] = gas.to_be_bytes();
    let payload = [
        g0,
        g1,
        0,
        (brake >> 3) as u8,
        ((brake & 0x7) << 5) as u8,
        0,
        0,
        0,
    ];
    CanFrame::new(0x1DF, bus, &payload).expect("eight bytes")
}

#[allow(dead_code)]
pub fn steer(bus: u8, torque: i64) -> CanFrame {
    CanFrame::pack(&STEERING_CONTROL, bus, &[("STEER_TORQUE", torque)]).expect("torque in range")
}
