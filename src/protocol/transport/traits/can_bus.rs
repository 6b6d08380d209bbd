//! Minimal abstraction for an asynchronous, multi-bus CAN interface. Allows the
//! gateway to plug into various implementations (embedded HAL, SocketCAN, mocks).
use crate::protocol::transport::can_frame::CanFrame;
use futures_util::Future;

/// Contract to send and receive CAN frames asynchronously.
///
/// `CanFrame::bus` selects the physical bus on send and reports it on receive.
pub trait CanBus {
    type Error: core::fmt::Debug;
    /// Emit a frame on the bus named by `frame.bus`.
    fn send<'a>(
        &'a mut self,
        frame: &'a CanFrame,
    ) -> impl Future<Output = Result<(), Self::Error>> + 'a;
    /// Retrieve the next available frame from any bus.
    fn recv<'a>(
        &'a mut self,
    ) -> impl core::future::Future<Output = Result<CanFrame, Self::Error>> + 'a;
}
