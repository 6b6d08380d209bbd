//! Safety gateway built on top of [`SafetyState`].
//!
//! It pumps every received frame through the RX hook and the forwarding
//! policy, and admits outbound commands queued by the host through the TX
//! hook. Firmware provides a pre-allocated [`embassy_sync::channel::Channel`]
//! for commands; nothing is allocated by the library and the mutex flavour is
//! left to the caller.

use core::fmt::Debug;

use embassy_sync::{
    blocking_mutex::raw::RawMutex,
    channel::{Channel, Sender},
};
use futures_util::{future::select, future::Either, pin_mut};

use crate::error::GatewayError;
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::traits::can_bus::CanBus;
use crate::safety::{SafetyState, UnsafeMode};

/// Commands queued by host tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCommand {
    /// Actuation or HUD frame to validate and send.
    Transmit(CanFrame),
    SetFwdBrake(bool),
    SetUnsafeMode(UnsafeMode),
}

/// Running totals kept by the gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GatewayStats {
    /// Frames read from the bus.
    pub received: u32,
    /// Received frames that failed the integrity gate.
    pub rejected: u32,
    /// Received frames relayed to another bus.
    pub forwarded: u32,
    /// Received frames with no route or a blacklisted id.
    pub blocked: u32,
    /// Host frames admitted and sent.
    pub transmitted: u32,
    /// Host frames refused by the TX hook.
    pub denied: u32,
}

/// Owns the bus and the safety state; processes one event at a time.
pub struct SafetyGateway<C: CanBus> {
    bus: C,
    state: SafetyState,
    stats: GatewayStats,
}

impl<C> SafetyGateway<C>
where
    C: CanBus,
    C::Error: Debug,
{
    pub fn new(bus: C, state: SafetyState) -> Self {
        Self {
            bus,
            state,
            stats: GatewayStats::default(),
        }
    }

    pub fn state(&self) -> &SafetyState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SafetyState {
        &mut self.state
    }

    pub fn stats(&self) -> GatewayStats {
        self.stats
    }

    /// Run one received frame through the RX hook, then relay it if the
    /// forwarding policy names a destination.
    ///
    /// Relaying does not depend on the RX verdict: a rejected frame only
    /// affects the safety state.
    ///
    /// # Return value
    /// The destination bus, if the frame was relayed.
    pub async fn handle_inbound(
        &mut self,
        frame: &CanFrame,
    ) -> Result<Option<u8>, GatewayError<C::Error>> {
        self.stats.received = self.stats.received.saturating_add(1);
        if !self.state.rx(frame) {
            self.stats.rejected = self.stats.rejected.saturating_add(1);
        }

        match self.state.forward(frame.id, frame.bus) {
            Some(destination) => {
                self.bus
                    .send(&frame.on_bus(destination))
                    .await
                    .map_err(GatewayError::Send)?;
                self.stats.forwarded = self.stats.forwarded.saturating_add(1);
                Ok(Some(destination))
            }
            None => {
                self.stats.blocked = self.stats.blocked.saturating_add(1);
                Ok(None)
            }
        }
    }

    /// Validate a host frame and send it when allowed.
    ///
    /// # Return value
    /// `true` if the frame reached the bus.
    pub async fn submit(&mut self, frame: &CanFrame) -> Result<bool, GatewayError<C::Error>> {
        if !self.state.tx(frame) {
            self.stats.denied = self.stats.denied.saturating_add(1);
            return Ok(false);
        }
        self.bus.send(frame).await.map_err(GatewayError::Send)?;
        self.stats.transmitted = self.stats.transmitted.saturating_add(1);
        Ok(true)
    }

    /// Apply one queued host command.
    pub async fn handle_command(
        &mut self,
        command: GatewayCommand,
    ) -> Result<(), GatewayError<C::Error>> {
        match command {
            GatewayCommand::Transmit(frame) => self.submit(&frame).await.map(|_| ()),
            GatewayCommand::SetFwdBrake(enabled) => {
                self.state.set_fwd_brake(enabled);
                Ok(())
            }
            GatewayCommand::SetUnsafeMode(mode) => {
                self.state.set_unsafe_mode(mode);
                Ok(())
            }
        }
    }

    /// Dispatch loop. Returns only on a bus error.
    pub async fn drive<M: RawMutex, const CMD_CAP: usize>(
        &mut self,
        commands: Option<&Channel<M, GatewayCommand, CMD_CAP>>,
    ) -> Result<(), GatewayError<C::Error>> {
        loop {
            match commands {
                Some(cmd_ch) => {
                    let mut command_to_process = None;
                    let mut frame_to_process = None;

                    {
                        let cmd_future = cmd_ch.receive();
                        let recv_future = self.bus.recv();
                        pin_mut!(cmd_future);
                        pin_mut!(recv_future);

                        match select(recv_future, cmd_future).await {
                            Either::Left((result, pending_cmd)) => {
                                frame_to_process = Some(result.map_err(GatewayError::Receive)?);
                                drop(pending_cmd);
                            }
                            Either::Right((command, pending_recv)) => {
                                command_to_process = Some(command);
                                drop(pending_recv);
                            }
                        }
                    }

                    if let Some(frame) = frame_to_process {
                        self.handle_inbound(&frame).await?;
                    }

                    if let Some(command) = command_to_process {
                        self.handle_command(command).await?;
                    }
                }
                None => {
                    let frame = self.bus.recv().await.map_err(GatewayError::Receive)?;
                    self.handle_inbound(&frame).await?;
                }
            }
        }
    }
}

/// Host-side handle queuing commands for a running gateway.
pub struct GatewayHandle<'a, M: RawMutex, const CMD_CAP: usize> {
    sender: Sender<'a, M, GatewayCommand, CMD_CAP>,
}

impl<'a, M: RawMutex, const CMD_CAP: usize> GatewayHandle<'a, M, CMD_CAP> {
    pub fn new(channel: &'a Channel<M, GatewayCommand, CMD_CAP>) -> Self {
        Self {
            sender: channel.sender(),
        }
    }

    pub async fn transmit(&self, frame: &CanFrame) {
        self.sender
            .send(GatewayCommand::Transmit(frame.clone()))
            .await;
    }

    pub async fn set_fwd_brake(&self, enabled: bool) {
        self.sender.send(GatewayCommand::SetFwdBrake(enabled)).await;
    }

    pub async fn set_unsafe_mode(&self, mode: UnsafeMode) {
        self.sender.send(GatewayCommand::SetUnsafeMode(mode)).await;
    }
}
