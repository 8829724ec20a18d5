//! Connection lifecycle state machine.
//!
//! The machine is pure: every transition returns the side effects it wants performed as
//! [`ConnectionCommand`]s and the owning actor executes them. This keeps reconnect
//! sequencing testable without sockets or timers.
//!
//! Transport events are tagged with the epoch of the handle that produced them. Each
//! `Connect` starts a new epoch and `stop` retires the current one, so late events from a
//! superseded handle can be recognised and dropped.

use std::time::Duration;

use super::reconnect::BackoffPolicy;
use super::types::{ConnectionState, WebSocketError, WebSocketResult};

/// Identifier of a scheduled reconnect timer.
pub type TimerId = u64;

/// Side effects requested by a transition, in the order they should be performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionCommand {
    /// Open a new transport handle; events it produces must carry `epoch`.
    Connect { epoch: u64 },
    /// Close the live (or in-flight) transport handle.
    Disconnect,
    /// Fire [`ConnectionMachine::on_reconnect_due`] with `timer` after `delay`.
    ScheduleReconnect {
        timer: TimerId,
        delay: Duration,
        attempt: u32,
    },
    CancelReconnect { timer: TimerId },
    /// Send the role-specific initial message on the freshly opened handle.
    SendHandshake,
    StateChanged(ConnectionState),
    /// Automatic recovery stopped; only an explicit `start` resumes it.
    RecoveryExhausted { attempts: u32 },
}

/// Read-only view of the machine, handed to collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSnapshot {
    pub state: ConnectionState,
    pub attempt: u32,
    pub max_attempts: u32,
    pub exhausted: bool,
    pub reconnect_pending: bool,
}

#[derive(Debug, Clone)]
pub struct ConnectionMachine {
    policy: BackoffPolicy,
    state: ConnectionState,
    attempt: u32,
    exhausted: bool,
    epoch: u64,
    pending_timer: Option<TimerId>,
    next_timer: TimerId,
}

impl ConnectionMachine {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            state: ConnectionState::Idle,
            attempt: 0,
            exhausted: false,
            epoch: 0,
            pending_timer: None,
            next_timer: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn policy(&self) -> BackoffPolicy {
        self.policy
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn pending_reconnect(&self) -> Option<TimerId> {
        self.pending_timer
    }

    /// Whether events tagged with `epoch` belong to the current transport handle.
    pub fn is_current(&self, epoch: u64) -> bool {
        epoch == self.epoch && matches!(self.state, ConnectionState::Connecting | ConnectionState::Open)
    }

    pub fn snapshot(&self) -> ConnectionSnapshot {
        ConnectionSnapshot {
            state: self.state,
            attempt: self.attempt,
            max_attempts: self.policy.max_attempts,
            exhausted: self.exhausted,
            reconnect_pending: self.pending_timer.is_some(),
        }
    }

    /// Outbound sends are only accepted while the connection is open.
    pub fn ensure_open(&self) -> WebSocketResult<()> {
        if self.state == ConnectionState::Open {
            Ok(())
        } else {
            Err(WebSocketError::NotOpen { state: self.state })
        }
    }

    /// Idle/Closed -> Connecting. A no-op while a handle is connecting or open.
    pub fn start(&mut self) -> Vec<ConnectionCommand> {
        let mut commands = Vec::new();
        match self.state {
            ConnectionState::Connecting | ConnectionState::Open => {}
            ConnectionState::Idle | ConnectionState::Closed => {
                if let Some(timer) = self.pending_timer.take() {
                    commands.push(ConnectionCommand::CancelReconnect { timer });
                }
                // A manual start after exhaustion gets the full retry budget back.
                if self.exhausted {
                    self.attempt = 0;
                    self.exhausted = false;
                }
                self.begin_connect(&mut commands);
            }
        }
        commands
    }

    /// Connecting -> Open for the current handle.
    pub fn on_opened(&mut self, epoch: u64) -> Vec<ConnectionCommand> {
        if epoch != self.epoch || self.state != ConnectionState::Connecting {
            return Vec::new();
        }
        self.state = ConnectionState::Open;
        self.attempt = 0;
        vec![
            ConnectionCommand::StateChanged(ConnectionState::Open),
            ConnectionCommand::SendHandshake,
        ]
    }

    /// Open/Connecting -> Closed, then either schedule a reconnect or give up.
    pub fn on_closed(&mut self, epoch: u64) -> Vec<ConnectionCommand> {
        if !self.is_current(epoch) {
            return Vec::new();
        }

        self.state = ConnectionState::Closed;
        let mut commands = vec![ConnectionCommand::StateChanged(ConnectionState::Closed)];

        if self.policy.should_retry(self.attempt) {
            let delay = self.policy.delay(self.attempt);
            self.attempt = self.attempt.saturating_add(1);
            let timer = self.next_timer;
            self.next_timer = self.next_timer.wrapping_add(1);
            self.pending_timer = Some(timer);
            commands.push(ConnectionCommand::ScheduleReconnect {
                timer,
                delay,
                attempt: self.attempt,
            });
        } else {
            self.exhausted = true;
            commands.push(ConnectionCommand::RecoveryExhausted {
                attempts: self.attempt,
            });
        }
        commands
    }

    /// A reconnect timer elapsed. Stale or cancelled timers are ignored.
    pub fn on_reconnect_due(&mut self, timer: TimerId) -> Vec<ConnectionCommand> {
        if self.pending_timer != Some(timer) || self.state != ConnectionState::Closed {
            return Vec::new();
        }
        self.pending_timer = None;
        let mut commands = Vec::new();
        self.begin_connect(&mut commands);
        commands
    }

    /// Explicit shutdown: any state -> Idle, with a fresh reconnect context.
    pub fn stop(&mut self) -> Vec<ConnectionCommand> {
        let mut commands = Vec::new();
        if let Some(timer) = self.pending_timer.take() {
            commands.push(ConnectionCommand::CancelReconnect { timer });
        }
        if matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Open
        ) {
            commands.push(ConnectionCommand::Disconnect);
        }
        self.epoch = self.epoch.wrapping_add(1);
        self.attempt = 0;
        self.exhausted = false;
        if self.state != ConnectionState::Idle {
            self.state = ConnectionState::Idle;
            commands.push(ConnectionCommand::StateChanged(ConnectionState::Idle));
        }
        commands
    }

    fn begin_connect(&mut self, commands: &mut Vec<ConnectionCommand>) {
        self.epoch = self.epoch.wrapping_add(1);
        self.state = ConnectionState::Connecting;
        commands.push(ConnectionCommand::StateChanged(ConnectionState::Connecting));
        commands.push(ConnectionCommand::Connect { epoch: self.epoch });
    }
}

impl Default for ConnectionMachine {
    fn default() -> Self {
        Self::new(BackoffPolicy::default())
    }
}
