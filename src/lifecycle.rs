//! Lifecycle state machine for flow constructs.
//!
//! Every flow construct owns one [`LifecycleManager`], which is the only
//! thing allowed to mutate its [`LifecycleState`]. A phase is fired with a
//! transition body; the manager checks the legal predecessor states, marks
//! the phase in progress, runs the body, and settles the state, or rolls it
//! back and propagates the failure. Phase methods take `&mut self`, so a
//! single construct's phases are serialized by exclusive borrow; the state
//! guard is what rejects out-of-order entry.

use std::fmt;

use tracing::{debug, error};

use crate::error::{FlowResult, LifecycleError};
use crate::notify::{Notification, NotificationSender};

/// The finite set of phases a flow construct moves through.
///
/// Transitions are strictly ordered: initialise only from `NotInitialised`,
/// start from `Initialised` or `Stopped`, stop from `Started`, dispose from
/// any non-disposed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Created, nothing assembled yet
    NotInitialised,
    /// Initialise phase in progress
    Initialising,
    /// Assembled and wired, not yet running
    Initialised,
    /// Start phase in progress
    Starting,
    /// Actively processing
    Started,
    /// Stop phase in progress
    Stopping,
    /// Quiesced, may be started again
    Stopped,
    /// Dispose phase in progress
    Disposing,
    /// Terminal; resources released
    Disposed,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecyclePhase::NotInitialised => "not initialised",
            LifecyclePhase::Initialising => "initialising",
            LifecyclePhase::Initialised => "initialised",
            LifecyclePhase::Starting => "starting",
            LifecyclePhase::Started => "started",
            LifecyclePhase::Stopping => "stopping",
            LifecyclePhase::Stopped => "stopped",
            LifecyclePhase::Disposing => "disposing",
            LifecyclePhase::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

/// The lifecycle state record of one flow construct.
///
/// Read freely, mutated only by the owning [`LifecycleManager`].
#[derive(Debug, Clone)]
pub struct LifecycleState {
    phase: LifecyclePhase,
}

impl LifecycleState {
    fn new() -> Self {
        Self {
            phase: LifecyclePhase::NotInitialised,
        }
    }

    /// The current phase.
    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Whether the construct has completed initialise and not moved on.
    pub fn is_initialised(&self) -> bool {
        self.phase == LifecyclePhase::Initialised
    }

    /// Whether the initialise phase is in progress.
    pub fn is_initialising(&self) -> bool {
        self.phase == LifecyclePhase::Initialising
    }

    /// Whether the construct is actively processing.
    pub fn is_started(&self) -> bool {
        self.phase == LifecyclePhase::Started
    }

    /// Whether the start phase is in progress.
    pub fn is_starting(&self) -> bool {
        self.phase == LifecyclePhase::Starting
    }

    /// Whether the construct is stopped.
    pub fn is_stopped(&self) -> bool {
        self.phase == LifecyclePhase::Stopped
    }

    /// Whether the stop phase is in progress.
    pub fn is_stopping(&self) -> bool {
        self.phase == LifecyclePhase::Stopping
    }

    /// Whether the construct has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.phase == LifecyclePhase::Disposed
    }

    /// Whether the dispose phase is in progress.
    pub fn is_disposing(&self) -> bool {
        self.phase == LifecyclePhase::Disposing
    }

    fn set(&mut self, phase: LifecyclePhase) {
        self.phase = phase;
    }
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self::new()
    }
}

/// Orchestrates named phase transitions for one flow construct.
///
/// Each `fire_*` method enforces the phase's legal predecessor states,
/// invokes the caller-supplied transition body inside strict before/after
/// guarantees, and publishes a [`Notification`] when a sender is attached.
/// Calling `fire_stop` on a stopped construct or `fire_dispose` on a
/// disposed one is a no-op success: the transition body is not re-entered.
#[derive(Debug)]
pub struct LifecycleManager {
    name: String,
    state: LifecycleState,
    notifier: Option<NotificationSender>,
}

impl LifecycleManager {
    /// Create a manager for the named construct, in `NotInitialised`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: LifecycleState::new(),
            notifier: None,
        }
    }

    /// Attach a notification sender; every transition is published to it.
    pub fn set_notifier(&mut self, notifier: NotificationSender) {
        self.notifier = Some(notifier);
    }

    /// The current lifecycle state.
    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    /// Fire the initialise phase. Legal only from `NotInitialised`.
    pub fn fire_initialise<F>(&mut self, body: F) -> FlowResult<()>
    where
        F: FnOnce() -> FlowResult<()>,
    {
        self.transition(
            "initialise",
            LifecyclePhase::Initialising,
            LifecyclePhase::Initialised,
            &[LifecyclePhase::NotInitialised],
            &[],
            body,
        )
    }

    /// Fire the start phase. Legal from `Initialised` or `Stopped`.
    pub fn fire_start<F>(&mut self, body: F) -> FlowResult<()>
    where
        F: FnOnce() -> FlowResult<()>,
    {
        self.transition(
            "start",
            LifecyclePhase::Starting,
            LifecyclePhase::Started,
            &[LifecyclePhase::Initialised, LifecyclePhase::Stopped],
            &[],
            body,
        )
    }

    /// Fire the stop phase. Legal from `Started`; a no-op success when
    /// already `Stopped`.
    pub fn fire_stop<F>(&mut self, body: F) -> FlowResult<()>
    where
        F: FnOnce() -> FlowResult<()>,
    {
        self.transition(
            "stop",
            LifecyclePhase::Stopping,
            LifecyclePhase::Stopped,
            &[LifecyclePhase::Started],
            &[LifecyclePhase::Stopped],
            body,
        )
    }

    /// Fire the dispose phase. Legal from any non-disposed state; a no-op
    /// when already `Disposed`.
    ///
    /// Dispose is terminal and best-effort: a failing body is logged and
    /// swallowed, and the construct still ends `Disposed`.
    pub fn fire_dispose<F>(&mut self, body: F)
    where
        F: FnOnce() -> FlowResult<()>,
    {
        let result = self.transition(
            "dispose",
            LifecyclePhase::Disposing,
            LifecyclePhase::Disposed,
            &[
                LifecyclePhase::NotInitialised,
                LifecyclePhase::Initialised,
                LifecyclePhase::Started,
                LifecyclePhase::Stopped,
            ],
            &[LifecyclePhase::Disposed],
            body,
        );
        if let Err(err) = result {
            error!(
                flow = %self.name,
                %err,
                "dispose failed; resources may not have been fully released"
            );
            self.state.set(LifecyclePhase::Disposed);
        }
    }

    fn transition<F>(
        &mut self,
        attempted: &'static str,
        transitioning: LifecyclePhase,
        completed: LifecyclePhase,
        allowed_from: &[LifecyclePhase],
        noop_in: &[LifecyclePhase],
        body: F,
    ) -> FlowResult<()>
    where
        F: FnOnce() -> FlowResult<()>,
    {
        let current = self.state.phase();
        if noop_in.contains(&current) {
            debug!(flow = %self.name, phase = attempted, "phase already complete, nothing to do");
            return Ok(());
        }
        if !allowed_from.contains(&current) {
            return Err(LifecycleError::IllegalTransition { attempted, current }.into());
        }

        self.state.set(transitioning);
        match body() {
            Ok(()) => {
                self.state.set(completed);
                debug!(flow = %self.name, phase = %completed, "phase complete");
                self.publish(Notification::PhaseCompleted {
                    flow: self.name.clone(),
                    phase: completed,
                });
                Ok(())
            }
            Err(err) => {
                self.state.set(current);
                self.publish(Notification::PhaseFailed {
                    flow: self.name.clone(),
                    phase: attempted,
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }

    fn publish(&self, notification: Notification) {
        if let Some(notifier) = &self.notifier {
            notifier.publish(notification);
        }
    }
}
