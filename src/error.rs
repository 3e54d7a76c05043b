//! Error types for the Flowcore runtime.

use thiserror::Error;

use crate::lifecycle::LifecyclePhase;

/// Errors raised by individual components during lifecycle phases or
/// message processing.
#[derive(Error, Debug, Clone)]
pub enum ComponentError {
    /// Component failed its one-time setup
    #[error("Initialisation failed: {0}")]
    Initialisation(String),

    /// Component failed to begin active work
    #[error("Start failed: {0}")]
    Start(String),

    /// Component failed to cease active work
    #[error("Stop failed: {0}")]
    Stop(String),

    /// Component failed while processing a message
    #[error("Processing failed: {0}")]
    Processing(String),

    /// Generic component failure with message
    #[error("{0}")]
    Other(String),
}

impl From<String> for ComponentError {
    fn from(msg: String) -> Self {
        ComponentError::Other(msg)
    }
}

impl From<&str> for ComponentError {
    fn from(msg: &str) -> Self {
        ComponentError::Other(msg.to_string())
    }
}

/// Illegal use of the lifecycle state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// A phase was fired from a state that does not permit it
    #[error("cannot {attempted} while in phase '{current}'")]
    IllegalTransition {
        /// The phase that was attempted
        attempted: &'static str,
        /// The phase the construct was actually in
        current: LifecyclePhase,
    },
}

/// Errors raised while assembling or driving a flow construct.
///
/// This is the root error type of the crate: lifecycle violations and
/// component failures convert into it via `From`.
#[derive(Error, Debug, Clone)]
pub enum FlowError {
    /// Illegal lifecycle transition
    #[error("Lifecycle violation: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Failure during the initialise phase, wrapping the underlying cause
    #[error("Initialisation of flow '{flow}' failed: {source}")]
    Initialisation {
        /// Name of the flow construct that failed to initialise
        flow: String,
        /// The underlying failure
        #[source]
        source: Box<FlowError>,
    },

    /// Post-assembly structural validation rejected the construct
    #[error("Flow construct '{flow}' is invalid: {reason}")]
    InvalidConstruct {
        /// Name of the offending flow construct
        flow: String,
        /// Why the assembled shape was rejected
        reason: String,
    },

    /// A component failed during a phase
    #[error("Component error: {0}")]
    Component(#[from] ComponentError),
}

impl FlowError {
    /// Wrap an error as an initialise-phase failure, unless it already is one
    /// or is a lifecycle violation (those surface unchanged).
    pub(crate) fn into_initialisation(self, flow: &str) -> FlowError {
        match self {
            err @ FlowError::Lifecycle(_) => err,
            err @ FlowError::Initialisation { .. } => err,
            other => FlowError::Initialisation {
                flow: flow.to_string(),
                source: Box::new(other),
            },
        }
    }
}

/// Result type alias for component operations.
pub type ComponentResult<T> = Result<T, ComponentError>;

/// Result type alias for flow construct operations.
pub type FlowResult<T> = Result<T, FlowError>;
