//! # Flowcore
//!
//! **Flowcore** is the runtime core of a message-processing pipeline
//! platform: it assembles named flow constructs out of a message source and
//! an ordered chain of processing stages, drives them through a strict
//! lifecycle, and validates parsed pipeline configuration before anything is
//! deployed.
//!
//! ## Overview
//!
//! Two subsystems make a pipeline safe to run:
//!
//! - **Lifecycle**: a state machine orchestrating ordered, idempotent
//!   transitions (initialise → start → stop → dispose) across a composite of
//!   heterogeneous components, each of which may or may not support a given
//!   capability.
//! - **Validation**: a pluggable rule framework inspecting a parsed
//!   configuration tree and reporting semantic errors before construction;
//!   `ERROR`-severity findings block deployment.
//!
//! ```text
//! ArtifactAst --> ValidationRunner --> ValidationReport (deployable?)
//!                                           |
//!                                           v
//! FlowBuilder --> FlowConstruct: initialise -> start <-> stop -> dispose
//!                 (MessageSource ==> ProcessorChain, context injected)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use flowcore::prelude::*;
//!
//! // Validate the parsed configuration first.
//! let runner = ValidationRunner::with_core_rules();
//! let report = runner.run(&artifact);
//! if !report.is_deployable() {
//!     for diagnostic in report.errors() {
//!         eprintln!("{diagnostic}");
//!     }
//!     return;
//! }
//!
//! // Then assemble and drive the flow.
//! let mut flow = FlowConstruct::builder("orders", context)
//!     .source(Box::new(DirectSource::new()))
//!     .processor(Box::new(Enricher::new()))
//!     .build();
//!
//! flow.initialise()?;
//! flow.start()?;
//! // ...
//! flow.stop()?;
//! flow.dispose();
//! ```
//!
//! ## Features
//!
//! - Capability-based dispatch: components implement only the lifecycle
//!   capabilities they need
//! - Strictly ordered, idempotent phase transitions with rollback on failure
//! - Strategy-composed flow assembly (chain configuration, post-assembly
//!   validation, phase hooks) instead of inheritance
//! - Pure, independently authored validation rules with deterministic,
//!   aggregated reporting
//! - Lifecycle notifications as an async stream

mod ast;
mod component;
mod context;
mod error;
mod flow;
mod lifecycle;
mod processor;
mod rules;
mod source;
mod validation;

pub mod notify;
pub mod prelude;

// Re-export core types
pub use ast::{
    ArtifactAst, ComponentAst, Dependency, ErrorMapping, ErrorType, ErrorTypeId,
    ErrorTypeRepository, SourceLocation, CORE_NAMESPACE,
};
pub use component::{
    dispose_if_supported, initialise_if_supported, inject_context, start_if_supported,
    stop_if_supported, Component, ComponentExt, ContextAware, Disposable, Initialisable,
    Startable, Stoppable,
};
pub use context::{FlowContext, FlowContextBuilder};
pub use error::{ComponentError, ComponentResult, FlowError, FlowResult, LifecycleError};
pub use flow::{
    ChainConfigurer, ConstructValidator, ExceptionListener, FlowBuilder, FlowConstruct,
    FlowShape, PhaseHook,
};
pub use lifecycle::{LifecycleManager, LifecyclePhase, LifecycleState};
pub use notify::{notification_channel, Notification, NotificationSender, NotificationStream};
pub use processor::{ChainBuilder, Message, Processor, ProcessorChain, SharedProcessor};
pub use rules::ErrorTypeReferencesExist;
pub use source::{DirectSource, MessageSource};
pub use validation::{
    current_element, Diagnostic, Severity, ValidationReport, ValidationRule, ValidationRunner,
};
