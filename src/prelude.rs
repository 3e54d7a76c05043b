//! Prelude module for convenient imports.
//!
//! Re-exports the most commonly used types and traits from Flowcore for
//! convenient glob imports.
//!
//! # Example
//!
//! ```rust
//! use flowcore::prelude::*;
//! ```

// Context
pub use crate::context::{FlowContext, FlowContextBuilder};

// Components and capabilities
pub use crate::component::{
    Component, ComponentExt, ContextAware, Disposable, Initialisable, Startable, Stoppable,
};

// Processing
pub use crate::processor::{ChainBuilder, Message, Processor, ProcessorChain, SharedProcessor};
pub use crate::source::{DirectSource, MessageSource};

// Flow assembly and lifecycle
pub use crate::flow::{FlowBuilder, FlowConstruct, FlowShape};
pub use crate::lifecycle::{LifecycleManager, LifecyclePhase, LifecycleState};

// Notifications
pub use crate::notify::{
    notification_channel, Notification, NotificationSender, NotificationStream,
};

// Validation
pub use crate::ast::{
    ArtifactAst, ComponentAst, Dependency, ErrorMapping, ErrorType, ErrorTypeId,
    ErrorTypeRepository, SourceLocation, CORE_NAMESPACE,
};
pub use crate::rules::ErrorTypeReferencesExist;
pub use crate::validation::{
    Diagnostic, Severity, ValidationReport, ValidationRule, ValidationRunner,
};

// Errors
pub use crate::error::{
    ComponentError, ComponentResult, FlowError, FlowResult, LifecycleError,
};
