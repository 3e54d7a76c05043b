//! Flow constructs: named, lifecycle-managed pipeline units.
//!
//! A [`FlowConstruct`] composes a message source and a processor chain into
//! one addressable unit and drives both through the lifecycle in the correct
//! order per phase. Behavior is composed, not inherited: the chain
//! configuration step, the post-assembly validator, and the per-phase hooks
//! are plain closures supplied through [`FlowBuilder`].
//!
//! Phase ordering is a correctness matter, not a convention. On start the
//! chain comes up before the source, so no message can be delivered into a
//! half-ready pipeline; on stop the source quiesces before the chain winds
//! down, so nothing is injected into a chain that is shutting down.

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::error;

use crate::component::{
    dispose_if_supported, initialise_if_supported, inject_context, start_if_supported,
    stop_if_supported,
};
use crate::context::FlowContext;
use crate::error::{ComponentError, ComponentResult, FlowError, FlowResult};
use crate::lifecycle::{LifecycleManager, LifecycleState};
use crate::notify::NotificationSender;
use crate::processor::{lock_processor, ChainBuilder, Processor, ProcessorChain, SharedProcessor};
use crate::source::MessageSource;

/// Listener notified of exceptions raised while the flow processes messages.
///
/// Held by the construct for message-processing error strategies to consult;
/// the lifecycle core itself only stores and exposes it.
pub type ExceptionListener = Arc<dyn Fn(&ComponentError) + Send + Sync>;

/// Closure invoked once per initialise to configure the processor chain.
pub type ChainConfigurer = Box<dyn FnOnce(&mut ChainBuilder) + Send>;

/// Post-assembly structural check over the assembled flow's shape.
pub type ConstructValidator = Box<dyn Fn(&FlowShape) -> Result<(), String> + Send>;

/// Closure run at the end of a lifecycle phase for construct-specific work.
pub type PhaseHook = Box<dyn FnMut() -> ComponentResult<()> + Send>;

/// Snapshot of an assembled flow handed to the post-assembly validator.
///
/// The validator runs after wiring, so it sees the final shape.
#[derive(Debug, Clone)]
pub struct FlowShape<'a> {
    /// The flow construct's name.
    pub name: &'a str,
    /// Whether a message source is attached.
    pub has_source: bool,
    /// Number of stages in the built processor chain.
    pub chain_len: usize,
}

#[derive(Default)]
struct Hooks {
    on_initialise: Option<PhaseHook>,
    on_start: Option<PhaseHook>,
    on_stop: Option<PhaseHook>,
    on_dispose: Option<PhaseHook>,
}

impl Hooks {
    fn run(hook: &mut Option<PhaseHook>) -> ComponentResult<()> {
        match hook.as_mut() {
            Some(hook) => hook(),
            None => Ok(()),
        }
    }
}

/// A named, lifecycle-managed pipeline unit.
///
/// Owns an optional message source and a processor chain built exactly once,
/// during initialise. Lifecycle phases are delegated to both in the order the
/// phase requires, with the shared [`FlowContext`] injected into every
/// context-aware component before initialisation.
///
/// # Example
///
/// ```rust,ignore
/// use flowcore::prelude::*;
///
/// let mut flow = FlowConstruct::builder("orders", context)
///     .source(Box::new(DirectSource::new()))
///     .processor(Box::new(Enricher::new()))
///     .processor(Box::new(Dispatcher::new()))
///     .validator(|shape| {
///         if shape.chain_len == 0 {
///             return Err("flow has no processing stages".to_string());
///         }
///         Ok(())
///     })
///     .build();
///
/// flow.initialise()?;
/// flow.start()?;
/// // ... messages flow ...
/// flow.stop()?;
/// flow.dispose();
/// ```
pub struct FlowConstruct {
    name: String,
    context: FlowContext,
    source: Option<Box<dyn MessageSource>>,
    chain: Option<Arc<Mutex<ProcessorChain>>>,
    pending: Vec<Box<dyn Processor>>,
    configure_chain: Option<ChainConfigurer>,
    validator: Option<ConstructValidator>,
    hooks: Hooks,
    exception_listener: Option<ExceptionListener>,
    lifecycle: LifecycleManager,
}

impl FlowConstruct {
    /// Create a builder for a flow with the given unique name and context.
    pub fn builder(name: impl Into<String>, context: FlowContext) -> FlowBuilder {
        FlowBuilder {
            name: name.into(),
            context,
            source: None,
            pending: Vec::new(),
            configure_chain: None,
            validator: None,
            hooks: Hooks::default(),
            exception_listener: None,
            notifier: None,
        }
    }

    /// Build the processor chain, wire the source to it, inject context, and
    /// initialise both, in that order. Runs the configured hook and the
    /// post-assembly validator last.
    ///
    /// Legal only from `NotInitialised`. Failures other than lifecycle
    /// violations surface as [`FlowError::Initialisation`] unless already of
    /// that kind.
    pub fn initialise(&mut self) -> FlowResult<()> {
        let flow_name = self.name.clone();
        let Self {
            name,
            context,
            source,
            chain,
            pending,
            configure_chain,
            validator,
            hooks,
            lifecycle,
            ..
        } = self;

        let result = lifecycle.fire_initialise(|| {
            let mut builder = ChainBuilder::new();
            for processor in pending.drain(..) {
                builder.add(processor);
            }
            if let Some(configure) = configure_chain.take() {
                configure(&mut builder);
            }
            let built = Arc::new(Mutex::new(builder.build()));
            *chain = Some(built.clone());

            if let Some(src) = source.as_deref_mut() {
                let listener: SharedProcessor = built.clone();
                src.set_listener(listener);
                inject_context(src, context);
            }
            {
                let mut guard = lock_processor(built.as_ref())?;
                inject_context(&mut *guard, context);
            }
            if let Some(src) = source.as_deref_mut() {
                initialise_if_supported(src)?;
            }
            {
                let mut guard = lock_processor(built.as_ref())?;
                initialise_if_supported(&mut *guard)?;
            }

            Hooks::run(&mut hooks.on_initialise)?;

            if let Some(validate) = validator.as_deref() {
                let chain_len = lock_processor(built.as_ref())?.len();
                let shape = FlowShape {
                    name: name.as_str(),
                    has_source: source.is_some(),
                    chain_len,
                };
                validate(&shape).map_err(|reason| FlowError::InvalidConstruct {
                    flow: name.clone(),
                    reason,
                })?;
            }
            Ok(())
        });

        if let Err(err) = &result {
            // A rejected precondition leaves the construct untouched; only a
            // failure inside this attempt discards the partially built chain.
            if !matches!(err, FlowError::Lifecycle(_)) {
                self.chain = None;
            }
        }
        result.map_err(|err| err.into_initialisation(&flow_name))
    }

    /// Start the chain, then the source, then the configured hook.
    ///
    /// The source must not begin delivering until the chain that will
    /// receive its messages is ready. Legal from `Initialised` or `Stopped`;
    /// a failed start reverts to the prior state, so a retry is legal.
    pub fn start(&mut self) -> FlowResult<()> {
        let Self {
            source,
            chain,
            hooks,
            lifecycle,
            ..
        } = self;

        lifecycle.fire_start(|| {
            if let Some(handle) = chain.as_ref() {
                let mut guard = lock_processor(handle.as_ref())?;
                start_if_supported(&mut *guard)?;
            }
            if let Some(src) = source.as_deref_mut() {
                start_if_supported(src)?;
            }
            Hooks::run(&mut hooks.on_start)?;
            Ok(())
        })
    }

    /// Stop the source, then the chain, then the configured hook.
    ///
    /// The producer quiesces before the consumer winds down. Legal from
    /// `Started`; calling `stop` on an already stopped flow is a no-op
    /// success.
    pub fn stop(&mut self) -> FlowResult<()> {
        let Self {
            source,
            chain,
            hooks,
            lifecycle,
            ..
        } = self;

        lifecycle.fire_stop(|| {
            if let Some(src) = source.as_deref_mut() {
                stop_if_supported(src)?;
            }
            if let Some(handle) = chain.as_ref() {
                let mut guard = lock_processor(handle.as_ref())?;
                stop_if_supported(&mut *guard)?;
            }
            Hooks::run(&mut hooks.on_stop)?;
            Ok(())
        })
    }

    /// Dispose the chain, then the source, then the configured hook.
    ///
    /// If the flow is still started it is stopped first. Dispose never
    /// surfaces an error: failures are logged and swallowed, and the
    /// construct ends `Disposed`. Disposing twice is a no-op.
    pub fn dispose(&mut self) {
        if self.lifecycle.state().is_started() {
            if let Err(err) = self.stop() {
                error!(flow = %self.name, %err, "failed to stop flow during dispose");
            }
        }

        let Self {
            source,
            chain,
            hooks,
            lifecycle,
            ..
        } = self;

        lifecycle.fire_dispose(|| {
            if let Some(handle) = chain.as_ref() {
                let mut guard = lock_processor(handle.as_ref())?;
                dispose_if_supported(&mut *guard);
            }
            if let Some(src) = source.as_deref_mut() {
                dispose_if_supported(src);
            }
            Hooks::run(&mut hooks.on_dispose)?;
            Ok(())
        });
    }

    /// The flow's unique name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shared execution context.
    pub fn context(&self) -> &FlowContext {
        &self.context
    }

    /// The current lifecycle state.
    pub fn lifecycle_state(&self) -> &LifecycleState {
        self.lifecycle.state()
    }

    /// Whether the flow is actively processing.
    pub fn is_started(&self) -> bool {
        self.lifecycle.state().is_started()
    }

    /// Whether the flow is stopped.
    pub fn is_stopped(&self) -> bool {
        self.lifecycle.state().is_stopped()
    }

    /// Whether the stop phase is in progress.
    pub fn is_stopping(&self) -> bool {
        self.lifecycle.state().is_stopping()
    }

    /// The attached message source, if any.
    pub fn source(&self) -> Option<&dyn MessageSource> {
        self.source.as_deref()
    }

    /// Shared handle to the built processor chain; `None` before initialise.
    pub fn processor_chain(&self) -> Option<SharedProcessor> {
        self.chain.as_ref().map(|handle| {
            let shared: SharedProcessor = handle.clone();
            shared
        })
    }

    /// The configured exception listener, if any.
    pub fn exception_listener(&self) -> Option<&ExceptionListener> {
        self.exception_listener.as_ref()
    }

    /// Set the exception listener.
    pub fn set_exception_listener(&mut self, listener: ExceptionListener) {
        self.exception_listener = Some(listener);
    }
}

impl fmt::Debug for FlowConstruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowConstruct")
            .field("name", &self.name)
            .field("phase", &self.lifecycle.state().phase())
            .field("has_source", &self.source.is_some())
            .finish()
    }
}

impl fmt::Display for FlowConstruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FlowConstruct{{{}}}", self.name)
    }
}

/// Builder for [`FlowConstruct`] with a fluent API.
pub struct FlowBuilder {
    name: String,
    context: FlowContext,
    source: Option<Box<dyn MessageSource>>,
    pending: Vec<Box<dyn Processor>>,
    configure_chain: Option<ChainConfigurer>,
    validator: Option<ConstructValidator>,
    hooks: Hooks,
    exception_listener: Option<ExceptionListener>,
    notifier: Option<NotificationSender>,
}

impl FlowBuilder {
    /// Attach the message source.
    pub fn source(mut self, source: Box<dyn MessageSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Append a processing stage to the chain built at initialise.
    pub fn processor(mut self, processor: Box<dyn Processor>) -> Self {
        self.pending.push(processor);
        self
    }

    /// Supply a chain-configuration step, run once per initialise after any
    /// stages queued with [`processor`](FlowBuilder::processor).
    pub fn chain<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut ChainBuilder) + Send + 'static,
    {
        self.configure_chain = Some(Box::new(configure));
        self
    }

    /// Supply a post-assembly structural check, run at the end of initialise
    /// against the fully assembled shape.
    pub fn validator<F>(mut self, validate: F) -> Self
    where
        F: Fn(&FlowShape) -> Result<(), String> + Send + 'static,
    {
        self.validator = Some(Box::new(validate));
        self
    }

    /// Run extra work at the end of the initialise phase.
    pub fn on_initialise<F>(mut self, hook: F) -> Self
    where
        F: FnMut() -> ComponentResult<()> + Send + 'static,
    {
        self.hooks.on_initialise = Some(Box::new(hook));
        self
    }

    /// Run extra work at the end of the start phase.
    pub fn on_start<F>(mut self, hook: F) -> Self
    where
        F: FnMut() -> ComponentResult<()> + Send + 'static,
    {
        self.hooks.on_start = Some(Box::new(hook));
        self
    }

    /// Run extra work at the end of the stop phase.
    pub fn on_stop<F>(mut self, hook: F) -> Self
    where
        F: FnMut() -> ComponentResult<()> + Send + 'static,
    {
        self.hooks.on_stop = Some(Box::new(hook));
        self
    }

    /// Run extra work at the end of the dispose phase.
    pub fn on_dispose<F>(mut self, hook: F) -> Self
    where
        F: FnMut() -> ComponentResult<()> + Send + 'static,
    {
        self.hooks.on_dispose = Some(Box::new(hook));
        self
    }

    /// Set the exception listener.
    pub fn exception_listener(mut self, listener: ExceptionListener) -> Self {
        self.exception_listener = Some(listener);
        self
    }

    /// Publish lifecycle notifications to the given sender.
    pub fn notifier(mut self, notifier: NotificationSender) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Build the flow construct in `NotInitialised`.
    pub fn build(self) -> FlowConstruct {
        let mut lifecycle = LifecycleManager::new(self.name.clone());
        if let Some(notifier) = self.notifier {
            lifecycle.set_notifier(notifier);
        }
        FlowConstruct {
            name: self.name,
            context: self.context,
            source: self.source,
            chain: None,
            pending: self.pending,
            configure_chain: self.configure_chain,
            validator: self.validator,
            hooks: self.hooks,
            exception_listener: self.exception_listener,
            lifecycle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::LifecyclePhase;

    #[test]
    fn test_builder_sets_identity() {
        let context = FlowContext::new("test");
        let flow = FlowConstruct::builder("orders", context).build();

        assert_eq!(flow.name(), "orders");
        assert_eq!(flow.context().name(), "test");
        assert_eq!(flow.lifecycle_state().phase(), LifecyclePhase::NotInitialised);
        assert!(flow.source().is_none());
        assert!(flow.processor_chain().is_none());
        assert_eq!(flow.to_string(), "FlowConstruct{orders}");
    }

    #[test]
    fn test_exception_listener_accessors() {
        let mut flow = FlowConstruct::builder("f", FlowContext::new("test")).build();
        assert!(flow.exception_listener().is_none());

        flow.set_exception_listener(Arc::new(|_err| {}));
        assert!(flow.exception_listener().is_some());
    }

    #[test]
    fn test_initialise_builds_chain_exactly_once() {
        let mut flow = FlowConstruct::builder("f", FlowContext::new("test"))
            .chain(|builder| {
                let _ = builder;
            })
            .build();

        flow.initialise().unwrap();
        assert!(flow.processor_chain().is_some());

        let err = flow.initialise().unwrap_err();
        assert!(matches!(err, FlowError::Lifecycle(_)));
    }

    #[test]
    fn test_validator_sees_assembled_shape() {
        let mut flow = FlowConstruct::builder("f", FlowContext::new("test"))
            .validator(|shape| {
                assert_eq!(shape.name, "f");
                assert!(!shape.has_source);
                assert_eq!(shape.chain_len, 0);
                Ok(())
            })
            .build();

        flow.initialise().unwrap();
    }
}
