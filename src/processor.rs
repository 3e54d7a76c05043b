//! Message processors and the processor chain.
//!
//! A flow construct processes messages through an ordered composite of
//! processing stages. The composite is assembled by a [`ChainBuilder`]
//! exactly once, during the construct's initialise phase, and the resulting
//! [`ProcessorChain`] propagates lifecycle and context to every member stage
//! through capability dispatch.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::component::{
    dispose_if_supported, initialise_if_supported, inject_context, start_if_supported,
    stop_if_supported, Component, ContextAware, Disposable, Initialisable, Startable, Stoppable,
};
use crate::context::FlowContext;
use crate::error::{ComponentError, ComponentResult};

/// A unit of work moving through a flow.
///
/// The wire format of messages is out of scope here; a message is an opaque
/// payload plus named properties attached along the way.
///
/// # Example
///
/// ```rust
/// use flowcore::Message;
///
/// let message = Message::new("hello").with_property("origin", "cli");
/// assert_eq!(message.payload(), "hello");
/// assert_eq!(message.property("origin"), Some("cli"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    payload: String,
    properties: HashMap<String, String>,
}

impl Message {
    /// Create a message with the given payload and no properties.
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            properties: HashMap::new(),
        }
    }

    /// Returns the payload.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Replace the payload, keeping properties.
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Look up a property by key.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(|v| v.as_str())
    }

    /// Attach a property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// A processing stage in a flow.
///
/// Processors are components: they may additionally opt into any lifecycle
/// capability, and the owning chain will drive those in order.
pub trait Processor: Component {
    /// Process one message, producing the message handed to the next stage.
    fn process(&mut self, message: Message) -> ComponentResult<Message>;
}

/// Shared handle to a processor.
///
/// This is what a message source is wired to: the flow construct keeps the
/// built chain behind a shared handle and passes a clone to
/// [`MessageSource::set_listener`](crate::MessageSource::set_listener).
pub type SharedProcessor = Arc<Mutex<dyn Processor>>;

/// Lock a shared processor, mapping a poisoned lock to a component error.
pub(crate) fn lock_processor<P: ?Sized>(handle: &Mutex<P>) -> ComponentResult<MutexGuard<'_, P>> {
    handle
        .lock()
        .map_err(|_| ComponentError::Other("processor lock poisoned".to_string()))
}

/// Ordered composite of processors.
///
/// Built once per flow initialise. The chain is itself a processor (a message
/// folds through the members in order) and a component supporting every
/// lifecycle capability, each delegating member-by-member through capability
/// dispatch.
#[derive(Debug, Default)]
pub struct ProcessorChain {
    processors: Vec<Box<dyn Processor>>,
}

impl ProcessorChain {
    /// Returns the number of stages in the chain.
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Check if the chain has no stages.
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}

impl Processor for ProcessorChain {
    fn process(&mut self, message: Message) -> ComponentResult<Message> {
        let mut current = message;
        for processor in &mut self.processors {
            current = processor.process(current)?;
        }
        Ok(current)
    }
}

impl Initialisable for ProcessorChain {
    fn initialise(&mut self) -> ComponentResult<()> {
        for processor in &mut self.processors {
            initialise_if_supported(processor.as_mut())?;
        }
        Ok(())
    }
}

impl Startable for ProcessorChain {
    fn start(&mut self) -> ComponentResult<()> {
        for processor in &mut self.processors {
            start_if_supported(processor.as_mut())?;
        }
        Ok(())
    }
}

impl Stoppable for ProcessorChain {
    fn stop(&mut self) -> ComponentResult<()> {
        for processor in &mut self.processors {
            stop_if_supported(processor.as_mut())?;
        }
        Ok(())
    }
}

impl Disposable for ProcessorChain {
    fn dispose(&mut self) {
        for processor in &mut self.processors {
            dispose_if_supported(processor.as_mut());
        }
    }
}

impl ContextAware for ProcessorChain {
    fn set_context(&mut self, context: FlowContext) {
        for processor in &mut self.processors {
            inject_context(processor.as_mut(), &context);
        }
    }
}

impl Component for ProcessorChain {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_initialisable(&mut self) -> Option<&mut dyn Initialisable> {
        Some(self)
    }

    fn as_startable(&mut self) -> Option<&mut dyn Startable> {
        Some(self)
    }

    fn as_stoppable(&mut self) -> Option<&mut dyn Stoppable> {
        Some(self)
    }

    fn as_disposable(&mut self) -> Option<&mut dyn Disposable> {
        Some(self)
    }

    fn as_context_aware(&mut self) -> Option<&mut dyn ContextAware> {
        Some(self)
    }
}

/// Accumulates processors into a [`ProcessorChain`].
///
/// `add` may be called any number of times; `build` consumes the builder and
/// is called exactly once per flow initialise.
#[derive(Debug, Default)]
pub struct ChainBuilder {
    processors: Vec<Box<dyn Processor>>,
}

impl ChainBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a processing stage.
    pub fn add(&mut self, processor: Box<dyn Processor>) -> &mut Self {
        self.processors.push(processor);
        self
    }

    /// Append a processing stage, fluent form.
    pub fn with(mut self, processor: Box<dyn Processor>) -> Self {
        self.processors.push(processor);
        self
    }

    /// Returns the number of stages added so far.
    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// Check if no stages have been added.
    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Build the composite chain.
    pub fn build(self) -> ProcessorChain {
        ProcessorChain {
            processors: self.processors,
        }
    }
}
