//! Message sources.
//!
//! A message source originates the messages a flow processes. The flow
//! construct wires the source to the built processor chain during initialise,
//! before either side is initialised, so no message can arrive ahead of a
//! receiver.

use std::any::Any;

use crate::component::{Component, ContextAware, Startable, Stoppable};
use crate::context::FlowContext;
use crate::error::{ComponentError, ComponentResult};
use crate::processor::{lock_processor, Message, SharedProcessor};

/// The component originating messages for a flow.
pub trait MessageSource: Component {
    /// Wire the source to the processor that will receive its messages.
    ///
    /// Called once per flow initialise, before the source itself is
    /// initialised or started.
    fn set_listener(&mut self, listener: SharedProcessor);
}

/// A source driven directly by the caller.
///
/// Useful wherever messages are pushed into a flow programmatically rather
/// than arriving from a transport: the caller obtains the source from the
/// owning flow (via downcast) and feeds it with [`send`](DirectSource::send).
/// Delivery is refused until the source has been wired and started.
#[derive(Debug, Default)]
pub struct DirectSource {
    listener: Option<SharedProcessor>,
    context: Option<FlowContext>,
    started: bool,
}

impl DirectSource {
    /// Create an unwired, stopped source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the source is currently delivering.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// The injected execution context, once the owning flow has initialised.
    pub fn context(&self) -> Option<&FlowContext> {
        self.context.as_ref()
    }

    /// Deliver one message to the wired listener and return its result.
    pub fn send(&self, message: Message) -> ComponentResult<Message> {
        if !self.started {
            return Err(ComponentError::Other(
                "source is not started".to_string(),
            ));
        }
        let listener = self.listener.as_ref().ok_or_else(|| {
            ComponentError::Other("source has no listener".to_string())
        })?;
        let mut target = lock_processor(listener.as_ref())?;
        target.process(message)
    }
}

impl MessageSource for DirectSource {
    fn set_listener(&mut self, listener: SharedProcessor) {
        self.listener = Some(listener);
    }
}

impl Startable for DirectSource {
    fn start(&mut self) -> ComponentResult<()> {
        self.started = true;
        Ok(())
    }
}

impl Stoppable for DirectSource {
    fn stop(&mut self) -> ComponentResult<()> {
        self.started = false;
        Ok(())
    }
}

impl ContextAware for DirectSource {
    fn set_context(&mut self, context: FlowContext) {
        self.context = Some(context);
    }
}

impl Component for DirectSource {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_startable(&mut self) -> Option<&mut dyn Startable> {
        Some(self)
    }

    fn as_stoppable(&mut self) -> Option<&mut dyn Stoppable> {
        Some(self)
    }

    fn as_context_aware(&mut self) -> Option<&mut dyn ContextAware> {
        Some(self)
    }
}
