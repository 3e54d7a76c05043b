//! Component capabilities and capability dispatch.
//!
//! Components managed by a flow construct are polymorphic over an open set of
//! optional capabilities: a message source that needs no setup simply does not
//! implement [`Initialisable`], and the construct never branches on its
//! concrete type to find out. Dispatch code performs a capability query via
//! the accessors on [`Component`] and silently skips what is not supported.

use std::any::Any;
use std::fmt::Debug;

use crate::context::FlowContext;
use crate::error::ComponentResult;

/// Capability: one-time setup before first use.
pub trait Initialisable {
    /// Perform one-time setup. Called exactly once, before `start`.
    fn initialise(&mut self) -> ComponentResult<()>;
}

/// Capability: begin active work.
pub trait Startable {
    /// Begin active work. May be called again after a `stop`.
    fn start(&mut self) -> ComponentResult<()>;
}

/// Capability: cease active work, with the option of starting again later.
pub trait Stoppable {
    /// Cease active work.
    fn stop(&mut self) -> ComponentResult<()>;
}

/// Capability: final, best-effort release of resources.
pub trait Disposable {
    /// Release resources. Must not fail; dispose is terminal.
    fn dispose(&mut self);
}

/// Capability: receives the shared execution context before initialisation.
pub trait ContextAware {
    /// Accept the process-wide context handle.
    fn set_context(&mut self, context: FlowContext);
}

/// Base trait for anything a flow construct manages.
///
/// A component opts into lifecycle capabilities by overriding the matching
/// accessor to return itself; the defaults declare no capabilities at all.
/// Callers dispatch through the free functions in this module rather than
/// testing concrete types.
///
/// # Example
///
/// ```rust
/// use flowcore::{Component, ComponentResult, Startable};
/// use std::any::Any;
///
/// #[derive(Debug)]
/// struct Poller {
///     running: bool,
/// }
///
/// impl Startable for Poller {
///     fn start(&mut self) -> ComponentResult<()> {
///         self.running = true;
///         Ok(())
///     }
/// }
///
/// impl Component for Poller {
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
///
///     fn as_startable(&mut self) -> Option<&mut dyn Startable> {
///         Some(self)
///     }
/// }
/// ```
pub trait Component: Debug + Send {
    /// Downcast to concrete type for advanced usage.
    fn as_any(&self) -> &dyn Any;

    /// The component's view of itself as [`Initialisable`], if supported.
    fn as_initialisable(&mut self) -> Option<&mut dyn Initialisable> {
        None
    }

    /// The component's view of itself as [`Startable`], if supported.
    fn as_startable(&mut self) -> Option<&mut dyn Startable> {
        None
    }

    /// The component's view of itself as [`Stoppable`], if supported.
    fn as_stoppable(&mut self) -> Option<&mut dyn Stoppable> {
        None
    }

    /// The component's view of itself as [`Disposable`], if supported.
    fn as_disposable(&mut self) -> Option<&mut dyn Disposable> {
        None
    }

    /// The component's view of itself as [`ContextAware`], if supported.
    fn as_context_aware(&mut self) -> Option<&mut dyn ContextAware> {
        None
    }
}

/// Extension trait for component type checking.
pub trait ComponentExt: Component {
    /// Check if this component is of type T.
    fn is<T: Component + 'static>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcast to type T.
    fn downcast_ref<T: Component + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

impl<C: Component + ?Sized> ComponentExt for C {}

/// Initialise the component if it supports initialisation; otherwise succeed
/// without touching it.
pub fn initialise_if_supported<C: Component + ?Sized>(component: &mut C) -> ComponentResult<()> {
    match component.as_initialisable() {
        Some(target) => target.initialise(),
        None => Ok(()),
    }
}

/// Start the component if it is startable; otherwise succeed without touching it.
pub fn start_if_supported<C: Component + ?Sized>(component: &mut C) -> ComponentResult<()> {
    match component.as_startable() {
        Some(target) => target.start(),
        None => Ok(()),
    }
}

/// Stop the component if it is stoppable; otherwise succeed without touching it.
pub fn stop_if_supported<C: Component + ?Sized>(component: &mut C) -> ComponentResult<()> {
    match component.as_stoppable() {
        Some(target) => target.stop(),
        None => Ok(()),
    }
}

/// Dispose the component if it is disposable; otherwise do nothing.
pub fn dispose_if_supported<C: Component + ?Sized>(component: &mut C) {
    if let Some(target) = component.as_disposable() {
        target.dispose();
    }
}

/// Hand the shared context to the component if it is context-aware; otherwise
/// do nothing.
pub fn inject_context<C: Component + ?Sized>(component: &mut C, context: &FlowContext) {
    if let Some(target) = component.as_context_aware() {
        target.set_context(context.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Supports every capability and counts invocations.
    #[derive(Debug, Default)]
    struct FullComponent {
        initialised: u32,
        started: u32,
        stopped: u32,
        disposed: u32,
        context: Option<FlowContext>,
    }

    impl Initialisable for FullComponent {
        fn initialise(&mut self) -> ComponentResult<()> {
            self.initialised += 1;
            Ok(())
        }
    }

    impl Startable for FullComponent {
        fn start(&mut self) -> ComponentResult<()> {
            self.started += 1;
            Ok(())
        }
    }

    impl Stoppable for FullComponent {
        fn stop(&mut self) -> ComponentResult<()> {
            self.stopped += 1;
            Ok(())
        }
    }

    impl Disposable for FullComponent {
        fn dispose(&mut self) {
            self.disposed += 1;
        }
    }

    impl ContextAware for FullComponent {
        fn set_context(&mut self, context: FlowContext) {
            self.context = Some(context);
        }
    }

    impl Component for FullComponent {
        fn as_any(&self) -> &dyn Any {
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

    /// Declares no capabilities at all.
    #[derive(Debug)]
    struct BareComponent;

    impl Component for BareComponent {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_dispatch_invokes_supported_capabilities() {
        let mut component = FullComponent::default();

        inject_context(&mut component, &FlowContext::new("test"));
        initialise_if_supported(&mut component).unwrap();
        start_if_supported(&mut component).unwrap();
        stop_if_supported(&mut component).unwrap();
        dispose_if_supported(&mut component);

        assert_eq!(component.initialised, 1);
        assert_eq!(component.started, 1);
        assert_eq!(component.stopped, 1);
        assert_eq!(component.disposed, 1);
        assert!(component.context.is_some());
    }

    #[test]
    fn test_dispatch_skips_unsupported_capabilities() {
        let mut component = BareComponent;

        inject_context(&mut component, &FlowContext::new("test"));
        assert!(initialise_if_supported(&mut component).is_ok());
        assert!(start_if_supported(&mut component).is_ok());
        assert!(stop_if_supported(&mut component).is_ok());
        dispose_if_supported(&mut component);
    }

    #[test]
    fn test_component_downcast() {
        let component = BareComponent;
        assert!(component.is::<BareComponent>());
        assert!(component.downcast_ref::<BareComponent>().is_some());
        assert!(!component.is::<FullComponent>());
    }

    #[test]
    fn test_dispatch_through_trait_object() {
        let mut boxed: Box<dyn Component> = Box::new(FullComponent::default());

        initialise_if_supported(boxed.as_mut()).unwrap();
        start_if_supported(boxed.as_mut()).unwrap();

        let concrete = boxed.downcast_ref::<FullComponent>().unwrap();
        assert_eq!(concrete.initialised, 1);
        assert_eq!(concrete.started, 1);
    }
}
