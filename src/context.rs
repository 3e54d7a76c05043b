//! Shared execution context handed to every component of a flow.
//!
//! The context is the read-only, process-wide configuration handle. It is
//! built once by the deployment driver that owns the process and injected
//! into every context-aware component during initialisation.

use std::collections::HashMap;
use std::sync::Arc;

/// Read-only handle to process-wide configuration.
///
/// Cloning is cheap; all clones share the same underlying data. The context
/// is immutable once built; its mutation lifecycle belongs to the external
/// deployment driver, not to the components reading it.
///
/// # Example
///
/// ```rust
/// use flowcore::FlowContext;
///
/// let context = FlowContext::builder("staging")
///     .property("region", "eu-west-1")
///     .build();
///
/// assert_eq!(context.name(), "staging");
/// assert_eq!(context.property("region"), Some("eu-west-1"));
/// assert_eq!(context.property("missing"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FlowContext {
    inner: Arc<ContextInner>,
}

#[derive(Debug, Default)]
struct ContextInner {
    name: String,
    properties: HashMap<String, String>,
}

impl FlowContext {
    /// Create a context with the given name and no properties.
    pub fn new(name: impl Into<String>) -> Self {
        Self::builder(name).build()
    }

    /// Create a builder for a context with the given name.
    pub fn builder(name: impl Into<String>) -> FlowContextBuilder {
        FlowContextBuilder {
            name: name.into(),
            properties: HashMap::new(),
        }
    }

    /// Returns the context name (e.g. the deployment environment).
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Look up a configuration property by key.
    pub fn property(&self, key: &str) -> Option<&str> {
        self.inner.properties.get(key).map(|v| v.as_str())
    }

    /// Returns the number of configured properties.
    pub fn property_count(&self) -> usize {
        self.inner.properties.len()
    }
}

/// Builder for [`FlowContext`] with a fluent API.
pub struct FlowContextBuilder {
    name: String,
    properties: HashMap<String, String>,
}

impl FlowContextBuilder {
    /// Add a configuration property.
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Build the context.
    pub fn build(self) -> FlowContext {
        FlowContext {
            inner: Arc::new(ContextInner {
                name: self.name,
                properties: self.properties,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_properties() {
        let context = FlowContext::builder("test")
            .property("a", "1")
            .property("b", "2")
            .build();

        assert_eq!(context.name(), "test");
        assert_eq!(context.property("a"), Some("1"));
        assert_eq!(context.property("b"), Some("2"));
        assert_eq!(context.property("c"), None);
        assert_eq!(context.property_count(), 2);
    }

    #[test]
    fn test_context_clones_share_data() {
        let context = FlowContext::builder("shared").property("k", "v").build();
        let clone = context.clone();

        assert_eq!(clone.name(), "shared");
        assert_eq!(clone.property("k"), Some("v"));
    }
}
