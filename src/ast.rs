//! In-memory configuration tree for a deployable artifact.
//!
//! Parsing a pipeline DSL into this tree is an external concern; validation
//! consumes the tree read-only. An artifact holds its components (each a
//! tree), its direct dependencies (each contributing a namespace prefix) and
//! the repository of error types those dependencies registered.

use std::collections::HashMap;
use std::fmt;

/// Namespace owned by the platform itself, used when an error-type reference
/// carries no explicit namespace.
pub const CORE_NAMESPACE: &str = "flow";

/// Where a component was declared in its configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    file: Option<String>,
    line: Option<u32>,
}

impl SourceLocation {
    /// Location with known file and line.
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: Some(file.into()),
            line: Some(line),
        }
    }

    /// Location for a component with no recorded origin.
    pub fn unknown() -> Self {
        Self::default()
    }

    /// The file name, if recorded.
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    /// The starting line, if recorded.
    pub fn line(&self) -> Option<u32> {
        self.line
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = self.file.as_deref().unwrap_or("unknown");
        let line = self.line.map(i64::from).unwrap_or(-1);
        write!(f, "[{}:{}]", file, line)
    }
}

/// A direct dependency of the artifact, exposing its namespace prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    prefix: String,
}

impl Dependency {
    /// Declare a dependency with the given namespace prefix (e.g. `http`).
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The namespace prefix as declared.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// A configured association from a matched error condition to a target
/// error-type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMapping {
    source: String,
    target: String,
}

impl ErrorMapping {
    /// Create a mapping from a source matcher to a target reference.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// The source error matcher as configured.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The target error-type reference as configured, `NAMESPACE:IDENTIFIER`
    /// or a bare identifier.
    pub fn target(&self) -> &str {
        &self.target
    }
}

/// Case-normalized identifier of an error type: namespace plus name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorTypeId {
    namespace: String,
    name: String,
}

impl ErrorTypeId {
    /// Build an identifier; both parts are upper-cased for comparison.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into().to_uppercase(),
            name: name.into().to_uppercase(),
        }
    }

    /// Parse a reference string.
    ///
    /// Splits on the first `:`; with no separator (or a leading one) the
    /// whole string is the name and `default_namespace` supplies the
    /// namespace.
    ///
    /// # Example
    ///
    /// ```rust
    /// use flowcore::ErrorTypeId;
    ///
    /// let id = ErrorTypeId::parse("http:NOT_FOUND", "flow");
    /// assert_eq!(id.namespace(), "HTTP");
    /// assert_eq!(id.name(), "NOT_FOUND");
    ///
    /// let id = ErrorTypeId::parse("retry_exhausted", "flow");
    /// assert_eq!(id.namespace(), "FLOW");
    /// ```
    pub fn parse(representation: &str, default_namespace: &str) -> Self {
        match representation.find(':') {
            Some(separator) if separator > 0 => Self::new(
                &representation[..separator],
                &representation[separator + 1..],
            ),
            _ => Self::new(default_namespace, representation),
        }
    }

    /// The upper-cased namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The upper-cased name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ErrorTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// An error type registered by one of the artifact's extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorType {
    id: ErrorTypeId,
}

impl ErrorType {
    /// Register-able error type under the given namespace and name.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ErrorTypeId::new(namespace, name),
        }
    }

    /// The type's identifier.
    pub fn id(&self) -> &ErrorTypeId {
        &self.id
    }
}

/// Lookup of registered error types, keyed by namespaced identifier.
///
/// Queried, never mutated, by validation.
#[derive(Debug, Clone, Default)]
pub struct ErrorTypeRepository {
    types: HashMap<ErrorTypeId, ErrorType>,
}

impl ErrorTypeRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an error type.
    pub fn register(&mut self, error_type: ErrorType) {
        self.types.insert(error_type.id().clone(), error_type);
    }

    /// Look up a registered error type by identifier.
    pub fn lookup(&self, id: &ErrorTypeId) -> Option<&ErrorType> {
        self.types.get(id)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// One component in the configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentAst {
    identifier: String,
    parameters: HashMap<String, String>,
    error_mappings: Vec<ErrorMapping>,
    location: SourceLocation,
    children: Vec<ComponentAst>,
}

impl ComponentAst {
    /// Create a component with the given identifier and no further detail.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            parameters: HashMap::new(),
            error_mappings: Vec::new(),
            location: SourceLocation::unknown(),
            children: Vec::new(),
        }
    }

    /// Attach a named parameter.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Attach an error mapping.
    pub fn with_error_mapping(mut self, mapping: ErrorMapping) -> Self {
        self.error_mappings.push(mapping);
        self
    }

    /// Record where the component was declared.
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    /// Nest a child component.
    pub fn with_child(mut self, child: ComponentAst) -> Self {
        self.children.push(child);
        self
    }

    /// The component's identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Look up a named parameter.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(|v| v.as_str())
    }

    /// The component's error mappings.
    pub fn error_mappings(&self) -> &[ErrorMapping] {
        &self.error_mappings
    }

    /// Where the component was declared.
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// Directly nested components.
    pub fn children(&self) -> &[ComponentAst] {
        &self.children
    }
}

/// The parsed, in-memory configuration tree of one artifact.
#[derive(Debug, Clone, Default)]
pub struct ArtifactAst {
    components: Vec<ComponentAst>,
    dependencies: Vec<Dependency>,
    error_types: ErrorTypeRepository,
}

impl ArtifactAst {
    /// Create an empty artifact.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a top-level component.
    pub fn with_component(mut self, component: ComponentAst) -> Self {
        self.components.push(component);
        self
    }

    /// Declare a direct dependency.
    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Register an error type in the artifact's repository.
    pub fn with_error_type(mut self, error_type: ErrorType) -> Self {
        self.error_types.register(error_type);
        self
    }

    /// The artifact's direct dependencies.
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// The artifact's error type repository.
    pub fn error_types(&self) -> &ErrorTypeRepository {
        &self.error_types
    }

    /// Top-level components.
    pub fn components(&self) -> &[ComponentAst] {
        &self.components
    }

    /// Visit every component in document order, parents before children.
    ///
    /// The visitor receives the ancestor-inclusive path: the element under
    /// test is last, preceded by its enclosing components from the root down.
    pub fn visit<F>(&self, mut visitor: F)
    where
        F: FnMut(&[&ComponentAst]),
    {
        fn walk<'a>(
            node: &'a ComponentAst,
            path: &mut Vec<&'a ComponentAst>,
            visitor: &mut impl FnMut(&[&ComponentAst]),
        ) {
            path.push(node);
            visitor(path);
            for child in node.children() {
                walk(child, path, visitor);
            }
            path.pop();
        }

        let mut path = Vec::new();
        for component in &self.components {
            walk(component, &mut path, &mut visitor);
        }
    }
}
