//! Pluggable semantic validation over a parsed artifact.
//!
//! Rules are authored independently: each one identifies itself, declares
//! which AST elements it applies to, and produces at most one diagnostic per
//! applicable element. Rules are pure and read-only with respect to the
//! artifact and carry no ordering dependency on one another: they are
//! `Send + Sync` and safe to evaluate in parallel, though the runner here
//! walks them sequentially and only the diagnostic collection is ordered.
//!
//! An artifact is deployable iff the run produced no `ERROR`-severity
//! diagnostic; warnings are reported but non-blocking.

use std::fmt::{self, Debug};
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::warn;

use crate::ast::{ArtifactAst, ComponentAst, SourceLocation};

/// How serious a failed validation is. `Error` blocks deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Reported, but does not block deployment
    Warn,
    /// Blocks deployment of the artifact
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warn => f.write_str("WARN"),
            Severity::Error => f.write_str("ERROR"),
        }
    }
}

/// A single finding reported by a validation rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    rule: String,
    severity: Severity,
    message: String,
    location: SourceLocation,
}

impl Diagnostic {
    /// Name of the rule that produced the finding.
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// The producing rule's severity.
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// The finding itself.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where the offending component was declared.
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}: {}",
            self.severity, self.location, self.rule, self.message
        )
    }
}

/// A unit of semantic checking over the artifact AST.
///
/// Implementations must be pure: no mutation of the artifact, no state
/// carried between elements, no dependence on other rules having run.
pub trait ValidationRule: Debug + Send + Sync {
    /// Unique rule name, used to tag diagnostics.
    fn name(&self) -> &str;

    /// Human description of what the rule checks.
    fn description(&self) -> &str;

    /// Severity attached to every diagnostic this rule produces.
    fn severity(&self) -> Severity;

    /// Whether the rule applies to the element at the end of `path`.
    ///
    /// `path` is ancestor-inclusive: the element under test is last,
    /// preceded by its enclosing components.
    fn applies_to(&self, path: &[&ComponentAst]) -> bool;

    /// Check one applicable element against the whole artifact, producing at
    /// most one diagnostic message.
    fn validate(&self, component: &ComponentAst, artifact: &ArtifactAst) -> Option<String>;
}

/// The element a path points at: the last entry of an ancestor-inclusive
/// path. Applicability predicates that only care about the element itself
/// start here.
pub fn current_element<'a>(path: &[&'a ComponentAst]) -> Option<&'a ComponentAst> {
    path.last().copied()
}

/// The outcome of running validation over one artifact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    diagnostics: Vec<Diagnostic>,
}

impl ValidationReport {
    /// Every diagnostic, in document order of the offending components.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Only the `ERROR`-severity diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity() == Severity::Error)
    }

    /// Only the `WARN`-severity diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity() == Severity::Warn)
    }

    /// Whether the artifact may be activated: true iff no `ERROR`-severity
    /// diagnostic was produced.
    pub fn is_deployable(&self) -> bool {
        self.errors().next().is_none()
    }

    /// Check if the run produced no diagnostics at all.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Executes registered rules over every element of an artifact and collects
/// the verdicts.
///
/// Components are visited in document order, parents before children, and
/// that is the order diagnostics are reported in; rules run in registration
/// order per component. A rule that panics is a framework-level defect: it is
/// disabled for the remainder of the run and reported once as an ERROR
/// diagnostic, and the other rules are unaffected.
#[derive(Debug, Default)]
pub struct ValidationRunner {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidationRunner {
    /// Create a runner with no rules registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runner preloaded with the platform's built-in rules.
    pub fn with_core_rules() -> Self {
        let mut runner = Self::new();
        runner.register(Box::new(crate::rules::ErrorTypeReferencesExist));
        runner
    }

    /// Register a rule. Rules run in registration order per component.
    pub fn register(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Names of all registered rules, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over registered rules.
    pub fn iter(&self) -> impl Iterator<Item = &dyn ValidationRule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    /// Run every applicable rule over every component of the artifact.
    ///
    /// Running twice over the same unmodified artifact yields identical
    /// reports; neither the runner nor the rules hold hidden state.
    pub fn run(&self, artifact: &ArtifactAst) -> ValidationReport {
        let mut diagnostics = Vec::new();
        let mut disabled = vec![false; self.rules.len()];

        artifact.visit(|path| {
            let component = match current_element(path) {
                Some(component) => component,
                None => return,
            };

            for (index, rule) in self.rules.iter().enumerate() {
                if disabled[index] {
                    continue;
                }
                let outcome = catch_unwind(AssertUnwindSafe(|| {
                    if rule.applies_to(path) {
                        rule.validate(component, artifact)
                    } else {
                        None
                    }
                }));
                match outcome {
                    Ok(Some(message)) => diagnostics.push(Diagnostic {
                        rule: rule.name().to_string(),
                        severity: rule.severity(),
                        message,
                        location: component.location().clone(),
                    }),
                    Ok(None) => {}
                    Err(_) => {
                        disabled[index] = true;
                        warn!(rule = rule.name(), "validation rule panicked; disabling for this run");
                        diagnostics.push(Diagnostic {
                            rule: rule.name().to_string(),
                            severity: Severity::Error,
                            message: format!(
                                "Validation rule '{}' failed to execute",
                                rule.name()
                            ),
                            location: component.location().clone(),
                        });
                    }
                }
            }
        });

        ValidationReport { diagnostics }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Flags every component whose identifier matches.
    #[derive(Debug)]
    struct FlagIdentifier {
        target: &'static str,
        severity: Severity,
    }

    impl ValidationRule for FlagIdentifier {
        fn name(&self) -> &str {
            "flag-identifier"
        }

        fn description(&self) -> &str {
            "Flags components by identifier, for tests."
        }

        fn severity(&self) -> Severity {
            self.severity
        }

        fn applies_to(&self, path: &[&ComponentAst]) -> bool {
            current_element(path).is_some_and(|c| c.identifier() == self.target)
        }

        fn validate(&self, component: &ComponentAst, _artifact: &ArtifactAst) -> Option<String> {
            Some(format!("component '{}' is flagged", component.identifier()))
        }
    }

    fn sample_artifact() -> ArtifactAst {
        ArtifactAst::new()
            .with_component(ComponentAst::new("keep").with_child(ComponentAst::new("flag")))
            .with_component(ComponentAst::new("flag"))
    }

    #[test]
    fn test_runner_reports_in_document_order() {
        let mut runner = ValidationRunner::new();
        runner.register(Box::new(FlagIdentifier {
            target: "flag",
            severity: Severity::Error,
        }));

        let report = runner.run(&sample_artifact());
        assert_eq!(report.diagnostics().len(), 2);
        assert!(!report.is_deployable());
        assert!(report
            .diagnostics()
            .iter()
            .all(|d| d.rule() == "flag-identifier"));
    }

    #[test]
    fn test_warnings_do_not_block() {
        let mut runner = ValidationRunner::new();
        runner.register(Box::new(FlagIdentifier {
            target: "flag",
            severity: Severity::Warn,
        }));

        let report = runner.run(&sample_artifact());
        assert_eq!(report.warnings().count(), 2);
        assert_eq!(report.errors().count(), 0);
        assert!(report.is_deployable());
    }

    #[test]
    fn test_empty_runner_produces_empty_report() {
        let runner = ValidationRunner::new();
        assert!(runner.is_empty());

        let report = runner.run(&sample_artifact());
        assert!(report.is_empty());
        assert!(report.is_deployable());
    }

    #[test]
    fn test_run_is_deterministic() {
        let mut runner = ValidationRunner::new();
        runner.register(Box::new(FlagIdentifier {
            target: "flag",
            severity: Severity::Error,
        }));

        let artifact = sample_artifact();
        let first = runner.run(&artifact);
        let second = runner.run(&artifact);
        assert_eq!(first, second);
    }

    #[test]
    fn test_panicking_rule_is_isolated() {
        #[derive(Debug)]
        struct Panicking;

        impl ValidationRule for Panicking {
            fn name(&self) -> &str {
                "panicking"
            }

            fn description(&self) -> &str {
                "Always panics, for tests."
            }

            fn severity(&self) -> Severity {
                Severity::Error
            }

            fn applies_to(&self, _path: &[&ComponentAst]) -> bool {
                true
            }

            fn validate(&self, _component: &ComponentAst, _artifact: &ArtifactAst) -> Option<String> {
                panic!("broken rule");
            }
        }

        let mut runner = ValidationRunner::new();
        runner.register(Box::new(Panicking));
        runner.register(Box::new(FlagIdentifier {
            target: "flag",
            severity: Severity::Warn,
        }));

        let report = runner.run(&sample_artifact());

        // The broken rule is reported once, then disabled; the healthy rule
        // still sees every component.
        let broken: Vec<_> = report
            .diagnostics()
            .iter()
            .filter(|d| d.rule() == "panicking")
            .collect();
        assert_eq!(broken.len(), 1);
        assert_eq!(
            report
                .diagnostics()
                .iter()
                .filter(|d| d.rule() == "flag-identifier")
                .count(),
            2
        );
    }
}
