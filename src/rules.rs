//! Built-in validation rules.

use std::collections::HashSet;

use crate::ast::{ArtifactAst, ComponentAst, ErrorTypeId, CORE_NAMESPACE};
use crate::validation::{current_element, Severity, ValidationRule};

/// Referenced error types exist in the context of the artifact.
///
/// Applies to components that declare error mappings. Each mapping target is
/// parsed as `NAMESPACE:IDENTIFIER` (the core namespace when no namespace is
/// given) and resolved against the artifact's error type repository, but
/// only when the namespace belongs to one of the artifact's declared
/// dependencies. References into namespaces the artifact does not depend on
/// are left unchecked: they may belong to a part of the system outside this
/// artifact's validation authority, and partial artifacts must still
/// validate.
#[derive(Debug, Default)]
pub struct ErrorTypeReferencesExist;

impl ValidationRule for ErrorTypeReferencesExist {
    fn name(&self) -> &str {
        "error-type-references-exist"
    }

    fn description(&self) -> &str {
        "Referenced error types do exist in the context of the artifact."
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn applies_to(&self, path: &[&ComponentAst]) -> bool {
        current_element(path).is_some_and(|component| !component.error_mappings().is_empty())
    }

    fn validate(&self, component: &ComponentAst, artifact: &ArtifactAst) -> Option<String> {
        let known_namespaces: HashSet<String> = artifact
            .dependencies()
            .iter()
            .map(|dependency| dependency.prefix().to_uppercase())
            .collect();

        for mapping in component.error_mappings() {
            let error_type_id = ErrorTypeId::parse(mapping.target(), CORE_NAMESPACE);

            if known_namespaces.contains(error_type_id.namespace())
                && artifact.error_types().lookup(&error_type_id).is_none()
            {
                return Some(format!(
                    "Could not find error '{}' used in {}",
                    mapping.target(),
                    component.location()
                ));
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Dependency, ErrorMapping, ErrorType, SourceLocation};

    fn component_with_target(target: &str) -> ComponentAst {
        ComponentAst::new("request")
            .with_error_mapping(ErrorMapping::new("ANY", target))
            .with_location(SourceLocation::new("app.xml", 7))
    }

    #[test]
    fn test_not_applicable_without_mappings() {
        let rule = ErrorTypeReferencesExist;
        let component = ComponentAst::new("logger");
        assert!(!rule.applies_to(&[&component]));

        let component = component_with_target("HTTP:NOT_FOUND");
        assert!(rule.applies_to(&[&component]));
    }

    #[test]
    fn test_missing_type_in_known_namespace_is_reported() {
        let rule = ErrorTypeReferencesExist;
        let component = component_with_target("HTTP:NOT_FOUND");
        let artifact = ArtifactAst::new().with_dependency(Dependency::new("http"));

        let message = rule.validate(&component, &artifact).unwrap();
        assert_eq!(
            message,
            "Could not find error 'HTTP:NOT_FOUND' used in [app.xml:7]"
        );
    }

    #[test]
    fn test_registered_type_is_silent() {
        let rule = ErrorTypeReferencesExist;
        let component = component_with_target("http:not_found");
        let artifact = ArtifactAst::new()
            .with_dependency(Dependency::new("http"))
            .with_error_type(ErrorType::new("HTTP", "NOT_FOUND"));

        assert!(rule.validate(&component, &artifact).is_none());
    }

    #[test]
    fn test_foreign_namespace_is_not_checked() {
        let rule = ErrorTypeReferencesExist;
        let component = component_with_target("FOO:BAR");
        let artifact = ArtifactAst::new().with_dependency(Dependency::new("http"));

        assert!(rule.validate(&component, &artifact).is_none());
    }

    #[test]
    fn test_bare_reference_resolves_against_core_namespace() {
        let rule = ErrorTypeReferencesExist;
        let component = component_with_target("RETRY_EXHAUSTED");
        let artifact = ArtifactAst::new()
            .with_dependency(Dependency::new(CORE_NAMESPACE))
            .with_error_type(ErrorType::new(CORE_NAMESPACE, "RETRY_EXHAUSTED"));

        assert!(rule.validate(&component, &artifact).is_none());

        let missing = component_with_target("NO_SUCH_ERROR");
        let message = rule.validate(&missing, &artifact).unwrap();
        assert!(message.contains("NO_SUCH_ERROR"));
    }

    #[test]
    fn test_first_missing_mapping_wins() {
        let rule = ErrorTypeReferencesExist;
        let component = ComponentAst::new("request")
            .with_error_mapping(ErrorMapping::new("ANY", "HTTP:FIRST"))
            .with_error_mapping(ErrorMapping::new("ANY", "HTTP:SECOND"))
            .with_location(SourceLocation::new("app.xml", 3));
        let artifact = ArtifactAst::new().with_dependency(Dependency::new("http"));

        let message = rule.validate(&component, &artifact).unwrap();
        assert!(message.contains("HTTP:FIRST"));
    }
}
