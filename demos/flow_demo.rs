//! Example: validating and running a flow construct
//!
//! This example walks the full path an artifact takes through Flowcore:
//! semantic validation of the parsed configuration, then assembly of a flow
//! construct, then the lifecycle from initialise to dispose with messages
//! flowing in between.
//!
//! Run with: cargo run --example flow_demo

use flowcore::prelude::*;
use std::any::Any;

// =============================================================================
// Processing stages
// =============================================================================

/// Normalizes incoming order payloads.
#[derive(Debug)]
struct Normalizer;

impl Processor for Normalizer {
    fn process(&mut self, message: Message) -> ComponentResult<Message> {
        let payload = message.payload().trim().to_lowercase();
        Ok(message.with_payload(payload))
    }
}

impl Component for Normalizer {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Tags each message with the deployment environment from the context.
#[derive(Debug, Default)]
struct EnvironmentTagger {
    environment: Option<String>,
}

impl Processor for EnvironmentTagger {
    fn process(&mut self, message: Message) -> ComponentResult<Message> {
        let environment = self.environment.clone().unwrap_or_default();
        Ok(message.with_property("environment", environment))
    }
}

impl ContextAware for EnvironmentTagger {
    fn set_context(&mut self, context: FlowContext) {
        self.environment = Some(context.name().to_string());
    }
}

impl Component for EnvironmentTagger {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_context_aware(&mut self) -> Option<&mut dyn ContextAware> {
        Some(self)
    }
}

// =============================================================================
// Walkthrough
// =============================================================================

fn parsed_artifact() -> ArtifactAst {
    ArtifactAst::new()
        .with_dependency(Dependency::new("http"))
        .with_error_type(ErrorType::new("http", "NOT_FOUND"))
        .with_component(
            ComponentAst::new("http:request")
                .with_parameter("path", "/orders")
                .with_error_mapping(ErrorMapping::new("ANY", "HTTP:NOT_FOUND"))
                .with_location(SourceLocation::new("orders.xml", 14)),
        )
}

fn main() -> Result<(), FlowError> {
    // 1. Validate the parsed configuration before building anything.
    let runner = ValidationRunner::with_core_rules();
    let report = runner.run(&parsed_artifact());
    for diagnostic in report.diagnostics() {
        println!("{diagnostic}");
    }
    if !report.is_deployable() {
        println!("artifact rejected, not deploying");
        return Ok(());
    }
    println!("artifact validated: {} rule(s) ran clean", runner.len());

    // 2. Assemble the flow construct.
    let context = FlowContext::builder("production")
        .property("region", "eu-west-1")
        .build();
    let mut flow = FlowConstruct::builder("orders", context)
        .source(Box::new(DirectSource::new()))
        .processor(Box::new(Normalizer))
        .processor(Box::new(EnvironmentTagger::default()))
        .validator(|shape| {
            if shape.chain_len == 0 {
                return Err("flow has no processing stages".to_string());
            }
            Ok(())
        })
        .build();

    // 3. Drive the lifecycle and push a message through.
    flow.initialise()?;
    flow.start()?;
    println!("{flow} is started: {}", flow.is_started());

    if let Some(source) = flow.source().and_then(|s| s.downcast_ref::<DirectSource>()) {
        let result = source
            .send(Message::new("  ORDER-1042  "))
            .map_err(FlowError::from)?;
        println!(
            "processed payload: '{}' (environment: {})",
            result.payload(),
            result.property("environment").unwrap_or("?")
        );
    }

    flow.stop()?;
    flow.dispose();
    println!("{flow} disposed: {}", flow.lifecycle_state().is_disposed());
    Ok(())
}
