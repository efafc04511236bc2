//! Agent-facing documentation pack for the operation whitelist.
//!
//! The pack is what the agent is told about the callable surface: one block
//! per operation, first line the call signature (implicit slide argument
//! omitted), optionally followed by the tab-indented description. Rendering is
//! pure and deterministic for a given registry.

use anyhow::Result;
use minijinja::{Environment, context};

use crate::core::registry::OpSpec;

const BLOCK_TEMPLATE: &str =
    "{{ signature }}{% if description %}\n\t{{ description }}{% endif %}";

/// Template engine wrapper around minijinja.
struct DocEngine {
    env: Environment<'static>,
}

impl DocEngine {
    fn new() -> Self {
        let mut env = Environment::new();
        env.add_template("api_block", BLOCK_TEMPLATE)
            .expect("api block template should be valid");
        Self { env }
    }

    fn render_block(&self, op: &OpSpec, with_examples: bool) -> Result<String> {
        let template = self.env.get_template("api_block")?;
        let rendered = template.render(context! {
            signature => op.signature(),
            description => with_examples.then_some(op.description).filter(|d| !d.is_empty()),
        })?;
        Ok(rendered)
    }
}

/// Render the documentation pack for the given operations.
///
/// With `with_examples` false, only the signatures are emitted.
pub fn describe(operations: &[OpSpec], with_examples: bool) -> Result<String> {
    let engine = DocEngine::new();
    let blocks = operations
        .iter()
        .map(|op| engine.render_block(op, with_examples))
        .collect::<Result<Vec<_>>>()?;
    Ok(blocks.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::{ParamSpec, Registry};
    use crate::core::value::{TypeTag, Value};
    use crate::slide::SlidePage;

    fn noop(_slide: &mut SlidePage, _args: &[Value]) -> Result<()> {
        Ok(())
    }

    #[test]
    fn block_holds_signature_then_tab_indented_description() {
        let registry = Registry::agent().expect("registry");
        let rendered = describe(registry.operations(), true).expect("describe");

        let mut lines = rendered.lines();
        assert_eq!(
            lines.next(),
            Some("def del_span(div_id: int, paragraph_id: int, span_id: int)")
        );
        let description = lines.next().expect("description line");
        assert!(description.starts_with('\t'));
        assert!(!rendered.contains("slide"));
    }

    #[test]
    fn signatures_only_when_examples_disabled() {
        let registry = Registry::agent().expect("registry");
        let rendered = describe(registry.operations(), false).expect("describe");

        assert_eq!(rendered.lines().count(), registry.operations().len());
        assert!(rendered.lines().all(|line| line.starts_with("def ")));
    }

    #[test]
    fn default_literal_is_rendered_exactly_as_declared() {
        let op = OpSpec {
            name: "pad_text",
            params: vec![
                ParamSpec::required("div_id", TypeTag::Int),
                ParamSpec::defaulted("filler", TypeTag::Str, Value::Str("Hello".to_string())),
            ],
            description: "",
            handler: noop,
        };
        let rendered = describe(std::slice::from_ref(&op), true).expect("describe");
        assert_eq!(rendered, "def pad_text(div_id: int, filler: str = 'Hello')");
    }
}
