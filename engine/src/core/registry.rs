//! Operation whitelist: parameter descriptors, operation specs, capability
//! categories, and the name lookup built from them.
//!
//! Operations declare their metadata explicitly at registration (name, ordered
//! parameters with optional type tag and default, description). Nothing is
//! introspected at runtime, and the implicit slide argument every handler
//! receives is never part of the declared parameters the agent sees.

use std::collections::HashMap;

use anyhow::{Result, anyhow, bail};

use crate::core::value::{TypeTag, Value};
use crate::slide::SlidePage;

/// Handler executing one operation against a slide with bound arguments.
pub type OpHandler = fn(&mut SlidePage, &[Value]) -> Result<()>;

/// Declared parameter of a registered operation.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub type_tag: Option<TypeTag>,
    pub default: Option<Value>,
}

impl ParamSpec {
    pub fn required(name: &'static str, type_tag: TypeTag) -> Self {
        Self {
            name,
            type_tag: Some(type_tag),
            default: None,
        }
    }

    pub fn defaulted(name: &'static str, type_tag: TypeTag, default: Value) -> Self {
        Self {
            name,
            type_tag: Some(type_tag),
            default: Some(default),
        }
    }
}

/// One whitelisted operation.
#[derive(Debug, Clone)]
pub struct OpSpec {
    pub name: &'static str,
    pub params: Vec<ParamSpec>,
    pub description: &'static str,
    pub handler: OpHandler,
}

impl OpSpec {
    /// Call signature shown to the agent, omitting the implicit slide
    /// argument: `def replace_text(div_id: int, ...)`.
    pub fn signature(&self) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|param| {
                let mut rendered = param.name.to_string();
                if let Some(tag) = param.type_tag {
                    rendered.push_str(&format!(": {}", tag.as_str()));
                }
                if let Some(default) = &param.default {
                    rendered.push_str(&format!(" = {default}"));
                }
                rendered
            })
            .collect();
        format!("def {}({})", self.name, params.join(", "))
    }

    /// Bind positional arguments against the declared parameters: fill
    /// trailing defaults, reject wrong arity, check declared type tags.
    pub fn bind(&self, args: &[Value]) -> Result<Vec<Value>> {
        if args.len() > self.params.len() {
            bail!(
                "{} takes at most {} arguments, got {}",
                self.name,
                self.params.len(),
                args.len()
            );
        }
        let mut bound = Vec::with_capacity(self.params.len());
        for (idx, param) in self.params.iter().enumerate() {
            let value = match args.get(idx) {
                Some(value) => value.clone(),
                None => param
                    .default
                    .clone()
                    .ok_or_else(|| anyhow!("{} is missing argument '{}'", self.name, param.name))?,
            };
            if let Some(tag) = param.type_tag
                && value.type_tag() != tag
            {
                bail!(
                    "{} argument '{}' expects {}, got {}",
                    self.name,
                    param.name,
                    tag.as_str(),
                    value.type_tag().as_str()
                );
            }
            bound.push(value);
        }
        Ok(bound)
    }
}

/// Capability category grouping operations the agent may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Agent,
}

impl Category {
    pub fn operations(self) -> Vec<OpSpec> {
        match self {
            Category::Agent => crate::ops::agent_operations(),
        }
    }
}

/// Name → operation whitelist, built once at startup and read-only after.
#[derive(Debug, Clone)]
pub struct Registry {
    ops: Vec<OpSpec>,
    index: HashMap<&'static str, usize>,
}

impl Registry {
    /// Collect the operations of the given categories. A duplicate operation
    /// name across categories is a construction error.
    pub fn with_categories(categories: &[Category]) -> Result<Self> {
        let mut ops = Vec::new();
        let mut index = HashMap::new();
        for category in categories {
            for op in category.operations() {
                if index.contains_key(op.name) {
                    bail!("duplicate operation name '{}' in registry", op.name);
                }
                index.insert(op.name, ops.len());
                ops.push(op);
            }
        }
        Ok(Self { ops, index })
    }

    /// Registry exposing the agent-facing whitelist.
    pub fn agent() -> Result<Self> {
        Self::with_categories(&[Category::Agent])
    }

    pub fn get(&self, name: &str) -> Option<&OpSpec> {
        self.index.get(name).map(|idx| &self.ops[*idx])
    }

    /// Operations in registration order.
    pub fn operations(&self) -> &[OpSpec] {
        &self.ops
    }
}

/// Extract a non-negative index argument.
pub fn index_arg(args: &[Value], idx: usize, name: &str) -> Result<usize> {
    let raw = args
        .get(idx)
        .and_then(Value::as_int)
        .ok_or_else(|| anyhow!("argument '{name}' must be an int"))?;
    usize::try_from(raw).map_err(|_| anyhow!("argument '{name}' must be non-negative, got {raw}"))
}

/// Extract a string argument.
pub fn str_arg<'a>(args: &'a [Value], idx: usize, name: &str) -> Result<&'a str> {
    args.get(idx)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("argument '{name}' must be a str"))
}
