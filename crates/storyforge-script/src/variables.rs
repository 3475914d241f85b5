//! Named values and host functions exposed to scripts.
//!
//! Hosts look names up in a [`VariableRegistry`] instead of resolving
//! members dynamically; every entry is either a plain value or a callable
//! with a fixed arity.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use storyforge_core::{StoryError, StoryResult, VariableValue};

type Callable = dyn Fn(&[VariableValue]) -> StoryResult<VariableValue> + Send + Sync;

/// A host function callable from scripts.
#[derive(Clone)]
pub struct ScriptFunction {
    arity: usize,
    callable: Arc<Callable>,
}

impl ScriptFunction {
    pub fn new<F>(arity: usize, callable: F) -> Self
    where
        F: Fn(&[VariableValue]) -> StoryResult<VariableValue> + Send + Sync + 'static,
    {
        Self {
            arity,
            callable: Arc::new(callable),
        }
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn call(&self, args: &[VariableValue]) -> StoryResult<VariableValue> {
        if args.len() != self.arity {
            return Err(StoryError::InvalidArgument(format!(
                "expected {} argument(s), got {}",
                self.arity,
                args.len()
            )));
        }
        (self.callable)(args)
    }
}

impl fmt::Debug for ScriptFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptFunction(arity = {})", self.arity)
    }
}

#[derive(Debug, Clone)]
pub enum ScriptVariable {
    Value(VariableValue),
    Function(ScriptFunction),
}

#[derive(Debug, Clone, Default)]
pub struct VariableRegistry {
    entries: BTreeMap<String, ScriptVariable>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_value(&mut self, name: impl Into<String>, value: VariableValue) {
        self.entries.insert(name.into(), ScriptVariable::Value(value));
    }

    pub fn set_function(&mut self, name: impl Into<String>, function: ScriptFunction) {
        self.entries
            .insert(name.into(), ScriptVariable::Function(function));
    }

    /// Overlay plain values, replacing entries with the same name.
    pub fn extend_values(&mut self, values: &BTreeMap<String, VariableValue>) {
        for (name, value) in values {
            self.set_value(name.clone(), value.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&ScriptVariable> {
        self.entries.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&VariableValue> {
        match self.entries.get(name) {
            Some(ScriptVariable::Value(value)) => Some(value),
            _ => None,
        }
    }

    pub fn call(&self, name: &str, args: &[VariableValue]) -> StoryResult<VariableValue> {
        match self.entries.get(name) {
            Some(ScriptVariable::Function(function)) => function.call(args).map_err(|e| {
                StoryError::InvalidArgument(format!("call to '{name}' failed: {e}"))
            }),
            Some(ScriptVariable::Value(_)) => Err(StoryError::InvalidArgument(format!(
                "'{name}' is a value, not a function"
            ))),
            None => Err(StoryError::InvalidArgument(format!(
                "no function named '{name}'"
            ))),
        }
    }

    /// Plain values in name order.
    pub fn values(&self) -> impl Iterator<Item = (&str, &VariableValue)> {
        self.entries.iter().filter_map(|(name, entry)| match entry {
            ScriptVariable::Value(value) => Some((name.as_str(), value)),
            ScriptVariable::Function(_) => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_and_overrides() {
        let mut registry = VariableRegistry::new();
        registry.set_value("intensity", VariableValue::Float(0.5));
        let mut overrides = BTreeMap::new();
        overrides.insert("intensity".to_string(), VariableValue::Int(2));
        overrides.insert("title".to_string(), VariableValue::Text("Hi".into()));
        registry.extend_values(&overrides);

        assert_eq!(registry.value("intensity"), Some(&VariableValue::Int(2)));
        assert_eq!(registry.values().count(), 2);
    }

    #[test]
    fn test_function_call_checks_arity() {
        let mut registry = VariableRegistry::new();
        registry.set_function(
            "double",
            ScriptFunction::new(1, |args| {
                let v = args[0]
                    .as_f64()
                    .ok_or_else(|| StoryError::InvalidArgument("not a number".into()))?;
                Ok(VariableValue::Float(v * 2.0))
            }),
        );
        assert_eq!(
            registry.call("double", &[VariableValue::Int(21)]).unwrap(),
            VariableValue::Float(42.0)
        );
        assert!(registry.call("double", &[]).is_err());
        assert!(registry.call("missing", &[]).is_err());
        assert!(registry.value("double").is_none());
    }
}
