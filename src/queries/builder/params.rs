//! Positional parameter collection for compiled statements.
//!
//! The backend binds parameters by position, so the order values are pushed
//! here must match the order `?` placeholders appear in the statement text.

use crate::db::backend::Binding;
use crate::db::schema::RootType;
use crate::db::value::Value;

/// Placeholder emitted for every bound parameter.
pub const PLACEHOLDER: &str = "?";

/// Collects bindings in placeholder order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamBuilder {
    bindings: Vec<Binding>,
}

impl ParamBuilder {
    /// Create a new, empty parameter builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a binding and return the placeholder to write in its place.
    pub fn push(&mut self, root: RootType, value: Value) -> &'static str {
        self.bindings.push(Binding::new(root, value));
        PLACEHOLDER
    }

    /// Append every binding of another builder, preserving order.
    pub fn extend(&mut self, other: ParamBuilder) {
        self.bindings.extend(other.bindings);
    }

    /// Build the final binding list.
    pub fn build(self) -> Vec<Binding> {
        self.bindings
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_builder_new() {
        let builder = ParamBuilder::new();
        assert_eq!(builder.len(), 0);
        assert!(builder.is_empty());
    }

    #[test]
    fn test_push_returns_placeholder_and_keeps_order() {
        let mut builder = ParamBuilder::new();
        assert_eq!(builder.push(RootType::Int, Value::Integer(5)), "?");
        builder.push(RootType::Text, Value::from("x"));

        let bindings = builder.build();
        assert_eq!(
            bindings,
            vec![
                Binding::new(RootType::Int, Value::Integer(5)),
                Binding::new(RootType::Text, Value::from("x")),
            ]
        );
    }

    #[test]
    fn test_duplicate_values_are_not_merged() {
        let mut builder = ParamBuilder::new();
        builder.push(RootType::Int, Value::Integer(1));
        builder.push(RootType::Int, Value::Integer(1));
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_extend_appends_after_existing() {
        let mut first = ParamBuilder::new();
        first.push(RootType::Int, Value::Integer(1));
        let mut second = ParamBuilder::new();
        second.push(RootType::Int, Value::Integer(2));

        first.extend(second);
        let values: Vec<_> = first.bindings().iter().map(|b| b.value.clone()).collect();
        assert_eq!(values, vec![Value::Integer(1), Value::Integer(2)]);
    }
}
