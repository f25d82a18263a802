use crate::error::{AnonymizationError, Result};

/// Semantic kind of an attribute, resolved before any partitioning happens.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// Finite, unordered label domain. Spans count distinct values.
    Categorical,
    /// Totally ordered values. Spans are `max - min`.
    Numerical,
}

/// Ordered mapping from attribute name to its [`AttributeKind`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    attributes: Vec<(String, AttributeKind)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute, replacing the kind of an existing attribute with the same name.
    pub fn with_attribute(mut self, name: impl Into<String>, kind: AttributeKind) -> Self {
        self.set_kind(name, kind);
        self
    }

    pub fn set_kind(&mut self, name: impl Into<String>, kind: AttributeKind) {
        let name = name.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = kind,
            None => self.attributes.push((name, kind)),
        }
    }

    pub fn kind(&self, name: &str) -> Result<AttributeKind> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| AnonymizationError::UnknownColumn(name.to_string()))
    }

    pub fn is_categorical(&self, name: &str) -> bool {
        matches!(self.kind(name), Ok(AttributeKind::Categorical))
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.attributes.iter().position(|(n, _)| n == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|(name, _)| name.as_str())
    }

    pub fn attributes(&self) -> &[(String, AttributeKind)] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_attribute_replaces_existing_kind() {
        let schema = Schema::new()
            .with_attribute("age", AttributeKind::Numerical)
            .with_attribute("children", AttributeKind::Numerical)
            .with_attribute("children", AttributeKind::Categorical);

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.kind("children").unwrap(), AttributeKind::Categorical);
        assert_eq!(schema.names().collect::<Vec<_>>(), vec!["age", "children"]);
    }

    #[test]
    fn unknown_attribute() {
        let schema = Schema::new().with_attribute("age", AttributeKind::Numerical);

        assert!(matches!(
            schema.kind("region"),
            Err(AnonymizationError::UnknownColumn(name)) if name == "region"
        ));
        assert!(!schema.is_categorical("region"));
    }
}
