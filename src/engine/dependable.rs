//! Identity and dependency-graph participation shared by stages and modules.
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier naming a unit within its collection.
///
/// Uniqueness is the caller's responsibility: when two units in one
/// collection share an identifier, lookups resolve to the later one.
///
/// # Examples
///
/// ```
/// use furnish_cli::engine::Id;
///
/// let id = Id::from("git");
/// assert_eq!(id.as_str(), "git");
/// assert_eq!(id.to_string(), "git");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if no identifier has been assigned.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Free-form version label attached to a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    /// Borrow the version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Authored and computed graph fields embedded in every stage and module.
///
/// `dependants`, `parent` and `children` are never read from configuration;
/// they are filled in by the resolver and the stage initialisation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Base {
    /// Unit identifier.
    #[serde(default)]
    pub id: Id,
    /// Version label.
    #[serde(default)]
    pub version: Version,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Identifiers of units in the same collection that must come first.
    #[serde(default)]
    pub dependencies: Vec<Id>,
    /// Identifiers of units that depend on this one (computed).
    #[serde(default, skip_deserializing)]
    pub dependants: Vec<Id>,
    /// Owning unit, if any (informational).
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Id>,
    /// Owned units (informational).
    #[serde(default, skip_deserializing, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Id>,
}

impl Base {
    /// Create a base with the given identifier and dependencies.
    #[must_use]
    pub fn new(id: impl Into<Id>, dependencies: &[&str]) -> Self {
        Self {
            id: id.into(),
            dependencies: dependencies.iter().map(|d| Id::from(*d)).collect(),
            ..Self::default()
        }
    }
}

/// Identity and graph participation.
///
/// Implementors only provide access to their embedded [`Base`]; every other
/// method has a default that reads or updates it.
pub trait Dependable {
    /// Borrow the embedded graph fields.
    fn base(&self) -> &Base;

    /// Mutably borrow the embedded graph fields.
    fn base_mut(&mut self) -> &mut Base;

    /// Unit identifier.
    fn id(&self) -> &Id {
        &self.base().id
    }

    /// Version label.
    fn version(&self) -> &Version {
        &self.base().version
    }

    /// Human-readable description.
    fn description(&self) -> &str {
        &self.base().description
    }

    /// Declared dependencies, in authored order.
    fn dependencies(&self) -> &[Id] {
        &self.base().dependencies
    }

    /// Units depending on this one, in discovery order.
    fn dependants(&self) -> &[Id] {
        &self.base().dependants
    }

    /// Returns `true` if at least one other unit depends on this one.
    ///
    /// A failing load-bearing unit aborts the run.
    fn is_dependency(&self) -> bool {
        !self.dependants().is_empty()
    }

    /// Record `id` as a dependant. Recording the same id twice is a no-op.
    fn add_dependant(&mut self, id: Id) {
        let dependants = &mut self.base_mut().dependants;
        if !dependants.contains(&id) {
            dependants.push(id);
        }
    }

    /// Owning unit, if any.
    fn parent(&self) -> Option<&Id> {
        self.base().parent.as_ref()
    }

    /// Set the owning unit.
    fn set_parent(&mut self, id: Id) {
        self.base_mut().parent = Some(id);
    }

    /// Owned units.
    fn children(&self) -> &[Id] {
        &self.base().children
    }

    /// Record `id` as an owned unit. Recording the same id twice is a no-op.
    fn add_child(&mut self, id: Id) {
        let children = &mut self.base_mut().children;
        if !children.contains(&id) {
            children.push(id);
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    struct Unit(Base);

    impl Dependable for Unit {
        fn base(&self) -> &Base {
            &self.0
        }
        fn base_mut(&mut self) -> &mut Base {
            &mut self.0
        }
    }

    #[test]
    fn base_new_sets_id_and_dependencies() {
        let base = Base::new("b", &["a"]);
        assert_eq!(base.id, Id::from("b"));
        assert_eq!(base.dependencies, vec![Id::from("a")]);
        assert!(base.dependants.is_empty());
    }

    #[test]
    fn not_a_dependency_until_dependant_added() {
        let mut unit = Unit(Base::new("a", &[]));
        assert!(!unit.is_dependency());
        unit.add_dependant(Id::from("b"));
        assert!(unit.is_dependency());
    }

    #[test]
    fn add_dependant_is_idempotent() {
        let mut unit = Unit(Base::new("a", &[]));
        unit.add_dependant(Id::from("b"));
        unit.add_dependant(Id::from("b"));
        assert_eq!(unit.dependants(), &[Id::from("b")]);
    }

    #[test]
    fn hierarchy_links() {
        let mut unit = Unit(Base::new("stage", &[]));
        assert!(unit.parent().is_none());
        unit.set_parent(Id::from("root"));
        unit.add_child(Id::from("m"));
        unit.add_child(Id::from("m"));
        assert_eq!(unit.parent(), Some(&Id::from("root")));
        assert_eq!(unit.children(), &[Id::from("m")]);
    }

    #[test]
    fn computed_fields_are_not_deserialized() {
        let base: Base = toml::from_str(
            "id = \"x\"\ndependencies = [\"y\"]\ndependants = [\"z\"]\nversion = \"1.0\"\n",
        )
        .unwrap();
        assert_eq!(base.id, Id::from("x"));
        assert_eq!(base.version.as_str(), "1.0");
        assert!(base.dependants.is_empty(), "dependants must never be authored");
    }
}
