//! Entity module - domain objects ingested into the ontology graph

use std::collections::BTreeMap;
use std::fmt;

/// Separator used when a composite primary key is flattened to a string
const KEY_PART_SEPARATOR: &str = "|";

/// Separator between entity type and key inside a node id
const NODE_ID_SEPARATOR: &str = "::";

/// Escape character for separators occurring inside identity parts
const ESCAPE: char = '\\';

/// Prefix `ESCAPE` and every char of `reserved` with `ESCAPE`
fn escape(raw: &str, reserved: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c == ESCAPE || reserved.contains(c) {
            out.push(ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Properties consulted (in order) when picking a human readable name
const DISPLAY_NAME_PROPERTIES: [&str; 4] = ["name", "title", "summary", "key"];

/// Primary key of an entity
///
/// The backing service reports either a single string or an ordered list of
/// key parts (one per entry in `primary_key_properties`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrimaryKey {
    /// A single-valued key such as `SRE-1`
    Single(String),

    /// A key composed of several property values, in key-property order
    Composite(Vec<String>),
}

impl PrimaryKey {
    /// Canonical string form used for identity
    ///
    /// Parts are joined with `|`; a `|` or `\` inside a part is escaped with
    /// `\`, so a single key never collides with a composite one. A one-part
    /// composite key is the same key as a single key.
    ///
    /// # Examples
    ///
    /// ```
    /// use ontolens_domain::PrimaryKey;
    ///
    /// let key = PrimaryKey::Composite(vec!["SPACE".into(), "42".into()]);
    /// assert_eq!(key.canonical(), "SPACE|42");
    /// assert_eq!(PrimaryKey::from("SRE-1").canonical(), "SRE-1");
    /// assert_eq!(PrimaryKey::from("SPACE|42").canonical(), r"SPACE\|42");
    /// ```
    pub fn canonical(&self) -> String {
        match self {
            PrimaryKey::Single(value) => escape(value, KEY_PART_SEPARATOR),
            PrimaryKey::Composite(parts) => parts
                .iter()
                .map(|part| escape(part, KEY_PART_SEPARATOR))
                .collect::<Vec<_>>()
                .join(KEY_PART_SEPARATOR),
        }
    }

    /// Whether the key carries no usable value
    pub fn is_empty(&self) -> bool {
        match self {
            PrimaryKey::Single(value) => value.trim().is_empty(),
            PrimaryKey::Composite(parts) => parts.iter().all(|p| p.trim().is_empty()),
        }
    }

    /// Individual key parts (a single key has exactly one part)
    pub fn parts(&self) -> Vec<&str> {
        match self {
            PrimaryKey::Single(value) => vec![value.as_str()],
            PrimaryKey::Composite(parts) => parts.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for PrimaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimaryKey::Single(value) => f.write_str(value),
            PrimaryKey::Composite(parts) => f.write_str(&parts.join(KEY_PART_SEPARATOR)),
        }
    }
}

impl From<&str> for PrimaryKey {
    fn from(value: &str) -> Self {
        PrimaryKey::Single(value.to_string())
    }
}

impl From<String> for PrimaryKey {
    fn from(value: String) -> Self {
        PrimaryKey::Single(value)
    }
}

impl From<Vec<String>> for PrimaryKey {
    fn from(parts: Vec<String>) -> Self {
        PrimaryKey::Composite(parts)
    }
}

/// Deterministic identity of a node in the ontology graph
///
/// Two entities with the same `(entity_type, primary_key)` always map to the
/// same `NodeId`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(String);

impl NodeId {
    /// Generate the node id for an entity type and primary key
    ///
    /// A `:` inside the type is escaped, so the first unescaped `::` always
    /// ends the type.
    ///
    /// # Examples
    ///
    /// ```
    /// use ontolens_domain::{NodeId, PrimaryKey};
    ///
    /// let a = NodeId::generate("Issue", &PrimaryKey::from("SRE-1"));
    /// let b = NodeId::generate("Issue", &PrimaryKey::from("SRE-1"));
    /// assert_eq!(a, b);
    /// assert_eq!(a.as_str(), "Issue::SRE-1");
    /// ```
    pub fn generate(entity_type: &str, primary_key: &PrimaryKey) -> Self {
        Self(format!(
            "{}{}{}",
            escape(entity_type, ":"),
            NODE_ID_SEPARATOR,
            primary_key.canonical()
        ))
    }

    /// Wrap an already generated id (for lookups by string)
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to an entity by identity only, as used by relation endpoints
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityRef {
    /// Entity type tag
    pub entity_type: String,

    /// Primary key of the referenced entity
    pub primary_key: PrimaryKey,
}

impl EntityRef {
    /// Create a new entity reference
    pub fn new(entity_type: impl Into<String>, primary_key: impl Into<PrimaryKey>) -> Self {
        Self {
            entity_type: entity_type.into(),
            primary_key: primary_key.into(),
        }
    }

    /// Node id this reference resolves to
    pub fn node_id(&self) -> NodeId {
        NodeId::generate(&self.entity_type, &self.primary_key)
    }
}

/// A domain object (Jira issue, Confluence page, ...) ingested into the graph
///
/// Properties are multi-valued: every property maps to an ordered list of
/// strings, even when the source reported a single value.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Entity type tag
    pub entity_type: String,

    /// Primary key (identity within the type)
    pub primary_key: PrimaryKey,

    /// Property name → ordered values
    pub properties: BTreeMap<String, Vec<String>>,

    /// Ordered property names composing the primary key
    pub primary_key_properties: Vec<String>,
}

impl Entity {
    /// Create an entity with no properties
    pub fn new(entity_type: impl Into<String>, primary_key: impl Into<PrimaryKey>) -> Self {
        Self {
            entity_type: entity_type.into(),
            primary_key: primary_key.into(),
            properties: BTreeMap::new(),
            primary_key_properties: Vec::new(),
        }
    }

    /// Builder-style helper to attach a property
    pub fn with_property<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.properties
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Node id this entity resolves to
    pub fn node_id(&self) -> NodeId {
        NodeId::generate(&self.entity_type, &self.primary_key)
    }

    /// Identity-only reference to this entity
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef {
            entity_type: self.entity_type.clone(),
            primary_key: self.primary_key.clone(),
        }
    }

    /// Whether the entity has both a type and a non-empty key
    pub fn is_well_formed(&self) -> bool {
        !self.entity_type.trim().is_empty() && !self.primary_key.is_empty()
    }

    /// Values of a property (empty when absent)
    pub fn property(&self, name: &str) -> &[String] {
        self.properties.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Human readable name: first value of a well-known naming property,
    /// falling back to the canonical primary key
    pub fn display_name(&self) -> String {
        DISPLAY_NAME_PROPERTIES
            .iter()
            .find_map(|name| self.property(name).first())
            .cloned()
            .unwrap_or_else(|| self.primary_key.to_string())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: node id generation is a pure function of (type, key)
        #[test]
        fn test_node_id_deterministic(entity_type in "[A-Za-z]{1,12}", key in "[A-Z]{1,5}-[0-9]{1,4}") {
            let first = Entity::new(entity_type.clone(), key.clone())
                .with_property("title", ["one"]);
            let second = Entity::new(entity_type, key)
                .with_property("title", ["two"]);

            prop_assert_eq!(first.node_id(), second.node_id());
        }

        /// Property: different keys of the same type never collide
        #[test]
        fn test_node_id_distinct_keys(a in "[A-Z]{1,5}-[0-9]{1,4}", b in "[A-Z]{1,5}-[0-9]{1,4}") {
            let id_a = NodeId::generate("Issue", &PrimaryKey::from(a.clone()));
            let id_b = NodeId::generate("Issue", &PrimaryKey::from(b.clone()));
            prop_assert_eq!(id_a == id_b, a == b);
        }

        /// Property: ids of (type, composite key) pairs collide only when equal
        #[test]
        fn test_node_id_injective(
            type_a in "[A-Za-z:|\\\\]{1,6}",
            type_b in "[A-Za-z:|\\\\]{1,6}",
            key_a in prop::collection::vec("[a-z:|\\\\]{1,4}", 2..4),
            key_b in prop::collection::vec("[a-z:|\\\\]{1,4}", 2..4),
        ) {
            let id_a = NodeId::generate(&type_a, &PrimaryKey::Composite(key_a.clone()));
            let id_b = NodeId::generate(&type_b, &PrimaryKey::Composite(key_b.clone()));
            prop_assert_eq!(id_a == id_b, type_a == type_b && key_a == key_b);
        }
    }
}
