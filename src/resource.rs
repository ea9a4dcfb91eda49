//! JSON:API resource types.
//!
//! Resources are the unit of storage. They follow the JSON:API document
//! shape (`type`, `id`, `attributes`, `relationships`) and preserve any
//! other top-level members they were received with.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::Cardinality;

/// A `(type, id)` reference to a resource.
///
/// An identifier never owns the resource it points at. Looking it up in a
/// [`Store`](crate::Store) may find nothing, which is a dangling reference
/// rather than an error.
///
/// # Examples
///
/// ```
/// use jsonapi_normalizer::ResourceIdentifier;
///
/// let post = ResourceIdentifier::new("post", "9");
/// assert_eq!(post.to_string(), "post/9");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    /// Linkage meta. Ignored by [`matches`](Self::matches).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl ResourceIdentifier {
    /// Creates an identifier from a type and id.
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            meta: None,
        }
    }

    /// Attach linkage meta.
    #[must_use]
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Returns true if both identifiers name the same type and id.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.resource_type == other.resource_type && self.id == other.id
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.resource_type, self.id)
    }
}

/// Linkage data held by a relationship.
///
/// The variant a relationship is first stored with fixes its cardinality.
/// Later updates must keep it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationshipData {
    /// An ordered list of identifiers.
    ToMany(Vec<ResourceIdentifier>),
    /// A single identifier, or null.
    ToOne(Option<ResourceIdentifier>),
}

impl RelationshipData {
    /// Returns the cardinality of this data.
    #[must_use]
    pub const fn cardinality(&self) -> Cardinality {
        match self {
            Self::ToMany(_) => Cardinality::ToMany,
            Self::ToOne(_) => Cardinality::ToOne,
        }
    }

    #[must_use]
    pub const fn is_to_many(&self) -> bool {
        matches!(self, Self::ToMany(_))
    }

    /// Returns the list of identifiers for a to-many relationship.
    #[must_use]
    pub fn as_to_many(&self) -> Option<&[ResourceIdentifier]> {
        match self {
            Self::ToMany(ids) => Some(ids),
            Self::ToOne(_) => None,
        }
    }

    /// Returns the linked identifier for a to-one relationship.
    #[must_use]
    pub const fn as_to_one(&self) -> Option<&ResourceIdentifier> {
        match self {
            Self::ToOne(id) => id.as_ref(),
            Self::ToMany(_) => None,
        }
    }
}

impl Default for RelationshipData {
    fn default() -> Self {
        Self::ToOne(None)
    }
}

/// A named relationship object: `{ data?, links?, meta? }`.
///
/// `data` is `None` when the member is absent (links-only or meta-only
/// relationship objects) and `Some(ToOne(None))` when it is an explicit null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(
        default,
        deserialize_with = "present_data",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<RelationshipData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl Relationship {
    /// Creates a to-one relationship.
    #[must_use]
    pub fn to_one(id: Option<ResourceIdentifier>) -> Self {
        Self {
            data: Some(RelationshipData::ToOne(id)),
            ..Self::default()
        }
    }

    /// Creates a to-many relationship.
    #[must_use]
    pub fn to_many(ids: Vec<ResourceIdentifier>) -> Self {
        Self {
            data: Some(RelationshipData::ToMany(ids)),
            ..Self::default()
        }
    }

    /// Cardinality of the stored linkage. Absent data counts as to-one.
    #[must_use]
    pub fn cardinality(&self) -> Cardinality {
        self.data
            .as_ref()
            .map_or(Cardinality::ToOne, RelationshipData::cardinality)
    }

    /// Linked identifiers of a to-many relationship.
    #[must_use]
    pub fn as_to_many(&self) -> Option<&[ResourceIdentifier]> {
        self.data.as_ref()?.as_to_many()
    }

    /// Linked identifier of a to-one relationship.
    #[must_use]
    pub fn as_to_one(&self) -> Option<&ResourceIdentifier> {
        self.data.as_ref()?.as_to_one()
    }
}

/// A present `data` member is always `Some`, even when it is `null`.
fn present_data<'de, D>(deserializer: D) -> Result<Option<RelationshipData>, D::Error>
where
    D: Deserializer<'de>,
{
    RelationshipData::deserialize(deserializer).map(Some)
}

/// A JSON:API resource object.
///
/// Top-level members other than the well-known ones are kept in `extra`
/// and survive merges.
///
/// # Examples
///
/// ```
/// use jsonapi_normalizer::{Relationship, Resource};
///
/// let user = Resource::new("user", "1")
///     .with_attribute("name", "A")
///     .with_relationship("posts", Relationship::to_many(vec![]));
///
/// assert_eq!(user.identifier().to_string(), "user/1");
/// assert!(user.relationship("posts").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<BTreeMap<String, Relationship>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource {
    /// Creates a bare resource with only a type and id.
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            attributes: None,
            relationships: None,
            links: None,
            meta: None,
            extra: Map::new(),
        }
    }

    /// Sets a single attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    /// Sets a single relationship.
    #[must_use]
    pub fn with_relationship(
        mut self,
        name: impl Into<String>,
        relationship: Relationship,
    ) -> Self {
        self.relationships
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), relationship);
        self
    }

    /// Returns the identifier of this resource.
    #[must_use]
    pub fn identifier(&self) -> ResourceIdentifier {
        ResourceIdentifier::new(self.resource_type.clone(), self.id.clone())
    }

    /// Looks up a relationship by name.
    #[must_use]
    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.as_ref()?.get(name)
    }

    /// Looks up an attribute by name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.as_ref()?.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identifier_matches_on_type_and_id() {
        let a = ResourceIdentifier::new("post", "1");
        assert!(a.matches(&ResourceIdentifier::new("post", "1")));
        assert!(!a.matches(&ResourceIdentifier::new("post", "2")));
        assert!(!a.matches(&ResourceIdentifier::new("comment", "1")));
    }

    #[test]
    fn test_relationship_data_untagged_shapes() {
        let many: RelationshipData =
            serde_json::from_value(json!([{"type": "post", "id": "9"}])).unwrap();
        assert_eq!(many.cardinality(), Cardinality::ToMany);
        assert_eq!(many.as_to_many().map(<[_]>::len), Some(1));

        let one: RelationshipData =
            serde_json::from_value(json!({"type": "user", "id": "1"})).unwrap();
        assert_eq!(one.as_to_one(), Some(&ResourceIdentifier::new("user", "1")));

        let empty: RelationshipData = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(empty, RelationshipData::ToOne(None));
    }

    #[test]
    fn test_relationship_without_data_is_absent() {
        let value = json!({"links": {"related": "/users/1/author"}});
        let rel: Relationship = serde_json::from_value(value.clone()).unwrap();
        assert!(rel.data.is_none());
        assert_eq!(rel.cardinality(), Cardinality::ToOne);
        assert_eq!(serde_json::to_value(&rel).unwrap(), value);
    }

    #[test]
    fn test_relationship_null_data_is_present() {
        let rel: Relationship = serde_json::from_value(json!({"data": null})).unwrap();
        assert_eq!(rel.data, Some(RelationshipData::ToOne(None)));
        assert_eq!(serde_json::to_value(&rel).unwrap(), json!({"data": null}));
    }

    #[test]
    fn test_identifier_meta_round_trips() {
        let value = json!({
            "posts": {"data": [{"type": "post", "id": "1", "meta": {"pinned": true}}]}
        });
        let rels: BTreeMap<String, Relationship> = serde_json::from_value(value.clone()).unwrap();
        let linked = &rels["posts"].as_to_many().unwrap()[0];
        assert_eq!(linked.meta, Some(json!({"pinned": true})));
        assert!(linked.matches(&ResourceIdentifier::new("post", "1")));
        assert_eq!(serde_json::to_value(&rels).unwrap(), value);
    }

    #[test]
    fn test_resource_preserves_extra_members() {
        let value = json!({
            "type": "user",
            "id": "1",
            "attributes": {"name": "A"},
            "relationships": {"posts": {"data": []}},
            "x-revision": 4
        });
        let resource: Resource = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(resource.attribute("name"), Some(&json!("A")));
        assert_eq!(resource.extra.get("x-revision"), Some(&json!(4)));
        assert_eq!(serde_json::to_value(&resource).unwrap(), value);
    }

    #[test]
    fn test_resource_builder_helpers() {
        let r = Resource::new("user", "1")
            .with_attribute("name", "A")
            .with_relationship("best_friend", Relationship::to_one(None));
        assert_eq!(r.attribute("name"), Some(&json!("A")));
        assert_eq!(r.relationship("best_friend").unwrap().cardinality(), Cardinality::ToOne);
        assert!(r.relationship("posts").is_none());
    }
}
