//! Action envelopes and meta tags.
//!
//! Actions follow the flux-standard-action shape: `{ type, payload, meta, error }`.
//! Producers attach tags to `meta` with the helper constructors below; the
//! owning [`JsonApiReducer`](crate::JsonApiReducer) only reduces actions
//! whose scope tag carries its id.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::{Document, DocumentEvent};
use crate::relationship::RelationshipUpdate;
use crate::resource::ResourceIdentifier;

/// Meta key holding the id of the reducer an action is addressed to.
pub const SCOPE_KEY: &str = "__jsonapi";
/// Meta key holding the identifier of a deleted resource.
pub const DELETES_RESOURCE_KEY: &str = "__jsonapi/delete/resource";
/// Meta key holding relationship links to add.
pub const CREATES_RELATIONSHIP_KEY: &str = "__jsonapi/create/relationship";
/// Meta key holding relationship links to remove.
pub const DELETES_RELATIONSHIP_KEY: &str = "__jsonapi/delete/relationship";

/// Action meta: normalizer tags plus any caller-defined members.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    #[serde(rename = "__jsonapi", skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(rename = "__jsonapi/delete/resource", skip_serializing_if = "Option::is_none")]
    pub deletes_resource: Option<ResourceIdentifier>,
    #[serde(rename = "__jsonapi/create/relationship", skip_serializing_if = "Vec::is_empty")]
    pub creates_relationship: Vec<RelationshipUpdate>,
    #[serde(rename = "__jsonapi/delete/relationship", skip_serializing_if = "Vec::is_empty")]
    pub deletes_relationship: Vec<RelationshipUpdate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Meta {
    /// Combine two sets of tags. Tags set on `other` win.
    ///
    /// # Examples
    ///
    /// ```
    /// use jsonapi_normalizer::{
    ///     creates_relationship, define_relationship, updates_resources, ResourceIdentifier,
    /// };
    ///
    /// let posts = vec![ResourceIdentifier::new("post", "9")];
    /// let link = define_relationship("user", "1", [("posts", posts)]).unwrap();
    /// let meta = updates_resources("users").merge(creates_relationship([Some(link)]));
    ///
    /// assert_eq!(meta.scope.as_deref(), Some("users"));
    /// assert_eq!(meta.creates_relationship.len(), 1);
    /// ```
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        if other.scope.is_some() {
            self.scope = other.scope;
        }
        if other.deletes_resource.is_some() {
            self.deletes_resource = other.deletes_resource;
        }
        if !other.creates_relationship.is_empty() {
            self.creates_relationship = other.creates_relationship;
        }
        if !other.deletes_relationship.is_empty() {
            self.deletes_relationship = other.deletes_relationship;
        }
        self.extra.extend(other.extra);
        self
    }
}

/// Tag an action for the reducer `reducer_id`.
#[must_use]
pub fn updates_resources(reducer_id: impl Into<String>) -> Meta {
    Meta {
        scope: Some(reducer_id.into()),
        ..Meta::default()
    }
}

/// Tag an action for `reducer_id` and mark `identifier` as deleted.
#[must_use]
pub fn deletes_resource(reducer_id: impl Into<String>, identifier: ResourceIdentifier) -> Meta {
    Meta {
        scope: Some(reducer_id.into()),
        deletes_resource: Some(identifier),
        ..Meta::default()
    }
}

/// Links to add once the action is reduced. `None` entries are dropped.
#[must_use]
pub fn creates_relationship<I>(updates: I) -> Meta
where
    I: IntoIterator<Item = Option<RelationshipUpdate>>,
{
    Meta {
        creates_relationship: updates.into_iter().flatten().collect(),
        ..Meta::default()
    }
}

/// Links to remove once the action is reduced. `None` entries are dropped.
#[must_use]
pub fn deletes_relationship<I>(updates: I) -> Meta
where
    I: IntoIterator<Item = Option<RelationshipUpdate>>,
{
    Meta {
        deletes_relationship: updates.into_iter().flatten().collect(),
        ..Meta::default()
    }
}

/// A dispatched action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Document>,
    #[serde(default)]
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

impl Action {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn payload(mut self, document: Document) -> Self {
        self.payload = Some(document);
        self
    }

    #[must_use]
    pub fn meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    /// Mark the action as an error action. Error actions are never reduced.
    #[must_use]
    pub fn failed(mut self) -> Self {
        self.error = true;
        self
    }

    /// Extract the document event this action describes.
    #[must_use]
    pub fn event(&self) -> DocumentEvent {
        let mut event = self
            .payload
            .clone()
            .map(DocumentEvent::from_document)
            .unwrap_or_default();
        event.delete = self.meta.deletes_resource.clone();
        event.relationship_links_to_add = self.meta.creates_relationship.clone();
        event.relationship_links_to_remove = self.meta.deletes_relationship.clone();
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relationship::define_relationship;
    use crate::resource::Resource;
    use serde_json::json;

    fn link() -> RelationshipUpdate {
        define_relationship("user", "1", [("posts", vec![ResourceIdentifier::new("post", "9")])])
            .unwrap()
    }

    #[test]
    fn test_tag_constructors() {
        assert_eq!(updates_resources("users").scope.as_deref(), Some("users"));

        let meta = deletes_resource("users", ResourceIdentifier::new("user", "1"));
        assert_eq!(meta.deletes_resource, Some(ResourceIdentifier::new("user", "1")));

        let meta = creates_relationship([None, Some(link()), None]);
        assert_eq!(meta.creates_relationship, vec![link()]);
        assert!(meta.scope.is_none());

        let meta = deletes_relationship([Some(link())]);
        assert_eq!(meta.deletes_relationship.len(), 1);
    }

    #[test]
    fn test_meta_wire_keys() {
        let meta = deletes_resource("users", ResourceIdentifier::new("user", "1"))
            .merge(deletes_relationship([Some(link())]));
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value[SCOPE_KEY], json!("users"));
        assert_eq!(value[DELETES_RESOURCE_KEY], json!({"type": "user", "id": "1"}));
        assert!(value.get(CREATES_RELATIONSHIP_KEY).is_none());
        assert_eq!(value[DELETES_RELATIONSHIP_KEY][0]["id"], json!("1"));
    }

    #[test]
    fn test_meta_keeps_caller_members() {
        let meta: Meta =
            serde_json::from_value(json!({"__jsonapi": "users", "requestId": 7})).unwrap();
        assert_eq!(meta.scope.as_deref(), Some("users"));
        assert_eq!(meta.extra.get("requestId"), Some(&json!(7)));
    }

    #[test]
    fn test_action_event_extraction() {
        let action = Action::new("posts/create")
            .payload(Document {
                data: Some(Resource::new("post", "9").into()),
                included: vec![Resource::new("user", "1")],
            })
            .meta(
                deletes_resource("users", ResourceIdentifier::new("post", "8"))
                    .merge(creates_relationship([Some(link())])),
            );

        let event = action.event();
        assert_eq!(event.current_resource(), Some(ResourceIdentifier::new("post", "9")));
        assert_eq!(event.included.len(), 1);
        assert_eq!(event.delete, Some(ResourceIdentifier::new("post", "8")));
        assert_eq!(event.relationship_links_to_add.len(), 1);
        assert!(event.relationship_links_to_remove.is_empty());
    }

    #[test]
    fn test_action_deserializes_fsa() {
        let action: Action = serde_json::from_value(json!({
            "type": "users/read",
            "payload": {"data": [{"type": "user", "id": "1"}]},
            "meta": {"__jsonapi": "users"},
            "error": true
        }))
        .unwrap();
        assert!(action.error);
        assert_eq!(action.meta.scope.as_deref(), Some("users"));
        assert!(action.payload.is_some());
    }
}
