//! # jsonapi-normalizer
//!
//! Normalizes JSON:API documents into a flat store indexed by type and id.
//! Each dispatched document event produces a new store snapshot. The new
//! snapshot shares every untouched bucket and resource with the previous one.
//!
//! ## Core Concepts
//!
//! - **Resource**: a typed, identified record with attributes and relationships
//! - **Store**: the normalized, copy-on-write snapshot of all known resources
//! - **MergeConfig**: which types are handled, where they are stored, and how
//!   new versions are merged into old ones
//! - **DocumentEvent**: primary data, included resources, a deletion and
//!   relationship link patches, applied in that order
//!
//! ## Usage
//!
//! ```rust
//! use jsonapi_normalizer::{
//!     apply, define_relationship, DocumentEvent, LinkTarget, MergeConfig, Relationship,
//!     Resource, ResourceConfig, ResourceIdentifier, Store,
//! };
//!
//! let config = MergeConfig::new()
//!     .with_type("user", ResourceConfig::new())
//!     .with_type("post", ResourceConfig::new());
//!
//! let user = Resource::new("user", "1").with_relationship("posts", Relationship::to_many(vec![]));
//! let store = apply(&Store::new(), &DocumentEvent::new().primary(user), &config)?;
//!
//! // Create a post and link it into the user's posts in one event.
//! let event = DocumentEvent::new()
//!     .primary(Resource::new("post", "9").with_attribute("title", "Hello"))
//!     .add_links(define_relationship(
//!         "user",
//!         "1",
//!         [("posts", vec![LinkTarget::CurrentResource])],
//!     )?);
//! let store = apply(&store, &event, &config)?;
//!
//! let posts = store.get("user", "1").unwrap().relationship("posts").unwrap();
//! assert_eq!(posts.as_to_many(), Some(&[ResourceIdentifier::new("post", "9")][..]));
//! # Ok::<(), jsonapi_normalizer::NormalizerError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod config;
pub mod document;
pub mod error;
pub mod merge;
pub mod reducer;
pub mod relationship;
pub mod resource;
pub mod store;

// Re-export primary types at crate root for convenience
pub use action::{
    creates_relationship, deletes_relationship, deletes_resource, updates_resources, Action, Meta,
};
pub use config::{MergeConfig, MergeConfigSpec, MergeKind, ResourceConfig, TypeSpec};
pub use document::{Document, DocumentEvent, PrimaryData};
pub use error::{
    Cardinality, ConfigError, NormalizerError, NormalizerResult, ReduceError, ValidationError,
};
pub use merge::{
    deep_merge_resource, merge_json, DeepMerge, MergeStrategy, Preprocess, ShallowMerge,
};
pub use reducer::{apply, JsonApiReducer};
pub use relationship::{
    define_relationship, LinkTarget, Linkage, RelationshipUpdate, RelationshipUpdateBuilder,
    RESOURCE_LINKAGE_MARKER,
};
pub use resource::{Relationship, RelationshipData, Resource, ResourceIdentifier};
pub use store::{Bucket, Store};
