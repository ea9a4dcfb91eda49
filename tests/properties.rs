use jsonapi_normalizer::{
    apply, define_relationship, Cardinality, DocumentEvent, MergeConfig, Relationship, Resource,
    ResourceConfig, ResourceIdentifier, Store,
};
use proptest::prelude::*;

fn config() -> MergeConfig {
    MergeConfig::new()
        .with_type("user", ResourceConfig::new())
        .with_type("post", ResourceConfig::new())
}

fn identifier() -> impl Strategy<Value = ResourceIdentifier> {
    (prop::sample::select(vec!["post", "comment"]), 0..6u8)
        .prop_map(|(t, id)| ResourceIdentifier::new(t, id.to_string()))
}

fn user_with_posts(posts: Vec<ResourceIdentifier>) -> Store {
    let mut store = Store::new();
    store.insert(
        "user",
        Resource::new("user", "1")
            .with_relationship("posts", Relationship::to_many(posts))
            .with_relationship("best_friend", Relationship::to_one(None)),
    );
    store
}

fn posts(store: &Store) -> Vec<ResourceIdentifier> {
    store
        .get("user", "1")
        .and_then(|u| u.relationship("posts"))
        .and_then(Relationship::as_to_many)
        .map(<[_]>::to_vec)
        .unwrap_or_default()
}

proptest! {
    #[test]
    fn prop_default_merge_is_idempotent(
        ids in prop::collection::vec(0..20u8, 1..10),
        name in "[a-z]{0,8}",
    ) {
        let resources: Vec<Resource> = ids
            .iter()
            .map(|id| Resource::new("user", id.to_string()).with_attribute("name", name.clone()))
            .collect();
        let event = DocumentEvent::new().primary(resources);

        let once = apply(&Store::new(), &event, &config()).unwrap();
        let twice = apply(&once, &event, &config()).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_unconfigured_types_never_write(ids in prop::collection::vec(0..20u8, 0..10)) {
        let store = user_with_posts(vec![]);
        let mut event = DocumentEvent::new();
        for id in &ids {
            event = event.include(Resource::new("tag", id.to_string()));
        }
        event = event.delete(ResourceIdentifier::new("tag", "0"));

        let next = apply(&store, &event, &config()).unwrap();
        prop_assert_eq!(&next, &store);
        prop_assert!(next.shares_bucket(&store, "user"));
    }

    #[test]
    fn prop_append_keeps_order_without_dedup(
        existing in prop::collection::vec(identifier(), 0..8),
        added in prop::collection::vec(identifier(), 0..8),
    ) {
        let store = user_with_posts(existing.clone());
        let update = define_relationship("user", "1", [("posts", added.clone())]).unwrap();
        let next = apply(&store, &DocumentEvent::new().add_links(update), &config()).unwrap();

        let expected: Vec<_> = existing.iter().chain(added.iter()).cloned().collect();
        prop_assert_eq!(posts(&next), expected);
    }

    #[test]
    fn prop_remove_filters_by_type_and_id(
        existing in prop::collection::vec(identifier(), 0..10),
        removed in prop::collection::vec(identifier(), 0..5),
    ) {
        let store = user_with_posts(existing.clone());
        let update = define_relationship("user", "1", [("posts", removed.clone())]).unwrap();
        let next = apply(&store, &DocumentEvent::new().remove_links(update), &config()).unwrap();

        let expected: Vec<_> = existing
            .into_iter()
            .filter(|link| !removed.iter().any(|r| r.matches(link)))
            .collect();
        prop_assert_eq!(posts(&next), expected);
    }

    #[test]
    fn prop_cardinality_survives_updates(
        ops in prop::collection::vec((any::<bool>(), any::<bool>(), identifier()), 0..12),
    ) {
        let mut store = user_with_posts(vec![]);
        for (add, to_many, id) in ops {
            let update = if to_many {
                define_relationship("user", "1", [("posts", vec![id])]).unwrap()
            } else {
                define_relationship("user", "1", [("best_friend", id)]).unwrap()
            };
            let event = if add {
                DocumentEvent::new().add_links(update)
            } else {
                DocumentEvent::new().remove_links(update)
            };
            store = apply(&store, &event, &config()).unwrap();

            let user = store.get("user", "1").unwrap();
            prop_assert_eq!(user.relationship("posts").unwrap().cardinality(), Cardinality::ToMany);
            prop_assert_eq!(
                user.relationship("best_friend").unwrap().cardinality(),
                Cardinality::ToOne
            );
        }
    }

    #[test]
    fn prop_delete_removes_exactly_one_key(ids in prop::collection::btree_set(0..20u8, 1..10)) {
        let mut store = Store::new();
        for id in &ids {
            store.insert("user", Resource::new("user", id.to_string()));
            store.insert("post", Resource::new("post", id.to_string()));
        }
        let victim = ids.iter().next().unwrap().to_string();

        let next = apply(
            &store,
            &DocumentEvent::new().delete(ResourceIdentifier::new("user", victim.clone())),
            &config(),
        )
        .unwrap();

        prop_assert_eq!(next.len(), store.len() - 1);
        prop_assert!(!next.contains("user", &victim));
        for id in &ids {
            let id = id.to_string();
            prop_assert!(next.contains("post", &id));
            if id != victim {
                prop_assert!(next.contains("user", &id));
            }
        }
    }
}
