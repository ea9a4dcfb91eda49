use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use jsonapi_normalizer::{
    apply, define_relationship, DocumentEvent, LinkTarget, MergeConfig, Relationship, Resource,
    ResourceConfig, Store,
};

fn config() -> MergeConfig {
    MergeConfig::new()
        .with_type("user", ResourceConfig::new())
        .with_type("post", ResourceConfig::new())
}

fn populated_store() -> Store {
    let mut store = Store::new();
    // 1024 users with 4 posts each so copy-on-write measures realistic bucket sizes.
    for i in 0..1024u32 {
        store.insert(
            "user",
            Resource::new("user", i.to_string())
                .with_attribute("name", format!("user-{i}"))
                .with_relationship("posts", Relationship::to_many(Vec::new())),
        );
        for j in 0..4u32 {
            let id = (i * 4 + j).to_string();
            store.insert("post", Resource::new("post", id).with_attribute("title", "bench"));
        }
    }
    store
}

fn bench_insert_page(c: &mut Criterion) {
    let store = populated_store();
    let page: Vec<Resource> = (0..50u32)
        .map(|i| Resource::new("post", i.to_string()).with_attribute("title", "updated"))
        .collect();
    let event = DocumentEvent::new().primary(page);
    let config = config();

    let mut group = c.benchmark_group("apply");
    group.throughput(Throughput::Elements(50));
    group.bench_function("insert_page_of_50", |b| {
        b.iter(|| apply(&store, &event, &config).unwrap());
    });
    group.finish();
}

fn bench_create_and_link(c: &mut Criterion) {
    let store = populated_store();
    let config = config();
    let event = DocumentEvent::new()
        .primary(Resource::new("post", "new").with_attribute("title", "fresh"))
        .add_links(
            define_relationship("user", "7", [("posts", vec![LinkTarget::CurrentResource])])
                .unwrap(),
        );

    c.bench_function("apply/create_and_link", |b| {
        b.iter_batched(
            || store.clone(),
            |snapshot| apply(&snapshot, &event, &config).unwrap(),
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_insert_page, bench_create_and_link);
criterion_main!(benches);
