//! Feed decoding and store benchmarks.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::{json, Value};
use std::sync::Arc;

use feed_sync::domain::decode_posts;
use feed_sync::{
    FeedClientConfig, FeedCoordinator, InMemoryCredentials, MemoryAssetSink, MockApiGateway,
    RecordingNavigator, StoreDeps,
};

fn feed_body(posts: usize) -> Value {
    Value::Array(
        (0..posts)
            .map(|i| {
                json!({
                    "id": i,
                    "author": {"username": format!("user{i}")},
                    "content": "benchmark post",
                    "created_at": "2024-03-05T10:00:00Z",
                    "image": if i % 3 == 0 { json!(format!("/media/{i}.jpg")) } else { Value::Null },
                    "likes": (0..i % 7).map(|u| json!({"user": u})).collect::<Vec<_>>(),
                    "comments": (0..i % 4).map(|c| json!({"id": c, "content": "c"})).collect::<Vec<_>>(),
                })
            })
            .collect(),
    )
}

fn bench_decode(c: &mut Criterion) {
    let body = feed_body(500);
    c.bench_function("decode_posts_500", |b| {
        b.iter(|| decode_posts(black_box(&body), "http://feed.test"))
    });
}

fn bench_load(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let body = feed_body(200);

    c.bench_function("load_and_view_200", |b| {
        b.iter(|| {
            let gateway = Arc::new(MockApiGateway::new());
            gateway.respond("fetch_posts", Ok(body.clone()));
            let deps = StoreDeps {
                gateway,
                credentials: Arc::new(InMemoryCredentials::signed_in("t")),
                assets: Arc::new(MemoryAssetSink::new()),
            };
            let feed = FeedCoordinator::new(
                &FeedClientConfig::for_testing(),
                deps,
                Arc::new(RecordingNavigator::new()),
            );
            runtime.block_on(feed.load()).unwrap();
            feed.stores().iter().map(|s| s.view()).count()
        })
    });
}

criterion_group!(benches, bench_decode, bench_load);
criterion_main!(benches);
