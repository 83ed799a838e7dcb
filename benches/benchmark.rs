// Grouped search benchmarks: plain top-k search vs grouped search, single and sharded
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use std::sync::Arc;
use vgroup::dataset;
use vgroup_core::{Collection, CollectionConfig, Distance, Point, PointId, Vector};
use vgroup_grouping::{GroupRequest, GroupingEngine, ShardedSource};

const DIM: usize = 128;
const CHUNKS_PER_DOC: usize = 8;

fn generate_random_vector(dim: usize) -> Vector {
    let mut rng = rand::rng();
    let data: Vec<f32> = (0..dim).map(|_| rng.random_range(-1.0f32..1.0f32)).collect();
    Vector::new(data)
}

fn generate_random_point(id: usize, dim: usize) -> Point {
    Point::new(
        PointId::Integer(id as u64),
        generate_random_vector(dim),
        Some(serde_json::json!({
            "docId": format!("doc_{}", id / CHUNKS_PER_DOC),
            "text": format!("chunk {} of document {}", id % CHUNKS_PER_DOC, id / CHUNKS_PER_DOC)
        })),
    )
}

fn config() -> CollectionConfig {
    CollectionConfig {
        name: "bench".to_string(),
        vector_dim: DIM,
        distance: Distance::Cosine,
    }
}

fn benchmark_grouped_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("grouped_search");

    // Setup: Insert 10k points, 8 chunks per document
    let collection = Collection::new(config());
    for i in 0..10000 {
        collection.upsert(generate_random_point(i, DIM)).unwrap();
    }
    let query = generate_random_vector(DIM);
    let engine = GroupingEngine::default();

    group.bench_function("top_30_points", |b| {
        b.iter(|| {
            let results = collection.search(black_box(&query), 30, None);
            black_box(results)
        });
    });

    for (limit, per_group) in [(10, 3), (10, 8), (50, 1)] {
        let request = GroupRequest::search(query.clone(), "docId", limit, per_group).include_payload(true);
        group.bench_with_input(
            BenchmarkId::new("groups", format!("{}x{}", limit, per_group)),
            &request,
            |b, request| {
                b.iter(|| {
                    let result = engine.search_groups(&collection, black_box(request));
                    black_box(result)
                });
            },
        );
    }

    group.finish();
}

fn benchmark_sharded_grouped_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("sharded_grouped_search");

    let points: Vec<Point> = (0..20000).map(|i| generate_random_point(i, DIM)).collect();
    let query = generate_random_vector(DIM);
    let request = GroupRequest::search(query, "docId", 10, 3);
    let engine = GroupingEngine::default();

    for shards in [1usize, 2, 4, 8] {
        let collections = dataset::shard(points.clone(), &config(), shards).unwrap();
        group.bench_with_input(BenchmarkId::new("shards", shards), &collections, |b, collections| {
            b.iter(|| {
                let source = ShardedSource::for_request(collections, &request).unwrap();
                black_box(engine.group_by(black_box(&request), &source))
            });
        });
    }

    group.finish();
}

fn benchmark_concurrent_requests(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_requests");

    let collection = Arc::new(Collection::new(config()));
    for i in 0..2000 {
        collection.upsert(generate_random_point(i, DIM)).unwrap();
    }
    let request = Arc::new(GroupRequest::search(generate_random_vector(DIM), "docId", 10, 3));

    group.bench_function("grouped_concurrent", |b| {
        b.iter(|| {
            use std::thread;
            let handles: Vec<_> = (0..10)
                .map(|_| {
                    let coll = collection.clone();
                    let req = request.clone();
                    thread::spawn(move || GroupingEngine::default().search_groups(&coll, &req))
                })
                .collect();

            for handle in handles {
                black_box(handle.join().unwrap()).unwrap();
            }
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_grouped_search,
    benchmark_sharded_grouped_search,
    benchmark_concurrent_requests
);
criterion_main!(benches);
