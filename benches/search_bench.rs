use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use docsearch::{RankAlgorithm, RankableItem, SearchOptions, SearchService, StaticCorpus};

/// Synthetic corpus: repeating vocabulary so queries hit a realistic fraction
/// of the documents.
fn synthetic_corpus(size: usize) -> Vec<RankableItem> {
    let topics = [
        "quickstart", "deployment", "configuration", "caching", "routing", "auth", "testing",
        "migration",
    ];
    (0..size)
        .map(|i| {
            let topic = topics[i % topics.len()];
            let mut item = RankableItem::new(
                format!("{topic} guide part {i}"),
                format!("docs/{topic}/{i}"),
            );
            item.description = Some(format!("Everything about {topic} in one place"));
            item.content = Some(format!(
                "This page covers {topic} end to end, including {topic} pitfalls, \
                 recommended defaults, and how {topic} interacts with the rest of the system."
            ));
            item.tags = vec![topic.to_string()];
            item
        })
        .collect()
}

fn service(algorithm: RankAlgorithm) -> SearchService {
    SearchService::with_options(
        Arc::new(StaticCorpus::new(synthetic_corpus(2_000))),
        SearchOptions { algorithm, ..SearchOptions::default() },
    )
}

fn bench_search(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    let queries = vec![
        ("single_term", "caching"),
        ("multi_term", "caching defaults"),
        ("title_exact", "quickstart guide part 0"),
        ("no_match", "zzzzzz"),
    ];

    for (label, algorithm) in [("weighted", RankAlgorithm::Weighted), ("bm25", RankAlgorithm::Bm25)]
    {
        let svc = service(algorithm);
        let mut group = c.benchmark_group(format!("search_{label}"));
        group.sample_size(20);

        for (name, query) in &queries {
            group.bench_function(*name, |b| {
                b.iter(|| {
                    // Clear between iterations so every run ranks instead of
                    // reading the cache
                    svc.clear_cache();
                    rt.block_on(async { svc.search(query, 8).await.unwrap() })
                });
            });
        }
        group.finish();
    }
}

fn bench_cached_hit(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let svc = service(RankAlgorithm::Weighted);
    rt.block_on(async { svc.search("caching", 8).await.unwrap() });

    c.bench_function("search_cache_hit", |b| {
        b.iter(|| rt.block_on(async { svc.search("caching", 8).await.unwrap() }));
    });
}

criterion_group!(benches, bench_search, bench_cached_hit);
criterion_main!(benches);
