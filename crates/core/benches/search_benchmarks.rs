use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use catalog_core::{
    Entity, InMemorySearchableRepository, SearchConfig, SearchInput, SearchableRepository,
    SortDirection, SortKey, UniqueEntityId,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
struct BenchProps {
    name: String,
    rank: i64,
}

#[derive(Debug, Clone)]
struct BenchEntity {
    id: UniqueEntityId,
    props: BenchProps,
}

impl Entity for BenchEntity {
    type Props = BenchProps;

    fn unique_entity_id(&self) -> &UniqueEntityId {
        &self.id
    }

    fn props(&self) -> &BenchProps {
        &self.props
    }
}

fn config() -> SearchConfig<BenchEntity> {
    SearchConfig::new(|e: &BenchEntity, term: &str| e.props.name.to_lowercase().contains(&term.to_lowercase()))
        .sortable("name", |e: &BenchEntity| SortKey::from(e.props.name.as_str()))
        .sortable("rank", |e: &BenchEntity| SortKey::from(e.props.rank))
        .default_sort("rank", SortDirection::Desc)
}

fn seed(count: usize) -> Vec<BenchEntity> {
    (0..count)
        .map(|i| BenchEntity {
            id: UniqueEntityId::new(),
            props: BenchProps {
                name: format!("Category {}", (i * 7919) % count),
                rank: (i % 97) as i64,
            },
        })
        .collect()
}

fn bench_search(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let mut group = c.benchmark_group("in_memory_search");

    for size in [100usize, 1_000, 10_000] {
        let repo = InMemorySearchableRepository::with_items(config(), seed(size));
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("default_order", size), &size, |b, _| {
            b.iter(|| {
                let result = runtime.block_on(repo.search(SearchInput::default().into())).unwrap();
                black_box(result.total())
            })
        });

        group.bench_with_input(BenchmarkId::new("filter_sort_page", size), &size, |b, _| {
            b.iter(|| {
                let params = SearchInput::default()
                    .with_filter("category 1")
                    .with_sort("name")
                    .with_sort_dir("desc")
                    .with_page(2)
                    .with_per_page(20)
                    .into();
                let result = runtime.block_on(repo.search(params)).unwrap();
                black_box(result.items().len())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
