use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use flexchat::memory::{ConversationMemory, MemoryStore};
use flexchat::types::Turn;

fn build_store(rt: &tokio::runtime::Runtime, users: usize) -> MemoryStore {
    let store = MemoryStore::new();
    rt.block_on(async {
        for u in 0..users {
            let user = format!("user-{u}");
            for i in 0..20 {
                store.record(&user, Turn::user(format!("message {i}"))).await;
            }
        }
    });
    store
}

fn bench_record(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("memory_record");

    for users in [10usize, 1_000, 10_000] {
        let store = build_store(&rt, users);
        let user = format!("user-{}", users - 1);

        group.bench_with_input(BenchmarkId::from_parameter(users), &users, |b, _| {
            b.iter(|| {
                rt.block_on(store.record(black_box(&user), Turn::assistant("reply")));
            });
        });
    }

    group.finish();
}

fn bench_recent_turns(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let store = build_store(&rt, 1_000);

    c.bench_function("memory_recent_turns_8", |b| {
        b.iter(|| {
            let turns = rt.block_on(store.recent_turns(black_box("user-500"), 8));
            black_box(turns);
        });
    });
}

criterion_group!(benches, bench_record, bench_recent_turns);
criterion_main!(benches);
