use criterion::{Criterion, black_box, criterion_group, criterion_main};
use lazy_objectpool::{Pool, PoolConfiguration};
use std::thread;

fn buffer_pool(size: usize) -> Pool<Vec<u8>, String> {
    let config = PoolConfiguration::new()
        .with_factory(|| Ok(vec![0u8; 4096]))
        .with_max_pool_size(size);
    Pool::new(config).unwrap()
}

fn acquire_restore(c: &mut Criterion) {
    let pool = buffer_pool(1);

    c.bench_function("acquire_restore_warm", |b| {
        b.iter(|| {
            let item = pool.acquire().unwrap();
            black_box(item.value().len());
            item.restore().unwrap();
        })
    });
}

fn acquire_restore_contended(c: &mut Criterion) {
    let pool = buffer_pool(4);

    c.bench_function("acquire_restore_8_threads", |b| {
        b.iter(|| {
            thread::scope(|s| {
                for _ in 0..8 {
                    s.spawn(|| {
                        for _ in 0..100 {
                            let item = pool.acquire().unwrap();
                            black_box(item.value().len());
                            item.restore().unwrap();
                        }
                    });
                }
            });
        })
    });
}

criterion_group!(benches, acquire_restore, acquire_restore_contended);
criterion_main!(benches);
