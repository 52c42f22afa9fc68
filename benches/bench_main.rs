#[macro_use]
extern crate bencher;

use std::sync::Arc;
use std::thread;

use bencher::Bencher;
use rand::prelude::*;
use sync_lru_cache::LRUCache;

fn bench_insert(b: &mut Bencher) {
    let cache: LRUCache<u64, u64> = LRUCache::with_capacity(128).unwrap();
    let mut idx = 0;
    b.iter(|| {
        cache.put(idx, idx);
        idx += 1;
    });
}

fn bench_update(b: &mut Bencher) {
    let cache: LRUCache<u64, u64> = LRUCache::with_capacity(128).unwrap();
    for idx in 0..128 {
        cache.put(idx, idx);
    }

    let mut idx = 0;
    b.iter(|| {
        cache.put(idx % 128, idx);
        idx += 1;
    });
}

fn bench_read(b: &mut Bencher) {
    let cache: LRUCache<u64, u64> = LRUCache::with_capacity(4096).unwrap();
    for idx in 0..4096 {
        cache.put(idx, idx);
    }

    let mut idx = 0;
    b.iter(|| {
        cache.get(&idx);
        idx += 1;
    });
}

fn bench_threads(b: &mut Bencher) {
    let cap = 128;
    let cache: LRUCache<u64, u64> = LRUCache::with_capacity(cap).unwrap();

    for idx in 0..cap {
        cache.put(idx as u64, idx as u64);
    }

    let cache = Arc::new(cache);
    b.iter(|| {
        let readers: Vec<_> = (0..2)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let mut rng = rand::thread_rng();
                    for _ in 0..1000 {
                        let key: u64 = rng.gen_range(0, 2 * cap as u64);
                        cache.get(&key);
                    }
                })
            })
            .collect();

        let writer = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                for _ in 0..1000 {
                    let key: u64 = rng.gen_range(0, 2 * cap as u64);
                    cache.put(key, key);
                }
            })
        };

        for reader in readers {
            reader.join().unwrap();
        }
        writer.join().unwrap();
    })
}

benchmark_group!(benches, bench_insert, bench_update, bench_read, bench_threads);
benchmark_main!(benches);
