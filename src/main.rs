use sync_lru_cache::{CacheResult, LRUCache};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> CacheResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sync_lru_cache=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cache: LRUCache<String, i32> = LRUCache::with_capacity(3)?;

    cache.put("a".to_string(), 1);
    cache.put("b".to_string(), 2);
    cache.put("c".to_string(), 3);

    // One past capacity: "a" is the least recently used and goes.
    cache.put("d".to_string(), 4);

    println!("a exists: {}", cache.contains_key("a"));

    if let Some(value) = cache.get("b") {
        println!("b value is: {}", value);
    }

    Ok(())
}
