use thiserror::Error;

pub type CacheResult<T> = Result<T, CacheError>;

/// Errors raised while building a cache.
///
/// Lookups never fail: a missing key is reported through `Option`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache capacity must be at least one entry")]
    ZeroCapacity,
}
