use async_trait::async_trait;
use thiserror::Error;

use std::result;

pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<dyn std::error::Error + Send + Sync + 'static>);

impl Error {
    pub fn new<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        Self(err.into())
    }
}

/// A string key-value store with set values.
///
/// String keys and set keys live in separate namespaces.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes the string or set stored under `key`.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Increments the integer stored under `key` and returns the new
    /// value. A missing key counts as `0`.
    async fn incr(&self, key: &str) -> Result<i64>;

    /// Adds `member` to the set `key`. Returns `false` if it was already
    /// present.
    async fn sadd(&self, key: &str, member: &str) -> Result<bool>;

    /// Removes `member` from the set `key`. Returns `false` if it was not
    /// present.
    async fn srem(&self, key: &str, member: &str) -> Result<bool>;

    async fn smembers(&self, key: &str) -> Result<Vec<String>>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Returns all string and set keys starting with `prefix`.
    async fn keys(&self, prefix: &str) -> Result<Vec<String>>;

    /// Returns the value stored under `key`, or `default` if none is.
    async fn get_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self.get(key).await?.unwrap_or_else(|| default.to_owned()))
    }
}
