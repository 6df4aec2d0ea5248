use async_trait::async_trait;
use modbot::store::{Error, Result, Store};
use parking_lot::RwLock;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// A [`Store`] that keeps all entries in memory.
#[derive(Clone, Debug, Default)]
pub struct MemStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    strings: HashMap<String, String>,
    sets: HashMap<String, BTreeSet<String>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.read().strings.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner
            .write()
            .strings
            .insert(key.to_owned(), value.to_owned());

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut inner = self.inner.write();
        inner.strings.remove(key);
        inner.sets.remove(key);

        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        let mut inner = self.inner.write();

        let value = match inner.strings.get(key) {
            Some(value) => value
                .parse::<i64>()
                .map_err(|_| Error::new(format!("value of {} is not an integer", key)))?,
            None => 0,
        };

        let value = value + 1;
        inner.strings.insert(key.to_owned(), value.to_string());

        Ok(value)
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool> {
        Ok(self
            .inner
            .write()
            .sets
            .entry(key.to_owned())
            .or_default()
            .insert(member.to_owned()))
    }

    async fn srem(&self, key: &str, member: &str) -> Result<bool> {
        let mut inner = self.inner.write();

        let set = match inner.sets.get_mut(key) {
            Some(set) => set,
            None => return Ok(false),
        };

        let removed = set.remove(member);
        if set.is_empty() {
            inner.sets.remove(key);
        }

        Ok(removed)
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>> {
        Ok(self
            .inner
            .read()
            .sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let inner = self.inner.read();

        Ok(inner.strings.contains_key(key) || inner.sets.contains_key(key))
    }

    async fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let inner = self.inner.read();

        let mut keys: Vec<String> = inner
            .strings
            .keys()
            .chain(inner.sets.keys())
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();

        keys.sort();
        keys.dedup();

        Ok(keys)
    }
}
