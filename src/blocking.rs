//! Blocking facade over [`Collection`](crate::Collection).
//!
//! Each [`Collection`] owns a current-thread tokio runtime and drives one async
//! call to completion per method. Do not use it from inside an async context.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::runtime::{Builder, Runtime};

use crate::client::{self, CollectionBuilder, ContiguityError};
use crate::domain::{Query, QueryResponse, Updates, WriteOptions};

/// Blocking client for one named collection.
pub struct Collection<T = Value> {
    inner: client::Collection<T>,
    runtime: Runtime,
}

impl<T> Collection<T> {
    /// Wrap an async collection client.
    pub fn new(inner: client::Collection<T>) -> Result<Self, ContiguityError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| ContiguityError::InvalidConfiguration {
                message: format!("failed to create tokio runtime: {err}"),
            })?;
        Ok(Self { inner, runtime })
    }

    /// Build the async client from `builder` and wrap it.
    pub fn from_builder(builder: CollectionBuilder<T>) -> Result<Self, ContiguityError> {
        Self::new(builder.build()?)
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn base_url(&self) -> &str {
        self.inner.base_url()
    }

    /// Borrow the async client, e.g. to clone it into an async task.
    pub fn as_async(&self) -> &client::Collection<T> {
        &self.inner
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    /// See [`client::Collection::get`].
    pub fn get(&self, key: &str) -> Result<Option<T>, ContiguityError> {
        self.runtime.block_on(self.inner.get(key))
    }

    pub fn get_or(&self, key: &str, default: T) -> Result<T, ContiguityError> {
        self.runtime.block_on(self.inner.get_or(key, default))
    }

    pub fn get_or_none(&self, key: &str) -> Result<Option<T>, ContiguityError> {
        self.runtime.block_on(self.inner.get_or_none(key))
    }

    pub fn delete(&self, key: &str) -> Result<(), ContiguityError> {
        self.runtime.block_on(self.inner.delete(key))
    }

    pub fn insert(&self, item: &T, options: WriteOptions) -> Result<T, ContiguityError> {
        self.runtime.block_on(self.inner.insert(item, options))
    }

    pub fn put(&self, items: &[T], options: WriteOptions) -> Result<Vec<T>, ContiguityError> {
        self.runtime.block_on(self.inner.put(items, options))
    }

    pub fn update(
        &self,
        updates: &Updates,
        key: &str,
        options: WriteOptions,
    ) -> Result<T, ContiguityError> {
        self.runtime.block_on(self.inner.update(updates, key, options))
    }

    pub fn query(&self, query: &Query) -> Result<QueryResponse<T>, ContiguityError> {
        self.runtime.block_on(self.inner.query(query))
    }
}
