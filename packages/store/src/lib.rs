#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client for the shared emergency record collection.
//!
//! The collection lives in a single remote document that only supports
//! whole-document reads and writes. There is no append and no version
//! token, so adding a record is always fetch, modify, then replace, and
//! the last writer wins. Two reporters that fetch the same snapshot and
//! write back in turn will lose the first reporter's record; this crate
//! does not try to hide that.
//!
//! Entries of the fetched snapshot are written back exactly as received,
//! including fields and entries this client cannot decode.

pub mod collection;
pub mod jsonbin;
pub mod memory;

pub use collection::Collection;
pub use jsonbin::JsonBinStore;
pub use memory::MemoryStore;

/// Boxed error type carried by [`StoreError`] variants.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors from the record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading the collection failed (transport, status or body).
    #[error("Failed to fetch emergency records from {url}: {source}")]
    FetchFailed {
        /// Document URL.
        url: String,
        /// Underlying failure.
        source: BoxError,
    },

    /// Replacing the collection failed.
    #[error("Failed to write emergency records to {url}: {source}")]
    WriteFailed {
        /// Document URL.
        url: String,
        /// Underlying failure.
        source: BoxError,
    },
}

impl StoreError {
    /// Whether the failure happened while reading.
    #[must_use]
    pub const fn is_fetch(&self) -> bool {
        matches!(self, Self::FetchFailed { .. })
    }
}

/// A whole-document store for the emergency collection.
#[async_trait::async_trait]
pub trait EmergencyStore: Send + Sync {
    /// Reads the entire collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::FetchFailed`] if the collection cannot be read
    /// or is not a record array. Individual entries that do not decode are
    /// kept in the [`Collection`] rather than failing the fetch.
    async fn fetch_all(&self) -> Result<Collection, StoreError>;

    /// Replaces the entire collection with `collection`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::WriteFailed`] if the write is not accepted.
    async fn replace_all(&self, collection: &Collection) -> Result<(), StoreError>;
}
