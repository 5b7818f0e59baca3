//! Traits describing the external collaborators and shared error types.

use async_trait::async_trait;
use reqwest::Error as ReqwestError;
use serde_json::Error as JsonError;

use crate::model::{RawTimeslotRecord, SportType};

#[derive(thiserror::Error, Debug)]
/// Errors that can occur while talking to the data provider backends.
pub enum PortError {
    /// Network layer failed.
    #[error("Network error: {0}")]
    Network(#[from] ReqwestError),
    /// The sport type has no registered provider.
    #[error("Unsupported sport: {0}")]
    UnsupportedSport(SportType),
    /// The persistent store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    /// Internal provider error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(thiserror::Error, Debug)]
/// Errors raised by a [`KeyValueStore`].
pub enum StoreError {
    /// The backing storage could not be read or written.
    #[error("Storage backend error: {0}")]
    Backend(String),
    /// A stored value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] JsonError),
}

#[async_trait]
/// Source of raw availability records for one sport type.
pub trait DataProvider: Send + Sync {
    /// Sport type served by this provider.
    fn sport(&self) -> SportType;

    /// Fetch the full current record set.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] when the upstream request fails or cannot be decoded.
    async fn fetch_sport_venue_data(&self) -> Result<Vec<RawTimeslotRecord>, PortError>;
}

/// Atomic string key-value storage for bookmarks and preferences.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`; removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend cannot be written.
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}
