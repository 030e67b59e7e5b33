//! Block-list store: phone numbers for which delivery is suppressed.

use std::collections::HashSet;
use std::error::Error as StdError;
use std::sync::RwLock;

use crate::BoxFuture;
use crate::domain::PhoneNumber;

/// Key namespace used by the cache-backed block-list.
pub const DEFAULT_KEY_PREFIX: &str = "blacklist:";

#[derive(Debug, thiserror::Error)]
pub enum BlocklistError {
    /// The backing store could not answer.
    #[error("block-list store unavailable: {0}")]
    Unavailable(#[source] Box<dyn StdError + Send + Sync>),
}

/// Membership store keyed on the phone number exactly as provided.
///
/// Each call is atomic on its own; callers coordinate nothing beyond that.
pub trait BlocklistStore: Send + Sync {
    fn is_blacklisted<'a>(
        &'a self,
        phone: &'a PhoneNumber,
    ) -> BoxFuture<'a, Result<bool, BlocklistError>>;

    fn add<'a>(&'a self, phone: &'a PhoneNumber) -> BoxFuture<'a, Result<(), BlocklistError>>;

    fn remove<'a>(&'a self, phone: &'a PhoneNumber) -> BoxFuture<'a, Result<(), BlocklistError>>;
}

#[derive(Debug)]
/// Process-local block-list with cache-style prefixed keys.
pub struct InMemoryBlocklist {
    key_prefix: String,
    keys: RwLock<HashSet<String>>,
}

impl Default for InMemoryBlocklist {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_KEY_PREFIX)
    }
}

impl InMemoryBlocklist {
    pub fn with_prefix(key_prefix: impl Into<String>) -> Self {
        Self {
            key_prefix: key_prefix.into(),
            keys: RwLock::new(HashSet::new()),
        }
    }

    /// Storage key for `phone`.
    pub fn key_for(&self, phone: &PhoneNumber) -> String {
        format!("{}{}", self.key_prefix, phone.as_str())
    }

    pub fn len(&self) -> Result<usize, BlocklistError> {
        let keys = self.keys.read().map_err(poisoned)?;
        Ok(keys.len())
    }

    pub fn is_empty(&self) -> Result<bool, BlocklistError> {
        Ok(self.len()? == 0)
    }

    fn contains(&self, phone: &PhoneNumber) -> Result<bool, BlocklistError> {
        let key = self.key_for(phone);
        let keys = self.keys.read().map_err(poisoned)?;
        Ok(keys.contains(&key))
    }

    fn insert(&self, phone: &PhoneNumber) -> Result<(), BlocklistError> {
        let key = self.key_for(phone);
        let mut keys = self.keys.write().map_err(poisoned)?;
        keys.insert(key);
        Ok(())
    }

    fn delete(&self, phone: &PhoneNumber) -> Result<(), BlocklistError> {
        let key = self.key_for(phone);
        let mut keys = self.keys.write().map_err(poisoned)?;
        keys.remove(&key);
        Ok(())
    }
}

fn poisoned<T>(err: std::sync::PoisonError<T>) -> BlocklistError {
    BlocklistError::Unavailable(err.to_string().into())
}

impl BlocklistStore for InMemoryBlocklist {
    fn is_blacklisted<'a>(
        &'a self,
        phone: &'a PhoneNumber,
    ) -> BoxFuture<'a, Result<bool, BlocklistError>> {
        Box::pin(async move { self.contains(phone) })
    }

    fn add<'a>(&'a self, phone: &'a PhoneNumber) -> BoxFuture<'a, Result<(), BlocklistError>> {
        Box::pin(async move {
            self.insert(phone)?;
            tracing::info!(phone = %phone, "added to block-list");
            Ok(())
        })
    }

    fn remove<'a>(&'a self, phone: &'a PhoneNumber) -> BoxFuture<'a, Result<(), BlocklistError>> {
        Box::pin(async move {
            self.delete(phone)?;
            tracing::info!(phone = %phone, "removed from block-list");
            Ok(())
        })
    }
}
