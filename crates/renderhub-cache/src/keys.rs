//! Entry cache keys.

use std::fmt;

/// Key of one entry cache record: the entity moniker plus the record name.
///
/// The moniker keeps records of different entity types apart when several
/// coordinators share one cache. Names are kept verbatim; stores treat them
/// as case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    moniker: String,
    name: String,
}

impl CacheKey {
    /// Crea una nueva cache key.
    ///
    /// # Examples
    ///
    /// ```
    /// use renderhub_cache::CacheKey;
    ///
    /// let key = CacheKey::new("ENVIRONMENT", "west-farm");
    /// assert_eq!(key.moniker(), "ENVIRONMENT");
    /// assert_eq!(key.to_string(), "ENVIRONMENT:west-farm");
    /// ```
    pub fn new(moniker: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            moniker: moniker.into(),
            name: name.into(),
        }
    }

    pub fn moniker(&self) -> &str {
        &self.moniker
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.moniker, self.name)
    }
}
