//! Asset universe.

use std::collections::HashSet;

use crate::error::{FrontierError, Result};

/// Ordered, unique asset identifiers.
///
/// The position of an asset in the universe is its index in every mean
/// vector, covariance matrix and weight vector of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUniverse {
    names: Vec<String>,
}

impl AssetUniverse {
    /// Create a universe from asset names, rejecting empty or duplicate lists.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(FrontierError::InvalidParameter(
                "asset universe is empty".into(),
            ));
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(FrontierError::InvalidParameter(format!(
                    "duplicate asset '{}'",
                    name
                )));
            }
        }

        Ok(AssetUniverse { names })
    }

    /// Number of assets.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Name of the asset at `index`.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Index of the named asset.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
