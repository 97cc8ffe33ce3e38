//! Identifiers shared across the holder layers.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::HolderError;

/// Textual principal of a party (owner, viewer, holder contract).
///
/// Principals are compared verbatim; the remote service is the authority on
/// their canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Parse a principal, rejecting empty or whitespace-only text.
    pub fn parse(text: impl AsRef<str>) -> Result<Self, HolderError> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(HolderError::invalid("principal must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Principal text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a holder contract instance.
///
/// One snapshot provider exists per contract; dispatch coalescing is keyed by
/// it as well.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractId(String);

impl ContractId {
    /// Create a contract identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
