//! Error types shared across the library

use crate::script::ScriptType;
use bitcoin::bip32;
use thiserror::Error;

/// Errors produced while enumerating candidate scripts
#[derive(Debug, Error)]
pub enum Error {
    /// A descriptor pattern could not be parsed into a path template
    #[error("invalid derivation path: {0}")]
    InvalidPath(String),

    /// Child key derivation failed for a resolved path
    #[error("key derivation failed: {0}")]
    Derivation(#[from] bip32::Error),

    /// The public key encoding cannot be used with the requested script type
    #[error("public key not usable for {0} scripts")]
    UnsupportedKey(ScriptType),
}
