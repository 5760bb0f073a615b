//! Output script construction
//!
//! Every known wallet convention produced addresses of one or more script
//! types from the same derived key. This module builds the raw output
//! script (scriptPubKey) for a public key and a script type, which is
//! what a balance-checking component matches against the chain.

use std::fmt;

use bitcoin::key::CompressedPublicKey;
use bitcoin::{PublicKey, ScriptBuf};

use crate::error::Error;

/// Output script types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptType {
    /// Legacy P2PKH
    Legacy,
    /// P2SH-wrapped segwit (P2SH-P2WPKH)
    Compat,
    /// Native segwit P2WPKH
    Segwit,
}

impl ScriptType {
    /// Build the output script paying to the given public key
    pub fn build_output_script(self, pubkey: &PublicKey) -> Result<ScriptBuf, Error> {
        match self {
            ScriptType::Legacy => Ok(ScriptBuf::new_p2pkh(&pubkey.pubkey_hash())),
            ScriptType::Compat => {
                let wpkh = ScriptBuf::new_p2wpkh(&self.witness_key(pubkey)?.wpubkey_hash());
                Ok(ScriptBuf::new_p2sh(&wpkh.script_hash()))
            }
            ScriptType::Segwit => {
                let key = self.witness_key(pubkey)?;
                Ok(ScriptBuf::new_p2wpkh(&key.wpubkey_hash()))
            }
        }
    }

    /// Witness programs are only defined for compressed keys
    fn witness_key(self, pubkey: &PublicKey) -> Result<CompressedPublicKey, Error> {
        CompressedPublicKey::try_from(*pubkey).map_err(|_| Error::UnsupportedKey(self))
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScriptType::Legacy => "legacy",
            ScriptType::Compat => "compat",
            ScriptType::Segwit => "segwit",
        };
        f.write_str(name)
    }
}
