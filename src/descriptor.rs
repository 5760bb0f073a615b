//! Known wallet derivation conventions
//!
//! Catalog of the derivation path templates historically used by wallet
//! software, together with the script types each one produced. The
//! catalog is fixed: recovering from an unknown wallet means trying all
//! of them.

use std::str::FromStr;

use crate::error::Error;
use crate::path::PathTemplate;
use crate::script::ScriptType;

/// Known (path template, script types) pairs
///
/// `a` is the account level, `i` the address index level.
pub const KNOWN_DESCRIPTORS: &[(&str, &[ScriptType])] = &[
    ("m/44'/0'/a'/0/i", &[ScriptType::Legacy]), // BIP44, external
    ("m/44'/0'/a'/1/i", &[ScriptType::Legacy]), // BIP44, change
    ("m/49'/0'/a'/0/i", &[ScriptType::Compat]), // BIP49, external
    ("m/49'/0'/a'/1/i", &[ScriptType::Compat]), // BIP49, change
    ("m/84'/0'/a'/0/i", &[ScriptType::Segwit]), // BIP84, external
    ("m/84'/0'/a'/1/i", &[ScriptType::Segwit]), // BIP84, change
    // Bitcoin Core
    (
        "m/0'/0'/i'",
        &[ScriptType::Legacy, ScriptType::Compat, ScriptType::Segwit],
    ),
    // BRD/Hodl/Coin/Multibit, external and change
    (
        "m/0'/0/i",
        &[ScriptType::Legacy, ScriptType::Compat, ScriptType::Segwit],
    ),
    (
        "m/0'/1/i",
        &[ScriptType::Legacy, ScriptType::Compat, ScriptType::Segwit],
    ),
    // Samourai ricochet accounts
    ("m/44'/0'/2147483647'/0/i", &[ScriptType::Legacy]),
    ("m/44'/0'/2147483647'/1/i", &[ScriptType::Legacy]),
    ("m/49'/0'/2147483647'/0/i", &[ScriptType::Compat]),
    ("m/49'/0'/2147483647'/1/i", &[ScriptType::Compat]),
    ("m/84'/0'/2147483647'/0/i", &[ScriptType::Segwit]),
    ("m/84'/0'/2147483647'/1/i", &[ScriptType::Segwit]),
    // Samourai post-mix
    ("m/84'/0'/2147483646'/0/i", &[ScriptType::Segwit]),
    ("m/84'/0'/2147483646'/1/i", &[ScriptType::Segwit]),
    // Samourai pre-mix
    ("m/84'/0'/2147483645'/0/i", &[ScriptType::Segwit]),
    ("m/84'/0'/2147483645'/1/i", &[ScriptType::Segwit]),
    // Samourai bad-bank
    ("m/84'/0'/2147483644'/0/i", &[ScriptType::Segwit]),
    ("m/84'/0'/2147483644'/1/i", &[ScriptType::Segwit]),
];

/// A parsed descriptor: one path template and the script types to try
#[derive(Debug, Clone)]
pub struct Descriptor {
    /// Derivation path template
    pub template: PathTemplate,
    /// Script types this template was used with
    pub script_types: &'static [ScriptType],
}

impl Descriptor {
    /// Parse the full catalog of known descriptors
    pub fn known() -> Result<Vec<Descriptor>, Error> {
        KNOWN_DESCRIPTORS
            .iter()
            .map(|&(pattern, script_types)| {
                Ok(Descriptor {
                    template: PathTemplate::from_str(pattern)?,
                    script_types,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_parses() {
        let descriptors = Descriptor::known().unwrap();
        assert_eq!(descriptors.len(), KNOWN_DESCRIPTORS.len());
    }

    #[test]
    fn test_every_template_has_free_index() {
        for descriptor in Descriptor::known().unwrap() {
            assert!(
                descriptor.template.has_free_index(),
                "template {} has no index variable",
                descriptor.template
            );
        }
    }

    #[test]
    fn test_bitcoin_core_template_covers_all_script_types() {
        let descriptors = Descriptor::known().unwrap();
        let core = descriptors
            .iter()
            .find(|d| d.template.to_string() == "m/0'/0'/i'")
            .unwrap();

        assert_eq!(core.script_types.len(), 3);
    }

    #[test]
    fn test_samourai_accounts_are_fixed() {
        let descriptors = Descriptor::known().unwrap();
        let samourai: Vec<_> = descriptors
            .iter()
            .filter(|d| d.template.to_string().contains("21474836"))
            .collect();

        assert_eq!(samourai.len(), 12);
        for descriptor in samourai {
            assert!(!descriptor.template.has_free_account());
        }
    }
}
