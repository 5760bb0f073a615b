//! Master key handling
//!
//! Wraps the extended private key with its signing context so the search
//! layer can request child public keys for resolved derivation paths.

use std::str::FromStr;

use bitcoin::bip32::{DerivationPath, Xpriv};
use bitcoin::{NetworkKind, PrivateKey, PublicKey};
use secp256k1::{All, Secp256k1};

use crate::error::Error;

/// Master extended private key with its signing context
pub struct MasterKey {
    xpriv: Xpriv,
    secp: Secp256k1<All>,
}

impl MasterKey {
    /// Wrap an already decoded extended private key
    pub fn new(xpriv: Xpriv) -> Self {
        Self {
            xpriv,
            secp: Secp256k1::new(),
        }
    }

    /// Build the master key for a raw BIP32 seed
    pub fn from_seed(network: NetworkKind, seed: &[u8]) -> Result<Self, Error> {
        let xpriv = Xpriv::new_master(network, seed)?;
        Ok(Self::new(xpriv))
    }

    /// The network kind this key was encoded for
    pub fn network(&self) -> NetworkKind {
        self.xpriv.network
    }

    /// Derive the public key at the given absolute derivation path
    pub fn derive_public_key(&self, path: &DerivationPath) -> Result<PublicKey, Error> {
        let child = self.xpriv.derive_priv(&self.secp, path)?;
        let private_key = PrivateKey::new(child.private_key, self.xpriv.network);
        Ok(private_key.public_key(&self.secp))
    }
}

impl FromStr for MasterKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Ok(Self::new(Xpriv::from_str(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // BIP32 test vector 1
    const SEED: &str = "000102030405060708090a0b0c0d0e0f";
    const MASTER_XPRV: &str = "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi";
    const MASTER_PUBKEY: &str = "0339a36013301597daef41fbe593a02cc513d0b55527ec2df1050e2e8ff49c85c2";
    const M_0H_PUBKEY: &str = "035a784662a4a20a65bf6aab9ae98a6c068a81c52e4b032c0fb5400c706cfccc56";

    fn vector_key() -> MasterKey {
        let seed = hex::decode(SEED).unwrap();
        MasterKey::from_seed(NetworkKind::Main, &seed).unwrap()
    }

    #[test]
    fn test_from_seed_matches_vector() {
        let master = vector_key();
        let path = DerivationPath::master();
        let pubkey = master.derive_public_key(&path).unwrap();

        assert_eq!(pubkey.to_string(), MASTER_PUBKEY);
    }

    #[test]
    fn test_from_xprv_string() {
        let master: MasterKey = MASTER_XPRV.parse().unwrap();
        assert_eq!(master.network(), NetworkKind::Main);

        let pubkey = master.derive_public_key(&DerivationPath::master()).unwrap();
        assert_eq!(pubkey.to_string(), MASTER_PUBKEY);
    }

    #[test]
    fn test_derive_hardened_child() {
        let master = vector_key();
        let path: DerivationPath = "m/0'".parse().unwrap();
        let pubkey = master.derive_public_key(&path).unwrap();

        assert_eq!(pubkey.to_string(), M_0H_PUBKEY);
    }

    #[test]
    fn test_invalid_xprv_rejected() {
        assert!("xprv-not-a-key".parse::<MasterKey>().is_err());
    }
}
