//! Derivation path templates
//!
//! A template is a derivation path in which the account level and the
//! address index level may be left as free variables, written `a` and `i`
//! as in `m/44'/0'/a'/0/i`. Binding a variable produces a new template;
//! resolving substitutes both variables and yields a concrete
//! [`DerivationPath`] ready for child key derivation.

use std::fmt;
use std::str::FromStr;

use bitcoin::bip32::{ChildNumber, DerivationPath};

use crate::error::Error;

/// One level of a path template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Segment {
    /// Fixed derivation index
    Literal { value: u32, hardened: bool },
    /// Free account variable (`a`)
    Account { hardened: bool },
    /// Free address index variable (`i`)
    Index { hardened: bool },
}

impl Segment {
    /// Map this segment to a child number, filling free variables with
    /// the given values
    fn child_number(self, index: u32, account: u32) -> ChildNumber {
        let (value, hardened) = match self {
            Segment::Literal { value, hardened } => (value, hardened),
            Segment::Account { hardened } => (account, hardened),
            Segment::Index { hardened } => (index, hardened),
        };
        if hardened {
            ChildNumber::Hardened { index: value }
        } else {
            ChildNumber::Normal { index: value }
        }
    }
}

/// Derivation path from a master key that may have a variable account
/// number and a variable index number
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathTemplate {
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Whether this path has the account level as a free variable
    pub fn has_free_account(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Account { .. }))
    }

    /// Whether this path has the index level as a free variable
    pub fn has_free_index(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Index { .. }))
    }

    /// Get a new template with a fixed account
    pub fn bind_account(&self, account: u32) -> PathTemplate {
        let segments = self
            .segments
            .iter()
            .map(|&s| match s {
                Segment::Account { hardened } => Segment::Literal {
                    value: account,
                    hardened,
                },
                other => other,
            })
            .collect();
        PathTemplate { segments }
    }

    /// Get a new template with a fixed index
    pub fn bind_index(&self, index: u32) -> PathTemplate {
        let segments = self
            .segments
            .iter()
            .map(|&s| match s {
                Segment::Index { hardened } => Segment::Literal {
                    value: index,
                    hardened,
                },
                other => other,
            })
            .collect();
        PathTemplate { segments }
    }

    /// Transform this template into a concrete derivation path, filling
    /// the free variables with the given values
    pub fn resolve(&self, index: u32, account: u32) -> DerivationPath {
        self.segments
            .iter()
            .map(|s| s.child_number(index, account))
            .collect()
    }
}

impl FromStr for PathTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let mut parts = s.split('/');
        if parts.next() != Some("m") {
            return Err(Error::InvalidPath(format!(
                "path must start with 'm': '{}'",
                s
            )));
        }

        let mut segments = Vec::new();
        let mut seen_account = false;
        let mut seen_index = false;

        for part in parts {
            let (body, hardened) = match part.strip_suffix('\'') {
                Some(body) => (body, true),
                None => (part, false),
            };

            let segment = match body {
                "a" => {
                    if seen_account {
                        return Err(Error::InvalidPath(format!(
                            "more than one account variable in '{}'",
                            s
                        )));
                    }
                    seen_account = true;
                    Segment::Account { hardened }
                }
                "i" => {
                    if seen_index {
                        return Err(Error::InvalidPath(format!(
                            "more than one index variable in '{}'",
                            s
                        )));
                    }
                    seen_index = true;
                    Segment::Index { hardened }
                }
                _ => {
                    let value: u32 = body.parse().map_err(|_| {
                        Error::InvalidPath(format!("non-numeric segment '{}' in '{}'", part, s))
                    })?;
                    // Derivation indexes are 31 bits; the high bit marks hardening
                    if value >= 1 << 31 {
                        return Err(Error::InvalidPath(format!(
                            "segment {} out of range in '{}'",
                            value, s
                        )));
                    }
                    Segment::Literal { value, hardened }
                }
            };

            segments.push(segment);
        }

        if segments.is_empty() {
            return Err(Error::InvalidPath(format!("empty path: '{}'", s)));
        }

        Ok(PathTemplate { segments })
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for segment in &self.segments {
            let (label, hardened) = match segment {
                Segment::Literal { value, hardened } => (value.to_string(), *hardened),
                Segment::Account { hardened } => ("a".to_string(), *hardened),
                Segment::Index { hardened } => ("i".to_string(), *hardened),
            };
            write!(f, "/{}{}", label, if hardened { "'" } else { "" })?;
        }
        Ok(())
    }
}
