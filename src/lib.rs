//! Bitcoin HD wallet recovery candidate enumerator library
//!
//! Given a master key whose wallet software and account usage are
//! unknown, this library walks every known wallet derivation convention
//! over a bounded (index, account) space and produces the candidate
//! output scripts a balance-checking component should look for, most
//! probable candidates first.

pub mod descriptor;
pub mod error;
pub mod master;
pub mod path;
pub mod script;
pub mod search;
pub mod stats;

pub use descriptor::{Descriptor, KNOWN_DESCRIPTORS};
pub use error::Error;
pub use master::MasterKey;
pub use path::PathTemplate;
pub use script::ScriptType;
pub use search::{Candidate, DescriptorSearch, SearchQueue};
pub use stats::SearchPlan;
