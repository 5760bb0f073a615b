//! Candidate script enumeration
//!
//! The grid of (index, account) combinations for a descriptor can be
//! large, and which descriptor the wallet actually used is unknown. Two
//! orderings keep the most probable candidates at the front of the
//! stream: each descriptor walks its own grid in anti-diagonal order
//! (low index and low account first), and a round-robin queue interleaves
//! all descriptors so no single grid dominates.

use std::collections::VecDeque;

use bitcoin::ScriptBuf;
use log::debug;

use crate::descriptor::Descriptor;
use crate::error::Error;
use crate::master::MasterKey;
use crate::path::PathTemplate;
use crate::script::ScriptType;

/// A candidate output script with the path and script type that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Raw output script to match against the chain
    pub script: ScriptBuf,
    /// Fully bound derivation path
    pub path: PathTemplate,
    /// Script type the script is encoded as
    pub script_type: ScriptType,
}

/// Search over all scripts generated by one descriptor (a path template
/// and script type pair)
#[derive(Debug, Clone)]
pub struct DescriptorSearch {
    template: PathTemplate,
    script_type: ScriptType,
    index: u32,
    account: u32,
    max_index: u32,
    max_account: u32,
}

impl DescriptorSearch {
    /// Create a search over the `[0, max_index] x [0, max_account]` grid.
    /// A bound without a matching free variable collapses to zero.
    pub fn new(
        template: PathTemplate,
        script_type: ScriptType,
        max_index: u32,
        max_account: u32,
    ) -> Self {
        let max_index = if template.has_free_index() { max_index } else { 0 };
        let max_account = if template.has_free_account() {
            max_account
        } else {
            0
        };

        Self {
            template,
            script_type,
            index: 0,
            account: 0,
            max_index,
            max_account,
        }
    }

    /// Number of scripts this search will produce in total
    pub fn total_scripts(&self) -> u64 {
        (self.max_index as u64 + 1) * (self.max_account as u64 + 1)
    }

    /// Fetch the next script for this descriptor, or `None` once the grid
    /// is exhausted. Exhaustion is permanent.
    pub fn next_script(&mut self, master_key: &MasterKey) -> Result<Option<Candidate>, Error> {
        if self.index > self.max_index || self.account > self.max_account {
            return Ok(None);
        }

        let (index, account) = (self.index, self.account);
        self.advance();

        // derive the script for the cell we just left
        let resolved = self.template.resolve(index, account);
        let pubkey = master_key.derive_public_key(&resolved)?;
        let script = self.script_type.build_output_script(&pubkey)?;
        let path = self.template.bind_account(account).bind_index(index);

        Ok(Some(Candidate {
            script,
            path,
            script_type: self.script_type,
        }))
    }

    // The grid is walked in anti-diagonal order: all cells where
    // index + account = k come before any cell where index + account = k+1,
    // and within a diagonal the account ascends. Low-index, low-account
    // combinations are the most common in real wallets, so they come out
    // first while the far corners of the grid are still reached eventually.
    //
    //    (0,0) (1,0) (2,0)
    //   ↙     ↙     ↙
    //    (0,1) (1,1) (2,1)
    //   ↙     ↙     ↙
    //    (0,2) (1,2) (2,2)
    fn advance(&mut self) {
        if self.index == 0 || self.account == self.max_account {
            // the border ends the current diagonal; start the next one
            let diagonal = self.index + self.account + 1;
            self.index = diagonal.min(self.max_index);
            self.account = diagonal - self.index;
        } else {
            // go down the diagonal
            self.index -= 1;
            self.account += 1;
        }
    }
}

/// Round-robin queue over every descriptor search
///
/// Each call pulls one candidate from the search at the front of the
/// queue and rotates it to the back, so every active descriptor
/// contributes one candidate per round. Exhausted searches drop out;
/// when none remain the queue only yields `None`.
pub struct SearchQueue<'a> {
    master_key: &'a MasterKey,
    searches: VecDeque<DescriptorSearch>,
    total_scripts: u64,
}

impl<'a> SearchQueue<'a> {
    /// Build one search per (template, script type) pair in the catalog
    pub fn new(
        master_key: &'a MasterKey,
        descriptors: &[Descriptor],
        max_index: u32,
        max_account: u32,
    ) -> Self {
        let mut searches = VecDeque::new();
        for descriptor in descriptors {
            for &script_type in descriptor.script_types {
                searches.push_back(DescriptorSearch::new(
                    descriptor.template.clone(),
                    script_type,
                    max_index,
                    max_account,
                ));
            }
        }

        let total_scripts = searches.iter().map(|s| s.total_scripts()).sum();

        Self {
            master_key,
            searches,
            total_scripts,
        }
    }

    /// Total number of candidates this queue will yield
    pub fn total_scripts(&self) -> u64 {
        self.total_scripts
    }

    /// Number of searches still producing candidates
    pub fn active_searches(&self) -> usize {
        self.searches.len()
    }

    /// Fetch the next candidate, cycling the descriptors so all of them
    /// progress together
    pub fn next_candidate(&mut self) -> Result<Option<Candidate>, Error> {
        while let Some(mut search) = self.searches.pop_front() {
            match search.next_script(self.master_key) {
                Ok(Some(candidate)) => {
                    self.searches.push_back(search);
                    return Ok(Some(candidate));
                }
                Ok(None) => {
                    debug!(
                        "search exhausted: {} ({})",
                        search.template, search.script_type
                    );
                }
                Err(e) => {
                    // the failed cell was already skipped; keep the search alive
                    self.searches.push_back(search);
                    return Err(e);
                }
            }
        }

        Ok(None)
    }
}

impl Iterator for SearchQueue<'_> {
    type Item = Result<Candidate, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_candidate().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::NetworkKind;

    fn test_master() -> MasterKey {
        let seed = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        MasterKey::from_seed(NetworkKind::Main, &seed).unwrap()
    }

    fn search(pattern: &str, max_index: u32, max_account: u32) -> DescriptorSearch {
        DescriptorSearch::new(
            pattern.parse().unwrap(),
            ScriptType::Legacy,
            max_index,
            max_account,
        )
    }

    fn drain_paths(search: &mut DescriptorSearch, master: &MasterKey) -> Vec<String> {
        let mut paths = Vec::new();
        while let Some(candidate) = search.next_script(master).unwrap() {
            paths.push(candidate.path.to_string());
        }
        paths
    }

    #[test]
    fn test_diagonal_traversal_order() {
        let master = test_master();
        let mut search = search("m/44'/0'/a'/0/i", 2, 1);
        assert_eq!(search.total_scripts(), 6);

        // cells in (index, account) order:
        // (0,0), (1,0), (0,1), (2,0), (1,1), (2,1)
        let expected = vec![
            "m/44'/0'/0'/0/0",
            "m/44'/0'/0'/0/1",
            "m/44'/0'/1'/0/0",
            "m/44'/0'/0'/0/2",
            "m/44'/0'/1'/0/1",
            "m/44'/0'/1'/0/2",
        ];
        assert_eq!(drain_paths(&mut search, &master), expected);
    }

    #[test]
    fn test_exhaustion_is_permanent() {
        let master = test_master();
        let mut search = search("m/0'/0/i", 2, 7);

        // the account bound collapses without a free account variable
        assert_eq!(search.total_scripts(), 3);

        let mut produced = 0;
        for _ in 0..search.total_scripts() + 1 {
            if search.next_script(&master).unwrap().is_some() {
                produced += 1;
            }
        }
        assert_eq!(produced, 3);

        for _ in 0..5 {
            assert!(search.next_script(&master).unwrap().is_none());
        }
    }

    #[test]
    fn test_fixed_template_yields_single_script() {
        let master = test_master();
        let mut search = search("m/44'/0'/0'/0/0", 100, 10);

        assert_eq!(search.total_scripts(), 1);
        assert!(search.next_script(&master).unwrap().is_some());
        assert!(search.next_script(&master).unwrap().is_none());
    }

    fn two_descriptor_catalog() -> Vec<Descriptor> {
        // 3 cells vs 6 cells at max_index=2, max_account=1
        vec![
            Descriptor {
                template: "m/0'/0/i".parse().unwrap(),
                script_types: &[ScriptType::Legacy],
            },
            Descriptor {
                template: "m/44'/0'/a'/0/i".parse().unwrap(),
                script_types: &[ScriptType::Legacy],
            },
        ]
    }

    #[test]
    fn test_queue_round_robin_fairness() {
        let master = test_master();
        let descriptors = two_descriptor_catalog();
        let queue = SearchQueue::new(&master, &descriptors, 2, 1);
        assert_eq!(queue.total_scripts(), 9);

        let paths: Vec<String> = queue
            .map(|c| c.unwrap().path.to_string())
            .collect();
        assert_eq!(paths.len(), 9);

        // while both searches are active they alternate; afterwards only
        // the larger one remains
        for (position, path) in paths.iter().enumerate() {
            let from_small = path.starts_with("m/0'");
            if position < 6 {
                assert_eq!(from_small, position % 2 == 0, "position {}", position);
            } else {
                assert!(!from_small, "position {}", position);
            }
        }
    }

    #[test]
    fn test_queue_exhausts_whole_catalog_without_duplicates() {
        let master = test_master();
        let descriptors = Descriptor::known().unwrap();
        let mut queue = SearchQueue::new(&master, &descriptors, 2, 1);

        let expected = queue.total_scripts();
        let mut seen = std::collections::HashSet::new();
        let mut produced = 0u64;

        while let Some(candidate) = queue.next_candidate().unwrap() {
            assert!(
                seen.insert((candidate.path.to_string(), candidate.script_type)),
                "duplicate candidate for {}",
                candidate.path
            );
            produced += 1;
        }

        assert_eq!(produced, expected);
        assert_eq!(queue.active_searches(), 0);

        for _ in 0..3 {
            assert!(queue.next_candidate().unwrap().is_none());
        }
    }
}
