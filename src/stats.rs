//! Search plan reporting module

use crate::descriptor::Descriptor;
use crate::script::ScriptType;
use crate::search::DescriptorSearch;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One (template, script type) search in the plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanEntry {
    /// Path template pattern
    pub pattern: String,
    /// Script type tried for this pattern
    pub script_type: ScriptType,
    /// Number of scripts the search will produce
    pub total_scripts: u64,
}

/// Summary of the full search space for a recovery run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPlan {
    /// Highest address index tried for free-index templates
    pub max_index: u32,
    /// Highest account tried for free-account templates
    pub max_account: u32,
    /// Per-search breakdown
    pub entries: Vec<PlanEntry>,
    /// Total number of candidate scripts
    pub total_scripts: u64,
}

impl SearchPlan {
    /// Generate the plan for a descriptor catalog and grid bounds
    pub fn generate(descriptors: &[Descriptor], max_index: u32, max_account: u32) -> Self {
        let mut entries = Vec::new();
        for descriptor in descriptors {
            for &script_type in descriptor.script_types {
                let search = DescriptorSearch::new(
                    descriptor.template.clone(),
                    script_type,
                    max_index,
                    max_account,
                );
                entries.push(PlanEntry {
                    pattern: descriptor.template.to_string(),
                    script_type,
                    total_scripts: search.total_scripts(),
                });
            }
        }

        let total_scripts = entries.iter().map(|e| e.total_scripts).sum();

        SearchPlan {
            max_index,
            max_account,
            entries,
            total_scripts,
        }
    }

    /// Save the plan to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
