//! Rule collection persistence
//!
//! Rules live in a TOML file as an array of `[[rules]]` tables.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{rule_ref, DomainError, LabelRule, RuleRef};
use crate::infrastructure::traits::FileSystem;

#[derive(Debug, Default, Serialize, Deserialize)]
struct RulesFile {
    #[serde(default)]
    rules: Vec<LabelRule>,
}

/// Service for loading and saving label rule collections.
pub struct RuleService {
    fs: Arc<dyn FileSystem>,
}

impl RuleService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load all rules from `path`. A missing file is an empty collection.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Vec<RuleRef<LabelRule>>> {
        if !self.fs.exists(path) {
            debug!("load: no rules file at {}", path.display());
            return Ok(Vec::new());
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read rules", path)?;
        let rules = Self::parse(&content)?;
        debug!("load: {} rules from {}", rules.len(), path.display());
        Ok(rules.into_iter().map(rule_ref).collect())
    }

    /// Parse rules file content. Every rule must have a name.
    pub fn parse(content: &str) -> ApplicationResult<Vec<LabelRule>> {
        let file: RulesFile = toml::from_str(content).map_err(|e| DomainError::InvalidRules {
            message: e.to_string(),
        })?;
        if file.rules.iter().any(|r| r.name.trim().is_empty()) {
            return Err(DomainError::EmptyRuleName.into());
        }
        Ok(file.rules)
    }

    /// Write rules to `path` in the given order, creating parent directories.
    #[instrument(level = "debug", skip(self, rules))]
    pub fn save(&self, path: &Path, rules: &[RuleRef<LabelRule>]) -> ApplicationResult<()> {
        let file = RulesFile {
            rules: rules.iter().map(|r| r.borrow().clone()).collect(),
        };
        let content = toml::to_string_pretty(&file).map_err(|e| DomainError::InvalidRules {
            message: e.to_string(),
        })?;
        self.fs
            .ensure_parent(path)
            .with_path_context("create directory for", path)?;
        self.fs
            .write(path, &content)
            .with_path_context("write rules", path)?;
        debug!("save: {} rules to {}", rules.len(), path.display());
        Ok(())
    }
}
