//! Layout rules bound to list rows

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Shared handle to a rule; the backing collection and the list rows point at the same rule.
pub type RuleRef<R> = Rc<RefCell<R>>;

pub fn rule_ref<R>(rule: R) -> RuleRef<R> {
    Rc::new(RefCell::new(rule))
}

/// Contract a rule must satisfy to be shown in a rule list.
///
/// Descriptions are expensive to derive, so they are cached and only recomputed on an
/// explicit refresh. The getters never refresh: they return the last refreshed value,
/// which is empty before the first refresh and may be stale afterwards.
pub trait DescribedRule {
    fn name(&self) -> &str;

    fn set_name(&mut self, name: &str);

    /// Recompute the asset group summary. Idempotent.
    fn refresh_group_description(&mut self);

    /// Recompute the label provider summary. Idempotent.
    fn refresh_provider_description(&mut self);

    fn group_description(&self) -> &str;

    fn provider_description(&self) -> &str;
}

/// How a label rule derives the labels it assigns.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LabelProvider {
    #[default]
    None,
    Constant {
        label: String,
    },
    FileName,
    DirectoryName,
}

impl LabelProvider {
    pub fn describe(&self) -> String {
        match self {
            LabelProvider::None => "(None)".to_string(),
            LabelProvider::Constant { label } => format!("Constant: {}", label),
            LabelProvider::FileName => "File Name".to_string(),
            LabelProvider::DirectoryName => "Directory Name".to_string(),
        }
    }
}

/// A rule attaching labels to the assets of one or more asset groups.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LabelRule {
    pub name: String,
    #[serde(default)]
    pub asset_groups: Vec<String>,
    #[serde(default)]
    pub provider: LabelProvider,
    #[serde(skip)]
    group_description: String,
    #[serde(skip)]
    provider_description: String,
}

impl LabelRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.asset_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_provider(mut self, provider: LabelProvider) -> Self {
        self.provider = provider;
        self
    }
}

impl DescribedRule for LabelRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    fn refresh_group_description(&mut self) {
        self.group_description = if self.asset_groups.is_empty() {
            "(None)".to_string()
        } else {
            self.asset_groups.join(", ")
        };
    }

    fn refresh_provider_description(&mut self) {
        self.provider_description = self.provider.describe();
    }

    fn group_description(&self) -> &str {
        &self.group_description
    }

    fn provider_description(&self) -> &str {
        &self.provider_description
    }
}
