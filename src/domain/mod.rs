//! Domain layer: tree storage, view state and rule entities
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod error;
pub mod natural;
pub mod rule;
pub mod state;

pub use arena::{NodeId, TreeArena, TreeNode};
pub use error::DomainError;
pub use natural::natural_cmp;
pub use rule::{rule_ref, DescribedRule, LabelProvider, LabelRule, RuleRef};
pub use state::{ColumnState, ScrollPosition, SortKey, TextAlignment, ViewState};
