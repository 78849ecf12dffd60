//! Application layer: tree views, rule list and services
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod render;
pub mod rule_list;
pub mod services;
pub mod tree_view;

pub use error::{ApplicationError, ApplicationResult, TreeViewError, TreeViewResult};
pub use error_ext::IoResultExt;
pub use render::{Rect, RenderSurface, TextSurface};
pub use rule_list::{default_state, RuleColumn, RuleListDelegate, RuleListPanel, RuleListView};
pub use tree_view::{CellArgs, RenameOutcome, RenameState, Row, RowDelegate, TreeView};
