//! View state persistence

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::rule_list::{default_state, RuleColumn};
use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::ViewState;
use crate::infrastructure::traits::FileSystem;

/// Service for loading and saving the rule list's `ViewState`.
pub struct StateService {
    fs: Arc<dyn FileSystem>,
}

impl StateService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Load state from `path`.
    ///
    /// A missing file yields the default rule list state. A state with a different
    /// column count keeps its selection and scroll but gets the default columns.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<ViewState> {
        if !self.fs.exists(path) {
            debug!("load: no state at {}", path.display());
            return Ok(default_state());
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read view state", path)?;
        let mut state = ViewState::from_toml(&content)?;
        if state.columns.len() != RuleColumn::ALL.len() {
            debug!(
                "load: {} columns in {}, using default layout",
                state.columns.len(),
                path.display()
            );
            state.columns = RuleColumn::default_columns();
            state.sort = None;
        }
        Ok(state)
    }

    #[instrument(level = "debug", skip(self, state))]
    pub fn save(&self, path: &Path, state: &ViewState) -> ApplicationResult<()> {
        let content = state.to_toml()?;
        self.fs
            .ensure_parent(path)
            .with_path_context("create directory for", path)?;
        self.fs
            .write(path, &content)
            .with_path_context("write view state", path)
    }

    /// Delete persisted state. Returns false when there was nothing to delete.
    pub fn reset(&self, path: &Path) -> ApplicationResult<bool> {
        if !self.fs.exists(path) {
            return Ok(false);
        }
        self.fs
            .remove_file(path)
            .with_path_context("remove view state", path)?;
        Ok(true)
    }
}
