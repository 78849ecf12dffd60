//! Serializable per-view UI state: selection, scroll, expansion and column layout

use serde::{Deserialize, Serialize};

use crate::domain::arena::NodeId;
use crate::domain::error::DomainError;

/// Horizontal alignment of a column header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Layout and behavior of one list column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnState {
    pub label: String,
    pub alignment: TextAlignment,
    pub width: f32,
    pub min_width: f32,
    /// Column absorbs spare width when the view is resized
    pub auto_resize: bool,
    /// User may hide the column from the header context menu
    pub allow_toggle_visibility: bool,
    /// Header click sorts by this column
    pub can_sort: bool,
    pub visible: bool,
}

impl Default for ColumnState {
    fn default() -> Self {
        Self {
            label: String::new(),
            alignment: TextAlignment::Left,
            width: 100.0,
            min_width: 20.0,
            auto_resize: false,
            allow_toggle_visibility: true,
            can_sort: true,
            visible: true,
        }
    }
}

impl ColumnState {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_alignment(mut self, alignment: TextAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_width(mut self, width: f32, min_width: f32) -> Self {
        self.min_width = min_width;
        self.width = width.max(min_width);
        self
    }

    pub fn with_auto_resize(mut self, auto_resize: bool) -> Self {
        self.auto_resize = auto_resize;
        self
    }

    pub fn with_toggle_visibility(mut self, allow: bool) -> Self {
        self.allow_toggle_visibility = allow;
        self
    }

    pub fn with_sorting(mut self, can_sort: bool) -> Self {
        self.can_sort = can_sort;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollPosition {
    pub x: f32,
    pub y: f32,
}

/// Active sort order of the row list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: usize,
    pub ascending: bool,
}

/// UI state of one tree view.
///
/// Owned exclusively by one view: moved in at construction, moved out with
/// `TreeView::into_state`, persisted with `to_toml`/`from_toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewState {
    pub search: String,
    /// Selected rows; the first entry is the primary selection
    pub selection: Vec<NodeId>,
    pub expanded: Vec<NodeId>,
    pub scroll: ScrollPosition,
    pub sort: Option<SortKey>,
    pub columns: Vec<ColumnState>,
}

impl ViewState {
    pub fn with_columns(columns: Vec<ColumnState>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    pub fn primary_selection(&self) -> Option<NodeId> {
        self.selection.first().copied()
    }

    /// Indices of visible columns, in display order.
    pub fn visible_columns(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.visible)
            .map(|(i, _)| i)
            .collect()
    }

    /// Drop selection and expansion entries rejected by `exists`.
    pub fn retain_known(&mut self, exists: impl Fn(NodeId) -> bool) {
        self.selection.retain(|&id| exists(id));
        self.expanded.retain(|&id| exists(id));
    }

    pub fn to_toml(&self) -> Result<String, DomainError> {
        toml::to_string_pretty(self).map_err(|e| DomainError::InvalidState {
            message: e.to_string(),
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, DomainError> {
        toml::from_str(content).map_err(|e| DomainError::InvalidState {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_width_clamps_to_min_width() {
        let column = ColumnState::new("Name").with_width(10.0, 50.0);
        assert_eq!(column.width, 50.0);
    }

    #[test]
    fn test_retain_known_prunes_selection_and_expansion() {
        let mut state = ViewState {
            selection: vec![NodeId(3), NodeId(1)],
            expanded: vec![NodeId(1), NodeId(2)],
            ..ViewState::default()
        };
        state.retain_known(|id| id != NodeId(3) && id != NodeId(2));
        assert_eq!(state.selection, vec![NodeId(1)]);
        assert_eq!(state.expanded, vec![NodeId(1)]);
        assert_eq!(state.primary_selection(), Some(NodeId(1)));
    }
}
