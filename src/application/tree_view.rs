//! Generic multi-column tree view
//!
//! `TreeView` owns the nodes and the `ViewState`; everything column-specific
//! (cell text, ordering, rename policy, nesting policy) is asked of a `RowDelegate`.
//! Structural changes are not visible in `rows()` until `reload` runs.

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::error::{TreeViewError, TreeViewResult};
use crate::application::render::{Rect, RenderSurface};
use crate::domain::{NodeId, ScrollPosition, SortKey, TreeArena, TreeNode, ViewState};

pub const DEFAULT_ROW_HEIGHT: f32 = 16.0;

/// Read-only view of one node handed to the delegate.
pub struct Row<'a, P> {
    pub id: NodeId,
    pub label: &'a str,
    pub depth: usize,
    pub has_children: bool,
    pub payload: &'a P,
    pub selected: bool,
    /// First entry of the selection
    pub primary: bool,
}

impl<P> Clone for Row<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Row<'_, P> {}

/// One cell of a redraw pass.
pub struct CellArgs<'a, P> {
    pub row: Row<'a, P>,
    pub row_index: usize,
    pub column: usize,
    pub rect: Rect,
    pub renaming: bool,
}

/// Column and policy hooks of a concrete tree view.
pub trait RowDelegate<P> {
    /// Displayed text of a cell.
    fn text(&self, row: &Row<'_, P>, column: usize) -> TreeViewResult<String>;

    /// Text matched against the search query.
    fn search_text(&self, row: &Row<'_, P>, column: usize) -> TreeViewResult<String> {
        self.text(row, column)
    }

    fn render_cell(
        &self,
        surface: &mut dyn RenderSurface,
        cell: &CellArgs<'_, P>,
    ) -> TreeViewResult<()> {
        let text = self.text(&cell.row, cell.column)?;
        surface.label(cell.rect, &text);
        Ok(())
    }

    /// Total order of sibling rows by `column`. There is no default ordering.
    fn order_rows(
        &self,
        rows: &[Row<'_, P>],
        column: usize,
        ascending: bool,
    ) -> TreeViewResult<Vec<NodeId>>;

    fn can_rename(&self, row: &Row<'_, P>) -> bool;

    /// Called after an accepted rename has updated the row label.
    fn rename_ended(&self, row: &Row<'_, P>, new_name: &str);

    fn can_multi_select(&self, _row: &Row<'_, P>) -> bool {
        true
    }

    fn can_be_parent(&self, row: &Row<'_, P>) -> bool;
}

/// Draw the label cell of a row with indentation and rename affordance.
pub fn draw_row_label<P>(surface: &mut dyn RenderSurface, cell: &CellArgs<'_, P>) {
    surface.row_label(cell.rect, cell.row.label, cell.row.depth, cell.renaming);
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RenameState {
    #[default]
    Idle,
    Editing {
        id: NodeId,
        original: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Accepted(String),
    Cancelled,
}

pub struct TreeView<P, D> {
    arena: TreeArena<P>,
    state: ViewState,
    delegate: D,
    rows: Vec<NodeId>,
    rename: RenameState,
    row_height: f32,
    case_sensitive_search: bool,
}

impl<P, D: RowDelegate<P>> TreeView<P, D> {
    pub fn new(state: ViewState, delegate: D) -> Self {
        Self {
            arena: TreeArena::new(),
            state,
            delegate,
            rows: Vec::new(),
            rename: RenameState::Idle,
            row_height: DEFAULT_ROW_HEIGHT,
            case_sensitive_search: false,
        }
    }

    pub fn with_row_height(mut self, row_height: f32) -> Self {
        self.row_height = row_height.max(1.0);
        self
    }

    pub fn with_case_sensitive_search(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive_search = case_sensitive;
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn into_state(self) -> ViewState {
        self.state
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    pub fn arena(&self) -> &TreeArena<P> {
        &self.arena
    }

    pub fn row_height(&self) -> f32 {
        self.row_height
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode<P>> {
        self.arena.get(id)
    }

    pub fn payload(&self, id: NodeId) -> Option<&P> {
        self.arena.get(id).map(|n| &n.payload)
    }

    /// Rows produced by the last `reload`, in display order.
    pub fn rows(&self) -> &[NodeId] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, id: NodeId) -> Option<Row<'_, P>> {
        let node = self.arena.get(id)?;
        Some(Row {
            id,
            label: &node.label,
            depth: node.depth,
            has_children: !node.children.is_empty(),
            payload: &node.payload,
            selected: self.state.selection.contains(&id),
            primary: self.state.primary_selection() == Some(id),
        })
    }

    /// Add a node under `parent` at `index`.
    ///
    /// Unknown parents and parents the delegate refuses fall back to the root;
    /// a missing or out-of-range index appends.
    #[instrument(level = "debug", skip(self, label, payload))]
    pub fn add_node(
        &mut self,
        label: impl Into<String>,
        payload: P,
        parent: Option<NodeId>,
        index: Option<usize>,
    ) -> NodeId {
        let parent = parent.filter(|&p| match self.row(p) {
            Some(row) => self.delegate.can_be_parent(&row),
            None => false,
        });
        self.arena.insert(label, payload, parent, index)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn remove_node(&mut self, id: NodeId) -> Option<P> {
        if matches!(self.rename, RenameState::Editing { id: editing, .. } if editing == id) {
            self.rename = RenameState::Idle;
        }
        let payload = self.arena.remove(id);
        if payload.is_none() {
            debug!("remove_node: unknown node {}", id);
        }
        payload
    }

    /// Replace a row label without going through the rename gesture.
    pub fn set_label(&mut self, id: NodeId, label: impl Into<String>) -> bool {
        match self.arena.get_mut(id) {
            Some(node) => {
                node.label = label.into();
                true
            }
            None => {
                debug!("set_label: unknown node {}", id);
                false
            }
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn reparent(&mut self, id: NodeId, parent: Option<NodeId>, index: Option<usize>) -> bool {
        if let Some(p) = parent {
            let allowed = self
                .row(p)
                .map(|row| self.delegate.can_be_parent(&row))
                .unwrap_or(false);
            if !allowed {
                debug!("reparent: {} cannot take children", p);
                return false;
            }
        }
        self.arena.reparent(id, parent, index)
    }

    /// Re-derive the row list from the current nodes.
    ///
    /// Keeps selection and expansion for ids that still exist and drops the rest.
    #[instrument(level = "debug", skip(self))]
    pub fn reload(&mut self) -> TreeViewResult<()> {
        let arena = &self.arena;
        self.state.retain_known(|id| arena.contains(id));
        if let RenameState::Editing { id, .. } = self.rename {
            if !self.arena.contains(id) {
                self.rename = RenameState::Idle;
            }
        }
        self.rows = self.collect_rows()?;
        debug!(
            "reload: {} rows of {} nodes",
            self.rows.len(),
            self.arena.len()
        );
        Ok(())
    }

    fn collect_rows(&self) -> TreeViewResult<Vec<NodeId>> {
        // A search shows every matching node as a flat list, regardless of expansion.
        let searching = !self.state.search.is_empty();
        let mut rows = Vec::new();
        let mut stack: Vec<NodeId> = self.ordered(self.arena.roots())?;
        stack.reverse();

        while let Some(id) = stack.pop() {
            let Some(node) = self.arena.get(id) else {
                continue;
            };
            if !searching || self.matches_search(id)? {
                rows.push(id);
            }
            if searching || self.is_expanded(id) {
                let mut children = self.ordered(&node.children)?;
                children.reverse();
                stack.extend(children);
            }
        }
        Ok(rows)
    }

    fn ordered(&self, ids: &[NodeId]) -> TreeViewResult<Vec<NodeId>> {
        let Some(SortKey { column, ascending }) = self.state.sort else {
            return Ok(ids.to_vec());
        };
        if column >= self.state.columns.len() {
            return Err(TreeViewError::ColumnNotImplemented(column));
        }
        let rows: Vec<Row<'_, P>> = ids.iter().filter_map(|&id| self.row(id)).collect();
        self.delegate.order_rows(&rows, column, ascending)
    }

    fn matches_search(&self, id: NodeId) -> TreeViewResult<bool> {
        let Some(row) = self.row(id) else {
            return Ok(false);
        };
        let query = self.normalize(&self.state.search);
        for column in self.state.visible_columns() {
            let text = self.delegate.search_text(&row, column)?;
            if self.normalize(&text).contains(&query) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn normalize(&self, text: &str) -> String {
        if self.case_sensitive_search {
            text.to_string()
        } else {
            text.to_lowercase()
        }
    }

    /// Filter rows to those whose visible columns contain `query`. Empty shows all.
    #[instrument(level = "debug", skip(self))]
    pub fn search(&mut self, query: &str) -> TreeViewResult<()> {
        self.state.search = query.to_string();
        self.reload()
    }

    /// Order rows by `column`. Sibling order is recomputed by every later `reload`.
    #[instrument(level = "debug", skip(self))]
    pub fn sort(&mut self, column: usize, ascending: bool) -> TreeViewResult<()> {
        if column >= self.state.columns.len() {
            return Err(TreeViewError::ColumnNotImplemented(column));
        }
        self.state.sort = Some(SortKey { column, ascending });
        self.reload()
    }

    pub fn clear_sort(&mut self) -> TreeViewResult<()> {
        self.state.sort = None;
        self.reload()
    }

    /// Header click: sorts only columns that allow it, toggling direction on repeat clicks.
    pub fn header_click(&mut self, column: usize) -> TreeViewResult<bool> {
        let can_sort = self
            .state
            .columns
            .get(column)
            .map(|c| c.can_sort)
            .ok_or(TreeViewError::ColumnNotImplemented(column))?;
        if !can_sort {
            return Ok(false);
        }
        let ascending = match self.state.sort {
            Some(SortKey {
                column: current,
                ascending,
            }) if current == column => !ascending,
            _ => true,
        };
        self.sort(column, ascending)?;
        Ok(true)
    }

    /// Replace the selection; unknown ids are dropped.
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = NodeId>) -> &[NodeId] {
        let mut ids: Vec<NodeId> = ids
            .into_iter()
            .filter(|&id| self.arena.contains(id))
            .unique()
            .collect();
        if ids.len() > 1 {
            let refuses = ids
                .iter()
                .filter_map(|&id| self.row(id))
                .any(|row| !self.delegate.can_multi_select(&row));
            if refuses {
                ids.truncate(1);
            }
        }
        self.state.selection = ids;
        &self.state.selection
    }

    pub fn select(&mut self, id: NodeId) -> bool {
        !self.set_selection([id]).is_empty()
    }

    pub fn clear_selection(&mut self) {
        self.state.selection.clear();
    }

    pub fn selection(&self) -> &[NodeId] {
        &self.state.selection
    }

    pub fn primary_selection(&self) -> Option<NodeId> {
        self.state.primary_selection()
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.state.expanded.contains(&id)
    }

    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) -> bool {
        if !self.arena.contains(id) {
            debug!("set_expanded: unknown node {}", id);
            return false;
        }
        self.state.expanded.retain(|&e| e != id);
        if expanded {
            self.state.expanded.push(id);
        }
        true
    }

    pub fn expand_all(&mut self) {
        self.state.expanded = self
            .arena
            .iter()
            .filter(|n| !n.children.is_empty())
            .map(|n| n.id)
            .collect();
    }

    pub fn scroll(&self) -> ScrollPosition {
        self.state.scroll
    }

    pub fn set_scroll(&mut self, position: ScrollPosition) {
        self.state.scroll = ScrollPosition {
            x: position.x.max(0.0),
            y: position.y.max(0.0),
        };
    }

    /// Show or hide a column; columns that disallow toggling are left alone.
    pub fn set_column_visible(&mut self, column: usize, visible: bool) -> TreeViewResult<bool> {
        let state = self
            .state
            .columns
            .get_mut(column)
            .ok_or(TreeViewError::ColumnNotImplemented(column))?;
        if !state.allow_toggle_visibility {
            return Ok(false);
        }
        state.visible = visible;
        Ok(true)
    }

    pub fn is_renaming(&self, id: NodeId) -> bool {
        matches!(self.rename, RenameState::Editing { id: editing, .. } if editing == id)
    }

    pub fn rename_state(&self) -> &RenameState {
        &self.rename
    }

    /// Enter the rename gesture for `id` if the delegate allows it.
    pub fn begin_rename(&mut self, id: NodeId) -> bool {
        let original = match self.row(id) {
            Some(row) if self.delegate.can_rename(&row) => row.label.to_string(),
            Some(_) => return false,
            None => {
                debug!("begin_rename: unknown node {}", id);
                return false;
            }
        };
        self.rename = RenameState::Editing { id, original };
        true
    }

    /// Leave the rename gesture. Returns true when a rename was applied.
    #[instrument(level = "debug", skip(self))]
    pub fn end_rename(&mut self, outcome: RenameOutcome) -> TreeViewResult<bool> {
        let RenameState::Editing { id, original } = std::mem::take(&mut self.rename) else {
            debug!("end_rename: no rename in progress");
            return Ok(false);
        };
        let RenameOutcome::Accepted(name) = outcome else {
            debug!("end_rename: cancelled, keeping {:?}", original);
            return Ok(false);
        };
        let allowed = match self.row(id) {
            Some(row) => self.delegate.can_rename(&row),
            None => {
                debug!("end_rename: node {} is gone", id);
                return Ok(false);
            }
        };
        if !allowed {
            return Ok(false);
        }

        if let Some(node) = self.arena.get_mut(id) {
            node.label = name.clone();
        }
        if let Some(row) = self.row(id) {
            self.delegate.rename_ended(&row, &name);
        }
        self.reload()?;
        Ok(true)
    }

    /// Begin and accept a rename in one step.
    pub fn rename(&mut self, id: NodeId, name: &str) -> TreeViewResult<bool> {
        if !self.begin_rename(id) {
            return Ok(false);
        }
        self.end_rename(RenameOutcome::Accepted(name.to_string()))
    }

    /// Displayed text of `column` for every row, in row order.
    pub fn rows_text(&self, column: usize) -> TreeViewResult<Vec<String>> {
        self.rows
            .iter()
            .filter_map(|&id| self.row(id))
            .map(|row| self.delegate.text(&row, column))
            .collect()
    }

    /// Visible columns with their x offset and width inside `rect`.
    ///
    /// Spare width is shared between auto-resize columns.
    pub fn column_layout(&self, rect: Rect) -> Vec<(usize, f32, f32)> {
        let visible = self.state.visible_columns();
        let fixed: f32 = visible.iter().map(|&c| self.state.columns[c].width).sum();
        let auto = visible
            .iter()
            .filter(|&&c| self.state.columns[c].auto_resize)
            .count();
        let spare = if auto > 0 {
            ((rect.width - fixed) / auto as f32).max(0.0)
        } else {
            0.0
        };

        let mut x = rect.x;
        visible
            .into_iter()
            .map(|c| {
                let column = &self.state.columns[c];
                let mut width = column.width;
                if column.auto_resize {
                    width += spare;
                }
                let width = width.max(column.min_width);
                let entry = (c, x, width);
                x += width;
                entry
            })
            .collect()
    }

    /// One redraw pass: header, then the rows inside the scrolled viewport.
    pub fn draw(&self, surface: &mut dyn RenderSurface, rect: Rect) -> TreeViewResult<()> {
        let layout = self.column_layout(rect);
        let (header, body) = rect.split_top(self.row_height);
        for &(column, x, width) in &layout {
            let state = &self.state.columns[column];
            surface.header(
                Rect::new(x, header.y, width, header.height),
                &state.label,
                state.alignment,
            );
        }

        let first = (self.state.scroll.y / self.row_height).floor() as usize;
        let capacity = (body.height / self.row_height).ceil() as usize;
        for (offset, (index, &id)) in self
            .rows
            .iter()
            .enumerate()
            .skip(first)
            .take(capacity)
            .enumerate()
        {
            let Some(row) = self.row(id) else {
                continue;
            };
            let y = body.y + offset as f32 * self.row_height;
            surface.row_background(
                Rect::new(body.x, y, body.width, self.row_height),
                index,
                row.selected,
            );
            for &(column, x, width) in &layout {
                let cell = CellArgs {
                    row,
                    row_index: index,
                    column,
                    rect: Rect::new(x, y, width, self.row_height),
                    renaming: self.is_renaming(id),
                };
                self.delegate.render_cell(surface, &cell)?;
            }
        }
        Ok(())
    }
}
