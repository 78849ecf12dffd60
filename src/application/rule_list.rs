//! Rule list: a flat, three-column tree view over label rules
//!
//! Columns are fixed: Name (editable), Asset Groups and Label Rule (derived summaries).
//! Summaries are only recomputed for the primary selection while drawing, since
//! refreshing every row on every frame is too expensive for large rule sets.

use std::rc::Rc;

use tracing::{debug, instrument};

use crate::application::error::{TreeViewError, TreeViewResult};
use crate::application::render::{Rect, RenderSurface};
use crate::application::tree_view::{
    draw_row_label, CellArgs, RenameOutcome, Row, RowDelegate, TreeView,
};
use crate::config::Settings;
use crate::domain::{
    natural_cmp, ColumnState, DescribedRule, NodeId, RuleRef, TextAlignment, ViewState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleColumn {
    Name,
    AssetGroups,
    LabelRule,
}

impl RuleColumn {
    pub const ALL: [RuleColumn; 3] = [
        RuleColumn::Name,
        RuleColumn::AssetGroups,
        RuleColumn::LabelRule,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> TreeViewResult<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(TreeViewError::ColumnNotImplemented(index))
    }

    /// Default header configuration. No column sorts on header click.
    pub fn column_state(self) -> ColumnState {
        match self {
            RuleColumn::Name => ColumnState::new("Name")
                .with_width(150.0, 50.0)
                .with_auto_resize(false)
                .with_toggle_visibility(false),
            RuleColumn::AssetGroups => ColumnState::new("Asset Groups")
                .with_width(200.0, 50.0)
                .with_auto_resize(true)
                .with_toggle_visibility(true),
            RuleColumn::LabelRule => ColumnState::new("Label Rule")
                .with_width(200.0, 50.0)
                .with_auto_resize(true)
                .with_toggle_visibility(true),
        }
        .with_alignment(TextAlignment::Center)
        .with_sorting(false)
    }

    pub fn default_columns() -> Vec<ColumnState> {
        Self::ALL.iter().map(|c| c.column_state()).collect()
    }
}

/// Fresh view state with the rule list column layout.
pub fn default_state() -> ViewState {
    ViewState::with_columns(RuleColumn::default_columns())
}

/// Row hooks binding tree rows to rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleListDelegate;

impl<R: DescribedRule> RowDelegate<RuleRef<R>> for RuleListDelegate {
    fn text(&self, row: &Row<'_, RuleRef<R>>, column: usize) -> TreeViewResult<String> {
        let rule = row.payload;
        let text = match RuleColumn::from_index(column)? {
            RuleColumn::Name => rule.borrow().name().to_string(),
            RuleColumn::AssetGroups => {
                if row.primary {
                    rule.borrow_mut().refresh_group_description();
                }
                rule.borrow().group_description().to_string()
            }
            RuleColumn::LabelRule => {
                if row.primary {
                    rule.borrow_mut().refresh_provider_description();
                }
                rule.borrow().provider_description().to_string()
            }
        };
        Ok(text)
    }

    fn render_cell(
        &self,
        surface: &mut dyn RenderSurface,
        cell: &CellArgs<'_, RuleRef<R>>,
    ) -> TreeViewResult<()> {
        match RuleColumn::from_index(cell.column)? {
            RuleColumn::Name => draw_row_label(surface, cell),
            RuleColumn::AssetGroups | RuleColumn::LabelRule => {
                let text = self.text(&cell.row, cell.column)?;
                surface.label(cell.rect, &text);
            }
        }
        Ok(())
    }

    fn order_rows(
        &self,
        rows: &[Row<'_, RuleRef<R>>],
        column: usize,
        ascending: bool,
    ) -> TreeViewResult<Vec<NodeId>> {
        let mut keyed = rows
            .iter()
            .map(|row| Ok((row.id, self.text(row, column)?)))
            .collect::<TreeViewResult<Vec<(NodeId, String)>>>()?;
        if ascending {
            keyed.sort_by(|a, b| natural_cmp(&a.1, &b.1));
        } else {
            keyed.sort_by(|a, b| natural_cmp(&b.1, &a.1));
        }
        Ok(keyed.into_iter().map(|(id, _)| id).collect())
    }

    fn can_rename(&self, _row: &Row<'_, RuleRef<R>>) -> bool {
        true
    }

    fn rename_ended(&self, row: &Row<'_, RuleRef<R>>, new_name: &str) {
        row.payload.borrow_mut().set_name(new_name);
    }

    fn can_be_parent(&self, _row: &Row<'_, RuleRef<R>>) -> bool {
        false
    }
}

/// Flat list of rules backed by a shared rule collection.
pub struct RuleListView<R> {
    tree: TreeView<RuleRef<R>, RuleListDelegate>,
}

impl<R: DescribedRule> RuleListView<R> {
    /// Create a view from persisted state.
    ///
    /// A state whose column layout does not have exactly the rule list columns
    /// is replaced by the default layout.
    pub fn new(mut state: ViewState) -> Self {
        if state.columns.len() != RuleColumn::ALL.len() {
            debug!(
                "RuleListView: {} persisted columns, resetting layout",
                state.columns.len()
            );
            state.columns = RuleColumn::default_columns();
            state.sort = None;
        }
        Self {
            tree: TreeView::new(state, RuleListDelegate),
        }
    }

    pub fn from_settings(state: ViewState, settings: &Settings) -> Self {
        let view = Self::new(state);
        Self {
            tree: view
                .tree
                .with_row_height(settings.row_height)
                .with_case_sensitive_search(settings.search_case_sensitive),
        }
    }

    pub fn tree(&self) -> &TreeView<RuleRef<R>, RuleListDelegate> {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut TreeView<RuleRef<R>, RuleListDelegate> {
        &mut self.tree
    }

    pub fn state(&self) -> &ViewState {
        self.tree.state()
    }

    pub fn into_state(self) -> ViewState {
        self.tree.into_state()
    }

    /// Add a row for `rule`. Both summaries are refreshed so the new row never shows
    /// empty caches.
    #[instrument(level = "debug", skip(self, rule))]
    pub fn add_rule(&mut self, rule: RuleRef<R>, index: Option<usize>) -> NodeId {
        let name = {
            let mut r = rule.borrow_mut();
            r.refresh_provider_description();
            r.refresh_group_description();
            r.name().to_string()
        };
        self.tree.add_node(name, rule, None, index)
    }

    pub fn remove_rule(&mut self, id: NodeId) -> Option<RuleRef<R>> {
        self.tree.remove_node(id)
    }

    /// Reconcile rows with the backing collection.
    ///
    /// Rows whose rule left the collection are removed, new rules get new rows and
    /// surviving rows keep their ids. Row order follows the collection.
    #[instrument(level = "debug", skip(self, rules))]
    pub fn sync(&mut self, rules: &[RuleRef<R>]) -> TreeViewResult<()> {
        let stale: Vec<NodeId> = self
            .tree
            .arena()
            .iter()
            .filter(|n| !rules.iter().any(|r| Rc::ptr_eq(r, &n.payload)))
            .map(|n| n.id)
            .collect();
        for id in stale {
            self.tree.remove_node(id);
        }

        for (position, rule) in rules.iter().enumerate() {
            match self.find(rule) {
                Some(id) => {
                    let name = rule.borrow().name().to_string();
                    self.tree.set_label(id, name);
                    self.tree.reparent(id, None, Some(position));
                }
                None => {
                    self.add_rule(Rc::clone(rule), Some(position));
                }
            }
        }
        self.tree.reload()
    }

    /// Row bound to `rule`, compared by identity.
    pub fn find(&self, rule: &RuleRef<R>) -> Option<NodeId> {
        self.tree
            .arena()
            .iter()
            .find(|n| Rc::ptr_eq(&n.payload, rule))
            .map(|n| n.id)
    }

    /// First row, in collection order, whose rule is named `name`.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.tree
            .arena()
            .iter()
            .find(|n| n.payload.borrow().name() == name)
            .map(|n| n.id)
    }

    pub fn rule(&self, id: NodeId) -> Option<RuleRef<R>> {
        self.tree.payload(id).map(Rc::clone)
    }

    pub fn rules_in_row_order(&self) -> Vec<RuleRef<R>> {
        self.tree
            .rows()
            .iter()
            .filter_map(|&id| self.rule(id))
            .collect()
    }

    /// Rule names of the visible rows, in row order.
    pub fn names(&self) -> TreeViewResult<Vec<String>> {
        self.tree.rows_text(RuleColumn::Name.index())
    }

    pub fn reload(&mut self) -> TreeViewResult<()> {
        self.tree.reload()
    }

    pub fn sort(&mut self, column: RuleColumn, ascending: bool) -> TreeViewResult<()> {
        self.tree.sort(column.index(), ascending)
    }

    pub fn search(&mut self, query: &str) -> TreeViewResult<()> {
        self.tree.search(query)
    }

    pub fn select(&mut self, id: NodeId) -> bool {
        self.tree.select(id)
    }

    pub fn rename(&mut self, id: NodeId, name: &str) -> TreeViewResult<bool> {
        self.tree.rename(id, name)
    }

    pub fn begin_rename(&mut self, id: NodeId) -> bool {
        self.tree.begin_rename(id)
    }

    pub fn end_rename(&mut self, outcome: RenameOutcome) -> TreeViewResult<bool> {
        self.tree.end_rename(outcome)
    }

    pub fn draw(&self, surface: &mut dyn RenderSurface, rect: Rect) -> TreeViewResult<()> {
        self.tree.draw(surface, rect)
    }
}

/// Search toolbar stacked above a rule list.
pub struct RuleListPanel<R> {
    view: RuleListView<R>,
}

impl<R: DescribedRule> RuleListPanel<R> {
    pub fn new(view: RuleListView<R>) -> Self {
        Self { view }
    }

    pub fn view(&self) -> &RuleListView<R> {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut RuleListView<R> {
        &mut self.view
    }

    pub fn into_view(self) -> RuleListView<R> {
        self.view
    }

    /// Apply text typed into the search field; unchanged text is ignored.
    pub fn handle_search_input(&mut self, text: &str) -> TreeViewResult<()> {
        if self.view.state().search == text {
            return Ok(());
        }
        self.view.search(text)
    }

    pub fn do_layout(&self, surface: &mut dyn RenderSurface, rect: Rect) -> TreeViewResult<()> {
        let (toolbar, list) = rect.split_top(self.view.tree().row_height());
        surface.search_field(toolbar, &self.view.state().search);
        self.view.draw(surface, list)
    }
}
