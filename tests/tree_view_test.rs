//! Tests for the generic TreeView container with a nesting-capable delegate

use std::collections::HashSet;

use ruletree::application::{
    Rect, RenameOutcome, RenameState, Row, RowDelegate, TextSurface, TreeView, TreeViewError,
    TreeViewResult,
};
use ruletree::domain::{ColumnState, NodeId, ScrollPosition, ViewState};
use ruletree::util::testing;

/// Two columns: the row label and the payload text.
struct Outline;

impl RowDelegate<String> for Outline {
    fn text(&self, row: &Row<'_, String>, column: usize) -> TreeViewResult<String> {
        match column {
            0 => Ok(row.label.to_string()),
            1 => Ok(row.payload.clone()),
            _ => Err(TreeViewError::ColumnNotImplemented(column)),
        }
    }

    fn order_rows(
        &self,
        rows: &[Row<'_, String>],
        column: usize,
        ascending: bool,
    ) -> TreeViewResult<Vec<NodeId>> {
        let mut keyed = rows
            .iter()
            .map(|row| Ok((row.id, self.text(row, column)?)))
            .collect::<TreeViewResult<Vec<_>>>()?;
        keyed.sort_by(|a, b| a.1.cmp(&b.1));
        if !ascending {
            keyed.reverse();
        }
        Ok(keyed.into_iter().map(|(id, _)| id).collect())
    }

    fn can_rename(&self, row: &Row<'_, String>) -> bool {
        row.label != "locked"
    }

    fn rename_ended(&self, _row: &Row<'_, String>, _new_name: &str) {}

    fn can_multi_select(&self, row: &Row<'_, String>) -> bool {
        row.payload != "single"
    }

    fn can_be_parent(&self, _row: &Row<'_, String>) -> bool {
        true
    }
}

fn state(columns: usize) -> ViewState {
    ViewState::with_columns(
        (0..columns)
            .map(|i| ColumnState::new(format!("c{}", i)))
            .collect(),
    )
}

fn view() -> TreeView<String, Outline> {
    testing::init_test_setup();
    TreeView::new(state(2), Outline)
}

fn labels(view: &TreeView<String, Outline>) -> Vec<String> {
    view.rows_text(0).unwrap()
}

// root
// ├── fruit
// │   ├── apple
// │   └── pear
// └── vegetable
fn produce() -> (TreeView<String, Outline>, NodeId, NodeId, NodeId, NodeId) {
    let mut view = view();
    let fruit = view.add_node("fruit", "category".into(), None, None);
    let apple = view.add_node("apple", "red".into(), Some(fruit), None);
    let pear = view.add_node("pear", "green".into(), Some(fruit), None);
    let vegetable = view.add_node("vegetable", "category".into(), None, None);
    view.reload().unwrap();
    (view, fruit, apple, pear, vegetable)
}

// ============================================================
// Identifiers
// ============================================================

#[test]
fn given_many_adds_when_reloading_then_ids_are_unique_and_stable() {
    let mut view = view();
    let mut ids = Vec::new();
    for i in 0..40 {
        let parent = if i % 3 == 0 { None } else { ids.last().copied() };
        ids.push(view.add_node(format!("n{}", i), String::new(), parent, None));
    }
    let unique: HashSet<NodeId> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());

    let before: Vec<(NodeId, String)> = ids
        .iter()
        .map(|&id| (id, view.node(id).unwrap().label.clone()))
        .collect();
    view.reload().unwrap();
    view.expand_all();
    view.reload().unwrap();
    for (id, label) in before {
        assert_eq!(view.node(id).unwrap().label, label);
    }
    assert_eq!(view.row_count(), 40);
}

#[test]
fn given_removed_node_when_adding_then_id_is_not_reused() {
    let mut view = view();
    let a = view.add_node("a", String::new(), None, None);
    view.remove_node(a);
    let b = view.add_node("b", String::new(), None, None);
    assert_ne!(a, b);
    assert!(b > a);
}

// ============================================================
// Structure and reload
// ============================================================

#[test]
fn given_collapsed_parent_when_reloading_then_children_are_hidden() {
    let (mut view, fruit, _, _, _) = produce();
    assert_eq!(labels(&view), vec!["fruit", "vegetable"]);

    assert!(view.set_expanded(fruit, true));
    view.reload().unwrap();
    assert_eq!(labels(&view), vec!["fruit", "apple", "pear", "vegetable"]);
    assert_eq!(view.node(fruit).unwrap().depth, 0);
}

#[test]
fn given_add_without_reload_when_reading_rows_then_rows_are_unchanged() {
    let (mut view, _, _, _, _) = produce();
    view.add_node("grain", String::new(), None, Some(0));
    assert_eq!(labels(&view), vec!["fruit", "vegetable"]);

    view.reload().unwrap();
    assert_eq!(labels(&view), vec!["grain", "fruit", "vegetable"]);
}

#[test]
fn given_removed_node_when_reloading_then_selection_and_expansion_are_pruned() {
    let (mut view, fruit, _, _, vegetable) = produce();
    view.set_selection([fruit, vegetable]);
    view.set_expanded(fruit, true);

    view.remove_node(fruit);
    assert_eq!(view.selection(), &[fruit, vegetable]);

    view.reload().unwrap();
    assert_eq!(view.selection(), &[vegetable]);
    assert!(view.state().expanded.is_empty());
    assert_eq!(labels(&view), vec!["vegetable"]);
}

#[test]
fn given_reparent_when_moving_below_own_child_then_refused() {
    let (mut view, fruit, apple, _, vegetable) = produce();
    assert!(!view.reparent(fruit, Some(apple), None));
    assert!(view.reparent(apple, Some(vegetable), Some(0)));
    assert_eq!(view.node(apple).unwrap().parent, Some(vegetable));
    assert_eq!(view.node(vegetable).unwrap().children, vec![apple]);
}

#[test]
fn given_stale_ids_when_operating_then_everything_is_a_no_op() {
    let (mut view, _, _, _, _) = produce();
    let ghost = NodeId(999);

    assert_eq!(view.rename(ghost, "x"), Ok(false));
    assert!(!view.set_expanded(ghost, true));
    assert!(view.remove_node(ghost).is_none());
    assert!(!view.reparent(ghost, None, None));
    assert!(!view.set_label(ghost, "x"));
    assert!(view.set_selection([ghost]).is_empty());
    assert_eq!(labels(&view), vec!["fruit", "vegetable"]);
}

// ============================================================
// Rename protocol
// ============================================================

#[test]
fn given_cancelled_rename_when_ending_then_label_is_unchanged() {
    let (mut view, fruit, _, _, _) = produce();
    assert!(view.begin_rename(fruit));
    assert!(view.is_renaming(fruit));

    assert_eq!(view.end_rename(RenameOutcome::Cancelled), Ok(false));
    assert_eq!(view.node(fruit).unwrap().label, "fruit");
    assert_eq!(view.rename_state(), &RenameState::Idle);
}

#[test]
fn given_accepted_rename_when_ending_then_label_changes_and_rows_reload() {
    let (mut view, fruit, _, _, _) = produce();
    assert!(view.begin_rename(fruit));
    assert_eq!(
        view.end_rename(RenameOutcome::Accepted("berries".into())),
        Ok(true)
    );
    assert_eq!(labels(&view), vec!["berries", "vegetable"]);
}

#[test]
fn given_locked_row_when_beginning_rename_then_refused() {
    let mut view = view();
    let locked = view.add_node("locked", String::new(), None, None);
    assert!(!view.begin_rename(locked));
    assert_eq!(view.rename(locked, "open"), Ok(false));
    assert_eq!(view.node(locked).unwrap().label, "locked");
}

#[test]
fn given_rename_target_removed_when_accepting_then_no_op() {
    let (mut view, fruit, _, _, _) = produce();
    assert!(view.begin_rename(fruit));
    view.remove_node(fruit);
    assert_eq!(
        view.end_rename(RenameOutcome::Accepted("late".into())),
        Ok(false)
    );
    assert_eq!(view.rename_state(), &RenameState::Idle);
}

// ============================================================
// Search and sort
// ============================================================

#[test]
fn given_query_when_searching_then_matches_are_listed_flat_regardless_of_expansion() {
    let (mut view, _, _, _, _) = produce();
    view.search("APP").unwrap();
    assert_eq!(labels(&view), vec!["apple"]);

    view.search("category").unwrap();
    assert_eq!(labels(&view), vec!["fruit", "vegetable"]);

    view.search("").unwrap();
    assert_eq!(labels(&view), vec!["fruit", "vegetable"]);
}

#[test]
fn given_hidden_column_when_searching_then_its_text_is_ignored() {
    let (mut view, _, _, _, _) = produce();
    assert_eq!(view.set_column_visible(1, false), Ok(true));
    view.search("green").unwrap();
    assert!(labels(&view).is_empty());

    view.set_column_visible(1, true).unwrap();
    view.search("green").unwrap();
    assert_eq!(labels(&view), vec!["pear"]);
}

#[test]
fn given_sort_when_reloading_then_siblings_are_ordered_per_level() {
    let (mut view, fruit, _, _, _) = produce();
    view.set_expanded(fruit, true);
    view.sort(0, false).unwrap();
    assert_eq!(labels(&view), vec!["vegetable", "fruit", "pear", "apple"]);

    view.add_node("zucchini", String::new(), None, None);
    view.reload().unwrap();
    assert_eq!(labels(&view)[0], "zucchini");

    view.clear_sort().unwrap();
    assert_eq!(labels(&view)[0], "fruit");
}

#[test]
fn given_unknown_sort_column_when_sorting_then_column_not_implemented() {
    let (mut view, _, _, _, _) = produce();
    assert_eq!(
        view.sort(5, true),
        Err(TreeViewError::ColumnNotImplemented(5))
    );
    assert!(view.state().sort.is_none());
}

#[test]
fn given_more_columns_than_delegate_handles_when_searching_then_error_surfaces() {
    testing::init_test_setup();
    let mut view = TreeView::new(state(3), Outline);
    view.add_node("a", String::new(), None, None);
    assert_eq!(
        view.search("zzz"),
        Err(TreeViewError::ColumnNotImplemented(2))
    );
}

#[test]
fn given_header_click_when_column_is_sortable_then_direction_toggles() {
    let (mut view, _, _, _, _) = produce();
    assert_eq!(view.header_click(0), Ok(true));
    assert_eq!(view.state().sort.map(|s| s.ascending), Some(true));
    assert_eq!(view.header_click(0), Ok(true));
    assert_eq!(view.state().sort.map(|s| s.ascending), Some(false));
    assert_eq!(labels(&view), vec!["vegetable", "fruit"]);
}

#[test]
fn given_header_click_when_column_disallows_sorting_then_ignored() {
    testing::init_test_setup();
    let mut state = state(2);
    state.columns[1].can_sort = false;
    state.columns[1].allow_toggle_visibility = false;
    let mut view = TreeView::new(state, Outline);

    assert_eq!(view.header_click(1), Ok(false));
    assert!(view.state().sort.is_none());
    assert_eq!(view.set_column_visible(1, false), Ok(false));
    assert!(view.state().columns[1].visible);
    assert_eq!(
        view.header_click(9),
        Err(TreeViewError::ColumnNotImplemented(9))
    );
}

// ============================================================
// Selection, scroll and drawing
// ============================================================

#[test]
fn given_row_refusing_multi_select_when_selecting_many_then_only_first_is_kept() {
    let mut view = view();
    let a = view.add_node("a", "single".into(), None, None);
    let b = view.add_node("b", String::new(), None, None);
    let c = view.add_node("c", String::new(), None, None);

    assert_eq!(view.set_selection([b, c, b]), &[b, c]);
    assert_eq!(view.primary_selection(), Some(b));
    assert_eq!(view.set_selection([b, a]), &[b]);
}

#[test]
fn given_scrolled_view_when_drawing_then_only_rows_in_viewport_are_drawn() {
    let mut view = view();
    for i in 0..10 {
        view.add_node(format!("n{}", i), String::new(), None, None);
    }
    view.reload().unwrap();
    view.set_scroll(ScrollPosition { x: 0.0, y: 32.0 });

    let mut surface = TextSurface::new();
    view.draw(&mut surface, Rect::new(0.0, 0.0, 400.0, 64.0))
        .unwrap();

    let lines = surface.lines();
    assert_eq!(lines.len(), 4, "header plus three rows: {:?}", lines);
    assert!(lines[0].contains("c0"));
    assert!(lines[1].contains("n2"));
    assert!(lines[3].contains("n4"));
}
