//! End-to-end tests of the command handlers against temp rule and state files

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use tempfile::TempDir;

use ruletree::application::services::{RuleService, StateService};
use ruletree::application::RuleListView;
use ruletree::cli::args::Cli;
use ruletree::cli::commands::execute_command;
use ruletree::cli::CliResult;
use ruletree::exitcode;
use ruletree::infrastructure::traits::RealFileSystem;
use ruletree::util::testing;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        testing::init_test_setup();
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn rules_path(&self) -> PathBuf {
        self.dir.path().join("rules.toml")
    }

    fn state_path(&self) -> PathBuf {
        self.dir.path().join("state/view.toml")
    }

    fn run(&self, args: &[&str]) -> CliResult<()> {
        let rules = self.rules_path();
        let state = self.state_path();
        let mut argv: Vec<&str> = vec!["ruletree"];
        argv.extend(["-r", path_str(&rules), "-s", path_str(&state)]);
        argv.extend(["-C", path_str(self.dir.path())]);
        argv.extend(args);
        let cli = Cli::try_parse_from(argv).expect("parse args");
        execute_command(&cli)
    }

    fn names(&self) -> Vec<String> {
        let service = RuleService::new(std::sync::Arc::new(RealFileSystem));
        service
            .load(&self.rules_path())
            .unwrap()
            .iter()
            .map(|r| r.borrow().name.clone())
            .collect()
    }

    /// Names of the rules selected by the persisted state, as the next invocation sees them.
    fn selected_names(&self) -> Vec<String> {
        let fs = std::sync::Arc::new(RealFileSystem);
        let rules = RuleService::new(fs.clone()).load(&self.rules_path()).unwrap();
        let state = StateService::new(fs).load(&self.state_path()).unwrap();
        let mut view = RuleListView::new(state);
        view.sync(&rules).unwrap();
        view.tree()
            .selection()
            .iter()
            .filter_map(|&id| view.rule(id))
            .map(|r| r.borrow().name.clone())
            .collect()
    }
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

#[test]
fn given_adds_when_listing_then_rules_file_keeps_insertion_order() {
    let ws = Workspace::new();
    ws.run(&["add", "Beta", "-g", "Prefabs"]).unwrap();
    ws.run(&["add", "Alpha10", "-l", "ui"]).unwrap();
    ws.run(&["add", "Alpha2", "-i", "0"]).unwrap();

    assert_eq!(ws.names(), vec!["Alpha2", "Beta", "Alpha10"]);
    ws.run(&["list"]).unwrap();
}

#[test]
fn given_sorted_list_when_listing_again_then_sort_is_persisted() {
    let ws = Workspace::new();
    for name in ["Beta", "Alpha10", "Alpha2"] {
        ws.run(&["add", name]).unwrap();
    }

    ws.run(&["list", "--sort", "name"]).unwrap();

    let state = StateService::new(std::sync::Arc::new(RealFileSystem))
        .load(&ws.state_path())
        .unwrap();
    assert_eq!(state.sort.map(|s| (s.column, s.ascending)), Some((0, true)));
}

#[test]
fn given_rule_when_renaming_then_rules_file_is_updated() {
    let ws = Workspace::new();
    ws.run(&["add", "Alpha2"]).unwrap();
    ws.run(&["add", "Beta"]).unwrap();

    ws.run(&["rename", "Alpha2", "Zulu"]).unwrap();

    assert_eq!(ws.names(), vec!["Zulu", "Beta"]);
}

#[test]
fn given_unknown_rule_when_removing_then_noinput_exit_code() {
    let ws = Workspace::new();
    ws.run(&["add", "Beta"]).unwrap();

    let err = ws.run(&["remove", "Gamma"]).unwrap_err();
    assert_eq!(err.exit_code(), exitcode::NOINPUT);

    ws.run(&["remove", "Beta"]).unwrap();
    assert!(ws.names().is_empty());
}

#[test]
fn given_blank_name_when_adding_then_dataerr_exit_code() {
    let ws = Workspace::new();
    let err = ws.run(&["add", " "]).unwrap_err();
    assert_eq!(err.exit_code(), exitcode::DATAERR);
    assert!(!ws.rules_path().exists());
}

#[test]
fn given_selection_when_listing_then_selection_is_persisted() {
    let ws = Workspace::new();
    ws.run(&["add", "Alpha"]).unwrap();
    ws.run(&["add", "Beta"]).unwrap();

    ws.run(&["list", "--select", "Beta", "--search", "be"]).unwrap();

    let state = StateService::new(std::sync::Arc::new(RealFileSystem))
        .load(&ws.state_path())
        .unwrap();
    assert_eq!(state.selection.len(), 1);
    assert_eq!(state.search, "be");
}

#[test]
fn given_persisted_state_when_resetting_then_state_file_is_removed() {
    let ws = Workspace::new();
    ws.run(&["add", "Alpha"]).unwrap();
    ws.run(&["list"]).unwrap();
    assert!(ws.state_path().exists());

    ws.run(&["tree"]).unwrap();
    ws.run(&["state", "show"]).unwrap();
    ws.run(&["state", "reset"]).unwrap();
    assert!(!ws.state_path().exists());
}

#[test]
fn given_invalid_local_config_when_running_then_config_exit_code() {
    let ws = Workspace::new();
    fs::write(ws.dir.path().join(".ruletree.toml"), "row_height = -1.0\n").unwrap();

    let err = ws.run(&["list"]).unwrap_err();
    assert_eq!(err.exit_code(), exitcode::CONFIG);
}

#[test]
fn given_desc_without_sort_when_parsing_then_rejected() {
    let result = Cli::try_parse_from(["ruletree", "list", "--desc"]);
    assert!(result.is_err());
}

#[test]
fn given_narrow_width_when_listing_then_usage_exit_code() {
    let ws = Workspace::new();
    let err = ws.run(&["list", "--width", "5"]).unwrap_err();
    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[test]
fn given_no_command_when_running_then_usage_exit_code() {
    let ws = Workspace::new();
    let err = ws.run(&[]).unwrap_err();
    assert_eq!(err.exit_code(), exitcode::USAGE);
}

// ============================================================
// Selection across collection changes
// ============================================================

#[test]
fn given_selected_rule_when_removing_an_earlier_rule_then_selection_stays_on_it() {
    // Arrange
    let ws = Workspace::new();
    for name in ["A", "B", "C"] {
        ws.run(&["add", name]).unwrap();
    }
    ws.run(&["list", "--select", "B"]).unwrap();
    assert_eq!(ws.selected_names(), vec!["B"]);

    // Act
    ws.run(&["remove", "A"]).unwrap();
    ws.run(&["list"]).unwrap();

    // Assert
    assert_eq!(ws.selected_names(), vec!["B"]);
}

#[test]
fn given_selected_rule_when_inserting_before_it_then_selection_stays_on_it() {
    let ws = Workspace::new();
    ws.run(&["add", "A"]).unwrap();
    ws.run(&["add", "B"]).unwrap();
    ws.run(&["list", "--select", "A"]).unwrap();

    ws.run(&["add", "Z", "-i", "0"]).unwrap();

    assert_eq!(ws.names(), vec!["Z", "A", "B"]);
    assert_eq!(ws.selected_names(), vec!["A"]);
}

#[test]
fn given_selected_rule_when_removing_it_then_selection_is_empty() {
    let ws = Workspace::new();
    ws.run(&["add", "A"]).unwrap();
    ws.run(&["add", "B"]).unwrap();
    ws.run(&["list", "--select", "A"]).unwrap();

    ws.run(&["remove", "A"]).unwrap();

    assert!(ws.selected_names().is_empty());
}

// ============================================================
// Local config from the working directory
// ============================================================

#[test]
fn given_local_config_in_cwd_when_running_without_project_dir_then_it_is_read() {
    // Arrange: an invalid local config is only noticed if the cwd layer is loaded
    let ws = Workspace::new();
    fs::write(ws.dir.path().join(".ruletree.toml"), "row_height = -1.0\n").unwrap();
    let rules = ws.rules_path();
    let state = ws.state_path();
    let cli = Cli::try_parse_from([
        "ruletree",
        "-r",
        path_str(&rules),
        "-s",
        path_str(&state),
        "list",
    ])
    .expect("parse args");

    // Act
    let previous = std::env::current_dir().unwrap();
    std::env::set_current_dir(ws.dir.path()).unwrap();
    let result = execute_command(&cli);
    std::env::set_current_dir(previous).unwrap();

    // Assert
    assert_eq!(result.unwrap_err().exit_code(), exitcode::CONFIG);
}
