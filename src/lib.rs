//! Searchable, sortable multi-column tree views for asset layout rule editors.
//!
//! - `domain`: arena tree, view state, natural ordering, rule contract
//! - `application`: generic `TreeView`, the rule list specialization, services
//! - `infrastructure`: filesystem boundary and service wiring
//! - `cli`: the `ruletree` command line host

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
