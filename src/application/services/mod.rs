//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on the FileSystem boundary trait
//! but are themselves concrete structs, not traits.

mod rules;
mod state;

pub use rules::RuleService;
pub use state::StateService;
