//! Command handler layer.
//!
//! This module owns CLI-oriented orchestration and output wiring.
//!
//! ## Files
//! - `compile.rs` — `compile` (sources or project targets) and shared helpers.
//! - `define.rs` — `define set/list/delete`.
//! - `install.rs` — `install` from sources, compiled files or a project.
//!
//! ## Principles
//! - Parse/match CLI inputs here.
//! - Delegate business logic to `services/*`.
//! - Keep behavior and output schema stable.

pub mod compile;
pub mod define;
pub mod install;

pub use compile::handle_compile_command;
pub use define::handle_define_commands;
pub use install::handle_install_command;
