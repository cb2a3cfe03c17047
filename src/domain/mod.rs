//! Shared data model layer (structs/constants only).
//!
//! ## Purpose
//! - Keep the substitution table, directive and report types in one place.
//! - Avoid cyclic imports between the compiler, the session and the commands.
//!
//! ## Files
//! - `models.rs` — substitution table, directives, host/project config, reports.
//! - `constants.rs` — markers and escape tokens of the softcode dialect.
//! - `errors.rs` — the `MushError` taxonomy and its exit codes.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem/network side effects.
//!
//! ## Compatibility note
//! Report structs are printed verbatim under `--json`.

pub mod constants;
pub mod errors;
pub mod models;
