//! Service layer containing the compiler, the install session and their
//! side-effect helpers.
//!
//! ## Service map
//! - `compiler.rs` — line compaction, substitution and directive extraction.
//! - `session.rs` — install session state machine and search resolution.
//! - `channel.rs` — TCP line channel with settle-window draining.
//! - `storage.rs` — persistent defines store.
//! - `config.rs` — host config and project descriptor loading.
//! - `sources.rs` — Latin-1 file I/O, glob expansion, `--match`, clipboard.
//! - `output.rs` — JSON/text output helpers.
//!
//! ## Conventions
//! - The substitution table is passed in and returned, never global.
//! - Side effects should be explicit and localized.
//! - Keep command handlers thin; delegate to services.

pub mod channel;
pub mod compiler;
pub mod config;
pub mod output;
pub mod session;
pub mod sources;
pub mod storage;
