/// Starts a compiler directive line (`#:DEFINE`, `#:SEARCH`).
pub const DIRECTIVE_MARKER: &str = "#:";
/// Everything after this on a line is dropped.
pub const INLINE_COMMENT_MARKER: &str = "#//";
pub const COMMENT_MARKER: &str = "#";
pub const BLANK_LINE_MARKER: &str = "@@";
pub const LINE_BREAK_SHORTHAND: &str = "-";

/// Statement separator in compiled output.
pub const NEWLINE: &str = "\n";
/// Softcode escape for a line break inside a statement.
pub const SOFT_LINE_BREAK: &str = "%r";
/// Softcode escape for a single preserved space.
pub const BLANK_TOKEN: &str = "%b";
pub const QUOTE_TAB_WIDTH: usize = 8;
/// Runs at or above this length become `[space(N)]`.
pub const SPACE_FUNCTION_THRESHOLD: usize = 5;

pub const DEFAULT_DEFINES_FILE: &str = "defines.json";
pub const DEFINES_OFF: &str = "off";

pub const TOKEN_LENGTH: usize = 12;
pub const DEFAULT_SETTLE_MS: u64 = 1000;
pub const DEFAULT_REPLY_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_IDENTITY_MARKER: &str = "RhostMUSH";
pub const IDENTITY_COMMAND: &str = "@version";
pub const QUIET_PREAMBLE: &str = "@set me=!verbose !puppet !trace";
