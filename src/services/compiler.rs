//! Line-compaction compiler.
//!
//! Raw source lines are folded into compiled statements one line at a time:
//! comments and directives are stripped, substitutions applied, quoted lines
//! compacted into `%b`/`[space(N)]` escapes, and indented lines joined onto the
//! statement above them.

use crate::domain::constants::{
    BLANK_LINE_MARKER, BLANK_TOKEN, COMMENT_MARKER, DIRECTIVE_MARKER, INLINE_COMMENT_MARKER,
    LINE_BREAK_SHORTHAND, NEWLINE, QUOTE_TAB_WIDTH, SOFT_LINE_BREAK, SPACE_FUNCTION_THRESHOLD,
};
use crate::domain::errors::MushError;
use crate::domain::models::{CompiledDocument, Directive, SearchDirective, SubstitutionTable};

pub struct Compiler {
    table: SubstitutionTable,
    searches: Vec<SearchDirective>,
    unknown: Vec<String>,
    out: String,
}

impl Compiler {
    pub fn new(table: SubstitutionTable) -> Self {
        Self {
            table,
            searches: Vec::new(),
            unknown: Vec::new(),
            out: String::new(),
        }
    }

    /// Compiles one source file. The file always ends with its own newline so
    /// consecutive files never merge their last statements.
    pub fn compile_source(&mut self, text: &str) -> Result<(), MushError> {
        for line in text.lines() {
            self.compile_line(line)?;
        }
        self.out.push_str(NEWLINE);
        Ok(())
    }

    pub fn finish(self) -> (CompiledDocument, SubstitutionTable) {
        let doc = CompiledDocument {
            text: self.out,
            searches: self.searches,
            unknown_directives: self.unknown,
        };
        (doc, self.table)
    }

    fn compile_line(&mut self, raw: &str) -> Result<(), MushError> {
        let mut line = raw;
        if !is_quoted(raw.trim()) {
            if let Some(idx) = line.find(INLINE_COMMENT_MARKER) {
                line = &line[..idx];
            }
        }

        if let Some(body) = line.strip_prefix(DIRECTIVE_MARKER) {
            let directive = parse_directive(body)?;
            self.apply_directive(directive);
            return Ok(());
        }

        if line.trim().is_empty()
            || line.starts_with(BLANK_LINE_MARKER)
            || line.starts_with(COMMENT_MARKER)
        {
            return Ok(());
        }

        let line = self.table.apply(line);
        let trimmed = line.trim();

        if is_quoted(trimmed) {
            let inner = &trimmed[1..trimmed.len() - 1];
            self.out.push_str(&compact_quoted(inner));
            // `"...\"` continues the same statement on the next physical line.
            if !inner.ends_with('\\') {
                self.out.push_str(SOFT_LINE_BREAK);
            }
            return Ok(());
        }

        if trimmed == LINE_BREAK_SHORTHAND {
            self.out.push_str(NEWLINE);
            return Ok(());
        }

        let rest = match line.strip_prefix(LINE_BREAK_SHORTHAND) {
            Some(rest) => {
                self.out.push_str(NEWLINE);
                rest
            }
            None => line.as_str(),
        };

        if !rest.starts_with(char::is_whitespace) {
            self.out.push_str(NEWLINE);
        }
        self.out.push_str(rest.trim());
        Ok(())
    }

    fn apply_directive(&mut self, directive: Directive) {
        match directive {
            Directive::Define { key, value } => {
                tracing::debug!(%key, %value, "define directive");
                self.table.set(key, value);
            }
            Directive::Search(search) => {
                tracing::debug!(key = %search.key, query = %search.query, "search directive");
                match self.searches.iter_mut().find(|s| s.key == search.key) {
                    Some(existing) => existing.query = search.query,
                    None => self.searches.push(search),
                }
            }
            Directive::Unknown { name } => {
                tracing::warn!(directive = %name, "ignoring unknown directive");
                self.unknown.push(name);
            }
        }
    }
}

/// Compiles `sources` in order into a single document, returning it with the
/// table as left by any define directives. Any malformed directive aborts the
/// whole run and nothing is returned.
pub fn compile_sources(
    table: SubstitutionTable,
    sources: &[String],
) -> Result<(CompiledDocument, SubstitutionTable), MushError> {
    let mut compiler = Compiler::new(table);
    for source in sources {
        compiler.compile_source(source)?;
    }
    Ok(compiler.finish())
}

/// Parses the text following the `#:` marker.
pub fn parse_directive(body: &str) -> Result<Directive, MushError> {
    let mut tokens = body.split_whitespace();
    let Some(name) = tokens.next() else {
        return Ok(Directive::Unknown {
            name: String::new(),
        });
    };
    let args: Vec<&str> = tokens.collect();
    let malformed = || {
        MushError::DirectiveMalformed(format!("{} {}", name, args.join(" ")).trim().to_string())
    };

    match name.to_ascii_lowercase().as_str() {
        "define" => {
            if args.len() < 2 {
                return Err(malformed());
            }
            // Only the first value token binds; anything after it is ignored.
            Ok(Directive::Define {
                key: args[0].to_string(),
                value: args[1].to_string(),
            })
        }
        "search" => {
            let (key, query) = match args.first().and_then(|a| a.split_once('=')) {
                Some((key, head)) => {
                    let words: Vec<&str> = std::iter::once(head)
                        .chain(args[1..].iter().copied())
                        .filter(|w| !w.is_empty())
                        .collect();
                    (key.to_string(), words.join(" "))
                }
                None if args.len() >= 2 => (args[0].to_string(), args[1..].join(" ")),
                None => return Err(malformed()),
            };
            if key.is_empty() || query.is_empty() {
                return Err(malformed());
            }
            Ok(Directive::Search(SearchDirective { key, query }))
        }
        _ => Ok(Directive::Unknown {
            name: name.to_string(),
        }),
    }
}

fn is_quoted(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('"') && s.ends_with('"')
}

/// Expands tabs and rewrites every run of two or more spaces as softcode
/// escapes so the server keeps the spacing.
pub fn compact_quoted(inner: &str) -> String {
    let expanded = inner.replace('\t', &" ".repeat(QUOTE_TAB_WIDTH));
    let mut out = String::with_capacity(expanded.len());
    let mut run = 0usize;
    for ch in expanded.chars() {
        if ch == ' ' {
            run += 1;
            continue;
        }
        push_space_run(&mut out, run);
        run = 0;
        out.push(ch);
    }
    push_space_run(&mut out, run);
    out
}

fn push_space_run(out: &mut String, run: usize) {
    match run {
        0 => {}
        1 => out.push(' '),
        n if n < SPACE_FUNCTION_THRESHOLD => out.push_str(&BLANK_TOKEN.repeat(n)),
        n => out.push_str(&format!("[space({})]", n)),
    }
}
