use anyhow::Context;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Every byte maps to the code point with the same value.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Characters outside Latin-1 are sent as `?`.
pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

pub fn read_source(path: &Path) -> anyhow::Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(normalize_newlines(&decode_latin1(&bytes)))
}

pub fn write_output(path: &Path, text: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, encode_latin1(text))
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Expands glob patterns relative to `base`, keeping argument order. A pattern
/// that matches nothing is kept literally so reading it reports the missing
/// file.
pub fn expand_sources(base: &Path, patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for pattern in patterns {
        let full = base.join(pattern);
        let full_str = full.to_string_lossy().to_string();
        let mut matched: Vec<PathBuf> = glob::glob(&full_str)
            .with_context(|| format!("invalid source pattern {}", pattern))?
            .filter_map(Result::ok)
            .collect();
        if matched.is_empty() {
            out.push(full);
        } else {
            matched.sort();
            out.append(&mut matched);
        }
    }
    Ok(out)
}

pub fn read_sources(paths: &[PathBuf]) -> anyhow::Result<Vec<String>> {
    paths.iter().map(|p| read_source(p)).collect()
}

/// Keeps only lines whose beginning matches `pattern`.
pub fn filter_matching(text: &str, pattern: &str) -> anyhow::Result<String> {
    let re = regex::Regex::new(&format!("^(?:{})", pattern))
        .with_context(|| format!("invalid --match pattern {}", pattern))?;
    Ok(text
        .split_inclusive('\n')
        .filter(|line| re.is_match(line))
        .collect())
}

/// Hands `text` to the first clipboard tool found on PATH.
pub fn copy_to_clipboard(text: &str) -> anyhow::Result<()> {
    let candidates: &[(&str, &[&str])] = &[
        ("pbcopy", &[]),
        ("wl-copy", &[]),
        ("xclip", &["-selection", "clipboard"]),
        ("xsel", &["--clipboard", "--input"]),
        ("clip", &[]),
    ];
    let data = if cfg!(windows) {
        text.replace('\n', "\r\n")
    } else {
        text.to_string()
    };
    for (program, args) in candidates {
        let child = Command::new(program)
            .args(*args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        let Ok(mut child) = child else {
            continue;
        };
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(data.as_bytes())?;
        }
        let status = child.wait()?;
        if status.success() {
            tracing::debug!(tool = *program, "copied compiled output to clipboard");
            return Ok(());
        }
    }
    anyhow::bail!("no clipboard tool available (tried pbcopy, wl-copy, xclip, xsel, clip)")
}
