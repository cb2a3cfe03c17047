use crate::*;
use std::path::Path;

pub fn handle_compile_command(cli: &Cli, store: &DefineStore) -> anyhow::Result<bool> {
    let Commands::Compile {
        sources,
        output,
        clipboard,
        project,
        run,
    } = &cli.command
    else {
        return Ok(false);
    };

    let table = working_table(store, &run.overrides)?;

    if let Some(project) = project {
        let project = load_project(project)?;
        let mut reports = Vec::new();
        for target in &project.targets {
            let (doc, _) = compile_patterns(table.clone(), &project.root, &target.files)?;
            let text = apply_match(&doc.text, run.match_pattern.as_deref())?;
            let out = project.root.join(&target.output);
            write_output(&out, &text)?;
            tracing::info!(name = %target.name, output = %out.display(), "compiled target");
            reports.push(compile_report(
                Some(&target.name),
                out.display().to_string(),
                &text,
                &doc,
            ));
        }
        print_out(cli.json, &reports, |r| {
            format!(
                "compiled {} -> {} ({} lines)",
                r.target.as_deref().unwrap_or("-"),
                r.destination,
                r.lines
            )
        })?;
        return Ok(true);
    }

    if sources.is_empty() {
        anyhow::bail!("no source files given (pass SOURCE... or --project)");
    }

    let (doc, _) = compile_patterns(table, Path::new("."), sources)?;
    if !doc.searches.is_empty() {
        tracing::warn!(
            count = doc.searches.len(),
            "search directives are only resolved during install"
        );
    }
    let text = apply_match(&doc.text, run.match_pattern.as_deref())?;

    if *clipboard {
        copy_to_clipboard(&text)?;
        let report = compile_report(None, "clipboard".to_string(), &text, &doc);
        print_one(cli.json, report, |r| format!("copied {} lines to clipboard", r.lines))?;
    } else if let Some(out) = output {
        write_output(out, &text)?;
        let report = compile_report(None, out.display().to_string(), &text, &doc);
        print_one(cli.json, report, |r| {
            format!("wrote {} lines to {}", r.lines, r.destination)
        })?;
    } else if cli.json {
        let mut report = compile_report(None, "stdout".to_string(), &text, &doc);
        report.text = Some(text);
        print_one(true, report, |_| String::new())?;
    } else {
        print!("{}", text);
    }

    Ok(true)
}

/// Parses `-D NAME=VALUE` arguments; both sides are trimmed.
pub fn parse_overrides(raw: &[String]) -> Result<Vec<(String, String)>, MushError> {
    raw.iter()
        .map(|item| {
            item.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .ok_or_else(|| MushError::InvalidOverride(item.clone()))
        })
        .collect()
}

/// Persisted defines with this run's overrides layered on top.
pub fn working_table(
    store: &DefineStore,
    overrides: &[String],
) -> anyhow::Result<SubstitutionTable> {
    let overrides = parse_overrides(overrides)?;
    let table = SubstitutionTable::with_overrides(store.load()?, &overrides);
    if !table.is_empty() {
        tracing::debug!(defines = ?table.iter().map(|(k, _)| k).collect::<Vec<_>>(), "active defines");
    }
    Ok(table)
}

pub fn compile_patterns(
    table: SubstitutionTable,
    base: &Path,
    patterns: &[String],
) -> anyhow::Result<(CompiledDocument, SubstitutionTable)> {
    let paths = expand_sources(base, patterns)?;
    for path in &paths {
        tracing::debug!(source = %path.display(), "compiling");
    }
    let texts = read_sources(&paths)?;
    Ok(compile_sources(table, &texts)?)
}

pub fn apply_match(text: &str, pattern: Option<&str>) -> anyhow::Result<String> {
    match pattern {
        Some(p) => filter_matching(text, p),
        None => Ok(text.to_string()),
    }
}

fn compile_report(
    target: Option<&str>,
    destination: String,
    text: &str,
    doc: &CompiledDocument,
) -> CompileReport {
    CompileReport {
        target: target.map(str::to_string),
        destination,
        lines: text.lines().filter(|l| !l.is_empty()).count(),
        searches: doc.searches.clone(),
        unknown_directives: doc.unknown_directives.clone(),
        text: None,
    }
}
