use crate::*;
use std::path::Path;

pub fn handle_install_command(cli: &Cli, store: &DefineStore) -> anyhow::Result<bool> {
    let Commands::Install { input, host, run } = &cli.command else {
        return Ok(false);
    };

    let host = load_host_config(host)?;
    let table = working_table(store, &run.overrides)?;

    let (mut doc, table) = if !input.sources.is_empty() {
        compile_patterns(table, Path::new("."), &input.sources)?
    } else if !input.compiled.is_empty() {
        (load_compiled(&input.compiled)?, table)
    } else if let Some(project) = &input.project {
        compile_project(table, project)?
    } else {
        anyhow::bail!("one of --source, --compiled or --project must be provided");
    };
    doc.text = apply_match(&doc.text, run.match_pattern.as_deref())?;

    let report = install(&host, doc, table)?;
    print_one(cli.json, report, |r| {
        format!("installed {} lines on {}", r.lines_sent, r.host)
    })?;
    Ok(true)
}

/// Already compiled files carry no directives; a blank line separates them.
fn load_compiled(paths: &[std::path::PathBuf]) -> anyhow::Result<CompiledDocument> {
    let mut text = String::new();
    for path in paths {
        text.push_str(&read_source(path)?);
        text.push_str("\n\n");
    }
    Ok(CompiledDocument {
        text,
        ..CompiledDocument::default()
    })
}

/// All targets of a project compiled in order into one document.
fn compile_project(
    table: SubstitutionTable,
    project: &Path,
) -> anyhow::Result<(CompiledDocument, SubstitutionTable)> {
    let project = load_project(project)?;
    let mut compiler = Compiler::new(table);
    for target in &project.targets {
        let paths = expand_sources(&project.root, &target.files)?;
        for text in read_sources(&paths)? {
            compiler.compile_source(&text)?;
        }
        tracing::info!(name = %target.name, "compiled target for install");
    }
    Ok(compiler.finish())
}
