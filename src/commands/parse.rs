//! Implementation of the `varidelta parse` command.
//!
//! Parses a diff (from a file or from two git revisions), runs the configured
//! classifier, and reports which paths the configured filter selects.

use crate::cli::ParseArgs;
use crate::config::Config;
use crate::context::RunContext;
use crate::diff::{DiffSet, diff_between, parse_diff_file};
use crate::error::{Result, VariError};
use crate::strategy::annotate;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write;

#[derive(Serialize)]
struct ParseReport<'a> {
    entries: &'a DiffSet,
    selected: &'a [String],
}

/// Execute the `varidelta parse` command.
pub fn cmd_parse(ctx: &RunContext, args: ParseArgs) -> Result<()> {
    let parser = ctx.parser();
    let mut diff = match (&args.diff, args.git.as_deref()) {
        (Some(path), _) => parse_diff_file(&parser, path)?,
        (None, Some([old_rev, new_rev])) => diff_between(&parser, &args.repo, old_rev, new_rev)?,
        _ => {
            return Err(VariError::Config(
                "either a diff file or --git OLD NEW is required".to_string(),
            ));
        }
    };

    let selected = classify_and_select(&ctx.config, &mut diff)?;

    if args.json {
        println!("{}", render_json(&diff, &selected)?);
    } else {
        print!("{}", render_table(&diff, &selected));
    }
    Ok(())
}

/// Annotate `diff` with the configured classifier and return the paths the
/// configured filter selects.
pub(crate) fn classify_and_select(config: &Config, diff: &mut DiffSet) -> Result<Vec<String>> {
    let classifier = config.classifier.build(config)?;
    annotate(diff, classifier.as_ref());

    let filter = config.filter.build(config)?;
    Ok(filter.select(diff))
}

fn render_json(diff: &DiffSet, selected: &[String]) -> Result<String> {
    serde_json::to_string_pretty(&ParseReport {
        entries: diff,
        selected,
    })
    .map_err(|e| VariError::Serialization(format!("failed to render diff as JSON: {}", e)))
}

fn render_table(diff: &DiffSet, selected: &[String]) -> String {
    if diff.is_empty() {
        return "No file changes.\n".to_string();
    }

    let chosen: BTreeSet<&str> = selected.iter().map(String::as_str).collect();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "  {:<12} {:>4} {:>6} {:>6}  {:<22} PATH",
        "KIND", "MODE", "+ADD", "-DEL", "VARIABILITY"
    );
    for entry in diff {
        let mode = match (entry.old_permissions, entry.permissions) {
            (Some(old), Some(new)) if old != new => format!("{}>{}", old, new),
            (_, Some(mode)) => mode.to_string(),
            _ => "-".to_string(),
        };
        let marker = if chosen.contains(entry.path.as_str()) {
            '*'
        } else {
            ' '
        };
        let binary = if entry.binary { " (binary)" } else { "" };

        let _ = writeln!(
            out,
            "{} {:<12} {:>4} {:>6} {:>6}  {:<22} {}{}",
            marker,
            entry.change_kind,
            mode,
            entry.added_lines(),
            entry.deleted_lines(),
            entry.variability_change,
            entry.path,
            binary
        );
    }
    let _ = writeln!(
        out,
        "\n{} file(s), {} selected for extraction (*)",
        diff.len(),
        selected.len()
    );
    out
}
