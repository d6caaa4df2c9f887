//! Implementation of the `varidelta store` commands.

use crate::cli::{
    ForceArgs, StoreAction, StoreCommand, StoreFlagsArgs, StoreListArgs, StoreLogArgs,
};
use crate::context::RunContext;
use crate::error::{Result, VariError};
use crate::journal::{JournalEntry, read_journal};
use crate::store::{ArtifactKey, ArtifactKind, ChangeFlag, StoreStatus, VersionedStore};
use std::fmt::Write;

/// Dispatch store subcommands.
pub fn dispatch_store(ctx: &RunContext, store_cmd: StoreCommand) -> Result<()> {
    match store_cmd.action {
        StoreAction::Status => cmd_status(ctx),
        StoreAction::Flags(args) => cmd_flags(ctx, args),
        StoreAction::List(args) => cmd_list(ctx, args),
        StoreAction::Rollback(args) => cmd_rollback(ctx, args),
        StoreAction::ClearHistory(args) => cmd_clear_history(ctx, args),
        StoreAction::Log(args) => cmd_log(ctx, args),
    }
}

fn cmd_status(ctx: &RunContext) -> Result<()> {
    let store = ctx.open_store()?;
    print!("{}", render_status(&store, &store.status()?));
    Ok(())
}

fn cmd_flags(ctx: &RunContext, args: StoreFlagsArgs) -> Result<()> {
    let key = parse_key(&args.kind, args.path.as_deref())?;
    let store = ctx.open_store()?;

    let flags = store.flags(&key);
    if flags.is_empty() {
        println!("{}: no flags", key);
    } else {
        let names: Vec<&str> = flags.iter().map(|f| f.as_str()).collect();
        println!("{}: {}", key, names.join(", "));
    }
    Ok(())
}

fn cmd_list(ctx: &RunContext, args: StoreListArgs) -> Result<()> {
    let kind = parse_kind(&args.kind)?;
    let flag = ChangeFlag::from_str(&args.flag).ok_or_else(|| {
        let known: Vec<&str> = ChangeFlag::ALL.iter().map(|f| f.as_str()).collect();
        VariError::Config(format!(
            "unknown flag '{}' (expected one of: {})",
            args.flag,
            known.join(", ")
        ))
    })?;

    let store = ctx.open_store()?;
    for key in store.keys_with_flag(kind, flag) {
        match key.path() {
            Some(path) => println!("{}", path),
            None => println!("{}", key.kind()),
        }
    }
    Ok(())
}

fn cmd_rollback(ctx: &RunContext, args: ForceArgs) -> Result<()> {
    require_force(&args, "rollback")?;
    let mut store = ctx.open_store()?;
    store.rollback()?;
    println!("Rolled back store at {}", store.root().display());
    Ok(())
}

fn cmd_clear_history(ctx: &RunContext, args: ForceArgs) -> Result<()> {
    require_force(&args, "clear-history")?;
    let mut store = ctx.open_store()?;
    store.clear_history()?;
    println!("Cleared history of store at {}", store.root().display());
    Ok(())
}

fn cmd_log(ctx: &RunContext, args: StoreLogArgs) -> Result<()> {
    let store = ctx.open_store()?;
    let entries = read_journal(&store.journal_path())?;

    let skip = args
        .limit
        .map(|limit| entries.len().saturating_sub(limit))
        .unwrap_or(0);
    for entry in &entries[skip..] {
        println!("{}", render_journal_entry(entry));
    }
    Ok(())
}

fn require_force(args: &ForceArgs, action: &str) -> Result<()> {
    if args.force {
        return Ok(());
    }
    Err(VariError::Config(format!(
        "refusing to {} without --force flag.\n\n\
         This discards the previous generation of every artifact.\n\n\
         To proceed, run:\n  varidelta store {} --force",
        action.replace('-', " "),
        action
    )))
}

fn parse_kind(kind: &str) -> Result<ArtifactKind> {
    ArtifactKind::from_str(kind).ok_or_else(|| {
        VariError::Config(format!(
            "unknown artifact kind '{}' (expected code, build, or variability)",
            kind
        ))
    })
}

fn parse_key(kind: &str, path: Option<&str>) -> Result<ArtifactKey> {
    match (parse_kind(kind)?, path) {
        (ArtifactKind::Code, Some(path)) => Ok(ArtifactKey::code(path)),
        (ArtifactKind::Code, None) => Err(VariError::Config(
            "a source path is required for code artifacts".to_string(),
        )),
        (ArtifactKind::Build, _) => Ok(ArtifactKey::Build),
        (ArtifactKind::Variability, _) => Ok(ArtifactKey::Variability),
    }
}

fn render_status(store: &VersionedStore, status: &StoreStatus) -> String {
    let present = |b: bool| if b { "present" } else { "missing" };
    let mut out = String::new();

    let _ = writeln!(out, "Store Status");
    let _ = writeln!(out, "============");
    let _ = writeln!(out, "Root:        {}", store.root().display());
    let _ = writeln!(out);
    let _ = writeln!(out, "Current:");
    let _ = writeln!(out, "  code        {:>5}", status.current_code);
    let _ = writeln!(out, "  build       {:>7}", present(status.current_build));
    let _ = writeln!(out, "  variability {:>7}", present(status.current_variability));
    let _ = writeln!(out, "Previous:    {:>5}", status.previous);
    let _ = writeln!(out, "Flagged:     {:>5}", status.flagged_keys);

    if status.flagged_keys > 0 {
        let _ = writeln!(out);
        for flag in ChangeFlag::ALL {
            let count: usize = ArtifactKind::ALL
                .into_iter()
                .map(|kind| store.keys_with_flag(kind, flag).len())
                .sum();
            if count > 0 {
                let _ = writeln!(out, "  {:<18} {:>5}", flag, count);
            }
        }
    }
    out
}

fn render_journal_entry(entry: &JournalEntry) -> String {
    let mut line = format!(
        "{} {:<13}",
        entry.ts.format("%Y-%m-%d %H:%M:%S UTC"),
        entry.action
    );
    if let Some(key) = &entry.key {
        let _ = write!(line, " {}", key);
    }
    if entry.details.as_object().is_some_and(|d| !d.is_empty()) {
        let _ = write!(line, " {}", entry.details);
    }
    line
}
