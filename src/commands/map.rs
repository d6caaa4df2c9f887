//! Implementation of the `varidelta map` command.

use crate::cli::MapArgs;
use crate::context::RunContext;
use crate::diff::parse_diff_file;
use crate::error::{Result, VariError};
use crate::translate::{LinePosition, LineTranslator};

/// Execute the `varidelta map` command.
pub fn cmd_map(ctx: &RunContext, args: MapArgs) -> Result<()> {
    println!("{}", map_line(ctx, &args)?);
    Ok(())
}

fn map_line(ctx: &RunContext, args: &MapArgs) -> Result<String> {
    if args.line == 0 {
        return Err(VariError::Config("line numbers start at 1".to_string()));
    }

    let diff = parse_diff_file(&ctx.parser(), &args.diff)?;
    let translator = LineTranslator::new(&diff);
    let position = if args.reverse {
        translator.locate_reverse(&args.path, args.line)?
    } else {
        translator.locate(&args.path, args.line)?
    };

    Ok(describe(&args.path, args.line, position, args.reverse))
}

fn describe(path: &str, line: u32, position: LinePosition, reverse: bool) -> String {
    let (from, to) = if reverse { ("new", "old") } else { ("old", "new") };
    match position {
        LinePosition::Kept(target) => format!("{}:{} -> {}", path, line, target),
        LinePosition::Dropped { following } => format!(
            "{}:{} -> {} ({} line {} does not exist in the {} revision; next surviving line shown)",
            path, line, following, from, line, to
        ),
    }
}
