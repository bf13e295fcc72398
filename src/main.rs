use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use hcledit::config::{apply_plan, load_from_path, plan_edits, ApplicationError, EditOutcome};
use hcledit::{BlockPath, ExpressionKind, File, Rewrite, RewriteResult, Traversal, Value, WorkspaceGuard};
use similar::{ChangeTag, TextDiff};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "hcledit")]
#[command(about = "Format-preserving editing of HCL configuration files", long_about = None)]
#[command(version)]
struct Cli {
    /// Log library activity to stderr (overridden by HCLEDIT_LOG / RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a TOML edit script
    Apply {
        /// Edit script to apply
        script: PathBuf,

        /// Workspace root (defaults to the current directory)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Print the expression of an attribute
    Get {
        file: PathBuf,
        name: String,

        /// Nested block selector, e.g. resource.aws_instance.web (repeatable)
        #[arg(short, long = "block")]
        block: Vec<String>,

        /// Print a JSON description instead of the source text
        #[arg(long)]
        json: bool,
    },

    /// Set an attribute, replacing its expression or appending it
    Set {
        file: PathBuf,
        name: String,
        /// HCL literal (`3`, `true`, `"text"`, `[1, 2]`); anything else is
        /// taken as a plain string
        value: String,

        #[arg(short, long = "block")]
        block: Vec<String>,

        /// Treat VALUE as a traversal such as var.region
        #[arg(long)]
        traversal: bool,

        #[arg(short = 'n', long)]
        dry_run: bool,

        #[arg(short, long)]
        diff: bool,
    },

    /// Append an empty block
    AppendBlock {
        file: PathBuf,
        block_type: String,
        labels: Vec<String>,

        #[arg(short, long = "block")]
        block: Vec<String>,

        /// Separate the new block from preceding content with a blank line
        #[arg(long)]
        blank_line: bool,

        #[arg(short = 'n', long)]
        dry_run: bool,

        #[arg(short, long)]
        diff: bool,
    },

    /// Parse .tf/.hcl files and verify they round-trip unchanged
    Check {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    hcledit::logging::init(cli.verbose);

    match cli.command {
        Commands::Apply {
            script,
            workspace,
            dry_run,
            diff,
        } => cmd_apply(&script, workspace, dry_run, diff),

        Commands::Get {
            file,
            name,
            block,
            json,
        } => cmd_get(&file, &name, &block, json),

        Commands::Set {
            file,
            name,
            value,
            block,
            traversal,
            dry_run,
            diff,
        } => {
            let edit = |document: &mut File, path: &BlockPath| -> Result<()> {
                let body = path.resolve_mut(document.body_mut())?;
                if traversal {
                    let traversal = Traversal::parse(&value)?;
                    body.set_attribute_traversal(&name, &traversal);
                } else {
                    body.set_attribute_value(&name, parse_cli_value(&value));
                }
                Ok(())
            };
            cmd_edit_file(&file, &block, dry_run, diff, edit)
        }

        Commands::AppendBlock {
            file,
            block_type,
            labels,
            block,
            blank_line,
            dry_run,
            diff,
        } => {
            let edit = |document: &mut File, path: &BlockPath| -> Result<()> {
                path.resolve_mut(document.body_mut())?.append_block(
                    &block_type,
                    labels.iter().cloned(),
                    blank_line,
                );
                Ok(())
            };
            cmd_edit_file(&file, &block, dry_run, diff, edit)
        }

        Commands::Check { paths } => cmd_check(&paths),
    }
}

/// Interpret a command-line value as an HCL literal when it parses as one.
fn parse_cli_value(text: &str) -> Value {
    File::parse(&format!("value = {text}\n"))
        .ok()
        .and_then(|file| {
            file.body()
                .get_attribute("value")
                .and_then(|attr| attr.expr().as_literal().cloned())
        })
        .unwrap_or_else(|| Value::String(text.to_string()))
}

fn read_document(file: &Path) -> Result<(String, File)> {
    let source =
        fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let document =
        File::parse(&source).with_context(|| format!("failed to parse {}", file.display()))?;
    Ok((source, document))
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (edited)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);
    for change in diff.iter_all_changes() {
        let line = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", line);
    }
}

fn cmd_get(file: &Path, name: &str, block: &[String], json: bool) -> Result<()> {
    let (_, document) = read_document(file)?;
    let path = BlockPath::parse_all(block)?;
    let body = path.resolve(document.body())?;
    let attr = body
        .get_attribute(name)
        .with_context(|| format!("attribute '{}' not found in {}", name, path))?;

    if json {
        let expr = attr.expr();
        let description = match expr.kind() {
            ExpressionKind::Literal(value) => serde_json::json!({
                "name": name,
                "kind": "literal",
                "value": value,
                "source": expr.source(),
            }),
            ExpressionKind::Traversal(traversal) => serde_json::json!({
                "name": name,
                "kind": "traversal",
                "traversal": traversal.segments(),
                "source": expr.source(),
            }),
            ExpressionKind::Raw => serde_json::json!({
                "name": name,
                "kind": "raw",
                "source": expr.source(),
            }),
        };
        println!("{}", serde_json::to_string_pretty(&description)?);
    } else {
        println!("{}", attr.expr().source());
    }
    Ok(())
}

fn cmd_edit_file(
    file: &Path,
    block: &[String],
    dry_run: bool,
    show_diff: bool,
    edit: impl FnOnce(&mut File, &BlockPath) -> Result<()>,
) -> Result<()> {
    let (before, mut document) = read_document(file)?;
    let path = BlockPath::parse_all(block)?;
    edit(&mut document, &path)?;
    let after = document.to_string();

    if show_diff && before != after {
        display_diff(file, &before, &after);
    }

    if dry_run {
        let status = if before == after {
            "no change".yellow()
        } else {
            "would change".green()
        };
        println!("{} {}", file.display(), status);
        return Ok(());
    }

    match Rewrite::new(file, &before, after).apply()? {
        RewriteResult::Applied { file, .. } => {
            println!("{} Updated {}", "✓".green(), file.display())
        }
        RewriteResult::AlreadyApplied { file } => {
            println!("{} {} already up to date", "⊙".yellow(), file.display())
        }
    }
    Ok(())
}

fn cmd_apply(
    script: &Path,
    workspace: Option<PathBuf>,
    dry_run: bool,
    show_diff: bool,
) -> Result<()> {
    let workspace = match workspace {
        Some(path) => path,
        None => env::current_dir()?,
    };
    let guard = WorkspaceGuard::new(&workspace)
        .with_context(|| format!("invalid workspace {}", workspace.display()))?;
    let script_def = load_from_path(script)?;

    println!("Workspace: {}", guard.workspace_root().display());
    println!("Script: {}", script.display());
    if let Some(description) = &script_def.meta.description {
        println!("{}", description.dimmed());
    }
    println!();

    let plan = plan_edits(&script_def, &guard);
    if show_diff {
        for file in plan.changed_files() {
            display_diff(&file.path, &file.before, &file.after);
        }
        println!();
    }

    let reports = if dry_run {
        println!("{}", "  [DRY RUN - showing what would be applied]".cyan());
        plan.reports
    } else {
        apply_plan(plan)
    };

    let mut total_applied = 0;
    let mut total_already_applied = 0;
    let mut total_skipped = 0;
    let mut total_failed = 0;

    for report in reports {
        let id = report.id;
        match report.result {
            Ok(EditOutcome::Applied { file }) => {
                let verb = if dry_run { "Would apply to" } else { "Applied to" };
                println!("{} {}: {} {}", "✓".green(), id, verb, file.display());
                total_applied += 1;
            }
            Ok(EditOutcome::AlreadyApplied { file }) => {
                println!(
                    "{} {}: Already applied to {}",
                    "⊙".yellow(),
                    id,
                    file.display()
                );
                total_already_applied += 1;
            }
            Ok(EditOutcome::Skipped { reason, .. }) => {
                println!("{} {}: Skipped ({})", "⊘".cyan(), id, reason);
                total_skipped += 1;
            }
            Ok(EditOutcome::Failed { file, reason }) => {
                eprintln!("{} {}: Failed - {}", "✗".red(), id, reason);
                eprintln!("  File: {}", file.display());
                total_failed += 1;
            }
            Err(e) => {
                eprintln!("{} {}: Error - {}", "✗".red(), id, e);
                total_failed += 1;

                match &e {
                    ApplicationError::Parse { .. } => {
                        eprintln!("  {}", "The target file is not HCL this tool can parse".red());
                        eprintln!("  Run `hcledit check` on it for details");
                    }
                    ApplicationError::Write { .. } => {
                        eprintln!("  The file changed on disk while the script was running");
                    }
                    _ => {}
                }
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} applied", format!("{}", total_applied).green());
    println!(
        "  {} already applied",
        format!("{}", total_already_applied).yellow()
    );
    println!("  {} skipped", format!("{}", total_skipped).cyan());
    println!("  {} failed", format!("{}", total_failed).red());

    if total_failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn is_hcl_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("tf") | Some("hcl")
    )
}

fn cmd_check(paths: &[PathBuf]) -> Result<()> {
    let mut checked = 0;
    let mut failed = 0;

    for root in paths {
        let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            entry.depth() == 0 || !(name == ".terraform" || name == ".git")
        });
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() || !is_hcl_file(entry.path()) {
                continue;
            }
            checked += 1;
            let path = entry.path();
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            match File::parse(&source) {
                Ok(document) if document.to_bytes() == source.as_bytes() => {
                    println!("{} {}", "✓".green(), path.display());
                }
                Ok(document) => {
                    eprintln!("{} {}: round trip changed the file", "✗".red(), path.display());
                    display_diff(path, &source, &document.to_string());
                    failed += 1;
                }
                Err(err) => {
                    eprintln!("{} {}: {}", "✗".red(), path.display(), err);
                    failed += 1;
                }
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} checked", format!("{}", checked).green());
    println!("  {} failed", format!("{}", failed).red());

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
