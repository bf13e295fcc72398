//! Edit-script applicator.
//!
//! Edits are grouped by target file. Each file is read and parsed once,
//! its edits run in script order against the in-memory document, and the
//! rendered result is written back once through a verified [`Rewrite`].

use crate::ast::{Body, File};
use crate::config::schema::{Constraints, EditDefinition, EditScript, Operation};
use crate::edit::{Rewrite, RewriteResult};
use crate::query::{BlockPath, QueryError};
use crate::safety::{SafetyError, WorkspaceGuard};
use crate::syntax::ParseError;
use crate::traversal::{Traversal, TraversalError};
use indexmap::IndexMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Outcome of a single edit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "EditOutcome should be checked for success/failure"]
pub enum EditOutcome {
    Applied { file: PathBuf },
    /// The document already reflected the edit.
    AlreadyApplied { file: PathBuf },
    /// A constraint asked for the edit to be left out.
    Skipped { file: PathBuf, reason: String },
    /// A constraint was violated.
    Failed { file: PathBuf, reason: String },
}

impl EditOutcome {
    pub fn file(&self) -> &Path {
        match self {
            EditOutcome::Applied { file }
            | EditOutcome::AlreadyApplied { file }
            | EditOutcome::Skipped { file, .. }
            | EditOutcome::Failed { file, .. } => file,
        }
    }
}

impl fmt::Display for EditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditOutcome::Applied { file } => write!(f, "Applied to {}", file.display()),
            EditOutcome::AlreadyApplied { file } => {
                write!(f, "Already applied to {}", file.display())
            }
            EditOutcome::Skipped { file, reason } => {
                write!(f, "Skipped on {}: {}", file.display(), reason)
            }
            EditOutcome::Failed { file, reason } => {
                write!(f, "Failed on {}: {}", file.display(), reason)
            }
        }
    }
}

#[derive(Debug)]
pub enum ApplicationError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: ParseError,
    },
    Query {
        path: PathBuf,
        source: QueryError,
    },
    Traversal {
        path: PathBuf,
        source: TraversalError,
    },
    /// The target is outside the workspace or in a protected directory.
    Unsafe { path: PathBuf, reason: String },
    /// The planned text could not be written back.
    Write { path: PathBuf, reason: String },
}

impl ApplicationError {
    /// Copy of a file-level error for each edit that targets the file.
    fn duplicate(&self) -> Self {
        match self {
            ApplicationError::Io { path, source } => ApplicationError::Io {
                path: path.clone(),
                source: std::io::Error::new(source.kind(), source.to_string()),
            },
            ApplicationError::Parse { path, source } => ApplicationError::Parse {
                path: path.clone(),
                source: source.clone(),
            },
            ApplicationError::Query { path, source } => ApplicationError::Query {
                path: path.clone(),
                source: source.clone(),
            },
            ApplicationError::Traversal { path, source } => ApplicationError::Traversal {
                path: path.clone(),
                source: source.clone(),
            },
            ApplicationError::Unsafe { path, reason } => ApplicationError::Unsafe {
                path: path.clone(),
                reason: reason.clone(),
            },
            ApplicationError::Write { path, reason } => ApplicationError::Write {
                path: path.clone(),
                reason: reason.clone(),
            },
        }
    }

    fn from_safety(path: &Path, err: SafetyError) -> Self {
        match err {
            SafetyError::Canonicalize(source) => ApplicationError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => ApplicationError::Unsafe {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        }
    }
}

impl fmt::Display for ApplicationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplicationError::Io { path, source } => {
                write!(f, "I/O error on {}: {}", path.display(), source)
            }
            ApplicationError::Parse { path, source } => {
                write!(f, "failed to parse {}: {}", path.display(), source)
            }
            ApplicationError::Query { path, source } => {
                write!(f, "{} in {}", source, path.display())
            }
            ApplicationError::Traversal { path, source } => {
                write!(f, "{} (editing {})", source, path.display())
            }
            ApplicationError::Unsafe { path, reason } => {
                write!(f, "refusing to edit {}: {}", path.display(), reason)
            }
            ApplicationError::Write { path, reason } => {
                write!(f, "failed to write {}: {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for ApplicationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApplicationError::Io { source, .. } => Some(source),
            ApplicationError::Parse { source, .. } => Some(source),
            ApplicationError::Query { source, .. } => Some(source),
            ApplicationError::Traversal { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result of one edit, tagged with its id and target file.
#[derive(Debug)]
pub struct EditReport {
    pub id: String,
    pub file: PathBuf,
    pub result: Result<EditOutcome, ApplicationError>,
}

/// Before and after text of one target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePlan {
    pub path: PathBuf,
    pub before: String,
    pub after: String,
}

impl FilePlan {
    pub fn is_changed(&self) -> bool {
        self.before != self.after
    }

    pub fn rewrite(&self) -> Rewrite {
        Rewrite::new(&self.path, &self.before, self.after.as_str())
    }
}

/// Everything an edit script would do, computed without touching disk.
#[derive(Debug, Default)]
pub struct Plan {
    pub reports: Vec<EditReport>,
    pub files: Vec<FilePlan>,
}

impl Plan {
    pub fn changed_files(&self) -> impl Iterator<Item = &FilePlan> + '_ {
        self.files.iter().filter(|file| file.is_changed())
    }
}

/// Run the script against in-memory documents. `Applied` means "would
/// apply".
pub fn plan_edits(script: &EditScript, guard: &WorkspaceGuard) -> Plan {
    let mut by_file: IndexMap<PathBuf, Vec<&EditDefinition>> = IndexMap::new();
    for edit in &script.edits {
        let target = if script.meta.workspace_relative {
            guard.workspace_root().join(&edit.file)
        } else {
            let raw = PathBuf::from(&edit.file);
            match std::env::current_dir() {
                Ok(cwd) if raw.is_relative() => cwd.join(raw),
                _ => raw,
            }
        };
        by_file.entry(target).or_default().push(edit);
    }

    let mut plan = Plan::default();
    for (target, edits) in by_file {
        plan_file(&target, &edits, guard, &mut plan);
    }
    plan
}

fn plan_file(target: &Path, edits: &[&EditDefinition], guard: &WorkspaceGuard, plan: &mut Plan) {
    let fail_all = |plan: &mut Plan, err: ApplicationError| {
        for edit in edits {
            plan.reports.push(EditReport {
                id: edit.id.clone(),
                file: target.to_path_buf(),
                result: Err(err.duplicate()),
            });
        }
    };

    let path = match guard.validate_path(target) {
        Ok(path) => path,
        Err(err) => return fail_all(plan, ApplicationError::from_safety(target, err)),
    };
    let before = match fs::read_to_string(&path) {
        Ok(before) => before,
        Err(source) => {
            return fail_all(
                plan,
                ApplicationError::Io {
                    path: path.clone(),
                    source,
                },
            )
        }
    };
    let mut document = match File::parse(&before) {
        Ok(document) => document,
        Err(source) => {
            return fail_all(
                plan,
                ApplicationError::Parse {
                    path: path.clone(),
                    source,
                },
            )
        }
    };

    for edit in edits {
        let result = apply_to_document(&mut document, edit, &path);
        match &result {
            Ok(EditOutcome::Skipped { reason, .. }) => {
                warn!(id = %edit.id, %reason, "edit skipped")
            }
            Ok(EditOutcome::Failed { reason, .. }) => {
                warn!(id = %edit.id, %reason, "edit failed")
            }
            Ok(outcome) => debug!(id = %edit.id, %outcome, "planned edit"),
            Err(err) => warn!(id = %edit.id, error = %err, "edit errored"),
        }
        plan.reports.push(EditReport {
            id: edit.id.clone(),
            file: path.clone(),
            result,
        });
    }

    plan.files.push(FilePlan {
        path,
        before,
        after: document.to_string(),
    });
}

/// Plan the script and write every changed file.
pub fn apply_edits(script: &EditScript, guard: &WorkspaceGuard) -> Vec<EditReport> {
    apply_plan(plan_edits(script, guard))
}

/// Write the files of an already computed plan. A file that changed on
/// disk since it was planned is left alone and its applied edits become
/// write errors.
pub fn apply_plan(mut plan: Plan) -> Vec<EditReport> {
    for file in plan.files.iter().filter(|file| file.is_changed()) {
        let reason = match file.rewrite().apply() {
            Ok(RewriteResult::Applied { .. }) | Ok(RewriteResult::AlreadyApplied { .. }) => {
                continue
            }
            Err(err) => err.to_string(),
        };
        warn!(file = %file.path.display(), %reason, "rewrite failed");
        for report in plan.reports.iter_mut().filter(|report| report.file == file.path) {
            if matches!(report.result, Ok(EditOutcome::Applied { .. })) {
                report.result = Err(ApplicationError::Write {
                    path: file.path.clone(),
                    reason: reason.clone(),
                });
            }
        }
    }

    plan.reports
}

/// Apply one edit to a parsed document.
pub fn apply_to_document(
    document: &mut File,
    edit: &EditDefinition,
    path: &Path,
) -> Result<EditOutcome, ApplicationError> {
    let query_error = |source| ApplicationError::Query {
        path: path.to_path_buf(),
        source,
    };
    let block_path = BlockPath::parse_all(&edit.block).map_err(query_error)?;
    let body = block_path
        .resolve_mut(document.body_mut())
        .map_err(query_error)?;
    apply_operation(
        body,
        &edit.operation,
        edit.constraint.unwrap_or_default(),
        path,
    )
}

fn apply_operation(
    body: &mut Body,
    operation: &Operation,
    constraint: Constraints,
    path: &Path,
) -> Result<EditOutcome, ApplicationError> {
    let file = path.to_path_buf();
    let outcome = match operation {
        Operation::SetValue { name, value } => match body.get_attribute(name) {
            Some(_) if constraint.ensure_absent => EditOutcome::Skipped {
                file,
                reason: format!("attribute '{name}' already present"),
            },
            Some(attr) if attr.expr().as_literal() == Some(value) => {
                EditOutcome::AlreadyApplied { file }
            }
            None if constraint.ensure_present => EditOutcome::Failed {
                file,
                reason: format!("attribute '{name}' not found"),
            },
            _ => {
                body.set_attribute_value(name, value.clone());
                EditOutcome::Applied { file }
            }
        },
        Operation::SetTraversal { name, traversal } => {
            let traversal =
                Traversal::parse(traversal).map_err(|source| ApplicationError::Traversal {
                    path: path.to_path_buf(),
                    source,
                })?;
            match body.get_attribute(name) {
                Some(_) if constraint.ensure_absent => EditOutcome::Skipped {
                    file,
                    reason: format!("attribute '{name}' already present"),
                },
                Some(attr) if attr.expr().as_traversal() == Some(&traversal) => {
                    EditOutcome::AlreadyApplied { file }
                }
                None if constraint.ensure_present => EditOutcome::Failed {
                    file,
                    reason: format!("attribute '{name}' not found"),
                },
                _ => {
                    body.set_attribute_traversal(name, &traversal);
                    EditOutcome::Applied { file }
                }
            }
        }
        Operation::AppendBlock {
            block_type,
            labels,
            blank_line,
            attributes,
        } => {
            if constraint.ensure_absent
                && body.first_matching_block(block_type, labels.as_slice()).is_some()
            {
                EditOutcome::AlreadyApplied { file }
            } else {
                let block = body.append_block(block_type, labels.iter().cloned(), *blank_line);
                for (name, value) in attributes {
                    block.body_mut().set_attribute_value(name, value.clone());
                }
                EditOutcome::Applied { file }
            }
        }
        Operation::RemoveAttribute { name } => match body.remove_attribute(name) {
            Some(_) => EditOutcome::Applied { file },
            None if constraint.ensure_present => EditOutcome::Failed {
                file,
                reason: format!("attribute '{name}' not found"),
            },
            None => EditOutcome::AlreadyApplied { file },
        },
        Operation::RemoveBlock { block_type, labels } => {
            match body.remove_block(block_type, labels.as_slice()) {
                Some(_) => EditOutcome::Applied { file },
                None if constraint.ensure_present => EditOutcome::Failed {
                    file,
                    reason: format!("block '{block_type}' {labels:?} not found"),
                },
                None => EditOutcome::AlreadyApplied { file },
            }
        }
    };
    Ok(outcome)
}
