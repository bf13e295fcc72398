use crate::query::BlockSelector;
use crate::syntax::is_identifier;
use crate::traversal::Traversal;
use crate::value::Value;
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

/// A TOML edit script: metadata plus an ordered list of edits.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct EditScript {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub edits: Vec<EditDefinition>,
}

impl EditScript {
    /// Check every edit, collecting all problems rather than stopping at
    /// the first.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.edits.is_empty() {
            issues.push(ValidationIssue::EmptyEditList);
        }

        let mut seen_ids = HashSet::new();
        for edit in &self.edits {
            let id = Some(edit.id.clone());
            if edit.id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    edit_id: None,
                    field: "id",
                });
            } else if !seen_ids.insert(edit.id.as_str()) {
                issues.push(ValidationIssue::InvalidCombo {
                    edit_id: id.clone(),
                    message: "duplicate edit id".to_string(),
                });
            }
            if edit.file.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    edit_id: id.clone(),
                    field: "file",
                });
            }

            for selector in &edit.block {
                if let Err(err) = BlockSelector::parse(selector) {
                    issues.push(ValidationIssue::InvalidCombo {
                        edit_id: id.clone(),
                        message: err.to_string(),
                    });
                }
            }

            let constraint = edit.constraint.unwrap_or_default();
            if constraint.ensure_absent && constraint.ensure_present {
                issues.push(ValidationIssue::InvalidCombo {
                    edit_id: id.clone(),
                    message: "ensure_absent and ensure_present cannot both be true".to_string(),
                });
            }

            match &edit.operation {
                Operation::SetValue { name, .. } => {
                    check_name(&mut issues, &id, "operation.name", name);
                }
                Operation::SetTraversal { name, traversal } => {
                    check_name(&mut issues, &id, "operation.name", name);
                    if traversal.trim().is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            edit_id: id.clone(),
                            field: "operation.traversal",
                        });
                    } else if let Err(err) = Traversal::parse(traversal) {
                        issues.push(ValidationIssue::InvalidCombo {
                            edit_id: id.clone(),
                            message: err.to_string(),
                        });
                    }
                }
                Operation::AppendBlock {
                    block_type,
                    attributes,
                    ..
                } => {
                    check_name(&mut issues, &id, "operation.block_type", block_type);
                    for name in attributes.keys() {
                        check_name(&mut issues, &id, "operation.attributes", name);
                    }
                    if constraint.ensure_present {
                        issues.push(ValidationIssue::InvalidCombo {
                            edit_id: id.clone(),
                            message: "append-block cannot require the block to be present"
                                .to_string(),
                        });
                    }
                }
                Operation::RemoveAttribute { name } => {
                    check_name(&mut issues, &id, "operation.name", name);
                    if constraint.ensure_absent {
                        issues.push(ValidationIssue::InvalidCombo {
                            edit_id: id.clone(),
                            message: "remove-attribute cannot require the attribute to be absent"
                                .to_string(),
                        });
                    }
                }
                Operation::RemoveBlock { block_type, .. } => {
                    check_name(&mut issues, &id, "operation.block_type", block_type);
                    if constraint.ensure_absent {
                        issues.push(ValidationIssue::InvalidCombo {
                            edit_id: id.clone(),
                            message: "remove-block cannot require the block to be absent"
                                .to_string(),
                        });
                    }
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

fn check_name(
    issues: &mut Vec<ValidationIssue>,
    edit_id: &Option<String>,
    field: &'static str,
    name: &str,
) {
    if name.trim().is_empty() {
        issues.push(ValidationIssue::MissingField {
            edit_id: edit_id.clone(),
            field,
        });
    } else if !is_identifier(name) {
        issues.push(ValidationIssue::InvalidCombo {
            edit_id: edit_id.clone(),
            message: format!("'{name}' is not a valid identifier for {field}"),
        });
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Resolve `file` against the workspace root instead of the current
    /// directory.
    #[serde(default)]
    pub workspace_relative: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EditDefinition {
    pub id: String,
    pub file: String,
    /// Selectors of the nested block whose body is edited; empty means the
    /// document root.
    #[serde(default)]
    pub block: Vec<String>,
    pub operation: Operation,
    #[serde(default)]
    pub constraint: Option<Constraints>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Operation {
    SetValue {
        name: String,
        value: Value,
    },
    SetTraversal {
        name: String,
        traversal: String,
    },
    AppendBlock {
        block_type: String,
        #[serde(default)]
        labels: Vec<String>,
        #[serde(default)]
        blank_line: bool,
        /// Attributes set inside the new block, in script order.
        #[serde(default)]
        attributes: IndexMap<String, Value>,
    },
    RemoveAttribute {
        name: String,
    },
    RemoveBlock {
        block_type: String,
        #[serde(default)]
        labels: Vec<String>,
    },
}

impl Operation {
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::SetValue { .. } => "set-value",
            Operation::SetTraversal { .. } => "set-traversal",
            Operation::AppendBlock { .. } => "append-block",
            Operation::RemoveAttribute { .. } => "remove-attribute",
            Operation::RemoveBlock { .. } => "remove-block",
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct Constraints {
    /// Only create; leave an existing target untouched.
    #[serde(default)]
    pub ensure_absent: bool,
    /// Only update; a missing target fails the edit.
    #[serde(default)]
    pub ensure_present: bool,
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyEditList,
    MissingField {
        edit_id: Option<String>,
        field: &'static str,
    },
    InvalidCombo {
        edit_id: Option<String>,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyEditList => write!(f, "edit script contains no edits"),
            ValidationIssue::MissingField { edit_id, field } => match edit_id {
                Some(id) => write!(f, "edit '{id}' missing required field '{field}'"),
                None => write!(f, "edit missing required field '{field}'"),
            },
            ValidationIssue::InvalidCombo { edit_id, message } => match edit_id {
                Some(id) => write!(f, "edit '{id}' has invalid configuration: {message}"),
                None => write!(f, "invalid edit configuration: {message}"),
            },
        }
    }
}
