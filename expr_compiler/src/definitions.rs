//! Named expression definitions loaded from text or TOML files
//!
//! Text format, one definition per line:
//!
//! ```text
//! # comment
//! speed = magnitude(velocity)
//! ke    = 0.5 * density * speed^2
//! ```
//!
//! TOML files (`.toml`) keep the definitions in an `[expressions]` table.

use crate::config::compile_time::batch_processing::MAX_DEFINITION_FILE_SIZE;
use crate::logging::{codes, Code};
use crate::{log_error, log_success};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DefinitionError {
    #[error("Definition file not found: {path}")]
    NotFound { path: String },

    #[error("Cannot read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Definition file too large: {size} bytes (max: {max_size})")]
    TooLarge { size: u64, max_size: u64 },

    #[error("Line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("Line {line}: \"{name}\" is already defined on line {first_line}")]
    Duplicate {
        name: String,
        line: usize,
        first_line: usize,
    },

    #[error("Invalid TOML definitions: {message}")]
    Toml { message: String },
}

impl DefinitionError {
    pub fn error_code(&self) -> Code {
        match self {
            DefinitionError::NotFound { .. } | DefinitionError::Io { .. } => {
                codes::system::IO_ERROR
            }
            DefinitionError::TooLarge { .. } => codes::batch::DEFINITION_FILE_TOO_LARGE,
            DefinitionError::Syntax { .. } | DefinitionError::Toml { .. } => {
                codes::batch::DEFINITION_SYNTAX
            }
            DefinitionError::Duplicate { .. } => codes::batch::DUPLICATE_DEFINITION,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }
}

/// `name = expression`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    pub name: String,
    pub expression: String,
    /// 1-based source line; 0 when the source has no lines (TOML)
    pub line: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefinitionSet {
    definitions: Vec<Definition>,
    source: Option<PathBuf>,
}

impl DefinitionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, definition: Definition) -> Result<(), DefinitionError> {
        if let Some(first) = self.get(&definition.name) {
            return Err(DefinitionError::Duplicate {
                name: definition.name,
                line: definition.line,
                first_line: first.line,
            });
        }
        self.definitions.push(definition);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Definition> {
        self.definitions.iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn into_vec(self) -> Vec<Definition> {
        self.definitions
    }
}

impl<'a> IntoIterator for &'a DefinitionSet {
    type Item = &'a Definition;
    type IntoIter = std::slice::Iter<'a, Definition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Parse the line-oriented format
pub fn parse_definitions(text: &str) -> Result<DefinitionSet, DefinitionError> {
    let mut set = DefinitionSet::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let (name, expression) = trimmed.split_once('=').ok_or_else(|| DefinitionError::Syntax {
            line,
            message: String::from("expected name = expression"),
        })?;
        let (name, expression) = (name.trim(), expression.trim());
        if !is_valid_name(name) {
            return Err(DefinitionError::Syntax {
                line,
                message: format!("\"{}\" is not a valid expression name", name),
            });
        }
        if expression.is_empty() {
            return Err(DefinitionError::Syntax {
                line,
                message: format!("\"{}\" has no expression", name),
            });
        }
        set.push(Definition {
            name: name.to_string(),
            expression: expression.to_string(),
            line,
        })?;
    }
    Ok(set)
}

#[derive(Deserialize)]
struct TomlDefinitions {
    #[serde(default)]
    expressions: BTreeMap<String, String>,
}

/// Parse an `[expressions]` table; entries come back sorted by name
pub fn parse_toml_definitions(text: &str) -> Result<DefinitionSet, DefinitionError> {
    let parsed: TomlDefinitions = toml::from_str(text).map_err(|e| DefinitionError::Toml {
        message: e.to_string(),
    })?;
    let mut set = DefinitionSet::new();
    for (name, expression) in parsed.expressions {
        if !is_valid_name(&name) || expression.trim().is_empty() {
            return Err(DefinitionError::Toml {
                message: format!("invalid definition \"{}\"", name),
            });
        }
        set.push(Definition {
            name,
            expression: expression.trim().to_string(),
            line: 0,
        })?;
    }
    Ok(set)
}

/// Load a definition file, choosing the format by extension
pub fn load_definitions<P: AsRef<Path>>(path: P) -> Result<DefinitionSet, DefinitionError> {
    let path = path.as_ref();
    let result = read_definitions(path);
    match &result {
        Ok(set) => log_success!(
            codes::success::DEFINITIONS_LOADED,
            "Definition file loaded",
            "file" => path.display(),
            "definitions" => set.len()
        ),
        Err(error) => log_error!(error.error_code(), &error.to_string(),
            "file" => path.display()
        ),
    }
    result
}

fn read_definitions(path: &Path) -> Result<DefinitionSet, DefinitionError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DefinitionError::NotFound {
            path: path.display().to_string(),
        },
        _ => DefinitionError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        },
    })?;
    if metadata.len() > MAX_DEFINITION_FILE_SIZE {
        return Err(DefinitionError::TooLarge {
            size: metadata.len(),
            max_size: MAX_DEFINITION_FILE_SIZE,
        });
    }
    let text = fs::read_to_string(path).map_err(|e| DefinitionError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    let mut set = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => parse_toml_definitions(&text)?,
        _ => parse_definitions(&text)?,
    };
    set.source = Some(path.to_path_buf());
    Ok(set)
}

/// Definitions as a name to expression map
pub fn to_map(set: &DefinitionSet) -> HashMap<&str, &str> {
    set.iter()
        .map(|d| (d.name.as_str(), d.expression.as_str()))
        .collect()
}
