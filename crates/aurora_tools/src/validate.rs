//! Content table validation and export.
//!
//! Unlike [`ContentTables::load`], which stops at the first failure, the
//! validator parses without checking and then reports every problem so an
//! author can fix a file in one pass.

use std::path::{Path, PathBuf};

use aurora_core::content::ContentTables;
use aurora_core::error::BattleError;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that stop validation before any report is produced.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Filesystem failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Serializing the tables failed.
    #[error(transparent)]
    Content(#[from] BattleError),
    /// Directory contains no `.ron` files.
    #[error("No .ron files found in {0}")]
    NothingToValidate(String),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ToolError + '_ {
    move |source| ToolError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Outcome of validating one content file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// File checked; `None` for the built-in tables.
    pub source: Option<PathBuf>,
    /// Problems found, empty when valid.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Whether no problems were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Display name of the checked source.
    #[must_use]
    pub fn label(&self) -> String {
        self.source
            .as_ref()
            .map_or_else(|| "<built-in>".to_string(), |p| p.display().to_string())
    }
}

/// Validate the tables compiled into the core.
#[must_use]
pub fn validate_builtin() -> ValidationReport {
    ValidationReport {
        source: None,
        errors: ContentTables::builtin().validate(),
    }
}

/// Validate a RON source; parse failures become a single report line.
#[must_use]
pub fn validate_content_str(source: &str) -> Vec<String> {
    match ron::from_str::<ContentTables>(source) {
        Ok(tables) => tables.validate(),
        Err(e) => vec![format!("parse error: {e}")],
    }
}

/// Validate one content file.
pub fn validate_content_file(path: &Path) -> Result<ValidationReport, ToolError> {
    let source = std::fs::read_to_string(path).map_err(io_error(path))?;
    let errors = validate_content_str(&source);
    debug!(path = %path.display(), problems = errors.len(), "Validated content file");
    Ok(ValidationReport {
        source: Some(path.to_path_buf()),
        errors,
    })
}

/// Validate a content file, or every `.ron` file in a directory.
///
/// Files are checked in name order.
pub fn validate_path(path: &Path) -> Result<Vec<ValidationReport>, ToolError> {
    if !path.is_dir() {
        return Ok(vec![validate_content_file(path)?]);
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(path)
        .map_err(io_error(path))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(ToolError::NothingToValidate(path.display().to_string()));
    }

    let reports = files
        .iter()
        .map(|file| validate_content_file(file))
        .collect::<Result<Vec<_>, _>>()?;
    let failed = reports.iter().filter(|r| !r.is_valid()).count();
    if failed > 0 {
        warn!(files = reports.len(), failed, "Content validation found problems");
    } else {
        info!(files = reports.len(), "All content files valid");
    }
    Ok(reports)
}

/// Write the built-in tables to `path` as pretty RON.
pub fn export_builtin(path: &Path) -> Result<(), ToolError> {
    let ron = ContentTables::builtin().to_ron_string()?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
    }
    std::fs::write(path, ron).map_err(io_error(path))?;
    info!(path = %path.display(), "Exported built-in content");
    Ok(())
}
