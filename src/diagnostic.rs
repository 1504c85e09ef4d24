use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTIC CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const MISSING_IDENTIFIER_CODE: u32 = 9999;
pub const DUPLICATE_IDENTIFIER_CODE: u32 = 9998;

pub const MISSING_IDENTIFIER_MESSAGE: &str =
    "Missing identifier for export. This member will not be included in the barrel.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Suggestion,
    Message,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Suggestion => "suggestion",
            Self::Message => "message",
        };
        f.write_str(label)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTIC
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub file: String,
    pub start: u32,
    pub length: u32,
    pub line: u32,
    pub column: u32,
    pub category: DiagnosticCategory,
    pub code: u32,
    pub message: String,
    /// Source text of the offending declaration.
    pub key: Option<String>,
}

impl Diagnostic {
    /// Warning for an export whose identifier cannot be derived from syntax.
    pub fn missing_identifier(file: &Path, source: &str, start: u32, end: u32) -> Self {
        Self::warning(
            file,
            source,
            start,
            end,
            MISSING_IDENTIFIER_CODE,
            MISSING_IDENTIFIER_MESSAGE.to_string(),
        )
    }

    pub fn duplicate_identifier(
        file: &Path,
        source: &str,
        start: u32,
        end: u32,
        identifier: &str,
        shadowed: &str,
    ) -> Self {
        Self::warning(
            file,
            source,
            start,
            end,
            DUPLICATE_IDENTIFIER_CODE,
            format!(
                "Identifier '{}' is also exported by '{}'. Only this export is reachable through the barrel.",
                identifier, shadowed
            ),
        )
    }

    fn warning(file: &Path, source: &str, start: u32, end: u32, code: u32, message: String) -> Self {
        let (line, column) = line_column(source, start);
        let key = source
            .get(start as usize..end as usize)
            .map(|s| s.to_string());

        Self {
            file: file.to_string_lossy().to_string(),
            start,
            length: end.saturating_sub(start),
            line,
            column,
            category: DiagnosticCategory::Warning,
            code,
            message,
            key,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({},{}): {} TS{}: {}",
            self.file, self.line, self.column, self.category, self.code, self.message
        )
    }
}

/// 1-based line and column of a byte offset.
fn line_column(source: &str, offset: u32) -> (u32, u32) {
    let offset = (offset as usize).min(source.len());
    let before = &source[..offset];
    let line = before.matches('\n').count() as u32 + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() as u32 + 1;
    (line, column)
}

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTIC CACHE
// ═══════════════════════════════════════════════════════════════════════════════

/// Warnings produced while synthesizing barrels, keyed by origin file.
/// Merged into the host's own diagnostics at query time, never written out.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticCache {
    entries: BTreeMap<PathBuf, Vec<Diagnostic>>,
}

impl DiagnosticCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, file: PathBuf, diagnostics: Vec<Diagnostic>) {
        if diagnostics.is_empty() {
            self.entries.remove(&file);
        } else {
            self.entries.insert(file, diagnostics);
        }
    }

    pub fn extend(&mut self, other: BTreeMap<PathBuf, Vec<Diagnostic>>) {
        for (file, diagnostics) in other {
            self.set(file, diagnostics);
        }
    }

    pub fn get(&self, file: &Path) -> Option<&[Diagnostic]> {
        self.entries.get(file).map(|d| d.as_slice())
    }

    pub fn all(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.values().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Host diagnostics first, ours appended.
    pub fn merge_into(&self, mut host: Vec<Diagnostic>, file: Option<&Path>) -> Vec<Diagnostic> {
        match file {
            Some(file) => host.extend(self.get(file).unwrap_or_default().iter().cloned()),
            None => host.extend(self.all().cloned()),
        }
        host
    }
}
