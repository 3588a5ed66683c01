use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Structured summary of one source file: package, primary declared type,
/// imports, and the resolved dependency set computed later in the run.
/// Serializes with the camelCase field names the analysis service consumes;
/// the primary type travels as `className` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub path: String,
    pub file_name: String,
    pub package_name: String,
    #[serde(rename = "className")]
    pub primary_type: String,
    pub imports: HashSet<String>,
    pub dependencies: HashSet<String>,
    pub line_count: usize,
}

pub struct SourceFileParser {
    package_pattern: Regex,
    type_pattern: Regex,
    import_pattern: Regex,
}

impl SourceFileParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            package_pattern: Regex::new(r"(?m)^\s*package\s+([^;]+);")?,
            type_pattern: Regex::new(r"\b(?:class|interface|enum)\s+([A-Za-z_][A-Za-z0-9_]*)")?,
            import_pattern: Regex::new(r"(?m)^\s*import\s+([^;]+);")?,
        })
    }

    /// Parse raw file content into a descriptor. Total over its input:
    /// malformed or non-source text yields empty sentinels, never an error.
    pub fn parse_content(&self, path: &str, file_name: &str, content: &str) -> FileDescriptor {
        FileDescriptor {
            path: path.to_string(),
            file_name: file_name.to_string(),
            package_name: self.extract_package(content),
            primary_type: self.extract_primary_type(content),
            imports: self.extract_imports(content),
            dependencies: HashSet::new(),
            line_count: count_lines(content),
        }
    }

    fn extract_package(&self, content: &str) -> String {
        self.package_pattern
            .captures(content)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    }

    fn extract_primary_type(&self, content: &str) -> String {
        self.type_pattern
            .captures(content)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default()
    }

    fn extract_imports(&self, content: &str) -> HashSet<String> {
        self.import_pattern
            .captures_iter(content)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            // java.lang is implicit and never resolves to a project file
            .filter(|import| !import.starts_with("java.lang"))
            .collect()
    }
}

/// Newline-delimited segment count. Trailing empty segments do not count,
/// so a final newline adds no line; completely empty input still counts as
/// one segment.
fn count_lines(content: &str) -> usize {
    let mut count = content.split('\n').count();
    for segment in content.split('\n').rev() {
        if segment.is_empty() && count > 0 {
            count -= 1;
        } else {
            break;
        }
    }
    if count == 0 && content.is_empty() {
        1
    } else {
        count
    }
}
