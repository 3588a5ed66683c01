use crate::config::Config;
use crate::diff::ChangedFile;
use crate::file_discovery::{FileDiscovery, FileInfo};
use crate::graph::DependencyGraph;
use crate::parser::SourceFileParser;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;

/// One analysis session for one project. Owns its own parser and discovery
/// state; independent sessions never share anything. A rebuild produces a
/// complete new graph value, so callers never observe partial results.
pub struct AnalysisSession {
    config: Config,
    file_discovery: FileDiscovery,
    parser: SourceFileParser,
}

impl AnalysisSession {
    pub fn new(config: Config) -> Result<Self> {
        let file_discovery = FileDiscovery::new(config.clone());
        let parser = SourceFileParser::new()?;

        Ok(Self {
            config,
            file_discovery,
            parser,
        })
    }

    pub fn project_name(&self) -> String {
        self.config
            .target_directory
            .canonicalize()
            .unwrap_or_else(|_| self.config.target_directory.clone())
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Run a full analysis pass: discover, read, parse, build. Unreadable
    /// files are reported and skipped; they never abort the run.
    pub fn analyze(&self) -> Result<AnalysisRun> {
        let files = self.file_discovery.discover_files()?;
        println!("Found {} source files", files.len());

        let mut descriptors = Vec::with_capacity(files.len());
        let mut skipped_files = Vec::new();

        for file in &files {
            match fs::read_to_string(&file.path) {
                Ok(content) => {
                    let path = file.path.to_string_lossy();
                    descriptors.push(self.parser.parse_content(&path, &file.file_name, &content));
                }
                Err(e) => {
                    eprintln!("Skipping unreadable file {}: {}", file.path.display(), e);
                    skipped_files.push(file.path.to_string_lossy().to_string());
                }
            }
        }

        let graph = DependencyGraph::build(descriptors);

        Ok(AnalysisRun {
            project_name: self.project_name(),
            files,
            graph,
            skipped_files,
        })
    }
}

/// Complete output of one analysis pass.
pub struct AnalysisRun {
    pub project_name: String,
    pub files: Vec<FileInfo>,
    pub graph: DependencyGraph,
    pub skipped_files: Vec<String>,
}

impl AnalysisRun {
    /// Correlate parsed change records against the graph: for each changed
    /// file, the set of project files whose dependencies point at it. Diff
    /// paths are repository-relative while graph paths are absolute, so a
    /// changed path matches the graph node whose path ends with it.
    pub fn impact_of_changes(&self, changed_files: &[ChangedFile]) -> Vec<FileImpact> {
        changed_files
            .iter()
            .map(|changed| FileImpact {
                changed_path: changed.path.clone(),
                status: changed.status.to_string(),
                lines_changed: changed.lines_changed,
                affected_files: self.impact_of(&changed.path),
            })
            .collect()
    }

    /// Impact set for one changed path, given in either graph-rooted or
    /// repository-relative form.
    pub fn impact_of(&self, changed_path: &str) -> BTreeSet<String> {
        self.resolve_changed_path(changed_path)
            .map(|p| self.graph.files_affected_by_change(&p))
            .unwrap_or_default()
    }

    fn resolve_changed_path(&self, changed_path: &str) -> Option<String> {
        if changed_path.is_empty() {
            return None;
        }
        let files = self.graph.files();
        if files.iter().any(|p| p == changed_path) {
            return Some(changed_path.to_string());
        }
        files
            .into_iter()
            .find(|p| p.ends_with(&format!("/{}", changed_path)))
    }
}

/// Impact of one changed file: everything that depends on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileImpact {
    pub changed_path: String,
    pub status: String,
    pub lines_changed: usize,
    pub affected_files: BTreeSet<String>,
}
