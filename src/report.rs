use crate::analyzer::{AnalysisRun, FileImpact};
use crate::graph::GraphStatistics;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

#[derive(Debug, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub statistics: GraphStatistics,
    pub skipped_files: Vec<String>,
    pub impacts: Vec<FileImpact>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: String,
    pub project_name: String,
    pub total_files: usize,
    pub version: String,
}

pub struct Reporter;

impl Reporter {
    pub fn new() -> Self {
        Self
    }

    pub fn generate_report(&self, run: &AnalysisRun, impacts: Vec<FileImpact>) -> Report {
        Report {
            metadata: ReportMetadata {
                generated_at: chrono::Utc::now().to_rfc3339(),
                project_name: run.project_name.clone(),
                total_files: run.graph.file_count(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            statistics: run.graph.statistics(),
            skipped_files: run.skipped_files.clone(),
            impacts,
        }
    }

    /// Write the report as JSON and a Markdown summary; returns the paths
    /// of the files written.
    pub fn export_report(&self, report: &Report, output_dir: &PathBuf) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(output_dir)?;

        let json_path = output_dir.join("analysis.json");
        fs::write(&json_path, serde_json::to_string_pretty(report)?)?;

        let md_path = output_dir.join("analysis.md");
        fs::write(&md_path, self.generate_markdown_summary(report))?;

        Ok(vec![json_path, md_path])
    }

    fn generate_markdown_summary(&self, report: &Report) -> String {
        let mut md = String::new();

        md.push_str(&format!("# Dependency Analysis: {}\n\n", report.metadata.project_name));
        md.push_str(&format!("Generated: {}\n\n", report.metadata.generated_at));

        md.push_str("## Statistics\n\n");
        md.push_str(&format!("- Total files: {}\n", report.statistics.total_files));
        md.push_str(&format!(
            "- Total dependencies: {}\n",
            report.statistics.total_dependencies
        ));
        md.push_str(&format!(
            "- Average dependencies per file: {:.2}\n",
            report.statistics.average_dependencies_per_file
        ));
        md.push_str(&format!(
            "- Most dependencies: {} ({})\n\n",
            report.statistics.file_with_most_dependencies, report.statistics.max_dependencies
        ));

        if !report.skipped_files.is_empty() {
            md.push_str("## Skipped files\n\n");
            for path in &report.skipped_files {
                md.push_str(&format!("- {}\n", path));
            }
            md.push('\n');
        }

        if !report.impacts.is_empty() {
            md.push_str("## Change impact\n\n");
            for impact in &report.impacts {
                md.push_str(&format!(
                    "### {} ({}, {} lines)\n\n",
                    impact.changed_path, impact.status, impact.lines_changed
                ));
                if impact.affected_files.is_empty() {
                    md.push_str("No project files depend on this file.\n\n");
                } else {
                    for affected in &impact.affected_files {
                        md.push_str(&format!("- {}\n", affected));
                    }
                    md.push('\n');
                }
            }
        }

        md
    }
}
