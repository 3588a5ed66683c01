use crate::config::Config;
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
}

pub struct FileDiscovery {
    config: Config,
}

impl FileDiscovery {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Walk the target directory and collect every source file that passes
    /// the extension, size, and ignore-pattern filters. Each path appears
    /// at most once.
    pub fn discover_files(&self) -> crate::Result<Vec<FileInfo>> {
        let mut files = Vec::new();

        let mut walker_builder = WalkBuilder::new(&self.config.target_directory);
        walker_builder
            .standard_filters(true)
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true);

        for result in walker_builder.build() {
            let entry = result?;
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            if self.should_ignore_file(path) {
                continue;
            }

            if let Some(file_info) = self.process_file(path)? {
                files.push(file_info);
            }
        }

        Ok(files)
    }

    fn should_ignore_file(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.config.ignore_patterns {
            if let Some(ext) = pattern.strip_prefix("*.") {
                if let Some(filename) = path.file_name() {
                    if filename.to_string_lossy().ends_with(&format!(".{}", ext)) {
                        return true;
                    }
                }
            } else if pattern.contains('*') {
                // General wildcard patterns become a simple regex
                let regex_pattern = pattern.replace('*', ".*");
                if let Ok(re) = regex::Regex::new(&regex_pattern) {
                    if re.is_match(&path_str) {
                        return true;
                    }
                    if let Some(filename) = path.file_name() {
                        if re.is_match(&filename.to_string_lossy()) {
                            return true;
                        }
                    }
                }
            } else if path_str.contains(pattern.as_str()) {
                return true;
            }
        }

        false
    }

    fn process_file(&self, path: &Path) -> crate::Result<Option<FileInfo>> {
        let metadata = fs::metadata(path)?;
        let size = metadata.len();

        if size > self.config.max_file_size as u64 {
            return Ok(None);
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase());

        match extension {
            Some(ref ext) if self.config.file_extensions.contains(ext) => {}
            _ => return Ok(None),
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Some(FileInfo {
            path: path.to_path_buf(),
            file_name,
            size,
        }))
    }
}
