use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Deleted,
    Renamed,
    Modified,
}

impl std::fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ChangeStatus::Added => "added",
            ChangeStatus::Deleted => "deleted",
            ChangeStatus::Renamed => "renamed",
            ChangeStatus::Modified => "modified",
        };
        f.write_str(s)
    }
}

/// One file's edits extracted from a diff segment. Immutable after
/// construction; `lines_changed` is fixed as additions + deletions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangedFile {
    pub path: String,
    pub status: ChangeStatus,
    pub additions: usize,
    pub deletions: usize,
    #[serde(rename = "linesChanged")]
    pub lines_changed: usize,
    pub diff: String,
}

impl ChangedFile {
    pub fn new(
        path: String,
        status: ChangeStatus,
        additions: usize,
        deletions: usize,
        diff: String,
    ) -> Self {
        Self {
            path,
            status,
            additions,
            deletions,
            lines_changed: additions + deletions,
            diff,
        }
    }

    /// Hunk headers plus their `+`/`-`/context lines, with file headers and
    /// index noise stripped. Best-effort view for display.
    pub fn meaningful_diff(&self) -> String {
        let mut out = String::new();
        let mut in_hunk = false;
        for line in self.diff.split('\n') {
            if line.starts_with("@@") {
                out.push_str(line);
                out.push('\n');
                in_hunk = true;
            } else if in_hunk
                && (line.starts_with('+') || line.starts_with('-') || line.starts_with(' '))
            {
                out.push_str(line);
                out.push('\n');
            }
        }
        out.trim().to_string()
    }
}

pub struct DiffParser {
    path_pattern: Regex,
}

impl DiffParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            path_pattern: Regex::new(r"diff --git a/(.*?) b/")?,
        })
    }

    /// Parse one multi-file unified diff blob into ordered change records.
    /// Total over its input: a blank blob yields an empty list, a segment
    /// without recognizable markers yields default field values.
    pub fn parse(&self, diff_output: &str) -> Vec<ChangedFile> {
        self.split_file_blocks(diff_output)
            .into_iter()
            .filter(|block| !block.trim().is_empty())
            .map(|block| self.parse_file_block(block))
            .collect()
    }

    /// Split at each `diff --git` header, keeping the header with its block.
    /// Any leading text before the first header is dropped.
    fn split_file_blocks<'a>(&self, diff_output: &'a str) -> Vec<&'a str> {
        let mut starts: Vec<usize> = Vec::new();
        let mut offset = 0;
        for line in diff_output.split_inclusive('\n') {
            if line.starts_with("diff --git") {
                starts.push(offset);
            }
            offset += line.len();
        }
        if starts.is_empty() {
            return Vec::new();
        }

        let mut blocks = Vec::with_capacity(starts.len());
        for (i, &start) in starts.iter().enumerate() {
            let end = starts.get(i + 1).copied().unwrap_or(diff_output.len());
            blocks.push(&diff_output[start..end]);
        }
        blocks
    }

    fn parse_file_block(&self, block: &str) -> ChangedFile {
        let path = self
            .path_pattern
            .captures(block)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        let status = Self::determine_status(block);
        let additions = Self::count_additions(block);
        let deletions = Self::count_deletions(block);

        ChangedFile::new(path, status, additions, deletions, block.to_string())
    }

    /// First matching marker wins: a block carrying both `new file mode`
    /// and `rename from` classifies as added.
    fn determine_status(block: &str) -> ChangeStatus {
        if block.contains("new file mode") {
            ChangeStatus::Added
        } else if block.contains("deleted file mode") {
            ChangeStatus::Deleted
        } else if block.contains("rename from") {
            ChangeStatus::Renamed
        } else {
            ChangeStatus::Modified
        }
    }

    /// Lines starting with a single `+`; the `+++` path marker is excluded.
    fn count_additions(block: &str) -> usize {
        block
            .split('\n')
            .filter(|line| line.starts_with('+') && !line.starts_with("++"))
            .count()
    }

    /// Lines starting with a single `-`; the `---` path marker is excluded.
    fn count_deletions(block: &str) -> usize {
        block
            .split('\n')
            .filter(|line| line.starts_with('-') && !line.starts_with("--"))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> DiffParser {
        DiffParser::new().unwrap()
    }

    const TWO_FILE_DIFF: &str = "\
diff --git a/f1 b/f1
new file mode 100644
index 0000000..3b18e51
--- /dev/null
+++ b/f1
@@ -0,0 +1,3 @@
+line one
+line two
+line three
diff --git a/f2 b/f2
index 3113c71..9b29691 100644
--- a/f2
+++ b/f2
@@ -1,2 +1,2 @@
-old line
+new line
";

    #[test]
    fn parses_two_file_diff() {
        let files = parser().parse(TWO_FILE_DIFF);
        assert_eq!(files.len(), 2);

        let f1 = &files[0];
        assert_eq!(f1.path, "f1");
        assert_eq!(f1.status, ChangeStatus::Added);
        assert_eq!(f1.additions, 3);
        assert_eq!(f1.deletions, 0);
        assert_eq!(f1.lines_changed, 3);

        let f2 = &files[1];
        assert_eq!(f2.path, "f2");
        assert_eq!(f2.status, ChangeStatus::Modified);
        assert_eq!(f2.additions, 1);
        assert_eq!(f2.deletions, 1);
        assert_eq!(f2.lines_changed, 2);
    }

    #[test]
    fn empty_or_blank_input_yields_no_records() {
        assert!(parser().parse("").is_empty());
        assert!(parser().parse("   \n\n  ").is_empty());
    }

    #[test]
    fn leading_text_before_first_header_is_dropped() {
        let blob = format!("warning: something\n{}", TWO_FILE_DIFF);
        let files = parser().parse(&blob);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, "f1");
    }

    #[test]
    fn new_file_marker_beats_rename_marker() {
        let block = "diff --git a/x b/x\nnew file mode 100644\nrename from y\n";
        let files = parser().parse(block);
        assert_eq!(files[0].status, ChangeStatus::Added);
    }

    #[test]
    fn deleted_file_marker_wins_over_rename() {
        let block = "diff --git a/x b/x\ndeleted file mode 100644\nrename from y\n";
        let files = parser().parse(block);
        assert_eq!(files[0].status, ChangeStatus::Deleted);
    }

    #[test]
    fn path_markers_do_not_count_as_changes() {
        let block = "diff --git a/x b/x\nindex 1..2 100644\n--- a/x\n+++ b/x\n";
        let files = parser().parse(block);
        assert_eq!(files[0].additions, 0);
        assert_eq!(files[0].deletions, 0);
        assert_eq!(files[0].lines_changed, 0);
    }

    #[test]
    fn missing_path_header_yields_empty_path() {
        let block = "diff --git malformed header\n+added\n";
        let files = parser().parse(block);
        assert_eq!(files[0].path, "");
        assert_eq!(files[0].additions, 1);
        assert_eq!(files[0].status, ChangeStatus::Modified);
    }

    #[test]
    fn raw_block_is_kept_verbatim() {
        let files = parser().parse(TWO_FILE_DIFF);
        assert!(files[0].diff.starts_with("diff --git a/f1 b/f1"));
        assert!(files[0].diff.contains("+line three"));
    }

    #[test]
    fn meaningful_diff_keeps_hunks_and_drops_headers() {
        let files = parser().parse(TWO_FILE_DIFF);
        let meaningful = files[1].meaningful_diff();
        assert!(meaningful.starts_with("@@"));
        assert!(meaningful.contains("-old line"));
        assert!(meaningful.contains("+new line"));
        assert!(!meaningful.contains("index"));
        assert!(!meaningful.contains("diff --git"));
    }
}
