use crate::index::SymbolIndex;
use crate::parser::FileDescriptor;
use crate::resolver::DependencyResolver;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Sentinel reported as the max-dependency file of an empty graph.
pub const NO_FILE: &str = "None";

/// Directed source-level dependency graph for one analysis run. Owns the
/// parsed descriptors plus a path -> dependency-paths adjacency map. The
/// adjacency map is the single source of truth for statistics and impact
/// queries; descriptor dependency sets are kept consistent with it.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    nodes: HashMap<String, FileDescriptor>,
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    /// Build the graph from a run's descriptors. Resolves every file's
    /// imports against an index built from the whole set. Always a full
    /// rebuild; nothing carries over between runs.
    pub fn build(descriptors: Vec<FileDescriptor>) -> Self {
        let index = SymbolIndex::build(descriptors.iter());
        let resolver = DependencyResolver::new(&index);

        let mut nodes = HashMap::new();
        let mut edges = BTreeMap::new();

        for mut desc in descriptors {
            let dependencies = resolver.resolve(&desc);
            edges.insert(desc.path.clone(), dependencies.iter().cloned().collect());
            desc.dependencies = dependencies;
            nodes.insert(desc.path.clone(), desc);
        }

        Self { nodes, edges }
    }

    pub fn file_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn files(&self) -> Vec<String> {
        self.edges.keys().cloned().collect()
    }

    pub fn descriptor(&self, path: &str) -> Option<FileDescriptor> {
        self.nodes.get(path).cloned()
    }

    /// Dependency edge set for `path`; empty for an unknown path.
    pub fn dependencies_for(&self, path: &str) -> BTreeSet<String> {
        self.edges.get(path).cloned().unwrap_or_default()
    }

    /// The impact set: every file whose dependencies include `path`.
    /// Empty for an unknown path or one nothing depends on.
    pub fn files_affected_by_change(&self, path: &str) -> BTreeSet<String> {
        self.edges
            .iter()
            .filter(|(_, deps)| deps.contains(path))
            .map(|(source, _)| source.clone())
            .collect()
    }

    pub fn statistics(&self) -> GraphStatistics {
        let total_files = self.edges.len();
        let total_dependencies: usize = self.edges.values().map(BTreeSet::len).sum();
        let average_dependencies_per_file = if total_files == 0 {
            0.0
        } else {
            total_dependencies as f64 / total_files as f64
        };

        // Ordered edge iteration makes the tie-break deterministic: the
        // first file encountered keeps the title among equal counts.
        let mut max_entry: Option<(&String, usize)> = None;
        for (path, deps) in &self.edges {
            if max_entry.map_or(true, |(_, count)| deps.len() > count) {
                max_entry = Some((path, deps.len()));
            }
        }
        let (max_file, max_dependencies) = match max_entry {
            Some((path, count)) => (path.clone(), count),
            None => (NO_FILE.to_string(), 0),
        };

        GraphStatistics {
            total_files,
            total_dependencies,
            average_dependencies_per_file,
            file_with_most_dependencies: max_file,
            max_dependencies,
        }
    }

    /// Serializable snapshot of the whole graph for transport.
    pub fn snapshot(&self, project_name: &str) -> DependencyGraphPayload {
        DependencyGraphPayload {
            nodes: self.nodes.values().cloned().collect(),
            edges: self.edges.clone(),
            project_name: project_name.to_string(),
            generated_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub total_files: usize,
    pub total_dependencies: usize,
    pub average_dependencies_per_file: f64,
    pub file_with_most_dependencies: String,
    pub max_dependencies: usize,
}

impl GraphStatistics {
    pub fn print_summary(&self) {
        println!("Dependency Graph Statistics:");
        println!("  Total files: {}", self.total_files);
        println!("  Total dependencies: {}", self.total_dependencies);
        println!(
            "  Average dependencies per file: {:.2}",
            self.average_dependencies_per_file
        );
        println!(
            "  Most dependencies: {} ({})",
            self.file_with_most_dependencies, self.max_dependencies
        );
    }
}

/// Wire shape of a full graph, as consumed by the analysis service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyGraphPayload {
    pub nodes: Vec<FileDescriptor>,
    pub edges: BTreeMap<String, BTreeSet<String>>,
    #[serde(rename = "projectName")]
    pub project_name: String,
    #[serde(rename = "generatedAt")]
    pub generated_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::SourceFileParser;

    fn graph_from(sources: &[(&str, &str)]) -> DependencyGraph {
        let parser = SourceFileParser::new().unwrap();
        let descriptors = sources
            .iter()
            .map(|(path, content)| {
                let name = path.rsplit('/').next().unwrap_or(path);
                parser.parse_content(path, name, content)
            })
            .collect();
        DependencyGraph::build(descriptors)
    }

    #[test]
    fn resolves_cross_file_dependency() {
        let graph = graph_from(&[
            ("A.java", "package x;\nimport y.B;\nclass A {}\n"),
            ("B.java", "package y;\nclass B {}\n"),
        ]);

        let deps = graph.dependencies_for("A.java");
        assert_eq!(deps, BTreeSet::from(["B.java".to_string()]));
    }

    #[test]
    fn impact_query_reverses_dependency_edges() {
        let graph = graph_from(&[
            ("A.java", "package x;\nimport y.B;\nclass A {}\n"),
            ("B.java", "package y;\nclass B {}\n"),
            ("C.java", "package z;\nimport y.B;\nclass C {}\n"),
        ]);

        let affected = graph.files_affected_by_change("B.java");
        assert_eq!(
            affected,
            BTreeSet::from(["A.java".to_string(), "C.java".to_string()])
        );

        // Symmetry: P in deps(Q) iff Q in affected(P)
        for q in graph.files() {
            for p in graph.dependencies_for(&q) {
                assert!(graph.files_affected_by_change(&p).contains(&q));
            }
        }
    }

    #[test]
    fn unknown_path_queries_return_empty_sets() {
        let graph = graph_from(&[("A.java", "package x;\nclass A {}\n")]);
        assert!(graph.dependencies_for("Missing.java").is_empty());
        assert!(graph.files_affected_by_change("Missing.java").is_empty());
    }

    #[test]
    fn no_self_edges_even_when_import_resolves_home() {
        let graph = graph_from(&[("A.java", "package x;\nimport x.A;\nclass A {}\n")]);
        assert!(!graph.dependencies_for("A.java").contains("A.java"));
    }

    #[test]
    fn empty_graph_statistics_use_sentinels() {
        let graph = DependencyGraph::build(Vec::new());
        let stats = graph.statistics();

        assert_eq!(stats.total_files, 0);
        assert_eq!(stats.total_dependencies, 0);
        assert_eq!(stats.average_dependencies_per_file, 0.0);
        assert_eq!(stats.file_with_most_dependencies, NO_FILE);
        assert_eq!(stats.max_dependencies, 0);
    }

    #[test]
    fn statistics_pick_first_file_among_ties() {
        let graph = graph_from(&[
            ("A.java", "package x;\nimport y.B;\nclass A {}\n"),
            ("B.java", "package y;\nclass B {}\n"),
            ("C.java", "package z;\nimport y.B;\nclass C {}\n"),
        ]);
        let stats = graph.statistics();

        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.total_dependencies, 2);
        assert_eq!(stats.file_with_most_dependencies, "A.java");
        assert_eq!(stats.max_dependencies, 1);
    }

    #[test]
    fn unresolved_imports_create_no_placeholder_nodes() {
        let graph = graph_from(&[("A.java", "package x;\nimport org.vendor.Lib;\nclass A {}\n")]);
        assert_eq!(graph.file_count(), 1);
        assert!(graph.dependencies_for("A.java").is_empty());
    }

    #[test]
    fn snapshot_carries_nodes_edges_and_project_name() {
        let graph = graph_from(&[
            ("A.java", "package x;\nimport y.B;\nclass A {}\n"),
            ("B.java", "package y;\nclass B {}\n"),
        ]);
        let payload = graph.snapshot("demo");

        assert_eq!(payload.project_name, "demo");
        assert_eq!(payload.nodes.len(), 2);
        assert!(payload.edges["A.java"].contains("B.java"));
        assert!(payload.generated_at > 0);

        let desc = payload.nodes.iter().find(|n| n.path == "A.java").unwrap();
        assert!(desc.dependencies.contains("B.java"));

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["projectName"], "demo");
        assert!(json["generatedAt"].as_i64().is_some());
        assert!(json["nodes"][0].get("fileName").is_some());
        assert!(json["nodes"][0].get("file_name").is_none());
    }
}
