pub mod analyzer;
pub mod config;
pub mod diff;
pub mod file_discovery;
pub mod git;
pub mod graph;
pub mod index;
pub mod parser;
pub mod report;
pub mod resolver;
pub mod transport;

pub use analyzer::AnalysisSession;
pub use config::Config;
pub use diff::DiffParser;
pub use file_discovery::FileDiscovery;
pub use graph::DependencyGraph;
pub use parser::SourceFileParser;
pub use report::Reporter;
pub use transport::ServiceClient;

pub type Result<T> = anyhow::Result<T>;
