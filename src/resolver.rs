use crate::index::SymbolIndex;
use crate::parser::FileDescriptor;
use std::collections::HashSet;

/// Resolves a file's import strings to the project files that define them.
pub struct DependencyResolver<'a> {
    index: &'a SymbolIndex,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(index: &'a SymbolIndex) -> Self {
        Self { index }
    }

    /// Resolve every import of `source` to at most one file path each.
    /// Unresolved imports are dropped; a resolution back to `source` itself
    /// is discarded.
    pub fn resolve(&self, source: &FileDescriptor) -> HashSet<String> {
        source
            .imports
            .iter()
            .filter_map(|import| self.resolve_import(import))
            .filter(|path| path != &source.path)
            .collect()
    }

    fn resolve_import(&self, import: &str) -> Option<String> {
        // Exact type match on the trailing segment of a dotted import
        if let Some(dot) = import.rfind('.') {
            let type_name = &import[dot + 1..];
            if let Some(path) = self.index.file_for_type(type_name) {
                return Some(path.to_string());
            }
        }

        // Exact package match
        if let Some(path) = self.index.file_for_package(import) {
            return Some(path.to_string());
        }

        // Prefix package match. Longest matching package wins, ties broken
        // lexicographically, so resolution does not depend on map iteration
        // order.
        self.index
            .packages()
            .filter(|(package, _)| import.starts_with(package))
            .max_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| b.cmp(a)))
            .map(|(_, path)| path.to_string())
    }
}
