use crate::parser::FileDescriptor;
use std::collections::HashMap;

/// Lookup tables from declared type and package names to the declaring file,
/// scoped to a single analysis run.
#[derive(Debug, Default)]
pub struct SymbolIndex {
    types: HashMap<String, String>,
    packages: HashMap<String, String>,
}

impl SymbolIndex {
    /// Build the index from the full descriptor set for a run. If two files
    /// declare the same type or package name, the last one wins.
    pub fn build<'a, I>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = &'a FileDescriptor>,
    {
        let mut index = Self::default();
        for desc in descriptors {
            if !desc.primary_type.is_empty() {
                index.types.insert(desc.primary_type.clone(), desc.path.clone());
            }
            if !desc.package_name.is_empty() {
                index.packages.insert(desc.package_name.clone(), desc.path.clone());
            }
        }
        index
    }

    pub fn file_for_type(&self, type_name: &str) -> Option<&str> {
        self.types.get(type_name).map(String::as_str)
    }

    pub fn file_for_package(&self, package_name: &str) -> Option<&str> {
        self.packages.get(package_name).map(String::as_str)
    }

    pub fn packages(&self) -> impl Iterator<Item = (&str, &str)> {
        self.packages.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn desc(path: &str, package: &str, type_name: &str) -> FileDescriptor {
        FileDescriptor {
            path: path.to_string(),
            file_name: path.rsplit('/').next().unwrap_or(path).to_string(),
            package_name: package.to_string(),
            primary_type: type_name.to_string(),
            imports: HashSet::new(),
            dependencies: HashSet::new(),
            line_count: 0,
        }
    }

    #[test]
    fn indexes_types_and_packages() {
        let descriptors = vec![desc("/A.java", "x", "A"), desc("/B.java", "y", "B")];
        let index = SymbolIndex::build(&descriptors);

        assert_eq!(index.file_for_type("A"), Some("/A.java"));
        assert_eq!(index.file_for_package("y"), Some("/B.java"));
        assert_eq!(index.file_for_type("C"), None);
    }

    #[test]
    fn empty_names_are_skipped() {
        let descriptors = vec![desc("/x", "", "")];
        let index = SymbolIndex::build(&descriptors);
        assert_eq!(index.file_for_type(""), None);
        assert_eq!(index.file_for_package(""), None);
    }

    #[test]
    fn last_writer_wins_on_collision() {
        let descriptors = vec![desc("/A1.java", "p", "A"), desc("/A2.java", "p", "A")];
        let index = SymbolIndex::build(&descriptors);
        assert_eq!(index.file_for_type("A"), Some("/A2.java"));
        assert_eq!(index.file_for_package("p"), Some("/A2.java"));
    }
}
