//! Test utilities for Modgraph

use crate::error::ParseError;
use crate::graph::DependencyGraph;
use crate::importees::ImportParser;
use crate::model::ModuleId;
use std::collections::BTreeSet;
use std::fs;
use tempfile::TempDir;

/// Parser treating every whitespace-separated token as a specifier.
/// A `!syntax` token fails with a syntax error on its line.
pub struct TokenParser;

impl ImportParser for TokenParser {
    fn parse(&self, source: &str, id: &ModuleId) -> Result<BTreeSet<String>, ParseError> {
        let mut specifiers = BTreeSet::new();
        for (row, line) in source.lines().enumerate() {
            for token in line.split_whitespace() {
                if token == "!syntax" {
                    return Err(ParseError::Syntax {
                        id: id.clone(),
                        line: row as u32 + 1,
                    });
                }
                specifiers.insert(token.to_string());
            }
        }
        Ok(specifiers)
    }
}

/// Resolver mapping a specifier to the id of the same name.
/// Specifiers prefixed with `ext:` are treated as unresolvable.
pub fn same_name(specifier: &str, _importer: &ModuleId) -> Option<ModuleId> {
    if specifier.starts_with("ext:") {
        None
    } else {
        Some(ModuleId::from(specifier))
    }
}

pub fn id(name: &str) -> ModuleId {
    ModuleId::from(name)
}

pub fn ids(names: &[&str]) -> BTreeSet<ModuleId> {
    names.iter().map(|n| ModuleId::from(*n)).collect()
}

/// Build a graph from `(importer, importee)` pairs.
pub fn graph_from_edges(edges: &[(&str, &str)]) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for (from, to) in edges {
        graph.link(&id(from), &id(to));
    }
    graph
}

/// Panic unless every importee edge is mirrored by an importer edge and the
/// other way round, and no edge names a missing node.
pub fn assert_symmetric(graph: &DependencyGraph) {
    for module in graph.module_ids() {
        for importee in graph.importees_of(&module) {
            assert!(graph.contains(&importee), "dangling importee {importee}");
            assert!(
                graph.importers_of(&importee).contains(&module),
                "{module} -> {importee} missing on the importer side"
            );
        }
        for importer in graph.importers_of(&module) {
            assert!(graph.contains(&importer), "dangling importer {importer}");
            assert!(
                graph.importees_of(&importer).contains(&module),
                "{importer} -> {module} missing on the importee side"
            );
        }
    }
}

/// Create a temporary directory with the given files
pub fn create_repo_with_structure(structure: &[(&str, &str)]) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    for (path, content) in structure {
        let full_path = root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
    }

    temp_dir
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_parser() {
        let found = TokenParser.parse("a b\n\nc", &id("m")).unwrap();
        assert_eq!(found.len(), 3);

        let err = TokenParser.parse("a\nb !syntax", &id("m")).unwrap_err();
        assert_eq!(err, ParseError::Syntax { id: id("m"), line: 2 });
    }
}
