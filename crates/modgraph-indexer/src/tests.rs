//! Unit tests for modgraph-indexer

use crate::{RelativeResolver, TreeSitterImportParser};
use modgraph_core::{ImportParser, ModuleId, ParseError, Resolve, normalize_id};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn specifiers(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn module_id(root: &Path, relative: &str) -> ModuleId {
    normalize_id(relative, root)
}

#[test]
fn test_typescript_imports() {
    let code = r#"
import { UserService } from './services/user';
import './polyfills';
import type { User } from "./types";
export { helper } from './helper';
export * from '../shared';
export const local = 1;

async function load() {
    const lazy = await import('./lazy');
    const legacy = require('./legacy');
    const other = load('./not-an-import');
    return [lazy, legacy, other];
}
"#;

    let found = TreeSitterImportParser
        .parse(code, &ModuleId::from("/app/src/index.ts"))
        .unwrap();

    assert_eq!(
        found,
        specifiers(&[
            "./services/user",
            "./polyfills",
            "./types",
            "./helper",
            "../shared",
            "./lazy",
            "./legacy",
        ])
    );
}

#[test]
fn test_string_literals_keep_inner_quotes_and_decode_escapes() {
    let code = r#"
import a from "./it's";
import b from '\'./quoted\'';
import c from './sp\u0061ce';
import d from "./hex\x2dname";
"#;

    let found = TreeSitterImportParser
        .parse(code, &ModuleId::from("/app/src/index.js"))
        .unwrap();

    assert_eq!(found, specifiers(&["./it's", "'./quoted'", "./space", "./hex-name"]));
}

#[test]
fn test_jsx_and_bare_imports() {
    let code = r#"
import React from 'react';
import { Button } from "./button";

export const App = () => <Button label="hi" />;
"#;

    let found = TreeSitterImportParser
        .parse(code, &ModuleId::from("/app/src/App.jsx"))
        .unwrap();
    assert_eq!(found, specifiers(&["react", "./button"]));
}

#[test]
fn test_tsx_imports() {
    let code = r#"
import { render } from './render';

export function View(props: { title: string }) {
    return <h1>{props.title}</h1>;
}
"#;

    let found = TreeSitterImportParser
        .parse(code, &ModuleId::from("/app/src/View.tsx"))
        .unwrap();
    assert_eq!(found, specifiers(&["./render"]));
}

#[test]
fn test_non_literal_dynamic_import_is_skipped() {
    let code = "const name = './x';\nimport(name);\nrequire(`./y`);\n";
    let found = TreeSitterImportParser
        .parse(code, &ModuleId::from("/app/a.js"))
        .unwrap();
    assert!(found.is_empty());
}

#[test]
fn test_empty_source_has_no_imports() {
    let found = TreeSitterImportParser
        .parse("", &ModuleId::from("/app/empty.ts"))
        .unwrap();
    assert!(found.is_empty());
}

#[test]
fn test_syntax_error_is_reported() {
    let id = ModuleId::from("/app/broken.ts");
    let code = "import './a';\nconst ok = 1;\nconst = ;\n";

    match TreeSitterImportParser.parse(code, &id) {
        Err(ParseError::Syntax { id: failed, line }) => {
            assert_eq!(failed, id);
            assert_eq!(line, 3);
        }
        other => panic!("Expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_parser_is_deterministic() {
    let id = ModuleId::from("/app/a.ts");
    let code = "import './b';\nimport './c';\n";
    assert_eq!(
        TreeSitterImportParser.parse(code, &id).unwrap(),
        TreeSitterImportParser.parse(code, &id).unwrap()
    );
}

fn create_resolver_fixture() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    fs::create_dir_all(root.join("src/dir")).unwrap();
    fs::write(root.join("src/index.ts"), "import './a';").unwrap();
    fs::write(root.join("src/a.ts"), "export const a = 1;").unwrap();
    fs::write(root.join("src/b.jsx"), "export const b = 1;").unwrap();
    fs::write(root.join("src/dir/index.tsx"), "export const d = 1;").unwrap();
    fs::write(root.join("src/data.json"), "{}").unwrap();

    temp_dir
}

#[test]
fn test_relative_resolution() {
    let temp_dir = create_resolver_fixture();
    let root = temp_dir.path();
    let resolver = RelativeResolver::default();
    let importer = module_id(root, "src/index.ts");

    assert_eq!(resolver.resolve("./a", &importer), Some(module_id(root, "src/a.ts")));
    assert_eq!(resolver.resolve("./b", &importer), Some(module_id(root, "src/b.jsx")));
    assert_eq!(resolver.resolve("./dir", &importer), Some(module_id(root, "src/dir/index.tsx")));
    assert_eq!(resolver.resolve("./data.json", &importer), Some(module_id(root, "src/data.json")));
    assert_eq!(resolver.resolve("../src/./a", &importer), Some(module_id(root, "src/a.ts")));
}

#[test]
fn test_unresolvable_specifiers() {
    let temp_dir = create_resolver_fixture();
    let root = temp_dir.path();
    let resolver = RelativeResolver::default();
    let importer = module_id(root, "src/index.ts");

    assert_eq!(resolver.resolve("./missing", &importer), None);
    assert_eq!(resolver.resolve("react", &importer), None);
    assert_eq!(resolver.resolve("node:fs", &importer), None);
}

#[test]
fn test_resolver_respects_configured_extensions() {
    let temp_dir = create_resolver_fixture();
    let root = temp_dir.path();
    let resolver = RelativeResolver::new(vec![".jsx".to_string()]);
    let importer = module_id(root, "src/index.ts");

    assert_eq!(resolver.resolve("./a", &importer), None);
    assert_eq!(resolver.resolve("./b", &importer), Some(module_id(root, "src/b.jsx")));
}
