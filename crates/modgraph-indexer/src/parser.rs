//! Tree-sitter based import specifier extraction
//!
//! Tree-sitter parsers are neither `Sync` nor cheap to share, so a fresh
//! `Parser` is created per call; only the grammar is chosen up front.

use modgraph_core::{ImportParser, ModuleId, ParseError};
use std::collections::BTreeSet;
use tree_sitter::{Language, Node, Parser};

/// Grammars the import parser understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    TypeScript,
    Tsx,
    JavaScript,
}

impl SourceKind {
    /// Determine source kind from the module's extension
    pub fn from_id(id: &ModuleId) -> Option<Self> {
        match id.extension()? {
            ".ts" | ".mts" | ".cts" => Some(SourceKind::TypeScript),
            ".tsx" => Some(SourceKind::Tsx),
            ".js" | ".jsx" | ".mjs" | ".cjs" => Some(SourceKind::JavaScript),
            _ => None,
        }
    }

    /// Get the tree-sitter language for this source kind
    pub fn language(&self) -> Language {
        match self {
            SourceKind::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            SourceKind::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            SourceKind::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        }
    }
}

/// Collects `import`/`export ... from`, dynamic `import()` and `require()`
/// specifiers with literal arguments.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeSitterImportParser;

impl TreeSitterImportParser {
    pub fn new() -> Self {
        TreeSitterImportParser
    }
}

impl ImportParser for TreeSitterImportParser {
    fn parse(&self, source: &str, id: &ModuleId) -> Result<BTreeSet<String>, ParseError> {
        let kind = SourceKind::from_id(id).ok_or_else(|| ParseError::UnsupportedSource(id.clone()))?;

        let mut parser = Parser::new();
        parser
            .set_language(&kind.language())
            .map_err(|e| ParseError::Backend {
                id: id.clone(),
                message: format!("Failed to set language: {}", e),
            })?;

        let tree = parser.parse(source, None).ok_or_else(|| ParseError::Backend {
            id: id.clone(),
            message: "Failed to parse content".to_string(),
        })?;

        let root = tree.root_node();
        if root.has_error() {
            let line = first_error(root).map_or(1, |n| n.start_position().row as u32 + 1);
            return Err(ParseError::Syntax { id: id.clone(), line });
        }

        let mut specifiers = BTreeSet::new();
        visit_node(root, source.as_bytes(), &mut specifiers);
        tracing::debug!(module = %id, count = specifiers.len(), "parsed import specifiers");
        Ok(specifiers)
    }
}

fn visit_node(node: Node, source: &[u8], specifiers: &mut BTreeSet<String>) {
    match node.kind() {
        "import_statement" | "export_statement" | "import_require_clause" => {
            if let Some(spec) = node
                .child_by_field_name("source")
                .and_then(|s| string_value(s, source))
            {
                specifiers.insert(spec);
            }
        }
        "call_expression" => {
            if let Some(spec) = call_specifier(node, source) {
                specifiers.insert(spec);
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        visit_node(child, source, specifiers);
    }
}

/// `import("x")` or `require("x")` with a single literal argument.
fn call_specifier(node: Node, source: &[u8]) -> Option<String> {
    let callee = node.child_by_field_name("function")?;
    let is_loader = match callee.kind() {
        "import" => true,
        "identifier" => callee.utf8_text(source).ok()? == "require",
        _ => false,
    };
    if !is_loader {
        return None;
    }

    let arguments = node.child_by_field_name("arguments")?;
    let first = arguments.named_child(0)?;
    string_value(first, source)
}

/// Literal value of a `string` node: the text between its delimiters with
/// escape sequences decoded.
fn string_value(node: Node, source: &[u8]) -> Option<String> {
    if node.kind() != "string" {
        return None;
    }

    let mut value = String::new();
    let mut cursor = node.walk();
    for part in node.named_children(&mut cursor) {
        let text = part.utf8_text(source).ok()?;
        match part.kind() {
            "string_fragment" => value.push_str(text),
            "escape_sequence" => value.push_str(&unescape(text)),
            _ => {}
        }
    }
    (!value.is_empty()).then_some(value)
}

/// Decode one JavaScript escape such as `\n`, `\x41` or `\u{1F600}`.
/// Unknown escapes keep the escaped character.
fn unescape(sequence: &str) -> String {
    let body = sequence.strip_prefix('\\').unwrap_or(sequence);
    let hex = |digits: &str| {
        u32::from_str_radix(digits, 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
    };

    let decoded = match body.chars().next() {
        Some('n') => Some("\n".to_string()),
        Some('t') => Some("\t".to_string()),
        Some('r') => Some("\r".to_string()),
        Some('0') if body.len() == 1 => Some("\0".to_string()),
        Some('x') => hex(&body[1..]),
        Some('u') => hex(body[1..].trim_start_matches('{').trim_end_matches('}')),
        // Line continuations contribute nothing.
        Some('\n') | Some('\r') => Some(String::new()),
        _ => None,
    };
    decoded.unwrap_or_else(|| body.to_string())
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}
