//! Import parsing and specifier resolution for JavaScript/TypeScript modules

pub mod parser;
pub mod resolver;

#[cfg(test)]
pub mod tests;

pub use parser::{SourceKind, TreeSitterImportParser};
pub use resolver::RelativeResolver;
