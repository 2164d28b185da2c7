//! Frontends: the PLCopen XML loader and the literal-expression parser used
//! for initial values.

pub mod literal;
pub mod xml;

use std::fs;
use std::path::Path;

use crate::document::Document;
use crate::error::LoadError;

pub use literal::{parse_expr, LiteralExpr};

/// Reads and loads a PLCopen XML project file.
pub fn parse_file(path: &Path) -> Result<Document, LoadError> {
    let src = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_file_from_str(&src)
}

pub fn parse_file_from_str(src: &str) -> Result<Document, LoadError> {
    xml::parse_xml_from_str(src)
}
