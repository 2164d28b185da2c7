//! Library crate for plcopen_validator.
//!
//! Loads PLCopen TC6 XML projects, runs the semantic rules over them and
//! annotates the tree with error and info nodes. The binary and the wasm
//! entry below are thin wrappers around [`rules::validate_document`].

pub mod document;
pub mod emit;
pub mod error;
pub mod lexicon;
pub mod parser;
pub mod registry;
pub mod report;
pub mod rules;
pub mod types;

use wasm_bindgen::prelude::*;

use crate::report::ValidationReport;
use crate::rules::config::parse_config_from_text;
use crate::rules::ValidatorConfig;

// Called from JavaScript with the project XML and an optional config JSON.
#[wasm_bindgen]
pub fn validate_plcopen(source: &str, config_json: &str) -> String {
    // 1. Configuration first: a broken config is reported instead of being
    // silently replaced by the defaults.
    let config = if config_json.trim().is_empty() {
        ValidatorConfig::default()
    } else {
        match parse_config_from_text(config_json.trim()) {
            Ok(config) => config,
            Err(err) => return ValidationReport::failure(err.to_string()).to_json(),
        }
    };

    // 2. Load the document.
    let mut doc = match parser::parse_file_from_str(source) {
        Ok(doc) => doc,
        Err(err) => return ValidationReport::failure(format!("Parse Error: {}", err)).to_json(),
    };

    // 3. Validate and report.
    rules::validate_document(&mut doc, &config).to_json()
}
