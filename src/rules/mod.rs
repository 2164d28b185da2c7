//! Semantic rules for PLCopen TC6 projects.
//!
//! Every rule reports through [`diagnostics`] and none of them aborts: a
//! violated rule adds one annotation and the pass moves on.

pub mod address;
pub mod config;
pub mod content_header;
pub mod data_types;
pub mod diagnostics;
pub mod literals;
pub mod names;
pub mod pous;

use tracing::info;

use crate::document::Document;
use crate::lexicon::{IecLexicon, LexicalRules};
use crate::registry::Project;
use crate::report::ValidationReport;

pub use config::ValidatorConfig;
pub use diagnostics::DiagnosticKind;

/// Runs every pass over `doc`: content header, data types, then POUs.
/// Registries in `project` must have been built from this same document.
pub fn validate_project<L: LexicalRules>(doc: &mut Document, project: &Project<L>) {
    info!(
        data_types = project.data_types.len(),
        pous = project.pous.len(),
        "validating project"
    );
    content_header::validate(doc);
    let checked = data_types::validate(doc, project);
    pous::validate(doc, project, &checked);
    info!("validation finished");
}

/// Builds the registries with the IEC lexicon extended by `config`,
/// validates `doc` in place and collects the report.
pub fn validate_document(doc: &mut Document, config: &ValidatorConfig) -> ValidationReport {
    let project = Project::build(doc, IecLexicon::with_config(config));
    validate_project(doc, &project);
    ValidationReport::collect(doc)
}
