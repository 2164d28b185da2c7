//! Initial-value checks shared by the data-type and POU passes.
//!
//! A scalar literal is parsed, type-checked against its elementary target
//! and either rejected or reported back in canonical form. Structured
//! literals (`structValue`) are walked member by member against the layout
//! of the function block they initialize.

use crate::document::{Document, NodeId};
use crate::lexicon::LexicalRules;
use crate::parser::parse_expr;
use crate::registry::Project;
use crate::types::{ElementaryKind, ListKind, TypeCategory};

use super::diagnostics::{report_error, report_info};

pub const TARGET_NOT_WELL_DEFINED: &str =
    "Can't check suitability of the initial value. The base type is not well defined.";

/// Result of checking one scalar literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralOutcome {
    SyntaxInvalid(String),
    TypeIncompatible(String),
    /// The expression names symbols that only a later stage can resolve.
    Deferred,
    /// Canonical rendering of the value.
    Resolved(String),
}

/// Checks `text` against `target`. A syntax error always wins over an
/// undefined target.
pub fn check_scalar(text: &str, target: Option<ElementaryKind>) -> LiteralOutcome {
    let expr = match parse_expr(text) {
        Ok(expr) => expr,
        Err(message) => return LiteralOutcome::SyntaxInvalid(message),
    };
    let Some(target) = target else {
        return LiteralOutcome::TypeIncompatible(TARGET_NOT_WELL_DEFINED.to_string());
    };
    if expr.has_external_dependencies() {
        return LiteralOutcome::Deferred;
    }
    match expr.make_canonical(target) {
        Some(value) => LiteralOutcome::Resolved(value),
        None => LiteralOutcome::TypeIncompatible(format!(
            "The initial value \"{}\" is not appropriate for data type {}",
            expr.text(),
            target
        )),
    }
}

/// Turns an outcome into exactly one diagnostic on `node`.
pub fn report_outcome(doc: &mut Document, node: NodeId, outcome: &LiteralOutcome) {
    match outcome {
        LiteralOutcome::SyntaxInvalid(message) | LiteralOutcome::TypeIncompatible(message) => {
            report_error(doc, node, message)
        }
        LiteralOutcome::Deferred => report_info(doc, node, ""),
        LiteralOutcome::Resolved(value) => report_info(doc, node, value),
    }
}

/// Checks the `value` attribute of a `simpleValue` element and reports the
/// outcome on `report_on`.
pub fn validate_simple_value(
    doc: &mut Document,
    simple_value: NodeId,
    report_on: NodeId,
    target: Option<ElementaryKind>,
) -> LiteralOutcome {
    let text = doc.attr(simple_value, "value").unwrap_or("").to_string();
    let outcome = check_scalar(&text, target);
    report_outcome(doc, report_on, &outcome);
    outcome
}

/// Walks a `structValue` initializing an instance of function block `fb`
/// declared in a list of kind `list`.
///
/// Recursion follows the nesting of `structValue` elements in the tree, so
/// it ends with the document even if function block layouts refer to each
/// other.
pub fn validate_struct_value<L: LexicalRules>(
    doc: &mut Document,
    project: &Project<L>,
    struct_value: NodeId,
    fb: &str,
    list: ListKind,
) {
    let members = project.function_block_members(doc, fb);

    for child in doc.elements(struct_value) {
        if doc.tag(child) != "value" {
            report_error(doc, child, "Valid children are only value elements.");
            continue;
        }
        let member_name = doc.attr_trimmed(child, "member").to_string();
        if member_name.is_empty() {
            report_error(doc, child, "The member attribute is required.");
            continue;
        }
        if list.forbids_initial_value() {
            report_error(doc, struct_value, "Member attribute can't be inOutVars or externalVars");
        }

        let category = members
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(&member_name))
            .map(|m| m.category.clone())
            .unwrap_or(TypeCategory::Unknown);
        let value = doc.single_child(child);

        match category {
            TypeCategory::FunctionBlock(nested) => match value {
                Some(node) if doc.tag(node) == "structValue" => {
                    validate_struct_value(doc, project, node, &nested, list)
                }
                other => report_error(
                    doc,
                    other.unwrap_or(child),
                    "A member of function block type can only be initialized with a structValue element.",
                ),
            },
            other => match value {
                Some(node) if doc.tag(node) == "simpleValue" => {
                    let target = project.elementary_of(&other);
                    validate_simple_value(doc, node, node, target);
                }
                value => report_error(
                    doc,
                    value.unwrap_or(child),
                    "A member of this type can only be initialized with a simpleValue element.",
                ),
            },
        }
    }
}
