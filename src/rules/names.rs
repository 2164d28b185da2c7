//! Naming rule shared by data types, POUs and variables. Conditions are
//! checked in a fixed order and only the first one that applies is
//! reported.

use crate::document::{Document, NodeId};
use crate::lexicon::LexicalRules;
use crate::registry::Project;

use super::diagnostics::report_error;

/// What kind of declaration is being named; selects the messages and the
/// collision and uniqueness checks.
pub enum NameScope<'a> {
    DataType,
    Pou,
    Variable(&'a crate::registry::InterfaceView),
}

struct Messages {
    empty: &'static str,
    invalid: &'static str,
    reserved: &'static str,
    standard_pou: &'static str,
    user_defined: &'static str,
    duplicate: &'static str,
}

const DATA_TYPE: Messages = Messages {
    empty: "The data type name cannot be empty.",
    invalid: "The data type name must be a valid identifier.",
    reserved: "The data type name cannot be a reserved word.",
    standard_pou: "A data type cannot have the same name as a standard POU.",
    user_defined: "A data type cannot have the same name as a user defined POU.",
    duplicate: "The data type name is not unique.",
};

const POU: Messages = Messages {
    empty: "The pou name attribute cannot be empty.",
    invalid: "The pou name attribute must be a valid identifier.",
    reserved: "The pou name attribute cannot be a reserved word.",
    standard_pou: "A pou name attribute cannot have the same name as a standard POU.",
    user_defined: "A pou name attribute cannot have the same name as a user defined data type.",
    duplicate: "Pou name attribute must be unique amongst all the pou elements.",
};

const VARIABLE: Messages = Messages {
    empty: "The variable name attribute cannot be empty.",
    invalid: "The variable name attribute must be a valid identifier.",
    reserved: "The variable name attribute cannot be a reserved word.",
    standard_pou: "A variable name attribute cannot have the same name as a standard POU.",
    user_defined: "A variable name attribute cannot have the same name as a user defined POU.",
    duplicate: "The variable name attribute is not unique.",
};

/// Returns the message of the first naming rule `name` breaks, if any.
pub fn name_violation<L: LexicalRules>(
    project: &Project<L>,
    scope: &NameScope<'_>,
    name: &str,
) -> Option<&'static str> {
    let name = name.trim();
    let messages = match scope {
        NameScope::DataType => &DATA_TYPE,
        NameScope::Pou => &POU,
        NameScope::Variable(_) => &VARIABLE,
    };
    let lex = &project.lexicon;

    let collides = match scope {
        NameScope::DataType | NameScope::Variable(_) => project.pous.is_user_pou(name),
        // A POU always finds itself among user POUs; clashes between POUs
        // are the uniqueness step's job.
        NameScope::Pou => project.data_types.is_user_type(name),
    };
    let unique = match scope {
        NameScope::DataType => project.data_types.is_unique_type_name(name),
        NameScope::Pou => project.pous.is_unique_pou_type_name(name),
        NameScope::Variable(view) => view.is_unique_variable_name(name),
    };

    if name.is_empty() {
        Some(messages.empty)
    } else if !lex.is_valid_identifier(name) {
        Some(messages.invalid)
    } else if lex.is_keyword(name) {
        Some(messages.reserved)
    } else if lex.is_standard_pou_name(name) {
        Some(messages.standard_pou)
    } else if collides {
        Some(messages.user_defined)
    } else if !unique {
        Some(messages.duplicate)
    } else {
        None
    }
}

/// Checks the `name` attribute of `node` and reports at most one error.
pub fn validate_name<L: LexicalRules>(
    doc: &mut Document,
    project: &Project<L>,
    scope: &NameScope<'_>,
    node: NodeId,
) {
    let name = doc.attr_trimmed(node, "name").to_string();
    if let Some(message) = name_violation(project, scope, &name) {
        report_error(doc, node, message);
    }
}
