//! Located-variable addresses (`%IX1.0`, `%MW10`, `%Q*`).
//!
//! A partial address names only the area and is completed at configuration
//! time; a full address names area, size, index and optionally a bit.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::{Document, NodeId};
use crate::registry::interface::VarList;

use super::diagnostics::report_error;

static FULL_ADDRESS_WITH_BIT_SYNTAX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^%[IQM][XBWDL]?[1-9][0-9]*(\.[0-7])?$").unwrap());
static FULL_ADDRESS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^%[IQM][XBWD][1-9][0-9]*$").unwrap());
static PARTIAL_ADDRESS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^%[IQM]\*$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressForm {
    Partial,
    Full,
}

pub fn is_partial_address(address: &str) -> bool {
    PARTIAL_ADDRESS.is_match(address)
}

pub fn is_full_address(address: &str) -> bool {
    FULL_ADDRESS_WITH_BIT_SYNTAX.is_match(address)
}

/// `None` for strings that are neither form; such addresses are left to
/// the schema.
pub fn classify(address: &str) -> Option<AddressForm> {
    if is_partial_address(address) {
        Some(AddressForm::Partial)
    } else if is_full_address(address) {
        Some(AddressForm::Full)
    } else {
        None
    }
}

fn has_bit_suffix(address: &str) -> bool {
    address.contains('.')
}

/// A partially addressed variable may not live in a constant list and may
/// not carry an initial value.
pub fn validate_partial_address(doc: &mut Document, variable: NodeId, list: &VarList) {
    if list.is_constant() {
        report_error(doc, variable, "A variable with a partial address can't have the attribute constant.");
    }
    if doc.find_child(variable, "initialValue").is_some() {
        report_error(
            doc,
            variable,
            "The variable with a partial address can't have initialValue child elements.",
        );
    }
}

/// Boolean variables take the bit form; everything else the plain form.
pub fn validate_full_address(doc: &mut Document, variable: NodeId, address: &str, is_bool: bool) {
    if is_bool {
        if !FULL_ADDRESS_WITH_BIT_SYNTAX.is_match(address) {
            report_error(doc, variable, "The address attribute can only be of bit syntax.");
        }
    } else if !FULL_ADDRESS.is_match(address) {
        let message = if has_bit_suffix(address) {
            "The address attribute syntax is invalid: bit syntax is only allowed for variables of type BOOL."
        } else {
            "The address attribute syntax is invalid."
        };
        report_error(doc, variable, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::diagnostics::errors_of;
    use crate::types::ListKind;

    fn variable(doc: &mut Document) -> NodeId {
        let list = doc.append_child(doc.root(), "localVars");
        doc.append_child(list, "variable")
    }

    fn local_list(constant: &str) -> VarList {
        VarList {
            node: Document::new("localVars").root(),
            kind: ListKind::LocalVars,
            constant: constant.to_string(),
        }
    }

    #[test]
    fn classifies_address_forms() {
        assert_eq!(classify("%I*"), Some(AddressForm::Partial));
        assert_eq!(classify("%QX12.7"), Some(AddressForm::Full));
        assert_eq!(classify("%MW10"), Some(AddressForm::Full));
        assert_eq!(classify("%I5"), Some(AddressForm::Full));
        assert_eq!(classify("%IL3"), Some(AddressForm::Full));
        assert_eq!(classify("%ZW1"), None);
        assert_eq!(classify("%IX0"), None);
        assert_eq!(classify("%IX1.8"), None);
        assert_eq!(classify("IX1"), None);
    }

    #[test]
    fn bit_address_on_bool_is_accepted() {
        let mut doc = Document::new("interface");
        let var = variable(&mut doc);
        validate_full_address(&mut doc, var, "%IX1.0", true);
        assert!(errors_of(&doc, var).is_empty());
    }

    #[test]
    fn bit_address_on_non_bool_is_rejected() {
        let mut doc = Document::new("interface");
        let var = variable(&mut doc);
        validate_full_address(&mut doc, var, "%IX1.0", false);
        let errors = errors_of(&doc, var);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("syntax is invalid"));
        assert!(errors[0].contains("bit syntax"));
    }

    #[test]
    fn long_words_are_bit_form_only() {
        let mut doc = Document::new("interface");
        let var = variable(&mut doc);
        validate_full_address(&mut doc, var, "%ML4", false);
        assert_eq!(errors_of(&doc, var), vec!["The address attribute syntax is invalid."]);
        validate_full_address(&mut doc, var, "%MW4", false);
        assert_eq!(errors_of(&doc, var).len(), 1);
    }

    #[test]
    fn partial_address_rules_are_independent() {
        let mut doc = Document::new("interface");
        let var = variable(&mut doc);
        validate_partial_address(&mut doc, var, &local_list("false"));
        assert!(errors_of(&doc, var).is_empty());

        doc.append_child(var, "initialValue");
        validate_partial_address(&mut doc, var, &local_list("true"));
        assert_eq!(errors_of(&doc, var).len(), 2);
    }
}
