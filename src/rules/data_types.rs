//! Pass over `types/dataTypes`: names, base types and initial values.

use tracing::debug;

use crate::document::Document;
use crate::lexicon::LexicalRules;
use crate::registry::data_types::DataTypeEntry;
use crate::registry::Project;
use crate::types::TypeSpec;

use super::diagnostics::report_error;
use super::literals::validate_simple_value;
use super::names::{validate_name, NameScope};

/// Returned by [`validate`]. The POU pass takes it by reference, so it
/// cannot run before the data types have been checked.
#[derive(Debug)]
pub struct DataTypesChecked {
    _private: (),
}

pub fn validate<L: LexicalRules>(doc: &mut Document, project: &Project<L>) -> DataTypesChecked {
    for entry in project.data_types.entries() {
        debug!(data_type = %entry.name, "checking data type");
        validate_name(doc, project, &NameScope::DataType, entry.node);
        validate_base_type(doc, project, entry);
        validate_initial_value(doc, project, entry);
    }
    DataTypesChecked { _private: () }
}

fn validate_base_type<L: LexicalRules>(doc: &mut Document, project: &Project<L>, entry: &DataTypeEntry) {
    let Some((node, spec)) = &entry.base else {
        return;
    };
    match spec {
        TypeSpec::Elementary(_) => {}
        TypeSpec::Derived(name) if name.is_empty() => {
            report_error(doc, *node, "Base type name of user defined type cannot be empty.");
        }
        TypeSpec::Derived(name) if !project.data_types.is_user_type(name) => {
            report_error(doc, *node, &format!("Unknown base type name: {}.", name));
        }
        TypeSpec::Derived(name) if name.eq_ignore_ascii_case(&entry.name) => {
            report_error(doc, *node, "A user defined type cannot have the same name as its base type.");
        }
        TypeSpec::Derived(_) => {}
        TypeSpec::Unsupported(tag) => {
            report_error(doc, *node, &format!("Unsupported base type: {}.", tag));
        }
    }
}

fn validate_initial_value<L: LexicalRules>(doc: &mut Document, project: &Project<L>, entry: &DataTypeEntry) {
    let Some(value) = doc
        .find_child(entry.node, "initialValue")
        .and_then(|iv| doc.single_child(iv))
    else {
        return;
    };
    if doc.tag(value) != "simpleValue" {
        report_error(doc, value, "Unsupported type of initial value.");
        return;
    }
    let target = project.data_types.entry_base_type(entry);
    validate_simple_value(doc, value, value, target);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::IecLexicon;
    use crate::parser::parse_file_from_str;
    use crate::rules::diagnostics::{errors_of, infos_of};

    fn run(xml: &str) -> Document {
        let mut doc = parse_file_from_str(xml).unwrap();
        let project = Project::build(&doc, IecLexicon::default());
        validate(&mut doc, &project);
        doc
    }

    fn data_type(doc: &Document, index: usize) -> crate::document::NodeId {
        let holder = doc.path(doc.root(), &["types", "dataTypes"]).unwrap();
        doc.elements(holder)[index]
    }

    #[test]
    fn base_type_rules() {
        let doc = run(r#"<project><types><dataTypes>
            <dataType name="Speed"><baseType><INT/></baseType></dataType>
            <dataType name="Empty"><baseType><derived name=" "/></baseType></dataType>
            <dataType name="Lost"><baseType><derived name="Nowhere"/></baseType></dataType>
            <dataType name="Loop"><baseType><derived name="LOOP"/></baseType></dataType>
            <dataType name="Rec"><baseType><struct/></baseType></dataType>
            <dataType name="Fast"><baseType><derived name="speed"/></baseType></dataType>
        </dataTypes><pous/></types></project>"#);

        let base = |i: usize| doc.path(data_type(&doc, i), &["baseType"]).map(|b| doc.elements(b)[0]).unwrap();
        assert!(errors_of(&doc, base(0)).is_empty());
        assert_eq!(errors_of(&doc, base(1)), vec!["Base type name of user defined type cannot be empty."]);
        assert_eq!(errors_of(&doc, base(2)), vec!["Unknown base type name: Nowhere."]);
        assert_eq!(
            errors_of(&doc, base(3)),
            vec!["A user defined type cannot have the same name as its base type."]
        );
        assert_eq!(errors_of(&doc, base(4)), vec!["Unsupported base type: struct."]);
        assert!(errors_of(&doc, base(5)).is_empty());
    }

    #[test]
    fn initial_values_use_the_elementary_ancestor() {
        let doc = run(r#"<project><types><dataTypes>
            <dataType name="Small"><baseType><SINT/></baseType>
                <initialValue><simpleValue value="100"/></initialValue></dataType>
            <dataType name="Smaller"><baseType><derived name="Small"/></baseType>
                <initialValue><simpleValue value="200"/></initialValue></dataType>
            <dataType name="Rec"><baseType><struct/></baseType>
                <initialValue><structValue/></initialValue></dataType>
            <dataType name="Loop"><baseType><derived name="Loop"/></baseType>
                <initialValue><simpleValue value="1"/></initialValue></dataType>
        </dataTypes><pous/></types></project>"#);

        let value = |i: usize| doc.path(data_type(&doc, i), &["initialValue"]).map(|iv| doc.elements(iv)[0]).unwrap();
        assert_eq!(infos_of(&doc, value(0)), vec!["100"]);
        assert_eq!(
            errors_of(&doc, value(1)),
            vec!["The initial value \"200\" is not appropriate for data type SINT"]
        );
        assert_eq!(errors_of(&doc, value(2)), vec!["Unsupported type of initial value."]);
        assert_eq!(errors_of(&doc, value(3)), vec![crate::rules::literals::TARGET_NOT_WELL_DEFINED]);
    }

    #[test]
    fn names_are_checked_per_declaration() {
        let doc = run(r#"<project><types><dataTypes>
            <dataType name="Twice"><baseType><INT/></baseType></dataType>
            <dataType name="TWICE"><baseType><INT/></baseType></dataType>
            <dataType name="Main"><baseType><INT/></baseType></dataType>
        </dataTypes><pous><pou name="Main" pouType="program"/></pous></types></project>"#);
        assert_eq!(errors_of(&doc, data_type(&doc, 0)), vec!["The data type name is not unique."]);
        assert_eq!(errors_of(&doc, data_type(&doc, 1)), vec!["The data type name is not unique."]);
        assert_eq!(
            errors_of(&doc, data_type(&doc, 2)),
            vec!["A data type cannot have the same name as a user defined POU."]
        );
    }
}
