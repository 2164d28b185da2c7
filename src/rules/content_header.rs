use tracing::warn;

use crate::document::Document;

use super::diagnostics::report_error;

/// The project's `contentHeader` must carry a non-blank `name`.
pub fn validate(doc: &mut Document) {
    let root = doc.root();
    match doc.find_child(root, "contentHeader") {
        Some(header) => {
            if doc.attr_trimmed(header, "name").is_empty() {
                report_error(
                    doc,
                    header,
                    "Attribute \"name\" of element \"project\\contentHeader\" cannot be empty.",
                );
            }
        }
        None => warn!("project has no contentHeader element"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::diagnostics::{errors_of, has_errors};

    #[test]
    fn blank_name_is_reported() {
        let mut doc = Document::new("project");
        let header = doc.append_child(doc.root(), "contentHeader");
        doc.set_attr(header, "name", "  ");
        validate(&mut doc);
        assert_eq!(errors_of(&doc, header).len(), 1);
    }

    #[test]
    fn missing_header_is_not_an_error() {
        let mut doc = Document::new("project");
        validate(&mut doc);
        assert!(!has_errors(&doc));
    }
}
