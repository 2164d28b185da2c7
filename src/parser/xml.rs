//! PLCopen XML loader built on quick-xml. Produces the element tree the
//! validator works on. Character data is not used by any rule but is kept
//! so the annotated tree can be written back. No XSD validation happens
//! here.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::document::{Document, NodeId};
use crate::error::LoadError;

pub fn parse_xml_from_str(src: &str) -> Result<Document, LoadError> {
    let mut reader = Reader::from_str(src);
    let mut doc: Option<Document> = None;
    let mut stack: Vec<NodeId> = Vec::new();

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader
            .read_event()
            .map_err(|source| LoadError::Xml { position, source })?;
        match event {
            Event::Start(e) => {
                let id = open_element(&mut doc, &stack, &e, position)?;
                stack.push(id);
            }
            Event::Empty(e) => {
                open_element(&mut doc, &stack, &e, position)?;
            }
            Event::End(e) => {
                let found = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let open = stack.pop().ok_or_else(|| LoadError::UnbalancedTag {
                    found: found.clone(),
                    position,
                })?;
                // quick-xml already checks matching names; this catches a
                // closing tag with nothing open.
                if let Some(doc) = &doc {
                    if doc.tag(open) != found {
                        return Err(LoadError::UnbalancedTag { found, position });
                    }
                }
            }
            Event::Text(t) => {
                if let (Some(doc), Some(open)) = (doc.as_mut(), stack.last()) {
                    let text = t.unescape().map_err(|err| LoadError::Malformed {
                        position,
                        message: err.to_string(),
                    })?;
                    if !text.trim().is_empty() {
                        doc.push_text(*open, text.trim());
                    }
                }
            }
            Event::CData(c) => {
                if let (Some(doc), Some(open)) = (doc.as_mut(), stack.last()) {
                    doc.push_text(*open, &String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let (Some(doc), Some(open)) = (&doc, stack.last()) {
        return Err(LoadError::Truncated {
            open: doc.tag(*open).to_string(),
        });
    }
    let doc = doc.ok_or(LoadError::Empty)?;
    if doc.tag(doc.root()) != "project" {
        return Err(LoadError::NotAProject(doc.tag(doc.root()).to_string()));
    }
    Ok(doc)
}

fn open_element(
    doc: &mut Option<Document>,
    stack: &[NodeId],
    e: &BytesStart,
    position: u64,
) -> Result<NodeId, LoadError> {
    let tag = std::str::from_utf8(e.name().as_ref())
        .map_err(|err| LoadError::Malformed {
            position,
            message: err.to_string(),
        })?
        .to_string();

    let id = match stack.last() {
        Some(parent) => match doc.as_mut() {
            Some(doc) => doc.append_child(*parent, &tag),
            None => return Err(LoadError::Empty),
        },
        None if doc.is_none() => {
            let fresh = Document::new(&tag);
            let root = fresh.root();
            *doc = Some(fresh);
            root
        }
        None => {
            return Err(LoadError::Malformed {
                position,
                message: format!("unexpected second top-level element <{}>", tag),
            })
        }
    };

    let Some(doc) = doc.as_mut() else {
        return Err(LoadError::Empty);
    };
    for attr in e.attributes() {
        let attr = attr.map_err(|err| LoadError::Malformed {
            position,
            message: err.to_string(),
        })?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|err| LoadError::Malformed {
                position,
                message: err.to_string(),
            })?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| LoadError::Malformed {
                position,
                message: err.to_string(),
            })?
            .into_owned();
        doc.set_attr(id, &key, &value);
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<project xmlns="http://www.plcopen.org/xml/tc6_0201">
  <fileHeader companyName="ACME" productName="Line" productVersion="1" creationDateTime="2024-01-01T00:00:00"/>
  <contentHeader name="Line 1">
    <coordinateInfo/>
  </contentHeader>
  <types>
    <dataTypes>
      <dataType name="Level">
        <baseType><REAL/></baseType>
        <initialValue><simpleValue value="1.5 &lt; 2"/></initialValue>
      </dataType>
    </dataTypes>
    <pous/>
  </types>
</project>"#;

    #[test]
    fn loads_elements_and_attributes() {
        let doc = parse_xml_from_str(SAMPLE).unwrap();
        let root = doc.root();
        assert_eq!(doc.tag(root), "project");
        let header = doc.find_child(root, "contentHeader").unwrap();
        assert_eq!(doc.attr(header, "name"), Some("Line 1"));
        let dt = doc.path(root, &["types", "dataTypes", "dataType"]).unwrap();
        let sv = doc.path(dt, &["initialValue", "simpleValue"]).unwrap();
        assert_eq!(doc.attr(sv, "value"), Some("1.5 < 2"));
        let base = doc.path(dt, &["baseType", "REAL"]);
        assert!(base.is_some());
        assert_eq!(doc.text(root), "");
    }

    #[test]
    fn keeps_character_data() {
        let doc = parse_xml_from_str("<project><body><ST>x := 1 &amp; y;</ST></body></project>").unwrap();
        let st = doc.path(doc.root(), &["body", "ST"]).unwrap();
        assert_eq!(doc.text(st), "x := 1 & y;");
    }

    #[test]
    fn rejects_broken_documents() {
        assert!(matches!(parse_xml_from_str(""), Err(LoadError::Empty)));
        assert!(matches!(
            parse_xml_from_str("<config/>"),
            Err(LoadError::NotAProject(tag)) if tag == "config"
        ));
        assert!(parse_xml_from_str("<project><types></project>").is_err());
        assert!(parse_xml_from_str("<project><types>").is_err());
    }
}
