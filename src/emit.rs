//! Writes an (annotated) document back out as XML.

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::document::{Document, NodeId};
use crate::error::EmitError;

pub fn write_to_string(doc: &Document) -> Result<String, EmitError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    write_node(&mut writer, doc, doc.root())?;
    Ok(String::from_utf8(writer.into_inner())?)
}

pub fn write_to_file(doc: &Document, path: &Path) -> Result<(), EmitError> {
    let xml = write_to_string(doc)?;
    fs::write(path, xml)?;
    Ok(())
}

fn write_node(writer: &mut Writer<Vec<u8>>, doc: &Document, id: NodeId) -> Result<(), EmitError> {
    let node = doc.node(id);
    let mut start = BytesStart::new(node.tag.as_str());
    for (key, value) in &node.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if node.children.is_empty() && node.text.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    writer.write_event(Event::Start(start))?;
    if !node.text.is_empty() {
        writer.write_event(Event::Text(BytesText::new(&node.text)))?;
    }
    for &child in &node.children {
        write_node(writer, doc, child)?;
    }
    writer.write_event(Event::End(BytesEnd::new(node.tag.as_str())))?;
    Ok(())
}
