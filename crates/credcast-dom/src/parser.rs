//! Markup parser producing [`Node`] trees.
//!
//! Input is XHTML-style markup as emitted by markdown renderers, with some
//! HTML leniency: void elements may be written without a closing slash, an
//! end tag closes every element opened inside it, end tags matching nothing
//! are skipped, and bare `&` and `<` in text are taken literally. Named HTML
//! entities are decoded before parsing.

use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::entities::{decode_named_entities, decode_reference, escape_stray_markup};
use crate::error::DomError;
use crate::node::{Node, is_void_element};

/// Tag of the synthetic element wrapping every parsed fragment.
pub const ROOT_TAG: &str = "credcast-root";

/// Parse a markup fragment into a synthetic root node holding its content.
///
/// # Errors
///
/// Returns an error if the markup is not well-formed enough for the XML reader.
pub fn parse_fragment(html: &str) -> Result<Node, DomError> {
    let escaped = escape_stray_markup(html);
    let html = decode_named_entities(&escaped);
    let wrapped = format!("<{ROOT_TAG}>{html}</{ROOT_TAG}>");

    let mut reader = Reader::from_str(&wrapped);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(_) => break,
            Event::Eof => return Ok(Node::new(ROOT_TAG)),
            _ => {}
        }
        buf.clear();
    }

    let mut open = vec![ROOT_TAG.to_owned()];
    let (mut root, _) = parse_children(&mut reader, &mut open)?;
    root.tag = ROOT_TAG.to_owned();
    Ok(root)
}

/// Read events until the current element closes, collecting text and children.
///
/// `open` holds the tags of all open elements, the current one last. An end
/// tag naming an outer element closes the current one too; it is returned so
/// the callers up to that element close as well. End tags matching no open
/// element are dropped.
fn parse_children<R: BufRead>(
    reader: &mut Reader<R>,
    open: &mut Vec<String>,
) -> Result<(Node, Option<String>), DomError> {
    let mut buf = Vec::new();
    let mut node = Node::default();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let tag = decode_name(reader, e.name().as_ref());
                let attrs = decode_attrs(reader, &e);
                let (mut child, unwinding) = if is_void_element(&tag) {
                    (Node::default(), None)
                } else {
                    open.push(tag.clone());
                    let parsed = parse_children(reader, open)?;
                    open.pop();
                    parsed
                };
                child.tag = tag;
                child.attrs = attrs;
                node.children.push(child);

                if let Some(end) = unwinding {
                    return Ok(close_or_unwind(node, open, end));
                }
            }
            Event::Empty(e) => {
                let mut child = Node::new(decode_name(reader, e.name().as_ref()));
                child.attrs = decode_attrs(reader, &e);
                node.children.push(child);
            }
            Event::Text(e) => {
                let text = reader.decoder().decode(&e)?;
                append_text(&mut node, &text);
            }
            Event::GeneralRef(e) => {
                let entity = reader.decoder().decode(&e)?;
                append_text(&mut node, &decode_reference(&entity));
            }
            Event::CData(e) => {
                append_text(&mut node, &String::from_utf8_lossy(&e));
            }
            Event::End(e) => {
                let end = decode_name(reader, e.name().as_ref());
                if open.iter().any(|tag| tag.eq_ignore_ascii_case(&end)) {
                    return Ok(close_or_unwind(node, open, end));
                }
            }
            Event::Eof => return Ok((node, None)),
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
        buf.clear();
    }
}

/// Close the current element for `end`, passing `end` on if it names an outer one.
fn close_or_unwind(node: Node, open: &[String], end: String) -> (Node, Option<String>) {
    let closes_current = open
        .last()
        .is_some_and(|current| current.eq_ignore_ascii_case(&end));
    if closes_current {
        (node, None)
    } else {
        (node, Some(end))
    }
}

fn decode_name<R: BufRead>(reader: &Reader<R>, name: &[u8]) -> String {
    reader.decoder().decode(name).map_or_else(
        |_| String::from_utf8_lossy(name).into_owned(),
        std::borrow::Cow::into_owned,
    )
}

fn decode_attrs<R: BufRead>(reader: &Reader<R>, e: &BytesStart) -> Vec<(String, String)> {
    e.html_attributes()
        .flatten()
        .map(|attr| {
            let key = decode_name(reader, attr.key.as_ref());
            let value = attr.unescape_value().map_or_else(
                |_| String::from_utf8_lossy(&attr.value).into_owned(),
                std::borrow::Cow::into_owned,
            );
            (key, value)
        })
        .collect()
}

/// Append text to the node's text, or to the last child's tail.
fn append_text(node: &mut Node, text: &str) {
    if let Some(last) = node.children.last_mut() {
        last.tail.push_str(text);
    } else {
        node.text.push_str(text);
    }
}
