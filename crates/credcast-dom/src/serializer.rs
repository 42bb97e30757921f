//! Markup serialization for [`Node`] trees.

use std::fmt::Write;

use crate::node::Node;

/// Serialize the content of an element: its text and children with their tails.
#[must_use]
pub fn inner_html(node: &Node) -> String {
    let mut out = String::new();
    write_content(node, &mut out);
    out
}

fn write_content(node: &Node, out: &mut String) {
    escape_into(&node.text, false, out);
    for child in &node.children {
        write_element(child, out);
        escape_into(&child.tail, false, out);
    }
}

fn write_element(node: &Node, out: &mut String) {
    out.push('<');
    out.push_str(&node.tag);
    for (key, value) in &node.attrs {
        write!(out, " {key}=\"").unwrap();
        escape_into(value, true, out);
        out.push('"');
    }

    if node.is_void() {
        out.push_str(" />");
        return;
    }

    out.push('>');
    write_content(node, out);
    write!(out, "</{}>", node.tag).unwrap();
}

/// Escape markup-significant characters.
fn escape_into(text: &str, in_attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
