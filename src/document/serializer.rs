/*!
 * Renders a document tree back to markup.
 */

use super::model::{Document, NodeId, NodeKind};
use super::parser::is_void_element;

/// Serialize the whole document
pub fn render(document: &Document) -> String {
    let mut out = String::new();
    render_node(document, document.root(), &mut out);
    out
}

/// Serialize a single subtree, e.g. for logging an inserted node
pub fn render_subtree(document: &Document, id: NodeId) -> String {
    let mut out = String::new();
    render_node(document, id, &mut out);
    out
}

fn render_node(document: &Document, id: NodeId, out: &mut String) {
    match document.node(id) {
        NodeKind::Document => render_children(document, id, out),
        NodeKind::Text(text) => out.push_str(text),
        NodeKind::Comment(body) => {
            out.push_str("<!--");
            out.push_str(body);
            out.push_str("-->");
        }
        NodeKind::Doctype(body) => {
            out.push_str("<!");
            out.push_str(body);
            out.push('>');
        }
        NodeKind::Element(element) => {
            out.push('<');
            out.push_str(&element.tag);
            for attribute in &element.attributes {
                out.push(' ');
                out.push_str(&attribute.key);
                if let Some(value) = &attribute.value {
                    out.push_str("=\"");
                    out.push_str(&value.replace('"', "&quot;"));
                    out.push('"');
                }
            }

            let children = document.children(id);
            if element.self_closing && children.is_empty() {
                out.push_str("/>");
                return;
            }
            out.push('>');
            if is_void_element(&element.tag) && children.is_empty() {
                return;
            }
            render_children(document, id, out);
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
    }
}

fn render_children(document: &Document, id: NodeId, out: &mut String) {
    for child in document.children(id) {
        render_node(document, *child, out);
    }
}
