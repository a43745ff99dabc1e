/*!
 * Tolerant markup parser.
 *
 * Handles the subset of HTML that presentation decks are written in: doctype,
 * comments, start and end tags with quoted, unquoted or valueless attributes,
 * void elements and raw-text elements. Text and attribute values are kept
 * verbatim (entities are not decoded) so untouched regions of the document
 * serialize back exactly as they were read.
 */

use log::trace;

use crate::errors::DocumentError;

use super::model::{Attribute, Document, ElementData, NodeId, NodeKind};

/// Elements that never have an end tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose content is not markup
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

/// Parse markup into a document tree
pub fn parse(input: &str) -> Result<Document, DocumentError> {
    let mut parser = Parser {
        input,
        pos: 0,
        document: Document::new(),
        open: Vec::new(),
    };
    parser.run()?;
    Ok(parser.document)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    document: Document,
    open: Vec<NodeId>,
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.')
}

impl Parser<'_> {
    fn run(&mut self) -> Result<(), DocumentError> {
        while self.pos < self.input.len() {
            let rest = &self.input[self.pos..];
            let next = rest.as_bytes().get(1).copied();

            if rest.starts_with("<!--") {
                self.comment()?;
            } else if rest.starts_with("<!") {
                self.doctype()?;
            } else if rest.starts_with("</") && next_is_alpha(rest, 2) {
                self.end_tag()?;
            } else if rest.starts_with('<') && next.is_some_and(|b| b.is_ascii_alphabetic()) {
                self.start_tag()?;
            } else {
                self.text();
            }
        }
        Ok(())
    }

    fn current_parent(&self) -> NodeId {
        self.open.last().copied().unwrap_or(self.document.root())
    }

    fn malformed(&self, offset: usize, reason: impl Into<String>) -> DocumentError {
        DocumentError::Malformed {
            offset,
            reason: reason.into(),
        }
    }

    fn attach(&mut self, node: NodeId) -> Result<(), DocumentError> {
        let parent = self.current_parent();
        self.document
            .append_child(parent, node)
            .map_err(|e| self.malformed(self.pos, e.to_string()))
    }

    fn push_text(&mut self, text: &str) -> Result<(), DocumentError> {
        if text.is_empty() {
            return Ok(());
        }
        let parent = self.current_parent();
        // Merge with a preceding text sibling so literal '<' does not split runs
        if let Some(last) = self.document.children(parent).last().copied() {
            if self.document.text(last).is_some() {
                if let NodeKind::Text(existing) = self.document.node_mut(last) {
                    existing.push_str(text);
                    return Ok(());
                }
            }
        }
        let node = self.document.create_text(text);
        self.attach(node)
    }

    fn comment(&mut self) -> Result<(), DocumentError> {
        let start = self.pos + 4;
        let end = self.input[start..]
            .find("-->")
            .ok_or_else(|| self.malformed(self.pos, "unterminated comment"))?;
        let body = self.input[start..start + end].to_string();
        let node = self.document.create_node(NodeKind::Comment(body));
        self.attach(node)?;
        self.pos = start + end + 3;
        Ok(())
    }

    fn doctype(&mut self) -> Result<(), DocumentError> {
        let start = self.pos + 2;
        let end = self.input[start..]
            .find('>')
            .ok_or_else(|| self.malformed(self.pos, "unterminated declaration"))?;
        let body = self.input[start..start + end].to_string();
        let node = self.document.create_node(NodeKind::Doctype(body));
        self.attach(node)?;
        self.pos = start + end + 1;
        Ok(())
    }

    fn read_name(&self, from: usize) -> (String, usize) {
        let bytes = self.input.as_bytes();
        let mut end = from;
        while end < bytes.len() && is_name_char(bytes[end]) {
            end += 1;
        }
        (self.input[from..end].to_ascii_lowercase(), end)
    }

    fn end_tag(&mut self) -> Result<(), DocumentError> {
        let (name, after) = self.read_name(self.pos + 2);
        let close = self.input[after..]
            .find('>')
            .ok_or_else(|| self.malformed(self.pos, format!("unterminated end tag </{}", name)))?;
        self.pos = after + close + 1;

        let matching = self
            .open
            .iter()
            .rposition(|id| self.document.tag(*id) == Some(name.as_str()));
        match matching {
            Some(index) => self.open.truncate(index),
            None => trace!("Ignoring stray end tag </{}>", name),
        }
        Ok(())
    }

    fn start_tag(&mut self) -> Result<(), DocumentError> {
        let tag_start = self.pos;
        let input = self.input;
        let (tag, mut i) = self.read_name(self.pos + 1);
        let bytes = input.as_bytes();
        let mut attributes = Vec::new();
        let self_closing;

        loop {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= bytes.len() {
                return Err(self.malformed(tag_start, format!("unterminated tag <{}", tag)));
            }
            match bytes[i] {
                b'>' => {
                    self_closing = false;
                    i += 1;
                    break;
                }
                b'/' if bytes.get(i + 1) == Some(&b'>') => {
                    self_closing = true;
                    i += 2;
                    break;
                }
                b'/' | b'=' | b'"' | b'\'' | b'<' => {
                    i += 1;
                    continue;
                }
                _ => {}
            }

            let key_start = i;
            while i < bytes.len()
                && !bytes[i].is_ascii_whitespace()
                && !matches!(bytes[i], b'=' | b'>' | b'/' | b'"' | b'\'')
            {
                i += 1;
            }
            let key = self.input[key_start..i].to_ascii_lowercase();

            let mut look = i;
            while look < bytes.len() && bytes[look].is_ascii_whitespace() {
                look += 1;
            }
            if look < bytes.len() && bytes[look] == b'=' {
                i = look + 1;
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                if i >= bytes.len() {
                    return Err(self.malformed(tag_start, format!("unterminated tag <{}", tag)));
                }
                let value = match bytes[i] {
                    quote @ (b'"' | b'\'') => {
                        let value_start = i + 1;
                        let close = self.input[value_start..]
                            .find(quote as char)
                            .ok_or_else(|| {
                                self.malformed(i, format!("unterminated value for attribute '{}'", key))
                            })?;
                        i = value_start + close + 1;
                        self.input[value_start..value_start + close].to_string()
                    }
                    _ => {
                        let value_start = i;
                        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                            i += 1;
                        }
                        self.input[value_start..i].to_string()
                    }
                };
                attributes.push(Attribute::new(key, Some(value)));
            } else {
                attributes.push(Attribute::flag(key));
            }
        }

        self.pos = i;
        let node = self.document.create_node(NodeKind::Element(ElementData {
            tag: tag.clone(),
            attributes,
            self_closing,
        }));
        self.attach(node)?;

        if self_closing || is_void_element(&tag) {
            return Ok(());
        }

        if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
            // Raw text runs to the matching end tag (or end of input); the end
            // tag itself is then skipped as stray since the element never opens
            let lowered = self.input[self.pos..].to_ascii_lowercase();
            let end = lowered
                .find(&format!("</{}", tag))
                .unwrap_or(lowered.len());
            let body = &self.input[self.pos..self.pos + end];
            if !body.is_empty() {
                let text = self.document.create_text(body);
                self.document
                    .append_child(node, text)
                    .map_err(|e| self.malformed(self.pos, e.to_string()))?;
            }
            self.pos += end;
            return Ok(());
        }

        self.open.push(node);
        Ok(())
    }

    fn text(&mut self) {
        // A '<' that does not open a construct is literal text
        let input = self.input;
        let skip = usize::from(input[self.pos..].starts_with('<'));
        let end = input[self.pos + skip..]
            .find('<')
            .map(|i| self.pos + skip + i)
            .unwrap_or(input.len());
        let text = &input[self.pos..end];
        self.pos = end;
        // Text attachment cannot fail: the node is freshly created
        let _ = self.push_text(text);
    }
}

fn next_is_alpha(rest: &str, index: usize) -> bool {
    rest.as_bytes()
        .get(index)
        .is_some_and(|b| b.is_ascii_alphabetic())
}
