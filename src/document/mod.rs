/*!
 * Markup document handling.
 *
 * - `model`: arena-backed tree of nodes addressed by `NodeId`
 * - `parser`: tolerant HTML-like parser producing a `Document`
 * - `serializer`: renders a `Document` back to markup
 */

pub mod model;
pub mod parser;
pub mod serializer;

pub use model::{Attribute, Document, ElementData, NodeId, NodeKind, NodeType};
pub use parser::parse;
pub use serializer::{render, render_subtree};
