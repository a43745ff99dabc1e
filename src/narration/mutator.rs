/*!
 * Splicing of audio reference nodes into the document.
 */

use crate::document::{Attribute, Document, NodeId};
use crate::errors::MutationError;

/// What a finished unit hands to the mutator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioReference {
    /// Clip name, used as the `src`
    pub artifact: String,
    /// Voice the clip was synthesized with
    pub voice: String,
}

/// Shape of the inserted `<audio>` element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceOptions {
    pub autoplay: bool,
}

impl Default for ReferenceOptions {
    fn default() -> Self {
        Self { autoplay: true }
    }
}

// @struct: Tree mutation helpers
pub struct TreeMutator;

impl TreeMutator {
    /// Allocate a detached `<audio>` element for a clip
    pub fn reference_node(
        document: &mut Document,
        reference: &AudioReference,
        options: ReferenceOptions,
    ) -> NodeId {
        let mut attributes = Vec::with_capacity(3);
        if options.autoplay {
            attributes.push(Attribute::flag("data-autoplay"));
        }
        attributes.push(Attribute::new("src", Some(reference.artifact.clone())));
        attributes.push(Attribute::new("data-voice", Some(reference.voice.clone())));
        document.create_element("audio", attributes)
    }

    /// Insert `reference_node` right before `anchor` among `parent`'s children.
    /// `anchor` must currently be a child of `parent`.
    pub fn insert_before(
        document: &mut Document,
        parent: NodeId,
        reference_node: NodeId,
        anchor: NodeId,
    ) -> Result<(), MutationError> {
        document.insert_before(parent, reference_node, anchor)
    }

    /// Build the reference node for `anchor` and splice it in front of it
    pub fn splice_reference(
        document: &mut Document,
        anchor: NodeId,
        reference: &AudioReference,
        options: ReferenceOptions,
    ) -> Result<NodeId, MutationError> {
        if !document.contains(anchor) {
            return Err(MutationError::UnknownNode(anchor.index()));
        }
        let parent = document
            .parent(anchor)
            .ok_or(MutationError::Detached(anchor.index()))?;
        let node = Self::reference_node(document, reference, options);
        Self::insert_before(document, parent, node, anchor)?;
        Ok(node)
    }
}
