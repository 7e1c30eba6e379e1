//! Tree walker driving the traversal protocol
//!
//! The walker is the single choke point between the document model and the
//! renderers: it delivers events in pre-order, filters whitespace-only text
//! before the protocol boundary, and wraps the renderer in a
//! [`ScopeGuard`](crate::export::writer::ScopeGuard) so any discipline
//! breach surfaces as a protocol error instead of corrupt output.

use crate::export::ExportError;
use crate::export::writer::{ObjectNotationWriter, ProtocolError, ScopeGuard};
use crate::models::{Element, Node};
use tracing::{debug, info};

/// Walk one document instance against a renderer.
///
/// Events are delivered in pre-order: element open, its attributes, then
/// its text, comments, associations and children in source order, element
/// close. The outermost element must carry the root flag; descendants must
/// not.
///
/// # Example
///
/// ```rust
/// use dataset_export_sdk::export::{JsonRenderer, ObjectNotationRenderer, walk_document};
/// use dataset_export_sdk::models::Element;
///
/// let root = Element::root("Customer")
///     .with_attributes(&["id"], &["1"])
///     .unwrap();
/// let mut renderer = JsonRenderer::new();
/// walk_document(&root, &mut renderer).unwrap();
/// assert!(renderer.finish().unwrap().contains("Customer"));
/// ```
pub fn walk_document<W>(root: &Element, writer: W) -> Result<(), ExportError>
where
    W: ObjectNotationWriter,
{
    if !root.is_root {
        return Err(ProtocolError::MissingRoot {
            name: root.name.clone(),
        }
        .into());
    }

    let mut guard = ScopeGuard::new(writer);
    walk_element(root, &mut guard)?;
    guard.ensure_complete()?;
    info!("rendered document with root '{}'", root.name);
    Ok(())
}

fn walk_element<W>(element: &Element, guard: &mut ScopeGuard<W>) -> Result<(), ExportError>
where
    W: ObjectNotationWriter,
{
    let attr_names: Vec<&str> = element.attributes.iter().map(|a| a.name.as_str()).collect();
    let attr_values: Vec<&str> = element.attributes.iter().map(|a| a.value.as_str()).collect();
    guard.element_start(&element.name, element.is_root, &attr_names, &attr_values)?;

    for child in &element.children {
        match child {
            Node::Element(nested) => walk_element(nested, guard)?,
            Node::Text(content) => {
                if content.trim().is_empty() {
                    // Whitespace-only runs carry no payload; drop them here
                    // so no renderer has to re-detect them.
                    debug!(
                        "discarding whitespace-only text run inside '{}'",
                        element.name
                    );
                    continue;
                }
                guard.text(content)?;
            }
            Node::Comment(text) => guard.comment(text)?,
            Node::Association(association) => {
                guard.association_start(&association.name, &association.element_name)?;
                for nested in &association.elements {
                    walk_element(nested, guard)?;
                }
                guard.association_end(&association.name)?;
            }
        }
    }

    guard.element_end(&element.name, element.is_root)
}
