//! Traversal protocol
//!
//! The visitor contract a tree walker drives to describe one hierarchical
//! document instance, independent of the target notation, plus the scope
//! guard that enforces the protocol's stack discipline.
//!
//! The protocol is a single-threaded, synchronous call/return sequence: a
//! renderer must not suspend or hand control to another thread between a
//! paired start/end, since scope state is not reentrant. Events arrive in
//! pre-order: element open, its attributes, then its text, comments,
//! associations and children in source order, element close.

use crate::export::ExportError;
use serde::Serialize;
use thiserror::Error;

/// A breach of the traversal protocol's stack discipline.
///
/// Always fatal to the current document; indicates a producer bug and is
/// never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ProtocolError {
    /// The first element of a document did not carry the root flag
    #[error("first element of a document must carry the root flag (got '{name}')")]
    MissingRoot { name: String },

    /// A second root-flagged element was announced inside the document
    #[error("root element announced twice (second root: '{name}')")]
    DuplicateRoot { name: String },

    /// An end event arrived with no open scope to close
    #[error("end of '{name}' without a matching start")]
    EndWithoutStart { name: String },

    /// An end event named a different scope than the innermost open one
    #[error("end of '{found}' does not match the open scope '{expected}'")]
    MismatchedEnd { expected: String, found: String },

    /// The root flag on an element end differed from its start
    #[error("root flag mismatch on end of element '{name}'")]
    RootFlagMismatch { name: String },

    /// A text event arrived outside an open element scope
    #[error("text event outside of an open element scope")]
    TextOutsideElement,

    /// A text event carried an empty or whitespace-only payload
    #[error("text event with blank payload")]
    BlankText,

    /// An association event arrived outside an open element scope
    #[error("association '{name}' outside of an open element scope")]
    AssociationOutsideElement { name: String },

    /// Parallel attribute sequences differed in length
    #[error("attribute names and values differ in length ({names} names, {values} values)")]
    AttributeArity { names: usize, values: usize },

    /// An event arrived after the root element was already closed
    #[error("'{event}' event after the document completed (root '{root}' already closed)")]
    AfterDocumentEnd { event: &'static str, root: String },

    /// The event stream ended while scopes were still open
    #[error("document ended with {open} unclosed scope(s) (innermost: '{innermost}')")]
    UnterminatedDocument { open: usize, innermost: String },

    /// The event stream ended before any element was announced
    #[error("traversal delivered no element events")]
    EmptyDocument,

    /// A row event arrived outside an open table (flat path)
    #[error("row event outside of an open table")]
    RowOutsideTable,

    /// A row's value count differed from the announced column list (flat path)
    #[error("row has {got} values for {expected} columns in table '{table}'")]
    RowArity {
        table: String,
        expected: usize,
        got: usize,
    },

    /// A table was opened while another was still open (flat path)
    #[error("table '{name}' opened while '{open}' is still open")]
    NestedTable { name: String, open: String },

    /// The flat emitter was finished while a table was still open
    #[error("table '{name}' left open at finish")]
    UnterminatedTable { name: String },
}

/// The visitor contract for object notations.
///
/// A conforming renderer implements every event handler; the tree walker is
/// the canonical caller and delivers events synchronously, in traversal
/// order. Scopes nest like parentheses: every `element_start` is closed by
/// a matching `element_end`, every `association_start` by a matching
/// `association_end`, and the association close arrives exactly where the
/// next sibling event (or the parent's end) would otherwise begin.
pub trait ObjectNotationWriter {
    /// Announce the opening of an element.
    ///
    /// `attr_names` and `attr_values` are parallel ordered sequences of
    /// equal length. `is_root` is true exactly once per document, on the
    /// outermost element.
    fn element_start(
        &mut self,
        name: &str,
        is_root: bool,
        attr_names: &[&str],
        attr_values: &[&str],
    ) -> Result<(), ExportError>;

    /// Close the most recently opened unmatched element scope.
    ///
    /// `name` and `is_root` must match the corresponding `element_start`.
    fn element_end(&mut self, name: &str, is_root: bool) -> Result<(), ExportError>;

    /// Deliver character data belonging to the currently open element.
    ///
    /// The payload is never empty and never whitespace-only; such runs are
    /// discarded upstream. If more than one text event occurs for the same
    /// element, the renderer owns the concatenation semantics appropriate
    /// to its notation.
    fn text(&mut self, content: &str) -> Result<(), ExportError>;

    /// Announce that the elements up to the matching `association_end`
    /// belong to the association `association_name`, whose child elements
    /// carry the element name `element_name`.
    fn association_start(
        &mut self,
        association_name: &str,
        element_name: &str,
    ) -> Result<(), ExportError>;

    /// Close the innermost open association scope.
    fn association_end(&mut self, association_name: &str) -> Result<(), ExportError>;

    /// Deliver an annotation with no structural effect.
    ///
    /// A renderer may ignore it or emit it as notation-specific comment
    /// syntax; it never opens or closes a scope.
    fn comment(&mut self, text: &str) -> Result<(), ExportError>;
}

impl<W: ObjectNotationWriter + ?Sized> ObjectNotationWriter for &mut W {
    fn element_start(
        &mut self,
        name: &str,
        is_root: bool,
        attr_names: &[&str],
        attr_values: &[&str],
    ) -> Result<(), ExportError> {
        (**self).element_start(name, is_root, attr_names, attr_values)
    }

    fn element_end(&mut self, name: &str, is_root: bool) -> Result<(), ExportError> {
        (**self).element_end(name, is_root)
    }

    fn text(&mut self, content: &str) -> Result<(), ExportError> {
        (**self).text(content)
    }

    fn association_start(
        &mut self,
        association_name: &str,
        element_name: &str,
    ) -> Result<(), ExportError> {
        (**self).association_start(association_name, element_name)
    }

    fn association_end(&mut self, association_name: &str) -> Result<(), ExportError> {
        (**self).association_end(association_name)
    }

    fn comment(&mut self, text: &str) -> Result<(), ExportError> {
        (**self).comment(text)
    }
}

/// A renderer that accumulates notation text over one balanced walk.
pub trait ObjectNotationRenderer: ObjectNotationWriter {
    /// Retrieve the rendered document after a complete traversal.
    ///
    /// Fails if the walk never completed (scopes still open or no root).
    fn finish(&mut self) -> Result<String, ExportError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope {
    Element { name: String, is_root: bool },
    Association { name: String },
}

impl Scope {
    fn describe(&self) -> String {
        match self {
            Scope::Element { name, .. } => format!("element '{name}'"),
            Scope::Association { name } => format!("association '{name}'"),
        }
    }

    fn name(&self) -> &str {
        match self {
            Scope::Element { name, .. } => name,
            Scope::Association { name } => name,
        }
    }
}

/// Decorator enforcing the traversal protocol's stack discipline.
///
/// Wraps any [`ObjectNotationWriter`] and verifies every event against the
/// protocol automaton before forwarding it: scope balance, name/root
/// matching on close, the non-blank-text invariant, attribute sequence
/// arity, and single-root identity. Violations surface as
/// [`ExportError::Protocol`] and nothing is forwarded for the offending
/// event.
///
/// The tree walker wraps every renderer in a `ScopeGuard`; producers that
/// stream events directly can do the same to get the identical checks.
pub struct ScopeGuard<W> {
    inner: W,
    stack: Vec<Scope>,
    root_name: Option<String>,
    complete: bool,
}

impl<W: ObjectNotationWriter> ScopeGuard<W> {
    /// Wrap a writer in protocol checks.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            stack: Vec::new(),
            root_name: None,
            complete: false,
        }
    }

    /// The slash-separated path of currently open scopes, for diagnostics.
    pub fn open_path(&self) -> String {
        self.stack
            .iter()
            .map(Scope::name)
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Verify that the document completed: a root was announced and every
    /// scope was closed.
    pub fn ensure_complete(&self) -> Result<(), ExportError> {
        if self.complete {
            return Ok(());
        }
        match self.stack.last() {
            Some(innermost) => Err(ProtocolError::UnterminatedDocument {
                open: self.stack.len(),
                innermost: innermost.name().to_string(),
            }
            .into()),
            None => Err(ProtocolError::EmptyDocument.into()),
        }
    }

    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }

    fn reject_after_end(&self, event: &'static str) -> Result<(), ExportError> {
        if self.complete {
            return Err(ProtocolError::AfterDocumentEnd {
                event,
                root: self.root_name.clone().unwrap_or_default(),
            }
            .into());
        }
        Ok(())
    }
}

impl<W: ObjectNotationWriter> ObjectNotationWriter for ScopeGuard<W> {
    fn element_start(
        &mut self,
        name: &str,
        is_root: bool,
        attr_names: &[&str],
        attr_values: &[&str],
    ) -> Result<(), ExportError> {
        self.reject_after_end("element_start")?;
        if attr_names.len() != attr_values.len() {
            return Err(ProtocolError::AttributeArity {
                names: attr_names.len(),
                values: attr_values.len(),
            }
            .into());
        }
        if self.stack.is_empty() && !is_root {
            return Err(ProtocolError::MissingRoot {
                name: name.to_string(),
            }
            .into());
        }
        if !self.stack.is_empty() && is_root {
            return Err(ProtocolError::DuplicateRoot {
                name: name.to_string(),
            }
            .into());
        }
        if self.stack.is_empty() {
            self.root_name = Some(name.to_string());
        }
        self.inner
            .element_start(name, is_root, attr_names, attr_values)?;
        self.stack.push(Scope::Element {
            name: name.to_string(),
            is_root,
        });
        Ok(())
    }

    fn element_end(&mut self, name: &str, is_root: bool) -> Result<(), ExportError> {
        self.reject_after_end("element_end")?;
        let top = match self.stack.last() {
            Some(top) => top,
            None => {
                return Err(ProtocolError::EndWithoutStart {
                    name: name.to_string(),
                }
                .into());
            }
        };
        match top {
            Scope::Element {
                name: open_name,
                is_root: open_root,
            } => {
                if open_name != name {
                    return Err(ProtocolError::MismatchedEnd {
                        expected: top.describe(),
                        found: name.to_string(),
                    }
                    .into());
                }
                if *open_root != is_root {
                    return Err(ProtocolError::RootFlagMismatch {
                        name: name.to_string(),
                    }
                    .into());
                }
            }
            Scope::Association { .. } => {
                return Err(ProtocolError::MismatchedEnd {
                    expected: top.describe(),
                    found: name.to_string(),
                }
                .into());
            }
        }
        self.inner.element_end(name, is_root)?;
        self.stack.pop();
        if self.stack.is_empty() {
            self.complete = true;
        }
        Ok(())
    }

    fn text(&mut self, content: &str) -> Result<(), ExportError> {
        self.reject_after_end("text")?;
        if content.trim().is_empty() {
            return Err(ProtocolError::BlankText.into());
        }
        match self.stack.last() {
            Some(Scope::Element { .. }) => self.inner.text(content),
            _ => Err(ProtocolError::TextOutsideElement.into()),
        }
    }

    fn association_start(
        &mut self,
        association_name: &str,
        element_name: &str,
    ) -> Result<(), ExportError> {
        self.reject_after_end("association_start")?;
        match self.stack.last() {
            Some(Scope::Element { .. }) => {}
            _ => {
                return Err(ProtocolError::AssociationOutsideElement {
                    name: association_name.to_string(),
                }
                .into());
            }
        }
        self.inner.association_start(association_name, element_name)?;
        self.stack.push(Scope::Association {
            name: association_name.to_string(),
        });
        Ok(())
    }

    fn association_end(&mut self, association_name: &str) -> Result<(), ExportError> {
        self.reject_after_end("association_end")?;
        let top = match self.stack.last() {
            Some(top) => top,
            None => {
                return Err(ProtocolError::EndWithoutStart {
                    name: association_name.to_string(),
                }
                .into());
            }
        };
        match top {
            Scope::Association { name } if name == association_name => {}
            _ => {
                return Err(ProtocolError::MismatchedEnd {
                    expected: top.describe(),
                    found: association_name.to_string(),
                }
                .into());
            }
        }
        self.inner.association_end(association_name)?;
        self.stack.pop();
        Ok(())
    }

    fn comment(&mut self, text: &str) -> Result<(), ExportError> {
        self.reject_after_end("comment")?;
        self.inner.comment(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writer that accepts everything, for exercising the guard alone.
    #[derive(Default)]
    struct NullWriter;

    impl ObjectNotationWriter for NullWriter {
        fn element_start(
            &mut self,
            _name: &str,
            _is_root: bool,
            _attr_names: &[&str],
            _attr_values: &[&str],
        ) -> Result<(), ExportError> {
            Ok(())
        }

        fn element_end(&mut self, _name: &str, _is_root: bool) -> Result<(), ExportError> {
            Ok(())
        }

        fn text(&mut self, _content: &str) -> Result<(), ExportError> {
            Ok(())
        }

        fn association_start(
            &mut self,
            _association_name: &str,
            _element_name: &str,
        ) -> Result<(), ExportError> {
            Ok(())
        }

        fn association_end(&mut self, _association_name: &str) -> Result<(), ExportError> {
            Ok(())
        }

        fn comment(&mut self, _text: &str) -> Result<(), ExportError> {
            Ok(())
        }
    }

    fn guard() -> ScopeGuard<NullWriter> {
        ScopeGuard::new(NullWriter)
    }

    fn protocol_error(result: Result<(), ExportError>) -> ProtocolError {
        match result.unwrap_err() {
            ExportError::Protocol(e) => e,
            other => panic!("expected protocol error, got {other:?}"),
        }
    }

    #[test]
    fn test_balanced_document_completes() {
        let mut g = guard();
        g.element_start("Customer", true, &["id"], &["1"]).unwrap();
        g.text("hello").unwrap();
        g.element_end("Customer", true).unwrap();
        g.ensure_complete().unwrap();
    }

    #[test]
    fn test_first_element_must_be_root() {
        let mut g = guard();
        let err = protocol_error(g.element_start("Order", false, &[], &[]));
        assert_eq!(
            err,
            ProtocolError::MissingRoot {
                name: "Order".to_string()
            }
        );
    }

    #[test]
    fn test_nested_root_is_rejected() {
        let mut g = guard();
        g.element_start("Customer", true, &[], &[]).unwrap();
        let err = protocol_error(g.element_start("Order", true, &[], &[]));
        assert_eq!(
            err,
            ProtocolError::DuplicateRoot {
                name: "Order".to_string()
            }
        );
    }

    #[test]
    fn test_mismatched_close_is_rejected() {
        let mut g = guard();
        g.element_start("Customer", true, &[], &[]).unwrap();
        g.element_start("Order", false, &[], &[]).unwrap();
        let err = protocol_error(g.element_end("Customer", true));
        assert_eq!(
            err,
            ProtocolError::MismatchedEnd {
                expected: "element 'Order'".to_string(),
                found: "Customer".to_string(),
            }
        );
    }

    #[test]
    fn test_root_flag_must_match_on_close() {
        let mut g = guard();
        g.element_start("Customer", true, &[], &[]).unwrap();
        let err = protocol_error(g.element_end("Customer", false));
        assert_eq!(
            err,
            ProtocolError::RootFlagMismatch {
                name: "Customer".to_string()
            }
        );
    }

    #[test]
    fn test_unequal_attribute_sequences_are_rejected_before_forwarding() {
        let mut g = guard();
        let err = protocol_error(g.element_start("Customer", true, &["a", "b"], &["1"]));
        assert_eq!(err, ProtocolError::AttributeArity { names: 2, values: 1 });
    }

    #[test]
    fn test_blank_text_is_rejected() {
        let mut g = guard();
        g.element_start("Customer", true, &[], &[]).unwrap();
        assert_eq!(protocol_error(g.text("")), ProtocolError::BlankText);
        assert_eq!(protocol_error(g.text("  \n\t ")), ProtocolError::BlankText);
    }

    #[test]
    fn test_text_outside_element_is_rejected() {
        let mut g = guard();
        assert_eq!(protocol_error(g.text("x")), ProtocolError::TextOutsideElement);
    }

    #[test]
    fn test_text_directly_inside_association_is_rejected() {
        let mut g = guard();
        g.element_start("Customer", true, &[], &[]).unwrap();
        g.association_start("orders", "Order").unwrap();
        assert_eq!(protocol_error(g.text("x")), ProtocolError::TextOutsideElement);
    }

    #[test]
    fn test_association_requires_open_element() {
        let mut g = guard();
        let err = protocol_error(g.association_start("orders", "Order"));
        assert_eq!(
            err,
            ProtocolError::AssociationOutsideElement {
                name: "orders".to_string()
            }
        );
    }

    #[test]
    fn test_element_end_cannot_close_association() {
        let mut g = guard();
        g.element_start("Customer", true, &[], &[]).unwrap();
        g.association_start("orders", "Order").unwrap();
        let err = protocol_error(g.element_end("Customer", true));
        assert_eq!(
            err,
            ProtocolError::MismatchedEnd {
                expected: "association 'orders'".to_string(),
                found: "Customer".to_string(),
            }
        );
    }

    #[test]
    fn test_events_after_completion_are_rejected() {
        let mut g = guard();
        g.element_start("Customer", true, &[], &[]).unwrap();
        g.element_end("Customer", true).unwrap();
        let err = protocol_error(g.comment("late"));
        assert_eq!(
            err,
            ProtocolError::AfterDocumentEnd {
                event: "comment",
                root: "Customer".to_string(),
            }
        );
    }

    #[test]
    fn test_unterminated_document_is_reported_with_context() {
        let mut g = guard();
        g.element_start("Customer", true, &[], &[]).unwrap();
        g.element_start("Order", false, &[], &[]).unwrap();
        assert_eq!(g.open_path(), "Customer/Order");
        let err = protocol_error(g.ensure_complete());
        assert_eq!(
            err,
            ProtocolError::UnterminatedDocument {
                open: 2,
                innermost: "Order".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_event_stream_is_reported() {
        let g = guard();
        assert_eq!(protocol_error(g.ensure_complete()), ProtocolError::EmptyDocument);
    }
}
