//! XML renderer for the traversal protocol.

use crate::export::ExportError;
use crate::export::writer::{ObjectNotationRenderer, ObjectNotationWriter};
use crate::validation::validate_xml_name;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

/// Renders one document instance as indented XML.
///
/// Elements become tags with their attributes (self-closing when they have
/// no content), an association becomes a wrapper tag named after the
/// association, and comments are emitted as real `<!-- -->` markup.
/// Element, attribute and association names are validated against XML name
/// rules before anything is written; a name the notation cannot represent
/// fails the export.
///
/// # Example
///
/// ```rust
/// use dataset_export_sdk::export::{ObjectNotationRenderer, XmlRenderer, walk_document};
/// use dataset_export_sdk::models::Element;
///
/// let root = Element::root("Customer")
///     .with_attributes(&["id"], &["1"])
///     .unwrap();
/// let mut renderer = XmlRenderer::new();
/// walk_document(&root, &mut renderer).unwrap();
/// let xml = renderer.finish().unwrap();
/// assert!(xml.starts_with("<?xml"));
/// assert!(xml.contains("<Customer id=\"1\"/>"));
/// ```
pub struct XmlRenderer {
    writer: Writer<Vec<u8>>,
    declaration_written: bool,
    // Opening tag held back so childless elements self-close.
    pending_start: Option<(String, Vec<(String, String)>)>,
}

impl XmlRenderer {
    /// Create a renderer producing two-space-indented output.
    pub fn new() -> Self {
        Self::with_indent(2)
    }

    /// Create a renderer with a custom indent width.
    pub fn with_indent(width: usize) -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', width),
            declaration_written: false,
            pending_start: None,
        }
    }

    fn write_event(&mut self, event: Event<'_>) -> Result<(), ExportError> {
        if !self.declaration_written {
            self.declaration_written = true;
            self.writer
                .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
                .map_err(|e| ExportError::Io(e.to_string()))?;
        }
        self.writer
            .write_event(event)
            .map_err(|e| ExportError::Io(e.to_string()))
    }

    fn flush_pending_start(&mut self) -> Result<(), ExportError> {
        if let Some((name, attributes)) = self.pending_start.take() {
            let start = build_start(&name, &attributes);
            self.write_event(Event::Start(start))?;
        }
        Ok(())
    }
}

impl Default for XmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn build_start<'a>(name: &'a str, attributes: &'a [(String, String)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for (attr, value) in attributes {
        start.push_attribute((attr.as_str(), value.as_str()));
    }
    start
}

impl ObjectNotationWriter for XmlRenderer {
    fn element_start(
        &mut self,
        name: &str,
        _is_root: bool,
        attr_names: &[&str],
        attr_values: &[&str],
    ) -> Result<(), ExportError> {
        validate_xml_name(name)?;
        for attr in attr_names {
            validate_xml_name(attr)?;
        }
        self.flush_pending_start()?;
        let attributes = attr_names
            .iter()
            .zip(attr_values.iter())
            .map(|(attr, value)| ((*attr).to_string(), (*value).to_string()))
            .collect();
        self.pending_start = Some((name.to_string(), attributes));
        Ok(())
    }

    fn element_end(&mut self, name: &str, _is_root: bool) -> Result<(), ExportError> {
        match self.pending_start.take() {
            // No content arrived since the start: self-close.
            Some((open_name, attributes)) => {
                let start = build_start(&open_name, &attributes);
                self.write_event(Event::Empty(start))
            }
            None => self.write_event(Event::End(BytesEnd::new(name.to_string()))),
        }
    }

    fn text(&mut self, content: &str) -> Result<(), ExportError> {
        self.flush_pending_start()?;
        self.write_event(Event::Text(BytesText::new(content)))
    }

    fn association_start(
        &mut self,
        association_name: &str,
        _element_name: &str,
    ) -> Result<(), ExportError> {
        validate_xml_name(association_name)?;
        self.flush_pending_start()?;
        self.write_event(Event::Start(BytesStart::new(association_name.to_string())))
    }

    fn association_end(&mut self, association_name: &str) -> Result<(), ExportError> {
        self.write_event(Event::End(BytesEnd::new(association_name.to_string())))
    }

    fn comment(&mut self, text: &str) -> Result<(), ExportError> {
        self.flush_pending_start()?;
        // "--" terminates an XML comment early; soften it.
        let sanitized = text.replace("--", "- -");
        self.write_event(Event::Comment(BytesText::new(&sanitized)))
    }
}

impl ObjectNotationRenderer for XmlRenderer {
    fn finish(&mut self) -> Result<String, ExportError> {
        let writer = std::mem::replace(&mut self.writer, Writer::new(Vec::new()));
        String::from_utf8(writer.into_inner())
            .map_err(|e| ExportError::Serialization(e.to_string()))
    }
}
