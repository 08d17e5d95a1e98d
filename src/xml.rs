//! Textual XML output
use std::io::Write;

use quick_xml::{
    Writer,
    escape::partial_escape,
    events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event as XmlEvent},
};

use crate::{
    error::DecodeError,
    fastinfoset::{Characters, Element, Event},
};

const CDATA_END: &str = "]]>";

/// Canonical output: indented by 2 spaces, no XML declaration.
pub static CANONICAL: OutputPolicy = OutputPolicy {
    indent: true,
    indent_amount: 2,
    omit_declaration: true,
};

/// Layout of the serialized XML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputPolicy {
    /// Put each element on its own line.
    pub indent: bool,
    /// Number of spaces per nesting level when `indent` is set.
    pub indent_amount: usize,
    /// Do not write `<?xml version="1.0" encoding="UTF-8"?>`.
    pub omit_declaration: bool,
}

impl OutputPolicy {
    /// Returns the shared canonical policy.
    pub fn canonical() -> &'static OutputPolicy {
        &CANONICAL
    }
}

impl Default for OutputPolicy {
    fn default() -> Self {
        CANONICAL
    }
}

/// Writes decoder events as XML text.
///
/// Start tags are held back until the next event so that elements without
/// content are written as empty-element tags.
pub struct XmlSerializer<W: Write> {
    writer: Writer<W>,
    policy: OutputPolicy,
    pending_start: Option<BytesStart<'static>>,
}

impl<W: Write> XmlSerializer<W> {
    pub fn new(dest: W, policy: &OutputPolicy) -> Result<Self, DecodeError> {
        let writer = if policy.indent {
            Writer::new_with_indent(dest, b' ', policy.indent_amount)
        } else {
            Writer::new(dest)
        };

        let mut serializer = Self {
            writer,
            policy: *policy,
            pending_start: None,
        };

        if !policy.omit_declaration {
            serializer.write(XmlEvent::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        }

        Ok(serializer)
    }

    pub fn policy(&self) -> &OutputPolicy {
        &self.policy
    }

    pub fn get_ref(&self) -> &W {
        self.writer.get_ref()
    }

    pub fn write_event(&mut self, event: &Event) -> Result<(), DecodeError> {
        match event {
            Event::StartElement(element) => {
                self.flush_start()?;
                self.pending_start = Some(start_tag(element));
            }
            Event::EndElement(name) => match self.pending_start.take() {
                Some(start) => self.write(XmlEvent::Empty(start))?,
                None => self.write(XmlEvent::End(BytesEnd::new(name.qname().into_owned())))?,
            },
            Event::Characters(characters) => self.write_characters(characters)?,
            Event::Comment(comment) => {
                self.flush_start()?;
                self.write(XmlEvent::Comment(BytesText::from_escaped(comment.as_str())))?;
            }
            Event::ProcessingInstruction(instruction) => {
                self.flush_start()?;

                let content = if instruction.content.is_empty() {
                    instruction.target.clone()
                } else {
                    format!("{} {}", instruction.target, instruction.content)
                };

                self.write(XmlEvent::PI(BytesPI::new(content)))?;
            }
            Event::EntityReference(reference) => {
                self.flush_start()?;
                self.write(XmlEvent::Text(BytesText::from_escaped(format!(
                    "&{};",
                    reference.name
                ))))?;
            }
            Event::DocumentType(document_type) => {
                tracing::warn!(
                    system_identifier = ?document_type.system_identifier,
                    "document type declaration not written"
                );
            }
        }

        Ok(())
    }

    /// Completes the output and returns the destination.
    pub fn finish(mut self) -> Result<W, DecodeError> {
        self.flush_start()?;

        Ok(self.writer.into_inner())
    }

    fn write_characters(&mut self, characters: &Characters) -> Result<(), DecodeError> {
        let text = characters.as_str();

        if self.policy.indent && text.chars().all(char::is_whitespace) {
            tracing::trace!(len = text.len(), "drop whitespace");
            return Ok(());
        }

        self.flush_start()?;

        if characters.is_cdata() && !text.contains(CDATA_END) {
            self.write(XmlEvent::CData(BytesCData::new(text)))
        } else {
            self.write(XmlEvent::Text(BytesText::from_escaped(partial_escape(text))))
        }
    }

    fn flush_start(&mut self) -> Result<(), DecodeError> {
        if let Some(start) = self.pending_start.take() {
            self.write(XmlEvent::Start(start))?;
        }

        Ok(())
    }

    fn write(&mut self, event: XmlEvent<'_>) -> Result<(), DecodeError> {
        self.writer
            .write_event(event)
            .map_err(DecodeError::serialize)
    }
}

fn start_tag(element: &Element) -> BytesStart<'static> {
    let mut start = BytesStart::new(element.name.qname().into_owned());

    for declaration in &element.namespaces {
        start.push_attribute((
            declaration.attribute_name().as_ref(),
            declaration.namespace_name.as_str(),
        ));
    }

    for attribute in &element.attributes {
        start.push_attribute((attribute.name.qname().as_ref(), attribute.value.as_str()));
    }

    start
}
