//! Pull decoder for FastInfoset documents.
use crate::error::{FiError, FiErrorKind};

use super::{
    event::{
        Attribute, Characters, DocumentProperties, DocumentType, Element, EntityReference, Event,
        NamespaceDeclaration, Notation, ProcessingInstruction, QualifiedName, UnparsedEntity,
    },
    octets::OctetReader,
    string::{self, EncodingAlgorithm},
    vocabulary::{CharacterTable, IdentifyingTable, Vocabulary},
};

const IDENTIFICATION: [u8; 2] = [0xE0, 0x00];
const VERSION: [u8; 2] = [0x00, 0x01];
const XML_DECLARATION_START: &[u8] = b"<?xml";
const XML_DECLARATION_END: &[u8] = b"?>";

const TERMINATOR_SINGLE: u8 = 0xF0;
const TERMINATOR_DOUBLE: u8 = 0xFF;
const PROCESSING_INSTRUCTION: u8 = 0xE1;
const COMMENT: u8 = 0xE2;

#[derive(Debug, Clone, Copy)]
enum StringEncoding {
    Utf8,
    Utf16,
    RestrictedAlphabet(usize),
    EncodingAlgorithm(usize),
}

/// Decodes a FastInfoset document into a stream of [`Event`]s.
///
/// The header and its optional components are read by [`Decoder::new`].
/// Elements are then read one item per call to [`Decoder::next_event`],
/// keeping the open elements on a stack instead of recursing.
#[derive(Debug)]
pub struct Decoder<'a> {
    reader: OctetReader<'a>,
    vocabulary: Vocabulary,
    properties: DocumentProperties,
    open_elements: Vec<QualifiedName>,
    pending_terminators: usize,
    finished: bool,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self, FiError> {
        let mut decoder = Self {
            reader: OctetReader::new(data),
            vocabulary: Vocabulary::new(),
            properties: DocumentProperties::default(),
            open_elements: Vec::new(),
            pending_terminators: 0,
            finished: false,
        };

        decoder.read_header()?;

        Ok(decoder)
    }

    pub fn properties(&self) -> &DocumentProperties {
        &self.properties
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Number of octets consumed so far.
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    /// Number of elements currently open.
    pub fn depth(&self) -> usize {
        self.open_elements.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns the next item of the document, or `None` once the document
    /// terminator has been read.
    ///
    /// After an error, the decoder is finished.
    pub fn next_event(&mut self) -> Result<Option<Event>, FiError> {
        if self.finished {
            return Ok(None);
        }

        match self.next_event_impl() {
            Ok(event) => Ok(event),
            Err(error) => {
                self.finished = true;
                Err(error)
            }
        }
    }

    fn next_event_impl(&mut self) -> Result<Option<Event>, FiError> {
        loop {
            if self.pending_terminators > 0 {
                self.pending_terminators -= 1;

                match self.open_elements.pop() {
                    Some(name) => {
                        tracing::trace!(%name, depth = self.open_elements.len(), "end element");
                        return Ok(Some(Event::EndElement(name)));
                    }
                    None => {
                        self.finish();
                        return Ok(None);
                    }
                }
            }

            if self.reader.is_empty() {
                return Err(self
                    .reader
                    .error(FiErrorKind::IncompleteInput)
                    .with_snippet(format!("{} elements open", self.open_elements.len())));
            }

            let b = self.reader.read_u8()?;

            let event = if self.open_elements.is_empty() {
                self.read_document_child(b)?
            } else {
                self.read_element_child(b)?
            };

            if event.is_some() {
                return Ok(event);
            }
        }
    }

    fn finish(&mut self) {
        self.finished = true;

        let trailing = self.reader.remaining().len();

        if trailing > 0 {
            tracing::warn!(
                position = self.reader.position(),
                trailing,
                "trailing data after document"
            );
        }

        tracing::debug!(position = self.reader.position(), "document finished");
    }

    fn read_header(&mut self) -> Result<(), FiError> {
        if self.reader.remaining().starts_with(XML_DECLARATION_START) {
            let end = self
                .reader
                .remaining()
                .windows(XML_DECLARATION_END.len())
                .position(|window| window == XML_DECLARATION_END)
                .ok_or_else(|| {
                    self.reader
                        .error(FiErrorKind::NotFastInfoset)
                        .with_snippet("unterminated XML declaration")
                })?;
            self.reader.take(end + XML_DECLARATION_END.len())?;
        }

        if !self.reader.skip_prefix(&IDENTIFICATION) {
            return Err(self.reader.error(FiErrorKind::NotFastInfoset));
        }

        if !self.reader.skip_prefix(&VERSION) {
            if self.reader.remaining().len() < VERSION.len() {
                return Err(self.reader.error(FiErrorKind::IncompleteInput));
            }
            return Err(self.reader.error(FiErrorKind::UnsupportedVersion).with_snippet(
                format!("{:02x?}", &self.reader.remaining()[..VERSION.len()]),
            ));
        }

        let b = self.reader.read_u8()?;

        if b & 0x80 != 0 {
            return Err(self.reader.unexpected(b));
        }

        if b & 0x40 != 0 {
            self.read_additional_data()?;
        }
        if b & 0x20 != 0 {
            self.read_initial_vocabulary()?;
        }
        if b & 0x10 != 0 {
            self.read_notations()?;
        }
        if b & 0x08 != 0 {
            self.read_unparsed_entities()?;
        }
        if b & 0x04 != 0 {
            let octets = self.reader.read_octets_on_second_bit()?;
            self.properties.character_encoding_scheme = Some(string::decode_utf8(octets)?);
        }
        if b & 0x02 != 0 {
            self.properties.standalone = match self.reader.read_u8()? {
                0x00 => Some(false),
                0x01 => Some(true),
                other => return Err(self.reader.unexpected(other)),
            };
        }
        if b & 0x01 != 0 {
            let version = self.read_non_identifying_string(CharacterTable::OtherString)?;
            self.properties.version = Some(version.into_string());
        }

        tracing::debug!(
            position = self.reader.position(),
            optional_components = format_args!("{:#04x}", b),
            "read document header"
        );

        Ok(())
    }

    fn read_additional_data(&mut self) -> Result<(), FiError> {
        let count = self.reader.read_sequence_length()?;

        for _ in 0..count {
            let id = self.reader.read_octets_on_second_bit()?;
            let data = self.reader.read_octets_on_second_bit()?;
            tracing::trace!(id = %String::from_utf8_lossy(id), len = data.len(), "skip additional data");
        }

        Ok(())
    }

    fn read_initial_vocabulary(&mut self) -> Result<(), FiError> {
        let flags1 = self.reader.read_u8()?;
        let flags2 = self.reader.read_u8()?;

        if flags1 & 0xE0 != 0 {
            return Err(self.reader.unexpected(flags1));
        }

        if flags1 & 0x10 != 0 {
            let uri = self.reader.read_octets_on_second_bit()?;
            return Err(self
                .reader
                .error(FiErrorKind::UnsupportedExternalVocabulary)
                .with_snippet(String::from_utf8_lossy(uri)));
        }

        if flags1 & 0x08 != 0 {
            for _ in 0..self.reader.read_sequence_length()? {
                let octets = self.reader.read_octets_on_second_bit()?;
                let alphabet = string::decode_utf8(octets)?.chars().collect();
                self.vocabulary.restricted_alphabets.push(alphabet);
            }
        }
        if flags1 & 0x04 != 0 {
            for _ in 0..self.reader.read_sequence_length()? {
                let octets = self.reader.read_octets_on_second_bit()?;
                let uri = string::decode_utf8(octets)?;
                self.vocabulary.encoding_algorithms.push(uri);
            }
        }

        let string_tables = [
            (flags1 & 0x02, IdentifyingTable::Prefix),
            (flags1 & 0x01, IdentifyingTable::NamespaceName),
            (flags2 & 0x80, IdentifyingTable::LocalName),
            (flags2 & 0x40, IdentifyingTable::OtherNcName),
            (flags2 & 0x20, IdentifyingTable::OtherUri),
        ];

        for (present, table) in string_tables {
            if present == 0 {
                continue;
            }

            for _ in 0..self.reader.read_sequence_length()? {
                let octets = self.reader.read_octets_on_second_bit()?;
                let value = string::decode_utf8(octets)?;
                self.vocabulary.identifying_mut(table).push(value);
            }
        }

        let character_tables = [
            (flags2 & 0x10, CharacterTable::AttributeValue),
            (flags2 & 0x08, CharacterTable::CharacterChunk),
            (flags2 & 0x04, CharacterTable::OtherString),
        ];

        for (present, table) in character_tables {
            if present == 0 {
                continue;
            }

            for _ in 0..self.reader.read_sequence_length()? {
                let b = self.reader.read_u8()?;

                if b & 0xC0 != 0 {
                    return Err(self.reader.unexpected(b));
                }

                let value = self.read_characters_on_third_bit(b)?;
                self.vocabulary
                    .characters_mut(table)
                    .push(value.into_string());
            }
        }

        for (present, is_attribute) in [(flags2 & 0x02, false), (flags2 & 0x01, true)] {
            if present == 0 {
                continue;
            }

            for _ in 0..self.reader.read_sequence_length()? {
                let name = self.read_name_surrogate()?;
                self.vocabulary.names_mut(is_attribute).push(name);
            }
        }

        tracing::debug!(
            local_names = self.vocabulary.local_names.len(),
            element_names = self.vocabulary.element_names.len(),
            attribute_names = self.vocabulary.attribute_names.len(),
            "read initial vocabulary"
        );

        Ok(())
    }

    fn read_name_surrogate(&mut self) -> Result<QualifiedName, FiError> {
        let b = self.reader.read_u8()?;

        if b & 0xFC != 0 {
            return Err(self.reader.unexpected(b));
        }

        let mut name = QualifiedName::default();

        if b & 0x02 != 0 {
            let index = self.read_padded_index()?;
            name.prefix = self.lookup(&self.vocabulary.prefixes, index)?;
        }
        if b & 0x01 != 0 {
            let index = self.read_padded_index()?;
            name.namespace_name = self.lookup(&self.vocabulary.namespace_names, index)?;
        }

        let index = self.read_padded_index()?;
        name.local_name = self.lookup(&self.vocabulary.local_names, index)?;

        Ok(name)
    }

    fn read_padded_index(&mut self) -> Result<usize, FiError> {
        let b = self.reader.read_u8()?;

        if b & 0x80 != 0 {
            return Err(self.reader.unexpected(b));
        }

        self.reader.index_on_second_bit(b)
    }

    fn read_notations(&mut self) -> Result<(), FiError> {
        loop {
            let b = self.reader.read_u8()?;

            if b == TERMINATOR_SINGLE {
                break;
            }
            if b & 0xFC != 0xC0 {
                return Err(self.reader.unexpected(b));
            }

            let name = self.read_identifying_string(IdentifyingTable::OtherNcName)?;
            let system_identifier = self.read_optional_uri(b & 0x02 != 0)?;
            let public_identifier = self.read_optional_uri(b & 0x01 != 0)?;

            self.properties.notations.push(Notation {
                name,
                system_identifier,
                public_identifier,
            });
        }

        Ok(())
    }

    fn read_unparsed_entities(&mut self) -> Result<(), FiError> {
        loop {
            let b = self.reader.read_u8()?;

            if b == TERMINATOR_SINGLE {
                break;
            }
            if b & 0xFE != 0xD0 {
                return Err(self.reader.unexpected(b));
            }

            let name = self.read_identifying_string(IdentifyingTable::OtherNcName)?;
            let system_identifier = self.read_identifying_string(IdentifyingTable::OtherUri)?;
            let public_identifier = self.read_optional_uri(b & 0x01 != 0)?;
            let notation_name = self.read_identifying_string(IdentifyingTable::OtherNcName)?;

            self.properties.unparsed_entities.push(UnparsedEntity {
                name,
                system_identifier,
                public_identifier,
                notation_name,
            });
        }

        Ok(())
    }

    fn read_optional_uri(&mut self, present: bool) -> Result<Option<String>, FiError> {
        if present {
            Ok(Some(self.read_identifying_string(IdentifyingTable::OtherUri)?))
        } else {
            Ok(None)
        }
    }

    fn read_document_child(&mut self, b: u8) -> Result<Option<Event>, FiError> {
        match b {
            0x00..=0x7F => Ok(Some(self.read_element(b)?)),
            PROCESSING_INSTRUCTION => Ok(Some(self.read_processing_instruction()?)),
            COMMENT => Ok(Some(self.read_comment()?)),
            0xC4..=0xC7 => Ok(Some(self.read_document_type(b)?)),
            TERMINATOR_SINGLE | TERMINATOR_DOUBLE => {
                self.pending_terminators += 1;
                Ok(None)
            }
            _ => Err(self.reader.unexpected(b)),
        }
    }

    fn read_element_child(&mut self, b: u8) -> Result<Option<Event>, FiError> {
        match b {
            0x00..=0x7F => Ok(Some(self.read_element(b)?)),
            0x80..=0xBF => Ok(Some(Event::Characters(self.read_character_chunk(b)?))),
            0xC8..=0xCB => Ok(Some(self.read_entity_reference(b)?)),
            PROCESSING_INSTRUCTION => Ok(Some(self.read_processing_instruction()?)),
            COMMENT => Ok(Some(self.read_comment()?)),
            TERMINATOR_SINGLE => {
                self.pending_terminators += 1;
                Ok(None)
            }
            TERMINATOR_DOUBLE => {
                self.pending_terminators += 2;
                Ok(None)
            }
            _ => Err(self.reader.unexpected(b)),
        }
    }

    fn read_element(&mut self, b: u8) -> Result<Event, FiError> {
        let has_attributes = b & 0x40 != 0;
        let mut namespaces = Vec::new();
        let mut name_octet = b;

        if b & 0x3F == 0x38 {
            loop {
                let n = self.reader.read_u8()?;

                if n == TERMINATOR_SINGLE {
                    break;
                }
                if n & 0xFC != 0xCC {
                    return Err(self.reader.unexpected(n));
                }

                let mut declaration = NamespaceDeclaration::default();

                if n & 0x02 != 0 {
                    declaration.prefix = self.read_identifying_string(IdentifyingTable::Prefix)?;
                }
                if n & 0x01 != 0 {
                    declaration.namespace_name =
                        self.read_identifying_string(IdentifyingTable::NamespaceName)?;
                }

                namespaces.push(declaration);
            }

            name_octet = self.reader.read_u8()?;

            if name_octet & 0xC0 != 0 {
                return Err(self.reader.unexpected(name_octet));
            }
        }

        let name = if name_octet & 0x3C == 0x3C {
            self.read_literal_name(name_octet & 0x03, false)?
        } else {
            let index = self.reader.index_on_third_bit(name_octet)?;
            self.lookup(&self.vocabulary.element_names, index)?
        };

        let mut attributes = Vec::new();
        let mut is_empty = false;

        if has_attributes {
            loop {
                let a = self.reader.read_u8()?;

                match a {
                    TERMINATOR_SINGLE => break,
                    TERMINATOR_DOUBLE => {
                        is_empty = true;
                        break;
                    }
                    _ if a & 0x80 == 0 => {
                        let name = if a & 0x7C == 0x78 {
                            self.read_literal_name(a & 0x03, true)?
                        } else {
                            let index = self.reader.index_on_second_bit(a)?;
                            self.lookup(&self.vocabulary.attribute_names, index)?
                        };
                        let value = self
                            .read_non_identifying_string(CharacterTable::AttributeValue)?
                            .into_string();

                        attributes.push(Attribute { name, value });
                    }
                    _ => return Err(self.reader.unexpected(a)),
                }
            }
        }

        tracing::trace!(
            %name,
            depth = self.open_elements.len(),
            namespaces = namespaces.len(),
            attributes = attributes.len(),
            "start element"
        );

        self.open_elements.push(name.clone());

        if is_empty {
            self.pending_terminators += 1;
        }

        Ok(Event::StartElement(Element {
            name,
            namespaces,
            attributes,
        }))
    }

    fn read_literal_name(&mut self, flags: u8, is_attribute: bool) -> Result<QualifiedName, FiError> {
        let mut name = QualifiedName::default();

        if flags & 0x02 != 0 {
            name.prefix = self.read_identifying_string(IdentifyingTable::Prefix)?;
        }
        if flags & 0x01 != 0 {
            name.namespace_name = self.read_identifying_string(IdentifyingTable::NamespaceName)?;
        }

        name.local_name = self.read_identifying_string(IdentifyingTable::LocalName)?;

        self.vocabulary.names_mut(is_attribute).push(name.clone());

        Ok(name)
    }

    fn read_processing_instruction(&mut self) -> Result<Event, FiError> {
        let target = self.read_identifying_string(IdentifyingTable::OtherNcName)?;
        let content = self
            .read_non_identifying_string(CharacterTable::OtherString)?
            .into_string();

        Ok(Event::ProcessingInstruction(ProcessingInstruction {
            target,
            content,
        }))
    }

    fn read_comment(&mut self) -> Result<Event, FiError> {
        let comment = self.read_non_identifying_string(CharacterTable::OtherString)?;

        Ok(Event::Comment(comment.into_string()))
    }

    fn read_entity_reference(&mut self, b: u8) -> Result<Event, FiError> {
        let name = self.read_identifying_string(IdentifyingTable::OtherNcName)?;
        let system_identifier = self.read_optional_uri(b & 0x02 != 0)?;
        let public_identifier = self.read_optional_uri(b & 0x01 != 0)?;

        Ok(Event::EntityReference(EntityReference {
            name,
            system_identifier,
            public_identifier,
        }))
    }

    fn read_document_type(&mut self, b: u8) -> Result<Event, FiError> {
        let system_identifier = self.read_optional_uri(b & 0x02 != 0)?;
        let public_identifier = self.read_optional_uri(b & 0x01 != 0)?;
        let mut instructions = Vec::new();

        loop {
            let n = self.reader.read_u8()?;

            match n {
                PROCESSING_INSTRUCTION => {
                    if let Event::ProcessingInstruction(instruction) =
                        self.read_processing_instruction()?
                    {
                        instructions.push(instruction);
                    }
                }
                TERMINATOR_SINGLE => break,
                TERMINATOR_DOUBLE => {
                    self.pending_terminators += 1;
                    break;
                }
                _ => return Err(self.reader.unexpected(n)),
            }
        }

        Ok(Event::DocumentType(DocumentType {
            system_identifier,
            public_identifier,
            instructions,
        }))
    }

    fn read_identifying_string(&mut self, table: IdentifyingTable) -> Result<String, FiError> {
        let b = self.reader.read_u8()?;

        if b & 0x80 == 0 {
            let length = self.reader.length_on_second_bit(b)?;
            let position = self.reader.position();
            let octets = self.reader.take(length)?;
            let value = string::decode_utf8(octets).map_err(|error| error.with_position(position as u64))?;

            self.vocabulary.identifying_mut(table).push(value.clone());

            Ok(value)
        } else {
            let index = self.reader.index_on_second_bit(b)?;
            self.lookup(self.vocabulary.identifying(table), index)
        }
    }

    fn read_non_identifying_string(&mut self, table: CharacterTable) -> Result<Characters, FiError> {
        let b = self.reader.read_u8()?;

        if b == TERMINATOR_DOUBLE {
            return Ok(Characters::default());
        }

        if b & 0x80 != 0 {
            let index = self.reader.index_on_second_bit(b)?;
            return Ok(Characters::Text(
                self.lookup(self.vocabulary.characters(table), index)?,
            ));
        }

        let value = self.read_characters_on_third_bit(b)?;

        if b & 0x40 != 0 {
            self.vocabulary
                .characters_mut(table)
                .push(value.as_str().to_string());
        }

        Ok(value)
    }

    fn read_characters_on_third_bit(&mut self, b: u8) -> Result<Characters, FiError> {
        let (encoding, length) = match (b & 0x30) >> 4 {
            0 => (StringEncoding::Utf8, self.reader.length_on_fifth_bit(b)?),
            1 => (StringEncoding::Utf16, self.reader.length_on_fifth_bit(b)?),
            discriminant => {
                let next = self.reader.read_u8()?;
                let identifier = (((b & 0x0F) << 4) | (next >> 4)) as usize;
                let length = self.reader.length_on_fifth_bit(next)?;
                (Self::indexed_encoding(discriminant, identifier), length)
            }
        };

        self.read_encoded_characters(encoding, length)
    }

    fn read_character_chunk(&mut self, b: u8) -> Result<Characters, FiError> {
        if b & 0x20 != 0 {
            let index = self.reader.index_on_fourth_bit(b)?;
            return Ok(Characters::Text(
                self.lookup(&self.vocabulary.character_chunks, index)?,
            ));
        }

        let (encoding, length) = match (b & 0x0C) >> 2 {
            0 => (StringEncoding::Utf8, self.reader.length_on_seventh_bit(b)?),
            1 => (StringEncoding::Utf16, self.reader.length_on_seventh_bit(b)?),
            discriminant => {
                let next = self.reader.read_u8()?;
                let identifier = (((b & 0x03) << 6) | (next >> 2)) as usize;
                let length = self.reader.length_on_seventh_bit(next)?;
                (Self::indexed_encoding(discriminant, identifier), length)
            }
        };

        let value = self.read_encoded_characters(encoding, length)?;

        if b & 0x10 != 0 {
            self.vocabulary
                .character_chunks
                .push(value.as_str().to_string());
        }

        Ok(value)
    }

    fn indexed_encoding(discriminant: u8, identifier: usize) -> StringEncoding {
        if discriminant == 2 {
            StringEncoding::RestrictedAlphabet(identifier)
        } else {
            StringEncoding::EncodingAlgorithm(identifier)
        }
    }

    fn read_encoded_characters(
        &mut self,
        encoding: StringEncoding,
        length: usize,
    ) -> Result<Characters, FiError> {
        let position = self.reader.position();
        let octets = self.reader.take(length)?;

        let result = match encoding {
            StringEncoding::Utf8 => string::decode_utf8(octets).map(Characters::Text),
            StringEncoding::Utf16 => string::decode_utf16(octets).map(Characters::Text),
            StringEncoding::RestrictedAlphabet(index) => {
                match self.vocabulary.restricted_alphabet(index) {
                    Some(alphabet) => {
                        string::decode_restricted_alphabet(octets, alphabet).map(Characters::Text)
                    }
                    None => Err(FiError::new(FiErrorKind::IndexOutOfRange)
                        .with_snippet(format!("restricted alphabet {}", index))),
                }
            }
            StringEncoding::EncodingAlgorithm(index) => match EncodingAlgorithm::from_index(index) {
                Some(algorithm) => algorithm.decode(octets),
                None => {
                    let snippet = match self.vocabulary.encoding_algorithm_uri(index) {
                        Some(uri) => uri.to_string(),
                        None => format!("encoding algorithm {}", index),
                    };
                    Err(FiError::new(FiErrorKind::UnsupportedEncodingAlgorithm)
                        .with_snippet(snippet))
                }
            },
        };

        result.map_err(|error| error.with_position(position as u64))
    }

    fn lookup<T: Clone>(&self, table: &[T], index: usize) -> Result<T, FiError> {
        table.get(index).cloned().ok_or_else(|| {
            self.reader
                .error(FiErrorKind::IndexOutOfRange)
                .with_snippet(format!("index {} of {}", index, table.len()))
        })
    }
}

impl Iterator for Decoder<'_> {
    type Item = Result<Event, FiError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}
