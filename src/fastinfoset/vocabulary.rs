//! Vocabulary tables shared by the encoder and decoder of a document.
use super::event::QualifiedName;

pub const XML_PREFIX: &str = "xml";
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Table index of the first application-defined restricted alphabet.
pub const RESTRICTED_ALPHABET_APPLICATION_START: usize = 15;
/// Table index of the first application-defined encoding algorithm.
pub const ENCODING_ALGORITHM_APPLICATION_START: usize = 31;

/// Tables holding identifying strings, which are added on every literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifyingTable {
    Prefix,
    NamespaceName,
    LocalName,
    OtherNcName,
    OtherUri,
}

/// Tables holding character strings, which are added only when flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterTable {
    AttributeValue,
    CharacterChunk,
    OtherString,
}

/// Dynamic vocabulary of one document.
///
/// Indexes are zero-based. The prefix and namespace name tables start with
/// the built-in `xml` binding.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub restricted_alphabets: Vec<Vec<char>>,
    pub encoding_algorithms: Vec<String>,
    pub prefixes: Vec<String>,
    pub namespace_names: Vec<String>,
    pub local_names: Vec<String>,
    pub other_ncnames: Vec<String>,
    pub other_uris: Vec<String>,
    pub attribute_values: Vec<String>,
    pub character_chunks: Vec<String>,
    pub other_strings: Vec<String>,
    pub element_names: Vec<QualifiedName>,
    pub attribute_names: Vec<QualifiedName>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self {
            restricted_alphabets: Vec::new(),
            encoding_algorithms: Vec::new(),
            prefixes: vec![XML_PREFIX.to_string()],
            namespace_names: vec![XML_NAMESPACE.to_string()],
            local_names: Vec::new(),
            other_ncnames: Vec::new(),
            other_uris: Vec::new(),
            attribute_values: Vec::new(),
            character_chunks: Vec::new(),
            other_strings: Vec::new(),
            element_names: Vec::new(),
            attribute_names: Vec::new(),
        }
    }

    pub fn identifying(&self, table: IdentifyingTable) -> &Vec<String> {
        match table {
            IdentifyingTable::Prefix => &self.prefixes,
            IdentifyingTable::NamespaceName => &self.namespace_names,
            IdentifyingTable::LocalName => &self.local_names,
            IdentifyingTable::OtherNcName => &self.other_ncnames,
            IdentifyingTable::OtherUri => &self.other_uris,
        }
    }

    pub fn identifying_mut(&mut self, table: IdentifyingTable) -> &mut Vec<String> {
        match table {
            IdentifyingTable::Prefix => &mut self.prefixes,
            IdentifyingTable::NamespaceName => &mut self.namespace_names,
            IdentifyingTable::LocalName => &mut self.local_names,
            IdentifyingTable::OtherNcName => &mut self.other_ncnames,
            IdentifyingTable::OtherUri => &mut self.other_uris,
        }
    }

    pub fn characters(&self, table: CharacterTable) -> &Vec<String> {
        match table {
            CharacterTable::AttributeValue => &self.attribute_values,
            CharacterTable::CharacterChunk => &self.character_chunks,
            CharacterTable::OtherString => &self.other_strings,
        }
    }

    pub fn characters_mut(&mut self, table: CharacterTable) -> &mut Vec<String> {
        match table {
            CharacterTable::AttributeValue => &mut self.attribute_values,
            CharacterTable::CharacterChunk => &mut self.character_chunks,
            CharacterTable::OtherString => &mut self.other_strings,
        }
    }

    pub fn names(&self, is_attribute: bool) -> &Vec<QualifiedName> {
        if is_attribute {
            &self.attribute_names
        } else {
            &self.element_names
        }
    }

    pub fn names_mut(&mut self, is_attribute: bool) -> &mut Vec<QualifiedName> {
        if is_attribute {
            &mut self.attribute_names
        } else {
            &mut self.element_names
        }
    }

    /// Returns the alphabet at a restricted alphabet table index.
    pub fn restricted_alphabet(&self, index: usize) -> Option<&[char]> {
        match index {
            0 => Some(&super::string::NUMERIC_ALPHABET),
            1 => Some(&super::string::DATE_TIME_ALPHABET),
            _ if index >= RESTRICTED_ALPHABET_APPLICATION_START => self
                .restricted_alphabets
                .get(index - RESTRICTED_ALPHABET_APPLICATION_START)
                .map(|alphabet| alphabet.as_slice()),
            _ => None,
        }
    }

    /// Returns the URI of an application-defined encoding algorithm.
    pub fn encoding_algorithm_uri(&self, index: usize) -> Option<&str> {
        index
            .checked_sub(ENCODING_ALGORITHM_APPLICATION_START)
            .and_then(|index| self.encoding_algorithms.get(index))
            .map(|uri| uri.as_str())
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}
