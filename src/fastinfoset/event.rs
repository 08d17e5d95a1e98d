//! Infoset items produced by the decoder.
use std::{borrow::Cow, fmt::Display};

/// Element or attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct QualifiedName {
    pub prefix: String,
    pub namespace_name: String,
    pub local_name: String,
}

impl QualifiedName {
    pub fn new<S: Into<String>>(local_name: S) -> Self {
        Self {
            local_name: local_name.into(),
            ..Default::default()
        }
    }

    pub fn with_namespace<S1: Into<String>, S2: Into<String>>(
        mut self,
        prefix: S1,
        namespace_name: S2,
    ) -> Self {
        self.prefix = prefix.into();
        self.namespace_name = namespace_name.into();
        self
    }

    /// Returns the name as written in XML (`prefix:local` or `local`).
    pub fn qname(&self) -> Cow<'_, str> {
        if self.prefix.is_empty() {
            Cow::Borrowed(&self.local_name)
        } else {
            Cow::Owned(format!("{}:{}", self.prefix, self.local_name))
        }
    }
}

impl Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.qname())
    }
}

/// Namespace attribute (`xmlns` or `xmlns:prefix`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NamespaceDeclaration {
    pub prefix: String,
    pub namespace_name: String,
}

impl NamespaceDeclaration {
    pub fn attribute_name(&self) -> Cow<'_, str> {
        if self.prefix.is_empty() {
            Cow::Borrowed("xmlns")
        } else {
            Cow::Owned(format!("xmlns:{}", self.prefix))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub name: QualifiedName,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: QualifiedName,
    pub namespaces: Vec<NamespaceDeclaration>,
    pub attributes: Vec<Attribute>,
}

/// Decoded character data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Characters {
    Text(String),
    /// Text that was encoded with the CDATA encoding algorithm.
    CData(String),
}

impl Characters {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::CData(text) => text,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::CData(text) => text,
        }
    }

    pub fn is_cdata(&self) -> bool {
        matches!(self, Self::CData(..))
    }
}

impl Default for Characters {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ProcessingInstruction {
    pub target: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct EntityReference {
    pub name: String,
    pub system_identifier: Option<String>,
    pub public_identifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentType {
    pub system_identifier: Option<String>,
    pub public_identifier: Option<String>,
    pub instructions: Vec<ProcessingInstruction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Notation {
    pub name: String,
    pub system_identifier: Option<String>,
    pub public_identifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct UnparsedEntity {
    pub name: String,
    pub system_identifier: String,
    pub public_identifier: Option<String>,
    pub notation_name: String,
}

/// Properties from the document header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentProperties {
    pub character_encoding_scheme: Option<String>,
    pub standalone: Option<bool>,
    pub version: Option<String>,
    pub notations: Vec<Notation>,
    pub unparsed_entities: Vec<UnparsedEntity>,
}

/// Item of the document in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    StartElement(Element),
    EndElement(QualifiedName),
    Characters(Characters),
    Comment(String),
    ProcessingInstruction(ProcessingInstruction),
    EntityReference(EntityReference),
    DocumentType(DocumentType),
}

impl Event {
    pub fn is_start_element(&self) -> bool {
        matches!(self, Self::StartElement(..))
    }

    pub fn as_start_element(&self) -> Option<&Element> {
        if let Self::StartElement(v) = self {
            Some(v)
        } else {
            None
        }
    }

    pub fn is_end_element(&self) -> bool {
        matches!(self, Self::EndElement(..))
    }

    pub fn as_characters(&self) -> Option<&Characters> {
        if let Self::Characters(v) = self {
            Some(v)
        } else {
            None
        }
    }
}
