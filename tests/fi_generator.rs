#![allow(dead_code)]

use std::io::Write;

use flate2::{Compression, write::GzEncoder};
use rand::{
    Rng,
    seq::{IndexedRandom, SliceRandom},
};
use rand_xoshiro::{Xoshiro256PlusPlus, rand_core::SeedableRng};

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
const EXAMPLE_NAMESPACE: &str = "urn:example:ns";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name {
    pub prefix: String,
    pub namespace: String,
    pub local: String,
}

impl Name {
    pub fn local(local: &str) -> Self {
        Self {
            prefix: String::new(),
            namespace: String::new(),
            local: local.to_string(),
        }
    }

    pub fn prefixed(prefix: &str, namespace: &str, local: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            namespace: namespace.to_string(),
            local: local.to_string(),
        }
    }

    pub fn qname(&self) -> String {
        if self.prefix.is_empty() {
            self.local.clone()
        } else {
            format!("{}:{}", self.prefix, self.local)
        }
    }

    fn flags(&self) -> u8 {
        let mut flags = 0;
        if !self.prefix.is_empty() {
            flags |= 0x02;
        }
        if !self.namespace.is_empty() {
            flags |= 0x01;
        }
        flags
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    Element {
        name: Name,
        namespaces: Vec<(String, String)>,
        attributes: Vec<(Name, String)>,
        children: Vec<Node>,
    },
    Text(String),
    Comment(String),
}

impl Node {
    pub fn element(local: &str, children: Vec<Node>) -> Self {
        Self::Element {
            name: Name::local(local),
            namespaces: Vec::new(),
            attributes: Vec::new(),
            children,
        }
    }

    pub fn text(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// `<a><b>1</b></a>`
pub fn sample_document() -> Node {
    Node::element("a", vec![Node::element("b", vec![Node::text("1")])])
}

#[derive(Debug, Clone, Copy)]
enum Table {
    Prefix,
    NamespaceName,
    LocalName,
}

/// Minimal FastInfoset writer using literal strings on first use and table
/// indexes afterwards.
struct Encoder {
    output: Vec<u8>,
    mergeable_terminator: bool,
    prefixes: Vec<String>,
    namespace_names: Vec<String>,
    local_names: Vec<String>,
    element_names: Vec<Name>,
    attribute_names: Vec<Name>,
    attribute_values: Vec<String>,
    character_chunks: Vec<String>,
}

impl Encoder {
    fn new() -> Self {
        Self {
            output: Vec::new(),
            mergeable_terminator: false,
            prefixes: vec!["xml".to_string()],
            namespace_names: vec![XML_NAMESPACE.to_string()],
            local_names: Vec::new(),
            element_names: Vec::new(),
            attribute_names: Vec::new(),
            attribute_values: Vec::new(),
            character_chunks: Vec::new(),
        }
    }

    fn put(&mut self, octets: &[u8]) {
        self.output.extend_from_slice(octets);
        self.mergeable_terminator = false;
    }

    fn terminator(&mut self) {
        if self.mergeable_terminator {
            *self.output.last_mut().unwrap() = 0xFF;
            self.mergeable_terminator = false;
        } else {
            self.output.push(0xF0);
            self.mergeable_terminator = true;
        }
    }

    fn table(&mut self, table: Table) -> &mut Vec<String> {
        match table {
            Table::Prefix => &mut self.prefixes,
            Table::NamespaceName => &mut self.namespace_names,
            Table::LocalName => &mut self.local_names,
        }
    }

    fn identifying(&mut self, table: Table, value: &str) {
        let entries = self.table(table);

        if let Some(index) = entries.iter().position(|entry| entry == value) {
            self.put(&index_on_second_bit(index, 0x80));
        } else {
            entries.push(value.to_string());
            let mut octets = length_on_second_bit(value.len());
            octets.extend_from_slice(value.as_bytes());
            self.put(&octets);
        }
    }

    fn name_parts(&mut self, name: &Name) {
        if !name.prefix.is_empty() {
            self.identifying(Table::Prefix, &name.prefix);
        }
        if !name.namespace.is_empty() {
            self.identifying(Table::NamespaceName, &name.namespace);
        }
        self.identifying(Table::LocalName, &name.local);
    }

    fn element_name(&mut self, name: &Name, high: u8) {
        if let Some(index) = self.element_names.iter().position(|entry| entry == name) {
            self.put(&index_on_third_bit(index, high));
        } else {
            self.element_names.push(name.clone());
            self.put(&[high | 0x3C | name.flags()]);
            self.name_parts(name);
        }
    }

    fn attribute_name(&mut self, name: &Name) {
        if let Some(index) = self.attribute_names.iter().position(|entry| entry == name) {
            self.put(&index_on_second_bit(index, 0x00));
        } else {
            self.attribute_names.push(name.clone());
            self.put(&[0x78 | name.flags()]);
            self.name_parts(name);
        }
    }

    fn attribute_value(&mut self, value: &str) {
        if value.is_empty() {
            self.put(&[0xFF]);
        } else if let Some(index) = self.attribute_values.iter().position(|v| v == value) {
            self.put(&index_on_second_bit(index, 0x80));
        } else {
            self.attribute_values.push(value.to_string());
            let mut octets = length_on_fifth_bit(value.len(), 0x40);
            octets.extend_from_slice(value.as_bytes());
            self.put(&octets);
        }
    }

    fn character_chunk(&mut self, value: &str) {
        if let Some(index) = self.character_chunks.iter().position(|v| v == value) {
            self.put(&index_on_fourth_bit(index));
        } else {
            self.character_chunks.push(value.to_string());
            let mut octets = length_on_seventh_bit(value.len(), 0x90);
            octets.extend_from_slice(value.as_bytes());
            self.put(&octets);
        }
    }

    fn comment(&mut self, value: &str) {
        let mut octets = vec![0xE2];

        if value.is_empty() {
            octets.push(0xFF);
        } else {
            octets.extend(length_on_fifth_bit(value.len(), 0x00));
            octets.extend_from_slice(value.as_bytes());
        }

        self.put(&octets);
    }

    fn node(&mut self, node: &Node) {
        match node {
            Node::Element {
                name,
                namespaces,
                attributes,
                children,
            } => {
                let attribute_flag = if attributes.is_empty() { 0x00 } else { 0x40 };

                if namespaces.is_empty() {
                    self.element_name(name, attribute_flag);
                } else {
                    self.put(&[attribute_flag | 0x38]);

                    for (prefix, namespace) in namespaces {
                        if prefix.is_empty() {
                            self.put(&[0xCD]);
                        } else {
                            self.put(&[0xCF]);
                            self.identifying(Table::Prefix, prefix);
                        }
                        self.identifying(Table::NamespaceName, namespace);
                    }

                    self.put(&[0xF0]);
                    self.element_name(name, 0x00);
                }

                for (name, value) in attributes {
                    self.attribute_name(name);
                    self.attribute_value(value);
                }

                if !attributes.is_empty() {
                    self.terminator();
                }

                for child in children {
                    self.node(child);
                }

                self.terminator();
            }
            Node::Text(text) => self.character_chunk(text),
            Node::Comment(comment) => self.comment(comment),
        }
    }
}

fn index_on_second_bit(index: usize, high: u8) -> Vec<u8> {
    if index < 64 {
        vec![high | index as u8]
    } else if index < 8256 {
        let value = index - 64;
        vec![high | 0x40 | (value >> 8) as u8, value as u8]
    } else {
        let value = index - 8256;
        vec![
            high | 0x60 | (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        ]
    }
}

fn index_on_third_bit(index: usize, high: u8) -> Vec<u8> {
    if index < 32 {
        vec![high | index as u8]
    } else if index < 2080 {
        let value = index - 32;
        vec![high | 0x20 | (value >> 8) as u8, value as u8]
    } else {
        let value = index - 2080;
        vec![
            high | 0x28 | (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        ]
    }
}

fn index_on_fourth_bit(index: usize) -> Vec<u8> {
    if index < 16 {
        vec![0xA0 | index as u8]
    } else if index < 1040 {
        let value = index - 16;
        vec![0xB0 | (value >> 8) as u8, value as u8]
    } else {
        let value = index - 1040;
        vec![0xB8 | (value >> 16) as u8, (value >> 8) as u8, value as u8]
    }
}

fn length_on_second_bit(length: usize) -> Vec<u8> {
    if length <= 64 {
        vec![(length - 1) as u8]
    } else if length <= 320 {
        vec![0x40, (length - 65) as u8]
    } else {
        let mut octets = vec![0x60];
        octets.extend_from_slice(&((length - 321) as u32).to_be_bytes());
        octets
    }
}

fn length_on_fifth_bit(length: usize, high: u8) -> Vec<u8> {
    if length <= 8 {
        vec![high | (length - 1) as u8]
    } else if length <= 264 {
        vec![high | 0x08, (length - 9) as u8]
    } else {
        let mut octets = vec![high | 0x0C];
        octets.extend_from_slice(&((length - 265) as u32).to_be_bytes());
        octets
    }
}

fn length_on_seventh_bit(length: usize, high: u8) -> Vec<u8> {
    if length <= 2 {
        vec![high | (length - 1) as u8]
    } else if length <= 258 {
        vec![high | 0x02, (length - 3) as u8]
    } else {
        let mut octets = vec![high | 0x03];
        octets.extend_from_slice(&((length - 259) as u32).to_be_bytes());
        octets
    }
}

/// Encodes a document with `root` as its document element.
pub fn encode_document(root: &Node) -> Vec<u8> {
    let mut encoder = Encoder::new();

    encoder.put(&[0xE0, 0x00, 0x00, 0x01, 0x00]);
    encoder.node(root);
    encoder.terminator();

    encoder.output
}

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Returns the text expected from decoding `root` with the canonical policy.
///
/// Elements hold either a single text node or only elements and comments.
pub fn expected_xml(root: &Node) -> String {
    let mut output = String::new();
    write_node(root, 0, &mut output);
    output
}

fn write_node(node: &Node, depth: usize, output: &mut String) {
    match node {
        Node::Text(text) => output.push_str(&escape(text, false)),
        Node::Comment(comment) => {
            output.push_str("<!--");
            output.push_str(comment);
            output.push_str("-->");
        }
        Node::Element {
            name,
            namespaces,
            attributes,
            children,
        } => {
            output.push('<');
            output.push_str(&name.qname());

            for (prefix, namespace) in namespaces {
                if prefix.is_empty() {
                    output.push_str(&format!(" xmlns=\"{}\"", escape(namespace, true)));
                } else {
                    output.push_str(&format!(" xmlns:{}=\"{}\"", prefix, escape(namespace, true)));
                }
            }

            for (name, value) in attributes {
                output.push_str(&format!(" {}=\"{}\"", name.qname(), escape(value, true)));
            }

            if children.is_empty() {
                output.push_str("/>");
                return;
            }

            output.push('>');

            let is_block = children.iter().any(|child| !matches!(child, Node::Text(..)));

            for child in children {
                if is_block {
                    output.push('\n');
                    output.push_str(&"  ".repeat(depth + 1));
                }
                write_node(child, depth + 1, output);
            }

            if is_block {
                output.push('\n');
                output.push_str(&"  ".repeat(depth));
            }

            output.push_str("</");
            output.push_str(&name.qname());
            output.push('>');
        }
    }
}

fn escape(text: &str, quotes: bool) -> String {
    let mut output = String::new();

    for c in text.chars() {
        match c {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' if quotes => output.push_str("&quot;"),
            '\'' if quotes => output.push_str("&apos;"),
            _ => output.push(c),
        }
    }

    output
}

const LOCAL_NAMES: &[&str] = &["item", "value", "entry", "name", "data", "x"];
const ATTRIBUTE_NAMES: &[&str] = &["id", "type", "lang"];
const COMMON_VALUES: &[&str] = &["1", "true", "hello"];
const TEXT_CHARS: &[char] = &[
    'a', 'b', 'c', 'x', 'y', 'z', '0', '1', '9', ' ', '&', '<', '>', '"', '\'', 'é', '€',
];

/// Builds a document from a seed.
pub fn random_document(seed: u64) -> Node {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    random_element(&mut rng, 0)
}

fn random_element(rng: &mut Xoshiro256PlusPlus, depth: usize) -> Node {
    let local = LOCAL_NAMES.choose(rng).unwrap();
    let name = if depth > 0 && rng.random_bool(0.2) {
        Name::prefixed("ns", EXAMPLE_NAMESPACE, local)
    } else {
        Name::local(local)
    };

    let namespaces = if depth == 0 {
        vec![("ns".to_string(), EXAMPLE_NAMESPACE.to_string())]
    } else {
        Vec::new()
    };

    let mut attribute_names = ATTRIBUTE_NAMES.to_vec();
    attribute_names.shuffle(rng);
    let attribute_count = rng.random_range(0..=attribute_names.len());
    let attributes = attribute_names[..attribute_count]
        .iter()
        .map(|name| {
            let value = if rng.random_bool(0.1) {
                String::new()
            } else {
                random_text(rng)
            };
            (Name::local(name), value)
        })
        .collect();

    let children = if depth < 3 && rng.random_bool(0.6) {
        (0..rng.random_range(1..5))
            .map(|_| {
                if rng.random_bool(0.1) {
                    Node::Comment("note".to_string())
                } else {
                    random_element(rng, depth + 1)
                }
            })
            .collect()
    } else if rng.random_bool(0.7) {
        vec![Node::Text(random_text(rng))]
    } else {
        Vec::new()
    };

    Node::Element {
        name,
        namespaces,
        attributes,
        children,
    }
}

fn random_text(rng: &mut Xoshiro256PlusPlus) -> String {
    if rng.random_bool(0.3) {
        return COMMON_VALUES.choose(rng).unwrap().to_string();
    }

    let mut text = String::from("t");

    for _ in 0..rng.random_range(0..20) {
        text.push(*TEXT_CHARS.choose(rng).unwrap());
    }

    text
}
