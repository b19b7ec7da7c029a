//! Conversion of an XML payload into a generic element tree.
//!
//! The tree mirrors what a generic XML-to-JSON mapping produces: element
//! attributes and children become object keys, repeated sibling elements
//! collapse into arrays, and text-only elements become scalars. The crucial
//! consequence is that a field holding exactly one element is an object
//! while the same field holding two is an array. [`OneOrMany`] resolves that
//! ambiguity in a single place so downstream code never inspects the shape
//! twice.

use crate::error::XmlReadError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::mem::take;

/// A node of the generic element tree.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlValue {
    Text(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
    Object(BTreeMap<String, XmlValue>),
    Array(Vec<XmlValue>),
}

impl XmlValue {
    /// The child with the given key, if this node is an object.
    pub fn get(&self, key: &str) -> Option<&XmlValue> {
        if let Self::Object(children) = self {
            children.get(key)
        } else {
            None
        }
    }

    /// Resolves the singleton/collection ambiguity of this node.
    ///
    /// An array is viewed as its elements, anything else as a sequence of
    /// exactly one node.
    pub fn as_sequence(&self) -> OneOrMany<'_> {
        if let Self::Array(items) = self {
            OneOrMany::Many(items)
        } else {
            OneOrMany::One(self)
        }
    }

    /// The textual rendering of this node if it is a scalar.
    ///
    /// Numbers and booleans render back to their lexical form: a count
    /// parsed into an integer during tree building still decodes as the
    /// digits the endpoint sent.
    pub fn lexical(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Text(text) => Some(Cow::Borrowed(text)),
            Self::Integer(value) => Some(Cow::Owned(value.to_string())),
            Self::Double(value) => Some(Cow::Owned(value.to_string())),
            Self::Boolean(value) => Some(Cow::Borrowed(if *value { "true" } else { "false" })),
            Self::Object(_) | Self::Array(_) => None,
        }
    }

    pub fn is_empty_object(&self) -> bool {
        if let Self::Object(children) = self {
            children.is_empty()
        } else {
            false
        }
    }
}

/// A field value viewed as a uniform sequence.
#[derive(Debug, Clone, Copy)]
pub enum OneOrMany<'a> {
    One(&'a XmlValue),
    Many(&'a [XmlValue]),
}

impl<'a> IntoIterator for OneOrMany<'a> {
    type Item = &'a XmlValue;
    type IntoIter = OneOrManyIter<'a>;

    fn into_iter(self) -> OneOrManyIter<'a> {
        match self {
            Self::One(value) => OneOrManyIter::One(Some(value)),
            Self::Many(values) => OneOrManyIter::Many(values.iter()),
        }
    }
}

pub enum OneOrManyIter<'a> {
    One(Option<&'a XmlValue>),
    Many(std::slice::Iter<'a, XmlValue>),
}

impl<'a> Iterator for OneOrManyIter<'a> {
    type Item = &'a XmlValue;

    fn next(&mut self) -> Option<&'a XmlValue> {
        match self {
            Self::One(value) => value.take(),
            Self::Many(values) => values.next(),
        }
    }
}

/// Converts an XML document into the generic element tree.
///
/// A payload with no element at all yields an empty object, which callers
/// treat like a failed query.
pub fn read_tree(payload: &str) -> Result<XmlValue, XmlReadError> {
    let mut reader = Reader::from_str(payload);
    let config = reader.config_mut();
    config.trim_text(true);
    config.expand_empty_elements = true;

    let mut root = BTreeMap::new();
    // (element name, accumulated children, accumulated text)
    let mut stack: Vec<(String, BTreeMap<String, XmlValue>, String)> = Vec::new();
    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let name = reader
                    .decoder()
                    .decode(start.local_name().as_ref())?
                    .into_owned();
                let mut children = BTreeMap::new();
                for attribute in start.attributes() {
                    let attribute = attribute?;
                    let key = reader
                        .decoder()
                        .decode(attribute.key.local_name().as_ref())?
                        .into_owned();
                    let value = attribute.decode_and_unescape_value(reader.decoder())?;
                    insert_child(&mut children, key, scalar(&value));
                }
                stack.push((name, children, String::new()));
            }
            Event::Text(text) => {
                if let Some((_, _, buffer)) = stack.last_mut() {
                    buffer.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some((_, _, buffer)) = stack.last_mut() {
                    buffer.push_str(&reader.decoder().decode(data.as_ref())?);
                }
            }
            Event::End(_) => {
                let Some((name, mut children, text)) = stack.pop() else {
                    continue;
                };
                let value = if children.is_empty() {
                    scalar(&text)
                } else {
                    if !text.is_empty() {
                        insert_child(&mut children, "content".to_owned(), scalar(&text));
                    }
                    XmlValue::Object(children)
                };
                match stack.last_mut() {
                    Some((_, parent, _)) => insert_child(parent, name, value),
                    None => insert_child(&mut root, name, value),
                }
            }
            Event::Eof => return Ok(XmlValue::Object(root)),
            _ => (),
        }
    }
}

/// Adds a child under `key`, promoting repeated siblings to an array.
fn insert_child(children: &mut BTreeMap<String, XmlValue>, key: String, value: XmlValue) {
    match children.entry(key) {
        Entry::Vacant(entry) => {
            entry.insert(value);
        }
        Entry::Occupied(mut entry) => {
            if let XmlValue::Array(items) = entry.get_mut() {
                items.push(value);
            } else {
                let first = take(entry.get_mut());
                *entry.get_mut() = XmlValue::Array(vec![first, value]);
            }
        }
    }
}

impl Default for XmlValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

fn scalar(text: &str) -> XmlValue {
    match text {
        "true" => return XmlValue::Boolean(true),
        "false" => return XmlValue::Boolean(false),
        _ => (),
    }
    if text.starts_with(['-', '+']) || text.starts_with(|c: char| c.is_ascii_digit()) {
        // A number is kept only when its canonical rendering is the original
        // text. "042", "1e3" or "5." stay text, so their lexical form survives.
        if let Ok(value) = text.parse::<i64>() {
            if value.to_string() == text {
                return XmlValue::Integer(value);
            }
        } else if let Ok(value) = text.parse::<f64>() {
            if value.is_finite() && value.to_string() == text {
                return XmlValue::Double(value);
            }
        }
    }
    XmlValue::Text(text.to_owned())
}
