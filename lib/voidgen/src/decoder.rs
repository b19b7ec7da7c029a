//! Decoding of one variable binding into a typed RDF term.

use crate::error::QueryError;
use crate::xml::XmlValue;
use oxrdf::vocab::xsd;
use oxrdf::{Literal, NamedNode, NamedNodeRef, Term};

/// What to do with a literal whose datatype is not in the XSD table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DatatypePolicy {
    /// Keep the literal typed with the unresolved datatype IRI.
    #[default]
    Keep,
    /// Fail the containing query result.
    Reject,
}

/// Decodes binding entries of the element tree into [`Term`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct TermDecoder {
    policy: DatatypePolicy,
}

impl TermDecoder {
    pub fn new(policy: DatatypePolicy) -> Self {
        Self { policy }
    }

    /// Decodes one binding entry into a variable name and its term.
    ///
    /// Returns `Ok(None)` for an entry carrying neither a `uri` nor a
    /// `literal` field: the variable is simply unbound in that row.
    /// URIs are taken as-is, without well-formedness validation.
    pub fn decode(&self, entry: &XmlValue) -> Result<Option<(String, Term)>, QueryError> {
        let name = entry
            .get("name")
            .and_then(XmlValue::lexical)
            .ok_or_else(|| QueryError::Shape("binding without a name attribute".to_owned()))?
            .into_owned();
        if let Some(uri) = entry.get("uri") {
            let uri = uri
                .lexical()
                .ok_or_else(|| QueryError::Shape(format!("non-scalar uri value: {uri:?}")))?;
            return Ok(Some((
                name,
                NamedNode::new_unchecked(uri.into_owned()).into(),
            )));
        }
        if let Some(literal) = entry.get("literal") {
            if !matches!(literal, XmlValue::Object(_)) {
                // A plain literal degrades to a bare scalar in the element
                // tree and loses its binding structure, so refuse it.
                return Err(QueryError::UnsupportedLiteralShape(format!("{literal:?}")));
            }
            let datatype = literal
                .get("datatype")
                .and_then(XmlValue::lexical)
                .ok_or_else(|| QueryError::Shape("literal without a datatype".to_owned()))?;
            let content = literal
                .get("content")
                .and_then(XmlValue::lexical)
                .unwrap_or_default();
            let literal = match resolve_datatype(&datatype) {
                Some(datatype) => Literal::new_typed_literal(content, datatype),
                None => match self.policy {
                    DatatypePolicy::Keep => Literal::new_typed_literal(
                        content,
                        NamedNode::new_unchecked(datatype.into_owned()),
                    ),
                    DatatypePolicy::Reject => {
                        return Err(QueryError::UnknownDatatype(datatype.into_owned()))
                    }
                },
            };
            return Ok(Some((name, literal.into())));
        }
        Ok(None)
    }
}

/// Looks up a datatype IRI in the XSD table.
fn resolve_datatype(iri: &str) -> Option<NamedNodeRef<'static>> {
    [
        xsd::BOOLEAN,
        xsd::BYTE,
        xsd::DATE,
        xsd::DATE_TIME,
        xsd::DECIMAL,
        xsd::DOUBLE,
        xsd::FLOAT,
        xsd::INT,
        xsd::INTEGER,
        xsd::LONG,
        xsd::NEGATIVE_INTEGER,
        xsd::NON_NEGATIVE_INTEGER,
        xsd::NON_POSITIVE_INTEGER,
        xsd::POSITIVE_INTEGER,
        xsd::SHORT,
        xsd::STRING,
        xsd::TIME,
        xsd::UNSIGNED_BYTE,
        xsd::UNSIGNED_INT,
        xsd::UNSIGNED_LONG,
        xsd::UNSIGNED_SHORT,
    ]
    .into_iter()
    .find(|datatype| datatype.as_str() == iri)
}
