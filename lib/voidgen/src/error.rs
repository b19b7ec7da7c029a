use std::io;

/// Error returned when talking to the SPARQL endpoint.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// I/O error while sending the request or reading the response.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The endpoint answered with a non-2xx status.
    #[error("endpoint returned status {status} for query '{name}'")]
    Status { status: u16, name: String },
}

/// Error returned while converting an XML payload into the generic element tree.
#[derive(Debug, thiserror::Error)]
pub enum XmlReadError {
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
    #[error(transparent)]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
    #[error(transparent)]
    Escape(#[from] quick_xml::escape::EscapeError),
    #[error(transparent)]
    Encoding(#[from] quick_xml::encoding::EncodingError),
}

/// Error raised by a single statistics query.
///
/// All variants are absorbed at the query boundary: a failing query
/// contributes nothing to the output graph and never aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Non-2xx status or I/O error (connection refused, timeout...).
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The payload is not well-formed XML.
    #[error(transparent)]
    Xml(#[from] XmlReadError),
    /// The payload parsed but does not have the SPARQL results shape.
    #[error("unexpected result shape: {0}")]
    Shape(String),
    /// Syntactically empty payload.
    ///
    /// The wire format gives no way to tell a dataset with zero matching
    /// rows from a malformed response, so callers treat this like a failure.
    #[error("query returned an empty payload")]
    EmptyResult,
    /// A literal binding shaped as a bare scalar instead of an annotated element.
    #[error("unsupported literal shape: {0}")]
    UnsupportedLiteralShape(String),
    /// A literal datatype missing from the XSD table, under [`DatatypePolicy::Reject`](crate::DatatypePolicy::Reject).
    #[error("unknown literal datatype <{0}>")]
    UnknownDatatype(String),
}
