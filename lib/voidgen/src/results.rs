//! Normalization of a raw result payload into a canonical tabular form.

use crate::decoder::TermDecoder;
use crate::error::QueryError;
use crate::xml::{read_tree, XmlValue};
use oxrdf::Term;
use std::collections::{BTreeMap, BTreeSet};

/// One row of a query result: variable name to decoded term.
///
/// A variable absent from a row simply has no entry.
pub type ResultRow = BTreeMap<String, Term>;

/// A normalized query result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    variables: BTreeSet<String>,
    rows: Vec<ResultRow>,
}

impl QueryResult {
    pub fn variables(&self) -> &BTreeSet<String> {
        &self.variables
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }
}

/// Normalizes a raw SPARQL XML results payload.
///
/// The variable-declaration list and the result-row list of the payload may
/// each surface as a single object (cardinality 1) or as a collection; both
/// shapes normalize to the same [`QueryResult`]. The binding list inside
/// each row undergoes the same treatment before decoding.
///
/// A payload with no `sparql` container at all yields
/// [`QueryError::EmptyResult`]; by design this is indistinguishable from a
/// failed request and callers treat both the same way.
pub fn normalize(payload: &str, decoder: &TermDecoder) -> Result<QueryResult, QueryError> {
    let tree = read_tree(payload)?;
    let root = tree.get("sparql").ok_or(QueryError::EmptyResult)?;

    let head = root
        .get("head")
        .ok_or_else(|| QueryError::Shape("missing head element".to_owned()))?;
    let mut variables = BTreeSet::new();
    for declaration in head
        .get("variable")
        .ok_or_else(|| QueryError::Shape("missing variable declarations".to_owned()))?
        .as_sequence()
    {
        let name = declaration
            .get("name")
            .and_then(XmlValue::lexical)
            .ok_or_else(|| QueryError::Shape("variable without a name".to_owned()))?;
        variables.insert(name.into_owned());
    }

    let results = root
        .get("results")
        .ok_or_else(|| QueryError::Shape("missing results element".to_owned()))?;
    // A zero-row response has no result child at all. It fails here, like
    // any other unrecognized shape: the wire format cannot express the
    // difference between "no match" and "broken response".
    let result = results
        .get("result")
        .ok_or_else(|| QueryError::Shape("missing result rows".to_owned()))?;
    let mut rows = Vec::new();
    for entry in result.as_sequence() {
        rows.push(read_row(entry, decoder)?);
    }
    Ok(QueryResult { variables, rows })
}

fn read_row(entry: &XmlValue, decoder: &TermDecoder) -> Result<ResultRow, QueryError> {
    let bindings = entry
        .get("binding")
        .ok_or_else(|| QueryError::Shape("result row without bindings".to_owned()))?;
    let mut row = ResultRow::new();
    for binding in bindings.as_sequence() {
        if let Some((name, term)) = decoder.decode(binding)? {
            row.insert(name, term);
        }
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::vocab::xsd;
    use oxrdf::Literal;

    const SINGLETON: &str = r#"<?xml version="1.0"?>
<sparql xmlns="http://www.w3.org/2005/sparql-results#">
  <head><variable name="total"/></head>
  <results>
    <result>
      <binding name="total"><literal datatype="http://www.w3.org/2001/XMLSchema#integer">42</literal></binding>
    </result>
  </results>
</sparql>"#;

    #[test]
    fn singleton_shaped_payload_normalizes() {
        let result = normalize(SINGLETON, &TermDecoder::default()).unwrap();
        assert_eq!(result.variables().len(), 1);
        assert_eq!(result.rows().len(), 1);
        assert_eq!(
            result.rows()[0].get("total"),
            Some(&Literal::new_typed_literal("42", xsd::INTEGER).into())
        );
    }

    #[test]
    fn one_element_collection_binding_decodes_like_a_singleton() {
        // The wire format cannot express a one-element collection, so the
        // array shape is built by hand from the singleton one.
        let tree = read_tree(
            r#"<result><binding name="x"><uri>http://example.com/a</uri></binding></result>"#,
        )
        .unwrap();
        let singleton = tree.get("result").unwrap();
        let XmlValue::Object(children) = singleton else {
            panic!("result element must be an object");
        };
        let mut children = children.clone();
        let binding = children.remove("binding").unwrap();
        children.insert("binding".to_owned(), XmlValue::Array(vec![binding]));
        let collection = XmlValue::Object(children);
        assert_eq!(
            read_row(singleton, &TermDecoder::default()).unwrap(),
            read_row(&collection, &TermDecoder::default()).unwrap()
        );
    }

    #[test]
    fn row_decoding_is_independent_of_sibling_rows() {
        let collection = r#"<?xml version="1.0"?>
<sparql xmlns="http://www.w3.org/2005/sparql-results#">
  <head><variable name="total"/><variable name="other"/></head>
  <results>
    <result>
      <binding name="total"><literal datatype="http://www.w3.org/2001/XMLSchema#integer">42</literal></binding>
      <binding name="other"><uri>http://example.com/a</uri></binding>
    </result>
    <result>
      <binding name="total"><literal datatype="http://www.w3.org/2001/XMLSchema#integer">7</literal></binding>
    </result>
  </results>
</sparql>"#;
        let singleton = normalize(SINGLETON, &TermDecoder::default()).unwrap();
        let collection = normalize(collection, &TermDecoder::default()).unwrap();
        assert_eq!(collection.rows().len(), 2);
        assert_eq!(
            singleton.rows()[0].get("total"),
            collection.rows()[0].get("total")
        );
    }

    #[test]
    fn empty_payload_is_an_empty_result() {
        assert!(matches!(
            normalize("", &TermDecoder::default()),
            Err(QueryError::EmptyResult)
        ));
    }

    #[test]
    fn zero_row_results_element_is_a_shape_failure() {
        // <results/> degrades to a scalar in the element tree, so a valid
        // zero-row response is indistinguishable from a malformed one.
        let payload = r#"<sparql><head><variable name="s"/></head><results></results></sparql>"#;
        assert!(matches!(
            normalize(payload, &TermDecoder::default()),
            Err(QueryError::Shape(_))
        ));
    }

    #[test]
    fn bare_literal_invalidates_the_whole_result() {
        let payload = r#"<sparql><head><variable name="x"/></head>
<results><result><binding name="x"><literal>plain</literal></binding></result></results></sparql>"#;
        assert!(matches!(
            normalize(payload, &TermDecoder::default()),
            Err(QueryError::UnsupportedLiteralShape(_))
        ));
    }

    #[test]
    fn unbound_variable_has_no_row_entry() {
        let payload = r#"<sparql><head><variable name="x"/><variable name="y"/></head>
<results><result>
  <binding name="x"><uri>http://example.com/a</uri></binding>
  <binding name="y"><bnode>b0</bnode></binding>
</result></results></sparql>"#;
        let result = normalize(payload, &TermDecoder::default()).unwrap();
        assert_eq!(result.variables().len(), 2);
        assert!(result.rows()[0].contains_key("x"));
        assert!(!result.rows()[0].contains_key("y"));
    }
}
