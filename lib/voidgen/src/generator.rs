//! Assembly of collected statistics into a VoID description graph.

use crate::client::ResultFetcher;
use crate::decoder::TermDecoder;
use crate::queries::{GraphScope, QueryStore};
use crate::stats::{DatasetStatistics, PartitionRecord, StatisticsCollector};
use crate::vocab::void;
use oxrdf::vocab::rdfs;
use oxrdf::{BlankNode, Graph, Literal, NamedNode, NamedNodeRef, Triple};
use std::collections::BTreeMap;

/// Settings for one generation run.
#[derive(Debug, Clone)]
pub struct VoidConfig {
    /// The URI describing the dataset, subject of every dataset-level triple.
    pub dataset: NamedNode,
    /// The queried SPARQL endpoint.
    pub endpoint: NamedNode,
    /// Prefix of the dataset's resource URIs. Blank disables the
    /// `void:uriSpace` triple and the example-resource filter.
    pub uri_space: String,
    /// Run settings summary attached to the dataset as `rdfs:comment`.
    pub comment: Option<String>,
}

/// Produces a VoID description of the dataset behind one endpoint.
pub struct VoidGenerator<'a, F> {
    config: &'a VoidConfig,
    collector: StatisticsCollector<'a, F>,
}

impl<'a, F: ResultFetcher> VoidGenerator<'a, F> {
    pub fn new(
        fetcher: &'a F,
        config: &'a VoidConfig,
        scope: GraphScope,
        decoder: TermDecoder,
    ) -> Self {
        Self {
            config,
            collector: StatisticsCollector::new(fetcher, QueryStore::new(scope), decoder),
        }
    }

    /// Runs the query battery and materializes whatever it contributed.
    ///
    /// Always returns a graph. A dataset where every query failed still
    /// yields the endpoint triple and the settings comment.
    pub fn generate(&self) -> Graph {
        let statistics = self.collector.collect(&self.config.uri_space);
        self.assemble(&statistics)
    }

    fn assemble(&self, statistics: &DatasetStatistics) -> Graph {
        let mut graph = Graph::new();
        let dataset = self.config.dataset.as_ref();
        if let Some(comment) = &self.config.comment {
            graph.insert(&Triple::new(
                dataset,
                rdfs::COMMENT,
                Literal::new_simple_literal(comment),
            ));
        }
        graph.insert(&Triple::new(
            dataset,
            void::SPARQL_ENDPOINT,
            self.config.endpoint.clone(),
        ));
        for example in &statistics.examples {
            graph.insert(&Triple::new(dataset, void::EXAMPLE_RESOURCE, example.clone()));
        }
        if !self.config.uri_space.trim().is_empty() {
            graph.insert(&Triple::new(
                dataset,
                void::URI_SPACE,
                Literal::new_simple_literal(&self.config.uri_space),
            ));
        }
        for vocabulary in &statistics.vocabularies {
            graph.insert(&Triple::new(
                dataset,
                void::VOCABULARY,
                NamedNode::new_unchecked(vocabulary.clone()),
            ));
        }
        for (statistic, total) in &statistics.globals {
            graph.insert(&Triple::new(dataset, statistic.term(), total.clone()));
        }
        add_partitions(
            &mut graph,
            dataset,
            &statistics.class_partitions,
            void::CLASS_PARTITION,
            void::CLASS,
        );
        add_partitions(
            &mut graph,
            dataset,
            &statistics.property_partitions,
            void::PROPERTY_PARTITION,
            void::PROPERTY,
        );
        graph
    }
}

/// Emits one fresh blank partition node per key, carrying the key and all
/// statistics accumulated for it.
fn add_partitions(
    graph: &mut Graph,
    dataset: NamedNodeRef<'_>,
    partitions: &BTreeMap<String, PartitionRecord>,
    link: NamedNodeRef<'static>,
    key_property: NamedNodeRef<'static>,
) {
    for (key, record) in partitions {
        let partition = BlankNode::default();
        graph.insert(&Triple::new(dataset, link, partition.clone()));
        graph.insert(&Triple::new(
            partition.clone(),
            key_property,
            NamedNode::new_unchecked(key.clone()),
        ));
        for (statistic, total) in record {
            graph.insert(&Triple::new(
                partition.clone(),
                statistic.term(),
                total.clone(),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use oxrdf::vocab::xsd;
    use oxrdf::{Term, TermRef};
    use std::collections::HashMap;

    struct StubEndpoint {
        responses: HashMap<&'static str, String>,
    }

    impl ResultFetcher for StubEndpoint {
        fn fetch(&self, _query: &str, name: &str) -> Result<String, FetchError> {
            self.responses
                .get(name)
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    status: 503,
                    name: name.to_owned(),
                })
        }
    }

    fn config() -> VoidConfig {
        VoidConfig {
            dataset: NamedNode::new_unchecked("http://ex.org/dataset"),
            endpoint: NamedNode::new_unchecked("http://ex.org/sparql"),
            uri_space: "http://ex.org/".to_owned(),
            comment: Some("Endpoint: http://ex.org/sparql".to_owned()),
        }
    }

    fn generate(responses: HashMap<&'static str, String>) -> Graph {
        let endpoint = StubEndpoint { responses };
        let config = config();
        VoidGenerator::new(
            &endpoint,
            &config,
            GraphScope::DefaultGraph,
            TermDecoder::default(),
        )
        .generate()
    }

    fn objects<'a>(graph: &'a Graph, predicate: NamedNodeRef<'_>) -> Vec<TermRef<'a>> {
        let dataset = NamedNode::new_unchecked("http://ex.org/dataset");
        graph
            .objects_for_subject_predicate(dataset.as_ref(), predicate)
            .collect()
    }

    #[test]
    fn all_queries_failing_still_yields_a_description() {
        let graph = generate(HashMap::new());
        assert_eq!(objects(&graph, void::SPARQL_ENDPOINT).len(), 1);
        assert_eq!(objects(&graph, void::URI_SPACE).len(), 1);
        assert_eq!(objects(&graph, rdfs::COMMENT).len(), 1);
        // comment + endpoint + uri space and nothing else
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn global_statistics_attach_to_the_dataset() {
        let payload = r#"<sparql><head><variable name="total"/></head><results><result>
<binding name="total"><literal datatype="http://www.w3.org/2001/XMLSchema#integer">99</literal></binding>
</result></results></sparql>"#;
        let graph = generate(HashMap::from([(
            "triples/global/triples",
            payload.to_owned(),
        )]));
        assert_eq!(
            objects(&graph, void::TRIPLES),
            [TermRef::from(
                Literal::new_typed_literal("99", xsd::INTEGER).as_ref()
            )]
        );
    }

    #[test]
    fn class_partition_groups_all_statistics_under_one_blank_node() {
        let breakdown = |total: u64| {
            format!(
                r#"<sparql><head><variable name="type"/><variable name="total"/></head><results><result>
<binding name="type"><uri>http://ex.org/Person</uri></binding>
<binding name="total"><literal datatype="http://www.w3.org/2001/XMLSchema#integer">{total}</literal></binding>
</result></results></sparql>"#
            )
        };
        let graph = generate(HashMap::from([
            ("triples/class/triples", breakdown(7)),
            ("triples/class/entities", breakdown(2)),
        ]));

        let partitions = objects(&graph, void::CLASS_PARTITION);
        assert_eq!(partitions.len(), 1);
        let Some(TermRef::BlankNode(partition)) = partitions.first().copied() else {
            panic!("partition must be a blank node");
        };
        let class: Vec<_> = graph
            .objects_for_subject_predicate(partition, void::CLASS)
            .collect();
        assert_eq!(
            class,
            [TermRef::from(
                NamedNode::new_unchecked("http://ex.org/Person").as_ref()
            )]
        );
        let triples: Vec<_> = graph
            .objects_for_subject_predicate(partition, void::TRIPLES)
            .collect();
        assert_eq!(
            triples,
            [TermRef::from(
                Literal::new_typed_literal("7", xsd::INTEGER).as_ref()
            )]
        );
        let entities: Vec<_> = graph
            .objects_for_subject_predicate(partition, void::ENTITIES)
            .collect();
        assert_eq!(entities.len(), 1);
    }

    #[test]
    fn blank_uri_space_omits_the_triple_and_examples_keep_response_order() {
        let payload = r#"<sparql><head><variable name="example"/></head><results>
<result><binding name="example"><uri>http://ex.org/b</uri></binding></result>
<result><binding name="example"><uri>http://ex.org/a</uri></binding></result>
</results></sparql>"#;
        let endpoint = StubEndpoint {
            responses: HashMap::from([("triples/exampleResources", payload.to_owned())]),
        };
        let config = VoidConfig {
            uri_space: String::new(),
            comment: None,
            ..config()
        };
        let graph = VoidGenerator::new(
            &endpoint,
            &config,
            GraphScope::DefaultGraph,
            TermDecoder::default(),
        )
        .generate();
        assert!(objects(&graph, void::URI_SPACE).is_empty());
        let examples: Vec<Term> = objects(&graph, void::EXAMPLE_RESOURCE)
            .into_iter()
            .map(Term::from)
            .collect();
        assert_eq!(examples.len(), 2);
    }

    #[test]
    fn identical_payloads_yield_equal_descriptions() {
        use oxrdf::dataset::CanonicalizationAlgorithm;

        let responses = || {
            HashMap::from([(
                "triples/class/triples",
                r#"<sparql><head><variable name="type"/><variable name="total"/></head><results><result>
<binding name="type"><uri>http://ex.org/Person</uri></binding>
<binding name="total"><literal datatype="http://www.w3.org/2001/XMLSchema#integer">5</literal></binding>
</result></results></sparql>"#
                    .to_owned(),
            )])
        };
        let mut first = generate(responses());
        let mut second = generate(responses());
        first.canonicalize(CanonicalizationAlgorithm::Unstable);
        second.canonicalize(CanonicalizationAlgorithm::Unstable);
        assert_eq!(first, second);
    }

    #[test]
    fn vocabularies_point_at_truncated_namespaces() {
        let payload = r#"<sparql><head><variable name="result"/></head><results>
<result><binding name="result"><uri>http://www.w3.org/2000/01/rdf-schema#Class</uri></binding></result>
</results></sparql>"#;
        let graph = generate(HashMap::from([(
            "triples/vocabularyClasses",
            payload.to_owned(),
        )]));
        assert_eq!(
            objects(&graph, void::VOCABULARY),
            [TermRef::from(
                NamedNode::new_unchecked("http://www.w3.org/2000/01/rdf-schema").as_ref()
            )]
        );
    }
}
