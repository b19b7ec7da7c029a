//! Fail-soft execution of the statistic queries and folding of their rows.

use crate::client::ResultFetcher;
use crate::decoder::TermDecoder;
use crate::error::QueryError;
use crate::queries::{QueryStore, Statistic};
use crate::results::QueryResult;
use oxrdf::{NamedNode, Term};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Statistics accumulated for one partition key.
pub type PartitionRecord = BTreeMap<Statistic, Term>;

/// Everything the statistic queries contributed, ready for materialization.
#[derive(Debug, Clone, Default)]
pub struct DatasetStatistics {
    /// Dataset-level facts, in statistic order. A failed query leaves a gap,
    /// never a zero.
    pub globals: Vec<(Statistic, Term)>,
    /// Per-class records keyed by type URI.
    pub class_partitions: BTreeMap<String, PartitionRecord>,
    /// Per-property records keyed by property URI.
    pub property_partitions: BTreeMap<String, PartitionRecord>,
    /// Deduplicated vocabulary namespaces.
    pub vocabularies: BTreeSet<String>,
    /// Example resources, in response order, not deduplicated.
    pub examples: Vec<NamedNode>,
}

/// Drives the fixed battery of queries against one endpoint.
///
/// Queries run sequentially; each result is folded into owned accumulation
/// maps before the next query starts. Any single query failure is absorbed
/// at the query boundary and contributes nothing.
pub struct StatisticsCollector<'a, F> {
    fetcher: &'a F,
    store: QueryStore,
    decoder: TermDecoder,
}

impl<'a, F: ResultFetcher> StatisticsCollector<'a, F> {
    pub fn new(fetcher: &'a F, store: QueryStore, decoder: TermDecoder) -> Self {
        Self {
            fetcher,
            store,
            decoder,
        }
    }

    pub fn collect(&self, uri_space: &str) -> DatasetStatistics {
        let mut statistics = DatasetStatistics::default();
        self.collect_examples(&mut statistics, uri_space);
        self.collect_vocabularies(&mut statistics);
        self.collect_globals(&mut statistics);
        self.collect_class_partitions(&mut statistics);
        self.collect_property_partitions(&mut statistics);
        statistics
    }

    fn collect_globals(&self, statistics: &mut DatasetStatistics) {
        for statistic in Statistic::ALL {
            let name = self.store.name("global", statistic);
            let Some(result) = self.run(self.store.global(statistic), &name) else {
                continue;
            };
            match result.rows().first().and_then(|row| row.get("total")) {
                Some(total) => statistics.globals.push((statistic, total.clone())),
                None => warn!("query '{name}' returned no total"),
            }
        }
    }

    fn collect_class_partitions(&self, statistics: &mut DatasetStatistics) {
        for statistic in Statistic::ALL {
            let name = self.store.name("class", statistic);
            if let Some(result) = self.run(self.store.class_breakdown(statistic), &name) {
                merge_breakdown(&mut statistics.class_partitions, "type", statistic, &result);
            }
        }
    }

    fn collect_property_partitions(&self, statistics: &mut DatasetStatistics) {
        for statistic in Statistic::ALL {
            let name = self.store.name("property", statistic);
            if let Some(result) = self.run(self.store.property_breakdown(statistic), &name) {
                merge_breakdown(
                    &mut statistics.property_partitions,
                    "property",
                    statistic,
                    &result,
                );
            }
        }
    }

    fn collect_vocabularies(&self, statistics: &mut DatasetStatistics) {
        let queries = [
            (
                self.store.vocabulary_classes(),
                self.store.category_name("vocabularyClasses"),
            ),
            (
                self.store.vocabulary_properties(),
                self.store.category_name("vocabularyProperties"),
            ),
        ];
        for (query, name) in queries {
            let Some(result) = self.run(query, &name) else {
                continue;
            };
            for row in result.rows() {
                let Some(Term::NamedNode(resource)) = row.get("result") else {
                    debug!("ignoring non-resource vocabulary candidate");
                    continue;
                };
                statistics
                    .vocabularies
                    .insert(vocabulary_namespace(resource.as_str()));
            }
        }
    }

    fn collect_examples(&self, statistics: &mut DatasetStatistics, uri_space: &str) {
        let query = self.store.example_resources(uri_space);
        let name = self.store.category_name("exampleResources");
        let Some(result) = self.run(&query, &name) else {
            return;
        };
        for row in result.rows() {
            if let Some(Term::NamedNode(example)) = row.get("example") {
                statistics.examples.push(example.clone());
            }
        }
    }

    fn run(&self, query: &str, name: &str) -> Option<QueryResult> {
        match self.try_run(query, name) {
            Ok(result) => Some(result),
            Err(error) => {
                warn!("query '{name}' contributes nothing: {error}");
                None
            }
        }
    }

    fn try_run(&self, query: &str, name: &str) -> Result<QueryResult, QueryError> {
        let payload = self.fetcher.fetch(query, name)?;
        crate::results::normalize(&payload, &self.decoder)
    }
}

/// Folds breakdown rows into the partition map.
///
/// Each breakdown query mentions a key at most once, so a later write for
/// the same key and statistic overwrites. Rows without a resource key or
/// without a total are skipped.
fn merge_breakdown(
    partitions: &mut BTreeMap<String, PartitionRecord>,
    key_variable: &str,
    statistic: Statistic,
    result: &QueryResult,
) {
    for row in result.rows() {
        let Some(Term::NamedNode(key)) = row.get(key_variable) else {
            debug!("ignoring breakdown row without a resource '{key_variable}' binding");
            continue;
        };
        let Some(total) = row.get("total") else {
            debug!("ignoring breakdown row without a total");
            continue;
        };
        partitions
            .entry(key.as_str().to_owned())
            .or_default()
            .insert(statistic, total.clone());
    }
}

/// Truncates a resource URI at its vocabulary boundary.
///
/// A fragment-style URI is cut before its last `#`; otherwise the URI is
/// cut after its last `/`.
pub fn vocabulary_namespace(uri: &str) -> String {
    if let Some(position) = uri.rfind('#') {
        uri[..position].to_owned()
    } else {
        match uri.rfind('/') {
            Some(position) => uri[..=position].to_owned(),
            None => format!("{uri}/"),
        }
    }
}
