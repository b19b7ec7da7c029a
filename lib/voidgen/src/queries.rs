//! Embedded SPARQL query templates.
//!
//! Templates exist in two flavors: `triples/` queries target only the
//! default graph, `quads/` queries wrap the same pattern in `GRAPH ?g`.
//! They are compiled into the binary, so a missing template is a build
//! failure rather than a runtime one.

use std::fmt;

/// The VoID statistics computed for the dataset and its partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Statistic {
    Triples,
    Entities,
    Classes,
    Properties,
    DistinctSubjects,
    DistinctObjects,
}

impl Statistic {
    pub const ALL: [Self; 6] = [
        Self::Triples,
        Self::Entities,
        Self::Classes,
        Self::Properties,
        Self::DistinctSubjects,
        Self::DistinctObjects,
    ];

    /// The statistic name as used by the VoID vocabulary.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Triples => "triples",
            Self::Entities => "entities",
            Self::Classes => "classes",
            Self::Properties => "properties",
            Self::DistinctSubjects => "distinctSubjects",
            Self::DistinctObjects => "distinctObjects",
        }
    }

    /// The VoID property carrying this statistic.
    pub fn term(self) -> oxrdf::NamedNodeRef<'static> {
        match self {
            Self::Triples => crate::vocab::void::TRIPLES,
            Self::Entities => crate::vocab::void::ENTITIES,
            Self::Classes => crate::vocab::void::CLASSES,
            Self::Properties => crate::vocab::void::PROPERTIES,
            Self::DistinctSubjects => crate::vocab::void::DISTINCT_SUBJECTS,
            Self::DistinctObjects => crate::vocab::void::DISTINCT_OBJECTS,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether queries target only the default graph or all graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphScope {
    DefaultGraph,
    AllGraphs,
}

impl GraphScope {
    pub fn from_use_graphs(use_graphs: bool) -> Self {
        if use_graphs {
            Self::AllGraphs
        } else {
            Self::DefaultGraph
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::DefaultGraph => "triples",
            Self::AllGraphs => "quads",
        }
    }

    fn index(self) -> usize {
        match self {
            Self::DefaultGraph => 0,
            Self::AllGraphs => 1,
        }
    }
}

macro_rules! scoped {
    ($path:literal) => {
        [
            include_str!(concat!("../queries/triples/", $path)),
            include_str!(concat!("../queries/quads/", $path)),
        ]
    };
}

static GLOBAL: [[&str; 2]; 6] = [
    scoped!("global/triples.sparql"),
    scoped!("global/entities.sparql"),
    scoped!("global/classes.sparql"),
    scoped!("global/properties.sparql"),
    scoped!("global/distinctSubjects.sparql"),
    scoped!("global/distinctObjects.sparql"),
];

static CLASS: [[&str; 2]; 6] = [
    scoped!("class/triples.sparql"),
    scoped!("class/entities.sparql"),
    scoped!("class/classes.sparql"),
    scoped!("class/properties.sparql"),
    scoped!("class/distinctSubjects.sparql"),
    scoped!("class/distinctObjects.sparql"),
];

static PROPERTY: [[&str; 2]; 6] = [
    scoped!("property/triples.sparql"),
    scoped!("property/entities.sparql"),
    scoped!("property/classes.sparql"),
    scoped!("property/properties.sparql"),
    scoped!("property/distinctSubjects.sparql"),
    scoped!("property/distinctObjects.sparql"),
];

static VOCABULARY_CLASSES: [&str; 2] = scoped!("vocabularyClasses.sparql");
static VOCABULARY_PROPERTIES: [&str; 2] = scoped!("vocabularyProperties.sparql");
static EXAMPLE_RESOURCES: [&str; 2] = scoped!("exampleResources.sparql");

/// Hands out query texts for one graph scope.
#[derive(Debug, Clone, Copy)]
pub struct QueryStore {
    scope: GraphScope,
}

impl QueryStore {
    pub fn new(scope: GraphScope) -> Self {
        Self { scope }
    }

    pub fn global(&self, statistic: Statistic) -> &'static str {
        GLOBAL[statistic.index()][self.scope.index()]
    }

    pub fn class_breakdown(&self, statistic: Statistic) -> &'static str {
        CLASS[statistic.index()][self.scope.index()]
    }

    pub fn property_breakdown(&self, statistic: Statistic) -> &'static str {
        PROPERTY[statistic.index()][self.scope.index()]
    }

    pub fn vocabulary_classes(&self) -> &'static str {
        VOCABULARY_CLASSES[self.scope.index()]
    }

    pub fn vocabulary_properties(&self) -> &'static str {
        VOCABULARY_PROPERTIES[self.scope.index()]
    }

    /// The example-resource query, with its filter placeholder substituted.
    ///
    /// A blank uri space leaves the filter empty; otherwise matches are
    /// restricted to subjects starting with the prefix.
    pub fn example_resources(&self, uri_space: &str) -> String {
        let filter = if uri_space.trim().is_empty() {
            String::new()
        } else {
            format!("\n && (STRSTARTS(STR(?example), '{uri_space}'))")
        };
        EXAMPLE_RESOURCES[self.scope.index()].replacen("{}", &filter, 1)
    }

    /// A diagnostic name for log lines, e.g. `triples/class/entities`.
    pub fn name(&self, category: &str, statistic: Statistic) -> String {
        format!("{}/{category}/{statistic}", self.scope.as_str())
    }

    pub fn category_name(&self, category: &str) -> String {
        format!("{}/{category}", self.scope.as_str())
    }
}
