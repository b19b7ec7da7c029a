#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]

mod client;
mod decoder;
mod error;
mod generator;
mod queries;
mod results;
mod stats;
pub mod vocab;
mod xml;

pub use crate::client::{ResultFetcher, SparqlClient};
pub use crate::decoder::{DatatypePolicy, TermDecoder};
pub use crate::error::{FetchError, QueryError, XmlReadError};
pub use crate::generator::{VoidConfig, VoidGenerator};
pub use crate::queries::{GraphScope, QueryStore, Statistic};
pub use crate::results::{QueryResult, ResultRow};
pub use crate::stats::{DatasetStatistics, PartitionRecord, StatisticsCollector};
pub use crate::xml::{OneOrMany, OneOrManyIter, XmlValue};
