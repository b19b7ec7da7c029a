#![allow(clippy::print_stdout)]
use anyhow::{bail, Context};
use clap::{Parser, ValueHint};
use oxrdf::NamedNode;
use oxrdfio::{RdfFormat, RdfSerializer};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;
use voidgen::{DatatypePolicy, GraphScope, SparqlClient, TermDecoder, VoidConfig, VoidGenerator};

/// Generates a VoID description of the dataset behind a SPARQL endpoint.
#[derive(Parser)]
#[command(about, version, name = "voidgen")]
struct Args {
    /// URI identifying the described dataset.
    #[arg(long, value_hint = ValueHint::Url)]
    dataset_uri: String,
    /// URL of the SPARQL endpoint to query.
    #[arg(long, value_hint = ValueHint::Url)]
    endpoint: String,
    /// File the description is written to.
    #[arg(long, default_value = "dataset.ttl", value_hint = ValueHint::FilePath)]
    file: PathBuf,
    /// Output format as a file extension or media type.
    ///
    /// By default guessed from the output file extension, falling back to Turtle.
    #[arg(long)]
    format: Option<String>,
    /// Query timeout in seconds.
    #[arg(long, default_value_t = 300)]
    timeout: u64,
    /// URI space of the dataset, also used to limit example resources.
    #[arg(long, default_value = "")]
    uri_space: String,
    /// Query all graphs instead of only the default graph.
    #[arg(long)]
    use_graphs: bool,
}

pub fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();
    let start = Instant::now();

    let format = if let Some(name) = &args.format {
        rdf_format_from_name(name)?
    } else {
        rdf_format_from_path(&args.file).unwrap_or(RdfFormat::Turtle)
    };
    let dataset = NamedNode::new(&args.dataset_uri)
        .with_context(|| format!("Invalid dataset URI '{}'", args.dataset_uri))?;
    let endpoint = NamedNode::new(&args.endpoint)
        .with_context(|| format!("Invalid endpoint URL '{}'", args.endpoint))?;

    let settings = settings_summary(&args);
    println!("{settings}");

    let client = SparqlClient::new(&args.endpoint, Duration::from_secs(args.timeout));
    let config = VoidConfig {
        dataset,
        endpoint,
        uri_space: args.uri_space.clone(),
        comment: Some(settings),
    };
    let generator = VoidGenerator::new(
        &client,
        &config,
        GraphScope::from_use_graphs(args.use_graphs),
        TermDecoder::new(DatatypePolicy::Keep),
    );
    let description = generator.generate();

    let file = File::create(&args.file)
        .with_context(|| format!("Not able to create file {}", args.file.display()))?;
    let mut serializer = RdfSerializer::from_format(format)
        .with_prefix("void", voidgen::vocab::void::NS)?
        .for_writer(BufWriter::new(file));
    for triple in &description {
        serializer.serialize_triple(triple)?;
    }
    serializer.finish()?.flush()?;

    info!(
        "{} triples written to file '{}'.",
        description.len(),
        args.file.display()
    );
    info!("Total time {}s.", start.elapsed().as_secs());
    Ok(())
}

fn settings_summary(args: &Args) -> String {
    format!(
        "Running with settings:\n\
         \t\t Dataset uri     : {}\n\
         \t\t Use graphs      : {}\n\
         \t\t Uri space       : {}\n\
         \t\t Sparql endpoint : {}\n\
         \t\t Timeout         : {}\n\
         \t\t File            : {}\n\
         \t\t Format          : {}",
        args.dataset_uri,
        args.use_graphs,
        args.uri_space,
        args.endpoint,
        args.timeout,
        args.file.display(),
        args.format.as_deref().unwrap_or("TURTLE"),
    )
}

fn rdf_format_from_path(path: &Path) -> anyhow::Result<RdfFormat> {
    if let Some(ext) = path.extension().and_then(OsStr::to_str) {
        RdfFormat::from_extension(ext)
            .with_context(|| format!("The file extension '{ext}' is unknown"))
    } else {
        bail!(
            "The path {} has no extension to guess a file format from",
            path.display()
        )
    }
}

fn rdf_format_from_name(name: &str) -> anyhow::Result<RdfFormat> {
    if let Some(t) = RdfFormat::from_extension(name) {
        return Ok(t);
    }
    if let Some(t) = RdfFormat::from_media_type(name) {
        return Ok(t);
    }
    bail!("The file format '{name}' is unknown")
}
