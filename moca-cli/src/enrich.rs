//! Enrich command implementation for the Moca CLI.

use std::io::Write;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use moca_core::EmbeddingOracle;
use moca_data::{
    DEFAULT_POINTS_ENDPOINT, HttpEmbeddingOracle, HttpEmbeddingOracleConfig, HttpPointsSource,
    PointsSource, fetch_or_load_points, load_taxonomy, write_enriched,
};
use moca_scorer::{
    CacheOrigin, CachingOracle, EnrichOptions, Enricher, Enrichment, EnrichmentReport,
    RetryPolicy, RetryingOracle, read_embedding_cache, write_embedding_cache,
};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_EMBEDDING_CACHE, ARG_MAX_ATTEMPTS, ARG_NEIGHBOURS, ARG_ORACLE_MODEL,
    ARG_ORACLE_TIMEOUT_SECS, ARG_ORACLE_URL, ARG_OUTPUT, ARG_POINTS, ARG_POINTS_ENDPOINT,
    ARG_TAXONOMY, CliError, require_existing,
};

/// Points table read, and written when fetched, when no path is given.
pub(crate) const DEFAULT_POINTS_PATH: &str = "data/points_cache.csv";
/// Reference taxonomy read when no path is given.
pub(crate) const DEFAULT_TAXONOMY_PATH: &str = "data/base_tags.csv";
/// Enriched table written when no path is given.
pub(crate) const DEFAULT_OUTPUT_PATH: &str = "data/expanded_points.csv";

/// CLI arguments for the `enrich` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "enrich",
    long_about = "Score every bus stop in the points table from its tags. \
                 Known tags copy their reference scores; unknown tags are \
                 embedded and blended from the nearest reference tags. \
                 The expanded table keeps the original columns and appends \
                 one column per category plus the elected stop type.",
    about = "Score bus stops from their tags"
)]
#[ortho_config(prefix = "MOCA")]
pub(crate) struct EnrichArgs {
    /// Points CSV to read; also where a downloaded table is cached.
    #[arg(long = ARG_POINTS, value_name = "path")]
    #[serde(default)]
    pub(crate) points: Option<Utf8PathBuf>,
    /// URL to download the points CSV from when the points file is absent
    /// (defaults to the public Moca stops API).
    #[arg(long = ARG_POINTS_ENDPOINT, value_name = "url")]
    #[serde(default)]
    pub(crate) points_endpoint: Option<String>,
    /// Reference taxonomy CSV.
    #[arg(long = ARG_TAXONOMY, value_name = "path")]
    #[serde(default)]
    pub(crate) taxonomy: Option<Utf8PathBuf>,
    /// Destination for the expanded table.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
    /// Base URL of the embedding service (e.g. "http://localhost:11434").
    #[arg(long = ARG_ORACLE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) oracle_url: Option<String>,
    /// Embedding model requested from the service.
    #[arg(long = ARG_ORACLE_MODEL, value_name = "model")]
    #[serde(default)]
    pub(crate) oracle_model: Option<String>,
    /// Per-request timeout for the embedding service, in seconds.
    #[arg(long = ARG_ORACLE_TIMEOUT_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) oracle_timeout_secs: Option<u64>,
    /// Nearest reference tags blended for an unknown tag.
    #[arg(long = ARG_NEIGHBOURS, value_name = "count")]
    #[serde(default)]
    pub(crate) neighbours: Option<usize>,
    /// Attempts per embedding request before a stop is skipped.
    #[arg(long = ARG_MAX_ATTEMPTS, value_name = "count")]
    #[serde(default)]
    pub(crate) max_attempts: Option<u32>,
    /// Persisted embedding cache reused across runs.
    #[arg(long = ARG_EMBEDDING_CACHE, value_name = "path")]
    #[serde(default)]
    pub(crate) embedding_cache: Option<Utf8PathBuf>,
}

impl EnrichArgs {
    pub(crate) fn into_config(self) -> Result<EnrichConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(EnrichConfig::from(merged))
    }
}

/// Resolved `enrich` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EnrichConfig {
    /// Points CSV, read or written as a cache.
    pub(crate) points: Utf8PathBuf,
    /// Download location for the points CSV when the cache is absent.
    pub(crate) points_endpoint: String,
    /// Reference taxonomy CSV.
    pub(crate) taxonomy: Utf8PathBuf,
    /// Expanded table destination.
    pub(crate) output: Utf8PathBuf,
    /// Embedding service settings.
    pub(crate) oracle: HttpEmbeddingOracleConfig,
    /// Neighbour count and retry policy.
    pub(crate) options: EnrichOptions,
    /// Optional persisted embedding cache.
    pub(crate) embedding_cache: Option<Utf8PathBuf>,
}

impl EnrichConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        require_existing(&self.taxonomy, ARG_TAXONOMY)
    }

    fn cache_origin(&self) -> CacheOrigin {
        CacheOrigin::new(self.oracle.model.as_str(), self.oracle.base_url.as_str())
    }
}

impl From<EnrichArgs> for EnrichConfig {
    fn from(args: EnrichArgs) -> Self {
        let mut oracle = HttpEmbeddingOracleConfig::default();
        if let Some(url) = args.oracle_url {
            oracle.base_url = url;
        }
        if let Some(model) = args.oracle_model {
            oracle.model = model;
        }
        if let Some(secs) = args.oracle_timeout_secs {
            oracle.timeout = Duration::from_secs(secs);
        }

        let mut options = EnrichOptions::default();
        if let Some(neighbours) = args.neighbours {
            options = options.with_neighbours(neighbours);
        }
        if let Some(attempts) = args.max_attempts {
            options = options.with_retry(RetryPolicy::default().with_max_attempts(attempts));
        }

        Self {
            points: args
                .points
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_POINTS_PATH)),
            points_endpoint: args
                .points_endpoint
                .unwrap_or_else(|| DEFAULT_POINTS_ENDPOINT.to_owned()),
            taxonomy: args
                .taxonomy
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_TAXONOMY_PATH)),
            output: args
                .output
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT_PATH)),
            oracle,
            options,
            embedding_cache: args.embedding_cache,
        }
    }
}

/// Builds the remote collaborators for an `enrich` invocation.
pub(crate) trait EnrichServices {
    fn points_source(&self, url: &str) -> Result<Box<dyn PointsSource>, CliError>;
    fn oracle(&self, config: &HttpEmbeddingOracleConfig)
    -> Result<Box<dyn EmbeddingOracle>, CliError>;
}

pub(crate) struct DefaultEnrichServices;

impl EnrichServices for DefaultEnrichServices {
    fn points_source(&self, url: &str) -> Result<Box<dyn PointsSource>, CliError> {
        let source = HttpPointsSource::new(url).map_err(|source| CliError::BuildClient {
            url: url.to_owned(),
            source,
        })?;
        Ok(Box::new(source))
    }

    fn oracle(
        &self,
        config: &HttpEmbeddingOracleConfig,
    ) -> Result<Box<dyn EmbeddingOracle>, CliError> {
        let oracle = HttpEmbeddingOracle::with_config(config.clone()).map_err(|source| {
            CliError::BuildClient {
                url: config.base_url.clone(),
                source,
            }
        })?;
        Ok(Box::new(oracle))
    }
}

pub(crate) fn run_enrich_with(
    args: EnrichArgs,
    services: &dyn EnrichServices,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_enrich_config(args)?;
    let enrichment = execute_enrich(&config, services)?;
    write_enrich_summary(writer, &config.output, &enrichment.report)
}

fn resolve_enrich_config(args: EnrichArgs) -> Result<EnrichConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

fn execute_enrich(
    config: &EnrichConfig,
    services: &dyn EnrichServices,
) -> Result<Enrichment, CliError> {
    let neighbours = config.options.validate()?;
    let taxonomy = load_taxonomy(&config.taxonomy)?;
    let source = services.points_source(&config.points_endpoint)?;
    let table = fetch_or_load_points(&config.points, source.as_ref())?;

    let origin = config.cache_origin();
    let entries = config
        .embedding_cache
        .as_deref()
        .map(|path| read_embedding_cache(path, &origin))
        .transpose()?
        .unwrap_or_default();
    let oracle = services.oracle(&config.oracle)?;
    let memoised = CachingOracle::with_entries(
        RetryingOracle::new(oracle, config.options.retry),
        entries,
    );

    let enrichment = Enricher::new(&taxonomy, &memoised, neighbours).enrich(&table);
    write_enriched(&config.output, &enrichment)?;
    if let Some(path) = config.embedding_cache.as_deref() {
        write_embedding_cache(path, &origin, &memoised.snapshot())?;
    }
    Ok(enrichment)
}

fn write_enrich_summary(
    writer: &mut dyn Write,
    output: &Utf8Path,
    report: &EnrichmentReport,
) -> Result<(), CliError> {
    writeln!(
        writer,
        "enriched {} of {} stops ({} flagged, {} skipped)",
        report.emitted, report.processed, report.flagged, report.skipped
    )
    .map_err(CliError::WriteOutput)?;
    for record in &report.issues {
        writeln!(writer, "  row {}: {}", record.position, record.issue)
            .map_err(CliError::WriteOutput)?;
    }
    writeln!(writer, "wrote {output}").map_err(CliError::WriteOutput)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<EnrichConfig, CliError> {
    let merged = EnrichArgs::merge_from_layers(layers).map_err(CliError::from)?;
    Ok(EnrichConfig::from(merged))
}
