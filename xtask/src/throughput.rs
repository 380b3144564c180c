//! Throughput runner
//!
//! This module provides the `throughput` subcommand. For every structure it
//! times inserting, searching and erasing `count` random values, doubling
//! `count` from 10 up to the configured maximum.

use std::collections::BTreeSet;
use std::fs;
use std::hint::black_box;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use chunkset::prelude::*;
use clap::{Args, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const FIRST_COUNT: usize = 10;
const DEFAULT_MAX_COUNT: usize = 100_000;
const DEFAULT_SEED: u64 = 1;

/// Arguments for the throughput subcommand
#[derive(Args, Debug)]
pub struct ThroughputArgs {
    /// Scenario YAML file path
    #[arg(long, short = 's')]
    pub scenario: Option<PathBuf>,

    /// Restrict the run to these structures (repeatable)
    #[arg(long = "structure", value_enum)]
    pub structures: Vec<StructureKind>,

    /// Largest element count to measure
    #[arg(long)]
    pub max_count: Option<usize>,

    /// Random seed for reproducible inputs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Structures the runner knows how to build
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StructureKind {
    Array,
    SortedArray,
    Chunked,
    Multilevel,
    Balanced,
    StdBtree,
}

impl StructureKind {
    const fn default_title(self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::SortedArray => "sorted array",
            Self::Chunked => "chunked set",
            Self::Multilevel => "multilevel chunked tree",
            Self::Balanced => "balanced tree",
            Self::StdBtree => "std BTreeSet",
        }
    }

    const fn default_bounds(self) -> Option<(usize, usize)> {
        match self {
            Self::Chunked => Some((10_000, 19_999)),
            Self::Multilevel | Self::Balanced => Some((1_000, 1_999)),
            Self::Array | Self::SortedArray | Self::StdBtree => None,
        }
    }

    const fn is_chunked(self) -> bool {
        matches!(self, Self::Chunked | Self::Multilevel | Self::Balanced)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Scenario configuration from YAML
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioConfig {
    name: Option<String>,
    max_count: Option<usize>,
    seed: Option<u64>,
    #[serde(default)]
    structures: Vec<StructureConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StructureConfig {
    kind: StructureKind,
    title: Option<String>,
    min_chunk_size: Option<usize>,
    max_chunk_size: Option<usize>,
}

impl StructureConfig {
    const fn for_kind(kind: StructureKind) -> Self {
        Self {
            kind,
            title: None,
            min_chunk_size: None,
            max_chunk_size: None,
        }
    }
}

/// A structure to measure, with everything resolved
#[derive(Debug, Clone, PartialEq, Eq)]
struct Target {
    kind: StructureKind,
    title: String,
    bounds: Option<ChunkBounds>,
}

impl Target {
    fn from_config(config: &StructureConfig) -> Result<Self> {
        let defaults = config.kind.default_bounds();
        let bounds = if config.kind.is_chunked() {
            let min = config
                .min_chunk_size
                .or(defaults.map(|(min, _)| min))
                .unwrap_or(ChunkBounds::THROUGHPUT.min());
            let max = config
                .max_chunk_size
                .or(defaults.map(|(_, max)| max))
                .unwrap_or(ChunkBounds::THROUGHPUT.max());
            Some(ChunkBounds::new(min, max).with_context(|| {
                format!("Invalid chunk bounds for {:?}", config.kind)
            })?)
        } else {
            if config.min_chunk_size.is_some() || config.max_chunk_size.is_some() {
                bail!("{:?} does not take chunk bounds", config.kind);
            }
            None
        };

        Ok(Self {
            kind: config.kind,
            title: config
                .title
                .clone()
                .unwrap_or_else(|| config.kind.default_title().to_string()),
            bounds,
        })
    }
}

/// Run settings after merging CLI flags over the scenario file
#[derive(Debug)]
struct Plan {
    name: String,
    max_count: usize,
    seed: u64,
    targets: Vec<Target>,
}

impl Plan {
    /// Priority: CLI > Scenario YAML > Default
    fn from_args_and_scenario(args: &ThroughputArgs, scenario: &ScenarioConfig) -> Result<Self> {
        let defaults: Vec<StructureConfig>;
        let configs = if scenario.structures.is_empty() {
            defaults = StructureKind::value_variants()
                .iter()
                .map(|kind| StructureConfig::for_kind(*kind))
                .collect();
            &defaults
        } else {
            &scenario.structures
        };

        let targets = configs
            .iter()
            .filter(|config| args.structures.is_empty() || args.structures.contains(&config.kind))
            .map(Target::from_config)
            .collect::<Result<Vec<_>>>()?;
        if targets.is_empty() {
            bail!("No structures left to measure after applying --structure filters");
        }

        let max_count = args
            .max_count
            .or(scenario.max_count)
            .unwrap_or(DEFAULT_MAX_COUNT);
        if max_count < FIRST_COUNT {
            bail!("max-count must be at least {FIRST_COUNT}, got {max_count}");
        }

        Ok(Self {
            name: scenario
                .name
                .clone()
                .unwrap_or_else(|| "default".to_string()),
            max_count,
            seed: args.seed.or(scenario.seed).unwrap_or(DEFAULT_SEED),
            targets,
        })
    }

    fn counts(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(Some(FIRST_COUNT), |count| count.checked_mul(2))
            .take_while(|count| *count <= self.max_count)
    }
}

/// Timings for one element count, in microseconds per operation
#[derive(Debug, Clone, Serialize)]
struct Sample {
    count: usize,
    insert_us: f64,
    search_us: f64,
    erase_us: f64,
}

#[derive(Debug, Serialize)]
struct StructureReport {
    title: String,
    kind: StructureKind,
    min_chunk_size: Option<usize>,
    max_chunk_size: Option<usize>,
    samples: Vec<Sample>,
}

#[derive(Debug, Serialize)]
struct Report {
    scenario: String,
    seed: u64,
    structures: Vec<StructureReport>,
}

/// Main entry point for the throughput command
pub fn run(args: &ThroughputArgs) -> Result<()> {
    let scenario = match &args.scenario {
        Some(path) => load_scenario(path)?,
        None => ScenarioConfig::default(),
    };
    let plan = Plan::from_args_and_scenario(args, &scenario)?;
    tracing::info!(
        scenario = %plan.name,
        seed = plan.seed,
        max_count = plan.max_count,
        structures = plan.targets.len(),
        "starting throughput run"
    );

    let mut report = Report {
        scenario: plan.name.clone(),
        seed: plan.seed,
        structures: Vec::with_capacity(plan.targets.len()),
    };
    for target in &plan.targets {
        if args.format == ReportFormat::Text {
            print_header(target);
        }
        let mut samples = Vec::new();
        for count in plan.counts() {
            let values = generate_values(plan.seed, count);
            let sample = measure_target(target, &values);
            tracing::debug!(structure = %target.title, count, "measured");
            if args.format == ReportFormat::Text {
                println!(
                    "{}\t{:.4}\t{:.4}\t{:.4}",
                    sample.count, sample.insert_us, sample.search_us, sample.erase_us
                );
            }
            samples.push(sample);
        }
        tracing::info!(structure = %target.title, "finished");
        report.structures.push(StructureReport {
            title: target.title.clone(),
            kind: target.kind,
            min_chunk_size: target.bounds.map(ChunkBounds::min),
            max_chunk_size: target.bounds.map(ChunkBounds::max),
            samples,
        });
    }

    if args.format == ReportFormat::Json {
        let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
        println!("{json}");
    }
    Ok(())
}

fn load_scenario(path: &Path) -> Result<ScenarioConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
    parse_scenario(&content)
}

fn parse_scenario(content: &str) -> Result<ScenarioConfig> {
    serde_yaml::from_str(content).context("Failed to parse scenario YAML")
}

fn print_header(target: &Target) {
    println!("----");
    match target.bounds {
        Some(bounds) => println!("{} {bounds}", target.title),
        None => println!("{}", target.title),
    }
    println!("\tinserting(us)\tsearching(us)\terasing(us)");
}

/// Every count starts from the same seed, so smaller inputs are prefixes of
/// larger ones.
fn generate_values(seed: u64, count: usize) -> Vec<i32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| rng.random_range(0..=i32::MAX)).collect()
}

fn measure_target(target: &Target, values: &[i32]) -> Sample {
    let bounds = target.bounds.unwrap_or_default();
    match target.kind {
        StructureKind::Array => measure(ArraySet::new(), values),
        StructureKind::SortedArray => measure(SortedArraySet::new(), values),
        StructureKind::Chunked => measure(ChunkedSet::with_bounds(bounds), values),
        StructureKind::Multilevel => measure(MultilevelChunkedTree::with_bounds(bounds), values),
        StructureKind::Balanced => measure(BalancedTree::with_bounds(bounds), values),
        StructureKind::StdBtree => measure(BTreeSet::new(), values),
    }
}

/// Inserts and erases the value rounded down to even, searches the raw value,
/// so roughly half the searches miss.
fn measure<S: OrderedSet<i32>>(mut set: S, values: &[i32]) -> Sample {
    let per_operation = |start: Instant| start.elapsed().as_secs_f64() * 1e6 / values.len() as f64;

    let start = Instant::now();
    for value in values {
        set.insert(value / 2 * 2);
    }
    let insert_us = per_operation(start);

    let start = Instant::now();
    for value in values {
        black_box(set.contains(black_box(value)));
    }
    let search_us = per_operation(start);

    let start = Instant::now();
    for value in values {
        set.erase(&(value / 2 * 2));
    }
    let erase_us = per_operation(start);

    Sample {
        count: values.len(),
        insert_us,
        search_us,
        erase_us,
    }
}
