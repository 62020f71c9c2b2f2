//! `nl2graph`: run NL-to-graph-query experiments stage by stage.

mod collaborators;
mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use nl2graph_core::{IfExists, Method, Stage};

#[derive(Parser)]
#[command(name = "nl2graph")]
#[command(version, about = "Generate, execute and evaluate graph queries from natural language")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, short, global = true, env = "NL2GRAPH_CONFIG", default_value = "nl2graph.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a dataset's JSON records into a fresh source store
    Init {
        /// Dataset name from the config
        dataset: String,
    },
    /// Produce candidate queries from questions
    Generate(StageArgs),
    /// Run generated queries against the graph endpoint
    Execute(StageArgs),
    /// Score execution results against gold answers
    Evaluate(StageArgs),
    /// Clear a stage (and every stage after it) for one run configuration
    Clear {
        #[command(flatten)]
        run: RunArgs,

        /// First stage to clear
        #[arg(long)]
        stage: Stage,
    },
    /// Write every stored result row to a JSON file
    Export {
        dataset: String,

        #[arg(long, short)]
        output: PathBuf,
    },
    /// Summarize evaluated results for one run configuration
    Report {
        #[command(flatten)]
        run: RunArgs,

        #[arg(long, value_enum, default_value_t = ReportFormat::Markdown)]
        format: ReportFormat,

        /// Write the report here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// List configured datasets, prompt templates or models
    Ls {
        #[arg(value_enum)]
        what: LsTarget,
    },
}

/// Dataset, run configuration and record filters.
#[derive(Args, Clone, Debug)]
pub struct RunArgs {
    /// Dataset name from the config
    pub dataset: String,

    /// Generation method: llm or seq2seq
    #[arg(long, short)]
    pub method: Method,

    /// Model name
    #[arg(long)]
    pub model: String,

    /// Query language, e.g. cypher or sparql
    #[arg(long, short)]
    pub lang: String,

    /// Only records with this hop count
    #[arg(long)]
    pub hop: Option<i64>,

    /// Only records from this split
    #[arg(long)]
    pub split: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct StageArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Number of parallel workers (overrides [pipeline] workers)
    #[arg(long, short)]
    pub workers: Option<usize>,

    /// What to do with records that already have this stage: skip or override
    #[arg(long)]
    pub if_exists: Option<IfExists>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LsTarget {
    Datasets,
    Templates,
    Models,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Markdown,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = commands::Context::load(&cli.config)?;
    nl2graph_core::tracing::init_tracing(&ctx.config.log);

    match cli.command {
        Command::Init { dataset } => ctx.init(&dataset),
        Command::Generate(args) => ctx.run_stage(Stage::Gen, &args),
        Command::Execute(args) => ctx.run_stage(Stage::Exec, &args),
        Command::Evaluate(args) => ctx.run_stage(Stage::Eval, &args),
        Command::Clear { run, stage } => ctx.clear(&run, stage),
        Command::Export { dataset, output } => ctx.export(&dataset, &output),
        Command::Report {
            run,
            format,
            output,
        } => ctx.report(&run, format, output.as_deref()),
        Command::Ls { what } => ctx.ls(what),
    }
}
