//! Command implementations. Setup problems surface as `anyhow` errors before
//! any stage touches the store.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use nl2graph_core::config::DatasetConfig;
use nl2graph_core::errors::ConfigError;
use nl2graph_core::traits::storage::{IResultStore, ISourceStore};
use nl2graph_core::{Method, Nl2GraphConfig, Record, RecordFilter, RunConfig, Schema, Stage};
use nl2graph_pipeline::{
    Orchestrator, PipelineSettings, ProgressEvent, ProgressFn, Reporting, WorkerPool,
};
use nl2graph_storage::{ResultStorageEngine, SourceStorageEngine};
use tracing::info;

use crate::collaborators;
use crate::{LsTarget, ReportFormat, RunArgs, StageArgs};

pub struct Context {
    pub config: Nl2GraphConfig,
}

impl Context {
    pub fn load(path: &Path) -> Result<Self> {
        let config = Nl2GraphConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?;
        Ok(Self { config })
    }

    fn dataset(&self, name: &str) -> Result<&DatasetConfig> {
        Ok(self.config.dataset(name)?)
    }

    fn src_path(&self, name: &str) -> Result<PathBuf> {
        self.dataset(name)?
            .src
            .clone()
            .ok_or_else(|| ConfigError::MissingKey(format!("datasets.{name}.src")).into())
    }

    fn dst_path(&self, name: &str) -> Result<PathBuf> {
        self.dataset(name)?
            .dst
            .clone()
            .ok_or_else(|| ConfigError::MissingKey(format!("datasets.{name}.dst")).into())
    }

    fn open_source(&self, name: &str) -> Result<SourceStorageEngine> {
        let path = self.src_path(name)?;
        if !path.exists() {
            bail!(
                "source store {} not found; run `nl2graph init {name}` first",
                path.display()
            );
        }
        Ok(SourceStorageEngine::open(&path, &self.config.storage)?)
    }

    /// Only generation may start a result store; every later command needs
    /// one that already exists.
    fn open_results(&self, name: &str, create: bool) -> Result<ResultStorageEngine> {
        let path = self.dst_path(name)?;
        if !create && !path.exists() {
            bail!(
                "result store {} not found; run `nl2graph generate {name}` first",
                path.display()
            );
        }
        Ok(ResultStorageEngine::open(&path, &self.config.storage)?)
    }

    /// Recreate the source store from the dataset's JSON file and start an
    /// empty result store, since old rows key on the old record ids.
    pub fn init(&self, name: &str) -> Result<()> {
        let dataset = self.dataset(name)?;
        let data = dataset
            .data
            .clone()
            .ok_or_else(|| ConfigError::MissingKey(format!("datasets.{name}.data")))?;
        let src = self.src_path(name)?;
        let dst = self.dst_path(name)?;

        for path in [&src, &dst] {
            remove_database(path)?;
        }

        let store = SourceStorageEngine::open(&src, &self.config.storage)?;
        let count = store.init_from_json(&data)?;
        info!(dataset = name, count, "source store initialized");
        println!("Loaded {count} records into {}", src.display());

        ResultStorageEngine::open(&dst, &self.config.storage)?;
        println!("Created empty result store {}", dst.display());
        Ok(())
    }

    pub fn run_stage(&self, stage: Stage, args: &StageArgs) -> Result<()> {
        let run = run_config(&args.run);
        let dataset = self.dataset(&args.run.dataset)?;
        let settings = self.settings(&run, args);
        // Reject bad settings before the result store file is created.
        WorkerPool::new(settings.workers)?;

        let collaborators = match stage {
            Stage::Gen => collaborators::for_generation(&self.config, &run)?,
            Stage::Exec => collaborators::for_execution(dataset, &run)?,
            Stage::Eval => Default::default(),
        };
        let schema = match stage {
            Stage::Gen => self.schema(dataset, &run)?,
            _ => None,
        };

        let records = self.records(&args.run)?;
        let store = Arc::new(self.open_results(&args.run.dataset, stage == Stage::Gen)?);
        let orch = Orchestrator::new(store, run, &settings, collaborators)?
            .with_schema(schema)
            .with_progress(progress_printer());

        println!("{} {} records...", stage.label(), records.len());
        let report = match stage {
            Stage::Gen => orch.generate(&records)?,
            Stage::Exec => orch.execute(&records)?,
            Stage::Eval => orch.evaluate(&records)?,
        };
        println!(
            "Processed {} ({} succeeded, {} failed).",
            report.processed, report.succeeded, report.failed
        );
        Ok(())
    }

    fn settings(&self, run: &RunConfig, args: &StageArgs) -> PipelineSettings {
        let pipeline = &self.config.pipeline;
        let mut settings = PipelineSettings::from_config(pipeline);
        if let Some(workers) = args.workers {
            settings.workers = workers;
        }
        if let Some(if_exists) = args.if_exists {
            settings.if_exists = if_exists;
        }
        // LLM output usually wraps the query in a code fence.
        settings.extract_query = pipeline.extract_query.unwrap_or(run.method == Method::Llm);
        settings
    }

    /// LLM prompts need the graph schema; seq2seq models were trained without it.
    fn schema(&self, dataset: &DatasetConfig, run: &RunConfig) -> Result<Option<Schema>> {
        if run.method != Method::Llm {
            return Ok(None);
        }
        let path = dataset.schema.get(&run.lang).ok_or_else(|| {
            ConfigError::MissingKey(format!("schema for query language '{}'", run.lang))
        })?;
        Ok(Some(Schema::load(&run.lang, path)?))
    }

    fn records(&self, args: &RunArgs) -> Result<Vec<Record>> {
        let src = self.open_source(&args.dataset)?;
        let filter = RecordFilter::from_hop_split(args.hop, args.split.as_deref());
        let records = if filter.is_empty() {
            src.iter_all()?
        } else {
            src.iter_by_filter(&filter)?
        };
        Ok(records)
    }

    pub fn clear(&self, args: &RunArgs, stage: Stage) -> Result<()> {
        let run = run_config(args);
        let store = self.open_results(&args.dataset, false)?;
        let cleared = store.clear_stage(&run, stage)?;
        let fields: Vec<&str> = stage.cascade().iter().map(Stage::as_str).collect();
        println!("Clearing {} for {run}", fields.join(", "));
        println!("Cleared {cleared} rows.");
        Ok(())
    }

    pub fn export(&self, name: &str, output: &Path) -> Result<()> {
        let store = self.open_results(name, false)?;
        let count = store.export(output)?;
        println!("Exported {count} rows to {}", output.display());
        Ok(())
    }

    pub fn ls(&self, target: LsTarget) -> Result<()> {
        for line in self.listing(target)? {
            println!("{line}");
        }
        Ok(())
    }

    fn listing(&self, target: LsTarget) -> Result<Vec<String>> {
        let mut lines = Vec::new();
        match target {
            LsTarget::Datasets => {
                lines.push("Datasets:".to_string());
                for (name, dataset) in &self.config.datasets {
                    lines.push(format!("  {name}"));
                    for (key, path) in [("src", &dataset.src), ("dst", &dataset.dst)] {
                        let shown = path
                            .as_deref()
                            .map_or_else(|| "N/A".into(), |p| p.display().to_string());
                        lines.push(format!("    {key}: {shown}"));
                    }
                }
            }
            LsTarget::Templates => {
                lines.push("Templates:".to_string());
                match &self.config.llm.templates {
                    Some(dir) => {
                        let entries = std::fs::read_dir(dir)
                            .with_context(|| format!("reading templates in {}", dir.display()))?;
                        let mut names = Vec::new();
                        for entry in entries {
                            let path = entry?.path();
                            if path.extension().is_some_and(|ext| ext == "j2") {
                                if let Some(stem) = path.file_stem() {
                                    names.push(stem.to_string_lossy().into_owned());
                                }
                            }
                        }
                        names.sort();
                        lines.extend(names.into_iter().map(|n| format!("  - {n}")));
                    }
                    None => lines.push("  (built-in template for every language)".to_string()),
                }
            }
            LsTarget::Models => {
                lines.push("LLM providers:".to_string());
                for (name, provider) in &self.config.llm.providers {
                    lines.push(format!("  {name}: {}", provider.base_url));
                    for prefix in &provider.model_prefixes {
                        lines.push(format!("    - {prefix}*"));
                    }
                }
                lines.push("Seq2seq models:".to_string());
                for (name, model) in &self.config.seq2seq.models {
                    lines.push(format!("  {name}: {}", model.endpoint));
                }
            }
        }
        Ok(lines)
    }

    pub fn report(&self, args: &RunArgs, format: ReportFormat, output: Option<&Path>) -> Result<()> {
        let run = run_config(args);
        let dataset = self.dataset(&args.dataset)?;
        let records = self.records(args)?;
        let store = self.open_results(&args.dataset, false)?;

        let mut pairs = Vec::with_capacity(records.len());
        for record in records {
            if let Some(row) = store.get(&run.key_for(&record.id))? {
                pairs.push((record, row));
            }
        }
        if pairs.is_empty() {
            bail!("no results for {run} in dataset '{}'", args.dataset);
        }

        let run_id = format!("{}-{}-{}-{}", args.dataset, run.method, run.lang, run.model);
        let report = Reporting.generate(&pairs, &run_id, &dataset.group_by);
        let rendered = match format {
            ReportFormat::Markdown => report.to_markdown(),
            ReportFormat::Json => report.to_json()?,
        };

        match output {
            Some(path) => {
                std::fs::write(path, rendered)
                    .with_context(|| format!("writing report to {}", path.display()))?;
                println!("Report written to {}", path.display());
            }
            None => println!("{rendered}"),
        }
        Ok(())
    }
}

fn run_config(args: &RunArgs) -> RunConfig {
    RunConfig::new(args.method, args.lang.clone(), args.model.clone())
}

/// Remove a SQLite file and its WAL sidecars if present.
fn remove_database(path: &Path) -> Result<()> {
    let mut candidates = vec![path.to_path_buf()];
    for suffix in ["-wal", "-shm"] {
        let mut name = path.as_os_str().to_owned();
        name.push(suffix);
        candidates.push(PathBuf::from(name));
    }
    for candidate in candidates {
        if candidate.exists() {
            std::fs::remove_file(&candidate)
                .with_context(|| format!("removing {}", candidate.display()))?;
        }
    }
    Ok(())
}

fn progress_printer() -> ProgressFn {
    Arc::new(|e: ProgressEvent| {
        // Printed before dispatch so the counts survive an aborted run.
        if e.is_planned() {
            println!(
                "Skipped {} existing, {} missing prerequisite.",
                e.skipped_existing, e.missing_prerequisite
            );
            return;
        }
        let mut err = std::io::stderr().lock();
        let _ = write!(err, "\r{} {}/{}", e.stage.label(), e.done, e.total);
        if e.done == e.total {
            let _ = writeln!(err);
        }
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use nl2graph_core::IfExists;
    use tempfile::TempDir;

    fn stage_args(method: Method, workers: Option<usize>) -> StageArgs {
        StageArgs {
            run: RunArgs {
                dataset: "movies".into(),
                method,
                model: "m".into(),
                lang: "cypher".into(),
                hop: None,
                split: None,
            },
            workers,
            if_exists: Some(IfExists::Override),
        }
    }

    fn context(toml: &str) -> Context {
        Context {
            config: Nl2GraphConfig::from_toml(toml).unwrap(),
        }
    }

    #[test]
    fn flags_override_pipeline_config() {
        let ctx = context("[pipeline]\nworkers = 2\n");
        let args = stage_args(Method::Llm, Some(6));
        let settings = ctx.settings(&run_config(&args.run), &args);
        assert_eq!(settings.workers, 6);
        assert_eq!(settings.if_exists, IfExists::Override);
        assert!(settings.extract_query);

        let args = stage_args(Method::Seq2seq, None);
        let settings = ctx.settings(&run_config(&args.run), &args);
        assert_eq!(settings.workers, 2);
        assert!(!settings.extract_query);
    }

    /// An initialized dataset with a cypher endpoint that is never contacted.
    fn initialized(dir: &TempDir) -> (Context, PathBuf) {
        let data = dir.path().join("data.json");
        std::fs::write(
            &data,
            r#"[{"id": 1, "question": "q?", "answer": ["a"], "hop": 1}]"#,
        )
        .unwrap();
        let dst = dir.path().join("dst.db");
        let toml = format!(
            "[datasets.movies]\ndata = {:?}\nsrc = {:?}\ndst = {:?}\n\n\
             [datasets.movies.endpoints.cypher]\nurl = \"http://127.0.0.1:9\"\n",
            data,
            dir.path().join("src.db"),
            dst,
        );
        let ctx = context(&toml);
        ctx.init("movies").unwrap();
        (ctx, dst)
    }

    #[test]
    fn init_then_report_requires_results() {
        let dir = TempDir::new().unwrap();
        let (ctx, dst) = initialized(&dir);
        assert!(dst.exists());

        let args = stage_args(Method::Llm, None);
        assert_eq!(ctx.records(&args.run).unwrap().len(), 1);
        let err = ctx
            .report(&args.run, ReportFormat::Json, None)
            .unwrap_err()
            .to_string();
        assert!(err.contains("no results"));
    }

    #[test]
    fn missing_source_store_is_a_setup_error() {
        let dir = TempDir::new().unwrap();
        let toml = format!("[datasets.movies]\nsrc = {:?}\n", dir.path().join("absent.db"));
        let err = context(&toml)
            .records(&stage_args(Method::Llm, None).run)
            .unwrap_err()
            .to_string();
        assert!(err.contains("nl2graph init movies"));
    }

    #[test]
    fn later_stages_do_not_create_a_missing_result_store() {
        let dir = TempDir::new().unwrap();
        let (ctx, dst) = initialized(&dir);
        remove_database(&dst).unwrap();

        let args = stage_args(Method::Seq2seq, Some(1));
        for stage in [Stage::Exec, Stage::Eval] {
            let err = ctx.run_stage(stage, &args).unwrap_err().to_string();
            assert!(err.contains("nl2graph generate movies"), "{err}");
        }
        let err = ctx.clear(&args.run, Stage::Exec).unwrap_err().to_string();
        assert!(err.contains("not found"), "{err}");
        let err = ctx
            .export("movies", &dir.path().join("out.json"))
            .unwrap_err()
            .to_string();
        assert!(err.contains("not found"), "{err}");
        let err = ctx
            .report(&args.run, ReportFormat::Markdown, None)
            .unwrap_err()
            .to_string();
        assert!(err.contains("not found"), "{err}");

        assert!(!dst.exists());
        assert!(!dir.path().join("out.json").exists());
    }

    #[test]
    fn result_store_path_is_required() {
        let dir = TempDir::new().unwrap();
        let toml = format!("[datasets.movies]\nsrc = {:?}\n", dir.path().join("src.db"));
        let ctx = context(&toml);
        let err = ctx.export("movies", &dir.path().join("out.json")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingKey(key)) if key == "datasets.movies.dst"
        ));
    }

    #[test]
    fn ls_lists_datasets_and_models() {
        let ctx = context(
            r#"
            [datasets.movies]
            src = "db/movies_src.db"

            [llm.providers.openai]
            base_url = "https://api.openai.com/v1"
            model_prefixes = ["gpt"]

            [seq2seq.models.t5-base]
            endpoint = "http://localhost:8000/generate"
            "#,
        );
        let datasets = ctx.listing(LsTarget::Datasets).unwrap();
        assert_eq!(
            datasets,
            vec!["Datasets:", "  movies", "    src: db/movies_src.db", "    dst: N/A"]
        );

        let models = ctx.listing(LsTarget::Models).unwrap();
        assert!(models.contains(&"    - gpt*".to_string()));
        assert!(models.contains(&"  t5-base: http://localhost:8000/generate".to_string()));

        let templates = ctx.listing(LsTarget::Templates).unwrap();
        assert_eq!(templates.len(), 2);
    }

    #[test]
    fn ls_lists_template_files_by_language() {
        let dir = TempDir::new().unwrap();
        for name in ["sparql.j2", "cypher.j2", "notes.txt"] {
            std::fs::write(dir.path().join(name), "{{ question }}").unwrap();
        }
        let ctx = context(&format!("[llm]\ntemplates = {:?}\n", dir.path()));
        assert_eq!(
            ctx.listing(LsTarget::Templates).unwrap(),
            vec!["Templates:", "  - cypher", "  - sparql"]
        );
    }
}
