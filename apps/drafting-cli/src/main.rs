//! Drafting CLI
//!
//! Drives the template resolution and drafting pipeline from the command line
//! against a file-backed template store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use drafting_core::{
    retarget_signature_lines, seed_store, Answers, DraftingError, DraftingPipeline, FileStore,
    LlmDocumentAnalyzer, PipelineConfig, Resolution, SearchError, TemplateId, TemplateStore,
    WebDocument, WebSearch, DEFAULT_SIGNATURE_KEYS,
};
use oracle_client::{ExaSearch, GeminiClient, OracleConfig, SearchConfig};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "drafting-cli")]
#[command(version, about = "Resolve, fill and render legal document templates")]
struct Args {
    /// Template store file
    #[arg(long, global = true, default_value = "templates.json")]
    store: PathBuf,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert the built-in starter templates
    Seed,

    /// List stored templates
    List,

    /// Turn a UTF-8 text document into a template
    Ingest {
        file: PathBuf,

        /// Template title (defaults to the file name)
        #[arg(long)]
        title: Option<String>,
    },

    /// Resolve a request to a template and show what is still missing
    Draft {
        query: String,

        /// Ask each missing question on stdin and render the result
        #[arg(short, long)]
        interactive: bool,

        /// Minimum selector confidence for reusing a stored template
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Render a template from answer files
    Render {
        #[arg(long)]
        template_id: TemplateId,

        /// JSON object of key to value
        #[arg(long)]
        answers: PathBuf,

        /// JSON object of prefilled values
        #[arg(long)]
        prefilled: Option<PathBuf>,
    },

    /// Rewrite `Name: <example>` signature lines to placeholders
    RetargetSignatures {
        /// Variable keys to retarget
        #[arg(long = "key")]
        keys: Vec<String>,
    },
}

/// Stand-in used when no search API key is configured
struct DisabledSearch;

#[async_trait]
impl WebSearch for DisabledSearch {
    async fn search(&self, _query: &str) -> Result<Option<WebDocument>, SearchError> {
        Err(SearchError::Transport("web search is not configured (EXA_API_KEY)".to_string()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let store = Arc::new(FileStore::open(&args.store).await?);

    match args.command {
        Command::Seed => {
            let gemini = gemini_client()?;
            let inserted = seed_store(store.as_ref(), gemini.as_ref())
                .await
                .map_err(describe)?;
            println!("Seeded {} template(s)", inserted);
        }
        Command::List => {
            let templates = store.list().await?;
            if templates.is_empty() {
                println!("No templates in {}", store.path().display());
            }
            for template in templates {
                println!(
                    "{}\t{}\t{} variable(s)\t[{}]",
                    template.id,
                    template.title,
                    template.variables.len(),
                    template.tags.join(", ")
                );
            }
        }
        Command::Ingest { file, title } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("reading {} as UTF-8 text", file.display()))?;
            let title = title.unwrap_or_else(|| file_title(&file));
            let pipeline = build_pipeline(store, PipelineConfig::default())?;
            let outcome = pipeline.ingest(&title, &text).await.map_err(describe)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Draft {
            query,
            interactive,
            threshold,
        } => {
            let mut config = PipelineConfig::default();
            if let Some(threshold) = threshold {
                config = config.with_confidence_threshold(threshold);
            }
            let pipeline = build_pipeline(store, config)?;
            let resolution = pipeline.resolve_template(&query).await.map_err(describe)?;

            if interactive {
                let answers = ask_missing(&resolution).await?;
                let rendered = pipeline
                    .render(resolution.template.id, &answers, &resolution.prefilled)
                    .await
                    .map_err(describe)?;
                println!("{}", rendered.output_text);
            } else {
                println!("{}", serde_json::to_string_pretty(&summary(&resolution))?);
            }
        }
        Command::Render {
            template_id,
            answers,
            prefilled,
        } => {
            let answers = read_answers(&answers).await?;
            let prefilled = match prefilled {
                Some(path) => read_answers(&path).await?,
                None => Answers::new(),
            };
            let template = store
                .find(template_id)
                .await?
                .ok_or_else(|| describe(DraftingError::TemplateNotFound(template_id)))?;
            let rendered = drafting_core::render::render_template(&template, &answers, &prefilled)
                .map_err(describe)?;
            println!("{}", rendered.output_text);
        }
        Command::RetargetSignatures { keys } => {
            let keys: Vec<&str> = if keys.is_empty() {
                DEFAULT_SIGNATURE_KEYS.to_vec()
            } else {
                keys.iter().map(String::as_str).collect()
            };
            let report = retarget_signature_lines(store.as_ref(), &keys)
                .await
                .map_err(describe)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn gemini_client() -> Result<Arc<GeminiClient>> {
    let config = OracleConfig::from_env()?;
    Ok(Arc::new(GeminiClient::new(config)?))
}

fn build_pipeline(store: Arc<FileStore>, config: PipelineConfig) -> Result<DraftingPipeline> {
    let gemini = gemini_client()?;

    let search: Arc<dyn WebSearch> = match SearchConfig::from_env() {
        Ok(search_config) => Arc::new(ExaSearch::new(search_config)?),
        Err(e) => {
            tracing::warn!("Web search disabled: {}", e);
            Arc::new(DisabledSearch)
        }
    };

    Ok(DraftingPipeline::new(
        store,
        gemini.clone(),
        gemini.clone(),
        search,
        Arc::new(LlmDocumentAnalyzer::new(gemini)),
    )
    .with_config(config))
}

/// Pipeline error with its machine-readable code
fn describe(err: DraftingError) -> anyhow::Error {
    anyhow!("{} [{} / {}]", err, err.code(), err.status_code())
}

fn file_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Untitled".to_string())
}

async fn read_answers(path: &Path) -> Result<Answers> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("{} must be a JSON object of strings", path.display()))
}

fn summary(resolution: &Resolution) -> serde_json::Value {
    json!({
        "template_id": resolution.template.id,
        "title": resolution.template.title,
        "confidence": resolution.confidence,
        "reason": resolution.reason,
        "newly_synthesized": resolution.newly_synthesized,
        "prefilled": resolution.prefilled,
        "missing_keys": resolution.missing_keys,
        "missing_questions": resolution.missing_questions,
    })
}

/// Ask every missing question on stdin; blank answers are skipped
async fn ask_missing(resolution: &Resolution) -> Result<Answers> {
    let mut answers = Answers::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    for key in &resolution.missing_keys {
        let question = resolution
            .missing_questions
            .get(key)
            .cloned()
            .unwrap_or_else(|| format!("Value for {}?", key));
        eprintln!("{}", question);

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let answer = line.trim();
        if !answer.is_empty() {
            answers.insert(key.clone(), answer.to_string());
        }
    }

    Ok(answers)
}
