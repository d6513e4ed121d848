mod display;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use clausewise_analysis::{AnalysisConfig, AnalysisRequest, Analyzer, DEFAULT_TOP_N};
use clausewise_core::{ContractType, Language, UserProfile};
use clausewise_llm::{DEFAULT_MODEL, DEFAULT_TIMEOUT_MS, HttpLlmClient, LlmClient, ReplayClient};
use clausewise_output::OutputPipeline;
use clausewise_rules::{
    ClauseSegmenter, RuleCatalog, RuleEngine, SegmenterConfig, mask_pii, normalize,
};
use tracing_subscriber::EnvFilter;

/// Flag contract clauses worth a second look before signing.
#[derive(Parser, Debug)]
#[command(name = "clausewise", version, about)]
struct Cli {
    /// Rule catalog YAML file. Uses the built-in catalog when unset.
    #[arg(long, global = true, env = "CLAUSEWISE_RULES")]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarise the rule catalog.
    Rules,

    /// Segment a contract and show clause scores and the selection.
    Segment {
        /// Plain-text contract.
        file: PathBuf,

        #[command(flatten)]
        request: RequestArgs,
    },

    /// Run a saved raw model response through the repair pipeline.
    Repair {
        /// Raw model output.
        file: PathBuf,

        #[arg(long, default_value = "ko-KR")]
        language: Language,

        /// Print the repaired JSON instead of the report card.
        #[arg(long)]
        json: bool,
    },

    /// Analyse a contract end to end.
    Analyze {
        /// Plain-text contract.
        file: PathBuf,

        #[command(flatten)]
        request: RequestArgs,

        /// Replay this saved model response instead of calling the LLM.
        #[arg(long)]
        response: Option<PathBuf>,

        #[command(flatten)]
        llm: LlmArgs,

        /// Print the analysis record as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct RequestArgs {
    #[arg(long, default_value = "OTHER")]
    contract_type: ContractType,

    #[arg(long, default_value = "GENERAL_CONSUMER")]
    user_profile: UserProfile,

    #[arg(long, default_value = "ko-KR")]
    language: Language,

    /// Most clauses sent to the model.
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top_n: usize,
}

#[derive(Args, Debug)]
struct LlmArgs {
    /// Base URL of an OpenAI-compatible API.
    #[arg(long, env = "CLAUSEWISE_LLM_URL", default_value = "https://api.openai.com")]
    llm_url: String,

    #[arg(long, env = "CLAUSEWISE_LLM_API_KEY", hide_env_values = true)]
    llm_api_key: Option<String>,

    #[arg(long, env = "CLAUSEWISE_LLM_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    #[arg(long, env = "CLAUSEWISE_LLM_TIMEOUT_MS", default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("clausewise v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Rules => {
            let catalog = load_catalog(cli.rules.as_deref())?;
            display::print_catalog(&catalog);
        }
        Command::Segment { file, request } => {
            let catalog = load_catalog(cli.rules.as_deref())?;
            let text = read_text(&file)?;
            let text = mask_pii(&normalize(&text));

            let segmenter = ClauseSegmenter::new(SegmenterConfig {
                language: request.language,
                ..SegmenterConfig::default()
            });
            let (candidates, mode) = segmenter.segment_with_mode(&text);
            let engine = RuleEngine::new(Arc::new(catalog));
            let run = engine.run_rules(&text, request.contract_type, candidates);
            let selected =
                engine.select_top_candidates(&run.candidates, request.top_n, request.contract_type);
            display::print_segmentation(&run, &selected, mode);
        }
        Command::Repair {
            file,
            language,
            json,
        } => {
            let raw = read_text(&file)?;
            let output = OutputPipeline::new(language)
                .process(&raw, &[])
                .with_context(|| format!("repairing {}", file.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&output.json)?);
            } else {
                if !output.violations.is_empty() {
                    eprintln!("  {} schema violation(s) sanitized", output.violations.len());
                }
                display::print_report(&output.report);
            }
        }
        Command::Analyze {
            file,
            request,
            response,
            llm,
            json,
        } => {
            let catalog = load_catalog(cli.rules.as_deref())?;
            let text = read_text(&file)?;

            let config = AnalysisConfig {
                top_n: request.top_n,
                language: request.language,
                model: llm.model.clone(),
                ..AnalysisConfig::default()
            };
            let analyzer = Analyzer::new(Arc::new(catalog), config);
            let client = build_client(response.as_deref(), &llm)?;

            let req = AnalysisRequest::new(text, request.contract_type)
                .with_user_profile(request.user_profile)
                .with_language(request.language);
            let record = analyzer.analyze(&req, client.as_ref()).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                display::print_record(&record);
            }
            if let Some(code) = record.error_code {
                bail!(
                    "analysis failed: {code}: {}",
                    record.error_message.as_deref().unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}

fn load_catalog(path: Option<&Path>) -> Result<RuleCatalog> {
    match path {
        Some(path) => RuleCatalog::load(path)
            .with_context(|| format!("loading rule catalog {}", path.display())),
        None => RuleCatalog::builtin().context("loading built-in rule catalog"),
    }
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn build_client(response: Option<&Path>, llm: &LlmArgs) -> Result<Box<dyn LlmClient>> {
    if let Some(path) = response {
        let content = read_text(path)?;
        return Ok(Box::new(ReplayClient::new(content)));
    }
    if llm.llm_api_key.is_none() {
        tracing::warn!("CLAUSEWISE_LLM_API_KEY is not set; calling the LLM without auth");
    }
    let client = HttpLlmClient::new(
        llm.llm_url.clone(),
        llm.llm_api_key.clone(),
        Duration::from_millis(llm.timeout_ms),
    )
    .context("building LLM client")?;
    Ok(Box::new(client))
}
