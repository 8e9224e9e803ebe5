use std::fs;
use std::path::PathBuf;

use adboard::chat::{ChatOrchestrator, HandleOutcome, IntentExtractor};
use adboard::cli::{build_runner, load_config, pipeline_summaries, ConsoleProgress, ConsoleSink};
use adboard::config::{build_llm_client, EnvConfig};
use adboard::utils::LoggingConfig;
use adboard::{CampaignRequest, PipelineRunResult, Tone};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "adboard", version, about = "Ad campaign pipeline runner", author)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List registered pipelines and their steps
    Pipelines {
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Run one pipeline and print the result as JSON
    Run {
        #[arg(long)]
        product: String,
        #[arg(long, default_value = "general")]
        industry: String,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        duration: Option<u32>,
        #[arg(long)]
        tone: Option<String>,
        #[arg(long = "output-type")]
        output_type: Option<String>,
        /// Activate a substitution condition, e.g. `sample_media`
        #[arg(long = "condition")]
        conditions: Vec<String>,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
    /// Console chat session
    Chat {
        #[arg(long, default_value = "console")]
        sender: String,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    LoggingConfig::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Pipelines { config } => handle_pipelines(config)?,
        Command::Run {
            product,
            industry,
            city,
            duration,
            tone,
            output_type,
            conditions,
            config,
            output,
            pretty,
        } => {
            let args = RunArgs {
                product,
                industry,
                city,
                duration,
                tone,
                output_type,
            };
            handle_run(args, conditions, config, output, pretty).await?
        }
        Command::Chat { sender, config } => handle_chat(sender, config).await?,
    }
    Ok(())
}

struct RunArgs {
    product: String,
    industry: String,
    city: Option<String>,
    duration: Option<u32>,
    tone: Option<String>,
    output_type: Option<String>,
}

fn handle_pipelines(config: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(config.as_deref())?;
    let runner = build_runner(&config)?;
    let summaries = pipeline_summaries(runner.registry());
    println!("{:<20} {}", "Pipeline", "Steps");
    for summary in summaries {
        println!("{:<20} {}", summary.name, summary.steps.join(" -> "));
    }
    Ok(())
}

async fn handle_run(
    args: RunArgs,
    conditions: Vec<String>,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    pretty: bool,
) -> anyhow::Result<()> {
    let config = load_config(config.as_deref())?;
    let mut runner = build_runner(&config)?;
    for condition in conditions {
        runner = runner.with_condition(condition);
    }

    let mut builder = config
        .defaults
        .apply(CampaignRequest::builder(args.product))
        .industry(args.industry);
    if let Some(city) = args.city {
        builder = builder.city(city);
    }
    if let Some(duration) = args.duration {
        builder = builder.duration_secs(duration);
    }
    if let Some(tone) = args.tone {
        builder = builder.tone(Tone::from(tone));
    }
    if let Some(output_type) = args.output_type {
        builder = builder.output_type(output_type);
    }
    let request = builder.build()?;

    let result: PipelineRunResult = runner
        .run_pipeline(&request.output_type, &request, Some(&ConsoleProgress))
        .await?;

    let content = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    if let Some(path) = output {
        fs::write(&path, content)?;
        println!("Result written to `{}`", path.display());
    } else {
        println!("{content}");
    }
    Ok(())
}

async fn handle_chat(sender: String, config: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(config.as_deref())?;
    let runner = build_runner(&config)?;
    let extractor = if config.llm.is_some() {
        IntentExtractor::with_llm(build_llm_client(&config)?)
    } else {
        IntentExtractor::rule_based()
    };
    let orchestrator = ChatOrchestrator::new(runner, extractor)
        .with_defaults(config.defaults.clone())
        .with_quick_full(EnvConfig::quick_full_enabled());
    let sink = ConsoleSink::new();

    println!("Describe your business to get an ad campaign. Ctrl-D to quit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if let HandleOutcome::Completed(status) = orchestrator.handle(&sender, &line, &sink).await {
            println!("(run finished: {:?})", status);
        }
    }
    Ok(())
}
