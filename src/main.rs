//! cityfaq CLI - tiered FAQ answering for a city guide

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use cityfaq::config::{self, CityFaqConfig};
use cityfaq::embedding::{Embedder, HashEmbedder};
use cityfaq::provision::{self, SeedOptions};
use cityfaq::server::{self, AppState};
use cityfaq::storage::SqliteStore;
use cityfaq::ui::{self, Icons};
use cityfaq::{AnswerRequest, Pipeline};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "cityfaq")]
#[command(version = "0.1.0")]
#[command(about = "Tiered FAQ assistant: exact match, semantic match, then LLM fallback")]
#[command(long_about = r#"
cityfaq answers questions about a city from a curated FAQ set, escalating
through three tiers until one produces an answer:
  1. exact (case-insensitive) lookup
  2. semantic similarity over question embeddings
  3. generated answer from an LLM

Example usage:
  cityfaq init
  cityfaq seed --csv data/dubai_faq.csv
  cityfaq ask "What is the currency in Dubai?"
  cityfaq serve --port 8080
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (defaults to ./cityfaq.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Load FAQs from a CSV file into the database and vector index
    Seed {
        /// CSV with question, answer and optional category columns
        #[arg(long)]
        csv: PathBuf,

        /// Clear existing rows first
        #[arg(long)]
        reset: bool,

        /// Do not touch the structured FAQ table
        #[arg(long)]
        skip_sql: bool,

        /// Do not compute or store embeddings
        #[arg(long)]
        skip_vectors: bool,

        /// Questions embedded per batch
        #[arg(long, default_value_t = provision::DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },

    /// Answer a single question
    Ask {
        question: String,

        /// Print the answer record as JSON
        #[arg(long)]
        json: bool,

        /// Override the semantic match threshold
        #[arg(short, long)]
        threshold: Option<f32>,
    },

    /// Interactive question loop
    Chat,

    /// Start the HTTP server
    Serve {
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Show database statistics
    Stats,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config_path = cli.config.clone();

    match cli.command {
        Commands::Init { force } => {
            let path = config_path.unwrap_or_else(config::default_config_path);
            config::write_config(&path, &CityFaqConfig::default(), force)?;
            ui::success(&format!("Wrote {}", path.display()));
        }

        Commands::Seed {
            csv,
            reset,
            skip_sql,
            skip_vectors,
            batch_size,
        } => {
            let config = config::resolve_config(config_path.as_deref())?;
            let options = SeedOptions {
                sql: !skip_sql,
                vectors: !skip_vectors,
                reset,
                batch_size,
            };
            run_seed(&config, &csv, &options)?;
        }

        Commands::Ask {
            question,
            json,
            threshold,
        } => {
            let mut config = config::resolve_config(config_path.as_deref())?;
            if let Some(threshold) = threshold {
                config.threshold = threshold;
                config.validate()?;
            }

            let Some(request) = AnswerRequest::parse(&question) else {
                anyhow::bail!("question must not be empty");
            };

            let (_, pipeline) = build_pipeline(&config)?;
            let start = Instant::now();
            let record = pipeline.process(request.question());

            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("{}", ui::format_answer(&record));
                println!();
                ui::timing(&format!("{:.2?}", start.elapsed()));
            }
        }

        Commands::Chat => {
            let config = config::resolve_config(config_path.as_deref())?;
            let (_, pipeline) = build_pipeline(&config)?;
            run_chat(&config, &pipeline)?;
        }

        Commands::Serve { port } => {
            let config = config::resolve_config(config_path.as_deref())?;
            let (store, pipeline) = build_pipeline(&config)?;
            let state = Arc::new(AppState {
                pipeline: Arc::new(pipeline),
                store,
            });

            // The blocking HTTP clients inside the pipeline are built and
            // dropped outside the runtime.
            ui::header(&format!("Serving {} FAQ answers", config.city));
            println!("{} http://0.0.0.0:{}/ask", Icons::GLOBE, port);

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::start_server(port, Arc::clone(&state)))?;
            drop(runtime);
        }

        Commands::Stats => {
            let config = config::resolve_config(config_path.as_deref())?;
            let store = config.open_store()?;
            let stats = store.stats()?;

            ui::header("cityfaq statistics");
            ui::info("Database", &config.database.display().to_string());
            println!("{}", ui::stats_table(&stats, config.threshold));
        }
    }

    Ok(())
}

/// Open the store and wire up all three tiers
fn build_pipeline(config: &CityFaqConfig) -> anyhow::Result<(Arc<SqliteStore>, Pipeline)> {
    let store = Arc::new(config.open_store()?);
    let embedder = config.build_embedder()?;
    let model = config.build_model()?;

    if let Err(e) = store.check_dimensions(embedder.dimensions()) {
        tracing::warn!("Embedder does not match the seeded index: {}", e);
        ui::warn(&format!(
            "Semantic matching will fail until the index is reseeded with this embedder ({})",
            e
        ));
    }

    let pipeline = Pipeline::standard(
        store.clone(),
        embedder,
        store.clone(),
        model,
        config.pipeline_options(),
    );
    tracing::debug!("Pipeline steps: {:?}", pipeline.step_names());

    Ok((store, pipeline))
}

fn run_seed(config: &CityFaqConfig, csv: &Path, options: &SeedOptions) -> anyhow::Result<()> {
    ui::header(&format!("Seeding {}", config.database.display()));
    ui::info("CSV", &csv.display().to_string());

    let start = Instant::now();
    let dataset = provision::load_csv(csv)?;
    if dataset.rows.is_empty() {
        anyhow::bail!("no usable rows in {}", csv.display());
    }

    let store = config.open_store()?;
    // Embeddings are only computed when vectors are seeded
    let embedder: Arc<dyn Embedder> = if options.vectors {
        let spinner = ui::Spinner::new("Loading embedding model...");
        let embedder = config.build_embedder();
        spinner.finish_and_clear();
        embedder?
    } else {
        Arc::new(HashEmbedder::default())
    };

    let progress = ui::SeedProgress::new(dataset.rows.len());
    let report = provision::seed(&store, embedder.as_ref(), &dataset, options, &mut |done, _| {
        progress.set_position(done)
    })?;
    progress.finish_with_summary(start.elapsed(), report.faqs, report.vectors, report.skipped);

    if let (true, Some(sample)) = (options.vectors, dataset.rows.first()) {
        ui::section("Verification");
        match provision::verify(&store, embedder.as_ref(), &sample.question)? {
            Some(best) => ui::summary_row(
                &sample.question,
                &format!("-> '{}' (score {:.3})", best.question, best.score),
            ),
            None => ui::warn("Verification query returned no match"),
        }
    }

    Ok(())
}

fn run_chat(config: &CityFaqConfig, pipeline: &Pipeline) -> anyhow::Result<()> {
    println!("{}", ui::welcome_message(&config.city));
    println!();

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();

    loop {
        print!("{} ", ui::chat_prompt());
        std::io::stdout().flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let trimmed = line.trim();
        if matches!(trimmed.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        match AnswerRequest::parse(trimmed) {
            Some(request) => {
                let spinner = ui::Spinner::new(&format!("{} Thinking...", Icons::THINKING));
                let record = pipeline.process(request.question());
                spinner.finish_and_clear();
                println!("{}", ui::format_answer(&record));
            }
            None => println!("{}", ui::EMPTY_INPUT_REPLY),
        }
        println!();
    }

    println!("{} {}", Icons::WAVE, ui::dim("Goodbye!"));
    Ok(())
}
