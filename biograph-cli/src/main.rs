//! biograph binary: resolve catalog queries, manage threads, list models and GSE records.

use std::path::PathBuf;
use std::process::ExitCode;

use biograph::CheckpointError;
use biograph_cli::{Error, QueryResponse, RunConfig, RunOptions};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "biograph")]
#[command(about = "Bio-data catalog assistant: SQL, knowledge-base and chat answers per thread")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// SQLite file for thread state (overrides CHECKPOINT_DB_PATH)
    #[arg(long, global = true, value_name = "PATH")]
    checkpoint_db: Option<PathBuf>,

    /// Catalog database, path or sqlite:/// URL (overrides DATABASE_URL)
    #[arg(long, global = true, value_name = "URL")]
    database_url: Option<String>,

    /// Answer with the offline model instead of a real provider
    #[arg(long, global = true)]
    mock: bool,

    /// Debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve one query
    Query {
        /// Query text (words are joined with spaces)
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,

        /// LLM provider (openai, ollama)
        #[arg(short, long)]
        provider: Option<String>,

        /// Model name for the provider
        #[arg(short, long)]
        model: Option<String>,

        /// Thread to continue
        #[arg(short, long)]
        thread: Option<String>,

        /// Passages fetched per retrieval
        #[arg(long, value_name = "K")]
        top_k: Option<usize>,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect or delete stored threads
    Threads {
        #[command(subcommand)]
        action: ThreadsAction,
    },
    /// List providers, their models and availability
    Models,
    /// List GSE records, or show one by accession
    Gse {
        accession: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum ThreadsAction {
    /// List thread ids
    List,
    /// Delete one thread
    Delete { thread_id: String },
    /// Delete every thread
    Clear,
}

fn print_response(response: &QueryResponse, json: bool) -> Result<(), Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }
    println!("{}", response.answer);
    eprintln!(
        "---\nintent={} provider={} model={} thread={}",
        response.intent, response.provider, response.model, response.thread_id
    );
    Ok(())
}

fn is_not_found(e: &Error) -> bool {
    matches!(
        e.downcast_ref::<CheckpointError>(),
        Some(CheckpointError::NotFound(_))
    )
}

async fn execute(command: Command, mut config: RunConfig, global: &GlobalArgs) -> Result<ExitCode, Error> {
    match command {
        Command::Query {
            text,
            provider,
            model,
            thread,
            top_k,
            json,
        } => {
            config.apply_options(&RunOptions {
                provider,
                model,
                thread_id: thread,
                top_k,
                ..Default::default()
            });
            let query = text.join(" ");
            let response = biograph_cli::run_with_config(&config, query.trim()).await?;
            print_response(&response, json)?;
            Ok(if response.is_error() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
        Command::Threads { action } => {
            if global.checkpoint_db.is_none() && config.settings.checkpoint_db_path.is_none() {
                eprintln!("note: no CHECKPOINT_DB_PATH set; threads only live for one process");
            }
            match action {
                ThreadsAction::List => {
                    for id in biograph_cli::list_threads(&config).await? {
                        println!("{}", id);
                    }
                }
                ThreadsAction::Delete { thread_id } => {
                    biograph_cli::delete_thread(&config, &thread_id).await?;
                    println!("deleted {}", thread_id);
                }
                ThreadsAction::Clear => {
                    let n = biograph_cli::clear_threads(&config).await?;
                    println!("deleted {} thread(s)", n);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Models => {
            let default = config.settings.model_provider.clone();
            for p in biograph_cli::list_providers(&config)? {
                println!(
                    "{}{} [{}] {}",
                    p.name,
                    if p.name == default { " (default)" } else { "" },
                    if p.available { "available" } else { "unavailable" },
                    p.models.join(", ")
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Gse { accession } => gse(&config, accession).await,
    }
}

#[cfg(feature = "sqlite")]
async fn gse(config: &RunConfig, accession: Option<String>) -> Result<ExitCode, Error> {
    match accession {
        Some(accession) => match biograph_cli::find_record(config, &accession).await? {
            Some(r) => {
                println!("{}\t{}\t{}", r.id, r.accession, r.title);
                Ok(ExitCode::SUCCESS)
            }
            None => {
                eprintln!("GSE record not found: {}", accession);
                Ok(ExitCode::from(2))
            }
        },
        None => {
            for r in biograph_cli::list_records(config).await? {
                println!("{}\t{}\t{}", r.id, r.accession, r.title);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[cfg(not(feature = "sqlite"))]
async fn gse(_config: &RunConfig, _accession: Option<String>) -> Result<ExitCode, Error> {
    eprintln!("error: built without the sqlite feature; no catalog database");
    Ok(ExitCode::FAILURE)
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let filter = if cli.global.verbose {
        "info,biograph=debug"
    } else {
        "warn,biograph=info"
    };
    if let Err(e) = biograph_cli::init_tracing(filter) {
        eprintln!("error: logging setup failed: {}", e);
        return ExitCode::FAILURE;
    }

    let mut config = match RunConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    config.apply_options(&RunOptions {
        checkpoint_db: cli.global.checkpoint_db.clone(),
        database_url: cli.global.database_url.clone(),
        mock_llm: cli.global.mock,
        ..Default::default()
    });

    match execute(cli.command, config, &cli.global).await {
        Ok(code) => code,
        Err(e) if is_not_found(&e) => {
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
