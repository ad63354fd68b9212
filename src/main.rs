use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueHint};
use tracing_subscriber::EnvFilter;

use quizgen::commands::generate::{self, GenerateOptions};
use quizgen::llm;

#[derive(Parser, Debug)]
#[command(
    name = "quizgen",
    version,
    about = "Generate multiple-choice practice questions from your study notes.",
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true,
    disable_help_subcommand = true
)]
struct Cli {
    /// Log cache and model activity to stderr
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate questions from plain-text study material
    Generate {
        /// Study material files (.txt). Use `-` to read from stdin.
        #[arg(value_name = "PATHS", num_args = 1.., required = true, value_hint = ValueHint::FilePath)]
        paths: Vec<PathBuf>,
        /// Narrow the questions to this topic
        #[arg(short, long, value_name = "TOPIC")]
        topic: Option<String>,
        /// Number of questions per source (1-10)
        #[arg(short, long, value_name = "COUNT", default_value_t = 5)]
        count: usize,
        /// Save the questions as a text file (a directory gets a default file name)
        #[arg(short, long, value_name = "PATH", value_hint = ValueHint::AnyPath)]
        output: Option<PathBuf>,
        /// Print JSON instead of the formatted listing
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Ignore cached results and ask the model again
        #[arg(long, default_value_t = false)]
        fresh: bool,
        /// Offer to regenerate with different wording after showing the questions
        #[arg(long, default_value_t = false)]
        regenerate: bool,
    },
    /// Manage the OpenAI API key
    Key {
        /// Store a new API key in the local auth file
        #[arg(long, value_name = "KEY", conflicts_with = "clear")]
        set: Option<String>,
        /// Remove the stored API key from the local auth file
        #[arg(long, conflicts_with = "test")]
        clear: bool,
        /// Verify the configured API key by calling the OpenAI API
        #[arg(long, conflicts_with = "clear")]
        test: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("quizgen=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Generate {
            paths,
            topic,
            count,
            output,
            json,
            fresh,
            regenerate,
        } => {
            generate::run(GenerateOptions {
                paths,
                topic,
                count,
                output,
                json,
                fresh,
                regenerate,
            })
            .await?;
        }
        Command::Key { set, clear, test } => handle_key_command(set, clear, test).await?,
    }

    Ok(())
}

async fn handle_key_command(set: Option<String>, clear: bool, test: bool) -> Result<()> {
    let mut action_taken = false;

    if let Some(key) = set {
        let credential = quizgen::Credential::new(key.trim());
        llm::check_credential_shape(&credential)?;
        llm::store_api_key(&key)?;
        println!("Stored OpenAI API key in the local auth file.");
        action_taken = true;
    }

    if clear {
        let removed = llm::clear_api_key()?;
        if removed {
            println!("Removed the stored OpenAI API key.");
        } else {
            println!("No OpenAI API key found in the auth file.");
        }
        action_taken = true;
    }

    if test {
        let (credential, source) = llm::resolve_credential(false)?;
        if let Err(err) = llm::test_credential(&credential).await {
            bail!("OpenAI API key from the {} failed: {}", source.description(), err);
        }
        println!("OpenAI API key from the {} is valid.", source.description());
        action_taken = true;
    }

    if !action_taken {
        bail!("No action provided. Use --set, --clear, or --test.");
    }
    Ok(())
}
