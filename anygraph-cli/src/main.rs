mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "anygraph")]
#[command(about = "Chat-driven data analysis with sandboxed code execution")]
#[command(version)]
pub struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a code file through the sandbox and print the result as JSON
    Exec {
        /// Path to the snippet, or '-' for stdin
        file: String,

        /// Timeout in seconds
        #[arg(short, long, default_value_t = 60)]
        timeout: u64,

        /// Interpreter binary
        #[arg(short, long)]
        interpreter: Option<String>,
    },
    /// Probe whether the execution backend is operational
    Health {
        /// Interpreter binary
        #[arg(short, long)]
        interpreter: Option<String>,
    },
    /// Ask a question about a dataset (requires an API key)
    Ask {
        /// The natural-language query
        query: String,

        /// URL of the delimited dataset file
        #[arg(long)]
        dataset_url: String,

        /// Path to a JSON file with the dataset columns
        /// (array of {name, datatype, example_value})
        #[arg(long)]
        schema: String,

        /// Timeout in seconds for the generated code
        #[arg(short, long, default_value_t = 60)]
        timeout: u64,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "anygraph_sandbox=debug,anygraph_llm=debug,anygraph_core=debug,anygraph_cli=debug"
    } else {
        "anygraph_sandbox=info,anygraph_llm=info,anygraph_core=info,anygraph_cli=info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Exec {
            file,
            timeout,
            interpreter,
        } => commands::exec(&file, timeout, interpreter.as_deref()).await,
        Commands::Health { interpreter } => commands::health(interpreter.as_deref()).await,
        Commands::Ask {
            query,
            dataset_url,
            schema,
            timeout,
        } => commands::ask(&query, &dataset_url, &schema, timeout).await,
    }
}
