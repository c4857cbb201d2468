use clap::{Parser as ClapParser, Subcommand};
use sprig_lang::Limits;
use sprig_lang::cli::{self, CheckOptions, CheckResult, CliError};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "sprig")]
#[command(about = "Sprig - an expression language for resolving values from a data context")]
#[command(version)]
struct Cli {
    /// Maximum query length in bytes
    #[arg(long, global = true, default_value_t = Limits::default().max_length)]
    max_length: usize,

    /// Maximum depth of the parsed query tree
    #[arg(long, global = true, default_value_t = Limits::default().max_depth)]
    max_depth: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and evaluate a query
    Check {
        /// The query to evaluate
        query: String,

        /// JSON data context (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't evaluate
        #[arg(long)]
        syntax_only: bool,

        /// Register a constant global function, e.g. --entry 'site={"title":"Blog"}'
        #[arg(short, long = "entry", value_name = "NAME=JSON")]
        entries: Vec<String>,
    },

    /// Print the token stream of a query
    Tokens {
        query: String,
    },

    /// Print the parsed syntax tree of a query
    Ast {
        query: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let limits = Limits {
        max_length: cli.max_length,
        max_depth: cli.max_depth,
    };

    let result = match cli.command {
        Commands::Check {
            query,
            input,
            pretty,
            syntax_only,
            entries,
        } => run_check(CheckOptions {
            query,
            input,
            pretty,
            syntax_only,
            entries,
            limits,
        }),
        Commands::Tokens { query } => {
            cli::dump_tokens(&query, &limits).map(|out| print!("{}", out))
        }
        Commands::Ast { query } => cli::dump_ast(&query, &limits).map(|out| println!("{}", out)),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(mut options: CheckOptions) -> Result<(), CliError> {
    if options.input.is_none() && !options.syntax_only && !atty::is(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        options.input = Some(buffer);
    }

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Success(output) => {
            let json = if options.pretty {
                serde_json::to_string_pretty(&output)
            } else {
                serde_json::to_string(&output)
            }?;
            println!("{}", json);
        }
    }
    Ok(())
}
