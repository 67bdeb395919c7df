//! ragroute CLI: answer questions from a document corpus, falling back to web search.
//!
//! Subcommands: `ask` (one question) and `repl` (one question per stdin line).

mod log_format;
mod logging;
mod repl;
mod run;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ragroute::{RagSettings, RouterKind};
use tokio::io::BufReader;

use run::{CliError, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "ragroute")]
#[command(about = "ragroute: answer from your documents, or from the web when they fall short")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Answer one question
    Ask(AskArgs),
    /// Read questions from stdin, one per line, until EOF or `exit`
    Repl(CommonArgs),
}

#[derive(Args, Debug)]
struct AskArgs {
    /// Question text (words are joined with spaces)
    #[arg(required = true, trailing_var_arg = true)]
    question: Vec<String>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// JSON array of documents to index; without it every question goes to the web
    #[arg(long, value_name = "FILE")]
    corpus: Option<PathBuf>,

    /// Routing policy: judge or agent (default: RAGROUTE_ROUTER or judge)
    #[arg(long, value_name = "KIND")]
    router: Option<RouterKind>,

    /// Print the full output record as JSON
    #[arg(long)]
    json: bool,

    /// With --json, pretty-print (multi-line)
    #[arg(long)]
    pretty: bool,

    /// Report node enter/exit on stderr
    #[arg(short, long)]
    verbose: bool,
}

impl From<CommonArgs> for RunOptions {
    fn from(a: CommonArgs) -> Self {
        RunOptions {
            corpus: a.corpus,
            router: a.router,
            verbose: a.verbose,
            json: a.json,
            pretty: a.pretty,
        }
    }
}

async fn execute(cli: Cli) -> Result<(), CliError> {
    let settings = RagSettings::from_env()?;
    match cli.cmd {
        Command::Ask(args) => {
            let question = args.question.join(" ");
            let opts = RunOptions::from(args.common);
            let router = run::build_from_settings(&settings, &opts).await?;
            let rendered = run::ask(router.as_ref(), &question, &opts).await?;
            println!("{}", rendered);
        }
        Command::Repl(common) => {
            let opts = RunOptions::from(common);
            let router = run::build_from_settings(&settings, &opts).await?;
            let stdin = BufReader::new(tokio::io::stdin());
            let mut stdout = std::io::stdout();
            repl::run_repl_loop(router.as_ref(), &opts, stdin, &mut stdout).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_and_apply("ragroute", None) {
        eprintln!("ragroute: {}", CliError::from(e));
        std::process::exit(1);
    }
    if let Err(e) = logging::init() {
        eprintln!("ragroute: logging: {}", e);
        std::process::exit(1);
    }

    let cli = Cli::parse();
    if let Err(e) = execute(cli).await {
        tracing::error!(error = %e, "ragroute failed");
        eprintln!("ragroute: {}", e);
        std::process::exit(1);
    }
}
