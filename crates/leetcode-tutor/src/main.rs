//! Interactive LeetCode tutor.
//!
//! Reads the API key from the `OPENAI_API_KEY` environment variable (a `.env`
//! file in the working directory is loaded first).
//!
//! # Examples
//!
//! ```sh
//! # Interactive shell: paste a problem URL, then ask follow-ups
//! leetcode-tutor
//!
//! # Load a problem up front
//! leetcode-tutor --url https://leetcode.com/problems/two-sum/
//!
//! # Print the first guidance and exit
//! leetcode-tutor --url https://leetcode.com/problems/two-sum/ --once --model gpt-4o
//!
//! # Show request/response details on stderr
//! leetcode-tutor --verbose
//! ```

use std::process;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use leetcode_tutor::prelude::*;
use leetcode_tutor::shell::HELP;
use leetcode_tutor::{API_KEY_ENV, DEFAULT_MODEL, LEETCODE_GRAPHQL_URL, OPENAI_CHAT_URL};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Walk through LeetCode problems with a chat-model tutor.
#[derive(Parser)]
#[command(name = "leetcode-tutor", version)]
struct Cli {
    /// Problem URL to load before the shell starts
    #[arg(long)]
    url: Option<String>,

    /// Print the guidance for --url and exit instead of starting the shell
    #[arg(long, requires = "url")]
    once: bool,

    // ── Model ──────────────────────────────────────────────────
    /// Chat model to use
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Maximum tokens per reply (service default when unset)
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Sampling temperature (service default when unset)
    #[arg(long)]
    temperature: Option<f32>,

    // ── Network ────────────────────────────────────────────────
    /// Retries for transient failures (429, 5xx, timeouts)
    #[arg(long, default_value_t = 0)]
    retries: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 120)]
    timeout_secs: u64,

    /// GraphQL endpoint for problem details
    #[arg(long, default_value = LEETCODE_GRAPHQL_URL)]
    graphql_url: String,

    /// Chat-completion endpoint
    #[arg(long, default_value = OPENAI_CHAT_URL)]
    chat_url: String,

    /// Environment variable holding the API key
    #[arg(long, default_value = API_KEY_ENV)]
    api_key_env: String,

    // ── Output ─────────────────────────────────────────────────
    /// Log request and response details to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> TutorConfig {
        TutorConfig {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            retries: self.retries,
            timeout: Duration::from_secs(self.timeout_secs),
            graphql_url: self.graphql_url.clone(),
            chat_url: self.chat_url.clone(),
            api_key_env: self.api_key_env.clone(),
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config();

    let api_key = match config.api_key() {
        Ok(key) => key,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let fetcher = match config.build_fetcher() {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let assistant = match config.build_assistant(api_key) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let tutor = Tutor::new(&fetcher, &assistant);
    let mut session = Session::new();
    info!(trace_id = session.trace_id(), model = %config.model, "Session started");

    if let Some(url) = &cli.url {
        let loaded = load_problem(&tutor, &mut session, url).await;
        if cli.once {
            info!(trace_id = session.trace_id(), "{}", session.usage().summary());
            process::exit(if loaded { 0 } else { 1 });
        }
    }

    if let Err(e) = run_shell(&tutor, &mut session).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }

    info!(trace_id = session.trace_id(), "{}", session.usage().summary());
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "warn,leetcode_tutor=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// ── Shell ──────────────────────────────────────────────────────────

async fn run_shell(tutor: &Tutor<'_>, session: &mut Session) -> rustyline::Result<()> {
    let mut rl = DefaultEditor::new()?;

    println!("{}", "=== LeetCode Tutor ===".bright_magenta().bold());
    println!(
        "{}",
        "Paste a LeetCode problem URL to begin, or /help for commands.".bright_black()
    );
    println!();

    loop {
        let prompt = if session.is_active() { "you> " } else { "url> " };
        match rl.readline(prompt) {
            Ok(line) => {
                let command = ShellCommand::parse(&line);
                if command != ShellCommand::Empty {
                    let _ = rl.add_history_entry(line.as_str());
                }

                match command {
                    ShellCommand::Empty => {}
                    ShellCommand::Quit => break,
                    ShellCommand::Help => println!("{HELP}"),
                    ShellCommand::LoadUrl(url) => {
                        load_problem(tutor, session, &url).await;
                    }
                    ShellCommand::Ask(question) => {
                        println!("{}", "Thinking...".bright_black());
                        match tutor.ask(session, &question).await {
                            Ok(answer) => print_markdown(&answer),
                            Err(e) => print_error(&e),
                        }
                    }
                    ShellCommand::History => print_history(session.conversation()),
                    ShellCommand::Problem => match session.problem() {
                        Some(problem) => print_problem(problem),
                        None => print_error(&TutorError::NoProblemLoaded),
                    },
                    ShellCommand::Usage => println!("{}", session.usage().summary()),
                    ShellCommand::Unknown(cmd) => println!(
                        "{}",
                        format!("Unknown command {cmd}; /help lists commands.").yellow()
                    ),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e),
        }
    }

    println!("{}", "Goodbye!".bright_green());
    Ok(())
}

/// Load a problem and print it with its guidance. Returns whether the
/// guidance was produced.
async fn load_problem(tutor: &Tutor<'_>, session: &mut Session, url: &str) -> bool {
    println!("{}", "Fetching problem details...".bright_black());
    match tutor.load_problem(session, url).await {
        Ok(loaded) => {
            print_problem(&loaded.problem);
            print_heading("AI Guidance");
            print_markdown(&loaded.guidance);
            true
        }
        Err(e) => {
            // The fetch succeeded but the model did not answer: still show
            // the problem so the user can ask again.
            if let (TutorError::Assistant(_), Some(problem)) = (&e, session.problem()) {
                print_problem(problem);
            }
            print_error(&e);
            false
        }
    }
}

// ── Rendering ──────────────────────────────────────────────────────

fn print_heading(text: &str) {
    println!();
    println!("{}", text.bright_cyan().bold().underline());
}

fn print_problem(problem: &ProblemData) {
    print_heading(&problem.title);
    println!("{}", "Problem Statement:".bold());
    println!("{}", html_to_text(&problem.problem_statement));
    println!();
    println!("{}", "Examples:".bold());
    println!("{}", problem.examples);
    println!();
    println!("{}", "Constraints:".bold());
    println!("{}", problem.constraints);
}

/// Print formatter output, styling its `## **Heading**` lines.
fn print_markdown(text: &str) {
    for line in text.trim_end().lines() {
        match line.strip_prefix("## ") {
            Some(heading) => println!(
                "{}",
                heading.trim_matches('*').bright_blue().bold()
            ),
            None => println!("{line}"),
        }
    }
    println!();
}

fn print_history(conversation: &Conversation) {
    let history = conversation.follow_ups();
    if history.is_empty() {
        println!("{}", "No conversation yet.".bright_black());
        return;
    }

    print_heading("Chat History");
    for (i, message) in history.iter().enumerate() {
        match message.role {
            MessageRole::User => println!("{} {}", "👤 You:".green().bold(), message.content),
            MessageRole::Assistant => print_markdown(&format_response(&message.content)),
            MessageRole::System => {}
        }
        if i + 1 < history.len() {
            println!();
        }
    }
}

fn print_error(e: &TutorError) {
    eprintln!("{}", format!("Error: {e}").red());
}
