//! DebateChat CLI - watch two AIs argue.
//!
//! Picks a topic and a style per debater, runs a timed debate and renders
//! the transcript live, followed by a neutral summary of both sides.

use clap::Parser;
use colored::Colorize;
use debatechat_core::{
    Config, DebateOrchestrator, DebatePhase, DebateRunState, DebateStyles, DebaterId, Debaters,
    OpenAiModel, Style, Topic, default_config, preset_topics, resolve_topic,
};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "debatechat",
    version,
    about = "DebateChat - watch two AIs debate a topic",
    long_about = "Runs a timed debate between two AI personas using an OpenAI-compatible API, then summarizes both sides."
)]
struct Cli {
    /// Preset topic number or title, or any question to debate
    #[arg(value_name = "TOPIC", required_unless_present = "list_topics")]
    topic: Option<String>,

    /// Style of the debater arguing in favor
    #[arg(long, default_value = "analytical", value_name = "STYLE")]
    style_a: String,

    /// Style of the debater arguing against
    #[arg(long, default_value = "analytical", value_name = "STYLE")]
    style_b: String,

    /// Debate time budget in seconds (defaults to the config value)
    #[arg(short, long, value_name = "SECONDS")]
    duration: Option<u64>,

    /// Path to a TOML config file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Model name, overriding the config
    #[arg(short, long, value_name = "MODEL")]
    model: Option<String>,

    /// Name of the debater arguing in favor
    #[arg(long, value_name = "NAME")]
    name_a: Option<String>,

    /// Name of the debater arguing against
    #[arg(long, value_name = "NAME")]
    name_b: Option<String>,

    /// List preset topics and styles, then exit
    #[arg(long)]
    list_topics: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.list_topics {
        print_catalogue();
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => default_config(),
    };
    apply_overrides(&mut config, &cli);
    config.validate()?;

    if config.provider.api_key.is_empty() {
        eprintln!(
            "{}",
            "Warning: OPENAI_API_KEY not set. API calls may fail.".yellow()
        );
    }

    let topic = resolve_topic(cli.topic.as_deref().unwrap_or_default())?;
    let styles = DebateStyles::new(cli.style_a.parse()?, cli.style_b.parse()?);
    let duration = cli.duration.unwrap_or(config.debate.time_budget_secs);

    let model = Arc::new(OpenAiModel::new(&config.provider)?);
    let mut orchestrator = DebateOrchestrator::from_config(model, &config);
    let debaters = orchestrator.debaters().clone();

    print_header(&topic, &debaters, &styles, &config.provider.model, duration);

    let mut rx = orchestrator.subscribe();
    orchestrator.start_debate(topic, styles, duration)?;

    let mut renderer = Renderer::new(debaters);
    let mut interrupts = Interrupts::default();
    // Armed once for the run and re-armed after each signal.
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                renderer.render(&state);
                if state.phase == DebatePhase::Ended {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                ctrl_c.set(tokio::signal::ctrl_c());
                match interrupts.next() {
                    Interrupt::Stop => {
                        println!();
                        println!(
                            "{}",
                            "Stopping after the current turn... (Ctrl-C again to abort)".yellow()
                        );
                        orchestrator.stop_debate();
                    }
                    Interrupt::Abort => {
                        eprintln!("{}", "Aborted.".red());
                        std::process::exit(130);
                    }
                }
            }
        }
    }

    println!();
    println!("{}", "═".repeat(70).bright_blue());
    println!("{}", "  Debate concluded.".bright_green().bold());
    println!("{}", "═".repeat(70).bright_blue());
    println!();

    Ok(())
}

/// What a Ctrl-C means at this point of the run.
#[derive(Debug, PartialEq, Eq)]
enum Interrupt {
    Stop,
    Abort,
}

/// The first Ctrl-C stops the debate gracefully, any later one aborts.
#[derive(Default)]
struct Interrupts {
    received: usize,
}

impl Interrupts {
    fn next(&mut self) -> Interrupt {
        self.received += 1;
        if self.received == 1 {
            Interrupt::Stop
        } else {
            Interrupt::Abort
        }
    }
}

/// Environment and flags take precedence over the config file.
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Ok(base) = env::var("OPENAI_API_BASE").or_else(|_| env::var("OPENAI_BASE_URL")) {
        config.provider.api_base = base;
    }
    if let Ok(key) = env::var("OPENAI_API_KEY") {
        config.provider.api_key = key;
    }
    if let Some(model) = &cli.model {
        config.provider.model = model.clone();
    }
    if let Some(name) = &cli.name_a {
        config.debaters.name_a = name.clone();
    }
    if let Some(name) = &cli.name_b {
        config.debaters.name_b = name.clone();
    }
}

fn print_catalogue() {
    println!("{}", "Preset topics:".bold());
    for (i, topic) in preset_topics().iter().enumerate() {
        println!(
            "  {}. {} {} - {}",
            i + 1,
            topic.emoji,
            topic.title.bright_cyan(),
            topic.question.dimmed()
        );
    }
    println!();
    println!("{}", "Styles:".bold());
    for style in Style::ALL {
        println!("  {:<14} {}", style.name().yellow(), style.description().dimmed());
    }
}

fn print_header(topic: &Topic, debaters: &Debaters, styles: &DebateStyles, model: &str, duration: u64) {
    println!();
    println!("{}", "═".repeat(70).bright_blue());
    println!(
        "{}",
        format!("  {} {} - {}", topic.emoji, "DebateChat".bold(), topic.title)
            .bright_blue()
            .bold()
    );
    println!("{}", "═".repeat(70).bright_blue());
    println!();
    println!("{} {}", "Question:".bold(), topic.question.bright_white());
    println!();
    println!("{}", "Debaters:".bold());
    for (debater, style) in [(&debaters.a, styles.a), (&debaters.b, styles.b)] {
        println!(
            "  {} - {} style",
            debater.display_name_with_stance().bright_cyan(),
            style.name().yellow()
        );
    }
    println!();
    println!(
        "{} {} {} {}",
        "Model:".bold(),
        model.dimmed(),
        "Time:".bold(),
        format_clock(duration).dimmed()
    );
    println!("{}", "─".repeat(70).dimmed());
}

/// Prints state changes incrementally.
struct Renderer {
    debaters: Debaters,
    printed: usize,
    thinking: Option<DebaterId>,
    stop_announced: bool,
    summarizing_announced: bool,
}

impl Renderer {
    fn new(debaters: Debaters) -> Self {
        Self {
            debaters,
            printed: 0,
            thinking: None,
            stop_announced: false,
            summarizing_announced: false,
        }
    }

    fn render(&mut self, state: &DebateRunState) {
        for message in state.messages.iter().skip(self.printed) {
            let debater = self.debaters.get(message.debater_id);
            let label = format!("{}:", debater.name).bold();
            let label = match message.debater_id {
                DebaterId::A => label.bright_blue(),
                DebaterId::B => label.bright_magenta(),
            };
            println!("{}", label);
            for line in textwrap(&message.text, 66).lines() {
                println!("  {}", line);
            }
            println!();
        }
        self.printed = state.messages.len();

        if state.is_thinking != self.thinking {
            self.thinking = state.is_thinking;
            if let Some(id) = state.is_thinking {
                println!(
                    "{} {} {}",
                    "▶".bright_cyan(),
                    format!("{} is thinking...", self.debaters.get(id).name).dimmed(),
                    format!("({} left)", format_clock(state.time_left)).dimmed()
                );
            }
        }

        if let Some(reason) = state.stop_reason {
            if !self.stop_announced {
                self.stop_announced = true;
                println!("{}", format!("■ Debate over: {}.", reason.display_name()).yellow());
            }
        }

        if state.is_summarizing && !self.summarizing_announced {
            self.summarizing_announced = true;
            println!();
            println!("{}", "Summarizing the debate...".dimmed());
        }

        if state.phase == DebatePhase::Ended {
            self.render_summary(state);
        }
    }

    fn render_summary(&self, state: &DebateRunState) {
        let Some(summary) = &state.summary else {
            println!("{}", "No arguments were made, so there is nothing to summarize.".dimmed());
            return;
        };

        println!();
        println!("{}", "═".repeat(70).bright_magenta());
        println!("{}", "  SUMMARY".bright_magenta().bold());
        println!("{}", "═".repeat(70).bright_magenta());
        for id in [DebaterId::A, DebaterId::B] {
            let debater = self.debaters.get(id);
            println!();
            println!("{}", debater.display_name_with_stance().bright_cyan().bold());
            for line in textwrap(summary.get(id), 66).lines() {
                println!("  {}", line);
            }
        }
    }
}

fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Simple text wrapping function.
fn textwrap(text: &str, width: usize) -> String {
    let mut result = String::new();
    let mut current_line_len = 0;

    for word in text.split_whitespace() {
        if current_line_len + word.len() + 1 > width && current_line_len > 0 {
            result.push('\n');
            current_line_len = 0;
        }
        if current_line_len > 0 {
            result.push(' ');
            current_line_len += 1;
        }
        result.push_str(word);
        current_line_len += word.len();
    }

    result
}
