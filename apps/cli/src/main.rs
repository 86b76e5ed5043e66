use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use indicatif::ProgressBar;
use lastfm_suggest_core::{bootstrap, dispatch::to_rows, CoreRuntime, SuggestConfig};
use output::{OutputFormat, Renderer, SuggestOutput};
use progress::spinner;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "lastfm-suggest",
    version,
    about = "Artist, track, tag and user suggestions from Last.fm for a single query."
)]
struct Cli {
    /// Preferred renderer for command output.
    #[arg(long, global = true, value_enum, default_value = "table")]
    format: OutputFormat,
    /// Configuration file to load instead of the per-user default.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Disable ANSI colors in CLI output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Suppress non-critical CLI output.
    #[arg(long, global = true)]
    quiet: bool,
    /// Disable progress indicators while lookups run.
    #[arg(long, global = true)]
    no_progress: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand, Clone)]
enum Command {
    /// Look up suggestions for a query.
    Suggest {
        /// Search text; multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Serve suggestion requests as line-delimited JSON-RPC over STDIO.
    Serve,
    /// Show the effective configuration.
    Config,
    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    fn progress_enabled(&self) -> bool {
        !self.quiet && !self.no_progress
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    if let Command::Completions { shell } = &cli.command {
        let mut command = Cli::command();
        clap_complete::generate(*shell, &mut command, "lastfm-suggest", &mut std::io::stdout());
        return Ok(());
    }

    let config = SuggestConfig::load(cli.config.as_deref())?;
    let renderer = Renderer::new(cli.format);

    match &cli.command {
        Command::Suggest { query } => {
            let runtime = bootstrap(config)?;
            handle_suggest(&query.join(" "), &cli, &renderer, &runtime).await
        }
        Command::Serve => {
            let runtime = bootstrap(config)?;
            info!(target: "lastfm_suggest_cli", "serving suggestions on stdio");
            runtime.serve().await
        }
        Command::Config => {
            if cli.quiet {
                return Ok(());
            }
            let path = cli.config.clone().or_else(SuggestConfig::default_path);
            renderer.config(path.as_deref(), &config)
        }
        Command::Completions { .. } => Ok(()),
    }
}

async fn handle_suggest(
    query: &str,
    cli: &Cli,
    renderer: &Renderer,
    runtime: &CoreRuntime,
) -> Result<()> {
    let spinner = spinner(cli.progress_enabled(), format!("Searching for \"{query}\"..."));
    let report = runtime.aggregator().aggregate_report(Some(query)).await;

    let output = report.map(|report| SuggestOutput {
        rows: to_rows(&report.candidates),
        query: report.query,
        categories: report.categories,
    });
    finish_spinner(
        spinner,
        output
            .as_ref()
            .map(|output| format!("{} suggestions", output.rows.len())),
    );

    if cli.quiet {
        return Ok(());
    }
    renderer.suggestions(output.as_ref())
}

fn init_tracing(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lastfm_suggest_cli=info"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .without_time()
        .with_ansi(!cli.no_color)
        .compact()
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow!("failed to initialize logging: {error}"))
}

fn finish_spinner(spinner: Option<ProgressBar>, message: Option<String>) {
    if let Some(progress) = spinner {
        if let Some(msg) = message {
            progress.finish_with_message(msg);
        } else {
            progress.finish_and_clear();
        }
    }
}

mod output {
    use std::{fmt::Write, path::Path};

    use anyhow::Result;
    use clap::ValueEnum;
    use lastfm_suggest_core::{aggregator::CategorySummary, fetcher::CategoryOutcome};
    use lastfm_suggest_core::{SuggestConfig, SuggestionRow};
    use serde::Serialize;
    use serde_json::{self, json};

    #[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
    pub enum OutputFormat {
        Json,
        Markdown,
        Table,
        Text,
    }

    #[derive(Debug, Serialize)]
    pub struct SuggestOutput {
        pub query: String,
        pub rows: Vec<SuggestionRow>,
        pub categories: Vec<CategorySummary>,
    }

    #[derive(Copy, Clone, Debug)]
    pub struct Renderer {
        format: OutputFormat,
    }

    impl Renderer {
        pub fn new(format: OutputFormat) -> Self {
            Self { format }
        }

        pub fn suggestions(&self, output: Option<&SuggestOutput>) -> Result<()> {
            let Some(output) = output else {
                match self.format {
                    OutputFormat::Json => println!("null"),
                    _ => println!("No suggestions: the query is empty."),
                }
                return Ok(());
            };

            match self.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(output)?);
                }
                OutputFormat::Markdown => {
                    println!("| # | Suggestion | Action | Target |");
                    println!("| ---: | --- | --- | --- |");
                    for row in &output.rows {
                        println!(
                            "| {} | {} | {} | `{}` |",
                            row.id, row.text_1, row.text_2, row.intent_data
                        );
                    }
                    println!();
                    println!("{}", category_line(&output.categories));
                }
                OutputFormat::Table => {
                    let rows: Vec<Vec<String>> = output
                        .rows
                        .iter()
                        .map(|row| {
                            vec![
                                row.id.to_string(),
                                truncate(&row.text_1, 48),
                                row.text_2.clone(),
                                truncate(&row.intent_data, 64),
                            ]
                        })
                        .collect();
                    render_table(&["#", "Suggestion", "Action", "Target"], &rows);
                    println!("{}", category_line(&output.categories));
                }
                OutputFormat::Text => {
                    if output.rows.is_empty() {
                        println!("No suggestions for \"{}\".", output.query);
                    }
                    for row in &output.rows {
                        println!("[{}] {} ({})", row.id, row.text_1, row.text_2);
                        println!("    {}", row.intent_data);
                        if let Some(image) = &row.image_url {
                            println!("    image: {image}");
                        }
                    }
                }
            }
            Ok(())
        }

        pub fn config(&self, path: Option<&Path>, config: &SuggestConfig) -> Result<()> {
            let path = path.map_or_else(|| "n/a".to_string(), |path| path.display().to_string());
            let api_key = mask(&config.api_key);
            match self.format {
                OutputFormat::Json => {
                    let mut value = serde_json::to_value(config)?;
                    value["api_key"] = json!(api_key);
                    if config.session_key.is_some() {
                        value["session_key"] = json!("****");
                    }
                    let payload = json!({ "path": path, "config": value });
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                }
                OutputFormat::Markdown | OutputFormat::Table | OutputFormat::Text => {
                    let rows = vec![
                        vec!["Path".to_string(), path],
                        vec!["API key".to_string(), api_key],
                        vec!["Base URL".to_string(), config.api_base_url.clone()],
                        vec![
                            "Session".to_string(),
                            config.session_key.is_some().to_string(),
                        ],
                        vec![
                            "Category timeout (ms)".to_string(),
                            config.category_timeout_ms.to_string(),
                        ],
                        vec!["Radio scheme".to_string(), config.radio_scheme.clone()],
                    ];
                    render_table(&["Setting", "Value"], &rows);
                }
            }
            Ok(())
        }
    }

    fn category_line(categories: &[CategorySummary]) -> String {
        categories
            .iter()
            .map(|summary| {
                let status = match &summary.outcome {
                    CategoryOutcome::Completed => String::new(),
                    CategoryOutcome::Failed(_) => " (failed)".to_string(),
                    CategoryOutcome::TimedOut => " (timed out)".to_string(),
                };
                format!("{}: {}{}", summary.category, summary.count, status)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub(crate) fn mask(secret: &str) -> String {
        if secret.is_empty() {
            return "(unset)".to_string();
        }
        let visible: String = secret.chars().take(4).collect();
        format!("{visible}****")
    }

    fn render_table(headers: &[&str], rows: &[Vec<String>]) {
        let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();
        for row in rows {
            for (idx, cell) in row.iter().enumerate() {
                widths[idx] = widths[idx].max(cell.chars().count());
            }
        }

        fn render_line(columns: &[&str], widths: &[usize]) -> String {
            let mut line = String::new();
            for (idx, value) in columns.iter().enumerate() {
                let width = widths[idx];
                let _ = write!(line, "| {value:width$} ");
            }
            line.push('|');
            line
        }

        println!("{}", render_line(headers, &widths));
        let separator: String = widths
            .iter()
            .map(|width| format!("|{:-^1$}", "", width + 2))
            .collect::<Vec<_>>()
            .join("");
        println!("{separator}|");

        for row in rows {
            let cols: Vec<&str> = row.iter().map(String::as_str).collect();
            println!("{}", render_line(&cols, &widths));
        }
    }

    pub(crate) fn truncate(value: &str, max: usize) -> String {
        if value.chars().count() <= max {
            value.to_string()
        } else {
            let mut truncated = value
                .chars()
                .take(max.saturating_sub(1))
                .collect::<String>();
            truncated.push('…');
            truncated
        }
    }

}

mod progress {
    use std::time::Duration;

    use indicatif::{ProgressBar, ProgressStyle};

    pub fn spinner(message_enabled: bool, message: impl Into<String>) -> Option<ProgressBar> {
        if !message_enabled {
            return None;
        }
        let progress = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        progress.set_style(style);
        progress.set_message(message.into());
        progress.enable_steady_tick(Duration::from_millis(80));
        Some(progress)
    }
}
