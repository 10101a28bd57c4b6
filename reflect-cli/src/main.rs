//! reflect - terminal client for the daily reflection journal
//!
//! # Subcommands
//! - `status`                       - today's status and the latest insights
//! - `reflect [--answers <file>]`   - answer the seven prompts, then wait for insights
//! - `history [-n <limit>] [--json]` - recent reflections, newest first
//! - `show <id>`                    - one reflection with its analysis
//! - `progress [--json]`            - totals, activity and recent insights

mod render;

use anyhow::Context;
use clap::{Parser, Subcommand};
use reflect_core::history::{find_reflection, recent_reflections, reflection_detail};
use reflect_core::progress::load_progress;
use reflect_core::{
    DashboardSession, HttpReflectionClient, Prompt, ReflectConfig, ReflectError, ReflectionApi,
    ReflectionDraft,
};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "reflect",
    version,
    about = "Daily reflection journal with AI insights"
)]
struct Cli {
    /// Path to the TOML config file (optional)
    #[arg(short, long, default_value = "reflect.toml")]
    config: String,

    /// Backend API URL (overrides the config file)
    #[arg(long, env = "REFLECT_API_URL")]
    server: Option<String>,

    /// Bearer token for the backend (overrides the config file)
    #[arg(long, env = "REFLECT_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show whether today's reflection is done and the latest insights
    Status,

    /// Answer today's seven prompts and wait for the analysis
    Reflect {
        /// Read answers from a JSON file (camelCase keys) instead of prompting
        #[arg(long)]
        answers: Option<String>,

        /// Submit without waiting for the analysis
        #[arg(long)]
        no_wait: bool,
    },

    /// List recent reflections, newest first
    History {
        /// Maximum number of reflections to list
        #[arg(short = 'n', long)]
        limit: Option<u32>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one reflection in full, with its analysis
    Show {
        /// Reflection id
        id: String,
    },

    /// Show progress figures
    Progress {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

// ============================================================================
// Commands
// ============================================================================

async fn do_status(api: Arc<dyn ReflectionApi>, config: &ReflectConfig) -> anyhow::Result<()> {
    let dashboard = DashboardSession::new(api, config.poller.clone());
    dashboard.load().await;
    let state = dashboard.state();

    if state.today_reflection_exists {
        println!("✔ Completed for today. Come back tomorrow.\n");
    } else {
        println!("Today's reflection is waiting. Run `reflect reflect` to start.\n");
    }

    println!(
        "{}",
        render::render_insights(state.latest_analysis.as_ref(), state.analysis_loading())
    );
    Ok(())
}

/// Prompt for every answer still blank in `draft`.
fn prompt_missing(draft: &mut ReflectionDraft) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while let Some(prompt) = draft.first_missing() {
        print_prompt(prompt);
        let line = lines
            .next()
            .context("input closed before all prompts were answered")??;
        draft.set(prompt, line.trim());
    }
    Ok(())
}

fn print_prompt(prompt: Prompt) {
    println!("{}. {} *", prompt.number(), prompt.label());
    print!("   ({}) > ", prompt.placeholder());
    let _ = io::stdout().flush();
}

fn ask_retry() -> bool {
    print!("Try again? [y/N] ");
    let _ = io::stdout().flush();
    let mut answer = String::new();
    io::stdin().read_line(&mut answer).is_ok() && answer.trim().eq_ignore_ascii_case("y")
}

async fn do_reflect(
    api: Arc<dyn ReflectionApi>,
    config: &ReflectConfig,
    answers: Option<String>,
    no_wait: bool,
) -> anyhow::Result<()> {
    let dashboard = DashboardSession::new(api, config.poller.clone());
    dashboard.load().await;

    if !dashboard.state().can_start_reflection() {
        println!("✔ Completed for today. Come back tomorrow.");
        return Ok(());
    }

    let interactive = answers.is_none();
    let mut draft = match answers {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read answers from {}", path))?;
            serde_json::from_str::<ReflectionDraft>(&raw)
                .with_context(|| format!("failed to parse answers in {}", path))?
        }
        None => {
            println!(
                "Take a mindful moment to reflect on your day. Be honest with yourself - \
                 this is your personal space for growth and self-discovery.\n"
            );
            ReflectionDraft::default()
        }
    };

    loop {
        if interactive {
            prompt_missing(&mut draft)?;
        }

        match dashboard.submit(&draft).await {
            Ok(reflection) => {
                tracing::info!(id = %reflection.id, "Reflection submitted");
                println!("\n✔ Reflection submitted.\n");
                break;
            }
            Err(e) => {
                eprintln!("\n✖ {}", e);
                if !interactive {
                    return Err(e.into());
                }
                if let ReflectError::Validation(_) = e {
                    if draft.first_missing().is_some() {
                        continue;
                    }
                }
                if !ask_retry() {
                    return Err(e.into());
                }
            }
        }
    }

    if no_wait {
        return Ok(());
    }

    println!(
        "{}\nThis typically takes 15-30 seconds (Ctrl+C to stop waiting).\n",
        render::render_insights(None, true)
    );

    let state = tokio::select! {
        state = dashboard.wait_for_analysis() => state,
        _ = tokio::signal::ctrl_c() => {
            dashboard.teardown();
            println!("Stopped waiting. Run `reflect status` later to see your insights.");
            return Ok(());
        }
    };

    println!(
        "{}",
        render::render_insights(state.latest_analysis.as_ref(), state.analysis_loading())
    );
    Ok(())
}

async fn do_history(
    api: Arc<dyn ReflectionApi>,
    limit: u32,
    json_output: bool,
) -> anyhow::Result<()> {
    let reflections = recent_reflections(api.as_ref(), limit).await?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&reflections)?);
        return Ok(());
    }

    if reflections.is_empty() {
        println!("No reflections yet. Start your journey with `reflect reflect`.");
        return Ok(());
    }

    for reflection in &reflections {
        println!("{}\n", render::render_card(reflection));
    }
    Ok(())
}

async fn do_show(api: Arc<dyn ReflectionApi>, id: &str, limit: u32) -> anyhow::Result<()> {
    let reflection = find_reflection(api.as_ref(), id, limit)
        .await?
        .with_context(|| format!("no reflection with id {} among the last {}", id, limit))?;

    let detail = reflection_detail(api.as_ref(), reflection).await;
    println!("{}", render::render_detail(&detail));
    Ok(())
}

async fn do_progress(
    api: Arc<dyn ReflectionApi>,
    limit: u32,
    json_output: bool,
) -> anyhow::Result<()> {
    let summary = load_progress(api.as_ref(), limit).await?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", render::render_progress(&summary));
    }
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    // Load .env file if present (dev convenience)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = match ReflectConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("reflect: failed to load config from {}: {}", cli.config, e);
            std::process::exit(1);
        }
    };
    if let Some(server) = cli.server {
        config.api.base_url = server;
    }
    if let Some(token) = cli.token {
        config.api.auth_token = Some(token);
    }

    // Logs go to stderr so command output stays clean
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.service.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let api: Arc<dyn ReflectionApi> = match HttpReflectionClient::new(config.api.clone()) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("reflect: failed to create API client: {}", e);
            std::process::exit(1);
        }
    };

    let history_limit = config.history.limit;
    let result = match cli.command {
        Commands::Status => do_status(api, &config).await,
        Commands::Reflect { answers, no_wait } => do_reflect(api, &config, answers, no_wait).await,
        Commands::History { limit, json } => {
            do_history(api, limit.unwrap_or(history_limit), json).await
        }
        Commands::Show { id } => do_show(api, &id, history_limit).await,
        Commands::Progress { json } => do_progress(api, history_limit, json).await,
    };

    if let Err(e) = result {
        eprintln!("reflect: {:#}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_history_limit_flag() {
        let cli = Cli::try_parse_from(["reflect", "history", "-n", "7", "--json"]).unwrap();
        match cli.command {
            Commands::History { limit, json } => {
                assert_eq!(limit, Some(7));
                assert!(json);
            }
            other => panic!("Expected History, got {:?}", other),
        }
    }

    #[test]
    fn test_reflect_answers_file_flag() {
        let cli =
            Cli::try_parse_from(["reflect", "-c", "alt.toml", "reflect", "--answers", "a.json"])
                .unwrap();
        assert_eq!(cli.config, "alt.toml");
        match cli.command {
            Commands::Reflect { answers, no_wait } => {
                assert_eq!(answers.as_deref(), Some("a.json"));
                assert!(!no_wait);
            }
            other => panic!("Expected Reflect, got {:?}", other),
        }
    }

    #[test]
    fn test_show_requires_id() {
        assert!(Cli::try_parse_from(["reflect", "show"]).is_err());
    }
}
