//! Haulcall CLI - Agent configuration, test calls and call review
//!
//! Talks to the Haulcall backend through the library's HTTP adapter.

mod config;
mod display;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{Input, Password};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use haulcall::{
    Call, CallBrowser, CallObserver, CallService, ConfigurationDraft, ConfigurationEditor,
    ConfigurationService, EditorState, HttpBackend, PhoneCallRequest, ScenarioType, SortOrder,
    WebCallRequest,
};

use config::Config;

#[derive(Parser)]
#[command(name = "haulcall")]
#[command(about = "Haulcall CLI - Voice agent configuration and call review", long_about = None)]
#[command(version)]
struct Cli {
    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or change CLI settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },

    /// Agent configuration per scenario
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Start and inspect calls
    Call {
        #[command(subcommand)]
        action: CallAction,
    },

    /// List previous calls
    Calls {
        /// Oldest calls first
        #[arg(long)]
        oldest_first: bool,
        /// Filter by driver name
        #[arg(short, long)]
        search: Option<String>,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Show current settings
    Show,
    /// Set the backend URL
    SetUrl {
        /// e.g. "http://localhost:8000"
        url: String,
    },
    /// Store an API key
    SetKey {
        /// API key (will prompt if not provided)
        key: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the configuration of a scenario
    Show {
        /// checkin or emergency
        scenario: ScenarioType,
    },
    /// List all stored configurations
    List,
    /// Edit and save the configuration of a scenario
    Edit {
        /// checkin or emergency
        scenario: ScenarioType,
        #[command(flatten)]
        edits: ConfigEdits,
    },
}

#[derive(clap::Args)]
struct ConfigEdits {
    /// System prompt text
    #[arg(long, conflicts_with = "prompt_file")]
    prompt: Option<String>,
    /// Read the system prompt from a file
    #[arg(long)]
    prompt_file: Option<String>,
    #[arg(long)]
    voice_id: Option<String>,
    /// 0.5-2.0
    #[arg(long)]
    voice_speed: Option<f64>,
    /// 0.0-2.0
    #[arg(long)]
    voice_temperature: Option<f64>,
    /// 0.0-1.0
    #[arg(long)]
    responsiveness: Option<f64>,
    /// 0.0-1.0
    #[arg(long)]
    interruption_sensitivity: Option<f64>,
    /// 0.0-1.0
    #[arg(long)]
    backchannel_frequency: Option<f64>,
    #[arg(long)]
    enable_backchannel: Option<bool>,
    /// e.g. "off", "coffee-shop"
    #[arg(long)]
    ambient_sound: Option<String>,
    /// 0.0-1.0
    #[arg(long)]
    ambient_sound_volume: Option<f64>,
}

#[derive(clap::Args)]
struct CallForm {
    #[arg(long)]
    driver_name: Option<String>,
    #[arg(long)]
    load_number: Option<String>,
    /// checkin or emergency
    #[arg(long, default_value = "checkin")]
    scenario: ScenarioType,
}

#[derive(Subcommand)]
enum CallAction {
    /// Create a browser test call and print its access token
    Web {
        #[command(flatten)]
        form: CallForm,
        /// Follow the call status until it finishes
        #[arg(short, long)]
        watch: bool,
    },
    /// Call the driver's phone
    Phone {
        /// E.164 number, e.g. "+15551234567"
        #[arg(long)]
        driver_phone: String,
        #[command(flatten)]
        form: CallForm,
        /// Follow the call status until it finishes
        #[arg(short, long)]
        watch: bool,
    },
    /// Show one call with its results
    Show {
        id: String,
        /// Print the raw record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Follow a call until it reaches a final status (Ctrl-C stops)
    Watch { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Settings { action } => {
            cmd_settings(action.unwrap_or(SettingsAction::Show)).await
        }
        Commands::Config { action } => cmd_config(action).await,
        Commands::Call { action } => cmd_call(action).await,
        Commands::Calls {
            oldest_first,
            search,
        } => cmd_calls(oldest_first, search).await,
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "haulcall=debug,haulcall_cli=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn backend(config: &Config) -> Result<Arc<HttpBackend>> {
    let base_url = config.effective_base_url();
    let mut backend =
        HttpBackend::with_timeout(&base_url, Duration::from_secs(config.timeout_secs))
            .context("Failed to build HTTP client")?;

    if let Some(api_key) = &config.api_key {
        backend = backend.with_api_key(api_key.clone());
    }
    tracing::debug!(%base_url, "Using backend");
    Ok(Arc::new(backend))
}

// ============================================
// Command Implementations
// ============================================

async fn cmd_settings(action: SettingsAction) -> Result<()> {
    let mut config = Config::load()?;

    match action {
        SettingsAction::Show => {
            println!("{}", "Settings:".bold());
            println!("  Path: {:?}", Config::config_path()?);
            println!("  Base URL: {}", config.base_url);
            let effective = config.effective_base_url();
            if effective != config.base_url {
                println!(
                    "  {} {} (from {})",
                    "Effective URL:".yellow(),
                    effective,
                    config::API_URL_ENV
                );
            }
            println!(
                "  API Key: {}",
                if config.api_key.is_some() {
                    "Set".green()
                } else {
                    "Not set".red()
                }
            );
            println!("  Timeout: {}s", config.timeout_secs);
        }

        SettingsAction::SetUrl { url } => {
            config.set_base_url(&url);
            config.save()?;
            println!("{} Base URL set to {}", "✓".green(), config.base_url);
        }

        SettingsAction::SetKey { key } => {
            let api_key = match key {
                Some(k) => k,
                None => Password::new()
                    .with_prompt("API Key")
                    .interact()
                    .context("Failed to read API key")?,
            };
            config.set_api_key(api_key);

            print!("Testing connection... ");
            match backend(&config)?.health().await {
                Ok(true) => println!("{}", "OK".green()),
                _ => println!("{}", "Unreachable (key saved anyway)".yellow()),
            }

            config.save()?;
            println!("{} API key saved to {:?}", "✓".green(), Config::config_path()?);
        }
    }

    Ok(())
}

async fn cmd_config(action: ConfigAction) -> Result<()> {
    let config = Config::load()?;
    let api = backend(&config)?;

    match action {
        ConfigAction::Show { scenario } => {
            let mut editor = ConfigurationEditor::new(api);
            if let EditorState::LoadFailed { error, .. } = editor.select_scenario(scenario).await {
                bail!("{}", error);
            }
            let draft = editor.draft().context("No configuration loaded")?;
            display::print_draft(draft, editor.baseline());
        }

        ConfigAction::List => {
            let mut service = ConfigurationService::new(api);
            let configurations = service.list_all().await.map_err(|e| anyhow!("{}", e))?;

            if configurations.is_empty() {
                println!("No configurations found.");
                println!("\n{}", "Create one with:".dimmed());
                println!("  haulcall config edit <scenario> --prompt <text>");
                return Ok(());
            }

            println!("{}", "Configurations:".bold());
            for configuration in &configurations {
                display::print_configuration_row(configuration);
            }
        }

        ConfigAction::Edit { scenario, edits } => {
            let mut editor = ConfigurationEditor::new(api);
            if let EditorState::LoadFailed { error, .. } = editor.select_scenario(scenario).await {
                bail!("{}", error);
            }

            let prompt = match (edits.prompt.clone(), edits.prompt_file.as_deref()) {
                (Some(text), _) => Some(text),
                (None, Some(path)) => Some(
                    fs::read_to_string(path)
                        .with_context(|| format!("Failed to read file: {}", path))?,
                ),
                (None, None) => None,
            };

            let draft = editor.draft_mut().context("No configuration loaded")?;
            apply_edits(draft, prompt, edits);

            if draft.system_prompt.trim().is_empty() {
                draft.system_prompt = Input::new()
                    .with_prompt("System prompt")
                    .interact_text()
                    .context("Failed to read input")?;
            }

            if !editor.is_dirty() {
                println!("No changes to save.");
                return Ok(());
            }

            let saved = editor.save().await.map_err(|e| anyhow!("{}", e))?;
            println!(
                "{} Configuration for {} saved",
                "✓".green(),
                saved.scenario_type.to_string().cyan()
            );
        }
    }

    Ok(())
}

fn apply_edits(draft: &mut ConfigurationDraft, prompt: Option<String>, edits: ConfigEdits) {
    if let Some(prompt) = prompt {
        draft.system_prompt = prompt;
    }

    let settings = &mut draft.retell_settings;
    if let Some(voice_id) = edits.voice_id {
        settings.voice_id = voice_id;
    }
    if let Some(v) = edits.voice_speed {
        settings.voice_speed = v;
    }
    if let Some(v) = edits.voice_temperature {
        settings.voice_temperature = v;
    }
    if let Some(v) = edits.responsiveness {
        settings.responsiveness = v;
    }
    if let Some(v) = edits.interruption_sensitivity {
        settings.interruption_sensitivity = v;
    }
    if let Some(v) = edits.backchannel_frequency {
        settings.backchannel_frequency = v;
    }
    if let Some(v) = edits.enable_backchannel {
        settings.enable_backchannel = v;
    }
    if let Some(sound) = edits.ambient_sound {
        settings.ambient_sound = Some(sound);
    }
    if let Some(v) = edits.ambient_sound_volume {
        settings.ambient_sound_volume = v;
    }
}

/// Fill missing form fields interactively
fn complete_form(form: CallForm) -> Result<(String, String, ScenarioType)> {
    let driver_name = match form.driver_name {
        Some(name) => name,
        None => Input::new()
            .with_prompt("Driver name")
            .interact_text()
            .context("Failed to read input")?,
    };
    let load_number = match form.load_number {
        Some(number) => number,
        None => Input::new()
            .with_prompt("Load number")
            .interact_text()
            .context("Failed to read input")?,
    };

    if driver_name.trim().is_empty() || load_number.trim().is_empty() {
        bail!("Please fill in all fields");
    }
    Ok((driver_name, load_number, form.scenario))
}

async fn cmd_call(action: CallAction) -> Result<()> {
    let config = Config::load()?;
    let api = backend(&config)?;

    match action {
        CallAction::Web { form, watch } => {
            let (driver_name, load_number, scenario_type) = complete_form(form)?;
            let mut service = CallService::new(Arc::clone(&api));
            let created = service
                .initiate_web_call(&WebCallRequest {
                    driver_name,
                    load_number,
                    scenario_type,
                })
                .await
                .map_err(|e| anyhow!("{}", e))?;

            println!("{} Web call created", "✓".green());
            println!("  Call ID: {}", created.call_id.cyan());
            println!("  Access Token: {}", created.access_token);
            if let Some(retell_call_id) = &created.retell_call_id {
                println!("  Retell Call: {}", retell_call_id.dimmed());
            }

            if watch {
                println!();
                watch_call(api, &created.call_id).await?;
            } else {
                println!("\n{}", "Follow it with:".dimmed());
                println!("  haulcall call watch {}", created.call_id);
            }
        }

        CallAction::Phone {
            driver_phone,
            form,
            watch,
        } => {
            let (driver_name, load_number, scenario_type) = complete_form(form)?;
            let mut service = CallService::new(Arc::clone(&api));
            let created = service
                .initiate_phone_call(&PhoneCallRequest {
                    driver_name,
                    driver_phone,
                    load_number,
                    scenario_type,
                })
                .await
                .map_err(|e| anyhow!("{}", e))?;

            println!("{} Phone call placed", "✓".green());
            println!("  Call ID: {}", created.call_id.cyan());
            if let Some(status) = created.status {
                println!("  Status: {}", display::status_badge(status));
            }

            if watch {
                println!();
                watch_call(api, &created.call_id).await?;
            }
        }

        CallAction::Show { id, json } => {
            let mut service = CallService::new(api);
            let call = service.get_call(&id).await.map_err(|e| anyhow!("{}", e))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&call)?);
            } else {
                display::print_call(&call);
            }
        }

        CallAction::Watch { id } => watch_call(api, &id).await?,
    }

    Ok(())
}

/// Print status changes until the call finishes or Ctrl-C is pressed
async fn watch_call(api: Arc<HttpBackend>, call_id: &str) -> Result<()> {
    let mut observation = CallObserver::new(api).observe(call_id);

    let token = observation.cancel_token();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    println!("Watching {} {}", call_id.cyan(), "(Ctrl-C to stop)".dimmed());

    let mut last = None;
    let mut failure = None;
    while let Some(snapshot) = observation.next().await {
        match snapshot {
            Ok(call) => {
                if last.as_ref().map(|c: &Call| c.call_status) != Some(call.call_status) {
                    println!("  {}", display::status_badge(call.call_status));
                }
                last = Some(call);
            }
            Err(e) => failure = Some(e),
        }
    }
    ctrl_c.abort();

    if let Some(e) = failure {
        bail!("{}", e);
    }

    match last {
        Some(call) if call.call_status.is_terminal() => {
            println!();
            display::print_call(&call);
        }
        _ => println!("{}", "Stopped watching.".yellow()),
    }
    Ok(())
}

async fn cmd_calls(oldest_first: bool, search: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let mut browser = CallBrowser::new(backend(&config)?);

    let order = if oldest_first {
        SortOrder::Ascending
    } else {
        SortOrder::Descending
    };
    browser.set_order(order).await.map_err(|e| anyhow!("{}", e))?;
    if let Some(text) = search {
        browser.set_filter(text);
    }

    if let Some(empty) = browser.empty_state() {
        println!("{}", empty.message());
        if empty.can_clear_filter() {
            println!("\n{}", "Run without --search to see all calls.".dimmed());
        }
        return Ok(());
    }

    println!("{} ({})", "Previous Calls:".bold(), order.label().dimmed());
    for call in browser.visible() {
        display::print_call_row(call);
    }
    println!("\n{}", browser.summary().dimmed());

    Ok(())
}
