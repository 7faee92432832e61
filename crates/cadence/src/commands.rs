// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations.

use std::io::IsTerminal;
use std::time::Duration;

use cadence_config::CadenceConfig;
use cadence_core::{CadenceError, GenerationRequest, SequenceStatus, ToneAxes};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::app::{App, Mode};
use crate::render;
use crate::shutdown::install_signal_handler;

/// Tone axes shared by `generate`, `tone preview` and `tone save`.
#[derive(Args, Debug, Clone)]
pub struct ToneArgs {
    /// Casual (0.0) to formal (1.0).
    #[arg(long, default_value_t = 0.5)]
    pub formality: f64,
    /// Reserved (0.0) to warm (1.0).
    #[arg(long, default_value_t = 0.5)]
    pub warmth: f64,
    /// Indirect (0.0) to direct (1.0).
    #[arg(long, default_value_t = 0.5)]
    pub directness: f64,
    #[arg(long)]
    pub humor: Option<f64>,
    #[arg(long)]
    pub enthusiasm: Option<f64>,
    /// Free-form instructions appended to the tone guidance.
    #[arg(long)]
    pub instructions: Option<String>,
}

impl ToneArgs {
    pub fn axes(&self) -> ToneAxes {
        ToneAxes {
            formality: self.formality,
            warmth: self.warmth,
            directness: self.directness,
            humor: self.humor,
            enthusiasm: self.enthusiasm,
            custom_instructions: self.instructions.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Prospect identifier or profile URL.
    pub subject: String,
    #[command(flatten)]
    pub tone: ToneArgs,
    /// Use a saved tone configuration instead of the axis flags.
    #[arg(long)]
    pub tone_id: Option<String>,
    /// What you are reaching out about.
    #[arg(long, default_value = "")]
    pub context: String,
    /// Number of messages (defaults to `generation.default_steps`).
    #[arg(long)]
    pub steps: Option<u32>,
    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CadenceError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| CadenceError::Internal(format!("failed to serialize output: {e}")))?;
    println!("{text}");
    Ok(())
}

fn spinner(message: &str) -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
        .template("{spinner:.cyan} {msg} {elapsed:.dim}")
    {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

/// Builds the request from CLI arguments and config defaults.
pub fn build_request(args: &GenerateArgs, config: &CadenceConfig) -> GenerationRequest {
    GenerationRequest {
        subject: args.subject.clone(),
        tone: args.tone.axes(),
        tone_config_id: args.tone_id.clone(),
        context: args.context.clone(),
        steps: args.steps.unwrap_or(config.generation.default_steps),
    }
}

/// `cadence generate`: runs both passes, Ctrl-C cancels.
pub async fn run_generate(config: CadenceConfig, args: GenerateArgs) -> Result<(), CadenceError> {
    let request = build_request(&args, &config);
    let app = App::open(config, Mode::Generate).await?;
    let cancel = install_signal_handler();

    let bar = if args.json {
        ProgressBar::hidden()
    } else {
        spinner(&format!("generating {} steps for {}", request.steps, request.subject))
    };
    let outcome = app.generator.generate(&request, &cancel).await;
    bar.finish_and_clear();
    app.close().await;

    let result = outcome?;
    if args.json {
        print_json(&result)
    } else {
        print!("{}", render::sequence_report(&result));
        Ok(())
    }
}

/// `cadence show <id>`: one sequence with its attempt log.
pub async fn run_show(
    config: CadenceConfig,
    id: &str,
    attempts: bool,
    json: bool,
) -> Result<(), CadenceError> {
    let app = App::open(config, Mode::ReadOnly).await?;
    let result = app.generator.get_sequence_result(id).await?;
    let log = if attempts {
        app.generator.attempts(id).await?
    } else {
        Vec::new()
    };
    app.close().await;

    if json {
        #[derive(Serialize)]
        struct ShowOutput<'a> {
            #[serde(flatten)]
            result: &'a cadence_core::SequenceResult,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            attempts: Vec<cadence_core::GenerationAttempt>,
        }
        return print_json(&ShowOutput {
            result: &result,
            attempts: log,
        });
    }

    print!("{}", render::sequence_report(&result));
    if attempts {
        println!();
        println!("Attempts:");
        print!("{}", render::attempt_table(&log));
    }
    Ok(())
}

/// `cadence list`.
pub async fn run_list(
    config: CadenceConfig,
    status: Option<SequenceStatus>,
    json: bool,
) -> Result<(), CadenceError> {
    let app = App::open(config, Mode::ReadOnly).await?;
    let sequences = app.generator.list_sequences(status).await?;
    app.close().await;

    if json {
        print_json(&sequences)
    } else {
        print!("{}", render::sequence_table(&sequences));
        Ok(())
    }
}

/// `cadence tone preview`: prints the instructions the model would see.
pub fn run_tone_preview(tone: &ToneArgs) -> Result<(), CadenceError> {
    let axes = tone.axes();
    axes.validate()?;
    println!("{}", cadence_tone::translate(&axes));
    Ok(())
}

pub async fn run_tone_save(
    config: CadenceConfig,
    name: &str,
    tone: &ToneArgs,
) -> Result<(), CadenceError> {
    let app = App::open(config, Mode::ReadOnly).await?;
    let saved = app.generator.save_tone_config(name, tone.axes()).await;
    app.close().await;

    let saved = saved?;
    println!("Saved tone configuration {} ({})", saved.name, saved.id);
    Ok(())
}

pub async fn run_tone_list(config: CadenceConfig, json: bool) -> Result<(), CadenceError> {
    let app = App::open(config, Mode::ReadOnly).await?;
    let configs = app.generator.tone_configs().await?;
    app.close().await;

    if json {
        print_json(&configs)
    } else {
        print!("{}", render::tone_table(&configs));
        Ok(())
    }
}

/// `cadence usage`: attempt aggregates for one UTC day.
pub async fn run_usage(config: CadenceConfig, date: Option<String>) -> Result<(), CadenceError> {
    let date = date.unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%d").to_string());
    chrono::NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|e| CadenceError::Validation(format!("invalid date '{date}': {e}")))?;

    let app = App::open(config, Mode::ReadOnly).await?;
    let usage = app.ledger.daily_summary(&date).await;
    app.close().await;

    print!("{}", render::usage_report(&date, &usage?));
    Ok(())
}

/// `cadence config check`: the config already validated at startup.
pub fn run_config_check(config: &CadenceConfig) {
    use colored::Colorize;

    println!("{} configuration is valid", "✓".green());
    println!("    Provider:  {}", config.provider.kind);
    println!("    Endpoint:  {}", config.provider.effective_base_url());
    println!(
        "    Models:    {}{}",
        config.provider.model,
        config
            .provider
            .fallback_model
            .as_deref()
            .map(|m| format!(" -> {m}"))
            .unwrap_or_default()
    );
    println!(
        "    Retries:   {} per model, backoff base {}ms",
        config.retry.max_retries, config.retry.backoff_base_ms
    );
    println!("    Database:  {}", config.storage.database_path);
}

/// `cadence config show`.
pub fn run_config_show(config: &CadenceConfig) -> Result<(), CadenceError> {
    let rendered = config
        .to_redacted_toml()
        .map_err(|e| CadenceError::Internal(format!("failed to render config: {e}")))?;
    print!("{rendered}");
    Ok(())
}
