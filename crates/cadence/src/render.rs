// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human-readable terminal output.
//!
//! Each function returns the rendered text; callers decide where it goes.
//! Color is controlled globally through `colored::control`.

use std::fmt::Write;

use cadence_core::{
    AttemptStatus, AttemptSummary, GenerationAttempt, Sequence, SequenceResult, SequenceStatus,
    ToneConfig,
};
use colored::Colorize;

fn status_label(status: SequenceStatus) -> String {
    let text = status.to_string();
    match status {
        SequenceStatus::Completed => text.green().to_string(),
        SequenceStatus::Failed => text.red().to_string(),
        SequenceStatus::Pending | SequenceStatus::Generating => text.yellow().to_string(),
    }
}

fn usage_line(usage: &AttemptSummary) -> String {
    format!(
        "{} attempts, {} tokens, ${:.4} ({})",
        usage.attempt_count,
        usage.total_tokens,
        usage.total_cost_usd,
        if usage.models.is_empty() {
            "no models".to_string()
        } else {
            usage.models.join(", ")
        }
    )
}

/// A full sequence: header, analysis summary, and every message.
pub fn sequence_report(result: &SequenceResult) -> String {
    let seq = &result.sequence;
    let mut out = String::new();

    let _ = writeln!(out, "{} {}", "Sequence".bold(), seq.id);
    let _ = writeln!(out, "    Status:     {}", status_label(seq.status));
    let _ = writeln!(out, "    Steps:      {}", seq.step_count);
    if let Some(confidence) = seq.overall_confidence {
        let _ = writeln!(out, "    Confidence: {confidence:.2}");
    }
    let _ = writeln!(out, "    Usage:      {}", usage_line(&result.usage));
    if let Some(err) = &seq.error_message {
        let _ = writeln!(out, "    Error:      {}", err.red());
    }
    if let Some(summary) = seq
        .prospect_analysis
        .as_ref()
        .and_then(|a| a.get("summary"))
        .and_then(|s| s.as_str())
        .filter(|s| !s.is_empty())
    {
        let _ = writeln!(out, "    Prospect:   {summary}");
    }

    for message in &result.messages {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{} {}  {}",
            format!("[{}]", message.step_number).cyan().bold(),
            message.message_type.to_string().bold(),
            format!("confidence {:.2}", message.confidence).dimmed()
        );
        if let Some(subject) = &message.subject {
            let _ = writeln!(out, "Subject: {subject}");
        }
        let _ = writeln!(out, "{}", message.body);
        for point in &message.personalization_points {
            let _ = writeln!(out, "  {} {}", "•".dimmed(), point.point);
        }
    }
    out
}

/// One line per sequence, newest first as returned by storage.
pub fn sequence_table(sequences: &[Sequence]) -> String {
    if sequences.is_empty() {
        return "No sequences.\n".to_string();
    }
    let mut out = String::new();
    for seq in sequences {
        let _ = writeln!(
            out,
            "{}  {:<10}  {:>2} steps  {}",
            seq.id,
            status_label(seq.status),
            seq.step_count,
            seq.created_at.dimmed()
        );
    }
    out
}

/// The attempt log for one sequence.
pub fn attempt_table(attempts: &[GenerationAttempt]) -> String {
    let mut out = String::new();
    for (i, attempt) in attempts.iter().enumerate() {
        let status = match attempt.status {
            AttemptStatus::Success => "✓".green().to_string(),
            AttemptStatus::Error => "✗".red().to_string(),
            AttemptStatus::Timeout => "⏱".yellow().to_string(),
        };
        let _ = write!(
            out,
            "  {status} #{:<2} {:<20} {:<14} {:>6}ms",
            i + 1,
            attempt.phase.to_string(),
            attempt.model,
            attempt.latency_ms
        );
        if let Some(tokens) = attempt.total_tokens {
            let _ = write!(out, "  {tokens} tok");
        }
        if let Some(err) = &attempt.error_message {
            let _ = write!(out, "  {}", err.red());
        }
        let _ = writeln!(out);
    }
    out
}

/// Saved tone configurations with their axis values.
pub fn tone_table(configs: &[ToneConfig]) -> String {
    if configs.is_empty() {
        return "No tone configurations.\n".to_string();
    }
    let mut out = String::new();
    for config in configs {
        let axes = &config.axes;
        let _ = writeln!(
            out,
            "{}  {}  formality={:.2} warmth={:.2} directness={:.2} humor={:.2} enthusiasm={:.2}",
            config.id.dimmed(),
            config.name.bold(),
            axes.formality,
            axes.warmth,
            axes.directness,
            axes.humor_or_default(),
            axes.enthusiasm_or_default()
        );
    }
    out
}

/// Aggregates for a calendar day.
pub fn usage_report(date: &str, usage: &AttemptSummary) -> String {
    format!("{} {date}\n    {}\n", "Usage".bold(), usage_line(usage))
}
