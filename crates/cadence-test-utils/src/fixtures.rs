// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned model outputs and requests.

use cadence_core::{GenerationRequest, ToneAxes};
use cadence_generator::vocabulary::step_plan;
use serde_json::json;

/// A well-formed profile-analysis reply.
pub fn analysis_response() -> String {
    json!({
        "summary": "Engineering leader scaling a platform organization.",
        "seniority": "executive",
        "communication_style": "Direct and data-driven.",
        "pain_points": ["on-call fatigue", "slow CI pipelines"],
        "interests": ["developer productivity"],
        "talking_points": ["recent conference talk on platform teams"],
        "personalization_hooks": ["moved from Stripe last year"],
    })
    .to_string()
}

/// A well-formed sequence reply with one message per planned step.
pub fn sequence_response(steps: u32) -> String {
    let messages: Vec<_> = step_plan(steps)
        .into_iter()
        .enumerate()
        .map(|(i, message_type)| {
            json!({
                "step_number": i + 1,
                "message_type": message_type.to_string(),
                "subject": format!("Step {} subject", i + 1),
                "body": format!("Hi there, this is message {}.", i + 1),
                "thinking_process": "Anchored on the prospect's stated pain point.",
                "confidence": 0.8,
                "personalization_points": [{
                    "point": "slow CI pipelines",
                    "source": "profile analysis",
                    "reasoning": "Listed as a pain point.",
                }],
            })
        })
        .collect();
    json!({"messages": messages, "overall_confidence": 0.82}).to_string()
}

/// The same reply wrapped in a markdown fence with a prose preamble.
pub fn fenced(body: &str) -> String {
    format!("Here is the result you asked for:\n```json\n{body}\n```\nLet me know!")
}

/// A generation request with the given subject and step count and a
/// formal, warm, balanced tone.
pub fn request(subject: &str, steps: u32) -> GenerationRequest {
    GenerationRequest {
        subject: subject.to_string(),
        tone: ToneAxes::new(0.8, 0.6, 0.5),
        tone_config_id: None,
        context: "We sell CI acceleration for platform teams.".to_string(),
        steps,
    }
}
