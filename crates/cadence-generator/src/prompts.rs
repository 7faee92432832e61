// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly for both generation passes.
//!
//! Prompts are plain text with an embedded JSON contract. The recovery
//! parser tolerates the usual ways models drift from that contract, so the
//! wording here only has to make the intended shape unambiguous.

use std::fmt::Write as _;

use cadence_core::{MessageType, Profile, PromptMessage};
use serde_json::Value;

use crate::analysis::{ARRAY_FIELDS, SENIORITY_LEVELS};

const ANALYSIS_SYSTEM: &str = "You are a B2B sales research analyst. You study a prospect's \
professional profile and identify what a thoughtful seller should know before reaching out. \
Respond with a single JSON object and nothing else.";

const SEQUENCE_SYSTEM: &str = "You are an expert at writing personalized LinkedIn outreach \
sequences. Every message must be grounded in the prospect analysis you are given, and every \
personalization claim must cite where it came from. Respond with a single JSON object and \
nothing else.";

/// Renders the profile fields the analysis pass needs.
///
/// At most `max_experiences` entries of `data.experience` and
/// `max_education` entries of `data.education` are included. Empty fields
/// are skipped.
pub fn profile_summary(profile: &Profile, max_experiences: usize, max_education: usize) -> String {
    let mut out = String::new();
    let mut line = |label: &str, value: &str| {
        if !value.trim().is_empty() {
            let _ = writeln!(out, "{label}: {}", value.trim());
        }
    };

    line("Name", &profile.name);
    line("Headline", &profile.headline);
    let current = match (profile.role.trim(), profile.company.trim()) {
        ("", "") => String::new(),
        (role, "") => role.to_string(),
        ("", company) => company.to_string(),
        (role, company) => format!("{role} at {company}"),
    };
    line("Current role", &current);
    line("Location", &profile.location);
    line("Industry", &profile.industry);
    line("Summary", &profile.summary);

    let experience = entries(&profile.data, "experience", max_experiences, format_experience);
    if !experience.is_empty() {
        out.push_str("Experience:\n");
        for entry in experience {
            let _ = writeln!(out, "- {entry}");
        }
    }

    let education = entries(&profile.data, "education", max_education, format_education);
    if !education.is_empty() {
        out.push_str("Education:\n");
        for entry in education {
            let _ = writeln!(out, "- {entry}");
        }
    }

    out.trim_end().to_string()
}

fn entries(data: &Value, key: &str, limit: usize, format: fn(&Value) -> String) -> Vec<String> {
    data.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(format)
                .filter(|s| !s.is_empty())
                .take(limit)
                .collect()
        })
        .unwrap_or_default()
}

fn field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("").trim()
}

fn format_experience(entry: &Value) -> String {
    let mut text = match (field(entry, "title"), field(entry, "company")) {
        ("", "") => return String::new(),
        (title, "") => title.to_string(),
        ("", company) => company.to_string(),
        (title, company) => format!("{title} at {company}"),
    };
    let duration = field(entry, "duration");
    if !duration.is_empty() {
        let _ = write!(text, " ({duration})");
    }
    let description = field(entry, "description");
    if !description.is_empty() {
        let _ = write!(text, ": {description}");
    }
    text
}

fn format_education(entry: &Value) -> String {
    let school = field(entry, "school");
    if school.is_empty() {
        return String::new();
    }
    let degree = [field(entry, "degree"), field(entry, "field")]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    let mut text = if degree.is_empty() {
        school.to_string()
    } else {
        format!("{degree}, {school}")
    };
    let years = field(entry, "years");
    if !years.is_empty() {
        let _ = write!(text, " ({years})");
    }
    text
}

/// Pass 1 prompt: profile summary plus the seller's context.
pub fn analysis_prompt(profile_summary: &str, context: &str) -> Vec<PromptMessage> {
    let arrays = ARRAY_FIELDS
        .iter()
        .map(|f| format!("  \"{f}\": [string, ...]"))
        .collect::<Vec<_>>()
        .join(",\n");
    let user = format!(
        "Analyze this prospect.\n\n\
         ## Profile\n{profile_summary}\n\n\
         ## Seller context\n{context}\n\n\
         Return JSON with exactly these keys:\n\
         {{\n  \"summary\": string,\n  \"seniority\": one of {seniority},\n  \
         \"communication_style\": string,\n{arrays}\n}}",
        context = or_none(context),
        seniority = SENIORITY_LEVELS.join(" | "),
    );
    vec![PromptMessage::system(ANALYSIS_SYSTEM), PromptMessage::user(user)]
}

/// Pass 2 prompt: tone instructions, context, pass-1 analysis, and one
/// message type per step.
pub fn sequence_prompt(
    tone_instructions: &str,
    context: &str,
    analysis: &Value,
    plan: &[MessageType],
) -> Vec<PromptMessage> {
    let system = format!("{SEQUENCE_SYSTEM}\n\n## Tone\n{tone_instructions}");
    let steps = plan
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{}. {t}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");
    let analysis_json =
        serde_json::to_string_pretty(analysis).unwrap_or_else(|_| analysis.to_string());
    let user = format!(
        "Write a {count}-message outreach sequence.\n\n\
         ## Seller context\n{context}\n\n\
         ## Prospect analysis\n{analysis_json}\n\n\
         ## Steps\n{steps}\n\n\
         Return JSON of the form:\n\
         {{\n  \"messages\": [\n    {{\n      \"step_number\": integer,\n      \
         \"message_type\": string,\n      \"subject\": string or null,\n      \
         \"body\": string,\n      \"thinking_process\": string,\n      \
         \"confidence\": number between 0 and 1,\n      \
         \"personalization_points\": [{{\"point\": string, \"source\": string, \"reasoning\": string}}]\n    \
         }}\n  ],\n  \"overall_confidence\": number between 0 and 1\n}}\n\n\
         The messages array must contain exactly {count} entries in step order.",
        count = plan.len(),
        context = or_none(context),
    );
    vec![PromptMessage::system(system), PromptMessage::user(user)]
}

fn or_none(text: &str) -> &str {
    if text.trim().is_empty() {
        "(none provided)"
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::MessageRole;
    use serde_json::json;

    fn profile() -> Profile {
        Profile {
            id: "p1".into(),
            identifier: "jane-doe".into(),
            name: "Jane Doe".into(),
            headline: "VP Engineering at Acme".into(),
            role: "VP Engineering".into(),
            company: "Acme".into(),
            location: "Berlin".into(),
            industry: String::new(),
            summary: "Builds platform teams.".into(),
            data: json!({
                "experience": (1..=7).map(|i| json!({
                    "title": format!("Role {i}"),
                    "company": format!("Company {i}"),
                    "duration": "2 yrs",
                })).collect::<Vec<_>>(),
                "education": [
                    {"school": "TU Munich", "degree": "MSc", "field": "Computer Science", "years": "2008-2010"},
                    {"school": "LMU", "degree": "BSc"},
                    {"school": "ETH"},
                    {"school": "MIT"},
                ],
            }),
            source: "synthetic".into(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn summary_limits_experience_and_education() {
        let text = profile_summary(&profile(), 5, 3);
        assert!(text.contains("Role 5 at Company 5 (2 yrs)"));
        assert!(!text.contains("Role 6"));
        assert!(text.contains("MSc, Computer Science, TU Munich (2008-2010)"));
        assert!(text.contains("- ETH"));
        assert!(!text.contains("MIT"));
    }

    #[test]
    fn summary_skips_empty_fields() {
        let text = profile_summary(&profile(), 5, 3);
        assert!(text.starts_with("Name: Jane Doe\n"));
        assert!(text.contains("Current role: VP Engineering at Acme"));
        assert!(!text.contains("Industry"));
    }

    #[test]
    fn summary_without_blob_has_no_sections() {
        let mut p = profile();
        p.data = json!({});
        let text = profile_summary(&p, 5, 3);
        assert!(!text.contains("Experience:"));
        assert!(!text.contains("Education:"));
    }

    #[test]
    fn analysis_prompt_embeds_profile_and_context() {
        let prompt = analysis_prompt("Name: Jane", "Selling observability tooling");
        assert_eq!(prompt.len(), 2);
        assert_eq!(prompt[0].role, MessageRole::System);
        assert!(prompt[1].content.contains("Name: Jane"));
        assert!(prompt[1].content.contains("Selling observability tooling"));
        assert!(prompt[1].content.contains("\"pain_points\""));
    }

    #[test]
    fn empty_context_is_marked() {
        let prompt = analysis_prompt("Name: Jane", "  ");
        assert!(prompt[1].content.contains("(none provided)"));
    }

    #[test]
    fn sequence_prompt_lists_steps_and_tone() {
        let plan = [
            MessageType::ConnectionRequest,
            MessageType::FollowUpValue,
            MessageType::DirectAsk,
        ];
        let prompt = sequence_prompt(
            "Write formally.",
            "ctx",
            &json!({"seniority": "executive"}),
            &plan,
        );
        assert!(prompt[0].content.contains("Write formally."));
        let user = &prompt[1].content;
        assert!(user.contains("1. connection_request\n2. follow_up_value\n3. direct_ask"));
        assert!(user.contains("\"seniority\": \"executive\""));
        assert!(user.contains("exactly 3 entries"));
    }
}
