// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tone translation.
//!
//! Each axis value is bucketed into a tier (`<= 0.3` low, `<= 0.7` medium,
//! otherwise high) and each (axis, tier) pair maps to one fixed paragraph.
//! The translation is pure: same axes, same string.

use cadence_core::ToneAxes;
use strum::{Display, EnumIter, IntoEnumIterator};

/// Upper bound (inclusive) of the low tier.
pub const LOW_MAX: f64 = 0.3;

/// Upper bound (inclusive) of the medium tier.
pub const MEDIUM_MAX: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Tier {
    Low,
    Medium,
    High,
}

impl Tier {
    /// Bucket a value in `[0, 1]`. Range checking is the caller's job.
    pub fn classify(value: f64) -> Tier {
        if value <= LOW_MAX {
            Tier::Low
        } else if value <= MEDIUM_MAX {
            Tier::Medium
        } else {
            Tier::High
        }
    }
}

/// The tone axes, in the order their paragraphs appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Axis {
    Formality,
    Warmth,
    Directness,
    Humor,
    Enthusiasm,
}

impl Axis {
    /// The axis value, or `None` for an optional axis the caller left unset.
    pub fn value(self, axes: &ToneAxes) -> Option<f64> {
        match self {
            Axis::Formality => Some(axes.formality),
            Axis::Warmth => Some(axes.warmth),
            Axis::Directness => Some(axes.directness),
            Axis::Humor => axes.humor,
            Axis::Enthusiasm => axes.enthusiasm,
        }
    }

    pub fn instruction(self, tier: Tier) -> &'static str {
        use Tier::*;
        match (self, tier) {
            (Axis::Formality, Low) => {
                "Write casually, the way you would message a peer you already know. \
                 Contractions and short sentences are fine; skip formal greetings and sign-offs."
            }
            (Axis::Formality, Medium) => {
                "Use a professional but relaxed register. Be polite and clear without \
                 sounding stiff, and address the recipient by first name."
            }
            (Axis::Formality, High) => {
                "Write in a formal, polished business register. Use complete sentences, \
                 avoid slang and contractions, and open and close courteously."
            }
            (Axis::Warmth, Low) => {
                "Keep the tone neutral and matter-of-fact. Focus on substance rather than \
                 rapport-building."
            }
            (Axis::Warmth, Medium) => {
                "Be friendly and personable. Show genuine interest in the recipient's work \
                 without overdoing compliments."
            }
            (Axis::Warmth, High) => {
                "Be warm and empathetic. Acknowledge the recipient's achievements and \
                 challenges sincerely so they feel personally seen."
            }
            (Axis::Directness, Low) => {
                "Take a soft, exploratory approach. Ask open questions and let the value \
                 emerge before making any request."
            }
            (Axis::Directness, Medium) => {
                "Balance context with clarity. State why you are reaching out early, then \
                 support it with relevant detail."
            }
            (Axis::Directness, High) => {
                "Be direct and concise. Lead with the point, make a specific ask, and cut \
                 anything that does not earn its place."
            }
            (Axis::Humor, Low) => {
                "Keep the tone serious. Do not use jokes, puns, or playful asides."
            }
            (Axis::Humor, Medium) => {
                "A light touch of wit is welcome where it feels natural, but never at the \
                 expense of clarity."
            }
            (Axis::Humor, High) => {
                "Let personality and playful humor show. A clever line or self-aware aside \
                 is encouraged when it suits the recipient."
            }
            (Axis::Enthusiasm, Low) => {
                "Stay calm and understated. Avoid exclamation points and hype."
            }
            (Axis::Enthusiasm, Medium) => {
                "Show measured interest and positive energy without overselling."
            }
            (Axis::Enthusiasm, High) => {
                "Be energetic and enthusiastic. Convey real excitement about the opportunity \
                 and about the recipient's work."
            }
        }
    }
}

/// Tier assigned to every supplied axis, in paragraph order.
pub fn classify_axes(axes: &ToneAxes) -> Vec<(Axis, Tier)> {
    Axis::iter()
        .filter_map(|axis| axis.value(axes).map(|v| (axis, Tier::classify(v))))
        .collect()
}

/// Translate tone axes into instruction paragraphs separated by blank lines.
///
/// Formality, warmth, and directness always contribute. Humor and enthusiasm
/// contribute only when set. Non-blank custom instructions are appended
/// verbatim as the final paragraph.
pub fn translate(axes: &ToneAxes) -> String {
    let mut paragraphs: Vec<&str> = classify_axes(axes)
        .into_iter()
        .map(|(axis, tier)| axis.instruction(tier))
        .collect();

    if let Some(custom) = axes.custom_instructions.as_deref() {
        if !custom.trim().is_empty() {
            paragraphs.push(custom);
        }
    }

    paragraphs.join("\n\n")
}
