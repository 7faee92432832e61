// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message-type vocabulary sliced to the requested step count.

use cadence_core::MessageType;

/// Message types offered to the model for a sequence of `steps` messages.
///
/// Short sequences skip the middle of the canonical arc so that a
/// three-step sequence still ends with a direct ask.
pub fn message_types(steps: u32) -> Vec<MessageType> {
    use cadence_core::MessageType::*;
    match steps {
        0 | 1 => vec![ConnectionRequest],
        2 => vec![ConnectionRequest, FollowUpValue],
        3 => vec![ConnectionRequest, FollowUpValue, DirectAsk],
        n => MessageType::CANONICAL
            .iter()
            .copied()
            .take(n as usize)
            .collect(),
    }
}

/// One message type per step.
///
/// Equal to [`message_types`] up to six steps. Longer sequences repeat the
/// value-adding middle types and keep the ask and breakup last.
pub fn step_plan(steps: u32) -> Vec<MessageType> {
    use cadence_core::MessageType::*;
    let steps = steps.max(1) as usize;
    let canonical = MessageType::CANONICAL.len();
    if steps <= canonical {
        return message_types(steps as u32);
    }
    let middle = [FollowUpValue, CaseStudy, SocialProof];
    let mut plan = MessageType::CANONICAL[..4].to_vec();
    plan.extend(middle.iter().cycle().take(steps - canonical));
    plan.extend([DirectAsk, Breakup]);
    plan
}
