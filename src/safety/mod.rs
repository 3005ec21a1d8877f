// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Keyword-based prompt safety gate

use serde::{Deserialize, Serialize};

/// Denylisted substrings checked against every prompt. Multi-script on
/// purpose: English and Japanese terms plus brand names the operator does
/// not want reproduced in generated content.
const DENYLIST: &[&str] = &[
    "殺",
    "死",
    "暴力",
    "violence",
    "kill",
    "death",
    "nude",
    "sex",
    "porn",
    "裸",
    "性的",
    "トヨタ",
    "ソニー",
    "アップル",
    "マクドナルド",
    "coca-cola",
    "nike",
];

/// Fixed user-facing message for rejected prompts. The matched term is
/// logged server-side but never echoed back to the caller.
pub const REJECTION_MESSAGE: &str =
    "the prompt may contain inappropriate content; try a different phrasing";

/// Result of a safety check. Ephemeral, computed per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafetyVerdict {
    pub safe: bool,
    pub reason: Option<String>,
}

impl SafetyVerdict {
    fn safe() -> Self {
        Self {
            safe: true,
            reason: None,
        }
    }

    fn unsafe_with_reason(reason: &str) -> Self {
        Self {
            safe: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// Cheap synchronous first-line filter against the keyword denylist.
///
/// This is a heuristic tripwire, not a guarantee: false negatives and false
/// positives (a denylisted substring inside an unrelated word) are both
/// expected. The upstream provider's own moderation remains the backstop.
pub struct SafetyGate {
    extra_terms: Vec<String>,
}

impl SafetyGate {
    pub fn new() -> Self {
        Self {
            extra_terms: Vec::new(),
        }
    }

    /// Extend the built-in denylist with operator-supplied terms.
    pub fn with_extra_terms(extra_terms: Vec<String>) -> Self {
        Self { extra_terms }
    }

    /// Case-insensitive substring check against the denylist. Returns the
    /// verdict for the first matching term; deterministic for a given input.
    pub fn evaluate(&self, text: &str) -> SafetyVerdict {
        let lower = text.to_lowercase();

        for term in DENYLIST {
            if lower.contains(&term.to_lowercase()) {
                tracing::debug!(term = %term, "prompt blocked by denylist");
                return SafetyVerdict::unsafe_with_reason(REJECTION_MESSAGE);
            }
        }
        for term in &self.extra_terms {
            if lower.contains(&term.to_lowercase()) {
                tracing::debug!(term = %term, "prompt blocked by custom term");
                return SafetyVerdict::unsafe_with_reason(REJECTION_MESSAGE);
            }
        }

        SafetyVerdict::safe()
    }
}

impl Default for SafetyGate {
    fn default() -> Self {
        Self::new()
    }
}
