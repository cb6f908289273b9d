// src/models/settings.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MIN_QUESTIONS: u32 = 1;
pub const MAX_QUESTIONS: u32 = 20;
pub const DEFAULT_QUESTIONS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[default]
    Mixed,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Mixed => "mixed",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            "mixed" => Some(Difficulty::Mixed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExplanationDetail {
    #[default]
    Brief,
    Detailed,
}

impl ExplanationDetail {
    pub fn as_str(self) -> &'static str {
        match self {
            ExplanationDetail::Brief => "brief",
            ExplanationDetail::Detailed => "detailed",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "brief" => Some(ExplanationDetail::Brief),
            "detailed" => Some(ExplanationDetail::Detailed),
            _ => None,
        }
    }
}

/// User-chosen generation parameters.
///
/// Always holds coerced values: `number_of_questions` is within
/// [`MIN_QUESTIONS`, `MAX_QUESTIONS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    pub number_of_questions: u32,
    pub difficulty: Difficulty,
    pub explanation: ExplanationDetail,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            number_of_questions: DEFAULT_QUESTIONS,
            difficulty: Difficulty::default(),
            explanation: ExplanationDetail::default(),
        }
    }
}

impl GenerationSettings {
    /// Coerces the raw `settings` form field. Never fails: anything
    /// unusable falls back to the defaults.
    pub fn from_form_field(raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
            return Self::default();
        };

        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::coerce(&value),
            Err(e) => {
                tracing::warn!("Error parsing settings, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Field-by-field coercion of an already decoded settings object.
    pub fn coerce(value: &Value) -> Self {
        let number_of_questions = value
            .get("numberOfQuestions")
            .and_then(leading_integer)
            .map(|n| n.clamp(MIN_QUESTIONS as i64, MAX_QUESTIONS as i64) as u32)
            .unwrap_or(DEFAULT_QUESTIONS);

        let difficulty = value
            .get("difficulty")
            .and_then(Value::as_str)
            .and_then(Difficulty::parse)
            .unwrap_or_default();

        let explanation = value
            .get("explanation")
            .and_then(Value::as_str)
            .and_then(ExplanationDetail::parse)
            .unwrap_or_default();

        Self {
            number_of_questions,
            difficulty,
            explanation,
        }
    }
}

/// Integer reading of a loosely typed value: numbers truncate toward
/// zero, strings use their leading integer prefix (`"12abc"` is 12).
fn leading_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim_start();
            let (sign, digits) = match s.strip_prefix('-') {
                Some(rest) => (-1, rest),
                None => (1, s.strip_prefix('+').unwrap_or(s)),
            };
            let end = digits
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(digits.len());
            if end == 0 {
                return None;
            }
            // Saturate instead of overflowing; the caller clamps anyway.
            let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
            Some(sign * magnitude)
        }
        _ => None,
    }
}
