// src/generation/parser.rs

//! Decoding of raw model output.
//!
//! The model is asked for JSON, but replies occasionally arrive as YAML or
//! wrapped in a markdown code fence. Decoders are tried in order and the
//! first one that succeeds wins; nothing here looks at individual fields.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*```[A-Za-z]*[ \t]*\r?\n?").expect("static regex"));

static CLOSING_FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r?\n?```\s*$").expect("static regex"));

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("response is neither JSON nor YAML: {}", .attempts.join("; "))]
    Undecodable { attempts: Vec<String> },
    #[error("expected a top-level array, found {found}")]
    NotAnArray { found: &'static str },
}

/// The format the model was asked to produce. Tried first; the other one is the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decoder {
    Json,
    Yaml,
}

impl Decoder {
    fn name(self) -> &'static str {
        match self {
            Decoder::Json => "json",
            Decoder::Yaml => "yaml",
        }
    }

    /// YAML would read JSON flow syntax that failed strict decoding as
    /// double-quoted scalars, turning LaTeX like `\alpha` into control bytes.
    fn accepts(self, text: &str) -> bool {
        match self {
            Decoder::Json => true,
            Decoder::Yaml => !text.trim_start().starts_with(['[', '{']),
        }
    }

    fn decode(self, text: &str) -> Result<Value, String> {
        match self {
            Decoder::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            Decoder::Yaml => serde_yml::from_str(text).map_err(|e| e.to_string()),
        }
    }
}

impl ResponseFormat {
    fn decoders(self) -> [Decoder; 2] {
        match self {
            ResponseFormat::Json => [Decoder::Json, Decoder::Yaml],
            ResponseFormat::Yaml => [Decoder::Yaml, Decoder::Json],
        }
    }
}

/// A decoded array element that has not been validated yet.
#[derive(Debug, Clone, PartialEq)]
pub struct UntrustedQuestion(pub Value);

/// One-shot sequence of decoded elements, in response order.
#[derive(Debug)]
pub struct UntrustedQuestions {
    inner: std::vec::IntoIter<Value>,
}

impl Iterator for UntrustedQuestions {
    type Item = UntrustedQuestion;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(UntrustedQuestion)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for UntrustedQuestions {}

/// Removes a markdown code fence (```` ```json ````, ```` ```yaml ````, bare ```` ``` ````)
/// wrapping the whole text. Fences inside the content are left alone.
pub fn strip_code_fence(text: &str) -> String {
    let opened = OPENING_FENCE.replace(text, "");
    CLOSING_FENCE.replace(&opened, "").trim().to_string()
}

/// Decodes `raw` into untrusted question values.
pub fn parse_response(raw: &str, format: ResponseFormat) -> Result<UntrustedQuestions, ParseError> {
    let value = decode_any(raw, format)?;

    match value {
        Value::Array(items) => Ok(UntrustedQuestions {
            inner: items.into_iter(),
        }),
        other => Err(ParseError::NotAnArray {
            found: kind_of(&other),
        }),
    }
}

fn decode_any(raw: &str, format: ResponseFormat) -> Result<Value, ParseError> {
    let stripped = strip_code_fence(raw);
    let mut texts = vec![("raw", raw)];
    if stripped != raw.trim() {
        texts.push(("unfenced", stripped.as_str()));
    }

    let mut attempts = Vec::new();
    for (label, text) in texts {
        for decoder in format.decoders().into_iter().filter(|d| d.accepts(text)) {
            match decoder.decode(text) {
                Ok(value) => {
                    tracing::debug!(decoder = decoder.name(), input = label, "Model response decoded");
                    return Ok(value);
                }
                Err(e) => attempts.push(format!("{} ({}): {}", decoder.name(), label, e)),
            }
        }
    }

    Err(ParseError::Undecodable { attempts })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
