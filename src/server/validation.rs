//! Request body checks shared by the route handlers

use serde::Serialize;
use serde_json::Value;

pub const MIN_TEXT_CHARS: usize = 10;
pub const MAX_TEXT_CHARS: usize = 50_000;
pub const MIN_PROMPT_CHARS: usize = 5;
pub const MAX_PROMPT_CHARS: usize = 1_000;
pub const MIN_TITLE_CHARS: usize = 1;
pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_EDIT_CHARS: usize = 10_000;
pub const MAX_TAG_CHARS: usize = 50;

/// One failed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Collects field errors across several checks
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Non-empty string whose length lies in `min..=max`
    pub fn required_text<'a>(
        &mut self,
        field: &str,
        value: Option<&'a str>,
        label: &str,
        min: usize,
        max: usize,
    ) -> Option<&'a str> {
        match value {
            None | Some("") => {
                self.fail(field, format!("{label} is required"));
                None
            }
            Some(text) => {
                self.length(field, text, label, min, max);
                Some(text)
            }
        }
    }

    /// Optional string; when present its length must lie in `min..=max`
    pub fn optional_text<'a>(
        &mut self,
        field: &str,
        value: Option<&'a str>,
        label: &str,
        min: usize,
        max: usize,
    ) -> Option<&'a str> {
        let text = value?;
        self.length(field, text, label, min, max);
        Some(text)
    }

    fn length(&mut self, field: &str, text: &str, label: &str, min: usize, max: usize) {
        let len = text.chars().count();
        if len >= min && len <= max {
            return;
        }

        let message = if min > 1 {
            format!("{label} must be between {} and {} characters", group(min), group(max))
        } else if len < min {
            format!("{label} must not be empty")
        } else {
            format!("{label} must not exceed {} characters", group(max))
        };
        self.fail(field, message);
    }

    /// Optional JSON array of strings, each at most [`MAX_TAG_CHARS`]
    pub fn tags(&mut self, field: &str, value: Option<&Value>) -> Option<Vec<String>> {
        let items = match value? {
            Value::Null => return None,
            Value::Array(items) => items,
            _ => {
                self.fail(field, "Tags must be an array");
                return None;
            }
        };

        let mut tags = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Value::String(tag) if tag.chars().count() <= MAX_TAG_CHARS => tags.push(tag.clone()),
                Value::String(_) => {
                    self.fail(field, format!("Tags must not exceed {MAX_TAG_CHARS} characters"));
                    return None;
                }
                _ => {
                    self.fail(field, "Tags must be an array of strings");
                    return None;
                }
            }
        }
        Some(tags)
    }

    /// Record an arbitrary failed check
    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.fail(field, message);
        }
    }

    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Summary ids are UUIDs
pub fn is_summary_id(id: &str) -> bool {
    uuid::Uuid::parse_str(id).is_ok()
}

fn group(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
