//! Declarative request validation.
//!
//! Request types implement [`Validate`] by declaring their fields against a
//! [`Validator`]. Every field is checked; each failing field contributes exactly one
//! message, in declaration order. A failed `required` suppresses the remaining rules
//! of that field, and absent values skip format rules.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static BASE64_SHAPE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9+/]*={0,3}$").ok());

/// Aggregated validation failure, one message per failing field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .0.join("; "))]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    pub fn new(messages: Vec<String>) -> Self {
        Self(messages)
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }

    pub fn into_messages(self) -> Vec<String> {
        self.0
    }
}

pub trait Validate {
    fn validate(&self, v: &mut Validator);
}

#[derive(Debug, Default)]
pub struct Validator {
    messages: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the rule chain for a string field.
    pub fn field<'v, 'a>(&'v mut self, name: &'a str, value: Option<&'a str>) -> FieldRules<'v, 'a> {
        FieldRules {
            validator: self,
            name,
            value,
            failed: false,
        }
    }

    /// Presence check for non-string fields. Returns whether the value is present.
    pub fn require<T>(&mut self, name: &str, value: Option<&T>) -> bool {
        if value.is_none() {
            self.messages.push(required_message(name));
            return false;
        }
        true
    }

    /// Presence check followed by the nested value's own rules.
    pub fn nested<T: Validate>(&mut self, name: &str, value: Option<&T>) {
        match value {
            Some(inner) => inner.validate(self),
            None => {
                self.require::<T>(name, None);
            }
        }
    }

    /// Presence check for a list followed by each element's rules.
    pub fn each<T: Validate>(&mut self, name: &str, values: Option<&[T]>) {
        match values {
            Some(items) => {
                for item in items {
                    item.validate(self);
                }
            }
            None => {
                self.require::<()>(name, None);
            }
        }
    }

    pub fn finish(self) -> Result<(), ValidationErrors> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(self.messages))
        }
    }
}

/// Rule chain for one field. Stops at the first failure.
pub struct FieldRules<'v, 'a> {
    validator: &'v mut Validator,
    name: &'a str,
    value: Option<&'a str>,
    failed: bool,
}

impl FieldRules<'_, '_> {
    pub fn required(mut self) -> Self {
        if !self.failed && self.value.is_none_or(|v| v.trim().is_empty()) {
            self.fail(required_message(self.name));
        }
        self
    }

    pub fn email(self) -> Self {
        let name = self.name;
        self.check(is_email, || {
            format!("The {name} field is not a valid e-mail address.")
        })
    }

    pub fn phone(self) -> Self {
        let name = self.name;
        self.check(is_phone, || format!("The {name} field is not a valid phone number."))
    }

    pub fn base64(self) -> Self {
        let name = self.name;
        self.check(is_base64, || format!("The {name} field is not in Base64 format."))
    }

    pub fn max_len(self, max: usize) -> Self {
        let name = self.name;
        self.check(
            |v| v.chars().count() <= max,
            || format!("The field {name} must be a string or array type with a maximum length of '{max}'."),
        )
    }

    fn check(mut self, rule: impl Fn(&str) -> bool, message: impl FnOnce() -> String) -> Self {
        if self.failed {
            return self;
        }
        if let Some(v) = self.value
            && !rule(v)
        {
            self.fail(message());
        }
        self
    }

    fn fail(&mut self, message: String) {
        self.failed = true;
        self.validator.messages.push(message);
    }
}

fn required_message(name: &str) -> String {
    format!("The {name} field is required.")
}

/// Exactly one `@`, neither first nor last, no line breaks.
pub fn is_email(value: &str) -> bool {
    if value.contains(['\r', '\n']) {
        return false;
    }
    let mut at = value.match_indices('@');
    match (at.next(), at.next()) {
        (Some((idx, _)), None) => idx > 0 && idx < value.len() - 1,
        _ => false,
    }
}

/// Optional leading `+`, then digits, spaces and `-.()`, with at least one digit.
/// A trailing extension (`x123`, `ext123`, `ext. 123`, any case) is allowed.
pub fn is_phone(value: &str) -> bool {
    let value = value.trim_end();
    let body = value.strip_prefix('+').unwrap_or(value);
    let body = strip_extension(body);
    body.chars().any(|c| c.is_ascii_digit())
        && body
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '.' | '(' | ')'))
}

fn strip_extension(value: &str) -> &str {
    let lower = value.to_ascii_lowercase();
    for marker in ["ext.", "ext", "x"] {
        let Some(idx) = lower.rfind(marker) else {
            continue;
        };
        let digits = value[idx + marker.len()..].trim_start();
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            return &value[..idx];
        }
    }
    value
}

/// Shape check only: alphabet, up to three trailing `=`, length a multiple of four.
pub fn is_base64(value: &str) -> bool {
    value.len() % 4 == 0
        && BASE64_SHAPE
            .as_ref()
            .is_some_and(|re| re.is_match(value))
}
