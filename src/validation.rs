//! Input validation for subscription records
//!
//! Every string column is capped at 255 characters. `user_id`, `provider` and `key`
//! are required; `resource_id` is optional. Violations are collected rather than
//! reported one at a time so callers can surface all offending fields together.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length, in characters, of any persisted subscription string
pub const MAX_FIELD_LENGTH: usize = 255;

/// Subscription fields subject to validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionField {
    UserId,
    Provider,
    Key,
    ResourceId,
}

impl SubscriptionField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UserId => "user_id",
            Self::Provider => "provider",
            Self::Key => "key",
            Self::ResourceId => "resource_id",
        }
    }
}

impl fmt::Display for SubscriptionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    Required,
    TooLong { max: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: SubscriptionField,
    pub violation: Violation,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.violation {
            Violation::Required => write!(f, "{} must not be empty", self.field),
            Violation::TooLong { max, actual } => {
                write!(f, "{} is {actual} characters (max: {max})", self.field)
            }
        }
    }
}

/// All constraint violations found on one record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    pub violations: Vec<FieldViolation>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.violations.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Fields that failed, in the order they were checked
    pub fn fields(&self) -> Vec<SubscriptionField> {
        self.violations.iter().map(|v| v.field).collect()
    }

    pub fn has_violation(&self, field: SubscriptionField) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    fn push(&mut self, field: SubscriptionField, violation: Violation) {
        self.violations.push(FieldViolation { field, violation });
    }

    /// Check a mandatory string field
    pub fn check_required(&mut self, field: SubscriptionField, value: &str) {
        if value.is_empty() {
            self.push(field, Violation::Required);
        } else {
            self.check_length(field, value);
        }
    }

    /// Check an optional string field; absence is always valid
    pub fn check_optional(&mut self, field: SubscriptionField, value: Option<&str>) {
        if let Some(value) = value {
            self.check_length(field, value);
        }
    }

    fn check_length(&mut self, field: SubscriptionField, value: &str) {
        let actual = value.chars().count();
        if actual > MAX_FIELD_LENGTH {
            self.push(
                field,
                Violation::TooLong {
                    max: MAX_FIELD_LENGTH,
                    actual,
                },
            );
        }
    }

    /// `Ok(())` when nothing was recorded, otherwise the collected violations
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}
