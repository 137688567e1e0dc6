use super::{FieldViolation, ValidationError, ViolationCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::ops::RangeInclusive;

/// Violation-collecting reader over one JSON object. Every `require_*`
/// and `optional_*` call records problems instead of short-circuiting,
/// so a request with five bad fields reports all five.
pub(crate) struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    violations: Vec<FieldViolation>,
}

fn empty_map() -> &'static Map<String, Value> {
    static MAP: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
    MAP.get_or_init(Map::new)
}

impl<'a> FieldReader<'a> {
    /// Wrap a payload. A non-object payload is itself a violation; the
    /// reader still exists so later `finish` reports it.
    pub(crate) fn new(payload: &'a Value) -> Self {
        match payload.as_object() {
            Some(object) => Self {
                object,
                violations: Vec::new(),
            },
            None => Self {
                object: empty_map(),
                violations: vec![FieldViolation {
                    field: "$".to_string(),
                    code: ViolationCode::WrongType,
                    message: "request payload must be a JSON object".to_string(),
                }],
            },
        }
    }

    pub(crate) fn violate(&mut self, field: &str, code: ViolationCode, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field: field.to_string(),
            code,
            message: message.into(),
        });
    }

    fn raw(&self, name: &str) -> Option<&'a Value> {
        self.object.get(name).filter(|value| !value.is_null())
    }

    pub(crate) fn optional_f64(&mut self, name: &str) -> Option<f64> {
        let value = self.raw(name)?;
        match value.as_f64() {
            Some(number) => Some(number),
            None => {
                self.violate(name, ViolationCode::WrongType, "expected a number");
                None
            }
        }
    }

    pub(crate) fn optional_f64_in(&mut self, name: &str, range: RangeInclusive<f64>) -> Option<f64> {
        let number = self.optional_f64(name)?;
        if range.contains(&number) {
            Some(number)
        } else {
            self.violate(
                name,
                ViolationCode::OutOfRange,
                format!("must be within [{}, {}]", range.start(), range.end()),
            );
            None
        }
    }

    pub(crate) fn require_f64_in(&mut self, name: &str, range: RangeInclusive<f64>) -> Option<f64> {
        if self.raw(name).is_none() {
            self.violate(name, ViolationCode::Missing, "required field is missing");
            return None;
        }
        self.optional_f64_in(name, range)
    }

    /// Monetary amounts: required, finite, non-negative.
    pub(crate) fn require_amount(&mut self, name: &str) -> Option<f64> {
        self.require_f64_in(name, 0.0..=f64::MAX)
    }

    pub(crate) fn optional_amount(&mut self, name: &str) -> Option<f64> {
        self.optional_f64_in(name, 0.0..=f64::MAX)
    }

    /// Amounts that sit in a denominator and must be strictly positive.
    pub(crate) fn require_positive_amount(&mut self, name: &str) -> Option<f64> {
        if self.raw(name).is_none() {
            self.violate(name, ViolationCode::Missing, "required field is missing");
            return None;
        }
        let number = self.optional_f64(name)?;
        if number > 0.0 {
            Some(number)
        } else {
            self.violate(name, ViolationCode::OutOfRange, "must be greater than zero");
            None
        }
    }

    /// Ratios and percentages expressed as decimals.
    pub(crate) fn require_ratio(&mut self, name: &str) -> Option<f64> {
        self.require_f64_in(name, 0.0..=1.0)
    }

    pub(crate) fn optional_ratio(&mut self, name: &str) -> Option<f64> {
        self.optional_f64_in(name, 0.0..=1.0)
    }

    /// Credit scores carry the FICO domain 300-850.
    pub(crate) fn require_credit_score(&mut self, name: &str) -> Option<u16> {
        self.require_f64_in(name, 300.0..=850.0).map(|n| n as u16)
    }

    pub(crate) fn optional_credit_score(&mut self, name: &str) -> Option<u16> {
        self.optional_f64_in(name, 300.0..=850.0).map(|n| n as u16)
    }

    pub(crate) fn optional_u32(&mut self, name: &str) -> Option<u32> {
        let value = self.raw(name)?;
        match value.as_u64().filter(|n| *n <= u64::from(u32::MAX)) {
            Some(number) => Some(number as u32),
            None => {
                self.violate(name, ViolationCode::WrongType, "expected a non-negative integer");
                None
            }
        }
    }

    pub(crate) fn require_u32(&mut self, name: &str) -> Option<u32> {
        if self.raw(name).is_none() {
            self.violate(name, ViolationCode::Missing, "required field is missing");
            return None;
        }
        self.optional_u32(name)
    }

    pub(crate) fn optional_bool(&mut self, name: &str) -> Option<bool> {
        let value = self.raw(name)?;
        match value.as_bool() {
            Some(flag) => Some(flag),
            None => {
                self.violate(name, ViolationCode::WrongType, "expected a boolean");
                None
            }
        }
    }

    pub(crate) fn optional_str(&mut self, name: &str) -> Option<&'a str> {
        let value = self.raw(name)?;
        match value.as_str() {
            Some(text) => Some(text),
            None => {
                self.violate(name, ViolationCode::WrongType, "expected a string");
                None
            }
        }
    }

    /// Enumerated field decoded through serde, so the accepted values
    /// stay in lockstep with the domain enums.
    pub(crate) fn require_enum<T: DeserializeOwned>(&mut self, name: &str) -> Option<T> {
        if self.raw(name).is_none() {
            self.violate(name, ViolationCode::Missing, "required field is missing");
            return None;
        }
        self.optional_enum(name)
    }

    pub(crate) fn optional_enum<T: DeserializeOwned>(&mut self, name: &str) -> Option<T> {
        let value = self.raw(name)?;
        match serde_json::from_value::<T>(value.clone()) {
            Ok(decoded) => Some(decoded),
            Err(_) => {
                self.violate(
                    name,
                    ViolationCode::UnknownValue,
                    format!("'{}' is not an accepted value", compact(value)),
                );
                None
            }
        }
    }

    pub(crate) fn optional_string_list(&mut self, name: &str) -> Option<Vec<String>> {
        let value = self.raw(name)?;
        let Some(items) = value.as_array() else {
            self.violate(name, ViolationCode::WrongType, "expected an array of strings");
            return None;
        };

        let mut collected = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(text) => collected.push(text.trim().to_ascii_lowercase()),
                None => self.violate(
                    &format!("{name}[{index}]"),
                    ViolationCode::WrongType,
                    "expected a string",
                ),
            }
        }
        Some(collected)
    }

    pub(crate) fn require_string_list(&mut self, name: &str) -> Option<Vec<String>> {
        if self.raw(name).is_none() {
            self.violate(name, ViolationCode::Missing, "required field is missing");
            return None;
        }
        self.optional_string_list(name)
    }

    pub(crate) fn optional_array(&mut self, name: &str) -> Option<&'a [Value]> {
        let value = self.raw(name)?;
        match value.as_array() {
            Some(items) => Some(items),
            None => {
                self.violate(name, ViolationCode::WrongType, "expected an array");
                None
            }
        }
    }

    pub(crate) fn optional_object(&mut self, name: &str) -> Option<&'a Map<String, Value>> {
        let value = self.raw(name)?;
        match value.as_object() {
            Some(object) => Some(object),
            None => {
                self.violate(name, ViolationCode::WrongType, "expected an object");
                None
            }
        }
    }

    pub(crate) fn has(&self, name: &str) -> bool {
        self.raw(name).is_some()
    }

    pub(crate) fn finish(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                violations: self.violations,
            })
        }
    }
}

fn compact(value: &Value) -> String {
    let rendered = value.to_string();
    if rendered.chars().count() > 40 {
        let prefix: String = rendered.chars().take(40).collect();
        format!("{prefix}...")
    } else {
        rendered
    }
}
