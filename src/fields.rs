//! Field validators composed by the record schema.
//!
//! Each reader method checks one key of the raw mapping and records a [`FieldIssue`] on failure,
//! so a single pass reports every broken field of a document.

use serde_yaml::{Mapping, Value};

use crate::{
    date::{self, LogDate},
    error::{FieldIssue, ValidationError},
};

const STRING: &str = "string";
const DATE: &str = "date";
const STRING_LIST: &str = "sequence of strings";
const BOOLEAN: &str = "boolean";

pub struct FieldReader<'a> {
    raw: &'a Mapping,
    issues: Vec<FieldIssue>,
}

impl<'a> FieldReader<'a> {
    pub fn new(raw: &'a Mapping) -> Self {
        Self {
            raw,
            issues: Vec::new(),
        }
    }

    /// A present `null` is a type mismatch, not an absent key.
    fn lookup(&mut self, field: &'static str, expected: &'static str) -> Option<&'a Value> {
        let raw: &'a Mapping = self.raw;
        match raw.get(field)? {
            Value::Null => {
                self.mismatch(field, expected, "null".to_string());
                None
            }
            value => Some(value),
        }
    }

    fn require(&mut self, field: &'static str, expected: &'static str) -> Option<&'a Value> {
        let raw: &'a Mapping = self.raw;
        if !raw.contains_key(field) {
            self.issues.push(FieldIssue::MissingField { field });
            return None;
        }
        self.lookup(field, expected)
    }

    fn mismatch(&mut self, field: &'static str, expected: &'static str, found: String) {
        self.issues.push(FieldIssue::TypeMismatch {
            field,
            expected,
            found,
        });
    }

    pub fn string(&mut self, field: &'static str) -> Option<String> {
        let value = self.require(field, STRING)?;
        self.as_string(field, value)
    }

    pub fn optional_string(&mut self, field: &'static str) -> Option<String> {
        let value = self.lookup(field, STRING)?;
        self.as_string(field, value)
    }

    fn as_string(&mut self, field: &'static str, value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            other => {
                self.mismatch(field, STRING, kind(other).to_string());
                None
            }
        }
    }

    pub fn date(&mut self, field: &'static str) -> Option<LogDate> {
        let value = self.require(field, DATE)?;
        self.as_date(field, value)
    }

    pub fn optional_date(&mut self, field: &'static str) -> Option<LogDate> {
        let value = self.lookup(field, DATE)?;
        self.as_date(field, value)
    }

    fn as_date(&mut self, field: &'static str, value: &Value) -> Option<LogDate> {
        date::coerce(value)
            .map_err(|err| {
                self.issues.push(FieldIssue::DateCoercion {
                    field,
                    value: describe(value),
                    reason: err.to_string(),
                })
            })
            .ok()
    }

    pub fn string_list(&mut self, field: &'static str) -> Option<Vec<String>> {
        let value = self.require(field, STRING_LIST)?;
        let Value::Sequence(items) = value else {
            self.mismatch(field, STRING_LIST, kind(value).to_string());
            return None;
        };

        let mut strings = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match item {
                Value::String(s) => strings.push(s.clone()),
                other => {
                    self.mismatch(
                        field,
                        STRING_LIST,
                        format!("{} at index {index}", kind(other)),
                    );
                    return None;
                }
            }
        }
        Some(strings)
    }

    pub fn boolean(&mut self, field: &'static str) -> Option<bool> {
        match self.require(field, BOOLEAN)? {
            Value::Bool(b) => Some(*b),
            other => {
                self.mismatch(field, BOOLEAN, kind(other).to_string());
                None
            }
        }
    }

    /// Records every key of the raw mapping that is not one of `known`.
    pub fn reject_unknown(&mut self, known: &[&str]) {
        let raw: &'a Mapping = self.raw;
        for key in raw.keys() {
            let name = match key {
                Value::String(s) => s.clone(),
                other => describe(other),
            };
            if !known.contains(&name.as_str()) {
                self.issues.push(FieldIssue::UnknownField { field: name });
            }
        }
    }

    pub fn into_error(self) -> ValidationError {
        ValidationError::new(self.issues)
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }
}

pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => format!("{s:?}"),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => kind(other).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn null_is_a_type_mismatch() {
        let raw = mapping("heroImage: ~\ntitle: null\ntags: ~\ndraft: ~\nupdatedDate: ~\n");
        let mut reader = FieldReader::new(&raw);
        assert_eq!(reader.optional_string("heroImage"), None);
        assert_eq!(reader.string("title"), None);
        assert_eq!(reader.string_list("tags"), None);
        assert_eq!(reader.boolean("draft"), None);
        assert_eq!(reader.optional_date("updatedDate"), None);
        let null = |field, expected| FieldIssue::TypeMismatch {
            field,
            expected,
            found: "null".to_string(),
        };
        assert_eq!(
            reader.into_error().issues(),
            &[
                null("heroImage", "string"),
                null("title", "string"),
                null("tags", "sequence of strings"),
                null("draft", "boolean"),
                null("updatedDate", "date"),
            ]
        );
    }

    #[test]
    fn absent_keys() {
        let raw = mapping("other: 1\n");
        let mut reader = FieldReader::new(&raw);
        assert_eq!(reader.optional_string("heroImage"), None);
        assert_eq!(reader.optional_date("updatedDate"), None);
        assert_eq!(reader.string("title"), None);
        assert_eq!(
            reader.into_error().issues(),
            &[FieldIssue::MissingField { field: "title" }]
        );
    }

    #[test]
    fn strings_are_not_coerced() {
        let raw = mapping("title: 2024\ndraft: \"true\"\n");
        let mut reader = FieldReader::new(&raw);
        assert_eq!(reader.string("title"), None);
        assert_eq!(reader.boolean("draft"), None);
        assert_eq!(
            reader.into_error().issues(),
            &[
                FieldIssue::TypeMismatch {
                    field: "title",
                    expected: "string",
                    found: "number".to_string(),
                },
                FieldIssue::TypeMismatch {
                    field: "draft",
                    expected: "boolean",
                    found: "string".to_string(),
                },
            ]
        );
    }

    #[test]
    fn string_list_keeps_order_and_duplicates() {
        let raw = mapping("tags: [b, a, b]\nempty: []\n");
        let mut reader = FieldReader::new(&raw);
        assert_eq!(
            reader.string_list("tags"),
            Some(vec!["b".to_string(), "a".to_string(), "b".to_string()])
        );
        assert_eq!(reader.string_list("empty"), Some(vec![]));
        assert!(reader.finish().is_ok());
    }

    #[test]
    fn string_list_rejects_non_string_items() {
        let raw = mapping("tags: [a, 3]\n");
        let mut reader = FieldReader::new(&raw);
        assert_eq!(reader.string_list("tags"), None);
        assert_eq!(
            reader.into_error().issues(),
            &[FieldIssue::TypeMismatch {
                field: "tags",
                expected: "sequence of strings",
                found: "number at index 1".to_string(),
            }]
        );
    }

    #[test]
    fn date_failures_carry_the_value() {
        let raw = mapping("pubDate: not-a-date\n");
        let mut reader = FieldReader::new(&raw);
        assert_eq!(reader.date("pubDate"), None);
        let err = reader.into_error();
        let Some(FieldIssue::DateCoercion { value, .. }) = err.issue_for("pubDate") else {
            panic!("expected a date issue, got {err:?}");
        };
        assert_eq!(value, "\"not-a-date\"");
    }

    #[test]
    fn unknown_keys_are_reported() {
        let raw = mapping("title: a\nlayout: post\n1: one\n");
        let mut reader = FieldReader::new(&raw);
        reader.reject_unknown(&["title"]);
        assert_eq!(
            reader.into_error().issues(),
            &[
                FieldIssue::UnknownField {
                    field: "layout".to_string()
                },
                FieldIssue::UnknownField {
                    field: "1".to_string()
                },
            ]
        );
    }
}
