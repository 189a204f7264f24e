//! Typed access to raw data rows.
//!
//! Entity tables arrive as JSON arrays of flat objects whose values are
//! mostly strings (the wiki's cargo export format). Each field is read
//! through a small fallible parser; a value that fails to parse is logged and
//! treated as absent, so one bad cell never drops a whole entity.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::{CoreError, CoreResult};
use crate::text::clean_markup;

static LIST_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:, *|\n)+").unwrap());

/// A single row of an entity table.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a str,
    fields: &'a Map<String, Value>,
}

impl<'a> Row<'a> {
    /// Wrap a JSON object as a row of the named table.
    pub fn new(table: &'a str, fields: &'a Map<String, Value>) -> Self {
        Self { table, fields }
    }

    /// The raw, trimmed value of a field. Numbers are stringified; missing,
    /// null, and blank values are `None`.
    pub fn raw(&self, field: &str) -> Option<String> {
        let s = match self.fields.get(field)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        if s.is_empty() { None } else { Some(s) }
    }

    /// A display text field with markup removed.
    pub fn text(&self, field: &str) -> Option<String> {
        self.raw(field).and_then(|s| clean_markup(&s))
    }

    /// An integer field.
    pub fn int(&self, field: &str) -> Option<i64> {
        self.parse(field, parse_int)
    }

    /// An integer field where absence means zero.
    pub fn int0(&self, field: &str) -> i64 {
        self.int(field).unwrap_or(0)
    }

    /// A flag stored as an integer (`0` / non-zero).
    pub fn flag(&self, field: &str) -> bool {
        self.int0(field) != 0
    }

    /// A UTC timestamp field.
    pub fn date(&self, field: &str) -> Option<DateTime<Utc>> {
        self.parse(field, parse_date)
    }

    /// A comma- or newline-separated list field.
    pub fn list(&self, field: &str) -> Vec<String> {
        self.raw(field).map(|s| parse_list(&s)).unwrap_or_default()
    }

    /// The non-empty raw values of a numbered field family such as
    /// `Abilities11`, `Abilities12`, ... in order.
    pub fn series(&self, prefix: &str, range: std::ops::RangeInclusive<u32>) -> Vec<String> {
        range
            .filter_map(|i| self.raw(&format!("{prefix}{i}")))
            .collect()
    }

    fn parse<T>(&self, field: &str, parser: impl Fn(&str) -> CoreResult<T>) -> Option<T> {
        let raw = self.raw(field)?;
        match parser(&raw) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(table = self.table, field, error = %e, "Ignoring unparseable value");
                None
            }
        }
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> CoreError {
    CoreError::InvalidField {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Parse an integer, accepting surrounding whitespace.
pub fn parse_int(s: &str) -> CoreResult<i64> {
    s.trim()
        .parse::<i64>()
        .map_err(|e| invalid("int", s, &e.to_string()))
}

/// Parse a `YYYY-MM-DD HH:MM:SS` (or bare `YYYY-MM-DD`) UTC timestamp.
///
/// Years outside 1971..=2099 are placeholders in the source data and are
/// rejected.
pub fn parse_date(s: &str) -> CoreResult<DateTime<Utc>> {
    let s = s.trim();
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map(|d| d.and_hms_opt(0, 0, 0).unwrap_or_default())
        })
        .map_err(|e| invalid("date", s, &e.to_string()))?;
    let dt = naive.and_utc();
    if 1970 < dt.year() && dt.year() < 2100 {
        Ok(dt)
    } else {
        Err(invalid("date", s, "year out of range"))
    }
}

/// Split a comma- or newline-separated list, dropping empty items.
pub fn parse_list(s: &str) -> Vec<String> {
    LIST_SPLIT_RE
        .split(s)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
