// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Locale tokens used to render and parse constant values.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SHORT_DATE_FORMAT: &str = "%m/%d/%y";

/// Tokens and separators used when constants are turned into text and back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueLocale {
	pub true_token: String,
	pub false_token: String,
	/// Accepted as `true` when coercing boolean input.
	pub yes_token: String,
	/// Accepted as `false` when coercing boolean input.
	pub no_token: String,
	pub null_token: String,
	/// chrono format string, e.g. "%m/%d/%y"
	pub short_date_format: String,
	pub decimal_separator: char,
	pub grouping_separator: char,
}

impl Default for ValueLocale {
	fn default() -> Self {
		Self {
			true_token: "True".to_string(),
			false_token: "False".to_string(),
			yes_token: "Yes".to_string(),
			no_token: "No".to_string(),
			null_token: "nil".to_string(),
			short_date_format: DEFAULT_SHORT_DATE_FORMAT.to_string(),
			decimal_separator: '.',
			grouping_separator: ',',
		}
	}
}

impl ValueLocale {
	pub fn boolean_token(&self, value: bool) -> &str {
		if value {
			&self.true_token
		} else {
			&self.false_token
		}
	}

	/// Formats with the short-date format, or RFC 3339 when the format
	/// string is not a valid strftime pattern.
	pub fn format_date(&self, date: &DateTime<Utc>) -> String {
		let mut out = String::new();
		match write!(out, "{}", date.format(&self.short_date_format)) {
			Ok(()) => out,
			Err(_) => date.to_rfc3339(),
		}
	}

	/// Whether `short_date_format` is a strftime pattern chrono can render.
	pub fn has_valid_date_format(&self) -> bool {
		!StrftimeItems::new(&self.short_date_format).any(|item| matches!(item, Item::Error))
	}

	/// Parses a date in the short-date format. The result is midnight UTC.
	pub fn parse_date(&self, text: &str) -> Option<DateTime<Utc>> {
		let date = NaiveDate::parse_from_str(text.trim(), &self.short_date_format).ok()?;
		Some(date.and_hms_opt(0, 0, 0)?.and_utc())
	}

	/// Parses a decimal number written with this locale's separators.
	///
	/// Grouping separators are ignored; the decimal separator is mapped to `.`.
	pub fn parse_number(&self, text: &str) -> Option<f64> {
		let normalized = self.normalize_number(text)?;
		normalized.parse::<f64>().ok().filter(|v| v.is_finite())
	}

	/// Parses an integer, accepting grouping separators. A fractional part is truncated.
	pub fn parse_integer(&self, text: &str) -> Option<i64> {
		let normalized = self.normalize_number(text)?;
		if let Ok(value) = normalized.parse::<i64>() {
			return Some(value);
		}
		let value = normalized.parse::<f64>().ok()?;
		if value.is_finite() && value.abs() < i64::MAX as f64 {
			Some(value.trunc() as i64)
		} else {
			None
		}
	}

	fn normalize_number(&self, text: &str) -> Option<String> {
		let trimmed = text.trim();
		if trimmed.is_empty() {
			return None;
		}
		let normalized: String = trimmed
			.chars()
			.filter(|c| *c != self.grouping_separator && !c.is_whitespace())
			.map(|c| if c == self.decimal_separator { '.' } else { c })
			.collect();
		Some(normalized)
	}
}
