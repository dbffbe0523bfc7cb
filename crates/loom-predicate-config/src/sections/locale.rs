// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Value locale configuration section.

use loom_predicate_core::ValueLocale;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LocaleConfigLayer {
	pub true_token: Option<String>,
	pub false_token: Option<String>,
	pub yes_token: Option<String>,
	pub no_token: Option<String>,
	pub null_token: Option<String>,
	pub short_date_format: Option<String>,
	pub decimal_separator: Option<char>,
	pub grouping_separator: Option<char>,
}

impl LocaleConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.true_token.is_some() {
			self.true_token = other.true_token;
		}
		if other.false_token.is_some() {
			self.false_token = other.false_token;
		}
		if other.yes_token.is_some() {
			self.yes_token = other.yes_token;
		}
		if other.no_token.is_some() {
			self.no_token = other.no_token;
		}
		if other.null_token.is_some() {
			self.null_token = other.null_token;
		}
		if other.short_date_format.is_some() {
			self.short_date_format = other.short_date_format;
		}
		if other.decimal_separator.is_some() {
			self.decimal_separator = other.decimal_separator;
		}
		if other.grouping_separator.is_some() {
			self.grouping_separator = other.grouping_separator;
		}
	}

	pub fn finalize(self) -> Result<ValueLocale> {
		let defaults = ValueLocale::default();
		let locale = ValueLocale {
			true_token: self.true_token.unwrap_or(defaults.true_token),
			false_token: self.false_token.unwrap_or(defaults.false_token),
			yes_token: self.yes_token.unwrap_or(defaults.yes_token),
			no_token: self.no_token.unwrap_or(defaults.no_token),
			null_token: self.null_token.unwrap_or(defaults.null_token),
			short_date_format: self.short_date_format.unwrap_or(defaults.short_date_format),
			decimal_separator: self.decimal_separator.unwrap_or(defaults.decimal_separator),
			grouping_separator: self.grouping_separator.unwrap_or(defaults.grouping_separator),
		};

		if locale.decimal_separator == locale.grouping_separator {
			return Err(ConfigError::validation(format!(
				"decimal and grouping separators are both '{}'",
				locale.decimal_separator
			)));
		}
		if locale.short_date_format.trim().is_empty() {
			return Err(ConfigError::invalid_value(
				"locale.short_date_format",
				"must not be empty",
			));
		}
		if !locale.has_valid_date_format() {
			return Err(ConfigError::invalid_value(
				"locale.short_date_format",
				format!("'{}' is not a valid strftime pattern", locale.short_date_format),
			));
		}
		Ok(locale)
	}
}
