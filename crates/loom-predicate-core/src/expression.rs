// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ValueLocale;

/// A constant operand value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Constant {
	String(String),
	Integer(i64),
	Float(f64),
	Boolean(bool),
	Date(DateTime<Utc>),
	/// Normalized URL text. Empty is the placeholder for a missing or invalid URL.
	Url(String),
	Null,
}

impl Constant {
	/// Renders the constant the way operand pickers and formatting tables see it.
	pub fn string_value(&self, locale: &ValueLocale) -> String {
		match self {
			Constant::String(s) => s.clone(),
			Constant::Integer(i) => i.to_string(),
			Constant::Float(f) => f.to_string(),
			Constant::Boolean(b) => locale.boolean_token(*b).to_string(),
			Constant::Date(d) => locale.format_date(d),
			Constant::Url(u) => u.clone(),
			Constant::Null => locale.null_token.clone(),
		}
	}
}

/// An operand of a comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Expression {
	Constant(Constant),
	/// e.g. "name", "address.city"
	KeyPath(String),
	/// Right side of `in` and `between`.
	Aggregate(Vec<Expression>),
	Function {
		name: String,
		arguments: Vec<Expression>,
	},
}

impl Expression {
	pub fn key_path(path: impl Into<String>) -> Self {
		Expression::KeyPath(path.into())
	}

	pub fn string(value: impl Into<String>) -> Self {
		Expression::Constant(Constant::String(value.into()))
	}

	pub fn integer(value: i64) -> Self {
		Expression::Constant(Constant::Integer(value))
	}

	pub fn float(value: f64) -> Self {
		Expression::Constant(Constant::Float(value))
	}

	pub fn boolean(value: bool) -> Self {
		Expression::Constant(Constant::Boolean(value))
	}

	pub fn date(value: DateTime<Utc>) -> Self {
		Expression::Constant(Constant::Date(value))
	}

	pub fn url(value: impl Into<String>) -> Self {
		Expression::Constant(Constant::Url(value.into()))
	}

	pub fn null() -> Self {
		Expression::Constant(Constant::Null)
	}

	/// Text projection used for label matching.
	///
	/// Returns `None` for aggregates and functions, which never match a label.
	pub fn string_value(&self, locale: &ValueLocale) -> Option<String> {
		match self {
			Expression::Constant(c) => Some(c.string_value(locale)),
			Expression::KeyPath(path) => Some(path.clone()),
			Expression::Aggregate(_) | Expression::Function { .. } => None,
		}
	}
}

impl From<Constant> for Expression {
	fn from(constant: Constant) -> Self {
		Expression::Constant(constant)
	}
}

impl fmt::Display for Constant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Constant::String(s) => write_quoted(f, s),
			Constant::Integer(i) => write!(f, "{i}"),
			Constant::Float(v) => write!(f, "{v}"),
			Constant::Boolean(true) => write!(f, "TRUE"),
			Constant::Boolean(false) => write!(f, "FALSE"),
			Constant::Date(d) => {
				write!(f, "DATE(")?;
				write_quoted(f, &d.to_rfc3339())?;
				write!(f, ")")
			}
			Constant::Url(u) => {
				write!(f, "URL(")?;
				write_quoted(f, u)?;
				write!(f, ")")
			}
			Constant::Null => write!(f, "nil"),
		}
	}
}

impl fmt::Display for Expression {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Expression::Constant(c) => write!(f, "{c}"),
			Expression::KeyPath(path) => write!(f, "{path}"),
			Expression::Aggregate(items) => {
				write!(f, "{{")?;
				write_joined(f, items)?;
				write!(f, "}}")
			}
			Expression::Function { name, arguments } => {
				write!(f, "{name}(")?;
				write_joined(f, arguments)?;
				write!(f, ")")
			}
		}
	}
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[Expression]) -> fmt::Result {
	for (i, item) in items.iter().enumerate() {
		if i > 0 {
			write!(f, ", ")?;
		}
		write!(f, "{item}")?;
	}
	Ok(())
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
	write!(f, "\"")?;
	for c in s.chars() {
		match c {
			'"' => write!(f, "\\\"")?,
			'\\' => write!(f, "\\\\")?,
			_ => write!(f, "{c}")?,
		}
	}
	write!(f, "\"")
}
