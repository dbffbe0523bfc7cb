// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Coercion of typed text into right-hand operands for free-value templates.
//!
//! Textual, boolean and date kinds fail (return `None`) on missing input;
//! numeric and URL kinds fall back to zero / an empty URL instead.

use loom_predicate_core::{Expression, ValueLocale};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Value type expected by a free-value comparison template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
	String,
	Integer,
	Double,
	Float,
	Boolean,
	Date,
	Url,
}

impl ValueKind {
	pub fn is_numeric(&self) -> bool {
		matches!(self, ValueKind::Integer | ValueKind::Double | ValueKind::Float)
	}
}

/// Coerces user text into an operand. `None` kind is treated as text.
pub fn coerce_text(text: &str, kind: Option<ValueKind>, locale: &ValueLocale) -> Option<Expression> {
	match kind.unwrap_or(ValueKind::String) {
		ValueKind::String => {
			if text.is_empty() {
				None
			} else {
				Some(Expression::string(text))
			}
		}
		ValueKind::Integer => Some(Expression::integer(locale.parse_integer(text).unwrap_or(0))),
		ValueKind::Double => Some(Expression::float(locale.parse_number(text).unwrap_or(0.0))),
		ValueKind::Float => {
			let value = locale.parse_number(text).map(|v| v as f32).unwrap_or(0.0);
			Some(Expression::float(f64::from(value)))
		}
		ValueKind::Url => Some(Expression::url(
			url::Url::parse(text.trim())
				.map(|u| u.to_string())
				.unwrap_or_default(),
		)),
		ValueKind::Boolean => coerce_boolean(text, locale).map(Expression::boolean),
		ValueKind::Date => locale.parse_date(text).map(Expression::date),
	}
}

/// Operand used when nothing was entered at all.
pub fn default_for(kind: Option<ValueKind>) -> Option<Expression> {
	match kind? {
		ValueKind::Integer => Some(Expression::integer(0)),
		ValueKind::Double | ValueKind::Float => Some(Expression::float(0.0)),
		ValueKind::Url => Some(Expression::url(String::new())),
		ValueKind::String | ValueKind::Boolean | ValueKind::Date => None,
	}
}

fn coerce_boolean(text: &str, locale: &ValueLocale) -> Option<bool> {
	let text = text.trim();
	if text.is_empty() {
		return None;
	}
	let folded = text.to_lowercase();
	if folded == "true" || folded == locale.yes_token.to_lowercase() {
		return Some(true);
	}
	if folded != "false" && folded != locale.no_token.to_lowercase() {
		trace!(text, "unrecognized boolean input, using false");
	}
	Some(false)
}
