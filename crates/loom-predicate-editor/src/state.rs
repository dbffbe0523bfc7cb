// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! UI-independent selections bound to a row.

use chrono::{DateTime, Utc};
use loom_predicate_core::{Connective, Expression, Operator};
use serde::{Deserialize, Serialize};

/// What the right-hand control of a comparison row currently holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RightValue {
	#[default]
	Unset,
	/// A picked operand or a value bound from a predicate.
	Expression(Expression),
	/// Raw text typed by the user, coerced at synthesis time.
	Text(String),
	/// Value from a date picker.
	Date(DateTime<Utc>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonState {
	pub left: Option<Expression>,
	pub operator: Option<Operator>,
	#[serde(default)]
	pub right: RightValue,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundState {
	/// `None` until something is picked; synthesizes as `and`.
	pub connective: Option<Connective>,
}

impl CompoundState {
	pub fn connective(&self) -> Connective {
		self.connective.unwrap_or(Connective::And)
	}
}

/// The bound state of a row, shaped by its template kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowState {
	Comparison(ComparisonState),
	Compound(CompoundState),
}

impl RowState {
	pub fn is_compound(&self) -> bool {
		matches!(self, RowState::Compound(_))
	}

	pub fn as_comparison(&self) -> Option<&ComparisonState> {
		match self {
			RowState::Comparison(s) => Some(s),
			RowState::Compound(_) => None,
		}
	}

	pub fn as_compound(&self) -> Option<&CompoundState> {
		match self {
			RowState::Compound(s) => Some(s),
			RowState::Comparison(_) => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_unselected_compound_is_and() {
		assert_eq!(CompoundState::default().connective(), Connective::And);
		let picked = CompoundState {
			connective: Some(Connective::Or),
		};
		assert_eq!(picked.connective(), Connective::Or);
	}

	#[test]
	fn test_serde_shape() {
		let state = RowState::Comparison(ComparisonState {
			left: Some(Expression::key_path("name")),
			operator: Some(Operator::Contains),
			right: RightValue::Text("jo".to_string()),
		});
		let json = serde_json::to_value(&state).unwrap();
		assert_eq!(json["kind"], "comparison");
		assert_eq!(json["right"]["type"], "text");
		let back: RowState = serde_json::from_value(json).unwrap();
		assert_eq!(back, state);
	}
}
