// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Expression, PredicateError, Result};

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
	Equal,
	NotEqual,
	LessThan,
	LessOrEqual,
	GreaterThan,
	GreaterOrEqual,
	BeginsWith,
	EndsWith,
	Contains,
	Like,
	Matches,
	In,
	Between,
}

impl Operator {
	pub const ALL: [Operator; 13] = [
		Operator::Equal,
		Operator::NotEqual,
		Operator::LessThan,
		Operator::LessOrEqual,
		Operator::GreaterThan,
		Operator::GreaterOrEqual,
		Operator::BeginsWith,
		Operator::EndsWith,
		Operator::Contains,
		Operator::Like,
		Operator::Matches,
		Operator::In,
		Operator::Between,
	];

	/// Base (unlocalized) title shown in the operator picker.
	pub fn title(&self) -> &'static str {
		match self {
			Operator::Equal => "is",
			Operator::NotEqual => "is not",
			Operator::LessThan => "is less than",
			Operator::LessOrEqual => "is less than or equal to",
			Operator::GreaterThan => "is greater than",
			Operator::GreaterOrEqual => "is greater than or equal to",
			Operator::BeginsWith => "begins with",
			Operator::EndsWith => "ends with",
			Operator::Contains => "contains",
			Operator::Like => "is like",
			Operator::Matches => "matches",
			Operator::In => "is in",
			Operator::Between => "is between",
		}
	}

	/// Reverse of [`Operator::title`], ignoring ASCII case.
	pub fn from_title(title: &str) -> Result<Self> {
		let title = title.trim();
		Self::ALL
			.iter()
			.copied()
			.find(|op| op.title().eq_ignore_ascii_case(title))
			.ok_or_else(|| PredicateError::UnrecognizedOperator(title.to_string()))
	}

	/// Operator keyword in predicate-format text.
	pub fn symbol(&self) -> &'static str {
		match self {
			Operator::Equal => "==",
			Operator::NotEqual => "!=",
			Operator::LessThan => "<",
			Operator::LessOrEqual => "<=",
			Operator::GreaterThan => ">",
			Operator::GreaterOrEqual => ">=",
			Operator::BeginsWith => "BEGINSWITH",
			Operator::EndsWith => "ENDSWITH",
			Operator::Contains => "CONTAINS",
			Operator::Like => "LIKE",
			Operator::Matches => "MATCHES",
			Operator::In => "IN",
			Operator::Between => "BETWEEN",
		}
	}

	/// Operators whose right side is a collection and is parenthesized in formatting keys.
	pub fn is_set_membership(&self) -> bool {
		matches!(self, Operator::In | Operator::Between)
	}
}

impl fmt::Display for Operator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.symbol())
	}
}

/// How the left operand is quantified when it is a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
	#[default]
	Direct,
	All,
	Any,
}

/// String comparison options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOption {
	CaseInsensitive,
	DiacriticInsensitive,
}

/// A leaf predicate: `left operator right`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
	pub left: Expression,
	pub right: Expression,
	pub operator: Operator,
	#[serde(default)]
	pub modifier: Modifier,
	#[serde(default)]
	pub options: BTreeSet<ComparisonOption>,
}

impl Comparison {
	pub fn new(left: Expression, operator: Operator, right: Expression) -> Self {
		Self {
			left,
			right,
			operator,
			modifier: Modifier::Direct,
			options: BTreeSet::new(),
		}
	}

	pub fn with_modifier(mut self, modifier: Modifier) -> Self {
		self.modifier = modifier;
		self
	}

	pub fn with_option(mut self, option: ComparisonOption) -> Self {
		self.options.insert(option);
		self
	}

	pub fn with_options(mut self, options: impl IntoIterator<Item = ComparisonOption>) -> Self {
		self.options.extend(options);
		self
	}
}

impl fmt::Display for Comparison {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.modifier {
			Modifier::Direct => {}
			Modifier::All => write!(f, "ALL ")?,
			Modifier::Any => write!(f, "ANY ")?,
		}
		write!(f, "{} {}", self.left, self.operator)?;
		if !self.options.is_empty() {
			write!(f, "[")?;
			for option in &self.options {
				match option {
					ComparisonOption::CaseInsensitive => write!(f, "c")?,
					ComparisonOption::DiacriticInsensitive => write!(f, "d")?,
				}
			}
			write!(f, "]")?;
		}
		write!(f, " {}", self.right)
	}
}
