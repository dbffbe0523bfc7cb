// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Comparison, PredicateError, Result};

/// Logical connective of a compound predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connective {
	#[default]
	And,
	Or,
	/// Negates the conjunction of its children.
	Not,
}

impl Connective {
	pub const ALL: [Connective; 3] = [Connective::And, Connective::Or, Connective::Not];

	/// Base title shown in the group row selector.
	pub fn title(&self) -> &'static str {
		match self {
			Connective::And => "All",
			Connective::Or => "Any",
			Connective::Not => "None",
		}
	}

	pub fn from_title(title: &str) -> Result<Self> {
		let title = title.trim();
		Self::ALL
			.iter()
			.copied()
			.find(|c| c.title().eq_ignore_ascii_case(title))
			.ok_or_else(|| PredicateError::UnrecognizedConnective(title.to_string()))
	}
}

/// A connective applied to an ordered list of sub-predicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compound {
	pub connective: Connective,
	#[serde(default)]
	pub children: Vec<Predicate>,
}

impl Compound {
	pub fn new(connective: Connective, children: Vec<Predicate>) -> Self {
		Self {
			connective,
			children,
		}
	}
}

/// A boolean predicate tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
	Comparison(Comparison),
	Compound(Compound),
	/// Always-true placeholder.
	#[default]
	Empty,
}

impl Predicate {
	pub fn and(children: Vec<Predicate>) -> Self {
		Predicate::Compound(Compound::new(Connective::And, children))
	}

	pub fn or(children: Vec<Predicate>) -> Self {
		Predicate::Compound(Compound::new(Connective::Or, children))
	}

	pub fn not(child: Predicate) -> Self {
		Predicate::Compound(Compound::new(Connective::Not, vec![child]))
	}

	pub fn is_empty(&self) -> bool {
		matches!(self, Predicate::Empty)
	}

	pub fn as_comparison(&self) -> Option<&Comparison> {
		match self {
			Predicate::Comparison(c) => Some(c),
			_ => None,
		}
	}

	pub fn as_compound(&self) -> Option<&Compound> {
		match self {
			Predicate::Compound(c) => Some(c),
			_ => None,
		}
	}

	/// Number of comparison and compound nodes in the tree.
	///
	/// A fully decomposed predicate produces exactly this many rows.
	pub fn node_count(&self) -> usize {
		match self {
			Predicate::Empty => 0,
			Predicate::Comparison(_) => 1,
			Predicate::Compound(c) => 1 + c.children.iter().map(Predicate::node_count).sum::<usize>(),
		}
	}
}

impl From<Comparison> for Predicate {
	fn from(comparison: Comparison) -> Self {
		Predicate::Comparison(comparison)
	}
}

impl From<Compound> for Predicate {
	fn from(compound: Compound) -> Self {
		Predicate::Compound(compound)
	}
}

impl fmt::Display for Predicate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Predicate::Empty => write!(f, "TRUEPREDICATE"),
			Predicate::Comparison(c) => write!(f, "{c}"),
			Predicate::Compound(c) => write!(f, "{c}"),
		}
	}
}

impl fmt::Display for Compound {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match (self.connective, self.children.as_slice()) {
			(Connective::And, []) => write!(f, "TRUEPREDICATE"),
			(Connective::Or, []) => write!(f, "FALSEPREDICATE"),
			(Connective::Not, []) => write!(f, "NOT TRUEPREDICATE"),
			(Connective::Not, [only]) => {
				write!(f, "NOT ")?;
				write_operand(f, only)
			}
			(Connective::Not, children) => {
				write!(f, "NOT (")?;
				write_children(f, " AND ", children)?;
				write!(f, ")")
			}
			(Connective::And, children) => write_children(f, " AND ", children),
			(Connective::Or, children) => write_children(f, " OR ", children),
		}
	}
}

fn write_children(f: &mut fmt::Formatter<'_>, separator: &str, children: &[Predicate]) -> fmt::Result {
	for (i, child) in children.iter().enumerate() {
		if i > 0 {
			write!(f, "{separator}")?;
		}
		write_operand(f, child)?;
	}
	Ok(())
}

fn write_operand(f: &mut fmt::Formatter<'_>, predicate: &Predicate) -> fmt::Result {
	match predicate {
		Predicate::Compound(c) if !c.children.is_empty() => write!(f, "({c})"),
		other => write!(f, "{other}"),
	}
}
