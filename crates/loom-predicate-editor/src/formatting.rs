// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Localization overrides for row titles.
//!
//! Keys describe a row sentence in base titles and values give the localized
//! sentence:
//!
//! ```text
//! "%[name]@ %[begins with]@ %[jo]@"      = "%1$[Nombre]@ %2$[empieza con]@ %3$[jo]@"
//! "%[tags]@ %[is in]@ (%[rust]@)"        = "%3$[rust]@ (%1$[etiquetas]@)"
//! ```
//!
//! Key tokens are positional (left, operator, right). Value tokens may carry
//! an explicit `n$` position and appear in any order. The right side of a
//! set-membership operator is parenthesized in the key.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use loom_predicate_core::{Operator, PredicateError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

static TOKEN: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"%(?:(\d+)\$)?\[([^\]]*)\]@").unwrap());

/// Which part of a row sentence a token stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenPosition {
	Left = 1,
	Operator = 2,
	Right = 3,
}

impl TokenPosition {
	fn slot(self) -> usize {
		self as usize - 1
	}

	fn from_index(index: usize) -> Option<Self> {
		match index {
			1 => Some(TokenPosition::Left),
			2 => Some(TokenPosition::Operator),
			3 => Some(TokenPosition::Right),
			_ => None,
		}
	}
}

/// Parsed formatting overrides with forward and reverse token indexes.
///
/// When two entries localize the same base token differently, the entry
/// whose key sorts first wins.
#[derive(Debug, Clone, Default)]
pub struct FormattingTable {
	entries: BTreeMap<String, String>,
	forward: [HashMap<String, String>; 3],
	reverse: [HashMap<String, String>; 3],
}

impl FormattingTable {
	pub fn new(entries: BTreeMap<String, String>) -> Self {
		let mut table = Self::default();
		table.extend(entries);
		table
	}

	/// Adds entries, replacing existing sentences with the same key, and
	/// rebuilds the token indexes.
	pub fn extend(&mut self, entries: impl IntoIterator<Item = (String, String)>) {
		self.entries.extend(entries);
		self.reindex();
	}

	fn reindex(&mut self) {
		self.forward = Default::default();
		self.reverse = Default::default();
		for (key, value) in &self.entries {
			let Some(base) = key_tokens(key) else {
				warn!(key = %key, "formatting key does not have left, operator and right tokens");
				continue;
			};
			for (position, localized) in value_tokens(value) {
				let base = &base[position.slot()];
				self.forward[position.slot()]
					.entry(base.clone())
					.or_insert_with(|| localized.clone());
				self.reverse[position.slot()]
					.entry(localized)
					.or_insert_with(|| base.clone());
			}
		}
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn entries(&self) -> &BTreeMap<String, String> {
		&self.entries
	}

	/// Localized token for a base token at `position`.
	pub fn localized(&self, position: TokenPosition, base: &str) -> Option<&str> {
		self.forward[position.slot()].get(base).map(String::as_str)
	}

	/// Base token for a localized token at `position`.
	pub fn base_for(&self, position: TokenPosition, localized: &str) -> Option<&str> {
		self.reverse[position.slot()].get(localized).map(String::as_str)
	}

	/// Localized tokens seen at `position`, sorted.
	pub fn localized_tokens(&self, position: TokenPosition) -> Vec<&str> {
		let mut tokens: Vec<&str> = self.reverse[position.slot()].keys().map(String::as_str).collect();
		tokens.sort_unstable();
		tokens
	}

	pub fn lhs_match(&self, base: &str) -> Option<&str> {
		self.localized(TokenPosition::Left, base)
	}

	pub fn lhs_reverse_match(&self, localized: &str) -> Option<&str> {
		self.base_for(TokenPosition::Left, localized)
	}

	pub fn rhs_match(&self, base: &str) -> Option<&str> {
		self.localized(TokenPosition::Right, base)
	}

	pub fn rhs_reverse_match(&self, localized: &str) -> Option<&str> {
		self.base_for(TokenPosition::Right, localized)
	}

	/// Localized operator title, falling back to the base title.
	pub fn operator_match(&self, operator: Operator) -> &str {
		self.localized(TokenPosition::Operator, operator.title())
			.unwrap_or(operator.title())
	}

	/// Operator for a localized or base operator title.
	pub fn operator_reverse_match(&self, localized: &str) -> Result<Operator> {
		let base = self
			.base_for(TokenPosition::Operator, localized)
			.unwrap_or(localized);
		Operator::from_title(base).map_err(|_| PredicateError::UnrecognizedOperator(localized.to_string()))
	}

	/// Localized sentence stored for `key`.
	pub fn localized_sentence(&self, key: &str) -> Option<&str> {
		self.entries.get(key).map(String::as_str)
	}
}

/// Builds the table key for a row sentence.
pub fn key_for(left: &str, operator: Operator, right: &str) -> String {
	if operator.is_set_membership() {
		format!("%[{left}]@ %[{}]@ (%[{right}]@)", operator.title())
	} else {
		format!("%[{left}]@ %[{}]@ %[{right}]@", operator.title())
	}
}

fn key_tokens(key: &str) -> Option<[String; 3]> {
	let tokens: Vec<String> = TOKEN
		.captures_iter(key)
		.map(|c| c[2].to_string())
		.collect();
	<[String; 3]>::try_from(tokens).ok()
}

fn value_tokens(value: &str) -> Vec<(TokenPosition, String)> {
	TOKEN
		.captures_iter(value)
		.enumerate()
		.filter_map(|(i, c)| {
			let index = match c.get(1) {
				Some(n) => n.as_str().parse().ok()?,
				None => i + 1,
			};
			Some((TokenPosition::from_index(index)?, c[2].to_string()))
		})
		.collect()
}

impl PartialEq for FormattingTable {
	fn eq(&self, other: &Self) -> bool {
		self.entries == other.entries
	}
}

impl Serialize for FormattingTable {
	fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		self.entries.serialize(serializer)
	}
}

impl<'de> Deserialize<'de> for FormattingTable {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		BTreeMap::<String, String>::deserialize(deserializer).map(Self::new)
	}
}

impl FromIterator<(String, String)> for FormattingTable {
	fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
		Self::new(iter.into_iter().collect())
	}
}
