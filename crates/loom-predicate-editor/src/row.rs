// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use loom_predicate_core::{Connective, Expression, Predicate, ValueLocale};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::formatting::FormattingTable;
use crate::state::{RightValue, RowState};
use crate::template::TemplateId;

/// Unique identifier for a group row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowId(pub Uuid);

impl RowId {
	pub fn new() -> Self {
		Self(Uuid::new_v4())
	}
}

impl Default for RowId {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Display for RowId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl std::str::FromStr for RowId {
	type Err = uuid::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self(Uuid::parse_str(s)?))
	}
}

/// Whether a row can own children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum RowIdentity {
	Leaf,
	Group(RowId),
}

impl RowIdentity {
	pub fn id(&self) -> Option<RowId> {
		match self {
			RowIdentity::Leaf => None,
			RowIdentity::Group(id) => Some(*id),
		}
	}

	pub fn is_group(&self) -> bool {
		matches!(self, RowIdentity::Group(_))
	}
}

/// A template bound into the row list.
///
/// Rows refer to their template by id and carry their own state; the
/// template itself is never copied or mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowInstance {
	identity: RowIdentity,
	parent: Option<RowId>,
	indentation: usize,
	template: TemplateId,
	state: RowState,
	#[serde(skip)]
	localization: Option<Arc<FormattingTable>>,
}

impl RowInstance {
	/// A top-level leaf row.
	pub fn leaf(template: TemplateId, state: RowState) -> Self {
		Self {
			identity: RowIdentity::Leaf,
			parent: None,
			indentation: 0,
			template,
			state,
			localization: None,
		}
	}

	/// A top-level group row with a fresh id.
	pub fn group(template: TemplateId, state: RowState) -> Self {
		Self::group_with_id(RowId::new(), template, state)
	}

	pub fn group_with_id(id: RowId, template: TemplateId, state: RowState) -> Self {
		Self {
			identity: RowIdentity::Group(id),
			..Self::leaf(template, state)
		}
	}

	/// Places the row under `parent`. Insertion recomputes the indentation
	/// from the parent's actual position.
	pub fn with_parent(mut self, parent: Option<RowId>) -> Self {
		self.parent = parent;
		self
	}

	pub fn with_localization(mut self, table: Arc<FormattingTable>) -> Self {
		self.localization = Some(table);
		self
	}

	pub fn identity(&self) -> RowIdentity {
		self.identity
	}

	pub fn id(&self) -> Option<RowId> {
		self.identity.id()
	}

	pub fn is_group(&self) -> bool {
		self.identity.is_group()
	}

	pub fn parent(&self) -> Option<RowId> {
		self.parent
	}

	pub fn indentation(&self) -> usize {
		self.indentation
	}

	pub fn template(&self) -> TemplateId {
		self.template
	}

	pub fn state(&self) -> &RowState {
		&self.state
	}

	pub fn localization(&self) -> Option<&FormattingTable> {
		self.localization.as_deref()
	}

	pub(crate) fn set_parent(&mut self, parent: Option<RowId>) {
		self.parent = parent;
	}

	pub(crate) fn set_indentation(&mut self, indentation: usize) {
		self.indentation = indentation;
	}

	pub(crate) fn state_mut(&mut self) -> &mut RowState {
		&mut self.state
	}

	pub(crate) fn set_state(&mut self, state: RowState) {
		self.state = state;
	}

	pub(crate) fn localize_with(&mut self, table: &Arc<FormattingTable>) {
		if self.localization.is_none() {
			self.localization = Some(Arc::clone(table));
		}
	}

	/// Localized title of the left operand, if one is selected.
	pub fn title(&self, locale: &ValueLocale) -> Option<String> {
		let left = self.state.as_comparison()?.left.as_ref()?;
		self.localize_left(left, locale)
	}

	/// Display-oriented summary of the bound state.
	pub fn summary(&self, locale: &ValueLocale) -> RowSummary {
		match &self.state {
			RowState::Compound(s) => RowSummary::Compound {
				connective: s.connective(),
			},
			RowState::Comparison(s) => RowSummary::Comparison {
				left: s.left.as_ref().and_then(|e| self.localize_left(e, locale)),
				operator: s.operator.map(|op| match self.localization() {
					Some(table) => table.operator_match(op).to_string(),
					None => op.title().to_string(),
				}),
				right: match &s.right {
					RightValue::Unset => None,
					RightValue::Text(text) => Some(text.clone()),
					RightValue::Date(date) => Some(locale.format_date(date)),
					RightValue::Expression(e) => self.localize_right(e, locale),
				},
			},
		}
	}

	fn localize_left(&self, expr: &Expression, locale: &ValueLocale) -> Option<String> {
		let base = expr.string_value(locale)?;
		let localized = self.localization().and_then(|t| t.lhs_match(&base));
		Some(localized.map(str::to_string).unwrap_or(base))
	}

	fn localize_right(&self, expr: &Expression, locale: &ValueLocale) -> Option<String> {
		let base = expr.string_value(locale)?;
		let localized = self.localization().and_then(|t| t.rhs_match(&base));
		Some(localized.map(str::to_string).unwrap_or(base))
	}
}

/// What a row currently shows, in display titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowSummary {
	Comparison {
		left: Option<String>,
		operator: Option<String>,
		right: Option<String>,
	},
	Compound {
		connective: Connective,
	},
}

/// Read-only snapshot of a row handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
	pub index: usize,
	pub template: TemplateId,
	pub identity: RowIdentity,
	pub parent: Option<RowId>,
	pub indentation: usize,
	pub summary: RowSummary,
	pub title: Option<String>,
	/// What this row synthesizes to on its own; `None` when a required
	/// selection is missing.
	pub predicate: Option<Predicate>,
}
