// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Row templates: prototypes describing the shape of a row and how its bound
//! state turns back into a predicate.

use std::collections::BTreeSet;
use std::fmt;

use loom_predicate_core::{
	Comparison, ComparisonOption, Compound, Connective, Expression, Modifier, Operator, Predicate,
	ValueLocale,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coerce::{self, ValueKind};
use crate::state::{ComparisonState, CompoundState, RightValue, RowState};
use crate::{EditorError, Result};

/// Index of a template in its [`TemplateCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(pub usize);

impl fmt::Display for TemplateId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Template for a single comparison row (operand, operator and value pickers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonTemplate {
	pub left_operands: Vec<Expression>,
	/// Empty means the right side is a free value typed by the user.
	#[serde(default)]
	pub right_operands: Vec<Expression>,
	#[serde(default)]
	pub right_value_kind: Option<ValueKind>,
	#[serde(default)]
	pub modifier: Modifier,
	pub operators: Vec<Operator>,
	#[serde(default)]
	pub options: BTreeSet<ComparisonOption>,
}

impl ComparisonTemplate {
	pub fn new(left_operands: Vec<Expression>, operators: Vec<Operator>) -> Self {
		Self {
			left_operands,
			right_operands: Vec::new(),
			right_value_kind: None,
			modifier: Modifier::Direct,
			operators,
			options: BTreeSet::new(),
		}
	}

	pub fn with_right_operands(mut self, right_operands: Vec<Expression>) -> Self {
		self.right_operands = right_operands;
		self
	}

	pub fn with_value_kind(mut self, kind: ValueKind) -> Self {
		self.right_value_kind = Some(kind);
		self
	}

	pub fn with_modifier(mut self, modifier: Modifier) -> Self {
		self.modifier = modifier;
		self
	}

	pub fn with_options(mut self, options: impl IntoIterator<Item = ComparisonOption>) -> Self {
		self.options.extend(options);
		self
	}

	pub fn has_free_value(&self) -> bool {
		self.right_operands.is_empty()
	}

	/// State of a freshly added row: first operator, first right operand.
	pub fn initial_state(&self) -> ComparisonState {
		ComparisonState {
			left: self.left_operands.first().cloned(),
			operator: self.operators.first().copied(),
			right: self
				.right_operands
				.first()
				.cloned()
				.map(RightValue::Expression)
				.unwrap_or_default(),
		}
	}

	/// Drives the pickers from a comparison.
	///
	/// Values the template does not offer fall back to the first entry of the
	/// corresponding list. Free-value templates keep the right operand as is.
	pub fn bind(&self, comparison: &Comparison) -> ComparisonState {
		self.bind_reporting(comparison).0
	}

	/// Like [`ComparisonTemplate::bind`], also counting the parts of
	/// `comparison` that the bound row no longer reproduces: a substituted
	/// operand or operator, or a modifier or option set the template overrides.
	pub fn bind_reporting(&self, comparison: &Comparison) -> (ComparisonState, usize) {
		let mut substituted = 0;

		let left = pick(&self.left_operands, &comparison.left, "left operand", &mut substituted);
		let operator = if self.operators.contains(&comparison.operator) {
			Some(comparison.operator)
		} else {
			debug!(
				operator = ?comparison.operator,
				fallback = ?self.operators.first(),
				"operator not offered by template, substituting"
			);
			substituted += 1;
			self.operators.first().copied()
		};
		let right = if self.has_free_value() {
			RightValue::Expression(comparison.right.clone())
		} else {
			pick(&self.right_operands, &comparison.right, "right operand", &mut substituted)
				.map(RightValue::Expression)
				.unwrap_or_default()
		};
		if comparison.modifier != self.modifier {
			debug!(
				modifier = ?comparison.modifier,
				template = ?self.modifier,
				"modifier replaced by the template's"
			);
			substituted += 1;
		}
		if comparison.options != self.options {
			debug!(
				options = ?comparison.options,
				template = ?self.options,
				"comparison options replaced by the template's"
			);
			substituted += 1;
		}

		let state = ComparisonState {
			left,
			operator,
			right,
		};
		(state, substituted)
	}

	/// Builds a comparison from the bound state, or `None` when a required
	/// selection is missing.
	pub fn synthesize(&self, state: &ComparisonState, locale: &ValueLocale) -> Option<Comparison> {
		let left = state.left.clone()?;
		let operator = state.operator?;
		let right = self.resolve_right(&state.right, locale)?;
		Some(Comparison {
			left,
			right,
			operator,
			modifier: self.modifier,
			options: self.options.clone(),
		})
	}

	fn resolve_right(&self, value: &RightValue, locale: &ValueLocale) -> Option<Expression> {
		match value {
			RightValue::Expression(expr) => Some(expr.clone()),
			RightValue::Date(date) => Some(Expression::date(*date)),
			RightValue::Text(text) if self.has_free_value() => {
				coerce::coerce_text(text, self.right_value_kind, locale)
			}
			// picker title typed or restored as text
			RightValue::Text(text) => self
				.right_operands
				.iter()
				.find(|e| e.string_value(locale).as_deref() == Some(text.as_str()))
				.cloned(),
			RightValue::Unset if self.has_free_value() => coerce::default_for(self.right_value_kind),
			RightValue::Unset => None,
		}
	}
}

fn pick(
	options: &[Expression],
	wanted: &Expression,
	what: &str,
	substituted: &mut usize,
) -> Option<Expression> {
	if options.contains(wanted) {
		return Some(wanted.clone());
	}
	debug!(
		wanted = %wanted,
		fallback = ?options.first().map(ToString::to_string),
		"{what} not offered by template, substituting"
	);
	*substituted += 1;
	options.first().cloned()
}

/// Template for a group row (the "All / Any / None" selector).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundTemplate {
	pub connectives: Vec<Connective>,
}

impl CompoundTemplate {
	pub fn new(connectives: Vec<Connective>) -> Self {
		Self { connectives }
	}

	pub fn offers(&self, connective: Connective) -> bool {
		self.connectives.contains(&connective)
	}

	pub fn bind(&self, compound: &Compound) -> CompoundState {
		self.bind_reporting(compound).0
	}

	/// Binds the connective; the count is 1 when an unoffered connective was
	/// replaced by the first offered one.
	pub fn bind_reporting(&self, compound: &Compound) -> (CompoundState, usize) {
		if self.offers(compound.connective) {
			return (
				CompoundState {
					connective: Some(compound.connective),
				},
				0,
			);
		}
		debug!(
			connective = ?compound.connective,
			fallback = ?self.connectives.first(),
			"connective not offered by template, substituting"
		);
		let state = CompoundState {
			connective: self.connectives.first().copied(),
		};
		(state, 1)
	}

	/// Selected connective, `and` when nothing is selected.
	pub fn connective_for(&self, state: &CompoundState) -> Connective {
		state.connective()
	}
}

impl Default for CompoundTemplate {
	fn default() -> Self {
		Self::new(Connective::ALL.to_vec())
	}
}

/// A row prototype. Configured once by the host and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowTemplate {
	Comparison(ComparisonTemplate),
	Compound(CompoundTemplate),
}

impl RowTemplate {
	pub fn is_compound(&self) -> bool {
		matches!(self, RowTemplate::Compound(_))
	}

	pub fn initial_state(&self) -> RowState {
		match self {
			RowTemplate::Comparison(t) => RowState::Comparison(t.initial_state()),
			RowTemplate::Compound(_) => RowState::Compound(CompoundState::default()),
		}
	}

	/// Binds a predicate into a new row state. A predicate of the wrong shape
	/// leaves the initial state.
	pub fn bind(&self, predicate: &Predicate) -> RowState {
		self.bind_reporting(predicate).0
	}

	/// Binds and counts substitutions. A predicate of the wrong shape counts
	/// as one.
	pub fn bind_reporting(&self, predicate: &Predicate) -> (RowState, usize) {
		match (self, predicate) {
			(RowTemplate::Comparison(t), Predicate::Comparison(c)) => {
				let (state, substituted) = t.bind_reporting(c);
				(RowState::Comparison(state), substituted)
			}
			(RowTemplate::Compound(t), Predicate::Compound(c)) => {
				let (state, substituted) = t.bind_reporting(c);
				(RowState::Compound(state), substituted)
			}
			_ => {
				debug!("predicate shape does not fit template, binding initial state");
				(self.initial_state(), 1)
			}
		}
	}

	/// Whether `state` has the shape this template produces.
	pub fn accepts(&self, state: &RowState) -> bool {
		self.is_compound() == state.is_compound()
	}
}

impl From<ComparisonTemplate> for RowTemplate {
	fn from(t: ComparisonTemplate) -> Self {
		RowTemplate::Comparison(t)
	}
}

impl From<CompoundTemplate> for RowTemplate {
	fn from(t: CompoundTemplate) -> Self {
		RowTemplate::Compound(t)
	}
}

/// The host-supplied set of templates. Always holds at least one compound template.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TemplateCatalog {
	templates: Vec<RowTemplate>,
}

impl TemplateCatalog {
	pub fn new(templates: Vec<RowTemplate>) -> Result<Self> {
		if templates.is_empty() {
			return Err(EditorError::EmptyCatalog);
		}
		if !templates.iter().any(RowTemplate::is_compound) {
			return Err(EditorError::MissingGroupTemplate);
		}
		Ok(Self { templates })
	}

	pub fn get(&self, id: TemplateId) -> Option<&RowTemplate> {
		self.templates.get(id.0)
	}

	pub fn len(&self) -> usize {
		self.templates.len()
	}

	pub fn is_empty(&self) -> bool {
		self.templates.is_empty()
	}

	/// Templates with their ids, in catalog order.
	pub fn iter(&self) -> impl Iterator<Item = (TemplateId, &RowTemplate)> {
		self
			.templates
			.iter()
			.enumerate()
			.map(|(i, t)| (TemplateId(i), t))
	}

	/// First compound template; used for rows added without a predicate.
	pub fn group_template(&self) -> TemplateId {
		self
			.iter()
			.find(|(_, t)| t.is_compound())
			.map(|(id, _)| id)
			.unwrap_or(TemplateId(0))
	}

	/// Finds the first comparison template offering a left operand whose
	/// text projection equals `label`.
	pub fn find_left_operand(
		&self,
		label: &str,
		locale: &ValueLocale,
	) -> Option<(TemplateId, Expression)> {
		self.iter().find_map(|(id, template)| match template {
			RowTemplate::Comparison(t) => t
				.left_operands
				.iter()
				.find(|e| e.string_value(locale).as_deref() == Some(label))
				.map(|e| (id, e.clone())),
			RowTemplate::Compound(_) => None,
		})
	}
}

impl<'de> Deserialize<'de> for TemplateCatalog {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		let templates = Vec::<RowTemplate>::deserialize(deserializer)?;
		TemplateCatalog::new(templates).map_err(serde::de::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn name_template() -> ComparisonTemplate {
		ComparisonTemplate::new(
			vec![Expression::key_path("name"), Expression::key_path("email")],
			vec![Operator::Equal, Operator::BeginsWith],
		)
		.with_value_kind(ValueKind::String)
	}

	#[test]
	fn test_catalog_requires_group_template() {
		assert_eq!(TemplateCatalog::new(vec![]), Err(EditorError::EmptyCatalog));
		assert_eq!(
			TemplateCatalog::new(vec![name_template().into()]),
			Err(EditorError::MissingGroupTemplate)
		);
		let catalog =
			TemplateCatalog::new(vec![name_template().into(), CompoundTemplate::default().into()])
				.unwrap();
		assert_eq!(catalog.group_template(), TemplateId(1));
	}

	#[test]
	fn test_bind_then_synthesize_free_value() {
		let template = name_template();
		let cmp = Comparison::new(
			Expression::key_path("email"),
			Operator::BeginsWith,
			Expression::string("jo"),
		);
		let state = template.bind(&cmp);
		assert_eq!(
			template.synthesize(&state, &ValueLocale::default()),
			Some(cmp)
		);
	}

	#[test]
	fn test_bind_falls_back_to_first_entry() {
		let template = name_template();
		let cmp = Comparison::new(
			Expression::key_path("age"),
			Operator::Contains,
			Expression::string("x"),
		);
		let (state, substituted) = template.bind_reporting(&cmp);
		assert_eq!(state.left, Some(Expression::key_path("name")));
		assert_eq!(state.operator, Some(Operator::Equal));
		assert_eq!(substituted, 2);
	}

	#[test]
	fn test_bind_counts_overridden_modifier_and_options() {
		let template = name_template();
		let exact = Comparison::new(
			Expression::key_path("email"),
			Operator::Equal,
			Expression::string("x"),
		);
		assert_eq!(template.bind_reporting(&exact).1, 0);

		let flagged = exact
			.clone()
			.with_modifier(Modifier::Any)
			.with_options([ComparisonOption::CaseInsensitive]);
		assert_eq!(template.bind_reporting(&flagged).1, 2);

		let status = ComparisonTemplate::new(vec![Expression::key_path("status")], vec![Operator::Equal])
			.with_right_operands(vec![Expression::string("open")]);
		let closed = Comparison::new(
			Expression::key_path("status"),
			Operator::Equal,
			Expression::string("closed"),
		);
		let (state, substituted) = status.bind_reporting(&closed);
		assert_eq!(state.right, RightValue::Expression(Expression::string("open")));
		assert_eq!(substituted, 1);
	}

	#[test]
	fn test_synthesize_missing_left_is_none() {
		let template = name_template();
		let state = ComparisonState {
			left: None,
			operator: Some(Operator::Equal),
			right: RightValue::Text("x".to_string()),
		};
		assert_eq!(template.synthesize(&state, &ValueLocale::default()), None);
	}

	#[test]
	fn test_synthesize_text_coercion() {
		let template = ComparisonTemplate::new(
			vec![Expression::key_path("age")],
			vec![Operator::GreaterThan],
		)
		.with_value_kind(ValueKind::Integer);
		let locale = ValueLocale::default();

		let mut state = template.initial_state();
		assert_eq!(state.right, RightValue::Unset);
		let cmp = template.synthesize(&state, &locale).unwrap();
		assert_eq!(cmp.right, Expression::integer(0));

		state.right = RightValue::Text("21".to_string());
		let cmp = template.synthesize(&state, &locale).unwrap();
		assert_eq!(cmp.right, Expression::integer(21));
	}

	#[test]
	fn test_synthesize_text_missing_fails() {
		let template = name_template();
		let state = template.initial_state();
		assert_eq!(template.synthesize(&state, &ValueLocale::default()), None);
	}

	#[test]
	fn test_right_operand_list_selection_by_title() {
		let template = ComparisonTemplate::new(
			vec![Expression::key_path("status")],
			vec![Operator::Equal],
		)
		.with_right_operands(vec![Expression::string("open"), Expression::string("closed")]);
		let locale = ValueLocale::default();

		let state = ComparisonState {
			left: Some(Expression::key_path("status")),
			operator: Some(Operator::Equal),
			right: RightValue::Text("closed".to_string()),
		};
		let cmp = template.synthesize(&state, &locale).unwrap();
		assert_eq!(cmp.right, Expression::string("closed"));

		let unset = ComparisonState {
			right: RightValue::Unset,
			..state
		};
		assert_eq!(template.synthesize(&unset, &locale), None);
	}

	#[test]
	fn test_template_options_and_modifier_flow_into_comparison() {
		let template = ComparisonTemplate::new(vec![Expression::key_path("tags")], vec![Operator::Contains])
			.with_modifier(Modifier::Any)
			.with_options([ComparisonOption::CaseInsensitive]);
		let state = ComparisonState {
			left: Some(Expression::key_path("tags")),
			operator: Some(Operator::Contains),
			right: RightValue::Text("rust".to_string()),
		};
		let cmp = template.synthesize(&state, &ValueLocale::default()).unwrap();
		assert_eq!(cmp.modifier, Modifier::Any);
		assert!(cmp.options.contains(&ComparisonOption::CaseInsensitive));
	}

	#[test]
	fn test_compound_bind_and_default() {
		let template = CompoundTemplate::new(vec![Connective::And, Connective::Or]);
		let state = template.bind(&Compound::new(Connective::Or, vec![]));
		assert_eq!(template.connective_for(&state), Connective::Or);

		assert_eq!(template.bind_reporting(&Compound::new(Connective::Or, vec![])).1, 0);
		let (unlisted, substituted) = template.bind_reporting(&Compound::new(Connective::Not, vec![]));
		assert_eq!(unlisted.connective, Some(Connective::And));
		assert_eq!(substituted, 1);

		assert_eq!(
			template.connective_for(&CompoundState::default()),
			Connective::And
		);
	}

	#[test]
	fn test_row_template_bind_wrong_shape_is_initial() {
		let template: RowTemplate = CompoundTemplate::default().into();
		let cmp = Predicate::Comparison(Comparison::new(
			Expression::key_path("a"),
			Operator::Equal,
			Expression::integer(1),
		));
		assert_eq!(template.bind(&cmp), RowState::Compound(CompoundState::default()));
	}

	#[test]
	fn test_catalog_deserialize_validates() {
		let json = serde_json::json!([
			{"kind": "comparison", "left_operands": [{"kind": "key_path", "value": "name"}], "operators": ["equal"]}
		]);
		let err = serde_json::from_value::<TemplateCatalog>(json).unwrap_err();
		assert!(err.to_string().contains("no compound template"));
	}

	#[test]
	fn test_find_left_operand() {
		let catalog =
			TemplateCatalog::new(vec![CompoundTemplate::default().into(), name_template().into()])
				.unwrap();
		let locale = ValueLocale::default();
		assert_eq!(
			catalog.find_left_operand("email", &locale),
			Some((TemplateId(1), Expression::key_path("email")))
		);
		assert_eq!(catalog.find_left_operand("phone", &locale), None);
	}
}
