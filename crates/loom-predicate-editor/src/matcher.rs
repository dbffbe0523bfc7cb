// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Template matching: scores how well a template can represent a predicate
//! fragment and picks the best candidate from a catalog.
//!
//! # Scoring
//!
//! - Comparison against a comparison template: `0.33` for each of operator,
//!   left operand, right operand and modifier that the template offers,
//!   saturated at `1.0`.
//! - Compound against a comparison template: every child whose own score is
//!   at least `0.5` contributes `1 / child_count`.
//! - Compound against a compound template: `1.0` when the connective is
//!   offered, `0.5` otherwise. Any compound is representable by a group row.
//! - Anything else scores `0.0`.

use loom_predicate_core::{Comparison, Compound, Predicate};

use crate::template::{ComparisonTemplate, CompoundTemplate, RowTemplate, TemplateCatalog, TemplateId};

pub const CRITERION_WEIGHT: f64 = 0.33;
pub const PLAUSIBLE_CHILD_SCORE: f64 = 0.5;
pub const OFFERED_CONNECTIVE_SCORE: f64 = 1.0;
pub const OTHER_CONNECTIVE_SCORE: f64 = 0.5;

/// Result of [`best_match`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateMatch {
	pub id: TemplateId,
	pub score: f64,
}

/// Scores `template` against `predicate`, in `[0, 1]`.
pub fn score(template: &RowTemplate, predicate: &Predicate) -> f64 {
	match (template, predicate) {
		(RowTemplate::Comparison(t), Predicate::Comparison(c)) => score_comparison(t, c),
		(RowTemplate::Comparison(_), Predicate::Compound(c)) => score_children(template, c),
		(RowTemplate::Compound(t), Predicate::Compound(c)) => score_compound(t, c),
		(RowTemplate::Compound(_), Predicate::Comparison(_)) => 0.0,
		(_, Predicate::Empty) => 0.0,
	}
}

fn score_comparison(template: &ComparisonTemplate, comparison: &Comparison) -> f64 {
	let mut total = 0.0;
	if template.operators.contains(&comparison.operator) {
		total += CRITERION_WEIGHT;
	}
	if template.left_operands.contains(&comparison.left) {
		total += CRITERION_WEIGHT;
	}
	if template.right_operands.contains(&comparison.right) {
		total += CRITERION_WEIGHT;
	}
	if template.modifier == comparison.modifier {
		total += CRITERION_WEIGHT;
	}
	f64::min(total, 1.0)
}

fn score_children(template: &RowTemplate, compound: &Compound) -> f64 {
	let count = compound.children.len();
	if count == 0 {
		return 0.0;
	}
	let share = 1.0 / count as f64;
	compound
		.children
		.iter()
		.filter(|child| score(template, child) >= PLAUSIBLE_CHILD_SCORE)
		.map(|_| share)
		.sum()
}

fn score_compound(template: &CompoundTemplate, compound: &Compound) -> f64 {
	if template.offers(compound.connective) {
		OFFERED_CONNECTIVE_SCORE
	} else {
		OTHER_CONNECTIVE_SCORE
	}
}

/// Picks the highest scoring template among `candidates`.
///
/// A later candidate replaces the current best only with a strictly greater
/// score, so ties go to the earliest candidate. Returns `None` when nothing
/// scores above zero.
pub fn best_match<'a>(
	candidates: impl IntoIterator<Item = (TemplateId, &'a RowTemplate)>,
	predicate: &Predicate,
) -> Option<TemplateMatch> {
	let mut best: Option<TemplateMatch> = None;
	for (id, template) in candidates {
		let s = score(template, predicate);
		if s > best.map_or(0.0, |b| b.score) {
			best = Some(TemplateMatch { id, score: s });
		}
	}
	best
}

/// Best template of the kind that can hold `predicate` as a row: compound
/// templates for compounds, comparison templates for comparisons.
pub fn best_row_template(catalog: &TemplateCatalog, predicate: &Predicate) -> Option<TemplateMatch> {
	let wants_group = match predicate {
		Predicate::Empty => return None,
		Predicate::Compound(_) => true,
		Predicate::Comparison(_) => false,
	};
	best_match(
		catalog.iter().filter(|(_, t)| t.is_compound() == wants_group),
		predicate,
	)
}
