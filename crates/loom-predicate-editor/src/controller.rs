// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The row-list controller: decomposes predicates into rows, keeps the row
//! list well formed under edits and synthesizes the predicate back.
//!
//! The row list encodes a tree in pre-order. Every group row is followed
//! immediately by its whole subtree, and a row's indentation is its parent's
//! plus one (zero at the top level).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use loom_predicate_core::{Compound, Connective, Operator, Predicate, ValueLocale};
use tracing::{debug, trace};

use crate::formatting::FormattingTable;
use crate::matcher;
use crate::observer::{ObserverId, Observers};
use crate::row::{RowId, RowInstance, RowView};
use crate::state::{RightValue, RowState};
use crate::template::{RowTemplate, TemplateCatalog};
use crate::{EditorError, Result};

/// Rows produced from a predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decomposition {
	pub rows: Vec<RowInstance>,
	/// Fragments no template matched. Their subtrees have no rows.
	pub dropped: usize,
	/// Operands, operators, connectives, modifiers or option sets replaced
	/// while binding matched fragments to their templates.
	pub substituted: usize,
}

impl Decomposition {
	pub fn losses(&self) -> Losses {
		Losses {
			dropped: self.dropped,
			substituted: self.substituted,
		}
	}
}

/// How much of a predicate the row list could not reproduce.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Losses {
	pub dropped: usize,
	pub substituted: usize,
}

impl Losses {
	/// The rows synthesize back to the original predicate.
	pub fn is_lossless(&self) -> bool {
		self.dropped == 0 && self.substituted == 0
	}
}

/// Decomposes `predicate` into a pre-order row list.
pub fn decompose(catalog: &TemplateCatalog, predicate: &Predicate) -> Decomposition {
	let mut out = Decomposition::default();
	decompose_into(catalog, predicate, None, 0, &mut out);
	out
}

fn decompose_into(
	catalog: &TemplateCatalog,
	predicate: &Predicate,
	parent: Option<RowId>,
	indentation: usize,
	out: &mut Decomposition,
) {
	if predicate.is_empty() {
		return;
	}
	let Some((id, template)) = matcher::best_row_template(catalog, predicate)
		.and_then(|m| catalog.get(m.id).map(|t| (m.id, t)))
	else {
		debug!(
			nodes = predicate.node_count(),
			parent = ?parent,
			"no template matches predicate fragment, dropping it"
		);
		out.dropped += 1;
		return;
	};

	let (state, substituted) = template.bind_reporting(predicate);
	if substituted > 0 {
		debug!(
			template = %id,
			substituted,
			parent = ?parent,
			"predicate fragment bound with substitutions"
		);
		out.substituted += substituted;
	}
	match predicate {
		Predicate::Compound(compound) => {
			let group_id = RowId::new();
			let mut row = RowInstance::group_with_id(group_id, id, state).with_parent(parent);
			row.set_indentation(indentation);
			out.rows.push(row);
			for child in &compound.children {
				decompose_into(catalog, child, Some(group_id), indentation + 1, out);
			}
		}
		_ => {
			let mut row = RowInstance::leaf(id, state).with_parent(parent);
			row.set_indentation(indentation);
			out.rows.push(row);
		}
	}
}

/// Synthesizes the predicate of the first row, following parent links.
/// An empty list synthesizes to [`Predicate::Empty`].
pub fn synthesize(catalog: &TemplateCatalog, rows: &[RowInstance], locale: &ValueLocale) -> Predicate {
	if rows.is_empty() {
		return Predicate::Empty;
	}
	let children = children_index(rows);
	synthesize_row(catalog, rows, &children, 0, locale, 0).unwrap_or_default()
}

fn children_index(rows: &[RowInstance]) -> HashMap<RowId, Vec<usize>> {
	let mut index: HashMap<RowId, Vec<usize>> = HashMap::new();
	for (i, row) in rows.iter().enumerate() {
		if let Some(parent) = row.parent() {
			index.entry(parent).or_default().push(i);
		}
	}
	index
}

fn synthesize_row(
	catalog: &TemplateCatalog,
	rows: &[RowInstance],
	children: &HashMap<RowId, Vec<usize>>,
	index: usize,
	locale: &ValueLocale,
	depth: usize,
) -> Option<Predicate> {
	// parent links can only be deeper than the list is long if they loop
	if depth > rows.len() {
		return None;
	}
	let row = rows.get(index)?;
	let template = catalog.get(row.template())?;
	match (template, row.state()) {
		(RowTemplate::Compound(t), RowState::Compound(state)) => {
			let survivors = row
				.id()
				.and_then(|id| children.get(&id))
				.into_iter()
				.flatten()
				.filter_map(|&child| synthesize_row(catalog, rows, children, child, locale, depth + 1))
				.collect();
			Some(Predicate::Compound(Compound::new(
				t.connective_for(state),
				survivors,
			)))
		}
		(RowTemplate::Comparison(t), RowState::Comparison(state)) => {
			let comparison = t.synthesize(state, locale);
			if comparison.is_none() {
				trace!(row = index, "row is missing a required selection");
			}
			comparison.map(Predicate::Comparison)
		}
		_ => None,
	}
}

/// Owns the row list and the predicate it represents.
///
/// All mutation goes through the controller. Observers registered with
/// [`PredicateController::on_change`] run synchronously after any operation
/// that changed [`PredicateController::current_predicate`].
#[derive(Debug)]
pub struct PredicateController {
	catalog: TemplateCatalog,
	rows: Vec<RowInstance>,
	root: Predicate,
	formatting: Option<Arc<FormattingTable>>,
	locale: ValueLocale,
	observers: Observers,
}

impl PredicateController {
	pub fn new(catalog: TemplateCatalog) -> Self {
		Self {
			catalog,
			rows: Vec::new(),
			root: Predicate::Empty,
			formatting: None,
			locale: ValueLocale::default(),
			observers: Observers::default(),
		}
	}

	/// Fails with [`EditorError::EmptyCatalog`] or
	/// [`EditorError::MissingGroupTemplate`] on an unusable catalog.
	pub fn from_templates(templates: Vec<RowTemplate>) -> Result<Self> {
		Ok(Self::new(TemplateCatalog::new(templates)?))
	}

	pub fn with_formatting(mut self, table: FormattingTable) -> Self {
		let table = Arc::new(table);
		for row in &mut self.rows {
			row.localize_with(&table);
		}
		self.formatting = Some(table);
		self
	}

	pub fn with_locale(mut self, locale: ValueLocale) -> Self {
		self.locale = locale;
		self.root = synthesize(&self.catalog, &self.rows, &self.locale);
		self
	}

	pub fn catalog(&self) -> &TemplateCatalog {
		&self.catalog
	}

	pub fn formatting(&self) -> Option<&FormattingTable> {
		self.formatting.as_deref()
	}

	pub fn locale(&self) -> &ValueLocale {
		&self.locale
	}

	/// Replaces the row list with the decomposition of `predicate` and
	/// reports what the rows could not reproduce.
	pub fn set_predicate(&mut self, predicate: &Predicate) -> Losses {
		let decomposition = decompose(&self.catalog, predicate);
		let losses = decomposition.losses();
		let mut rows = decomposition.rows;
		if let Some(table) = &self.formatting {
			for row in &mut rows {
				row.localize_with(table);
			}
		}
		if !losses.is_lossless() {
			debug!(
				dropped = losses.dropped,
				substituted = losses.substituted,
				rows = rows.len(),
				"predicate only partially represented by rows"
			);
		}
		self.rows = rows;
		self.refresh();
		losses
	}

	pub fn current_predicate(&self) -> &Predicate {
		&self.root
	}

	/// Snapshot of every row in list order.
	pub fn rows(&self) -> Vec<RowView> {
		let children = children_index(&self.rows);
		self
			.rows
			.iter()
			.enumerate()
			.map(|(index, row)| RowView {
				index,
				template: row.template(),
				identity: row.identity(),
				parent: row.parent(),
				indentation: row.indentation(),
				summary: row.summary(&self.locale),
				title: row.title(&self.locale),
				predicate: synthesize_row(&self.catalog, &self.rows, &children, index, &self.locale, 0),
			})
			.collect()
	}

	pub fn row(&self, index: usize) -> Option<&RowInstance> {
		self.rows.get(index)
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	/// Position of the group row with `id`.
	pub fn index_of(&self, id: RowId) -> Option<usize> {
		self.rows.iter().position(|row| row.id() == Some(id))
	}

	/// Adds a leaf row for the left operand titled `label` under `parent`.
	///
	/// `label` may be localized; it is mapped back through the formatting
	/// table before the catalog lookup. Returns `Ok(false)` when no template
	/// offers such an operand.
	pub fn add_row(&mut self, label: &str, parent: Option<RowId>) -> Result<bool> {
		if let Some(parent) = parent {
			self.group_index(parent)?;
		}
		let base = self
			.formatting
			.as_deref()
			.and_then(|t| t.lhs_reverse_match(label))
			.unwrap_or(label);
		let Some((template_id, left)) = self.catalog.find_left_operand(base, &self.locale) else {
			debug!(label, "no template offers a left operand with this title");
			return Ok(false);
		};
		let Some(RowTemplate::Comparison(template)) = self.catalog.get(template_id) else {
			return Err(EditorError::UnknownTemplate(template_id));
		};
		let mut state = template.initial_state();
		state.left = Some(left);

		let row = RowInstance::leaf(template_id, RowState::Comparison(state)).with_parent(parent);
		self.insert_row(row)?;
		Ok(true)
	}

	/// Adds a group row using the catalog's first compound template.
	pub fn add_group_row(&mut self, parent: Option<RowId>) -> Result<RowId> {
		let template_id = self.catalog.group_template();
		let template = self
			.catalog
			.get(template_id)
			.ok_or(EditorError::MissingGroupTemplate)?;
		let id = RowId::new();
		let row = RowInstance::group_with_id(id, template_id, template.initial_state()).with_parent(parent);
		self.insert_row(row)?;
		Ok(id)
	}

	/// Inserts `row` and returns its index.
	///
	/// A row without a parent goes last. A child goes right after its
	/// parent's existing subtree, so it ends up the parent's last child.
	pub fn insert_row(&mut self, mut row: RowInstance) -> Result<usize> {
		let template = self
			.catalog
			.get(row.template())
			.ok_or(EditorError::UnknownTemplate(row.template()))?;
		if template.is_compound() != row.is_group() || !template.accepts(row.state()) {
			return Err(EditorError::TemplateKindMismatch(row.template()));
		}
		if let Some(id) = row.id() {
			if self.index_of(id).is_some() {
				return Err(EditorError::DuplicateRowId(id));
			}
		}

		let index = match row.parent() {
			None => {
				row.set_indentation(0);
				self.rows.len()
			}
			Some(parent) => {
				let p = self.group_index(parent)?;
				row.set_indentation(self.rows[p].indentation() + 1);
				self.subtree_end(p)
			}
		};
		if let Some(table) = &self.formatting {
			row.localize_with(table);
		}

		debug!(
			index,
			parent = ?row.parent(),
			group = row.is_group(),
			"inserted row"
		);
		self.rows.insert(index, row);
		self.refresh();
		Ok(index)
	}

	/// Deletes the row at `index` and, for a group row, its whole subtree.
	/// Returns how many rows were removed; an out-of-range index removes none.
	pub fn delete_row(&mut self, index: usize) -> usize {
		let Some(row) = self.rows.get(index) else {
			debug!(index, len = self.rows.len(), "delete ignored, index out of range");
			return 0;
		};

		let mut doomed = vec![false; self.rows.len()];
		doomed[index] = true;
		let mut worklist: Vec<RowId> = row.id().into_iter().collect();
		while let Some(id) = worklist.pop() {
			for (i, candidate) in self.rows.iter().enumerate() {
				if !doomed[i] && candidate.parent() == Some(id) {
					doomed[i] = true;
					worklist.extend(candidate.id());
				}
			}
		}

		let removed = doomed.iter().filter(|d| **d).count();
		let mut marks = doomed.into_iter();
		self.rows.retain(|_| !marks.next().unwrap_or(false));

		debug!(index, removed, "deleted row");
		self.refresh();
		removed
	}

	/// Moves the row at `index` with its subtree under `new_parent` (or to
	/// the top level), as the parent's last child. Returns the new index.
	pub fn move_row(&mut self, index: usize, new_parent: Option<RowId>) -> Result<usize> {
		let len = self.rows.len();
		if index >= len {
			return Err(EditorError::IndexOutOfRange { index, len });
		}
		let end = self.subtree_end(index);
		let target = match new_parent {
			None => None,
			Some(parent) => {
				let p = self.group_index(parent)?;
				if (index..end).contains(&p) {
					return Err(EditorError::MoveIntoOwnSubtree);
				}
				Some(p)
			}
		};

		let mut block: Vec<RowInstance> = self.rows.drain(index..end).collect();
		let (position, base) = match target {
			None => (self.rows.len(), 0),
			Some(p) => {
				let p = if p >= end { p - block.len() } else { p };
				(self.subtree_end(p), self.rows[p].indentation() + 1)
			}
		};
		let old_base = block.first().map_or(0, RowInstance::indentation);
		for row in &mut block {
			row.set_indentation(row.indentation() - old_base + base);
		}
		if let Some(head) = block.first_mut() {
			head.set_parent(new_parent);
		}

		debug!(from = index, to = position, rows = block.len(), "moved row");
		self.rows.splice(position..position, block);
		self.refresh();
		Ok(position)
	}

	/// Replaces the bound state of the row at `index`.
	pub fn set_row_state(&mut self, index: usize, state: RowState) -> Result<()> {
		let template_id = self.row_at(index)?.template();
		let template = self
			.catalog
			.get(template_id)
			.ok_or(EditorError::UnknownTemplate(template_id))?;
		if !template.accepts(&state) {
			return Err(EditorError::StateKindMismatch(index));
		}
		self.rows[index].set_state(state);
		self.refresh();
		Ok(())
	}

	/// Stores typed text as the right value of a comparison row. Localized
	/// right titles are mapped back to their base title.
	pub fn set_right_text(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
		self.row_at(index)?;
		let text = text.into();
		let text = self
			.formatting
			.as_deref()
			.and_then(|t| t.rhs_reverse_match(&text))
			.map(str::to_string)
			.unwrap_or(text);
		let RowState::Comparison(state) = self.rows[index].state_mut() else {
			return Err(EditorError::StateKindMismatch(index));
		};
		state.right = RightValue::Text(text);
		self.refresh();
		Ok(())
	}

	/// Selects the operator titled `title` (base or localized) on a
	/// comparison row.
	pub fn set_operator(&mut self, index: usize, title: &str) -> Result<()> {
		self.row_at(index)?;
		let operator = match self.formatting.as_deref() {
			Some(table) => table.operator_reverse_match(title)?,
			None => Operator::from_title(title)?,
		};
		let RowState::Comparison(state) = self.rows[index].state_mut() else {
			return Err(EditorError::StateKindMismatch(index));
		};
		state.operator = Some(operator);
		self.refresh();
		Ok(())
	}

	/// Selects `connective` on the root group row. Returns `Ok(false)` when
	/// the first row is not a group row.
	pub fn update_connective(&mut self, connective: Connective) -> Result<bool> {
		let Some(root) = self.rows.first() else {
			return Ok(false);
		};
		let template_id = root.template();
		let RowTemplate::Compound(template) = self
			.catalog
			.get(template_id)
			.ok_or(EditorError::UnknownTemplate(template_id))?
		else {
			return Ok(false);
		};
		if !template.offers(connective) {
			return Err(EditorError::UnsupportedConnective(connective));
		}
		if let Some(RowState::Compound(state)) = self.rows.first_mut().map(RowInstance::state_mut) {
			state.connective = Some(connective);
		}
		self.refresh();
		Ok(true)
	}

	pub fn on_change<F>(&mut self, callback: F) -> ObserverId
	where
		F: FnMut() + Send + 'static,
	{
		self.observers.register(callback)
	}

	pub fn remove_observer(&mut self, id: ObserverId) -> bool {
		self.observers.remove(id)
	}

	/// Checks the structural invariants of the row list and reports the
	/// first violation.
	pub fn validate(&self) -> Result<()> {
		let mut seen = HashSet::new();
		for (i, row) in self.rows.iter().enumerate() {
			let template = self
				.catalog
				.get(row.template())
				.ok_or(EditorError::UnknownTemplate(row.template()))?;
			if template.is_compound() != row.is_group() || !template.accepts(row.state()) {
				return Err(violation(format!(
					"row {i} does not fit template {}",
					row.template()
				)));
			}
			if let Some(id) = row.id() {
				if !seen.insert(id) {
					return Err(EditorError::DuplicateRowId(id));
				}
			}
			match row.parent() {
				None if row.indentation() != 0 => {
					return Err(violation(format!(
						"top-level row {i} has indentation {}",
						row.indentation()
					)));
				}
				None => {}
				Some(parent) => {
					let Some(p) = self.rows[..i].iter().position(|r| r.id() == Some(parent)) else {
						return Err(violation(format!("row {i} does not follow its parent {parent}")));
					};
					let expected = self.rows[p].indentation() + 1;
					if row.indentation() != expected {
						return Err(violation(format!(
							"row {i} has indentation {}, expected {expected}",
							row.indentation()
						)));
					}
					if i >= self.subtree_end(p) {
						return Err(violation(format!(
							"row {i} is outside the block of its parent at {p}"
						)));
					}
				}
			}
		}
		Ok(())
	}

	fn row_at(&self, index: usize) -> Result<&RowInstance> {
		self.rows.get(index).ok_or(EditorError::IndexOutOfRange {
			index,
			len: self.rows.len(),
		})
	}

	fn group_index(&self, id: RowId) -> Result<usize> {
		self.index_of(id).ok_or(EditorError::ParentNotFound(id))
	}

	/// One past the last row of the subtree rooted at `index`.
	fn subtree_end(&self, index: usize) -> usize {
		let depth = self.rows[index].indentation();
		let mut end = index + 1;
		while end < self.rows.len() && self.rows[end].indentation() > depth {
			end += 1;
		}
		end
	}

	fn refresh(&mut self) {
		let predicate = synthesize(&self.catalog, &self.rows, &self.locale);
		if predicate != self.root {
			trace!(predicate = %predicate, "root predicate changed");
			self.root = predicate;
			self.observers.notify();
		}
	}
}

fn violation(message: String) -> EditorError {
	EditorError::InvariantViolation(message)
}
