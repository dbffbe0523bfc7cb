// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use loom_predicate_core::{Connective, PredicateError};
use thiserror::Error;

use crate::{RowId, TemplateId};

/// Errors raised by the row editor.
///
/// Everything except [`EditorError::Predicate`] is a caller mistake: the
/// editor refuses the operation and leaves the row list untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
	#[error("template catalog is empty")]
	EmptyCatalog,

	#[error("template catalog has no compound template")]
	MissingGroupTemplate,

	#[error("unknown template: {0}")]
	UnknownTemplate(TemplateId),

	#[error("template {0} does not fit the row kind")]
	TemplateKindMismatch(TemplateId),

	#[error("row state does not fit the template of row {0}")]
	StateKindMismatch(usize),

	#[error("parent row not found: {0}")]
	ParentNotFound(RowId),

	#[error("duplicate row id: {0}")]
	DuplicateRowId(RowId),

	#[error("row index {index} out of range (len {len})")]
	IndexOutOfRange { index: usize, len: usize },

	#[error("cannot move a row into its own subtree")]
	MoveIntoOwnSubtree,

	#[error("connective {0:?} is not offered by the compound template")]
	UnsupportedConnective(Connective),

	#[error("row invariant violated: {0}")]
	InvariantViolation(String),

	#[error(transparent)]
	Predicate(#[from] PredicateError),
}

pub type Result<T> = std::result::Result<T, EditorError>;
