// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use thiserror::Error;

/// Errors that can occur in the predicate model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateError {
	#[error("unrecognized operator title: {0}")]
	UnrecognizedOperator(String),

	#[error("unrecognized connective title: {0}")]
	UnrecognizedConnective(String),
}

pub type Result<T> = std::result::Result<T, PredicateError>;
