// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core predicate model for the Loom predicate editor.
//!
//! A predicate is a tree of [`Compound`] groups (AND/OR/NOT) whose leaves are
//! [`Comparison`]s between two [`Expression`]s. The editor crate
//! (`loom-predicate-editor`) converts these trees to and from flat row lists.
//!
//! # Example
//!
//! ```
//! use loom_predicate_core::{Comparison, Expression, Operator, Predicate};
//!
//! let p = Predicate::and(vec![
//!     Comparison::new(Expression::key_path("age"), Operator::GreaterThan, Expression::integer(18)).into(),
//!     Comparison::new(Expression::key_path("name"), Operator::BeginsWith, Expression::string("A")).into(),
//! ]);
//! assert_eq!(p.to_string(), "age > 18 AND name BEGINSWITH \"A\"");
//! ```

pub mod comparison;
pub mod error;
pub mod expression;
pub mod locale;
pub mod predicate;

pub use comparison::{Comparison, ComparisonOption, Modifier, Operator};
pub use error::{PredicateError, Result};
pub use expression::{Constant, Expression};
pub use locale::{ValueLocale, DEFAULT_SHORT_DATE_FORMAT};
pub use predicate::{Compound, Connective, Predicate};
