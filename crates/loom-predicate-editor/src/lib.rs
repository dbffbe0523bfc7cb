// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Row editor engine for Loom predicates.
//!
//! A predicate tree is edited as a flat, indented list of rows. Each row is
//! bound to a [`RowTemplate`] from a host-supplied [`TemplateCatalog`]: group
//! rows carry an AND/OR/NOT selector, leaf rows carry operand, operator and
//! value pickers. The [`PredicateController`] owns the list, keeps every
//! group's subtree contiguous under insert, delete and move, and synthesizes
//! the predicate back after each edit.
//!
//! # Example
//!
//! ```
//! use loom_predicate_core::{Expression, Operator};
//! use loom_predicate_editor::{
//!     ComparisonTemplate, CompoundTemplate, PredicateController, TemplateCatalog, ValueKind,
//! };
//!
//! let catalog = TemplateCatalog::new(vec![
//!     CompoundTemplate::default().into(),
//!     ComparisonTemplate::new(vec![Expression::key_path("name")], vec![Operator::BeginsWith])
//!         .with_value_kind(ValueKind::String)
//!         .into(),
//! ])?;
//!
//! let mut controller = PredicateController::new(catalog);
//! let root = controller.add_group_row(None)?;
//! controller.add_row("name", Some(root))?;
//! controller.set_right_text(1, "jo")?;
//! assert_eq!(controller.current_predicate().to_string(), "name BEGINSWITH \"jo\"");
//! # Ok::<(), loom_predicate_editor::EditorError>(())
//! ```

pub mod coerce;
pub mod controller;
pub mod error;
pub mod formatting;
pub mod matcher;
pub mod observer;
pub mod row;
pub mod state;
pub mod template;

pub use coerce::ValueKind;
pub use controller::{decompose, synthesize, Decomposition, Losses, PredicateController};
pub use error::{EditorError, Result};
pub use formatting::{FormattingTable, TokenPosition};
pub use matcher::{best_match, score, TemplateMatch};
pub use observer::ObserverId;
pub use row::{RowId, RowIdentity, RowInstance, RowSummary, RowView};
pub use state::{ComparisonState, CompoundState, RightValue, RowState};
pub use template::{ComparisonTemplate, CompoundTemplate, RowTemplate, TemplateCatalog, TemplateId};
