// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration produced by a single source.

use serde::{Deserialize, Serialize};

use crate::sections::{
	CatalogConfigLayer, FormattingConfigLayer, LocaleConfigLayer, LoggingConfigLayer,
};

/// One source's view of the configuration. Absent sections leave the
/// merged result untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PredicateConfigLayer {
	pub catalog: Option<CatalogConfigLayer>,
	pub formatting: Option<FormattingConfigLayer>,
	pub locale: Option<LocaleConfigLayer>,
	pub logging: Option<LoggingConfigLayer>,
}

impl PredicateConfigLayer {
	/// Merges `other` on top of `self`; values set in `other` win.
	pub fn merge(&mut self, other: Self) {
		merge_option(&mut self.catalog, other.catalog, CatalogConfigLayer::merge);
		merge_option(&mut self.formatting, other.formatting, FormattingConfigLayer::merge);
		merge_option(&mut self.locale, other.locale, LocaleConfigLayer::merge);
		merge_option(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_option<T>(target: &mut Option<T>, other: Option<T>, merge: impl FnOnce(&mut T, T)) {
	let Some(other) = other else {
		return;
	};
	if let Some(existing) = target.as_mut() {
		merge(existing, other);
	} else {
		*target = Some(other);
	}
}
