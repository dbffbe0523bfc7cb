// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Formatting overrides configuration section.

use std::collections::BTreeMap;
use std::path::PathBuf;

use loom_predicate_editor::FormattingTable;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::sources::read_toml;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FormattingConfigLayer {
	/// Sentence key to localized sentence.
	pub overrides: Option<BTreeMap<String, String>>,
	/// TOML file holding a flat table of further overrides.
	pub table_path: Option<PathBuf>,
}

impl FormattingConfigLayer {
	/// Later layers add sentences and replace those with the same key.
	pub fn merge(&mut self, other: Self) {
		if let Some(overrides) = other.overrides {
			self.overrides.get_or_insert_with(BTreeMap::new).extend(overrides);
		}
		if other.table_path.is_some() {
			self.table_path = other.table_path;
		}
	}

	/// Builds the table, or `None` when nothing is configured. Inline
	/// overrides win over entries from `table_path`.
	pub fn finalize(self) -> Result<Option<FormattingTable>> {
		let mut entries = BTreeMap::new();
		if let Some(path) = &self.table_path {
			debug!(path = %path.display(), "loading formatting table");
			entries.extend(read_toml::<BTreeMap<String, String>>(path)?);
		}
		entries.extend(self.overrides.unwrap_or_default());

		if entries.is_empty() {
			return Ok(None);
		}
		Ok(Some(FormattingTable::new(entries)))
	}
}
