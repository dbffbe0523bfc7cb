// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Template catalog configuration section.

use std::path::PathBuf;

use loom_predicate_editor::{CompoundTemplate, RowTemplate, TemplateCatalog};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::sources::read_toml;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CatalogConfigLayer {
	/// Inline templates, in catalog order.
	pub templates: Option<Vec<RowTemplate>>,
	/// TOML file with a top-level `templates` array. Used when no inline
	/// templates are configured.
	pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
	templates: Vec<RowTemplate>,
}

impl CatalogConfigLayer {
	/// A `path` from a later layer replaces inline templates from earlier
	/// layers unless the later layer inlines templates too.
	pub fn merge(&mut self, other: Self) {
		if other.path.is_some() {
			self.path = other.path;
			self.templates = None;
		}
		if other.templates.is_some() {
			self.templates = other.templates;
		}
	}

	/// Resolves the catalog. Without any configured templates the catalog
	/// holds a single group template offering all connectives.
	pub fn finalize(self) -> Result<TemplateCatalog> {
		let templates = match (self.templates, self.path) {
			(Some(templates), _) => templates,
			(None, Some(path)) => {
				debug!(path = %path.display(), "loading template catalog file");
				read_toml::<CatalogFile>(&path)?.templates
			}
			(None, None) => default_templates(),
		};
		Ok(TemplateCatalog::new(templates)?)
	}
}

fn default_templates() -> Vec<RowTemplate> {
	vec![CompoundTemplate::default().into()]
}
