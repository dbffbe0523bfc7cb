// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for hosts embedding the Loom predicate editor.
//!
//! Sources are merged in precedence order:
//! 1. Built-in defaults
//! 2. `/etc/loom/predicate-editor.toml`
//! 3. `~/.config/loom/predicate-editor.toml` (or an explicit file)
//! 4. `LOOM_PREDICATE_*` environment variables
//!
//! ```toml
//! [logging]
//! level = "loom_predicate_editor=debug"
//! format = "json"
//!
//! [locale]
//! decimal_separator = ","
//! grouping_separator = "."
//!
//! [catalog]
//! path = "/etc/loom/templates.toml"
//!
//! [formatting.overrides]
//! "%[name]@ %[is]@ %[jo]@" = "%1$[Nombre]@ %2$[es]@ %3$[jo]@"
//! ```

pub mod error;
pub mod layer;
pub mod logging;
pub mod sections;
pub mod sources;

use std::path::{Path, PathBuf};

use loom_predicate_core::ValueLocale;
use loom_predicate_editor::{FormattingTable, PredicateController, TemplateCatalog};
use tracing::info;

pub use error::{ConfigError, Result};
pub use layer::PredicateConfigLayer;
pub use logging::init_tracing;
pub use sections::{
	CatalogConfigLayer, FormattingConfigLayer, LocaleConfigLayer, LogFormat, LoggingConfig,
	LoggingConfigLayer,
};
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

/// Fully resolved editor configuration.
#[derive(Debug, Clone)]
pub struct EditorConfig {
	pub catalog: TemplateCatalog,
	pub formatting: Option<FormattingTable>,
	pub locale: ValueLocale,
	pub logging: LoggingConfig,
}

impl EditorConfig {
	/// Builds an empty controller wired with the configured catalog,
	/// formatting table and locale.
	pub fn controller(&self) -> PredicateController {
		let mut controller =
			PredicateController::new(self.catalog.clone()).with_locale(self.locale.clone());
		if let Some(table) = &self.formatting {
			controller = controller.with_formatting(table.clone());
		}
		controller
	}
}

/// Loads configuration from defaults, system and user files, and the environment.
pub fn load_config() -> Result<EditorConfig> {
	let mut sources: Vec<Box<dyn ConfigSource>> =
		vec![Box::new(DefaultsSource), Box::new(TomlSource::system())];
	if let Some(user) = TomlSource::user() {
		sources.push(Box::new(user));
	}
	sources.push(Box::new(EnvSource));
	load_from_sources(sources)
}

/// Like [`load_config`] with `path` in place of the user file.
pub fn load_config_with_file(path: impl Into<PathBuf>) -> Result<EditorConfig> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(TomlSource::new(path)),
		Box::new(EnvSource),
	])
}

/// Parses a TOML document on top of the defaults. The environment is ignored.
pub fn load_config_from_str(content: &str) -> Result<EditorConfig> {
	let layer: PredicateConfigLayer =
		toml::from_str(content).map_err(|e| ConfigError::TomlParse {
			path: Path::new("<inline>").to_path_buf(),
			source: e,
		})?;
	finalize(layer)
}

/// Merges sources in precedence order and resolves the result.
pub fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<EditorConfig> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = PredicateConfigLayer::default();
	for source in &sources {
		let layer = source.load()?;
		tracing::debug!(source = source.name(), "merged config layer");
		merged.merge(layer);
	}
	finalize(merged)
}

fn finalize(layer: PredicateConfigLayer) -> Result<EditorConfig> {
	let catalog = layer.catalog.unwrap_or_default().finalize()?;
	let formatting = layer.formatting.unwrap_or_default().finalize()?;
	let locale = layer.locale.unwrap_or_default().finalize()?;
	let logging = layer.logging.unwrap_or_default().finalize();

	info!(
		templates = catalog.len(),
		formatting_entries = formatting.as_ref().map_or(0, FormattingTable::len),
		log_level = %logging.level,
		"configuration loaded"
	);

	Ok(EditorConfig {
		catalog,
		formatting,
		locale,
		logging,
	})
}
