// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, TOML files and environment variables.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use crate::error::{ConfigError, Result};
use crate::layer::PredicateConfigLayer;
use crate::sections::{
	CatalogConfigLayer, FormattingConfigLayer, LocaleConfigLayer, LogFormat, LoggingConfigLayer,
};

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	SystemFile = 20,
	UserFile = 30,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<PredicateConfigLayer>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<PredicateConfigLayer> {
		debug!("loading defaults");
		Ok(PredicateConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file is skipped.
pub struct TomlSource {
	path: PathBuf,
	precedence: Precedence,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			precedence: Precedence::UserFile,
		}
	}

	pub fn system() -> Self {
		Self::new("/etc/loom/predicate-editor.toml").with_precedence(Precedence::SystemFile)
	}

	pub fn with_precedence(mut self, precedence: Precedence) -> Self {
		self.precedence = precedence;
		self
	}

	/// `~/.config/loom/predicate-editor.toml` on Linux.
	pub fn user() -> Option<Self> {
		dirs::config_dir().map(|dir| Self::new(dir.join("loom").join("predicate-editor.toml")))
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		self.precedence
	}

	fn load(&self) -> Result<PredicateConfigLayer> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(PredicateConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let layer = read_toml(&self.path)?;
		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Reads and parses a TOML file.
pub(crate) fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
	let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
		path: path.to_path_buf(),
		source: e,
	})?;
	toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
		path: path.to_path_buf(),
		source: e,
	})
}

/// Environment variable source.
///
/// Convention: LOOM_PREDICATE_<SECTION>_<FIELD>
pub struct EnvSource;

impl EnvSource {
	/// Builds a layer from an arbitrary variable lookup.
	pub fn load_from(lookup: impl Fn(&str) -> Option<String>) -> Result<PredicateConfigLayer> {
		let var = |name: &str| lookup(name).filter(|s| !s.is_empty());

		let catalog = CatalogConfigLayer {
			templates: None,
			path: var("LOOM_PREDICATE_CATALOG_PATH").map(PathBuf::from),
		};
		let formatting = FormattingConfigLayer {
			overrides: None,
			table_path: var("LOOM_PREDICATE_FORMATTING_PATH").map(PathBuf::from),
		};
		let locale = LocaleConfigLayer {
			true_token: var("LOOM_PREDICATE_LOCALE_TRUE"),
			false_token: var("LOOM_PREDICATE_LOCALE_FALSE"),
			yes_token: var("LOOM_PREDICATE_LOCALE_YES"),
			no_token: var("LOOM_PREDICATE_LOCALE_NO"),
			null_token: var("LOOM_PREDICATE_LOCALE_NULL"),
			short_date_format: var("LOOM_PREDICATE_LOCALE_DATE_FORMAT"),
			decimal_separator: env_char(
				"LOOM_PREDICATE_LOCALE_DECIMAL_SEPARATOR",
				var("LOOM_PREDICATE_LOCALE_DECIMAL_SEPARATOR"),
			)?,
			grouping_separator: env_char(
				"LOOM_PREDICATE_LOCALE_GROUPING_SEPARATOR",
				var("LOOM_PREDICATE_LOCALE_GROUPING_SEPARATOR"),
			)?,
		};
		let logging = LoggingConfigLayer {
			level: var("LOOM_PREDICATE_LOG_LEVEL"),
			format: env_log_format("LOOM_PREDICATE_LOG_FORMAT", var("LOOM_PREDICATE_LOG_FORMAT"))?,
		};

		Ok(PredicateConfigLayer {
			catalog: Some(catalog),
			formatting: Some(formatting),
			locale: Some(locale),
			logging: Some(logging),
		})
	}
}

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<PredicateConfigLayer> {
		debug!("loading environment variables");
		Self::load_from(|name| std::env::var(name).ok())
	}
}

fn env_char(name: &str, value: Option<String>) -> Result<Option<char>> {
	let Some(value) = value else {
		return Ok(None);
	};
	let mut chars = value.chars();
	match (chars.next(), chars.next()) {
		(Some(c), None) => Ok(Some(c)),
		_ => Err(ConfigError::invalid_value(
			name,
			format!("expected a single character, got '{value}'"),
		)),
	}
}

fn env_log_format(name: &str, value: Option<String>) -> Result<Option<LogFormat>> {
	match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
		None => Ok(None),
		Some("pretty") => Ok(Some(LogFormat::Pretty)),
		Some("json") => Ok(Some(LogFormat::Json)),
		Some(other) => Err(ConfigError::invalid_value(
			name,
			format!("unknown log format '{other}'"),
		)),
	}
}
