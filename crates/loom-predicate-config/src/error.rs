// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration error types.

use std::path::PathBuf;

use loom_predicate_editor::EditorError;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// I/O error reading a config or table file
	#[error("Failed to read {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// TOML parsing error
	#[error("TOML parse error in {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	/// Invalid value
	#[error("Invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },

	/// Validation error
	#[error("Validation error: {0}")]
	Validation(String),

	/// Template catalog rejected by the editor
	#[error("Invalid template catalog: {0}")]
	Catalog(#[from] EditorError),

	/// A global tracing subscriber is already installed
	#[error("Failed to initialize logging: {0}")]
	Logging(String),
}

impl ConfigError {
	/// Create a validation error
	pub fn validation(msg: impl Into<String>) -> Self {
		Self::Validation(msg.into())
	}

	/// Create an invalid value error
	pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
		Self::InvalidValue {
			key: key.into(),
			message: message.into(),
		}
	}
}

pub type Result<T> = std::result::Result<T, ConfigError>;
