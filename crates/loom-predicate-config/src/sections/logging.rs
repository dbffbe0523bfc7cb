// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Logging configuration section.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
	#[default]
	Pretty,
	Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfigLayer {
	/// `EnvFilter` directive, e.g. "info" or "loom_predicate_editor=debug".
	pub level: Option<String>,
	pub format: Option<LogFormat>,
}

impl LoggingConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.level.is_some() {
			self.level = other.level;
		}
		if other.format.is_some() {
			self.format = other.format;
		}
	}

	pub fn finalize(self) -> LoggingConfig {
		LoggingConfig {
			level: self.level.unwrap_or_else(|| "info".to_string()),
			format: self.format.unwrap_or_default(),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
	pub level: String,
	pub format: LogFormat,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: "info".to_string(),
			format: LogFormat::Pretty,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_layer_finalize_defaults() {
		assert_eq!(LoggingConfigLayer::default().finalize(), LoggingConfig::default());
	}

	#[test]
	fn test_merge_overwrites() {
		let mut base = LoggingConfigLayer {
			level: Some("info".to_string()),
			format: Some(LogFormat::Json),
		};
		base.merge(LoggingConfigLayer {
			level: Some("debug".to_string()),
			format: None,
		});
		let config = base.finalize();
		assert_eq!(config.level, "debug");
		assert_eq!(config.format, LogFormat::Json);
	}
}
