// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Global tracing subscriber setup for hosts embedding the editor.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{ConfigError, Result};
use crate::sections::{LogFormat, LoggingConfig};

/// Filter from `RUST_LOG`, falling back to the configured level.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
	EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
	let registry = tracing_subscriber::registry().with(env_filter(config));
	let result = match config.format {
		LogFormat::Pretty => registry.with(fmt::layer()).try_init(),
		LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
	};
	result.map_err(|e| ConfigError::Logging(e.to_string()))
}
