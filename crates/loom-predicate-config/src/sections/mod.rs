// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod catalog;
mod formatting;
mod locale;
mod logging;

pub use catalog::CatalogConfigLayer;
pub use formatting::FormattingConfigLayer;
pub use locale::LocaleConfigLayer;
pub use logging::{LogFormat, LoggingConfig, LoggingConfigLayer};
