// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{env_vars, paths};
use std::env;
use std::path::PathBuf;

/// Harness configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the bundled operator templates
    pub template_dir: PathBuf,
    /// Directory the rendered manifests are written to
    pub output_dir: PathBuf,
    pub timings_file: PathBuf,
}

impl Config {
    /// Load configuration from environment variables, falling back to the repository layout
    pub fn from_env() -> Self {
        let template_dir = env::var(env_vars::TEMPLATE_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(paths::TEMPLATE_DIR));
        let output_dir = env::var(env_vars::OUTPUT_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(paths::OUTPUT_DIR));
        let timings_file = env::var(env_vars::TIMINGS_FILE)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(paths::TIMINGS_FILE));

        Config {
            template_dir,
            output_dir,
            timings_file,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            template_dir: PathBuf::from(paths::TEMPLATE_DIR),
            output_dir: PathBuf::from(paths::OUTPUT_DIR),
            timings_file: PathBuf::from(paths::TIMINGS_FILE),
        }
    }
}
