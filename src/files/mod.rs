// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Load, mutate and write YAML, JSON and INI files.

pub mod config_file;
pub mod ini;
pub mod session;
pub mod timings;
pub mod version_gate;

pub use config_file::{ConfigFile, FileType};
pub use self::ini::IniDocument;
pub use session::{ManagedFile, Session};
pub use timings::TimeTrackingFile;
pub use version_gate::{parse_version, supported_for, UpperBound, VersionGate, Versioned};
