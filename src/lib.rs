// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod files;
pub mod operator;
pub mod settings;
pub mod types;

#[cfg(test)]
mod test_utils;
