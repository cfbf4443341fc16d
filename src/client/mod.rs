// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod async_gen;
pub mod backend;
pub mod connection;
pub mod executor;
pub mod keyspace;
pub mod latency;
pub mod managers;
pub mod memory;
pub mod rest;
pub mod sync_gen;

pub use async_gen::AsyncGen;
pub use backend::{ClusterBackend, Document, Durability, MutationOptions, QueryOptions, Role, ViewQuery};
pub use connection::{connection_string, ConnectionOptions, SslMode};
pub use executor::{CallOptions, Executor, RetryPolicy, Suppress};
pub use keyspace::Keyspace;
pub use latency::{LatencyRecorder, LatencySummary, Operation};
pub use memory::MemoryCluster;
pub use rest::RestCluster;
pub use sync_gen::SyncGen;
