// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Blocking client used by the load generators.
//!
//! Wraps [`AsyncGen`] on a private current-thread runtime and routes every
//! operation through the [`Executor`] with its own retry, suppression and
//! timing options. Suppressed operations log a warning and report success.

use crate::client::async_gen::AsyncGen;
use crate::client::backend::{
    ClusterBackend, Document, Durability, QueryOptions, Role, RoleAndDescription,
    ViewQuery, ViewResult,
};
use crate::client::connection::ConnectionOptions;
use crate::client::executor::{CallOptions, Executor, RetryPolicy, Suppress};
use crate::client::latency::{LatencyRecorder, Operation};
use crate::client::rest::RestCluster;
use crate::error::{Error, Result};
use tokio::runtime::{Builder, Runtime};

pub struct SyncGen<B: ClusterBackend> {
    inner: AsyncGen<B>,
    runtime: Runtime,
    executor: Executor,
}

impl SyncGen<RestCluster> {
    pub fn connect(options: &ConnectionOptions) -> Result<Self> {
        Self::new(RestCluster::connect(options)?)
    }
}

impl<B: ClusterBackend> SyncGen<B> {
    pub fn new(backend: B) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        Ok(Self {
            inner: AsyncGen::new(backend),
            runtime,
            executor: Executor::default(),
        })
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.executor = Executor::new(policy);
        self
    }

    pub fn connect_collections<S: AsRef<str>>(&mut self, targets: &[S]) -> Result<()> {
        self.inner.connect_collections(targets)
    }

    pub fn backend(&self) -> &B {
        self.inner.backend()
    }

    pub fn latencies(&self) -> &LatencyRecorder {
        self.executor.latencies()
    }

    pub fn create(&self, target: &str, key: &str, document: &Document, ttl: u64) -> Result<()> {
        let inner = &self.inner;
        let options = CallOptions::default().retried().suppressing(Suppress::All);
        self.runtime
            .block_on(self.executor.execute(Operation::Create, options, move || {
                inner.create(target, key, document, ttl)
            }))
            .map(|_| ())
    }

    pub fn create_durable(
        &self,
        target: &str,
        key: &str,
        document: &Document,
        durability: Durability,
        ttl: u64,
    ) -> Result<()> {
        let inner = &self.inner;
        let options = CallOptions::default().retried().suppressing(Suppress::All);
        self.runtime
            .block_on(self.executor.execute(Operation::Create, options, move || {
                inner.create_durable(target, key, document, durability, ttl)
            }))
            .map(|_| ())
    }

    /// Timed read. A missing document is logged and yields `None`.
    pub fn read(&self, target: &str, key: &str) -> Result<Option<Document>> {
        let inner = &self.inner;
        let options = CallOptions::default().timed().suppressing(Suppress::NotFound);
        self.runtime
            .block_on(self.executor.execute(Operation::Read, options, move || inner.read(target, key)))
    }

    /// Plain read without timing or suppression.
    pub fn get(&self, target: &str, key: &str) -> Result<Document> {
        self.runtime.block_on(self.inner.read(target, key))
    }

    pub fn update(&self, target: &str, key: &str, document: &Document, ttl: u64) -> Result<()> {
        let inner = &self.inner;
        let options = CallOptions::default().timed();
        self.runtime
            .block_on(self.executor.execute(Operation::Update, options, move || {
                inner.update(target, key, document, ttl)
            }))
            .map(|_| ())
    }

    /// Upsert without expiry.
    pub fn set(&self, target: &str, key: &str, document: &Document) -> Result<()> {
        self.update(target, key, document, 0)
    }

    pub fn update_durable(
        &self,
        target: &str,
        key: &str,
        document: &Document,
        durability: Durability,
        ttl: u64,
    ) -> Result<()> {
        let inner = &self.inner;
        let options = CallOptions::default().timed();
        self.runtime
            .block_on(self.executor.execute(Operation::Update, options, move || {
                inner.update_durable(target, key, document, durability, ttl)
            }))
            .map(|_| ())
    }

    pub fn delete(&self, target: &str, key: &str) -> Result<()> {
        let inner = &self.inner;
        let options = CallOptions::default().suppressing(Suppress::All);
        self.runtime
            .block_on(self.executor.execute(Operation::Delete, options, move || inner.delete(target, key)))
            .map(|_| ())
    }

    /// Timed query. Failures are logged and yield `None`.
    pub fn n1ql_query(&self, statement: &str, query_options: &QueryOptions) -> Result<Option<Vec<Document>>> {
        let backend = self.inner.backend();
        let options = CallOptions::default().timed().suppressing(Suppress::All);
        self.runtime
            .block_on(self.executor.execute(Operation::Query, options, move || {
                backend.query(statement, query_options)
            }))
    }

    pub fn view_query(&self, design_doc: &str, view: &str, query: &ViewQuery) -> Result<ViewResult> {
        let backend = self.inner.backend();
        let options = CallOptions::default().timed();
        let result = self
            .runtime
            .block_on(self.executor.execute(Operation::ViewQuery, options, move || {
                backend.view_query(design_doc, view, query)
            }))?;
        result.ok_or_else(|| Error::Runtime(format!("view query {design_doc}/{view} returned no result")))
    }

    pub fn upsert_user(&self, username: &str, roles: &[Role], password: &str) -> Result<()> {
        let inner = &self.inner;
        let options = CallOptions::default().retried().suppressing(Suppress::All);
        self.runtime
            .block_on(self.executor.execute(Operation::UpsertUser, options, move || async move {
                inner.users().upsert_user(username, roles, password).await
            }))
            .map(|_| ())
    }

    pub fn get_roles(&self) -> Result<Vec<RoleAndDescription>> {
        self.runtime.block_on(self.inner.users().get_roles())
    }

    pub fn collection_create(&self, scope: &str, collection: &str) -> Result<()> {
        self.runtime
            .block_on(self.inner.collections().create_collection(scope, collection))
    }

    pub fn collection_drop(&self, scope: &str, collection: &str) -> Result<()> {
        self.runtime
            .block_on(self.inner.collections().drop_collection(scope, collection))
    }
}
