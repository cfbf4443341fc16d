// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! In-process backend for dry runs and tests.

use crate::client::backend::{
    ClusterBackend, CollectionSpec, Document, MutationOptions, QueryOptions, RoleAndDescription,
    User, ViewQuery, ViewResult,
};
use crate::client::keyspace::Keyspace;
use crate::constants::client::{DEFAULT_COLLECTION, DEFAULT_SCOPE};
use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub value: Document,
    pub options: MutationOptions,
}

#[derive(Default)]
struct State {
    documents: BTreeMap<Keyspace, BTreeMap<String, StoredDocument>>,
    collections: BTreeSet<(String, String)>,
    users: BTreeMap<String, User>,
    faults: VecDeque<Error>,
    query_results: VecDeque<Vec<Document>>,
    statements: Vec<String>,
    calls: usize,
}

/// Keeps everything in memory. Faults queued with `fail_next` are returned
/// by the following calls, one per call, before any work is done.
pub struct MemoryCluster {
    bucket: String,
    state: Mutex<State>,
}

impl MemoryCluster {
    pub fn new(bucket: &str) -> Self {
        let mut state = State::default();
        state
            .collections
            .insert((DEFAULT_SCOPE.to_string(), DEFAULT_COLLECTION.to_string()));
        Self {
            bucket: bucket.to_string(),
            state: Mutex::new(state),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Begin a call: count it and surface a queued fault.
    fn enter(&self) -> Result<MutexGuard<'_, State>> {
        let mut state = self.state();
        state.calls += 1;
        match state.faults.pop_front() {
            Some(fault) => Err(fault),
            None => Ok(state),
        }
    }

    pub fn fail_next(&self, error: Error) {
        self.state().faults.push_back(error);
    }

    /// Rows returned by the next `query` call.
    pub fn push_query_result(&self, rows: Vec<Document>) {
        self.state().query_results.push_back(rows);
    }

    pub fn calls(&self) -> usize {
        self.state().calls
    }

    pub fn statements(&self) -> Vec<String> {
        self.state().statements.clone()
    }

    pub fn stored(&self, keyspace: &Keyspace, key: &str) -> Option<StoredDocument> {
        self.state()
            .documents
            .get(keyspace)
            .and_then(|docs| docs.get(key))
            .cloned()
    }

    pub fn user(&self, username: &str) -> Option<User> {
        self.state().users.get(username).cloned()
    }

    pub fn has_collection(&self, scope: &str, collection: &str) -> bool {
        self.state()
            .collections
            .contains(&(scope.to_string(), collection.to_string()))
    }

    fn check_collection(state: &State, keyspace: &Keyspace) -> Result<()> {
        if state
            .collections
            .contains(&(keyspace.scope.clone(), keyspace.collection.clone()))
        {
            Ok(())
        } else {
            Err(Error::UnknownCollection(keyspace.to_string()))
        }
    }
}

#[async_trait::async_trait]
impl ClusterBackend for MemoryCluster {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upsert(
        &self,
        keyspace: &Keyspace,
        key: &str,
        document: &Document,
        options: &MutationOptions,
    ) -> Result<()> {
        let mut state = self.enter()?;
        Self::check_collection(&state, keyspace)?;
        state.documents.entry(keyspace.clone()).or_default().insert(
            key.to_string(),
            StoredDocument {
                value: document.clone(),
                options: *options,
            },
        );
        Ok(())
    }

    async fn get(&self, keyspace: &Keyspace, key: &str) -> Result<Document> {
        let state = self.enter()?;
        Self::check_collection(&state, keyspace)?;
        state
            .documents
            .get(keyspace)
            .and_then(|docs| docs.get(key))
            .map(|stored| stored.value.clone())
            .ok_or_else(|| Error::DocumentNotFound(format!("{keyspace}/{key}")))
    }

    async fn remove(&self, keyspace: &Keyspace, key: &str) -> Result<()> {
        let mut state = self.enter()?;
        Self::check_collection(&state, keyspace)?;
        state
            .documents
            .get_mut(keyspace)
            .and_then(|docs| docs.remove(key))
            .map(|_| ())
            .ok_or_else(|| Error::DocumentNotFound(format!("{keyspace}/{key}")))
    }

    async fn query(&self, statement: &str, _options: &QueryOptions) -> Result<Vec<Document>> {
        let mut state = self.enter()?;
        debug!("Query: {}", statement);
        state.statements.push(statement.to_string());
        Ok(state.query_results.pop_front().unwrap_or_default())
    }

    async fn view_query(&self, design_doc: &str, view: &str, _query: &ViewQuery) -> Result<ViewResult> {
        let mut state = self.enter()?;
        state
            .statements
            .push(format!("_design/{design_doc}/_view/{view}"));
        Ok(ViewResult::default())
    }

    async fn upsert_user(&self, user: &User) -> Result<()> {
        let mut state = self.enter()?;
        state.users.insert(user.username.clone(), user.clone());
        Ok(())
    }

    async fn get_roles(&self) -> Result<Vec<RoleAndDescription>> {
        let _state = self.enter()?;
        Ok(["admin", "bucket_admin", "data_reader", "data_writer"]
            .into_iter()
            .map(|role| RoleAndDescription {
                role: role.to_string(),
                bucket_name: None,
                display_name: role.to_string(),
                description: String::new(),
            })
            .collect())
    }

    async fn create_collection(&self, spec: &CollectionSpec) -> Result<()> {
        let mut state = self.enter()?;
        let created = state
            .collections
            .insert((spec.scope_name.clone(), spec.collection_name.clone()));
        if !created {
            return Err(Error::Management(format!(
                "collection {}:{} already exists",
                spec.scope_name, spec.collection_name
            )));
        }
        Ok(())
    }

    async fn drop_collection(&self, spec: &CollectionSpec) -> Result<()> {
        let mut state = self.enter()?;
        let target = (spec.scope_name.clone(), spec.collection_name.clone());
        if !state.collections.remove(&target) {
            return Err(Error::Management(format!(
                "collection {}:{} not found",
                spec.scope_name, spec.collection_name
            )));
        }
        let bucket = self.bucket.clone();
        state.documents.retain(|keyspace, _| {
            keyspace.bucket != bucket
                || keyspace.scope != spec.scope_name
                || keyspace.collection != spec.collection_name
        });
        Ok(())
    }
}
