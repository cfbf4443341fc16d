// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Backend speaking the cluster's HTTP services.
//!
//! Key-value operations go through the query service as single-key N1QL
//! statements; users and collections through the management REST API.

use crate::client::backend::{
    ClusterBackend, CollectionSpec, Document, Durability, MutationOptions, QueryOptions, RoleAndDescription,
    User, ViewQuery, ViewResult,
};
use crate::client::connection::{connection_string, ConnectionOptions, Endpoints};
use crate::client::keyspace::Keyspace;
use crate::error::{Error, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::fs;
use std::time::Duration;
use tracing::{debug, info, instrument};

pub struct RestCluster {
    http: Client,
    endpoints: Endpoints,
    username: String,
    password: String,
    bucket: String,
    kv_timeout: Duration,
    query_timeout: Duration,
}

impl RestCluster {
    pub fn connect(options: &ConnectionOptions) -> Result<Self> {
        let connstr = connection_string(options);
        let endpoints = Endpoints::from_connection_string(&connstr.value)?;

        let mut builder = Client::builder().timeout(options.kv_timeout.max(options.query_timeout));
        if let Some(certpath) = endpoints.certpath.as_ref().filter(|p| p.is_file()) {
            let pem = fs::read(certpath)?;
            builder = builder.add_root_certificate(reqwest::Certificate::from_pem(&pem)?);
        }
        if connstr.enable_tracing {
            debug!("Request tracing requested for {}", connstr);
        }

        info!("Connecting to {} as {}", connstr, options.username);
        Ok(Self {
            http: builder.build()?,
            endpoints,
            username: options.username.clone(),
            password: options.password.clone(),
            bucket: options.bucket.clone(),
            kv_timeout: options.kv_timeout,
            query_timeout: options.query_timeout,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request.basic_auth(&self.username, Some(&self.password))
    }

    #[instrument(skip(self, body), level = "debug")]
    async fn execute(&self, statement: &str, mut body: Map<String, Value>) -> Result<QueryResponse> {
        body.insert("statement".into(), statement.into());
        let url = format!("{}/query/service", self.endpoints.query);
        let response = self.authed(self.http.post(url)).json(&body).send().await?;
        let status = response.status();
        let response: QueryResponse = response.json().await?;

        if let Some(first) = response.errors.first() {
            return Err(Error::Query {
                code: first.code,
                message: first.msg.clone(),
            });
        }
        if !status.is_success() {
            return Err(Error::Query {
                code: 0,
                message: format!("{} with status {}", status, response.status),
            });
        }
        Ok(response)
    }

    async fn execute_kv(
        &self,
        statement: &str,
        args: Vec<Value>,
        options: Option<&MutationOptions>,
    ) -> Result<QueryResponse> {
        let mut body = Map::new();
        body.insert("args".into(), Value::Array(args));
        body.insert("timeout".into(), format_timeout(self.kv_timeout).into());
        if let Some(options) = options.filter(|o| o.durability != Durability::None) {
            body.insert("durability_level".into(), options.durability.as_str().into());
        }
        self.execute(statement, body).await
    }

    async fn management(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = self.authed(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status.as_u16() == 429 || status.is_server_error() {
            return Err(Error::TemporaryFailure(format!("{what}: {status}")));
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::Management(format!("{what}: {status} {body}")))
    }

    fn collections_url(&self, scope: &str) -> String {
        format!(
            "{}/pools/default/buckets/{}/scopes/{}/collections",
            self.endpoints.management, self.bucket, scope
        )
    }
}

#[async_trait::async_trait]
impl ClusterBackend for RestCluster {
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
        let statement = upsert_statement(keyspace, options);
        self.execute_kv(&statement, vec![key.into(), document.clone()], Some(options))
            .await?;
        Ok(())
    }

    async fn get(&self, keyspace: &Keyspace, key: &str) -> Result<Document> {
        let statement = format!("SELECT RAW d FROM {} AS d USE KEYS $1", keyspace.n1ql_path());
        let response = self.execute_kv(&statement, vec![key.into()], None).await?;
        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| Error::DocumentNotFound(format!("{keyspace}/{key}")))
    }

    async fn remove(&self, keyspace: &Keyspace, key: &str) -> Result<()> {
        let statement = format!("DELETE FROM {} USE KEYS $1", keyspace.n1ql_path());
        let response = self.execute_kv(&statement, vec![key.into()], None).await?;
        match response.metrics.and_then(|m| m.mutation_count) {
            Some(0) | None => Err(Error::DocumentNotFound(format!("{keyspace}/{key}"))),
            Some(_) => Ok(()),
        }
    }

    async fn query(&self, statement: &str, options: &QueryOptions) -> Result<Vec<Document>> {
        let mut body = Map::new();
        if !options.positional.is_empty() {
            body.insert("args".into(), Value::Array(options.positional.clone()));
        }
        for (name, value) in &options.named {
            let name = name.strip_prefix('$').unwrap_or(name);
            body.insert(format!("${name}"), value.clone());
        }
        if let Some(consistency) = options.scan_consistency {
            body.insert("scan_consistency".into(), consistency.as_str().into());
        }
        let timeout = options.timeout.unwrap_or(self.query_timeout);
        body.insert("timeout".into(), format_timeout(timeout).into());

        Ok(self.execute(statement, body).await?.results)
    }

    async fn view_query(&self, design_doc: &str, view: &str, query: &ViewQuery) -> Result<ViewResult> {
        let url = format!(
            "{}/{}/_design/{}/_view/{}",
            self.endpoints.views, self.bucket, design_doc, view
        );
        let response = self
            .authed(self.http.get(url))
            .query(&query.params())
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn upsert_user(&self, user: &User) -> Result<()> {
        let url = format!(
            "{}/settings/rbac/users/local/{}",
            self.endpoints.management, user.username
        );
        let roles = user
            .roles
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let mut form = vec![("roles", roles)];
        if let Some(password) = &user.password {
            form.push(("password", password.clone()));
        }
        if let Some(name) = &user.display_name {
            form.push(("name", name.clone()));
        }
        self.management(self.http.put(url).form(&form), "upsert user")
            .await?;
        info!("Upserted user {}", user.username);
        Ok(())
    }

    async fn get_roles(&self) -> Result<Vec<RoleAndDescription>> {
        let url = format!("{}/settings/rbac/roles", self.endpoints.management);
        let response = self.management(self.http.get(url), "list roles").await?;
        Ok(response.json().await?)
    }

    async fn create_collection(&self, spec: &CollectionSpec) -> Result<()> {
        let url = self.collections_url(&spec.scope_name);
        let form = [("name", spec.collection_name.as_str())];
        self.management(self.http.post(url).form(&form), "create collection")
            .await?;
        info!("Created collection {}:{}", spec.scope_name, spec.collection_name);
        Ok(())
    }

    async fn drop_collection(&self, spec: &CollectionSpec) -> Result<()> {
        let url = format!(
            "{}/{}",
            self.collections_url(&spec.scope_name),
            spec.collection_name
        );
        self.management(self.http.delete(url), "drop collection")
            .await?;
        info!("Dropped collection {}:{}", spec.scope_name, spec.collection_name);
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    errors: Vec<QueryErrorEntry>,
    #[serde(default)]
    status: String,
    #[serde(default)]
    metrics: Option<QueryMetrics>,
}

#[derive(Debug, Deserialize)]
struct QueryErrorEntry {
    #[serde(default)]
    code: u32,
    #[serde(default)]
    msg: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryMetrics {
    #[serde(default)]
    mutation_count: Option<u64>,
}

fn upsert_statement(keyspace: &Keyspace, options: &MutationOptions) -> String {
    let path = keyspace.n1ql_path();
    match options.expiry {
        Some(expiry) => format!(
            "UPSERT INTO {path} (KEY, VALUE, OPTIONS) VALUES ($1, $2, {})",
            json!({ "expiration": expiry.as_secs() })
        ),
        None => format!("UPSERT INTO {path} (KEY, VALUE) VALUES ($1, $2)"),
    }
}

fn format_timeout(timeout: Duration) -> String {
    format!("{}ms", timeout.as_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::connection::SslMode;

    #[test]
    fn test_upsert_statement() {
        let keyspace = Keyspace::resolve("bucket-1", "scope-1:collection-1").unwrap();

        assert_eq!(
            upsert_statement(&keyspace, &MutationOptions::default()),
            "UPSERT INTO `bucket-1`.`scope-1`.`collection-1` (KEY, VALUE) VALUES ($1, $2)"
        );
        assert_eq!(
            upsert_statement(&Keyspace::default_collection("bucket-1"), &MutationOptions::with_ttl(60)),
            "UPSERT INTO `bucket-1` (KEY, VALUE, OPTIONS) VALUES ($1, $2, {\"expiration\":60})"
        );
    }

    #[test]
    fn test_format_timeout() {
        assert_eq!(format_timeout(Duration::from_secs(600)), "600000ms");
    }

    #[test]
    fn test_query_response_parsing() {
        let body = r#"{
            "requestID": "5a3f",
            "results": [],
            "errors": [{"code": 12003, "msg": "Keyspace not found in CB datastore"}],
            "status": "fatal",
            "metrics": {"elapsedTime": "1.2ms", "mutationCount": 0}
        }"#;

        let response: QueryResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.errors[0].code, 12003);
        assert_eq!(response.metrics.unwrap().mutation_count, Some(0));
    }

    #[test]
    fn test_connect_derives_endpoints() {
        let mut options = ConnectionOptions::new("10.0.0.1", "Administrator", "password", "bucket-1");
        options.ssl_mode = SslMode::Data;

        let cluster = RestCluster::connect(&options).unwrap();

        assert_eq!(cluster.bucket(), "bucket-1");
        assert!(cluster.endpoints().secure);
        assert_eq!(cluster.endpoints().management, "https://10.0.0.1:18091");
    }
}
