// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::client::{CERT_PATH, KV_TIMEOUT_SECS, QUERY_TIMEOUT_SECS};
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// TLS mode of the cluster under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslMode {
    #[default]
    None,
    /// Client to node traffic encrypted
    Data,
    /// Node to node traffic encrypted as well
    N2n,
}

impl SslMode {
    pub fn is_secure(self) -> bool {
        matches!(self, SslMode::Data | SslMode::N2n)
    }
}

impl FromStr for SslMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "" | "none" => Ok(SslMode::None),
            "data" => Ok(SslMode::Data),
            "n2n" => Ok(SslMode::N2n),
            _ => Err(Error::InvalidConnectionString(format!(
                "unknown ssl mode {s}, expected none, data or n2n"
            ))),
        }
    }
}

impl fmt::Display for SslMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SslMode::None => write!(f, "none"),
            SslMode::Data => write!(f, "data"),
            SslMode::N2n => write!(f, "n2n"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    pub host: String,
    pub username: String,
    pub password: String,
    pub bucket: String,
    pub ssl_mode: SslMode,
    /// Extra query parameters of the connection string; `enable_tracing` is consumed by the client
    pub connstr_params: BTreeMap<String, String>,
    pub kv_timeout: Duration,
    pub query_timeout: Duration,
}

impl ConnectionOptions {
    pub fn new(host: &str, username: &str, password: &str, bucket: &str) -> Self {
        Self {
            host: host.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            bucket: bucket.to_string(),
            ssl_mode: SslMode::None,
            connstr_params: BTreeMap::new(),
            kv_timeout: Duration::from_secs(KV_TIMEOUT_SECS),
            query_timeout: Duration::from_secs(QUERY_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub value: String,
    pub enable_tracing: bool,
}

impl fmt::Display for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// `couchbase[s]://<host>[?<params>]`, with `certpath` appended when TLS is on.
pub fn connection_string(options: &ConnectionOptions) -> ConnectionString {
    let mut params = options.connstr_params.clone();
    let enable_tracing = params
        .remove("enable_tracing")
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));

    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.extend_pairs(&params);
    let secure = options.ssl_mode.is_secure();
    if secure {
        query.append_pair("certpath", CERT_PATH);
    }
    let query = query.finish();

    let scheme = if secure { "couchbases" } else { "couchbase" };
    let value = if query.is_empty() {
        format!("{scheme}://{}", options.host)
    } else {
        format!("{scheme}://{}?{query}", options.host)
    };
    ConnectionString {
        value,
        enable_tracing,
    }
}

/// HTTP service endpoints derived from a connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub secure: bool,
    pub management: String,
    pub query: String,
    pub views: String,
    pub certpath: Option<PathBuf>,
}

impl Endpoints {
    pub fn from_connection_string(connstr: &str) -> Result<Self> {
        let url = Url::parse(connstr)
            .map_err(|e| Error::InvalidConnectionString(format!("{connstr}: {e}")))?;
        let secure = match url.scheme() {
            "couchbase" => false,
            "couchbases" => true,
            other => {
                return Err(Error::InvalidConnectionString(format!(
                    "unsupported scheme {other} in {connstr}"
                )))
            }
        };
        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::InvalidConnectionString(format!("no host in {connstr}")))?;
        let certpath = url
            .query_pairs()
            .find(|(k, _)| k == "certpath")
            .map(|(_, v)| PathBuf::from(v.as_ref()));

        let (http, ports) = if secure {
            ("https", [18091, 18093, 18092])
        } else {
            ("http", [8091, 8093, 8092])
        };
        let [management, query, views] = ports.map(|port| format!("{http}://{host}:{port}"));

        Ok(Self {
            secure,
            management,
            query,
            views,
            certpath,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_options(ssl_mode: SslMode, params: &[(&str, &str)]) -> ConnectionOptions {
        let mut options = ConnectionOptions::new("10.0.0.1", "Administrator", "password", "bucket-1");
        options.ssl_mode = ssl_mode;
        options.connstr_params = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        options
    }

    #[test]
    fn test_plain_connection_string() {
        let connstr = connection_string(&make_options(SslMode::None, &[]));

        assert_eq!(connstr.value, "couchbase://10.0.0.1");
        assert!(!connstr.enable_tracing);
    }

    #[test]
    fn test_params_are_encoded() {
        let connstr = connection_string(&make_options(
            SslMode::None,
            &[("ipv6", "allow"), ("network", "external")],
        ));

        assert_eq!(connstr.value, "couchbase://10.0.0.1?ipv6=allow&network=external");
    }

    #[test]
    fn test_secure_modes_append_certpath() {
        for mode in [SslMode::Data, SslMode::N2n] {
            let connstr = connection_string(&make_options(mode, &[]));
            assert_eq!(connstr.value, "couchbases://10.0.0.1?certpath=root.pem");
        }

        let connstr = connection_string(&make_options(SslMode::N2n, &[("ipv6", "allow")]));
        assert_eq!(connstr.value, "couchbases://10.0.0.1?ipv6=allow&certpath=root.pem");
    }

    #[test]
    fn test_enable_tracing_is_consumed() {
        let connstr = connection_string(&make_options(
            SslMode::None,
            &[("enable_tracing", "True"), ("ipv6", "allow")],
        ));

        assert!(connstr.enable_tracing);
        assert_eq!(connstr.value, "couchbase://10.0.0.1?ipv6=allow");
    }

    #[test]
    fn test_ssl_mode_from_str() {
        assert_eq!("n2n".parse::<SslMode>().unwrap(), SslMode::N2n);
        assert_eq!("none".parse::<SslMode>().unwrap(), SslMode::None);
        assert!("tls".parse::<SslMode>().is_err());
    }

    #[test]
    fn test_endpoints() {
        let plain = Endpoints::from_connection_string("couchbase://10.0.0.1?ipv6=allow").unwrap();
        assert_eq!(plain.management, "http://10.0.0.1:8091");
        assert_eq!(plain.query, "http://10.0.0.1:8093");
        assert_eq!(plain.views, "http://10.0.0.1:8092");
        assert_eq!(plain.certpath, None);

        let secure = Endpoints::from_connection_string("couchbases://10.0.0.1?certpath=root.pem").unwrap();
        assert!(secure.secure);
        assert_eq!(secure.query, "https://10.0.0.1:18093");
        assert_eq!(secure.certpath, Some(PathBuf::from("root.pem")));
    }

    #[test]
    fn test_endpoints_reject_other_schemes() {
        let result = Endpoints::from_connection_string("http://10.0.0.1");

        assert!(matches!(result, Err(Error::InvalidConnectionString(_))));
    }
}
