// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Harness service names (`kv`, `n1ql`, ...) and their operator counterparts.

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

/// (harness, operator)
const SERVICE_NAMES: [(&str, &str); 6] = [
    ("kv", "data"),
    ("n1ql", "query"),
    ("fts", "search"),
    ("cbas", "analytics"),
    ("index", "index"),
    ("eventing", "eventing"),
];

/// Unknown names are returned unchanged.
pub fn to_operator_service(service: &str) -> &str {
    SERVICE_NAMES
        .iter()
        .find(|(harness, _)| *harness == service)
        .map_or(service, |&(_, operator)| operator)
}

pub fn to_harness_service(service: &str) -> &str {
    SERVICE_NAMES
        .iter()
        .find(|(_, operator)| *operator == service)
        .map_or(service, |&(harness, _)| harness)
}

/// `"500GB"` becomes `500Gi`, `"256MB"` becomes `256Mi`.
pub fn volume_size_to_quantity(size: &str) -> Quantity {
    Quantity(size.replace("GB", "Gi").replace("MB", "Mi"))
}
