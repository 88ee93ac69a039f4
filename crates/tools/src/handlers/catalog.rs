//! Catalog theme: enterprise-only browsing (§4.7 "Catalog operations
//! require … fail Unsupported").

use async_trait::async_trait;
use dh_domain::ToolEnvelope;
use serde_json::{json, Map, Value};

use crate::args;
use crate::context::RequestContext;
use crate::dispatch::ToolHandler;
use crate::handlers::common::resolve_enterprise_session;

pub struct CatalogNamespacesList;

#[async_trait]
impl ToolHandler for CatalogNamespacesList {
    fn name(&self) -> &'static str {
        "catalog_namespaces_list"
    }

    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        let session_id = match args::str_req(&args, "session_id") {
            Ok(v) => v,
            Err(e) => return ToolEnvelope::err(e),
        };
        let session = match resolve_enterprise_session(ctx, session_id).await {
            Ok(s) => s,
            Err(e) => return ToolEnvelope::err(e),
        };
        match session.client().catalog_namespaces().await {
            Ok(namespaces) => {
                let mut payload = Map::new();
                payload.insert("namespaces".into(), json!(namespaces));
                ToolEnvelope::ok(payload)
            }
            Err(e) => ToolEnvelope::err(e),
        }
    }
}

pub struct CatalogTablesList;

#[async_trait]
impl ToolHandler for CatalogTablesList {
    fn name(&self) -> &'static str {
        "catalog_tables_list"
    }

    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        let session_id = match args::str_req(&args, "session_id") {
            Ok(v) => v,
            Err(e) => return ToolEnvelope::err(e),
        };
        let namespace = match args::str_req(&args, "namespace") {
            Ok(v) => v,
            Err(e) => return ToolEnvelope::err(e),
        };
        let session = match resolve_enterprise_session(ctx, session_id).await {
            Ok(s) => s,
            Err(e) => return ToolEnvelope::err(e),
        };
        match session.client().catalog_tables(namespace).await {
            Ok(tables) => {
                let mut payload = Map::new();
                payload.insert("tables".into(), json!(tables));
                ToolEnvelope::ok(payload)
            }
            Err(e) => ToolEnvelope::err(e),
        }
    }
}

pub struct CatalogTablesSchema;

#[async_trait]
impl ToolHandler for CatalogTablesSchema {
    fn name(&self) -> &'static str {
        "catalog_tables_schema"
    }

    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        let session_id = match args::str_req(&args, "session_id") {
            Ok(v) => v,
            Err(e) => return ToolEnvelope::err(e),
        };
        let namespace = match args::str_req(&args, "namespace") {
            Ok(v) => v,
            Err(e) => return ToolEnvelope::err(e),
        };
        let table_name = match args::str_req(&args, "table_name") {
            Ok(v) => v,
            Err(e) => return ToolEnvelope::err(e),
        };
        let session = match resolve_enterprise_session(ctx, session_id).await {
            Ok(s) => s,
            Err(e) => return ToolEnvelope::err(e),
        };
        match session.client().catalog_table_schema(namespace, table_name).await {
            Ok(columns) => {
                let mut payload = Map::new();
                payload.insert("columns".into(), json!(columns));
                ToolEnvelope::ok(payload)
            }
            Err(e) => ToolEnvelope::err(e),
        }
    }
}

pub struct CatalogTableSample;

#[async_trait]
impl ToolHandler for CatalogTableSample {
    fn name(&self) -> &'static str {
        "catalog_table_sample"
    }

    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        match sample(ctx, &args).await {
            Ok(payload) => ToolEnvelope::ok(payload),
            Err(e) => ToolEnvelope::err(e),
        }
    }
}

async fn sample(ctx: &RequestContext, args: &Value) -> dh_domain::Result<Map<String, Value>> {
    let session_id = args::str_req(args, "session_id")?;
    let namespace = args::str_req(args, "namespace")?;
    let table_name = args::str_req(args, "table_name")?;
    let max_rows = args::u64_opt(args, "max_rows")?.unwrap_or(100) as usize;
    let format = args::str_opt(args, "format").unwrap_or("auto");

    let session = resolve_enterprise_session(ctx, session_id).await?;
    dh_format::check_estimate(max_rows, 0)?;
    let table = session.client().catalog_table_sample(namespace, table_name, max_rows).await?;
    let rendered = dh_format::render(&table, format)?;

    let mut payload = Map::new();
    payload.insert("data".into(), Value::String(rendered.body));
    payload.insert("format".into(), Value::String(rendered.format_used.as_str().to_string()));
    payload.insert("row_count".into(), json!(rendered.row_count));
    payload.insert("is_complete".into(), Value::Bool(rendered.is_complete));
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn community_session_fails_unsupported() {
        let raw = r#"{"community": {"sessions": {"local": {"host": "h", "port": 1, "auth_type": "anonymous", "session_type": "python"}}}}"#;
        let ctx = crate::test_support::context_with_registry(raw).await;
        let envelope = CatalogNamespacesList
            .call(&ctx, json!({"session_id": "community:local:local"}))
            .await;
        match envelope {
            ToolEnvelope::Failure { kind, .. } => assert_eq!(kind, dh_domain::ErrorKind::Unsupported),
            _ => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn enterprise_session_browses_the_default_namespace() {
        let raw = r#"{"enterprise": {"systems": {"prod": {"connection_json_url": "https://ctrl.example", "auth_type": "password", "username": "u", "password": "p"}}}}"#;
        let ctx = crate::test_support::context_with_registry(raw).await;
        let created = crate::handlers::session_crud::SessionEnterpriseCreate
            .call(&ctx, json!({"system_name": "prod", "session_name": "w1"}))
            .await;
        assert!(created.is_success());

        let namespaces = CatalogNamespacesList
            .call(&ctx, json!({"session_id": "enterprise:prod:w1"}))
            .await
            .into_json();
        assert_eq!(namespaces["namespaces"], json!(["default"]));
    }
}
