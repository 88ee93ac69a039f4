//! Tables theme: schema/listing plus guarded data fetch (§4.7, §4.9).

use async_trait::async_trait;
use dh_domain::ToolEnvelope;
use serde_json::{json, Map, Value};

use crate::args;
use crate::context::RequestContext;
use crate::dispatch::ToolHandler;
use crate::handlers::common::resolve_session;

pub struct SessionTablesList;

#[async_trait]
impl ToolHandler for SessionTablesList {
    fn name(&self) -> &'static str {
        "session_tables_list"
    }

    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        let session_id = match args::str_req(&args, "session_id") {
            Ok(v) => v,
            Err(e) => return ToolEnvelope::err(e),
        };
        let session = match resolve_session(ctx, session_id).await {
            Ok(s) => s,
            Err(e) => return ToolEnvelope::err(e),
        };
        match session.client().list_tables().await {
            Ok(tables) => {
                let mut payload = Map::new();
                payload.insert("tables".into(), json!(tables));
                ToolEnvelope::ok(payload)
            }
            Err(e) => ToolEnvelope::err(e),
        }
    }
}

pub struct SessionTablesSchema;

#[async_trait]
impl ToolHandler for SessionTablesSchema {
    fn name(&self) -> &'static str {
        "session_tables_schema"
    }

    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        let session_id = match args::str_req(&args, "session_id") {
            Ok(v) => v,
            Err(e) => return ToolEnvelope::err(e),
        };
        let table_name = match args::str_req(&args, "table_name") {
            Ok(v) => v,
            Err(e) => return ToolEnvelope::err(e),
        };
        let session = match resolve_session(ctx, session_id).await {
            Ok(s) => s,
            Err(e) => return ToolEnvelope::err(e),
        };
        match session.client().table_schema(table_name).await {
            Ok(columns) => {
                let mut payload = Map::new();
                payload.insert("columns".into(), json!(columns));
                ToolEnvelope::ok(payload)
            }
            Err(e) => ToolEnvelope::err(e),
        }
    }
}

pub struct SessionTableData;

#[async_trait]
impl ToolHandler for SessionTableData {
    fn name(&self) -> &'static str {
        "session_table_data"
    }

    async fn call(&self, ctx: &RequestContext, args: Value) -> ToolEnvelope {
        match fetch(ctx, &args).await {
            Ok(payload) => ToolEnvelope::ok(payload),
            Err(e) => ToolEnvelope::err(e),
        }
    }
}

async fn fetch(ctx: &RequestContext, args: &Value) -> dh_domain::Result<Map<String, Value>> {
    let session_id = args::str_req(args, "session_id")?;
    let table_name = args::str_req(args, "table_name")?;
    let max_rows = args::u64_opt(args, "max_rows")?.map(|n| n as usize);
    let format = args::str_opt(args, "format").unwrap_or("auto");

    let session = resolve_session(ctx, session_id).await?;
    let client = session.client();

    let col_count = client.table_schema(table_name).await?.len();
    let declared_rows = client.table_row_count_estimate(table_name).await?;
    let effective_rows = match max_rows {
        Some(requested) => requested.min(declared_rows),
        None => declared_rows,
    };
    dh_format::check_estimate(effective_rows, col_count)?;

    let table = client.table_data(table_name, max_rows).await?;
    let rendered = dh_format::render(&table, format)?;

    let mut payload = Map::new();
    payload.insert("data".into(), Value::String(rendered.body));
    payload.insert("format".into(), Value::String(rendered.format_used.as_str().to_string()));
    payload.insert("row_count".into(), json!(rendered.row_count));
    payload.insert("is_complete".into(), Value::Bool(rendered.is_complete));
    Ok(payload)
}
