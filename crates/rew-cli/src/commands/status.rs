//! Handler for `rew status`.

use serde::Serialize;

use rew_db::repos::audit::AuditFilter;
use rew_db::service::RewindService;

use crate::cli::OutputFormat;
use crate::output::output;

#[derive(Debug, Serialize)]
struct StatusResponse {
    pending_undo: u64,
    total_entries: u64,
    retention_max: u32,
}

pub async fn run(service: &RewindService, format: OutputFormat) -> anyhow::Result<()> {
    let pending_undo = service.pending_undo_count().await?;
    // limit 0: no rows, just the pre-pagination total.
    let (_, total_entries) = service
        .query_audit(&AuditFilter {
            limit: Some(0),
            ..Default::default()
        })
        .await?;

    output(
        &StatusResponse {
            pending_undo,
            total_entries,
            retention_max: service.max_entries(),
        },
        format,
    )
}
