//! Handlers for the logged record mutations: add, edit, rm, bulk-edit.

use rew_core::enums::EntityType;
use rew_core::snapshot::ValueSnapshot;
use rew_db::service::RewindService;

use crate::cli::OutputFormat;
use crate::cli::root_commands::{AddArgs, BulkEditArgs, EditArgs, RmArgs};
use crate::commands::shared::{parse_enum, parse_fields};
use crate::output::output;

pub async fn add(
    args: &AddArgs,
    service: &RewindService,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let kind: EntityType = parse_enum(&args.kind, "entity type")?;
    let values = parse_fields(&args.fields)?;
    let summary = args
        .summary
        .clone()
        .unwrap_or_else(|| format!("Added {kind} record"));

    let entry = service.create_record(kind, &values, &summary).await?;
    output(&entry, format)
}

pub async fn edit(
    args: &EditArgs,
    service: &RewindService,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let kind: EntityType = parse_enum(&args.kind, "entity type")?;
    let changes = parse_fields(&args.fields)?;
    let summary = args
        .summary
        .clone()
        .unwrap_or_else(|| format!("Edited {kind} {}", args.id));

    match service
        .update_record(kind, args.id, &changes, &summary)
        .await?
    {
        Some(entry) => output(&entry, format),
        None => {
            println!("No fields changed; nothing logged.");
            Ok(())
        }
    }
}

pub async fn rm(
    args: &RmArgs,
    service: &RewindService,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let kind: EntityType = parse_enum(&args.kind, "entity type")?;
    let summary = args
        .summary
        .clone()
        .unwrap_or_else(|| format!("Removed {kind} {}", args.id));

    let entry = service.delete_record(kind, args.id, &summary).await?;
    output(&entry, format)
}

pub async fn bulk_edit(
    args: &BulkEditArgs,
    service: &RewindService,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let kind: EntityType = parse_enum(&args.kind, "entity type")?;
    let values = parse_fields(&args.fields)?;
    let summary = args.summary.clone().unwrap_or_else(|| {
        format!("Bulk edit of {} {kind} records", args.ids.len())
    });

    let changes: Vec<(i64, ValueSnapshot)> = args
        .ids
        .iter()
        .map(|id| (*id, values.clone()))
        .collect();
    let entries = service.bulk_update(kind, &changes, &summary).await?;
    output(&entries, format)
}
