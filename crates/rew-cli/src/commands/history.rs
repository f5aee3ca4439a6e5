//! Handler for `rew history`.

use rew_config::RewindConfig;
use rew_core::responses::HistoryPage;
use rew_db::service::RewindService;

use crate::cli::OutputFormat;
use crate::cli::root_commands::HistoryArgs;
use crate::commands::shared::filter_from_args;
use crate::output::{output, table};

pub async fn run(
    args: &HistoryArgs,
    service: &RewindService,
    config: &RewindConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let limit = args.limit.unwrap_or(config.general.default_limit);
    let offset = args.offset.unwrap_or(0);

    let mut filter = filter_from_args(&args.filter)?;
    filter.limit = Some(limit);
    filter.offset = Some(offset);

    let (entries, total) = service.query_audit(&filter).await?;
    let page = HistoryPage {
        entries,
        total,
        limit,
        offset,
    };

    match format {
        OutputFormat::Json => output(&page, format),
        OutputFormat::Table => {
            let headers = [
                "id", "timestamp", "action", "kind", "record", "summary", "undone",
            ];
            let rows: Vec<Vec<String>> = page
                .entries
                .iter()
                .map(|e| {
                    vec![
                        e.id.to_string(),
                        e.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                        e.action.to_string(),
                        e.entity_type.to_string(),
                        e.entity_id.to_string(),
                        e.summary.clone(),
                        (if e.undone { "undone" } else { "-" }).to_string(),
                    ]
                })
                .collect();
            println!("{}", table::render(&headers, &rows));
            println!(
                "{} of {} entries (offset {})",
                page.entries.len(),
                page.total,
                page.offset
            );
            Ok(())
        }
    }
}
