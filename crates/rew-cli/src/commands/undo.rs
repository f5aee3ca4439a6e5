//! Handler for `rew undo`.

use rew_db::service::RewindService;

use crate::cli::OutputFormat;
use crate::cli::root_commands::UndoArgs;
use crate::output::output;

pub async fn run(
    args: &UndoArgs,
    service: &RewindService,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let report = match args.id {
        Some(entry_id) => service.undo_by_id(entry_id).await?,
        None => service.undo_last().await?,
    };

    match format {
        OutputFormat::Json => output(&report, format),
        OutputFormat::Table => {
            println!(
                "Undid {} entr{} ({} record{} affected).",
                report.entries_undone,
                if report.entries_undone == 1 { "y" } else { "ies" },
                report.records_affected,
                if report.records_affected == 1 { "" } else { "s" },
            );
            for line in &report.details {
                println!("  {}", line.summary);
            }
            for warning in &report.skipped {
                println!("  warning: {warning}");
            }
            Ok(())
        }
    }
}
