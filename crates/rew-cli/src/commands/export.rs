//! Handler for `rew export`.

use anyhow::Context;
use rew_db::service::RewindService;

use crate::cli::root_commands::ExportArgs;
use crate::commands::shared::filter_from_args;

pub async fn run(args: &ExportArgs, service: &RewindService) -> anyhow::Result<()> {
    let filter = filter_from_args(&args.filter)?;
    let csv = service.export_audit(&filter).await?;

    match &args.out {
        Some(path) => {
            std::fs::write(path, &csv)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            let rows = csv.lines().count().saturating_sub(1);
            println!("Wrote {rows} entries to {}", path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}
