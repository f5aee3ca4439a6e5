//! Command handlers for `rew`.

pub mod export;
pub mod history;
pub mod record;
pub mod shared;
pub mod status;
pub mod undo;

use rew_config::RewindConfig;
use rew_db::service::RewindService;

use crate::cli::{Cli, Commands};

pub async fn dispatch(
    cli: Cli,
    service: &RewindService,
    config: &RewindConfig,
) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Commands::Add(args) => record::add(&args, service, format).await,
        Commands::Edit(args) => record::edit(&args, service, format).await,
        Commands::Rm(args) => record::rm(&args, service, format).await,
        Commands::BulkEdit(args) => record::bulk_edit(&args, service, format).await,
        Commands::Undo(args) => undo::run(&args, service, format).await,
        Commands::History(args) => history::run(&args, service, config, format).await,
        Commands::Export(args) => export::run(&args, service).await,
        Commands::Status => status::run(service, format).await,
    }
}
