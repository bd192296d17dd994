mod bootstrap;
mod check;
mod debug;
mod search;
mod update;

use std::sync::Arc;

use fundsheet_core::{CafciAdapter, FundDataSource, FundPipelines, Settings, SettingsError};
use fundsheet_sheets::{
    FundSheetLayout, GoogleSheetsConfig, GoogleSheetsStore, MemorySheet, ServiceAccountKey,
    SheetStore, SheetsAuth,
};

use crate::cli::{Command, OutputFormat};
use crate::error::CliError;

/// Everything a command needs, built once per process.
pub struct AppContext {
    pub settings: Settings,
    pub source: Arc<dyn FundDataSource>,
    pub store: Arc<dyn SheetStore>,
    pub pipelines: FundPipelines,
    pub dry_run: bool,
}

impl AppContext {
    pub fn build(settings: Settings, dry_run: bool) -> Result<Self, CliError> {
        let source: Arc<dyn FundDataSource> =
            Arc::new(CafciAdapter::new(settings.cafci_config()));
        let store = open_store(&settings, dry_run)?;
        let pipelines = FundPipelines::new(Arc::clone(&source), Arc::clone(&store), &settings);

        Ok(Self {
            settings,
            source,
            store,
            pipelines,
            dry_run,
        })
    }
}

pub async fn run(
    command: &Command,
    context: &AppContext,
    format: OutputFormat,
) -> Result<(), CliError> {
    match command {
        Command::Bootstrap => bootstrap::run(context, format).await,
        Command::Update => update::run(context, format).await,
        Command::Search(args) => search::run(args, context, format).await,
        Command::Check => check::run(context, format).await,
        Command::Debug => debug::run(context, format).await,
    }
}

fn open_store(settings: &Settings, dry_run: bool) -> Result<Arc<dyn SheetStore>, CliError> {
    if dry_run {
        tracing::info!("dry run, using an in-memory sheet");
        let layout = FundSheetLayout::default();
        return Ok(Arc::new(
            MemorySheet::new().with_sheet(layout.sheet(), Vec::new()),
        ));
    }

    let spreadsheet_id = settings
        .sheets
        .spreadsheet_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| SettingsError::Invalid {
            key: "sheets.spreadsheet_id",
            reason: String::from("required unless --dry-run is given"),
        })?;

    let auth = match settings.sheets.access_token.as_deref() {
        Some(token) if !token.trim().is_empty() => SheetsAuth::AccessToken(token.to_string()),
        _ => {
            let path = &settings.sheets.credentials_path;
            tracing::debug!(path = %path.display(), "loading service account key");
            SheetsAuth::service_account(ServiceAccountKey::from_file(path)?)
        }
    };

    let store = GoogleSheetsStore::new(GoogleSheetsConfig::new(spreadsheet_id), auth)?;
    Ok(Arc::new(store))
}
