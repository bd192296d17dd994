use serde::Serialize;

use fundsheet_core::Settings;
use fundsheet_sheets::FundSheetLayout;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output;

use super::AppContext;

#[derive(Debug, Serialize)]
struct DebugReport<'a> {
    settings: &'a Settings,
    dry_run: bool,
    api_reachable: bool,
    sheet: &'a str,
    header: Option<Vec<String>>,
    header_matches_layout: bool,
    sheet_error: Option<String>,
}

/// Prints the effective settings, checks the API and reads the header row.
///
/// Check failures are reported, not raised.
pub async fn run(context: &AppContext, format: OutputFormat) -> Result<(), CliError> {
    let layout = context.pipelines.layout();
    let api_reachable = context.source.check_connection().await;
    tracing::info!(api_reachable, "api check done");

    let (header, sheet_error) = match context
        .store
        .read(layout.sheet(), &layout.header_range())
        .await
    {
        Ok(rows) => (rows.into_iter().next(), None),
        Err(error) => {
            tracing::warn!(sheet = layout.sheet(), %error, "sheet read failed");
            (None, Some(error.to_string()))
        }
    };
    let header_matches_layout = header
        .as_ref()
        .is_some_and(|row| *row == FundSheetLayout::header_row());

    let report = DebugReport {
        settings: &context.settings,
        dry_run: context.dry_run,
        api_reachable,
        sheet: layout.sheet(),
        header,
        header_matches_layout,
        sheet_error,
    };
    output::render_report("debug", &report, format)
}
