use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output;

use super::AppContext;

pub async fn run(context: &AppContext, format: OutputFormat) -> Result<(), CliError> {
    let report = context.pipelines.update().await?;
    if report.degraded > 0 {
        tracing::info!(
            degraded = report.degraded,
            "some rows kept null metrics; run 'fundsheet check' to retry them"
        );
    }
    output::render_report("update", &report, format)
}
