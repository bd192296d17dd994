use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output;

use super::AppContext;

pub async fn run(context: &AppContext, format: OutputFormat) -> Result<(), CliError> {
    let outcome = context.pipelines.ingest().await?;
    output::render_report("bootstrap", &outcome, format)
}
