use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::output;

use super::AppContext;

pub async fn run(context: &AppContext, format: OutputFormat) -> Result<(), CliError> {
    let report = context.pipelines.check_integrity().await?;
    output::render_report("check", &report, format)
}
