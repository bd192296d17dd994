use crate::cli::{OutputFormat, SearchArgs};
use crate::error::CliError;
use crate::output;

use super::AppContext;

pub async fn run(
    args: &SearchArgs,
    context: &AppContext,
    format: OutputFormat,
) -> Result<(), CliError> {
    let matches = context.pipelines.search_by_name(&args.query).await?;
    output::render_search(args.query.trim(), &matches, format)
}
