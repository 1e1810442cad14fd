use crate::commands::common::{open_insights, CommandContext};
use crate::error::CliError;

pub async fn run_polish(ctx: &CommandContext, text_parts: &[String]) -> Result<(), CliError> {
    let insights = open_insights(ctx)?;
    let polished = insights.polish_note(&text_parts.join(" ")).await?;
    println!("{polished}");
    Ok(())
}
