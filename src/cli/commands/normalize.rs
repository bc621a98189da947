//! Normalize command - decode and re-encode a document

use super::input;
use crate::cli::args::ConvertArgs;
use crate::config::Config;
use crate::error::ConvcacheResult;

/// Execute the normalize command
///
/// Writes the canonical encoding to stdout: defaults filled in then dropped,
/// record tags added, positional records expanded to objects.
pub async fn execute(args: ConvertArgs, config: &Config) -> ConvcacheResult<()> {
    let (converters, ty) = input::load_converters(&args, config).await?;
    let value = input::read_json(args.input.as_deref()).await?;

    let normalized = converters.normalize(&ty, &value)?;
    println!("{}", serde_json::to_string_pretty(&normalized)?);
    Ok(())
}
