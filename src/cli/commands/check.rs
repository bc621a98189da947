//! Check command - validate a document against a type

use super::input;
use crate::cli::args::ConvertArgs;
use crate::config::Config;
use crate::error::{ConvcacheError, ConvcacheResult};
use crate::ui::{self, UiContext};

/// Execute the check command
pub async fn execute(args: ConvertArgs, config: &Config) -> ConvcacheResult<()> {
    let ctx = UiContext::detect();
    let (converters, ty) = input::load_converters(&args, config).await?;
    let value = input::read_json(args.input.as_deref()).await?;

    if converters.check(&ty, &value)? {
        ui::step_ok(&ctx, &format!("Document conforms to {}", ty));
        return Ok(());
    }

    // The decoder knows where things went wrong; it ignores tags, so it may succeed
    let reason = match converters.decode(&ty, &value) {
        Err(e) => e.to_string(),
        Ok(_) => "record tag or shape does not match".to_string(),
    };
    Err(ConvcacheError::User(format!(
        "Document does not conform to {}: {}",
        ty, reason
    )))
}
