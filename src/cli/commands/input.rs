//! Loading schemas and documents for the conversion commands

use crate::cli::args::ConvertArgs;
use crate::config::Config;
use crate::convert::Converters;
use crate::error::{ConvcacheError, ConvcacheResult};
use crate::types::{Schema, TypeExpr};
use serde_json::Value;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Load the schema, parse the requested type and set up converters
pub async fn load_converters(
    args: &ConvertArgs,
    config: &Config,
) -> ConvcacheResult<(Converters, TypeExpr)> {
    let schema = Schema::load(&args.schema).await?;
    let ty: TypeExpr = args.ty.parse()?;
    debug!(
        "Converting {} with {:?} isolation (memoize: {})",
        ty, config.cache.isolation, config.cache.memoize
    );
    Ok((Converters::with_settings(schema, &config.cache), ty))
}

/// Read a JSON document from `path`, or from stdin when no path is given
pub async fn read_json(path: Option<&Path>) -> ConvcacheResult<Value> {
    let content = match path {
        Some(path) => fs::read_to_string(path)
            .await
            .map_err(|e| ConvcacheError::io(format!("reading {}", path.display()), e))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .map_err(|e| ConvcacheError::io("reading stdin", e))?;
            buf
        }
    };

    Ok(serde_json::from_str(&content)?)
}
