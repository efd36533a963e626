//! Release lifecycle steps exposed as CLI subcommands

mod publish;
mod verify;

pub use publish::run_publish;
pub use verify::run_verify;

use crate::core::config::RawConfig;
use crate::core::error::ReleaseResult;
use std::path::Path;

/// Assemble the raw plugin config: file layer (explicit path or searched
/// under `dir`) with the inline JSON layer merged on top.
pub(crate) fn load_plugin_config(
  config_path: Option<&Path>,
  plugin_config: Option<&str>,
  dir: &Path,
) -> ReleaseResult<RawConfig> {
  let file = RawConfig::load(config_path, dir)?;
  match plugin_config {
    Some(json) => Ok(file.merged_with(RawConfig::from_json(json)?)),
    None => Ok(file),
  }
}
