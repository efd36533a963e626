//! Publish step
//!
//! Resolves configuration, substitutes the release version into every
//! destination, then copies the source image to each destination strictly
//! in order. A failing destination aborts the remaining ones unless it is
//! a known immutable-tag rejection and suppression is enabled. Nothing is
//! rolled back: partial publication surfaces as the failing destination's
//! error.

use crate::commands::load_plugin_config;
use crate::core::config::{self, RawConfig};
use crate::core::env::{Env, SystemEnv};
use crate::core::error::{ReleaseError, ReleaseResult, ResultExt, SkopeoError};
use crate::core::skopeo::{CommandRunner, Skopeo, SystemRunner, is_immutable_tag_error};
use crate::ui::Logger;
use std::path::Path;

/// Run the publish step against the real environment and process spawner
pub fn run_publish(config_path: Option<&Path>, plugin_config: Option<&str>, next_version: &str) -> ReleaseResult<()> {
  let version = semver::Version::parse(next_version)
    .with_context(|| format!("Invalid --next-version '{}'", next_version))?;

  let cwd = std::env::current_dir()?;
  let raw = load_plugin_config(config_path, plugin_config, &cwd)?;
  let logger = Logger::new();

  publish(&raw, &SystemEnv, &SystemRunner, &logger, &version.to_string())
}

/// The publish workflow, with all collaborators injected
pub(crate) fn publish(
  raw: &RawConfig,
  env: &dyn Env,
  runner: &dyn CommandRunner,
  logger: &Logger,
  version: &str,
) -> ReleaseResult<()> {
  let resolved = config::resolve(raw, env)?;
  let source = resolved.require_source()?;
  let destinations: Vec<String> = resolved
    .require_destination()?
    .iter()
    .map(|d| config::substitute_release_version(d, version))
    .collect();

  logger.log(format!(
    "Pushing image with the following destinations: {}",
    destinations.join(", ")
  ));

  let invoker = Skopeo::new(&resolved, runner, logger);
  for destination in &destinations {
    match invoker.copy(source, destination) {
      Ok(()) => logger.log(format!("Successfully pushed image: {}", destination)),
      Err(err) => {
        if resolved.push_ignore_immutable_tag_errors && is_ignorable_push_error(&err) {
          logger.info(format!("Immutable tag error ignored for {}", destination));
          continue;
        }
        logger.error(format!("Failed to push image: {}", destination));
        return Err(err);
      }
    }
  }

  logger.log("Image publishing complete.");
  Ok(())
}

/// A push failure is locally recoverable only when it is a known
/// immutable-tag rejection
fn is_ignorable_push_error(err: &ReleaseError) -> bool {
  match err {
    ReleaseError::Skopeo(SkopeoError::CopyFailed { stderr, .. }) => is_immutable_tag_error(stderr),
    _ => false,
  }
}
