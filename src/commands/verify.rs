//! Verify-conditions step
//!
//! Linear pre-flight checks, short-circuiting on the first failure:
//! binary present, configuration resolvable, source set/valid/existing,
//! destinations set/valid and (when fully resolved) writable.

use crate::commands::load_plugin_config;
use crate::core::config::{self, RawConfig};
use crate::core::env::{Env, SystemEnv};
use crate::core::error::{ReleaseResult, SkopeoError, ValidationError};
use crate::core::reference::{find_project_root, parse_reference};
use crate::core::skopeo::{self, CommandRunner, Skopeo, SystemRunner};
use crate::ui::Logger;
use std::path::Path;

/// Run the verify step against the real environment and process spawner
pub fn run_verify(config_path: Option<&Path>, plugin_config: Option<&str>) -> ReleaseResult<()> {
  let cwd = std::env::current_dir()?;
  let raw = load_plugin_config(config_path, plugin_config, &cwd)?;
  let project_root = find_project_root(&cwd);
  let logger = Logger::new();

  verify_conditions(&raw, &SystemEnv, &SystemRunner, &logger, &project_root)
}

/// The verify-conditions workflow, with all collaborators injected
pub(crate) fn verify_conditions(
  raw: &RawConfig,
  env: &dyn Env,
  runner: &dyn CommandRunner,
  logger: &Logger,
  project_root: &Path,
) -> ReleaseResult<()> {
  let binary = config::resolve_binary_path(raw, env);
  skopeo::check_installed(&binary, runner)?;
  logger.info("skopeo is installed and accessible.");

  let resolved = config::resolve(raw, env)?;
  logger.info("Configuration parsed.");

  let source = resolved.require_source()?;
  let parsed = parse_reference(source, project_root);
  if !parsed.is_valid() {
    return Err(
      ValidationError::InvalidSource {
        reference: source.to_string(),
        errors: parsed.errors,
      }
      .into(),
    );
  }
  logger.info("Source reference is valid.");

  let invoker = Skopeo::new(&resolved, runner, logger);
  if !invoker.image_exists(source)? {
    return Err(
      ValidationError::SourceNotFound {
        reference: source.to_string(),
      }
      .into(),
    );
  }
  logger.info("Source image exists.");

  let destinations = resolved.require_destination()?;
  for destination in destinations {
    let parsed = parse_reference(destination, project_root);
    if !parsed.is_valid() {
      return Err(
        ValidationError::InvalidDestination {
          reference: destination.clone(),
          errors: parsed.errors,
        }
        .into(),
      );
    }

    // Writability is only checkable once all template variables are gone
    if !parsed.has_variables && invoker.image_exists(destination)? && !resolved.force {
      return Err(
        SkopeoError::ImageExists {
          reference: destination.clone(),
        }
        .into(),
      );
    }
  }
  logger.info("Destinations are valid.");

  logger.log("semantic-release-skopeo configuration verified.");
  Ok(())
}
