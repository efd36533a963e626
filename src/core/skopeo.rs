//! skopeo invocation: argument building, execution, retry, classification
//!
//! Execution goes through the `CommandRunner` trait so retry and
//! error-classification logic is testable without spawning processes.
//! The production runner shells out with `std::process::Command`.

use crate::core::config::ResolvedConfig;
use crate::core::error::{ReleaseError, ReleaseResult, SkopeoError};
use crate::ui::Logger;
use std::io;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

/// Fixed delay between push attempts
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Inspect stderr marker for an absent image
const MANIFEST_UNKNOWN: &str = "manifest unknown";

/// Known registry-specific tag-immutability error substrings.
/// Google Artifact Registry and AWS ECR word these differently.
const IMMUTABLE_TAG_ERRORS: &[&str] = &[
  "The repository has enabled tag immutability",
  "cannot be overwritten because the repository is immutable",
];

/// Captured result of one child process invocation
#[derive(Debug, Clone)]
pub struct CommandOutput {
  pub success: bool,
  pub stdout: String,
  pub stderr: String,
}

/// Minimal command execution seam: binary path + argument vector in,
/// exit status and captured output out. Spawn failures surface as
/// `io::Error` so callers can distinguish a missing binary from a
/// failing one.
pub trait CommandRunner {
  fn run(&self, binary: &Path, args: &[String]) -> io::Result<CommandOutput>;
}

/// Production runner using the system process spawner
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
  fn run(&self, binary: &Path, args: &[String]) -> io::Result<CommandOutput> {
    let output = Command::new(binary).args(args).output()?;

    Ok(CommandOutput {
      success: output.status.success(),
      stdout: String::from_utf8_lossy(&output.stdout).to_string(),
      stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
  }
}

/// True when a push failure is a known immutable-tag rejection
pub fn is_immutable_tag_error(stderr: &str) -> bool {
  IMMUTABLE_TAG_ERRORS.iter().any(|candidate| stderr.contains(candidate))
}

/// Probe that the binary is present and runnable (`skopeo -v`).
///
/// Runs before full config resolution so a missing binary is reported
/// ahead of any other configuration problem.
pub fn check_installed(binary: &Path, runner: &dyn CommandRunner) -> ReleaseResult<()> {
  match runner.run(binary, &["-v".to_string()]) {
    Ok(output) if output.success => Ok(()),
    _ => Err(
      SkopeoError::NotInstalled {
        binary: binary.to_path_buf(),
      }
      .into(),
    ),
  }
}

/// skopeo invoker bound to a resolved configuration
pub struct Skopeo<'a> {
  config: &'a ResolvedConfig,
  runner: &'a dyn CommandRunner,
  logger: &'a Logger,
  retry_delay: Duration,
}

impl<'a> Skopeo<'a> {
  pub fn new(config: &'a ResolvedConfig, runner: &'a dyn CommandRunner, logger: &'a Logger) -> Self {
    Self {
      config,
      runner,
      logger,
      retry_delay: RETRY_DELAY,
    }
  }

  /// Override the inter-attempt delay (tests)
  #[cfg(test)]
  pub fn with_retry_delay(mut self, delay: Duration) -> Self {
    self.retry_delay = delay;
    self
  }

  /// Argument vector for `skopeo copy`
  pub fn copy_args(&self, source: &str, destination: &str) -> Vec<String> {
    let mut args = vec!["copy".to_string()];
    args.extend(self.config.copy_args.iter().cloned());
    args.push(format!("--retry-times={}", self.config.retry));
    args.push(source.to_string());
    args.push(destination.to_string());
    args
  }

  /// Argument vector for `skopeo inspect`
  pub fn inspect_args(&self, reference: &str) -> Vec<String> {
    let mut args = vec!["inspect".to_string()];
    args.extend(self.config.inspect_args.iter().cloned());
    args.push(format!("--retry-times={}", self.config.retry));
    args.push(reference.to_string());
    args
  }

  /// Check whether an image exists at `reference` via `inspect`.
  ///
  /// Exit 0 means it exists; a failure whose stderr reports an unknown
  /// manifest means it does not (not an error); anything else is a
  /// check failure carrying the process stderr.
  pub fn image_exists(&self, reference: &str) -> ReleaseResult<bool> {
    let output = self.run(&self.inspect_args(reference))?;

    if output.success {
      return Ok(true);
    }
    if output.stderr.contains(MANIFEST_UNKNOWN) {
      return Ok(false);
    }

    Err(
      SkopeoError::CheckFailed {
        reference: reference.to_string(),
        stderr: output.stderr,
      }
      .into(),
    )
  }

  /// Copy the source image to one destination, retrying up to
  /// `retry` additional times with a fixed delay. The last failure is
  /// surfaced after exhausting attempts.
  pub fn copy(&self, source: &str, destination: &str) -> ReleaseResult<()> {
    let args = self.copy_args(source, destination);
    let attempts = self.config.retry + 1;

    let mut last_stderr = String::new();
    for attempt in 1..=attempts {
      self.logger.info(format!("Copy attempt {}/{} for {}", attempt, attempts, destination));

      let output = self.run(&args)?;
      if output.success {
        return Ok(());
      }

      last_stderr = output.stderr;
      if attempt < attempts {
        self.logger.info(format!(
          "Push failed, retrying in {}s: {}",
          self.retry_delay.as_secs(),
          last_stderr.trim()
        ));
        std::thread::sleep(self.retry_delay);
      }
    }

    Err(
      SkopeoError::CopyFailed {
        destination: destination.to_string(),
        stderr: last_stderr,
      }
      .into(),
    )
  }

  fn run(&self, args: &[String]) -> ReleaseResult<CommandOutput> {
    self.runner.run(&self.config.binary_path, args).map_err(|err| {
      if err.kind() == io::ErrorKind::NotFound {
        SkopeoError::NotInstalled {
          binary: self.config.binary_path.clone(),
        }
        .into()
      } else {
        ReleaseError::Io(err)
      }
    })
  }
}
