//! Error types for semantic-release-skopeo with stable machine-readable codes
//!
//! Every fatal error carries a code (e.g. `EIMAGEEXISTS`) that callers and CI
//! pipelines can match on, plus a human-readable message and, where useful, a
//! contextual help suggestion.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing options)
  User = 1,
  /// System error (skopeo invocation, I/O)
  System = 2,
  /// Validation failure (bad references, write conflicts)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for semantic-release-skopeo
#[derive(Debug)]
pub enum ReleaseError {
  /// Configuration errors (bad option values, missing required options)
  Config(ConfigError),

  /// Reference validation errors
  Validation(ValidationError),

  /// skopeo invocation errors
  Skopeo(SkopeoError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      _ => self,
    }
  }

  /// Stable machine-readable code for this error
  pub fn code(&self) -> &'static str {
    match self {
      ReleaseError::Config(e) => e.code(),
      ReleaseError::Validation(e) => e.code(),
      ReleaseError::Skopeo(e) => e.code(),
      ReleaseError::Io(_) => "EIO",
      ReleaseError::Message { .. } => "EFAILED",
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::Config(_) => ExitCode::User,
      ReleaseError::Validation(_) => ExitCode::Validation,
      ReleaseError::Skopeo(SkopeoError::ImageExists { .. }) => ExitCode::Validation,
      ReleaseError::Skopeo(_) => ExitCode::System,
      ReleaseError::Io(_) => ExitCode::System,
      ReleaseError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Validation(e) => e.help_message(),
      ReleaseError::Skopeo(e) => e.help_message(),
      ReleaseError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Validation(e) => write!(f, "{}", e),
      ReleaseError::Skopeo(e) => write!(f, "{}", e),
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<ConfigError> for ReleaseError {
  fn from(err: ConfigError) -> Self {
    ReleaseError::Config(err)
  }
}

impl From<ValidationError> for ReleaseError {
  fn from(err: ValidationError) -> Self {
    ReleaseError::Validation(err)
  }
}

impl From<SkopeoError> for ReleaseError {
  fn from(err: SkopeoError) -> Self {
    ReleaseError::Skopeo(err)
  }
}

impl From<toml_edit::TomlError> for ReleaseError {
  fn from(err: toml_edit::TomlError) -> Self {
    ReleaseError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

impl From<semver::Error> for ReleaseError {
  fn from(err: semver::Error) -> Self {
    ReleaseError::message(format!("Version parse error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// No `source` option configured
  MissingSource,

  /// No `destination` option configured
  MissingDestination,

  /// An option value could not be parsed
  InvalidValue { key: String, value: String, expected: String },

  /// A `$NAME` template referenced an environment variable that is not set
  UndefinedVariable { name: String },
}

impl ConfigError {
  pub fn code(&self) -> &'static str {
    match self {
      ConfigError::MissingSource => "EMISSING_SOURCE",
      ConfigError::MissingDestination => "EMISSING_DESTINATION",
      ConfigError::InvalidValue { .. } => "EINVALIDCONFIG",
      ConfigError::UndefinedVariable { .. } => "EINVALIDCONFIG",
    }
  }

  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::MissingSource => {
        Some("Set the `source` plugin option or the SKOPEO_SOURCE environment variable.".to_string())
      }
      ConfigError::MissingDestination => {
        Some("Set the `destination` plugin option or the SKOPEO_DESTINATION environment variable.".to_string())
      }
      ConfigError::UndefinedVariable { name } => Some(format!(
        "Export {} before running, or remove the template reference.",
        name
      )),
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::MissingSource => write!(f, "You must set one source"),
      ConfigError::MissingDestination => write!(f, "You must set at least one destination"),
      ConfigError::InvalidValue { key, value, expected } => {
        write!(f, "Invalid value '{}' for option '{}': expected {}", value, key, expected)
      }
      ConfigError::UndefinedVariable { name } => {
        write!(f, "Environment variable {} is not defined", name)
      }
    }
  }
}

/// Image reference validation errors
#[derive(Debug)]
pub enum ValidationError {
  /// The configured source reference failed validation
  InvalidSource { reference: String, errors: Vec<String> },

  /// The configured source image could not be found
  SourceNotFound { reference: String },

  /// A configured destination reference failed validation
  InvalidDestination { reference: String, errors: Vec<String> },
}

impl ValidationError {
  pub fn code(&self) -> &'static str {
    match self {
      ValidationError::InvalidSource { .. } => "EWRONG_SOURCE",
      ValidationError::SourceNotFound { .. } => "EWRONG_SOURCE",
      ValidationError::InvalidDestination { .. } => "EWRONG_DESTINATION",
    }
  }

  fn help_message(&self) -> Option<String> {
    match self {
      ValidationError::InvalidSource { .. } | ValidationError::InvalidDestination { .. } => Some(
        "References use the form <transport>:<details>, e.g. docker://registry.example.com/my-image:latest"
          .to_string(),
      ),
      ValidationError::SourceNotFound { .. } => {
        Some("Build the source image before releasing, or fix the source reference.".to_string())
      }
    }
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidationError::InvalidSource { reference, errors } => {
        write!(f, "Invalid source '{}': {}", reference, errors.join("; "))
      }
      ValidationError::SourceNotFound { reference } => {
        write!(f, "Source image not found: {}", reference)
      }
      ValidationError::InvalidDestination { reference, errors } => {
        write!(f, "Invalid destination '{}': {}", reference, errors.join("; "))
      }
    }
  }
}

/// skopeo invocation errors
#[derive(Debug)]
pub enum SkopeoError {
  /// The skopeo binary could not be started
  NotInstalled { binary: PathBuf },

  /// An image already exists at a destination and `force` is not set
  ImageExists { reference: String },

  /// `inspect` failed for a reason other than the image being absent
  CheckFailed { reference: String, stderr: String },

  /// `copy` failed (after exhausting retries)
  CopyFailed { destination: String, stderr: String },
}

impl SkopeoError {
  pub fn code(&self) -> &'static str {
    match self {
      SkopeoError::NotInstalled { .. } => "EMISSINGSKOPEO",
      SkopeoError::ImageExists { .. } => "EIMAGEEXISTS",
      SkopeoError::CheckFailed { .. } => "EIMAGE_CHECK_FAILED",
      SkopeoError::CopyFailed { .. } => "ECOPYFAILED",
    }
  }

  fn help_message(&self) -> Option<String> {
    match self {
      SkopeoError::NotInstalled { .. } => {
        Some("Install skopeo or run the release in a container image that ships it.".to_string())
      }
      SkopeoError::ImageExists { .. } => {
        Some("Set `force = true` to overwrite existing images, or bump the destination tag.".to_string())
      }
      _ => None,
    }
  }
}

impl fmt::Display for SkopeoError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SkopeoError::NotInstalled { binary } => {
        write!(
          f,
          "{} is not found in PATH. Are you using a container with skopeo installed?",
          binary.display()
        )
      }
      SkopeoError::ImageExists { reference } => {
        write!(f, "Image was already found at {} and force is deactivated", reference)
      }
      SkopeoError::CheckFailed { reference, stderr } => {
        write!(f, "Image check failed for {}: {}", reference, stderr.trim())
      }
      SkopeoError::CopyFailed { destination, stderr } => {
        write!(f, "Failed to push image: {}\n{}", destination, stderr.trim())
      }
    }
  }
}

/// Result type alias for semantic-release-skopeo
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with its code and help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ [{}] {}\n", error.code(), error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
