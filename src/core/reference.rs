//! Image reference parsing and validation
//!
//! A reference is `<transport>:<details>` (analogous to a URL). Parsing never
//! fails hard: violations accumulate in `errors` and callers decide how to
//! escalate. A result with a non-empty `errors` list must never be used to
//! build a skopeo command.

use std::path::{Path, PathBuf};

/// Transports skopeo accepts for copy/inspect
const VALID_TRANSPORTS: &[&str] = &[
  "containers-storage",
  "dir",
  "docker",
  "docker-archive",
  "docker-daemon",
  "oci",
  "oci-archive",
];

/// Transports whose details start with a local filesystem path
const TRANSPORTS_WITH_PATH: &[&str] = &["dir", "oci", "docker-archive", "oci-archive"];

/// Outcome of parsing a single reference string
#[derive(Debug, Clone, Default)]
pub struct ParsedReference {
  /// Scheme prefix, e.g. `docker` (None when the separator is missing)
  pub transport: Option<String>,

  /// Everything after the first `:`, colons preserved verbatim
  pub details: Option<String>,

  /// True iff details contain a `${` template placeholder.
  /// Writability pre-checks are skipped for such references since the
  /// string is not yet fully resolved.
  pub has_variables: bool,

  /// Accumulated validation errors, in detection order
  pub errors: Vec<String>,
}

impl ParsedReference {
  /// True when the reference passed all checks
  pub fn is_valid(&self) -> bool {
    self.errors.is_empty()
  }
}

/// Parse and validate one reference string.
///
/// `project_root` anchors relative paths of local-path transports
/// (see [`find_project_root`]).
pub fn parse_reference(reference: &str, project_root: &Path) -> ParsedReference {
  let mut result = ParsedReference::default();

  let Some((transport, details)) = reference.split_once(':') else {
    result
      .errors
      .push("Invalid format: missing ':' to separate transport and details.".to_string());
    return result;
  };

  let transport = transport.trim();
  let details = details.trim();
  result.transport = Some(transport.to_string());
  result.details = Some(details.to_string());

  if !VALID_TRANSPORTS.contains(&transport) {
    result.errors.push(format!("Invalid transport type: '{}'", transport));
  }

  if details.chars().any(forbidden_char) {
    result.errors.push(format!("Details contain forbidden characters: {}", details));
  }

  result.has_variables = details.contains("${");

  if TRANSPORTS_WITH_PATH.contains(&transport) {
    // The leading segment (before any tag/index colon) is the path
    let input_path = details.split(':').next().unwrap_or(details);
    let file_path = if Path::new(input_path).is_absolute() {
      PathBuf::from(input_path)
    } else {
      project_root.join(input_path)
    };

    if !file_path.exists() {
      result.errors.push(format!("File does not exist: '{}'", file_path.display()));
    }
  }

  result
}

/// Allowed details characters: lowercase alphanumerics, `.`, `_`, `-`, `/`,
/// `:`, and the template braces `$`, `{`, `}`
fn forbidden_char(c: char) -> bool {
  !(c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-' | '/' | ':' | '$' | '{' | '}'))
}

/// Discover the project root by walking up from `start` until a directory
/// holding a plugin config file or a `.git` marker is found.
///
/// Falls back to `start` so relative paths still resolve predictably in
/// bare checkouts.
pub fn find_project_root(start: &Path) -> PathBuf {
  let mut dir = start;

  loop {
    if crate::core::config::config_file_in(dir).is_some() || dir.join(".git").exists() {
      return dir.to_path_buf();
    }
    match dir.parent() {
      Some(parent) => dir = parent,
      None => return start.to_path_buf(),
    }
  }
}
