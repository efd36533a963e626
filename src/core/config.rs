//! Plugin configuration loading and resolution
//!
//! Options arrive from three layers, merged per key in precedence order:
//! explicit plugin config (inline JSON over config file), then a
//! `SKOPEO_<UPPER_SNAKE_KEY>` environment variable parsed by a key-specific
//! parser, then a static default. Source and destination values additionally
//! undergo `$NAME`/`${NAME}` environment substitution, with the release-time
//! placeholders `version`/`majorVersion`/`minorVersion` left untouched until
//! publish applies the release version.

use crate::core::env::Env;
use crate::core::error::{ConfigError, ReleaseError, ReleaseResult, ResultExt};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Where skopeo lives unless configured otherwise
pub const DEFAULT_BINARY: &str = "/usr/bin/skopeo";

/// Placeholder names resolved from the release version, not the environment
const RESERVED_VARIABLES: &[&str] = &["version", "majorVersion", "minorVersion"];

static TEMPLATE_VARIABLE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\$(\w+)|\$\{(\w+)\}").expect("template variable pattern"));

/// A config value that may be written as one string or a list of strings
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringOrSeq {
  One(String),
  Many(Vec<String>),
}

impl StringOrSeq {
  /// Coerce to a list; a bare string becomes a single-element list
  fn into_list(self) -> Vec<String> {
    match self {
      StringOrSeq::One(s) => vec![s],
      StringOrSeq::Many(v) => v,
    }
  }
}

/// Raw plugin configuration as supplied by the user (file or inline JSON).
/// Keys are camelCase in both formats - this is the plugin option surface.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
  pub binary_path: Option<String>,
  pub copy_args: Option<StringOrSeq>,
  pub inspect_args: Option<StringOrSeq>,
  pub source: Option<String>,
  pub destination: Option<StringOrSeq>,
  pub force: Option<bool>,
  pub push_ignore_immutable_tag_errors: Option<bool>,
  pub retry: Option<u32>,
}

impl RawConfig {
  /// Load from an explicit path, or search the standard locations under
  /// `dir`. A missing config file is not an error - everything can come
  /// from inline config or the environment.
  pub fn load(explicit: Option<&Path>, dir: &Path) -> ReleaseResult<Self> {
    let path = match explicit {
      Some(p) => Some(p.to_path_buf()),
      None => config_file_in(dir),
    };

    let Some(path) = path else {
      return Ok(Self::default());
    };

    let content =
      fs::read_to_string(&path).with_context(|| format!("Failed to read config from {}", path.display()))?;
    let config: RawConfig =
      toml_edit::de::from_str(&content).with_context(|| format!("Failed to parse config from {}", path.display()))?;
    Ok(config)
  }

  /// Parse an inline JSON plugin-config object
  pub fn from_json(json: &str) -> ReleaseResult<Self> {
    serde_json::from_str(json).context("Failed to parse --plugin-config JSON")
  }

  /// Overlay `other` on top of self, field by field
  pub fn merged_with(self, other: RawConfig) -> RawConfig {
    RawConfig {
      binary_path: other.binary_path.or(self.binary_path),
      copy_args: other.copy_args.or(self.copy_args),
      inspect_args: other.inspect_args.or(self.inspect_args),
      source: other.source.or(self.source),
      destination: other.destination.or(self.destination),
      force: other.force.or(self.force),
      push_ignore_immutable_tag_errors: other
        .push_ignore_immutable_tag_errors
        .or(self.push_ignore_immutable_tag_errors),
      retry: other.retry.or(self.retry),
    }
  }
}

/// Find a plugin config file in search order:
/// skopeo.toml, .skopeo.toml, .config/skopeo.toml
pub fn config_file_in(dir: &Path) -> Option<PathBuf> {
  let candidates = [
    dir.join("skopeo.toml"),
    dir.join(".skopeo.toml"),
    dir.join(".config").join("skopeo.toml"),
  ];

  candidates.into_iter().find(|p| p.exists())
}

/// Fully resolved plugin configuration. Immutable after resolution.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
  pub binary_path: PathBuf,
  pub copy_args: Vec<String>,
  pub inspect_args: Vec<String>,
  pub source: Option<String>,
  pub destination: Option<Vec<String>>,
  pub force: bool,
  pub push_ignore_immutable_tag_errors: bool,
  pub retry: u32,
}

impl ResolvedConfig {
  /// Source reference, or the missing-source config error
  pub fn require_source(&self) -> ReleaseResult<&str> {
    self.source.as_deref().ok_or_else(|| ConfigError::MissingSource.into())
  }

  /// Destination list, or the missing-destination config error.
  /// An empty list counts as missing.
  pub fn require_destination(&self) -> ReleaseResult<&[String]> {
    match self.destination.as_deref() {
      Some(list) if !list.is_empty() => Ok(list),
      _ => Err(ConfigError::MissingDestination.into()),
    }
  }
}

/// Resolve just the binary path. Cannot fail, which lets verify-conditions
/// probe the binary before full configuration resolution.
pub fn resolve_binary_path(raw: &RawConfig, env: &dyn Env) -> PathBuf {
  PathBuf::from(
    raw
      .binary_path
      .clone()
      .or_else(|| env.var(&env_var_name("binaryPath")))
      .unwrap_or_else(|| DEFAULT_BINARY.to_string()),
  )
}

/// Resolve a raw configuration against an environment provider.
pub fn resolve(raw: &RawConfig, env: &dyn Env) -> ReleaseResult<ResolvedConfig> {
  let binary_path = resolve_binary_path(raw, env);

  let copy_args = resolve_list(raw.copy_args.clone(), "copyArgs", env).unwrap_or_default();
  let inspect_args = resolve_list(raw.inspect_args.clone(), "inspectArgs", env).unwrap_or_default();

  let source = raw
    .source
    .clone()
    .or_else(|| env.var(&env_var_name("source")))
    .map(|s| substitute_env_vars(&s, env))
    .transpose()?;

  let destination = resolve_list(raw.destination.clone(), "destination", env)
    .map(|list| {
      list
        .iter()
        .map(|d| substitute_env_vars(d, env))
        .collect::<ReleaseResult<Vec<String>>>()
    })
    .transpose()?;

  let force = resolve_bool(raw.force, "force", env)?.unwrap_or(false);
  let push_ignore_immutable_tag_errors =
    resolve_bool(raw.push_ignore_immutable_tag_errors, "pushIgnoreImmutableTagErrors", env)?.unwrap_or(false);

  let retry = match raw.retry {
    Some(n) => n,
    None => match env.var(&env_var_name("retry")) {
      Some(value) => value.trim().parse::<u32>().map_err(|_| {
        ReleaseError::Config(ConfigError::InvalidValue {
          key: "retry".to_string(),
          value,
          expected: "a non-negative integer".to_string(),
        })
      })?,
      None => 0,
    },
  };

  Ok(ResolvedConfig {
    binary_path,
    copy_args,
    inspect_args,
    source,
    destination,
    force,
    push_ignore_immutable_tag_errors,
    retry,
  })
}

/// Convert a camelCase option key to its `SKOPEO_` environment variable name
pub fn env_var_name(key: &str) -> String {
  let mut name = String::from("SKOPEO_");
  for (i, c) in key.chars().enumerate() {
    if c.is_ascii_uppercase() && i > 0 {
      name.push('_');
    }
    name.push(c.to_ascii_uppercase());
  }
  name
}

/// Resolve a string-or-list option: explicit value coerced to a list, else
/// environment value run through the list-like parser.
fn resolve_list(explicit: Option<StringOrSeq>, key: &str, env: &dyn Env) -> Option<Vec<String>> {
  explicit
    .map(StringOrSeq::into_list)
    .or_else(|| env.var(&env_var_name(key)).map(|v| parse_list(&v)))
}

/// List-like parse of an environment string, in order: JSON array, else
/// comma-split, else single-element list. Malformed JSON falls back to the
/// literal string rather than erroring.
fn parse_list(value: &str) -> Vec<String> {
  if let Ok(list) = serde_json::from_str::<Vec<String>>(value) {
    return list;
  }
  if value.contains(',') {
    return value.split(',').map(|s| s.trim().to_string()).collect();
  }
  vec![value.to_string()]
}

/// Resolve a boolean option: explicit value, else environment literal
/// `true`/`false` (case-insensitive). Any other non-empty string is a
/// configuration error.
fn resolve_bool(explicit: Option<bool>, key: &str, env: &dyn Env) -> ReleaseResult<Option<bool>> {
  if explicit.is_some() {
    return Ok(explicit);
  }

  match env.var(&env_var_name(key)) {
    None => Ok(None),
    Some(value) => match value.trim().to_ascii_lowercase().as_str() {
      "true" => Ok(Some(true)),
      "false" => Ok(Some(false)),
      _ => Err(
        ConfigError::InvalidValue {
          key: key.to_string(),
          value,
          expected: "'true' or 'false'".to_string(),
        }
        .into(),
      ),
    },
  }
}

/// Replace `$NAME` and `${NAME}` with environment values, leaving the
/// reserved release-time placeholders untouched. An undefined non-reserved
/// variable is a configuration error.
pub fn substitute_env_vars(value: &str, env: &dyn Env) -> ReleaseResult<String> {
  let mut out = String::with_capacity(value.len());
  let mut last = 0;

  for caps in TEMPLATE_VARIABLE.captures_iter(value) {
    let matched = caps.get(0).expect("whole match");
    let name = caps.get(1).or_else(|| caps.get(2)).expect("variable name group").as_str();

    out.push_str(&value[last..matched.start()]);
    if RESERVED_VARIABLES.contains(&name) {
      out.push_str(matched.as_str());
    } else {
      match env.var(name) {
        Some(v) => out.push_str(&v),
        None => {
          return Err(ConfigError::UndefinedVariable { name: name.to_string() }.into());
        }
      }
    }
    last = matched.end();
  }

  out.push_str(&value[last..]);
  Ok(out)
}

/// Replace the reserved release-time placeholders in a destination with
/// values derived from the release version: major = first dot-segment,
/// minor = first two dot-segments joined by `.`.
pub fn substitute_release_version(destination: &str, version: &str) -> String {
  let major = version.split('.').next().unwrap_or(version);
  let minor = version.split('.').take(2).collect::<Vec<_>>().join(".");

  destination
    .replace("${version}", version)
    .replace("${majorVersion}", major)
    .replace("${minorVersion}", &minor)
}
