//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// A temporary release project with a fake skopeo binary
pub struct TestProject {
  _root: TempDir,
  pub path: PathBuf,
}

/// Fake skopeo behavior: version probe, inspect, and copy all succeed
pub const BEHAVIOR_ALL_OK: &str = r#"case "$1" in
  -v) echo "skopeo version 1.16.0"; exit 0 ;;
  inspect) echo '{}'; exit 0 ;;
  copy) exit 0 ;;
esac
exit 0"#;

/// Fake skopeo behavior: local-archive sources exist, registry images do not
pub const BEHAVIOR_DESTINATIONS_ABSENT: &str = r#"case "$1" in
  -v) echo "skopeo version 1.16.0"; exit 0 ;;
  inspect)
    for last; do :; done
    case "$last" in
      docker-archive:*) echo '{}'; exit 0 ;;
      *) echo "reading manifest: manifest unknown" >&2; exit 1 ;;
    esac ;;
  copy) exit 0 ;;
esac
exit 0"#;

impl TestProject {
  /// Create a project directory with a `.git` marker as project root
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();
    std::fs::create_dir(path.join(".git"))?;
    Ok(Self { _root: root, path })
  }

  /// Write the plugin config file (skopeo.toml)
  pub fn write_config(&self, content: &str) -> Result<()> {
    std::fs::write(self.path.join("skopeo.toml"), content)?;
    Ok(())
  }

  /// Create an empty file (e.g. the source image archive)
  pub fn touch(&self, name: &str) -> Result<()> {
    std::fs::write(self.path.join(name), b"")?;
    Ok(())
  }

  /// Install a fake skopeo shell script that logs every invocation and then
  /// runs `behavior` (a shell `case` over the subcommand in `$1`).
  /// Returns the absolute path for use as `binaryPath`.
  pub fn install_skopeo(&self, behavior: &str) -> Result<String> {
    let bin = self.path.join("fake-skopeo");
    let script = format!(
      "#!/bin/sh\necho \"$*\" >> \"{}\"\n{}\n",
      self.log_path().display(),
      behavior
    );
    std::fs::write(&bin, script)?;

    #[cfg(unix)]
    {
      use std::os::unix::fs::PermissionsExt;
      std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755))?;
    }

    Ok(bin.display().to_string())
  }

  fn log_path(&self) -> PathBuf {
    self.path.join("skopeo-calls.log")
  }

  /// All fake-skopeo invocations so far, one argument vector per line
  pub fn calls(&self) -> Vec<String> {
    std::fs::read_to_string(self.log_path())
      .map(|s| s.lines().map(String::from).collect())
      .unwrap_or_default()
  }

  /// Invocations of one skopeo subcommand (e.g. "copy")
  pub fn calls_of(&self, subcommand: &str) -> Vec<String> {
    self
      .calls()
      .into_iter()
      .filter(|line| line.starts_with(subcommand))
      .collect()
  }

  /// Run the CLI in this project directory
  pub fn run(&self, args: &[&str], envs: &[(&str, &str)]) -> Result<Output> {
    let bin = env!("CARGO_BIN_EXE_semantic-release-skopeo");

    let mut cmd = Command::new(bin);
    cmd.current_dir(&self.path).args(args);
    for (key, value) in envs {
      cmd.env(key, value);
    }

    cmd.output().context("Failed to run semantic-release-skopeo")
  }
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).to_string()
}
