//! End-to-end tests for the verify subcommand

use crate::helpers::{BEHAVIOR_ALL_OK, BEHAVIOR_DESTINATIONS_ABSENT, TestProject, stderr, stdout};
use anyhow::Result;

#[test]
fn verify_passes_with_valid_configuration() -> Result<()> {
  let project = TestProject::new()?;
  project.touch("image.tar")?;
  let skopeo = project.install_skopeo(BEHAVIOR_ALL_OK)?;
  project.write_config(&format!(
    r#"
binaryPath = "{skopeo}"
source = "docker-archive:image.tar"
destination = ["docker://registry.example.com/my-image:${{version}}"]
"#
  ))?;

  let output = project.run(&["verify"], &[])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));
  assert!(stdout(&output).contains("configuration verified"));
  assert_eq!(project.calls()[0], "-v");
  Ok(())
}

#[test]
fn verify_fails_when_source_missing() -> Result<()> {
  let project = TestProject::new()?;
  let skopeo = project.install_skopeo(BEHAVIOR_ALL_OK)?;
  project.write_config(&format!(
    r#"
binaryPath = "{skopeo}"
destination = ["docker://registry.example.com/my-image:${{version}}"]
"#
  ))?;

  let output = project.run(&["verify"], &[])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("EMISSING_SOURCE"));
  Ok(())
}

#[test]
fn verify_fails_when_destination_missing() -> Result<()> {
  let project = TestProject::new()?;
  project.touch("image.tar")?;
  let skopeo = project.install_skopeo(BEHAVIOR_ALL_OK)?;
  project.write_config(&format!(
    r#"
binaryPath = "{skopeo}"
source = "docker-archive:image.tar"
"#
  ))?;

  let output = project.run(&["verify"], &[])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("EMISSING_DESTINATION"));
  // no destination inspect was attempted
  assert!(project.calls_of("inspect").len() <= 1);
  Ok(())
}

#[test]
fn verify_fails_when_skopeo_missing() -> Result<()> {
  let project = TestProject::new()?;
  project.write_config(
    r#"
binaryPath = "/nonexistent/skopeo"
source = "docker://registry.example.com/src:latest"
destination = ["docker://registry.example.com/my-image:latest"]
"#,
  )?;

  let output = project.run(&["verify"], &[])?;
  assert_eq!(output.status.code(), Some(2));
  assert!(stderr(&output).contains("EMISSINGSKOPEO"));
  Ok(())
}

#[test]
fn verify_fails_on_invalid_source_reference() -> Result<()> {
  let project = TestProject::new()?;
  let skopeo = project.install_skopeo(BEHAVIOR_ALL_OK)?;
  project.write_config(&format!(
    r#"
binaryPath = "{skopeo}"
source = "docker-archive:absent/image.tar"
destination = ["docker://registry.example.com/my-image:latest"]
"#
  ))?;

  let output = project.run(&["verify"], &[])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("EWRONG_SOURCE"));
  Ok(())
}

#[test]
fn verify_rejects_occupied_destination_without_force() -> Result<()> {
  let project = TestProject::new()?;
  project.touch("image.tar")?;
  let skopeo = project.install_skopeo(BEHAVIOR_ALL_OK)?;
  project.write_config(&format!(
    r#"
binaryPath = "{skopeo}"
source = "docker-archive:image.tar"
destination = ["docker://registry.example.com/my-image:latest"]
"#
  ))?;

  let output = project.run(&["verify"], &[])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("EIMAGEEXISTS"));
  Ok(())
}

#[test]
fn verify_accepts_occupied_destination_with_force() -> Result<()> {
  let project = TestProject::new()?;
  project.touch("image.tar")?;
  let skopeo = project.install_skopeo(BEHAVIOR_ALL_OK)?;
  project.write_config(&format!(
    r#"
binaryPath = "{skopeo}"
source = "docker-archive:image.tar"
destination = ["docker://registry.example.com/my-image:latest"]
force = true
"#
  ))?;

  let output = project.run(&["verify"], &[])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));
  Ok(())
}

#[test]
fn verify_passes_when_destinations_are_absent() -> Result<()> {
  let project = TestProject::new()?;
  project.touch("image.tar")?;
  let skopeo = project.install_skopeo(BEHAVIOR_DESTINATIONS_ABSENT)?;
  project.write_config(&format!(
    r#"
binaryPath = "{skopeo}"
source = "docker-archive:image.tar"
destination = [
  "docker://registry.example.com/my-image:latest",
  "docker://registry.example.com/my-image:stable",
]
"#
  ))?;

  let output = project.run(&["verify"], &[])?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));
  // source inspect plus one inspect per destination
  assert_eq!(project.calls_of("inspect").len(), 3);
  Ok(())
}

#[test]
fn verify_accepts_configuration_from_environment() -> Result<()> {
  let project = TestProject::new()?;
  let skopeo = project.install_skopeo(BEHAVIOR_ALL_OK)?;

  let output = project.run(
    &["verify"],
    &[
      ("SKOPEO_BINARY_PATH", skopeo.as_str()),
      ("SKOPEO_SOURCE", "docker://registry.example.com/src:latest"),
      (
        "SKOPEO_DESTINATION",
        "docker://registry.example.com/my-image:${version}",
      ),
    ],
  )?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));
  Ok(())
}

#[test]
fn verify_reports_undefined_template_variable() -> Result<()> {
  let project = TestProject::new()?;
  let skopeo = project.install_skopeo(BEHAVIOR_ALL_OK)?;

  let output = project.run(
    &["verify"],
    &[
      ("SKOPEO_BINARY_PATH", skopeo.as_str()),
      (
        "SKOPEO_SOURCE",
        "docker://registry.example.com/${NO_SUCH_VARIABLE_SET}:latest",
      ),
    ],
  )?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("EINVALIDCONFIG"));
  assert!(stderr(&output).contains("NO_SUCH_VARIABLE_SET"));
  Ok(())
}

#[test]
fn verify_inline_plugin_config_overrides_file() -> Result<()> {
  let project = TestProject::new()?;
  project.touch("image.tar")?;
  let skopeo = project.install_skopeo(BEHAVIOR_ALL_OK)?;
  project.write_config(&format!(
    r#"
binaryPath = "{skopeo}"
source = "docker-archive:image.tar"
"#
  ))?;

  let output = project.run(
    &[
      "verify",
      "--plugin-config",
      r#"{"destination": "docker://registry.example.com/my-image:${version}"}"#,
    ],
    &[],
  )?;
  assert!(output.status.success(), "stderr: {}", stderr(&output));
  Ok(())
}
