//! Release-step logging
//!
//! Mirrors the logger capability a release tool hands to its plugins:
//! `log` for step progress, `info` for detail, `error` for failures.
//! Destinations are processed sequentially, so log order is deterministic.

/// Logger for release step output
#[derive(Default)]
pub struct Logger;

impl Logger {
  pub fn new() -> Self {
    Self
  }

  /// Step progress, stdout
  pub fn log(&self, msg: impl AsRef<str>) {
    println!("📦 {}", msg.as_ref());
  }

  /// Supporting detail, stdout
  pub fn info(&self, msg: impl AsRef<str>) {
    println!("   {}", msg.as_ref());
  }

  /// Failure detail, stderr
  pub fn error(&self, msg: impl AsRef<str>) {
    eprintln!("✖  {}", msg.as_ref());
  }
}
