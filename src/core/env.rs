//! Injectable environment-variable provider
//!
//! Config fallback and template substitution both read the process
//! environment. Routing those reads through a trait keeps the resolver
//! deterministic under test without mutating real process state.

/// Key-value environment provider
pub trait Env {
  /// Look up a variable, `None` if unset
  fn var(&self, key: &str) -> Option<String>;
}

/// Production provider backed by the process environment
pub struct SystemEnv;

impl Env for SystemEnv {
  fn var(&self, key: &str) -> Option<String> {
    std::env::var(key).ok()
  }
}

/// In-memory provider for tests
#[cfg(test)]
#[derive(Default)]
pub struct MapEnv {
  vars: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl MapEnv {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.vars.insert(key.into(), value.into());
    self
  }
}

#[cfg(test)]
impl Env for MapEnv {
  fn var(&self, key: &str) -> Option<String> {
    self.vars.get(key).cloned()
  }
}
