//! Integration test suite
//!
//! Drives the compiled binary end to end against a fake skopeo script, so
//! no real registries or container tooling are needed.

mod helpers;
mod test_verify;
