//! SSH lab provisioner library.
//!
//! Provides the building blocks for a small local multi-container lab:
//! keypair management, Dockerfile generation, Docker driving, and
//! Ansible inventory rendering. The `sshlab` binary wires these together.

pub mod config;
pub mod image;
pub mod inventory;
pub mod keys;
pub mod preflight;
pub mod process;
pub mod provision;
pub mod runtime;
