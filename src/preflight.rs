//! Preflight checks for lab prerequisites.
//!
//! Validates that the external tools the lab drives are installed
//! BEFORE any resource is created, so a missing tool fails with a
//! suggestion instead of a half-provisioned lab.

use anyhow::{bail, Result};

use crate::process::which;

/// Required host tools with their purpose and install suggestion.
const REQUIRED_TOOLS: &[(&str, &str, &str)] = &[
    (
        "docker",
        "Drive the container lab",
        "https://docs.docker.com/engine/install/",
    ),
    (
        "ssh-keygen",
        "Generate the lab keypair",
        "sudo apt install openssh-client",
    ),
];

/// Result of a single preflight check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check
    pub name: String,
    /// Whether the check passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
    /// Optional suggestion for fixing the issue
    pub suggestion: Option<String>,
}

impl CheckResult {
    /// Create a passing check result.
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Create a failing check result.
    pub fn fail(
        name: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: message.into(),
            suggestion: Some(suggestion.into()),
        }
    }
}

/// Check that all required host tools are installed.
pub fn check_host_tools() -> Vec<CheckResult> {
    REQUIRED_TOOLS
        .iter()
        .map(|(tool, purpose, install)| check_tool(tool, purpose, install))
        .collect()
}

fn check_tool(tool: &str, purpose: &str, install: &str) -> CheckResult {
    match which(tool) {
        Some(path) => CheckResult::pass(
            format!("{} tool", tool),
            format!("Found at {} ({})", path, purpose),
        ),
        None => CheckResult::fail(
            format!("{} tool", tool),
            format!("Not found (needed for: {})", purpose),
            install,
        ),
    }
}

/// Run all checks and abort if any required tool is missing.
pub fn ensure_host_tools() -> Result<()> {
    let checks = check_host_tools();
    let failures: Vec<&CheckResult> = checks.iter().filter(|c| !c.passed).collect();

    if failures.is_empty() {
        return Ok(());
    }

    for check in &failures {
        eprintln!("[FAIL] {}: {}", check.name, check.message);
        if let Some(suggestion) = &check.suggestion {
            eprintln!("       Suggestion: {}", suggestion);
        }
    }
    bail!("missing required host tools");
}
