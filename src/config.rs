//! Lab configuration constants and filesystem layout.
//!
//! Everything the lab needs to be deterministic lives here: container
//! naming, network and image names, the provisioned user, and the paths
//! of the generated artifacts (keypair, Dockerfile).
//!
//! Container names follow the `prefix_i` scheme (`node_1`, `node_2`, ...)
//! so that every run can look up and remove exactly the containers it owns.

use std::path::{Path, PathBuf};

/// Number of lab containers.
pub const CONTAINER_COUNT: usize = 3;

/// Container/hostname prefix. Full names are `node_1` .. `node_N`.
pub const CONTAINER_PREFIX: &str = "node";

/// Name of the isolated Docker bridge network.
pub const NETWORK_NAME: &str = "ansible_lab";

/// Tag of the built lab image.
pub const IMAGE_TAG: &str = "ansible-lab-node";

/// Login user provisioned inside every container.
pub const LAB_USER: &str = "ansible";

/// Comment embedded in the generated SSH public key.
pub const KEY_COMMENT: &str = "ansible@sshlab";

/// Base OS image for the lab containers.
pub const BASE_IMAGE: &str = "ubuntu:22.04";

/// Packages installed into the lab image.
///
/// `python3` is what makes the nodes usable as Ansible targets.
pub const NODE_PACKAGES: &[&str] = &["openssh-server", "sudo", "python3"];

/// Seconds to wait after starting the containers so sshd can come up.
pub const SSHD_STARTUP_DELAY_SECS: u64 = 3;

/// Deterministic container names, in start order.
pub fn container_names() -> Vec<String> {
    (1..=CONTAINER_COUNT)
        .map(|i| format!("{}_{}", CONTAINER_PREFIX, i))
        .collect()
}

/// Paths of the generated lab artifacts.
pub struct LabPaths {
    /// Keys directory (mode 700), removed wholesale on destroy
    pub keys_dir: PathBuf,
    /// Private key (mode 600)
    pub private_key: PathBuf,
    /// Public key (mode 644)
    pub public_key: PathBuf,
    /// Generated Dockerfile, built via `docker build <keys_dir>`
    pub dockerfile: PathBuf,
}

impl LabPaths {
    /// Create paths relative to the base directory.
    pub fn new(base_dir: &Path) -> Self {
        let keys_dir = base_dir.join("keys");
        Self {
            private_key: keys_dir.join("ansible_key"),
            public_key: keys_dir.join("ansible_key.pub"),
            dockerfile: keys_dir.join("Dockerfile"),
            keys_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_names_deterministic() {
        let names = container_names();
        assert_eq!(names.len(), CONTAINER_COUNT);
        assert_eq!(names[0], "node_1");
        assert_eq!(names[CONTAINER_COUNT - 1], format!("node_{}", CONTAINER_COUNT));
    }

    #[test]
    fn test_lab_paths_layout() {
        let paths = LabPaths::new(Path::new("/tmp/lab"));
        assert_eq!(paths.keys_dir, Path::new("/tmp/lab/keys"));
        assert_eq!(paths.private_key, Path::new("/tmp/lab/keys/ansible_key"));
        assert_eq!(paths.public_key, Path::new("/tmp/lab/keys/ansible_key.pub"));
        assert_eq!(paths.dockerfile, Path::new("/tmp/lab/keys/Dockerfile"));
    }

    #[test]
    fn test_public_key_lives_next_to_private() {
        let paths = LabPaths::new(Path::new("/x"));
        assert_eq!(paths.private_key.parent(), paths.public_key.parent());
    }
}
