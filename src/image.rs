//! Lab image build.
//!
//! Writes the generated Dockerfile into the keys directory and builds the
//! node image from it. The image carries everything a managed node needs:
//!
//! - an SSH daemon restricted to public-key authentication
//! - the `ansible` login user with passwordless sudo
//! - `python3` so the node is a usable Ansible target
//!
//! sshd runs as the container's foreground process; nothing else is
//! supervised inside the containers.

use anyhow::{Context, Result};
use std::fs;

use crate::config::{LabPaths, BASE_IMAGE, IMAGE_TAG, LAB_USER, NODE_PACKAGES};
use crate::process::Cmd;

/// Render the Dockerfile for the lab node image.
pub fn dockerfile_contents() -> String {
    let user = LAB_USER;
    let lines = [
        format!("FROM {}", BASE_IMAGE),
        String::new(),
        "RUN apt-get update \\".to_string(),
        format!(
            "    && apt-get install -y --no-install-recommends {} \\",
            NODE_PACKAGES.join(" ")
        ),
        "    && rm -rf /var/lib/apt/lists/*".to_string(),
        String::new(),
        format!("RUN useradd -m -s /bin/bash {} \\", user),
        format!(
            "    && echo '{} ALL=(ALL) NOPASSWD:ALL' > /etc/sudoers.d/{} \\",
            user, user
        ),
        format!("    && chmod 440 /etc/sudoers.d/{}", user),
        String::new(),
        format!("RUN mkdir -p /var/run/sshd /home/{}/.ssh \\", user),
        format!("    && chmod 700 /home/{}/.ssh \\", user),
        format!("    && chown {}:{} /home/{}/.ssh", user, user, user),
        String::new(),
        "RUN printf 'PermitRootLogin no\\nPasswordAuthentication no\\nPubkeyAuthentication yes\\n' \\".to_string(),
        "    > /etc/ssh/sshd_config.d/lab.conf".to_string(),
        String::new(),
        "EXPOSE 22".to_string(),
        "CMD [\"/usr/sbin/sshd\", \"-D\"]".to_string(),
    ];
    let mut contents = lines.join("\n");
    contents.push('\n');
    contents
}

/// Write the Dockerfile into the keys directory.
pub fn write_build_definition(paths: &LabPaths) -> Result<()> {
    fs::create_dir_all(&paths.keys_dir).with_context(|| {
        format!("failed to create keys directory: {}", paths.keys_dir.display())
    })?;
    fs::write(&paths.dockerfile, dockerfile_contents())
        .with_context(|| format!("failed to write {}", paths.dockerfile.display()))?;
    Ok(())
}

/// Build the node image from the generated Dockerfile.
pub fn build_image(paths: &LabPaths) -> Result<()> {
    println!("Building image {}...", IMAGE_TAG);
    println!("  Dockerfile: {}", paths.dockerfile.display());

    Cmd::new("docker")
        .args(["build", "-t", IMAGE_TAG])
        .arg_path(&paths.keys_dir)
        .error_msg("docker build failed. Is the Docker daemon running?")
        .run_interactive()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dockerfile_base_and_packages() {
        let contents = dockerfile_contents();
        assert!(contents.starts_with(&format!("FROM {}", BASE_IMAGE)));
        for pkg in NODE_PACKAGES {
            assert!(contents.contains(pkg), "package {} missing", pkg);
        }
    }

    #[test]
    fn test_dockerfile_provisions_sudo_user() {
        let contents = dockerfile_contents();
        assert!(contents.contains("useradd -m -s /bin/bash ansible"));
        assert!(contents.contains("ansible ALL=(ALL) NOPASSWD:ALL"));
        assert!(contents.contains("chmod 440 /etc/sudoers.d/ansible"));
    }

    #[test]
    fn test_dockerfile_hardens_sshd() {
        let contents = dockerfile_contents();
        assert!(contents.contains("PermitRootLogin no"));
        assert!(contents.contains("PasswordAuthentication no"));
        assert!(contents.contains("PubkeyAuthentication yes"));
    }

    #[test]
    fn test_dockerfile_runs_sshd_in_foreground() {
        let contents = dockerfile_contents();
        assert!(contents.contains("EXPOSE 22"));
        assert!(contents.contains("CMD [\"/usr/sbin/sshd\", \"-D\"]"));
    }

    #[test]
    fn test_write_build_definition() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let paths = LabPaths::new(temp_dir.path());

        write_build_definition(&paths)?;

        let written = fs::read_to_string(&paths.dockerfile)?;
        assert_eq!(written, dockerfile_contents());

        Ok(())
    }
}
