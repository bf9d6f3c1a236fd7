//! SSH keypair lifecycle.
//!
//! Generates the lab keypair with `ssh-keygen` on first setup and reuses
//! it on later runs, so re-running setup never invalidates keys already
//! distributed to containers. The whole keys directory is removed on
//! destroy.
//!
//! Permissions matter here: OpenSSH refuses keys that are readable by
//! other users, so the directory is 700, the private key 600, and the
//! public key 644.

use anyhow::{bail, Context, Result};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::config::{LabPaths, KEY_COMMENT};
use crate::process::Cmd;

/// Ensure the lab keypair exists, generating it only when absent.
pub fn ensure_keypair(paths: &LabPaths) -> Result<()> {
    if paths.private_key.exists() {
        if !paths.public_key.exists() {
            bail!(
                "private key exists but public key is missing: {}\n\
                 Run 'sshlab destroy' and set up again.",
                paths.public_key.display()
            );
        }
        println!(
            "Keypair already exists at {} (reusing)",
            paths.private_key.display()
        );
        set_key_permissions(paths)?;
        return Ok(());
    }

    fs::create_dir_all(&paths.keys_dir).with_context(|| {
        format!("failed to create keys directory: {}", paths.keys_dir.display())
    })?;
    fs::set_permissions(&paths.keys_dir, fs::Permissions::from_mode(0o700))?;

    println!("Generating 4096-bit RSA keypair...");
    Cmd::new("ssh-keygen")
        .args(["-t", "rsa", "-b", "4096", "-N", ""])
        .arg("-f")
        .arg_path(&paths.private_key)
        .args(["-C", KEY_COMMENT])
        .error_msg("ssh-keygen failed. Install: sudo apt install openssh-client")
        .run()?;

    if !paths.public_key.exists() {
        bail!(
            "public key not found after generation: {}",
            paths.public_key.display()
        );
    }

    set_key_permissions(paths)?;
    println!("  Private key: {}", paths.private_key.display());
    println!("  Public key:  {}", paths.public_key.display());

    Ok(())
}

/// Normalize permission bits on the key files (600 private, 644 public).
pub fn set_key_permissions(paths: &LabPaths) -> Result<()> {
    set_mode(&paths.private_key, 0o600)?;
    set_mode(&paths.public_key, 0o644)?;
    Ok(())
}

/// Read the public key, trimmed of its trailing newline.
pub fn read_public_key(paths: &LabPaths) -> Result<String> {
    let content = fs::read_to_string(&paths.public_key)
        .with_context(|| format!("failed to read public key: {}", paths.public_key.display()))?;
    Ok(content.trim().to_string())
}

/// Remove the keys directory if present. No-op when it does not exist.
pub fn destroy_keys(paths: &LabPaths) -> Result<()> {
    if !paths.keys_dir.exists() {
        return Ok(());
    }
    println!("Removing keys directory {}", paths.keys_dir.display());
    fs::remove_dir_all(&paths.keys_dir).with_context(|| {
        format!("failed to remove keys directory: {}", paths.keys_dir.display())
    })?;
    Ok(())
}

fn set_mode(path: &Path, mode: u32) -> Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("failed to set mode {:o} on {}", mode, path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fake_keypair(dir: &Path) -> LabPaths {
        let paths = LabPaths::new(dir);
        fs::create_dir_all(&paths.keys_dir).unwrap();
        fs::write(&paths.private_key, "PRIVATE").unwrap();
        fs::write(&paths.public_key, "ssh-rsa AAAA ansible@sshlab\n").unwrap();
        paths
    }

    #[test]
    fn test_ensure_keypair_reuses_existing() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let paths = fake_keypair(temp_dir.path());

        // Must not invoke ssh-keygen or touch the key content
        ensure_keypair(&paths)?;
        assert_eq!(fs::read_to_string(&paths.private_key)?, "PRIVATE");

        Ok(())
    }

    #[test]
    fn test_set_key_permissions() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let paths = fake_keypair(temp_dir.path());

        set_key_permissions(&paths)?;

        let private_mode = fs::metadata(&paths.private_key)?.permissions().mode() & 0o777;
        let public_mode = fs::metadata(&paths.public_key)?.permissions().mode() & 0o777;
        assert_eq!(private_mode, 0o600);
        assert_eq!(public_mode, 0o644);

        Ok(())
    }

    #[test]
    fn test_read_public_key_trims_newline() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let paths = fake_keypair(temp_dir.path());

        let key = read_public_key(&paths)?;
        assert_eq!(key, "ssh-rsa AAAA ansible@sshlab");

        Ok(())
    }

    #[test]
    fn test_destroy_keys_removes_directory() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let paths = fake_keypair(temp_dir.path());

        destroy_keys(&paths)?;
        assert!(!paths.keys_dir.exists());

        Ok(())
    }

    #[test]
    fn test_destroy_keys_noop_when_absent() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let paths = LabPaths::new(temp_dir.path());

        // Nothing was ever set up - destroy must still succeed
        destroy_keys(&paths)?;

        Ok(())
    }
}
