//! Per-container provisioning.
//!
//! Copies the lab public key into a freshly started container and locks
//! down the `authorized_keys` file (owner = lab user, mode 600) so sshd
//! accepts it.

use anyhow::Result;

use crate::config::{LabPaths, LAB_USER};
use crate::keys;
use crate::runtime;

/// Install the lab public key into a container's authorized_keys.
pub fn authorize_key(container: &str, paths: &LabPaths) -> Result<()> {
    let public_key = keys::read_public_key(paths)?;
    let authorized_keys = format!("/home/{}/.ssh/authorized_keys", LAB_USER);

    runtime::exec_shell(container, &authorized_keys_script(LAB_USER, &public_key))?;
    runtime::exec_in_container(
        container,
        &["chown", &format!("{}:{}", LAB_USER, LAB_USER), &authorized_keys],
    )?;
    runtime::exec_in_container(container, &["chmod", "600", &authorized_keys])?;

    Ok(())
}

/// Shell snippet appending the public key to the user's authorized_keys.
///
/// OpenSSH public keys are base64 plus a comment, never single quotes,
/// so single-quoting the key is safe.
fn authorized_keys_script(user: &str, public_key: &str) -> String {
    format!(
        "mkdir -p /home/{user}/.ssh && printf '%s\\n' '{key}' >> /home/{user}/.ssh/authorized_keys",
        user = user,
        key = public_key,
    )
}
