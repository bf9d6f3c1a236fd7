//! Docker driver.
//!
//! Wraps the handful of Docker operations the lab consumes: network
//! lifecycle, container lifecycle, in-container execution, and IP
//! discovery. Docker itself is a black box reached through the CLI;
//! its exit status is the only failure signal.
//!
//! Existence checks list by name with `--format` and compare whole
//! lines, because Docker's `name=` filter is a substring match and
//! `node_1` must not shadow a stray `node_10`.

use anyhow::{bail, Result};

use crate::process::Cmd;

/// Check whether a container with this exact name exists (any state).
pub fn container_exists(name: &str) -> Result<bool> {
    let result = Cmd::new("docker")
        .args(["ps", "-a", "--filter"])
        .arg(format!("name={}", name))
        .args(["--format", "{{.Names}}"])
        .error_msg("docker ps failed. Is the Docker daemon running?")
        .run()?;
    Ok(output_has_line(&result.stdout, name))
}

/// Check whether a container with this exact name is currently running.
pub fn container_running(name: &str) -> Result<bool> {
    let result = Cmd::new("docker")
        .args(["ps", "--filter"])
        .arg(format!("name={}", name))
        .args(["--format", "{{.Names}}"])
        .error_msg("docker ps failed. Is the Docker daemon running?")
        .run()?;
    Ok(output_has_line(&result.stdout, name))
}

/// Force-remove a container.
pub fn remove_container(name: &str) -> Result<()> {
    Cmd::new("docker")
        .args(["rm", "-f", name])
        .error_msg("docker rm failed")
        .run()?;
    Ok(())
}

/// Start a detached container on the lab network, hostname equal to its name.
pub fn run_container(name: &str, network: &str, image: &str) -> Result<()> {
    Cmd::new("docker")
        .args(["run", "-d", "--name", name, "--hostname", name, "--network", network, image])
        .error_msg("docker run failed")
        .run()?;
    Ok(())
}

/// Check whether a network with this exact name exists.
pub fn network_exists(name: &str) -> Result<bool> {
    let result = Cmd::new("docker")
        .args(["network", "ls", "--filter"])
        .arg(format!("name={}", name))
        .args(["--format", "{{.Name}}"])
        .error_msg("docker network ls failed. Is the Docker daemon running?")
        .run()?;
    Ok(output_has_line(&result.stdout, name))
}

/// Create the lab network unless it already exists.
pub fn ensure_network(name: &str) -> Result<()> {
    if network_exists(name)? {
        println!("Network {} already exists (reusing)", name);
        return Ok(());
    }
    println!("Creating network {}...", name);
    Cmd::new("docker")
        .args(["network", "create", name])
        .error_msg("docker network create failed")
        .run()?;
    Ok(())
}

/// Remove a network.
pub fn remove_network(name: &str) -> Result<()> {
    Cmd::new("docker")
        .args(["network", "rm", name])
        .error_msg("docker network rm failed")
        .run()?;
    Ok(())
}

/// Execute a command inside a running container.
pub fn exec_in_container(name: &str, args: &[&str]) -> Result<()> {
    Cmd::new("docker")
        .args(["exec", name])
        .args(args.iter().copied())
        .error_msg("docker exec failed")
        .run()?;
    Ok(())
}

/// Execute a shell snippet inside a running container.
pub fn exec_shell(name: &str, script: &str) -> Result<()> {
    exec_in_container(name, &["sh", "-c", script])
}

/// Query a container's IP address on the given network.
pub fn container_ip(name: &str, network: &str) -> Result<String> {
    let result = Cmd::new("docker")
        .args(["inspect", "--format"])
        .arg(ip_format_template(network))
        .arg(name)
        .error_msg("docker inspect failed")
        .run()?;

    let ip = result.stdout.trim().to_string();
    if ip.is_empty() {
        bail!("container {} has no IP address on network {}", name, network);
    }
    Ok(ip)
}

/// Check whether the image tag exists locally.
pub fn image_exists(tag: &str) -> Result<bool> {
    let result = Cmd::new("docker")
        .args(["image", "inspect", tag])
        .allow_fail()
        .run()?;
    Ok(result.success())
}

/// Go template selecting the IP address on one named network.
fn ip_format_template(network: &str) -> String {
    format!("{{{{.NetworkSettings.Networks.{}.IPAddress}}}}", network)
}

/// Whole-line match against `--format`-style one-name-per-line output.
fn output_has_line(output: &str, name: &str) -> bool {
    output.lines().any(|line| line.trim() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_has_line_exact_match() {
        assert!(output_has_line("node_1\nnode_2\n", "node_1"));
        assert!(!output_has_line("node_10\n", "node_1"));
        assert!(!output_has_line("", "node_1"));
    }

    #[test]
    fn test_output_has_line_ignores_whitespace() {
        assert!(output_has_line("  node_3  \n", "node_3"));
    }

    #[test]
    fn test_ip_format_template() {
        assert_eq!(
            ip_format_template("ansible_lab"),
            "{{.NetworkSettings.Networks.ansible_lab.IPAddress}}"
        );
    }
}
