//! Connection report and Ansible inventory rendering.
//!
//! After setup, the user gets everything needed to reach the lab: the
//! private key path, a ready-to-paste SSH command per node, and an
//! Ansible inventory block (one line per node) that can be written to a
//! hosts file as-is.

use crate::config::{LabPaths, LAB_USER};

/// A provisioned lab node with its discovered address.
pub struct NodeInfo {
    /// Container name (also the hostname)
    pub name: String,
    /// IP address on the lab network
    pub ip: String,
}

/// Ready-to-use SSH command for a node.
pub fn ssh_command(paths: &LabPaths, ip: &str) -> String {
    format!("ssh -i {} {}@{}", paths.private_key.display(), LAB_USER, ip)
}

/// One Ansible inventory line for a node.
pub fn inventory_line(paths: &LabPaths, node: &NodeInfo) -> String {
    format!(
        "{} ansible_host={} ansible_user={} ansible_ssh_private_key_file={}",
        node.name,
        node.ip,
        LAB_USER,
        paths.private_key.display()
    )
}

/// Render the full inventory: exactly one line per node.
pub fn render_inventory(paths: &LabPaths, nodes: &[NodeInfo]) -> String {
    nodes
        .iter()
        .map(|node| inventory_line(paths, node))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Print the post-setup report to stdout.
pub fn print_report(paths: &LabPaths, nodes: &[NodeInfo]) {
    println!("\n=== Lab Ready ===");
    println!("  Private key: {}", paths.private_key.display());
    println!();

    for node in nodes {
        println!("  {}  {}", node.name, node.ip);
        println!("    {}", ssh_command(paths, &node.ip));
    }

    println!("\nAnsible inventory:");
    println!("{}", render_inventory(paths, nodes));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn sample_nodes() -> Vec<NodeInfo> {
        vec![
            NodeInfo { name: "node_1".to_string(), ip: "172.20.0.2".to_string() },
            NodeInfo { name: "node_2".to_string(), ip: "172.20.0.3".to_string() },
            NodeInfo { name: "node_3".to_string(), ip: "172.20.0.4".to_string() },
        ]
    }

    #[test]
    fn test_ssh_command() {
        let paths = LabPaths::new(Path::new("/lab"));
        assert_eq!(
            ssh_command(&paths, "172.20.0.2"),
            "ssh -i /lab/keys/ansible_key ansible@172.20.0.2"
        );
    }

    #[test]
    fn test_inventory_line_fields() {
        let paths = LabPaths::new(Path::new("/lab"));
        let node = NodeInfo { name: "node_1".to_string(), ip: "172.20.0.2".to_string() };
        assert_eq!(
            inventory_line(&paths, &node),
            "node_1 ansible_host=172.20.0.2 ansible_user=ansible \
             ansible_ssh_private_key_file=/lab/keys/ansible_key"
        );
    }

    #[test]
    fn test_render_inventory_one_line_per_node() {
        let paths = LabPaths::new(Path::new("/lab"));
        let rendered = render_inventory(&paths, &sample_nodes());
        assert_eq!(rendered.lines().count(), 3);
        for (line, name) in rendered.lines().zip(["node_1", "node_2", "node_3"]) {
            assert!(line.starts_with(name));
            assert!(line.contains("ansible_user=ansible"));
        }
    }
}
