//! SSH Lab CLI
//!
//! Provisions a small local multi-container lab for practicing SSH-driven
//! configuration management: one keypair, one Docker network, one hardened
//! SSH node image, and three containers reachable with the generated key.
//!
//! # Usage
//!
//! ```bash
//! # Provision the lab (default when no subcommand is given)
//! sshlab
//! sshlab setup
//!
//! # Show what exists
//! sshlab status
//!
//! # Tear everything down (containers, network, keys)
//! sshlab destroy
//! ```
//!
//! Setup is idempotent: an existing keypair and network are reused with a
//! notice, existing lab containers are replaced so they run the freshly
//! built image. Destroy is idempotent too and is a silent no-op for
//! resources that do not exist.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use sshlab::config::{
    self, LabPaths, IMAGE_TAG, NETWORK_NAME, SSHD_STARTUP_DELAY_SECS,
};
use sshlab::inventory::{self, NodeInfo};
use sshlab::{image, keys, preflight, provision, runtime};

#[derive(Parser)]
#[command(name = "sshlab")]
#[command(author, version, about = "Local multi-container SSH lab provisioner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision the lab: keypair, network, image, containers
    Setup,

    /// Remove the containers, the network, and the keys directory
    Destroy,

    /// Show lab status without touching any resource
    Status,
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        None | Some(Commands::Setup) => cmd_setup(),
        Some(Commands::Destroy) => cmd_destroy(),
        Some(Commands::Status) => cmd_status(),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn base_dir() -> Result<PathBuf> {
    std::env::current_dir().context("cannot determine working directory")
}

fn cmd_setup() -> Result<()> {
    let paths = LabPaths::new(&base_dir()?);

    println!("=== SSH Lab Setup ===\n");

    preflight::ensure_host_tools()?;

    // 1. Keypair (generated once, reused afterwards)
    keys::ensure_keypair(&paths)?;

    // 2. Private network
    runtime::ensure_network(NETWORK_NAME)?;

    // 3. Node image from the generated Dockerfile
    image::write_build_definition(&paths)?;
    image::build_image(&paths)?;

    // 4. Containers, strictly sequential
    for name in config::container_names() {
        if runtime::container_exists(&name)? {
            println!("Replacing existing container {}...", name);
            runtime::remove_container(&name)?;
        }
        println!("Starting {}...", name);
        runtime::run_container(&name, NETWORK_NAME, IMAGE_TAG)?;
        provision::authorize_key(&name, &paths)?;
    }

    // 5. Give sshd a moment to come up before reporting addresses
    println!("\nWaiting {}s for sshd to initialize...", SSHD_STARTUP_DELAY_SECS);
    thread::sleep(Duration::from_secs(SSHD_STARTUP_DELAY_SECS));

    let mut nodes = Vec::new();
    for name in config::container_names() {
        let ip = runtime::container_ip(&name, NETWORK_NAME)?;
        nodes.push(NodeInfo { name, ip });
    }

    inventory::print_report(&paths, &nodes);
    Ok(())
}

fn cmd_destroy() -> Result<()> {
    let paths = LabPaths::new(&base_dir()?);

    println!("=== SSH Lab Teardown ===\n");

    for name in config::container_names() {
        if runtime::container_exists(&name)? {
            println!("Removing container {}", name);
            runtime::remove_container(&name)?;
        }
    }

    if runtime::network_exists(NETWORK_NAME)? {
        println!("Removing network {}", NETWORK_NAME);
        runtime::remove_network(NETWORK_NAME)?;
    }

    keys::destroy_keys(&paths)?;

    println!("\nTeardown complete");
    Ok(())
}

fn cmd_status() -> Result<()> {
    let paths = LabPaths::new(&base_dir()?);

    println!("SSH Lab Status");
    println!("==============");
    println!();

    if paths.private_key.exists() {
        println!("  Keypair:   FOUND at {}", paths.private_key.display());
    } else {
        println!("  Keypair:   NOT FOUND");
    }

    if runtime::network_exists(NETWORK_NAME)? {
        println!("  Network:   {} EXISTS", NETWORK_NAME);
    } else {
        println!("  Network:   {} NOT FOUND", NETWORK_NAME);
    }

    if runtime::image_exists(IMAGE_TAG)? {
        println!("  Image:     {} BUILT", IMAGE_TAG);
    } else {
        println!("  Image:     {} NOT BUILT", IMAGE_TAG);
    }

    println!();
    let mut running = 0;
    for name in config::container_names() {
        if runtime::container_running(&name)? {
            match runtime::container_ip(&name, NETWORK_NAME) {
                Ok(ip) => println!("  {}  RUNNING  {}", name, ip),
                Err(_) => println!("  {}  RUNNING  (no address on {})", name, NETWORK_NAME),
            }
            running += 1;
        } else if runtime::container_exists(&name)? {
            println!("  {}  STOPPED", name);
        } else {
            println!("  {}  NOT FOUND", name);
        }
    }

    println!();
    if running == config::CONTAINER_COUNT {
        println!("Lab is up. Run 'sshlab destroy' to tear it down.");
    } else {
        println!("Lab is not fully up. Run 'sshlab' to provision it.");
    }

    Ok(())
}
