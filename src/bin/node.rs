//! `node` — runs one OLSR node agent for the simulation horizon.
//!
//! Usage: `node <self_id> <dest_id> [payload delay]`. When `self_id ==
//! dest_id` the node runs as a pure relay with nothing to originate; any
//! other pairing requires a payload and a send-tick delay.

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};

use olsr_mesh_sim::node_agent::NodeAgent;

fn main() -> anyhow::Result<()> {
    olsr_mesh_sim::logging::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 2 {
        bail!("usage: node <self_id> <dest_id> [payload delay]");
    }

    let self_id: u32 = args[0].parse().context("self_id must be a non-negative integer")?;
    let dest_id: u32 = args[1].parse().context("dest_id must be a non-negative integer")?;

    let working_dir = PathBuf::from(".");
    let mut node = NodeAgent::new(self_id, &working_dir);

    if self_id != dest_id {
        if args.len() < 4 {
            bail!("node {self_id} has a destination other than itself and needs a payload and a delay: node <self_id> <dest_id> <payload> <delay>");
        }
        let payload = args[2].clone();
        let delay: u32 = args[3].parse().context("delay must be a non-negative integer")?;
        log::info!("node {self_id}: scheduling DATA to {dest_id} at tick {delay}");
        node.schedule_send(dest_id, payload, delay);
    } else {
        log::info!("node {self_id}: running as a relay, nothing to originate");
    }

    node.run().with_context(|| format!("node {self_id}: mailbox I/O failed"))?;
    Ok(())
}
