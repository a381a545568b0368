//! `controller` — emulates the radio medium for the simulation horizon.
//! Reads `topology.txt` from the working directory and takes no other
//! arguments.

use std::path::PathBuf;

use anyhow::Context;

use olsr_mesh_sim::config::SIMULATION_HORIZON_TICKS;
use olsr_mesh_sim::controller::Controller;
use olsr_mesh_sim::topology_file;

fn main() -> anyhow::Result<()> {
    olsr_mesh_sim::logging::init();

    let working_dir = PathBuf::from(".");
    let topology_path = working_dir.join("topology.txt");
    let schedule = topology_file::load_change_events(&topology_path)
        .with_context(|| format!("loading {topology_path:?}"))?;

    let mut controller = Controller::new(working_dir, schedule);
    log::info!("controller: starting a {SIMULATION_HORIZON_TICKS}-tick simulation");
    controller.run().context("controller: mailbox I/O failed")?;
    log::info!("controller: finished");
    println!("controller finished.");
    Ok(())
}
