//! A discrete-tick OLSR mesh network simulator: one OS process per node plus
//! a controller process emulating the radio medium, communicating through
//! line-oriented mailbox files in a shared working directory.
//!
//! See `config` for the protocol's timing constants, `codec` for the wire
//! format, `node_agent` for the per-node state machine, `controller` for
//! the medium emulator, and `logging` for the shared logger setup used by
//! both binaries.

pub mod codec;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod mailbox;
pub mod neighbor;
pub mod node_agent;
pub mod routing;
pub mod tc_table;
pub mod topology_file;
