//! Protocol timing constants and configurable behavior flags.
//!
//! These values are pinned by the protocol design rather than loaded from a
//! file: the simulation horizon and the HELLO/TC cadence are part of the
//! protocol itself, not deployment-time tuning knobs.

/// Number of simulated ticks each process runs before exiting.
pub const SIMULATION_HORIZON_TICKS: u32 = 120;

/// Ticks of sleep at startup before the first tick, letting every process
/// create its mailbox files before anyone reads them.
pub const STARTUP_WARMUP_TICKS: u32 = 1;

/// Emit a HELLO every `HELLO_INTERVAL_TICKS` ticks.
pub const HELLO_INTERVAL_TICKS: u32 = 5;

/// Emit a TC every `TC_INTERVAL_TICKS` ticks, provided there is at least one
/// MPR selector to advertise.
pub const TC_INTERVAL_TICKS: u32 = 10;

/// Ticks a neighbor record survives without a refreshing HELLO.
pub const NEIGHBOR_TIMEOUT_TICKS: i32 = 15;

/// Ticks a TC table entry survives without a refreshing TC.
pub const TC_TIMEOUT_TICKS: i32 = 30;

/// Ticks to wait before retrying a `send_data` whose destination had no
/// route at the scheduled send tick.
pub const DATA_RETRY_INTERVAL_TICKS: u32 = 30;

/// Policy knobs for `NodeAgent`, letting a caller opt out of two behaviors
/// where this implementation deliberately diverges from textbook OLSR.
/// Both default to the behavior `NodeAgent::tick` is built and tested
/// against.
#[derive(Debug, Clone, Copy)]
pub struct NodeAgentConfig {
    /// When `true` (reference behavior), `is_mpr` flags set in prior ticks
    /// are never cleared before a new greedy election pass, so a neighbor
    /// that stops covering anything stays flagged as an MPR until its
    /// record is evicted outright. When `false`, every election pass
    /// starts from a clean slate, which is the textbook OLSR behavior.
    pub sticky_mpr_flags: bool,
    /// When `true` (reference behavior), TC forwarding is gated on whether
    /// the *forwarder* of the received TC is one of this node's MPR
    /// selectors (RFC 3626 behavior). When `false`, forwarding is instead
    /// gated on the *originator* being an MPR selector.
    pub forward_gate_on_forwarder: bool,
}

impl Default for NodeAgentConfig {
    fn default() -> Self {
        Self {
            sticky_mpr_flags: true,
            forward_gate_on_forwarder: true,
        }
    }
}
