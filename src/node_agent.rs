//! Per-node OLSR state machine and tick loop.
//!
//! One method per message kind, with a single dispatch point per tick:
//! DATA is processed before TC, and TC before HELLO, so that MPR election
//! always runs against the freshest two-hop view gathered this tick.

use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::codec::{Message, NextHop};
use crate::config::{
    NodeAgentConfig, DATA_RETRY_INTERVAL_TICKS, HELLO_INTERVAL_TICKS, SIMULATION_HORIZON_TICKS,
    STARTUP_WARMUP_TICKS, TC_INTERVAL_TICKS,
};
use crate::mailbox::{LineAppender, LineTailReader};
use crate::neighbor::NeighborTable;
use crate::routing::{compute_routing_table, RoutingTable};
use crate::tc_table::TcTable;

struct PendingSend {
    destination: u32,
    payload: String,
    next_attempt_tick: u32,
}

/// One OLSR node's protocol state plus its mailbox I/O.
pub struct NodeAgent {
    self_id: u32,
    config: NodeAgentConfig,
    neighbors: NeighborTable,
    tc_table: TcTable,
    routing_table: RoutingTable,
    local_tc_sequence: u32,
    pending_send: Option<PendingSend>,
    inbox: LineTailReader,
    outbox: LineAppender,
    received_log: LineAppender,
}

impl NodeAgent {
    pub fn new(self_id: u32, working_dir: &Path) -> Self {
        Self::with_config(self_id, working_dir, NodeAgentConfig::default())
    }

    pub fn with_config(self_id: u32, working_dir: &Path, config: NodeAgentConfig) -> Self {
        Self {
            self_id,
            config,
            neighbors: NeighborTable::new(),
            tc_table: TcTable::new(),
            routing_table: RoutingTable::default(),
            local_tc_sequence: 0,
            pending_send: None,
            inbox: LineTailReader::new(working_dir.join(format!("to{self_id}"))),
            outbox: LineAppender::new(working_dir.join(format!("from{self_id}"))),
            received_log: LineAppender::new(working_dir.join(format!("received{self_id}"))),
        }
    }

    /// Schedule a DATA send for `destination` at tick `send_tick`. A node
    /// with nothing to originate never calls this and runs as a pure relay.
    pub fn schedule_send(&mut self, destination: u32, payload: String, send_tick: u32) {
        self.pending_send = Some(PendingSend {
            destination,
            payload,
            next_attempt_tick: send_tick,
        });
    }

    pub fn routing_table(&self) -> &RoutingTable {
        &self.routing_table
    }

    pub fn neighbors(&self) -> &NeighborTable {
        &self.neighbors
    }

    pub fn tc_table(&self) -> &TcTable {
        &self.tc_table
    }

    pub fn received_log_path(&self) -> &Path {
        self.received_log.path()
    }

    pub fn outbox_path(&self) -> &Path {
        self.outbox.path()
    }

    /// Run the full simulation horizon with real 1-tick sleeps, as the
    /// `node` binary does.
    pub fn run(&mut self) -> io::Result<()> {
        log::info!(
            "node {}: starting a {SIMULATION_HORIZON_TICKS}-tick simulation",
            self.self_id
        );
        self.outbox.touch()?;
        thread::sleep(Duration::from_secs(STARTUP_WARMUP_TICKS as u64));
        for tick_index in 1..=SIMULATION_HORIZON_TICKS {
            self.tick(tick_index)?;
            thread::sleep(Duration::from_secs(1));
        }
        log::info!("node {}: finished", self.self_id);
        Ok(())
    }

    /// Execute tick `tick_index`'s protocol schedule. Separated from `run`
    /// so tests can drive many ticks without sleeping.
    pub fn tick(&mut self, tick_index: u32) -> io::Result<()> {
        let raw_lines = self.inbox.read_new_lines()?;
        let (hellos, tcs, datas) = self.filter_and_partition(&raw_lines);

        let mut topology_changed = false;

        for data in datas {
            self.handle_data(data)?;
        }
        for tc in tcs {
            if self.handle_tc(tc)? {
                topology_changed = true;
            }
        }
        for hello in &hellos {
            if self.handle_hello(hello) {
                topology_changed = true;
            }
        }
        if !hellos.is_empty() {
            let mprs_before: std::collections::HashSet<u32> = self.neighbors.mpr_ids().into_iter().collect();
            self.neighbors.elect_mprs(self.config.sticky_mpr_flags);
            let mprs_after: std::collections::HashSet<u32> = self.neighbors.mpr_ids().into_iter().collect();
            if mprs_after != mprs_before {
                log::debug!(
                    "node {}: tick {tick_index}: MPR set changed {:?} -> {:?}",
                    self.self_id,
                    mprs_before,
                    mprs_after
                );
            }
        }

        if self
            .pending_send
            .as_ref()
            .is_some_and(|pending| pending.next_attempt_tick == tick_index)
        {
            self.attempt_pending_send(tick_index)?;
        }

        if tick_index % HELLO_INTERVAL_TICKS == 0 {
            self.emit_hello()?;
        }
        if tick_index % TC_INTERVAL_TICKS == 0 && !self.neighbors.mpr_selector_ids().is_empty() {
            self.emit_tc()?;
        }

        if self.tc_table.tick_timers() {
            log::debug!("node {}: tick {tick_index}: a TC entry expired", self.self_id);
            topology_changed = true;
        }
        if self.neighbors.tick_timers() {
            log::debug!("node {}: tick {tick_index}: a neighbor record expired", self.self_id);
            topology_changed = true;
        }

        if topology_changed {
            self.routing_table = compute_routing_table(self.self_id, &self.neighbors, &self.tc_table);
            log::debug!(
                "node {}: tick {tick_index}: routing table recomputed, {} destination(s) reachable",
                self.self_id,
                self.routing_table.len()
            );
        }

        Ok(())
    }

    fn filter_and_partition(&self, raw_lines: &[String]) -> (Vec<Message>, Vec<Message>, Vec<Message>) {
        let mut hellos = Vec::new();
        let mut tcs = Vec::new();
        let mut datas = Vec::new();

        for line in raw_lines {
            let message = match Message::parse(line) {
                Ok(message) => message,
                Err(err) => {
                    log::debug!("node {}: dropping malformed line {line:?}: {err}", self.self_id);
                    continue;
                }
            };
            if !message.next_hop().accepts(self.self_id) {
                continue;
            }
            match message {
                Message::Hello { .. } => hellos.push(message),
                Message::Tc { .. } => tcs.push(message),
                Message::Data { .. } => datas.push(message),
            }
        }

        (hellos, tcs, datas)
    }

    fn handle_hello(&mut self, hello: &Message) -> bool {
        match hello {
            Message::Hello {
                forwarder: sender,
                unidirectional,
                bidirectional,
                mpr,
            } => {
                let was_symmetric = self
                    .neighbors
                    .get(*sender)
                    .is_some_and(|record| record.status == crate::neighbor::NeighborStatus::Symmetric);
                let changed = self
                    .neighbors
                    .process_hello(self.self_id, *sender, unidirectional, bidirectional, mpr);
                let is_symmetric = self
                    .neighbors
                    .get(*sender)
                    .is_some_and(|record| record.status == crate::neighbor::NeighborStatus::Symmetric);
                if !was_symmetric && is_symmetric {
                    log::debug!("node {}: neighbor {sender} is now symmetric", self.self_id);
                }
                changed
            }
            _ => false,
        }
    }

    fn handle_tc(&mut self, tc: Message) -> io::Result<bool> {
        let (forwarder, originator, sequence, mpr_selectors) = match &tc {
            Message::Tc {
                forwarder,
                originator,
                sequence,
                mpr_selectors,
            } => (*forwarder, *originator, *sequence, mpr_selectors.clone()),
            _ => return Ok(false),
        };

        let installed = self.tc_table.process_tc(self.self_id, originator, sequence, &mpr_selectors);

        let gate_id = if self.config.forward_gate_on_forwarder {
            forwarder
        } else {
            originator
        };
        if installed && self.neighbors.is_mpr_selector(gate_id) {
            let mut forwarded = tc;
            forwarded.set_forwarder(self.self_id);
            self.outbox.append_line(&forwarded.to_string())?;
        }

        Ok(installed)
    }

    fn handle_data(&mut self, data: Message) -> io::Result<()> {
        let (destination, source) = match &data {
            Message::Data { destination, source, .. } => (*destination, *source),
            _ => return Ok(()),
        };

        if destination == self.self_id {
            log::info!("node {}: received DATA from {source}", self.self_id);
            self.received_log.append_line(&data.to_string())?;
            return Ok(());
        }

        if let Some(next_hop_id) = self.routing_table.first_hop(destination) {
            let mut forwarded = data;
            forwarded.set_next_hop(NextHop::Unicast(next_hop_id));
            forwarded.set_forwarder(self.self_id);
            self.outbox.append_line(&forwarded.to_string())?;
        } else {
            log::debug!("node {}: no route to {destination}, dropping DATA", self.self_id);
        }

        Ok(())
    }

    fn emit_hello(&mut self) -> io::Result<()> {
        let message = Message::Hello {
            forwarder: self.self_id,
            unidirectional: self.neighbors.asymmetric_ids(),
            bidirectional: self.neighbors.symmetric_ids(),
            mpr: self.neighbors.mpr_ids(),
        };
        log::debug!("node {}: emitting HELLO", self.self_id);
        self.outbox.append_line(&message.to_string())
    }

    fn emit_tc(&mut self) -> io::Result<()> {
        self.local_tc_sequence += 1;
        let message = Message::Tc {
            forwarder: self.self_id,
            originator: self.self_id,
            sequence: self.local_tc_sequence,
            mpr_selectors: self.neighbors.mpr_selector_ids(),
        };
        log::debug!("node {}: emitting TC seq {}", self.self_id, self.local_tc_sequence);
        self.outbox.append_line(&message.to_string())
    }

    fn attempt_pending_send(&mut self, tick_index: u32) -> io::Result<()> {
        let Some(pending) = self.pending_send.take() else {
            return Ok(());
        };

        match self.routing_table.first_hop(pending.destination) {
            Some(next_hop_id) => {
                let message = Message::Data {
                    next_hop: NextHop::Unicast(next_hop_id),
                    forwarder: self.self_id,
                    source: self.self_id,
                    destination: pending.destination,
                    payload: pending.payload,
                };
                log::info!("node {}: sending DATA to {}", self.self_id, pending.destination);
                self.outbox.append_line(&message.to_string())?;
            }
            None => {
                log::debug!(
                    "node {}: no route to {}, retrying at tick {}",
                    self.self_id,
                    pending.destination,
                    tick_index + DATA_RETRY_INTERVAL_TICKS
                );
                self.pending_send = Some(PendingSend {
                    next_attempt_tick: tick_index + DATA_RETRY_INTERVAL_TICKS,
                    ..pending
                });
            }
        }

        Ok(())
    }
}
