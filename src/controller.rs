//! The radio-medium emulator: applies scheduled link up/down events and fans
//! new outbox lines out to live neighbors.
//!
//! The controller never special-cases unicast DATA lines by writing straight
//! to the destination's inbox; it always fans a line out to every live
//! physical neighbor of its source and leaves next-hop filtering to the
//! receiving node. This keeps the medium emulator payload-blind: it models
//! physical reachability only, and unicast vs. flood semantics are a
//! receive-side concern.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crate::config::{SIMULATION_HORIZON_TICKS, STARTUP_WARMUP_TICKS};
use crate::mailbox::{LineAppender, LineTailReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub operation: Operation,
    pub source: u32,
    pub destination: u32,
}

/// The controller process's view of the physical topology and of every
/// node's outbox cursor.
pub struct Controller {
    schedule: BTreeMap<u32, Vec<ChangeEvent>>,
    topology: HashMap<u32, HashSet<u32>>,
    outbox_readers: HashMap<u32, LineTailReader>,
    working_dir: PathBuf,
}

impl Controller {
    pub fn new(working_dir: impl Into<PathBuf>, schedule: BTreeMap<u32, Vec<ChangeEvent>>) -> Self {
        Self {
            schedule,
            topology: HashMap::new(),
            outbox_readers: HashMap::new(),
            working_dir: working_dir.into(),
        }
    }

    pub fn topology_snapshot(&self) -> &HashMap<u32, HashSet<u32>> {
        &self.topology
    }

    /// Run the full simulation horizon with real 1-tick sleeps, as the
    /// `controller` binary does. Tick 0 is a pre-tick setup pass: any
    /// topology events scheduled for it apply before node tick 1 ever runs,
    /// so an `UP` "at tick 0" in `topology.txt` is live from the first real
    /// tick rather than arriving a tick late.
    pub fn run(&mut self) -> io::Result<()> {
        thread::sleep(Duration::from_secs(STARTUP_WARMUP_TICKS as u64));
        self.tick(0)?;
        for tick_index in 1..=SIMULATION_HORIZON_TICKS {
            thread::sleep(Duration::from_secs(1));
            self.tick(tick_index)?;
        }
        Ok(())
    }

    /// Apply tick `tick_index`'s scheduled topology changes, then fan out
    /// every source's newly written outbox lines to its live neighbors.
    pub fn tick(&mut self, tick_index: u32) -> io::Result<()> {
        self.apply_schedule(tick_index);
        self.fan_out()
    }

    fn apply_schedule(&mut self, tick_index: u32) {
        let Some(events) = self.schedule.get(&tick_index) else {
            return;
        };
        for event in events {
            let neighbors = self.topology.entry(event.source).or_default();
            match event.operation {
                Operation::Up => {
                    if neighbors.insert(event.destination) {
                        log::info!("tick {tick_index}: link {} -> {} up", event.source, event.destination);
                    }
                }
                Operation::Down => {
                    // DOWN on an edge that isn't currently up is a no-op:
                    // set removal, not an error.
                    if neighbors.remove(&event.destination) {
                        log::info!("tick {tick_index}: link {} -> {} down", event.source, event.destination);
                    }
                }
            }
        }
    }

    fn fan_out(&mut self) -> io::Result<()> {
        let sources: Vec<u32> = self.topology.keys().copied().collect();
        for source in sources {
            let neighbors = self.topology.get(&source).cloned().unwrap_or_default();
            let reader = self
                .outbox_readers
                .entry(source)
                .or_insert_with(|| LineTailReader::new(self.working_dir.join(format!("from{source}"))));
            let new_lines = reader.read_new_lines()?;
            if new_lines.is_empty() || neighbors.is_empty() {
                continue;
            }
            log::debug!(
                "source {source}: fanning {} line(s) out to {} neighbor(s)",
                new_lines.len(),
                neighbors.len()
            );
            for neighbor in &neighbors {
                let inbox = LineAppender::new(self.working_dir.join(format!("to{neighbor}")));
                for line in &new_lines {
                    inbox.append_line(line)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller_in(dir: &std::path::Path, events: Vec<(u32, ChangeEvent)>) -> Controller {
        let mut schedule: BTreeMap<u32, Vec<ChangeEvent>> = BTreeMap::new();
        for (tick, event) in events {
            schedule.entry(tick).or_default().push(event);
        }
        Controller::new(dir, schedule)
    }

    #[test]
    fn up_event_enables_fan_out_between_neighbors() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = controller_in(
            dir.path(),
            vec![(
                1,
                ChangeEvent {
                    operation: Operation::Up,
                    source: 1,
                    destination: 2,
                },
            )],
        );
        LineAppender::new(dir.path().join("from1")).append_line("hello line").unwrap();
        controller.tick(1).unwrap();

        let mut reader = LineTailReader::new(dir.path().join("to2"));
        assert_eq!(reader.read_new_lines().unwrap(), vec!["hello line".to_string()]);
    }

    #[test]
    fn down_event_on_absent_edge_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = controller_in(
            dir.path(),
            vec![(
                1,
                ChangeEvent {
                    operation: Operation::Down,
                    source: 1,
                    destination: 2,
                },
            )],
        );
        controller.tick(1).unwrap();
        assert!(controller.topology_snapshot().get(&1).is_none_or(|s| s.is_empty()));
    }

    #[test]
    fn down_event_stops_fan_out() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = controller_in(
            dir.path(),
            vec![
                (
                    1,
                    ChangeEvent {
                        operation: Operation::Up,
                        source: 1,
                        destination: 2,
                    },
                ),
                (
                    3,
                    ChangeEvent {
                        operation: Operation::Down,
                        source: 1,
                        destination: 2,
                    },
                ),
            ],
        );
        let outbox = LineAppender::new(dir.path().join("from1"));
        outbox.append_line("before").unwrap();
        controller.tick(1).unwrap();
        controller.tick(2).unwrap();
        outbox.append_line("after").unwrap();
        controller.tick(3).unwrap();

        let mut reader = LineTailReader::new(dir.path().join("to2"));
        assert_eq!(reader.read_new_lines().unwrap(), vec!["before".to_string()]);
    }

    #[test]
    fn backlog_written_before_first_activation_flushes_on_activation() {
        // A source's outbox cursor is only created the first time it becomes
        // a topology key, starting from offset zero, so every line already
        // sitting in `fromN` at that tick is forwarded in one shot, not
        // skipped.
        let dir = tempfile::tempdir().unwrap();
        let mut controller = controller_in(
            dir.path(),
            vec![(
                2,
                ChangeEvent {
                    operation: Operation::Up,
                    source: 1,
                    destination: 2,
                },
            )],
        );
        // Node 1 has no neighbors yet at tick 1; the line sits unread until
        // the UP event at tick 2 creates both the topology entry and the
        // outbox reader in the same tick.
        LineAppender::new(dir.path().join("from1")).append_line("backlogged").unwrap();
        controller.tick(1).unwrap();
        controller.tick(2).unwrap();

        let mut reader = LineTailReader::new(dir.path().join("to2"));
        assert_eq!(reader.read_new_lines().unwrap(), vec!["backlogged".to_string()]);
    }
}
