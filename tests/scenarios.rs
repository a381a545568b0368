//! End-to-end scenarios driving `NodeAgent`/`Controller` directly against a
//! shared temporary working directory. These run every participant's tick
//! in lockstep rather than as spawned processes with real sleeps, trading
//! wall-clock realism for a fast, deterministic test.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use olsr_mesh_sim::controller::{ChangeEvent, Controller, Operation};
use olsr_mesh_sim::neighbor::NeighborStatus;
use olsr_mesh_sim::node_agent::NodeAgent;

fn schedule(events: &[(u32, u32, u32, Operation)]) -> BTreeMap<u32, Vec<ChangeEvent>> {
    let mut map: BTreeMap<u32, Vec<ChangeEvent>> = BTreeMap::new();
    for &(tick, source, destination, operation) in events {
        map.entry(tick).or_default().push(ChangeEvent {
            operation,
            source,
            destination,
        });
    }
    map
}

/// Run `ticks` rounds with every node's tick `t` followed by the
/// controller's tick `t`, after an initial controller tick 0 that applies
/// any topology events scheduled before the simulation proper starts.
fn run_horizon(nodes: &mut [NodeAgent], controller: &mut Controller, ticks: u32) -> io::Result<()> {
    controller.tick(0)?;
    for t in 1..=ticks {
        for node in nodes.iter_mut() {
            node.tick(t)?;
        }
        controller.tick(t)?;
    }
    Ok(())
}

fn received_contains(path: &Path, needle: &str) -> bool {
    std::fs::read_to_string(path)
        .map(|content| content.lines().any(|line| line.contains(needle)))
        .unwrap_or(false)
}

fn bidirectional(tick: u32, a: u32, b: u32) -> [(u32, u32, u32, Operation); 2] {
    [(tick, a, b, Operation::Up), (tick, b, a, Operation::Up)]
}

#[test]
fn s1_two_node_direct_delivery() {
    let dir = tempfile::tempdir().unwrap();
    let sched = schedule(&bidirectional(0, 1, 2));
    let mut controller = Controller::new(dir.path(), sched);

    let mut node1 = NodeAgent::new(1, dir.path());
    let node2 = NodeAgent::new(2, dir.path());
    node1.schedule_send(2, "hi".to_string(), 30);
    let mut nodes = vec![node1, node2];

    run_horizon(&mut nodes, &mut controller, 60).unwrap();

    assert!(received_contains(nodes[1].received_log_path(), "DATA 1 2 hi"));
    assert_eq!(
        nodes[0].neighbors().get(2).map(|record| record.status),
        Some(NeighborStatus::Symmetric)
    );
    assert_eq!(
        nodes[1].neighbors().get(1).map(|record| record.status),
        Some(NeighborStatus::Symmetric)
    );
}

#[test]
fn s2_three_hop_chain_routes_and_delivers() {
    let dir = tempfile::tempdir().unwrap();
    let mut events = Vec::new();
    events.extend(bidirectional(0, 1, 2));
    events.extend(bidirectional(0, 2, 3));
    events.extend(bidirectional(0, 3, 4));
    let sched = schedule(&events);
    let mut controller = Controller::new(dir.path(), sched);

    let mut node1 = NodeAgent::new(1, dir.path());
    node1.schedule_send(4, "hi".to_string(), 60);
    let mut nodes = vec![
        node1,
        NodeAgent::new(2, dir.path()),
        NodeAgent::new(3, dir.path()),
        NodeAgent::new(4, dir.path()),
    ];

    run_horizon(&mut nodes, &mut controller, 150).unwrap();

    assert_eq!(nodes[0].routing_table().first_hop(4), Some(2));
    assert!(received_contains(nodes[3].received_log_path(), "DATA 1 4 hi"));
}

#[test]
fn s3_unidirectional_link_never_becomes_symmetric() {
    let dir = tempfile::tempdir().unwrap();
    let sched = schedule(&[(0, 1, 2, Operation::Up)]);
    let mut controller = Controller::new(dir.path(), sched);

    let mut node1 = NodeAgent::new(1, dir.path());
    node1.schedule_send(2, "never".to_string(), 10);
    let mut nodes = vec![node1, NodeAgent::new(2, dir.path())];

    run_horizon(&mut nodes, &mut controller, 120).unwrap();

    assert!(nodes[0].neighbors().get(2).is_none());
    assert!(nodes[0].routing_table().is_empty());
    assert!(!received_contains(nodes[1].received_log_path(), "never"));
    let outbox1 = std::fs::read_to_string(nodes[0].outbox_path()).unwrap_or_default();
    assert!(!outbox1.contains("DATA"));
}

#[test]
fn s4_link_failure_leaves_destination_unreachable() {
    let dir = tempfile::tempdir().unwrap();
    let mut events = Vec::new();
    events.extend(bidirectional(0, 1, 2));
    events.extend(bidirectional(0, 2, 3));
    events.push((30, 2, 3, Operation::Down));
    events.push((30, 3, 2, Operation::Down));
    let sched = schedule(&events);
    let mut controller = Controller::new(dir.path(), sched);

    let mut node1 = NodeAgent::new(1, dir.path());
    node1.schedule_send(3, "unreachable".to_string(), 60);
    let mut nodes = vec![node1, NodeAgent::new(2, dir.path()), NodeAgent::new(3, dir.path())];

    run_horizon(&mut nodes, &mut controller, 120).unwrap();

    assert!(!received_contains(nodes[2].received_log_path(), "unreachable"));
    assert_eq!(nodes[0].routing_table().first_hop(3), None);
}

#[test]
fn s5_mpr_flooding_reaches_beyond_two_hops() {
    let dir = tempfile::tempdir().unwrap();
    let mut events = Vec::new();
    events.extend(bidirectional(0, 1, 2));
    events.extend(bidirectional(0, 2, 3));
    events.extend(bidirectional(0, 3, 4));
    events.extend(bidirectional(0, 4, 5));
    let sched = schedule(&events);
    let mut controller = Controller::new(dir.path(), sched);

    let mut node1 = NodeAgent::new(1, dir.path());
    node1.schedule_send(5, "far".to_string(), 90);
    let mut nodes = vec![
        node1,
        NodeAgent::new(2, dir.path()),
        NodeAgent::new(3, dir.path()),
        NodeAgent::new(4, dir.path()),
        NodeAgent::new(5, dir.path()),
    ];

    run_horizon(&mut nodes, &mut controller, 150).unwrap();

    assert_eq!(nodes[0].routing_table().first_hop(5), Some(2));
    assert!(received_contains(nodes[4].received_log_path(), "DATA 1 5 far"));
}

#[test]
fn s6_duplicate_tc_installs_and_forwards_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let mut node = NodeAgent::new(2, dir.path());
    let inbox = olsr_mesh_sim::mailbox::LineAppender::new(dir.path().join("to2"));

    // Tick 1: node 3 declares node 2 as one of its MPRs.
    inbox.append_line("* 3 HELLO UNIDIR BIDIR MPR 2").unwrap();
    node.tick(1).unwrap();
    assert!(node.neighbors().is_mpr_selector(3));

    // Tick 2: the same TC arrives twice in one batch.
    inbox.append_line("* 3 TC 3 5 MS 9").unwrap();
    inbox.append_line("* 3 TC 3 5 MS 9").unwrap();
    node.tick(2).unwrap();

    assert_eq!(node.tc_table().get(3).unwrap().sequence, 5);
    let outbox = std::fs::read_to_string(node.outbox_path()).unwrap();
    let tc_lines: Vec<&str> = outbox.lines().filter(|line| line.contains("TC")).collect();
    assert_eq!(tc_lines.len(), 1);
}
