//! Loader for the controller's `topology.txt` schedule file.
//!
//! Format, one event per line: `<tick> <UP|DOWN> <source> <destination>`.
//! Blank lines are skipped; anything else malformed is a hard error, since
//! (unlike a dropped protocol line on the wire) a broken topology file means
//! the whole run's premise is wrong and there is no sensible way to continue.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context};

use crate::controller::{ChangeEvent, Operation};

pub fn load_change_events(path: &Path) -> anyhow::Result<BTreeMap<u32, Vec<ChangeEvent>>> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading topology file {path:?}"))?;

    let mut schedule: BTreeMap<u32, Vec<ChangeEvent>> = BTreeMap::new();
    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let event = parse_line(line).with_context(|| format!("{path:?}:{}: {line:?}", line_no + 1))?;
        schedule.entry(event.0).or_default().push(event.1);
    }
    Ok(schedule)
}

fn parse_line(line: &str) -> anyhow::Result<(u32, ChangeEvent)> {
    let mut fields = line.split_whitespace();

    let tick: u32 = fields
        .next()
        .context("missing tick column")?
        .parse()
        .context("tick is not an integer")?;

    let operation = match fields.next().context("missing UP/DOWN column")? {
        "UP" => Operation::Up,
        "DOWN" => Operation::Down,
        other => bail!("unknown operation {other:?}, expected UP or DOWN"),
    };

    let source: u32 = fields
        .next()
        .context("missing source column")?
        .parse()
        .context("source is not an integer")?;
    let destination: u32 = fields
        .next()
        .context("missing destination column")?
        .parse()
        .context("destination is not an integer")?;

    Ok((
        tick,
        ChangeEvent {
            operation,
            source,
            destination,
        },
    ))
}
