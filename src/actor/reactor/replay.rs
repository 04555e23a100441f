use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::iter;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::scheduler::TaskToken;
use super::{Event, Reactor};
use crate::actor::broadcast::{BroadcastReceiver, DockSignal};
use crate::actor::{self, timer};
use crate::common::config::Config;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RecordLine {
    Start { config: Config },
    Event { at_ms: u64, event: Event },
}

/// Writes every event the reactor handles to a file, one RON value per line.
/// Timer firings are left out; a replay regenerates them.
pub struct Record {
    file: Option<BufWriter<File>>,
    start: Instant,
}

impl Record {
    pub fn new(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => Some(BufWriter::new(
                File::create(path).with_context(|| format!("creating record file {path:?}"))?,
            )),
            None => None,
        };
        Ok(Record { file, start: Instant::now() })
    }

    pub fn disabled() -> Self { Record { file: None, start: Instant::now() } }

    pub fn start(&mut self, config: &Config) {
        self.start = Instant::now();
        self.write(&RecordLine::Start { config: config.clone() });
    }

    pub fn on_event(&mut self, event: &Event) {
        if self.file.is_none() || matches!(event, Event::TimerFired(_)) {
            return;
        }
        let at_ms = self.start.elapsed().as_millis() as u64;
        self.write(&RecordLine::Event { at_ms, event: event.clone() });
    }

    fn write(&mut self, line: &RecordLine) {
        let Some(file) = self.file.as_mut() else {
            return;
        };
        let result = ron::to_string(line).map_err(anyhow::Error::from).and_then(|text| {
            writeln!(file, "{text}")?;
            file.flush()?;
            Ok(())
        });
        if let Err(e) = result {
            warn!("recording stopped: {e:#}");
            self.file = None;
        }
    }
}

/// Drives a reactor on virtual time. Timers are collected instead of slept
/// on and fire when the clock is advanced past them.
pub struct Simulation {
    reactor: Reactor,
    signals: BroadcastReceiver,
    tasks: timer::Receiver,
    pending: Vec<(Duration, TaskToken)>,
    now: Duration,
}

impl Simulation {
    pub fn new(config: Config) -> Self {
        let (signal_tx, signals) = actor::channel();
        let (timer_tx, tasks) = actor::channel();
        Simulation {
            reactor: Reactor::new(config, Record::disabled(), signal_tx, timer_tx),
            signals,
            tasks,
            pending: Vec::new(),
            now: Duration::ZERO,
        }
    }

    pub fn now(&self) -> Duration { self.now }

    #[cfg(test)]
    pub(super) fn reactor(&self) -> &Reactor { &self.reactor }

    fn collect_tasks(&mut self) {
        while let Ok((_, task)) = self.tasks.try_recv() {
            self.pending.push((self.now + task.delay, task.token));
        }
    }

    pub fn dispatch(&mut self, event: Event) {
        self.collect_tasks();
        self.reactor.handle_event(event);
        self.collect_tasks();
    }

    /// Fires every timer due at or before `target`, in deadline order.
    pub fn advance_to(&mut self, target: Duration) {
        loop {
            self.collect_tasks();
            let mut next: Option<(usize, Duration)> = None;
            for (idx, (due, _)) in self.pending.iter().enumerate() {
                if *due <= target && next.is_none_or(|(_, best)| *due < best) {
                    next = Some((idx, *due));
                }
            }
            let Some((idx, due)) = next else {
                break;
            };
            let (_, token) = self.pending.remove(idx);
            self.now = self.now.max(due);
            self.reactor.handle_event(Event::TimerFired(token));
        }
        self.now = self.now.max(target);
    }

    pub fn advance_by(&mut self, delta: Duration) { self.advance_to(self.now + delta) }

    /// Stops the session the way a live reactor does at shutdown.
    pub fn finish(&mut self) {
        self.collect_tasks();
        self.reactor.finish();
        self.pending.clear();
    }

    pub fn take_signals(&mut self) -> Vec<DockSignal> {
        iter::from_fn(|| self.signals.try_recv().ok().map(|(_, signal)| signal)).collect()
    }
}

/// Feeds a recording back through a fresh reactor, handing every signal it
/// publishes to `on_signal`.
pub fn replay(path: &Path, mut on_signal: impl FnMut(DockSignal)) -> anyhow::Result<()> {
    let file = File::open(path).with_context(|| format!("opening record file {path:?}"))?;
    let mut lines = BufReader::new(file).lines();

    let first = lines.next().context("record file is empty")??;
    let RecordLine::Start { config } =
        ron::from_str::<RecordLine>(&first).context("parsing the record header")?
    else {
        anyhow::bail!("record file does not start with a config");
    };

    let mut sim = Simulation::new(config);
    for (number, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: RecordLine =
            ron::from_str(&line).with_context(|| format!("parsing record line {}", number + 2))?;
        let RecordLine::Event { at_ms, event } = entry else {
            anyhow::bail!("unexpected second header at line {}", number + 2);
        };
        sim.advance_to(Duration::from_millis(at_ms));
        sim.dispatch(event);
        sim.take_signals().into_iter().for_each(&mut on_signal);
    }

    sim.finish();
    sim.take_signals().into_iter().for_each(&mut on_signal);
    debug!(elapsed = ?sim.now(), "replay finished");
    Ok(())
}
