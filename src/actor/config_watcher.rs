use std::path::PathBuf;
use std::time::Duration;

use notify::{Config as NotifyConfig, Event, EventKind, PollWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::actor::reactor::{self, Event as ReactorEvent};
use crate::common::config::Config;

/// Reloads the config file when it changes on disk and hands the result to
/// the reactor, which diffs it against the running settings.
pub struct ConfigWatcher {
    file: PathBuf,
    events_tx: reactor::Sender,
}

impl ConfigWatcher {
    pub fn new(file: PathBuf, events_tx: reactor::Sender) -> Self { ConfigWatcher { file, events_tx } }

    pub async fn run(self) -> notify::Result<()> {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<notify::Result<Event>>();

        let mut watcher = PollWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            NotifyConfig::default()
                .with_poll_interval(Duration::from_secs(1))
                .with_compare_contents(true),
        )?;

        watcher.watch(&self.file, RecursiveMode::NonRecursive)?;

        info!("watching {:?}", self.file);

        loop {
            match rx.recv().await {
                Some(Ok(event)) => {
                    if self.is_relevant(&event) {
                        debug!("change detected: {:?}", event.kind);
                        self.request_reload();
                    } else {
                        debug!("ignoring unrelated event: {:?}", event.kind);
                    }
                }
                Some(Err(e)) => {
                    warn!("watch error: {e:?}");
                }
                None => {
                    warn!("channel closed, exiting");
                    break;
                }
            }
        }

        Ok(())
    }

    fn is_relevant(&self, event: &Event) -> bool {
        match event.kind {
            EventKind::Modify(_) | EventKind::Create(_) => event
                .paths
                .iter()
                .any(|p| p == &self.file || p.file_name() == self.file.file_name()),
            _ => false,
        }
    }

    fn request_reload(&self) {
        match Config::read(&self.file) {
            Ok(mut config) => {
                let fixes = config.auto_fix_values();
                if fixes > 0 {
                    warn!(fixes, "config had out-of-range values, corrected");
                }
                info!("config reloaded");
                self.events_tx.send(ReactorEvent::ConfigUpdated(config));
            }
            Err(e) => warn!("config reload failed, keeping current settings: {e:#}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use notify::event::{CreateKind, RemoveKind};

    use super::*;
    use crate::actor;

    fn watcher(path: &str) -> (ConfigWatcher, reactor::Receiver) {
        let (events_tx, events_rx) = actor::channel();
        (ConfigWatcher::new(PathBuf::from(path), events_tx), events_rx)
    }

    #[test]
    fn only_changes_to_the_file_are_relevant() {
        let (w, _rx) = watcher("/tmp/multidock/config.toml");
        let create = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/tmp/multidock/config.toml"));
        assert!(w.is_relevant(&create));

        let other = Event::new(EventKind::Create(CreateKind::File))
            .add_path(PathBuf::from("/tmp/multidock/other.toml"));
        assert!(!w.is_relevant(&other));

        let removed = Event::new(EventKind::Remove(RemoveKind::File))
            .add_path(PathBuf::from("/tmp/multidock/config.toml"));
        assert!(!w.is_relevant(&removed));
    }

    #[test]
    fn reload_sends_the_parsed_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[settings]\nposition = \"left\"\nopacity = 7.0\n").unwrap();

        let (events_tx, mut events_rx) = actor::channel();
        ConfigWatcher::new(path, events_tx).request_reload();

        let (_, event) = events_rx.try_recv().unwrap();
        let ReactorEvent::ConfigUpdated(config) = event else {
            panic!("unexpected event {event:?}");
        };
        assert_eq!(config.settings.position, crate::model::geometry::Position::Left);
        assert_eq!(config.validate(), Vec::<String>::new());
    }

    #[test]
    fn broken_file_sends_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[settings\n").unwrap();

        let (events_tx, mut events_rx) = actor::channel();
        ConfigWatcher::new(path, events_tx).request_reload();
        assert!(events_rx.try_recv().is_err());
    }
}
