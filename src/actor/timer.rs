//! Turns [`ScheduledTask`]s from the reactor into `TimerFired` events after
//! their delay. Cancellation is the reactor's business: a superseded token
//! still fires here and is dropped on arrival.

use tracing::{Instrument, trace};

use crate::actor::reactor::scheduler::ScheduledTask;
use crate::actor::reactor::{self, Event};

pub type Sender = crate::actor::Sender<ScheduledTask>;
pub type Receiver = crate::actor::Receiver<ScheduledTask>;

pub struct Timer {
    tasks: Receiver,
    events_tx: reactor::Sender,
}

impl Timer {
    pub fn new(tasks: Receiver, events_tx: reactor::Sender) -> Self { Timer { tasks, events_tx } }

    pub async fn run(mut self) {
        while let Some((span, task)) = self.tasks.recv().await {
            let events_tx = self.events_tx.clone();
            tokio::spawn(
                async move {
                    tokio::time::sleep(task.delay).await;
                    trace!(token = ?task.token, "timer fired");
                    events_tx.send(Event::TimerFired(task.token));
                }
                .instrument(span),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::actor;
    use crate::actor::reactor::scheduler::{TaskKind, TaskToken};

    #[tokio::test(start_paused = true)]
    async fn fires_after_the_delay() {
        let (task_tx, task_rx) = actor::channel();
        let (events_tx, mut events_rx) = actor::channel();
        tokio::spawn(Timer::new(task_rx, events_tx).run());

        let token = TaskToken { kind: TaskKind::Reconcile, generation: 3 };
        task_tx.send(ScheduledTask { token, delay: Duration::from_millis(100) });

        let (_, event) = events_rx.recv().await.unwrap();
        assert_eq!(event, Event::TimerFired(token));
    }
}
