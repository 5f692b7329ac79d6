use tracing::info;

use crate::types::PoolEvent;

/// Observer invoked for every newly accepted event.
///
/// Handlers run synchronously on the scheduler's own context, in
/// registration order: a handler that blocks stalls every later handler and
/// all subsequent ticks. Handlers must not block and must swallow their own
/// failures; there is no error return and no recovery hook.
pub type EventHandler = Box<dyn Fn(&PoolEvent) + Send>;

/// Ordered fan-out of new events to registered handlers.
#[derive(Default)]
pub struct Dispatcher {
    handlers: Vec<EventHandler>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_handler<F>(&mut self, handler: F)
    where
        F: Fn(&PoolEvent) + Send + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn dispatch(&self, event: &PoolEvent) {
        for handler in &self.handlers {
            handler(event);
        }
    }
}

/// A ready-made handler that logs every event at info level.
pub fn logging_handler() -> EventHandler {
    Box::new(|event: &PoolEvent| {
        info!("{}", event.describe());
    })
}
