//! Frame lifecycle notifications.
//!
//! Handlers receive a shared reference to the event and nothing else, so a
//! handler cannot start a new frame while one is being drawn.

/// A lifecycle notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderEvent {
    /// Emitted at the start of a frame, before anything is drawn.
    BeforeRender {
        /// Simulation timestamp in milliseconds.
        timestamp: f64,
    },
    /// Emitted once the overlay pass completed.
    AfterRender {
        /// Simulation timestamp in milliseconds.
        timestamp: f64,
    },
}

impl RenderEvent {
    /// The event's kind.
    pub fn kind(&self) -> EventKind {
        match self {
            RenderEvent::BeforeRender { .. } => EventKind::BeforeRender,
            RenderEvent::AfterRender { .. } => EventKind::AfterRender,
        }
    }

    /// The frame timestamp carried by the event.
    pub fn timestamp(&self) -> f64 {
        match *self {
            RenderEvent::BeforeRender { timestamp } | RenderEvent::AfterRender { timestamp } => timestamp,
        }
    }
}

/// Discriminant of [`RenderEvent`], used to subscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// See [`RenderEvent::BeforeRender`].
    BeforeRender,
    /// See [`RenderEvent::AfterRender`].
    AfterRender,
}

/// Token returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn FnMut(&RenderEvent)>;

/// Ordered list of lifecycle handlers.
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<(SubscriptionId, EventKind, Handler)>,
    next_id: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl EventBus {
    /// A bus with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events of `kind`. Handlers run in
    /// registration order.
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&RenderEvent) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, kind, Box::new(handler)));
        id
    }

    /// Remove a handler. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sid, _, _)| *sid != id);
        self.handlers.len() != before
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Deliver `event` to every handler subscribed to its kind.
    pub fn emit(&mut self, event: &RenderEvent) {
        let kind = event.kind();
        for (_, k, handler) in &mut self.handlers {
            if *k == kind {
                handler(event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn handlers_see_only_their_kind() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        let sink = Rc::clone(&seen);
        bus.subscribe(EventKind::AfterRender, move |e| sink.borrow_mut().push(e.timestamp()));

        bus.emit(&RenderEvent::BeforeRender { timestamp: 1.0 });
        bus.emit(&RenderEvent::AfterRender { timestamp: 2.0 });
        assert_eq!(*seen.borrow(), vec![2.0]);
    }

    #[test]
    fn unsubscribe_removes_handler() {
        let mut bus = EventBus::new();
        let id = bus.subscribe(EventKind::BeforeRender, |_| {});
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert!(bus.is_empty());
    }
}
