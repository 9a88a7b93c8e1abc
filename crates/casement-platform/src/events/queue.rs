use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::types::Event;
use crate::window::WindowHandle;

/// Maximum number of queued events before the oldest is discarded.
const EVENT_QUEUE_DEPTH: usize = 256;

/// Bounded FIFO queue of abstract events.
///
/// One producer (the owner thread), arbitrary consumers. Consumers only ever
/// pop the front, so global and per-window ordering coincide. When the queue
/// is full the oldest event is dropped rather than blocking the producer.
#[derive(Clone)]
pub(crate) struct EventQueue {
    inner: Arc<Mutex<VecDeque<Event>>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(EVENT_QUEUE_DEPTH))),
        }
    }

    /// Producer side. Owner thread only.
    pub fn post(&self, event: Event) {
        let mut queue = self.inner.lock();
        if queue.len() == EVENT_QUEUE_DEPTH {
            let dropped = queue.pop_front();
            log::warn!("event queue full, dropping {dropped:?}");
        }
        queue.push_back(event);
    }

    /// Pops the front event, if any.
    pub fn poll(&self) -> Option<Event> {
        self.inner.lock().pop_front()
    }

    /// Pops the front event only when it targets `window` (or is `Exit`,
    /// which every consumer must observe).
    pub fn poll_window(&self, window: WindowHandle) -> Option<Event> {
        let mut queue = self.inner.lock();
        match queue.front() {
            Some(event) if event.window().is_none_or(|w| w == window) => queue.pop_front(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(idx: u16) -> WindowHandle {
        WindowHandle::new(idx)
    }

    fn size_event(idx: u16, width: u32) -> Event {
        Event::Size {
            window: handle(idx),
            width,
            height: width,
        }
    }

    #[test]
    fn poll_is_fifo() {
        let queue = EventQueue::new();
        queue.post(size_event(0, 10));
        queue.post(size_event(0, 20));

        assert_eq!(queue.poll(), Some(size_event(0, 10)));
        assert_eq!(queue.poll(), Some(size_event(0, 20)));
        assert_eq!(queue.poll(), None);
    }

    #[test]
    fn poll_window_only_matches_front() {
        let queue = EventQueue::new();
        queue.post(size_event(0, 10));
        queue.post(size_event(1, 20));

        // Front targets window 0: window 1 sees nothing, order is preserved.
        assert_eq!(queue.poll_window(handle(1)), None);
        assert_eq!(queue.poll_window(handle(0)), Some(size_event(0, 10)));
        assert_eq!(queue.poll_window(handle(1)), Some(size_event(1, 20)));
    }

    #[test]
    fn poll_window_delivers_exit() {
        let queue = EventQueue::new();
        queue.post(Event::Exit);
        assert_eq!(queue.poll_window(handle(3)), Some(Event::Exit));
    }

    #[test]
    fn full_queue_drops_oldest() {
        let queue = EventQueue::new();
        for i in 0..(EVENT_QUEUE_DEPTH + 1) {
            queue.post(size_event(0, i as u32));
        }

        // The first posted event is gone; the rest survive in order.
        assert_eq!(queue.poll(), Some(size_event(0, 1)));
        let mut last = None;
        while let Some(event) = queue.poll() {
            last = Some(event);
        }
        assert_eq!(last, Some(size_event(0, EVENT_QUEUE_DEPTH as u32)));
    }
}
