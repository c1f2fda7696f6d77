use crate::error::ObserverError;
use crate::paginator::PageSize;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, warn};

/// A non-empty text selection and where in the book it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEvent {
    pub text: String,
    pub page: usize,
    pub absolute_line: usize,
}

pub trait SelectionObserver {
    fn name(&self) -> &str;

    fn on_text_selected(&mut self, event: &SelectionEvent) -> Result<(), ObserverError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

#[derive(Debug)]
pub struct ObserverFailure {
    pub observer: String,
    pub error: ObserverError,
}

/// Outcome of one selection fan-out.
#[derive(Debug, Default)]
pub struct FanOut {
    pub event: Option<SelectionEvent>,
    pub notified: usize,
    pub failures: Vec<ObserverFailure>,
}

impl FanOut {
    pub fn is_noop(&self) -> bool {
        self.event.is_none()
    }
}

/// Publishes text selections to registered observers in registration order.
pub struct SelectionNotifier {
    page_size: PageSize,
    observers: Vec<(ObserverId, Box<dyn SelectionObserver>)>,
    next_id: u64,
}

impl SelectionNotifier {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page_size,
            observers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn register(&mut self, observer: Box<dyn SelectionObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        debug!("Registering selection observer {}", observer.name());
        self.observers.push((id, observer));
        id
    }

    pub fn unregister(&mut self, id: ObserverId) -> Option<Box<dyn SelectionObserver>> {
        let pos = self.observers.iter().position(|(oid, _)| *oid == id)?;
        let (_, observer) = self.observers.remove(pos);
        debug!("Unregistered selection observer {}", observer.name());
        Some(observer)
    }

    /// Swaps the observer behind `id` without changing its place in the order.
    /// Returns the previous observer, or gives `observer` back if `id` is unknown.
    pub fn replace(
        &mut self,
        id: ObserverId,
        observer: Box<dyn SelectionObserver>,
    ) -> Result<Box<dyn SelectionObserver>, Box<dyn SelectionObserver>> {
        match self.observers.iter_mut().find(|(oid, _)| *oid == id) {
            Some((_, slot)) => Ok(std::mem::replace(slot, observer)),
            None => Err(observer),
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    pub fn observer_names(&self) -> Vec<&str> {
        self.observers.iter().map(|(_, o)| o.name()).collect()
    }

    pub fn handle_selection_changed(
        &mut self,
        selected: &str,
        current_page: usize,
        in_page_offset: usize,
    ) -> FanOut {
        let text = selected.trim();
        if text.is_empty() {
            return FanOut::default();
        }

        let event = SelectionEvent {
            text: text.to_string(),
            page: current_page,
            absolute_line: current_page * self.page_size.get() + in_page_offset,
        };

        let mut fan_out = FanOut::default();
        for (_, observer) in self.observers.iter_mut() {
            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| observer.on_text_selected(&event)));
            let error = match outcome {
                Ok(Ok(())) => {
                    fan_out.notified += 1;
                    continue;
                }
                Ok(Err(err)) => err,
                Err(payload) => ObserverError::Panicked(panic_message(payload.as_ref())),
            };
            warn!("Selection observer {} failed: {}", observer.name(), error);
            fan_out.failures.push(ObserverFailure {
                observer: observer.name().to_string(),
                error,
            });
        }

        fan_out.event = Some(event);
        fan_out
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
