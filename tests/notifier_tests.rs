use lectern::{ObserverError, PageSize, SelectionEvent, SelectionNotifier, SelectionObserver};
use std::cell::RefCell;
use std::rc::Rc;

type Calls = Rc<RefCell<Vec<(String, SelectionEvent)>>>;

struct Recorder {
    name: String,
    calls: Calls,
}

impl Recorder {
    fn boxed(name: &str, calls: &Calls) -> Box<dyn SelectionObserver> {
        Box::new(Recorder {
            name: name.to_string(),
            calls: Rc::clone(calls),
        })
    }
}

impl SelectionObserver for Recorder {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_text_selected(&mut self, event: &SelectionEvent) -> Result<(), ObserverError> {
        self.calls
            .borrow_mut()
            .push((self.name.clone(), event.clone()));
        Ok(())
    }
}

struct Failing;

impl SelectionObserver for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    fn on_text_selected(&mut self, _event: &SelectionEvent) -> Result<(), ObserverError> {
        Err(ObserverError::Disconnected)
    }
}

struct Panicking;

impl SelectionObserver for Panicking {
    fn name(&self) -> &str {
        "panicking"
    }

    fn on_text_selected(&mut self, _event: &SelectionEvent) -> Result<(), ObserverError> {
        panic!("observer blew up");
    }
}

fn notifier() -> SelectionNotifier {
    SelectionNotifier::new(PageSize::new(29).unwrap())
}

#[test]
fn test_fan_out_in_registration_order() {
    let calls: Calls = Rc::default();
    let mut notifier = notifier();
    notifier.register(Recorder::boxed("A", &calls));
    notifier.register(Recorder::boxed("B", &calls));
    notifier.register(Recorder::boxed("C", &calls));

    let fan_out = notifier.handle_selection_changed("hello world", 2, 5);

    assert_eq!(fan_out.notified, 3);
    assert!(fan_out.failures.is_empty());

    let calls = calls.borrow();
    let names: Vec<&str> = calls.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["A", "B", "C"]);

    let expected = SelectionEvent {
        text: "hello world".to_string(),
        page: 2,
        absolute_line: 63,
    };
    for (_, event) in calls.iter() {
        assert_eq!(event, &expected);
    }
}

#[test]
fn test_whitespace_selection_is_noop() {
    let calls: Calls = Rc::default();
    let mut notifier = notifier();
    notifier.register(Recorder::boxed("A", &calls));

    let fan_out = notifier.handle_selection_changed("   \n\t ", 1, 3);

    assert!(fan_out.is_noop());
    assert_eq!(fan_out.notified, 0);
    assert!(calls.borrow().is_empty());
}

#[test]
fn test_selection_text_is_trimmed() {
    let calls: Calls = Rc::default();
    let mut notifier = notifier();
    notifier.register(Recorder::boxed("A", &calls));

    notifier.handle_selection_changed("  padded  ", 0, 0);

    assert_eq!(calls.borrow()[0].1.text, "padded");
}

#[test]
fn test_failing_observer_does_not_block_others() {
    let calls: Calls = Rc::default();
    let mut notifier = notifier();
    notifier.register(Recorder::boxed("A", &calls));
    notifier.register(Box::new(Failing));
    notifier.register(Box::new(Panicking));
    notifier.register(Recorder::boxed("D", &calls));

    let fan_out = notifier.handle_selection_changed("some text", 0, 1);

    assert_eq!(fan_out.notified, 2);
    assert_eq!(fan_out.failures.len(), 2);
    assert_eq!(fan_out.failures[0].observer, "failing");
    assert_eq!(fan_out.failures[1].observer, "panicking");
    assert!(matches!(
        fan_out.failures[1].error,
        ObserverError::Panicked(ref msg) if msg.contains("blew up")
    ));

    let names: Vec<String> = calls.borrow().iter().map(|(n, _)| n.clone()).collect();
    assert_eq!(names, vec!["A", "D"]);
}

#[test]
fn test_unregister_removes_observer() {
    let calls: Calls = Rc::default();
    let mut notifier = notifier();
    let a = notifier.register(Recorder::boxed("A", &calls));
    notifier.register(Recorder::boxed("B", &calls));

    assert!(notifier.unregister(a).is_some());
    assert!(notifier.unregister(a).is_none());
    notifier.handle_selection_changed("text", 0, 0);

    let names: Vec<String> = calls.borrow().iter().map(|(n, _)| n.clone()).collect();
    assert_eq!(names, vec!["B"]);
}

#[test]
fn test_replace_keeps_position() {
    let calls: Calls = Rc::default();
    let mut notifier = notifier();
    notifier.register(Recorder::boxed("A", &calls));
    let b = notifier.register(Recorder::boxed("B", &calls));
    notifier.register(Recorder::boxed("C", &calls));

    let old = notifier
        .replace(b, Recorder::boxed("B2", &calls))
        .unwrap_or_else(|_| panic!("observer should exist"));
    assert_eq!(old.name(), "B");
    assert_eq!(notifier.observer_names(), vec!["A", "B2", "C"]);

    notifier.unregister(b);
    assert!(notifier.replace(b, Recorder::boxed("X", &calls)).is_err());
    assert_eq!(notifier.observer_count(), 2);
}
