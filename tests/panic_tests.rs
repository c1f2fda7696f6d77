use lectern::ui;
use std::io::{self, Write};
use std::panic;
use std::sync::{Arc, Mutex};

struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// Kept in its own test binary: the panic hook is process-wide.
#[test]
fn test_panics_are_logged_instead_of_printed() {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || SharedBuffer(writer.clone()))
        .with_ansi(false)
        .finish();

    ui::install_panic_hook();
    let outcome = tracing::subscriber::with_default(subscriber, || {
        panic::catch_unwind(|| {
            let words: Vec<u32> = Vec::new();
            words[3]
        })
    });
    let _ = panic::take_hook();

    assert!(outcome.is_err());
    let logged = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
    assert!(logged.contains("ERROR"));
    assert!(logged.contains("index out of bounds"));
}
