pub mod builders;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, Once};

use regex::Regex;
use testexec::process::Spawner;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();
static REAPER_LOCK: Mutex<()> = Mutex::new(());

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Serialise tests that spawn children.
///
/// The reaper is process-wide and `wait_any` reaps whichever child ends
/// first, so two tests spawning concurrently in one test binary would steal
/// each other's children. Hold the returned guard for the whole test.
pub fn reaper_guard() -> MutexGuard<'static, ()> {
    REAPER_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Spawner wired to the bootstrap binary cargo built for this test run.
pub fn spawner(bootstrap: &str) -> Spawner {
    Spawner::with_bootstrap(PathBuf::from(bootstrap))
}

/// True if any line of the file matches `pattern`.
pub fn grep_file(pattern: &str, path: impl AsRef<Path>) -> bool {
    let re = Regex::new(pattern).expect("valid regex");
    let contents = std::fs::read_to_string(path.as_ref()).unwrap_or_default();
    contents.lines().any(|line| re.is_match(line))
}

/// True if `contents` has a line matching `pattern`.
pub fn grep_string(pattern: &str, contents: &str) -> bool {
    let re = Regex::new(pattern).expect("valid regex");
    contents.lines().any(|line| re.is_match(line))
}

/// In-memory sink for [`capture_logs`].
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with a thread-local subscriber and return what it logged at
/// debug level and above, without ANSI colours.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let subscriber = fmt()
        .with_max_level(Level::DEBUG)
        .with_ansi(false)
        .with_writer(buffer.clone())
        .finish();

    let value = tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer
        .0
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone();
    (value, String::from_utf8_lossy(&bytes).into_owned())
}
