#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use log::{Level, LevelFilter, Log, Metadata, Record};
use once_cell::sync::{Lazy, OnceCell};
use std::rc::Rc;
use std::sync::Mutex;
use std::thread::{self, ThreadId};
use taskboard_core::{MemoryStore, Storage};

struct CaptureLogger;

static LOGGER: CaptureLogger = CaptureLogger;
static RECORDS: Lazy<Mutex<Vec<(ThreadId, Level, String)>>> = Lazy::new(|| Mutex::new(Vec::new()));
static INSTALLED: OnceCell<()> = OnceCell::new();

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        RECORDS.lock().unwrap().push((
            thread::current().id(),
            record.level(),
            record.args().to_string(),
        ));
    }

    fn flush(&self) {}
}

/// Installs the capturing logger (once per test binary) and drops records
/// previously captured on the calling thread.
pub fn capture_logs() {
    INSTALLED.get_or_init(|| {
        let _ = log::set_logger(&LOGGER);
        log::set_max_level(LevelFilter::Trace);
    });
    let current = thread::current().id();
    RECORDS
        .lock()
        .unwrap()
        .retain(|(thread_id, _, _)| *thread_id != current);
}

/// Messages captured on the calling thread at exactly `level`.
pub fn logged(level: Level) -> Vec<String> {
    let current = thread::current().id();
    RECORDS
        .lock()
        .unwrap()
        .iter()
        .filter(|(thread_id, record_level, _)| *thread_id == current && *record_level == level)
        .map(|(_, _, message)| message.clone())
        .collect()
}

/// Fresh in-memory medium plus the storage handle wrapping it.
pub fn memory_storage() -> (Rc<MemoryStore>, Rc<Storage>) {
    let store = Rc::new(MemoryStore::new());
    let storage = Storage::shared(Rc::clone(&store));
    (store, storage)
}

pub fn due(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap()
}
