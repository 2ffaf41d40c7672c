//! Routes `tracing` events to the host.
//!
//! With a host callback every formatted event is delivered as one line,
//! tagged with its level (1 = ERROR .. 5 = TRACE). Without one, events go to
//! stderr.
use std::io::{self, Write};
use std::sync::Once;

use libc::{c_int, size_t};
use tracing::{Level, Metadata};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;

/// `void (*)(int level, const uint8_t *msg, size_t len)`; `msg` is only
/// valid for the duration of the call and is not NUL-terminated.
pub type ZregLogFn = extern "C" fn(level: c_int, msg: *const u8, len: size_t);

pub fn level_code(level: &Level) -> c_int {
    match *level {
        Level::ERROR => 1,
        Level::WARN => 2,
        Level::INFO => 3,
        Level::DEBUG => 4,
        Level::TRACE => 5,
    }
}

#[derive(Clone, Copy)]
pub enum LogSink {
    Host(ZregLogFn),
    Stderr,
}

impl LogSink {
    pub fn new(callback: Option<ZregLogFn>) -> Self {
        callback.map_or(LogSink::Stderr, LogSink::Host)
    }
}

/// One event's worth of output.
pub enum SinkWriter {
    Host { callback: ZregLogFn, level: c_int, line: Vec<u8> },
    Stderr(io::Stderr),
}

impl Write for SinkWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            SinkWriter::Host { line, .. } => {
                line.extend_from_slice(buf);
                Ok(buf.len())
            }
            SinkWriter::Stderr(stderr) => stderr.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            SinkWriter::Host { .. } => Ok(()),
            SinkWriter::Stderr(stderr) => stderr.flush(),
        }
    }
}

impl Drop for SinkWriter {
    fn drop(&mut self) {
        if let SinkWriter::Host { callback, level, line } = self {
            while line.last() == Some(&b'\n') {
                line.pop();
            }
            if !line.is_empty() {
                (*callback)(*level, line.as_ptr(), line.len());
            }
        }
    }
}

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = SinkWriter;

    fn make_writer(&'a self) -> SinkWriter {
        self.writer(level_code(&Level::INFO))
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> SinkWriter {
        self.writer(level_code(meta.level()))
    }
}

impl LogSink {
    fn writer(&self, level: c_int) -> SinkWriter {
        match *self {
            LogSink::Host(callback) => SinkWriter::Host { callback, level, line: Vec::new() },
            LogSink::Stderr => SinkWriter::Stderr(io::stderr()),
        }
    }
}

static INSTALL: Once = Once::new();

/// Install the process-wide subscriber. Only the first call has an effect;
/// later calls log that the existing sink stays in place.
pub fn install(sink: LogSink, max_level: &str) {
    let mut installed = false;
    INSTALL.call_once(|| {
        let filter = max_level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
        let subscriber = tracing_subscriber::fmt()
            .with_writer(sink)
            .with_ansi(false)
            .with_max_level(filter)
            .finish();
        installed = tracing::subscriber::set_global_default(subscriber).is_ok();
        if !installed {
            tracing::warn!("a global tracing subscriber is already set; host log sink not installed");
        }
    });
    if installed {
        tracing::debug!(level = max_level, "host log sink installed");
    } else {
        tracing::debug!("log sink already configured; keeping the existing one");
    }
}
