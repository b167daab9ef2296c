//! Main logger implementation

use super::{
    caller::{
        default_caller_formatter, resolve_or, BacktraceResolver, CallerFormatter, CallerResolver,
        HelperRegistry,
    },
    error::{LoggerError, Result},
    history::{HistoryBuffer, DEFAULT_HISTORY_CAPACITY},
    log_level::LogLevel,
    metrics::LoggerMetrics,
    options::LoggerOptions,
    output_format::{OutputFormat, RenderOptions},
    publish::{PublishHook, Publisher},
    record::{assemble, RecordContext},
    timestamp::{system_time, TimeFunction, TimestampFormat},
    value::Value,
};
use crate::formatters::flatten;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::any::TypeId;
use std::fmt;
use std::io::{self, Write};
use std::panic::Location;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;

/// Destination for rendered records.
pub type Sink = Box<dyn Write + Send>;

/// A sink shared between a logger and the loggers derived from it.
type SharedSink = Arc<Mutex<Sink>>;

/// Key under which [`Logger::check_error`] reports the error.
pub const ERROR_KEY: &str = "err";

/// Per-logger configuration.
///
/// A logging call clones it and releases the lock before running any user
/// callback, so callbacks may use the logger freely. Derived loggers start
/// from a clone too and share the sink.
#[derive(Clone)]
struct LoggerState {
    prefix: String,
    report_caller: bool,
    report_timestamp: bool,
    time_format: TimestampFormat,
    time_function: TimeFunction,
    formatter: OutputFormat,
    caller_formatter: CallerFormatter,
    caller_offset: usize,
    colored: bool,
    history: Option<Arc<HistoryBuffer>>,
    publish: Option<PublishHook>,
    sink: SharedSink,
    /// The sink is `io::Sink`; rendering for it is skipped.
    discard: bool,
}

fn is_discard<W: 'static>() -> bool {
    TypeId::of::<W>() == TypeId::of::<io::Sink>()
}

/// Structured, leveled key/value logger.
///
/// Each call assembles an ordered list of pairs (level, caller, prefix,
/// message, bound fields, call-site pairs, timestamp), renders it with the
/// configured [`OutputFormat`] and writes it to the sink as one line.
/// Logging never fails from the caller's point of view: sink errors are
/// counted in [`LoggerMetrics`] and reported once on stderr.
///
/// # Example
///
/// ```
/// use rust_kvlog::prelude::*;
///
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .prefix("api")
///     .output(std::io::sink())
///     .build();
///
/// logger.info("request served", kv!["status", 200, "path", "/health"]);
///
/// let child = logger.with(kv!["request_id", "abc123"]);
/// child.debug("cache hit", kv![]);
/// ```
pub struct Logger {
    min_level: AtomicI32,
    state: RwLock<LoggerState>,
    /// Render buffer; held only while formatting and flushing one record.
    buf: Mutex<Vec<u8>>,
    /// Bound context, oldest first. Never mutated once shared.
    fields: Arc<Vec<Value>>,
    helpers: HelperRegistry,
    resolver: Arc<dyn CallerResolver>,
    metrics: LoggerMetrics,
    write_error_reported: AtomicBool,
    publish_error_reported: AtomicBool,
}

impl Logger {
    /// Logger writing text to `output` with default settings.
    #[must_use]
    pub fn new<W: Write + Send + 'static>(output: W) -> Self {
        Logger::builder().output(output).build()
    }

    /// Logger writing to `output`, configured from `options`.
    #[must_use]
    pub fn with_options<W: Write + Send + 'static>(output: W, options: &LoggerOptions) -> Self {
        Logger::builder().options(options).output(output).build()
    }

    /// Stderr logger with timestamps, the usual process-wide default.
    ///
    /// Construct it once and pass it to whoever needs to log.
    #[must_use]
    pub fn new_default() -> Self {
        Logger::builder().report_timestamp(true).build()
    }

    pub fn min_level(&self) -> LogLevel {
        LogLevel::from_i32(self.min_level.load(Ordering::Relaxed))
    }

    pub fn set_min_level(&self, level: LogLevel) {
        self.min_level.store(level.as_i32(), Ordering::Relaxed);
    }

    /// Whether a call at `level` would be emitted.
    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level.as_i32() >= self.min_level.load(Ordering::Relaxed)
    }

    pub fn prefix(&self) -> String {
        self.state.read().prefix.clone()
    }

    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.state.write().prefix = prefix.into();
    }

    pub fn set_report_caller(&self, report: bool) {
        self.state.write().report_caller = report;
    }

    pub fn set_report_timestamp(&self, report: bool) {
        self.state.write().report_timestamp = report;
    }

    pub fn set_time_format(&self, format: impl Into<TimestampFormat>) {
        self.state.write().time_format = format.into();
    }

    pub fn set_time_function<F>(&self, time_function: F)
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.state.write().time_function = Arc::new(time_function);
    }

    pub fn formatter(&self) -> OutputFormat {
        self.state.read().formatter
    }

    pub fn set_formatter(&self, formatter: OutputFormat) {
        self.state.write().formatter = formatter;
    }

    pub fn set_caller_formatter<F>(&self, caller_formatter: F)
    where
        F: Fn(&str, u32, &str) -> String + Send + Sync + 'static,
    {
        self.state.write().caller_formatter = Arc::new(caller_formatter);
    }

    pub fn set_caller_offset(&self, offset: usize) {
        self.state.write().caller_offset = offset;
    }

    /// Style text output with ANSI colors. No effect without the `color`
    /// feature.
    pub fn set_colored(&self, colored: bool) {
        self.state.write().colored = colored;
    }

    /// Replace the sink. Loggers already derived from this one keep the old
    /// sink.
    ///
    /// With [`io::sink()`] records are not rendered at all; history and the
    /// publish hook still receive them.
    pub fn set_output<W: Write + Send + 'static>(&self, output: W) {
        let mut state = self.state.write();
        state.sink = Arc::new(Mutex::new(Box::new(output)));
        state.discard = is_discard::<W>();
    }

    /// Enable history with room for `capacity` records, or resize the
    /// existing buffer.
    pub fn set_history_capacity(&self, capacity: usize) {
        let mut state = self.state.write();
        match &state.history {
            Some(history) => history.resize(capacity),
            None => state.history = Some(Arc::new(HistoryBuffer::new(capacity))),
        }
    }

    /// The history buffer, if enabled. Shared with derived loggers.
    pub fn history(&self) -> Option<Arc<HistoryBuffer>> {
        self.state.read().history.clone()
    }

    /// Send a flattened copy of every record to `publisher` on `topic`.
    pub fn set_publisher(&self, publisher: Arc<dyn Publisher>, topic: impl Into<String>) {
        self.state.write().publish = Some(PublishHook::new(publisher, topic));
    }

    pub fn clear_publisher(&self) {
        self.state.write().publish = None;
    }

    /// Pairs bound to this logger through [`with`](Self::with).
    pub fn fields(&self) -> Vec<Value> {
        self.fields.as_ref().clone()
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Mark the calling function as a helper: caller resolution on this
    /// logger skips its frames and reports whoever called it.
    ///
    /// Skipping needs line tables. In a build without debug info the caller
    /// is the location of the logging call itself.
    ///
    /// ```
    /// use rust_kvlog::prelude::*;
    ///
    /// fn must(logger: &Logger, ok: bool) {
    ///     logger.helper();
    ///     if !ok {
    ///         logger.error("check failed", kv![]);
    ///     }
    /// }
    ///
    /// let logger = Logger::builder().report_caller(true).output(std::io::sink()).build();
    /// must(&logger, false);
    /// ```
    pub fn helper(&self) {
        if let Some(frame) = self.resolver.stack().into_iter().next() {
            self.helpers.mark(frame.function);
        }
    }

    /// Derived logger with `keyvals` appended to the bound context.
    ///
    /// The child shares the sink, history and publish hook; it has its own
    /// lock, buffer, metrics and an empty helper registry.
    #[must_use]
    pub fn with(&self, keyvals: impl IntoIterator<Item = Value>) -> Logger {
        let mut fields = self.fields.as_ref().clone();
        fields.extend(keyvals);
        self.derive(self.state.read().clone(), fields)
    }

    /// Derived logger with a different prefix.
    #[must_use]
    pub fn with_prefix(&self, prefix: impl Into<String>) -> Logger {
        let mut state = self.state.read().clone();
        state.prefix = prefix.into();
        self.derive(state, self.fields.as_ref().clone())
    }

    fn derive(&self, state: LoggerState, fields: Vec<Value>) -> Logger {
        Logger {
            min_level: AtomicI32::new(self.min_level.load(Ordering::Relaxed)),
            state: RwLock::new(state),
            buf: Mutex::new(Vec::new()),
            fields: Arc::new(fields),
            helpers: HelperRegistry::new(),
            resolver: Arc::clone(&self.resolver),
            metrics: LoggerMetrics::new(),
            write_error_reported: AtomicBool::new(false),
            publish_error_reported: AtomicBool::new(false),
        }
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl Into<Value>, keyvals: impl IntoIterator<Item = Value>) {
        self.handle(level, false, Location::caller(), message.into(), keyvals);
    }

    /// Like [`log`](Self::log), reporting the caller even when caller
    /// reporting is off.
    #[track_caller]
    pub fn log_with_caller(
        &self,
        level: LogLevel,
        message: impl Into<Value>,
        keyvals: impl IntoIterator<Item = Value>,
    ) {
        self.handle(level, true, Location::caller(), message.into(), keyvals);
    }

    #[track_caller]
    pub fn debug(&self, message: impl Into<Value>, keyvals: impl IntoIterator<Item = Value>) {
        self.handle(LogLevel::Debug, false, Location::caller(), message.into(), keyvals);
    }

    #[track_caller]
    pub fn info(&self, message: impl Into<Value>, keyvals: impl IntoIterator<Item = Value>) {
        self.handle(LogLevel::Info, false, Location::caller(), message.into(), keyvals);
    }

    #[track_caller]
    pub fn warn(&self, message: impl Into<Value>, keyvals: impl IntoIterator<Item = Value>) {
        self.handle(LogLevel::Warn, false, Location::caller(), message.into(), keyvals);
    }

    #[track_caller]
    pub fn error(&self, message: impl Into<Value>, keyvals: impl IntoIterator<Item = Value>) {
        self.handle(LogLevel::Error, false, Location::caller(), message.into(), keyvals);
    }

    /// Log at fatal level, then exit the process with status 1.
    #[track_caller]
    pub fn fatal(&self, message: impl Into<Value>, keyvals: impl IntoIterator<Item = Value>) -> ! {
        self.handle(LogLevel::Fatal, false, Location::caller(), message.into(), keyvals);
        std::process::exit(1)
    }

    /// Log without a level. Never filtered.
    #[track_caller]
    pub fn print(&self, message: impl Into<Value>, keyvals: impl IntoIterator<Item = Value>) {
        self.handle(LogLevel::None, false, Location::caller(), message.into(), keyvals);
    }

    #[track_caller]
    pub fn debug_with_caller(&self, message: impl Into<Value>, keyvals: impl IntoIterator<Item = Value>) {
        self.handle(LogLevel::Debug, true, Location::caller(), message.into(), keyvals);
    }

    #[track_caller]
    pub fn info_with_caller(&self, message: impl Into<Value>, keyvals: impl IntoIterator<Item = Value>) {
        self.handle(LogLevel::Info, true, Location::caller(), message.into(), keyvals);
    }

    #[track_caller]
    pub fn warn_with_caller(&self, message: impl Into<Value>, keyvals: impl IntoIterator<Item = Value>) {
        self.handle(LogLevel::Warn, true, Location::caller(), message.into(), keyvals);
    }

    #[track_caller]
    pub fn error_with_caller(&self, message: impl Into<Value>, keyvals: impl IntoIterator<Item = Value>) {
        self.handle(LogLevel::Error, true, Location::caller(), message.into(), keyvals);
    }

    /// Log the error of a failed result at error level with its caller.
    /// Returns whether `result` was an error.
    #[track_caller]
    pub fn check_error<T, E: fmt::Display>(&self, result: &std::result::Result<T, E>) -> bool {
        match result {
            Ok(_) => false,
            Err(err) => {
                self.handle(
                    LogLevel::Error,
                    true,
                    Location::caller(),
                    Value::Null,
                    [Value::from(ERROR_KEY), Value::String(err.to_string())],
                );
                true
            }
        }
    }

    fn handle(
        &self,
        level: LogLevel,
        force_caller: bool,
        location: &'static Location<'static>,
        message: Value,
        keyvals: impl IntoIterator<Item = Value>,
    ) {
        if !self.enabled(level) {
            self.metrics.record_filtered();
            return;
        }

        // The stack walk, time source and caller formatter run unlocked.
        let config = self.state.read().clone();

        let report_caller = config.report_caller || force_caller;
        let caller = report_caller.then(|| {
            resolve_or(&self.resolver.stack(), config.caller_offset, &self.helpers, location)
        });
        let timestamp = (config.time_function)();

        let ctx = RecordContext {
            report_caller,
            report_timestamp: config.report_timestamp,
            prefix: &config.prefix,
            fields: &self.fields,
            caller_formatter: &config.caller_formatter,
        };
        let kvs = assemble(
            &ctx,
            level,
            timestamp,
            caller.as_ref(),
            &message,
            keyvals.into_iter().collect(),
        );

        let flat = (config.history.is_some() || config.publish.is_some())
            .then(|| flatten(&kvs, &config.time_format));

        let written = if config.discard {
            Ok(())
        } else {
            self.write_record(&config, &kvs)
        };

        match written {
            Ok(()) => {
                self.metrics.record_written();
            }
            Err(err) => self.report_write_failure(&err),
        }

        if let Some(line) = flat {
            if let Some(history) = &config.history {
                history.push(line.as_str());
                self.metrics.record_history_push();
            }
            if let Some(hook) = &config.publish {
                if let Err(err) = hook.send(&line) {
                    self.report_publish_failure(&err);
                }
            }
        }
    }

    /// Render and flush one record. The buffer is left empty on every path.
    fn write_record(&self, config: &LoggerState, kvs: &[Value]) -> Result<()> {
        let options = RenderOptions {
            time_format: &config.time_format,
            colored: config.colored,
        };
        let mut buf = self.buf.lock();
        let written = config
            .formatter
            .render(kvs, &options, &mut buf)
            .and_then(|()| Self::flush_to(&config.sink, &buf));
        buf.clear();
        written
    }

    fn flush_to(sink: &SharedSink, buf: &[u8]) -> Result<()> {
        let mut sink = sink.lock();
        sink.write_all(buf)
            .and_then(|()| sink.flush())
            .map_err(|e| LoggerError::io_operation("writing record", "sink rejected write", e))
    }

    fn report_write_failure(&self, err: &LoggerError) {
        self.metrics.record_write_failure();
        if !self.write_error_reported.swap(true, Ordering::Relaxed) {
            eprintln!("[LOGGER ERROR] Failed to write log record: {}", err);
        }
    }

    fn report_publish_failure(&self, err: &LoggerError) {
        self.metrics.record_publish_failure();
        if !self.publish_error_reported.swap(true, Ordering::Relaxed) {
            eprintln!("[LOGGER WARNING] Failed to publish log record: {}", err);
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new_default()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Logger")
            .field("min_level", &self.min_level())
            .field("prefix", &state.prefix)
            .field("formatter", &state.formatter)
            .field("report_caller", &state.report_caller)
            .field("report_timestamp", &state.report_timestamp)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use rust_kvlog::prelude::*;
///
/// let logger = Logger::builder()
///     .min_level(LogLevel::Debug)
///     .formatter(OutputFormat::Json)
///     .report_timestamp(true)
///     .time_format(TimestampFormat::Rfc3339)
///     .history_capacity(100)
///     .output(std::io::sink())
///     .build();
/// ```
pub struct LoggerBuilder {
    min_level: LogLevel,
    report_caller: bool,
    report_timestamp: bool,
    prefix: String,
    time_format: TimestampFormat,
    time_function: TimeFunction,
    formatter: OutputFormat,
    caller_formatter: CallerFormatter,
    caller_offset: usize,
    colored: bool,
    fields: Vec<Value>,
    history_capacity: Option<usize>,
    publish: Option<PublishHook>,
    output: Option<Sink>,
    discard: bool,
    resolver: Arc<dyn CallerResolver>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            min_level: LogLevel::Info,
            report_caller: false,
            report_timestamp: false,
            prefix: String::new(),
            time_format: TimestampFormat::Standard,
            time_function: system_time(),
            formatter: OutputFormat::Text,
            caller_formatter: default_caller_formatter(),
            caller_offset: 0,
            colored: false,
            fields: Vec::new(),
            history_capacity: None,
            publish: None,
            output: None,
            discard: false,
            resolver: Arc::new(BacktraceResolver),
        }
    }

    /// Apply every setting in `options`.
    #[must_use = "builder methods return a new value"]
    pub fn options(mut self, options: &LoggerOptions) -> Self {
        self.min_level = options.level;
        self.report_caller = options.report_caller;
        self.report_timestamp = options.report_timestamp;
        self.prefix = options.prefix.clone();
        self.time_format = options.time_format.clone();
        self.formatter = options.formatter;
        self.caller_offset = options.caller_offset;
        self.history_capacity = options.history_capacity;
        self.colored = options.colored;
        self
    }

    /// Set minimum log level
    #[must_use = "builder methods return a new value"]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn report_caller(mut self, report: bool) -> Self {
        self.report_caller = report;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn report_timestamp(mut self, report: bool) -> Self {
        self.report_timestamp = report;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn time_format(mut self, format: impl Into<TimestampFormat>) -> Self {
        self.time_format = format.into();
        self
    }

    /// Source of record timestamps. Defaults to the system clock.
    #[must_use = "builder methods return a new value"]
    pub fn time_function(mut self, time_function: TimeFunction) -> Self {
        self.time_function = time_function;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn formatter(mut self, formatter: OutputFormat) -> Self {
        self.formatter = formatter;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn caller_formatter(mut self, caller_formatter: CallerFormatter) -> Self {
        self.caller_formatter = caller_formatter;
        self
    }

    /// Extra stack frames to skip when resolving the caller, for wrappers
    /// around the logger.
    #[must_use = "builder methods return a new value"]
    pub fn caller_offset(mut self, offset: usize) -> Self {
        self.caller_offset = offset;
        self
    }

    /// Replace the stack walker used for caller reporting.
    #[must_use = "builder methods return a new value"]
    pub fn caller_resolver(mut self, resolver: Arc<dyn CallerResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// Initial bound context.
    #[must_use = "builder methods return a new value"]
    pub fn fields(mut self, keyvals: impl IntoIterator<Item = Value>) -> Self {
        self.fields.extend(keyvals);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = Some(capacity);
        self
    }

    /// Enable history with the default capacity.
    #[must_use = "builder methods return a new value"]
    pub fn history(mut self) -> Self {
        self.history_capacity = Some(DEFAULT_HISTORY_CAPACITY);
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn publisher(mut self, publisher: Arc<dyn Publisher>, topic: impl Into<String>) -> Self {
        self.publish = Some(PublishHook::new(publisher, topic));
        self
    }

    /// Sink for rendered records. Defaults to stderr.
    #[must_use = "builder methods return a new value"]
    pub fn output<W: Write + Send + 'static>(mut self, output: W) -> Self {
        self.output = Some(Box::new(output));
        self.discard = is_discard::<W>();
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        let sink: Sink = self.output.unwrap_or_else(|| Box::new(io::stderr()));
        let state = LoggerState {
            prefix: self.prefix,
            report_caller: self.report_caller,
            report_timestamp: self.report_timestamp,
            time_format: self.time_format,
            time_function: self.time_function,
            formatter: self.formatter,
            caller_formatter: self.caller_formatter,
            caller_offset: self.caller_offset,
            colored: self.colored,
            history: self
                .history_capacity
                .map(|capacity| Arc::new(HistoryBuffer::new(capacity))),
            publish: self.publish,
            sink: Arc::new(Mutex::new(sink)),
            discard: self.discard,
        };

        Logger {
            min_level: AtomicI32::new(self.min_level.as_i32()),
            state: RwLock::new(state),
            buf: Mutex::new(Vec::new()),
            fields: Arc::new(self.fields),
            helpers: HelperRegistry::new(),
            resolver: self.resolver,
            metrics: LoggerMetrics::new(),
            write_error_reported: AtomicBool::new(false),
            publish_error_reported: AtomicBool::new(false),
        }
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Create a builder for Logger
    ///
    /// # Example
    /// ```
    /// use rust_kvlog::prelude::*;
    ///
    /// let logger = Logger::builder()
    ///     .min_level(LogLevel::Debug)
    ///     .report_caller(true)
    ///     .build();
    /// ```
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::caller::Frame;
    use crate::core::publish::ChannelPublisher;
    use crate::core::timestamp::fixed_time;
    use crate::kv;
    use chrono::TimeZone;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Always reports the same frame.
    struct FixedResolver;

    impl CallerResolver for FixedResolver {
        fn stack(&self) -> Vec<Frame> {
            vec![
                Frame::new(0x10, "/work/app/src/main.rs", 7, "app::main"),
                Frame::new(0x20, "/rustc/library/std/src/rt.rs", 1, "std::rt::lang_start"),
            ]
        }
    }

    fn capture() -> (LoggerBuilder, Capture) {
        let sink = Capture::default();
        let builder = Logger::builder()
            .caller_resolver(Arc::new(FixedResolver))
            .output(sink.clone());
        (builder, sink)
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_basic_line() {
        let (builder, sink) = capture();
        let logger = builder.report_caller(true).build();

        logger.info("started", kv!["port", 8080]);

        assert_eq!(sink.text(), "INFO [src/main.rs:7] started port=8080\n");
        assert_eq!(logger.metrics().total_written(), 1);
    }

    #[test]
    fn test_timestamp_last() {
        let (builder, sink) = capture();
        let logger = builder
            .report_timestamp(true)
            .time_function(fixed_time(noon()))
            .build();

        logger.warn("slow", kv!["ms", 1500]);
        assert_eq!(sink.text(), "WARN slow ms=1500 timestamp=2024/05/01 12:00:00\n");
    }

    #[test]
    fn test_level_filtering() {
        let (builder, sink) = capture();
        let logger = builder.min_level(LogLevel::Warn).build();

        logger.debug("no", kv![]);
        logger.info("no", kv![]);
        logger.warn("yes", kv![]);
        logger.print("always", kv![]);

        assert_eq!(sink.text(), "WARN yes\nalways\n");
        assert_eq!(logger.metrics().filtered_count(), 2);

        logger.set_min_level(LogLevel::Debug);
        assert_eq!(logger.min_level(), LogLevel::Debug);
        assert!(logger.enabled(LogLevel::Debug));
    }

    #[test]
    fn test_bound_fields_and_prefix() {
        let (builder, sink) = capture();
        let logger = builder.prefix("api").fields(kv!["svc", "auth"]).build();
        let child = logger.with(kv!["req", 7]);
        let grandchild = child.with_prefix("db");

        child.info("hello", kv!["user", "bob"]);
        grandchild.error("down", kv![]);

        assert_eq!(
            sink.text(),
            "INFO api: hello svc=auth req=7 user=bob\nERRO db: down svc=auth req=7\n"
        );
        assert_eq!(logger.fields(), kv!["svc", "auth"]);
    }

    #[test]
    fn test_odd_keyvals() {
        let (builder, sink) = capture();
        let logger = builder.fields(kv!["lonely"]).build();

        logger.info("x", kv!["a", 1, "b"]);
        assert_eq!(
            sink.text(),
            "INFO x lonely=\"missing value\" a=1 b=\"missing value\"\n"
        );
    }

    #[test]
    fn test_forced_caller_and_check_error() {
        let (builder, sink) = capture();
        let logger = builder.build();

        logger.info_with_caller("here", kv![]);
        let failed: std::result::Result<(), String> = Err("disk full".into());
        assert!(logger.check_error(&failed));
        assert!(!logger.check_error(&Ok::<_, String>(())));

        assert_eq!(
            sink.text(),
            "INFO [src/main.rs:7] here\nERRO [src/main.rs:7] err=\"disk full\"\n"
        );
    }

    #[test]
    fn test_caller_offset_and_formatter() {
        let (builder, sink) = capture();
        let logger = builder.report_caller(true).caller_offset(1).build();
        logger.set_caller_formatter(|file, line, function| format!("{}@{}:{}", function, file, line));

        logger.info("x", kv![]);
        assert_eq!(
            sink.text(),
            "INFO [std::rt::lang_start@/rustc/library/std/src/rt.rs:1] x\n"
        );
    }

    #[test]
    fn test_json_output() {
        let (builder, sink) = capture();
        let logger = builder.formatter(OutputFormat::Json).build();

        logger.info("started", kv!["port", 8080]);
        let parsed: serde_json::Value = serde_json::from_str(sink.text().trim_end()).unwrap();
        assert_eq!(parsed["level"], "info");
        assert_eq!(parsed["message"], "started");
        assert_eq!(parsed["port"], 8080);
    }

    #[test]
    fn test_history_and_publish_share_flat_line() {
        let (builder, _sink) = capture();
        let (publisher, subscription) = ChannelPublisher::bounded(8);
        let logger = builder
            .formatter(OutputFormat::Json)
            .colored(true)
            .history_capacity(2)
            .publisher(Arc::new(publisher), "svc")
            .build();

        logger.info("one", kv![]);
        logger.info("two", kv!["k", "v"]);
        logger.info("three", kv![]);

        let history = logger.history().unwrap();
        assert_eq!(history.snapshot(), vec!["INFO two k=v", "INFO three"]);

        let published = subscription.drain();
        assert_eq!(published.len(), 3);
        assert_eq!(published[1].log(), Some("INFO two k=v"));
        assert_eq!(logger.metrics().history_pushes(), 3);
    }

    #[test]
    fn test_children_share_history() {
        let (builder, _sink) = capture();
        let logger = builder.history().build();
        let child = logger.with(kv!["c", 1]);

        child.info("from child", kv![]);
        assert_eq!(logger.history().unwrap().snapshot(), vec!["INFO from child c=1"]);
    }

    #[test]
    fn test_set_history_capacity_creates_then_resizes() {
        let (builder, _sink) = capture();
        let logger = builder.build();
        assert!(logger.history().is_none());

        logger.set_history_capacity(3);
        for i in 0..3 {
            logger.info(format!("m{}", i), kv![]);
        }
        logger.set_history_capacity(1);
        assert_eq!(logger.history().unwrap().snapshot(), vec!["INFO m2"]);
    }

    #[test]
    fn test_publish_failure_is_counted_not_raised() {
        let (builder, sink) = capture();
        let (publisher, subscription) = ChannelPublisher::bounded(1);
        drop(subscription);
        let logger = builder.publisher(Arc::new(publisher), "svc").build();

        logger.info("a", kv![]);
        logger.info("b", kv![]);

        assert_eq!(sink.text(), "INFO a\nINFO b\n");
        assert_eq!(logger.metrics().publish_failures(), 2);

        logger.clear_publisher();
        logger.info("c", kv![]);
        assert_eq!(logger.metrics().publish_failures(), 2);
    }

    #[test]
    fn test_write_failure_is_counted_not_raised() {
        let logger = Logger::builder().output(Broken).history().build();

        logger.error("lost", kv![]);
        logger.error("lost again", kv![]);

        assert_eq!(logger.metrics().write_failures(), 2);
        assert_eq!(logger.metrics().total_written(), 0);
        assert_eq!(logger.history().unwrap().len(), 2);
    }

    #[test]
    fn test_set_output_redirects() {
        let (builder, first) = capture();
        let logger = builder.build();
        let second = Capture::default();

        logger.info("a", kv![]);
        logger.set_output(second.clone());
        logger.info("b", kv![]);

        assert_eq!(first.text(), "INFO a\n");
        assert_eq!(second.text(), "INFO b\n");
    }

    #[test]
    fn test_runtime_setters() {
        let (builder, sink) = capture();
        let logger = builder.build();

        logger.set_prefix("p");
        logger.set_report_timestamp(true);
        logger.set_time_function(noon);
        logger.set_time_format(TimestampFormat::Unix);
        logger.info("m", kv![]);

        assert_eq!(logger.prefix(), "p");
        assert_eq!(sink.text(), format!("INFO p: m timestamp={}\n", noon().timestamp()));

        logger.set_formatter(OutputFormat::Json);
        assert_eq!(logger.formatter(), OutputFormat::Json);
    }

    #[test]
    fn test_options_applied() {
        let sink = Capture::default();
        let options = LoggerOptions {
            level: LogLevel::Error,
            prefix: "cfg".into(),
            history_capacity: Some(5),
            ..LoggerOptions::default()
        };
        let logger = Logger::with_options(sink.clone(), &options);

        logger.warn("dropped", kv![]);
        logger.error("kept", kv![]);

        assert_eq!(sink.text(), "ERRO cfg: kept\n");
        assert_eq!(logger.history().unwrap().capacity(), 5);
    }

    #[test]
    fn test_helper_marks_function_on_this_logger_only() {
        let (builder, _sink) = capture();
        let logger = builder.build();
        let child = logger.with(kv![]);

        logger.helper();
        logger.helper();

        assert_eq!(logger.helpers.len(), 1);
        assert!(logger.helpers.contains("app::main"));
        assert!(child.helpers.is_empty());
    }

    #[test]
    fn test_helper_frame_skipped() {
        let (builder, sink) = capture();
        let logger = builder.report_caller(true).build();

        logger.helpers.mark("app::main");
        logger.info("x", kv![]);

        assert_eq!(sink.text(), "INFO [src/rt.rs:1] x\n");
    }

    /// Symbol names without line tables, as in a release build.
    struct Unsymbolized;

    impl CallerResolver for Unsymbolized {
        fn stack(&self) -> Vec<Frame> {
            vec![Frame::new(0x10, "", 0, "app::main")]
        }
    }

    #[test]
    #[rustfmt::skip]
    fn test_caller_falls_back_to_call_site_without_debug_info() {
        let sink = Capture::default();
        let logger = Logger::builder()
            .caller_resolver(Arc::new(Unsymbolized))
            .output(sink.clone())
            .build();

        let line = line!(); logger.info_with_caller("here", kv![]);
        let failed: std::result::Result<(), String> = Err("disk full".into());
        let check_line = line!(); logger.check_error(&failed);
        logger.set_report_caller(true);
        let log_line = line!(); logger.log(LogLevel::Warn, "plain", kv![]);

        assert_eq!(
            sink.text(),
            format!(
                "INFO [core/logger.rs:{}] here\nERRO [core/logger.rs:{}] err=\"disk full\"\nWARN [core/logger.rs:{}] plain\n",
                line, check_line, log_line
            )
        );
    }

    #[test]
    fn test_callbacks_may_reenter_logger() {
        let (builder, sink) = capture();
        let logger = Arc::new(builder.report_caller(true).build());

        let inner = Arc::clone(&logger);
        logger.set_caller_formatter(move |file, line, _| {
            format!("{}{}:{}", inner.prefix(), crate::core::caller::trim_caller_path(file, 1), line)
        });
        let inner = Arc::clone(&logger);
        logger.set_time_function(move || {
            inner.set_prefix("svc");
            noon()
        });

        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        let worker = Arc::clone(&logger);
        std::thread::spawn(move || {
            worker.info("first", kv![]);
            worker.info("second", kv![]);
            let _ = done_tx.send(());
        });

        assert!(
            done_rx.recv_timeout(std::time::Duration::from_secs(10)).is_ok(),
            "logging call did not return"
        );
        // The prefix is read before the time source runs; the formatter sees the update
        assert_eq!(
            sink.text(),
            "INFO [svcmain.rs:7] first\nINFO [svcmain.rs:7] svc: second\n"
        );
    }

    #[test]
    fn test_discard_sink_skips_rendering() {
        let (publisher, subscription) = ChannelPublisher::bounded(4);
        let logger = Logger::builder()
            .history()
            .publisher(Arc::new(publisher), "t")
            .output(io::sink())
            .build();
        assert!(logger.state.read().discard);

        logger.info("kept", kv!["k", 1]);

        assert_eq!(logger.history().unwrap().snapshot(), vec!["INFO kept k=1"]);
        assert_eq!(subscription.drain().len(), 1);
        assert_eq!(logger.metrics().total_written(), 1);
        assert_eq!(logger.buf.lock().capacity(), 0);

        let sink = Capture::default();
        logger.set_output(sink.clone());
        assert!(!logger.state.read().discard);
        logger.info("shown", kv![]);
        assert_eq!(sink.text(), "INFO shown\n");
    }
}
