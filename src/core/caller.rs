//! Caller resolution
//!
//! Finds the source location a record was logged from. The stack is
//! captured by a [`CallerResolver`] with the logger's own frames already
//! removed; [`resolve`] then applies the configured offset and skips frames
//! whose function was marked as a helper in a [`HelperRegistry`].

use parking_lot::RwLock;
use std::collections::HashSet;
use std::panic::Location;
use std::sync::Arc;

/// Upper bound on frames captured per call.
const MAX_STACK_LEN: usize = 50;

/// One resolved stack frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// Instruction pointer; zero for frames not captured from a live stack.
    pub pc: usize,
    pub file: String,
    pub line: u32,
    /// Demangled function path without hash, used as the helper identity.
    pub function: String,
}

impl Frame {
    pub fn new(
        pc: usize,
        file: impl Into<String>,
        line: u32,
        function: impl Into<String>,
    ) -> Self {
        Self {
            pc,
            file: file.into(),
            line,
            function: function.into(),
        }
    }

    /// A frame is reportable when it names a file and line. Binaries built
    /// without debug info resolve neither.
    pub fn is_reportable(&self) -> bool {
        !self.file.is_empty() && self.line != 0
    }
}

impl From<&Location<'_>> for Frame {
    fn from(location: &Location<'_>) -> Self {
        Frame::new(0, location.file(), location.line(), "")
    }
}

/// Captures the calling stack.
pub trait CallerResolver: Send + Sync {
    /// Frames above the logger's own frames, innermost first.
    fn stack(&self) -> Vec<Frame>;
}

/// Walks the real stack with the `backtrace` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct BacktraceResolver;

const LOGGER_PREFIX: &str = concat!(env!("CARGO_CRATE_NAME"), "::core::logger::Logger");

/// Function path prefixes belonging to the logging machinery.
fn internal_prefixes() -> [&'static str; 4] {
    [
        "backtrace::",
        concat!(module_path!(), "::BacktraceResolver"),
        LOGGER_PREFIX,
        "std::backtrace",
    ]
}

fn is_internal(function: &str) -> bool {
    let function = function.trim_start_matches('<');
    internal_prefixes()
        .iter()
        .any(|prefix| function.starts_with(prefix))
}

fn is_logger(function: &str) -> bool {
    function.trim_start_matches('<').starts_with(LOGGER_PREFIX)
}

/// Drops the innermost frames up to and including the last internal one,
/// so the first remaining frame is the logger's caller.
///
/// Unwinder frames interleaved with the machinery are dropped with it.
/// Scanning stops at the first foreign frame after a logger frame, so a
/// logger invoked from inside another logger's call reports its own
/// caller.
pub(crate) fn strip_internal(
    frames: Vec<Frame>,
    internal: impl Fn(&str) -> bool,
    anchor: impl Fn(&str) -> bool,
) -> Vec<Frame> {
    let mut cut = 0;
    let mut anchored = false;
    for (idx, frame) in frames.iter().enumerate() {
        if internal(&frame.function) {
            cut = idx + 1;
            anchored |= anchor(&frame.function);
        } else if anchored {
            break;
        }
    }
    frames.into_iter().skip(cut).collect()
}

impl CallerResolver for BacktraceResolver {
    fn stack(&self) -> Vec<Frame> {
        let mut frames = Vec::new();
        let mut outside = 0usize;
        backtrace::trace(|raw| {
            let pc = raw.ip() as usize;
            let mut resolved = false;
            // Inlined calls resolve to several symbols for one physical frame.
            backtrace::resolve_frame(raw, |symbol| {
                resolved = true;
                let function = symbol
                    .name()
                    .map(|name| format!("{:#}", name))
                    .unwrap_or_default();
                let file = symbol
                    .filename()
                    .map(|path| path.to_string_lossy().into_owned())
                    .unwrap_or_default();
                if !is_internal(&function) {
                    outside += 1;
                }
                frames.push(Frame {
                    pc,
                    file,
                    line: symbol.lineno().unwrap_or(0),
                    function,
                });
            });
            if !resolved {
                frames.push(Frame {
                    pc,
                    ..Frame::default()
                });
            }
            outside <= MAX_STACK_LEN
        });
        strip_internal(frames, is_internal, is_logger)
    }
}

/// Set of function identities skipped during caller lookup.
///
/// Registration is idempotent.
#[derive(Debug, Default)]
pub struct HelperRegistry {
    functions: RwLock<HashSet<String>>,
}

impl HelperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when `function` was already registered.
    pub fn mark(&self, function: impl Into<String>) -> bool {
        self.functions.write().insert(function.into())
    }

    pub fn contains(&self, function: &str) -> bool {
        self.functions.read().contains(function)
    }

    pub fn len(&self) -> usize {
        self.functions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.read().is_empty()
    }
}

/// Picks the reporting frame from `stack`.
///
/// Skips `offset` frames, then any helper frames. If every remaining frame
/// is a helper the outermost one is returned. `None` only for an empty
/// stack.
pub fn resolve(stack: &[Frame], offset: usize, helpers: &HelperRegistry) -> Option<Frame> {
    let candidates = stack.get(offset..)?;
    let last = candidates.len().checked_sub(1)?;
    candidates
        .iter()
        .enumerate()
        .find(|(idx, frame)| *idx == last || !helpers.contains(&frame.function))
        .map(|(_, frame)| frame.clone())
}

/// Like [`resolve`], but falls back to `location`, the call site the
/// compiler tracked, when the stack has no reportable frame to offer.
///
/// The fallback ignores offset and helpers, so it is exact only for direct
/// calls into the logger.
pub fn resolve_or(
    stack: &[Frame],
    offset: usize,
    helpers: &HelperRegistry,
    location: &Location<'_>,
) -> Frame {
    resolve(stack, offset, helpers)
        .filter(Frame::is_reportable)
        .unwrap_or_else(|| Frame::from(location))
}

/// Renders a caller as text from its file, line and function.
pub type CallerFormatter = Arc<dyn Fn(&str, u32, &str) -> String + Send + Sync>;

/// `dir/file.rs:42`, the last two path segments.
pub fn short_caller_formatter(file: &str, line: u32, _function: &str) -> String {
    format!("{}:{}", trim_caller_path(file, 2), line)
}

/// The full path and line.
pub fn long_caller_formatter(file: &str, line: u32, _function: &str) -> String {
    format!("{}:{}", file, line)
}

pub fn default_caller_formatter() -> CallerFormatter {
    Arc::new(short_caller_formatter)
}

/// Keeps the last `n` `/`-separated segments of `path`; `n == 0` keeps it
/// whole. Only `/` separates, on every platform, so output is stable.
pub fn trim_caller_path(path: &str, n: usize) -> &str {
    if n == 0 {
        return path;
    }

    let mut end = path.len();
    for _ in 0..n {
        match path[..end].rfind('/') {
            Some(idx) => end = idx,
            None => return path,
        }
    }

    &path[end + 1..]
}
