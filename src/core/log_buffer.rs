//! Bounded storage for console output.
//!
//! [`LogBuffer`] is a fixed-capacity ring of [`LogEntry`] values. Repeated
//! identical lines collapse into a single entry with a repeat count, and the
//! buffer carries the [`LogFilters`] the UI uses to hide entries.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

/// Smallest capacity the buffer will ever be resized to.
pub const MIN_LOG_ENTRIES: usize = 32;
/// Largest capacity the buffer will ever be resized to.
pub const MAX_LOG_ENTRIES: usize = 20_000;
/// Capacity used when nothing else is configured.
pub const DEFAULT_LOG_ENTRIES: usize = 1000;

/// Severity of a console log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "persist", derive(serde::Serialize, serde::Deserialize))]
pub enum LogSeverity {
    /// Plain informational output.
    #[default]
    Log,
    /// Something looks wrong but execution continues.
    Warning,
    /// A recoverable error.
    Error,
    /// A fault raised by code (e.g. a panicking command handler).
    Exception,
    /// A failed assertion.
    Assert,
}

impl LogSeverity {
    /// All severities, in display order.
    pub const ALL: [LogSeverity; 5] = [
        LogSeverity::Log,
        LogSeverity::Warning,
        LogSeverity::Error,
        LogSeverity::Exception,
        LogSeverity::Assert,
    ];

    /// Get the display name of this severity.
    pub fn name(&self) -> &'static str {
        match self {
            LogSeverity::Log => "Log",
            LogSeverity::Warning => "Warning",
            LogSeverity::Error => "Error",
            LogSeverity::Exception => "Exception",
            LogSeverity::Assert => "Assert",
        }
    }

    /// Parse a severity name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|severity| severity.name().eq_ignore_ascii_case(name))
    }

    /// Whether this severity counts as an error for display purposes.
    pub fn is_error(&self) -> bool {
        !matches!(self, LogSeverity::Log | LogSeverity::Warning)
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single line of console output.
///
/// Entries are written once by [`LogBuffer::add`]; the only later mutation is
/// the repeat count growing when an identical line is collapsed into it.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    sequence: u64,
    timestamp: Duration,
    frame: u64,
    severity: LogSeverity,
    message: String,
    stack_trace: String,
    count: u32,
}

impl LogEntry {
    /// Globally increasing index assigned when the entry was created.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Unscaled time since startup when the entry was created.
    #[inline]
    pub fn timestamp(&self) -> Duration {
        self.timestamp
    }

    /// Frame counter when the entry was created.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn severity(&self) -> LogSeverity {
        self.severity
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Captured stack trace, empty when none was recorded.
    #[inline]
    pub fn stack_trace(&self) -> &str {
        &self.stack_trace
    }

    /// How many identical lines this entry stands for (at least 1).
    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    fn same_line(&self, severity: LogSeverity, message: &str, stack_trace: &str) -> bool {
        self.severity == severity && self.message == message && self.stack_trace == stack_trace
    }
}

/// Settings owned by the log buffer.
///
/// Command handlers may change these at any time; a changed capacity is
/// applied by the next [`LogBuffer::apply_settings`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "persist", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "persist", serde(default))]
pub struct LogSettings {
    /// Maximum number of retained entries.
    pub max_entries: usize,
    /// Keep stack traces attached to plain log lines.
    pub capture_log_traces: bool,
    /// Keep stack traces attached to warnings.
    pub capture_warning_traces: bool,
    /// Merge consecutive identical lines into one entry.
    pub collapse_duplicates: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_LOG_ENTRIES,
            capture_log_traces: false,
            capture_warning_traces: false,
            collapse_duplicates: true,
        }
    }
}

impl LogSettings {
    /// Whether a stack trace delivered with this severity should be kept.
    ///
    /// Errors, exceptions and asserts always keep theirs.
    pub fn captures_trace(&self, severity: LogSeverity) -> bool {
        match severity {
            LogSeverity::Log => self.capture_log_traces,
            LogSeverity::Warning => self.capture_warning_traces,
            _ => true,
        }
    }
}

/// Show/hide switches and free-text search applied to log entries.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "persist", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "persist", serde(default))]
pub struct LogFilters {
    shown: [bool; 5],
    search: String,
    #[cfg_attr(feature = "persist", serde(skip))]
    search_lower: String,
}

// The lowered search copy is derived from `search`.
impl PartialEq for LogFilters {
    fn eq(&self, other: &Self) -> bool {
        self.shown == other.shown && self.search == other.search
    }
}

impl Eq for LogFilters {}

impl Default for LogFilters {
    fn default() -> Self {
        Self {
            shown: [true; 5],
            search: String::new(),
            search_lower: String::new(),
        }
    }
}

impl LogFilters {
    /// Whether entries of this severity are shown.
    pub fn shows(&self, severity: LogSeverity) -> bool {
        self.shown[severity.index()]
    }

    /// Show or hide entries of a severity.
    pub fn set_shown(&mut self, severity: LogSeverity, shown: bool) {
        self.shown[severity.index()] = shown;
    }

    /// Mutable access to a severity switch, for checkbox widgets.
    pub fn shown_mut(&mut self, severity: LogSeverity) -> &mut bool {
        &mut self.shown[severity.index()]
    }

    /// The current search text.
    pub fn search(&self) -> &str {
        &self.search
    }

    /// Replace the search text.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.search_lower = self.search.to_lowercase();
    }

    /// Check an entry against the severity switches and the search text.
    ///
    /// The search is a case-insensitive substring match over the message and
    /// the stack trace.
    pub fn passes(&self, entry: &LogEntry) -> bool {
        if !self.shows(entry.severity) {
            return false;
        }
        if self.search.is_empty() {
            return true;
        }
        // Deserialized filters skip the lowered copy.
        let needle: Cow<'_, str> = if self.search_lower.is_empty() {
            Cow::Owned(self.search.to_lowercase())
        } else {
            Cow::Borrowed(&self.search_lower)
        };
        contains_ignore_case(&entry.message, &needle)
            || contains_ignore_case(&entry.stack_trace, &needle)
    }
}

/// Case-insensitive substring test against an already lowercased needle.
///
/// ASCII needles are compared in place; others fall back to lowercasing the
/// haystack.
fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    if !needle_lower.is_ascii() {
        return haystack.to_lowercase().contains(needle_lower);
    }
    let needle = needle_lower.as_bytes();
    if needle.is_empty() {
        return true;
    }
    if needle.len() > haystack.len() {
        return false;
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}

/// Clamp a requested capacity into the supported range.
#[inline]
pub fn clamp_capacity(capacity: usize) -> usize {
    capacity.clamp(MIN_LOG_ENTRIES, MAX_LOG_ENTRIES)
}

/// Fixed-capacity circular buffer of console output.
///
/// Offsets passed to [`LogBuffer::get_newest`] count backwards in time:
/// offset 0 is the most recently written entry.
///
/// # Examples
///
/// ```
/// use bevy_dev_console::core::{LogBuffer, LogSeverity};
///
/// let mut log = LogBuffer::default();
/// log.add(LogSeverity::Log, "first", None, true);
/// log.add(LogSeverity::Warning, "second", None, true);
/// log.add(LogSeverity::Warning, "second", None, true);
///
/// assert_eq!(log.len(), 2);
/// assert_eq!(log.get_newest(0).message(), "second");
/// assert_eq!(log.get_newest(0).count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    /// Physical slots; grows lazily up to `capacity`, never shrinks on clear.
    entries: Vec<LogEntry>,
    capacity: usize,
    /// Next physical slot to write.
    cursor: usize,
    count: usize,
    next_sequence: u64,
    settings: LogSettings,
    filters: LogFilters,
    elapsed: Duration,
    frame: u64,
}

impl LogBuffer {
    /// Create an empty buffer. Storage is allocated on the first write.
    pub fn new(settings: LogSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Number of retained entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Current capacity (0 until the first write or resize).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The sequence index the next new entry will receive.
    #[inline]
    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    pub fn settings(&self) -> &LogSettings {
        &self.settings
    }

    /// Mutable settings. Capacity changes take effect on [`LogBuffer::apply_settings`].
    pub fn settings_mut(&mut self) -> &mut LogSettings {
        &mut self.settings
    }

    pub fn filters(&self) -> &LogFilters {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut LogFilters {
        &mut self.filters
    }

    /// Set the time and frame stamped onto entries written from now on.
    pub fn set_clock(&mut self, elapsed: Duration, frame: u64) {
        self.elapsed = elapsed;
        self.frame = frame;
    }

    /// Resize to the configured capacity if it changed.
    pub fn apply_settings(&mut self) {
        if self.capacity != 0 {
            self.resize(self.settings.max_entries);
        }
    }

    /// Change the capacity, keeping the newest entries.
    ///
    /// The requested capacity is clamped to
    /// [`MIN_LOG_ENTRIES`]..=[`MAX_LOG_ENTRIES`]. Sequence indices are kept;
    /// only physical slots are reassigned.
    pub fn resize(&mut self, capacity: usize) {
        let capacity = clamp_capacity(capacity);
        if capacity == self.capacity {
            return;
        }

        let keep = self.count.min(capacity);
        let mut entries = Vec::with_capacity(capacity);
        for offset in (0..keep).rev() {
            entries.push(self.entries[self.slot(offset)].clone());
        }

        self.entries = entries;
        self.capacity = capacity;
        self.count = keep;
        self.cursor = keep % capacity;
    }

    /// Forget all entries.
    ///
    /// Slots are overwritten lazily and the sequence counter keeps counting.
    pub fn clear(&mut self) {
        self.cursor = 0;
        self.count = 0;
    }

    /// Append a line using the configured collapse setting.
    pub fn push(&mut self, severity: LogSeverity, message: &str, stack_trace: Option<&str>) -> u64 {
        let collapse = self.settings.collapse_duplicates;
        self.add(severity, message, stack_trace, collapse)
    }

    /// Append a line, returning the sequence index of the entry it landed in.
    ///
    /// With `collapse_duplicates`, a line identical to the newest entry
    /// (same severity, message and stack trace) only bumps that entry's
    /// repeat count. Once the buffer is full the oldest entry is overwritten.
    pub fn add(
        &mut self,
        severity: LogSeverity,
        message: &str,
        stack_trace: Option<&str>,
        collapse_duplicates: bool,
    ) -> u64 {
        if self.capacity == 0 {
            self.resize(self.settings.max_entries);
        }
        let stack_trace = stack_trace.unwrap_or_default();

        if collapse_duplicates && self.count > 0 {
            let newest = self.slot(0);
            let entry = &mut self.entries[newest];
            if entry.same_line(severity, message, stack_trace) {
                entry.count = entry.count.saturating_add(1);
                return entry.sequence;
            }
        }

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let entry = LogEntry {
            sequence,
            timestamp: self.elapsed,
            frame: self.frame,
            severity,
            message: message.to_owned(),
            stack_trace: stack_trace.to_owned(),
            count: 1,
        };

        if self.cursor < self.entries.len() {
            self.entries[self.cursor] = entry;
        } else {
            self.entries.push(entry);
        }
        self.cursor = (self.cursor + 1) % self.capacity;
        self.count = (self.count + 1).min(self.capacity);

        sequence
    }

    /// Get an entry counting back from the newest.
    ///
    /// # Panics
    ///
    /// Panics if `offset >= self.len()`. Callers are expected to query
    /// [`LogBuffer::len`] first.
    pub fn get_newest(&self, offset: usize) -> &LogEntry {
        assert!(
            offset < self.count,
            "log offset {offset} out of range (len {})",
            self.count
        );
        &self.entries[self.slot(offset)]
    }

    /// Non-panicking variant of [`LogBuffer::get_newest`].
    pub fn try_newest(&self, offset: usize) -> Option<&LogEntry> {
        (offset < self.count).then(|| &self.entries[self.slot(offset)])
    }

    /// Iterate over retained entries, newest first.
    pub fn iter_newest(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + '_ {
        (0..self.count).map(move |offset| &self.entries[self.slot(offset)])
    }

    /// Check an entry against the current filters.
    #[inline]
    pub fn passes_filters(&self, entry: &LogEntry) -> bool {
        self.filters.passes(entry)
    }

    /// Iterate over entries passing the filters, newest first.
    pub fn iter_visible(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + '_ {
        self.iter_newest().filter(move |entry| self.filters.passes(entry))
    }

    /// Number of retained entries per severity, indexed like [`LogSeverity::ALL`].
    pub fn severity_counts(&self) -> [usize; 5] {
        let mut counts = [0; 5];
        for entry in self.iter_newest() {
            counts[entry.severity.index()] += 1;
        }
        counts
    }

    /// Physical slot of the entry `offset` steps back from the newest.
    #[inline]
    fn slot(&self, offset: usize) -> usize {
        (self.cursor + self.capacity - 1 - offset) % self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_buffer() -> LogBuffer {
        let mut log = LogBuffer::default();
        log.resize(MIN_LOG_ENTRIES);
        log
    }

    fn messages(log: &LogBuffer) -> Vec<String> {
        log.iter_newest().map(|e| e.message().to_string()).collect()
    }

    #[test]
    fn test_lazy_allocation() {
        let mut log = LogBuffer::default();
        assert_eq!(log.capacity(), 0);

        log.add(LogSeverity::Log, "hello", None, true);
        assert_eq!(log.capacity(), DEFAULT_LOG_ENTRIES);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_capacity_clamped() {
        let mut log = LogBuffer::default();
        log.resize(1);
        assert_eq!(log.capacity(), MIN_LOG_ENTRIES);
        log.resize(1_000_000);
        assert_eq!(log.capacity(), MAX_LOG_ENTRIES);
    }

    #[test]
    fn test_ring_keeps_newest() {
        let mut log = small_buffer();
        for i in 0..100 {
            log.add(LogSeverity::Log, &format!("line {i}"), None, true);
        }

        assert_eq!(log.len(), MIN_LOG_ENTRIES);
        for offset in 0..MIN_LOG_ENTRIES {
            let expected = format!("line {}", 99 - offset);
            assert_eq!(log.get_newest(offset).message(), expected);
        }
    }

    #[test]
    fn test_collapse_duplicates() {
        let mut log = small_buffer();
        let first = log.add(LogSeverity::Warning, "again", Some("trace"), true);
        for _ in 0..9 {
            let seq = log.add(LogSeverity::Warning, "again", Some("trace"), true);
            assert_eq!(seq, first);
        }

        assert_eq!(log.len(), 1);
        assert_eq!(log.get_newest(0).count(), 10);
        assert_eq!(log.get_newest(0).sequence(), first);
        assert_eq!(log.next_sequence(), first + 1);
    }

    #[test]
    fn test_collapse_requires_exact_match() {
        let mut log = small_buffer();
        log.add(LogSeverity::Warning, "same", None, true);
        log.add(LogSeverity::Error, "same", None, true);
        log.add(LogSeverity::Error, "same", Some("different trace"), true);
        log.add(LogSeverity::Error, "Same", Some("different trace"), true);
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn test_collapse_disabled() {
        let mut log = small_buffer();
        log.add(LogSeverity::Log, "dup", None, false);
        log.add(LogSeverity::Log, "dup", None, false);
        assert_eq!(log.len(), 2);
        assert_eq!(log.get_newest(0).count(), 1);
    }

    #[test]
    fn test_push_uses_settings() {
        let mut log = LogBuffer::new(LogSettings {
            collapse_duplicates: false,
            ..Default::default()
        });
        log.push(LogSeverity::Log, "dup", None);
        log.push(LogSeverity::Log, "dup", None);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_null_trace_normalized() {
        let mut log = small_buffer();
        log.add(LogSeverity::Log, "msg", None, true);
        log.add(LogSeverity::Log, "msg", Some(""), true);
        assert_eq!(log.len(), 1);
        assert_eq!(log.get_newest(0).stack_trace(), "");
    }

    #[test]
    fn test_sequence_monotonic_across_clear_and_resize() {
        let mut log = small_buffer();
        let mut last = None;
        let mut check = |seq: u64| {
            if let Some(prev) = last {
                assert!(seq > prev);
            }
            last = Some(seq);
        };

        for i in 0..40 {
            check(log.add(LogSeverity::Log, &i.to_string(), None, true));
        }
        log.clear();
        check(log.add(LogSeverity::Log, "after clear", None, true));
        log.resize(64);
        check(log.add(LogSeverity::Log, "after grow", None, true));
        log.resize(MIN_LOG_ENTRIES);
        check(log.add(LogSeverity::Log, "after shrink", None, true));
    }

    #[test]
    fn test_clear_keeps_slots_but_hides_entries() {
        let mut log = small_buffer();
        log.add(LogSeverity::Log, "a", None, true);
        log.add(LogSeverity::Log, "b", None, true);
        log.clear();
        assert!(log.is_empty());
        assert!(log.try_newest(0).is_none());

        // A line equal to the old newest entry must not collapse into it.
        log.add(LogSeverity::Log, "b", None, true);
        assert_eq!(log.len(), 1);
        assert_eq!(log.get_newest(0).count(), 1);
    }

    #[test]
    fn test_shrink_keeps_newest() {
        let mut log = LogBuffer::default();
        log.resize(100);
        let mut reference = Vec::new();
        for i in 0..90 {
            let seq = log.add(LogSeverity::Log, &format!("m{i}"), None, true);
            reference.push((seq, format!("m{i}")));
        }

        log.resize(MIN_LOG_ENTRIES);
        assert_eq!(log.len(), MIN_LOG_ENTRIES);
        for offset in 0..MIN_LOG_ENTRIES {
            let (seq, msg) = &reference[reference.len() - 1 - offset];
            let entry = log.get_newest(offset);
            assert_eq!(entry.sequence(), *seq);
            assert_eq!(entry.message(), msg);
        }

        // Writing continues from the right place after the shrink.
        log.add(LogSeverity::Log, "next", None, true);
        assert_eq!(log.get_newest(0).message(), "next");
        assert_eq!(log.get_newest(1).message(), "m89");
        assert_eq!(log.len(), MIN_LOG_ENTRIES);
    }

    #[test]
    fn test_shrink_after_wrap() {
        let mut log = LogBuffer::default();
        log.resize(40);
        for i in 0..100 {
            log.add(LogSeverity::Log, &format!("m{i}"), None, true);
        }
        log.resize(MIN_LOG_ENTRIES);
        assert_eq!(log.get_newest(0).message(), "m99");
        assert_eq!(log.get_newest(MIN_LOG_ENTRIES - 1).message(), "m68");
    }

    #[test]
    fn test_grow_keeps_everything() {
        let mut log = small_buffer();
        for i in 0..50 {
            log.add(LogSeverity::Log, &format!("m{i}"), None, true);
        }
        let before: Vec<_> = log.iter_newest().cloned().collect();

        log.resize(500);
        let after: Vec<_> = log.iter_newest().cloned().collect();
        assert_eq!(before, after);

        for i in 50..60 {
            log.add(LogSeverity::Log, &format!("m{i}"), None, true);
        }
        assert_eq!(log.len(), MIN_LOG_ENTRIES + 10);
        assert_eq!(messages(&log)[0], "m59");
    }

    #[test]
    fn test_resize_same_capacity_is_noop() {
        let mut log = small_buffer();
        log.add(LogSeverity::Log, "x", None, true);
        log.resize(MIN_LOG_ENTRIES);
        log.resize(10);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_apply_settings_resizes() {
        let mut log = small_buffer();
        log.settings_mut().max_entries = 64;
        log.apply_settings();
        assert_eq!(log.capacity(), 64);
    }

    #[test]
    #[should_panic]
    fn test_get_newest_out_of_range() {
        let log = small_buffer();
        log.get_newest(0);
    }

    #[test]
    fn test_clock_stamped_on_entries() {
        let mut log = small_buffer();
        log.set_clock(Duration::from_secs(3), 42);
        log.add(LogSeverity::Log, "x", None, true);
        let entry = log.get_newest(0);
        assert_eq!(entry.timestamp(), Duration::from_secs(3));
        assert_eq!(entry.frame(), 42);
    }

    #[test]
    fn test_filters_severity_and_search() {
        let mut log = small_buffer();
        log.add(LogSeverity::Log, "Loading scene", None, true);
        log.add(LogSeverity::Warning, "Missing texture", Some("at render::draw"), true);
        log.add(LogSeverity::Error, "Crash", None, true);

        assert_eq!(log.iter_visible().count(), 3);

        log.filters_mut().set_shown(LogSeverity::Error, false);
        assert_eq!(log.iter_visible().count(), 2);

        log.filters_mut().set_search("RENDER");
        let visible: Vec<_> = log.iter_visible().map(|e| e.message()).collect();
        assert_eq!(visible, vec!["Missing texture"]);

        log.filters_mut().set_search("scene");
        let visible: Vec<_> = log.iter_visible().map(|e| e.message()).collect();
        assert_eq!(visible, vec!["Loading scene"]);
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Missing Texture", "texture"));
        assert!(contains_ignore_case("abc", ""));
        assert!(!contains_ignore_case("tex", "texture"));
        assert!(contains_ignore_case("Größe ÜBER", "über"));
        assert!(!contains_ignore_case("Größe", "über"));
    }

    #[test]
    fn test_filters_equality_ignores_lowered_copy() {
        let mut saved = LogFilters::default();
        saved.set_search("Player");

        // What a reload without `set_search` leaves behind.
        let mut reloaded = saved.clone();
        reloaded.search_lower.clear();
        assert_eq!(reloaded, saved);

        reloaded.set_shown(LogSeverity::Warning, false);
        assert_ne!(reloaded, saved);
    }

    #[test]
    fn test_severity_counts() {
        let mut log = small_buffer();
        log.add(LogSeverity::Log, "a", None, true);
        log.add(LogSeverity::Error, "b", None, true);
        log.add(LogSeverity::Error, "c", None, true);
        assert_eq!(log.severity_counts(), [1, 0, 2, 0, 0]);
    }

    #[test]
    fn test_trace_capture_policy() {
        let settings = LogSettings::default();
        assert!(!settings.captures_trace(LogSeverity::Log));
        assert!(!settings.captures_trace(LogSeverity::Warning));
        assert!(settings.captures_trace(LogSeverity::Error));
        assert!(settings.captures_trace(LogSeverity::Exception));
        assert!(settings.captures_trace(LogSeverity::Assert));
    }

    #[test]
    fn test_severity_from_name() {
        assert_eq!(LogSeverity::from_name("warning"), Some(LogSeverity::Warning));
        assert_eq!(LogSeverity::from_name("ASSERT"), Some(LogSeverity::Assert));
        assert_eq!(LogSeverity::from_name("nope"), None);
    }
}
