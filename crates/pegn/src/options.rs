use alloc::{borrow::Cow, vec, vec::Vec};

/// Default number of upcoming bytes shown by the scanner's diagnostic
/// string.
pub const DEFAULT_PREVIEW_LEN: usize = 10;

/// Configuration for a scan session.
///
/// Every knob that would otherwise be process-wide state (trace flags,
/// preview width, newline conventions, the error circuit breaker) lives
/// here and is handed to [`Scanner::new`](crate::Scanner::new) or to the
/// [`driver`](crate::driver) entry points.
///
/// # Examples
///
/// ```rust
/// use pegn::{ScanOptions, Scanner};
///
/// let options = ScanOptions {
///     max_errors: Some(3),
///     trace: true,
///     ..Default::default()
/// };
/// let s = Scanner::new(options);
/// assert!(s.beginning());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Number of pushed errors at which composite rules stop trying further
    /// alternatives and the driver reports
    /// [`FailureReason::ErrorLimit`](crate::FailureReason::ErrorLimit).
    ///
    /// # Default
    ///
    /// `None` (unbounded)
    pub max_errors: Option<usize>,

    /// Number of upcoming bytes shown in the scanner's `Display` output.
    ///
    /// # Default
    ///
    /// `10`
    pub preview_len: usize,

    /// Emit a `tracing` event for every successful [`Scanner::scan`].
    ///
    /// [`Scanner::scan`]: crate::Scanner::scan
    ///
    /// # Default
    ///
    /// `false`
    pub trace: bool,

    /// Byte sequences counted as a single line break when resolving
    /// positions. Longer sequences must come before their own prefixes.
    ///
    /// # Default
    ///
    /// `["\r\n", "\n"]`
    pub newlines: Vec<Cow<'static, str>>,

    /// Whether the driver accepts a matching rule that leaves input
    /// unconsumed.
    ///
    /// # Default
    ///
    /// `false`
    pub allow_partial: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_errors: None,
            preview_len: DEFAULT_PREVIEW_LEN,
            trace: false,
            newlines: vec![Cow::Borrowed("\r\n"), Cow::Borrowed("\n")],
            allow_partial: false,
        }
    }
}
