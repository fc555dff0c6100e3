//! Error capture primitives shared across the core.
//!
//! A fault is decorated at the point it is caught: the catching code takes an
//! [`ErrorContext`] snapshot of where it is, [`describe_error`] turns the
//! error plus that snapshot into a [`DiagnosticMessage`] and logs it, and
//! [`WrappedError`] carries the message upward with the original error chained
//! as its source.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::io;
use std::panic::Location;

/// File name reported when the context carries no frame.
pub const UNKNOWN_FILE: &str = "unknown file";
/// Line number reported when the context carries no frame.
pub const UNKNOWN_LINE: i64 = -1;

/// Stable error codes attached to log records.
#[repr(u32)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ErrorCode {
    /// Success code used as a sentinel.
    Ok = 0,
    /// Arithmetic fault (division by zero, overflow).
    Arithmetic = 1,
    /// Input failed validation.
    InvalidInput = 2,
    /// Underlying IO failure.
    Io = 3,
    /// A pipeline stage reported a failure.
    Stage = 4,
    /// Catch-all for foreign errors and bugs.
    Internal = 5,
}

/// Result alias used throughout the crate.
pub type GuardResult<T> = Result<T, WrappedError>;

/// Base capability shared by the crate's error types.
pub trait AppError: Error {
    /// Human readable message for this error alone.
    fn message(&self) -> String {
        self.to_string()
    }

    /// The error this one was caused by, if any.
    fn cause(&self) -> Option<&(dyn Error + 'static)> {
        self.source()
    }

    fn code(&self) -> ErrorCode {
        ErrorCode::Internal
    }
}

/// Faults raised by application logic.
#[derive(Debug, thiserror::Error)]
pub enum FaultError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("arithmetic overflow")]
    Overflow,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("stage {stage} failed: {message}")]
    Stage { stage: String, message: String },
}

impl FaultError {
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn stage<S: Into<String>, M: Into<String>>(stage: S, message: M) -> Self {
        Self::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

impl AppError for FaultError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::DivisionByZero | Self::Overflow => ErrorCode::Arithmetic,
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::Io(_) => ErrorCode::Io,
            Self::Stage { .. } => ErrorCode::Stage,
        }
    }
}

/// One source location an error passed through.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceFrame {
    file: Cow<'static, str>,
    line: u32,
    column: u32,
}

impl SourceFrame {
    pub fn new<F: Into<Cow<'static, str>>>(file: F, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }
}

impl From<&'static Location<'static>> for SourceFrame {
    fn from(location: &'static Location<'static>) -> Self {
        Self::new(location.file(), location.line(), location.column())
    }
}

/// Snapshot of the frames an error is propagating through, outermost first.
///
/// Taken synchronously at the catch site and handed to the capture routine
/// explicitly. An empty context is valid and yields placeholder output.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorContext {
    frames: Vec<SourceFrame>,
}

impl ErrorContext {
    /// Context holding the caller's source location.
    #[track_caller]
    pub fn capture() -> Self {
        Self::from_frame(SourceFrame::from(Location::caller()))
    }

    /// Context with no frame information.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_frame(frame: SourceFrame) -> Self {
        Self {
            frames: vec![frame],
        }
    }

    /// Record an outer frame the error travelled through. The innermost frame
    /// is unaffected.
    pub fn push_frame(&mut self, frame: SourceFrame) {
        self.frames.insert(0, frame);
    }

    /// The frame where the error occurred.
    pub fn innermost(&self) -> Option<&SourceFrame> {
        self.frames.last()
    }

    pub fn frames(&self) -> &[SourceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Human readable description of a fault and where it happened.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticMessage(String);

impl DiagnosticMessage {
    fn compose(message: &str, context: &ErrorContext) -> Self {
        let (file, line) = match context.innermost() {
            Some(frame) => (frame.file(), i64::from(frame.line())),
            None => (UNKNOWN_FILE, UNKNOWN_LINE),
        };
        Self(format!(
            "Error occurred in script: [{file}] at line number: [{line}] with message: [{message}]"
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DiagnosticMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Destination for composed diagnostics. Only the error entry point exists.
pub trait ErrorSink {
    fn error(&self, message: &DiagnosticMessage);
}

/// Sink forwarding to the global `log` facade.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogSink;

impl ErrorSink for LogSink {
    fn error(&self, message: &DiagnosticMessage) {
        log::error!(target: "trainguard::capture", "{message}");
    }
}

/// Describe `error` at the innermost frame of `context` and log it.
pub fn describe_error<E>(error: &E, context: &ErrorContext) -> DiagnosticMessage
where
    E: fmt::Display + ?Sized,
{
    describe_error_to(&LogSink, error, context)
}

/// Same as [`describe_error`] with an explicit sink.
pub fn describe_error_to<S, E>(sink: &S, error: &E, context: &ErrorContext) -> DiagnosticMessage
where
    S: ErrorSink + ?Sized,
    E: fmt::Display + ?Sized,
{
    let message = DiagnosticMessage::compose(&error.to_string(), context);
    sink.error(&message);
    message
}

/// An error decorated with where it happened.
///
/// `Display` prints the diagnostic and nothing else; the original error is
/// reachable through `source()`.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct WrappedError {
    message: DiagnosticMessage,
    context: ErrorContext,
    code: ErrorCode,
    #[source]
    cause: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl WrappedError {
    /// Describe and log `error`, then keep it as the cause.
    pub fn new<E>(error: E, context: ErrorContext) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::with_sink(&LogSink, error, context)
    }

    pub fn with_sink<S, E>(sink: &S, error: E, context: ErrorContext) -> Self
    where
        S: ErrorSink + ?Sized,
        E: Error + Send + Sync + 'static,
    {
        let message = describe_error_to(sink, &error, &context);
        let code = code_of(&error);
        Self {
            message,
            context,
            code,
            cause: Some(Box::new(error)),
        }
    }

    /// Describe and log a value that is not itself an error. No cause is
    /// chained.
    pub fn detached<E>(error: &E, context: ErrorContext) -> Self
    where
        E: fmt::Display + ?Sized,
    {
        Self {
            message: describe_error(error, &context),
            context,
            code: ErrorCode::Internal,
            cause: None,
        }
    }

    /// Record the caller as an outer frame on the way up. The diagnostic is
    /// not recomposed.
    #[track_caller]
    pub fn trace(mut self) -> Self {
        self.context.push_frame(SourceFrame::from(Location::caller()));
        self
    }

    pub fn diagnostic(&self) -> &DiagnosticMessage {
        &self.message
    }

    pub fn context(&self) -> &ErrorContext {
        &self.context
    }

    /// The chained original error, recovered as its concrete type.
    pub fn downcast_cause<T: Error + 'static>(&self) -> Option<&T> {
        self.cause.as_deref()?.downcast_ref::<T>()
    }
}

impl AppError for WrappedError {
    fn code(&self) -> ErrorCode {
        self.code
    }
}

fn code_of<E: Error + 'static>(error: &E) -> ErrorCode {
    let any: &(dyn Error + 'static) = error;
    if let Some(fault) = any.downcast_ref::<FaultError>() {
        return fault.code();
    }
    if let Some(wrapped) = any.downcast_ref::<WrappedError>() {
        return wrapped.code();
    }
    ErrorCode::Internal
}

/// Decorate the error side of a `Result` at the call site.
pub trait ResultExt<T> {
    /// Wrap `Err(e)` as a [`WrappedError`] located at the caller.
    fn wrap_err(self) -> GuardResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    #[track_caller]
    fn wrap_err(self) -> GuardResult<T> {
        let context = ErrorContext::capture();
        self.map_err(|err| WrappedError::new(err, context))
    }
}
