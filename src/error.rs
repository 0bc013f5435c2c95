//! Library-side errors. Sources and config readers return [`Result`]; the
//! binary wraps these in `anyhow`.
use std::error::Error;
use std::fmt;

pub type DynError = Box<dyn Error + Send + Sync + 'static>;
pub type Result<T> = std::result::Result<T, DynError>;

/// Lazily attach a message such as `read /etc/passwd` to a failure.
pub trait Context<T> {
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

/// A failure plus what was being attempted when it happened.
#[derive(Debug)]
pub struct ContextError {
    pub context: String,
    pub source: Option<DynError>,
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{}: {source}", self.context),
            None => f.write_str(&self.context),
        }
    }
}

impl Error for ContextError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref().map(|e| e as &(dyn Error + 'static))
    }
}

impl<T, E> Context<T> for std::result::Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            Box::new(ContextError { context: f(), source: Some(e.into()) }) as DynError
        })
    }
}

// A missing value has no cause of its own; the message is the whole error.
impl<T> Context<T> for Option<T> {
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.ok_or_else(|| Box::new(ContextError { context: f(), source: None }) as DynError)
    }
}

pub fn simple_error(msg: impl Into<String>) -> DynError {
    Box::new(ContextError { context: msg.into(), source: None })
}
