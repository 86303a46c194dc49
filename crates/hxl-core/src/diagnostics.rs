//! Diagnostics channel for non-fatal parse failures.
//!
//! Lenient call sites (column projection, renaming, the derived
//! [`Source`](crate::Source) queries) never fail on a malformed tag
//! pattern. They report the problem here and carry on as if nothing
//! matched. Every report is emitted as a `tracing` warning and then
//! handed to each registered logger, in registration order.
//!
//! A [`Dataset`](crate::Dataset) owns one `Diagnostics` handle and every
//! filter built on top of it shares that handle, so loggers live exactly
//! as long as the pipeline does.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::HxlError;

/// Callback invoked for each non-fatal parse failure.
pub type Logger = Rc<dyn Fn(&HxlError)>;

/// Append-only list of logger callbacks.
///
/// Cloning is cheap and yields a handle to the same list.
///
/// # Example
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
/// use hxl_core::{Diagnostics, Pattern};
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let diagnostics = Diagnostics::new();
/// let sink = Rc::clone(&seen);
/// diagnostics.add_logger(move |err| sink.borrow_mut().push(err.to_string()));
///
/// assert!(Pattern::parse_lenient("#bad tag!", &diagnostics).is_none());
/// assert_eq!(seen.borrow().len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct Diagnostics {
    loggers: Rc<RefCell<Vec<Logger>>>,
}

impl Diagnostics {
    /// Creates a channel with no loggers attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a logger. Loggers cannot be removed.
    pub fn add_logger<F>(&self, logger: F)
    where
        F: Fn(&HxlError) + 'static,
    {
        self.loggers.borrow_mut().push(Rc::new(logger));
    }

    /// Number of attached loggers.
    pub fn logger_count(&self) -> usize {
        self.loggers.borrow().len()
    }

    /// Reports a non-fatal failure.
    pub fn report(&self, error: &HxlError) {
        tracing::warn!(error = %error, "ignoring malformed HXL input");
        // Snapshot first so a logger may register another logger.
        let loggers: Vec<Logger> = self.loggers.borrow().iter().cloned().collect();
        for logger in loggers {
            logger(error);
        }
    }

    /// Returns `true` if both handles point at the same logger list.
    pub fn same(&self, other: &Diagnostics) -> bool {
        Rc::ptr_eq(&self.loggers, &other.loggers)
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("loggers", &self.logger_count())
            .finish()
    }
}

/// Whether a parse failure should abort or degrade to "no match".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strictness {
    /// Return the error to the caller.
    #[default]
    Strict,
    /// Report the error to [`Diagnostics`] and return `None`.
    Lenient,
}

impl Strictness {
    /// Applies this strictness to a parse result.
    pub fn resolve<T>(
        self,
        result: crate::Result<T>,
        diagnostics: &Diagnostics,
    ) -> crate::Result<Option<T>> {
        match (result, self) {
            (Ok(value), _) => Ok(Some(value)),
            (Err(err), Strictness::Strict) => Err(err),
            (Err(err), Strictness::Lenient) => {
                diagnostics.report(&err);
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_reaches_every_logger_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let diagnostics = Diagnostics::new();
        for id in 0..3 {
            let sink = Rc::clone(&seen);
            diagnostics.add_logger(move |_| sink.borrow_mut().push(id));
        }

        diagnostics.report(&HxlError::EmptyPattern);
        assert_eq!(*seen.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn clones_share_loggers() {
        let diagnostics = Diagnostics::new();
        let other = diagnostics.clone();
        other.add_logger(|_| {});

        assert_eq!(diagnostics.logger_count(), 1);
        assert!(diagnostics.same(&other));
        assert!(!diagnostics.same(&Diagnostics::new()));
    }

    #[test]
    fn report_without_loggers_is_silent() {
        Diagnostics::new().report(&HxlError::EmptyPattern);
    }

    #[test]
    fn strictness_resolve() {
        let diagnostics = Diagnostics::new();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        diagnostics.add_logger(move |_| *sink.borrow_mut() += 1);

        let ok: crate::Result<u8> = Ok(1);
        assert_eq!(
            Strictness::Lenient.resolve(ok, &diagnostics).unwrap(),
            Some(1)
        );

        let err: crate::Result<u8> = Err(HxlError::EmptyPattern);
        assert_eq!(
            Strictness::Lenient.resolve(err, &diagnostics).unwrap(),
            None
        );
        assert_eq!(*count.borrow(), 1);

        let err: crate::Result<u8> = Err(HxlError::EmptyPattern);
        assert!(Strictness::Strict.resolve(err, &diagnostics).is_err());
        assert_eq!(*count.borrow(), 1);
    }
}
