use std::any::Any;
use std::panic::{catch_unwind, resume_unwind, AssertUnwindSafe};

/// What a managed thread does when its work item panics.
///
/// Whatever the strategy, the thread's completion signal still fires so a
/// pending join returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanicStrategy {
    /// Keep unwinding; the OS thread ends with the panic.
    #[default]
    Propagate,
    /// Log the panic and let the thread finish normally.
    LogAndContinue,
    /// Swallow the panic silently.
    Isolate,
    /// Abort the process.
    Abort,
}

/// Runs a work item under a [`PanicStrategy`]. The thread state records
/// whether a run panicked.
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicHandler {
    strategy: PanicStrategy,
}

impl PanicHandler {
    pub fn new(strategy: PanicStrategy) -> Self {
        Self { strategy }
    }

    /// Run `f`, applying the strategy if it panics. With
    /// [`PanicStrategy::Propagate`] this call does not return on panic.
    pub fn execute<F>(&self, f: F) -> Result<(), PanicInfo>
    where
        F: FnOnce(),
    {
        match catch_unwind(AssertUnwindSafe(f)) {
            Ok(()) => Ok(()),
            Err(payload) => {
                match self.strategy {
                    PanicStrategy::Propagate => resume_unwind(payload),
                    PanicStrategy::Abort => {
                        let info = PanicInfo::from_payload(payload.as_ref());
                        tracing::error!(message = %info.message, "work item panicked (abort strategy)");
                        std::process::abort();
                    }
                    PanicStrategy::Isolate => Err(PanicInfo::from_payload(payload.as_ref())),
                    PanicStrategy::LogAndContinue => {
                        let info = PanicInfo::from_payload(payload.as_ref());
                        let current = std::thread::current();
                        tracing::error!(
                            thread = current.name().unwrap_or("<unnamed>"),
                            message = %info.message,
                            "work item panicked"
                        );
                        Err(info)
                    }
                }
            }
        }
    }

    pub fn strategy(&self) -> PanicStrategy {
        self.strategy
    }
}

#[derive(Debug, Clone)]
pub struct PanicInfo {
    pub message: String,
}

impl PanicInfo {
    fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_handler_isolate() {
        let handler = PanicHandler::new(PanicStrategy::Isolate);

        let result = handler.execute(|| {
            panic!("test panic");
        });

        assert_eq!(result.unwrap_err().message, "test panic");
    }

    #[test]
    fn test_panic_handler_success() {
        let handler = PanicHandler::new(PanicStrategy::Isolate);

        assert!(handler.execute(|| {}).is_ok());
    }

    #[test]
    fn test_propagate_resumes_unwind() {
        let handler = PanicHandler::new(PanicStrategy::Propagate);

        let outer = catch_unwind(AssertUnwindSafe(|| {
            let _ = handler.execute(|| panic!("{}", "formatted"));
        }));

        let payload = outer.unwrap_err();
        assert_eq!(payload.downcast_ref::<String>().map(String::as_str), Some("formatted"));
    }

    #[test]
    fn test_log_and_continue_returns_info() {
        let handler = PanicHandler::new(PanicStrategy::LogAndContinue);

        for i in 0..3 {
            let info = handler.execute(move || panic!("failure {}", i)).unwrap_err();
            assert_eq!(info.message, format!("failure {}", i));
        }
        assert_eq!(handler.strategy(), PanicStrategy::LogAndContinue);
    }
}
