use crate::thread::Priority;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("timed out")]
    Timeout,

    #[error("thread already running")]
    AlreadyRunning,

    #[error("cannot create thread: {0}")]
    SystemResource(#[source] std::io::Error),

    #[error("cannot set thread priority to {priority:?} (os error {code})")]
    PriorityRejected { priority: Priority, code: i32 },

    #[error("a thread cannot join itself")]
    SelfJoin,

    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout)
    }
}
