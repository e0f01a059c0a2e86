use crate::error::{Error, Result};
use crate::thread::{PanicStrategy, Priority};

/// Smallest stack a managed thread may be given.
pub const MIN_STACK_SIZE: usize = 16 * 1024;

/// Settings applied to a [`ThreadHandle`](crate::ThreadHandle) when it starts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThreadConfig {
    /// OS thread name. Unnamed threads are called `#<id>`.
    pub name: Option<String>,
    /// Stack size in bytes. `None` keeps the platform default.
    pub stack_size: Option<usize>,
    pub priority: Priority,
    pub panic_strategy: PanicStrategy,
}

impl ThreadConfig {
    pub fn builder() -> ThreadConfigBuilder {
        ThreadConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(size) = self.stack_size {
            validate_stack_size(size)?;
        }
        Ok(())
    }
}

pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::config("thread name must not be empty"));
    }
    if name.contains('\0') {
        return Err(Error::config("thread name must not contain NUL"));
    }
    Ok(())
}

pub(crate) fn validate_stack_size(size: usize) -> Result<()> {
    if size < MIN_STACK_SIZE {
        return Err(Error::config(format!(
            "stack_size too small ({} < {})",
            size, MIN_STACK_SIZE
        )));
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct ThreadConfigBuilder {
    config: ThreadConfig,
}

impl ThreadConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ThreadConfig::default(),
        }
    }

    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.name = Some(name.into());
        self
    }

    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.config.priority = priority;
        self
    }

    pub fn panic_strategy(mut self, strategy: PanicStrategy) -> Self {
        self.config.panic_strategy = strategy;
        self
    }

    pub fn build(self) -> Result<ThreadConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
