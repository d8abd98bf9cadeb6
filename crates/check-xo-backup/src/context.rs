use core::fmt::Display;

/// Holds the context for the current check. Used for prefixing logs.
#[derive(Default, Debug)]
pub struct Context {
    /// The job being checked.
    pub job: Option<String>,
    /// The current context
    pub current_context: &'static str,
}

impl Context {
    /// Create a context for checking `job`.
    pub fn for_job(job: &str) -> Self {
        Self {
            job: Some(job.to_string()),
            current_context: "",
        }
    }
}

impl Display for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if let Some(job) = &self.job {
            write!(f, "[{job}] ")?;
        }

        write!(f, "[{}] ", self.current_context)?;

        Ok(())
    }
}
