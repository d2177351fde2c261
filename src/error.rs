/// Exit code for usage, configuration and local I/O problems.
pub const EXIT_CONFIG: u8 = 2;
/// Exit code for upstream data problems (transport, HTTP status, response shape).
pub const EXIT_UPSTREAM: u8 = 3;
/// Exit code for runs aborted by the missing-indicator policy.
pub const EXIT_PIPELINE: u8 = 4;

#[derive(Clone, PartialEq, Eq)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(EXIT_UPSTREAM, message)
    }

    pub fn pipeline(message: impl Into<String>) -> Self {
        Self::new(EXIT_PIPELINE, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
