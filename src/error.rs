//! Application error type.
//!
//! Every fallible operation in the crate returns `Result<_, AppError>`. The
//! error carries the process exit code it should map to, so `main` never has
//! to inspect the message.
//!
//! | code | meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 2    | configuration, usage, local file or database open problems |
//! | 3    | requested record does not exist                          |
//! | 4    | remote dataset unavailable; the update was aborted        |
//! | 5    | storage failure while reading or writing factors          |

#[derive(Clone)]
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

    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(5, message)
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
