#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,

    /// Invalid CLI/config input, including an output-directory collision
    /// detected before any run executes.
    InvalidInput = 30,

    /// Internal/runtime error (IO errors, load-generator spawn failures).
    RuntimeError = 40,
}

impl ExitCode {
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}
