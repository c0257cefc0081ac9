//! Exit codes for the Riptide CLI.

/// Exit codes for the CLI: the four terminal outcomes a crawl run can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Completed (0)
    Success = 0,

    /// Usage error: bad flags, malformed scope patterns (1)
    UsageError = 1,

    /// Scope too strict: no seed was enqueued (2)
    ScopeTooStrict = 2,

    /// Unrecoverable init failure: builder/config validation, shared-store
    /// connect failure, checkpoint I/O on load (3)
    InitFailure = 3,
}

impl ExitCode {
    /// Convert exit code to integer
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Classify a crawl-run failure into its exit code.
pub fn exit_code_for(err: &riptide_types::RiptideError) -> ExitCode {
    match err {
        riptide_types::RiptideError::ScopeTooStrict => ExitCode::ScopeTooStrict,
        _ => ExitCode::InitFailure,
    }
}
