//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only (no direct UI mutations).

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Ask the session task to sign in.
    SubmitLogin { email: String, password: String },

    /// Ask the session task to sign out.
    Logout,

    /// Obtain a fresh token and look up records for `username`.
    RunQuery { seq: u64, username: String },

    /// Open a URL in the system browser.
    OpenBrowser { url: String },
}
