//! Login screen: email/password form shown while signed out.

mod render;
mod state;
mod update;

pub use render::render_login;
pub use state::{EMPTY_FIELDS_MESSAGE, LoginFocus, LoginState};
pub use update::{handle_key, handle_login_finished, handle_paste, submit};
