//! Query screen: username lookup and results table shown while signed in.

mod render;
mod state;
mod update;

pub use render::{QueryView, TITLE, render_query};
pub use state::{
    EMPTY_USERNAME_MESSAGE, NO_DATA_MESSAGE, NOT_AUTHENTICATED_MESSAGE, QueryFailure, QueryState,
};
pub use update::{execute, handle_key, handle_paste, handle_query_finished};
