//! Command implementations
//!
//! Each module corresponds to a subcommand in the CLI. The `run` functions
//! open the session; the inner functions take any [`crate::MessagingApi`]
//! and an output sink.

pub mod dialogs;
pub mod login;
pub mod search;
pub mod tail;

pub use dialogs::{list_dialogs, run as dialogs_run};
pub use login::{login, run as login_run};
pub use search::{run as search_run, search};
pub use tail::{run as tail_run, tail};
