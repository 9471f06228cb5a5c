//! Command handler tests against an in-memory API

mod test_dialogs;
mod test_login;
mod test_tail;
