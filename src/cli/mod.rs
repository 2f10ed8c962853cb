pub mod quotes;
pub mod setup;
pub mod ui;
pub mod watch;
