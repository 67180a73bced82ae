pub mod app;
pub mod background;
pub mod input;
pub mod popup;
pub mod search;
pub mod textarea;
pub mod tui;

pub use app::{SubmittedQuery, TerminalSearchApp};
pub use search::{InputState, Search};
