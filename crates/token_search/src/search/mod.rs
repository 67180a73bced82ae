//! Tokenizing, caret resolution and per-token adapters for the search box.

pub mod adapter;
pub mod resolver;
pub mod tokenizer;

pub use adapter::{get_adapter, Adapter, AdapterLookup, Suggestion};
pub use resolver::{
    active_token, is_last_token_selected, resolve_active_token_index, resolve_in_text,
    ActiveToken,
};
pub use tokenizer::{prepare_config, tokenize, Token, TokenConfig, TokenKind};
