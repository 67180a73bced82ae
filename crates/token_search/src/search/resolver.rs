use super::tokenizer::{tokenize, Token, TokenConfig};

/// The token under the caret together with where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveToken<'a> {
    pub index: usize,
    /// Character offset of the token's first character.
    pub start: usize,
    pub token: &'a Token,
}

/// Index of the token containing `caret`, scanning spans as `start < caret <= end`.
///
/// A caret on a boundary belongs to the token ending there, so a caret at 0
/// never selects anything. `None` for the caret means the input is unfocused.
pub fn resolve_active_token_index(tokens: &[Token], caret: Option<usize>) -> Option<usize> {
    let caret = caret?;
    let mut prev = 0;
    for (index, token) in tokens.iter().enumerate() {
        let start = prev;
        let end = start + token.length;
        prev = end;
        if start < caret && caret <= end {
            return Some(index);
        }
    }
    None
}

/// Tokenize `text` and resolve the caret against the result.
pub fn resolve_in_text(text: &str, caret: Option<usize>, config: &TokenConfig) -> Option<usize> {
    resolve_active_token_index(&tokenize(text, config), caret)
}

pub fn is_last_token_selected(tokens: &[Token], active_index: Option<usize>) -> bool {
    !tokens.is_empty() && active_index == Some(tokens.len() - 1)
}

pub fn active_token(tokens: &[Token], caret: Option<usize>) -> Option<ActiveToken<'_>> {
    let index = resolve_active_token_index(tokens, caret)?;
    Some(ActiveToken {
        index,
        start: tokens[..index].iter().map(|t| t.length).sum(),
        token: &tokens[index],
    })
}
