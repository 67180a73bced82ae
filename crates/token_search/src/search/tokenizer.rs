use derive_more::IsVariant;
use indexmap::IndexSet;

use crate::config::SearchConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IsVariant)]
pub enum TokenKind {
    /// `name:` for a configured field, colon included.
    Field,
    /// The word or quoted phrase directly following a field.
    Value,
    /// `AND`, `OR`, `NOT` and any other configured operator.
    Operator,
    /// Free text.
    Text,
    Separator,
    Whitespace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Number of characters of the input this token consumes.
    pub length: usize,
    /// Lowercased field name for `Field` and `Value` tokens.
    pub field: Option<String>,
}

impl Token {
    fn new(kind: TokenKind, text: &str, field: Option<String>) -> Self {
        Self {
            kind,
            text: text.to_string(),
            length: text.chars().count(),
            field,
        }
    }
}

/// Lookup form of [`SearchConfig`] used by the tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenConfig {
    fields: IndexSet<String>,
    operators: IndexSet<String>,
    separators: Vec<char>,
}

impl TokenConfig {
    pub fn is_field(&self, name: &str) -> bool {
        self.fields.contains(&name.to_lowercase())
    }

    pub fn is_operator(&self, word: &str) -> bool {
        self.operators.contains(&word.to_uppercase())
    }

    pub fn is_separator(&self, ch: char) -> bool {
        self.separators.contains(&ch)
    }
}

pub fn prepare_config(config: &SearchConfig) -> TokenConfig {
    TokenConfig {
        fields: config.fields.iter().map(|f| f.name.to_lowercase()).collect(),
        operators: config.operators.iter().map(|op| op.to_uppercase()).collect(),
        separators: config.separators.clone(),
    }
}

/// Split `text` into tokens. Tokens are contiguous and cover the whole input,
/// so their lengths always sum to `text.chars().count()`.
pub fn tokenize(text: &str, config: &TokenConfig) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = text;
    // Set right after a `Field` token; the next word or phrase becomes its value.
    let mut pending_field: Option<String> = None;

    while let Some(ch) = rest.chars().next() {
        let end = if ch.is_whitespace() {
            let end = rest
                .find(|c: char| !c.is_whitespace())
                .unwrap_or(rest.len());
            pending_field = None;
            tokens.push(Token::new(TokenKind::Whitespace, &rest[..end], None));
            end
        } else if config.is_separator(ch) {
            let end = ch.len_utf8();
            pending_field = None;
            tokens.push(Token::new(TokenKind::Separator, &rest[..end], None));
            end
        } else if ch == '"' {
            // Unterminated phrases run to the end of the input.
            let end = rest[1..].find('"').map(|i| i + 2).unwrap_or(rest.len());
            tokens.push(phrase_or_value(&rest[..end], pending_field.take()));
            end
        } else {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '"' || config.is_separator(c))
                .unwrap_or(rest.len());
            let word = &rest[..end];
            if let Some(field) = pending_field.take() {
                tokens.push(Token::new(TokenKind::Value, word, Some(field)));
                end
            } else if let Some(colon) = word.find(':').filter(|&i| config.is_field(&word[..i])) {
                let name = word[..colon].to_lowercase();
                tokens.push(Token::new(
                    TokenKind::Field,
                    &word[..=colon],
                    Some(name.clone()),
                ));
                pending_field = Some(name);
                colon + 1
            } else if config.is_operator(word) {
                tokens.push(Token::new(TokenKind::Operator, word, None));
                end
            } else {
                tokens.push(Token::new(TokenKind::Text, word, None));
                end
            }
        };
        rest = &rest[end..];
    }

    tokens
}

fn phrase_or_value(text: &str, field: Option<String>) -> Token {
    match field {
        Some(field) => Token::new(TokenKind::Value, text, Some(field)),
        None => Token::new(TokenKind::Text, text, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_config() -> TokenConfig {
        prepare_config(&SearchConfig::default())
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_empty_input_has_no_tokens() {
        assert!(tokenize("", &default_config()).is_empty());
    }

    #[test]
    fn test_separator_splits_words() {
        let tokens = tokenize("ab,cd", &default_config());
        assert_eq!(texts(&tokens), vec!["ab", ",", "cd"]);
        assert_eq!(
            tokens.iter().map(|t| t.length).collect::<Vec<_>>(),
            vec![2, 1, 2]
        );
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Text, TokenKind::Separator, TokenKind::Text]
        );
    }

    #[test]
    fn test_field_and_value() {
        let tokens = tokenize("Status:open bug", &default_config());
        assert_eq!(texts(&tokens), vec!["Status:", "open", " ", "bug"]);
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::Field,
                TokenKind::Value,
                TokenKind::Whitespace,
                TokenKind::Text
            ]
        );
        assert_eq!(tokens[0].field.as_deref(), Some("status"));
        assert_eq!(tokens[1].field.as_deref(), Some("status"));
        assert_eq!(tokens[3].field, None);
    }

    #[test]
    fn test_field_without_value() {
        let tokens = tokenize("label: x", &default_config());
        assert_eq!(texts(&tokens), vec!["label:", " ", "x"]);
        assert!(tokens[2].kind.is_text());
    }

    #[test]
    fn test_unknown_field_is_text() {
        let tokens = tokenize("color:red", &default_config());
        assert_eq!(texts(&tokens), vec!["color:red"]);
        assert!(tokens[0].kind.is_text());
    }

    #[test]
    fn test_value_may_contain_colons() {
        let tokens = tokenize("author:a:b", &default_config());
        assert_eq!(texts(&tokens), vec!["author:", "a:b"]);
        assert!(tokens[1].kind.is_value());
    }

    #[test]
    fn test_operators_are_case_insensitive() {
        let tokens = tokenize("bug and not docs", &default_config());
        assert!(tokens[2].kind.is_operator());
        assert!(tokens[4].kind.is_operator());
        assert!(tokens[6].kind.is_text());
    }

    #[test]
    fn test_quoted_phrases() {
        let tokens = tokenize(r#"label:"good first" "free text"#, &default_config());
        assert_eq!(
            texts(&tokens),
            vec!["label:", "\"good first\"", " ", "\"free text"]
        );
        assert!(tokens[1].kind.is_value());
        assert!(tokens[3].kind.is_text());
    }

    #[test]
    fn test_lengths_cover_input() {
        let config = default_config();
        for text in [
            "",
            "   ",
            "status:open,label:bug AND \"x y\"",
            "naïve café ,, ü:ß",
            "\"unterminated status:open",
            "is:",
            "日本語 status:開く",
        ] {
            let tokens = tokenize(text, &config);
            let total: usize = tokens.iter().map(|t| t.length).sum();
            assert_eq!(total, text.chars().count(), "coverage of {text:?}");
            let joined: String = tokens.iter().map(|t| t.text.as_str()).collect();
            assert_eq!(joined, text);
        }
    }

    #[test]
    fn test_tokenize_is_deterministic() {
        let config = default_config();
        let text = "status:open OR label:docs, hello";
        assert_eq!(tokenize(text, &config), tokenize(text, &config));
    }
}
