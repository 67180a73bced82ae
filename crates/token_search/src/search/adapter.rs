use indexmap::IndexMap;
use ratatui::style::{Color, Modifier, Style};

use super::tokenizer::{Token, TokenKind};
use crate::config::SearchConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub label: String,
    pub detail: Option<String>,
}

#[derive(Debug, Clone)]
struct FieldEntry {
    label: String,
    description: Option<String>,
    values: Vec<String>,
    color: Option<Color>,
}

/// Styling and suggestion hints for each kind of token, built from a [`SearchConfig`].
#[derive(Debug, Clone)]
pub struct AdapterLookup {
    fields: IndexMap<String, FieldEntry>,
    operators: Vec<String>,
    max_suggestions: usize,
}

pub fn get_adapter(config: &SearchConfig) -> AdapterLookup {
    let fields = config
        .fields
        .iter()
        .map(|field| {
            let entry = FieldEntry {
                label: field.name.clone(),
                description: field.description.clone(),
                values: field.values.clone(),
                color: field.color.as_deref().and_then(|c| c.parse().ok()),
            };
            (field.name.to_lowercase(), entry)
        })
        .collect();
    AdapterLookup {
        fields,
        operators: config.operators.clone(),
        max_suggestions: config.max_suggestions,
    }
}

impl AdapterLookup {
    pub fn adapter<'a>(&'a self, token: &'a Token) -> Adapter<'a> {
        Adapter {
            lookup: self,
            token,
        }
    }

    fn field(&self, token: &Token) -> Option<&FieldEntry> {
        token.field.as_deref().and_then(|name| self.fields.get(name))
    }
}

/// Adapter for a single token.
pub struct Adapter<'a> {
    lookup: &'a AdapterLookup,
    token: &'a Token,
}

impl Adapter<'_> {
    pub fn style(&self) -> Style {
        let field_color = self.lookup.field(self.token).and_then(|f| f.color);
        match self.token.kind {
            TokenKind::Field => Style::default()
                .fg(field_color.unwrap_or(Color::Cyan))
                .add_modifier(Modifier::BOLD),
            TokenKind::Value => Style::default().fg(field_color.unwrap_or(Color::Green)),
            TokenKind::Operator => Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
            TokenKind::Separator => Style::default().fg(Color::DarkGray),
            TokenKind::Text | TokenKind::Whitespace => Style::default(),
        }
    }

    /// Popup entries for this token, most relevant first.
    pub fn suggestions(&self) -> Vec<Suggestion> {
        let typed = self.typed().to_lowercase();
        let extends = |label: &str| {
            let label = label.to_lowercase();
            label.starts_with(&typed) && label != typed
        };

        let suggestions: Vec<Suggestion> = match self.token.kind {
            // Caret right after `name:`: offer every known value.
            TokenKind::Field => self
                .lookup
                .field(self.token)
                .map(|f| f.values.iter().map(|v| plain(v)).collect())
                .unwrap_or_default(),
            TokenKind::Value => self
                .lookup
                .field(self.token)
                .map(|f| {
                    f.values
                        .iter()
                        .filter(|v| extends(v))
                        .map(|v| plain(v))
                        .collect()
                })
                .unwrap_or_default(),
            TokenKind::Text => {
                let fields = self.lookup.fields.values().filter_map(|f| {
                    let label = format!("{}:", f.label);
                    extends(&label).then(|| Suggestion {
                        label,
                        detail: f.description.clone(),
                    })
                });
                let operators = self
                    .lookup
                    .operators
                    .iter()
                    .filter(|op| extends(op))
                    .map(|op| plain(op));
                fields.chain(operators).collect()
            }
            TokenKind::Operator => self
                .lookup
                .operators
                .iter()
                .filter(|op| extends(op))
                .map(|op| plain(op))
                .collect(),
            TokenKind::Separator | TokenKind::Whitespace => Vec::new(),
        };

        suggestions
            .into_iter()
            .take(self.lookup.max_suggestions)
            .collect()
    }

    /// Remaining characters of the first suggestion that extends what was typed.
    pub fn completion(&self) -> Option<String> {
        if self.token.kind.is_field() {
            return None;
        }
        let typed = self.typed();
        let skip = typed.chars().count();
        self.suggestions()
            .into_iter()
            .next()
            .map(|s| s.label.chars().skip(skip).collect::<String>())
            .filter(|rest| !rest.is_empty())
    }

    /// The token text used for prefix matching; an opening quote is not part of it.
    fn typed(&self) -> &str {
        let text = self.token.text.as_str();
        text.strip_prefix('"').unwrap_or(text)
    }
}

fn plain(label: &str) -> Suggestion {
    Suggestion {
        label: label.to_string(),
        detail: None,
    }
}
