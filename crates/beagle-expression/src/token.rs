//! Token tree produced by the tokenizer.

use beagle_context::{format_path, PathStep};
use serde_json::Value;

/// One node of an expression's token tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Number, `'string'`, `true`, `false` or `null` written inline.
    Literal(Value),
    /// Lookup into a context: `user.address[0].street`.
    Binding(BindingToken),
    /// Operation call: `sum(a, 1)`.
    Function { name: String, args: Vec<Token> },
}

/// Reference to a context id plus the path read inside it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingToken {
    pub context_id: String,
    pub path: Vec<PathStep>,
}

impl BindingToken {
    pub fn new(context_id: impl Into<String>, path: Vec<PathStep>) -> Self {
        Self {
            context_id: context_id.into(),
            path,
        }
    }

    /// Path inside the context, in normalized text form (`None` for the
    /// whole value).
    pub fn path_text(&self) -> Option<String> {
        if self.path.is_empty() {
            None
        } else {
            Some(format_path(&self.path))
        }
    }

    /// Normalized text of the whole lookup, `user.items[0]`. Two spellings of
    /// the same lookup share one key.
    pub fn cache_key(&self) -> String {
        let mut steps = Vec::with_capacity(self.path.len() + 1);
        steps.push(PathStep::Key(self.context_id.clone()));
        steps.extend(self.path.iter().cloned());
        format_path(&steps)
    }
}

impl Token {
    fn collect_bindings<'a>(&'a self, out: &mut Vec<&'a BindingToken>) {
        match self {
            Token::Literal(_) => {}
            Token::Binding(binding) => out.push(binding),
            Token::Function { args, .. } => {
                for arg in args {
                    arg.collect_bindings(out);
                }
            }
        }
    }
}

/// A piece of a parsed template string.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// Raw text outside `@{…}`, escapes already resolved.
    Text(String),
    Token(Token),
}

/// A tokenized template: the source text and its fragments in order.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedExpression {
    source: String,
    fragments: Vec<Fragment>,
}

impl ParsedExpression {
    pub fn new(source: impl Into<String>, fragments: Vec<Fragment>) -> Self {
        Self {
            source: source.into(),
            fragments,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// The whole template is one `@{…}` with no surrounding text, so its
    /// native value is returned instead of a string.
    pub fn single_token(&self) -> Option<&Token> {
        match self.fragments.as_slice() {
            [Fragment::Token(token)] => Some(token),
            _ => None,
        }
    }

    /// Every context lookup in the template, including those nested inside
    /// function arguments, in source order.
    pub fn binding_tokens(&self) -> Vec<&BindingToken> {
        let mut out = Vec::new();
        for fragment in &self.fragments {
            if let Fragment::Token(token) = fragment {
                token.collect_bindings(&mut out);
            }
        }
        out
    }

    /// Distinct context ids referenced by the template, in first-use order.
    pub fn context_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for binding in self.binding_tokens() {
            if !ids.contains(&binding.context_id.as_str()) {
                ids.push(&binding.context_id);
            }
        }
        ids
    }
}
