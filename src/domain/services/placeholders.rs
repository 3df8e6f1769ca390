#[cfg(test)]
#[path = "placeholders_test.rs"]
mod tests;

use std::collections::HashMap;

use anyhow::Result;
use futures::future::BoxFuture;
use futures::future::FutureExt;
use once_cell::sync::Lazy;
use regex::Regex;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    return Regex::new(r"\{\{(.+?)\}\}").unwrap();
});

/// A `{{A|B|C}}` slot. `raw` keeps the slot exactly as written so it can be
/// put back when nothing resolves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Variable {
    pub raw: String,
    pub candidates: Vec<String>,
}

impl Variable {
    /// True when the slot names exactly `name` with no fallbacks.
    pub fn is(&self, name: &str) -> bool {
        return self.candidates.len() == 1 && self.candidates[0] == name;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Text(String),
    Variable(Variable),
}

pub fn tokenize(template: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = vec![];
    let mut last_end = 0;

    for captures in PLACEHOLDER.captures_iter(template) {
        let (Some(slot), Some(inner)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        if slot.start() > last_end {
            tokens.push(Token::Text(template[last_end..slot.start()].to_string()));
        }
        last_end = slot.end();

        let inner = inner.as_str().trim();
        if inner.is_empty() {
            tokens.push(Token::Text(slot.as_str().to_string()));
            continue;
        }

        tokens.push(Token::Variable(Variable {
            raw: slot.as_str().to_string(),
            candidates: inner
                .split('|')
                .map(|candidate| return candidate.trim().to_string())
                .collect(),
        }));
    }

    if last_end < template.len() {
        tokens.push(Token::Text(template[last_end..].to_string()));
    }

    return tokens;
}

pub type ResolverFuture<'a> = BoxFuture<'a, Result<String>>;

type Resolver<'a> = Box<dyn Fn() -> ResolverFuture<'a> + Send + Sync + 'a>;

/// Named value sources for one resolution. Resolvers are lazy: nothing runs
/// until a template reaches the slot that names it.
#[derive(Default)]
pub struct VariableTable<'a> {
    resolvers: HashMap<String, Resolver<'a>>,
}

impl<'a> VariableTable<'a> {
    pub fn new() -> VariableTable<'a> {
        return VariableTable {
            resolvers: HashMap::new(),
        };
    }

    pub fn register<F>(&mut self, name: &str, resolver: F)
    where
        F: Fn() -> ResolverFuture<'a> + Send + Sync + 'a,
    {
        self.resolvers.insert(name.to_string(), Box::new(resolver));
    }

    pub fn register_value(&mut self, name: &str, value: String) {
        self.register(name, move || {
            return futures::future::ready(Ok(value.to_string())).boxed();
        });
    }

    /// Starts the resolver registered under `name`, if there is one.
    pub fn evaluate(&self, name: &str) -> Option<ResolverFuture<'a>> {
        return self.resolvers.get(name).map(|resolver| return resolver());
    }
}

#[allow(clippy::implicit_return)]
async fn resolve_variable(variable: &Variable, variables: &VariableTable<'_>) -> Result<String> {
    for candidate in &variable.candidates {
        let Some(pending) = variables.evaluate(candidate) else {
            continue;
        };

        let value = pending.await?;
        if !value.is_empty() {
            return Ok(value);
        }
    }

    tracing::debug!(slot = %variable.raw, "No candidate resolved, keeping slot text");
    return Ok(variable.raw.to_string());
}

/// Substitutes every placeholder in `template`. Slots are resolved one after
/// another in document order and each slot tries its candidates left to right,
/// so a resolver is only ever invoked when every candidate before it came back
/// empty.
#[allow(clippy::implicit_return)]
pub async fn resolve(template: &str, variables: &VariableTable<'_>) -> Result<String> {
    let mut result = String::new();

    for token in tokenize(template) {
        match token {
            Token::Text(text) => result.push_str(&text),
            Token::Variable(variable) => {
                let value = resolve_variable(&variable, variables).await?;
                result.push_str(&value);
            }
        }
    }

    return Ok(result);
}
