//! Window rules
//!
//! Rules use the `windowrulev2` syntax: an effect, a comma, and a class
//! matcher, e.g. `float, class:^(kitty-bg)$` or
//! `size 100% 100%, class:^(kitty-bg)$`. The matcher understands the regex
//! subset rules are written in practice: optional `^`/`$` anchors around
//! either a literal or a group of `|`-separated literals. A backslash makes
//! the next character literal.

use anyhow::{anyhow, bail, Context, Result};
use log::debug;

use crate::geometry::Vector2D;

/// One dimension of a `size` rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizeValue {
    Pixels(f64),
    /// Percentage of the output size
    Percent(f64),
}

impl SizeValue {
    fn parse(token: &str) -> Result<Self> {
        if let Some(percent) = token.strip_suffix('%') {
            let value: f64 = percent
                .parse()
                .with_context(|| format!("Invalid percentage: {}", token))?;
            Ok(SizeValue::Percent(value))
        } else {
            let value: f64 = token.parse().with_context(|| format!("Invalid size: {}", token))?;
            Ok(SizeValue::Pixels(value))
        }
    }

    pub fn resolve(&self, reference: f64) -> f64 {
        match self {
            SizeValue::Pixels(px) => *px,
            SizeValue::Percent(percent) => reference * percent / 100.0,
        }
    }
}

/// What a rule does to a matching window
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleEffect {
    Float,
    Tile,
    Pin,
    Size(SizeValue, SizeValue),
}

impl RuleEffect {
    fn parse(text: &str) -> Result<Self> {
        let mut tokens = text.split_whitespace();
        let name = tokens.next().ok_or_else(|| anyhow!("Missing rule effect"))?;

        let effect = match name {
            "float" => RuleEffect::Float,
            "tile" => RuleEffect::Tile,
            "pin" => RuleEffect::Pin,
            "size" => {
                let (Some(w), Some(h)) = (tokens.next(), tokens.next()) else {
                    bail!("size expects two values: {}", text);
                };
                RuleEffect::Size(SizeValue::parse(w)?, SizeValue::parse(h)?)
            }
            other => bail!("Unknown rule effect: {}", other),
        };

        if let Some(extra) = tokens.next() {
            bail!("Unexpected argument to {}: {}", name, extra);
        }
        Ok(effect)
    }

    /// Size in layout coordinates relative to `output_size`
    pub fn resolve_size(&self, output_size: Vector2D) -> Option<Vector2D> {
        match self {
            RuleEffect::Size(w, h) => Some(Vector2D::new(w.resolve(output_size.x), h.resolve(output_size.y))),
            _ => None,
        }
    }
}

/// Class matcher of a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassPattern {
    alternatives: Vec<String>,
    anchored_start: bool,
    anchored_end: bool,
}

impl ClassPattern {
    pub fn parse(pattern: &str) -> Result<Self> {
        let (anchored_start, rest) = match pattern.strip_prefix('^') {
            Some(rest) => (true, rest),
            None => (false, pattern),
        };
        let (anchored_end, body) = match rest.strip_suffix('$') {
            Some(body) if !ends_with_escape(body) => (true, body),
            _ => (false, rest),
        };

        let body = match body.strip_prefix('(') {
            Some(inner) => match inner.strip_suffix(')') {
                Some(group) if !ends_with_escape(group) => group,
                _ => bail!("Unbalanced group in class pattern: {}", pattern),
            },
            None => body,
        };

        let mut alternatives = Vec::new();
        let mut current = String::new();
        let mut chars = body.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    let escaped = chars
                        .next()
                        .ok_or_else(|| anyhow!("Trailing escape in class pattern: {}", pattern))?;
                    current.push(escaped);
                }
                '|' => alternatives.push(std::mem::take(&mut current)),
                '(' | ')' | '*' | '+' | '?' | '[' | ']' | '{' | '}' | '^' | '$' => {
                    bail!("Unsupported class pattern: {}", pattern)
                }
                _ => current.push(c),
            }
        }
        alternatives.push(current);

        Ok(Self {
            alternatives,
            anchored_start,
            anchored_end,
        })
    }

    pub fn matches(&self, class: &str) -> bool {
        self.alternatives.iter().any(|alt| match (self.anchored_start, self.anchored_end) {
            (true, true) => class == alt.as_str(),
            (true, false) => class.starts_with(alt.as_str()),
            (false, true) => class.ends_with(alt.as_str()),
            (false, false) => class.contains(alt.as_str()),
        })
    }
}

/// Escape `class` so it matches literally inside a rule's class pattern
pub fn escape_class(class: &str) -> String {
    let mut escaped = String::with_capacity(class.len());
    for c in class.chars() {
        if matches!(
            c,
            '\\' | '(' | ')' | '*' | '+' | '?' | '[' | ']' | '{' | '}' | '|' | '^' | '$' | '.'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn ends_with_escape(text: &str) -> bool {
    text.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// A parsed `windowrulev2` declaration
#[derive(Debug, Clone, PartialEq)]
pub struct WindowRule {
    pub effect: RuleEffect,
    pub class: ClassPattern,
    /// The declaration as written
    pub source: String,
}

impl WindowRule {
    pub fn parse(value: &str) -> Result<Self> {
        let (effect, matcher) = value
            .split_once(',')
            .ok_or_else(|| anyhow!("Window rule needs an effect and a matcher: {}", value))?;

        let matcher = matcher.trim();
        let pattern = matcher
            .strip_prefix("class:")
            .ok_or_else(|| anyhow!("Unsupported window rule matcher: {}", matcher))?;

        Ok(Self {
            effect: RuleEffect::parse(effect.trim())?,
            class: ClassPattern::parse(pattern.trim())?,
            source: value.to_string(),
        })
    }
}

/// Rules in declaration order; later rules win on conflict
#[derive(Debug, Default)]
pub struct RuleStore {
    rules: Vec<WindowRule>,
}

impl RuleStore {
    pub fn add(&mut self, rule: WindowRule) {
        debug!("Added window rule: {}", rule.source);
        self.rules.push(rule);
    }

    pub fn clear(&mut self) {
        self.rules.clear();
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WindowRule> {
        self.rules.iter()
    }

    /// Effects of every rule matching `class`, in declaration order
    pub fn matching(&self, class: &str) -> Vec<RuleEffect> {
        self.rules
            .iter()
            .filter(|rule| rule.class.matches(class))
            .map(|rule| rule.effect)
            .collect()
    }
}
