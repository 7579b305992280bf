//! Rule parser
//!
//! Turns rule specifications into [`Step`]s:
//!
//! - `parse` handles a single step (`name:arg1,arg2`, `[name, args...]`,
//!   or an embedded closure / capability object / constructor)
//! - `expand` handles a whole chain (`step1|step2` or a list of steps)
//! - `explode` resolves a keyed rule mapping against live data, expanding
//!   wildcard keys into the concrete leaf paths they match
//!
//! Argument strings are split on `,` with no quoting, so a literal comma
//! cannot be passed as part of a string argument.

use super::path;
use super::types::{
    Arg, CastType, ChainSpec, RuleMap, Step, StepSpec, BLANK_MARKER, DELEGATE_PREFIX,
    VALUE_PLACEHOLDER,
};
use crate::value::{Map, Value};
use crate::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;

static CAST_REGEX: OnceLock<Regex> = OnceLock::new();

fn cast_regex() -> &'static Regex {
    CAST_REGEX.get_or_init(|| {
        Regex::new(r"(?s)^(.+)@(int|str|float|bool|array|object)$")
            .expect("cast pattern is valid")
    })
}

/// Rules resolved to concrete keys, in application order
#[derive(Debug, Clone, Default)]
pub struct ExplodedRules {
    pub rules: Vec<(String, Vec<Step>)>,
}

impl ExplodedRules {
    fn merge(&mut self, key: &str, steps: Vec<Step>) {
        match self.rules.iter_mut().find(|(existing, _)| existing == key) {
            Some((_, existing)) => existing.extend(steps),
            None => self.rules.push((key.to_string(), steps)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[Step]> {
        self.rules
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, steps)| steps.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Parser for rule mappings bound to a data mapping
pub struct RuleParser<'a> {
    data: &'a Map,
}

impl<'a> RuleParser<'a> {
    /// Create a parser resolving wildcard keys against `data`
    pub fn new(data: &'a Map) -> Self {
        Self { data }
    }

    /// Parse a single step specification
    pub fn parse(spec: &StepSpec) -> Step {
        match spec {
            StepSpec::Text(text) => parse_text_step(text),
            StepSpec::List(items) => parse_list_step(items),
            StepSpec::Constructor {
                type_name,
                constructor,
            } => Step::Construct {
                type_name: type_name.clone(),
                constructor: constructor.clone(),
            },
            StepSpec::Transformable(transformable) => Step::Transformable(transformable.clone()),
            StepSpec::Closure(closure) => Step::Closure(closure.clone()),
        }
    }

    /// Parse a chain specification into ordered steps
    ///
    /// An empty or whitespace-only chain string has no steps.
    pub fn expand(chain: &ChainSpec) -> Vec<Step> {
        match chain {
            ChainSpec::Text(text) if text.trim().is_empty() => Vec::new(),
            ChainSpec::Text(text) => text.split('|').map(parse_text_step).collect(),
            ChainSpec::Steps(steps) => steps.iter().map(Self::parse).collect(),
        }
    }

    /// Resolve every rule key to the concrete keys it applies to
    ///
    /// Keys without `*` pass through whether or not they exist. Wildcard keys
    /// are matched against the leaf paths of the data; one that matches
    /// nothing is dropped. Steps for a key reached by several rules are
    /// concatenated in rule order.
    pub fn explode(&self, rules: &RuleMap) -> Result<ExplodedRules> {
        let mut exploded = ExplodedRules::default();
        let mut leaves: Option<Vec<String>> = None;

        for (key, chain) in rules.iter() {
            let steps = Self::expand(chain);

            if !key.contains('*') {
                exploded.merge(key, steps);
                continue;
            }

            let pattern = wildcard_regex(key)?;
            let leaves = leaves.get_or_insert_with(|| path::leaf_paths(self.data));
            let mut matched = 0usize;
            for leaf in leaves.iter().filter(|leaf| pattern.is_match(leaf)) {
                exploded.merge(leaf, steps.clone());
                matched += 1;
            }

            log::debug!("Wildcard rule '{}' matched {} key(s)", key, matched);
        }

        Ok(exploded)
    }
}

/// Build the anchored matcher for a wildcard key; `*` stays inside one segment
fn wildcard_regex(key: &str) -> Result<Regex> {
    let body = key
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"[^.]*");

    Regex::new(&format!("^{body}$")).map_err(|e| Error::Configuration {
        message: format!("Invalid wildcard rule key '{}'", key),
        source: Some(e.into()),
    })
}

fn parse_text_step(text: &str) -> Step {
    let (name, args) = match text.split_once(':') {
        Some((name, params)) => (
            name,
            params
                .split(',')
                .map(|param| classify_arg(Value::from(param)))
                .collect(),
        ),
        None => (text, Vec::new()),
    };

    log::trace!("Parsed step '{}' with {} argument(s)", name.trim(), args.len());
    build_step(name.trim(), args)
}

fn parse_list_step(items: &[Value]) -> Step {
    let name = items.first().map(Value::to_text).unwrap_or_default();
    let args = items.iter().skip(1).cloned().map(classify_arg).collect();
    build_step(name.trim(), args)
}

fn build_step(name: &str, args: Vec<Arg>) -> Step {
    if name == BLANK_MARKER {
        return Step::BlankGuard;
    }

    match name.strip_prefix(DELEGATE_PREFIX) {
        Some(method) => Step::Delegate {
            method: method.trim().to_string(),
            args,
        },
        None => Step::Named {
            name: name.to_string(),
            args,
        },
    }
}

/// Classify an argument as placeholder, typed cast or plain literal
pub fn classify_arg(value: Value) -> Arg {
    let text = match value {
        Value::Str(text) => text,
        other => return Arg::Literal(other),
    };

    if text.trim() == VALUE_PLACEHOLDER {
        return Arg::Placeholder(text);
    }

    let cast = cast_regex().captures(&text).and_then(|caps| {
        let to = CastType::from_suffix(caps.get(2)?.as_str())?;
        Some(Arg::Cast {
            literal: caps.get(1)?.as_str().to_string(),
            to,
        })
    });

    cast.unwrap_or(Arg::Literal(Value::Str(text)))
}
