//! Built-in transformers for common operations
//!
//! The engine does not depend on any of these; they are an opt-in catalog
//! installed by [`FunctionRegistry::with_builtins`]. Functions receive the
//! prepared argument list, so the current value is the first argument unless
//! the rule moved it with the `:value:` placeholder.
//!
//! Two object types are included for delegate chains: `Date` and `Text`.

use super::registry::FunctionRegistry;
use crate::value::{Receiver, Value};
use crate::{Error, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::fmt::Write as _;

/// Install the whole catalog into a registry
pub fn register_all(registry: &mut FunctionRegistry) {
    registry
        .register_function("trim", |args| trim_with("trim", args, |s, set| s.trim_matches(|c: char| set(c))))
        .register_function("ltrim", |args| {
            trim_with("ltrim", args, |s, set| s.trim_start_matches(|c: char| set(c)))
        })
        .register_function("rtrim", |args| {
            trim_with("rtrim", args, |s, set| s.trim_end_matches(|c: char| set(c)))
        })
        .register_function("uppercase", |args| Ok(subject("uppercase", &args)?.to_uppercase().into()))
        .register_function("lowercase", |args| Ok(subject("lowercase", &args)?.to_lowercase().into()))
        .register_function("titlecase", |args| Ok(titlecase(&subject("titlecase", &args)?).into()))
        .register_function("capitalize", |args| Ok(capitalize(&subject("capitalize", &args)?).into()))
        .register_function("strip_non_digits", |args| {
            let text = subject("strip_non_digits", &args)?;
            Ok(text.chars().filter(char::is_ascii_digit).collect::<String>().into())
        })
        .register_function("replace", replace)
        .register_function("regex_replace", regex_replace)
        .register_function("to_int", |args| {
            let value = arg("to_int", &args, 0)?;
            value
                .coerce_int()
                .map(Value::Int)
                .ok_or_else(|| cannot_convert("to_int", value, "int"))
        })
        .register_function("to_float", |args| {
            let value = arg("to_float", &args, 0)?;
            value
                .coerce_float()
                .map(Value::Float)
                .ok_or_else(|| cannot_convert("to_float", value, "float"))
        })
        .register_function("to_string", |args| Ok(arg("to_string", &args, 0)?.to_text().into()))
        .register_function("to_bool", |args| Ok(arg("to_bool", &args, 0)?.coerce_bool().into()))
        .register_function("default", |args| {
            let value = arg("default", &args, 0)?;
            if value.is_blank() {
                Ok(args.get(1).cloned().unwrap_or(Value::Null))
            } else {
                Ok(value.clone())
            }
        })
        .register_function("json_decode", |args| {
            let text = subject("json_decode", &args)?;
            serde_json::from_str::<serde_json::Value>(&text)
                .map(Value::from)
                .map_err(|e| Error::invalid_arguments("json_decode", e.to_string()))
        })
        .register_function("split", |args| {
            let text = subject("split", &args)?;
            let separator = optional_text(&args, 1).unwrap_or_else(|| ",".to_string());
            if separator.is_empty() {
                return Err(Error::invalid_arguments("split", "separator cannot be empty"));
            }
            Ok(Value::List(text.split(separator.as_str()).map(Value::from).collect()))
        })
        .register_function("join", |args| {
            let items = match arg("join", &args, 0)? {
                Value::List(items) => items,
                other => return Err(cannot_convert("join", other, "list")),
            };
            let separator = optional_text(&args, 1).unwrap_or_else(|| ",".to_string());
            Ok(items
                .iter()
                .map(Value::to_text)
                .collect::<Vec<_>>()
                .join(separator.as_str())
                .into())
        })
        .register_type("Date", Date::construct)
        .register_type("Text", |value| Ok(Value::object(Text(value.to_text()))));

    for (alias, target) in [
        ("ucwords", "titlecase"),
        ("ucfirst", "capitalize"),
        ("intval", "to_int"),
        ("floatval", "to_float"),
        ("strval", "to_string"),
        ("boolval", "to_bool"),
    ] {
        if let Err(e) = registry.register_alias(alias, target) {
            log::warn!("Skipping built-in alias: {}", e);
        }
    }
}

fn arg<'a>(function: &str, args: &'a [Value], index: usize) -> Result<&'a Value> {
    args.get(index).ok_or_else(|| {
        Error::invalid_arguments(function, format!("missing argument {}", index + 1))
    })
}

/// Text form of the first argument; containers are rejected
fn subject(function: &str, args: &[Value]) -> Result<String> {
    text_at(function, args, 0)
}

fn text_at(function: &str, args: &[Value], index: usize) -> Result<String> {
    match arg(function, args, index)? {
        value @ (Value::List(_) | Value::Map(_)) => Err(cannot_convert(function, value, "string")),
        value => Ok(value.to_text()),
    }
}

fn optional_text(args: &[Value], index: usize) -> Option<String> {
    args.get(index).map(Value::to_text)
}

fn cannot_convert(function: &str, value: &Value, to: &str) -> Error {
    Error::invalid_arguments(
        function,
        format!("cannot convert {} to {}", value.type_name(), to),
    )
}

fn trim_with<F>(function: &str, args: Vec<Value>, trim: F) -> Result<Value>
where
    F: for<'s> Fn(&'s str, &dyn Fn(char) -> bool) -> &'s str,
{
    let text = subject(function, &args)?;
    let trimmed = match optional_text(&args, 1) {
        Some(chars) => trim(&text, &|c| chars.contains(c)).to_string(),
        None => trim(&text, &char::is_whitespace).to_string(),
    };
    Ok(trimmed.into())
}

/// Upper-case the first letter of every whitespace separated word
pub fn titlecase(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if at_word_start {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = ch.is_whitespace();
    }
    out
}

/// Upper-case the first letter
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `replace(search, replacement, subject)`
fn replace(args: Vec<Value>) -> Result<Value> {
    let search = text_at("replace", &args, 0)?;
    let replacement = text_at("replace", &args, 1)?;
    let subject = text_at("replace", &args, 2)?;
    if search.is_empty() {
        return Ok(subject.into());
    }
    Ok(subject.replace(&search, &replacement).into())
}

/// `regex_replace(pattern, replacement, subject)`
fn regex_replace(args: Vec<Value>) -> Result<Value> {
    let pattern = text_at("regex_replace", &args, 0)?;
    let replacement = text_at("regex_replace", &args, 1)?;
    let subject = text_at("regex_replace", &args, 2)?;
    let regex = Regex::new(&pattern)
        .map_err(|e| Error::invalid_arguments("regex_replace", e.to_string()))?;
    Ok(regex.replace_all(&subject, replacement.as_str()).into_owned().into())
}

fn int_arg(receiver: &str, method: &str, args: &[Value], index: usize) -> Result<i64> {
    args.get(index)
        .and_then(Value::coerce_int)
        .ok_or_else(|| Error::invalid_arguments(format!("{receiver}->{method}"), "expected an integer"))
}

/// Calendar date-time object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Date(pub NaiveDateTime);

impl Date {
    /// Construct from a date string, a unix timestamp or another date
    pub fn construct(value: Value) -> Result<Value> {
        let parsed = match &value {
            Value::Object(receiver) if receiver.type_name() == "Date" => {
                return Ok(value.clone());
            }
            Value::Int(timestamp) => DateTime::<Utc>::from_timestamp(*timestamp, 0).map(|dt| dt.naive_utc()),
            Value::Str(text) => parse_date(text.trim()),
            _ => None,
        };

        parsed
            .map(|dt| Value::object(Date(dt)))
            .ok_or_else(|| Error::construction("Date", format!("cannot parse {}", value)))
    }

    fn shift_days(&self, method: &str, days: i64) -> Result<Value> {
        if days.checked_abs().map_or(true, |abs| abs > 3_650_000) {
            return Err(day_offset_out_of_range(method));
        }
        self.0
            .checked_add_signed(Duration::days(days))
            .map(|dt| Value::object(Date(dt)))
            .ok_or_else(|| Error::invalid_arguments(format!("Date->{method}"), "date out of range"))
    }

    /// Render using date format letters (`d`, `m`, `Y`, `H`, `i`, `s`, ...)
    pub fn format(&self, pattern: &str) -> Result<String> {
        let strftime = translate_format(pattern);
        let mut out = String::new();
        write!(out, "{}", self.0.format(&strftime))
            .map_err(|_| Error::invalid_arguments("Date->format", format!("invalid format '{}'", pattern)))?;
        Ok(out)
    }
}

fn day_offset_out_of_range(method: &str) -> Error {
    Error::invalid_arguments(format!("Date->{method}"), "day offset out of range")
}

fn parse_date(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Translate date format letters into a strftime pattern
///
/// A backslash escapes the next character.
pub fn translate_format(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        let spec = match ch {
            'd' => "%d",
            'D' => "%a",
            'j' => "%-d",
            'l' => "%A",
            'N' => "%u",
            'm' => "%m",
            'M' => "%b",
            'n' => "%-m",
            'F' => "%B",
            'Y' => "%Y",
            'y' => "%y",
            'H' => "%H",
            'G' => "%-H",
            'h' => "%I",
            'g' => "%-I",
            'i' => "%M",
            's' => "%S",
            'A' => "%p",
            'a' => "%P",
            'U' => "%s",
            '%' => "%%",
            '\\' => {
                match chars.next() {
                    Some('%') => out.push_str("%%"),
                    Some(escaped) => out.push(escaped),
                    None => {}
                }
                continue;
            }
            other => {
                out.push(other);
                continue;
            }
        };
        out.push_str(spec);
    }
    out
}

impl Receiver for Date {
    fn type_name(&self) -> &str {
        "Date"
    }

    fn call_method(&self, method: &str, args: Vec<Value>) -> Result<Value> {
        match method {
            "addDays" | "add_days" => {
                let days = int_arg("Date", method, &args, 0).unwrap_or(1);
                self.shift_days(method, days)
            }
            "subDays" | "sub_days" => {
                let days = int_arg("Date", method, &args, 0).unwrap_or(1);
                let days = days.checked_neg().ok_or_else(|| day_offset_out_of_range(method))?;
                self.shift_days(method, days)
            }
            "format" => {
                let pattern = args
                    .first()
                    .map(Value::to_text)
                    .ok_or_else(|| Error::invalid_arguments("Date->format", "missing format"))?;
                Ok(self.format(&pattern)?.into())
            }
            "toDateString" | "to_date_string" => Ok(self.0.format("%Y-%m-%d").to_string().into()),
            "year" => Ok(Value::Int(i64::from(self.0.year()))),
            "month" => Ok(Value::Int(i64::from(self.0.month()))),
            "day" => Ok(Value::Int(i64::from(self.0.day()))),
            _ => Err(Error::UnsupportedMethod {
                type_name: "Date".to_string(),
                method: method.to_string(),
            }),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::String(self.0.format("%Y-%m-%dT%H:%M:%S").to_string())
    }
}

/// Fluent string object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text(pub String);

impl Receiver for Text {
    fn type_name(&self) -> &str {
        "Text"
    }

    fn call_method(&self, method: &str, args: Vec<Value>) -> Result<Value> {
        let name = format!("Text->{method}");
        let text = &self.0;
        let wrap = |s: String| -> Result<Value> { Ok(Value::object(Text(s))) };
        match method {
            "after" => {
                let search = text_at(&name, &args, 0)?;
                match text.find(&search) {
                    Some(idx) if !search.is_empty() => wrap(text[idx + search.len()..].to_string()),
                    _ => wrap(text.clone()),
                }
            }
            "before" => {
                let search = text_at(&name, &args, 0)?;
                match text.find(&search) {
                    Some(idx) if !search.is_empty() => wrap(text[..idx].to_string()),
                    _ => wrap(text.clone()),
                }
            }
            "upper" => wrap(text.to_uppercase()),
            "lower" => wrap(text.to_lowercase()),
            "trim" => wrap(text.trim().to_string()),
            "replace" => {
                let search = text_at(&name, &args, 0)?;
                let replacement = text_at(&name, &args, 1)?;
                if search.is_empty() {
                    return wrap(text.clone());
                }
                wrap(text.replace(&search, &replacement))
            }
            "length" => Ok(Value::Int(text.chars().count() as i64)),
            "toString" | "to_string" => Ok(Value::Str(text.clone())),
            _ => Err(Error::UnsupportedMethod {
                type_name: "Text".to_string(),
                method: method.to_string(),
            }),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::String(self.0.clone())
    }
}
