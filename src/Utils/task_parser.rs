// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
/// Parser for task documents made of titled sections with `key: value1, value2` pairs:
/// ```text
/// problem
/// name: QuadraticForcing
/// grid
/// x0: 0.0 y0: 0.5 xn: 2.0 h: 0.2
/// ```
/// Lines starting with //, #, % or ; are comments. Values are typed on the fly.
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{alpha1, alphanumeric1, multispace0, space0},
    combinator::{map, recognize},
    multi::{many0, many1, separated_list1},
    sequence::{delimited, pair, separated_pair, terminated},
};
use std::collections::HashMap;
use std::fmt;

pub type SectionMap = HashMap<String, Vec<Value>>;
pub type DocumentMap = HashMap<String, SectionMap>;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Float(f64),
    Integer(i64),
    Boolean(bool),
}

impl Value {
    pub fn as_string(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s)
        } else {
            None
        }
    }

    /// integers are accepted as floats
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        if let Value::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Float(val) => write!(f, "{}", val),
            Value::Integer(val) => write!(f, "{}", val),
            Value::Boolean(val) => write!(f, "{}", val),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskError {
    Io(String),
    Parse(String),
    MissingSection(String),
    MissingKey { section: String, key: String },
    InvalidValue { section: String, key: String, value: String, expected: String },
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskError::Io(msg) => write!(f, "cannot read task file: {}", msg),
            TaskError::Parse(msg) => write!(f, "task parsing error: {}", msg),
            TaskError::MissingSection(section) => write!(f, "section '{}' not found", section),
            TaskError::MissingKey { section, key } => {
                write!(f, "key '{}' not found in section '{}'", key, section)
            }
            TaskError::InvalidValue {
                section,
                key,
                value,
                expected,
            } => write!(
                f,
                "invalid value '{}' for '{}' in section '{}': expected {}",
                value, key, section, expected
            ),
        }
    }
}

impl std::error::Error for TaskError {}

/// identifier: letter or underscore followed by letters, digits, underscores
fn parse_identifier(input: &str) -> IResult<&str, String> {
    let parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    map(parser, String::from).parse(input)
}

fn typed_value(s: &str) -> Value {
    if let Ok(val) = s.parse::<i64>() {
        Value::Integer(val)
    } else if let Ok(val) = s.parse::<f64>() {
        Value::Float(val)
    } else if let Ok(val) = s.parse::<bool>() {
        Value::Boolean(val)
    } else {
        Value::String(s.to_string())
    }
}

fn parse_value(input: &str) -> IResult<&str, Value> {
    let raw = take_while1(|c: char| !matches!(c, ',' | ' ' | '\t' | '\r' | '\n' | ';'));
    map(raw, typed_value).parse(input)
}

fn parse_value_list(input: &str) -> IResult<&str, Vec<Value>> {
    separated_list1(delimited(space0, tag(","), space0), parse_value).parse(input)
}

/// `key: v1, v2`; trailing whitespace and line breaks are consumed so the next key may
/// follow on the same line or the next one
fn parse_key_value_pair(input: &str) -> IResult<&str, (String, Vec<Value>)> {
    let colon = delimited(space0, tag(":"), space0);
    let (input, result) = separated_pair(parse_identifier, colon, parse_value_list).parse(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, result))
}

fn parse_section(input: &str) -> IResult<&str, (String, SectionMap)> {
    let (input, title) = terminated(parse_identifier, multispace0).parse(input)?;
    let (input, pairs) = many1(parse_key_value_pair).parse(input)?;
    Ok((input, (title, pairs.into_iter().collect())))
}

fn strip_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !(trimmed.starts_with("//")
                || trimmed.starts_with('#')
                || trimmed.starts_with('%')
                || trimmed.starts_with(';'))
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Parse the whole document; the input must be consumed completely.
/// A repeated section is merged into the first one, later keys win.
pub fn parse_document(input: &str) -> Result<DocumentMap, TaskError> {
    let cleaned = strip_comments(input);
    let mut parser = many1(delimited(multispace0, parse_section, multispace0));
    let (remaining, sections) = parser
        .parse(cleaned.as_str())
        .map_err(|e| TaskError::Parse(format!("{:?}", e)))?;
    if !remaining.trim().is_empty() {
        return Err(TaskError::Parse(format!(
            "failed to parse entire document, remaining: '{}'",
            remaining.trim()
        )));
    }
    let mut document = DocumentMap::new();
    for (title, section) in sections {
        document.entry(title).or_default().extend(section);
    }
    Ok(document)
}

pub fn parse_file(path: &str) -> Result<DocumentMap, TaskError> {
    let content = std::fs::read_to_string(path).map_err(|e| TaskError::Io(format!("{}: {}", path, e)))?;
    parse_document(&content)
}
