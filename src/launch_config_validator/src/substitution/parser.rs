//! Substitution parser

use crate::{error::SubstitutionError, substitution::types::Substitution};
use lru::LruCache;
use std::{cell::RefCell, num::NonZeroUsize};

type Result<T> = std::result::Result<T, SubstitutionError>;

// Caches parsed ASTs, never resolved values: parsing does not depend on
// scope or provider, so identical input always yields the same tree.
const SUBSTITUTION_CACHE_SIZE: NonZeroUsize = match NonZeroUsize::new(1024) {
    Some(size) => size,
    None => unreachable!(),
};

thread_local! {
    static PARSE_CACHE: RefCell<LruCache<String, Vec<Substitution>>> =
        RefCell::new(LruCache::new(SUBSTITUTION_CACHE_SIZE));
}

/// Parse substitution string like "$(var x)" or "text $(env Y) more"
/// Supports nested substitutions like "$(var $(env NAME)_config)"
///
/// A string without any `$(` parses to a single `Text` holding the input.
pub fn parse_substitutions(input: &str) -> Result<Vec<Substitution>> {
    if let Some(cached) = PARSE_CACHE.with(|cache| cache.borrow_mut().get(input).cloned()) {
        log::trace!("Substitution parse cache hit: {}", input);
        return Ok(cached);
    }

    log::trace!("Substitution parse cache miss: {}", input);
    let parsed = parse_sequence(input)?;
    PARSE_CACHE.with(|cache| {
        cache.borrow_mut().put(input.to_string(), parsed.clone());
    });
    Ok(parsed)
}

/// Whether a string contains anything that looks like a substitution
pub fn contains_substitution(input: &str) -> bool {
    input.contains("$(")
}

/// Split text and `$(...)` expressions, recursing into each expression body
fn parse_sequence(input: &str) -> Result<Vec<Substitution>> {
    let mut result = Vec::new();
    let mut literal_start = 0;
    let mut pos = 0;

    while let Some(offset) = input[pos..].find("$(") {
        let start = pos + offset;
        let body_start = start + 2;
        let body_end = find_closing_paren(input, body_start)?;

        if start > literal_start {
            result.push(Substitution::Text(input[literal_start..start].to_string()));
        }
        result.push(parse_expression(&input[body_start..body_end])?);

        pos = body_end + 1;
        literal_start = pos;
    }

    if literal_start < input.len() || result.is_empty() {
        result.push(Substitution::Text(input[literal_start..].to_string()));
    }

    Ok(result)
}

/// Index of the `)` closing the expression whose body starts at `from`.
/// Parentheses inside single quotes do not count.
fn find_closing_paren(input: &str, from: usize) -> Result<usize> {
    let mut depth = 1usize;
    let mut in_quote = false;

    for (offset, ch) in input[from..].char_indices() {
        match ch {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                depth -= 1;
                if depth == 0 {
                    return Ok(from + offset);
                }
            }
            _ => {}
        }
    }

    Err(SubstitutionError::Syntax(format!(
        "unmatched parentheses in '{}'",
        input
    )))
}

/// Parse the content inside `$(...)`: the kind is the first token.
///
/// Every argument may itself contain substitutions, not only `command`
/// payloads, so `$(find-pkg-share $(var pkg))` is accepted.
fn parse_expression(body: &str) -> Result<Substitution> {
    let trimmed = body.trim();
    let (kind, rest) = match trimmed.find(char::is_whitespace) {
        Some(idx) => (&trimmed[..idx], trimmed[idx..].trim()),
        None => (trimmed, ""),
    };

    if kind.is_empty() {
        return Err(SubstitutionError::Syntax("empty substitution '$()'".to_string()));
    }

    match kind {
        "find-pkg-share" => Ok(Substitution::FindPackageShare(single_argument(kind, rest)?)),
        "find-pkg-prefix" => Ok(Substitution::FindPackagePrefix(single_argument(
            kind, rest,
        )?)),
        "var" => Ok(Substitution::LaunchConfiguration(single_argument(kind, rest)?)),
        "anon" => Ok(Substitution::Anon(single_argument(kind, rest)?)),
        "env" => {
            let args = split_arguments(rest)?;
            match args.as_slice() {
                [name] => Ok(Substitution::EnvironmentVariable {
                    name: parse_sequence(unquote(name))?,
                    default: None,
                }),
                [name, default] => Ok(Substitution::EnvironmentVariable {
                    name: parse_sequence(unquote(name))?,
                    default: Some(parse_sequence(unquote(default))?),
                }),
                [] => Err(SubstitutionError::Syntax(
                    "env requires a variable name".to_string(),
                )),
                _ => Err(SubstitutionError::Syntax(format!(
                    "env takes a name and an optional default, got '{}'",
                    rest
                ))),
            }
        }
        "dirname" => {
            if rest.is_empty() {
                Ok(Substitution::Dirname)
            } else {
                Err(SubstitutionError::Syntax(format!(
                    "dirname takes no arguments, got '{}'",
                    rest
                )))
            }
        }
        "command" => parse_command(rest),
        "eval" => {
            if rest.is_empty() {
                return Err(SubstitutionError::Syntax(
                    "eval requires an expression argument".to_string(),
                ));
            }
            let args = split_arguments(rest)?;
            let payload = match args.as_slice() {
                [single] if is_quoted(single) => unquote(single),
                _ => rest,
            };
            Ok(Substitution::Eval(parse_sequence(payload)?))
        }
        other => Err(SubstitutionError::UnknownSubstitution(other.to_string())),
    }
}

/// `$(command 'cmd' ['strict'|'warn'|'ignore'])` or the unquoted `$(command cmd args...)`
fn parse_command(rest: &str) -> Result<Substitution> {
    let args = split_arguments(rest)?;
    match args.as_slice() {
        [] => Err(SubstitutionError::Syntax(
            "command requires an argument".to_string(),
        )),
        [cmd] if is_quoted(cmd) => Ok(Substitution::Command(parse_sequence(unquote(cmd))?)),
        [cmd, mode] if is_quoted(cmd) => match unquote(mode) {
            "strict" | "warn" | "ignore" => {
                Ok(Substitution::Command(parse_sequence(unquote(cmd))?))
            }
            other => Err(SubstitutionError::Syntax(format!(
                "unknown command error mode '{}'",
                other
            ))),
        },
        [cmd, ..] if is_quoted(cmd) => Err(SubstitutionError::Syntax(format!(
            "command takes a quoted command and an optional error mode, got '{}'",
            rest
        ))),
        _ => Ok(Substitution::Command(parse_sequence(rest)?)),
    }
}

fn single_argument(kind: &str, rest: &str) -> Result<Vec<Substitution>> {
    let args = split_arguments(rest)?;
    match args.as_slice() {
        [arg] => parse_sequence(unquote(arg)),
        [] => Err(SubstitutionError::Syntax(format!(
            "{} requires an argument",
            kind
        ))),
        _ => Err(SubstitutionError::Syntax(format!(
            "{} expects exactly one argument, got '{}'",
            kind, rest
        ))),
    }
}

/// Split on whitespace outside single quotes and nested `$(...)`
fn split_arguments(rest: &str) -> Result<Vec<&str>> {
    let mut args = Vec::new();
    let mut start: Option<usize> = None;
    let mut depth = 0usize;
    let mut in_quote = false;

    for (idx, ch) in rest.char_indices() {
        if start.is_none() && !ch.is_whitespace() {
            start = Some(idx);
        }
        match ch {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && !in_quote && depth == 0 => {
                if let Some(s) = start.take() {
                    args.push(&rest[s..idx]);
                }
            }
            _ => {}
        }
    }

    if in_quote {
        return Err(SubstitutionError::Syntax(format!(
            "unterminated quote in '{}'",
            rest
        )));
    }
    if let Some(s) = start {
        args.push(&rest[s..]);
    }

    Ok(args)
}

fn is_quoted(token: &str) -> bool {
    token.len() >= 2
        && ((token.starts_with('\'') && token.ends_with('\''))
            || (token.starts_with('"') && token.ends_with('"')))
}

fn unquote(token: &str) -> &str {
    if is_quoted(token) {
        &token[1..token.len() - 1]
    } else {
        token
    }
}
