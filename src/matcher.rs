//! Path template compilation and matching
//!
//! Template syntax:
//!
//! - literal characters match verbatim, `/` included
//! - `:name` captures one or more non-slash characters; the name runs up to the
//!   next `/` or the end of the template
//! - `*` on its own matches every path
//!
//! Templates without parameters compare by string equality. Templates with
//! parameters compile to an anchored regex where each `:name` becomes
//! `([^/]+)` and every literal is escaped.

use crate::error::PatternError;
use crate::params::RouteParams;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// The catch-all template.
pub const WILDCARD: &str = "*";

/// Strip a single trailing slash, except from the root path.
///
/// ```
/// use history_router::normalize_path;
///
/// assert_eq!(normalize_path("/users/"), "/users");
/// assert_eq!(normalize_path("/"), "/");
/// ```
pub fn normalize_path(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    Wildcard,
    Exact,
    Captures(Regex),
}

/// A compiled path template.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    param_names: Vec<String>,
    matcher: Matcher,
}

impl Pattern {
    /// Compile a template, rejecting malformed parameter syntax.
    ///
    /// ```
    /// use history_router::Pattern;
    ///
    /// let pattern = Pattern::compile("/users/:id/")?;
    /// assert_eq!(pattern.raw(), "/users/:id");
    /// assert_eq!(pattern.param_names(), ["id"]);
    ///
    /// let params = pattern.test("/users/42").unwrap();
    /// assert_eq!(params.get("id"), Some("42"));
    /// # Ok::<(), history_router::PatternError>(())
    /// ```
    pub fn compile(template: &str) -> Result<Self, PatternError> {
        let raw = normalize_path(template);

        if raw == WILDCARD {
            return Ok(Self {
                raw: raw.to_string(),
                param_names: Vec::new(),
                matcher: Matcher::Wildcard,
            });
        }

        let mut param_names: Vec<String> = Vec::new();
        let mut source = String::with_capacity(raw.len() + 8);
        source.push('^');

        let mut rest = raw;
        let mut offset = 0;
        while let Some(colon) = rest.find(':') {
            source.push_str(&regex::escape(&rest[..colon]));

            let after = &rest[colon + 1..];
            let end = after.find('/').unwrap_or(after.len());
            let name = &after[..end];

            if name.is_empty() {
                return Err(PatternError::EmptyParameterName {
                    position: offset + colon,
                });
            }
            if name.contains(':') {
                return Err(PatternError::InvalidParameterName {
                    name: name.to_string(),
                });
            }
            if param_names.iter().any(|existing| existing == name) {
                return Err(PatternError::DuplicateParameter {
                    name: name.to_string(),
                });
            }

            param_names.push(name.to_string());
            source.push_str("([^/]+)");

            let consumed = colon + 1 + end;
            offset += consumed;
            rest = &rest[consumed..];
        }

        if param_names.is_empty() {
            return Ok(Self {
                raw: raw.to_string(),
                param_names,
                matcher: Matcher::Exact,
            });
        }

        source.push_str(&regex::escape(rest));
        source.push('$');

        Ok(Self {
            raw: raw.to_string(),
            param_names,
            matcher: Matcher::Captures(Regex::new(&source)?),
        })
    }

    /// The normalized template.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self.matcher, Matcher::Wildcard)
    }

    /// Parameter names in left-to-right order.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Match `path` and extract its parameters.
    ///
    /// Returns `None` when the path does not match. The path is compared as
    /// given; callers normalize it first.
    pub fn test(&self, path: &str) -> Option<RouteParams> {
        match &self.matcher {
            Matcher::Wildcard => Some(RouteParams::new()),
            Matcher::Exact => (path == self.raw).then(RouteParams::new),
            Matcher::Captures(regex) => {
                let captures = regex.captures(path)?;
                // Group 0 is the whole match.
                Some(
                    self.param_names
                        .iter()
                        .zip(captures.iter().skip(1))
                        .filter_map(|(name, group)| {
                            group.map(|group| (name.as_str(), group.as_str()))
                        })
                        .collect(),
                )
            }
        }
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Pattern {}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}
