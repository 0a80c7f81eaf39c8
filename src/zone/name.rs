use std::{
    fmt,
    hash::{Hash, Hasher},
};
use thiserror::Error;

const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_LEN: usize = 255;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("empty name")]
    Empty,
    #[error("empty label")]
    EmptyLabel,
    #[error("label {0:?} is longer than 63 octets")]
    LabelTooLong(String),
    #[error("name is longer than 255 octets")]
    NameTooLong,
    #[error("bad escape sequence in {0:?}")]
    BadEscape(String),
}

/// Absolute domain name.
///
/// Comparison is ASCII case-insensitive, display keeps the original spelling.
#[derive(Debug, Clone)]
pub struct Name {
    labels: Vec<String>,
}

impl Name {
    #[must_use]
    pub const fn root() -> Self {
        Self { labels: Vec::new() }
    }

    /// Parse a name that is absolute whether or not it carries the trailing dot,
    /// the way a zone origin is given on the command line.
    ///
    /// # Errors
    ///
    /// Returns an error if a label is empty or the name exceeds the length limits
    pub fn from_origin(text: &str) -> Result<Self, NameError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NameError::Empty);
        }
        if text == "." {
            return Ok(Self::root());
        }
        let text = text.strip_suffix('.').unwrap_or(text);
        Self::from_labels(split_labels(text)?)
    }

    /// Parse a name as written in a master file: `@` is the origin, a trailing
    /// dot makes it absolute, anything else is relative to `origin`.
    ///
    /// # Errors
    ///
    /// Returns an error if a label is empty or the name exceeds the length limits
    pub fn parse(text: &str, origin: &Self) -> Result<Self, NameError> {
        if text.is_empty() {
            return Err(NameError::Empty);
        }
        if text == "@" {
            return Ok(origin.clone());
        }
        if text == "." {
            return Ok(Self::root());
        }

        if let Some(absolute) = strip_unescaped_dot(text) {
            return Self::from_labels(split_labels(absolute)?);
        }

        let mut labels = split_labels(text)?;
        labels.extend(origin.labels.iter().cloned());
        Self::from_labels(labels)
    }

    fn from_labels(labels: Vec<String>) -> Result<Self, NameError> {
        // one length octet per label plus the root octet
        let wire_len = labels
            .iter()
            .map(|label| label_octets(label).map(|len| len + 1))
            .sum::<Result<usize, NameError>>()?
            + 1;
        if wire_len > MAX_NAME_LEN {
            return Err(NameError::NameTooLong);
        }
        Ok(Self { labels })
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// True if `self` equals `other` or sits below it
    #[must_use]
    pub fn is_subdomain_of(&self, other: &Self) -> bool {
        if self.labels.len() < other.labels.len() {
            return false;
        }
        self.labels
            .iter()
            .rev()
            .zip(other.labels.iter().rev())
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }

    /// Text of the name relative to `origin`: `@` for the origin itself, the
    /// leading labels for names below it, the absolute form otherwise.
    #[must_use]
    pub fn relativize(&self, origin: &Self) -> String {
        if self == origin {
            return "@".to_string();
        }
        if self.is_subdomain_of(origin) {
            let keep = self.labels.len() - origin.labels.len();
            return self.labels.iter().take(keep).cloned().collect::<Vec<_>>().join(".");
        }
        self.to_string()
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.labels.len() == other.labels.len()
            && self
                .labels
                .iter()
                .zip(&other.labels)
                .all(|(a, b)| a.eq_ignore_ascii_case(b))
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for label in &self.labels {
            label.to_ascii_lowercase().hash(state);
        }
        self.labels.len().hash(state);
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.labels.is_empty() {
            return f.write_str(".");
        }
        for label in &self.labels {
            write!(f, "{label}.")?;
        }
        Ok(())
    }
}

/// Returns the name without its final dot when that dot is not escaped
fn strip_unescaped_dot(text: &str) -> Option<&str> {
    let head = text.strip_suffix('.')?;
    let backslashes = head.chars().rev().take_while(|&c| c == '\\').count();
    (backslashes % 2 == 0).then_some(head)
}

/// Split on unescaped dots, keeping escapes in the label text
fn split_labels(text: &str) -> Result<Vec<String>, NameError> {
    let mut labels = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars
                    .next()
                    .ok_or_else(|| NameError::BadEscape(text.to_string()))?;
                current.push('\\');
                current.push(escaped);
            }
            '.' => {
                if current.is_empty() {
                    return Err(NameError::EmptyLabel);
                }
                labels.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }

    if current.is_empty() {
        return Err(NameError::EmptyLabel);
    }
    labels.push(current);

    Ok(labels)
}

/// Number of octets a label occupies once `\X` and `\DDD` escapes are decoded
fn label_octets(label: &str) -> Result<usize, NameError> {
    let bytes = label.as_bytes();
    let mut octets = 0;
    let mut i = 0;

    while let Some(&b) = bytes.get(i) {
        if b == b'\\' {
            let digits = bytes
                .get(i + 1..i + 4)
                .filter(|d| d.iter().all(u8::is_ascii_digit));
            if let Some(digits) = digits {
                let value = digits
                    .iter()
                    .fold(0u32, |acc, d| acc * 10 + u32::from(d - b'0'));
                if value > 255 {
                    return Err(NameError::BadEscape(label.to_string()));
                }
                i += 4;
            } else {
                i += 2;
            }
        } else {
            i += 1;
        }
        octets += 1;
    }

    if octets > MAX_LABEL_LEN {
        return Err(NameError::LabelTooLong(label.to_string()));
    }

    Ok(octets)
}
