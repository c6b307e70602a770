use serde::{Serialize, Deserialize};
use std::fmt;


/// A typed value of a free-form layer parameter.
///
/// Values read from a configuration document keep their YAML type.
/// Values typed into the editor are converted with [`ParamValue::coerce`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// Floating point literal
    Float(f64),
    /// Anything else
    Str(String),
    /// `[a, b, ...]`
    List(Vec<ParamValue>),
}


impl ParamValue {
    /// Best-effort conversion of the user's text into a typed value.
    /// The text is parsed as a literal
    /// (boolean, integer, float, quoted string, or list of literals).
    /// If it is not a literal, the raw text is kept as a string.
    /// This function never fails.
    pub fn coerce<S: AsRef<str>>(text: S) -> Self {
        let raw = text.as_ref();
        parse_literal(raw.trim())
            .unwrap_or_else(|| Self::Str(raw.to_string()))
    }


    /// Returns the value as `i64` if it is integral.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 && f.is_finite() => {
                Some(*f as i64)
            },
            _ => None,
        }
    }


    /// Returns the value as `f64` if it is numeric.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }


    /// Returns the value as `bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }


    /// Returns the string slice of a `Str` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }


    /// Returns the items of a `List` value.
    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            Self::List(items) => Some(&items[..]),
            _ => None,
        }
    }
}


impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "None"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            },
        }
    }
}


impl From<i64> for ParamValue {
    fn from(i: i64) -> Self { Self::Int(i) }
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self { Self::Float(x) }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self { Self::Bool(b) }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self { Self::Str(s.to_string()) }
}

impl<T: Into<ParamValue>> From<Vec<T>> for ParamValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}


fn parse_literal(s: &str) -> Option<ParamValue> {
    match s {
        "" => return None,
        "True" | "true" => return Some(ParamValue::Bool(true)),
        "False" | "false" => return Some(ParamValue::Bool(false)),
        "None" | "null" => return Some(ParamValue::Null),
        _ => {},
    }

    if let Some(inner) = unquote(s) {
        return Some(ParamValue::Str(inner.to_string()));
    }

    let bracketed = (s.starts_with('[') && s.ends_with(']'))
        || (s.starts_with('(') && s.ends_with(')'));
    if bracketed && s.len() >= 2 {
        let inner = &s[1..s.len() - 1];
        let items = split_top_level(inner)?
            .into_iter()
            .map(|item| parse_literal(item.trim()))
            .collect::<Option<Vec<_>>>()?;
        return Some(ParamValue::List(items));
    }

    parse_number(s)
}


fn parse_number(s: &str) -> Option<ParamValue> {
    let first = s.chars().next()?;
    if !(first.is_ascii_digit() || matches!(first, '-' | '+' | '.')) {
        return None;
    }
    // Rust accepts `inf` and `NaN`, which are not literals.
    if s.chars().any(|c| c.is_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }

    if let Ok(i) = s.parse::<i64>() {
        return Some(ParamValue::Int(i));
    }
    s.parse::<f64>().ok().map(ParamValue::Float)
}


fn unquote(s: &str) -> Option<&str> {
    if s.len() < 2 { return None; }
    let quote = s.chars().next()?;
    if !matches!(quote, '\'' | '"') || !s.ends_with(quote) {
        return None;
    }
    let inner = &s[1..s.len() - 1];
    if inner.contains(quote) { return None; }
    Some(inner)
}


/// Split `s` at commas that are not nested in brackets or quotes.
/// A single trailing comma is allowed, as in `(4,)`.
/// Returns `None` if the brackets or quotes are unbalanced.
fn split_top_level(s: &str) -> Option<Vec<&str>> {
    let mut items = Vec::new();
    let mut depth = 0_i32;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if c == q { quote = None; }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '[' | '(' => depth += 1,
            ']' | ')' => {
                depth -= 1;
                if depth < 0 { return None; }
            },
            ',' if depth == 0 => {
                items.push(&s[start..i]);
                start = i + 1;
            },
            _ => {},
        }
    }
    if depth != 0 || quote.is_some() { return None; }

    let last = &s[start..];
    if !last.trim().is_empty() {
        items.push(last);
    } else if items.is_empty() {
        return Some(items);
    }
    if items.iter().any(|it| it.trim().is_empty()) {
        return None;
    }
    Some(items)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars() {
        assert_eq!(ParamValue::coerce("8"), ParamValue::Int(8));
        assert_eq!(ParamValue::coerce(" -3 "), ParamValue::Int(-3));
        assert_eq!(ParamValue::coerce("0.25"), ParamValue::Float(0.25));
        assert_eq!(ParamValue::coerce("1e-3"), ParamValue::Float(1e-3));
        assert_eq!(ParamValue::coerce("True"), ParamValue::Bool(true));
        assert_eq!(ParamValue::coerce("false"), ParamValue::Bool(false));
        assert_eq!(ParamValue::coerce("None"), ParamValue::Null);
    }


    #[test]
    fn strings_are_kept() {
        assert_eq!(ParamValue::coerce("relu"), ParamValue::from("relu"));
        assert_eq!(ParamValue::coerce("'relu'"), ParamValue::from("relu"));
        assert_eq!(ParamValue::coerce("inf"), ParamValue::from("inf"));
        assert_eq!(ParamValue::coerce("NaN"), ParamValue::from("NaN"));
        assert_eq!(ParamValue::coerce("[1, 2"), ParamValue::from("[1, 2"));
        assert_eq!(ParamValue::coerce(""), ParamValue::from(""));
    }


    #[test]
    fn lists() {
        assert_eq!(
            ParamValue::coerce("[4]"),
            ParamValue::List(vec![ParamValue::Int(4)])
        );
        assert_eq!(
            ParamValue::coerce("(4,)"),
            ParamValue::List(vec![ParamValue::Int(4)])
        );
        assert_eq!(
            ParamValue::coerce("[2, [0.5, 'a, b']]"),
            ParamValue::List(vec![
                ParamValue::Int(2),
                ParamValue::List(vec![
                    ParamValue::Float(0.5),
                    ParamValue::from("a, b"),
                ]),
            ])
        );
        assert_eq!(ParamValue::coerce("[]"), ParamValue::List(Vec::new()));
        // Bare words inside a list are not literals.
        assert_eq!(ParamValue::coerce("[a, b]"), ParamValue::from("[a, b]"));
    }


    #[test]
    fn integral_floats_are_ints() {
        assert_eq!(ParamValue::Float(8.0).as_int(), Some(8));
        assert_eq!(ParamValue::Float(8.5).as_int(), None);
        assert_eq!(ParamValue::Int(2).as_float(), Some(2.0));
    }
}
