use thiserror::Error;

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::ops::{Index, Range};
use std::str::FromStr;

use crate::bot::Error;

/// A tokenized argument list.
///
/// The first token is always the alias used to invoke the command.
/// Every token records the whitespace that followed it in the source, so
/// that ranges of tokens can be turned back into the text the user
/// typed with [`rest`] and [`slice`].
///
/// [`rest`]: Self::rest
/// [`slice`]: Self::slice
#[derive(Clone, Debug, Default)]
pub struct Arguments {
    source: String,
    tokens: Vec<Token>,
    flags: HashMap<&'static str, FlagValue>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Token {
    value: String,
    /// Byte range of the token inside the source, including quotes.
    span: Range<usize>,
    separator: String,
    quoted: bool,
}

impl Token {
    fn new(start: usize) -> Self {
        Self {
            value: String::new(),
            span: start..start,
            separator: String::new(),
            quoted: false,
        }
    }
}

impl Arguments {
    /// Tokenizes `input`. Leading and trailing whitespace is ignored.
    ///
    /// A `'` or `"` only opens a quoted span as the first character of a
    /// token and only closes it when followed by whitespace or the end of
    /// input. Quote characters in any other position are literal, so a
    /// doubled quote is no escape: `''abc''` yields `'abc'`. An
    /// unterminated quote keeps the opening quote and the rest of the input
    /// as a single token.
    pub fn parse(input: &str) -> Self {
        let source = input.trim().to_owned();

        let mut tokens: Vec<Token> = Vec::new();
        let mut current: Option<Token> = None;
        let mut quote: Option<char> = None;

        let mut chars = source.char_indices().peekable();
        while let Some((pos, c)) = chars.next() {
            let at_boundary = chars.peek().map_or(true, |(_, c)| c.is_whitespace());

            match current.as_mut() {
                Some(token) => match quote {
                    Some(q) if c == q && at_boundary => {
                        quote = None;
                        token.span.end = pos + c.len_utf8();
                        tokens.extend(current.take());
                    }
                    Some(_) => token.value.push(c),
                    None if c.is_whitespace() => {
                        token.span.end = pos;
                        tokens.extend(current.take());

                        if let Some(last) = tokens.last_mut() {
                            last.separator.push(c);
                        }
                    }
                    None => token.value.push(c),
                },
                None if c.is_whitespace() => {
                    if let Some(last) = tokens.last_mut() {
                        last.separator.push(c);
                    }
                }
                None => {
                    let mut token = Token::new(pos);

                    if c == '"' || c == '\'' {
                        quote = Some(c);
                        token.quoted = true;
                    } else {
                        token.value.push(c);
                    }

                    current = Some(token);
                }
            }
        }

        if let Some(mut token) = current {
            if let Some(q) = quote {
                token.value.insert(0, q);
                token.quoted = false;
            }

            token.span.end = source.len();
            tokens.push(token);
        }

        Self {
            source,
            tokens,
            flags: HashMap::new(),
        }
    }

    /// Returns the number of positional arguments, including the alias.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if no arguments are stored.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(|token| token.value.as_str())
    }

    /// Parses the argument at `index` into `T`. A missing or unparsable
    /// argument is reported as [`Error::InvalidCommandUsage`].
    pub fn parse_at<T>(&self, index: usize) -> Result<T, Error>
    where
        T: FromStr,
    {
        match self.get(index) {
            Some(arg) => arg.parse().or(Err(Error::InvalidCommandUsage)),
            None => Err(Error::InvalidCommandUsage),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|token| token.value.as_str())
    }

    /// Returns the arguments from `start` up to, but not including, `end`
    /// joined by the whitespace that originally separated them.
    ///
    /// # Panics
    ///
    /// Panics if `start > end` or `end > len`.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let tokens = &self.tokens[start..end];

        let mut buf = String::new();
        for (i, token) in tokens.iter().enumerate() {
            buf.push_str(&token.value);

            if i + 1 != tokens.len() {
                buf.push_str(&token.separator);
            }
        }

        buf
    }

    /// Returns all arguments starting at `start` joined by their original
    /// whitespace. Returns an empty string if `start` is out of bounds.
    pub fn rest(&self, start: usize) -> String {
        if start >= self.len() {
            return String::new();
        }

        self.slice(start, self.len())
    }

    /// Returns the unprocessed source text starting at the argument
    /// `index`, quotes and flags included.
    pub fn source_rest(&self, index: usize) -> &str {
        match self.tokens.get(index) {
            Some(token) => &self.source[token.span.start..],
            None => "",
        }
    }

    /// Returns the trimmed input the arguments were parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Extracts all flags in `known` from the positional arguments.
    ///
    /// The alias token is never considered. A `--` token ends flag
    /// parsing and is removed. Quoted tokens and negative numbers always
    /// stay positional. If `known` is empty, all tokens stay positional.
    pub fn parse_flags(&mut self, known: &[Flag]) -> Result<(), FlagParseError> {
        if known.is_empty() {
            return Ok(());
        }

        let mut index = 1;
        while index < self.tokens.len() {
            let token = &self.tokens[index];

            if token.quoted || !token.value.starts_with('-') || token.value.len() < 2 {
                index += 1;
                continue;
            }

            if token.value.parse::<f64>().is_ok() {
                index += 1;
                continue;
            }

            let value = self.remove(index).value;

            if value == "--" {
                break;
            }

            if let Some(long) = value.strip_prefix("--") {
                let (name, inline) = match long.split_once('=') {
                    Some((name, value)) => (name, Some(value.to_owned())),
                    None => (long, None),
                };

                let flag = known
                    .iter()
                    .find(|flag| flag.name == name)
                    .ok_or_else(|| FlagParseError::UnknownFlag(format!("--{}", name)))?;

                let value = match (flag.kind, inline) {
                    (FlagKind::Bool, None) => FlagValue::Bool(true),
                    (FlagKind::Bool, Some(_)) => {
                        return Err(FlagParseError::UnexpectedValue(flag.name))
                    }
                    (FlagKind::Value, Some(value)) => FlagValue::String(value),
                    (FlagKind::Value, None) => FlagValue::String(self.take_value(index, flag)?),
                };

                self.flags.insert(flag.name, value);
                continue;
            }

            // Short flags, possibly grouped as `-abc`. Only the last flag
            // in a group may take a value.
            let shorts: Vec<char> = value.chars().skip(1).collect();
            for (i, alias) in shorts.iter().enumerate() {
                let flag = known
                    .iter()
                    .find(|flag| flag.alias == Some(*alias))
                    .ok_or_else(|| FlagParseError::UnknownFlag(format!("-{}", alias)))?;

                let value = match flag.kind {
                    FlagKind::Bool => FlagValue::Bool(true),
                    FlagKind::Value if i + 1 == shorts.len() => {
                        FlagValue::String(self.take_value(index, flag)?)
                    }
                    FlagKind::Value => return Err(FlagParseError::MissingValue(flag.name)),
                };

                self.flags.insert(flag.name, value);
            }
        }

        Ok(())
    }

    /// Returns all parsed flags.
    pub fn flags(&self) -> &HashMap<&'static str, FlagValue> {
        &self.flags
    }

    pub fn flag(&self, name: &str) -> Option<&FlagValue> {
        self.flags.get(name)
    }

    /// Returns `true` if the flag `name` was given.
    pub fn has_flag(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    /// Returns the value of the valued flag `name`.
    pub fn flag_value(&self, name: &str) -> Option<&str> {
        match self.flags.get(name) {
            Some(FlagValue::String(value)) => Some(value),
            _ => None,
        }
    }

    fn take_value(&mut self, index: usize, flag: &Flag) -> Result<String, FlagParseError> {
        if index < self.tokens.len() {
            Ok(self.remove(index).value)
        } else {
            Err(FlagParseError::MissingValue(flag.name))
        }
    }

    /// Removes the token at `index` together with its separator.
    fn remove(&mut self, index: usize) -> Token {
        let token = self.tokens.remove(index);

        // The new last token never has a trailing separator.
        if index == self.tokens.len() {
            if let Some(last) = self.tokens.last_mut() {
                last.separator.clear();
            }
        }

        token
    }
}

impl Index<usize> for Arguments {
    type Output = str;

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    fn index(&self, index: usize) -> &Self::Output {
        &self.tokens[index].value
    }
}

impl<'life0, T> PartialEq<T> for Arguments
where
    T: AsRef<[&'life0 str]>,
{
    fn eq(&self, other: &T) -> bool {
        self.iter().eq(other.as_ref().iter().copied())
    }
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.rest(0))
    }
}

/// A flag recognized by a command.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Flag {
    /// The long name, used as `--name`.
    pub name: &'static str,
    /// The short alias, used as `-a`.
    pub alias: Option<char>,
    pub kind: FlagKind,
    pub doc: &'static str,
    /// Hidden flags are accepted but not documented.
    pub hidden: bool,
}

impl Flag {
    /// Creates a new boolean flag.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            alias: None,
            kind: FlagKind::Bool,
            doc: "",
            hidden: false,
        }
    }

    pub const fn alias(mut self, alias: char) -> Self {
        self.alias = Some(alias);
        self
    }

    /// Makes the flag take a value.
    pub const fn value(mut self) -> Self {
        self.kind = FlagKind::Value;
        self
    }

    pub const fn doc(mut self, doc: &'static str) -> Self {
        self.doc = doc;
        self
    }

    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Returns the line describing this flag in command documentation.
    pub fn doc_line(&self) -> String {
        let mut line = match self.alias {
            Some(alias) => format!("-{}, --{}", alias, self.name),
            None => format!("--{}", self.name),
        };

        if self.kind == FlagKind::Value {
            line.push_str(" <value>");
        }

        if !self.doc.is_empty() {
            line.push_str(": ");
            line.push_str(self.doc);
        }

        line
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagKind {
    Bool,
    Value,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlagValue {
    Bool(bool),
    String(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FlagParseError {
    #[error("Unknown flag: `{0}`")]
    UnknownFlag(String),
    #[error("Flag `--{0}` requires a value")]
    MissingValue(&'static str),
    #[error("Flag `--{0}` does not take a value")]
    UnexpectedValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::{Arguments, Flag, FlagParseError, FlagValue};

    const FLAGS: &[Flag] = &[
        Flag::new("show-hidden").alias('h'),
        Flag::new("show-disabled").alias('d'),
        Flag::new("limit").alias('l').value(),
    ];

    #[test]
    fn test_parse_plain() {
        let args = Arguments::parse("cmd a b");
        assert_eq!(args, ["cmd", "a", "b"]);
        assert_eq!(args.len(), 3);
        assert_eq!(&args[1], "a");
        assert_eq!(args.get(3), None);

        let args = Arguments::parse("");
        assert!(args.is_empty());

        let args = Arguments::parse("   \n ");
        assert!(args.is_empty());
    }

    #[test]
    fn test_parse_quotes() {
        let args = Arguments::parse("cmd 'two words' last");
        assert_eq!(args, ["cmd", "two words", "last"]);

        let args = Arguments::parse("cmd 'unterminated");
        assert_eq!(args, ["cmd", "'unterminated"]);

        let args = Arguments::parse("cmd 'still open here");
        assert_eq!(args, ["cmd", "'still open here"]);

        let args = Arguments::parse("cmd \"it's\" ok");
        assert_eq!(args, ["cmd", "it's", "ok"]);

        let args = Arguments::parse("cmd don't");
        assert_eq!(args, ["cmd", "don't"]);

        let args = Arguments::parse("cmd 'a'b c'");
        assert_eq!(args, ["cmd", "a'b c"]);

        let args = Arguments::parse("cmd ''");
        assert_eq!(args, ["cmd", ""]);
    }

    #[test]
    fn test_parse_doubled_quotes() {
        let args = Arguments::parse("cmd ''abc'' next");
        assert_eq!(args, ["cmd", "'abc'", "next"]);

        let args = Arguments::parse("cmd \"\"x\"\"");
        assert_eq!(args, ["cmd", "\"x\""]);
    }

    #[test]
    fn test_reconstruction() {
        let inputs = [
            "cmd a b",
            "cmd   a\tb\n\nc",
            "x",
            "one  two   three    four",
            "it's a  mixed\"quote input",
        ];

        for input in inputs {
            let args = Arguments::parse(input);
            assert_eq!(args.rest(0), input.trim());
            assert_eq!(args.to_string(), input.trim());
        }
    }

    #[test]
    fn test_rest_and_slice() {
        let args = Arguments::parse("  say   hello  big\tworld ");
        assert_eq!(args.rest(1), "hello  big\tworld");
        assert_eq!(args.rest(3), "world");
        assert_eq!(args.rest(4), "");
        assert_eq!(args.slice(1, 3), "hello  big");
        assert_eq!(args.slice(2, 2), "");
    }

    #[test]
    fn test_source_rest() {
        let args = Arguments::parse("status playing 'a game'  now");
        assert_eq!(args.source_rest(2), "'a game'  now");
        assert_eq!(args.source_rest(4), "");
    }

    #[test]
    fn test_parse_at() {
        let args = Arguments::parse("cmd 42 abc");
        assert_eq!(args.parse_at::<u64>(1).unwrap(), 42);
        assert!(args.parse_at::<u64>(2).is_err());
        assert!(args.parse_at::<u64>(3).is_err());
    }

    #[test]
    fn test_parse_flags() {
        let mut args = Arguments::parse("help --show-hidden ping -d");
        args.parse_flags(FLAGS).unwrap();
        assert_eq!(args, ["help", "ping"]);
        assert!(args.has_flag("show-hidden"));
        assert!(args.has_flag("show-disabled"));
        assert_eq!(args.flag("show-hidden"), Some(&FlagValue::Bool(true)));
        assert_eq!(args.rest(0), "help ping");

        let mut args = Arguments::parse("help -hd");
        args.parse_flags(FLAGS).unwrap();
        assert_eq!(args, ["help"]);
        assert!(args.has_flag("show-hidden"));
        assert!(args.has_flag("show-disabled"));
    }

    #[test]
    fn test_parse_flags_values() {
        let mut args = Arguments::parse("list --limit=5 a");
        args.parse_flags(FLAGS).unwrap();
        assert_eq!(args, ["list", "a"]);
        assert_eq!(args.flag_value("limit"), Some("5"));

        let mut args = Arguments::parse("list -l 10 a");
        args.parse_flags(FLAGS).unwrap();
        assert_eq!(args, ["list", "a"]);
        assert_eq!(args.flag_value("limit"), Some("10"));

        let mut args = Arguments::parse("list --limit");
        let err = args.parse_flags(FLAGS).unwrap_err();
        assert_eq!(err, FlagParseError::MissingValue("limit"));

        let mut args = Arguments::parse("list --show-hidden=yes");
        let err = args.parse_flags(FLAGS).unwrap_err();
        assert_eq!(err, FlagParseError::UnexpectedValue("show-hidden"));
    }

    #[test]
    fn test_parse_flags_positional() {
        let mut args = Arguments::parse("calc -5 '--show-hidden' -- -d");
        args.parse_flags(FLAGS).unwrap();
        assert_eq!(args, ["calc", "-5", "--show-hidden", "-d"]);
        assert!(args.flags().is_empty());

        // The alias itself is never a flag.
        let mut args = Arguments::parse("-d");
        args.parse_flags(FLAGS).unwrap();
        assert_eq!(args, ["-d"]);
    }

    #[test]
    fn test_parse_flags_unknown() {
        let mut args = Arguments::parse("help --verbose");
        let err = args.parse_flags(FLAGS).unwrap_err();
        assert_eq!(err, FlagParseError::UnknownFlag(String::from("--verbose")));

        let mut args = Arguments::parse("help -x");
        let err = args.parse_flags(FLAGS).unwrap_err();
        assert_eq!(err, FlagParseError::UnknownFlag(String::from("-x")));

        // Without any known flags everything stays positional.
        let mut args = Arguments::parse("echo --verbose -x");
        args.parse_flags(&[]).unwrap();
        assert_eq!(args, ["echo", "--verbose", "-x"]);
    }

    #[test]
    fn test_flag_doc_line() {
        assert_eq!(FLAGS[0].doc_line(), "-h, --show-hidden");
        assert_eq!(
            Flag::new("bots").alias('b').doc("target bots").doc_line(),
            "-b, --bots: target bots"
        );
        assert_eq!(Flag::new("limit").value().doc_line(), "--limit <value>");
    }
}
