// src/manifest/action.rs

//! Single manifest actions and their attribute tokenizer

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

/// Hash reported for actions that carry no payload
pub const NOHASH: &str = "NOHASH";

/// Value of an action attribute
///
/// Repeating a key on one action line turns its value into a list, in the
/// order the values appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Single(String),
    List(Vec<String>),
}

impl AttrValue {
    /// First value, which is the only one for `Single`
    pub fn first(&self) -> &str {
        match self {
            AttrValue::Single(value) => value,
            AttrValue::List(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// All values in order
    pub fn values(&self) -> &[String] {
        match self {
            AttrValue::Single(value) => std::slice::from_ref(value),
            AttrValue::List(values) => values,
        }
    }

    /// Join all values with `sep`
    pub fn join(&self, sep: &str) -> String {
        self.values().join(sep)
    }

    fn push(&mut self, value: String) {
        match self {
            AttrValue::Single(existing) => {
                let first = std::mem::take(existing);
                *self = AttrValue::List(vec![first, value]);
            }
            AttrValue::List(values) => values.push(value),
        }
    }
}

/// Action types found in IPS manifests
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Set,
    File,
    Dir,
    Link,
    Hardlink,
    Driver,
    User,
    Group,
    Depend,
    License,
    Legacy,
    Signature,
    Other(String),
}

impl ActionKind {
    /// Map an action keyword to its kind
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword {
            "set" => ActionKind::Set,
            "file" => ActionKind::File,
            "dir" => ActionKind::Dir,
            "link" => ActionKind::Link,
            "hardlink" => ActionKind::Hardlink,
            "driver" => ActionKind::Driver,
            "user" => ActionKind::User,
            "group" => ActionKind::Group,
            "depend" => ActionKind::Depend,
            "license" => ActionKind::License,
            "legacy" => ActionKind::Legacy,
            "signature" => ActionKind::Signature,
            other => ActionKind::Other(other.to_string()),
        }
    }

    /// Keyword as written in a manifest
    pub fn keyword(&self) -> &str {
        match self {
            ActionKind::Set => "set",
            ActionKind::File => "file",
            ActionKind::Dir => "dir",
            ActionKind::Link => "link",
            ActionKind::Hardlink => "hardlink",
            ActionKind::Driver => "driver",
            ActionKind::User => "user",
            ActionKind::Group => "group",
            ActionKind::Depend => "depend",
            ActionKind::License => "license",
            ActionKind::Legacy => "legacy",
            ActionKind::Signature => "signature",
            ActionKind::Other(keyword) => keyword,
        }
    }

    /// Whether the first bare token of the action is a payload hash
    fn has_payload(&self) -> bool {
        matches!(self, ActionKind::File | ActionKind::License | ActionKind::Signature)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// One parsed manifest action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    hash: Option<String>,
    attrs: BTreeMap<String, AttrValue>,
}

impl Action {
    /// Create an action with no attributes
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            hash: None,
            attrs: BTreeMap::new(),
        }
    }

    /// Parse one logical manifest line (continuations already joined)
    pub fn parse(line: &str, line_no: usize) -> Result<Self> {
        let line = line.trim();
        let (keyword, rest) = match line.find(char::is_whitespace) {
            Some(pos) => (&line[..pos], &line[pos..]),
            None => (line, ""),
        };

        let mut action = Action::new(ActionKind::from_keyword(keyword));
        let mut tokens = Tokenizer::new(rest, line_no);

        while let Some(token) = tokens.next_token()? {
            match token {
                Token::Bare(word) => {
                    if action.kind.has_payload() && action.hash.is_none() && action.attrs.is_empty() {
                        action.hash = Some(word);
                    } else {
                        return Err(Error::ManifestParse {
                            line: line_no,
                            message: format!("attribute '{}' has no value", word),
                        });
                    }
                }
                Token::Attr(key, value) => {
                    if key == "hash" && action.kind.has_payload() && action.hash.is_none() {
                        action.hash = Some(value.clone());
                    }
                    action.add_attr(key, value);
                }
            }
        }

        Ok(action)
    }

    /// Add a value, turning repeated keys into lists
    pub fn add_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.entry(key.into()) {
            Entry::Occupied(mut existing) => existing.get_mut().push(value),
            Entry::Vacant(slot) => {
                slot.insert(AttrValue::Single(value));
            }
        }
    }

    /// Attribute value, if present
    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }

    /// First value of an attribute, if present
    pub fn attr_first(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(AttrValue::first)
    }

    /// First value of an attribute that must be present
    pub fn require(&self, key: &str) -> Result<&str> {
        self.attr_first(key).ok_or_else(|| Error::MissingAttribute {
            action: self.kind.to_string(),
            attr: key.to_string(),
        })
    }

    /// Payload hash, or `NOHASH` for payload-less actions
    pub fn payload_hash(&self) -> &str {
        self.hash.as_deref().unwrap_or(NOHASH)
    }
}

enum Token {
    Bare(String),
    Attr(String, String),
}

struct Tokenizer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line_no: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str, line_no: usize) -> Self {
        Self {
            chars: input.chars().peekable(),
            line_no,
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}

        if self.chars.peek().is_none() {
            return Ok(None);
        }

        let mut key = String::new();
        while let Some(&c) = self.chars.peek() {
            if c == '=' || c.is_whitespace() {
                break;
            }
            key.push(c);
            self.chars.next();
        }

        if self.chars.next_if_eq(&'=').is_none() {
            return Ok(Some(Token::Bare(key)));
        }

        if key.is_empty() {
            return Err(self.error("attribute with empty name"));
        }

        let value = match self.chars.peek() {
            Some(&quote) if quote == '"' || quote == '\'' => {
                self.chars.next();
                self.quoted(quote)?
            }
            _ => {
                let mut value = String::new();
                while let Some(c) = self.chars.next_if(|c| !c.is_whitespace()) {
                    value.push(c);
                }
                value
            }
        };

        Ok(Some(Token::Attr(key, value)))
    }

    /// Read a quoted value; `\` escapes only the quote character and itself
    fn quoted(&mut self, quote: char) -> Result<String> {
        let mut value = String::new();
        loop {
            match self.chars.next() {
                Some('\\') => match self.chars.peek() {
                    Some(&next) if next == quote || next == '\\' => {
                        value.push(next);
                        self.chars.next();
                    }
                    _ => value.push('\\'),
                },
                Some(c) if c == quote => return Ok(value),
                Some(c) => value.push(c),
                None => return Err(self.error("unterminated quoted value")),
            }
        }
    }

    fn error(&self, message: &str) -> Error {
        Error::ManifestParse {
            line: self.line_no,
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_action_with_payload() {
        let action = Action::parse(
            "file 3f2a9c path=usr/bin/ls owner=root group=bin mode=0555",
            1,
        )
        .unwrap();
        assert_eq!(action.kind, ActionKind::File);
        assert_eq!(action.payload_hash(), "3f2a9c");
        assert_eq!(action.attr_first("path"), Some("usr/bin/ls"));
        assert_eq!(action.attr_first("mode"), Some("0555"));
    }

    #[test]
    fn test_file_without_payload_reports_nohash() {
        let action = Action::parse("file path=etc/motd mode=0644", 3).unwrap();
        assert_eq!(action.payload_hash(), NOHASH);
    }

    #[test]
    fn test_hash_attribute_is_payload() {
        let action = Action::parse("file hash=abc123 path=a/b", 1).unwrap();
        assert_eq!(action.payload_hash(), "abc123");
    }

    #[test]
    fn test_quoted_values_and_escapes() {
        let action = Action::parse(
            r#"set name=pkg.description value="It's \"quoted\" text""#,
            1,
        )
        .unwrap();
        assert_eq!(action.attr_first("value"), Some(r#"It's "quoted" text"#));

        let action = Action::parse(r"driver name=foo devlink='type=ddi_pseudo;name=foo\t\D'", 1).unwrap();
        assert_eq!(action.attr_first("devlink"), Some(r"type=ddi_pseudo;name=foo\t\D"));
    }

    #[test]
    fn test_repeated_keys_become_list() {
        let action = Action::parse(r#"driver name=e1000g alias=pci8086,1000 alias=pci8086,1001 alias="pciex8086,105e""#, 1).unwrap();
        let alias = action.attr("alias").unwrap();
        assert_eq!(alias.values().len(), 3);
        assert_eq!(alias.first(), "pci8086,1000");
        assert_eq!(alias.join(" "), "pci8086,1000 pci8086,1001 pciex8086,105e");
    }

    #[test]
    fn test_bare_token_outside_payload_is_error() {
        let result = Action::parse("dir path=usr stray", 7);
        match result {
            Err(Error::ManifestParse { line, .. }) => assert_eq!(line, 7),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unterminated_quote_is_error() {
        assert!(Action::parse(r#"set name=pkg.summary value="open"#, 1).is_err());
    }

    #[test]
    fn test_require_missing_attribute() {
        let action = Action::parse("dir path=usr/lib", 1).unwrap();
        let err = action.require("mode").unwrap_err();
        assert_eq!(err.to_string(), "dir action is missing required attribute 'mode'");
    }

    #[test]
    fn test_unknown_action_kind_is_kept() {
        let action = Action::parse("unknown foo=bar", 1).unwrap();
        assert_eq!(action.kind, ActionKind::Other("unknown".to_string()));
        assert_eq!(action.kind.to_string(), "unknown");
    }
}
