//! Token-level field extraction
//!
//! Practitioner payloads attach identifiers and contact points as
//! `{"system": ..., "value": ...}` objects whose position in the tree varies
//! between directory profiles. Rather than modelling every profile, the
//! payload is flattened once into a [`Token`] stream and each field is found
//! by a small depth-tracking scan over it.
//!
//! Extraction is best effort. Malformed JSON, truncated input or a missing
//! key all yield an empty string for the affected field; the scan never
//! fails and never aborts the caller. Tokens read before a syntax error are
//! still scanned.

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use std::fmt;

/// System tag of e-mail contact points
pub const EMAIL_SYSTEM: &str = "email";

/// System tag of phone contact points
pub const PHONE_SYSTEM: &str = "phone";

const SYSTEM_KEY: &str = "system";
const VALUE_KEY: &str = "value";
const GIVEN_KEY: &str = "given";
const FAMILY_KEY: &str = "family";

/// One event of the flattened JSON stream
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Key(String),
    String(String),
    /// Numbers keep their textual form
    Number(String),
    Bool(bool),
    Null,
}

impl Token {
    /// Text of a string or number scalar
    fn scalar_text(&self) -> Option<&str> {
        match self {
            Token::String(s) | Token::Number(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Flattens a JSON document into tokens, keeping everything read before a
/// syntax error
pub fn tokenize(bytes: &[u8]) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    // A syntax error only truncates the stream
    let _ = TokenSink {
        tokens: &mut tokens,
    }
    .deserialize(&mut deserializer);
    tokens
}

/// Records every visited value as tokens
struct TokenSink<'a> {
    tokens: &'a mut Vec<Token>,
}

impl<'de> DeserializeSeed<'de> for TokenSink<'_> {
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for TokenSink<'_> {
    type Value = ();

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<(), E>
    where
        E: de::Error,
    {
        self.tokens.push(Token::Bool(v));
        Ok(())
    }

    fn visit_i64<E>(self, v: i64) -> Result<(), E>
    where
        E: de::Error,
    {
        self.tokens.push(Token::Number(v.to_string()));
        Ok(())
    }

    fn visit_u64<E>(self, v: u64) -> Result<(), E>
    where
        E: de::Error,
    {
        self.tokens.push(Token::Number(v.to_string()));
        Ok(())
    }

    fn visit_f64<E>(self, v: f64) -> Result<(), E>
    where
        E: de::Error,
    {
        self.tokens.push(Token::Number(v.to_string()));
        Ok(())
    }

    fn visit_str<E>(self, v: &str) -> Result<(), E>
    where
        E: de::Error,
    {
        self.tokens.push(Token::String(v.to_string()));
        Ok(())
    }

    fn visit_string<E>(self, v: String) -> Result<(), E>
    where
        E: de::Error,
    {
        self.tokens.push(Token::String(v));
        Ok(())
    }

    fn visit_unit<E>(self) -> Result<(), E>
    where
        E: de::Error,
    {
        self.tokens.push(Token::Null);
        Ok(())
    }

    fn visit_none<E>(self) -> Result<(), E>
    where
        E: de::Error,
    {
        self.tokens.push(Token::Null);
        Ok(())
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<(), A::Error>
    where
        A: SeqAccess<'de>,
    {
        self.tokens.push(Token::BeginArray);
        while seq
            .next_element_seed(TokenSink {
                tokens: &mut *self.tokens,
            })?
            .is_some()
        {}
        self.tokens.push(Token::EndArray);
        Ok(())
    }

    fn visit_map<A>(self, mut map: A) -> Result<(), A::Error>
    where
        A: MapAccess<'de>,
    {
        self.tokens.push(Token::BeginObject);
        while let Some(key) = map.next_key::<String>()? {
            self.tokens.push(Token::Key(key));
            map.next_value_seed(TokenSink {
                tokens: &mut *self.tokens,
            })?;
        }
        self.tokens.push(Token::EndObject);
        Ok(())
    }
}

/// `system`/`value` seen so far in one open object
#[derive(Default)]
struct ObjectFrame {
    pending_key: Option<String>,
    system: Option<String>,
    value: Option<String>,
}

enum Container {
    Object(ObjectFrame),
    Array,
}

/// Value of the first object whose `system` equals `system`, in document
/// order. Both keys must belong to the same object.
pub fn find_system_value(tokens: &[Token], system: &str) -> Option<String> {
    let mut stack: Vec<Container> = Vec::new();

    for token in tokens {
        match token {
            Token::BeginObject | Token::BeginArray => {
                if let Some(Container::Object(frame)) = stack.last_mut() {
                    frame.pending_key = None;
                }
                stack.push(match token {
                    Token::BeginObject => Container::Object(ObjectFrame::default()),
                    _ => Container::Array,
                });
            }
            Token::EndObject | Token::EndArray => {
                stack.pop();
            }
            Token::Key(key) => {
                if let Some(Container::Object(frame)) = stack.last_mut() {
                    frame.pending_key = Some(key.clone());
                }
            }
            scalar => {
                let Some(Container::Object(frame)) = stack.last_mut() else {
                    continue;
                };
                let Some(key) = frame.pending_key.take() else {
                    continue;
                };
                let text = scalar.scalar_text().map(str::to_string);
                match key.as_str() {
                    SYSTEM_KEY => frame.system = text,
                    VALUE_KEY => frame.value = text,
                    _ => continue,
                }
                if frame.system.as_deref() == Some(system) {
                    if let Some(value) = &frame.value {
                        return Some(value.clone());
                    }
                }
            }
        }
    }
    None
}

/// Strings of the first array bound to `key`, joined with single spaces
///
/// Only the array's direct string elements are kept; nested containers are
/// skipped.
pub fn find_joined_array(tokens: &[Token], key: &str) -> Option<String> {
    let start = tokens.windows(2).position(|pair| {
        matches!(&pair[0], Token::Key(k) if k == key) && pair[1] == Token::BeginArray
    })?;

    let mut parts = Vec::new();
    let mut depth = 0usize;
    for token in &tokens[start + 2..] {
        match token {
            Token::BeginArray | Token::BeginObject => depth += 1,
            Token::EndArray if depth == 0 => break,
            Token::EndArray | Token::EndObject => depth = depth.saturating_sub(1),
            Token::String(s) if depth == 0 => parts.push(s.as_str()),
            _ => {}
        }
    }
    Some(parts.join(" "))
}

/// First string or number scalar bound to `key`
pub fn find_scalar(tokens: &[Token], key: &str) -> Option<String> {
    tokens.windows(2).find_map(|pair| match &pair[0] {
        Token::Key(k) if k == key => pair[1].scalar_text().map(str::to_string),
        _ => None,
    })
}

/// Lowercases the text, then uppercases the first character of every
/// whitespace-separated segment. Whitespace is kept as is.
///
/// ```
/// use annuaire::fhir::extract::title_case;
///
/// assert_eq!(title_case("DUPONT"), "Dupont");
/// assert_eq!(title_case("jean-paul"), "Jean-paul");
/// ```
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut segment_start = true;
    for c in text.to_lowercase().chars() {
        if c.is_whitespace() {
            segment_start = true;
            out.push(c);
        } else if segment_start {
            segment_start = false;
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Practitioner fields extracted from one raw payload
///
/// Every field is empty when it could not be found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub identifier: String,
    pub given_names: String,
    pub family_name: String,
    pub email: String,
    pub phone: String,
}

/// Locates identity and contact fields in raw practitioner payloads
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    identifier_system: String,
}

impl FieldExtractor {
    /// `identifier_system` is the URI of the national registry identifier
    pub fn new(identifier_system: impl Into<String>) -> Self {
        Self {
            identifier_system: identifier_system.into(),
        }
    }

    pub fn identifier_system(&self) -> &str {
        &self.identifier_system
    }

    /// Registry identifier, verbatim
    pub fn identifier(&self, payload: &[u8]) -> String {
        find_system_value(&tokenize(payload), &self.identifier_system).unwrap_or_default()
    }

    /// E-mail contact point, lowercased
    pub fn email(&self, payload: &[u8]) -> String {
        Self::email_from(&tokenize(payload))
    }

    /// Phone contact point, without whitespace
    pub fn phone(&self, payload: &[u8]) -> String {
        Self::phone_from(&tokenize(payload))
    }

    /// Given names, space-joined and title-cased
    pub fn given_names(&self, payload: &[u8]) -> String {
        Self::given_from(&tokenize(payload))
    }

    /// Family name, title-cased
    pub fn family_name(&self, payload: &[u8]) -> String {
        Self::family_from(&tokenize(payload))
    }

    /// All fields at once, tokenizing the payload a single time
    pub fn extract(&self, payload: &[u8]) -> ExtractedFields {
        let tokens = tokenize(payload);
        ExtractedFields {
            identifier: find_system_value(&tokens, &self.identifier_system).unwrap_or_default(),
            given_names: Self::given_from(&tokens),
            family_name: Self::family_from(&tokens),
            email: Self::email_from(&tokens),
            phone: Self::phone_from(&tokens),
        }
    }

    fn email_from(tokens: &[Token]) -> String {
        find_system_value(tokens, EMAIL_SYSTEM)
            .map(|email| email.to_lowercase())
            .unwrap_or_default()
    }

    fn phone_from(tokens: &[Token]) -> String {
        find_system_value(tokens, PHONE_SYSTEM)
            .map(|phone| phone.chars().filter(|c| !c.is_whitespace()).collect())
            .unwrap_or_default()
    }

    fn given_from(tokens: &[Token]) -> String {
        find_joined_array(tokens, GIVEN_KEY)
            .map(|given| title_case(&given))
            .unwrap_or_default()
    }

    fn family_from(tokens: &[Token]) -> String {
        find_scalar(tokens, FAMILY_KEY)
            .map(|family| title_case(&family))
            .unwrap_or_default()
    }
}
