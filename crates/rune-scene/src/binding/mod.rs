//! Field paths: string addresses of object properties.
//!
//! ```text
//! path    := ['$' ident] segment*
//! segment := '.' ident | '[' digits ']'
//! ```
//!
//! The first segment may omit its dot (`dstRect.x`). `$name` starts the walk
//! at the object registered under that name instead of the owner. Adjacent
//! identifiers that together form a registry key (`dstRect` + `x`) are merged
//! at parse time; object-valued properties such as `parent` or
//! `subObjects[2]` continue the walk on the referenced object.

mod handler;

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::{Result, SceneError};
use crate::object::GameObject;
use crate::stage::{ObjectId, Stage};
use crate::value::Value;

pub use handler::{Binding, BindingHandler};

/// One step of a compiled path.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Property registry key, possibly spanning two identifiers.
    Key(String),
    /// Element of a list-valued property.
    Index(usize),
}

/// A parsed field path.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPath {
    text: String,
    root: Option<String>,
    segments: Vec<Segment>,
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

enum Cursor {
    Object(ObjectId),
    Value(Value),
}

impl FieldPath {
    pub fn parse(text: &str) -> Result<Self> {
        let mut parser = Parser {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        };
        let mut root = None;
        let mut raw = Vec::new();

        if parser.peek() == Some(b'$') {
            parser.pos += 1;
            root = Some(parser.ident()?.to_string());
        } else if parser.peek().is_some_and(|b| b != b'[') {
            raw.push(Segment::Key(parser.ident()?.to_string()));
        }

        while let Some(byte) = parser.peek() {
            match byte {
                b'.' => {
                    parser.pos += 1;
                    raw.push(Segment::Key(parser.ident()?.to_string()));
                }
                b'[' => {
                    parser.pos += 1;
                    let index = parser.digits()?;
                    parser.expect(b']')?;
                    raw.push(Segment::Index(index));
                }
                _ => return Err(parser.error("expected '.' or '['")),
            }
        }

        if root.is_none() && raw.is_empty() {
            return Err(parser.error("empty path"));
        }

        Ok(Self {
            text: text.to_string(),
            root,
            segments: merge_keys(raw),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn start(&self, stage: &Stage, owner: ObjectId) -> Result<ObjectId> {
        match &self.root {
            Some(name) => stage.find_by_name(name).ok_or_else(|| self.unresolved()),
            None => Ok(owner),
        }
    }

    fn unresolved(&self) -> SceneError {
        SceneError::Resolution {
            path: self.text.clone(),
        }
    }

    fn step(&self, stage: &Stage, cursor: Cursor, segment: &Segment) -> Result<Cursor> {
        let value = match (cursor, segment) {
            (Cursor::Object(id), Segment::Key(key)) => {
                let object = stage.get(id).ok_or_else(|| self.unresolved())?;
                object.property(key).unwrap_or_default()
            }
            (Cursor::Value(Value::List(items)), Segment::Index(index)) => {
                items.get(*index).cloned().ok_or_else(|| self.unresolved())?
            }
            _ => return Err(self.unresolved()),
        };
        Ok(match value {
            Value::Object { object } => Cursor::Object(object),
            value => Cursor::Value(value),
        })
    }

    /// Read the addressed value. Missing free-form fields read as `Null`.
    pub fn get(&self, stage: &Stage, owner: ObjectId) -> Result<Value> {
        let mut cursor = Cursor::Object(self.start(stage, owner)?);
        for segment in &self.segments {
            cursor = self.step(stage, cursor, segment)?;
        }
        Ok(match cursor {
            Cursor::Object(object) => Value::object(object),
            Cursor::Value(value) => value,
        })
    }

    /// Write the addressed property.
    pub fn set(&self, stage: &mut Stage, owner: ObjectId, value: Value) -> Result<()> {
        let Some((last, init)) = self.segments.split_last() else {
            return Err(SceneError::ReadOnly {
                path: self.text.clone(),
            });
        };
        let mut cursor = Cursor::Object(self.start(stage, owner)?);
        for segment in init {
            cursor = self.step(stage, cursor, segment)?;
        }
        match (cursor, last) {
            (Cursor::Object(id), Segment::Key(key)) => {
                let object: &mut GameObject = stage.get_mut(id).ok_or_else(|| self.unresolved())?;
                object.set_property(key, value).map_err(|error| match error {
                    SceneError::ReadOnly { .. } => SceneError::ReadOnly {
                        path: self.text.clone(),
                    },
                    other => other,
                })
            }
            (Cursor::Value(Value::List(_)), Segment::Index(_)) => Err(SceneError::ReadOnly {
                path: self.text.clone(),
            }),
            _ => Err(self.unresolved()),
        }
    }
}

/// Merge `a` + `b` into `a.b` wherever that names a registry key.
fn merge_keys(raw: Vec<Segment>) -> Vec<Segment> {
    let mut merged = Vec::with_capacity(raw.len());
    let mut iter = raw.into_iter().peekable();
    while let Some(segment) = iter.next() {
        if let Segment::Key(first) = &segment
            && let Some(Segment::Key(second)) = iter.peek()
        {
            let joined = format!("{first}.{second}");
            if GameObject::is_property(&joined) {
                iter.next();
                merged.push(Segment::Key(joined));
                continue;
            }
        }
        merged.push(segment);
    }
    merged
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn error(&self, reason: &str) -> SceneError {
        SceneError::Parse {
            path: self.text.to_string(),
            position: self.pos,
            reason: reason.to_string(),
        }
    }

    fn ident(&mut self) -> Result<&str> {
        let start = self.pos;
        match self.peek() {
            Some(b) if b.is_ascii_alphabetic() || b == b'_' => self.pos += 1,
            _ => return Err(self.error("expected identifier")),
        }
        while self.peek().is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_') {
            self.pos += 1;
        }
        Ok(&self.text[start..self.pos])
    }

    fn digits(&mut self) -> Result<usize> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected index"));
        }
        self.text[start..self.pos]
            .parse()
            .map_err(|_| self.error("index out of range"))
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", byte as char)))
        }
    }
}

/// Parsed paths keyed by their literal text. Never evicted until cleared.
#[derive(Debug, Default)]
pub struct FieldPathCache {
    paths: HashMap<String, Rc<FieldPath>>,
}

impl FieldPathCache {
    pub fn resolve(&mut self, text: &str) -> Result<Rc<FieldPath>> {
        if let Some(path) = self.paths.get(text) {
            return Ok(path.clone());
        }
        let path = Rc::new(FieldPath::parse(text)?);
        self.paths.insert(text.to_string(), path.clone());
        Ok(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn clear(&mut self) {
        self.paths.clear();
    }
}

/// Compile `path` through the stage's cache.
pub fn resolve_field_path(stage: &mut Stage, path: &str) -> Result<Rc<FieldPath>> {
    stage.field_paths.resolve(path)
}

/// Text is a path resolved against `owner`; anything else is already a value.
pub fn field_value(stage: &mut Stage, owner: ObjectId, value: &Value) -> Result<Value> {
    match value {
        Value::Text(path) => resolve_field_path(stage, path)?.get(stage, owner),
        literal => Ok(literal.clone()),
    }
}
