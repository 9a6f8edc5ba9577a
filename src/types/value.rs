use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;

use memchr::memchr;
use smol_str::SmolStr;

use crate::arena::{Entry, Key, Node, NodeId, ObjectInner, Span, StrNode};
use crate::decode::Document;
use crate::error::{JsonError, JsonResult};
use crate::num;
use crate::text::string::{escape_into, unescape_best_effort};

/// The JSON type of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Null,
    Object,
    Array,
    String,
    Number,
    True,
    False,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Null => "null",
            ValueType::Object => "object",
            ValueType::Array => "array",
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::True => "true",
            ValueType::False => "false",
        };
        f.write_str(name)
    }
}

/// A handle to one value in a parsed tree.
///
/// Handles are cheap to copy and borrow the parser that produced them; they
/// all die when the parser starts its next parse. String payloads are
/// slices of the parser's buffer until an accessor needs the unescaped
/// form, which is then computed once and cached next to the node.
#[derive(Clone, Copy)]
pub struct Value<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> Value<'a> {
    pub(crate) fn new(doc: &'a Document, id: NodeId) -> Self {
        Value { doc, id }
    }

    fn node(&self) -> &'a Node {
        self.doc.arena.get(self.id)
    }

    fn raw_str(&self, span: Span) -> &'a str {
        &self.doc.buf[span.start..span.end]
    }

    /// The logical (unescaped) form of a string node, computed on first
    /// observation and cached.
    fn logical_str(&self, node: &'a StrNode) -> &'a str {
        let cached = node.logical.get_or_init(|| {
            match unescape_best_effort(self.raw_str(node.raw)) {
                Cow::Borrowed(_) => None,
                Cow::Owned(text) => Some(text),
            }
        });
        match cached {
            Some(text) => text.as_str(),
            None => self.raw_str(node.raw),
        }
    }

    /// Returns the type of the value.
    ///
    /// Observing a string's type upgrades it from its raw state: from here
    /// on `marshal_to` re-escapes the logical form instead of echoing the
    /// source bytes.
    pub fn value_type(&self) -> ValueType {
        match self.node() {
            Node::Null => ValueType::Null,
            Node::True => ValueType::True,
            Node::False => ValueType::False,
            Node::Number(_) => ValueType::Number,
            Node::String(node) => {
                self.logical_str(node);
                ValueType::String
            }
            Node::Array(_) => ValueType::Array,
            Node::Object(_) => ValueType::Object,
        }
    }

    /// True when the keys path leads to a value.
    pub fn exists(&self, path: &[&str]) -> bool {
        self.get(path).is_some()
    }

    /// Descends the tree along `path`. Object steps look keys up; array
    /// steps read the key as a decimal index. Returns `None` as soon as a
    /// step does not resolve.
    pub fn get(&self, path: &[&str]) -> Option<Value<'a>> {
        let mut current = *self;
        for key in path {
            match current.node() {
                Node::Object(inner) => {
                    current = object_get(current.doc, inner, key)?;
                }
                Node::Array(items) => {
                    let index: usize = key.parse().ok()?;
                    let id = *items.borrow().get(index)?;
                    current = Value::new(current.doc, id);
                }
                _ => return None,
            }
        }
        Some(current)
    }

    /// The string at `path`, or `None` for a missing path or non-string.
    pub fn get_str(&self, path: &[&str]) -> Option<&'a str> {
        match self.get(path)?.node() {
            Node::String(node) => Some(self.logical_str(node)),
            _ => None,
        }
    }

    /// The number at `path` as f64, or 0 on any mismatch.
    pub fn get_f64(&self, path: &[&str]) -> f64 {
        match self.get(path).map(|v| (v, v.node())) {
            Some((v, Node::Number(span))) => num::parse_f64_best_effort(v.raw_str(*span)),
            _ => 0.0,
        }
    }

    /// The number at `path` as i64, or 0 on any mismatch.
    pub fn get_i64(&self, path: &[&str]) -> i64 {
        match self.get(path).map(|v| (v, v.node())) {
            Some((v, Node::Number(span))) => num::parse_i64_best_effort(v.raw_str(*span)),
            _ => 0,
        }
    }

    /// The number at `path` as u64, or 0 on any mismatch.
    pub fn get_u64(&self, path: &[&str]) -> u64 {
        match self.get(path).map(|v| (v, v.node())) {
            Some((v, Node::Number(span))) => num::parse_u64_best_effort(v.raw_str(*span)),
            _ => 0,
        }
    }

    /// The boolean at `path`, or false on any mismatch.
    pub fn get_bool(&self, path: &[&str]) -> bool {
        matches!(self.get(path).map(|v| v.node()), Some(Node::True))
    }

    /// The array elements at `path`, or `None` on any mismatch.
    pub fn get_array(&self, path: &[&str]) -> Option<Vec<Value<'a>>> {
        let v = self.get(path)?;
        match v.node() {
            Node::Array(items) => Some(
                items
                    .borrow()
                    .iter()
                    .map(|&id| Value::new(v.doc, id))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// The object at `path`, or `None` on any mismatch.
    pub fn get_object(&self, path: &[&str]) -> Option<Object<'a>> {
        let v = self.get(path)?;
        match v.node() {
            Node::Object(_) => Some(Object { doc: v.doc, id: v.id }),
            _ => None,
        }
    }

    /// The underlying string, or a type-mismatch error.
    pub fn as_str(&self) -> JsonResult<&'a str> {
        match self.node() {
            Node::String(node) => Ok(self.logical_str(node)),
            _ => Err(self.type_error("string")),
        }
    }

    /// The underlying number as f64, or an error.
    pub fn as_f64(&self) -> JsonResult<f64> {
        match self.node() {
            Node::Number(span) => num::parse_f64(self.raw_str(*span)),
            _ => Err(self.type_error("number")),
        }
    }

    /// The underlying number as i64, or an error.
    pub fn as_i64(&self) -> JsonResult<i64> {
        match self.node() {
            Node::Number(span) => num::parse_i64(self.raw_str(*span)),
            _ => Err(self.type_error("number")),
        }
    }

    /// The underlying number as u64, or an error.
    pub fn as_u64(&self) -> JsonResult<u64> {
        match self.node() {
            Node::Number(span) => num::parse_u64(self.raw_str(*span)),
            _ => Err(self.type_error("number")),
        }
    }

    /// The underlying boolean, or an error.
    pub fn as_bool(&self) -> JsonResult<bool> {
        match self.node() {
            Node::True => Ok(true),
            Node::False => Ok(false),
            _ => Err(self.type_error("bool")),
        }
    }

    /// The underlying array elements, or an error.
    pub fn as_array(&self) -> JsonResult<Vec<Value<'a>>> {
        match self.node() {
            Node::Array(items) => Ok(items
                .borrow()
                .iter()
                .map(|&id| Value::new(self.doc, id))
                .collect()),
            _ => Err(self.type_error("array")),
        }
    }

    /// The underlying object, or an error.
    pub fn as_object(&self) -> JsonResult<Object<'a>> {
        match self.node() {
            Node::Object(_) => Ok(Object { doc: self.doc, id: self.id }),
            _ => Err(self.type_error("object")),
        }
    }

    fn type_error(&self, expected: &str) -> JsonError {
        JsonError::type_mismatch(format!(
            "value doesn't contain {expected}; it contains {}",
            self.value_type()
        ))
    }

    /// The `null` singleton from the same parser, for use with the
    /// mutators.
    pub fn null_value(&self) -> Value<'a> {
        Value::new(self.doc, NodeId::NULL)
    }

    /// The `true` singleton from the same parser.
    pub fn true_value(&self) -> Value<'a> {
        Value::new(self.doc, NodeId::TRUE)
    }

    /// The `false` singleton from the same parser.
    pub fn false_value(&self) -> Value<'a> {
        Value::new(self.doc, NodeId::FALSE)
    }

    /// Sets the entry at `key` in an object, or at decimal index `key` in
    /// an array. Other types ignore the call. `value` must come from the
    /// same parser.
    pub fn set(&self, key: &str, value: Value<'a>) {
        debug_assert!(
            std::ptr::eq(self.doc, value.doc),
            "value belongs to a different parser"
        );
        match self.node() {
            Node::Object(cell) => object_set(self.doc, cell, key, value.id),
            Node::Array(_) => {
                if let Ok(index) = key.parse::<usize>() {
                    self.set_array_item(index, value);
                }
            }
            _ => {}
        }
    }

    /// Assigns `value` at `index`, padding with the `null` singleton when
    /// the array is shorter. Non-arrays ignore the call.
    pub fn set_array_item(&self, index: usize, value: Value<'a>) {
        debug_assert!(
            std::ptr::eq(self.doc, value.doc),
            "value belongs to a different parser"
        );
        if let Node::Array(items) = self.node() {
            let mut items = items.borrow_mut();
            while index >= items.len() {
                items.push(NodeId::NULL);
            }
            items[index] = value.id;
        }
    }

    /// Deletes `key` from an object, or the element at decimal index `key`
    /// from an array. Order of the remaining entries is preserved.
    pub fn del(&self, key: &str) {
        match self.node() {
            Node::Object(cell) => object_del(self.doc, cell, key),
            Node::Array(items) => {
                if let Ok(index) = key.parse::<usize>() {
                    let mut items = items.borrow_mut();
                    if index < items.len() {
                        items.remove(index);
                    }
                }
            }
            _ => {}
        }
    }

    /// Appends the serialized value to `dst`: no whitespace, keys and
    /// strings emitted raw while they are unobserved, re-escaped after.
    pub fn marshal_to(&self, dst: &mut String) {
        marshal_value(self.doc, self.id, dst);
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.marshal_to(&mut out);
        f.write_str(&out)
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value({self})")
    }
}

/// A handle to an object value: ordered entries, duplicate keys permitted.
#[derive(Clone, Copy)]
pub struct Object<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl<'a> Object<'a> {
    fn cell(&self) -> &'a RefCell<ObjectInner> {
        match self.doc.arena.get(self.id) {
            Node::Object(cell) => cell,
            _ => unreachable!("object handle points at a non-object node"),
        }
    }

    /// Number of entries, duplicates included.
    pub fn len(&self) -> usize {
        self.cell().borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the value for `key`: the first match in insertion order.
    ///
    /// While keys are still raw and the needle has no backslash, the lookup
    /// compares raw bytes; otherwise all keys are unescaped in place first.
    pub fn get(&self, key: &str) -> Option<Value<'a>> {
        object_get(self.doc, self.cell(), key)
    }

    /// Calls `f` for every entry in insertion order, duplicates included.
    /// Keys are unescaped before iteration; the key borrow must not outlive
    /// the call. Mutating the object from inside `f` panics.
    pub fn visit<F>(&self, mut f: F)
    where
        F: FnMut(&str, Value<'a>),
    {
        let cell = self.cell();
        unescape_keys(self.doc, cell);
        let inner = cell.borrow();
        for entry in &inner.entries {
            f(key_str(self.doc, &entry.key), Value::new(self.doc, entry.value));
        }
    }

    /// Sets `key` to `value`, updating the first existing match in place or
    /// appending a new entry. `value` must come from the same parser.
    pub fn set(&self, key: &str, value: Value<'a>) {
        debug_assert!(
            std::ptr::eq(self.doc, value.doc),
            "value belongs to a different parser"
        );
        object_set(self.doc, self.cell(), key, value.id);
    }

    /// Removes the first entry matching `key`, keeping the order of the
    /// rest.
    pub fn del(&self, key: &str) {
        object_del(self.doc, self.cell(), key);
    }

    /// Appends the serialized object to `dst`.
    pub fn marshal_to(&self, dst: &mut String) {
        marshal_object(self.doc, self.cell(), dst);
    }
}

impl fmt::Display for Object<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.marshal_to(&mut out);
        f.write_str(&out)
    }
}

impl fmt::Debug for Object<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({self})")
    }
}

fn object_get<'a>(
    doc: &'a Document,
    cell: &'a RefCell<ObjectInner>,
    key: &str,
) -> Option<Value<'a>> {
    {
        let inner = cell.borrow();
        if !inner.keys_unescaped && memchr(b'\\', key.as_bytes()).is_none() {
            // Fast path - compare against raw keys without unescaping.
            for entry in &inner.entries {
                if key_eq(doc, &entry.key, key) {
                    return Some(Value::new(doc, entry.value));
                }
            }
        }
    }

    // Slow path - unescape object keys, then search again.
    unescape_keys(doc, cell);
    let inner = cell.borrow();
    for entry in &inner.entries {
        if key_eq(doc, &entry.key, key) {
            return Some(Value::new(doc, entry.value));
        }
    }
    None
}

fn object_set(doc: &Document, cell: &RefCell<ObjectInner>, key: &str, value: NodeId) {
    unescape_keys(doc, cell);
    let mut inner = cell.borrow_mut();
    for entry in &mut inner.entries {
        if key_eq(doc, &entry.key, key) {
            entry.value = value;
            return;
        }
    }
    inner.entries.push(Entry {
        key: Key::Unescaped(SmolStr::new(key)),
        value,
    });
}

fn object_del(doc: &Document, cell: &RefCell<ObjectInner>, key: &str) {
    {
        let mut inner = cell.borrow_mut();
        if !inner.keys_unescaped && memchr(b'\\', key.as_bytes()).is_none() {
            // Fast path - search raw keys.
            let found = inner
                .entries
                .iter()
                .position(|entry| key_eq(doc, &entry.key, key));
            if let Some(index) = found {
                inner.entries.remove(index);
                return;
            }
        }
    }

    unescape_keys(doc, cell);
    let mut inner = cell.borrow_mut();
    let found = inner
        .entries
        .iter()
        .position(|entry| key_eq(doc, &entry.key, key));
    if let Some(index) = found {
        inner.entries.remove(index);
    }
}

/// Rewrites every escaped key to its logical form and marks the object.
/// Keys without escapes keep pointing at the buffer. Idempotent.
fn unescape_keys(doc: &Document, cell: &RefCell<ObjectInner>) {
    let mut inner = cell.borrow_mut();
    if inner.keys_unescaped {
        return;
    }
    let ObjectInner { entries, keys_unescaped } = &mut *inner;
    for entry in entries {
        if let Key::Raw(span) = &entry.key {
            let raw = &doc.buf[span.start..span.end];
            if let Cow::Owned(text) = unescape_best_effort(raw) {
                entry.key = Key::Unescaped(SmolStr::from(text));
            }
        }
    }
    *keys_unescaped = true;
}

/// A raw key compares by its source bytes; once unescaped (or inserted via
/// `set`) it compares by its logical form.
fn key_eq(doc: &Document, key: &Key, needle: &str) -> bool {
    key_str(doc, key) == needle
}

fn key_str<'b>(doc: &'b Document, key: &'b Key) -> &'b str {
    match key {
        Key::Raw(span) => &doc.buf[span.start..span.end],
        Key::Unescaped(text) => text.as_str(),
    }
}

fn marshal_value(doc: &Document, id: NodeId, dst: &mut String) {
    match doc.arena.get(id) {
        Node::Null => dst.push_str("null"),
        Node::True => dst.push_str("true"),
        Node::False => dst.push_str("false"),
        Node::Number(span) => dst.push_str(&doc.buf[span.start..span.end]),
        Node::String(node) => match node.logical.get() {
            // Raw state round-trips the source bytes without re-escaping.
            None => {
                dst.push('"');
                dst.push_str(&doc.buf[node.raw.start..node.raw.end]);
                dst.push('"');
            }
            Some(cached) => {
                let logical = match cached {
                    Some(text) => text.as_str(),
                    None => &doc.buf[node.raw.start..node.raw.end],
                };
                escape_into(dst, logical);
            }
        },
        Node::Array(items) => {
            dst.push('[');
            let items = items.borrow();
            for (i, &item) in items.iter().enumerate() {
                if i > 0 {
                    dst.push(',');
                }
                marshal_value(doc, item, dst);
            }
            dst.push(']');
        }
        Node::Object(cell) => marshal_object(doc, cell, dst),
    }
}

fn marshal_object(doc: &Document, cell: &RefCell<ObjectInner>, dst: &mut String) {
    let inner = cell.borrow();
    dst.push('{');
    for (i, entry) in inner.entries.iter().enumerate() {
        if i > 0 {
            dst.push(',');
        }
        if inner.keys_unescaped {
            escape_into(dst, key_str(doc, &entry.key));
        } else {
            dst.push('"');
            dst.push_str(key_str(doc, &entry.key));
            dst.push('"');
        }
        dst.push(':');
        marshal_value(doc, entry.value, dst);
    }
    dst.push('}');
}
