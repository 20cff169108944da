//! The WildTalk value model.
//!
//! Every value is canonically a string. Numeric, boolean and integer
//! interpretations are derived once at construction and memoized; they are
//! never recomputed or mutated afterwards. All operations return new
//! values — a `Value` is immutable from the moment it exists.
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::RuntimeError;
use wt_syntax::name_eq;

#[derive(Clone, Debug)]
pub struct Value {
    text: Arc<str>,
    int: Option<i64>,
    float: Option<f64>,
    boolean: Option<bool>,
}

/// Chunk kinds, mirrored from the AST so the value model stands alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Chunk {
    Char,
    Word,
    Item,
    Line,
}

/// A resolved chunk index: a 1-based position or the `middle` ordinal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkPos {
    At(usize),
    Middle,
}

/// Where a chunk replacement lands relative to the addressed range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prep {
    Before,
    Into,
    After,
    Replacing,
}

impl Value {
    /// Parse a canonical string into a value. Always succeeds; numeric and
    /// boolean interpretations are attempted opportunistically. The empty
    /// string is numerically zero but not boolean.
    pub fn new(text: impl Into<String>) -> Self {
        let text: String = text.into();
        let trimmed = text.trim();
        let (int, float, boolean) = if text.is_empty() {
            (Some(0), Some(0.0), None)
        } else {
            let int = trimmed.parse::<i64>().ok();
            let float = match int {
                Some(i) => Some(i as f64),
                None => trimmed.parse::<f64>().ok().filter(|f| f.is_finite()),
            };
            let boolean = if trimmed.eq_ignore_ascii_case("true") {
                Some(true)
            } else if trimmed.eq_ignore_ascii_case("false") {
                Some(false)
            } else {
                None
            };
            (int, float, boolean)
        };
        Self {
            text: text.into(),
            int,
            float,
            boolean,
        }
    }

    pub fn empty() -> Self {
        Self::new("")
    }

    pub fn from_int(i: i64) -> Self {
        let mut buf = itoa::Buffer::new();
        Self {
            text: buf.format(i).into(),
            int: Some(i),
            float: Some(i as f64),
            boolean: None,
        }
    }

    pub fn from_float(f: f64) -> Self {
        // Integral results render without a fraction, the way arithmetic
        // results read in a message box ("6 + 2.0" shows 8, not 8.0).
        if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15 {
            return Self::from_int(f as i64);
        }
        let mut buf = ryu::Buffer::new();
        Self::new(buf.format(f).to_string())
    }

    pub fn from_bool(b: bool) -> Self {
        Self {
            text: if b { "true".into() } else { "false".into() },
            int: None,
            float: None,
            boolean: Some(b),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// True iff the float interpretation succeeded (integers included).
    pub fn is_number(&self) -> bool {
        self.float.is_some()
    }

    pub fn is_integer(&self) -> bool {
        self.int.is_some()
    }

    pub fn as_integer(&self) -> Option<i64> {
        self.int
    }

    pub fn as_float(&self) -> Option<f64> {
        self.float
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.boolean
    }

    // -- arithmetic ---------------------------------------------------------

    fn numeric_pair(&self, other: &Value) -> Result<(f64, f64), RuntimeError> {
        let a = self
            .float
            .ok_or_else(|| RuntimeError::not_a_number(self.as_str()))?;
        let b = other
            .float
            .ok_or_else(|| RuntimeError::not_a_number(other.as_str()))?;
        Ok((a, b))
    }

    fn int_pair(&self, other: &Value) -> Option<(i64, i64)> {
        Some((self.int?, other.int?))
    }

    pub fn add(&self, other: &Value) -> Result<Value, RuntimeError> {
        let (a, b) = self.numeric_pair(other)?;
        if let Some((x, y)) = self.int_pair(other) {
            return x
                .checked_add(y)
                .map(Value::from_int)
                .ok_or(RuntimeError::Overflow { op: "+" });
        }
        Ok(Value::from_float(a + b))
    }

    pub fn subtract(&self, other: &Value) -> Result<Value, RuntimeError> {
        let (a, b) = self.numeric_pair(other)?;
        if let Some((x, y)) = self.int_pair(other) {
            return x
                .checked_sub(y)
                .map(Value::from_int)
                .ok_or(RuntimeError::Overflow { op: "-" });
        }
        Ok(Value::from_float(a - b))
    }

    pub fn multiply(&self, other: &Value) -> Result<Value, RuntimeError> {
        let (a, b) = self.numeric_pair(other)?;
        if let Some((x, y)) = self.int_pair(other) {
            return x
                .checked_mul(y)
                .map(Value::from_int)
                .ok_or(RuntimeError::Overflow { op: "*" });
        }
        Ok(Value::from_float(a * b))
    }

    pub fn divide(&self, other: &Value) -> Result<Value, RuntimeError> {
        let (a, b) = self.numeric_pair(other)?;
        if b == 0.0 {
            return Err(RuntimeError::DivideByZero);
        }
        if let Some((x, y)) = self.int_pair(other) {
            // Exact integer division keeps the integer interpretation.
            if x % y == 0 {
                return Ok(Value::from_int(x / y));
            }
        }
        Ok(Value::from_float(a / b))
    }

    /// Truncating integer division (the `div` operator).
    pub fn int_divide(&self, other: &Value) -> Result<Value, RuntimeError> {
        let (a, b) = self.numeric_pair(other)?;
        if b == 0.0 {
            return Err(RuntimeError::DivideByZero);
        }
        if let Some((x, y)) = self.int_pair(other) {
            return x
                .checked_div(y)
                .map(Value::from_int)
                .ok_or(RuntimeError::Overflow { op: "div" });
        }
        Ok(Value::from_float((a / b).trunc()))
    }

    pub fn modulo(&self, other: &Value) -> Result<Value, RuntimeError> {
        let (a, b) = self.numeric_pair(other)?;
        if b == 0.0 {
            return Err(RuntimeError::DivideByZero);
        }
        if let Some((x, y)) = self.int_pair(other) {
            return x
                .checked_rem(y)
                .map(Value::from_int)
                .ok_or(RuntimeError::Overflow { op: "mod" });
        }
        Ok(Value::from_float(a % b))
    }

    pub fn power(&self, other: &Value) -> Result<Value, RuntimeError> {
        let (a, b) = self.numeric_pair(other)?;
        if let Some((x, y)) = self.int_pair(other) {
            if (0..=u32::MAX as i64).contains(&y) {
                return x
                    .checked_pow(y as u32)
                    .map(Value::from_int)
                    .ok_or(RuntimeError::Overflow { op: "^" });
            }
        }
        Ok(Value::from_float(a.powf(b)))
    }

    pub fn negate(&self) -> Result<Value, RuntimeError> {
        if let Some(i) = self.int {
            return i
                .checked_neg()
                .map(Value::from_int)
                .ok_or(RuntimeError::Overflow { op: "-" });
        }
        match self.float {
            Some(f) => Ok(Value::from_float(-f)),
            None => Err(RuntimeError::not_a_number(self.as_str())),
        }
    }

    // -- comparison ---------------------------------------------------------

    /// Equality with coercion: booleans compare as booleans, exact integers
    /// as integers, any other numeric pairing as floats, everything else as
    /// case-insensitive strings.
    pub fn equals(&self, other: &Value) -> bool {
        if let (Some(a), Some(b)) = (self.boolean, other.boolean) {
            return a == b;
        }
        if let Some((a, b)) = self.int_pair(other) {
            return a == b;
        }
        if let (Some(a), Some(b)) = (self.float, other.float) {
            return a == b;
        }
        name_eq(self.as_str(), other.as_str())
    }

    /// Ordering with the same numeric-vs-lexical branching as `equals`.
    pub fn compare(&self, other: &Value) -> Ordering {
        if let Some((a, b)) = self.int_pair(other) {
            return a.cmp(&b);
        }
        if let (Some(a), Some(b)) = (self.float, other.float) {
            return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        }
        self.text.to_lowercase().cmp(&other.text.to_lowercase())
    }

    /// Case-insensitive substring containment.
    pub fn contains(&self, needle: &Value) -> bool {
        self.text
            .to_lowercase()
            .contains(&needle.text.to_lowercase())
    }

    pub fn concat(&self, other: &Value) -> Value {
        let mut s = String::with_capacity(self.text.len() + other.text.len());
        s.push_str(&self.text);
        s.push_str(&other.text);
        Value::new(s)
    }

    pub fn concat_with_space(&self, other: &Value) -> Value {
        let mut s = String::with_capacity(self.text.len() + other.text.len() + 1);
        s.push_str(&self.text);
        s.push(' ');
        s.push_str(&other.text);
        Value::new(s)
    }

    // -- chunks -------------------------------------------------------------

    /// Resolve a value used as a chunk index: a positive whole number, or
    /// the ordinal word `middle`.
    pub fn as_chunk_pos(&self) -> Result<ChunkPos, RuntimeError> {
        if let Some(i) = self.int {
            if i >= 1 {
                return Ok(ChunkPos::At(i as usize));
            }
            return Err(RuntimeError::bad_chunk_index(self.as_str()));
        }
        if name_eq(self.as_str(), "middle") {
            return Ok(ChunkPos::Middle);
        }
        Err(RuntimeError::bad_chunk_index(self.as_str()))
    }

    /// Extract `kind start [to end]` as a new value. Out-of-range chunks
    /// yield empty, matching how scripts read past the end of a container.
    pub fn get_chunk(
        &self,
        kind: Chunk,
        start: ChunkPos,
        end: Option<ChunkPos>,
    ) -> Result<Value, RuntimeError> {
        let ranges = chunk_ranges(&self.text, kind);
        let count = ranges.len();
        let s = resolve_pos(start, count);
        let e = end.map(|p| resolve_pos(p, count)).unwrap_or(s);
        if count == 0 || s > count || e < s {
            return Ok(Value::empty());
        }
        let e = e.min(count);
        let from = ranges[s - 1].0;
        let to = ranges[e - 1].1;
        Ok(Value::new(self.text[from..to].to_string()))
    }

    /// Return a new value with the addressed chunk range replaced according
    /// to the preposition. The receiver is not mutated. Writing past the
    /// end of the container pads with the chunk separator first.
    pub fn set_chunk(
        &self,
        prep: Prep,
        kind: Chunk,
        start: ChunkPos,
        end: Option<ChunkPos>,
        replacement: &Value,
    ) -> Result<Value, RuntimeError> {
        let mut text = self.text.to_string();
        let mut ranges = chunk_ranges(&text, kind);
        let mut count = ranges.len();
        let s = resolve_pos(start, count);
        if s > count {
            let sep = separator(kind);
            let missing = if count == 0 { s - 1 } else { s - count };
            if missing > MAX_CHUNK_PAD {
                return Err(RuntimeError::Semantic(format!(
                    "chunk index {s} is too far past the end of the container"
                )));
            }
            for _ in 0..missing {
                text.push(sep);
            }
            ranges = chunk_ranges(&text, kind);
            count = ranges.len();
        }
        let e = end.map(|p| resolve_pos(p, count)).unwrap_or(s).min(count);
        let (from, to) = if count == 0 {
            (text.len(), text.len())
        } else if e < s {
            let at = ranges[s - 1].0;
            (at, at)
        } else {
            (ranges[s - 1].0, ranges[e - 1].1)
        };
        let mut out = String::with_capacity(text.len() + replacement.text.len());
        match prep {
            Prep::Before => {
                out.push_str(&text[..from]);
                out.push_str(&replacement.text);
                out.push_str(&text[from..]);
            }
            Prep::After => {
                out.push_str(&text[..to]);
                out.push_str(&replacement.text);
                out.push_str(&text[to..]);
            }
            Prep::Into | Prep::Replacing => {
                out.push_str(&text[..from]);
                out.push_str(&replacement.text);
                out.push_str(&text[to..]);
            }
        }
        Ok(Value::new(out))
    }

    /// Number of chunks of `kind` in this value.
    pub fn chunk_count(&self, kind: Chunk) -> usize {
        chunk_ranges(&self.text, kind).len()
    }
}

fn resolve_pos(pos: ChunkPos, count: usize) -> usize {
    match pos {
        ChunkPos::At(n) => n,
        ChunkPos::Middle => count.div_ceil(2).max(1),
    }
}

/// How many separators a single write past the end may append. One script
/// line must not be able to allocate a container of arbitrary size.
const MAX_CHUNK_PAD: usize = 1 << 16;

fn separator(kind: Chunk) -> char {
    match kind {
        Chunk::Item => ',',
        Chunk::Line => '\n',
        Chunk::Char | Chunk::Word => ' ',
    }
}

type Ranges = SmallVec<[(usize, usize); 16]>;

/// Byte ranges of every chunk of `kind` in `text`. Items and lines include
/// empty chunks between consecutive separators; an entirely empty text has
/// no chunks of any kind.
fn chunk_ranges(text: &str, kind: Chunk) -> Ranges {
    if text.is_empty() {
        return Ranges::new();
    }
    match kind {
        Chunk::Char => text
            .char_indices()
            .map(|(i, c)| (i, i + c.len_utf8()))
            .collect(),
        Chunk::Word => {
            let mut out = Ranges::new();
            let mut start = None;
            for (i, c) in text.char_indices() {
                if c.is_whitespace() {
                    if let Some(s) = start.take() {
                        out.push((s, i));
                    }
                } else if start.is_none() {
                    start = Some(i);
                }
            }
            if let Some(s) = start {
                out.push((s, text.len()));
            }
            out
        }
        Chunk::Item => split_ranges(text, ','),
        Chunk::Line => split_ranges(text, '\n'),
    }
}

fn split_ranges(text: &str, sep: char) -> Ranges {
    let mut out = Ranges::new();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if c == sep {
            out.push((start, i));
            start = i + c.len_utf8();
        }
    }
    out.push((start, text.len()));
    out
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::empty()
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::new(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::new(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::from_int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::from_float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::from_bool(b)
    }
}
