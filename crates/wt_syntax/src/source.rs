//! Script source text with a precomputed line table.
use crate::Span;

/// One script's text plus where it came from: a file path for the CLI,
/// a part name when a script is edited in place. WildTalk compiles one
/// script at a time, so the origin string is the whole identity.
#[derive(Clone, Debug)]
pub struct ScriptSource {
    origin: String,
    text: String,
    line_starts: Vec<u32>,
}

impl ScriptSource {
    pub fn new(origin: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0u32];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self {
            origin: origin.into(),
            text,
            line_starts,
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn slice(&self, span: Span) -> &str {
        &self.text[span.range()]
    }

    /// 1-based line and column of a byte offset. Columns count chars, not
    /// bytes; offsets inside a multi-byte char snap back to its start.
    pub fn line_col(&self, byte: u32) -> (u32, u32) {
        let byte = byte.min(self.text.len() as u32);
        let idx = match self.line_starts.binary_search(&byte) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let line_start = self.line_starts[idx] as usize;
        let mut target = byte as usize;
        while target > line_start && !self.text.is_char_boundary(target) {
            target -= 1;
        }
        let col = self.text[line_start..target].chars().count() as u32;
        (idx as u32 + 1, col + 1)
    }

    /// Text of a 1-based line, without its trailing newline.
    pub fn line_text(&self, line: u32) -> &str {
        let idx = (line.max(1) - 1) as usize;
        let Some(&start) = self.line_starts.get(idx) else {
            return "";
        };
        let start = start as usize;
        let end = self.text[start..]
            .find('\n')
            .map(|i| start + i)
            .unwrap_or(self.text.len());
        &self.text[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_is_one_based() {
        let src = ScriptSource::new("test", "on go\n  put 1\nend go\n");
        assert_eq!(src.line_col(0), (1, 1));
        assert_eq!(src.line_col(6), (2, 1));
        assert_eq!(src.line_col(8), (2, 3));
    }

    #[test]
    fn line_text_strips_the_newline() {
        let src = ScriptSource::new("test", "first\nsecond\nthird");
        assert_eq!(src.line_text(1), "first");
        assert_eq!(src.line_text(2), "second");
        assert_eq!(src.line_text(3), "third");
        assert_eq!(src.line_text(9), "");
    }

    #[test]
    fn line_col_snaps_to_char_boundaries() {
        let src = ScriptSource::new("test", "put ¬\n2");
        // byte 5 is inside the two-byte `¬`
        assert_eq!(src.line_col(5), (1, 5));
    }
}
