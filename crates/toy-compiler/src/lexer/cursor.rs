//! Position tracking over the source text and the backtracking primitives.

/// A position over the source text.
///
/// Besides the current index the cursor remembers the farthest index any
/// attempt ever advanced to. That index is only used for error reporting:
/// it approximates where the actual mistake is better than the point at
/// which the top-level parse gave up.
#[derive(Debug, Clone)]
pub struct Cursor<'src> {
    source: &'src str,
    index: usize,
    farthest: usize,
}

impl<'src> Cursor<'src> {
    /// Creates a cursor at the start of `source`.
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            index: 0,
            farthest: 0,
        }
    }

    /// The full source text.
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Current byte index. Always on a character boundary.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Farthest byte index reached so far.
    pub fn farthest(&self) -> usize {
        self.farthest
    }

    /// Whether the whole source has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.index >= self.source.len()
    }

    /// The unconsumed part of the source.
    pub fn rest(&self) -> &'src str {
        &self.source[self.index..]
    }

    fn advance_to(&mut self, index: usize) {
        self.index = index;
        self.farthest = self.farthest.max(index);
    }

    /// Moves back to a previously observed index. `farthest` is untouched.
    pub fn rewind(&mut self, index: usize) {
        debug_assert!(index <= self.index);
        self.index = index;
    }

    /// Consumes `expected` if the source continues with it.
    pub fn read(&mut self, expected: &str) -> bool {
        if self.rest().starts_with(expected) {
            self.advance_to(self.index + expected.len());
            true
        } else {
            false
        }
    }

    /// Consumes one character if it satisfies `predicate`.
    pub fn read_char_if(&mut self, predicate: impl Fn(char) -> bool) -> Option<char> {
        let ch = self.rest().chars().next()?;
        if predicate(ch) {
            self.advance_to(self.index + ch.len_utf8());
            Some(ch)
        } else {
            None
        }
    }

    /// Consumes any one character. `None` at end of input.
    pub fn next_char(&mut self) -> Option<char> {
        self.read_char_if(|_| true)
    }

    /// Skips blanks and `//` line comments. Always succeeds.
    pub fn whitespace(&mut self) {
        loop {
            if self.read("//") {
                while self.read_char_if(|c| c != '\n').is_some() {}
            }
            if self.read_char_if(super::is_whitespace).is_none() {
                return;
            }
        }
    }

    /// 1-based line number of the byte at `index`.
    pub fn line_at(&self, index: usize) -> usize {
        let end = index.min(self.source.len());
        1 + self.source.as_bytes()[..end]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
    }
}

/// All-or-nothing rule application.
///
/// Anything that owns a [`Cursor`] gets `backtrack`: the rule runs, and if
/// it fails the cursor is put back exactly where it was. On success the
/// cursor stays at the end of the consumed text.
pub trait Backtrack<'src> {
    /// The underlying cursor.
    fn cursor(&mut self) -> &mut Cursor<'src>;

    /// Runs `rule`, restoring the start position if it returns `None`.
    fn backtrack<T>(&mut self, rule: impl FnOnce(&mut Self) -> Option<T>) -> Option<T>
    where
        Self: Sized,
    {
        let begin = self.cursor().index();
        let result = rule(self);
        if result.is_none() {
            self.cursor().rewind(begin);
        }
        result
    }
}

impl<'src> Backtrack<'src> for Cursor<'src> {
    fn cursor(&mut self) -> &mut Cursor<'src> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_literal() {
        let mut cursor = Cursor::new("while (x)");
        assert!(!cursor.read("if"));
        assert_eq!(cursor.index(), 0);
        assert!(cursor.read("while"));
        assert_eq!(cursor.index(), 5);
    }

    #[test]
    fn test_read_char_if() {
        let mut cursor = Cursor::new("a1");
        assert_eq!(cursor.read_char_if(|c| c.is_ascii_digit()), None);
        assert_eq!(cursor.read_char_if(|c| c == 'a'), Some('a'));
        assert_eq!(cursor.read_char_if(|c| c.is_ascii_digit()), Some('1'));
        assert!(cursor.is_at_end());
        assert_eq!(cursor.next_char(), None);
    }

    #[test]
    fn test_backtrack_restores_on_failure() {
        let mut cursor = Cursor::new("abc");
        let result: Option<()> = cursor.backtrack(|c| {
            assert!(c.read("ab"));
            None
        });
        assert!(result.is_none());
        assert_eq!(cursor.index(), 0);
        // The failed attempt still counts for error reporting.
        assert_eq!(cursor.farthest(), 2);
    }

    #[test]
    fn test_backtrack_commits_on_success() {
        let mut cursor = Cursor::new("abc");
        let result = cursor.backtrack(|c| c.read("ab").then_some(()));
        assert!(result.is_some());
        assert_eq!(cursor.index(), 2);
    }

    #[test]
    fn test_nested_backtrack() {
        let mut cursor = Cursor::new("abcd");
        let result = cursor.backtrack(|c| {
            c.read("a");
            let inner: Option<()> = c.backtrack(|c| {
                c.read("bc");
                None
            });
            assert!(inner.is_none());
            assert_eq!(c.index(), 1);
            c.read("bcd").then_some(())
        });
        assert!(result.is_some());
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_whitespace_skips_comments() {
        let mut cursor = Cursor::new("  // note\n\t x");
        cursor.whitespace();
        assert_eq!(cursor.rest(), "x");
    }

    #[test]
    fn test_whitespace_comment_at_eof() {
        let mut cursor = Cursor::new("// trailing");
        cursor.whitespace();
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_whitespace_leaves_division_alone() {
        let mut cursor = Cursor::new(" / 2");
        cursor.whitespace();
        assert_eq!(cursor.rest(), "/ 2");
    }

    #[test]
    fn test_line_at() {
        let cursor = Cursor::new("a\nb\nc");
        assert_eq!(cursor.line_at(0), 1);
        assert_eq!(cursor.line_at(2), 2);
        assert_eq!(cursor.line_at(4), 3);
        assert_eq!(cursor.line_at(100), 3);
    }
}
