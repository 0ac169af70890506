//! Token-level rules: identifiers, keywords, numbers and strings.
//!
//! Each rule skips leading whitespace, is wrapped in `backtrack` and
//! returns `None` without moving the cursor when it does not match.

use super::{is_digit, is_keyword, is_letter, Backtrack, Cursor};

fn is_identifier_start(ch: char) -> bool {
    is_letter(ch) || ch == '_'
}

fn is_identifier_continue(ch: char) -> bool {
    is_letter(ch) || is_digit(ch) || ch == '_'
}

impl<'src> Cursor<'src> {
    /// A letter or underscore followed by letters, digits and underscores.
    /// Reserved words are accepted.
    pub fn identifierish(&mut self) -> Option<&'src str> {
        self.backtrack(|c| {
            c.whitespace();
            let start = c.index();
            c.read_char_if(is_identifier_start)?;
            while c.read_char_if(is_identifier_continue).is_some() {}
            Some(&c.source()[start..c.index()])
        })
    }

    /// An identifier that is not a reserved word.
    pub fn identifier(&mut self) -> Option<String> {
        self.backtrack(|c| {
            let word = c.identifierish()?;
            (!is_keyword(word)).then(|| word.to_owned())
        })
    }

    /// Any reserved word.
    pub fn keyword(&mut self) -> Option<&'src str> {
        self.backtrack(|c| c.identifierish().filter(|word| is_keyword(word)))
    }

    /// Exactly the reserved word `expected`.
    ///
    /// Matching goes through a full identifier scan, so `iffy` never
    /// matches `if`.
    pub fn this_keyword(&mut self, expected: &str) -> Option<&'src str> {
        self.backtrack(|c| c.keyword().filter(|word| *word == expected))
    }

    /// A run of digits as a non-negative integer.
    ///
    /// There is no sign and no fraction; negation is a unary operator.
    /// A run too large for `i64` fails.
    pub fn number(&mut self) -> Option<i64> {
        self.backtrack(|c| {
            c.whitespace();
            let start = c.index();
            c.read_char_if(is_digit)?;
            while c.read_char_if(is_digit).is_some() {}
            c.source()[start..c.index()].parse().ok()
        })
    }

    /// A single-quoted string with `\n \t \r \' \\` escapes.
    ///
    /// Unknown escapes and unterminated strings fail.
    pub fn string(&mut self) -> Option<String> {
        self.backtrack(|c| {
            c.whitespace();
            if !c.read("'") {
                return None;
            }
            let mut value = String::new();
            loop {
                match c.next_char()? {
                    '\'' => return Some(value),
                    '\\' => value.push(unescape(c.next_char()?)?),
                    ch => value.push(ch),
                }
            }
        })
    }
}

fn unescape(ch: char) -> Option<char> {
    match ch {
        'n' => Some('\n'),
        't' => Some('\t'),
        'r' => Some('\r'),
        '\'' => Some('\''),
        '\\' => Some('\\'),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier() {
        let mut cursor = Cursor::new("  _foo_1 bar");
        assert_eq!(cursor.identifier().as_deref(), Some("_foo_1"));
        assert_eq!(cursor.identifier().as_deref(), Some("bar"));
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_identifier_rejects_keywords() {
        let mut cursor = Cursor::new(" while");
        assert_eq!(cursor.identifier(), None);
        assert_eq!(cursor.index(), 0);
        assert_eq!(cursor.keyword(), Some("while"));
    }

    #[test]
    fn test_identifier_cannot_start_with_digit() {
        let mut cursor = Cursor::new("1abc");
        assert_eq!(cursor.identifier(), None);
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        let mut cursor = Cursor::new("iffy");
        assert_eq!(cursor.this_keyword("if"), None);
        assert_eq!(cursor.identifier().as_deref(), Some("iffy"));
    }

    #[test]
    fn test_this_keyword_mismatch() {
        let mut cursor = Cursor::new("var");
        assert_eq!(cursor.this_keyword("while"), None);
        assert_eq!(cursor.index(), 0);
        assert_eq!(cursor.this_keyword("var"), Some("var"));
    }

    #[test]
    fn test_number() {
        let mut cursor = Cursor::new(" 0042x");
        assert_eq!(cursor.number(), Some(42));
        assert_eq!(cursor.rest(), "x");
    }

    #[test]
    fn test_number_overflow_fails() {
        let mut cursor = Cursor::new("99999999999999999999");
        assert_eq!(cursor.number(), None);
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn test_string_escapes() {
        let mut cursor = Cursor::new(r"'a\nb\tc\rd\'e\\f'");
        assert_eq!(cursor.string().as_deref(), Some("a\nb\tc\rd'e\\f"));
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_string_unknown_escape_fails() {
        let mut cursor = Cursor::new(r"'\q'");
        assert_eq!(cursor.string(), None);
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn test_unterminated_string_fails() {
        let mut cursor = Cursor::new("'abc");
        assert_eq!(cursor.string(), None);
        assert_eq!(cursor.index(), 0);
        assert_eq!(cursor.farthest(), 4);
    }

    #[test]
    fn test_string_keeps_unicode() {
        let mut cursor = Cursor::new("'héllo'");
        assert_eq!(cursor.string().as_deref(), Some("héllo"));
    }
}
