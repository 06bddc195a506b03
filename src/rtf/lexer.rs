//! Ordered-alternative tokenizer for RTF input.
//!
//! At every position the first matching alternative wins:
//! control word, hex escape, control symbol, brace, line terminators,
//! then any single character.

/// Longest control-word name that is read as part of the word.
const MAX_WORD_LEN: usize = 32;
/// Longest numeric argument (digits only, sign excluded).
const MAX_ARG_DIGITS: usize = 10;

/// A single lexical unit of an RTF stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// `\name` with an optional signed numeric argument.
    ControlWord { name: &'a str, arg: Option<i64> },
    /// `\'hh`
    Hex(u8),
    /// `\` followed by one non-letter character.
    ControlSymbol(char),
    OpenBrace,
    CloseBrace,
    /// One or more consecutive CR/LF characters.
    LineBreak,
    Char(char),
}

/// Iterator over the tokens of an RTF string.
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Byte offset of the next unread character.
    pub fn position(&self) -> usize {
        self.pos
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + offset).copied()
    }

    /// `\` + 1..=32 letters + optional `-?\d{1,10}` + optional single space.
    /// `pos` points just past the backslash.
    fn control_word(&mut self) -> Option<Token<'a>> {
        let bytes = self.rest().as_bytes();
        let name_len = bytes
            .iter()
            .take(MAX_WORD_LEN)
            .take_while(|b| b.is_ascii_alphabetic())
            .count();
        if name_len == 0 {
            return None;
        }

        let name = &self.rest()[..name_len];
        let mut cursor = name_len;

        let sign_len = usize::from(bytes.get(cursor) == Some(&b'-'));
        let digits = bytes[cursor + sign_len..]
            .iter()
            .take(MAX_ARG_DIGITS)
            .take_while(|b| b.is_ascii_digit())
            .count();
        let arg = if digits > 0 {
            let text = &self.rest()[cursor..cursor + sign_len + digits];
            cursor += sign_len + digits;
            text.parse::<i64>().ok()
        } else {
            None
        };

        if bytes.get(cursor) == Some(&b' ') {
            cursor += 1;
        }

        self.pos += cursor;
        Some(Token::ControlWord { name, arg })
    }

    /// `\'` + exactly two hex digits. `pos` points just past the backslash.
    fn hex_escape(&mut self) -> Option<Token<'a>> {
        if self.peek_byte_at(0) != Some(b'\'') {
            return None;
        }
        let hi = self.peek_byte_at(1).and_then(hex_value)?;
        let lo = self.peek_byte_at(2).and_then(hex_value)?;
        self.pos += 3;
        Some(Token::Hex(hi << 4 | lo))
    }

    fn line_break(&mut self) -> Token<'a> {
        let run = self
            .rest()
            .bytes()
            .take_while(|b| matches!(b, b'\r' | b'\n'))
            .count();
        self.pos += run;
        Token::LineBreak
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let ch = self.peek()?;

        match ch {
            '\\' => {
                let start = self.pos;
                self.pos += 1;
                if let Some(token) = self.control_word() {
                    return Some(token);
                }
                if let Some(token) = self.hex_escape() {
                    return Some(token);
                }
                if let Some(symbol) = self.peek() {
                    self.pos += symbol.len_utf8();
                    return Some(Token::ControlSymbol(symbol));
                }
                // A lone backslash at end of input is ordinary text.
                self.pos = start + 1;
                Some(Token::Char('\\'))
            }
            '{' => {
                self.pos += 1;
                Some(Token::OpenBrace)
            }
            '}' => {
                self.pos += 1;
                Some(Token::CloseBrace)
            }
            '\r' | '\n' => Some(self.line_break()),
            _ => {
                self.pos += ch.len_utf8();
                Some(Token::Char(ch))
            }
        }
    }
}

fn hex_value(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token<'_>> {
        Lexer::new(input).collect()
    }

    #[test]
    fn test_control_word_with_argument_and_delimiter() {
        assert_eq!(
            tokens(r"\fs24 x"),
            vec![
                Token::ControlWord { name: "fs", arg: Some(24) },
                Token::Char('x'),
            ]
        );
    }

    #[test]
    fn test_negative_argument() {
        assert_eq!(
            tokens(r"\u-3913?"),
            vec![
                Token::ControlWord { name: "u", arg: Some(-3913) },
                Token::Char('?'),
            ]
        );
    }

    #[test]
    fn test_only_one_space_is_consumed() {
        assert_eq!(
            tokens(r"\par  a"),
            vec![
                Token::ControlWord { name: "par", arg: None },
                Token::Char(' '),
                Token::Char('a'),
            ]
        );
    }

    #[test]
    fn test_dangling_minus_is_text() {
        assert_eq!(
            tokens(r"\li-x"),
            vec![
                Token::ControlWord { name: "li", arg: None },
                Token::Char('-'),
                Token::Char('x'),
            ]
        );
    }

    #[test]
    fn test_argument_is_capped_at_ten_digits() {
        assert_eq!(
            tokens(r"\n12345678901"),
            vec![
                Token::ControlWord { name: "n", arg: Some(1_234_567_890) },
                Token::Char('1'),
            ]
        );
    }

    #[test]
    fn test_word_is_capped_at_thirty_two_letters() {
        let long = format!("\\{}yz", "a".repeat(32));
        let toks = tokens(&long);
        assert_eq!(toks.len(), 3);
        assert!(matches!(toks[0], Token::ControlWord { name, arg: None } if name.len() == 32));
        assert_eq!(&toks[1..], &[Token::Char('y'), Token::Char('z')]);
    }

    #[test]
    fn test_hex_escape_either_case() {
        assert_eq!(tokens(r"\'e9\'C4"), vec![Token::Hex(0xe9), Token::Hex(0xc4)]);
    }

    #[test]
    fn test_bad_hex_falls_back_to_control_symbol() {
        assert_eq!(
            tokens(r"\'g1"),
            vec![Token::ControlSymbol('\''), Token::Char('g'), Token::Char('1')]
        );
    }

    #[test]
    fn test_control_symbols_and_braces() {
        assert_eq!(
            tokens(r"{\*\{\}\\\~}"),
            vec![
                Token::OpenBrace,
                Token::ControlSymbol('*'),
                Token::ControlSymbol('{'),
                Token::ControlSymbol('}'),
                Token::ControlSymbol('\\'),
                Token::ControlSymbol('~'),
                Token::CloseBrace,
            ]
        );
    }

    #[test]
    fn test_line_terminator_run_is_one_token() {
        assert_eq!(
            tokens("a\r\n\n\rb"),
            vec![Token::Char('a'), Token::LineBreak, Token::Char('b')]
        );
    }

    #[test]
    fn test_trailing_backslash_is_text() {
        assert_eq!(tokens("a\\"), vec![Token::Char('a'), Token::Char('\\')]);
    }

    #[test]
    fn test_non_ascii_passes_through() {
        assert_eq!(tokens("é€"), vec![Token::Char('é'), Token::Char('€')]);
    }
}
