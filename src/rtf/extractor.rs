use serde::{Deserialize, Serialize};

use super::lexer::{Lexer, Token};
use super::tables::{is_destination, special_char};

const REPLACEMENT: char = '\u{FFFD}';
const NO_BREAK_SPACE: char = '\u{00A0}';

/// Optional bounds for untrusted input. `None` means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RtfLimits {
    /// Groups opened beyond this depth are dropped with everything inside them.
    pub max_group_depth: Option<usize>,
    /// Maximum number of characters in the produced text.
    pub max_output_len: Option<usize>,
}

/// Extracted text plus counters describing how lenient the scan had to be.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
    /// `}` seen with no open group.
    pub unbalanced_closes: usize,
    /// Groups still open at end of input.
    pub unclosed_groups: usize,
    /// Groups dropped for exceeding `max_group_depth`.
    pub overflowed_groups: usize,
    /// Output hit `max_output_len` and scanning stopped early.
    pub truncated: bool,
}

impl Extraction {
    pub fn is_well_formed(&self) -> bool {
        self.unbalanced_closes == 0 && self.unclosed_groups == 0
    }
}

/// State saved on `{` and restored on `}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct GroupState {
    uc_skip: usize,
    ignorable: bool,
}

impl Default for GroupState {
    fn default() -> Self {
        Self {
            uc_skip: 1,
            ignorable: false,
        }
    }
}

/// Converts RTF markup into the plain text a reader would copy out of it.
#[derive(Debug, Clone, Copy, Default)]
pub struct RtfTextExtractor {
    limits: RtfLimits,
}

impl RtfTextExtractor {
    pub fn new(limits: RtfLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> RtfLimits {
        self.limits
    }

    /// Extract the visible text of `raw`. Never fails.
    pub fn extract(&self, raw: &str) -> String {
        self.extract_with_stats(raw).text
    }

    /// Like [`extract`](Self::extract) but also reports malformed structure
    /// and limit hits.
    pub fn extract_with_stats(&self, raw: &str) -> Extraction {
        let mut scanner = Scanner::new(self.limits, raw.len());
        for token in Lexer::new(raw) {
            scanner.feed(token);
            if scanner.done {
                break;
            }
        }
        scanner.finish()
    }
}

/// Extract text with no limits applied.
pub fn extract_rtf_text(raw: &str) -> String {
    RtfTextExtractor::default().extract(raw)
}

struct Scanner {
    limits: RtfLimits,
    state: GroupState,
    stack: Vec<GroupState>,
    cur_skip: usize,
    /// Depth of groups opened past `max_group_depth`.
    overflow: usize,
    /// High half of a UTF-16 pair waiting for its low half.
    pending_high: Option<u32>,
    /// Set by `\*` at document level; applies to the next group opened.
    ignore_next_group: bool,
    out: String,
    out_chars: usize,
    done: bool,
    stats: Extraction,
}

impl Scanner {
    fn new(limits: RtfLimits, input_len: usize) -> Self {
        let capacity = limits
            .max_output_len
            .map_or(input_len, |max| max.min(input_len));
        Self {
            limits,
            state: GroupState::default(),
            stack: Vec::new(),
            cur_skip: 0,
            overflow: 0,
            pending_high: None,
            ignore_next_group: false,
            out: String::with_capacity(capacity),
            out_chars: 0,
            done: false,
            stats: Extraction::default(),
        }
    }

    fn feed(&mut self, token: Token<'_>) {
        if self.overflow > 0 {
            match token {
                Token::OpenBrace => self.overflow += 1,
                Token::CloseBrace => self.overflow -= 1,
                _ => {}
            }
            return;
        }

        match token {
            Token::OpenBrace => self.open_group(),
            Token::CloseBrace => self.close_group(),
            Token::ControlSymbol(symbol) => {
                self.cur_skip = 0;
                self.control_symbol(symbol);
            }
            Token::ControlWord { name, arg } => {
                self.cur_skip = 0;
                self.control_word(name, arg);
            }
            Token::Hex(byte) => self.text_char(char::from(byte)),
            Token::Char(ch) => self.text_char(ch),
            Token::LineBreak => {}
        }
    }

    fn open_group(&mut self) {
        self.cur_skip = 0;
        if self
            .limits
            .max_group_depth
            .is_some_and(|max| self.stack.len() >= max)
        {
            self.overflow = 1;
            self.stats.overflowed_groups += 1;
            self.ignore_next_group = false;
            return;
        }
        self.stack.push(self.state);
        if self.ignore_next_group {
            self.state.ignorable = true;
            self.ignore_next_group = false;
        }
    }

    fn close_group(&mut self) {
        self.cur_skip = 0;
        self.ignore_next_group = false;
        match self.stack.pop() {
            Some(saved) => self.state = saved,
            None => self.stats.unbalanced_closes += 1,
        }
    }

    fn control_symbol(&mut self, symbol: char) {
        match symbol {
            '~' if !self.state.ignorable => self.emit_char(NO_BREAK_SPACE),
            '{' | '}' | '\\' if !self.state.ignorable => self.emit_char(symbol),
            // The document group itself is never ignorable.
            '*' if self.stack.len() <= 1 => self.ignore_next_group = true,
            '*' => self.state.ignorable = true,
            _ => {}
        }
    }

    fn control_word(&mut self, name: &str, arg: Option<i64>) {
        if is_destination(name) {
            self.state.ignorable = true;
            return;
        }
        if self.state.ignorable {
            return;
        }

        if let Some(text) = special_char(name) {
            self.emit_str(text);
            return;
        }

        match name {
            "uc" => {
                self.state.uc_skip = arg.map_or(1, |n| usize::try_from(n).unwrap_or(0));
            }
            "u" => {
                // A bare `\u` carries no code point.
                if let Some(code) = arg {
                    self.unicode(code);
                    self.cur_skip = self.state.uc_skip;
                }
            }
            _ => {}
        }
    }

    /// Plain characters and hex escapes share the fallback-skip window.
    fn text_char(&mut self, ch: char) {
        if self.cur_skip > 0 {
            self.cur_skip -= 1;
        } else if !self.state.ignorable {
            self.emit_char(ch);
        }
    }

    fn unicode(&mut self, code: i64) {
        let code = if code < 0 { code + 0x10000 } else { code };
        let Ok(code) = u32::try_from(code) else {
            self.emit_char(REPLACEMENT);
            return;
        };

        match code {
            0xD800..=0xDBFF => {
                self.flush_pending();
                self.pending_high = Some(code);
            }
            0xDC00..=0xDFFF => match self.pending_high.take() {
                Some(high) => {
                    let scalar = 0x10000 + ((high - 0xD800) << 10) + (code - 0xDC00);
                    self.emit_char(char::from_u32(scalar).unwrap_or(REPLACEMENT));
                }
                None => self.emit_char(REPLACEMENT),
            },
            _ => self.emit_char(char::from_u32(code).unwrap_or(REPLACEMENT)),
        }
    }

    fn flush_pending(&mut self) {
        if self.pending_high.take().is_some() {
            self.push(REPLACEMENT);
        }
    }

    fn emit_char(&mut self, ch: char) {
        self.flush_pending();
        self.push(ch);
    }

    fn emit_str(&mut self, text: &str) {
        self.flush_pending();
        for ch in text.chars() {
            self.push(ch);
        }
    }

    fn push(&mut self, ch: char) {
        if self.done {
            return;
        }
        if self
            .limits
            .max_output_len
            .is_some_and(|max| self.out_chars >= max)
        {
            self.done = true;
            self.stats.truncated = true;
            return;
        }
        self.out.push(ch);
        self.out_chars += 1;
    }

    fn finish(mut self) -> Extraction {
        self.flush_pending();
        self.stats.unclosed_groups = self.stack.len();
        self.stats.text = self.out;
        self.stats
    }
}
