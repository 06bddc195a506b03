//! RTF to plain text.
//!
//! A single forward scan over the token stream with an explicit group
//! stack, so nesting depth is bounded only by memory.

mod extractor;
pub mod lexer;
mod tables;

pub use extractor::{extract_rtf_text, Extraction, RtfLimits, RtfTextExtractor};
pub use lexer::{Lexer, Token};
pub use tables::{is_destination, special_char};

/// Every RTF document starts with these bytes.
pub const RTF_SIGNATURE: &[u8] = b"{\\rtf";

pub fn has_rtf_signature(bytes: &[u8]) -> bool {
    bytes.starts_with(RTF_SIGNATURE)
}
