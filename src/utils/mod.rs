pub mod doc_converter;
pub mod docx_parser;
pub mod pdf_parser;
pub mod text_processor;

pub use doc_converter::{convert_doc, expand_vars, find_program, require_program, DocMethod};
pub use docx_parser::{is_docx, read_docx_content, read_docx_rows};
pub use pdf_parser::{extract_text_from_pdf, read_pdf_content, PdfContent};
pub use text_processor::{normalize_line_endings, squeeze_blank_lines};
