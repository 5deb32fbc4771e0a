use wasm_bindgen::prelude::*;

use crate::parse::{normalize_line_endings, parse_str, ParseError};
use crate::position::HasSpan;
use crate::write::write;

fn install_panic_hook() {
    console_error_panic_hook::set_once();
}

fn produce_error_message(error: &ParseError) -> String {
    let span = error.span();

    format!("{}: {}", span, error)
}

/// Normalizes the layout of `code`.
#[wasm_bindgen]
pub fn format_code(code: &str) -> Result<String, String> {
    install_panic_hook();

    let code = normalize_line_endings(code);
    let ast = parse_str(&code).map_err(|e| produce_error_message(&e))?;

    Ok(write(&ast))
}

#[wasm_bindgen]
pub struct CodeError {
    message: String,
    start: usize,
    end: usize,
}

#[wasm_bindgen]
impl CodeError {
    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.message.clone()
    }

    /// The byte offset the error starts at.
    #[wasm_bindgen(getter)]
    pub fn start(&self) -> usize {
        self.start
    }

    #[wasm_bindgen(getter)]
    pub fn end(&self) -> usize {
        self.end
    }
}

/// Parses `code`, returning the error if there is one.
#[wasm_bindgen]
pub fn check_code(code: &str) -> Option<CodeError> {
    install_panic_hook();

    let code = normalize_line_endings(code);
    let e = parse_str(&code).err()?;
    let span = e.span();

    Some(CodeError {
        message: e.to_string(),
        start: span.start.byte,
        end: span.end.byte,
    })
}
