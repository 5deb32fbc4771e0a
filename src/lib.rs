pub mod ast;
pub mod parse;
pub mod position;
pub mod write;

#[cfg(target_family = "wasm")]
pub mod wasm;
