use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use asct::ast::Ast;
use asct::parse::{self, normalize_line_endings, Token};
use asct::write::write;
use tracing::{debug, info_span};

use super::config::OutputKind;
use super::dump::{dump_ast, dump_tokens};
use super::{PassOutput, RunnerCtx};

const STDIN_NAME: &str = "<stdin>";

pub struct SourceFile {
    pub name: String,
    pub text: String,
}

fn read_source(path: Option<&Path>) -> io::Result<SourceFile> {
    let (name, text) = match path {
        Some(path) if path != Path::new("-") => {
            (path.display().to_string(), fs::read_to_string(path)?)
        }

        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;

            (STDIN_NAME.to_owned(), text)
        }
    };

    let text = normalize_line_endings(&text).into_owned();

    Ok(SourceFile { name, text })
}

pub fn load_files(ctx: &mut RunnerCtx) -> PassOutput<Vec<SourceFile>> {
    let paths = ctx.config.paths.clone();
    let paths = if paths.is_empty() {
        vec![None]
    } else {
        paths.iter().map(|path| Some(path.as_path())).collect()
    };

    let mut files = vec![];

    for path in paths {
        match read_source(path) {
            Ok(file) => {
                debug!(file = %file.name, len = file.text.len(), "loaded a source file");
                files.push(file);
            }

            Err(e) => {
                let name = path.map_or(STDIN_NAME.to_owned(), |path| path.display().to_string());
                ctx.diagnostics
                    .fatal()
                    .with_message(format!("could not read `{}`", name))
                    .with_source(Box::new(e))
                    .emit();
            }
        }
    }

    ctx.stop_if_errors(files)
}

pub fn lex_all<'buf>(
    ctx: &mut RunnerCtx,
    files: &'buf [SourceFile],
) -> PassOutput<Vec<Vec<Token<'buf>>>> {
    let mut result = vec![];

    for file in files {
        let _span = info_span!("lex", file = %file.name).entered();

        match parse::lex(&file.text) {
            Ok(tokens) => result.push(tokens),

            Err(e) => {
                ctx.diagnostics
                    .error()
                    .in_file(&file.name)
                    .with_span_and_error(e)
                    .emit();
            }
        }
    }

    ctx.stop_if_errors(result)
}

pub fn dump_tokens_if_asked<'buf>(
    ctx: &mut RunnerCtx,
    tokens: Vec<Vec<Token<'buf>>>,
) -> PassOutput<Vec<Vec<Token<'buf>>>> {
    let OutputKind::Lexer(format) = ctx.config.output else {
        return PassOutput::continue_with_output(tokens);
    };

    let mut stdout = io::stdout().lock();

    for file_tokens in &tokens {
        if let Err(e) = dump_tokens(format, file_tokens, &mut stdout) {
            ctx.diagnostics
                .fatal()
                .with_message("could not dump the tokens")
                .with_source(Box::new(e))
                .emit();

            return PassOutput::stop_with_output(tokens);
        }
    }

    PassOutput::stop_with_output(tokens)
}

pub fn parse_all(
    ctx: &mut RunnerCtx,
    files: &[SourceFile],
    tokens: Vec<Vec<Token<'_>>>,
) -> PassOutput<Vec<Ast>> {
    let mut asts = vec![];

    for (file, tokens) in files.iter().zip(tokens) {
        let _span = info_span!("parse", file = %file.name).entered();

        match parse::parse(&tokens) {
            Ok(ast) => asts.push(ast),

            Err(e) => {
                ctx.diagnostics
                    .error()
                    .in_file(&file.name)
                    .with_span_and_error(e)
                    .emit();
            }
        }
    }

    ctx.stop_if_errors(asts)
}

pub fn dump_asts_if_asked(ctx: &mut RunnerCtx, asts: Vec<Ast>) -> PassOutput<Vec<Ast>> {
    let OutputKind::Parser(format) = ctx.config.output else {
        return PassOutput::continue_with_output(asts);
    };

    let mut stdout = io::stdout().lock();

    for ast in &asts {
        if let Err(e) = dump_ast(format, ast, &mut stdout) {
            ctx.diagnostics
                .fatal()
                .with_message("could not dump the syntax tree")
                .with_source(Box::new(e))
                .emit();

            break;
        }
    }

    PassOutput::stop_with_output(asts)
}

pub fn write_all(ctx: &mut RunnerCtx, asts: &[Ast]) -> PassOutput<()> {
    let mut stdout = io::stdout().lock();

    for ast in asts {
        if let Err(e) = stdout.write_all(write(ast).as_bytes()) {
            ctx.diagnostics
                .fatal()
                .with_message("could not write the output")
                .with_source(Box::new(e))
                .emit();

            return PassOutput::stop();
        }
    }

    PassOutput::continue_with_output(())
}
