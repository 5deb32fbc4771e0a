use std::io::{self, Write};

use asct::ast::Ast;
use asct::parse::{Token, TokenValue};
use ron::ser::PrettyConfig;

use super::config::{LexerOutputFormat, ParserOutputFormat};

fn to_io_error(e: ron::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}

pub fn dump_tokens(
    format: LexerOutputFormat,
    tokens: &[Token<'_>],
    mut out: impl Write,
) -> io::Result<()> {
    match format {
        LexerOutputFormat::Pretty => dump_tokens_pretty(tokens, out),
        LexerOutputFormat::Debug => writeln!(out, "{:#?}", tokens),
        LexerOutputFormat::Ron => writeln!(
            out,
            "{}",
            ron::ser::to_string_pretty(tokens, PrettyConfig::default()).map_err(to_io_error)?
        ),
    }
}

fn dump_tokens_pretty(tokens: &[Token<'_>], out: impl Write) -> io::Result<()> {
    struct Dumper<W: Write> {
        out: W,
        level: usize,
    }

    impl<W: Write> Dumper<W> {
        fn dump(&mut self, tokens: &[Token<'_>]) -> io::Result<()> {
            for token in tokens {
                write!(
                    &mut self.out,
                    "{:width$}{} ",
                    "",
                    token.span,
                    width = 2 * self.level
                )?;

                match &token.value {
                    TokenValue::Group { kind, tokens } => {
                        writeln!(&mut self.out, "{:?}", kind)?;
                        self.level += 1;
                        self.dump(tokens)?;
                        self.level -= 1;
                    }

                    value => writeln!(&mut self.out, "{}", value.describe())?,
                }
            }

            Ok(())
        }
    }

    Dumper { out, level: 0 }.dump(tokens)
}

pub fn dump_ast(format: ParserOutputFormat, ast: &Ast, mut out: impl Write) -> io::Result<()> {
    let dump = ast.dump();

    match format {
        ParserOutputFormat::Debug => writeln!(out, "{:#?}", dump),
        ParserOutputFormat::Ron => writeln!(
            out,
            "{}",
            ron::ser::to_string_pretty(&dump, PrettyConfig::default()).map_err(to_io_error)?
        ),
    }
}
