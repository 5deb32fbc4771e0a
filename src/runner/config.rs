use std::path::PathBuf;

use clap::{arg, command, value_parser, ValueEnum};

#[derive(Debug, Clone)]
pub struct AsctConfig {
    /// Input files. Empty if the program is read from stdin.
    pub paths: Vec<PathBuf>,
    pub output: OutputKind,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    Lexer,
    Parser,
    Writer,
}

impl Default for Stage {
    fn default() -> Self {
        Self::Writer
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Pretty,
    Debug,
    Ron,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexerOutputFormat {
    Pretty,
    Debug,
    Ron,
}

impl From<OutputFormat> for LexerOutputFormat {
    fn from(format: OutputFormat) -> LexerOutputFormat {
        match format {
            OutputFormat::Pretty => Self::Pretty,
            OutputFormat::Debug => Self::Debug,
            OutputFormat::Ron => Self::Ron,
        }
    }
}

impl Default for LexerOutputFormat {
    fn default() -> Self {
        Self::Pretty
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserOutputFormat {
    Debug,
    Ron,
}

impl TryFrom<OutputFormat> for ParserOutputFormat {
    type Error = &'static str;

    fn try_from(format: OutputFormat) -> Result<ParserOutputFormat, Self::Error> {
        match format {
            OutputFormat::Debug => Ok(Self::Debug),
            OutputFormat::Ron => Ok(Self::Ron),
            OutputFormat::Pretty => Err("use the writer stage to pretty-print the syntax tree"),
        }
    }
}

impl Default for ParserOutputFormat {
    fn default() -> Self {
        Self::Ron
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Lexer(LexerOutputFormat),
    Parser(ParserOutputFormat),
    Writer,
}

pub fn parse_args_or_exit() -> AsctConfig {
    use clap::Command;

    fn command() -> Command {
        command!()
            .arg(
                arg!(files: [FILE] ... "input files (`-` or none to read stdin)")
                    .value_parser(value_parser!(PathBuf)),
            )
            .arg(
                arg!(-s --stage <STAGE> "the stage to stop after")
                    .value_parser(value_parser!(Stage))
                    .required(false),
            )
            .arg(
                arg!(-f --format <FORMAT> "the output format")
                    .value_parser(value_parser!(OutputFormat))
                    .required(false),
            )
    }

    fn parse_args() -> Result<AsctConfig, clap::Error> {
        use clap::error::ErrorKind;

        let mut command = command();
        let matches = command.get_matches_mut();

        let paths = matches
            .get_many::<PathBuf>("files")
            .map(|paths| paths.cloned().collect())
            .unwrap_or_default();

        let stage = matches
            .get_one::<Stage>("stage")
            .copied()
            .unwrap_or_default();
        let format = matches.get_one::<OutputFormat>("format").copied();

        let output = match (stage, format) {
            (Stage::Lexer, format) => {
                OutputKind::Lexer(format.map(Into::into).unwrap_or_default())
            }

            (Stage::Parser, format) => {
                let format = match format {
                    Some(format) => format.try_into(),
                    None => Ok(Default::default()),
                };

                OutputKind::Parser(
                    format.map_err(|msg| command.error(ErrorKind::ValueValidation, msg))?,
                )
            }

            (Stage::Writer, None | Some(OutputFormat::Pretty)) => OutputKind::Writer,

            (Stage::Writer, Some(_)) => {
                return Err(command.error(
                    ErrorKind::ValueValidation,
                    "the writer stage only supports the pretty format",
                ))
            }
        };

        Ok(AsctConfig { paths, output })
    }

    match parse_args() {
        Ok(cfg) => cfg,

        Err(e) => {
            e.format(&mut command()).exit();
        }
    }
}
