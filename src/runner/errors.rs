use std::error::Error;

use asct::position::{HasSpan, Span};
use owo_colors::{OwoColorize, Stream};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Fatal,
    Error,
}

#[derive(Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub file: Option<String>,
    pub span: Option<Span>,
    pub message: String,
    pub source: Option<Box<dyn Error + 'static>>,
}

#[must_use = "DiagnosticBuilder is useless unless emitted"]
pub struct DiagnosticBuilder<'a> {
    owner: &'a mut Diagnostics,
    diagnostic: Diagnostic,
}

impl<'a> DiagnosticBuilder<'a> {
    fn new(owner: &'a mut Diagnostics, level: Level) -> Self {
        Self {
            owner,
            diagnostic: Diagnostic {
                level,
                file: None,
                span: None,
                message: String::new(),
                source: None,
            },
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.diagnostic.message = message.into();

        self
    }

    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.diagnostic.file = Some(file.into());

        self
    }

    pub fn with_source(mut self, source: Box<dyn Error + 'static>) -> Self {
        self.diagnostic.source = Some(source);

        self
    }

    /// Takes the span and the message from `error`.
    pub fn with_span_and_error(mut self, error: impl Error + HasSpan + 'static) -> Self {
        self.diagnostic.span = Some(error.span());
        self.diagnostic.message = error.to_string();
        self.diagnostic.source = Some(Box::new(error));

        self
    }

    pub fn emit(self) {
        self.owner.emit(self.diagnostic);
    }
}

/// Prints diagnostics to stderr as they are emitted.
#[derive(Default)]
pub struct Diagnostics {
    errors: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn fatal(&mut self) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder::new(self, Level::Fatal)
    }

    pub fn error(&mut self) -> DiagnosticBuilder<'_> {
        DiagnosticBuilder::new(self, Level::Error)
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    fn emit(&mut self, diagnostic: Diagnostic) {
        self.errors += 1;
        print_diagnostic(&diagnostic);
    }
}

fn format_level(level: Level) -> String {
    match level {
        Level::Fatal => format!(
            "{}",
            "FATAL".if_supports_color(Stream::Stderr, |text| text.red())
        ),

        Level::Error => format!(
            "{}",
            "ERROR".if_supports_color(Stream::Stderr, |text| text.bright_red())
        ),
    }
}

fn format_location(file: Option<&str>, span: Option<&Span>) -> String {
    match (file, span) {
        (None, None) => "".to_owned(),
        (Some(file), None) => format!("{}: ", file),
        (None, Some(span)) => format!("{}: ", span),
        (Some(file), Some(span)) => format!("{}:{}: ", file, span),
    }
}

pub fn print_diagnostic(diagnostic: &Diagnostic) {
    let Diagnostic {
        level,
        file,
        span,
        message,
        source,
    } = diagnostic;

    let level = format_level(*level);
    let location = format_location(file.as_deref(), span.as_ref());
    eprintln!("{} {}{}", level, location, message);

    // the message of a spanned error already is the error itself
    let mut cause = match span {
        Some(_) => source.as_deref().and_then(Error::source),
        None => source.as_deref(),
    };

    while let Some(e) = cause {
        eprintln!(
            "  {} {}",
            "caused by:".if_supports_color(Stream::Stderr, |text| text.dimmed()),
            e
        );
        cause = e.source();
    }
}
