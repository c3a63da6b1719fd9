use alloc::borrow::Cow;
#[cfg(feature = "rich-diagnostics")]
use alloc::format;
#[cfg(feature = "rich-diagnostics")]
use alloc::string::String;
#[cfg(feature = "rich-diagnostics")]
use alloc::vec::Vec;

#[cfg(feature = "rich-diagnostics")]
use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use owo_colors::OwoColorize;

use crate::{Span, Token, TokenErrorKind};

/// A JSON parse error, with the input it happened in.
pub struct JsonError<'input> {
    /// The input associated with the error.
    pub input: Cow<'input, [u8]>,

    /// Where the error occurred
    pub span: Span,

    /// The specific error that occurred while parsing the JSON.
    pub kind: JsonErrorKind,
}

impl<'input> JsonError<'input> {
    /// Creates a new `JsonError` pointing at `span` inside `input`.
    pub fn new(kind: JsonErrorKind, input: &'input [u8], span: Span) -> Self {
        Self {
            input: Cow::Borrowed(input),
            span,
            kind,
        }
    }

    /// Detaches the error from the borrowed input.
    pub fn into_owned(self) -> JsonError<'static> {
        JsonError {
            input: Cow::Owned(self.input.into_owned()),
            span: self.span,
            kind: self.kind,
        }
    }

    /// Returns a wrapper type that displays a human-readable error message for this JSON error.
    pub fn message(&self) -> JsonErrorMessage<'_> {
        JsonErrorMessage(&self.kind)
    }
}

/// A wrapper type for displaying JSON error messages
pub struct JsonErrorMessage<'a>(&'a JsonErrorKind);

impl core::fmt::Display for JsonErrorMessage<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.0 {
            JsonErrorKind::UnexpectedToken { got, wanted } => {
                write!(
                    f,
                    "Unexpected token: got {}, wanted {}",
                    got.red(),
                    wanted.green()
                )
            }
            JsonErrorKind::TrailingCharacters(token) => {
                write!(f, "Trailing characters after JSON value: {}", token.red())
            }
            JsonErrorKind::SyntaxError(e) => write!(f, "{e}"),
        }
    }
}

/// An error kind for JSON parsing.
#[derive(Debug, PartialEq, Clone)]
pub enum JsonErrorKind {
    /// An unexpected token was encountered in the input.
    UnexpectedToken {
        /// The token found
        got: Token,

        /// What the parser expected at that point
        wanted: &'static str,
    },
    /// Something other than whitespace follows the top-level value.
    TrailingCharacters(Token),
    /// The tokenizer could not read the input.
    SyntaxError(TokenErrorKind),
}

/// Uncolored message, for embedding in other errors.
impl core::fmt::Display for JsonErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            JsonErrorKind::UnexpectedToken { got, wanted } => {
                write!(f, "unexpected token: got {got}, wanted {wanted}")
            }
            JsonErrorKind::TrailingCharacters(token) => {
                write!(f, "trailing characters after JSON value: {token}")
            }
            JsonErrorKind::SyntaxError(e) => write!(f, "{e}"),
        }
    }
}

#[cfg(not(feature = "rich-diagnostics"))]
impl core::fmt::Display for JsonError<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} at byte {}", self.message(), self.span.start())
    }
}

#[cfg(feature = "rich-diagnostics")]
impl core::fmt::Display for JsonError<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let Ok(input_str) = core::str::from_utf8(&self.input[..]) else {
            return write!(f, "(JSON input was invalid UTF-8)");
        };

        let source_id = "json";
        let span_start = self.span.start();
        let span_end = self.span.end().max(span_start);

        let report = Report::build(ReportKind::Error, (source_id, span_start..span_end))
            .with_message(format!("{} at byte {}", self.message(), span_start))
            .with_config(Config::new().with_index_type(IndexType::Byte))
            .with_label(
                Label::new((source_id, span_start..span_end))
                    .with_message(self.message())
                    .with_color(Color::Red),
            );

        let source = Source::from(input_str);
        let mut writer = Vec::new();
        if report.finish().write((source_id, &source), &mut writer).is_err() {
            return write!(f, "Error formatting with ariadne");
        }

        match String::from_utf8(writer) {
            Ok(output) => write!(f, "{}", output),
            Err(_) => write!(f, "Error converting ariadne output to string"),
        }
    }
}

impl core::fmt::Debug for JsonError<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JsonError")
            .field("span", &self.span)
            .field("kind", &self.kind)
            .finish()
    }
}

impl core::error::Error for JsonError<'_> {}
