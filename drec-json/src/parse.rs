use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use log::trace;
use owo_colors::OwoColorize;

use crate::tokenizer::Tokenizer;
use crate::{JsonError, JsonErrorKind, JsonObject, JsonValue, Number, Span, Spanned, Token};

/// Parses JSON text into a [`JsonValue`].
pub fn from_str(json: &str) -> Result<JsonValue, JsonError<'_>> {
    from_slice(json.as_bytes())
}

/// Represents the next expected token or structure while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Instruction {
    Value,
    ObjectKey,
    ObjectKeyOrObjectClose,
    CommaThenObjectKeyOrObjectClose,
    ArrayItemOrArrayClose,
    CommaThenArrayItemOrArrayClose,
}

/// A container still being filled.
enum Frame {
    Array(Vec<JsonValue>),
    Object {
        object: JsonObject,
        pending_key: Option<String>,
    },
}

/// Parses JSON bytes into a [`JsonValue`].
///
/// The parser is iterative: nesting depth is bounded by memory, not by the
/// call stack. Anything but whitespace after the top-level value is an error.
pub fn from_slice(input: &[u8]) -> Result<JsonValue, JsonError<'_>> {
    let mut tokenizer = Tokenizer::new(input);
    let mut stack = vec![Instruction::Value];
    let mut frames: Vec<Frame> = Vec::new();
    let mut last_span = Span::default();
    let mut unread_token: Option<Spanned<Token>> = None;
    let mut root: Option<JsonValue> = None;

    macro_rules! bail {
        ($kind:expr) => {
            return Err(JsonError::new($kind, input, last_span))
        };
    }

    macro_rules! read_token {
        () => {
            if let Some(token) = unread_token.take() {
                last_span = token.span;
                token
            } else {
                match tokenizer.next_token() {
                    Ok(token) => {
                        last_span = token.span;
                        token
                    }
                    Err(e) => {
                        last_span = e.span;
                        bail!(JsonErrorKind::SyntaxError(e.kind));
                    }
                }
            }
        };
    }

    // Hands a finished value to the innermost open container, or makes it the root.
    macro_rules! complete {
        ($value:expr) => {
            let value = $value;
            match frames.last_mut() {
                Some(Frame::Array(items)) => items.push(value),
                Some(Frame::Object {
                    object,
                    pending_key,
                }) => {
                    let key = pending_key.take().unwrap_or_default();
                    object.insert(key, value);
                }
                None => root = Some(value),
            }
        };
    }

    macro_rules! close {
        () => {
            let value = match frames.pop() {
                Some(Frame::Array(items)) => JsonValue::Array(items),
                Some(Frame::Object { object, .. }) => JsonValue::Object(object),
                None => bail!(JsonErrorKind::UnexpectedToken {
                    got: Token::Eof,
                    wanted: "an open container"
                }),
            };
            complete!(value);
        };
    }

    while let Some(insn) = stack.pop() {
        trace!("[{}] Instruction {:?}", frames.len(), insn.yellow());

        match insn {
            Instruction::Value => {
                let token = read_token!();
                let value = match token.node {
                    Token::LBrace => {
                        frames.push(Frame::Object {
                            object: JsonObject::new(),
                            pending_key: None,
                        });
                        stack.push(Instruction::ObjectKeyOrObjectClose);
                        continue;
                    }
                    Token::LBracket => {
                        frames.push(Frame::Array(Vec::new()));
                        stack.push(Instruction::ArrayItemOrArrayClose);
                        continue;
                    }
                    Token::String(s) => JsonValue::String(s),
                    Token::U64(n) => JsonValue::Number(Number::U64(n)),
                    Token::I64(n) => JsonValue::Number(Number::I64(n)),
                    Token::F64(n) => JsonValue::Number(Number::F64(n)),
                    Token::True => JsonValue::Bool(true),
                    Token::False => JsonValue::Bool(false),
                    Token::Null => JsonValue::Null,
                    got => bail!(JsonErrorKind::UnexpectedToken {
                        got,
                        wanted: "value"
                    }),
                };
                complete!(value);
            }
            Instruction::ObjectKey | Instruction::ObjectKeyOrObjectClose => {
                let token = read_token!();
                match token.node {
                    Token::String(key) => {
                        trace!("Object key: {}", key.blue());
                        if let Some(Frame::Object { pending_key, .. }) = frames.last_mut() {
                            *pending_key = Some(key);
                        }

                        let colon = read_token!();
                        if colon.node != Token::Colon {
                            bail!(JsonErrorKind::UnexpectedToken {
                                got: colon.node,
                                wanted: "colon"
                            });
                        }
                        stack.push(Instruction::CommaThenObjectKeyOrObjectClose);
                        stack.push(Instruction::Value);
                    }
                    Token::RBrace if insn == Instruction::ObjectKeyOrObjectClose => {
                        trace!("Object closing");
                        close!();
                    }
                    got => {
                        bail!(JsonErrorKind::UnexpectedToken {
                            got,
                            wanted: if insn == Instruction::ObjectKey {
                                "object key"
                            } else {
                                "object key or closing brace"
                            }
                        });
                    }
                }
            }
            Instruction::CommaThenObjectKeyOrObjectClose => {
                let token = read_token!();
                match token.node {
                    Token::Comma => stack.push(Instruction::ObjectKey),
                    Token::RBrace => {
                        trace!("Object close");
                        close!();
                    }
                    got => bail!(JsonErrorKind::UnexpectedToken {
                        got,
                        wanted: "comma or closing brace"
                    }),
                }
            }
            Instruction::ArrayItemOrArrayClose => {
                let token = read_token!();
                match token.node {
                    Token::RBracket => {
                        trace!("Array close");
                        close!();
                    }
                    _ => {
                        unread_token = Some(token);
                        stack.push(Instruction::CommaThenArrayItemOrArrayClose);
                        stack.push(Instruction::Value);
                    }
                }
            }
            Instruction::CommaThenArrayItemOrArrayClose => {
                let token = read_token!();
                match token.node {
                    Token::Comma => {
                        stack.push(Instruction::CommaThenArrayItemOrArrayClose);
                        stack.push(Instruction::Value);
                    }
                    Token::RBracket => {
                        trace!("Array close");
                        close!();
                    }
                    got => bail!(JsonErrorKind::UnexpectedToken {
                        got,
                        wanted: "comma or closing bracket"
                    }),
                }
            }
        }
    }

    let trailing = read_token!();
    if trailing.node != Token::Eof {
        bail!(JsonErrorKind::TrailingCharacters(trailing.node));
    }

    match root {
        Some(value) => Ok(value),
        None => bail!(JsonErrorKind::UnexpectedToken {
            got: Token::Eof,
            wanted: "value"
        }),
    }
}
