use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt::{self, Display, Formatter};
use core::str;

use crate::{Pos, Span, Spanned};

/// Error encountered during tokenization
#[derive(Debug, Clone, PartialEq)]
pub struct TokenError {
    /// The specific type of error that occurred during tokenization
    pub kind: TokenErrorKind,
    /// The location in the source where the error occurred
    pub span: Span,
}

/// Types of errors that can occur during tokenization
#[derive(Debug, Clone, PartialEq)]
pub enum TokenErrorKind {
    /// Unexpected character encountered
    UnexpectedCharacter(char),
    /// End of file reached unexpectedly
    UnexpectedEof(&'static str),
    /// Invalid UTF-8 sequence, or an escape that does not name a scalar value
    InvalidUtf8(String),
    /// Number does not fit the representation it was written in
    NumberOutOfRange(String),
}

impl Display for TokenErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TokenErrorKind::UnexpectedCharacter(c) => write!(f, "unexpected character: '{}'", c),
            TokenErrorKind::UnexpectedEof(context) => write!(f, "unexpected EOF {}", context),
            TokenErrorKind::InvalidUtf8(detail) => write!(f, "invalid UTF-8: {}", detail),
            TokenErrorKind::NumberOutOfRange(n) => write!(f, "number out of range: {}", n),
        }
    }
}

/// Tokenization result, yielding a spanned token
pub type TokenizeResult = Result<Spanned<Token>, TokenError>;

/// JSON tokens (without positions)
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Left brace character: '{'
    LBrace,
    /// Right brace character: '}'
    RBrace,
    /// Left bracket character: '['
    LBracket,
    /// Right bracket character: ']'
    RBracket,
    /// Colon character: ':'
    Colon,
    /// Comma character: ','
    Comma,
    /// A JSON string value, already unescaped
    String(String),
    /// A number written with a fraction or an exponent
    F64(f64),
    /// A negative integer
    I64(i64),
    /// A non-negative integer
    U64(u64),
    /// The JSON boolean value 'true'
    True,
    /// The JSON boolean value 'false'
    False,
    /// The JSON null value
    Null,
    /// End of file marker
    Eof,
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::String(s) => write!(f, "\"{}\"", s),
            Token::F64(n) => write!(f, "{}", n),
            Token::I64(n) => write!(f, "{}", n),
            Token::U64(n) => write!(f, "{}", n),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Null => write!(f, "null"),
            Token::Eof => write!(f, "EOF"),
        }
    }
}

/// Simple JSON tokenizer producing spanned tokens from byte input.
pub(crate) struct Tokenizer<'input> {
    input: &'input [u8],
    pos: Pos,
}

impl<'input> Tokenizer<'input> {
    pub(crate) fn new(input: &'input [u8]) -> Self {
        Tokenizer { input, pos: 0 }
    }

    /// Return the next spanned token or a TokenError
    pub(crate) fn next_token(&mut self) -> TokenizeResult {
        self.skip_whitespace();
        let start = self.pos;
        let Some(c) = self.input.get(self.pos).copied() else {
            return Ok(Spanned {
                node: Token::Eof,
                span: Span::new(self.pos, 0),
            });
        };
        let punct = match c {
            b'{' => Token::LBrace,
            b'}' => Token::RBrace,
            b'[' => Token::LBracket,
            b']' => Token::RBracket,
            b':' => Token::Colon,
            b',' => Token::Comma,
            b'"' => return self.parse_string(start),
            b'-' | b'0'..=b'9' => return self.parse_number(start),
            b't' => return self.parse_literal(start, b"true", Token::True),
            b'f' => return self.parse_literal(start, b"false", Token::False),
            b'n' => return self.parse_literal(start, b"null", Token::Null),
            _ => {
                return Err(TokenError {
                    kind: TokenErrorKind::UnexpectedCharacter(self.char_at(start)),
                    span: Span::new(start, 1),
                });
            }
        };
        self.pos += 1;
        Ok(Spanned {
            node: punct,
            span: Span::new(start, 1),
        })
    }

    fn skip_whitespace(&mut self) {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.input.get(self.pos) {
            self.pos += 1;
        }
    }

    /// Decodes the (possibly multi-byte) character at `pos` for error reporting.
    fn char_at(&self, pos: Pos) -> char {
        let end = (pos + 4).min(self.input.len());
        let tail = &self.input[pos..end];
        let valid = match str::from_utf8(tail) {
            Ok(s) => s,
            Err(e) => str::from_utf8(&tail[..e.valid_up_to()]).unwrap_or(""),
        };
        valid.chars().next().unwrap_or('\u{FFFD}')
    }

    fn parse_string(&mut self, start: Pos) -> TokenizeResult {
        // Skip opening quote
        self.pos += 1;
        let content_start = self.pos;
        let mut buf = Vec::new();

        loop {
            let Some(&b) = self.input.get(self.pos) else {
                return Err(TokenError {
                    kind: TokenErrorKind::UnexpectedEof("in string literal"),
                    span: Span::new(start, self.pos - start),
                });
            };
            match b {
                b'"' => {
                    self.pos += 1;
                    break;
                }
                b'\\' => {
                    self.pos += 1;
                    let Some(&esc) = self.input.get(self.pos) else {
                        return Err(TokenError {
                            kind: TokenErrorKind::UnexpectedEof("in string escape"),
                            span: Span::new(self.pos, 0),
                        });
                    };
                    self.pos += 1;
                    match esc {
                        b'"' | b'\\' | b'/' => buf.push(esc),
                        b'b' => buf.push(b'\x08'),
                        b'f' => buf.push(b'\x0C'),
                        b'n' => buf.push(b'\n'),
                        b'r' => buf.push(b'\r'),
                        b't' => buf.push(b'\t'),
                        b'u' => {
                            let c = self.parse_unicode_escape()?;
                            let mut utf8 = [0u8; 4];
                            buf.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
                        }
                        other => {
                            return Err(TokenError {
                                kind: TokenErrorKind::UnexpectedCharacter(other as char),
                                span: Span::new(self.pos - 2, 2),
                            });
                        }
                    }
                }
                b if b < 0x20 => {
                    return Err(TokenError {
                        kind: TokenErrorKind::UnexpectedCharacter(b as char),
                        span: Span::new(self.pos, 1),
                    });
                }
                _ => {
                    buf.push(b);
                    self.pos += 1;
                }
            }
        }

        let content_len = buf.len();
        let s = String::from_utf8(buf).map_err(|e| TokenError {
            kind: TokenErrorKind::InvalidUtf8(e.to_string()),
            span: Span::new(content_start, content_len),
        })?;

        Ok(Spanned {
            node: Token::String(s),
            span: Span::new(start, self.pos - start),
        })
    }

    /// Reads the `XXXX` of a `\uXXXX` escape, plus the low half of a surrogate pair
    /// when the first unit is a high surrogate. `pos` points just past the `u`.
    fn parse_unicode_escape(&mut self) -> Result<char, TokenError> {
        let escape_start = self.pos - 2;
        let high = self.read_hex4()?;
        let code_point = if (0xD800..0xDC00).contains(&high) {
            if self.input.get(self.pos..self.pos + 2) != Some(b"\\u".as_slice()) {
                return Err(TokenError {
                    kind: TokenErrorKind::InvalidUtf8("unpaired high surrogate".to_string()),
                    span: Span::new(escape_start, self.pos - escape_start),
                });
            }
            self.pos += 2;
            let low = self.read_hex4()?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(TokenError {
                    kind: TokenErrorKind::InvalidUtf8("invalid low surrogate".to_string()),
                    span: Span::new(escape_start, self.pos - escape_start),
                });
            }
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        } else {
            high
        };

        char::from_u32(code_point).ok_or_else(|| TokenError {
            kind: TokenErrorKind::InvalidUtf8("invalid Unicode code point".to_string()),
            span: Span::new(escape_start, self.pos - escape_start),
        })
    }

    fn read_hex4(&mut self) -> Result<u32, TokenError> {
        let hex_start = self.pos;
        let Some(digits) = self.input.get(hex_start..hex_start + 4) else {
            return Err(TokenError {
                kind: TokenErrorKind::UnexpectedEof("in Unicode escape sequence"),
                span: Span::new(hex_start, self.input.len() - hex_start),
            });
        };
        let mut value = 0u32;
        for (i, &d) in digits.iter().enumerate() {
            let Some(nibble) = (d as char).to_digit(16) else {
                return Err(TokenError {
                    kind: TokenErrorKind::UnexpectedCharacter(d as char),
                    span: Span::new(hex_start + i, 1),
                });
            };
            value = value * 16 + nibble;
        }
        self.pos += 4;
        Ok(value)
    }

    fn parse_number(&mut self, start: Pos) -> TokenizeResult {
        let input = self.input;
        let digits_from = |mut at: usize| {
            while at < input.len() && input[at].is_ascii_digit() {
                at += 1;
            }
            at
        };

        let mut end = start;
        if input[end] == b'-' {
            end += 1;
        }
        let int_start = end;
        end = digits_from(end);
        let mut is_float = false;
        if end == int_start {
            return Err(self.bad_number_char(end));
        }
        if input[int_start] == b'0' && end - int_start > 1 {
            return Err(self.bad_number_char(int_start + 1));
        }
        if end < input.len() && input[end] == b'.' {
            is_float = true;
            let frac_start = end + 1;
            end = digits_from(frac_start);
            if end == frac_start {
                return Err(self.bad_number_char(end));
            }
        }
        if end < input.len() && (input[end] == b'e' || input[end] == b'E') {
            is_float = true;
            end += 1;
            if end < input.len() && (input[end] == b'+' || input[end] == b'-') {
                end += 1;
            }
            let exp_start = end;
            end = digits_from(exp_start);
            if end == exp_start {
                return Err(self.bad_number_char(end));
            }
        }

        let span = Span::new(start, end - start);
        // Only ASCII digits, signs, '.', 'e' and 'E' were consumed above.
        let text = str::from_utf8(&input[start..end]).unwrap_or_default();
        let out_of_range = || TokenError {
            kind: TokenErrorKind::NumberOutOfRange(text.to_string()),
            span,
        };

        let token = if is_float {
            match text.parse::<f64>() {
                Ok(n) if n.is_finite() => Token::F64(n),
                _ => return Err(out_of_range()),
            }
        } else if text.starts_with('-') {
            Token::I64(text.parse::<i64>().map_err(|_| out_of_range())?)
        } else {
            Token::U64(text.parse::<u64>().map_err(|_| out_of_range())?)
        };

        self.pos = end;
        Ok(Spanned { node: token, span })
    }

    fn bad_number_char(&self, at: Pos) -> TokenError {
        if at >= self.input.len() {
            TokenError {
                kind: TokenErrorKind::UnexpectedEof("in number"),
                span: Span::new(at, 0),
            }
        } else {
            TokenError {
                kind: TokenErrorKind::UnexpectedCharacter(self.char_at(at)),
                span: Span::new(at, 1),
            }
        }
    }

    fn parse_literal(&mut self, start: Pos, pat: &[u8], token: Token) -> TokenizeResult {
        let end = start + pat.len();
        if self.input.get(start..end) == Some(pat) {
            self.pos = end;
            return Ok(Spanned {
                node: token,
                span: Span::new(start, pat.len()),
            });
        }

        // Point at the first byte that diverges from the literal
        let matched = self.input[start..]
            .iter()
            .zip(pat)
            .take_while(|(a, b)| a == b)
            .count();
        let at = start + matched;
        if at >= self.input.len() {
            Err(TokenError {
                kind: TokenErrorKind::UnexpectedEof("in literal"),
                span: Span::new(at, 0),
            })
        } else {
            Err(TokenError {
                kind: TokenErrorKind::UnexpectedCharacter(self.char_at(at)),
                span: Span::new(at, 1),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn tokens(input: &str) -> Result<Vec<Token>, TokenError> {
        let mut tokenizer = Tokenizer::new(input.as_bytes());
        let mut out = vec![];
        loop {
            let token = tokenizer.next_token()?;
            if token.node == Token::Eof {
                return Ok(out);
            }
            out.push(token.node);
        }
    }

    #[test]
    fn punctuation_and_literals() {
        assert_eq!(
            tokens(r#"{ "a" : [true, false, null] }"#).unwrap(),
            vec![
                Token::LBrace,
                Token::String("a".into()),
                Token::Colon,
                Token::LBracket,
                Token::True,
                Token::Comma,
                Token::False,
                Token::Comma,
                Token::Null,
                Token::RBracket,
                Token::RBrace,
            ]
        );
    }

    #[test]
    fn numbers_keep_their_representation() {
        assert_eq!(
            tokens("1357 -4 3.14 1e3").unwrap(),
            vec![
                Token::U64(1357),
                Token::I64(-4),
                Token::F64(3.14),
                Token::F64(1000.0)
            ]
        );
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        assert!(tokens("-").is_err());
        assert!(tokens("1.").is_err());
        assert!(tokens("2e").is_err());
        let err = tokens("01").unwrap_err();
        assert_eq!(err.kind, TokenErrorKind::UnexpectedCharacter('1'));
        assert_eq!(err.span, Span::new(1, 1));
        assert!(tokens("-007").is_err());
        assert_eq!(tokens("0 -0 0.5").unwrap(), vec![Token::U64(0), Token::I64(0), Token::F64(0.5)]);
        let err = tokens("99999999999999999999").unwrap_err();
        assert!(matches!(err.kind, TokenErrorKind::NumberOutOfRange(_)));
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            tokens(r#""a\"b\nC\uD83D\uDE00""#).unwrap(),
            vec![Token::String("a\"b\nC😀".into())]
        );
    }

    #[test]
    fn unterminated_string_reports_eof() {
        let err = tokens(r#""abc"#).unwrap_err();
        assert_eq!(err.kind, TokenErrorKind::UnexpectedEof("in string literal"));
        assert_eq!(err.span, Span::new(0, 4));
    }

    #[test]
    fn bad_literal_points_at_divergence() {
        let err = tokens("trux").unwrap_err();
        assert_eq!(err.kind, TokenErrorKind::UnexpectedCharacter('x'));
        assert_eq!(err.span, Span::new(3, 1));
    }
}
