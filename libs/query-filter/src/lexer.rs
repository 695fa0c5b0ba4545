//! Tokenizer shared by the `$filter` and `$orderby` grammars.
//!
//! The lexer only splits the input; deciding whether a word is a field, an
//! operator or a keyword is left to the parsers, which know the field map.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum TokenKind<'a> {
    /// `[A-Za-z_][A-Za-z0-9_]*`
    Word(&'a str),
    /// `[0-9]+`, unsigned
    Integer(&'a str),
    /// Contents of a single-quoted literal, quotes stripped.
    Quoted(&'a str),
    Comma,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Token<'a> {
    pub kind: TokenKind<'a>,
    /// Byte offset of the token in the input.
    pub start: usize,
    /// Source text of the token, including quotes.
    pub text: &'a str,
    /// Whether at least one whitespace character precedes the token.
    pub spaced: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LexError {
    /// A `'` without its closing quote; offset of the opening quote.
    Unterminated(usize),
    /// A character no token can start with.
    Unexpected(usize),
}

impl LexError {
    pub fn offset(self) -> usize {
        match self {
            LexError::Unterminated(at) | LexError::Unexpected(at) => at,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            LexError::Unterminated(_) => "unterminated string literal",
            LexError::Unexpected(_) => "unexpected character",
        }
    }
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Token<'_>>, LexError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;
    let mut spaced = false;

    while pos < bytes.len() {
        let b = bytes[pos];

        if b.is_ascii_whitespace() {
            spaced = true;
            pos += 1;
            continue;
        }

        let start = pos;
        let kind = match b {
            b'\'' => {
                let body = start + 1;
                let Some(len) = input[body..].find('\'') else {
                    return Err(LexError::Unterminated(start));
                };
                pos = body + len + 1;
                TokenKind::Quoted(&input[body..body + len])
            }
            b',' => {
                pos += 1;
                TokenKind::Comma
            }
            b'0'..=b'9' => {
                pos = scan(bytes, pos, |c| c.is_ascii_digit());
                TokenKind::Integer(&input[start..pos])
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                pos = scan(bytes, pos, |c| c.is_ascii_alphanumeric() || c == b'_');
                TokenKind::Word(&input[start..pos])
            }
            _ => return Err(LexError::Unexpected(start)),
        };

        tokens.push(Token {
            kind,
            start,
            text: &input[start..pos],
            spaced: spaced || start == 0,
        });
        spaced = false;
    }

    Ok(tokens)
}

fn scan(bytes: &[u8], mut pos: usize, accept: impl Fn(u8) -> bool) -> usize {
    while pos < bytes.len() && accept(bytes[pos]) {
        pos += 1;
    }
    pos
}
