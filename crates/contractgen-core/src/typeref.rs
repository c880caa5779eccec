//! Type reference notation used by serialized descriptors.
//!
//! # Syntax
//!
//! - `int`, `string`, `Guid`: built-in aliases
//! - `Acme.Models.User`: declared type by full name
//! - `T`: type parameter of the enclosing generic definition
//! - `List<T>`, `Dictionary<K, V>`, `Acme.Page<T>`: closed generics
//! - `T[]`: array
//! - `T?`: `Nullable<T>`
//!
//! Suffixes apply left to right: `int?[]` is an array of nullable ints.

use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
enum Token<'src> {
    #[token("<")]
    LAngle,

    #[token(">")]
    RAngle,

    #[token(",")]
    Comma,

    #[token("[]")]
    Brackets,

    #[token("?")]
    Question,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*", |lex| lex.slice())]
    Path(&'src str),
}

/// Parsed type reference, not yet resolved against a universe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeRef {
    Named {
        name: String,
        arguments: Vec<TypeRef>,
    },
    Array(Box<TypeRef>),
    Nullable(Box<TypeRef>),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message} at {span:?}")]
pub struct ParseError {
    pub message: String,
    pub span: std::ops::Range<usize>,
}

impl TypeRef {
    pub fn parse(input: &str) -> Result<TypeRef, ParseError> {
        let mut parser = Parser::new(input)?;
        let parsed = parser.parse_ref()?;
        if let Some(token) = parser.peek() {
            return Err(ParseError {
                message: format!("unexpected trailing {token:?}"),
                span: parser.current_span(),
            });
        }
        Ok(parsed)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            arguments: Vec::new(),
        }
    }
}

struct Parser<'src> {
    tokens: Vec<(Token<'src>, std::ops::Range<usize>)>,
    pos: usize,
    input: &'src str,
}

impl<'src> Parser<'src> {
    fn new(input: &'src str) -> Result<Self, ParseError> {
        let lexer = Token::lexer(input);
        let mut tokens = Vec::new();

        for (result, span) in lexer.spanned() {
            match result {
                Ok(token) => tokens.push((token, span)),
                Err(_) => {
                    return Err(ParseError {
                        message: format!("unexpected character: {:?}", &input[span.clone()]),
                        span,
                    });
                }
            }
        }

        Ok(Self {
            tokens,
            pos: 0,
            input,
        })
    }

    fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn advance(&mut self) -> Option<&Token<'src>> {
        let token = self.tokens.get(self.pos).map(|(t, _)| t);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn current_span(&self) -> std::ops::Range<usize> {
        self.tokens
            .get(self.pos)
            .map(|(_, s)| s.clone())
            .unwrap_or(self.input.len()..self.input.len())
    }

    fn parse_ref(&mut self) -> Result<TypeRef, ParseError> {
        let mut parsed = self.parse_named()?;
        loop {
            match self.peek() {
                Some(Token::Brackets) => {
                    self.advance();
                    parsed = TypeRef::Array(Box::new(parsed));
                }
                Some(Token::Question) => {
                    self.advance();
                    parsed = TypeRef::Nullable(Box::new(parsed));
                }
                _ => return Ok(parsed),
            }
        }
    }

    fn parse_named(&mut self) -> Result<TypeRef, ParseError> {
        let span = self.current_span();
        let name = match self.advance() {
            Some(Token::Path(path)) => path.to_string(),
            Some(t) => {
                return Err(ParseError {
                    message: format!("expected type name, got {t:?}"),
                    span,
                });
            }
            None => {
                return Err(ParseError {
                    message: "expected type name, got EOF".to_string(),
                    span,
                });
            }
        };

        let mut arguments = Vec::new();
        if matches!(self.peek(), Some(Token::LAngle)) {
            self.advance();
            loop {
                arguments.push(self.parse_ref()?);
                let span = self.current_span();
                match self.advance() {
                    Some(Token::Comma) => continue,
                    Some(Token::RAngle) => break,
                    _ => {
                        return Err(ParseError {
                            message: "expected ',' or '>'".to_string(),
                            span,
                        });
                    }
                }
            }
        }

        Ok(TypeRef::Named { name, arguments })
    }
}
