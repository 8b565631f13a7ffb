//! Netlist lexer.
//!
//! Tokenizes one card per line. Words are kept as raw text; the parser
//! decides whether a word is a node name, a value, or a keyword. Braced
//! expressions like `{20/(s+3)}` are captured whole for the `s`-domain
//! expression parser.

use crate::error::{Error, Result};

/// Token types for netlist cards.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A bare word: element name, node, value or keyword.
    Word(String),
    /// The text between `{` and `}`, braces stripped.
    Brace(String),
    /// Equal sign for `ic=` parameters.
    Equals,
    /// Dot command (.end etc.), uppercased without the dot.
    Command(String),
    /// End of line.
    Eol,
    /// End of file.
    Eof,
}

/// A token with its source location.
#[derive(Debug, Clone)]
pub struct SpannedToken {
    pub token: Token,
    pub line: usize,
    pub column: usize,
}

/// Lexer for netlist text.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    line: usize,
    column: usize,
    at_line_start: bool,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
            line: 1,
            column: 1,
            at_line_start: true,
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<SpannedToken> {
        self.skip_whitespace();

        let line = self.line;
        let column = self.column;

        match self.peek_char() {
            None => Ok(SpannedToken {
                token: Token::Eof,
                line,
                column,
            }),
            Some('\n') => {
                self.advance();
                self.line += 1;
                self.column = 1;
                self.at_line_start = true;
                self.skip_whitespace();
                if self.peek_char() == Some('+') {
                    // Continuation line - the card continues past the newline
                    self.advance();
                    self.at_line_start = false;
                    return self.next_token();
                }
                Ok(SpannedToken {
                    token: Token::Eol,
                    line,
                    column,
                })
            }
            Some('*') if self.at_line_start => {
                // Comment line - disappears along with its newline
                self.skip_to_eol();
                if self.peek_char() == Some('\n') {
                    self.advance();
                    self.line += 1;
                    self.column = 1;
                    self.at_line_start = true;
                }
                self.next_token()
            }
            Some(';') => {
                // Inline comment - skip to end
                self.skip_to_eol();
                self.next_token()
            }
            Some('.') => {
                self.advance();
                self.at_line_start = false;
                let cmd = self.read_word();
                Ok(SpannedToken {
                    token: Token::Command(cmd.to_uppercase()),
                    line,
                    column,
                })
            }
            Some('=') => {
                self.advance();
                self.at_line_start = false;
                Ok(SpannedToken {
                    token: Token::Equals,
                    line,
                    column,
                })
            }
            Some('{') => {
                self.advance();
                self.at_line_start = false;
                let mut body = String::new();
                loop {
                    match self.peek_char() {
                        None | Some('\n') => {
                            return Err(Error::Parse {
                                line,
                                message: "unterminated '{' expression".to_string(),
                            });
                        }
                        Some('}') => {
                            self.advance();
                            break;
                        }
                        Some(c) => {
                            body.push(c);
                            self.advance();
                        }
                    }
                }
                Ok(SpannedToken {
                    token: Token::Brace(body),
                    line,
                    column,
                })
            }
            Some(_) => {
                self.at_line_start = false;
                let word = self.read_word();
                if word.is_empty() {
                    let c = self.peek_char().unwrap_or('?');
                    return Err(Error::Parse {
                        line,
                        message: format!("unexpected character: '{}'", c),
                    });
                }
                Ok(SpannedToken {
                    token: Token::Word(word),
                    line,
                    column,
                })
            }
        }
    }

    /// Tokenize the entire input.
    pub fn tokenize(mut self) -> Result<Vec<SpannedToken>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_eof = token.token == Token::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        Ok(tokens)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn advance(&mut self) -> Option<char> {
        if let Some((_, c)) = self.chars.next() {
            self.column += 1;
            Some(c)
        } else {
            None
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == ' ' || c == '\t' || c == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn skip_to_eol(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() || c == ';' || c == '=' || c == '{' || c == '}' {
                break;
            }
            word.push(c);
            self.advance();
        }
        word
    }
}
