//! Tokenizer for schema text.
//!
//! The tokenizer never fails. Characters outside the small vocabulary become
//! [`Token::Other`], and an unterminated string literal runs to the end of the
//! input. String literals may use `"`, `'` or backticks, and a backslash
//! escapes the following character.

/// A lexical token of schema text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A run of ASCII letters, digits and underscores.
    Word(String),
    /// A quoted string literal, unescaped.
    Str(String),
    /// `.`
    Dot,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// Anything else.
    Other(char),
}

impl Token {
    /// Whether this token opens a nesting level.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Token::LParen | Token::LBrace | Token::LBracket)
    }

    /// Whether this token closes a nesting level.
    #[must_use]
    pub fn is_close(&self) -> bool {
        matches!(self, Token::RParen | Token::RBrace | Token::RBracket)
    }

    /// Whether this token is the given word.
    #[must_use]
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, Token::Word(w) if w == word)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Split schema text into tokens, skipping whitespace.
#[must_use]
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            '.' => Token::Dot,
            ':' => Token::Colon,
            ',' => Token::Comma,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '{' => Token::LBrace,
            '}' => Token::RBrace,
            '[' => Token::LBracket,
            ']' => Token::RBracket,
            '"' | '\'' | '`' => {
                let quote = c;
                let mut value = String::new();
                while let Some(c) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some('n') => value.push('\n'),
                            Some('t') => value.push('\t'),
                            Some('r') => value.push('\r'),
                            Some(escaped) => value.push(escaped),
                            None => break,
                        },
                        c if c == quote => break,
                        c => value.push(c),
                    }
                }
                Token::Str(value)
            }
            c if is_word_char(c) => {
                let mut word = String::from(c);
                while let Some(&next) = chars.peek() {
                    if !is_word_char(next) {
                        break;
                    }
                    word.push(next);
                    chars.next();
                }
                Token::Word(word)
            }
            other => Token::Other(other),
        };
        tokens.push(token);
    }

    tokens
}

/// Index of the token closing the group opened at `open`.
///
/// All three bracket kinds share one depth counter, so mismatched kinds still
/// pair up by nesting level.
#[must_use]
pub fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    if !tokens.get(open)?.is_open() {
        return None;
    }
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        if token.is_open() {
            depth += 1;
        } else if token.is_close() {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Split a token run at separators that sit at nesting depth zero.
///
/// Stray closers never push the depth below zero.
#[must_use]
pub fn split_top_level<'a>(tokens: &'a [Token], separator: &Token) -> Vec<&'a [Token]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        if token.is_open() {
            depth += 1;
        } else if token.is_close() {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && token == separator {
            parts.push(&tokens[start..i]);
            start = i + 1;
        }
    }
    parts.push(&tokens[start..]);
    parts
}
