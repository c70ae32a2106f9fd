//! Selector Lexer
//!
//! Tokenizes path selectors into tokens.

/// Selector token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Operators
    Slash,       // /
    DoubleSlash, // //
    Dot,         // .
    DoubleDot,   // ..
    At,          // @
    Star,        // *
    Eq,          // =

    // Brackets
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]

    // Literals
    Number(f64),
    String(String),

    // Names
    Name(String),     // NCName
    NameTest(String), // prefix:* or prefix:local
    NodeType(String), // node(), text(), comment()

    // Axis
    Axis(String), // child::, descendant::, etc.
    DoubleColon,  // ::

    /// Character or construct outside the supported grammar
    Invalid(String),

    // End of input
    Eof,
}

/// Selector lexer
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer
    pub fn new(input: &'a str) -> Self {
        Lexer { input, pos: 0 }
    }

    /// Get the remaining input
    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Peek at current character
    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    /// Peek at character at offset
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.remaining().chars().nth(offset)
    }

    /// Advance by n bytes
    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Skip whitespace
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.advance(c.len_utf8());
            } else {
                break;
            }
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let c = match self.peek() {
            Some(c) => c,
            None => return Token::Eof,
        };

        match c {
            '/' => {
                self.advance(1);
                if self.peek() == Some('/') {
                    self.advance(1);
                    Token::DoubleSlash
                } else {
                    Token::Slash
                }
            }
            '.' => {
                self.advance(1);
                if self.peek() == Some('.') {
                    self.advance(1);
                    Token::DoubleDot
                } else if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    // Number starting with .
                    self.pos -= 1; // Backtrack
                    self.read_number()
                } else {
                    Token::Dot
                }
            }
            '@' => {
                self.advance(1);
                Token::At
            }
            '*' => {
                self.advance(1);
                Token::Star
            }
            '=' => {
                self.advance(1);
                Token::Eq
            }
            '(' => {
                self.advance(1);
                Token::LeftParen
            }
            ')' => {
                self.advance(1);
                Token::RightParen
            }
            '[' => {
                self.advance(1);
                Token::LeftBracket
            }
            ']' => {
                self.advance(1);
                Token::RightBracket
            }
            ':' => {
                self.advance(1);
                if self.peek() == Some(':') {
                    self.advance(1);
                    Token::DoubleColon
                } else {
                    Token::Invalid(":".to_string())
                }
            }
            '"' | '\'' => self.read_string(c),
            '0'..='9' => self.read_number(),
            _ if is_name_start_char(c) => self.read_name_or_keyword(),
            _ => {
                self.advance(c.len_utf8());
                Token::Invalid(c.to_string())
            }
        }
    }

    /// Read a number literal
    fn read_number(&mut self) -> Token {
        let start = self.pos;

        // Integer part
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance(1);
        }

        // Decimal part
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.advance(1); // Skip '.'
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance(1);
            }
        }

        let num_str = &self.input[start..self.pos];
        let value = num_str.parse().unwrap_or(f64::NAN);
        Token::Number(value)
    }

    /// Read a string literal
    fn read_string(&mut self, quote: char) -> Token {
        self.advance(1); // Skip opening quote

        let start = self.pos;
        match self.remaining().find(quote) {
            Some(len) => {
                self.advance(len + 1);
                Token::String(self.input[start..start + len].to_string())
            }
            None => {
                self.pos = self.input.len();
                Token::Invalid("unterminated string literal".to_string())
            }
        }
    }

    /// Read a name or keyword
    fn read_name_or_keyword(&mut self) -> Token {
        let name = self.read_name();

        // Check if followed by :: (axis)
        self.skip_whitespace();
        if self.remaining().starts_with("::") {
            return Token::Axis(name.to_string());
        }

        // Check if followed by ( (node type)
        if self.peek() == Some('(') {
            return match name {
                "node" | "text" | "comment" => Token::NodeType(name.to_string()),
                _ => Token::Invalid(format!("{}()", name)),
            };
        }

        // Check for namespace prefix
        if self.peek() == Some(':') && self.peek_at(1) != Some(':') {
            self.advance(1); // Skip ':'
            if self.peek() == Some('*') {
                self.advance(1);
                return Token::NameTest(format!("{}:*", name));
            }
            if !self.peek().is_some_and(is_name_start_char) {
                return Token::Invalid(format!("{}:", name));
            }
            let local = self.read_name();
            return Token::NameTest(format!("{}:{}", name, local));
        }

        Token::Name(name.to_string())
    }

    fn read_name(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_name_char(c) {
                self.advance(c.len_utf8());
            } else {
                break;
            }
        }
        &self.input[start..self.pos]
    }

    /// Tokenize entire input
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            if matches!(token, Token::Eof) {
                break;
            }
            tokens.push(token);
        }
        tokens
    }
}

fn is_name_start_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_path() {
        let mut lexer = Lexer::new("/root/child");
        assert_eq!(lexer.next_token(), Token::Slash);
        assert_eq!(lexer.next_token(), Token::Name("root".to_string()));
        assert_eq!(lexer.next_token(), Token::Slash);
        assert_eq!(lexer.next_token(), Token::Name("child".to_string()));
        assert_eq!(lexer.next_token(), Token::Eof);
    }

    #[test]
    fn test_descendant() {
        let mut lexer = Lexer::new("//item");
        assert_eq!(lexer.next_token(), Token::DoubleSlash);
        assert_eq!(lexer.next_token(), Token::Name("item".to_string()));
    }

    #[test]
    fn test_predicate() {
        let mut lexer = Lexer::new("item[@id='test']");
        assert_eq!(lexer.next_token(), Token::Name("item".to_string()));
        assert_eq!(lexer.next_token(), Token::LeftBracket);
        assert_eq!(lexer.next_token(), Token::At);
        assert_eq!(lexer.next_token(), Token::Name("id".to_string()));
        assert_eq!(lexer.next_token(), Token::Eq);
        assert_eq!(lexer.next_token(), Token::String("test".to_string()));
        assert_eq!(lexer.next_token(), Token::RightBracket);
    }

    #[test]
    fn test_axis() {
        let mut lexer = Lexer::new("child::element");
        assert_eq!(lexer.next_token(), Token::Axis("child".to_string()));
        assert_eq!(lexer.next_token(), Token::DoubleColon);
        assert_eq!(lexer.next_token(), Token::Name("element".to_string()));
    }

    #[test]
    fn test_prefixed_names() {
        let tokens = Lexer::new("ns0:person/ns0:*").tokenize();
        assert_eq!(
            tokens,
            [
                Token::NameTest("ns0:person".to_string()),
                Token::Slash,
                Token::NameTest("ns0:*".to_string()),
            ]
        );
    }

    #[test]
    fn test_number_and_node_type() {
        let tokens = Lexer::new("a[2]/text()").tokenize();
        assert!(matches!(tokens[2], Token::Number(n) if n == 2.0));
        assert_eq!(tokens[5], Token::NodeType("text".to_string()));
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(Lexer::new("'open").next_token(), Token::Invalid("unterminated string literal".to_string()));
        assert!(matches!(Lexer::new("count(a)").next_token(), Token::Invalid(_)));
        assert!(matches!(Lexer::new("a | b").tokenize()[1], Token::Invalid(_)));
    }
}
