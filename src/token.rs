use std::fmt;
use std::mem;

use log::debug;

#[allow(non_camel_case_types)]
#[derive(Debug, Clone)]
pub enum TokenType {
    // Single-character tokens.
    LEFT_PAREN,
    RIGHT_PAREN,
    LEFT_BRACE,
    RIGHT_BRACE,
    COMMA,
    DOT,
    MINUS,
    PLUS,
    SEMICOLON,
    SLASH,
    STAR,

    // One or two character tokens.
    BANG,
    BANG_EQUAL,
    EQUAL,
    EQUAL_EQUAL,
    GREATER,
    GREATER_EQUAL,
    LESS,
    LESS_EQUAL,

    // Literals.
    IDENTIFIER,
    STRING(String),
    NUMBER(f64),

    // Keywords.
    AND,
    BREAK,
    CLASS,
    ELSE,
    FALSE,
    FUN,
    FOR,
    IF,
    NIL,
    OR,
    PRINT,
    RETURN,
    SUPER,
    THIS,
    TRUE,
    VAR,
    WHILE,

    // Special Characters
    EOF,
}

// Literal payloads are deliberately ignored: the parser matches on token
// kinds, not on the particular number or string that was scanned.
impl PartialEq for TokenType {
    fn eq(&self, other: &Self) -> bool {
        mem::discriminant(self) == mem::discriminant(other)
    }
}

impl Eq for TokenType {}

#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    pub fn new(token_type: TokenType, lexeme: String, line: usize) -> Self {
        debug!(
            "Creating new token: type={:?}, lexeme={}, line={}",
            token_type, lexeme, line
        );
        Self {
            token_type,
            lexeme,
            line,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let literal: String = match &self.token_type {
            TokenType::STRING(literal) => literal.clone(),

            TokenType::NUMBER(num_literal) => {
                if num_literal.fract() == 0.0 {
                    format!("{:.1}", num_literal)
                } else {
                    format!("{}", num_literal)
                }
            }

            _ => "null".to_string(),
        };

        let tmp: String = format!("{:?}", self.token_type);
        let type_name: &str = tmp.split('(').next().unwrap();

        write!(f, "{} {} {}", type_name, self.lexeme, literal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_types_compare_by_kind() {
        assert_eq!(TokenType::NUMBER(1.0), TokenType::NUMBER(2.0));
        assert_eq!(
            TokenType::STRING("a".to_string()),
            TokenType::STRING("b".to_string())
        );
        assert_ne!(TokenType::NUMBER(1.0), TokenType::STRING("1".to_string()));
        assert_ne!(TokenType::BREAK, TokenType::WHILE);
    }

    #[test]
    fn display_strips_payload_from_type_name() {
        let token = Token::new(TokenType::NUMBER(42.0), "42".to_string(), 1);
        assert_eq!(token.to_string(), "NUMBER 42 42.0");

        let token = Token::new(TokenType::SEMICOLON, ";".to_string(), 3);
        assert_eq!(token.to_string(), "SEMICOLON ; null");
    }
}
