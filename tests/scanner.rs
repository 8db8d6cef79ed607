use rox::error::ScanError;
use rox::scanner::Scanner;
use rox::token::{Token, TokenType};

fn scan(source: &str) -> Vec<Result<Token, ScanError>> {
    Scanner::new(source.as_bytes().to_vec()).collect()
}

fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
    let scanner = Scanner::new(source.as_bytes().to_vec());
    let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

    assert_eq!(tokens.len(), expected.len());

    for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
        assert_eq!(actual.token_type, *expected_type);
        assert_eq!(actual.lexeme, *expected_lexeme);
    }
}

#[test]
fn test_scanner_01_symbols() {
    assert_token_sequence(
        "({*.,+*})",
        &[
            (TokenType::LEFT_PAREN, "("),
            (TokenType::LEFT_BRACE, "{"),
            (TokenType::STAR, "*"),
            (TokenType::DOT, "."),
            (TokenType::COMMA, ","),
            (TokenType::PLUS, "+"),
            (TokenType::STAR, "*"),
            (TokenType::RIGHT_BRACE, "}"),
            (TokenType::RIGHT_PAREN, ")"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn test_scanner_02_operators_prefer_two_char_forms() {
    assert_token_sequence(
        "! != = == < <= > >= / //ignored",
        &[
            (TokenType::BANG, "!"),
            (TokenType::BANG_EQUAL, "!="),
            (TokenType::EQUAL, "="),
            (TokenType::EQUAL_EQUAL, "=="),
            (TokenType::LESS, "<"),
            (TokenType::LESS_EQUAL, "<="),
            (TokenType::GREATER, ">"),
            (TokenType::GREATER_EQUAL, ">="),
            (TokenType::SLASH, "/"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn test_scanner_03_keywords_and_identifiers() {
    assert_token_sequence(
        "var breaker = break; while whiled",
        &[
            (TokenType::VAR, "var"),
            (TokenType::IDENTIFIER, "breaker"),
            (TokenType::EQUAL, "="),
            (TokenType::BREAK, "break"),
            (TokenType::SEMICOLON, ";"),
            (TokenType::WHILE, "while"),
            (TokenType::IDENTIFIER, "whiled"),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn test_scanner_04_numbers() {
    assert_token_sequence(
        "1 12.5 0.25",
        &[
            (TokenType::NUMBER(1.0), "1"),
            (TokenType::NUMBER(12.5), "12.5"),
            (TokenType::NUMBER(0.25), "0.25"),
            (TokenType::EOF, ""),
        ],
    );

    let tokens: Vec<_> = scan("12.5").into_iter().map(Result::unwrap).collect();
    match &tokens[0].token_type {
        TokenType::NUMBER(n) => assert_eq!(*n, 12.5),
        other => panic!("expected number token, got {:?}", other),
    }
}

#[test]
fn test_scanner_05_trailing_dot_is_not_consumed() {
    assert_token_sequence(
        "123.",
        &[
            (TokenType::NUMBER(123.0), "123"),
            (TokenType::DOT, "."),
            (TokenType::EOF, ""),
        ],
    );
}

#[test]
fn test_scanner_06_string_literals() {
    let tokens: Vec<_> = scan("\"hello world\"").into_iter().map(Result::unwrap).collect();

    assert_eq!(tokens.len(), 2);
    match &tokens[0].token_type {
        TokenType::STRING(s) => assert_eq!(s, "hello world"),
        other => panic!("expected string token, got {:?}", other),
    }
}

#[test]
fn test_scanner_07_multiline_strings_count_lines() {
    let tokens: Vec<_> = scan("\"a\nb\"\nx").into_iter().map(Result::unwrap).collect();

    // The identifier after the string sits on line 3.
    let ident = tokens
        .iter()
        .find(|t| t.token_type == TokenType::IDENTIFIER)
        .unwrap();
    assert_eq!(ident.line, 3);
}

#[test]
fn test_scanner_08_unterminated_string() {
    let results = scan("\"abc");

    let err = results
        .iter()
        .find_map(|r| r.as_ref().err())
        .expect("expected a scan error");
    assert_eq!(err.message, "Unterminated string.");
}

#[test]
fn test_scanner_09_comments_produce_no_tokens() {
    assert_token_sequence(
        "// a comment\n1",
        &[(TokenType::NUMBER(1.0), "1"), (TokenType::EOF, "")],
    );
}

#[test]
fn test_unexpected_chars_token_sequence() {
    let results = scan(",.$(#");

    // We expect this sequence:
    // 0: COMMA ','
    // 1: DOT '.'
    // 2: Error for '$'
    // 3: LEFT_PAREN '('
    // 4: Error for '#'
    // 5: EOF
    assert_eq!(results.len(), 6, "Expected 6 items in result");

    assert_token_matches(&results[0], TokenType::COMMA, ",");
    assert_token_matches(&results[1], TokenType::DOT, ".");
    assert_token_matches(&results[3], TokenType::LEFT_PAREN, "(");
    assert_token_matches(&results[5], TokenType::EOF, "");

    let error_count = results.iter().filter(|r| r.is_err()).count();
    assert_eq!(error_count, 2, "Expected 2 error messages");

    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert_eq!(err.message, "Unexpected character.");
    }

    fn assert_token_matches(
        result: &Result<Token, ScanError>,
        expected_type: TokenType,
        expected_lexeme: &str,
    ) {
        match result {
            Ok(token) => {
                assert_eq!(token.token_type, expected_type);
                assert_eq!(token.lexeme, expected_lexeme);
            }
            Err(e) => panic!("Expected token but got error: {}", e),
        }
    }
}

#[test]
fn test_scanner_10_line_numbers() {
    let tokens: Vec<_> = scan("1\n2\n\n3").into_iter().map(Result::unwrap).collect();

    assert_eq!(tokens[0].line, 1);
    assert_eq!(tokens[1].line, 2);
    assert_eq!(tokens[2].line, 4);
}
