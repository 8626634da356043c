//! Lexical analysis for the sentence-shaped language: turns source text
//! into a token stream, including the multi-word comparison-operator
//! fusion documented in [`lexer`].

pub mod cursor;
pub mod lexer;
pub mod token;

pub use cursor::Cursor;
pub use lexer::Lexer;
pub use token::{CompareOp, Keyword, Token, TokenKind};

#[cfg(test)]
mod tests {
    use super::*;
    use abc_util::Handler;

    fn lex(src: &str) -> Vec<Token> {
        let mut handler = Handler::new();
        Lexer::new(src, &mut handler).tokenize()
    }

    #[test]
    fn lexes_simple_declaration() {
        let toks = lex("Declare x to be 5.");
        let kinds: Vec<_> = toks.iter().map(|t| t.kind.clone()).collect();
        assert!(matches!(kinds[0], TokenKind::Keyword(Keyword::Declare)));
        assert!(matches!(kinds[1], TokenKind::Ident(_)));
        assert!(matches!(kinds[2], TokenKind::Keyword(Keyword::To)));
        assert!(matches!(kinds[3], TokenKind::Keyword(Keyword::Be)));
        assert!(matches!(kinds[4], TokenKind::Number(n) if n == 5.0));
        assert!(matches!(kinds[5], TokenKind::Period));
        assert!(matches!(kinds.last().unwrap(), TokenKind::Eof));
    }

    #[test]
    fn fuses_is_equal_to() {
        let toks = lex("x is equal to y");
        assert!(matches!(toks[1].kind, TokenKind::Compare(CompareOp::Eq)));
        assert_eq!(toks[1].text, "is equal to");
    }

    #[test]
    fn fuses_longest_prefix_is_less_than_or_equal_to() {
        let toks = lex("x is less than or equal to y");
        assert!(matches!(toks[1].kind, TokenKind::Compare(CompareOp::Le)));
    }

    #[test]
    fn fuses_is_not_equal_to() {
        let toks = lex("x is not equal to y");
        assert!(matches!(toks[1].kind, TokenKind::Compare(CompareOp::Ne)));
    }

    #[test]
    fn bare_is_rolls_back_to_keyword() {
        // "is" followed by a non-matching word must roll back cleanly and
        // yield the plain IS keyword, not swallow "banana".
        let toks = lex("x is banana");
        assert!(matches!(toks[1].kind, TokenKind::Keyword(Keyword::Is)));
        assert!(matches!(toks[2].kind, TokenKind::Ident(_)));
    }

    #[test]
    fn is_scan_stops_at_comma() {
        let toks = lex("x is, y");
        assert!(matches!(toks[1].kind, TokenKind::Keyword(Keyword::Is)));
        assert!(matches!(toks[2].kind, TokenKind::Comma));
    }

    #[test]
    fn possessive_suffix_preserved_in_text() {
        let toks = lex("dogs's name");
        assert_eq!(toks[0].text, "dogs's");
    }

    #[test]
    fn number_literal_requires_digit_after_dot() {
        let toks = lex("5. Print");
        // The dot here terminates the statement, not a decimal point.
        assert!(matches!(toks[0].kind, TokenKind::Number(n) if n == 5.0));
        assert!(matches!(toks[1].kind, TokenKind::Period));
    }

    #[test]
    fn decimal_number_literal() {
        let toks = lex("3.14");
        assert!(matches!(toks[0].kind, TokenKind::Number(n) if (n - 3.14).abs() < 1e-9));
    }

    #[test]
    fn line_comment_skipped() {
        let toks = lex("Declare x to be 5. # a comment\nPrint x.");
        assert!(toks.iter().any(|t| matches!(t.kind, TokenKind::Keyword(Keyword::Print))));
    }

    #[test]
    fn unrecognized_byte_becomes_error_token_and_continues() {
        let toks = lex("x @ y");
        assert!(matches!(toks[1].kind, TokenKind::Error(_)));
        assert!(matches!(toks[2].kind, TokenKind::Ident(_)));
    }

    #[test]
    fn string_literal_single_and_double_quotes() {
        let toks = lex(r#"print "hi", 'yo'."#);
        assert!(matches!(toks[1].kind, TokenKind::String(s) if s.as_str() == "hi"));
        assert!(matches!(toks[3].kind, TokenKind::String(s) if s.as_str() == "yo"));
    }

    #[test]
    fn line_and_column_tracking_resets_on_newline() {
        let toks = lex("a\nb");
        assert_eq!(toks[0].line, 1);
        assert_eq!(toks[1].line, 2);
        assert_eq!(toks[1].col, 0);
    }
}
