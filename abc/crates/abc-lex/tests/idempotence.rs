//! Property: re-lexing any suffix of the source reproduces the same
//! tokenization as lexing that suffix from scratch. This is the one place
//! the lexer backtracks (the multi-word comparison scan) so it is the one
//! place an off-by-one in snapshot/restore would silently corrupt later
//! tokens without this check.

use abc_lex::{Lexer, TokenKind};
use abc_util::Handler;
use proptest::prelude::*;

fn kinds(src: &str) -> Vec<TokenKind> {
    let mut handler = Handler::new();
    Lexer::new(src, &mut handler)
        .tokenize()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn sentences() -> impl Strategy<Value = String> {
    let words = prop::collection::vec(
        prop_oneof![
            Just("declare".to_string()),
            Just("x".to_string()),
            Just("is".to_string()),
            Just("equal".to_string()),
            Just("less".to_string()),
            Just("than".to_string()),
            Just("or".to_string()),
            Just("to".to_string()),
            Just("be".to_string()),
            Just("5".to_string()),
            Just(",".to_string()),
            Just(".".to_string()),
        ],
        1..12,
    );
    words.prop_map(|ws| ws.join(" "))
}

proptest! {
    #[test]
    fn suffix_tokenization_matches_byte_boundaries(src in sentences()) {
        let mut handler = Handler::new();
        let tokens = Lexer::new(&src, &mut handler).tokenize();

        // Re-lexing from each token boundary must reproduce the remaining
        // token kinds exactly.
        let mut byte_offset = 0usize;
        for (i, tok) in tokens.iter().enumerate() {
            if tok.text.is_empty() {
                continue;
            }
            if let Some(pos) = src[byte_offset..].find(&tok.text) {
                byte_offset += pos;
            }
            let suffix = &src[byte_offset..];
            let suffix_kinds = kinds(suffix);
            let original_kinds: Vec<_> = tokens[i..].iter().map(|t| t.kind.clone()).collect();
            prop_assert_eq!(suffix_kinds, original_kinds);
            byte_offset += tok.text.len();
        }
    }
}
