//! A `nom`-based tokenizer for XPath expressions and the seekable token
//! stream replacement strategies operate on.

use crate::error::XPathError;
use crate::token::{Token, TokenKind};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1},
    combinator::{map, opt, recognize},
    sequence::{delimited, pair},
};
use std::ops::Range;

type Lexed<'a> = (TokenKind, &'a str);

/// An ordered token sequence with a read cursor.
///
/// Seeking past the end parks the cursor in a terminal state where
/// [`Lexer::current`] returns `None`.
#[derive(Debug, Clone)]
pub struct Lexer {
    source: String,
    tokens: Vec<Token>,
    cursor: usize,
}

impl Lexer {
    /// Tokenizes `source`.
    ///
    /// Unterminated string literals and unbalanced or mismatched `()`/`[]`
    /// are errors. Characters that start no known token become
    /// [`TokenKind::Unknown`] tokens and pass through untouched.
    pub fn tokenize(source: &str) -> Result<Self, XPathError> {
        let mut tokens = Vec::new();
        let mut open: Vec<(char, usize)> = Vec::new();
        let mut rest = source;

        loop {
            let trimmed = rest.trim_start_matches(is_xml_whitespace);
            let preceded_by_whitespace = trimmed.len() < rest.len();
            rest = trimmed;
            if rest.is_empty() {
                break;
            }
            let offset = source.len() - rest.len();

            let (remaining, (kind, text)) = match token(rest) {
                Ok(lexed) => lexed,
                Err(_) if rest.starts_with(['\'', '"']) => {
                    return Err(XPathError::UnterminatedLiteral {
                        expression: source.to_string(),
                        offset,
                    });
                }
                Err(_) => {
                    let width = rest.chars().next().map_or(1, char::len_utf8);
                    (&rest[width..], (TokenKind::Unknown, &rest[..width]))
                }
            };

            match kind {
                TokenKind::LeftParen => open.push(('(', offset)),
                TokenKind::LeftBracket => open.push(('[', offset)),
                TokenKind::RightParen | TokenKind::RightBracket => {
                    let (opening, closing) = if kind == TokenKind::RightParen {
                        ('(', ')')
                    } else {
                        ('[', ']')
                    };
                    match open.pop() {
                        Some((found, _)) if found == opening => {}
                        _ => {
                            return Err(XPathError::UnbalancedBracket {
                                expression: source.to_string(),
                                delimiter: closing,
                                offset,
                            });
                        }
                    }
                }
                _ => {}
            }

            tokens.push(Token {
                kind,
                text: text.to_string(),
                offset: Some(offset),
                preceded_by_whitespace,
            });
            rest = remaining;
        }

        if let Some((delimiter, offset)) = open.pop() {
            return Err(XPathError::UnbalancedBracket {
                expression: source.to_string(),
                delimiter,
                offset,
            });
        }

        log::trace!("Tokenized '{}' into {} tokens", source, tokens.len());
        Ok(Self {
            source: source.to_string(),
            tokens,
            cursor: 0,
        })
    }

    /// The expression this stream was lexed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Current cursor index.
    pub fn key(&self) -> usize {
        self.cursor
    }

    /// Moves the cursor to an absolute index, clamped to the end.
    pub fn seek(&mut self, index: usize) {
        self.cursor = index.min(self.tokens.len());
    }

    pub fn advance(&mut self) {
        self.seek(self.cursor + 1);
    }

    pub fn current(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    /// Looks `offset` tokens ahead of the cursor without moving it.
    pub fn peek(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.cursor + offset)
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    /// Replaces `range` with `replacement`. Tokens outside the range are left
    /// alone; the cursor index is kept, clamped to the new length.
    pub fn splice(&mut self, range: Range<usize>, replacement: Vec<Token>) {
        let end = range.end.min(self.tokens.len());
        let start = range.start.min(end);
        self.tokens.splice(start..end, replacement);
        self.seek(self.cursor);
    }

    /// Renders the stream back to expression text.
    ///
    /// A single space is written wherever the source had whitespace, and
    /// between a synthetic token and a neighbour it would otherwise fuse with.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.source.len());
        let mut previous: Option<&Token> = None;
        for token in &self.tokens {
            if let Some(prev) = previous {
                let would_fuse = (prev.is_synthetic() || token.is_synthetic())
                    && prev.kind.is_word_like()
                    && token.kind.is_word_like();
                if token.preceded_by_whitespace || would_fuse {
                    out.push(' ');
                }
            }
            out.push_str(&token.text);
            previous = Some(token);
        }
        out
    }
}

fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

// --- Token Parsers ---

fn token(input: &str) -> IResult<&str, Lexed<'_>> {
    alt((
        string_literal,
        number_literal,
        variable_reference,
        punctuation,
        operator,
        name,
    ))
    .parse(input)
}

fn string_literal(input: &str) -> IResult<&str, Lexed<'_>> {
    map(
        recognize(alt((
            delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
        ))),
        |s| (TokenKind::StringLiteral, s),
    )
    .parse(input)
}

fn number_literal(input: &str) -> IResult<&str, Lexed<'_>> {
    map(
        alt((
            recognize((digit1, opt((char('.'), opt(digit1))))),
            recognize(pair(char('.'), digit1)),
        )),
        |s| (TokenKind::NumberLiteral, s),
    )
    .parse(input)
}

fn variable_reference(input: &str) -> IResult<&str, Lexed<'_>> {
    map(recognize(pair(char('$'), q_name)), |s| {
        (TokenKind::Variable, s)
    })
    .parse(input)
}

fn punctuation(input: &str) -> IResult<&str, Lexed<'_>> {
    alt((
        map(tag("//"), |s| (TokenKind::DoubleSlash, s)),
        map(tag("/"), |s| (TokenKind::Slash, s)),
        map(tag("::"), |s| (TokenKind::AxisSeparator, s)),
        map(tag(".."), |s| (TokenKind::DotDot, s)),
        map(tag("."), |s| (TokenKind::Dot, s)),
        map(tag("@"), |s| (TokenKind::At, s)),
        map(tag(","), |s| (TokenKind::Comma, s)),
        map(tag("("), |s| (TokenKind::LeftParen, s)),
        map(tag(")"), |s| (TokenKind::RightParen, s)),
        map(tag("["), |s| (TokenKind::LeftBracket, s)),
        map(tag("]"), |s| (TokenKind::RightBracket, s)),
        map(tag("*"), |s| (TokenKind::Star, s)),
    ))
    .parse(input)
}

fn operator(input: &str) -> IResult<&str, Lexed<'_>> {
    map(
        alt((
            tag("!="),
            tag("<="),
            tag(">="),
            tag("||"),
            tag("="),
            tag("<"),
            tag(">"),
            tag("+"),
            tag("-"),
            tag("|"),
            tag("!"),
        )),
        |s| (TokenKind::Operator, s),
    )
    .parse(input)
}

fn name(input: &str) -> IResult<&str, Lexed<'_>> {
    map(q_name, |s| (TokenKind::Name, s)).parse(input)
}

// --- Name Parsers ---

fn nc_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '-' || c == '.'),
    ))
    .parse(input)
}

/// A qualified name, including the `prefix:*` wildcard form.
fn q_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(nc_name, opt(pair(char(':'), alt((nc_name, tag("*")))))))
        .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(expr: &str) -> Vec<(TokenKind, String)> {
        Lexer::tokenize(expr)
            .unwrap()
            .into_tokens()
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    fn texts(expr: &str) -> Vec<String> {
        kinds(expr).into_iter().map(|(_, t)| t).collect()
    }

    #[test]
    fn test_tokenize_function_call() {
        assert_eq!(
            kinds("count(current-group())"),
            vec![
                (TokenKind::Name, "count".to_string()),
                (TokenKind::LeftParen, "(".to_string()),
                (TokenKind::Name, "current-group".to_string()),
                (TokenKind::LeftParen, "(".to_string()),
                (TokenKind::RightParen, ")".to_string()),
                (TokenKind::RightParen, ")".to_string()),
            ]
        );
    }

    #[test]
    fn test_tokenize_paths_and_axes() {
        assert_eq!(
            texts("//foo/child::bar[@id = 'a']/.."),
            vec!["//", "foo", "/", "child", "::", "bar", "[", "@", "id", "=", "'a'", "]", "/", ".."]
        );
        assert_eq!(texts("xsl:*/*"), vec!["xsl:*", "/", "*"]);
    }

    #[test]
    fn test_tokenize_literals_and_variables() {
        assert_eq!(
            kinds("$x-1 + .5 * 10.25"),
            vec![
                (TokenKind::Variable, "$x-1".to_string()),
                (TokenKind::Operator, "+".to_string()),
                (TokenKind::NumberLiteral, ".5".to_string()),
                (TokenKind::Star, "*".to_string()),
                (TokenKind::NumberLiteral, "10.25".to_string()),
            ]
        );
        assert_eq!(texts(r#""a'b" != 'c'"#), vec![r#""a'b""#, "!=", "'c'"]);
    }

    #[test]
    fn test_trailing_decimal_keeps_fraction() {
        assert_eq!(texts("price * 1.5"), vec!["price", "*", "1.5"]);
        assert_eq!(texts("10.25"), vec!["10.25"]);
        assert_eq!(texts("1."), vec!["1."]);
        assert_eq!(Lexer::tokenize("@x > 0.5").unwrap().render(), "@x > 0.5");
    }

    #[test]
    fn test_tokenize_comparison_operators() {
        assert_eq!(
            texts("a<=b>=c<d>e||f"),
            vec!["a", "<=", "b", ">=", "c", "<", "d", ">", "e", "||", "f"]
        );
    }

    #[test]
    fn test_whitespace_recorded_not_kept() {
        let lexer = Lexer::tokenize("a  and\n b").unwrap();
        let tokens = lexer.tokens();
        assert_eq!(tokens.len(), 3);
        assert!(!tokens[0].preceded_by_whitespace);
        assert!(tokens[1].preceded_by_whitespace);
        assert!(tokens[2].preceded_by_whitespace);
        assert_eq!(tokens[2].offset, Some(8));
        assert_eq!(lexer.render(), "a and b");
    }

    #[test]
    fn test_unknown_characters_pass_through() {
        let lexer = Lexer::tokenize("map { 'a' : 1 }").unwrap();
        assert!(lexer.tokens().iter().any(|t| t.kind == TokenKind::Unknown && t.text == "{"));
        assert_eq!(lexer.render(), "map { 'a' : 1 }");
    }

    #[test]
    fn test_unterminated_literal() {
        let err = Lexer::tokenize("concat('abc, 1)").unwrap_err();
        assert_eq!(
            err,
            XPathError::UnterminatedLiteral {
                expression: "concat('abc, 1)".to_string(),
                offset: 7,
            }
        );
    }

    #[test]
    fn test_unbalanced_brackets() {
        let err = Lexer::tokenize("foo[1").unwrap_err();
        assert!(matches!(
            err,
            XPathError::UnbalancedBracket { delimiter: '[', offset: 3, .. }
        ));

        let err = Lexer::tokenize("foo)").unwrap_err();
        assert!(matches!(
            err,
            XPathError::UnbalancedBracket { delimiter: ')', offset: 3, .. }
        ));

        let err = Lexer::tokenize("f(a])").unwrap_err();
        assert!(matches!(
            err,
            XPathError::UnbalancedBracket { delimiter: ']', .. }
        ));
        assert_eq!(err.expression(), "f(a])");
    }

    #[test]
    fn test_seek_past_end_is_terminal() {
        let mut lexer = Lexer::tokenize("a/b").unwrap();
        lexer.seek(100);
        assert_eq!(lexer.key(), 3);
        assert!(lexer.is_at_end());
        assert!(lexer.current().is_none());
        assert!(lexer.peek(1).is_none());

        lexer.seek(1);
        assert_eq!(lexer.current().map(|t| t.text.as_str()), Some("/"));
        assert_eq!(lexer.peek(1).map(|t| t.text.as_str()), Some("b"));
    }

    #[test]
    fn test_splice_leaves_outside_tokens_alone() {
        let mut lexer = Lexer::tokenize("a + f() + b").unwrap();
        lexer.splice(2..5, vec![Token::name("x"), Token::slash(), Token::name("y")]);
        let texts: Vec<_> = lexer.tokens().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "+", "x", "/", "y", "+", "b"]);
        assert_eq!(lexer.tokens()[0].offset, Some(0));
        assert_eq!(lexer.tokens()[6].offset, Some(10));
    }

    #[test]
    fn test_render_separates_synthetic_words() {
        let mut lexer = Lexer::tokenize("x").unwrap();
        lexer.splice(0..1, vec![Token::name("a"), Token::name("or"), Token::variable("b")]);
        assert_eq!(lexer.render(), "a or $b");
    }

    #[test]
    fn test_empty_expression() {
        let lexer = Lexer::tokenize("   ").unwrap();
        assert!(lexer.is_empty());
        assert!(lexer.is_at_end());
        assert_eq!(lexer.render(), "");
    }
}
