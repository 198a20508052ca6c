use super::error::ParseError;
use crate::grammar::Grammar;
use crate::rules::Rule;
use crate::state::State;
use crate::symbols::TerminalCode;
use crate::utils::Span;

/// What the driver needs from a scanner token
pub trait GrammarToken {
    fn terminal(&self) -> TerminalCode;
    fn span(&self) -> Span;
    /// Short user-facing description, e.g. `'+'` or `identifier "abc"`
    fn describe(&self) -> String;
}

/// One entry of the parse stack: a shifted token or a synthesized value
#[derive(Debug, Clone, PartialEq)]
pub enum Element<T, V> {
    Token(T),
    Value { value: V, span: Span },
}

impl<T: GrammarToken, V> Element<T, V> {
    pub fn span(&self) -> Span {
        match self {
            Element::Token(token) => token.span(),
            Element::Value { span, .. } => *span,
        }
    }

    pub fn as_token(&self) -> Option<&T> {
        match self {
            Element::Token(token) => Some(token),
            Element::Value { .. } => None,
        }
    }

    pub fn into_value(self) -> Option<V> {
        match self {
            Element::Value { value, .. } => Some(value),
            Element::Token(_) => None,
        }
    }
}

/// Grammar-specific reduction callback
pub trait Reduction {
    type Token: GrammarToken;
    type Value;
    type Error: From<ParseError>;

    /// Build the value for `rule` from the popped right-hand side.
    /// `span` covers every popped element.
    fn apply_rule(
        &mut self,
        rule: &Rule,
        elements: Vec<Element<Self::Token, Self::Value>>,
        span: Span,
    ) -> Result<Self::Value, Self::Error>;
}

/// Generic LR driver over a configured [`Grammar`]
pub struct Parser<'g, T, V> {
    grammar: &'g Grammar,
    states: Vec<usize>,
    elements: Vec<Element<T, V>>,
    result: Option<V>,
    accepted: bool,
    max_depth: Option<usize>,
}

impl<'g, T: GrammarToken, V> Parser<'g, T, V> {
    pub fn new(grammar: &'g Grammar) -> Result<Self, ParseError> {
        grammar
            .ensure_configured()
            .map_err(|_| ParseError::NotConfigured {
                grammar: grammar.name().to_string(),
            })?;
        Ok(Self {
            grammar,
            states: vec![0],
            elements: Vec::new(),
            result: None,
            accepted: false,
            max_depth: None,
        })
    }

    /// Bound the number of stacked elements
    pub fn with_max_depth(mut self, limit: usize) -> Self {
        self.max_depth = Some(limit);
        self
    }

    pub fn reset(&mut self) {
        self.states.clear();
        self.states.push(0);
        self.elements.clear();
        self.result = None;
        self.accepted = false;
    }

    /// True once the start rule has been reduced
    pub fn accepted(&self) -> bool {
        self.accepted
    }

    /// Root value, available after acceptance
    pub fn finish(self) -> Option<V> {
        self.result
    }

    pub fn depth(&self) -> usize {
        self.elements.len()
    }

    /// Shift `token`, first performing every reduction its lookahead calls for.
    pub fn parse_one_token<R>(&mut self, token: T, reducer: &mut R) -> Result<(), R::Error>
    where
        R: Reduction<Token = T, Value = V>,
    {
        if self.accepted {
            return Err(ParseError::TrailingInput { span: token.span() }.into());
        }
        let grammar = self.grammar;
        let symbol = grammar
            .dictionary()
            .lookup_terminal(token.terminal())
            .ok_or_else(|| ParseError::UnknownTerminal {
                code: token.terminal(),
                span: token.span(),
            })?;

        loop {
            let top = self.top_state()?;

            if let Some(next) = top.shift_target(symbol) {
                if let Some(limit) = self.max_depth {
                    if self.elements.len() >= limit {
                        return Err(ParseError::StackOverflow {
                            limit,
                            span: token.span(),
                        }
                        .into());
                    }
                }
                self.states.push(next);
                self.elements.push(Element::Token(token));
                return Ok(());
            }

            let Some(rule_index) = top.reduce_rule(symbol) else {
                return Err(ParseError::UnexpectedToken {
                    found: token.describe(),
                    span: token.span(),
                }
                .into());
            };
            let rule = grammar.rule(rule_index).ok_or_else(|| ParseError::Internal {
                message: format!("reduce by missing rule {}", rule_index),
            })?;

            let popped = self.pop(rule.len())?;
            let span = popped
                .iter()
                .map(Element::span)
                .reduce(Span::merge)
                .unwrap_or_else(|| Span::empty_at(token.span().start));

            if rule_index == 0 {
                self.result = popped.into_iter().next().and_then(Element::into_value);
                self.accepted = true;
                return Ok(());
            }

            let value = reducer.apply_rule(rule, popped, span)?;
            let goto = self
                .top_state()?
                .shift_target(rule.lhs())
                .ok_or_else(|| ParseError::Internal {
                    message: format!("no goto on {}", grammar.dictionary().name(rule.lhs())),
                })?;
            self.states.push(goto);
            self.elements.push(Element::Value { value, span });
        }
    }

    fn top_state(&self) -> Result<&'g State, ParseError> {
        let index = self.states.last().copied().unwrap_or(0);
        self.grammar.state(index).ok_or_else(|| ParseError::Internal {
            message: format!("missing state {}", index),
        })
    }

    fn pop(&mut self, count: usize) -> Result<Vec<Element<T, V>>, ParseError> {
        if count > self.elements.len() || count >= self.states.len() {
            return Err(ParseError::Internal {
                message: format!("stack underflow popping {} elements", count),
            });
        }
        let at = self.elements.len() - count;
        self.states.truncate(self.states.len() - count);
        Ok(self.elements.split_off(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Associativity;
    use crate::symbols::{Dictionary, EOF_CODE};
    use crate::utils::Position;
    use assert_matches::assert_matches;

    #[derive(Debug, Clone)]
    struct Tok {
        ch: char,
        span: Span,
    }

    impl GrammarToken for Tok {
        fn terminal(&self) -> TerminalCode {
            if self.ch == '\0' {
                EOF_CODE
            } else {
                self.ch as TerminalCode
            }
        }
        fn span(&self) -> Span {
            self.span
        }
        fn describe(&self) -> String {
            format!("'{}'", self.ch)
        }
    }

    /// Builds a fully parenthesized rendering of the input
    struct Render;

    impl Reduction for Render {
        type Token = Tok;
        type Value = String;
        type Error = ParseError;

        fn apply_rule(
            &mut self,
            rule: &Rule,
            elements: Vec<Element<Tok, String>>,
            _span: Span,
        ) -> Result<String, ParseError> {
            let parts: Vec<String> = elements
                .into_iter()
                .map(|e| match e {
                    Element::Token(t) => t.ch.to_string(),
                    Element::Value { value, .. } => value,
                })
                .collect();
            Ok(match rule.id() {
                0 | 1 | 2 => format!("({})", parts.concat()),
                _ => parts.concat(),
            })
        }
    }

    fn grammar() -> Grammar {
        let mut dict = Dictionary::new();
        let e = dict.nonterminal("E");
        let minus = dict.char_terminal('-');
        let caret = dict.char_terminal('^');
        let star = dict.char_terminal('*');
        let x = dict.char_terminal('x');
        let mut grammar = Grammar::new("calc", dict);
        grammar.set_start_symbol(e);
        grammar.add_rule(Rule::new(0, e).with_rhs([e, minus, e]));
        grammar.add_rule(Rule::new(1, e).with_rhs([e, caret, e]));
        grammar.add_rule(Rule::new(2, e).with_rhs([e, star, e]));
        grammar.add_rule(Rule::new(3, e).then(x));
        grammar.set_prec(minus, 1);
        grammar.set_prec(star, 2);
        grammar.set_prec(caret, 3);
        grammar.set_assoc(minus, Associativity::Left);
        grammar.set_assoc(star, Associativity::Left);
        grammar.set_assoc(caret, Associativity::Right);
        grammar.configure().unwrap();
        grammar
    }

    fn tokens(text: &str) -> Vec<Tok> {
        let mut pos = Position::start();
        let mut out = Vec::new();
        for ch in text.chars() {
            let next = pos.advance(ch);
            out.push(Tok {
                ch,
                span: Span::new(pos, next),
            });
            pos = next;
        }
        out.push(Tok {
            ch: '\0',
            span: Span::empty_at(pos),
        });
        out
    }

    fn parse(grammar: &Grammar, text: &str) -> Result<String, ParseError> {
        let mut parser = Parser::new(grammar)?;
        for token in tokens(text) {
            parser.parse_one_token(token, &mut Render)?;
            if parser.accepted() {
                break;
            }
        }
        parser.finish().ok_or(ParseError::Internal {
            message: "not accepted".into(),
        })
    }

    #[test]
    fn test_left_and_right_associativity() {
        let g = grammar();
        assert_eq!(parse(&g, "x-x-x").unwrap(), "((x-x)-x)");
        assert_eq!(parse(&g, "x^x^x").unwrap(), "(x^(x^x))");
    }

    #[test]
    fn test_precedence_between_operators() {
        let g = grammar();
        assert_eq!(parse(&g, "x-x*x").unwrap(), "(x-(x*x))");
        assert_eq!(parse(&g, "x*x^x-x").unwrap(), "((x*(x^x))-x)");
    }

    #[test]
    fn test_unexpected_token_reports_span() {
        let g = grammar();
        let err = parse(&g, "x--x").unwrap_err();
        assert_matches!(err, ParseError::UnexpectedToken { ref found, span } if found == "'-'" && span.start.column == 3);
    }

    #[test]
    fn test_unknown_terminal() {
        let g = grammar();
        assert_matches!(parse(&g, "x+x"), Err(ParseError::UnknownTerminal { code, .. }) if code == '+' as u32);
    }

    #[test]
    fn test_unconfigured_grammar_is_refused() {
        let mut dict = Dictionary::new();
        let e = dict.nonterminal("E");
        let mut g = Grammar::new("raw", dict);
        g.set_start_symbol(e);
        assert_matches!(
            Parser::<Tok, String>::new(&g).err(),
            Some(ParseError::NotConfigured { .. })
        );
    }

    #[test]
    fn test_depth_limit() {
        let g = grammar();
        let mut parser = Parser::<Tok, String>::new(&g).unwrap().with_max_depth(3);
        let mut result = Ok(());
        for token in tokens("x-x-x") {
            result = parser.parse_one_token(token, &mut Render);
            if result.is_err() {
                break;
            }
        }
        // left-associative input never stacks more than three elements
        assert!(result.is_ok());

        let mut parser = Parser::<Tok, String>::new(&g).unwrap().with_max_depth(3);
        let mut failure = None;
        for token in tokens("x^x^x") {
            if let Err(e) = parser.parse_one_token(token, &mut Render) {
                failure = Some(e);
                break;
            }
        }
        assert_matches!(failure, Some(ParseError::StackOverflow { limit: 3, .. }));
    }
}
