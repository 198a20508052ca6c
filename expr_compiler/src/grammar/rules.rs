//! Productions, precedence and associativity of the expression language
//!
//! Rules are numbered per left-hand side; [`crate::syntax`] dispatches its
//! reductions on (non-terminal, rule id), so the order of `add` calls for one
//! non-terminal is part of the contract.
//!
//! The build script compiles this file on its own to generate parse tables,
//! so it only depends on `expr_grammar` and its two sibling modules.

use super::nonterminals::NonTerminal;
use super::terminal;
use expr_grammar::{Associativity, Dictionary, Grammar, Rule, SymbolId};
use std::collections::HashMap;

pub const GRAMMAR_NAME: &str = "ExprGrammar";

/// Precedence levels, lowest binding first
pub mod precedence {
    pub const AND: u32 = 1;
    pub const ADDITIVE: u32 = 2;
    pub const MULTIPLICATIVE: u32 = 3;
    pub const UNARY: u32 = 4;
    pub const POWER: u32 = 5;
    pub const INDEX: u32 = 6;
}

struct Builder {
    grammar: Grammar,
    nonterminals: HashMap<NonTerminal, SymbolId>,
    chars: HashMap<char, SymbolId>,
    ident: SymbolId,
    integer: SymbolId,
    float: SymbolId,
    string: SymbolId,
    boolean: SymbolId,
}

/// One right-hand-side element while writing rules
#[derive(Clone, Copy)]
enum Sym {
    N(NonTerminal),
    C(char),
    Ident,
    Integer,
    Float,
    Str,
    Bool,
}

impl Builder {
    fn new() -> Self {
        let mut dictionary = Dictionary::new();
        let mut chars = HashMap::new();
        for &ch in terminal::PUNCTUATION {
            chars.insert(ch, dictionary.char_terminal(ch));
        }
        let ident = dictionary.terminal(terminal::IDENTIFIER, "Identifier");
        let integer = dictionary.terminal(terminal::INTEGER, "Integer");
        let float = dictionary.terminal(terminal::FLOAT, "Float");
        let string = dictionary.terminal(terminal::STRING, "String");
        let boolean = dictionary.terminal(terminal::BOOL, "Bool");
        // Registered so scanned spaces map to a known terminal; no rule uses it
        dictionary.terminal(terminal::SPACE, "Space");

        let nonterminals = NonTerminal::ALL
            .iter()
            .map(|&nt| (nt, dictionary.nonterminal(nt.as_str())))
            .collect();

        Self {
            grammar: Grammar::new(GRAMMAR_NAME, dictionary),
            nonterminals,
            chars,
            ident,
            integer,
            float,
            string,
            boolean,
        }
    }

    fn nt(&self, nt: NonTerminal) -> SymbolId {
        self.nonterminals[&nt]
    }

    fn ch(&self, ch: char) -> SymbolId {
        self.chars[&ch]
    }

    fn symbol(&self, sym: Sym) -> SymbolId {
        match sym {
            Sym::N(nt) => self.nt(nt),
            Sym::C(ch) => self.ch(ch),
            Sym::Ident => self.ident,
            Sym::Integer => self.integer,
            Sym::Float => self.float,
            Sym::Str => self.string,
            Sym::Bool => self.boolean,
        }
    }

    fn rule(&self, id: u32, lhs: NonTerminal, rhs: &[Sym]) -> Rule {
        Rule::new(id, self.nt(lhs)).with_rhs(rhs.iter().map(|&s| self.symbol(s)))
    }

    fn add(&mut self, id: u32, lhs: NonTerminal, rhs: &[Sym]) {
        let rule = self.rule(id, lhs, rhs);
        self.grammar.add_rule(rule);
    }

    fn add_with_prec(&mut self, id: u32, lhs: NonTerminal, rhs: &[Sym], prec: u32) {
        let rule = self.rule(id, lhs, rhs);
        self.grammar.add_rule_with_prec(rule, prec);
    }

    fn operator(&mut self, ch: char, level: u32, assoc: Associativity) {
        let symbol = self.ch(ch);
        self.grammar.set_prec(symbol, level);
        self.grammar.set_assoc(symbol, assoc);
    }
}

/// Build the expression grammar without configuring it
pub fn build_expression_grammar() -> Grammar {
    use NonTerminal::*;
    use Sym::{Bool as B, Float as F, Ident as I, Integer as Int, Str as S, C, N};

    let mut b = Builder::new();
    let e = N(Expr);

    b.add(0, Expr, &[e, C('+'), e]);
    b.add(1, Expr, &[e, C('-'), e]);
    b.add(2, Expr, &[e, C('*'), e]);
    b.add(3, Expr, &[e, C('/'), e]);
    b.add(4, Expr, &[e, C('^'), e]);
    b.add(5, Expr, &[e, C('%'), e]);
    b.add_with_prec(6, Expr, &[e, C('['), Int, C(']')], precedence::INDEX);
    b.add_with_prec(7, Expr, &[C('-'), e], precedence::UNARY);
    b.add(8, Expr, &[C('('), e, C(')')]);
    b.add(9, Expr, &[N(Constant)]);
    b.add(10, Expr, &[N(Vector)]);
    b.add(11, Expr, &[N(Function)]);
    b.add(12, Expr, &[N(Variable)]);
    b.add(15, Expr, &[e, C('&'), e]);

    b.add(0, Constant, &[Int]);
    b.add(1, Constant, &[F]);
    b.add(2, Constant, &[S]);
    b.add(3, Constant, &[B]);

    b.add(0, Vector, &[C('{'), e, C(','), e, C('}')]);
    b.add(1, Vector, &[C('{'), e, C(','), e, C(','), e, C('}')]);

    b.add(0, List, &[C('['), N(ListElems), C(']')]);

    b.add(0, ListElems, &[N(ListElems), C(','), N(ListElem)]);
    b.add(1, ListElems, &[N(ListElem)]);

    b.add(0, ListElem, &[e]);
    b.add(1, ListElem, &[e, C(':'), e]);
    b.add(2, ListElem, &[e, C(':'), e, C(':'), e]);

    b.add(0, Function, &[I, C('('), C(')')]);
    b.add(1, Function, &[I, C('('), N(Args), C(')')]);

    b.add(0, Args, &[N(Args), C(','), N(Arg)]);
    b.add(1, Args, &[N(Arg)]);

    b.add(0, Arg, &[e]);
    b.add(1, Arg, &[I, C('='), e]);
    b.add(2, Arg, &[N(List)]);

    b.add(0, PathSpec, &[N(PathSpec), N(MultiSlash), I]);
    b.add(1, PathSpec, &[N(MultiSlash), I]);
    b.add(2, PathSpec, &[I]);

    b.add(0, MultiSlash, &[N(MultiSlash), C('/')]);
    b.add(1, MultiSlash, &[C('/')]);
    b.add(2, MultiSlash, &[N(MultiSlash), C('\\')]);
    b.add(3, MultiSlash, &[C('\\')]);

    b.add(0, Variable, &[I]);
    b.add(1, Variable, &[C('<'), N(PathSpec), C('>')]);
    b.add(2, Variable, &[C('<'), N(DBSpec), C(':'), N(PathSpec), C('>')]);

    b.add(0, DBSpec, &[N(PathSpec)]);
    b.add(1, DBSpec, &[N(PathSpec), N(MachSpec)]);
    b.add(2, DBSpec, &[N(TimeSpec)]);
    b.add(3, DBSpec, &[N(PathSpec), N(TimeSpec)]);
    b.add(4, DBSpec, &[N(PathSpec), N(MachSpec), N(TimeSpec)]);

    b.add(0, MachSpec, &[C('@'), I]);

    b.add(0, TimeSpec, &[C('['), N(ListElems), C(']'), I]);
    b.add(1, TimeSpec, &[C('['), N(ListElems), C(']')]);
    b.add(2, TimeSpec, &[C('['), C('#'), N(ListElems), C(']')]);

    b.operator('&', precedence::AND, Associativity::Left);
    b.operator('+', precedence::ADDITIVE, Associativity::Left);
    b.operator('-', precedence::ADDITIVE, Associativity::Left);
    b.operator('*', precedence::MULTIPLICATIVE, Associativity::Left);
    b.operator('/', precedence::MULTIPLICATIVE, Associativity::Left);
    b.operator('%', precedence::MULTIPLICATIVE, Associativity::Left);
    b.operator('^', precedence::POWER, Associativity::Right);
    b.operator('[', precedence::INDEX, Associativity::Left);

    let start = b.nt(Expr);
    b.grammar.set_start_symbol(start);
    b.grammar
}
