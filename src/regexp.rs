/*!
Regular expressions over automata.

A pattern parses into a tree of operator [`Node`]s, which compiles down
to an [`Automaton`] through the composition primitives. The syntax is the
classic union/concatenation/repetition core, extended (behind
[syntax flags](#constants)) with intersection `&`, complement `~`, the
empty language `#`, any string `@`, named automata `<name>` and decimal
intervals `<n-m>`:

```text
union      := inter ('|' inter)?
inter      := concat ('&' inter)?            (INTERSECTION)
concat     := repeat (concat)?
repeat     := compl ('?' | '*' | '+' | '{' n (',' m?)? '}')*
compl      := '~' compl                      (COMPLEMENT)
            | charclass
charclass  := '[' '^'? class+ ']' | simple
class      := charexp ('-' charexp)?
simple     := '.' | '#' | '@' | '"' chars '"' | '(' union? ')'
            | '<' name '>' | '<' n '-' m '>' | charexp
charexp    := '\' any-codepoint | any-codepoint
```

Turning a flag off strips the corresponding character of its special
meaning. The compiler minimizes after every composite lowering step and
charges repetition expansion against the caller's work limit, so
pathological patterns fail with `TooComplex` instead of exhausting
memory.
*/

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::automaton::Automaton;
use crate::error::{Error, Result};
use crate::operations;
use crate::primitives;

/// Syntax flag enabling the intersection operator `&`.
pub const INTERSECTION: u32 = 0x0001;
/// Syntax flag enabling the complement operator `~`.
pub const COMPLEMENT: u32 = 0x0002;
/// Syntax flag enabling the empty-language symbol `#`.
pub const EMPTY: u32 = 0x0004;
/// Syntax flag enabling the any-string symbol `@`.
pub const ANYSTRING: u32 = 0x0008;
/// Syntax flag enabling named automata `<name>`.
pub const AUTOMATON: u32 = 0x0010;
/// Syntax flag enabling decimal intervals `<n-m>`.
pub const INTERVAL: u32 = 0x0020;
/// All syntax flags.
pub const ALL: u32 = 0x00FF;
/// No optional syntax.
pub const NONE: u32 = 0x0000;
/// Match flag: ASCII characters match both their cases.
pub const ASCII_CASE_INSENSITIVE: u32 = 0x0100;

/// A node of the parsed regular expression tree. Nodes are immutable
/// after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// The union of two expressions.
    Union(Box<Node>, Box<Node>),
    /// A sequence of two expressions.
    Concatenation(Box<Node>, Box<Node>),
    /// The intersection of two expressions.
    Intersection(Box<Node>, Box<Node>),
    /// An optional expression.
    Optional(Box<Node>),
    /// An expression that repeats zero or more times.
    Repeat(Box<Node>),
    /// An expression that repeats a minimum number of times.
    RepeatMin(Box<Node>, u32),
    /// An expression that repeats between a minimum and maximum number of
    /// times.
    RepeatMinMax(Box<Node>, u32, u32),
    /// The complement of an expression.
    Complement(Box<Node>),
    /// A single character.
    Char(char),
    /// A character range.
    CharRange(char, char),
    /// Any single character.
    AnyChar,
    /// The empty language.
    Empty,
    /// A literal string.
    Literal(String),
    /// Any string.
    AnyString,
    /// A named automaton, resolved at compile time.
    Named(String),
    /// A decimal interval: numbers from `min` to `max`, zero-padded to
    /// `digits` width when nonzero.
    Interval {
        min: u32,
        max: u32,
        digits: usize,
    },
}

/// Resolves `<name>` references that are not satisfied by the map passed
/// to [`RegExp::to_automaton_with`].
pub trait AutomatonProvider {
    /// Return the automaton named `name`, or `None` when unknown.
    fn get_automaton(&self, name: &str) -> Result<Option<Automaton>>;
}

impl AutomatonProvider for HashMap<String, Automaton> {
    fn get_automaton(&self, name: &str) -> Result<Option<Automaton>> {
        Ok(self.get(name).cloned())
    }
}

/// A parsed regular expression.
#[derive(Clone, Debug)]
pub struct RegExp {
    node: Node,
    pattern: String,
    flags: u32,
}

impl RegExp {
    /// Parse `pattern` with all optional syntax enabled.
    pub fn new(pattern: &str) -> Result<RegExp> {
        RegExp::with_flags(pattern, ALL, 0)
    }

    /// Parse `pattern` with the given syntax flags (some subset of
    /// [`ALL`]) and match flags ([`ASCII_CASE_INSENSITIVE`] or 0).
    pub fn with_flags(pattern: &str, syntax_flags: u32, match_flags: u32) -> Result<RegExp> {
        if syntax_flags > ALL {
            return Err(Error::parse(0, "illegal syntax flag"));
        }
        if match_flags > 0 && match_flags <= ALL {
            return Err(Error::parse(0, "illegal match flag"));
        }
        let flags = syntax_flags | match_flags;
        let node = if pattern.is_empty() {
            Node::Literal(String::new())
        } else {
            let mut parser = Parser::new(pattern, flags);
            let node = parser.parse_union()?;
            if parser.pos < parser.chars.len() {
                return Err(Error::parse(parser.pos, "end-of-string expected"));
            }
            node
        };
        Ok(RegExp { node, pattern: pattern.to_string(), flags })
    }

    /// The root of the parsed operator tree.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// The pattern this expression was parsed from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Compile into an automaton, spending at most `work_limit` effort on
    /// determinization and repetition expansion.
    pub fn to_automaton(&self, work_limit: usize) -> Result<Automaton> {
        self.to_automaton_with(None, None, work_limit)
    }

    /// Like [`RegExp::to_automaton`], with named automata resolved first
    /// against `named` and then against `provider`.
    pub fn to_automaton_with(
        &self,
        named: Option<&HashMap<String, Automaton>>,
        provider: Option<&dyn AutomatonProvider>,
        work_limit: usize,
    ) -> Result<Automaton> {
        let ctx = Context { named, provider, work_limit, flags: self.flags };
        let a = compile(&self.node, &ctx)?;
        debug!("compiled /{}/ into {} states", self.pattern, a.num_states());
        Ok(a)
    }
}

impl fmt::Display for RegExp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.node)
    }
}

impl fmt::Display for Node {
    /// Renders the node back into pattern syntax, fully parenthesized.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Node::Union(ref e1, ref e2) => write!(f, "({}|{})", e1, e2),
            Node::Concatenation(ref e1, ref e2) => write!(f, "{}{}", e1, e2),
            Node::Intersection(ref e1, ref e2) => write!(f, "({}&{})", e1, e2),
            Node::Optional(ref e) => write!(f, "({})?", e),
            Node::Repeat(ref e) => write!(f, "({})*", e),
            Node::RepeatMin(ref e, min) => write!(f, "({}){{{},}}", e, min),
            Node::RepeatMinMax(ref e, min, max) => write!(f, "({}){{{},{}}}", e, min, max),
            Node::Complement(ref e) => write!(f, "~({})", e),
            Node::Char(c) => write!(f, "\\{}", c),
            Node::CharRange(from, to) => write!(f, "[\\{}-\\{}]", from, to),
            Node::AnyChar => write!(f, "."),
            Node::Empty => write!(f, "#"),
            Node::Literal(ref s) => write!(f, "\"{}\"", s),
            Node::AnyString => write!(f, "@"),
            Node::Named(ref name) => write!(f, "<{}>", name),
            Node::Interval { min, max, digits } => {
                write!(f, "<{:0w$}-{:0w$}>", min, max, w = digits)
            }
        }
    }
}

struct Context<'a> {
    named: Option<&'a HashMap<String, Automaton>>,
    provider: Option<&'a dyn AutomatonProvider>,
    work_limit: usize,
    flags: u32,
}

impl<'a> Context<'a> {
    fn case_insensitive(&self) -> bool {
        self.flags & ASCII_CASE_INSENSITIVE != 0
    }
}

fn compile(node: &Node, ctx: &Context) -> Result<Automaton> {
    match *node {
        Node::Union(ref e1, ref e2) => {
            let mut list = Vec::new();
            gather_union(e1, &mut list, ctx)?;
            gather_union(e2, &mut list, ctx)?;
            let refs: Vec<&Automaton> = list.iter().collect();
            operations::minimize(operations::union(&refs), ctx.work_limit)
        }
        Node::Concatenation(ref e1, ref e2) => {
            let mut list = Vec::new();
            gather_concatenation(e1, &mut list, ctx)?;
            gather_concatenation(e2, &mut list, ctx)?;
            let refs: Vec<&Automaton> = list.iter().collect();
            operations::minimize(operations::concatenate(&refs), ctx.work_limit)
        }
        Node::Intersection(ref e1, ref e2) => {
            let a1 = compile(e1, ctx)?;
            let a2 = compile(e2, ctx)?;
            operations::minimize(operations::intersection(&a1, &a2), ctx.work_limit)
        }
        Node::Optional(ref e) => {
            let a = compile(e, ctx)?;
            operations::minimize(operations::optional(&a), ctx.work_limit)
        }
        Node::Repeat(ref e) => {
            let a = compile(e, ctx)?;
            operations::minimize(operations::repeat(&a), ctx.work_limit)
        }
        Node::RepeatMin(ref e, min) => {
            let a = compile(e, ctx)?;
            let expansion = (a.num_states() as usize).saturating_sub(1) * min as usize;
            if expansion > ctx.work_limit {
                return Err(Error::too_complex(expansion));
            }
            operations::minimize(operations::repeat_count(&a, min), ctx.work_limit)
        }
        Node::RepeatMinMax(ref e, min, max) => {
            let a = compile(e, ctx)?;
            let expansion = (a.num_states() as usize).saturating_sub(1) * max as usize;
            if expansion > ctx.work_limit {
                return Err(Error::too_complex(expansion));
            }
            Ok(operations::repeat_range(&a, min, max))
        }
        Node::Complement(ref e) => {
            let a = compile(e, ctx)?;
            operations::minimize(operations::complement(a, ctx.work_limit)?, ctx.work_limit)
        }
        Node::Char(c) => {
            if ctx.case_insensitive() {
                case_insensitive_char(c, ctx.work_limit)
            } else {
                Ok(primitives::char(c as u32))
            }
        }
        Node::CharRange(from, to) => Ok(primitives::char_range(from as u32, to as u32)),
        Node::AnyChar => Ok(primitives::any_char()),
        Node::Empty => Ok(primitives::empty()),
        Node::Literal(ref s) => {
            if ctx.case_insensitive() {
                let list: Vec<Automaton> = s
                    .chars()
                    .map(|c| case_insensitive_char(c, ctx.work_limit))
                    .collect::<Result<_>>()?;
                let refs: Vec<&Automaton> = list.iter().collect();
                operations::minimize(operations::concatenate(&refs), ctx.work_limit)
            } else {
                Ok(primitives::string(s))
            }
        }
        Node::AnyString => Ok(primitives::any_string()),
        Node::Named(ref name) => {
            if let Some(map) = ctx.named {
                if let Some(a) = map.get(name) {
                    return Ok(a.clone());
                }
            }
            if let Some(provider) = ctx.provider {
                if let Some(a) = provider.get_automaton(name)? {
                    return Ok(a);
                }
            }
            Err(Error::unknown_automaton_name(name))
        }
        Node::Interval { min, max, digits } => {
            primitives::decimal_interval(min, max, digits as u32)
        }
    }
}

/// Flattens a left-leaning tree of unions into compiled operands.
fn gather_union(node: &Node, list: &mut Vec<Automaton>, ctx: &Context) -> Result<()> {
    if let Node::Union(ref e1, ref e2) = *node {
        gather_union(e1, list, ctx)?;
        gather_union(e2, list, ctx)?;
    } else {
        list.push(compile(node, ctx)?);
    }
    Ok(())
}

/// Flattens a left-leaning tree of concatenations into compiled operands.
fn gather_concatenation(node: &Node, list: &mut Vec<Automaton>, ctx: &Context) -> Result<()> {
    if let Node::Concatenation(ref e1, ref e2) = *node {
        gather_concatenation(e1, list, ctx)?;
        gather_concatenation(e2, list, ctx)?;
    } else {
        list.push(compile(node, ctx)?);
    }
    Ok(())
}

fn case_insensitive_char(c: char, work_limit: usize) -> Result<Automaton> {
    let base = primitives::char(c as u32);
    // Case pairs are handled for ASCII only.
    if c as u32 > 127 {
        return Ok(base);
    }
    let alt = if c.is_ascii_lowercase() {
        c.to_ascii_uppercase()
    } else {
        c.to_ascii_lowercase()
    };
    if alt == c {
        return Ok(base);
    }
    let other = primitives::char(alt as u32);
    operations::minimize(operations::union(&[&base, &other]), work_limit)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    flags: u32,
}

impl Parser {
    fn new(pattern: &str, flags: u32) -> Parser {
        Parser { chars: pattern.chars().collect(), pos: 0, flags }
    }

    fn more(&self) -> bool {
        self.pos < self.chars.len()
    }

    fn peek(&self, any_of: &str) -> bool {
        self.more() && any_of.contains(self.chars[self.pos])
    }

    fn eat(&mut self, c: char) -> bool {
        if self.more() && self.chars[self.pos] == c {
            self.pos += 1;
            return true;
        }
        false
    }

    fn next(&mut self) -> Result<char> {
        if !self.more() {
            return Err(Error::parse(self.pos, "unexpected end-of-string"));
        }
        let c = self.chars[self.pos];
        self.pos += 1;
        Ok(c)
    }

    fn check(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    // The three list-shaped productions iterate instead of recursing, so
    // pattern length never translates into stack depth; only explicit
    // nesting does.

    fn parse_union(&mut self) -> Result<Node> {
        let mut e = self.parse_inter()?;
        while self.eat('|') {
            e = Node::Union(Box::new(e), Box::new(self.parse_inter()?));
        }
        Ok(e)
    }

    fn parse_inter(&mut self) -> Result<Node> {
        let mut e = self.parse_concat()?;
        while self.check(INTERSECTION) && self.eat('&') {
            e = Node::Intersection(Box::new(e), Box::new(self.parse_concat()?));
        }
        Ok(e)
    }

    fn parse_concat(&mut self) -> Result<Node> {
        let mut e = self.parse_repeat()?;
        while self.more() && !self.peek(")|") && (!self.check(INTERSECTION) || !self.peek("&")) {
            e = make_concatenation(e, self.parse_repeat()?);
        }
        Ok(e)
    }

    fn parse_repeat(&mut self) -> Result<Node> {
        let mut e = self.parse_compl()?;
        while self.peek("?*+{") {
            if self.eat('?') {
                e = Node::Optional(Box::new(e));
            } else if self.eat('*') {
                e = Node::Repeat(Box::new(e));
            } else if self.eat('+') {
                e = Node::RepeatMin(Box::new(e), 1);
            } else if self.eat('{') {
                let n = self.parse_integer()?;
                let m = if self.eat(',') {
                    if self.peek("0123456789") { Some(self.parse_integer()?) } else { None }
                } else {
                    Some(n)
                };
                if !self.eat('}') {
                    return Err(Error::parse(self.pos, "expected '}'"));
                }
                e = match m {
                    None => Node::RepeatMin(Box::new(e), n),
                    Some(m) => Node::RepeatMinMax(Box::new(e), n, m),
                };
            }
        }
        Ok(e)
    }

    fn parse_integer(&mut self) -> Result<u32> {
        let start = self.pos;
        while self.peek("0123456789") {
            self.next()?;
        }
        if start == self.pos {
            return Err(Error::parse(self.pos, "integer expected"));
        }
        let digits: String = self.chars[start..self.pos].iter().collect();
        digits.parse().map_err(|_| Error::parse(start, "integer expected"))
    }

    fn parse_compl(&mut self) -> Result<Node> {
        if self.check(COMPLEMENT) && self.eat('~') {
            return Ok(Node::Complement(Box::new(self.parse_compl()?)));
        }
        self.parse_charclass_exp()
    }

    fn parse_charclass_exp(&mut self) -> Result<Node> {
        if self.eat('[') {
            let negate = self.eat('^');
            let mut e = self.parse_charclass()?;
            while self.more() && !self.peek("]") {
                e = Node::Union(Box::new(e), Box::new(self.parse_charclass()?));
            }
            if negate {
                e = Node::Intersection(
                    Box::new(Node::AnyChar),
                    Box::new(Node::Complement(Box::new(e))),
                );
            }
            if !self.eat(']') {
                return Err(Error::parse(self.pos, "expected ']'"));
            }
            return Ok(e);
        }
        self.parse_simple()
    }

    fn parse_charclass(&mut self) -> Result<Node> {
        let from = self.parse_charexp()?;
        if self.eat('-') {
            let to = self.parse_charexp()?;
            if from > to {
                return Err(Error::invalid_range(from as u32, to as u32));
            }
            return Ok(Node::CharRange(from, to));
        }
        Ok(Node::Char(from))
    }

    fn parse_simple(&mut self) -> Result<Node> {
        if self.eat('.') {
            return Ok(Node::AnyChar);
        }
        if self.check(EMPTY) && self.eat('#') {
            return Ok(Node::Empty);
        }
        if self.check(ANYSTRING) && self.eat('@') {
            return Ok(Node::AnyString);
        }
        if self.eat('"') {
            let start = self.pos;
            while self.more() && !self.peek("\"") {
                self.next()?;
            }
            if !self.eat('"') {
                return Err(Error::parse(self.pos, "expected '\"'"));
            }
            let literal: String = self.chars[start..self.pos - 1].iter().collect();
            return Ok(Node::Literal(literal));
        }
        if self.eat('(') {
            if self.eat(')') {
                return Ok(Node::Literal(String::new()));
            }
            let e = self.parse_union()?;
            if !self.eat(')') {
                return Err(Error::parse(self.pos, "expected ')'"));
            }
            return Ok(e);
        }
        if (self.check(AUTOMATON) || self.check(INTERVAL)) && self.eat('<') {
            return self.parse_named_or_interval();
        }
        Ok(Node::Char(self.parse_charexp()?))
    }

    fn parse_named_or_interval(&mut self) -> Result<Node> {
        let start = self.pos;
        while self.more() && !self.peek(">") {
            self.next()?;
        }
        if !self.eat('>') {
            return Err(Error::parse(self.pos, "expected '>'"));
        }
        let body: String = self.chars[start..self.pos - 1].iter().collect();
        match body.find('-') {
            None => {
                if !self.check(AUTOMATON) {
                    return Err(Error::parse(self.pos - 1, "interval syntax error"));
                }
                Ok(Node::Named(body))
            }
            Some(i) => {
                if !self.check(INTERVAL) {
                    return Err(Error::parse(self.pos - 1, "illegal identifier"));
                }
                if i == 0 || i == body.len() - 1 || i != body.rfind('-').unwrap_or(i) {
                    return Err(Error::parse(self.pos - 1, "interval syntax error"));
                }
                let (smin, smax) = (&body[..i], &body[i + 1..]);
                let imin: u32 = smin
                    .parse()
                    .map_err(|_| Error::parse(self.pos - 1, "interval syntax error"))?;
                let imax: u32 = smax
                    .parse()
                    .map_err(|_| Error::parse(self.pos - 1, "interval syntax error"))?;
                let digits = if smin.len() == smax.len() { smin.len() } else { 0 };
                let (imin, imax) = if imin > imax { (imax, imin) } else { (imin, imax) };
                Ok(Node::Interval { min: imin, max: imax, digits })
            }
        }
    }

    fn parse_charexp(&mut self) -> Result<char> {
        self.eat('\\');
        self.next()
    }
}

/// Concatenation constructor that folds adjacent character and string
/// operands into a single literal node.
fn make_concatenation(exp1: Node, exp2: Node) -> Node {
    fn literal_like(node: &Node) -> bool {
        matches!(node, Node::Char(_) | Node::Literal(_))
    }
    fn merge(e1: Node, e2: Node) -> Node {
        let mut s = String::new();
        for e in [e1, e2] {
            match e {
                Node::Char(c) => s.push(c),
                Node::Literal(t) => s.push_str(&t),
                _ => {}
            }
        }
        Node::Literal(s)
    }

    if literal_like(&exp1) && literal_like(&exp2) {
        return merge(exp1, exp2);
    }
    match (exp1, exp2) {
        (Node::Concatenation(a, b), e2) if literal_like(&b) && literal_like(&e2) => {
            Node::Concatenation(a, Box::new(merge(*b, e2)))
        }
        (e1, Node::Concatenation(a, b)) if literal_like(&e1) && literal_like(&a) => {
            Node::Concatenation(Box::new(merge(e1, *a)), b)
        }
        (e1, e2) => Node::Concatenation(Box::new(e1), Box::new(e2)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::run::run;

    const WORK: usize = operations::DEFAULT_DETERMINIZE_WORK_LIMIT;

    fn automaton(pattern: &str) -> Automaton {
        RegExp::new(pattern).unwrap().to_automaton(WORK).unwrap()
    }

    #[test]
    fn literal_concatenation_folds_into_string() {
        let re = RegExp::new("abc").unwrap();
        assert_eq!(&Node::Literal("abc".to_string()), re.node());
    }

    #[test]
    fn empty_pattern_accepts_empty_string() {
        let a = automaton("");
        assert!(run(&a, ""));
        assert!(!run(&a, "a"));
    }

    #[test]
    fn repetition_forms() {
        let a = automaton("ab?");
        assert!(run(&a, "a"));
        assert!(run(&a, "ab"));
        assert!(!run(&a, "abb"));

        let a = automaton("ab*");
        assert!(run(&a, "a"));
        assert!(run(&a, "abbb"));

        let a = automaton("ab+");
        assert!(!run(&a, "a"));
        assert!(run(&a, "ab"));

        let a = automaton("a{2,3}");
        assert!(!run(&a, "a"));
        assert!(run(&a, "aa"));
        assert!(run(&a, "aaa"));
        assert!(!run(&a, "aaaa"));

        let a = automaton("a{3}");
        assert!(!run(&a, "aa"));
        assert!(run(&a, "aaa"));
        assert!(!run(&a, "aaaa"));

        let a = automaton("a{2,}");
        assert!(!run(&a, "a"));
        assert!(run(&a, "aaaaa"));
    }

    #[test]
    fn character_classes() {
        let a = automaton("[a-cx]");
        for c in ['a', 'b', 'c', 'x'] {
            assert!(run(&a, &c.to_string()));
        }
        for c in ['d', 'w', 'y'] {
            assert!(!run(&a, &c.to_string()));
        }

        let a = automaton("[^a-c]");
        assert!(!run(&a, "b"));
        assert!(run(&a, "z"));
        assert!(run(&a, "\u{1F600}"));
        assert!(!run(&a, "zz"));
    }

    #[test]
    fn negated_class_is_single_char_wide() {
        let a = automaton("[^a]*");
        assert!(run(&a, ""));
        assert!(run(&a, "xyz"));
        assert!(!run(&a, "xaz"));
    }

    #[test]
    fn intersection_operator() {
        let a = automaton("[ab]*&.{2}");
        assert!(run(&a, "ab"));
        assert!(run(&a, "ba"));
        assert!(!run(&a, "a"));
        assert!(!run(&a, "abc"));
    }

    #[test]
    fn complement_operator() {
        let a = automaton("~(ab)");
        assert!(!run(&a, "ab"));
        assert!(run(&a, ""));
        assert!(run(&a, "ba"));
    }

    #[test]
    fn anystring_and_empty_symbols() {
        let a = automaton("@");
        assert!(run(&a, ""));
        assert!(run(&a, "whatever"));

        let a = automaton("#");
        assert!(!run(&a, ""));
        assert!(!run(&a, "a"));
    }

    #[test]
    fn quoted_literal_disables_operators() {
        let a = automaton("\"a|b\"");
        assert!(run(&a, "a|b"));
        assert!(!run(&a, "a"));
    }

    #[test]
    fn escape_strips_special_meaning() {
        let a = automaton("\\*\\(");
        assert!(run(&a, "*("));
        assert!(!run(&a, "("));
    }

    #[test]
    fn flags_gate_reserved_characters() {
        // With no optional syntax, '&' and '~' are ordinary characters.
        let re = RegExp::with_flags("a&b", NONE, 0).unwrap();
        let a = re.to_automaton(WORK).unwrap();
        assert!(run(&a, "a&b"));

        let re = RegExp::with_flags("~x", NONE, 0).unwrap();
        let a = re.to_automaton(WORK).unwrap();
        assert!(run(&a, "~x"));
    }

    #[test]
    fn decimal_interval_expression() {
        // An interval alone compiles without the usual minimize step, so
        // determinize before running.
        let det = |a: Automaton| operations::determinize(a, WORK).unwrap();

        let a = det(automaton("<5-27>"));
        assert!(run(&a, "5"));
        assert!(run(&a, "27"));
        assert!(run(&a, "011"));
        assert!(!run(&a, "28"));

        // Equal-width endpoints pin the digit count.
        let a = det(automaton("<05-27>"));
        assert!(run(&a, "05"));
        assert!(run(&a, "27"));
        assert!(!run(&a, "5"));
        assert!(!run(&a, "005"));

        // Reversed endpoints swap.
        let a = det(automaton("<27-5>"));
        assert!(run(&a, "5"));
        assert!(run(&a, "27"));
    }

    #[test]
    fn named_automaton_resolution() {
        let mut named = HashMap::new();
        named.insert("vowel".to_string(), automaton("[aeiou]"));
        let re = RegExp::new("<vowel>+").unwrap();
        let a = re.to_automaton_with(Some(&named), None, WORK).unwrap();
        assert!(run(&a, "ae"));
        assert!(!run(&a, "x"));

        let err = RegExp::new("<missing>").unwrap().to_automaton(WORK).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnknownAutomatonName { .. }));
    }

    #[test]
    fn case_insensitive_matching() {
        let re = RegExp::with_flags("abc", ALL, ASCII_CASE_INSENSITIVE).unwrap();
        let a = re.to_automaton(WORK).unwrap();
        assert!(run(&a, "abc"));
        assert!(run(&a, "AbC"));
        assert!(!run(&a, "abd"));

        let re = RegExp::with_flags("[p-r]", ALL, ASCII_CASE_INSENSITIVE).unwrap();
        let a = re.to_automaton(WORK).unwrap();
        // Ranges are not case-folded, only chars and strings.
        assert!(run(&a, "q"));
        assert!(!run(&a, "Q"));
    }

    #[test]
    fn parse_errors_carry_positions() {
        let err = RegExp::new("a)b").unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::Parse { position: 1, .. }
        ));

        let err = RegExp::new("(ab").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Parse { .. }));

        let err = RegExp::new("a{x}").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Parse { .. }));

        let err = RegExp::new("[z-a]").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidRange { .. }));

        let err = RegExp::new("<-5>").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Parse { .. }));

        let err = RegExp::new("<5->").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Parse { .. }));
    }

    #[test]
    fn illegal_flags_are_rejected() {
        assert!(RegExp::with_flags("a", 0x1000, 0).is_err());
        assert!(RegExp::with_flags("a", ALL, INTERSECTION).is_err());
    }

    #[test]
    fn display_round_trips_through_parser() {
        let patterns = ["a(b+|c+)d", "[A-Z][a-z]*", "~(ab)&x*", "<5-27>", "\"lit\""];
        for pattern in patterns {
            let re = RegExp::new(pattern).unwrap();
            let printed = re.to_string();
            let reparsed = RegExp::new(&printed).unwrap();
            let a = re.to_automaton(WORK).unwrap();
            let b = reparsed.to_automaton(WORK).unwrap();
            assert_eq!(
                a.num_states(),
                b.num_states(),
                "pattern {} printed as {}",
                pattern,
                printed
            );
        }
    }
}
