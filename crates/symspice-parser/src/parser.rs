//! Netlist card parser.
//!
//! One element per line, dispatched on the element-name prefix. Values go
//! through the exact SI-suffix parser; a word that is not a number becomes
//! a named symbol to be bound later with `Netlist::set_value`. Sources
//! take repeatable `dc` / `ac` / `step` / `s {...}` groups.

use num_rational::BigRational;
use symspice_core::{ComponentSpec, Excitation, Netlist, Tone, Value, units::parse_value};
use symspice_expr::{RatFun, parse_sexpr};

use crate::error::{Error, Result};
use crate::lexer::{Lexer, SpannedToken, Token};

/// Parse netlist text into a [`Netlist`].
///
/// The first non-comment line is the title. Parsing stops at `.end` or
/// end of input.
pub fn parse(input: &str) -> Result<Netlist> {
    let lexer = Lexer::new(input);
    let tokens = lexer.tokenize()?;
    Parser::new(&tokens).parse_all()
}

/// Parser state.
struct Parser<'a> {
    tokens: &'a [SpannedToken],
    pos: usize,
    netlist: Netlist,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [SpannedToken]) -> Self {
        Self {
            tokens,
            pos: 0,
            netlist: Netlist::new(),
        }
    }

    fn parse_all(mut self) -> Result<Netlist> {
        // First non-comment line is the title
        self.skip_eol();
        if let Some(title) = self.parse_title() {
            self.netlist = Netlist::with_title(title);
        }

        loop {
            self.skip_eol();
            match self.peek() {
                Token::Eof => break,
                Token::Command(cmd) => {
                    let cmd = cmd.clone();
                    let line = self.current_line();
                    self.advance();
                    match cmd.as_str() {
                        "END" => break,
                        other => {
                            return Err(Error::Parse {
                                line,
                                message: format!("unknown command: .{}", other.to_lowercase()),
                            });
                        }
                    }
                }
                _ => self.parse_card()?,
            }
        }

        Ok(self.netlist)
    }

    fn parse_title(&mut self) -> Option<String> {
        let mut parts = Vec::new();
        loop {
            match self.peek() {
                Token::Word(w) => {
                    parts.push(w.clone());
                    self.advance();
                }
                Token::Eol | Token::Eof => break,
                _ => {
                    self.advance();
                }
            }
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    /// Parse one element card (the current line).
    fn parse_card(&mut self) -> Result<()> {
        let line = self.current_line();
        let mut toks = Vec::new();
        while !matches!(self.peek(), Token::Eol | Token::Eof) {
            toks.push(self.tokens[self.pos].token.clone());
            self.advance();
        }
        let mut card = Card { toks, idx: 0, line };

        let name = card.next_word("element name")?;
        let upper = name.to_uppercase();

        let spec = if upper.starts_with("TF") {
            let (p1, n1, p2, n2) = card.four_nodes()?;
            ComponentSpec::transformer(&name, &p1, &n1, &p2, &n2, card.next_value()?)
        } else if upper.starts_with("GY") {
            let (p1, n1, p2, n2) = card.four_nodes()?;
            ComponentSpec::gyrator(&name, &p1, &n1, &p2, &n2, card.next_value()?)
        } else if upper.starts_with("TP") {
            let (p1, n1, p2, n2) = card.four_nodes()?;
            let a = card.next_ratfun()?;
            let b = card.next_ratfun()?;
            let c = card.next_ratfun()?;
            let d = card.next_ratfun()?;
            ComponentSpec::two_port(&name, &p1, &n1, &p2, &n2, a, b, c, d)
        } else {
            match upper.chars().next() {
                Some('R') => {
                    let (np, nn) = card.two_nodes()?;
                    ComponentSpec::resistor(&name, &np, &nn, card.next_value()?)
                }
                Some('G') => {
                    let (np, nn) = card.two_nodes()?;
                    ComponentSpec::conductor(&name, &np, &nn, card.next_value()?)
                }
                Some('C') => {
                    let (np, nn) = card.two_nodes()?;
                    let mut spec = ComponentSpec::capacitor(&name, &np, &nn, card.next_value()?);
                    if let Some(ic) = card.initial_condition()? {
                        spec = spec.with_ic(ic);
                    }
                    spec
                }
                Some('L') => {
                    let (np, nn) = card.two_nodes()?;
                    let mut spec = ComponentSpec::inductor(&name, &np, &nn, card.next_value()?);
                    if let Some(ic) = card.initial_condition()? {
                        spec = spec.with_ic(ic);
                    }
                    spec
                }
                Some('K') => {
                    let l1 = card.next_word("inductor name")?;
                    let l2 = card.next_word("inductor name")?;
                    ComponentSpec::mutual_inductance(&name, l1, l2, card.next_value()?)
                }
                Some('E') => {
                    let (p1, n1, p2, n2) = card.four_nodes()?;
                    ComponentSpec::vcvs(&name, &p1, &n1, &p2, &n2, card.next_value()?)
                }
                Some('W') => {
                    let (np, nn) = card.two_nodes()?;
                    ComponentSpec::wire(&name, &np, &nn)
                }
                Some('V') => {
                    let (np, nn) = card.two_nodes()?;
                    ComponentSpec::voltage_source(&name, &np, &nn, card.excitation()?)
                }
                Some('I') => {
                    let (np, nn) = card.two_nodes()?;
                    ComponentSpec::current_source(&name, &np, &nn, card.excitation()?)
                }
                _ => return Err(Error::UnknownElement(name)),
            }
        };

        card.expect_done()?;
        self.netlist.add(spec)?;
        Ok(())
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos].token
    }

    fn current_line(&self) -> usize {
        self.tokens[self.pos].line
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn skip_eol(&mut self) {
        while matches!(self.peek(), Token::Eol) {
            self.advance();
        }
    }
}

/// The tokens of a single card, consumed left to right.
struct Card {
    toks: Vec<Token>,
    idx: usize,
    line: usize,
}

impl Card {
    fn done(&self) -> bool {
        self.idx >= self.toks.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.toks.get(self.idx)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.toks.get(self.idx).cloned();
        if tok.is_some() {
            self.idx += 1;
        }
        tok
    }

    fn err(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            line: self.line,
            message: message.into(),
        }
    }

    fn next_word(&mut self, what: &str) -> Result<String> {
        match self.next() {
            Some(Token::Word(w)) => Ok(w),
            _ => Err(self.err(format!("expected {what}"))),
        }
    }

    fn two_nodes(&mut self) -> Result<(String, String)> {
        Ok((self.next_word("node")?, self.next_word("node")?))
    }

    fn four_nodes(&mut self) -> Result<(String, String, String, String)> {
        Ok((
            self.next_word("node")?,
            self.next_word("node")?,
            self.next_word("node")?,
            self.next_word("node")?,
        ))
    }

    /// A value word: an exact number with optional SI suffix, or a symbol.
    fn next_value(&mut self) -> Result<Value> {
        let w = self.next_word("value")?;
        match parse_value(&w) {
            Some(v) => Ok(Value::Num(v)),
            None => Ok(Value::Symbol(w)),
        }
    }

    /// A value word that must be numeric.
    fn next_rational(&mut self) -> Result<BigRational> {
        let w = self.next_word("numeric value")?;
        parse_value(&w).ok_or_else(|| self.err(format!("expected numeric value, got '{w}'")))
    }

    fn next_ratfun(&mut self) -> Result<RatFun> {
        match self.next() {
            Some(Token::Brace(body)) => parse_sexpr(&body).map_err(|e| {
                self.err(format!("invalid s-domain expression '{{{body}}}': {e}"))
            }),
            _ => Err(self.err("expected {...} expression")),
        }
    }

    /// If a numeric value is next (not a keyword), it can extend a group.
    fn peek_rational(&self) -> Option<BigRational> {
        match self.peek() {
            Some(Token::Word(w)) => parse_value(w),
            _ => None,
        }
    }

    /// Optional trailing `ic=VALUE` parameter.
    fn initial_condition(&mut self) -> Result<Option<BigRational>> {
        match self.peek() {
            Some(Token::Word(w)) if w.eq_ignore_ascii_case("ic") => {
                self.idx += 1;
                match self.next() {
                    Some(Token::Equals) => {}
                    _ => return Err(self.err("expected '=' after ic")),
                }
                Ok(Some(self.next_rational()?))
            }
            _ => Ok(None),
        }
    }

    /// Source excitation: a bare number (DC) or repeatable groups
    /// `dc V`, `ac AMP OMEGA [PHASE]`, `step V`, `s {EXPR}`.
    fn excitation(&mut self) -> Result<Excitation> {
        let mut exc = Excitation::default();

        if self.done() {
            return Err(self.err("missing source excitation"));
        }

        // Leading bare value is shorthand for a DC excitation.
        if let Some(v) = self.peek_rational() {
            self.idx += 1;
            exc.dc = Some(v);
        }

        while !self.done() {
            let keyword = self.next_word("excitation keyword")?;
            match keyword.to_lowercase().as_str() {
                "dc" => {
                    if exc.dc.is_some() {
                        return Err(self.err("duplicate dc part"));
                    }
                    exc.dc = Some(self.next_rational()?);
                }
                "ac" => {
                    let amplitude = self.next_rational()?;
                    let omega = self.next_rational()?;
                    let phase_deg = match self.peek_rational() {
                        Some(p) => {
                            self.idx += 1;
                            p
                        }
                        None => BigRational::default(),
                    };
                    exc.tones.push(Tone {
                        amplitude,
                        omega,
                        phase_deg,
                    });
                }
                "step" => {
                    if exc.transient.is_some() {
                        return Err(self.err("duplicate transient part"));
                    }
                    exc.transient =
                        Some(symspice_core::Transient::Step(self.next_rational()?));
                }
                "s" => {
                    if exc.transient.is_some() {
                        return Err(self.err("duplicate transient part"));
                    }
                    exc.transient = Some(symspice_core::Transient::Laplace(self.next_ratfun()?));
                }
                other => {
                    return Err(self.err(format!("unexpected source term '{other}'")));
                }
            }
        }

        Ok(exc)
    }

    fn expect_done(&self) -> Result<()> {
        if self.done() {
            Ok(())
        } else {
            Err(self.err("trailing tokens on card"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use symspice_core::ComponentKind;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    #[test]
    fn test_voltage_divider() {
        let netlist = parse(
            r#"Voltage Divider
V1 1 0 10
R1 1 2 1k
R2 2 0 1k
.end
"#,
        )
        .unwrap();
        assert_eq!(netlist.title(), Some("Voltage Divider"));
        assert_eq!(netlist.num_components(), 3);
        let r1 = netlist.component("R1").unwrap();
        match &r1.kind {
            ComponentKind::Resistor { value } => {
                assert_eq!(value.number().unwrap(), &rat(1000));
            }
            _ => panic!("wrong kind"),
        }
    }

    #[test]
    fn test_source_groups() {
        let netlist = parse("t\nV1 1 0 dc 5 ac 2 100 90 step 3\n").unwrap();
        let exc = netlist.component("V1").unwrap().excitation().unwrap();
        assert_eq!(exc.dc, Some(rat(5)));
        assert_eq!(exc.tones.len(), 1);
        assert_eq!(exc.tones[0].omega, rat(100));
        assert_eq!(exc.tones[0].phase_deg, rat(90));
        assert!(exc.transient_part().is_some());
    }

    #[test]
    fn test_bare_value_is_dc() {
        let netlist = parse("t\nI1 0 1 2m\n").unwrap();
        let exc = netlist.component("I1").unwrap().excitation().unwrap();
        assert_eq!(exc.dc, Some(BigRational::new(1.into(), 500.into())));
    }

    #[test]
    fn test_laplace_source_expression() {
        let netlist = parse("t\nV1 1 0 s {20/(s+3)}\n").unwrap();
        let exc = netlist.component("V1").unwrap().excitation().unwrap();
        match exc.transient_part() {
            Some(symspice_core::Transient::Laplace(f)) => {
                assert!(!f.is_zero());
            }
            other => panic!("expected laplace part, got {other:?}"),
        }
    }

    #[test]
    fn test_initial_conditions() {
        let netlist = parse("t\nC1 1 0 10u ic=5\nL1 1 0 2m ic=-1\n").unwrap();
        match &netlist.component("C1").unwrap().kind {
            ComponentKind::Capacitor { ic, .. } => assert_eq!(ic, &Some(rat(5))),
            _ => panic!("wrong kind"),
        }
        match &netlist.component("L1").unwrap().kind {
            ComponentKind::Inductor { ic, .. } => assert_eq!(ic, &Some(rat(-1))),
            _ => panic!("wrong kind"),
        }
    }

    #[test]
    fn test_symbolic_value() {
        let netlist = parse("t\nR1 1 0 Rload\n").unwrap();
        match &netlist.component("R1").unwrap().kind {
            ComponentKind::Resistor { value } => {
                assert_eq!(value, &Value::Symbol("Rload".into()));
            }
            _ => panic!("wrong kind"),
        }
    }

    #[test]
    fn test_mutual_and_two_port() {
        let netlist = parse(
            "t\nL1 1 0 2\nL2 2 0 8\nK1 L1 L2 1\nTP1 3 0 4 0 {1} {s} {0} {1}\n",
        )
        .unwrap();
        match &netlist.component("K1").unwrap().kind {
            ComponentKind::MutualInductance {
                inductor1,
                inductor2,
                ..
            } => {
                assert_eq!(inductor1, "L1");
                assert_eq!(inductor2, "L2");
            }
            _ => panic!("wrong kind"),
        }
        assert!(matches!(
            netlist.component("TP1").unwrap().kind,
            ComponentKind::TwoPort { .. }
        ));
    }

    #[test]
    fn test_unknown_element() {
        let err = parse("t\nQ1 1 0 5\n").unwrap_err();
        assert!(matches!(err, Error::UnknownElement(_)));
    }

    #[test]
    fn test_source_needs_excitation() {
        let err = parse("t\nV1 1 0\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
    }

    #[test]
    fn test_continuation_line() {
        let netlist = parse("t\nV1 1 0\n+ dc 5\nR1 1 0 1\n").unwrap();
        let exc = netlist.component("V1").unwrap().excitation().unwrap();
        assert_eq!(exc.dc, Some(rat(5)));
    }
}
