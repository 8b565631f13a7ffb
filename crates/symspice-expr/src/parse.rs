//! Recursive-descent parser for `s`-domain value expressions.
//!
//! Accepts numbers (decimal or scientific notation, parsed exactly into
//! rationals), the variable `s`, parentheses, unary minus, `+ - * /` and
//! integer powers with `^`. Used for brace-delimited netlist values such
//! as `{20/(s+3)^2}`.

use num_bigint::BigInt;
use num_rational::BigRational;

use crate::error::{Error, Result};
use crate::ratfun::RatFun;

/// Parse an `s`-domain expression into a rational function.
pub fn parse_sexpr(input: &str) -> Result<RatFun> {
    let mut parser = SexprParser::new(input);
    parser.parse()
}

/// Parse a decimal string (with optional exponent) into an exact rational.
///
/// Unlike float conversion this is exact with respect to the decimal text:
/// `"4.7"` becomes 47/10, not the nearest binary double.
pub fn rational_from_decimal(s: &str) -> Option<BigRational> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let (mantissa, exp) = match s.find(['e', 'E']) {
        Some(pos) => {
            let e: i64 = s[pos + 1..].parse().ok()?;
            (&s[..pos], e)
        }
        None => (s, 0),
    };

    let (sign, digits) = match mantissa.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, mantissa.strip_prefix('+').unwrap_or(mantissa)),
    };

    let (int_part, frac_part) = match digits.find('.') {
        Some(pos) => (&digits[..pos], &digits[pos + 1..]),
        None => (digits, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return None;
    }

    let combined = format!("{int_part}{frac_part}");
    let numer: BigInt = combined.parse().ok()?;
    let scale = frac_part.len() as i64;

    let mut value = BigRational::from_integer(numer * BigInt::from(sign));
    let shift = exp - scale;
    let ten = BigInt::from(10);
    if shift >= 0 {
        value *= BigRational::from_integer(num_traits::pow(ten, shift as usize));
    } else {
        value /= BigRational::from_integer(num_traits::pow(ten, (-shift) as usize));
    }
    Some(value)
}

struct SexprParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> SexprParser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn parse(&mut self) -> Result<RatFun> {
        self.skip_whitespace();
        let expr = self.parse_additive()?;
        self.skip_whitespace();
        if self.pos < self.input.len() {
            Err(self.err("unexpected trailing input"))
        } else {
            Ok(expr)
        }
    }

    fn err(&self, message: &str) -> Error {
        Error::Parse {
            pos: self.pos,
            message: message.into(),
        }
    }

    fn skip_whitespace(&mut self) {
        while self
            .peek()
            .is_some_and(|c| c.is_whitespace())
        {
            self.advance();
        }
    }

    fn peek(&self) -> Option<char> {
        self.input.as_bytes().get(self.pos).map(|&b| b as char)
    }

    fn advance(&mut self) {
        if self.pos < self.input.len() {
            self.pos += 1;
        }
    }

    fn parse_additive(&mut self) -> Result<RatFun> {
        let mut left = self.parse_multiplicative()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('+') => {
                    self.advance();
                    left = &left + &self.parse_multiplicative()?;
                }
                Some('-') => {
                    self.advance();
                    left = &left - &self.parse_multiplicative()?;
                }
                _ => return Ok(left),
            }
        }
    }

    fn parse_multiplicative(&mut self) -> Result<RatFun> {
        let mut left = self.parse_power()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some('*') => {
                    self.advance();
                    left = &left * &self.parse_power()?;
                }
                Some('/') => {
                    self.advance();
                    let right = self.parse_power()?;
                    if right.is_zero() {
                        return Err(self.err("division by zero"));
                    }
                    left = &left / &right;
                }
                _ => return Ok(left),
            }
        }
    }

    fn parse_power(&mut self) -> Result<RatFun> {
        let base = self.parse_unary()?;
        self.skip_whitespace();
        if self.peek() == Some('^') {
            self.advance();
            self.skip_whitespace();
            let exp = self.parse_integer()?;
            if exp < 0 {
                if base.is_zero() {
                    return Err(self.err("zero raised to a negative power"));
                }
                return Ok(pow_ratfun(&base.recip(), (-exp) as u32));
            }
            return Ok(pow_ratfun(&base, exp as u32));
        }
        Ok(base)
    }

    fn parse_unary(&mut self) -> Result<RatFun> {
        self.skip_whitespace();
        if self.peek() == Some('-') {
            self.advance();
            return Ok(-&self.parse_unary()?);
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<RatFun> {
        self.skip_whitespace();
        match self.peek() {
            Some('(') => {
                self.advance();
                let inner = self.parse_additive()?;
                self.skip_whitespace();
                if self.peek() != Some(')') {
                    return Err(self.err("expected closing parenthesis"));
                }
                self.advance();
                Ok(inner)
            }
            Some('s') | Some('S') => {
                self.advance();
                Ok(RatFun::var())
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.parse_number(),
            Some(_) => Err(self.err("expected number, 's', or parenthesis")),
            None => Err(self.err("unexpected end of expression")),
        }
    }

    fn parse_number(&mut self) -> Result<RatFun> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.advance();
        }
        // Scientific exponent.
        if self.peek().is_some_and(|c| c == 'e' || c == 'E') {
            let mark = self.pos;
            self.advance();
            if self.peek().is_some_and(|c| c == '+' || c == '-') {
                self.advance();
            }
            if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
            } else {
                self.pos = mark;
            }
        }
        let text = &self.input[start..self.pos];
        rational_from_decimal(text)
            .map(RatFun::constant)
            .ok_or_else(|| self.err("invalid number"))
    }

    fn parse_integer(&mut self) -> Result<i64> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.advance();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
        self.input[start..self.pos]
            .parse()
            .map_err(|_| self.err("expected integer exponent"))
    }
}

fn pow_ratfun(base: &RatFun, n: u32) -> RatFun {
    let mut acc = RatFun::one();
    for _ in 0..n {
        acc = &acc * base;
    }
    acc
}
