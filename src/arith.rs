//! Arithmetic expression parser for `$(( ... ))` / `(( ... ))` / C-style
//! `for` clauses. Builds an [`ArithExpr`] tree from raw source text; the
//! evaluator lives in `expand::arithmetic`.
//!
//! Grammar (low→high precedence), per spec §4.C.3: comma, assignment,
//! ternary, logical-or, logical-and, bitor, bitxor, bitand, equality,
//! relational, shift, additive, multiplicative, unary, postfix, primary.

use crate::ast::{
    ArithAssignmentNode, ArithAssignmentOperator, ArithBinaryNode, ArithBinaryOperator, ArithExpr,
    ArithTernaryNode, ArithUnaryNode, ArithUnaryOperator,
};
use crate::errors::ExpansionError;

struct ArithParser {
    chars: Vec<char>,
    pos: usize,
}

pub fn parse_arith(src: &str) -> Result<ArithExpr, ExpansionError> {
    let mut p = ArithParser { chars: src.chars().collect(), pos: 0 };
    let expr = p.parse_sequence()?;
    p.skip_ws();
    if p.pos != p.chars.len() {
        return Err(ExpansionError::ArithSyntax(format!(
            "trailing input at {}",
            p.rest()
        )));
    }
    Ok(expr)
}

impl ArithParser {
    fn rest(&self) -> String {
        self.chars[self.pos..].iter().collect()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, off: usize) -> Option<char> {
        self.chars.get(self.pos + off).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat_str(&mut self, s: &str) -> bool {
        self.skip_ws();
        let sc: Vec<char> = s.chars().collect();
        if self.chars[self.pos..].starts_with(&sc[..]) {
            // Avoid matching a prefix of a longer operator by checking the
            // caller ordering (longest-first) at each call site.
            self.pos += sc.len();
            true
        } else {
            false
        }
    }

    fn parse_sequence(&mut self) -> Result<ArithExpr, ExpansionError> {
        let mut items = vec![self.parse_assignment()?];
        loop {
            self.skip_ws();
            if self.peek() == Some(',') {
                self.pos += 1;
                items.push(self.parse_assignment()?);
            } else {
                break;
            }
        }
        if items.len() == 1 {
            Ok(items.pop().unwrap())
        } else {
            Ok(ArithExpr::Sequence(items))
        }
    }

    fn parse_assignment(&mut self) -> Result<ArithExpr, ExpansionError> {
        let save = self.pos;
        self.skip_ws();
        if let Some(name) = self.try_identifier() {
            self.skip_ws();
            let ops: &[(&str, ArithAssignmentOperator)] = &[
                ("+=", ArithAssignmentOperator::AddAssign),
                ("-=", ArithAssignmentOperator::SubAssign),
                ("*=", ArithAssignmentOperator::MulAssign),
                ("/=", ArithAssignmentOperator::DivAssign),
                ("%=", ArithAssignmentOperator::ModAssign),
                ("<<=", ArithAssignmentOperator::LShiftAssign),
                (">>=", ArithAssignmentOperator::RShiftAssign),
                ("&=", ArithAssignmentOperator::AndAssign),
                ("|=", ArithAssignmentOperator::OrAssign),
                ("^=", ArithAssignmentOperator::XorAssign),
            ];
            for (sym, op) in ops {
                if self.looking_at(sym) && !self.looking_at("==") {
                    self.pos += sym.len();
                    let value = self.parse_assignment()?;
                    return Ok(ArithExpr::Assignment(Box::new(ArithAssignmentNode {
                        operator: *op,
                        variable: name,
                        value,
                    })));
                }
            }
            if self.looking_at("=") && !self.looking_at("==") {
                self.pos += 1;
                let value = self.parse_assignment()?;
                return Ok(ArithExpr::Assignment(Box::new(ArithAssignmentNode {
                    operator: ArithAssignmentOperator::Assign,
                    variable: name,
                    value,
                })));
            }
        }
        self.pos = save;
        self.parse_ternary()
    }

    fn looking_at(&self, s: &str) -> bool {
        let sc: Vec<char> = s.chars().collect();
        self.chars[self.pos..].starts_with(&sc[..])
    }

    fn try_identifier(&mut self) -> Option<String> {
        self.skip_ws();
        let start = self.pos;
        if self.peek() == Some('$') {
            self.pos += 1;
        }
        let ident_start = self.pos;
        if !matches!(self.peek(), Some(c) if c.is_alphabetic() || c == '_') {
            self.pos = start;
            return None;
        }
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        Some(self.chars[ident_start..self.pos].iter().collect())
    }

    fn parse_ternary(&mut self) -> Result<ArithExpr, ExpansionError> {
        let cond = self.parse_logor()?;
        self.skip_ws();
        if self.peek() == Some('?') {
            self.pos += 1;
            let consequent = self.parse_assignment()?;
            self.skip_ws();
            if self.peek() != Some(':') {
                return Err(ExpansionError::ArithSyntax("expected ':'".into()));
            }
            self.pos += 1;
            let alternate = self.parse_assignment()?;
            return Ok(ArithExpr::Ternary(Box::new(ArithTernaryNode { condition: cond, consequent, alternate })));
        }
        Ok(cond)
    }

    fn parse_binop_level(
        &mut self,
        ops: &[(&str, ArithBinaryOperator)],
        next: fn(&mut Self) -> Result<ArithExpr, ExpansionError>,
    ) -> Result<ArithExpr, ExpansionError> {
        let mut left = next(self)?;
        loop {
            self.skip_ws();
            let mut matched = None;
            for (sym, op) in ops {
                if self.looking_at(sym) {
                    // don't let `<` match the start of `<<` etc when a longer op is listed first
                    matched = Some((*sym, *op));
                    break;
                }
            }
            match matched {
                Some((sym, op)) => {
                    self.pos += sym.len();
                    let right = next(self)?;
                    left = ArithExpr::Binary(Box::new(ArithBinaryNode { operator: op, left, right }));
                }
                None => break,
            }
        }
        Ok(left)
    }

    fn parse_logor(&mut self) -> Result<ArithExpr, ExpansionError> {
        self.parse_binop_level(&[("||", ArithBinaryOperator::LogOr)], Self::parse_logand)
    }
    fn parse_logand(&mut self) -> Result<ArithExpr, ExpansionError> {
        self.parse_binop_level(&[("&&", ArithBinaryOperator::LogAnd)], Self::parse_bitor)
    }
    fn parse_bitor(&mut self) -> Result<ArithExpr, ExpansionError> {
        self.skip_ws();
        let mut left = self.parse_bitxor()?;
        loop {
            self.skip_ws();
            if self.looking_at("|") && !self.looking_at("||") && !self.looking_at("|=") {
                self.pos += 1;
                let right = self.parse_bitxor()?;
                left = ArithExpr::Binary(Box::new(ArithBinaryNode { operator: ArithBinaryOperator::BitOr, left, right }));
            } else {
                break;
            }
        }
        Ok(left)
    }
    fn parse_bitxor(&mut self) -> Result<ArithExpr, ExpansionError> {
        self.parse_binop_level(&[("^", ArithBinaryOperator::BitXor)], Self::parse_bitand)
    }
    fn parse_bitand(&mut self) -> Result<ArithExpr, ExpansionError> {
        self.skip_ws();
        let mut left = self.parse_equality()?;
        loop {
            self.skip_ws();
            if self.looking_at("&") && !self.looking_at("&&") && !self.looking_at("&=") {
                self.pos += 1;
                let right = self.parse_equality()?;
                left = ArithExpr::Binary(Box::new(ArithBinaryNode { operator: ArithBinaryOperator::BitAnd, left, right }));
            } else {
                break;
            }
        }
        Ok(left)
    }
    fn parse_equality(&mut self) -> Result<ArithExpr, ExpansionError> {
        self.parse_binop_level(
            &[("==", ArithBinaryOperator::Eq), ("!=", ArithBinaryOperator::Ne)],
            Self::parse_relational,
        )
    }
    fn parse_relational(&mut self) -> Result<ArithExpr, ExpansionError> {
        self.parse_binop_level(
            &[
                ("<=", ArithBinaryOperator::Le),
                (">=", ArithBinaryOperator::Ge),
                ("<", ArithBinaryOperator::Lt),
                (">", ArithBinaryOperator::Gt),
            ],
            Self::parse_shift,
        )
    }
    fn parse_shift(&mut self) -> Result<ArithExpr, ExpansionError> {
        self.parse_binop_level(
            &[("<<", ArithBinaryOperator::LShift), (">>", ArithBinaryOperator::RShift)],
            Self::parse_additive,
        )
    }
    fn parse_additive(&mut self) -> Result<ArithExpr, ExpansionError> {
        self.parse_binop_level(
            &[("+", ArithBinaryOperator::Add), ("-", ArithBinaryOperator::Sub)],
            Self::parse_multiplicative,
        )
    }
    fn parse_multiplicative(&mut self) -> Result<ArithExpr, ExpansionError> {
        self.parse_binop_level(
            &[
                ("*", ArithBinaryOperator::Mul),
                ("/", ArithBinaryOperator::Div),
                ("%", ArithBinaryOperator::Mod),
            ],
            Self::parse_unary,
        )
    }

    fn parse_unary(&mut self) -> Result<ArithExpr, ExpansionError> {
        self.skip_ws();
        if self.looking_at("++") {
            self.pos += 2;
            let operand = self.parse_unary()?;
            return Ok(ArithExpr::Unary(Box::new(ArithUnaryNode { operator: ArithUnaryOperator::Inc, operand })));
        }
        if self.looking_at("--") {
            self.pos += 2;
            let operand = self.parse_unary()?;
            return Ok(ArithExpr::Unary(Box::new(ArithUnaryNode { operator: ArithUnaryOperator::Dec, operand })));
        }
        if self.looking_at("!") {
            self.pos += 1;
            let operand = self.parse_unary()?;
            return Ok(ArithExpr::Unary(Box::new(ArithUnaryNode { operator: ArithUnaryOperator::Not, operand })));
        }
        if self.looking_at("~") {
            self.pos += 1;
            let operand = self.parse_unary()?;
            return Ok(ArithExpr::Unary(Box::new(ArithUnaryNode { operator: ArithUnaryOperator::BitNot, operand })));
        }
        if self.looking_at("-") {
            self.pos += 1;
            let operand = self.parse_unary()?;
            return Ok(ArithExpr::Unary(Box::new(ArithUnaryNode { operator: ArithUnaryOperator::Neg, operand })));
        }
        if self.looking_at("+") {
            self.pos += 1;
            let operand = self.parse_unary()?;
            return Ok(ArithExpr::Unary(Box::new(ArithUnaryNode { operator: ArithUnaryOperator::Pos, operand })));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<ArithExpr, ExpansionError> {
        let primary = self.parse_primary()?;
        self.skip_ws();
        if self.looking_at("++") {
            self.pos += 2;
            if let ArithExpr::Variable(_) = &primary {
                return Ok(ArithExpr::Postfix(Box::new(ArithUnaryNode {
                    operator: ArithUnaryOperator::Inc,
                    operand: primary,
                })));
            }
        } else if self.looking_at("--") {
            self.pos += 2;
            if let ArithExpr::Variable(_) = &primary {
                return Ok(ArithExpr::Postfix(Box::new(ArithUnaryNode {
                    operator: ArithUnaryOperator::Dec,
                    operand: primary,
                })));
            }
        }
        Ok(primary)
    }

    fn parse_primary(&mut self) -> Result<ArithExpr, ExpansionError> {
        self.skip_ws();
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let inner = self.parse_sequence()?;
                self.skip_ws();
                if self.peek() != Some(')') {
                    return Err(ExpansionError::ArithSyntax("expected ')'".into()));
                }
                self.pos += 1;
                Ok(ArithExpr::Group(Box::new(inner)))
            }
            Some(c) if c.is_ascii_digit() => self.parse_number(),
            Some('$') | Some(_) => {
                if let Some(name) = self.try_identifier() {
                    Ok(ArithExpr::Variable(name))
                } else {
                    Err(ExpansionError::ArithSyntax(format!("unexpected `{}`", self.rest())))
                }
            }
            None => Err(ExpansionError::ArithSyntax("unexpected end of expression".into())),
        }
    }

    fn parse_number(&mut self) -> Result<ArithExpr, ExpansionError> {
        let start = self.pos;
        if self.looking_at("0x") || self.looking_at("0X") {
            self.pos += 2;
            while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                self.pos += 1;
            }
            let text: String = self.chars[start + 2..self.pos].iter().collect();
            let n = i64::from_str_radix(&text, 16)
                .map_err(|_| ExpansionError::ArithSyntax(format!("bad hex literal {text}")))?;
            return Ok(ArithExpr::Number(n));
        }
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        let n: i64 = text
            .parse()
            .map_err(|_| ExpansionError::ArithSyntax(format!("bad numeric literal {text}")))?;
        Ok(ArithExpr::Number(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_add() {
        let e = parse_arith("1 + 2 * 3").unwrap();
        assert_eq!(e, ArithExpr::Binary(Box::new(ArithBinaryNode {
            operator: ArithBinaryOperator::Add,
            left: ArithExpr::Number(1),
            right: ArithExpr::Binary(Box::new(ArithBinaryNode {
                operator: ArithBinaryOperator::Mul,
                left: ArithExpr::Number(2),
                right: ArithExpr::Number(3),
            })),
        })));
    }

    #[test]
    fn assignment_roundtrip() {
        let e = parse_arith("i = i + 1").unwrap();
        match e {
            ArithExpr::Assignment(a) => assert_eq!(a.variable, "i"),
            _ => panic!("expected assignment"),
        }
    }

    #[test]
    fn comparison() {
        let e = parse_arith("$i < 3").unwrap();
        match e {
            ArithExpr::Binary(b) => assert_eq!(b.operator, ArithBinaryOperator::Lt),
            _ => panic!("expected binary"),
        }
    }
}
