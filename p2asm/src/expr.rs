use crate::error::{Error, Result};
use crate::number;
use crate::symbol::{self, SymbolTable};
use crate::token::{self, Token};

// Characters that end a literal digit run
const STOP: &str = " \t,+-*/\\&|^!~<>()";

// Everything the evaluator may touch while resolving one operand
pub struct Context<'a> {
    pub symbols: &'a mut SymbolTable,
    // Last global label, prefix of '.local' names
    pub scope: &'a str,
    pub line: usize,
    // Program counter of the line, value of a bare '$'
    pub pc: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Value {
    pub value: u64,
    // Operand was written with a leading '#'
    pub immediate: bool,
    // '#\' forces an absolute address
    pub absolute: bool,
    // '##' always goes through AUGS/AUGD
    pub augmented: bool,
}


// Evaluates one operand
//
// binop   := summand (('!' | '&' | '|' | '^' | '<<' | '>>') summand)*
// summand := factor (('+' | '-') factor)*
// factor  := atom (('*' | '/' | '\') atom)*
// atom    := ('-' | '!' | '~')* (literal | symbol | '(' binop ')')
pub fn evaluate(input: &str, ctx: &mut Context) -> Result<Value> {
    let mut eval = Eval { input: input.as_bytes(), src: input, pos: 0, ctx };
    let mut result = Value::default();

    eval.skip_whitespace();
    if eval.peek() == Some(b'#') {
        eval.pos += 1;
        result.immediate = true;
        if eval.peek() == Some(b'#') {
            eval.pos += 1;
            result.augmented = true;
        }
        if eval.peek() == Some(b'\\') {
            eval.pos += 1;
            result.absolute = true;
        }
    }

    eval.skip_whitespace();
    if eval.peek().is_none() {
        return Err(Error::MissingOperand("expression"));
    }

    result.value = eval.binop()?;

    eval.skip_whitespace();
    if eval.pos < eval.input.len() {
        return Err(Error::InvalidExpression(eval.src[eval.pos..].to_string()));
    }
    Ok(result)
}

struct Eval<'s, 'c, 'a> {
    input: &'s [u8],
    src: &'s str,
    pos: usize,
    ctx: &'c mut Context<'a>,
}

impl<'s, 'c, 'a> Eval<'s, 'c, 'a> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).cloned()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.get(self.pos + offset).cloned()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == b' ' || c == b'\t' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn rest(&self) -> String {
        self.src[self.pos..].to_string()
    }

    fn binop(&mut self) -> Result<u64> {
        let mut lhs = self.summand()?;

        loop {
            self.skip_whitespace();
            match (self.peek(), self.peek_at(1)) {
                (Some(b'!'), _) => {
                    self.pos += 1;
                    lhs &= !self.summand()?;
                },
                (Some(b'&'), _) => {
                    self.pos += 1;
                    lhs &= self.summand()?;
                },
                (Some(b'|'), _) => {
                    self.pos += 1;
                    lhs |= self.summand()?;
                },
                (Some(b'^'), _) => {
                    self.pos += 1;
                    lhs ^= self.summand()?;
                },
                (Some(b'<'), Some(b'<')) => {
                    self.pos += 2;
                    let rhs = self.summand()?;
                    lhs = if rhs >= 64 { 0 } else { lhs << rhs };
                },
                (Some(b'>'), Some(b'>')) => {
                    self.pos += 2;
                    let rhs = self.summand()?;
                    lhs = if rhs >= 64 { 0 } else { lhs >> rhs };
                },
                _ => return Ok(lhs),
            }
        }
    }

    fn summand(&mut self) -> Result<u64> {
        let mut lhs = self.factor()?;

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'+') => {
                    self.pos += 1;
                    lhs = lhs.wrapping_add(self.factor()?);
                },
                Some(b'-') => {
                    self.pos += 1;
                    lhs = lhs.wrapping_sub(self.factor()?);
                },
                _ => return Ok(lhs),
            }
        }
    }

    fn factor(&mut self) -> Result<u64> {
        let mut lhs = self.atom()?;

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    lhs = lhs.wrapping_mul(self.atom()?);
                },
                Some(b'/') => {
                    self.pos += 1;
                    let rhs = self.atom()?;
                    lhs = lhs.checked_div(rhs).ok_or(Error::DivisionByZero)?;
                },
                Some(b'\\') => {
                    self.pos += 1;
                    let rhs = self.atom()?;
                    lhs = lhs.checked_rem(rhs).ok_or(Error::DivisionByZero)?;
                },
                _ => return Ok(lhs),
            }
        }
    }

    fn atom(&mut self) -> Result<u64> {
        self.skip_whitespace();

        match self.peek() {
            Some(b'-') => {
                self.pos += 1;
                Ok(self.atom()?.wrapping_neg())
            },
            Some(b'!') | Some(b'~') => {
                self.pos += 1;
                Ok(!self.atom()?)
            },
            Some(b'(') => {
                self.pos += 1;
                let value = self.binop()?;
                self.skip_whitespace();
                if self.peek() != Some(b')') {
                    return Err(Error::InvalidExpression(self.rest()));
                }
                self.pos += 1;
                Ok(value)
            },
            Some(b'$') => {
                self.pos += 1;
                match self.peek() {
                    Some(c) if (c as char).is_ascii_hexdigit() => {
                        Ok(number::read_hex(&mut self.pos, self.src, STOP))
                    },
                    _ => Ok(self.ctx.pc as u64),
                }
            },
            Some(b'%') => {
                self.pos += 1;
                if self.peek() == Some(b'%') {
                    self.pos += 1;
                    Ok(number::read_qua(&mut self.pos, self.src, STOP))
                } else {
                    Ok(number::read_bin(&mut self.pos, self.src, STOP))
                }
            },
            Some(b'"') => Ok(number::read_str(&mut self.pos, self.src)),
            Some(b'0') if self.peek_at(1).map_or(false, |c| c.is_ascii_digit()) => {
                self.pos += 1;
                let value = number::read_oct(&mut self.pos, self.src, STOP);
                match self.peek() {
                    Some(c @ b'8') | Some(c @ b'9') => Err(Error::InvalidOctalDigit(c as char)),
                    _ => Ok(value),
                }
            },
            Some(c) if c.is_ascii_digit() => Ok(number::read_dec(&mut self.pos, self.src, STOP)),
            Some(c) if is_symbol_start(c) => {
                let start = self.pos;
                while self.peek().map_or(false, is_symbol_char) {
                    self.pos += 1;
                }
                let src = self.src;
                self.symbol(&src[start..self.pos])
            },
            Some(_) => Err(Error::InvalidExpression(self.rest())),
            None => Err(Error::MissingOperand("expression")),
        }
    }

    fn symbol(&mut self, name: &str) -> Result<u64> {
        match token::lookup(name) {
            Some(Token::Register(offset)) => return Ok(offset as u64),
            Some(Token::Modcz(code)) => return Ok(code as u64),
            Some(_) => return Err(Error::ReservedWord(name.to_string())),
            None => (),
        }

        let name = symbol::scoped(self.ctx.scope, name);
        let line = self.ctx.line;
        if self.ctx.symbols.add_reference(line, &name) {
            Ok(self.ctx.symbols.lookup(&name).value().to_u64())
        } else {
            // Undefined (forward) reference, stays 0 for this pass
            Ok(0)
        }
    }
}

fn is_symbol_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'.' || c == b':'
}

fn is_symbol_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'.' || c == b':'
}


#[cfg(test)]
mod expr_tests {
    use super::*;
    use crate::atom::Atom;

    fn eval(input: &str) -> Result<Value> {
        let mut symbols = SymbolTable::new();
        let mut ctx = Context { symbols: &mut symbols, scope: "", line: 1, pc: 0x10 };
        evaluate(input, &mut ctx)
    }

    fn value(input: &str) -> u64 {
        eval(input).map(|v| v.value).unwrap()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(value("2 + 3 * 4"), 14);
        assert_eq!(value("10 - 2 - 3"), 5);
        assert_eq!(value("1 + 2 << 3"), 24);
        assert_eq!(value("(1 + 2) * 3"), 9);
        assert_eq!(value("17 \\ 5"), 2);
        assert_eq!(value("17 / 5"), 3);
    }

    #[test]
    fn test_bases() {
        assert_eq!(value("$1F"), 31);
        assert_eq!(value("%1010"), 10);
        assert_eq!(value("%%33"), 15);
        assert_eq!(value("010"), 8);
        assert_eq!(value("0777"), 0o777);
        assert_eq!(value("10"), 10);
        assert_eq!(value("0"), 0);
        assert_eq!(value("\"AB\""), 0x4142);
    }

    #[test]
    fn test_unary() {
        assert_eq!(value("--5"), 5);
        assert_eq!(value("-5"), 5u64.wrapping_neg());
        assert_eq!(value("---5"), 5u64.wrapping_neg());
        assert_eq!(value("~0"), u64::MAX);
        assert_eq!(value("!$ff & $1ff"), 0x100);
    }

    #[test]
    fn test_bitops() {
        assert_eq!(value("$f0 | $0f"), 0xff);
        assert_eq!(value("$ff ^ $0f"), 0xf0);
        assert_eq!(value("$ff ! $0f"), 0xf0);
        assert_eq!(value("$f0 >> 4"), 0xf);
        assert_eq!(value("1 << 64"), 0);
    }

    #[test]
    fn test_immediate_prefix() {
        assert_eq!(eval("#5"), Ok(Value { value: 5, immediate: true, ..Value::default() }));
        assert_eq!(eval("#\\$400"), Ok(Value { value: 0x400, immediate: true, absolute: true, augmented: false }));
        assert_eq!(eval("##\\$400"), Ok(Value { value: 0x400, immediate: true, absolute: true, augmented: true }));
        assert_eq!(eval("##7"), Ok(Value { value: 7, immediate: true, augmented: true, ..Value::default() }));
        assert_eq!(eval("5"), Ok(Value { value: 5, ..Value::default() }));
    }

    #[test]
    fn test_pc_and_registers() {
        assert_eq!(value("$"), 0x10);
        assert_eq!(value("$ + 2"), 0x12);
        assert_eq!(value("ptra"), 0x1f8);
        assert_eq!(value("_C_OR_Z"), 0xe);
    }

    #[test]
    fn test_errors() {
        assert_eq!(eval("1 / 0"), Err(Error::DivisionByZero));
        assert_eq!(eval("1 \\ 0"), Err(Error::DivisionByZero));
        assert_eq!(eval("1 2"), Err(Error::InvalidExpression("2".to_string())));
        assert_eq!(eval("(1 + 2"), Err(Error::InvalidExpression("".to_string())));
        assert_eq!(eval("#"), Err(Error::MissingOperand("expression")));
        assert_eq!(eval("wc"), Err(Error::ReservedWord("wc".to_string())));
        assert_eq!(eval("mov"), Err(Error::ReservedWord("mov".to_string())));
        assert_eq!(eval("09"), Err(Error::InvalidOctalDigit('9')));
        assert_eq!(eval("0178"), Err(Error::InvalidOctalDigit('8')));
    }

    #[test]
    fn test_symbols() {
        let mut symbols = SymbolTable::new();
        symbols.define("foo", Atom::Long(0x20), 1);
        {
            let mut ctx = Context { symbols: &mut symbols, scope: "", line: 4, pc: 0 };
            assert_eq!(evaluate("foo + 1", &mut ctx).map(|v| v.value), Ok(0x21));
            assert_eq!(evaluate("bar", &mut ctx).map(|v| v.value), Ok(0));
        }
        assert_eq!(symbols.lookup("foo").references(), &[1, 4]);
        assert!(!symbols.lookup("bar").is_defined());
        assert_eq!(symbols.lookup("bar").references(), &[4]);
        assert_eq!(symbols.references_in(4).len(), 2);
    }

    #[test]
    fn test_local_symbols() {
        let mut symbols = SymbolTable::new();
        symbols.define("main.loop", Atom::Addr(3), 2);
        symbols.define("other.loop", Atom::Addr(9), 6);

        let mut ctx = Context { symbols: &mut symbols, scope: "main", line: 4, pc: 0 };
        assert_eq!(evaluate(".loop", &mut ctx).map(|v| v.value), Ok(3));
        assert_eq!(evaluate("other.loop + 1", &mut ctx).map(|v| v.value), Ok(10));

        ctx.scope = "other";
        assert_eq!(evaluate(".loop", &mut ctx).map(|v| v.value), Ok(9));
    }
}
