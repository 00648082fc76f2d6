use core::ops::RangeInclusive;

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};
use crate::expr::{self, Context, Value};
use crate::image::{self, HUB_ADDR0};
use crate::number;
use crate::opcode::{self, InstEnc, Opcode, Shape, AUGD_BITS, AUGS_BITS, FIELD_MAX, OFFS_PA, OFFS_PTRB};
use crate::token::{self, Flag, Token, Word};

// A word ending with one of these continues into the next word, and so does a word
// starting with one of the second set
const JOIN_AFTER: &str = "+-*/\\&|^!~<>(#";
const JOIN_BEFORE: &str = "+-*/\\&|^!<>)";

const EXPECT_TEST: &str = "WC, WZ, ANDC, ANDZ, ORC, ORZ, XORC, or XORZ";

// Where a '#' on the destination is stored
#[derive(Debug, Clone, Copy, PartialEq)]
enum ImmTo { None, I, Z }

// Flag updates a shape accepts
#[derive(Debug, Clone, Copy, PartialEq)]
enum Allow { Wc, Wz, Wcz }

impl Allow {
    fn expected(self) -> &'static str {
        match self {
            Allow::Wc  => "WC",
            Allow::Wz  => "WZ",
            Allow::Wcz => "WC, WZ, or WCZ",
        }
    }
}


// One instruction with the AUGD/AUGS prefixes its immediates need
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoded {
    pub augd: Option<u32>,
    pub augs: Option<u32>,
    pub word: u32,
}

impl Encoded {
    // Memory order: AUGD, AUGS, instruction
    pub fn longs(&self) -> Vec<u32> {
        self.augd.into_iter().chain(self.augs).chain(Some(self.word)).collect()
    }
}

// Encodes one instruction
//
// `words` are the words after the mnemonic with comments removed. Immediates above
// $1ff, or written with '##', get an AUGD/AUGS prefix under the same condition.
// Nothing is written anywhere on error.
pub fn encode(mnemonic: &str, enc: InstEnc, cond: u8, words: &[Word], ctx: &mut Context) -> Result<Encoded> {
    let enc = select_form(mnemonic, enc, words);
    let mut encoder = Encoder::new(words, ctx, Opcode::new(enc, cond));

    encoder.shape(enc.shape)?;
    Ok(Encoded {
        augd: encoder.augd.map(|value| prefix(AUGD_BITS, cond, value)),
        augs: encoder.augs.map(|value| prefix(AUGS_BITS, cond, value)),
        word: encoder.op.word(),
    })
}

fn prefix(bits: u32, cond: u8, value: u32) -> u32 {
    let mut op = Opcode::new(InstEnc { bits, shape: Shape::Imm23 }, cond);
    op.set(opcode::IMM23, value);
    op.word()
}

// BYTE/WORD/LONG operand list, `size` bytes per item, little endian
//
// A lone quoted string emits one item per character.
pub fn data(size: usize, words: &[Word], ctx: &mut Context) -> Result<Vec<u8>> {
    let mut encoder = Encoder::new(words, ctx, Opcode::default());
    let mut out = Vec::new();

    loop {
        let (text, comma) = encoder.operand().ok_or(Error::MissingOperand("data"))?;
        match quoted(&text) {
            Some(bytes) => {
                for b in bytes {
                    push_item(&mut out, size, b as u64);
                }
            },
            None => {
                let value = expr::evaluate(&text, encoder.ctx)?;
                push_item(&mut out, size, value.value);
            },
        }
        if !comma {
            break;
        }
    }
    encoder.end()?;
    Ok(out)
}

// Optional single argument of ORG/ORGH/ORGF/FIT/RES
pub fn argument(words: &[Word], ctx: &mut Context) -> Result<Option<u64>> {
    let mut encoder = Encoder::new(words, ctx, Opcode::default());
    let value = match encoder.operand() {
        Some((text, _)) => Some(expr::evaluate(&text, encoder.ctx)?.value),
        None => None,
    };
    encoder.end()?;
    Ok(value)
}

// Right hand side of `name = expr`
pub fn assignment(words: &[Word], ctx: &mut Context) -> Result<u64> {
    let mut encoder = Encoder::new(words, ctx, Opcode::default());
    let (value, _, _) = encoder.value("expression")?;
    encoder.end()?;
    Ok(value.value)
}

fn quoted(text: &str) -> Option<Vec<u8>> {
    if !text.starts_with('"') {
        return None;
    }
    let mut pos = 0;
    let bytes = number::read_str_bytes(&mut pos, text);
    if pos == text.len() && text.len() > 1 { Some(bytes) } else { None }
}

fn push_item(out: &mut Vec<u8>, size: usize, value: u64) {
    let mut buf = [0u8; 8];
    LittleEndian::write_u64(&mut buf, value);
    out.extend_from_slice(&buf[..size]);
}

// Several mnemonics have a second encoding picked by how the operands look
fn select_form(mnemonic: &str, enc: InstEnc, words: &[Word]) -> InstEnc {
    let immediate = |w: Option<&Word>| w.map_or(false, |w| w.text.starts_with('#'));

    let alternate = match enc.shape {
        Shape::Nibble(_) | Shape::AltD => !words.iter().any(|w| w.comma),
        Shape::Jump => immediate(words.first()),
        Shape::CallD => {
            let pointer = words.first().map_or(false, |w| match w.token {
                Token::Register(r) => r >= OFFS_PA && r <= OFFS_PTRB,
                _ => false,
            });
            pointer && immediate(words.get(1))
        },
        Shape::GetRnd => words.first().map_or(true, |w| match w.token {
            Token::Flag(_) => true,
            _ => false,
        }),
        _ => false,
    };

    if alternate {
        token::alternate(mnemonic).unwrap_or(enc)
    } else {
        enc
    }
}

// PTRA/PTRB with an optional ++/-- before or after it and an optional [index]
//
// Returns the %1SUPNNNNN source field: S picks PTRB, U updates the pointer, P uses it
// before the update. The index is -16..15 and counts down for '--'. None when `text`
// is not a pointer expression at all.
fn ptr_index(text: &str, ctx: &mut Context) -> Result<Option<u32>> {
    let upper = text.to_ascii_uppercase();
    let (body, index) = match (upper.find('['), upper.ends_with(']')) {
        (Some(open), true) => (&upper[..open], Some(&text[open + 1..text.len() - 1])),
        _ => (upper.as_str(), None),
    };

    let (body, update, post, step) = if let Some(rest) = body.strip_prefix("++") {
        (rest, true, false, 1)
    } else if let Some(rest) = body.strip_prefix("--") {
        (rest, true, false, -1)
    } else if let Some(rest) = body.strip_suffix("++") {
        (rest, true, true, 1)
    } else if let Some(rest) = body.strip_suffix("--") {
        (rest, true, true, -1)
    } else {
        (body, false, false, 0)
    };

    let ptrb = match body {
        "PTRA" => false,
        "PTRB" => true,
        _ => return Ok(None),
    };

    let mut n: i64 = step;
    if let Some(index) = index {
        let value = expr::evaluate(index, ctx)?.value as i64;
        n = if step < 0 { value.wrapping_neg() } else { value };
        if !(-16..=15).contains(&n) {
            return Err(Error::PointerIndex(n as u32));
        }
    }

    let sup = 0x100 | ((ptrb as u32) << 7) | ((update as u32) << 6) | ((post as u32) << 5);
    Ok(Some(sup | (n as u32 & 0x1f)))
}

struct Encoder<'w, 'c, 'a> {
    words: &'w [Word],
    pos: usize,
    ctx: &'c mut Context<'a>,
    op: Opcode,
    // Bits 31:9 of an augmented D/S immediate
    augd: Option<u32>,
    augs: Option<u32>,
}

impl<'w, 'c, 'a> Encoder<'w, 'c, 'a> {
    fn new(words: &'w [Word], ctx: &'c mut Context<'a>, op: Opcode) -> Encoder<'w, 'c, 'a> {
        Encoder { words, pos: 0, ctx, op, augd: None, augs: None }
    }

    fn shape(&mut self, shape: Shape) -> Result<()> {
        match shape {
            Shape::Nop => {
                // All zero, condition included
                self.op = Opcode::default();
                self.end()
            },
            Shape::Inst => self.end(),
            Shape::D => {
                self.dst(ImmTo::None)?;
                self.end()
            },
            Shape::Wcz => self.flags(Allow::Wcz),
            Shape::DWcz | Shape::GetRnd => {
                self.dst(ImmTo::None)?;
                self.flags(Allow::Wcz)
            },
            Shape::WzD => {
                self.dst(ImmTo::Z)?;
                self.end()
            },
            Shape::ImD => {
                self.dst(ImmTo::I)?;
                self.end()
            },
            Shape::DWc => {
                self.dst(ImmTo::None)?;
                self.flags(Allow::Wc)
            },
            Shape::ImDWc => {
                self.dst(ImmTo::I)?;
                self.flags(Allow::Wc)
            },
            Shape::ImDWcz => {
                self.dst(ImmTo::I)?;
                self.flags(Allow::Wcz)
            },
            Shape::TestPin => {
                self.dst(ImmTo::I)?;
                let variant = self.test_flag()?;
                self.op.add(opcode::SRC, variant);
                self.end()
            },
            Shape::ImS => {
                self.src()?;
                self.end()
            },
            Shape::DImS | Shape::DImSPtr => {
                self.dst_src(shape == Shape::DImSPtr)?;
                self.end()
            },
            Shape::DImSWc => {
                self.dst_src(false)?;
                self.flags(Allow::Wc)
            },
            Shape::DImSWz => {
                self.dst_src(false)?;
                self.flags(Allow::Wz)
            },
            Shape::DImSWcz | Shape::DImSPtrWcz | Shape::CallD => {
                self.dst_src(shape == Shape::DImSPtrWcz)?;
                self.flags(Allow::Wcz)
            },
            Shape::TestBit => {
                self.dst_src(false)?;
                let variant = self.test_flag()?;
                self.op.add(opcode::INST7, variant);
                self.end()
            },
            Shape::WzDImS | Shape::WzDImSPtr => {
                let comma = self.dst(ImmTo::Z)?;
                self.comma(comma)?;
                self.source(shape == Shape::WzDImSPtr)?;
                self.end()
            },
            Shape::WzDImSWc => {
                let comma = self.dst(ImmTo::Z)?;
                self.comma(comma)?;
                self.src()?;
                self.flags(Allow::Wc)
            },
            Shape::Nibble(max) => {
                let comma = self.dst(ImmTo::None)?;
                self.comma(comma)?;
                let comma = self.src()?;
                self.comma(comma)?;
                self.index(max)?;
                self.end()
            },
            Shape::AltD => {
                let comma = self.dst(ImmTo::None)?;
                self.comma(comma)?;
                self.src()?;
                self.end()
            },
            Shape::Jump => {
                self.dst(ImmTo::None)?;
                self.flags(Allow::Wcz)
            },
            Shape::PtrA20 => {
                let comma = self.pointer()?;
                self.comma(comma)?;
                self.address()?;
                self.end()
            },
            Shape::PcA20 => {
                self.address()?;
                self.end()
            },
            Shape::Imm23 => {
                self.augment()?;
                self.end()
            },
            Shape::Modcz => {
                let (c, comma) = self.modcz_param()?;
                self.comma(comma)?;
                let (z, _) = self.modcz_param()?;
                self.op.set_dst(((c as u32) << 4) | z as u32);
                self.flags(Allow::Wcz)
            },
            Shape::Modc => {
                let (c, _) = self.modcz_param()?;
                self.op.set_dst((c as u32) << 4);
                self.flags(Allow::Wcz)
            },
            Shape::Modz => {
                let (z, _) = self.modcz_param()?;
                self.op.set_dst(z as u32);
                self.flags(Allow::Wcz)
            },
        }
    }

    // Next operand expression, joining words that continue it. None at the end of
    // the line or on a flag keyword.
    fn operand(&mut self) -> Option<(String, bool)> {
        let first = self.words.get(self.pos)?;
        if let Token::Flag(_) = first.token {
            return None;
        }

        let mut text = first.text.clone();
        let mut comma = first.comma;
        self.pos += 1;

        while !comma {
            let next = match self.words.get(self.pos) {
                Some(w) if w.token.is_plain() => w,
                _ => break,
            };
            let after = text.chars().last().map_or(false, |c| JOIN_AFTER.contains(c));
            let before = next.text.chars().next().map_or(false, |c| JOIN_BEFORE.contains(c));
            if !(after || before) {
                break;
            }
            text.push_str(&next.text);
            comma = next.comma;
            self.pos += 1;
        }
        Some((text, comma))
    }

    fn value(&mut self, what: &'static str) -> Result<(Value, String, bool)> {
        let (text, comma) = self.operand().ok_or(Error::MissingOperand(what))?;
        let value = expr::evaluate(&text, self.ctx)?;
        Ok((value, text, comma))
    }

    fn field(&mut self, field: RangeInclusive<usize>, name: &'static str, value: u64) -> Result<()> {
        if value > FIELD_MAX {
            return Err(Error::FieldOverflow { field: name, value });
        }
        self.op.set(field, value as u32);
        Ok(())
    }

    // Immediate D/S field, returns the augment when the value needs one
    fn immediate(&mut self, field: RangeInclusive<usize>, name: &'static str, value: Value) -> Result<Option<u32>> {
        if value.augmented || value.value > FIELD_MAX {
            self.op.set(field, value.value as u32 & FIELD_MAX as u32);
            return Ok(Some((value.value >> 9) as u32));
        }
        self.field(field, name, value.value)?;
        Ok(None)
    }

    fn comma(&self, comma: bool) -> Result<()> {
        if comma {
            return Ok(());
        }
        match self.words.get(self.pos) {
            Some(w) => Err(Error::ExpectedComma(w.text.clone())),
            None => Err(Error::ExpectedComma("end of line".to_string())),
        }
    }

    // Returns whether the operand was followed by a ','
    fn dst(&mut self, imm: ImmTo) -> Result<bool> {
        let (value, text, comma) = self.value("destination")?;
        if !value.immediate {
            self.field(opcode::DST, "DST", value.value)?;
            return Ok(comma);
        }
        match imm {
            ImmTo::None => return Err(Error::UnexpectedImmediate(text)),
            ImmTo::I => self.op.set_im(),
            ImmTo::Z => self.op.set_wz(),
        }
        self.augd = self.immediate(opcode::DST, "DST", value)?;
        Ok(comma)
    }

    fn src(&mut self) -> Result<bool> {
        let (value, _, comma) = self.value("source")?;
        if value.immediate {
            self.op.set_im();
            self.augs = self.immediate(opcode::SRC, "SRC", value)?;
        } else {
            self.field(opcode::SRC, "SRC", value.value)?;
        }
        Ok(comma)
    }

    // {#}S, or a pointer expression for the hub reads and writes
    fn source(&mut self, ptr: bool) -> Result<bool> {
        if !ptr {
            return self.src();
        }
        let start = self.pos;
        let (text, comma) = self.operand().ok_or(Error::MissingOperand("source"))?;
        match ptr_index(&text, self.ctx)? {
            Some(index) => {
                self.op.set_im();
                self.op.set_src(index);
                Ok(comma)
            },
            None => {
                self.pos = start;
                self.src()
            },
        }
    }

    // D,{#}S where a lone D (no ',') stands for D,D
    fn dst_src(&mut self, ptr: bool) -> Result<()> {
        let (value, text, comma) = self.value("destination")?;
        if value.immediate {
            return Err(Error::UnexpectedImmediate(text));
        }
        self.field(opcode::DST, "DST", value.value)?;

        if comma {
            self.source(ptr)?;
            return Ok(());
        }
        match self.words.get(self.pos) {
            Some(w) if w.token.is_plain() => Err(Error::ExpectedComma(w.text.clone())),
            _ => self.field(opcode::SRC, "SRC", value.value),
        }
    }

    // #n index for the nibble/byte/word instructions
    fn index(&mut self, max: u8) -> Result<()> {
        let (value, text, _) = self.value("immediate #n")?;
        if !value.immediate {
            return Err(Error::ExpectedImmediate(text));
        }
        if value.value > max as u64 {
            return Err(Error::IndexRange { max, value: value.value });
        }
        let width = 8 - max.leading_zeros() as usize;
        self.op.set((opcode::NNN_LO + width - 1)..=opcode::NNN_LO, value.value as u32);
        Ok(())
    }

    // PA/PB/PTRA/PTRB select for LOC and CALLD #A
    fn pointer(&mut self) -> Result<bool> {
        let (text, comma) = self.operand().ok_or(Error::MissingOperand("pointer register"))?;
        match token::lookup(&text) {
            Some(Token::Register(r)) if r >= OFFS_PA && r <= OFFS_PTRB => {
                self.op.set(opcode::WW, (r - OFFS_PA) as u32);
                Ok(comma)
            },
            _ => Err(Error::InvalidPointer(text)),
        }
    }

    // #A relative within the same memory region, #\A and cross region absolute
    fn address(&mut self) -> Result<()> {
        let (value, text, _) = self.value("address")?;
        if !value.immediate {
            return Err(Error::ExpectedImmediate(text));
        }
        if value.value > 0xfffff {
            return Err(Error::AddressRange(value.value));
        }

        let pc = self.ctx.pc;
        let same_region = (value.value < HUB_ADDR0 as u64) == (pc < HUB_ADDR0);
        if !value.absolute && same_region {
            let next = image::step(pc, 4) as u64;
            self.op.set(opcode::REL, 1);
            self.op.set(opcode::A20, value.value.wrapping_sub(next) as u32);
        } else {
            self.op.set(opcode::A20, value.value as u32);
        }
        Ok(())
    }

    // AUGS/AUGD carry bits 31:9 of the value
    fn augment(&mut self) -> Result<()> {
        let (value, text, _) = self.value("augment value")?;
        if !value.immediate {
            return Err(Error::ExpectedImmediate(text));
        }
        self.op.set(opcode::IMM23, (value.value >> 9) as u32);
        Ok(())
    }

    fn modcz_param(&mut self) -> Result<(u8, bool)> {
        let (text, comma) = self.operand().ok_or(Error::MissingOperand("MODCZ parameter"))?;
        match token::lookup(&text) {
            Some(Token::Modcz(code)) => Ok((code, comma)),
            Some(_) => Err(Error::InvalidModcz(text)),
            None => {
                let value = expr::evaluate(&text, self.ctx)?;
                if value.value > 15 {
                    return Err(Error::ModczRange(value.value));
                }
                Ok((value.value as u8, comma))
            },
        }
    }

    // One optional WC/WZ/WCZ, then the end of the line
    fn flags(&mut self, allow: Allow) -> Result<()> {
        if let Some(word) = self.words.get(self.pos) {
            match (word.token, allow) {
                (Token::Flag(Flag::Wc), Allow::Wc) | (Token::Flag(Flag::Wc), Allow::Wcz) => self.op.set_wc(),
                (Token::Flag(Flag::Wz), Allow::Wz) | (Token::Flag(Flag::Wz), Allow::Wcz) => self.op.set_wz(),
                (Token::Flag(Flag::Wcz), Allow::Wcz) => {
                    self.op.set_wc();
                    self.op.set_wz();
                },
                _ => {
                    return Err(Error::UnexpectedFlag {
                        found: word.text.clone(),
                        expected: allow.expected(),
                    })
                },
            }
            self.pos += 1;
        }
        self.end()
    }

    // Mandatory flag of TESTB/TESTBN/TESTP/TESTPN, returns the variant offset
    fn test_flag(&mut self) -> Result<u32> {
        let word = self.words.get(self.pos).ok_or(Error::MissingFlag(EXPECT_TEST))?;
        let (carry, variant) = match word.token {
            Token::Flag(Flag::Wc)   => (true, 0),
            Token::Flag(Flag::Wz)   => (false, 0),
            Token::Flag(Flag::AndC) => (true, 2),
            Token::Flag(Flag::AndZ) => (false, 2),
            Token::Flag(Flag::OrC)  => (true, 4),
            Token::Flag(Flag::OrZ)  => (false, 4),
            Token::Flag(Flag::XorC) => (true, 6),
            Token::Flag(Flag::XorZ) => (false, 6),
            _ => {
                return Err(Error::UnexpectedFlag { found: word.text.clone(), expected: EXPECT_TEST })
            },
        };

        if carry {
            self.op.set_wc();
        } else {
            self.op.set_wz();
        }
        self.pos += 1;
        Ok(variant)
    }

    fn end(&self) -> Result<()> {
        let rest = &self.words[self.pos.min(self.words.len())..];
        if rest.is_empty() {
            Ok(())
        } else {
            let extra: Vec<&str> = rest.iter().map(|w| w.text.as_str()).collect();
            Err(Error::ExtraParameters(extra.join(" ")))
        }
    }
}


#[cfg(test)]
mod encoder_tests {
    use super::*;
    use crate::atom::Atom;
    use crate::opcode::COND_ALWAYS;
    use crate::symbol::SymbolTable;
    use crate::token::Tokenizer;

    fn encode_at(line: &str, cond: u8, pc: u32, symbols: &mut SymbolTable) -> Result<Encoded> {
        let words = Tokenizer::new().split(line).unwrap_or_default();
        let (mnemonic, rest) = words.split_first().unwrap();
        let enc = match mnemonic.token {
            Token::Inst(enc) => enc,
            t => panic!("not an instruction {:?}", t),
        };
        let mut ctx = Context { symbols, scope: "", line: 1, pc };
        encode(&mnemonic.text, enc, cond, rest, &mut ctx)
    }

    fn assemble_at(line: &str, pc: u32, symbols: &mut SymbolTable) -> Result<u32> {
        encode_at(line, COND_ALWAYS, pc, symbols).map(|e| e.word)
    }

    fn asm(line: &str) -> Result<u32> {
        let mut symbols = SymbolTable::new();
        assemble_at(line, 0, &mut symbols)
    }

    fn longs(line: &str) -> Result<Vec<u32>> {
        let mut symbols = SymbolTable::new();
        encode_at(line, COND_ALWAYS, 0, &mut symbols).map(|e| e.longs())
    }

    #[test]
    fn test_core_layout() {
        // EEEE 0001000 CZI DDDDDDDDD SSSSSSSSS
        assert_eq!(asm("add 1, 2"), Ok(0xf1000202));
        assert_eq!(asm("add 1, #2 wc"), Ok(0xf1140202));
        assert_eq!(asm("add 1, #2 wcz"), Ok(0xf11c0202));
        assert_eq!(asm("mov $1ff, #$1ff"), Ok(0xf607ffff));
        assert_eq!(asm("mov pa, ptra"), Ok(0xf603edf8));
    }

    #[test]
    fn test_same_dst_src() {
        // NOT D is NOT D,D
        assert_eq!(asm("not 5"), Ok(0xf6200a05));
        assert_eq!(asm("not 5 wz"), Ok(0xf6280a05));
        assert_eq!(asm("not 5 6"), Err(Error::ExpectedComma("6".to_string())));
    }

    #[test]
    fn test_operand_joining() {
        assert_eq!(asm("mov 1, #2 + 3 wc"), Ok(0xf6140205));
        assert_eq!(asm("mov 1, # 4"), Ok(0xf6040204));
    }

    #[test]
    fn test_field_errors() {
        assert_eq!(asm("mov 1, $200"), Err(Error::FieldOverflow { field: "SRC", value: 0x200 }));
        assert_eq!(asm("mov $200, 1"), Err(Error::FieldOverflow { field: "DST", value: 0x200 }));
        assert_eq!(asm("mov #1, 1"), Err(Error::UnexpectedImmediate("#1".to_string())));
        assert_eq!(asm("mov"), Err(Error::MissingOperand("destination")));
    }

    #[test]
    fn test_flags() {
        assert_eq!(
            asm("mul 1, 2 wc"),
            Err(Error::UnexpectedFlag { found: "wc".to_string(), expected: "WZ" })
        );
        assert_eq!(asm("mul 1, 2 wz"), Ok(0xfa080202));
        assert_eq!(
            asm("add 1, 2 foo"),
            Err(Error::UnexpectedFlag { found: "foo".to_string(), expected: "WC, WZ, or WCZ" })
        );
    }

    #[test]
    fn test_single_flag() {
        assert_eq!(asm("add 1, 2 wc wc"), Err(Error::ExtraParameters("wc".to_string())));
        assert_eq!(asm("add 1, 2 wz wc"), Err(Error::ExtraParameters("wc".to_string())));
        assert_eq!(asm("add 1, 2 wcz wcz"), Err(Error::ExtraParameters("wcz".to_string())));
        assert_eq!(asm("ret wcz 5"), Err(Error::ExtraParameters("5".to_string())));
        assert_eq!(asm("getrnd 3 wc wz"), Err(Error::ExtraParameters("wz".to_string())));
    }

    #[test]
    fn test_extra_parameters() {
        assert_eq!(asm("getct 1 2"), Err(Error::ExtraParameters("2".to_string())));
        assert_eq!(asm("getct 1"), Ok(0xfd60021a));
        assert_eq!(asm("nop 1"), Err(Error::ExtraParameters("1".to_string())));
    }

    #[test]
    fn test_fixed_forms() {
        assert_eq!(asm("nop"), Ok(0));
        assert_eq!(asm("ret"), Ok(0xfd64002d));
        assert_eq!(asm("ret wcz"), Ok(0xfd7c002d));
        assert_eq!(asm("reti0"), Ok(0xfb3bffff));
        assert_eq!(asm("resi3"), Ok(0xfb3be1f1));
        assert_eq!(asm("popa 3"), Ok(0xfb04075f));
        assert_eq!(asm("pusha #3"), Ok(0xfc6c0761));
        assert_eq!(asm("xstop"), Ok(0xfcac0000));
        assert_eq!(asm("waitint"), Ok(0xfd602024));
        assert_eq!(asm("pollct2 wc"), Ok(0xfd700424));
    }

    #[test]
    fn test_wz_dst() {
        // EEEE 1100000 0LI DDDDDDDDD SSSSSSSSS
        assert_eq!(asm("wrpin 1, 2"), Ok(0xfc000202));
        assert_eq!(asm("wrpin #1, #2"), Ok(0xfc0c0202));
        assert_eq!(asm("wrpin 1 2"), Err(Error::ExpectedComma("2".to_string())));
        assert_eq!(asm("coginit #1, #2 wc"), Ok(0xfcfc0202));
    }

    #[test]
    fn test_imm_dst() {
        assert_eq!(asm("hubset #$ff"), Ok(0xfd65fe00));
        assert_eq!(asm("waitx #10 wc"), Ok(0xfd74141f));
        assert_eq!(asm("cogid 3 wc"), Ok(0xfd700601));
        assert_eq!(asm("drvh #56"), Ok(0xfd647059));
    }

    #[test]
    fn test_locknew_register_only() {
        // EEEE 1101011 C00 DDDDDDDDD 000000100
        assert_eq!(asm("locknew 1"), Ok(0xfd600204));
        assert_eq!(asm("locknew 1 wc"), Ok(0xfd700204));
        assert_eq!(asm("locknew #1"), Err(Error::UnexpectedImmediate("#1".to_string())));
        assert_eq!(
            asm("locknew 1 wz"),
            Err(Error::UnexpectedFlag { found: "wz".to_string(), expected: "WC" })
        );
    }

    #[test]
    fn test_test_variants() {
        // TESTB W/AND/OR/XOR
        assert_eq!(asm("testb 1, #2 wc"), Ok(0xf4140202));
        assert_eq!(asm("testb 1, #2 andz"), Ok(0xf44c0202));
        assert_eq!(asm("testbn 1, #2 xorc"), Ok(0xf4f40202));
        assert_eq!(asm("testb 1, #2"), Err(Error::MissingFlag(EXPECT_TEST)));

        // TESTP S variant
        assert_eq!(asm("testp #5 wc"), Ok(0xfd740a40));
        assert_eq!(asm("testpn #5 orz"), Ok(0xfd6c0a45));
        assert_eq!(
            asm("testp #5 wcz"),
            Err(Error::UnexpectedFlag { found: "wcz".to_string(), expected: EXPECT_TEST })
        );
    }

    #[test]
    fn test_nibble() {
        // EEEE 100000N NNI DDDDDDDDD SSSSSSSSS
        assert_eq!(asm("setnib 1, #2, #7"), Ok(0xf83c0202));
        assert_eq!(asm("getbyte 1, 2, #3"), Ok(0xf8f80202));
        assert_eq!(asm("getword 1, 2, #1"), Ok(0xf9380202));
        assert_eq!(asm("getword 1, 2, #2"), Err(Error::IndexRange { max: 1, value: 2 }));
        assert_eq!(asm("getword 1, 2, 1"), Err(Error::ExpectedImmediate("1".to_string())));
        assert_eq!(asm("getnib 1, 2"), Err(Error::ExpectedComma("end of line".to_string())));

        // Single operand picks the ALTxx form
        assert_eq!(asm("setnib #5"), Ok(0xf8040005));
        assert_eq!(asm("getbyte 7"), Ok(0xf8e00e00));
    }

    #[test]
    fn test_alt() {
        assert_eq!(asm("altd 3, #4"), Ok(0xf98c0604));
        assert_eq!(asm("altd 3"), Ok(0xf98c0600));
        assert_eq!(asm("alti 3"), Ok(0xf9a40764));
    }

    #[test]
    fn test_getrnd() {
        assert_eq!(asm("getrnd 3"), Ok(0xfd60061b));
        assert_eq!(asm("getrnd wc"), Ok(0xfd74001b));
    }

    #[test]
    fn test_jump_forms() {
        // Register form
        assert_eq!(asm("jmp 5"), Ok(0xfd600a2c));
        // Relative in cog: 8 - (0 + 1)
        assert_eq!(asm("jmp #8"), Ok(0xfd900007));
        // Absolute
        assert_eq!(asm("jmp #\\8"), Ok(0xfd800008));
        // Backwards wraps to 20 bits
        assert_eq!(asm("call #0"), Ok(0xfdbfffff));
        // Cog to hub is absolute
        assert_eq!(asm("calla #$400"), Ok(0xfdc00400));

        let mut symbols = SymbolTable::new();
        assert_eq!(assemble_at("jmp #$400", 0x800, &mut symbols), Ok(0xfd9ffbfc));
        assert_eq!(assemble_at("jmp #$100", 0x800, &mut symbols), Ok(0xfd800100));
    }

    #[test]
    fn test_loc_calld() {
        // EEEE 11101WW RAA AAAAAAAAA AAAAAAAAA
        assert_eq!(asm("loc ptrb, #\\$1234"), Ok(0xfee01234));
        assert_eq!(asm("loc pa, #\\$1234"), Ok(0xfe801234));
        assert_eq!(asm("loc 5, #\\$1234"), Err(Error::InvalidPointer("5".to_string())));
        assert_eq!(asm("calld pb, #\\$40"), Ok(0xfe200040));
        assert_eq!(asm("calld 1, #2"), Ok(0xfb240202));
        assert_eq!(asm("calld 1, #2 wcz"), Ok(0xfb3c0202));
    }

    #[test]
    fn test_augment() {
        // EEEE 11110NN NNN NNNNNNNNN NNNNNNNNN
        assert_eq!(asm("augs #$12345678"), Ok(0xff091a2b));
        assert_eq!(asm("augd #$fffffe00"), Ok(0xffffffff));
        assert_eq!(asm("augs 5"), Err(Error::ExpectedImmediate("5".to_string())));
    }

    #[test]
    fn test_augment_prefix() {
        assert_eq!(longs("mov 1, #$1ff"), Ok(vec![0xf60403ff]));
        assert_eq!(longs("mov 1, #$200"), Ok(vec![0xff000001, 0xf6040200]));
        assert_eq!(longs("mov 1, #$12345678"), Ok(vec![0xff091a2b, 0xf6040278]));
        assert_eq!(longs("mov 1, ##5"), Ok(vec![0xff000000, 0xf6040205]));
        assert_eq!(longs("hubset #$1234"), Ok(vec![0xff800009, 0xfd646800]));
        // AUGD goes first
        assert_eq!(longs("wrpin #$400, #$600"), Ok(vec![0xff800002, 0xff000003, 0xfc0c0000]));

        // The prefix runs under the instruction's condition
        let mut symbols = SymbolTable::new();
        let encoded = encode_at("mov 1, #$400", 0xc, 0, &mut symbols).unwrap();
        assert_eq!(encoded.augs, Some(0xcf000002));
        assert_eq!(encoded.augd, None);
        assert_eq!(encoded.word, 0xc6040200);

        // Registers never augment
        assert_eq!(longs("mov 1, $200"), Err(Error::FieldOverflow { field: "SRC", value: 0x200 }));
    }

    #[test]
    fn test_pointer_index() {
        // S = %1SUPNNNNN with I set
        assert_eq!(asm("rdlong 1, ptra"), Ok(0xfb040300));
        assert_eq!(asm("rdlong 1, ptra++"), Ok(0xfb040361));
        assert_eq!(asm("rdlong 1, --ptrb wc"), Ok(0xfb1403df));
        assert_eq!(asm("rdlong 1, ptra[3]"), Ok(0xfb040303));
        assert_eq!(asm("rdlong 1, PTRA[-1]"), Ok(0xfb04031f));
        assert_eq!(asm("rdlong 1, ++ptrb[4]"), Ok(0xfb0403c4));
        assert_eq!(asm("rdlong 1, ptra--[2]"), Ok(0xfb04037e));
        assert_eq!(asm("rdbyte 1, ptrb[-16]"), Ok(0xfac40390));
        assert_eq!(asm("wrlong #5, ptrb++"), Ok(0xfc6c0be1));
        assert_eq!(asm("wmlong 1, ptra++"), Ok(0xfa7c0361));

        // Plain sources are unchanged
        assert_eq!(asm("rdlong 1, 2"), Ok(0xfb000202));
        assert_eq!(asm("mov 1, ptra"), Ok(0xf60003f8));

        assert_eq!(asm("rdlong 1, ptra[16]"), Err(Error::PointerIndex(16)));
        assert_eq!(asm("rdlong 1, --ptra[17]"), Err(Error::PointerIndex(0xffffffef)));
    }

    #[test]
    fn test_modcz() {
        // EEEE 1101011 CZ1 0cccczzzz 001101111
        assert_eq!(asm("modcz _set, _clr wcz"), Ok(0xfd7de06f));
        assert_eq!(asm("modcz 1, _nz"), Ok(0xfd642a6f));
        assert_eq!(asm("modc _c wc"), Ok(0xfd75806f));
        assert_eq!(asm("modz _z wz"), Ok(0xfd6c146f));
        assert_eq!(asm("modz 16"), Err(Error::ModczRange(16)));
        assert_eq!(asm("modz pa"), Err(Error::InvalidModcz("pa".to_string())));
    }

    #[test]
    fn test_symbol_operands() {
        let mut symbols = SymbolTable::new();
        symbols.define("cnt", Atom::Addr(0x10), 1);
        assert_eq!(assemble_at("djnz cnt, #cnt - 1", 0, &mut symbols), Ok(0xfb6c200f));
        // Forward reference evaluates to 0
        assert_eq!(assemble_at("mov later, #1", 0, &mut symbols), Ok(0xf6040001));
        assert!(symbols.contains("later"));
    }

    fn directive(words: &str) -> Vec<Word> {
        Tokenizer::new().split(words).unwrap_or_default()
    }

    #[test]
    fn test_data_items() {
        let mut symbols = SymbolTable::new();
        let mut ctx = Context { symbols: &mut symbols, scope: "", line: 1, pc: 0 };

        assert_eq!(data(1, &directive("1, 2, $1ff"), &mut ctx), Ok(vec![1, 2, 0xff]));
        assert_eq!(data(2, &directive("$1234"), &mut ctx), Ok(vec![0x34, 0x12]));
        assert_eq!(data(4, &directive("1 + 1"), &mut ctx), Ok(vec![2, 0, 0, 0]));
        assert_eq!(data(1, &directive("\"hi\", 0"), &mut ctx), Ok(vec![b'h', b'i', 0]));
        assert_eq!(data(2, &directive("\"A\""), &mut ctx), Ok(vec![b'A', 0]));
        assert_eq!(data(1, &directive("1,"), &mut ctx), Err(Error::MissingOperand("data")));
        assert_eq!(data(1, &directive(""), &mut ctx), Err(Error::MissingOperand("data")));
    }

    #[test]
    fn test_argument() {
        let mut symbols = SymbolTable::new();
        let mut ctx = Context { symbols: &mut symbols, scope: "", line: 1, pc: 0 };

        assert_eq!(argument(&directive(""), &mut ctx), Ok(None));
        assert_eq!(argument(&directive("$10"), &mut ctx), Ok(Some(0x10)));
        assert_eq!(argument(&directive("$10 5"), &mut ctx), Err(Error::ExtraParameters("5".to_string())));
        assert_eq!(assignment(&directive("3 * 4"), &mut ctx), Ok(12));
        assert_eq!(assignment(&directive(""), &mut ctx), Err(Error::MissingOperand("expression")));
    }
}
