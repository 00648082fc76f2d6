use std::collections::BTreeMap;
use std::fmt::Write;
use std::fs;
use std::path::Path;

use log::{debug, trace, warn};

use crate::atom::Atom;
use crate::encoder::{self, Encoded};
use crate::error::{Error, Result};
use crate::expr::Context;
use crate::image::{self, Image, HUB_ADDR0, MEM_SIZE};
use crate::opcode::COND_ALWAYS;
use crate::symbol::{self, Symbol, SymbolTable};
use crate::token::{self, Directive, Token, Tokenizer, Word};


// Everything one source line produced
#[derive(Debug, Clone, Default)]
pub struct Line {
    pub lineno: usize,
    pub pc: u32,
    pub source: String,
    pub words: Vec<Word>,
    // AUGD/AUGS longs stored ahead of the opcode
    pub prefix: Vec<u32>,
    pub opcode: Option<u32>,
    pub data: Vec<u8>,
    pub errors: Vec<Error>,
}

// Result of a handler, committed by the driver only on success
enum Output {
    None,
    Opcode(Encoded),
    Data(Vec<u8>),
}


// Single pass assembler
//
// Lines are numbered from 1. Blank lines and block comments leave no entry behind.
// Symbols that are used before their definition read as 0 and the words that used
// them are never revisited.
#[derive(Debug, Default)]
pub struct Assembler {
    tokenizer: Tokenizer,
    symbols: SymbolTable,
    image: Image,
    lines: BTreeMap<usize, Line>,
    // Failures to get at the source at all, reported as line 0
    io_errors: Vec<Error>,

    lineno: usize,
    curr_pc: u32,
    next_pc: u32,
    last_pc: u32,
    // One past the highest committed byte
    image_end: usize,
    label: Option<String>,
    // Last global label, owner of the '.local' labels that follow
    scope: String,
}

impl Assembler {
    pub fn new() -> Assembler {
        Assembler::default()
    }

    pub fn clear(&mut self) {
        self.tokenizer.reset();
        self.symbols.clear();
        self.image.clear();
        self.lines.clear();
        self.io_errors.clear();
        self.lineno = 0;
        self.curr_pc = 0;
        self.next_pc = 0;
        self.last_pc = 0;
        self.image_end = 0;
        self.label = None;
        self.scope.clear();
    }

    pub fn assemble(&mut self, source: &str) {
        self.assemble_lines(source.lines());
    }

    pub fn assemble_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.clear();
        for line in lines {
            self.assemble_line(line.as_ref());
        }
        self.finish();
    }

    pub fn assemble_file<P: AsRef<Path>>(&mut self, path: P) {
        match fs::read_to_string(path.as_ref()) {
            Ok(source) => self.assemble(&source),
            Err(err) => {
                self.clear();
                let err = Error::from(err);
                warn!("line 0: {}", err);
                self.io_errors.push(err);
            },
        }
    }

    // Assembles the next line of the pass
    pub fn assemble_line(&mut self, source: &str) {
        self.lineno += 1;

        let expanded = token::expand_tabs(source);
        let words = match self.tokenizer.split(&expanded) {
            Some(words) if !words.is_empty() => words,
            _ => return,
        };

        self.curr_pc = self.next_pc;
        self.label = None;
        debug!("line {}: ${:05x} {}", self.lineno, self.curr_pc, expanded.trim_end());

        let code: Vec<Word> = words.iter().filter(|w| w.token != Token::Comment).cloned().collect();
        let mut line = Line {
            lineno: self.lineno,
            source: source.to_string(),
            words,
            ..Line::default()
        };

        match self.dispatch(&code) {
            Ok(output) => self.commit(&mut line, output),
            Err(err) => {
                warn!("line {}: {}", self.lineno, err);
                line.errors.push(err);
            },
        }

        // ORG and friends move the pc of their own line
        line.pc = self.curr_pc;
        self.last_pc = self.last_pc.max(self.next_pc);
        self.lines.insert(self.lineno, line);
    }

    fn finish(&mut self) {
        for sym in self.symbols.undefined() {
            debug!("undefined symbol '{}' used in lines {:?}", sym.name(), sym.references());
        }
        debug!(
            "{} lines, {} symbols, last pc ${:05x}, {} errors",
            self.lineno,
            self.symbols.len(),
            self.last_pc,
            self.error_count()
        );

        #[cfg(feature = "debug")]
        {
            // Whole listing of the pass
            for line in self.listing().lines() {
                debug!("{}", line);
            }
        }
    }

    fn dispatch(&mut self, words: &[Word]) -> Result<Output> {
        let mut rest = words;

        if let Some((first, tail)) = rest.split_first() {
            if first.token.is_plain() {
                self.define_label(&first.text)?;
                rest = tail;
            }
        }

        let mut cond = COND_ALWAYS;
        let mut cond_word = None;
        if let Some((first, tail)) = rest.split_first() {
            if let Token::Cond(code) = first.token {
                cond = code;
                cond_word = Some(first);
                rest = tail;
                if let Some(next) = rest.first() {
                    if let Token::Cond(_) = next.token {
                        return Err(Error::MultipleConditionals(next.text.clone()));
                    }
                }
            }
        }

        let (first, tail) = match rest.split_first() {
            Some(split) => split,
            None => return Ok(Output::None),
        };

        if let (Some(word), Token::Directive(_) | Token::Assign) = (cond_word, first.token) {
            return Err(Error::ConditionalDirective(word.text.clone()));
        }

        match first.token {
            Token::Inst(enc) => {
                let encoded = encoder::encode(&first.text, enc, cond, tail, &mut self.context())?;
                trace!("line {}: {} => {:08x?}", self.lineno, first.text, encoded.longs());
                Ok(Output::Opcode(encoded))
            },
            Token::Directive(directive) => self.directive(directive, tail),
            Token::Assign => self.assign(tail),
            Token::Modcz(_) => Err(Error::ModczParam(first.text.clone())),
            Token::Plain if self.is_constant(&first.text) => {
                Err(Error::ConstantAsInstruction(first.text.clone()))
            },
            _ => Err(Error::NotAnInstruction(first.text.clone())),
        }
    }

    fn context(&mut self) -> Context<'_> {
        Context { symbols: &mut self.symbols, scope: &self.scope, line: self.lineno, pc: self.curr_pc }
    }

    fn is_constant(&self, name: &str) -> bool {
        let name = symbol::scoped(&self.scope, name);
        self.symbols.get(&name).map_or(false, |s| s.is_defined())
    }

    // '.name' labels are filed under the last global label
    fn define_label(&mut self, name: &str) -> Result<()> {
        let starts_ok = name.chars().next().map_or(false, |c| c.is_alphabetic() || c == '_' || c == '.');
        if !starts_ok {
            return Err(Error::NotAnInstruction(name.to_string()));
        }

        let local = name.starts_with('.');
        let name = symbol::scoped(&self.scope, name);
        if !local {
            self.scope = name.clone();
        }

        if !self.symbols.define(&name, Atom::Addr(self.curr_pc), self.lineno) {
            let sym = self.symbols.lookup(&name);
            return Err(Error::Redefinition {
                name,
                line: sym.definition().unwrap_or(0),
                value: sym.value().to_u64(),
            });
        }
        trace!("line {}: {} = ${:05x}", self.lineno, name, self.curr_pc);
        self.label = Some(name);
        Ok(())
    }

    fn relabel(&mut self, value: Atom) {
        if let Some(name) = &self.label {
            trace!("line {}: {} = {}", self.lineno, name, value);
            self.symbols.set_value(name, value);
        }
    }

    fn assign(&mut self, words: &[Word]) -> Result<Output> {
        if self.label.is_none() {
            return Err(Error::MissingOperand("symbol name"));
        }
        let value = encoder::assignment(words, &mut self.context())?;

        let atom = if value > u32::MAX as u64 { Atom::Quad(value) } else { Atom::Long(value as u32) };
        self.relabel(atom);
        Ok(Output::None)
    }

    fn argument(&mut self, words: &[Word]) -> Result<Option<u64>> {
        encoder::argument(words, &mut self.context())
    }

    fn directive(&mut self, directive: Directive, words: &[Word]) -> Result<Output> {
        match directive {
            Directive::Byte => self.data_items(1, words),
            Directive::Word => self.data_items(2, words),
            Directive::Long => self.data_items(4, words),

            Directive::Res => {
                let count = self.argument(words)?.unwrap_or(1);
                let pc = self.curr_pc as u64;
                let end = if pc < HUB_ADDR0 as u64 {
                    pc.saturating_add(count)
                } else {
                    pc.saturating_add(count.saturating_mul(4))
                };
                if end > MEM_SIZE as u64 {
                    return Err(Error::HubExceeded(MEM_SIZE as u64));
                }
                self.next_pc = end as u32;
                Ok(Output::None)
            },

            Directive::Fit => {
                let limit = self.argument(words)?.unwrap_or(HUB_ADDR0 as u64);
                if self.curr_pc as u64 > limit {
                    return Err(Error::FitExceeded { limit, org: self.curr_pc as u64 });
                }
                Ok(Output::None)
            },

            Directive::Org => {
                let org = self.argument(words)?.unwrap_or(0);
                if org >= HUB_ADDR0 as u64 {
                    return Err(Error::OriginExceeded(org));
                }
                self.origin(org as u32);
                Ok(Output::None)
            },

            Directive::Orgh => {
                let org = self.argument(words)?.unwrap_or(HUB_ADDR0 as u64);
                if org >= MEM_SIZE as u64 {
                    return Err(Error::HubExceeded(MEM_SIZE as u64));
                }
                self.origin(org as u32);
                Ok(Output::None)
            },

            Directive::Orgf => {
                let fill = self.argument(words)?.ok_or(Error::MissingOperand("fill address"))?;
                if fill >= HUB_ADDR0 as u64 || self.curr_pc >= HUB_ADDR0 {
                    return Err(Error::OriginExceeded(fill));
                }
                let pc = self.curr_pc as u64;
                if fill < pc {
                    return Err(Error::FitExceeded { limit: fill, org: pc });
                }
                Ok(Output::Data(vec![0; ((fill - pc) * 4) as usize]))
            },

            Directive::Alignw | Directive::Alignl => {
                if let Some(extra) = words.first() {
                    return Err(Error::ExtraParameters(extra.text.clone()));
                }
                if self.curr_pc < HUB_ADDR0 {
                    return Ok(Output::None);
                }
                let align = if directive == Directive::Alignw { 2 } else { 4 };
                let pad = (align - self.curr_pc % align) % align;
                Ok(Output::Data(vec![0; pad as usize]))
            },
        }
    }

    fn data_items(&mut self, size: usize, words: &[Word]) -> Result<Output> {
        let bytes = encoder::data(size, words, &mut self.context())?;
        Ok(Output::Data(bytes))
    }

    // ORG/ORGH move the pc of this line and rebind its label
    fn origin(&mut self, org: u32) {
        self.curr_pc = org;
        self.next_pc = org;
        self.relabel(Atom::Addr(org));
    }

    fn commit(&mut self, line: &mut Line, output: Output) {
        let addr = image::byte_addr(self.curr_pc);
        match output {
            Output::None => {},
            Output::Opcode(encoded) => {
                let mut pc = self.curr_pc;
                for long in encoded.longs() {
                    self.store_long(image::byte_addr(pc), long);
                    pc = image::step(pc, 4);
                }
                self.next_pc = pc;
                line.prefix = encoded.augd.into_iter().chain(encoded.augs).collect();
                line.opcode = Some(encoded.word);
            },
            Output::Data(bytes) => {
                self.store(addr, &bytes);
                self.next_pc = image::step(self.curr_pc, bytes.len() as u32);
                line.data = bytes;
            },
        }
    }

    fn store_long(&mut self, addr: usize, long: u32) {
        if self.image.write_long(addr, long) {
            self.image_end = self.image_end.max(addr + 4);
        } else {
            debug!("line {}: ${:05x} is outside the image, dropped", self.lineno, addr);
        }
    }

    fn store(&mut self, addr: usize, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        if self.image.write_bytes(addr, bytes) {
            self.image_end = self.image_end.max(addr + bytes.len());
        } else {
            debug!("line {}: ${:05x} is outside the image, dropped", self.lineno, addr);
        }
    }

    pub fn line(&self, lineno: usize) -> Option<&Line> {
        self.lines.get(&lineno)
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.values()
    }

    pub fn pc(&self, lineno: usize) -> Option<u32> {
        self.line(lineno).map(|l| l.pc)
    }

    pub fn opcode(&self, lineno: usize) -> Option<u32> {
        self.line(lineno).and_then(|l| l.opcode)
    }

    pub fn data(&self, lineno: usize) -> &[u8] {
        self.line(lineno).map(|l| l.data.as_slice()).unwrap_or(&[])
    }

    pub fn words(&self, lineno: usize) -> &[Word] {
        self.line(lineno).map(|l| l.words.as_slice()).unwrap_or(&[])
    }

    // Line 0 holds the errors of loading the source
    pub fn errors(&self, lineno: usize) -> &[Error] {
        if lineno == 0 {
            return &self.io_errors;
        }
        self.line(lineno).map(|l| l.errors.as_slice()).unwrap_or(&[])
    }

    // (line, error) pairs in line order
    pub fn diagnostics(&self) -> Vec<(usize, &Error)> {
        let io = self.io_errors.iter().map(|e| (0, e));
        let lines = self.lines.values().flat_map(|l| l.errors.iter().map(move |e| (l.lineno, e)));
        io.chain(lines).collect()
    }

    pub fn error_count(&self) -> usize {
        self.io_errors.len() + self.lines.values().map(|l| l.errors.len()).sum::<usize>()
    }

    pub fn references(&self, lineno: usize) -> Vec<&Symbol> {
        self.symbols.references_in(lineno)
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    // Image bytes up to the last committed byte
    pub fn binary(&self) -> &[u8] {
        &self.image.as_bytes()[..self.image_end]
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn last_pc(&self) -> u32 {
        self.last_pc
    }

    // One row per line: number, pc, word or first data bytes, source. AUG prefixes get
    // a row of their own ahead of it, errors follow the line.
    pub fn listing(&self) -> String {
        let mut out = String::new();

        for line in self.lines.values() {
            let mut pc = line.pc;
            for long in &line.prefix {
                let _ = writeln!(out, "{:5} {:05x} {:08x}", line.lineno, pc, long);
                pc = image::step(pc, 4);
            }
            let code = match line.opcode {
                Some(word) => format!("{:08x}", word),
                None => {
                    let mut hex: String = line.data.iter().take(4).map(|b| format!("{:02x}", b)).collect();
                    if line.data.len() > 4 {
                        hex.push('+');
                    }
                    hex
                },
            };
            let _ = writeln!(out, "{:5} {:05x} {:<9} {}", line.lineno, pc, code, line.source);
            for err in &line.errors {
                let _ = writeln!(out, "      *** {}", err);
            }
        }
        out
    }
}
