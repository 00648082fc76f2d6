use phf;

use crate::opcode::{InstEnc, Shape};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag { Wc, Wz, Wcz, AndC, AndZ, OrC, OrZ, XorC, XorZ }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive { Byte, Word, Long, Res, Fit, Org, Orgf, Orgh, Alignw, Alignl }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    // Identifier, number or expression fragment
    Plain,
    Comment,
    Inst(InstEnc),
    Cond(u8),
    Flag(Flag),
    Register(u16),
    Modcz(u8),
    Directive(Directive),
    Assign,
}

impl Token {
    pub fn is_plain(&self) -> bool {
        *self == Token::Plain
    }
}

// Codegen from phf_codegen
include!(concat!(env!("OUT_DIR"), "/keywords.rs"));

// Keywords are case insensitive
pub fn lookup(word: &str) -> Option<Token> {
    KEYWORDS.get(word.to_uppercase().as_str()).cloned()
}

// Second encoding of a mnemonic, if it has one
pub fn alternate(mnemonic: &str) -> Option<InstEnc> {
    ALTERNATES.get(mnemonic.to_uppercase().as_str()).cloned()
}

pub fn classify(word: &str) -> Token {
    lookup(word).unwrap_or(Token::Plain)
}


#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub token: Token,
    // Character column in the tab expanded line
    pub column: usize,
    // Word was ended by a ','
    pub comma: bool,
}

impl Word {
    pub fn new(text: &str, column: usize) -> Word {
        Word { text: text.to_string(), token: classify(text), column, comma: false }
    }
}


pub fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut col = 0;

    for c in line.chars() {
        if c == '\t' {
            let pad = 8 - col % 8;
            out.extend(std::iter::repeat(' ').take(pad));
            col += pad;
        } else {
            out.push(c);
            col += 1;
        }
    }
    out
}


// Line splitter, keeps the open/closed state of `{ }` block comments between lines
#[derive(Debug, Default)]
pub struct Tokenizer {
    in_block: bool,
}

impl Tokenizer {
    pub fn new() -> Tokenizer {
        Tokenizer::default()
    }

    pub fn reset(&mut self) {
        self.in_block = false;
    }

    pub fn in_block(&self) -> bool {
        self.in_block
    }

    // None if the line belongs to a block comment
    pub fn split(&mut self, line: &str) -> Option<Vec<Word>> {
        if self.in_block {
            if line.contains('}') {
                self.in_block = false;
            }
            return None;
        }
        let trimmed = line.trim_start();
        if trimmed.starts_with('{') {
            if !trimmed.contains('}') {
                self.in_block = true;
            }
            return None;
        }
        Some(split_words(line))
    }
}

fn split_words(line: &str) -> Vec<Word> {
    let chars: Vec<char> = line.chars().collect();
    let mut words: Vec<Word> = Vec::new();
    let mut cur = String::new();
    let mut start = 0;
    let mut i = 0;

    fn flush(words: &mut Vec<Word>, cur: &mut String, start: usize, comma: bool) {
        if !cur.is_empty() {
            let mut word = Word::new(cur, start);
            word.comma = comma;
            words.push(word);
            cur.clear();
        } else if comma {
            if let Some(last) = words.last_mut() {
                last.comma = true;
            }
        }
    }

    while i < chars.len() {
        let c = chars[i];
        if cur.is_empty() {
            start = i;
        }

        match c {
            '"' => {
                // Copied as is, never split
                cur.push(c);
                i += 1;
                while i < chars.len() {
                    let q = chars[i];
                    cur.push(q);
                    i += 1;
                    if q == '\\' && i < chars.len() {
                        cur.push(chars[i]);
                        i += 1;
                    } else if q == '"' {
                        break;
                    }
                }
                continue;
            },
            '\\' => {
                cur.push(c);
                if i + 1 < chars.len() {
                    cur.push(chars[i + 1]);
                    i += 1;
                }
            },
            '\'' => {
                flush(&mut words, &mut cur, start, false);
                let rest: String = chars[i..].iter().collect();
                words.push(Word { text: rest, token: Token::Comment, column: i, comma: false });
                break;
            },
            ',' => flush(&mut words, &mut cur, start, true),
            c if c.is_whitespace() => flush(&mut words, &mut cur, start, false),
            _ => cur.push(c),
        }
        i += 1;
    }
    flush(&mut words, &mut cur, start, false);
    words
}
