use std::cmp::Ordering;
use std::fmt;

// Symbol values
//
// Invalid marks a symbol that has been referenced but not (yet) defined.
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Invalid,
    Bool(bool),
    Byte(u8),
    Word(u16),
    Addr(u32),
    Long(u32),
    Quad(u64),
    Real(f64),
    String(Vec<u8>),
}

impl Default for Atom {
    fn default() -> Atom {
        Atom::Invalid
    }
}

impl Atom {
    pub fn is_valid(&self) -> bool {
        *self != Atom::Invalid
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Atom::Invalid   => "invalid",
            Atom::Bool(_)   => "bool",
            Atom::Byte(_)   => "byte",
            Atom::Word(_)   => "word",
            Atom::Addr(_)   => "addr",
            Atom::Long(_)   => "long",
            Atom::Quad(_)   => "quad",
            Atom::Real(_)   => "real",
            Atom::String(_) => "string",
        }
    }

    pub fn to_u64(&self) -> u64 {
        match self {
            Atom::Invalid   => 0,
            Atom::Bool(b)   => *b as u64,
            Atom::Byte(b)   => *b as u64,
            Atom::Word(w)   => *w as u64,
            Atom::Addr(a)   => *a as u64,
            Atom::Long(l)   => *l as u64,
            Atom::Quad(q)   => *q,
            Atom::Real(r)   => *r as u64,
            // Big endian, same as a quoted literal in an expression
            Atom::String(s) => s.iter().fold(0u64, |acc, &b| acc.wrapping_shl(8) | b as u64),
        }
    }
}

// Only atoms of the same kind are ordered
impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Atom) -> Option<Ordering> {
        match (self, other) {
            (Atom::Invalid, Atom::Invalid)     => Some(Ordering::Equal),
            (Atom::Bool(a), Atom::Bool(b))     => a.partial_cmp(b),
            (Atom::Byte(a), Atom::Byte(b))     => a.partial_cmp(b),
            (Atom::Word(a), Atom::Word(b))     => a.partial_cmp(b),
            (Atom::Addr(a), Atom::Addr(b))     => a.partial_cmp(b),
            (Atom::Long(a), Atom::Long(b))     => a.partial_cmp(b),
            (Atom::Quad(a), Atom::Quad(b))     => a.partial_cmp(b),
            (Atom::Real(a), Atom::Real(b))     => a.partial_cmp(b),
            (Atom::String(a), Atom::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Atom::Invalid   => write!(f, "<undefined>"),
            Atom::Bool(b)   => write!(f, "{}", b),
            Atom::Byte(b)   => write!(f, "${:02x}", b),
            Atom::Word(w)   => write!(f, "${:04x}", w),
            Atom::Addr(a)   => write!(f, "${:05x}", a),
            Atom::Long(l)   => write!(f, "${:08x}", l),
            Atom::Quad(q)   => write!(f, "${:x}", q),
            Atom::Real(r)   => write!(f, "{}", r),
            Atom::String(s) => write!(f, "\"{}\"", String::from_utf8_lossy(s)),
        }
    }
}
