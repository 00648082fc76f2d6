use core::ops::RangeInclusive;
use twiddle::Twiddle;

// Propeller2 instruction word
//
// EEEE IIIIIII CZI DDDDDDDDD SSSSSSSSS
//
// E - condition, I - instruction class, C/Z - write carry/zero, I - immediate source
// D - destination field, S - source field
//
// The layouts that carry a 20 bit address (JMP/CALL/CALLA/CALLB/CALLD/LOC) or a 23 bit
// augmentation (AUGS/AUGD) reuse the low bits:
//
// EEEE IIIIIWW RAA AAAAAAAAA AAAAAAAAA
// EEEE IIIIINN NNN NNNNNNNNN NNNNNNNNN
pub const COND:  RangeInclusive<usize> = 31..=28;
pub const INST7: RangeInclusive<usize> = 27..=21;
pub const WC:    RangeInclusive<usize> = 20..=20;
pub const WZ:    RangeInclusive<usize> = 19..=19;
pub const IMM:   RangeInclusive<usize> = 18..=18;
pub const DST:   RangeInclusive<usize> = 17..=9;
pub const SRC:   RangeInclusive<usize> = 8..=0;

// Lowest bit of the #n index for SETNIB/GETBYTE/ROLWORD.., it grows upwards by the index width
pub const NNN_LO: usize = 19;
// Pointer register select for LOC/CALLD #A
pub const WW:    RangeInclusive<usize> = 22..=21;
pub const REL:   RangeInclusive<usize> = 20..=20;
pub const A20:   RangeInclusive<usize> = 19..=0;
pub const IMM23: RangeInclusive<usize> = 22..=0;

// Condition used when no prefix is present
pub const COND_ALWAYS: u8 = 0xf;

// Register file offsets (top of cog ram)
pub const OFFS_PA:   u16 = 0x1f6;
pub const OFFS_PB:   u16 = 0x1f7;
pub const OFFS_PTRA: u16 = 0x1f8;
pub const OFFS_PTRB: u16 = 0x1f9;

// Largest value a D or S field holds without AUGD/AUGS
pub const FIELD_MAX: u64 = 0x1ff;

// Instruction bits of the AUGS/AUGD prefixes
pub const AUGS_BITS: u32 = 0b11110 << 23;
pub const AUGD_BITS: u32 = 0b11111 << 23;


// Operand shapes, one parser per shape
//
// Naming reads left to right over the operands, `Im` marks a field that takes '#',
// a leading `Wz` means the '#' on D is stored in the Z bit (L) instead of I. `Ptr`
// shapes also take a PTRA/PTRB index expression in place of S.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Nop,
    Inst,
    D,
    Wcz,
    DWcz,
    WzD,
    ImD,
    DWc,
    ImDWc,
    ImDWcz,
    TestPin,
    ImS,
    DImS,
    DImSWc,
    DImSWz,
    DImSWcz,
    DImSPtr,
    DImSPtrWcz,
    TestBit,
    WzDImS,
    WzDImSWc,
    WzDImSPtr,
    Nibble(u8), // Max index
    AltD,
    Jump,
    CallD,
    GetRnd,
    PtrA20,
    PcA20,
    Imm23,
    Modcz,
    Modc,
    Modz,
}

// Inst Encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstEnc {
    pub bits:  u32,
    pub shape: Shape,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Opcode(u32);

impl Opcode {
    pub fn new(enc: InstEnc, cond: u8) -> Opcode {
        let mut op = Opcode(enc.bits);
        op.set(COND, cond as u32);
        op
    }

    pub fn word(self) -> u32 {
        self.0
    }

    pub fn get(self, field: RangeInclusive<usize>) -> u32 {
        let lo = *field.end();
        (self.0 & u32::mask(field)) >> lo
    }

    pub fn set(&mut self, field: RangeInclusive<usize>, value: u32) {
        let lo = *field.end();
        let mask = u32::mask(field);
        self.0 = (self.0 & !mask) | ((value << lo) & mask);
    }

    pub fn set_wc(&mut self) {
        self.set(WC, 1);
    }

    pub fn set_wz(&mut self) {
        self.set(WZ, 1);
    }

    pub fn set_im(&mut self) {
        self.set(IMM, 1);
    }

    pub fn set_dst(&mut self, value: u32) {
        self.set(DST, value);
    }

    pub fn set_src(&mut self, value: u32) {
        self.set(SRC, value);
    }

    // TESTB/TESTBN/TESTP/TESTPN variants are spaced two apart
    pub fn add(&mut self, field: RangeInclusive<usize>, delta: u32) {
        let value = self.get(field.clone()) + delta;
        self.set(field, value);
    }
}


#[cfg(test)]
mod op_tests {
    use super::*;

    #[test]
    fn test_fields() {
        let enc = InstEnc { bits: 0b0001000 << 21, shape: Shape::DImSWcz };
        let mut op = Opcode::new(enc, COND_ALWAYS);
        op.set_dst(0x1ff);
        op.set_src(0x12);
        op.set_im();
        op.set_wc();

        assert_eq!(op.word(), 0xf1140000 | (0x1ff << 9) | 0x12);
        assert_eq!(op.get(DST), 0x1ff);
        assert_eq!(op.get(INST7), 0b0001000);
    }

    #[test]
    fn test_set_masks_value() {
        let mut op = Opcode::default();
        op.set(SRC, 0xfff);
        assert_eq!(op.word(), 0x1ff);

        op.set(COND, 0x0);
        op.set(A20, 0xfffff);
        assert_eq!(op.word(), 0xfffff);
    }

    #[test]
    fn test_edge_fields() {
        let mut op = Opcode::default();
        op.set(COND, 0xc);
        op.set(WZ, 1);
        assert_eq!(op.word(), 0xc0080000);
        assert_eq!(op.get(COND), 0xc);
        assert_eq!(op.get(WZ), 1);
        assert_eq!(op.get(WC), 0);
    }

    #[test]
    fn test_add_variant() {
        let enc = InstEnc { bits: 0b0100000 << 21, shape: Shape::TestBit };
        let mut op = Opcode::new(enc, COND_ALWAYS);
        op.add(INST7, 4);
        assert_eq!(op.get(INST7), 0b0100100);
    }
}
