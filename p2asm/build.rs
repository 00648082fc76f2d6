extern crate phf_codegen;

use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

// Instruction table: (mnemonic, bit pattern, operand shape)
//
// Patterns are written from bit 27 downwards (the condition nibble is never part of
// them), exactly as the opcode reference documents each instruction. Only '0' and '1'
// are fixed bits, letters (C Z I L N D S R A) mark fields that the operand-shape
// parser fills in. A pattern may stop early, the remaining bits are fields.
const INSTRUCTIONS: &[(&str, &str, &str)] = &[
    ("NOP",     "0000000 000 000000000 000000000", "Nop"),

    ("ROR",     "0000000 CZI", "DImSWcz"),
    ("ROL",     "0000001 CZI", "DImSWcz"),
    ("SHR",     "0000010 CZI", "DImSWcz"),
    ("SHL",     "0000011 CZI", "DImSWcz"),
    ("RCR",     "0000100 CZI", "DImSWcz"),
    ("RCL",     "0000101 CZI", "DImSWcz"),
    ("SAR",     "0000110 CZI", "DImSWcz"),
    ("SAL",     "0000111 CZI", "DImSWcz"),

    ("ADD",     "0001000 CZI", "DImSWcz"),
    ("ADDX",    "0001001 CZI", "DImSWcz"),
    ("ADDS",    "0001010 CZI", "DImSWcz"),
    ("ADDSX",   "0001011 CZI", "DImSWcz"),
    ("SUB",     "0001100 CZI", "DImSWcz"),
    ("SUBX",    "0001101 CZI", "DImSWcz"),
    ("SUBS",    "0001110 CZI", "DImSWcz"),
    ("SUBSX",   "0001111 CZI", "DImSWcz"),

    ("CMP",     "0010000 CZI", "DImSWcz"),
    ("CMPX",    "0010001 CZI", "DImSWcz"),
    ("CMPS",    "0010010 CZI", "DImSWcz"),
    ("CMPSX",   "0010011 CZI", "DImSWcz"),
    ("CMPR",    "0010100 CZI", "DImSWcz"),
    ("CMPM",    "0010101 CZI", "DImSWcz"),
    ("SUBR",    "0010110 CZI", "DImSWcz"),
    ("CMPSUB",  "0010111 CZI", "DImSWcz"),

    ("FGE",     "0011000 CZI", "DImSWcz"),
    ("FLE",     "0011001 CZI", "DImSWcz"),
    ("FGES",    "0011010 CZI", "DImSWcz"),
    ("FLES",    "0011011 CZI", "DImSWcz"),
    ("SUMC",    "0011100 CZI", "DImSWcz"),
    ("SUMNC",   "0011101 CZI", "DImSWcz"),
    ("SUMZ",    "0011110 CZI", "DImSWcz"),
    ("SUMNZ",   "0011111 CZI", "DImSWcz"),

    // TESTB/TESTBN pick W/AND/OR/XOR from the flag keyword (+0/+2/+4/+6 on inst7)
    ("TESTB",   "0100000 CZI", "TestBit"),
    ("TESTBN",  "0100001 CZI", "TestBit"),
    ("BITL",    "0100000 CZI", "DImSWcz"),
    ("BITH",    "0100001 CZI", "DImSWcz"),
    ("BITC",    "0100010 CZI", "DImSWcz"),
    ("BITNC",   "0100011 CZI", "DImSWcz"),
    ("BITZ",    "0100100 CZI", "DImSWcz"),
    ("BITNZ",   "0100101 CZI", "DImSWcz"),
    ("BITRND",  "0100110 CZI", "DImSWcz"),
    ("BITNOT",  "0100111 CZI", "DImSWcz"),

    ("AND",     "0101000 CZI", "DImSWcz"),
    ("ANDN",    "0101001 CZI", "DImSWcz"),
    ("OR",      "0101010 CZI", "DImSWcz"),
    ("XOR",     "0101011 CZI", "DImSWcz"),
    ("MUXC",    "0101100 CZI", "DImSWcz"),
    ("MUXNC",   "0101101 CZI", "DImSWcz"),
    ("MUXZ",    "0101110 CZI", "DImSWcz"),
    ("MUXNZ",   "0101111 CZI", "DImSWcz"),

    ("MOV",     "0110000 CZI", "DImSWcz"),
    ("NOT",     "0110001 CZI", "DImSWcz"),
    ("ABS",     "0110010 CZI", "DImSWcz"),
    ("NEG",     "0110011 CZI", "DImSWcz"),
    ("NEGC",    "0110100 CZI", "DImSWcz"),
    ("NEGNC",   "0110101 CZI", "DImSWcz"),
    ("NEGZ",    "0110110 CZI", "DImSWcz"),
    ("NEGNZ",   "0110111 CZI", "DImSWcz"),

    ("INCMOD",  "0111000 CZI", "DImSWcz"),
    ("DECMOD",  "0111001 CZI", "DImSWcz"),
    ("ZEROX",   "0111010 CZI", "DImSWcz"),
    ("SIGNX",   "0111011 CZI", "DImSWcz"),
    ("ENCOD",   "0111100 CZI", "DImSWcz"),
    ("ONES",    "0111101 CZI", "DImSWcz"),
    ("TEST",    "0111110 CZI", "DImSWcz"),
    ("TESTN",   "0111111 CZI", "DImSWcz"),

    ("SETNIB",  "100000N NNI", "Nibble(7)"),
    ("GETNIB",  "100001N NNI", "Nibble(7)"),
    ("ROLNIB",  "100010N NNI", "Nibble(7)"),
    ("SETBYTE", "1000110 NNI", "Nibble(3)"),
    ("GETBYTE", "1000111 NNI", "Nibble(3)"),
    ("ROLBYTE", "1001000 NNI", "Nibble(3)"),
    ("SETWORD", "1001001 0NI", "Nibble(1)"),
    ("GETWORD", "1001001 1NI", "Nibble(1)"),
    ("ROLWORD", "1001010 0NI", "Nibble(1)"),

    ("ALTSN",   "1001010 10I", "AltD"),
    ("ALTGN",   "1001010 11I", "AltD"),
    ("ALTSB",   "1001011 00I", "AltD"),
    ("ALTGB",   "1001011 01I", "AltD"),
    ("ALTSW",   "1001011 10I", "AltD"),
    ("ALTGW",   "1001011 11I", "AltD"),
    ("ALTR",    "1001100 00I", "AltD"),
    ("ALTD",    "1001100 01I", "AltD"),
    ("ALTS",    "1001100 10I", "AltD"),
    ("ALTB",    "1001100 11I", "AltD"),
    ("ALTI",    "1001101 00I", "AltD"),
    ("SETR",    "1001101 01I", "DImS"),
    ("SETD",    "1001101 10I", "DImS"),
    ("SETS",    "1001101 11I", "DImS"),

    ("DECOD",   "1001110 00I", "DImS"),
    ("BMASK",   "1001110 01I", "DImS"),
    ("CRCBIT",  "1001110 10I", "DImS"),
    ("CRCNIB",  "1001110 11I", "DImS"),
    ("MUXNITS", "1001111 00I", "DImS"),
    ("MUXNIBS", "1001111 01I", "DImS"),
    ("MUXQ",    "1001111 10I", "DImS"),
    ("MOVBYTS", "1001111 11I", "DImS"),

    ("MUL",     "1010000 0ZI", "DImSWz"),
    ("MULS",    "1010000 1ZI", "DImSWz"),
    ("SCA",     "1010001 0ZI", "DImSWz"),
    ("SCAS",    "1010001 1ZI", "DImSWz"),

    ("ADDPIX",  "1010010 00I", "DImS"),
    ("MULPIX",  "1010010 01I", "DImS"),
    ("BLNPIX",  "1010010 10I", "DImS"),
    ("MIXPIX",  "1010010 11I", "DImS"),
    ("ADDCT1",  "1010011 00I", "DImS"),
    ("ADDCT2",  "1010011 01I", "DImS"),
    ("ADDCT3",  "1010011 10I", "DImS"),
    ("WMLONG",  "1010011 11I", "DImSPtr"),

    ("RQPIN",   "1010100 C0I", "DImSWc"),
    ("RDPIN",   "1010100 C1I", "DImSWc"),
    ("RDLUT",   "1010101 CZI", "DImSWcz"),
    ("RDBYTE",  "1010110 CZI", "DImSPtrWcz"),
    ("RDWORD",  "1010111 CZI", "DImSPtrWcz"),
    ("RDLONG",  "1011000 CZI", "DImSPtrWcz"),
    ("POPA",    "1011000 CZ1 DDDDDDDDD 101011111", "DWcz"),
    ("POPB",    "1011000 CZ1 DDDDDDDDD 111011111", "DWcz"),

    ("CALLD",   "1011001 CZI", "CallD"),
    ("RESI3",   "1011001 110 111110000 111110001", "Inst"),
    ("RESI2",   "1011001 110 111110010 111110011", "Inst"),
    ("RESI1",   "1011001 110 111110100 111110101", "Inst"),
    ("RESI0",   "1011001 110 111111110 111111111", "Inst"),
    ("RETI3",   "1011001 110 111111111 111110001", "Inst"),
    ("RETI2",   "1011001 110 111111111 111110011", "Inst"),
    ("RETI1",   "1011001 110 111111111 111110101", "Inst"),
    ("RETI0",   "1011001 110 111111111 111111111", "Inst"),

    ("CALLPA",  "1011010 0LI", "WzDImS"),
    ("CALLPB",  "1011010 1LI", "WzDImS"),

    ("DJZ",     "1011011 00I", "DImS"),
    ("DJNZ",    "1011011 01I", "DImS"),
    ("DJF",     "1011011 10I", "DImS"),
    ("DJNF",    "1011011 11I", "DImS"),
    ("IJZ",     "1011100 00I", "DImS"),
    ("IJNZ",    "1011100 01I", "DImS"),
    ("TJZ",     "1011100 10I", "DImS"),
    ("TJNZ",    "1011100 11I", "DImS"),
    ("TJF",     "1011101 00I", "DImS"),
    ("TJNF",    "1011101 01I", "DImS"),
    ("TJS",     "1011101 10I", "DImS"),
    ("TJNS",    "1011101 11I", "DImS"),
    ("TJV",     "1011110 00I", "DImS"),

    ("SETPAT",  "1011111 1LI", "WzDImS"),

    ("WRPIN",   "1100000 0LI", "WzDImS"),
    ("AKPIN",   "1100000 01I 000000001", "ImS"),
    ("WXPIN",   "1100000 1LI", "WzDImS"),
    ("WYPIN",   "1100001 0LI", "WzDImS"),
    ("WRLUT",   "1100001 1LI", "WzDImS"),
    ("WRBYTE",  "1100010 0LI", "WzDImSPtr"),
    ("WRWORD",  "1100010 1LI", "WzDImSPtr"),
    ("WRLONG",  "1100011 0LI", "WzDImSPtr"),
    ("PUSHA",   "1100011 0L1 DDDDDDDDD 101100001", "WzD"),
    ("PUSHB",   "1100011 0L1 DDDDDDDDD 111100001", "WzD"),
    ("RDFAST",  "1100011 1LI", "WzDImS"),
    ("WRFAST",  "1100100 0LI", "WzDImS"),
    ("FBLOCK",  "1100100 1LI", "WzDImS"),
    ("XINIT",   "1100101 0LI", "WzDImS"),
    ("XSTOP",   "1100101 011 000000000 000000000", "Inst"),
    ("XZERO",   "1100101 1LI", "WzDImS"),
    ("XCONT",   "1100110 0LI", "WzDImS"),
    ("REP",     "1100110 1LI", "WzDImS"),
    ("COGINIT", "1100111 CLI", "WzDImSWc"),

    ("QMUL",    "1101000 0LI", "WzDImS"),
    ("QDIV",    "1101000 1LI", "WzDImS"),
    ("QFRAC",   "1101001 0LI", "WzDImS"),
    ("QSQRT",   "1101001 1LI", "WzDImS"),
    ("QROTATE", "1101010 0LI", "WzDImS"),
    ("QVECTOR", "1101010 1LI", "WzDImS"),

    // D-operand group, the S field selects the operation
    ("HUBSET",  "1101011 00L DDDDDDDDD 000000000", "ImD"),
    ("COGID",   "1101011 C0L DDDDDDDDD 000000001", "ImDWc"),
    ("COGSTOP", "1101011 00L DDDDDDDDD 000000011", "ImD"),
    ("LOCKNEW", "1101011 C00 DDDDDDDDD 000000100", "DWc"),
    ("LOCKRET", "1101011 00L DDDDDDDDD 000000101", "ImD"),
    ("LOCKTRY", "1101011 C0L DDDDDDDDD 000000110", "ImDWc"),
    ("LOCKREL", "1101011 C0L DDDDDDDDD 000000111", "ImDWc"),
    ("QLOG",    "1101011 00L DDDDDDDDD 000001110", "ImD"),
    ("QEXP",    "1101011 00L DDDDDDDDD 000001111", "ImD"),

    ("RFBYTE",  "1101011 CZ0 DDDDDDDDD 000010000", "DWcz"),
    ("RFWORD",  "1101011 CZ0 DDDDDDDDD 000010001", "DWcz"),
    ("RFLONG",  "1101011 CZ0 DDDDDDDDD 000010010", "DWcz"),
    ("RFVAR",   "1101011 CZ0 DDDDDDDDD 000010011", "DWcz"),
    ("RFVARS",  "1101011 CZ0 DDDDDDDDD 000010100", "DWcz"),
    ("WFBYTE",  "1101011 00L DDDDDDDDD 000010101", "ImD"),
    ("WFWORD",  "1101011 00L DDDDDDDDD 000010110", "ImD"),
    ("WFLONG",  "1101011 00L DDDDDDDDD 000010111", "ImD"),

    ("GETQX",   "1101011 CZ0 DDDDDDDDD 000011000", "DWcz"),
    ("GETQY",   "1101011 CZ0 DDDDDDDDD 000011001", "DWcz"),
    ("GETCT",   "1101011 000 DDDDDDDDD 000011010", "D"),
    ("GETRND",  "1101011 CZ0 DDDDDDDDD 000011011", "GetRnd"),
    ("SETDACS", "1101011 00L DDDDDDDDD 000011100", "ImD"),
    ("SETXFRQ", "1101011 00L DDDDDDDDD 000011101", "ImD"),
    ("GETXACC", "1101011 000 DDDDDDDDD 000011110", "D"),
    ("WAITX",   "1101011 CZL DDDDDDDDD 000011111", "ImDWcz"),

    ("SETSE1",  "1101011 00L DDDDDDDDD 000100000", "ImD"),
    ("SETSE2",  "1101011 00L DDDDDDDDD 000100001", "ImD"),
    ("SETSE3",  "1101011 00L DDDDDDDDD 000100010", "ImD"),
    ("SETSE4",  "1101011 00L DDDDDDDDD 000100011", "ImD"),
    ("SETINT1", "1101011 00L DDDDDDDDD 000100101", "ImD"),
    ("SETINT2", "1101011 00L DDDDDDDDD 000100110", "ImD"),
    ("SETINT3", "1101011 00L DDDDDDDDD 000100111", "ImD"),

    ("SETQ",    "1101011 00L DDDDDDDDD 000101000", "ImD"),
    ("SETQ2",   "1101011 00L DDDDDDDDD 000101001", "ImD"),
    ("PUSH",    "1101011 00L DDDDDDDDD 000101010", "ImD"),
    ("POP",     "1101011 CZ0 DDDDDDDDD 000101011", "DWcz"),
    ("JMP",     "1101011 CZ0 DDDDDDDDD 000101100", "Jump"),
    ("CALL",    "1101011 CZ0 DDDDDDDDD 000101101", "Jump"),
    ("RET",     "1101011 CZ1 000000000 000101101", "Wcz"),
    ("CALLA",   "1101011 CZ0 DDDDDDDDD 000101110", "Jump"),
    ("RETA",    "1101011 CZ1 000000000 000101110", "Wcz"),
    ("CALLB",   "1101011 CZ0 DDDDDDDDD 000101111", "Jump"),
    ("RETB",    "1101011 CZ1 000000000 000101111", "Wcz"),

    ("JMPREL",  "1101011 00L DDDDDDDDD 000110000", "ImD"),
    ("SKIP",    "1101011 00L DDDDDDDDD 000110001", "ImD"),
    ("SKIPF",   "1101011 00L DDDDDDDDD 000110010", "ImD"),
    ("EXECF",   "1101011 00L DDDDDDDDD 000110011", "ImD"),
    ("GETPTR",  "1101011 000 DDDDDDDDD 000110100", "D"),
    ("GETBRK",  "1101011 CZ0 DDDDDDDDD 000110101", "DWcz"),
    ("COGBRK",  "1101011 00L DDDDDDDDD 000110101", "ImD"),
    ("BRK",     "1101011 00L DDDDDDDDD 000110110", "ImD"),
    ("SETLUTS", "1101011 00L DDDDDDDDD 000110111", "ImD"),
    ("SETCY",   "1101011 00L DDDDDDDDD 000111000", "ImD"),
    ("SETCI",   "1101011 00L DDDDDDDDD 000111001", "ImD"),
    ("SETCQ",   "1101011 00L DDDDDDDDD 000111010", "ImD"),
    ("SETCFRQ", "1101011 00L DDDDDDDDD 000111011", "ImD"),
    ("SETCMOD", "1101011 00L DDDDDDDDD 000111100", "ImD"),
    ("SETPIV",  "1101011 00L DDDDDDDDD 000111101", "ImD"),
    ("SETPIX",  "1101011 00L DDDDDDDDD 000111110", "ImD"),
    ("COGATN",  "1101011 00L DDDDDDDDD 000111111", "ImD"),

    // TESTP/TESTPN pick W/AND/OR/XOR from the flag keyword (+0/+2/+4/+6 on S)
    ("TESTP",   "1101011 CZL DDDDDDDDD 001000000", "TestPin"),
    ("TESTPN",  "1101011 CZL DDDDDDDDD 001000001", "TestPin"),
    ("DIRL",    "1101011 CZL DDDDDDDDD 001000000", "ImDWcz"),
    ("DIRH",    "1101011 CZL DDDDDDDDD 001000001", "ImDWcz"),
    ("DIRC",    "1101011 CZL DDDDDDDDD 001000010", "ImDWcz"),
    ("DIRNC",   "1101011 CZL DDDDDDDDD 001000011", "ImDWcz"),
    ("DIRZ",    "1101011 CZL DDDDDDDDD 001000100", "ImDWcz"),
    ("DIRNZ",   "1101011 CZL DDDDDDDDD 001000101", "ImDWcz"),
    ("DIRRND",  "1101011 CZL DDDDDDDDD 001000110", "ImDWcz"),
    ("DIRNOT",  "1101011 CZL DDDDDDDDD 001000111", "ImDWcz"),
    ("OUTL",    "1101011 CZL DDDDDDDDD 001001000", "ImDWcz"),
    ("OUTH",    "1101011 CZL DDDDDDDDD 001001001", "ImDWcz"),
    ("OUTC",    "1101011 CZL DDDDDDDDD 001001010", "ImDWcz"),
    ("OUTNC",   "1101011 CZL DDDDDDDDD 001001011", "ImDWcz"),
    ("OUTZ",    "1101011 CZL DDDDDDDDD 001001100", "ImDWcz"),
    ("OUTNZ",   "1101011 CZL DDDDDDDDD 001001101", "ImDWcz"),
    ("OUTRND",  "1101011 CZL DDDDDDDDD 001001110", "ImDWcz"),
    ("OUTNOT",  "1101011 CZL DDDDDDDDD 001001111", "ImDWcz"),
    ("FLTL",    "1101011 CZL DDDDDDDDD 001010000", "ImDWcz"),
    ("FLTH",    "1101011 CZL DDDDDDDDD 001010001", "ImDWcz"),
    ("FLTC",    "1101011 CZL DDDDDDDDD 001010010", "ImDWcz"),
    ("FLTNC",   "1101011 CZL DDDDDDDDD 001010011", "ImDWcz"),
    ("FLTZ",    "1101011 CZL DDDDDDDDD 001010100", "ImDWcz"),
    ("FLTNZ",   "1101011 CZL DDDDDDDDD 001010101", "ImDWcz"),
    ("FLTRND",  "1101011 CZL DDDDDDDDD 001010110", "ImDWcz"),
    ("FLTNOT",  "1101011 CZL DDDDDDDDD 001010111", "ImDWcz"),
    ("DRVL",    "1101011 CZL DDDDDDDDD 001011000", "ImDWcz"),
    ("DRVH",    "1101011 CZL DDDDDDDDD 001011001", "ImDWcz"),
    ("DRVC",    "1101011 CZL DDDDDDDDD 001011010", "ImDWcz"),
    ("DRVNC",   "1101011 CZL DDDDDDDDD 001011011", "ImDWcz"),
    ("DRVZ",    "1101011 CZL DDDDDDDDD 001011100", "ImDWcz"),
    ("DRVNZ",   "1101011 CZL DDDDDDDDD 001011101", "ImDWcz"),
    ("DRVRND",  "1101011 CZL DDDDDDDDD 001011110", "ImDWcz"),
    ("DRVNOT",  "1101011 CZL DDDDDDDDD 001011111", "ImDWcz"),

    ("SPLITB",  "1101011 000 DDDDDDDDD 001100000", "D"),
    ("MERGEB",  "1101011 000 DDDDDDDDD 001100001", "D"),
    ("SPLITW",  "1101011 000 DDDDDDDDD 001100010", "D"),
    ("MERGEW",  "1101011 000 DDDDDDDDD 001100011", "D"),
    ("SEUSSF",  "1101011 000 DDDDDDDDD 001100100", "D"),
    ("SEUSSR",  "1101011 000 DDDDDDDDD 001100101", "D"),
    ("RGBSQZ",  "1101011 000 DDDDDDDDD 001100110", "D"),
    ("RGBEXP",  "1101011 000 DDDDDDDDD 001100111", "D"),
    ("XORO32",  "1101011 000 DDDDDDDDD 001101000", "D"),
    ("REV",     "1101011 000 DDDDDDDDD 001101001", "D"),
    ("RCZR",    "1101011 CZ0 DDDDDDDDD 001101010", "DWcz"),
    ("RCZL",    "1101011 CZ0 DDDDDDDDD 001101011", "DWcz"),
    ("WRC",     "1101011 000 DDDDDDDDD 001101100", "D"),
    ("WRNC",    "1101011 000 DDDDDDDDD 001101101", "D"),
    ("WRZ",     "1101011 000 DDDDDDDDD 001101110", "D"),
    ("WRNZ",    "1101011 000 DDDDDDDDD 001101111", "D"),
    ("MODCZ",   "1101011 CZ1 0cccczzzz 001101111", "Modcz"),
    ("MODC",    "1101011 CZ1 0cccc0000 001101111", "Modc"),
    ("MODZ",    "1101011 CZ1 00000zzzz 001101111", "Modz"),
    ("SETSCP",  "1101011 00L DDDDDDDDD 001110000", "ImD"),
    ("GETSCP",  "1101011 000 DDDDDDDDD 001110001", "D"),

    ("LOC",     "11101WW RAA", "PtrA20"),
    ("AUGS",    "11110NN NNN", "Imm23"),
    ("AUGD",    "11111NN NNN", "Imm23"),
];

// Second encodings picked by the operand-shape parser (single operand, '#' address, ...)
const ALTERNATES: &[(&str, &str, &str)] = &[
    ("SETNIB",  "1000000 00I 000000000", "ImS"),
    ("GETNIB",  "1000010 000 DDDDDDDDD 000000000", "D"),
    ("ROLNIB",  "1000100 000 DDDDDDDDD 000000000", "D"),
    ("SETBYTE", "1000110 00I 000000000", "ImS"),
    ("GETBYTE", "1000111 000 DDDDDDDDD 000000000", "D"),
    ("ROLBYTE", "1001000 000 DDDDDDDDD 000000000", "D"),
    ("SETWORD", "1001001 00I 000000000", "ImS"),
    ("GETWORD", "1001001 100 DDDDDDDDD 000000000", "D"),
    ("ROLWORD", "1001010 000 DDDDDDDDD 000000000", "D"),

    ("ALTSN",   "1001010 101 DDDDDDDDD 000000000", "D"),
    ("ALTGN",   "1001010 111 DDDDDDDDD 000000000", "D"),
    ("ALTSB",   "1001011 001 DDDDDDDDD 000000000", "D"),
    ("ALTGB",   "1001011 011 DDDDDDDDD 000000000", "D"),
    ("ALTSW",   "1001011 101 DDDDDDDDD 000000000", "D"),
    ("ALTGW",   "1001011 111 DDDDDDDDD 000000000", "D"),
    ("ALTR",    "1001100 001 DDDDDDDDD 000000000", "D"),
    ("ALTD",    "1001100 011 DDDDDDDDD 000000000", "D"),
    ("ALTS",    "1001100 101 DDDDDDDDD 000000000", "D"),
    ("ALTB",    "1001100 111 DDDDDDDDD 000000000", "D"),
    ("ALTI",    "1001101 001 DDDDDDDDD 101100100", "D"),

    ("CALLD",   "11100WW RAA", "PtrA20"),
    ("GETRND",  "1101011 CZ1 000000000 000011011", "Wcz"),
    ("JMP",     "1101100 RAA", "PcA20"),
    ("CALL",    "1101101 RAA", "PcA20"),
    ("CALLA",   "1101110 RAA", "PcA20"),
    ("CALLB",   "1101111 RAA", "PcA20"),
];

// Event jumps: D holds the event selector
const EVENT_JUMPS: &[&str] = &[
    "JINT",  "JCT1",  "JCT2",  "JCT3",  "JSE1",  "JSE2",  "JSE3",  "JSE4",
    "JPAT",  "JFBW",  "JXMT",  "JXFI",  "JXRO",  "JXRL",  "JATN",  "JQMT",
    "JNINT", "JNCT1", "JNCT2", "JNCT3", "JNSE1", "JNSE2", "JNSE3", "JNSE4",
    "JNPAT", "JNFBW", "JNXMT", "JNXFI", "JNXRO", "JNXRL", "JNATN", "JNQMT",
];

// Event polls and waits: D holds the event selector, S is fixed to $024
const EVENT_POLLS: &[&str] = &[
    "POLLINT", "POLLCT1", "POLLCT2", "POLLCT3", "POLLSE1", "POLLSE2", "POLLSE3", "POLLSE4",
    "POLLPAT", "POLLFBW", "POLLXMT", "POLLXFI", "POLLXRO", "POLLXRL", "POLLATN", "POLLQMT",
    "WAITINT", "WAITCT1", "WAITCT2", "WAITCT3", "WAITSE1", "WAITSE2", "WAITSE3", "WAITSE4",
    "WAITPAT", "WAITFBW", "WAITXMT", "WAITXFI", "WAITXRO", "WAITXRL", "WAITATN",
];

const INTERRUPT_CONTROL: &[&str] = &[
    "ALLOWI", "STALLI", "TRGINT1", "TRGINT2", "TRGINT3", "NIXINT1", "NIXINT2", "NIXINT3",
];

const CONDITIONS: &[(&str, u8)] = &[
    ("_RET_", 0x0),
    ("IF_NC_AND_NZ", 0x1), ("IF_NZ_AND_NC", 0x1), ("IF_A", 0x1), ("IF_GT", 0x1), ("IF_00", 0x1),
    ("IF_NC_AND_Z", 0x2), ("IF_Z_AND_NC", 0x2), ("IF_01", 0x2),
    ("IF_NC", 0x3), ("IF_AE", 0x3), ("IF_GE", 0x3), ("IF_0X", 0x3),
    ("IF_C_AND_NZ", 0x4), ("IF_NZ_AND_C", 0x4), ("IF_10", 0x4),
    ("IF_NZ", 0x5), ("IF_NE", 0x5), ("IF_X0", 0x5),
    ("IF_C_NE_Z", 0x6), ("IF_Z_NE_C", 0x6), ("IF_DIFF", 0x6),
    ("IF_NC_OR_NZ", 0x7), ("IF_NZ_OR_NC", 0x7), ("IF_NOT_11", 0x7),
    ("IF_C_AND_Z", 0x8), ("IF_Z_AND_C", 0x8), ("IF_11", 0x8),
    ("IF_C_EQ_Z", 0x9), ("IF_Z_EQ_C", 0x9), ("IF_SAME", 0x9),
    ("IF_Z", 0xa), ("IF_E", 0xa), ("IF_X1", 0xa),
    ("IF_NC_OR_Z", 0xb), ("IF_Z_OR_NC", 0xb), ("IF_NOT_10", 0xb),
    ("IF_C", 0xc), ("IF_B", 0xc), ("IF_LT", 0xc), ("IF_1X", 0xc),
    ("IF_C_OR_NZ", 0xd), ("IF_NZ_OR_C", 0xd), ("IF_NOT_01", 0xd),
    ("IF_C_OR_Z", 0xe), ("IF_Z_OR_C", 0xe), ("IF_BE", 0xe), ("IF_LE", 0xe), ("IF_NOT_00", 0xe),
    ("IF_ALWAYS", 0xf),
];

const MODCZ_PARAMS: &[(&str, u8)] = &[
    ("_CLR", 0x0),
    ("_NC_AND_NZ", 0x1), ("_NZ_AND_NC", 0x1), ("_GT", 0x1),
    ("_NC_AND_Z", 0x2), ("_Z_AND_NC", 0x2),
    ("_NC", 0x3), ("_GE", 0x3),
    ("_C_AND_NZ", 0x4), ("_NZ_AND_C", 0x4),
    ("_NZ", 0x5), ("_NE", 0x5),
    ("_C_NE_Z", 0x6), ("_Z_NE_C", 0x6),
    ("_NC_OR_NZ", 0x7), ("_NZ_OR_NC", 0x7),
    ("_C_AND_Z", 0x8), ("_Z_AND_C", 0x8),
    ("_C_EQ_Z", 0x9), ("_Z_EQ_C", 0x9),
    ("_Z", 0xa), ("_E", 0xa),
    ("_NC_OR_Z", 0xb), ("_Z_OR_NC", 0xb),
    ("_C", 0xc), ("_LT", 0xc),
    ("_C_OR_NZ", 0xd), ("_NZ_OR_C", 0xd),
    ("_C_OR_Z", 0xe), ("_Z_OR_C", 0xe), ("_LE", 0xe),
    ("_SET", 0xf),
];

const REGISTERS: &[(&str, u16)] = &[
    ("IJMP3", 0x1f0), ("IRET3", 0x1f1), ("IJMP2", 0x1f2), ("IRET2", 0x1f3),
    ("IJMP1", 0x1f4), ("IRET1", 0x1f5), ("PA",    0x1f6), ("PB",    0x1f7),
    ("PTRA",  0x1f8), ("PTRB",  0x1f9), ("DIRA",  0x1fa), ("DIRB",  0x1fb),
    ("OUTA",  0x1fc), ("OUTB",  0x1fd), ("INA",   0x1fe), ("INB",   0x1ff),
];

const FLAGS: &[(&str, &str)] = &[
    ("WC", "Wc"), ("WZ", "Wz"), ("WCZ", "Wcz"),
    ("ANDC", "AndC"), ("ANDZ", "AndZ"),
    ("ORC", "OrC"), ("ORZ", "OrZ"),
    ("XORC", "XorC"), ("XORZ", "XorZ"),
];

const DIRECTIVES: &[(&str, &str)] = &[
    ("BYTE", "Byte"), ("WORD", "Word"), ("LONG", "Long"),
    ("RES", "Res"), ("FIT", "Fit"),
    ("ORG", "Org"), ("ORGF", "Orgf"), ("ORGH", "Orgh"),
    ("ALIGNW", "Alignw"), ("ALIGNL", "Alignl"),
];

// Fixed bits of a pattern, bit 27 first
fn pattern_bits(pattern: &str) -> u32 {
    let mut bits = 0u32;
    let mut pos = 27i32;

    for c in pattern.chars().filter(|c| !c.is_whitespace()) {
        if pos < 0 {
            panic!("pattern too long: {}", pattern);
        }
        if c == '1' {
            bits |= 1 << pos;
        }
        pos -= 1;
    }
    bits
}

fn inst(pattern: &str, shape: &str) -> String {
    format!("InstEnc{{bits: 0x{:08x}, shape: Shape::{}}}", pattern_bits(pattern), shape)
}

fn main() {
    // phf_codegen for the keyword table
    let path = Path::new(&env::var("OUT_DIR").unwrap()).join("keywords.rs");
    let mut file = BufWriter::new(File::create(&path).unwrap());

    let mut keywords = phf_codegen::Map::new();
    let mut values: Vec<(String, String)> = Vec::new();

    for (name, pattern, shape) in INSTRUCTIONS {
        values.push((name.to_string(), format!("Token::Inst({})", inst(pattern, shape))));
    }
    for (i, name) in EVENT_JUMPS.iter().enumerate() {
        let pattern = format!("1011110 01I {:09b}", i);
        values.push((name.to_string(), format!("Token::Inst({})", inst(&pattern, "ImS"))));
    }
    for (i, name) in EVENT_POLLS.iter().enumerate() {
        let pattern = format!("1101011 CZ0 {:09b} 000100100", i);
        values.push((name.to_string(), format!("Token::Inst({})", inst(&pattern, "Wcz"))));
    }
    for (i, name) in INTERRUPT_CONTROL.iter().enumerate() {
        let pattern = format!("1101011 000 {:09b} 000100100", 0x20 + i);
        values.push((name.to_string(), format!("Token::Inst({})", inst(&pattern, "Inst"))));
    }
    for (name, code) in CONDITIONS {
        values.push((name.to_string(), format!("Token::Cond({})", code)));
    }
    for (name, code) in MODCZ_PARAMS {
        values.push((name.to_string(), format!("Token::Modcz({})", code)));
    }
    for (name, offset) in REGISTERS {
        values.push((name.to_string(), format!("Token::Register(0x{:03x})", offset)));
    }
    for (name, flag) in FLAGS {
        values.push((name.to_string(), format!("Token::Flag(Flag::{})", flag)));
    }
    for (name, directive) in DIRECTIVES {
        values.push((name.to_string(), format!("Token::Directive(Directive::{})", directive)));
    }
    values.push(("=".to_string(), "Token::Assign".to_string()));

    for (name, value) in &values {
        keywords.entry(name.as_str(), value);
    }

    write!(&mut file, "static KEYWORDS: phf::Map<&'static str, Token> = ").unwrap();
    keywords.build(&mut file).unwrap();
    write!(&mut file, ";\n").unwrap();

    let mut alternates = phf_codegen::Map::new();
    let alt_values: Vec<(&str, String)> = ALTERNATES
        .iter()
        .map(|(name, pattern, shape)| (*name, inst(pattern, shape)))
        .collect();
    for (name, value) in &alt_values {
        alternates.entry(*name, value);
    }

    write!(&mut file, "static ALTERNATES: phf::Map<&'static str, InstEnc> = ").unwrap();
    alternates.build(&mut file).unwrap();
    write!(&mut file, ";\n").unwrap();

    println!("cargo:rerun-if-changed=build.rs");
}
