#[macro_use]
extern crate criterion;
extern crate p2asm;

use p2asm::Assembler;
use p2asm::encoder;
use p2asm::expr::{self, Context};
use p2asm::opcode::COND_ALWAYS;
use p2asm::symbol::SymbolTable;
use p2asm::token::{Token, Tokenizer};

use criterion::Criterion;
use criterion::black_box;


// Cog block of mixed instructions followed by hub data
fn synthetic_source(blocks: usize) -> String {
    let mut src = String::new();
    src.push_str("count = 16\n");
    for i in 0..blocks {
        src.push_str(&format!("blk{} mov pa, #count\n", i));
        src.push_str("        add pa, #1 wc\n");
        src.push_str("  if_c  sub pa, pb wcz\n");
        src.push_str("        testb pa, #3 andz\n");
        src.push_str("        getbyte pb, pa, #2   ' byte 2\n");
        src.push_str(&format!("        djnz pa, #blk{}\n", i));
    }
    src.push_str("        orgh\n");
    for i in 0..blocks {
        src.push_str(&format!("        long {}, {} * 2, $dead_beef\n", i, i));
        src.push_str("        byte \"text\", 0\n");
        src.push_str("        alignl\n");
    }
    src
}

fn criterion_benchmark(c: &mut Criterion) {
    let source = synthetic_source(100);

    c.bench_function("asm-synthetic-source", |b| b.iter(|| {
        let mut asm = Assembler::new();
        asm.assemble(black_box(&source));
        asm.last_pc()
    }));

    c.bench_function("expr-evaluate", |b| b.iter(|| {
        let mut symbols = SymbolTable::new();
        let mut ctx = Context { symbols: &mut symbols, scope: "", line: 1, pc: 0 };
        expr::evaluate(black_box("#($1f0 + %1010 * 3) << 2 ! 7"), &mut ctx)
    }));

    c.bench_function("encode-line", |b| {
        let mut tokenizer = Tokenizer::new();
        let words = tokenizer.split("add pa, #1 wc").unwrap_or_default();
        let enc = match words[0].token {
            Token::Inst(enc) => enc,
            _ => panic!("add is not an instruction"),
        };

        b.iter(|| {
            let mut symbols = SymbolTable::new();
            let mut ctx = Context { symbols: &mut symbols, scope: "", line: 1, pc: 0 };
            encoder::encode("add", enc, COND_ALWAYS, black_box(&words[1..]), &mut ctx)
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
