use criterion::{criterion_group, criterion_main, Criterion};
use prism::{dialect::Dialect, lexer, token::Token, util::BreakableIteratorExt};
use std::hint::black_box;

static INPUT: &str = include_str!("../../tests/resources/big.sjs");

fn lexer(input: &str) {
    let mut i = 0;
    for token in lexer::lex(Dialect::Brace, "big.sjs", input).up_to(Token::is_eof) {
        if token.kind.is_whitespace() {
            continue;
        }
        i += 1;
    }
    black_box(i);
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("lexer", |b| {
        b.iter(|| {
            black_box(lexer(black_box(INPUT)));
        })
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
