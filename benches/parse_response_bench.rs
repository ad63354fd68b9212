use criterion::{Criterion, criterion_group, criterion_main};
use quizgen::parser::parse;
use std::hint::black_box;

fn ten_question_reply() -> String {
    (1..=10)
        .map(|n| {
            format!(
                "Question {n}: Which stage of the water cycle is described in statement {n}?\n\
                 A) Evaporation\nB) Condensation\nC) Precipitation\nD) Collection\n\
                 Correct Answer: {}\n\
                 Explanation: Statement {n} describes this stage of the cycle.\n",
                ['A', 'B', 'C', 'D'][n % 4]
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn bench_parse_response(c: &mut Criterion) {
    let reply = ten_question_reply();

    c.bench_function("parse_ten_questions", |b| {
        b.iter(|| {
            let questions = parse(black_box(&reply), 10).expect("reply to parse");
            black_box(questions);
        });
    });
}

criterion_group!(benches, bench_parse_response);
criterion_main!(benches);
