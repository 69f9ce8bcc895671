use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mocktest_core::answer_key::AnswerKey;
use mocktest_core::builder::{build_question_set, MissingKeyPolicy, TestConfig};

fn answer_key_csv(rows: u32) -> String {
    let mut csv = String::from("Question,Answer\n");
    for n in 1..=rows {
        let answer = match n % 30 {
            1..=20 => ["A", "B", "C", "D"][(n % 4) as usize].to_string(),
            21..=25 => "\"A,C\"".to_string(),
            _ => format!("{}.{}", n, n % 100),
        };
        csv.push_str(&format!("{n},{answer}\n"));
    }
    csv
}

fn bench_answer_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("answer_key");

    let main_paper = answer_key_csv(90);
    let large = answer_key_csv(900);

    group.bench_function("90_rows", |b| {
        b.iter(|| AnswerKey::parse_csv(black_box(&main_paper)))
    });

    group.bench_function("900_rows", |b| {
        b.iter(|| AnswerKey::parse_csv(black_box(&large)))
    });

    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_question_set");

    let config = TestConfig::default();
    let key = AnswerKey::parse_csv(&answer_key_csv(90)).key;

    group.bench_function("with_key", |b| {
        b.iter(|| {
            build_question_set(
                black_box(&config),
                black_box(Some(&key)),
                MissingKeyPolicy::Placeholder,
            )
        })
    });

    group.bench_function("placeholders", |b| {
        b.iter(|| build_question_set(black_box(&config), None, MissingKeyPolicy::Placeholder))
    });

    group.finish();
}

criterion_group!(benches, bench_answer_key, bench_build);
criterion_main!(benches);
