//! Benchmarks for feature fitting and encoding
//!
//! Run with: cargo bench --package pipeline
//!
//! Uses a synthetic corpus so no dataset file is needed.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use data_loader::{CategoricalField, NumericField, Record};
use pipeline::{EncoderConfig, FeatureEncoder};

const WORDS: &[&str] = &[
    "heist", "crew", "detective", "family", "secret", "war", "love", "city", "robot", "ghost",
    "island", "revenge", "journey", "comedy", "wedding", "space", "murder", "school", "king",
    "storm",
];
const LANGUAGES: &[&str] = &["English", "French", "Spanish", "Hindi", "Japanese"];
const RATINGS: &[&str] = &["G", "PG", "PG-13", "R"];

fn synthetic_records(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            let description: Vec<&str> = (0..12).map(|j| WORDS[(i * 7 + j * 3) % WORDS.len()]).collect();
            Record::new(description.join(" "))
                .with_categorical(CategoricalField::Language, LANGUAGES[i % LANGUAGES.len()])
                .with_categorical(CategoricalField::ContentRating, RATINGS[i % RATINGS.len()])
                .with_numeric(NumericField::Rating, (i % 10) as f64)
                .with_numeric(NumericField::Votes, i * 13)
        })
        .collect()
}

fn bench_fit(c: &mut Criterion) {
    let records = synthetic_records(5_000);
    let config = EncoderConfig::default();

    c.bench_function("fit_5000_records", |b| {
        b.iter(|| {
            let fitted = pipeline::fit(black_box(&records), &config).unwrap();
            black_box(fitted)
        })
    });
}

fn bench_encode_batch(c: &mut Criterion) {
    let records = synthetic_records(5_000);
    let (vocabulary, schema) = pipeline::fit(&records, &EncoderConfig::default()).unwrap();
    let encoder = FeatureEncoder::new(&vocabulary, &schema);

    c.bench_function("encode_5000_records", |b| {
        b.iter(|| {
            let matrix = encoder.encode(black_box(&records)).unwrap();
            black_box(matrix)
        })
    });
}

fn bench_encode_one(c: &mut Criterion) {
    let records = synthetic_records(5_000);
    let (vocabulary, schema) = pipeline::fit(&records, &EncoderConfig::default()).unwrap();
    let encoder = FeatureEncoder::new(&vocabulary, &schema);
    let query = Record::new("A daring heist crew plans revenge on the king");

    c.bench_function("encode_single_record", |b| {
        b.iter(|| {
            let row = encoder.encode_one(black_box(&query)).unwrap();
            black_box(row)
        })
    });
}

criterion_group!(benches, bench_fit, bench_encode_batch, bench_encode_one);
criterion_main!(benches);
