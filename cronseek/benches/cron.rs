use chrono::{NaiveDate, NaiveDateTime};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use cronseek::Schedule;

fn reference() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2015, 10, 12)
        .and_then(|date| date.and_hms_opt(18, 33, 0))
        .expect("valid reference time")
}

fn parse_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Schedule.from_str");
    let inputs = ["* * * * *", "1 12 3 6 *", "12-35 1-23 2-5 1-11 *", "@weekly"];
    for input in inputs.iter() {
        group.bench_with_input(BenchmarkId::from_parameter(input), input, |b, input| {
            b.iter(|| input.parse::<Schedule>().unwrap())
        });
    }
    group.finish()
}

fn next_benchmark(c: &mut Criterion) {
    let reference = reference();
    let schedules = (0..60)
        .map(|i| format!("{} {} * * *", i % 60, i % 24).parse::<Schedule>().unwrap())
        .collect::<Vec<_>>();

    c.bench_function("Schedule.next_after daily", |b| {
        b.iter(|| {
            for schedule in &schedules {
                schedule.next_after(reference).unwrap();
            }
        })
    });
}

fn sequence_benchmark(c: &mut Criterion) {
    let reference = reference();
    let mut group = c.benchmark_group("Schedule occurrences");
    group.sample_size(10);
    for hour in [0, 12, 23].iter() {
        let schedule = format!("30 {} * * *", hour).parse::<Schedule>().unwrap();
        group.bench_with_input(BenchmarkId::new("next 10000", hour), &schedule, |b, s| {
            b.iter(|| s.next_occurrences(reference, 10_000))
        });
        group.bench_with_input(BenchmarkId::new("last 10000", hour), &schedule, |b, s| {
            b.iter(|| s.last_occurrences(reference, 10_000))
        });
    }
    group.finish()
}

criterion_group!(benches, parse_benchmark, next_benchmark, sequence_benchmark);
criterion_main!(benches);
