//! Prints the upcoming and past times of a cron expression, relative to now

use chrono::Local;
use cronseek::Schedule;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let count = args
        .get(2)
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10);

    match args.get(1).map(|s| s.as_str().parse::<Schedule>()).transpose() {
        Ok(Some(schedule)) => {
            if !schedule.any() {
                println!("Schedule will never match any given time!");
                return;
            }

            let now = Local::now().naive_local();
            for (title, times) in [
                ("Next", schedule.next_occurrences(now, count)),
                ("Last", schedule.last_occurrences(now, count)),
            ] {
                println!("{} {} times:", title, times.len());
                for time in &times {
                    if !schedule.contains(*time) {
                        println!("Failed check! Schedule does not contain {}.", time);
                        break;
                    }
                    println!("  {}", time.format("%F %R"));
                }
                if !times.is_complete() {
                    println!("  (search exhausted after {} years)", schedule.limits().max_years);
                }
            }
        }
        Ok(None) => println!(
            "Usage: cargo run --example future-times --features chrono/clock -- \"[cron expression]\" [count]"
        ),
        Err(err) => println!("{}", err),
    }
}
