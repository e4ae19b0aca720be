#![no_main]

use chrono::NaiveDate;
use cronseek::Schedule;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let schedule = match core::str::from_utf8(data).map(str::parse::<Schedule>) {
        Ok(Ok(schedule)) => schedule,
        _ => return,
    };

    let reference = match NaiveDate::from_ymd_opt(2020, 2, 29).and_then(|d| d.and_hms_opt(12, 0, 0)) {
        Some(reference) => reference,
        None => return,
    };

    if let Ok(next) = schedule.next_after(reference) {
        assert!(next > reference);
        assert!(schedule.contains(next));
        assert_eq!(schedule.last_before(next).map(|last| last <= reference), Ok(true));
    }
    if let Ok(last) = schedule.last_before(reference) {
        assert!(last < reference);
        assert!(schedule.contains(last));
    }
});
