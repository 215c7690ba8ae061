use chrono::TimeZone;
use chrono::Utc;

use super::parse_timestamp;

#[test]
fn it_parses_naive_server_timestamps_as_utc() {
    let res = parse_timestamp("2024-03-01T09:30:15.250000").unwrap();
    assert_eq!(
        res,
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 15).unwrap() + chrono::Duration::milliseconds(250)
    );
}

#[test]
fn it_parses_naive_timestamps_without_fractions() {
    let res = parse_timestamp("2024-03-01T09:30:15").unwrap();
    assert_eq!(res, Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 15).unwrap());
}

#[test]
fn it_parses_rfc3339_timestamps() {
    let res = parse_timestamp("2024-03-01T10:30:15+01:00").unwrap();
    assert_eq!(res, Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 15).unwrap());
}

#[test]
fn it_rejects_garbage() {
    assert!(parse_timestamp("yesterday").is_none());
    assert!(parse_timestamp("").is_none());
}
