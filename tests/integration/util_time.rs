use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use clinicq::domain::error::TimestampError;
use clinicq::util::time::{
    ExplicitOffset, NormalizeOptions, Zone, is_canonical, local_day_bounds, normalize_to_utc,
};

fn zone(hours: i32) -> Zone {
    Zone::Fixed(FixedOffset::east_opt(hours * 3600).expect("valid offset"))
}

#[test]
fn wall_clock_minutes_gain_zero_seconds() {
    let options = NormalizeOptions::in_zone(zone(2));
    assert_eq!(
        normalize_to_utc("2025-01-15T10:30", options).expect("normalize"),
        "2025-01-15T08:30:00Z"
    );
}

#[test]
fn negative_zone_moves_forward_across_midnight() {
    let options = NormalizeOptions::in_zone(zone(-5));
    assert_eq!(
        normalize_to_utc("2025-12-31T22:15:09", options).expect("normalize"),
        "2026-01-01T03:15:09Z"
    );
}

#[test]
fn fractional_seconds_are_truncated() {
    let options = NormalizeOptions::in_zone(Zone::utc());
    assert_eq!(
        normalize_to_utc("2025-03-04T05:06:07.999", options).expect("normalize"),
        "2025-03-04T05:06:07Z"
    );
}

#[test]
fn z_suffixed_input_passes_through_verbatim() {
    let options = NormalizeOptions::in_zone(zone(9));
    for input in ["2025-01-15T08:30:00Z", "2025-01-15T08:30:00.123Z"] {
        assert_eq!(normalize_to_utc(input, options).expect("normalize"), input);
    }
}

#[test]
fn explicit_offsets_follow_the_configured_policy() {
    let honor = NormalizeOptions::in_zone(zone(2));
    assert_eq!(
        normalize_to_utc("2025-06-01T12:00:00+01:00", honor).expect("normalize"),
        "2025-06-01T11:00:00Z"
    );

    let wall_clock = NormalizeOptions {
        zone: zone(2),
        explicit_offset: ExplicitOffset::WallClock,
    };
    assert_eq!(
        normalize_to_utc("2025-06-01T12:00:00+01:00", wall_clock).expect("normalize"),
        "2025-06-01T10:00:00Z"
    );
}

#[test]
fn typed_values_skip_parsing() {
    let options = NormalizeOptions::in_zone(zone(1));
    let wall = NaiveDate::from_ymd_opt(2025, 2, 1)
        .expect("date")
        .and_hms_opt(9, 0, 0)
        .expect("time");
    assert_eq!(
        normalize_to_utc(wall, options).expect("normalize"),
        "2025-02-01T08:00:00Z"
    );

    let instant = Utc
        .with_ymd_and_hms(2025, 2, 1, 8, 0, 0)
        .single()
        .expect("instant");
    assert_eq!(
        normalize_to_utc(instant, options).expect("normalize"),
        "2025-02-01T08:00:00Z"
    );
}

#[test]
fn garbage_is_malformed() {
    let options = NormalizeOptions::default();
    for input in ["", "   ", "hello", "2025-13-40T10:00", "31/10/2025"] {
        let error = normalize_to_utc(input, options).expect_err("should reject");
        assert!(matches!(error, TimestampError::Malformed { .. }), "{input}");
    }
}

#[test]
fn normalized_output_is_canonical_and_stable() {
    let options = NormalizeOptions::in_zone(zone(3));
    let once = normalize_to_utc("2025-07-20T00:00", options).expect("normalize");
    assert!(is_canonical(&once));
    assert_eq!(normalize_to_utc(once.as_str(), options).expect("again"), once);
}

#[test]
fn day_bounds_cover_the_local_calendar_day() {
    let day = NaiveDate::from_ymd_opt(2025, 10, 31).expect("date");
    let (from, to) = local_day_bounds(day, zone(2)).expect("bounds");
    assert_eq!(from, "2025-10-30T22:00:00Z");
    assert_eq!(to, "2025-10-31T21:59:59Z");
}
