//! Night and occupancy counting.

use chrono::{NaiveDate, NaiveTime};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Counts chargeable nights between two calendar dates.
///
/// The hours between check-in (date + hotel check-in time) and check-out
/// (date + hotel check-out time) are divided by 24 and rounded up. Any stay
/// whose check-out date is after its check-in date counts at least one night;
/// anything else counts zero.
///
/// # Example
///
/// ```
/// use stay_engine::calculation::count_nights;
/// use chrono::{NaiveDate, NaiveTime};
///
/// let check_in = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
/// let check_out = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
/// let nights = count_nights(
///     check_in,
///     check_out,
///     NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
///     NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
/// );
/// assert_eq!(nights, 2);
/// ```
pub fn count_nights(
    check_in: NaiveDate,
    check_out: NaiveDate,
    check_in_time: NaiveTime,
    check_out_time: NaiveTime,
) -> i64 {
    if check_out <= check_in {
        return 0;
    }

    let minutes = (check_out.and_time(check_out_time) - check_in.and_time(check_in_time))
        .num_minutes();
    let nights = (minutes + MINUTES_PER_DAY - 1).div_euclid(MINUTES_PER_DAY);
    nights.max(1)
}

/// Guests above the room type's included occupancy.
///
/// Saturates rather than wrapping on absurd occupancy figures.
pub fn extra_guests(adults: u32, children: u32, max_occupancy: u32) -> u32 {
    adults.saturating_add(children).saturating_sub(max_occupancy)
}

/// Every calendar night in `[check_in, check_out)`.
pub fn stay_dates(check_in: NaiveDate, check_out: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    check_in
        .iter_days()
        .take_while(move |date| *date < check_out)
}
