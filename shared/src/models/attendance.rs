//! Employee attendance models

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttendanceStatus {
    Present,
    Absent,
    HalfDay,
    Leave,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "PRESENT",
            AttendanceStatus::Absent => "ABSENT",
            AttendanceStatus::HalfDay => "HALF_DAY",
            AttendanceStatus::Leave => "LEAVE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttendanceError {
    #[error("Check-out must be after check-in")]
    CheckOutBeforeCheckIn,

    #[error("Shift of {hours} hours must be under 24 hours")]
    ShiftTooLong { hours: i64 },
}

/// A check-out must fall within this many hours of its check-in
pub const MAX_SHIFT_HOURS: i64 = 24;

/// Hours between check-in and check-out, rounded to 2 dp
pub fn hours_worked(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
) -> Result<Decimal, AttendanceError> {
    if check_out <= check_in {
        return Err(AttendanceError::CheckOutBeforeCheckIn);
    }
    let worked = check_out - check_in;
    if worked >= Duration::hours(MAX_SHIFT_HOURS) {
        return Err(AttendanceError::ShiftTooLong {
            hours: worked.num_hours(),
        });
    }
    let minutes = worked.num_minutes();
    Ok(super::round_money(Decimal::from(minutes) / Decimal::from(60)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_hours_worked_rounds_to_two_places() {
        assert_eq!(hours_worked(at(9, 0), at(17, 20)), Ok(Decimal::new(833, 2)));
    }

    #[test]
    fn test_check_out_must_follow_check_in() {
        assert_eq!(hours_worked(at(9, 0), at(9, 0)), Err(AttendanceError::CheckOutBeforeCheckIn));
        assert_eq!(hours_worked(at(9, 0), at(8, 0)), Err(AttendanceError::CheckOutBeforeCheckIn));
    }

    #[test]
    fn test_overnight_shift_under_a_day() {
        let check_in = at(22, 0);
        let check_out = check_in + Duration::hours(23) + Duration::minutes(59);
        assert_eq!(hours_worked(check_in, check_out), Ok(Decimal::new(2398, 2)));
    }

    #[test]
    fn test_day_or_longer_rejected() {
        let check_in = at(9, 0);
        assert_eq!(
            hours_worked(check_in, check_in + Duration::hours(24)),
            Err(AttendanceError::ShiftTooLong { hours: 24 })
        );
        assert_eq!(
            hours_worked(check_in, check_in + Duration::days(42)),
            Err(AttendanceError::ShiftTooLong { hours: 1008 })
        );
    }
}
