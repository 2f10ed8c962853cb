//! Market-hours label for display. Has no effect on fetching.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Weekday};

#[derive(Debug, Clone, Copy)]
pub struct MarketHours {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl Default for MarketHours {
    /// Regular US session, 09:30 to 16:00 local time.
    fn default() -> Self {
        MarketHours {
            open: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default(),
            close: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or_default(),
        }
    }
}

impl MarketHours {
    /// Closed on weekends; open in `[open, close)` on weekdays.
    pub fn is_open_at(&self, at: NaiveDateTime) -> bool {
        if matches!(at.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        let time = at.time();
        time >= self.open && time < self.close
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_weekday_session_window() {
        let hours = MarketHours::default();
        // 2026-10-19 is a Monday
        assert!(!hours.is_open_at(at(2026, 10, 19, 9, 29)));
        assert!(hours.is_open_at(at(2026, 10, 19, 9, 30)));
        assert!(hours.is_open_at(at(2026, 10, 19, 15, 59)));
        assert!(!hours.is_open_at(at(2026, 10, 19, 16, 0)));
    }

    #[test]
    fn test_closed_on_weekends() {
        let hours = MarketHours::default();
        assert!(!hours.is_open_at(at(2026, 10, 17, 12, 0))); // Saturday
        assert!(!hours.is_open_at(at(2026, 10, 18, 12, 0))); // Sunday
    }
}
