use crate::client::NANOS_PER_MAS;
use chrono::{
    DateTime,
    Datelike,
    Days,
    Duration,
    Timelike,
    Utc,
    Weekday,
};

pub const TICKETS_PER_PARTICIPANT: u64 = 15;
const DRAW_HOUR_UTC: u32 = 20;

/// Aggregate vault numbers shown on the stats bar. Synthesized locally
/// until the contract exposes aggregate views.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VaultStats {
    pub tvl_mas: f64,
    pub participants: u64,
    pub prize_pool_mas: f64,
}

impl VaultStats {
    pub fn mock() -> Self {
        Self {
            tvl_mas: 125_000.0,
            participants: 342,
            prize_pool_mas: 2_500.0,
        }
    }

    pub fn total_tickets(&self) -> u64 {
        self.participants * TICKETS_PER_PARTICIPANT
    }
}

/// The caller's vault position. Tickets derive from the deposited amount
/// (one per whole MAS), so withdrawals can never push them negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Position {
    pub deposited_nanos: u64,
}

impl Position {
    pub fn record_deposit(&mut self, nanos: u64) {
        self.deposited_nanos = self.deposited_nanos.saturating_add(nanos);
    }

    pub fn record_withdrawal(&mut self, nanos: u64) {
        self.deposited_nanos = self.deposited_nanos.saturating_sub(nanos);
    }

    pub fn deposited_mas(&self) -> f64 {
        self.deposited_nanos as f64 / NANOS_PER_MAS as f64
    }

    pub fn tickets(&self) -> u64 {
        self.deposited_nanos / NANOS_PER_MAS
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Odds {
    /// Probability of winning the next draw, in percent.
    pub win_chance_pct: f64,
    /// "1 in N" denominator; 0 when the caller holds no tickets.
    pub one_in: u64,
    /// Gauge value in 0..=100.
    pub progress_pct: f64,
}

pub fn compute_odds(user_tickets: u64, total_tickets: u64) -> Odds {
    if total_tickets == 0 || user_tickets == 0 {
        return Odds::default();
    }
    let win_chance_pct = user_tickets as f64 / total_tickets as f64 * 100.0;
    Odds {
        win_chance_pct,
        one_in: total_tickets / user_tickets,
        progress_pct: (win_chance_pct * 10.0).min(100.0),
    }
}

/// Renders a nano-MAS integer string with four decimals: "1500000000"
/// becomes "1.5000". Unparseable input renders as zero.
pub fn format_mas_nanos(balance: &str) -> String {
    let nanos = balance.parse::<u64>().unwrap_or(0);
    format!("{:.4}", nanos as f64 / NANOS_PER_MAS as f64)
}

pub fn format_compact(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{value:.0}")
    }
}

/// Next Friday 20:00 UTC strictly after `now`.
pub fn next_draw(now: DateTime<Utc>) -> DateTime<Utc> {
    let mut days_ahead = (Weekday::Fri.num_days_from_monday() + 7
        - now.weekday().num_days_from_monday())
        % 7;
    if days_ahead == 0 && now.hour() >= DRAW_HOUR_UTC {
        days_ahead = 7;
    }
    let date = now.date_naive() + Days::new(u64::from(days_ahead));
    match date.and_hms_opt(DRAW_HOUR_UTC, 0, 0) {
        Some(naive) => naive.and_utc(),
        // 20:00:00 is a valid wall-clock time on every date
        None => now,
    }
}

pub fn format_countdown(now: DateTime<Utc>, draw: DateTime<Utc>) -> String {
    let remaining = draw - now;
    if remaining <= Duration::zero() {
        return String::from("Drawing now...");
    }
    let days = remaining.num_days();
    let hours = remaining.num_hours() % 24;
    let minutes = remaining.num_minutes() % 60;
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else {
        format!("{hours}h {minutes}m")
    }
}

pub fn format_time_ago(now: DateTime<Utc>, then: DateTime<Utc>) -> String {
    let elapsed = now - then;
    if elapsed < Duration::minutes(1) {
        String::from("Just now")
    } else if elapsed < Duration::hours(1) {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed < Duration::days(1) {
        format!("{}h ago", elapsed.num_hours())
    } else {
        format!("{}d ago", elapsed.num_days())
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn compute_odds__matches_the_documented_example() {
        // given
        let odds = compute_odds(50, 5000);

        // then
        assert!((odds.win_chance_pct - 1.0).abs() < f64::EPSILON);
        assert_eq!(odds.one_in, 100);
        assert!((odds.progress_pct - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn compute_odds__is_zero_without_tickets() {
        assert_eq!(compute_odds(0, 5130), Odds::default());
        assert_eq!(compute_odds(0, 0), Odds::default());
        assert_eq!(compute_odds(10, 0), Odds::default());
    }

    #[test]
    fn compute_odds__caps_the_progress_gauge() {
        let odds = compute_odds(5000, 5000);
        assert!((odds.win_chance_pct - 100.0).abs() < f64::EPSILON);
        assert!((odds.progress_pct - 100.0).abs() < f64::EPSILON);
    }

    proptest! {
        #[test]
        fn compute_odds__never_divides_by_zero_or_overflows_the_gauge(
            user in 0u64..100_000,
            total in 0u64..100_000,
        ) {
            let odds = compute_odds(user, total);
            prop_assert!(odds.progress_pct >= 0.0);
            prop_assert!(odds.progress_pct <= 100.0);
            prop_assert!(odds.win_chance_pct >= 0.0);
        }

        #[test]
        fn position__withdrawals_never_underflow(
            deposit in 0u64..u64::MAX / 2,
            withdraw in 0u64..u64::MAX / 2,
        ) {
            let mut position = Position::default();
            position.record_deposit(deposit);
            position.record_withdrawal(withdraw);
            prop_assert!(position.deposited_nanos <= deposit);
        }
    }

    #[test]
    fn position__awards_one_ticket_per_whole_mas() {
        let mut position = Position::default();
        position.record_deposit(2_500_000_000);

        assert_eq!(position.tickets(), 2);

        position.record_withdrawal(1_000_000_000);
        assert_eq!(position.tickets(), 1);
        assert!((position.deposited_mas() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn vault_stats__mock_numbers_and_ticket_total() {
        let stats = VaultStats::mock();

        assert_eq!(stats.participants, 342);
        assert_eq!(stats.total_tickets(), 342 * 15);
        assert!((stats.tvl_mas - 125_000.0).abs() < f64::EPSILON);
        assert!((stats.prize_pool_mas - 2_500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn format_mas_nanos__renders_four_decimals() {
        assert_eq!(format_mas_nanos("1500000000"), "1.5000");
        assert_eq!(format_mas_nanos("0"), "0.0000");
        assert_eq!(format_mas_nanos("not-a-number"), "0.0000");
    }

    #[test]
    fn format_compact__abbreviates_thousands_and_millions() {
        assert_eq!(format_compact(125_000.0), "125.0K");
        assert_eq!(format_compact(2_500.0), "2.5K");
        assert_eq!(format_compact(1_250_000.0), "1.2M");
        assert_eq!(format_compact(342.0), "342");
    }

    #[test]
    fn next_draw__lands_on_the_coming_friday_evening() {
        // given: a Wednesday
        let now = utc(2025, 6, 4, 12, 0);

        // when
        let draw = next_draw(now);

        // then
        assert_eq!(draw, utc(2025, 6, 6, 20, 0));
    }

    #[test]
    fn next_draw__rolls_over_after_friday_evening() {
        // given: Friday at 21:00
        let now = utc(2025, 6, 6, 21, 0);

        assert_eq!(next_draw(now), utc(2025, 6, 13, 20, 0));
    }

    #[test]
    fn next_draw__friday_morning_still_counts() {
        let now = utc(2025, 6, 6, 8, 30);

        assert_eq!(next_draw(now), utc(2025, 6, 6, 20, 0));
    }

    #[test]
    fn format_countdown__switches_units_with_the_remaining_time() {
        let now = utc(2025, 6, 4, 12, 0);

        assert_eq!(format_countdown(now, utc(2025, 6, 6, 20, 0)), "2d 8h 0m");
        assert_eq!(format_countdown(now, utc(2025, 6, 4, 15, 30)), "3h 30m");
        assert_eq!(format_countdown(now, now), "Drawing now...");
    }

    #[test]
    fn format_time_ago__buckets_by_elapsed_time() {
        let now = utc(2025, 6, 4, 12, 0);

        assert_eq!(format_time_ago(now, now), "Just now");
        assert_eq!(format_time_ago(now, utc(2025, 6, 4, 11, 45)), "15m ago");
        assert_eq!(format_time_ago(now, utc(2025, 6, 4, 7, 0)), "5h ago");
        assert_eq!(format_time_ago(now, utc(2025, 6, 1, 12, 0)), "3d ago");
    }
}
