//! Due-date buckets relative to today.
//!
//! All comparisons are on calendar days; time of day never matters. The
//! buckets overlap (a task due tomorrow is also due this week and upcoming)
//! because each date filter is applied on its own, never as a partition.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date filter / classification bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateBucket {
    Overdue,
    Today,
    Tomorrow,
    ThisWeek,
    Upcoming,
    NoDate,
}

impl DateBucket {
    /// Sidebar order
    pub const ALL: [DateBucket; 6] = [
        Self::Overdue,
        Self::Today,
        Self::Tomorrow,
        Self::ThisWeek,
        Self::Upcoming,
        Self::NoDate,
    ];

    /// Filter id, also used as the style class for due labels
    pub fn id(self) -> &'static str {
        match self {
            Self::Overdue => "overdue",
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
            Self::ThisWeek => "this-week",
            Self::Upcoming => "upcoming",
            Self::NoDate => "no-date",
        }
    }

    /// Sidebar label
    pub fn label(self) -> &'static str {
        match self {
            Self::Overdue => "Overdue",
            Self::Today => "Today",
            Self::Tomorrow => "Tomorrow",
            Self::ThisWeek => "This Week",
            Self::Upcoming => "Upcoming",
            Self::NoDate => "No Date",
        }
    }

    /// Whether a due date falls in this bucket
    pub fn matches(self, due: Option<NaiveDate>, today: NaiveDate) -> bool {
        let Some(due) = due else {
            return self == Self::NoDate;
        };
        match self {
            Self::Overdue => due < today,
            Self::Today => due == today,
            Self::Tomorrow => Some(due) == today.checked_add_days(Days::new(1)),
            Self::ThisWeek => due >= today && due <= week_end(today),
            Self::Upcoming => due > today,
            Self::NoDate => false,
        }
    }
}

impl fmt::Display for DateBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Last day of the Sunday-ending week containing `today`.
///
/// Weekdays count from Sunday = 0, and the week ends `7 - weekday` days out,
/// so on a Sunday it reaches the following Sunday.
pub fn week_end(today: NaiveDate) -> NaiveDate {
    let offset = 7 - u64::from(today.weekday().num_days_from_sunday());
    today.checked_add_days(Days::new(offset)).unwrap_or(NaiveDate::MAX)
}

/// The most specific bucket a due date belongs to
pub fn classify(due: Option<NaiveDate>, today: NaiveDate) -> DateBucket {
    DateBucket::ALL
        .into_iter()
        .find(|bucket| bucket.matches(due, today))
        .unwrap_or(DateBucket::Upcoming)
}

/// Short due-date text paired with the bucket used to style it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueLabel {
    pub text: String,
    pub class: DateBucket,
}

/// Label a due date: "Overdue", "Today", "Tomorrow", else e.g. "Jun 15"
pub fn due_label(due: NaiveDate, today: NaiveDate) -> DueLabel {
    let class = classify(Some(due), today);
    let text = match class {
        DateBucket::Overdue | DateBucket::Today | DateBucket::Tomorrow => class.label().to_string(),
        _ => due.format("%b %-d").to_string(),
    };
    DueLabel { text, class }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2025-06-10 is a Tuesday
    fn today() -> NaiveDate {
        date(2025, 6, 10)
    }

    #[rstest]
    #[case(Some(date(2025, 6, 9)), DateBucket::Overdue)]
    #[case(Some(date(2025, 6, 10)), DateBucket::Today)]
    #[case(Some(date(2025, 6, 11)), DateBucket::Tomorrow)]
    #[case(Some(date(2025, 6, 15)), DateBucket::ThisWeek)]
    #[case(Some(date(2025, 7, 1)), DateBucket::Upcoming)]
    #[case(None, DateBucket::NoDate)]
    fn test_classify(#[case] due: Option<NaiveDate>, #[case] expected: DateBucket) {
        assert_eq!(classify(due, today()), expected);
        assert!(expected.matches(due, today()));
    }

    #[rstest]
    #[case(DateBucket::Overdue, &[date(2025, 1, 1), date(2025, 6, 9)])]
    #[case(DateBucket::ThisWeek, &[date(2025, 6, 10), date(2025, 6, 11), date(2025, 6, 15)])]
    #[case(DateBucket::Upcoming, &[date(2025, 6, 11), date(2025, 6, 16), date(2026, 1, 1)])]
    fn test_bucket_matches(#[case] bucket: DateBucket, #[case] dues: &[NaiveDate]) {
        for due in dues {
            assert!(bucket.matches(Some(*due), today()), "{} should match {}", due, bucket);
        }
    }

    #[test]
    fn test_buckets_overlap() {
        let tomorrow = Some(date(2025, 6, 11));
        assert!(DateBucket::Tomorrow.matches(tomorrow, today()));
        assert!(DateBucket::ThisWeek.matches(tomorrow, today()));
        assert!(DateBucket::Upcoming.matches(tomorrow, today()));
        assert!(!DateBucket::Upcoming.matches(Some(today()), today()));
    }

    #[test]
    fn test_no_date_only_matches_missing() {
        assert!(DateBucket::NoDate.matches(None, today()));
        assert!(!DateBucket::NoDate.matches(Some(today()), today()));
        assert!(!DateBucket::Overdue.matches(None, today()));
    }

    #[test]
    fn test_week_end() {
        assert_eq!(week_end(today()), date(2025, 6, 15));
        // Sunday reaches the following Sunday
        assert_eq!(week_end(date(2025, 6, 15)), date(2025, 6, 22));
        // Saturday ends tomorrow
        assert_eq!(week_end(date(2025, 6, 14)), date(2025, 6, 15));
        assert!(!DateBucket::ThisWeek.matches(Some(date(2025, 6, 16)), today()));
    }

    #[test]
    fn test_due_labels() {
        assert_eq!(due_label(date(2025, 6, 1), today()).text, "Overdue");
        assert_eq!(due_label(today(), today()).text, "Today");
        assert_eq!(due_label(date(2025, 6, 11), today()).text, "Tomorrow");

        let this_week = due_label(date(2025, 6, 15), today());
        assert_eq!(this_week.text, "Jun 15");
        assert_eq!(this_week.class, DateBucket::ThisWeek);

        let later = due_label(date(2025, 7, 1), today());
        assert_eq!(later.text, "Jul 1");
        assert_eq!(later.class, DateBucket::Upcoming);
    }

    #[test]
    fn test_bucket_ids_roundtrip_through_serde() {
        let json = serde_json::to_string(&DateBucket::ThisWeek).unwrap();
        assert_eq!(json, "\"this-week\"");
        assert_eq!(DateBucket::NoDate.id(), "no-date");
    }
}
