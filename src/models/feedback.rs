use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Feedback {
    pub id: Uuid,
    pub registration_id: Uuid,
    pub event_id: Uuid,
    pub student_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Feedback row joined with the author, for the organizer's view.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FeedbackWithStudent {
    pub id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub full_name: String,
    pub student_number: Option<String>,
}

/// Feedback row joined with its event, for the student's history view.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FeedbackWithEvent {
    pub id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub event_name: String,
    pub date: NaiveDate,
}

/// Aggregate statistics over an event's ratings.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FeedbackSummary {
    pub total_feedback: usize,
    /// Average rating rounded to one decimal; 0.0 when empty.
    pub average_rating: f64,
    /// Counts for ratings 1 through 5, in order.
    pub rating_distribution: [usize; 5],
}

impl FeedbackSummary {
    pub fn from_ratings(ratings: &[i32]) -> Self {
        let mut distribution = [0usize; 5];
        let mut sum = 0i64;
        for &rating in ratings {
            if (1..=5).contains(&rating) {
                distribution[(rating - 1) as usize] += 1;
                sum += i64::from(rating);
            }
        }
        let total = distribution.iter().sum::<usize>();
        let average = if total == 0 {
            0.0
        } else {
            (sum as f64 / total as f64 * 10.0).round() / 10.0
        };
        Self {
            total_feedback: total,
            average_rating: average,
            rating_distribution: distribution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_empty() {
        let summary = FeedbackSummary::from_ratings(&[]);
        assert_eq!(summary.total_feedback, 0);
        assert_eq!(summary.average_rating, 0.0);
        assert_eq!(summary.rating_distribution, [0; 5]);
    }

    #[test]
    fn test_summary_rounds_to_one_decimal() {
        let summary = FeedbackSummary::from_ratings(&[5, 4, 4]);
        assert_eq!(summary.total_feedback, 3);
        assert_eq!(summary.average_rating, 4.3);
        assert_eq!(summary.rating_distribution, [0, 0, 0, 2, 1]);
    }

    #[test]
    fn test_summary_ignores_out_of_range() {
        let summary = FeedbackSummary::from_ratings(&[3, 9, 0]);
        assert_eq!(summary.total_feedback, 1);
        assert_eq!(summary.average_rating, 3.0);
    }
}
