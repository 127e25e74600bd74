//! Read-side aggregates over a user's shipments. Nothing here is stored;
//! every report is refolded from the shipment documents on each request.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::entities::{PaymentStatus, Shipment};

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Earnings {
    pub total_earnings: i64,
    pub paid_earnings: i64,
    pub pending_earnings: i64,
    pub completed_trips: usize,
    pub active_trips: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct EarningsLine {
    pub shipment_id: Uuid,
    pub from_location: String,
    pub to_location: String,
    pub amount: i64,
    pub completed_at: Option<DateTime<Utc>>,
    pub payment_status: PaymentStatus,
    pub payment_date: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct EarningsReport {
    pub earnings: Earnings,
    pub transactions: Vec<EarningsLine>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    pub average_rating: f64,
    pub total_ratings: usize,
    pub completed_trips: usize,
    pub on_time_deliveries: usize,
    pub on_time_percentage: u32,
    pub rating_distribution: BTreeMap<u8, u32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Review {
    pub shipment_id: Uuid,
    pub from_location: String,
    pub to_location: String,
    pub driver_rating: u8,
    pub driver_review: String,
    pub rated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PerformanceReport {
    pub performance: Performance,
    pub reviews: Vec<Review>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingSummary {
    pub total_amount: i64,
    pub paid_amount: i64,
    pub pending_amount: i64,
    pub shipment_count: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct BillingReport {
    pub summary: BillingSummary,
    pub shipments: Vec<Shipment>,
}

fn amount_of(shipment: &Shipment) -> i64 {
    // a missing final_amount counts as zero everywhere
    shipment.final_amount.unwrap_or(0)
}

/// Folds a driver's completed shipments into an earnings report.
/// `total == paid + pending` holds for every input, including empty.
pub fn driver_earnings(completed: &[Shipment], active_trips: usize) -> EarningsReport {
    let total_earnings: i64 = completed.iter().map(amount_of).sum();
    let paid_earnings: i64 = completed
        .iter()
        .filter(|s| s.payment_status == PaymentStatus::Paid)
        .map(amount_of)
        .sum();

    let transactions = completed
        .iter()
        .map(|s| EarningsLine {
            shipment_id: s.id,
            from_location: s.from_location.clone(),
            to_location: s.to_location.clone(),
            amount: amount_of(s),
            completed_at: s.completed_at,
            payment_status: s.payment_status,
            payment_date: s.payment_date,
        })
        .collect();

    EarningsReport {
        earnings: Earnings {
            total_earnings,
            paid_earnings,
            pending_earnings: total_earnings - paid_earnings,
            completed_trips: completed.len(),
            active_trips,
        },
        transactions,
    }
}

/// Folds a driver's completed shipments into the performance aggregate:
/// average rating to one decimal, a 1-5 histogram and the review feed.
pub fn driver_performance(completed: &[Shipment]) -> PerformanceReport {
    let mut rated: Vec<&Shipment> = completed
        .iter()
        .filter(|s| s.driver_rating.is_some())
        .collect();
    rated.sort_by(|a, b| b.rated_at.cmp(&a.rated_at));

    let total_ratings = rated.len();
    let average_rating = if total_ratings > 0 {
        let sum: u32 = rated
            .iter()
            .filter_map(|s| s.driver_rating)
            .map(u32::from)
            .sum();
        ((sum as f64 / total_ratings as f64) * 10.0).round() / 10.0
    } else {
        0.0
    };

    let mut rating_distribution: BTreeMap<u8, u32> = (1..=5).map(|bucket| (bucket, 0)).collect();
    for shipment in &rated {
        if let Some(rating) = shipment.driver_rating {
            *rating_distribution.entry(rating).or_insert(0) += 1;
        }
    }

    let reviews = rated
        .iter()
        .map(|s| Review {
            shipment_id: s.id,
            from_location: s.from_location.clone(),
            to_location: s.to_location.clone(),
            driver_rating: s.driver_rating.unwrap_or(0),
            driver_review: s.driver_review.clone().unwrap_or_default(),
            rated_at: s.rated_at,
        })
        .collect();

    let completed_trips = completed.len();

    PerformanceReport {
        performance: Performance {
            average_rating,
            total_ratings,
            completed_trips,
            // every completed delivery counts as on time
            on_time_deliveries: completed_trips,
            on_time_percentage: if completed_trips > 0 { 100 } else { 0 },
            rating_distribution,
        },
        reviews,
    }
}

/// Folds a shipper's shipments into paid/pending totals.
pub fn shipper_billing(shipments: Vec<Shipment>) -> BillingReport {
    let total_amount: i64 = shipments.iter().map(amount_of).sum();
    let paid_amount: i64 = shipments
        .iter()
        .filter(|s| s.payment_status == PaymentStatus::Paid)
        .map(amount_of)
        .sum();

    BillingReport {
        summary: BillingSummary {
            total_amount,
            paid_amount,
            pending_amount: total_amount - paid_amount,
            shipment_count: shipments.len(),
        },
        shipments,
    }
}

#[cfg(test)]
fn completed_shipment(amount: i64, paid: bool) -> Shipment {
    use crate::entities::shipment::{test_shipment, Status};

    let mut shipment = test_shipment(Uuid::new_v4());
    shipment.assign_driver(Uuid::new_v4(), amount).unwrap();
    shipment.advance(Status::Completed).unwrap();

    if paid {
        shipment.mark_paid().unwrap();
    }

    shipment
}

#[test]
fn earnings_of_nothing_are_zero() {
    let report = driver_earnings(&[], 0);

    assert_eq!(report.earnings.total_earnings, 0);
    assert_eq!(report.earnings.paid_earnings, 0);
    assert_eq!(report.earnings.pending_earnings, 0);
    assert_eq!(report.earnings.completed_trips, 0);
    assert!(report.transactions.is_empty());
}

#[test]
fn earnings_split_paid_and_pending() {
    let mut unpriced = completed_shipment(0, false);
    unpriced.final_amount = None;

    let completed = vec![
        completed_shipment(500, true),
        completed_shipment(400, false),
        completed_shipment(250, true),
        unpriced,
    ];

    let report = driver_earnings(&completed, 2);

    assert_eq!(report.earnings.total_earnings, 1150);
    assert_eq!(report.earnings.paid_earnings, 750);
    assert_eq!(report.earnings.pending_earnings, 400);
    assert_eq!(report.earnings.completed_trips, 4);
    assert_eq!(report.earnings.active_trips, 2);
    assert_eq!(
        report.earnings.total_earnings,
        report.earnings.paid_earnings + report.earnings.pending_earnings
    );
    assert_eq!(report.transactions.len(), 4);
    assert_eq!(report.transactions[3].amount, 0);
}

#[test]
fn performance_of_single_rated_shipment() {
    let mut shipment = completed_shipment(400, true);
    shipment
        .submit_rating(4, Some("Great driver".into()))
        .unwrap();

    let report = driver_performance(&[shipment, completed_shipment(500, false)]);

    assert_eq!(report.performance.total_ratings, 1);
    assert!((report.performance.average_rating - 4.0).abs() < f64::EPSILON);
    assert_eq!(report.performance.rating_distribution[&4], 1);
    assert_eq!(report.performance.rating_distribution[&5], 0);
    assert_eq!(report.performance.completed_trips, 2);
    assert_eq!(report.performance.on_time_percentage, 100);

    assert_eq!(report.reviews.len(), 1);
    assert_eq!(report.reviews[0].driver_review, "Great driver");
}

#[test]
fn performance_average_rounds_to_one_decimal() {
    let mut first = completed_shipment(100, true);
    first.submit_rating(4, None).unwrap();
    let mut second = completed_shipment(100, true);
    second.submit_rating(5, None).unwrap();
    let mut third = completed_shipment(100, true);
    third.submit_rating(5, None).unwrap();

    let report = driver_performance(&[first, second, third]);

    // 14 / 3 = 4.666... rounds to 4.7
    assert!((report.performance.average_rating - 4.7).abs() < f64::EPSILON);
    assert_eq!(report.performance.total_ratings, 3);
}

#[test]
fn billing_totals_cover_all_shipments() {
    use crate::entities::shipment::test_shipment;

    let shipments = vec![
        completed_shipment(500, true),
        completed_shipment(300, false),
        test_shipment(Uuid::new_v4()),
    ];

    let report = shipper_billing(shipments);

    assert_eq!(report.summary.total_amount, 800);
    assert_eq!(report.summary.paid_amount, 500);
    assert_eq!(report.summary.pending_amount, 300);
    assert_eq!(report.summary.shipment_count, 3);
    assert_eq!(report.shipments.len(), 3);
}
