//! Cross-table KPIs and alerts for the OEM overview
//!
//! Everything here is a pure function of already-loaded records, an
//! explicit `today`, and [`Thresholds`], so the rules are testable
//! without touching disk. Records missing the date or number a rule needs
//! are skipped by that rule.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::config::Thresholds;
use crate::entities::{
    AgreementStatus, Asset, AssetStatus, AuditPoint, RiskLevel, Supplier, Task,
};

/// Operational assets with no activity for more than the idle threshold
pub fn idle_assets<'a>(assets: &'a [Asset], today: NaiveDate, t: &Thresholds) -> Vec<&'a Asset> {
    assets
        .iter()
        .filter(|a| a.status == AssetStatus::Operational)
        .filter(|a| {
            a.last_active_date
                .is_some_and(|last| (today - last).num_days() > t.idle_asset_days)
        })
        .collect()
}

pub fn overdue_tasks(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    tasks.iter().filter(|task| task.is_overdue(today)).collect()
}

/// Overdue tasks flagged as ESG projects
pub fn delayed_esg_projects(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|task| task.is_esg_project && task.is_overdue(today))
        .collect()
}

pub fn high_reject_suppliers<'a>(suppliers: &'a [Supplier], t: &Thresholds) -> Vec<&'a Supplier> {
    suppliers
        .iter()
        .filter(|s| s.quality_reject_rate.is_some_and(|r| r > t.reject_rate_alert))
        .collect()
}

pub fn overdue_audits(audits: &[AuditPoint], today: NaiveDate) -> Vec<&AuditPoint> {
    audits.iter().filter(|a| a.is_overdue(today)).collect()
}

pub fn upcoming_audits<'a>(audits: &'a [AuditPoint], today: NaiveDate, t: &Thresholds) -> Vec<&'a AuditPoint> {
    audits
        .iter()
        .filter(|a| a.is_upcoming(today, t.audit_horizon_days))
        .collect()
}

pub fn low_esg_suppliers<'a>(suppliers: &'a [Supplier], t: &Thresholds) -> Vec<&'a Supplier> {
    suppliers
        .iter()
        .filter(|s| {
            s.esg_compliance_score
                .is_some_and(|score| score < t.esg_score_min)
        })
        .collect()
}

/// Suppliers recorded as missing their emissions target; unrecorded outcomes are skipped
pub fn emissions_missed(suppliers: &[Supplier]) -> Vec<&Supplier> {
    suppliers
        .iter()
        .filter(|s| s.emissions_target_met == Some(false))
        .collect()
}

/// Recognition badge a supplier can earn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Badge {
    #[serde(rename = "OTD Champion")]
    OtdChampion,
    #[serde(rename = "Quality Star")]
    QualityStar,
    #[serde(rename = "Audit Excellence")]
    AuditExcellence,
    #[serde(rename = "Low Risk Partner")]
    LowRiskPartner,
}

impl Badge {
    pub const ALL: [Badge; 4] = [
        Badge::OtdChampion,
        Badge::QualityStar,
        Badge::AuditExcellence,
        Badge::LowRiskPartner,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Badge::OtdChampion => "OTD Champion",
            Badge::QualityStar => "Quality Star",
            Badge::AuditExcellence => "Audit Excellence",
            Badge::LowRiskPartner => "Low Risk Partner",
        }
    }

    pub fn earned_by(&self, s: &Supplier, t: &Thresholds) -> bool {
        match self {
            Badge::OtdChampion => s.on_time_delivery_rate.is_some_and(|r| r >= t.otd_champion),
            Badge::QualityStar => s.quality_reject_rate.is_some_and(|r| r <= t.quality_star),
            Badge::AuditExcellence => s
                .last_audit_score
                .is_some_and(|score| score == t.perfect_audit_score),
            Badge::LowRiskPartner => s.risk_level == Some(RiskLevel::Low),
        }
    }
}

/// One supplier's badge status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeRow {
    pub supplier_id: String,
    pub supplier_name: String,
    pub badges: Vec<Badge>,
}

pub fn badge_rows(suppliers: &[Supplier], t: &Thresholds) -> Vec<BadgeRow> {
    suppliers
        .iter()
        .map(|s| BadgeRow {
            supplier_id: s.supplier_id.clone(),
            supplier_name: s.supplier_name.clone(),
            badges: Badge::ALL
                .iter()
                .copied()
                .filter(|b| b.earned_by(s, t))
                .collect(),
        })
        .collect()
}

/// How many suppliers hold each badge, in badge order
pub fn badge_counts(suppliers: &[Supplier], t: &Thresholds) -> Vec<(Badge, usize)> {
    Badge::ALL
        .iter()
        .map(|b| (*b, suppliers.iter().filter(|s| b.earned_by(s, t)).count()))
        .collect()
}

/// Count per agreement status, largest first
pub fn agreement_distribution(suppliers: &[Supplier]) -> Vec<(AgreementStatus, usize)> {
    let mut counts: Vec<(AgreementStatus, usize)> = AgreementStatus::ALL
        .iter()
        .map(|status| {
            (
                *status,
                suppliers.iter().filter(|s| s.agreement_status == Some(*status)).count(),
            )
        })
        .filter(|(_, n)| *n > 0)
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Count per risk level, always Low, Medium, High
pub fn risk_distribution(suppliers: &[Supplier]) -> Vec<(RiskLevel, usize)> {
    RiskLevel::ALL
        .iter()
        .map(|level| (*level, suppliers.iter().filter(|s| s.risk_level == Some(*level)).count()))
        .collect()
}

/// Audit scores bucketed by tens; 100 lands in the 90-100 bucket
pub fn audit_score_histogram(suppliers: &[Supplier]) -> Vec<(String, usize)> {
    let mut buckets = [0usize; 10];
    for score in suppliers.iter().filter_map(|s| s.last_audit_score) {
        let idx = ((score.clamp(0.0, 100.0) / 10.0).floor() as usize).min(9);
        buckets[idx] += 1;
    }
    buckets
        .iter()
        .enumerate()
        .map(|(i, n)| {
            let lo = i * 10;
            let hi = if i == 9 { 100 } else { lo + 9 };
            (format!("{}-{}", lo, hi), *n)
        })
        .collect()
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

pub fn average_on_time(suppliers: &[Supplier]) -> Option<f64> {
    mean(suppliers.iter().filter_map(|s| s.on_time_delivery_rate))
}

pub fn average_reject(suppliers: &[Supplier]) -> Option<f64> {
    mean(suppliers.iter().filter_map(|s| s.quality_reject_rate))
}

/// Total annual spend per product category, highest first
pub fn spend_by_category(suppliers: &[Supplier]) -> Vec<(String, i64)> {
    let mut totals: BTreeMap<String, i64> = BTreeMap::new();
    for s in suppliers {
        if let Some(category) = &s.primary_product_category {
            *totals.entry(category.clone()).or_default() += s.annual_spend_usd.unwrap_or(0);
        }
    }
    let mut totals: Vec<(String, i64)> = totals.into_iter().collect();
    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals
}

pub fn top_by_spend(suppliers: &[Supplier], n: usize) -> Vec<&Supplier> {
    let mut ranked: Vec<&Supplier> = suppliers
        .iter()
        .filter(|s| s.annual_spend_usd.is_some())
        .collect();
    ranked.sort_by(|a, b| b.annual_spend_usd.cmp(&a.annual_spend_usd));
    ranked.truncate(n);
    ranked
}

pub fn top_by_audit_score(suppliers: &[Supplier], n: usize) -> Vec<&Supplier> {
    let mut ranked: Vec<&Supplier> = suppliers
        .iter()
        .filter(|s| s.last_audit_score.is_some())
        .collect();
    ranked.sort_by(|a, b| {
        let score = |s: &Supplier| s.last_audit_score.unwrap_or(f64::NEG_INFINITY);
        score(b).total_cmp(&score(a))
    });
    ranked.truncate(n);
    ranked
}

pub fn pending_renewal(suppliers: &[Supplier]) -> Vec<&Supplier> {
    suppliers
        .iter()
        .filter(|s| s.agreement_status == Some(AgreementStatus::PendingRenewal))
        .collect()
}

/// Suppliers whose last performance review is older than the review window
pub fn reviews_overdue<'a>(suppliers: &'a [Supplier], today: NaiveDate, t: &Thresholds) -> Vec<&'a Supplier> {
    suppliers
        .iter()
        .filter(|s| {
            s.last_performance_review_date
                .is_some_and(|d| (today - d).num_days() > t.review_overdue_days)
        })
        .collect()
}

/// Subject line for a recognition message
pub fn recognition_subject(supplier_name: &str) -> String {
    format!("Recognition for Excellence - {}", supplier_name)
}

/// Headline numbers for the overview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub suppliers: usize,
    pub idle_assets: usize,
    pub overdue_tasks: usize,
    pub high_reject_suppliers: usize,
    pub overdue_audits: usize,
    pub upcoming_audits: usize,
    pub delayed_esg_projects: usize,
    pub low_esg_suppliers: usize,
    pub emissions_missed: usize,
    pub pending_renewal: usize,
    pub reviews_overdue: usize,
    pub average_on_time: Option<f64>,
    pub average_reject: Option<f64>,
}

pub fn summary(
    suppliers: &[Supplier],
    assets: &[Asset],
    tasks: &[Task],
    audits: &[AuditPoint],
    today: NaiveDate,
    t: &Thresholds,
) -> Summary {
    Summary {
        suppliers: suppliers.len(),
        idle_assets: idle_assets(assets, today, t).len(),
        overdue_tasks: overdue_tasks(tasks, today).len(),
        high_reject_suppliers: high_reject_suppliers(suppliers, t).len(),
        overdue_audits: overdue_audits(audits, today).len(),
        upcoming_audits: upcoming_audits(audits, today, t).len(),
        delayed_esg_projects: delayed_esg_projects(tasks, today).len(),
        low_esg_suppliers: low_esg_suppliers(suppliers, t).len(),
        emissions_missed: emissions_missed(suppliers).len(),
        pending_renewal: pending_renewal(suppliers).len(),
        reviews_overdue: reviews_overdue(suppliers, today, t).len(),
        average_on_time: average_on_time(suppliers),
        average_reject: average_reject(suppliers),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AuditStatus, TaskStatus};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn days_ago(n: i64) -> NaiveDate {
        today() - chrono::Duration::days(n)
    }

    fn supplier(name: &str) -> Supplier {
        let mut s = Supplier::new(name, "Contact", "c@x.com", today());
        s.supplier_id = format!("SUP-{}", name);
        s
    }

    #[test]
    fn test_idle_assets_only_operational_past_threshold() {
        let t = Thresholds::default();
        let mut fresh = Asset::new("Fresh", "L1", today());
        fresh.last_active_date = Some(days_ago(60));
        let mut stale = Asset::new("Stale", "L1", today());
        stale.last_active_date = Some(days_ago(61));
        let mut retired = stale.clone();
        retired.asset_name = "Retired".into();
        retired.status = AssetStatus::Retired;
        let mut undated = Asset::new("Undated", "L1", today());
        undated.last_active_date = None;

        let assets = vec![fresh, stale, retired, undated];
        let idle: Vec<&str> = idle_assets(&assets, today(), &t)
            .iter()
            .map(|a| a.asset_name.as_str())
            .collect();
        assert_eq!(idle, vec!["Stale"]);
    }

    #[test]
    fn test_esg_delays_are_overdue_esg_tasks() {
        let mut esg = Task::new("Solar", "Supplier A", today());
        esg.is_esg_project = true;
        esg.due_date = Some(days_ago(1));
        let mut plain = Task::new("Tooling", "Supplier A", today());
        plain.due_date = Some(days_ago(1));
        let mut done = esg.clone();
        done.status = TaskStatus::Completed;

        let tasks = vec![esg, plain, done];
        assert_eq!(overdue_tasks(&tasks, today()).len(), 2);
        let delayed = delayed_esg_projects(&tasks, today());
        assert_eq!(delayed.len(), 1);
        assert_eq!(delayed[0].task_name, "Solar");
    }

    #[test]
    fn test_audit_windows() {
        let t = Thresholds::default();
        let mut overdue = AuditPoint::new("Late", "Supplier B", today());
        overdue.due_date = Some(days_ago(3));
        let mut soon = AuditPoint::new("Soon", "Supplier B", today());
        soon.due_date = Some(today() + chrono::Duration::days(30));
        let mut far = AuditPoint::new("Far", "Supplier B", today());
        far.due_date = Some(today() + chrono::Duration::days(31));
        let mut closed = overdue.clone();
        closed.status = AuditStatus::Closed;

        let audits = vec![overdue, soon, far, closed];
        assert_eq!(overdue_audits(&audits, today()).len(), 1);
        let upcoming = upcoming_audits(&audits, today(), &t);
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].point_description, "Soon");
    }

    #[test]
    fn test_supplier_alerts_and_badges() {
        let t = Thresholds::default();
        let mut star = supplier("Star");
        star.on_time_delivery_rate = Some(99.0);
        star.quality_reject_rate = Some(0.1);
        star.last_audit_score = Some(100.0);
        star.esg_compliance_score = Some(85.0);
        star.emissions_target_met = Some(true);

        let mut weak = supplier("Weak");
        weak.quality_reject_rate = Some(2.0);
        weak.esg_compliance_score = Some(60.0);
        weak.risk_level = Some(RiskLevel::High);

        let suppliers = vec![star, weak];
        assert_eq!(high_reject_suppliers(&suppliers, &t).len(), 1);
        assert_eq!(low_esg_suppliers(&suppliers, &t).len(), 1);
        assert_eq!(emissions_missed(&suppliers).len(), 1);

        let rows = badge_rows(&suppliers, &t);
        assert_eq!(rows[0].badges, Badge::ALL.to_vec());
        assert!(rows[1].badges.is_empty());

        let counts = badge_counts(&suppliers, &t);
        assert_eq!(counts[3], (Badge::LowRiskPartner, 1));
    }

    #[test]
    fn test_fractional_scores_and_unrecorded_emissions() {
        let t = Thresholds::default();
        let mut near = supplier("Near");
        near.esg_compliance_score = Some(69.6);
        near.last_audit_score = Some(99.5);
        near.emissions_target_met = None;
        near.risk_level = None;

        let suppliers = vec![near];
        assert_eq!(low_esg_suppliers(&suppliers, &t).len(), 1);
        assert!(emissions_missed(&suppliers).is_empty());
        assert!(!Badge::AuditExcellence.earned_by(&suppliers[0], &t));
        assert!(!Badge::LowRiskPartner.earned_by(&suppliers[0], &t));
        assert_eq!(audit_score_histogram(&suppliers)[9], ("90-100".to_string(), 1));
    }

    #[test]
    fn test_distributions_and_spend() {
        let mut a = supplier("A");
        a.primary_product_category = Some("Castings".into());
        a.annual_spend_usd = Some(500);
        a.risk_level = Some(RiskLevel::Medium);
        let mut b = supplier("B");
        b.primary_product_category = Some("Castings".into());
        b.annual_spend_usd = Some(250);
        b.agreement_status = Some(AgreementStatus::PendingRenewal);
        let mut c = supplier("C");
        c.primary_product_category = Some("Electronics".into());
        c.annual_spend_usd = Some(900);

        let suppliers = vec![a, b, c];
        assert_eq!(
            spend_by_category(&suppliers),
            vec![("Electronics".to_string(), 900), ("Castings".to_string(), 750)]
        );
        assert_eq!(
            risk_distribution(&suppliers),
            vec![(RiskLevel::Low, 2), (RiskLevel::Medium, 1), (RiskLevel::High, 0)]
        );
        assert_eq!(
            agreement_distribution(&suppliers),
            vec![(AgreementStatus::Active, 2), (AgreementStatus::PendingRenewal, 1)]
        );
        assert_eq!(pending_renewal(&suppliers).len(), 1);

        let top: Vec<&str> = top_by_spend(&suppliers, 2)
            .iter()
            .map(|s| s.supplier_name.as_str())
            .collect();
        assert_eq!(top, vec!["C", "A"]);
    }

    #[test]
    fn test_reviews_overdue_and_averages() {
        let t = Thresholds::default();
        let mut old = supplier("Old");
        old.last_performance_review_date = Some(days_ago(366));
        old.on_time_delivery_rate = Some(90.0);
        let mut recent = supplier("Recent");
        recent.last_performance_review_date = Some(days_ago(365));
        recent.on_time_delivery_rate = None;

        let suppliers = vec![old, recent];
        assert_eq!(reviews_overdue(&suppliers, today(), &t).len(), 1);
        assert_eq!(average_on_time(&suppliers), Some(90.0));
        assert_eq!(average_on_time(&[]), None);
    }

    #[test]
    fn test_audit_histogram_buckets() {
        let mut a = supplier("A");
        a.last_audit_score = Some(100.0);
        let mut b = supplier("B");
        b.last_audit_score = Some(95.0);
        let mut c = supplier("C");
        c.last_audit_score = Some(5.0);

        let hist = audit_score_histogram(&[a, b, c]);
        assert_eq!(hist[0], ("0-9".to_string(), 1));
        assert_eq!(hist[9], ("90-100".to_string(), 2));
    }

    #[test]
    fn test_recognition_subject() {
        assert_eq!(
            recognition_subject("Acme"),
            "Recognition for Excellence - Acme"
        );
    }
}
