//! `srp dashboard` command - Supplier performance overview
//!
//! Every section is derived read-only from the supplier, asset, task and
//! audit tables. Charts are reported as their underlying counts.

use clap::ValueEnum;
use console::style;
use miette::Result;
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers;
use crate::cli::output;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::dashboard::{self as kpi, Badge, BadgeRow, Summary};
use crate::core::records::Records;
use crate::core::session::Session;
use crate::entities::{Asset, AuditPoint, Supplier, Task};

/// How many suppliers the "top" rankings show
const TOP_N: usize = 10;

#[derive(clap::Args, Debug)]
pub struct DashboardArgs {
    /// Show only one section
    #[arg(long, value_enum)]
    pub section: Option<Section>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    /// Headline counts
    Summary,
    /// Items needing attention (idle assets, overdue tasks and audits, high reject rates)
    Alerts,
    /// ESG compliance
    Esg,
    /// Recognition badges
    Badges,
    /// Agreement, risk and audit score distributions
    Distribution,
    /// Spend by category and top suppliers
    Spend,
}

/// Everything the dashboard shows, in one serializable report
#[derive(Debug, Serialize)]
struct Report<'a> {
    summary: Summary,
    idle_assets: Vec<&'a Asset>,
    overdue_tasks: Vec<&'a Task>,
    high_reject_suppliers: Vec<&'a Supplier>,
    overdue_audits: Vec<&'a AuditPoint>,
    upcoming_audits: Vec<&'a AuditPoint>,
    delayed_esg_projects: Vec<&'a Task>,
    low_esg_suppliers: Vec<&'a Supplier>,
    emissions_missed: Vec<&'a Supplier>,
    badges: Vec<BadgeRow>,
    badge_counts: Vec<(Badge, usize)>,
    agreement_distribution: Vec<(String, usize)>,
    risk_distribution: Vec<(String, usize)>,
    audit_score_histogram: Vec<(String, usize)>,
    spend_by_category: Vec<(String, i64)>,
    top_by_spend: Vec<&'a Supplier>,
    top_by_audit_score: Vec<&'a Supplier>,
    pending_renewal: Vec<&'a Supplier>,
    reviews_overdue: Vec<&'a Supplier>,
}

/// Run the dashboard command
pub fn run(args: DashboardArgs, global: &GlobalOpts) -> Result<()> {
    let session = helpers::open_session(global)?;
    if !session.role().sees_everything() && !global.quiet {
        output::warning(format!(
            "the dashboard covers all suppliers; acting as {}",
            session.role()
        ));
    }

    let suppliers = load::<Supplier>(&session)?;
    let assets = load::<Asset>(&session)?;
    let tasks = load::<Task>(&session)?;
    let audits = load::<AuditPoint>(&session)?;

    let today = session.today();
    let t = session.thresholds();

    let report = Report {
        summary: kpi::summary(&suppliers, &assets, &tasks, &audits, today, &t),
        idle_assets: kpi::idle_assets(&assets, today, &t),
        overdue_tasks: kpi::overdue_tasks(&tasks, today),
        high_reject_suppliers: kpi::high_reject_suppliers(&suppliers, &t),
        overdue_audits: kpi::overdue_audits(&audits, today),
        upcoming_audits: kpi::upcoming_audits(&audits, today, &t),
        delayed_esg_projects: kpi::delayed_esg_projects(&tasks, today),
        low_esg_suppliers: kpi::low_esg_suppliers(&suppliers, &t),
        emissions_missed: kpi::emissions_missed(&suppliers),
        badges: kpi::badge_rows(&suppliers, &t),
        badge_counts: kpi::badge_counts(&suppliers, &t),
        agreement_distribution: kpi::agreement_distribution(&suppliers)
            .into_iter()
            .map(|(s, n)| (s.to_string(), n))
            .collect(),
        risk_distribution: kpi::risk_distribution(&suppliers)
            .into_iter()
            .map(|(r, n)| (r.to_string(), n))
            .collect(),
        audit_score_histogram: kpi::audit_score_histogram(&suppliers),
        spend_by_category: kpi::spend_by_category(&suppliers),
        top_by_spend: kpi::top_by_spend(&suppliers, TOP_N),
        top_by_audit_score: kpi::top_by_audit_score(&suppliers, TOP_N),
        pending_renewal: kpi::pending_renewal(&suppliers),
        reviews_overdue: kpi::reviews_overdue(&suppliers, today, &t),
    };

    let format = helpers::resolve_format(global, &session);
    if format == OutputFormat::Json {
        return match args.section {
            None => output::print_json_if(format, &report).map(|_| ()),
            Some(section) => output::print_json_if(format, &section_json(&report, section)).map(|_| ()),
        };
    }

    let show = |s: Section| args.section.is_none() || args.section == Some(s);
    let markdown = format == OutputFormat::Md;

    if show(Section::Summary) {
        print_summary(&report.summary, markdown);
    }
    if show(Section::Alerts) {
        heading("Needs attention");
        list_section(
            "Idle assets",
            report.idle_assets.iter().map(|a| {
                format!(
                    "{} {} (last active {})",
                    a.asset_id,
                    a.asset_name,
                    a.last_active_date.map(|d| d.to_string()).unwrap_or_default()
                )
            }),
        );
        list_section(
            "Overdue tasks",
            report.overdue_tasks.iter().map(|t| {
                format!("{} {} ({}, due {})", t.task_id, t.task_name, t.assigned_to, date(t.due_date))
            }),
        );
        list_section(
            "High reject rate",
            report.high_reject_suppliers.iter().map(|s| {
                format!("{} {} ({:.2}%)", s.supplier_id, s.supplier_name, s.quality_reject_rate.unwrap_or_default())
            }),
        );
        list_section(
            "Overdue audit points",
            report.overdue_audits.iter().map(|a| {
                format!("{} {} ({}, due {})", a.audit_id, a.point_description, a.assignee, date(a.due_date))
            }),
        );
        list_section(
            &format!("Audit points due in the next {} days", t.audit_horizon_days),
            report.upcoming_audits.iter().map(|a| {
                format!("{} {} (due {})", a.audit_id, a.point_description, date(a.due_date))
            }),
        );
        list_section(
            "Agreements pending renewal",
            report.pending_renewal.iter().map(|s| format!("{} {}", s.supplier_id, s.supplier_name)),
        );
        list_section(
            "Performance reviews overdue",
            report.reviews_overdue.iter().map(|s| {
                format!(
                    "{} {} (last review {})",
                    s.supplier_id,
                    s.supplier_name,
                    date(s.last_performance_review_date)
                )
            }),
        );
    }
    if show(Section::Esg) {
        heading("ESG");
        list_section(
            "Delayed ESG projects",
            report.delayed_esg_projects.iter().map(|t| {
                format!("{} {} (due {})", t.task_id, t.task_name, date(t.due_date))
            }),
        );
        list_section(
            &format!("ESG score below {}", t.esg_score_min),
            report.low_esg_suppliers.iter().map(|s| {
                format!(
                    "{} {} ({})",
                    s.supplier_id,
                    s.supplier_name,
                    s.esg_compliance_score.map(|v| v.to_string()).unwrap_or_default()
                )
            }),
        );
        list_section(
            "Emissions target missed",
            report.emissions_missed.iter().map(|s| format!("{} {}", s.supplier_id, s.supplier_name)),
        );
    }
    if show(Section::Badges) {
        heading("Recognition badges");
        print_pairs(
            "Badge",
            "Suppliers",
            report.badge_counts.iter().map(|(b, n)| (b.label().to_string(), n.to_string())),
            markdown,
        );
        let earned: Vec<&BadgeRow> = report.badges.iter().filter(|r| !r.badges.is_empty()).collect();
        for row in earned {
            let labels: Vec<&str> = row.badges.iter().map(|b| b.label()).collect();
            println!("  {} {}: {}", style(&row.supplier_id).cyan(), row.supplier_name, labels.join(", "));
        }
        println!();
    }
    if show(Section::Distribution) {
        heading("Distributions");
        print_pairs(
            "Agreement status",
            "Suppliers",
            report.agreement_distribution.iter().map(|(s, n)| (s.clone(), n.to_string())),
            markdown,
        );
        print_pairs(
            "Risk level",
            "Suppliers",
            report.risk_distribution.iter().map(|(s, n)| (s.clone(), n.to_string())),
            markdown,
        );
        print_pairs(
            "Audit score",
            "Suppliers",
            report.audit_score_histogram.iter().map(|(s, n)| (s.clone(), n.to_string())),
            markdown,
        );
    }
    if show(Section::Spend) {
        heading("Spend");
        print_pairs(
            "Category",
            "Annual spend (USD)",
            report.spend_by_category.iter().map(|(c, v)| (c.clone(), v.to_string())),
            markdown,
        );
        print_pairs(
            "Top by spend",
            "Annual spend (USD)",
            report.top_by_spend.iter().map(|s| {
                (s.supplier_name.clone(), s.annual_spend_usd.map(|v| v.to_string()).unwrap_or_default())
            }),
            markdown,
        );
        print_pairs(
            "Top by audit score",
            "Score",
            report.top_by_audit_score.iter().map(|s| {
                (s.supplier_name.clone(), s.last_audit_score.map(|v| v.to_string()).unwrap_or_default())
            }),
            markdown,
        );
    }
    Ok(())
}

fn load<R: crate::core::entity::Record>(session: &Session) -> Result<Vec<R>> {
    Records::<R>::new(session.workspace())
        .list()
        .map_err(|e| miette::miette!("{}", e))
}

fn section_json(report: &Report<'_>, section: Section) -> serde_json::Value {
    match section {
        Section::Alerts => serde_json::json!({
            "idle_assets": report.idle_assets,
            "overdue_tasks": report.overdue_tasks,
            "high_reject_suppliers": report.high_reject_suppliers,
            "overdue_audits": report.overdue_audits,
            "upcoming_audits": report.upcoming_audits,
            "pending_renewal": report.pending_renewal,
            "reviews_overdue": report.reviews_overdue,
        }),
        Section::Esg => serde_json::json!({
            "delayed_esg_projects": report.delayed_esg_projects,
            "low_esg_suppliers": report.low_esg_suppliers,
            "emissions_missed": report.emissions_missed,
        }),
        Section::Distribution => serde_json::json!({
            "agreement_distribution": report.agreement_distribution,
            "risk_distribution": report.risk_distribution,
            "audit_score_histogram": report.audit_score_histogram,
        }),
        Section::Spend => serde_json::json!({
            "spend_by_category": report.spend_by_category,
            "top_by_spend": report.top_by_spend,
            "top_by_audit_score": report.top_by_audit_score,
        }),
        Section::Summary => serde_json::json!(report.summary),
        Section::Badges => serde_json::json!({
            "badges": report.badges,
            "badge_counts": report.badge_counts,
        }),
    }
}

fn date(d: Option<chrono::NaiveDate>) -> String {
    d.map(|d| d.to_string()).unwrap_or_default()
}

fn heading(title: &str) {
    println!("{}", style(title).bold().underlined());
}

fn print_summary(s: &Summary, markdown: bool) {
    heading("Supplier overview");
    let pct = |v: Option<f64>| v.map(|v| format!("{:.2}%", v)).unwrap_or_else(|| "-".to_string());
    let rows = [
        ("Suppliers", s.suppliers.to_string()),
        ("Average on-time delivery", pct(s.average_on_time)),
        ("Average reject rate", pct(s.average_reject)),
        ("Idle assets", s.idle_assets.to_string()),
        ("Overdue tasks", s.overdue_tasks.to_string()),
        ("High reject suppliers", s.high_reject_suppliers.to_string()),
        ("Overdue audit points", s.overdue_audits.to_string()),
        ("Upcoming audit points", s.upcoming_audits.to_string()),
        ("Delayed ESG projects", s.delayed_esg_projects.to_string()),
        ("Low ESG suppliers", s.low_esg_suppliers.to_string()),
        ("Emissions target missed", s.emissions_missed.to_string()),
        ("Pending renewal", s.pending_renewal.to_string()),
        ("Reviews overdue", s.reviews_overdue.to_string()),
    ];
    print_pairs(
        "Metric",
        "Value",
        rows.into_iter().map(|(k, v)| (k.to_string(), v)),
        markdown,
    );
}

fn list_section(title: &str, items: impl Iterator<Item = String>) {
    let items: Vec<String> = items.collect();
    if items.is_empty() {
        println!("{} {}: none", style("✓").green(), title);
        return;
    }
    println!("{} {} ({})", style("!").yellow(), title, items.len());
    for item in items {
        println!("    {}", item);
    }
}

fn print_pairs(left: &str, right: &str, rows: impl Iterator<Item = (String, String)>, markdown: bool) {
    let mut builder = Builder::default();
    builder.push_record([left.to_string(), right.to_string()]);
    let mut any = false;
    for (k, v) in rows {
        builder.push_record([k, v]);
        any = true;
    }
    if !any {
        println!("{}: no data", left);
        println!();
        return;
    }
    let mut table = builder.build();
    if markdown {
        println!("{}", table.with(Style::markdown()).to_string());
    } else {
        println!("{}", table.with(Style::sharp()).to_string());
    }
    println!();
}
