use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::dues::evaluator::{evaluate_ledger, DueStatus};
use crate::state::StudentLedger;
use crate::types::{FeeSchedule, Hostel, HostelId};

/// dues over a population of students sharing one fee schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuesSummary {
    pub per_student: Vec<DueStatus>,
    pub total_students: usize,
    /// students with dues
    pub count: usize,
    pub total_due_amount: Money,
    pub percentage_with_dues: u32,
}

impl DuesSummary {
    /// students with dues, most overdue first
    pub fn overdue_students(&self, limit: Option<usize>) -> Vec<&DueStatus> {
        rank_overdue(self.per_student.iter(), limit)
    }
}

/// whole percent of `count` over `total`, rounded half up; 0 for an empty population
pub fn percentage_with_dues(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let count = count as u64;
    let total = total as u64;
    ((200 * count + total) / (2 * total)) as u32
}

fn rank_overdue<'a, I>(statuses: I, limit: Option<usize>) -> Vec<&'a DueStatus>
where
    I: Iterator<Item = &'a DueStatus>,
{
    let mut overdue: Vec<&DueStatus> = statuses.filter(|s| s.has_dues).collect();
    overdue.sort_by(|a, b| {
        b.days_overdue
            .cmp(&a.days_overdue)
            .then_with(|| a.student_id.cmp(&b.student_id))
    });
    if let Some(limit) = limit {
        overdue.truncate(limit);
    }
    overdue
}

/// evaluate every student against one fee schedule and one `now`
pub fn aggregate(students: &[StudentLedger], fees: &FeeSchedule, now: NaiveDate) -> DuesSummary {
    let per_student: Vec<DueStatus> = students
        .iter()
        .map(|ledger| evaluate_ledger(ledger, fees, now))
        .collect();

    let (count, total_due_amount) = per_student
        .iter()
        .filter(|s| s.has_dues)
        .fold((0usize, Money::ZERO), |(n, sum), s| (n + 1, sum + s.due_amount));

    DuesSummary {
        total_students: per_student.len(),
        count,
        total_due_amount,
        percentage_with_dues: percentage_with_dues(count, per_student.len()),
        per_student,
    }
}

/// a hostel with its already-materialized student ledgers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostelLedgers {
    pub hostel: Hostel,
    pub students: Vec<StudentLedger>,
}

/// one hostel's line in an organization rollup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostelDues {
    pub hostel_id: HostelId,
    pub hostel_name: String,
    pub summary: DuesSummary,
}

/// organization-wide rollup of hostel summaries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationDues {
    pub hostels: Vec<HostelDues>,
    pub total_students: usize,
    pub count: usize,
    pub total_due_amount: Money,
    pub percentage_with_dues: u32,
}

impl OrganizationDues {
    /// students with dues across every hostel, most overdue first
    pub fn overdue_students(&self, limit: Option<usize>) -> Vec<&DueStatus> {
        rank_overdue(
            self.hostels.iter().flat_map(|h| h.summary.per_student.iter()),
            limit,
        )
    }
}

/// aggregate each hostel with its own fee schedule and sum the hostel totals
pub fn aggregate_organization(groups: &[HostelLedgers], now: NaiveDate) -> OrganizationDues {
    let hostels: Vec<HostelDues> = groups
        .iter()
        .map(|group| HostelDues {
            hostel_id: group.hostel.id,
            hostel_name: group.hostel.name.clone(),
            summary: aggregate(&group.students, &group.hostel.fees, now),
        })
        .collect();

    let total_students = hostels.iter().map(|h| h.summary.total_students).sum();
    let count = hostels.iter().map(|h| h.summary.count).sum();
    let total_due_amount = hostels.iter().map(|h| h.summary.total_due_amount).sum();

    OrganizationDues {
        percentage_with_dues: percentage_with_dues(count, total_students),
        hostels,
        total_students,
        count,
        total_due_amount,
    }
}
