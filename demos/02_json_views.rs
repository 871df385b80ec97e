/// json views - serialized dues for dashboards
use chrono::{NaiveDate, TimeZone, Utc};
use hostel_dues_rs::{
    Actor, BillingConfig, BillingDesk, DueStatusView, DuesSummaryView, FeeSchedule, Hostel,
    MemoryStore, Money, PaymentSubmission, ReceiptView, SafeTimeProvider, StudentBillingState,
    TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("=== json views ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 7, 1, 6, 0, 0).unwrap()
    ));

    let store = MemoryStore::new();
    let hostel = Hostel {
        id: Uuid::new_v4(),
        name: "South Annex".to_string(),
        fees: FeeSchedule::new(Money::from_major(24_000), Money::from_major(45_000)),
    };
    let admitted = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    let overdue = StudentBillingState::new(Uuid::new_v4(), hostel.id, admitted);
    let paying = StudentBillingState::new(Uuid::new_v4(), hostel.id, admitted)
        .with_due_date(NaiveDate::from_ymd_opt(2024, 7, 10).unwrap());
    store.insert_hostel(hostel.clone())?;
    store.insert_student(overdue.clone())?;
    store.insert_student(paying.clone())?;
    let mut desk = BillingDesk::new(BillingConfig::standard(), store)?;

    let submission = PaymentSubmission::online(
        paying.student_id,
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
        "24000.00",
        "6",
        "UTR7781",
        "2024-07-01",
    )
    .with_remarks("paid at front desk");
    let receipt = desk.record_payment(Actor::Organization, &submission, &time)?;

    println!("receipt");
    println!("-------");
    println!("{}\n", ReceiptView::from_receipt(&receipt).to_json_pretty()?);

    let status = desk.student_dues(Actor::Organization, overdue.student_id, &time)?;
    println!("overdue student");
    println!("---------------");
    println!("{}\n", DueStatusView::from_status(&status).to_json_pretty()?);

    let summary = desk.hostel_dues(Actor::Hostel(hostel.id), hostel.id, &time)?;
    println!("hostel summary");
    println!("--------------");
    println!("{}\n", DuesSummaryView::from_summary(Some(hostel.id), &summary).to_json_pretty()?);

    let rollup = desk.organization_dues(Actor::Organization, &time)?;
    println!("organization rollup");
    println!("-------------------");
    for view in DuesSummaryView::from_organization(&rollup) {
        println!("{}", view.to_json_pretty()?);
    }

    Ok(())
}
