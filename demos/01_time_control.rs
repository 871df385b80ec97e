/// time control - watch a student fall into arrears and catch up
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use hostel_dues_rs::{
    Actor, BillingConfig, BillingDesk, FeeSchedule, Hostel, MemoryStore, Money, PaymentSubmission,
    SafeTimeProvider, StudentBillingState, TimeSource, Uuid,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== time control example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2023, 8, 1, 6, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();

    let store = MemoryStore::new();
    let hostel = Hostel {
        id: Uuid::new_v4(),
        name: "East Wing".to_string(),
        fees: FeeSchedule::new(Money::from_major(30_000), Money::from_major(55_000)),
    };
    let student = StudentBillingState::new(
        Uuid::new_v4(),
        hostel.id,
        NaiveDate::from_ymd_opt(2023, 8, 1).unwrap(),
    );
    store.insert_hostel(hostel.clone())?;
    store.insert_student(student.clone())?;
    let mut desk = BillingDesk::new(BillingConfig::standard(), store)?;
    let staff = Actor::Hostel(hostel.id);

    // first payment on admission day
    let today = desk.config.local_date(time.now())?;
    let submission = PaymentSubmission::online(student.student_id, today, 30_000, 6, "UTR1", "2023-08-01");
    let receipt = desk.record_payment(staff, &submission, &time)?;
    println!("{}: paid {}, due {}", today, receipt.academic_code, receipt.new_due_date);

    // skip ahead past the due date
    controller.advance(Duration::days(200));
    let status = desk.student_dues(staff, student.student_id, &time)?;
    println!(
        "{}: has dues {}, {} days overdue, owes {}",
        desk.config.local_date(time.now())?,
        status.has_dues,
        status.days_overdue,
        status.due_amount
    );

    // late payment counts from today, the missed days are forfeited
    let today = desk.config.local_date(time.now())?;
    let submission = PaymentSubmission::cheque(
        student.student_id,
        today,
        55_000,
        12,
        "000771",
        &today.format("%Y-%m-%d").to_string(),
        "Canara Bank",
    );
    let receipt = desk.record_payment(staff, &submission, &time)?;
    println!(
        "{}: paid {}, due {} (grace forfeited: {})",
        today, receipt.academic_code, receipt.new_due_date, receipt.grace_forfeited
    );

    println!("\n{} events recorded", desk.events.events().len());

    Ok(())
}
