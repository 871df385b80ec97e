/// quick start - record a payment and check dues
use chrono::NaiveDate;
use hostel_dues_rs::{
    Actor, BillingConfig, BillingDesk, FeeSchedule, Hostel, MemoryStore, Money, PaymentSubmission,
    SafeTimeProvider, StudentBillingState, TimeSource, Uuid,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let store = MemoryStore::new();
    let hostel = Hostel {
        id: Uuid::new_v4(),
        name: "North Block".to_string(),
        fees: FeeSchedule::new(Money::from_major(30_000), Money::from_major(55_000)),
    };
    let admission = NaiveDate::from_ymd_opt(2024, 6, 1).ok_or("bad date")?;
    let student = StudentBillingState::new(Uuid::new_v4(), hostel.id, admission);
    store.insert_hostel(hostel.clone())?;
    store.insert_student(student.clone())?;

    let mut desk = BillingDesk::new(BillingConfig::standard(), store)?;
    let time = SafeTimeProvider::new(TimeSource::System);
    let today = desk.config.local_date(time.now())?;

    // pay six months by bank transfer
    let submission = PaymentSubmission::online(
        student.student_id,
        today,
        "30000",
        6,
        "UTR000123",
        &today.format("%Y-%m-%d").to_string(),
    );
    let receipt = desk.record_payment(Actor::Hostel(hostel.id), &submission, &time)?;
    println!("paid for {} ({})", receipt.academic_code, receipt.academic_code.label());
    println!("next due {}", receipt.new_due_date);

    let status = desk.student_dues(Actor::Hostel(hostel.id), student.student_id, &time)?;
    println!("has dues: {}", status.has_dues);

    Ok(())
}
