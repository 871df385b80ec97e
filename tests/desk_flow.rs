use chrono::{NaiveDate, TimeZone, Utc};
use hostel_dues_rs::{
    Actor, BillingConfig, BillingStore, BillingDesk, ErrorKind, Event, FeeSchedule, Hostel, MemoryStore, Money,
    PaymentSubmission, ReceiptView, SafeTimeProvider, StudentBillingState, TimeSource, Uuid,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn noon(y: i32, m: u32, d: u32) -> SafeTimeProvider {
    SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()))
}

fn hostel(name: &str, six: i64, twelve: i64) -> Hostel {
    Hostel {
        id: Uuid::new_v4(),
        name: name.to_string(),
        fees: FeeSchedule::new(Money::from_major(six), Money::from_major(twelve)),
    }
}

#[test]
fn overdue_student_pays_late_and_forfeits_grace() {
    let store = MemoryStore::new();
    let block = hostel("North Block", 30_000, 55_000);
    let student = StudentBillingState::new(Uuid::new_v4(), block.id, date(2023, 7, 10))
        .with_due_date(date(2024, 1, 10));
    store.insert_hostel(block.clone()).unwrap();
    store.insert_student(student.clone()).unwrap();
    let mut desk = BillingDesk::new(BillingConfig::utc(), store).unwrap();
    let time = noon(2024, 6, 1);

    let before = desk.student_dues(Actor::Hostel(block.id), student.student_id, &time).unwrap();
    assert!(before.has_dues);
    assert_eq!(before.days_overdue, 143);

    let submission = PaymentSubmission::online(
        student.student_id,
        date(2024, 6, 1),
        "30000",
        "6",
        "UTR2024060101",
        "2024-06-01",
    );
    let receipt = desk.record_payment(Actor::Hostel(block.id), &submission, &time).unwrap();

    assert_eq!(receipt.new_due_date, date(2024, 12, 1));
    assert_eq!(receipt.academic_code.to_string(), "23242");
    assert!(receipt.grace_forfeited);

    let after = desk.student_dues(Actor::Organization, student.student_id, &time).unwrap();
    assert!(!after.has_dues);
    assert_eq!(after.due_amount, Money::ZERO);
    assert_eq!(after.next_due_date, date(2024, 12, 1));
    assert_eq!(after.last_payment.unwrap().academic_code.to_string(), "23242");
}

#[test]
fn early_annual_payment_keeps_remaining_time() {
    let store = MemoryStore::new();
    let block = hostel("East Wing", 30_000, 55_000);
    let student = StudentBillingState::new(Uuid::new_v4(), block.id, date(2024, 9, 1))
        .with_due_date(date(2025, 3, 1));
    store.insert_hostel(block.clone()).unwrap();
    store.insert_student(student.clone()).unwrap();
    let mut desk = BillingDesk::new(BillingConfig::utc(), store).unwrap();
    let time = noon(2025, 1, 1);

    let submission = PaymentSubmission::cheque(
        student.student_id,
        date(2025, 1, 1),
        55_000,
        12,
        "004512",
        "2024-12-31",
        "State Bank",
    );
    let receipt = desk.record_payment(Actor::Organization, &submission, &time).unwrap();

    assert_eq!(receipt.new_due_date, date(2026, 3, 1));
    assert_eq!(receipt.academic_code.to_string(), "24252");
    assert!(!receipt.grace_forfeited);

    let view = ReceiptView::from_receipt(&receipt);
    assert_eq!(view.scheduled_fee, Money::from_major(55_000));
    assert_eq!(view.reference, "004512");

    let recorded: Vec<&Event> = desk
        .events
        .events()
        .iter()
        .filter(|e| matches!(e, Event::PaymentRecorded { .. }))
        .collect();
    assert_eq!(recorded.len(), 1);
}

#[test]
fn never_paid_student_owes_from_admission() {
    let store = MemoryStore::new();
    let block = hostel("South Annex", 30_000, 55_000);
    let student = StudentBillingState::new(Uuid::new_v4(), block.id, date(2024, 1, 10));
    store.insert_hostel(block.clone()).unwrap();
    store.insert_student(student.clone()).unwrap();
    let desk = BillingDesk::new(BillingConfig::utc(), store).unwrap();

    let status = desk
        .student_dues(Actor::Organization, student.student_id, &noon(2024, 7, 1))
        .unwrap();

    assert!(status.has_dues);
    assert_eq!(status.next_due_date, date(2024, 1, 10));
    assert_eq!(status.days_overdue, 173);
    assert_eq!(status.due_amount, Money::from_major(30_000));
    assert!(status.last_payment.is_none());
}

#[test]
fn invalid_submission_leaves_state_untouched() {
    let store = MemoryStore::new();
    let block = hostel("West Wing", 30_000, 55_000);
    let student = StudentBillingState::new(Uuid::new_v4(), block.id, date(2024, 1, 10))
        .with_due_date(date(2024, 7, 10));
    store.insert_hostel(block.clone()).unwrap();
    store.insert_student(student.clone()).unwrap();
    let mut desk = BillingDesk::new(BillingConfig::utc(), store).unwrap();
    let time = noon(2024, 6, 1);

    let bad_amount =
        PaymentSubmission::online(student.student_id, date(2024, 6, 1), "-5", 6, "T1", "2024-06-01");
    let err = desk.record_payment(Actor::Organization, &bad_amount, &time).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let no_bank = PaymentSubmission::cheque(
        student.student_id,
        date(2024, 6, 1),
        30_000,
        6,
        "1001",
        "2024-06-01",
        "  ",
    );
    let err = desk.record_payment(Actor::Organization, &no_bank, &time).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let stored = desk.store().student(student.student_id).unwrap();
    assert_eq!(stored.due_date, Some(date(2024, 7, 10)));
    assert!(desk.store().invoices_for_student(student.student_id).unwrap().is_empty());
    assert!(desk
        .events
        .events()
        .iter()
        .all(|e| matches!(e, Event::PaymentRejected { .. })));
}

#[test]
fn organization_rollup_uses_each_hostels_fees() {
    let store = MemoryStore::new();
    let north = hostel("North Block", 30_000, 55_000);
    let south = hostel("South Annex", 24_000, 45_000);
    store.insert_hostel(north.clone()).unwrap();
    store.insert_hostel(south.clone()).unwrap();

    // north: one overdue, one paid up
    store
        .insert_student(StudentBillingState::new(Uuid::new_v4(), north.id, date(2024, 1, 1)))
        .unwrap();
    store
        .insert_student(
            StudentBillingState::new(Uuid::new_v4(), north.id, date(2024, 1, 1))
                .with_due_date(date(2024, 12, 1)),
        )
        .unwrap();
    // south: one overdue
    store
        .insert_student(
            StudentBillingState::new(Uuid::new_v4(), south.id, date(2023, 9, 1))
                .with_due_date(date(2024, 3, 1)),
        )
        .unwrap();

    let desk = BillingDesk::new(BillingConfig::utc(), store).unwrap();
    let time = noon(2024, 7, 1);

    let rollup = desk.organization_dues(Actor::Organization, &time).unwrap();
    assert_eq!(rollup.total_students, 3);
    assert_eq!(rollup.count, 2);
    assert_eq!(rollup.total_due_amount, Money::from_major(54_000));
    assert_eq!(rollup.percentage_with_dues, 67);
    assert_eq!(rollup.hostels.len(), 2);

    let north_summary = desk.hostel_dues(Actor::Hostel(north.id), north.id, &time).unwrap();
    assert_eq!(north_summary.count, 1);
    assert_eq!(north_summary.percentage_with_dues, 50);

    let overdue = rollup.overdue_students(None);
    assert_eq!(overdue.len(), 2);
    assert!(overdue[0].days_overdue >= overdue[1].days_overdue);

    let err = desk.hostel_dues(Actor::Hostel(south.id), north.id, &time).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}

#[test]
fn empty_hostel_reports_zero_percent() {
    let store = MemoryStore::new();
    let empty = hostel("New Block", 30_000, 55_000);
    store.insert_hostel(empty.clone()).unwrap();
    let desk = BillingDesk::new(BillingConfig::utc(), store).unwrap();

    let summary = desk.hostel_dues(Actor::Organization, empty.id, &noon(2024, 7, 1)).unwrap();
    assert_eq!(summary.total_students, 0);
    assert_eq!(summary.count, 0);
    assert_eq!(summary.total_due_amount, Money::ZERO);
    assert_eq!(summary.percentage_with_dues, 0);
}

#[test]
fn collections_group_by_academic_half() {
    let store = MemoryStore::new();
    let block = hostel("North Block", 30_000, 55_000);
    let first = StudentBillingState::new(Uuid::new_v4(), block.id, date(2024, 6, 1));
    let second = StudentBillingState::new(Uuid::new_v4(), block.id, date(2024, 6, 1));
    store.insert_hostel(block.clone()).unwrap();
    store.insert_student(first.clone()).unwrap();
    store.insert_student(second.clone()).unwrap();
    let mut desk = BillingDesk::new(BillingConfig::utc(), store).unwrap();
    let time = noon(2024, 6, 1);

    for (student, period, amount) in [(&first, 6, 30_000), (&second, 12, 55_000)] {
        let submission = PaymentSubmission::online(
            student.student_id,
            date(2024, 6, 1),
            amount,
            period,
            "UTR",
            "2024-06-01",
        );
        desk.record_payment(Actor::Organization, &submission, &time).unwrap();
    }

    let collections = desk.collections_by_period(Actor::Hostel(block.id), block.id).unwrap();
    assert_eq!(collections.len(), 1);
    assert_eq!(collections[0].academic_code.to_string(), "24251");
    assert_eq!(collections[0].invoice_count, 2);
    assert_eq!(collections[0].total_amount, Money::from_major(85_000));
    assert_eq!(collections[0].six_month_invoices, 1);
    assert_eq!(collections[0].twelve_month_invoices, 1);
}
