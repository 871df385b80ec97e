pub mod recorder;
pub mod submission;

pub use recorder::{prepare_payment, InvoiceRecorder, PaymentReceipt, PreparedPayment};
pub use submission::{
    parse_amount, parse_period, MethodDetails, PaymentSubmission, RawScalar, ValidatedPayment,
};
