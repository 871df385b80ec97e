pub mod academic;
pub mod projection;

pub use academic::{classify, AcademicPeriodCode, Half};
pub use projection::{
    academic_code_for_payment, add_months, billing_period_start, project, project_due_date,
    Projection,
};
