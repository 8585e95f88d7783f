pub mod dcf;
pub mod display;
pub mod form;

pub use dcf::{calculate_dcf, DcfInput, DcfOutput, DcfYearProjection};
pub use display::{format_krw, round_currency, DcfDisplay};
pub use form::DcfForm;
