pub mod records;
pub mod valuation;
