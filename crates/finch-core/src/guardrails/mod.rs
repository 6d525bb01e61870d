//! Recommendation guardrails
//!
//! Gates every surfaced item must clear:
//! - `eligibility` - partner-offer qualification and the hard
//!   prohibited-product blocklist
//! - `tone` - lexical screen rejecting shaming or pressuring language in
//!   dynamically generated text

pub mod eligibility;
pub mod tone;

pub use eligibility::{
    check_eligibility, estimate_financial_profile, EligibilityCheck, FinancialProfile,
};
pub use tone::{validate_content, ContentFields, ToneCategory, ToneReport, ToneSeverity};
