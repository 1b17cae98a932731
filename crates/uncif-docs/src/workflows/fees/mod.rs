//! Documentation fee quotes.
//!
//! Every constant that prices a request lives in [`FeeSchedule`]; the calculator itself is a
//! pure function over the schedule so it can run on every field change.

mod calculator;
mod currency;
pub mod router;
mod schedule;

pub use calculator::{
    ApplicantCategory, FeeCalculator, FeeInputError, FeeQuote, PageCount, ProjectType,
};
pub use currency::Rupees;
pub use router::{fee_router, FeeQuoteView, FormattedFees};
pub use schedule::FeeSchedule;
