use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// Whole-rupee amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rupees(pub u64);

impl Rupees {
    pub const ZERO: Rupees = Rupees(0);

    /// `percent` of the amount, rounded half up.
    pub fn share(self, percent: u8) -> Rupees {
        Rupees(self.0.saturating_mul(u64::from(percent)).saturating_add(50) / 100)
    }

    pub fn saturating_mul(self, factor: u32) -> Rupees {
        Rupees(self.0.saturating_mul(u64::from(factor)))
    }

    /// Indian digit grouping without a symbol, e.g. `1,23,456`.
    pub fn grouped(self) -> String {
        let digits = self.0.to_string();
        if digits.len() <= 3 {
            return digits;
        }

        let (head, tail) = digits.split_at(digits.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 2 {
            groups.push(&head[end - 2..end]);
            end -= 2;
        }
        groups.push(&head[..end]);
        groups.reverse();

        format!("{},{}", groups.join(","), tail)
    }

    /// Rendering for outputs restricted to ASCII (PDF base fonts, bitmap glyphs).
    pub fn ascii(self) -> String {
        format!("Rs. {}", self.grouped())
    }
}

impl fmt::Display for Rupees {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{}", self.grouped())
    }
}

impl Add for Rupees {
    type Output = Rupees;

    fn add(self, rhs: Self) -> Self::Output {
        Rupees(self.0.saturating_add(rhs.0))
    }
}
