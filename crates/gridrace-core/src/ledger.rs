use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-car signed finish-line balance, scoped to one race session.
///
/// An entry appears on a car's first crossing, starting at `-laps`. Each
/// correctly directed crossing adds one and each wrong-way crossing
/// subtracts one; a correct crossing that lands on zero finishes the race.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyLedger {
    balances: HashMap<char, i32>,
}

impl PenaltyLedger {
    /// Record a crossing and return the new balance for `car`.
    pub fn record_crossing(&mut self, car: char, correct: bool, laps: u32) -> i32 {
        let start = -i32::try_from(laps).unwrap_or(i32::MAX);
        let balance = self.balances.entry(car).or_insert(start);
        if correct {
            *balance += 1;
        } else {
            *balance -= 1;
        }
        *balance
    }

    /// `None` until the car first touches a finish line.
    pub fn balance(&self, car: char) -> Option<i32> {
        self.balances.get(&car).copied()
    }
}
