//! Totalistic Life-like rules.

use super::Counts;
use crate::error::Error;
use ca_rules::ParseLife;
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// A totalistic Life-like rule: which neighbor counts bring a dead cell
/// to life, and which keep a living cell alive.
///
/// Two rule sets are equal when their sets are equal; the text produced by
/// [`Display`] is only for showing to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RuleSet {
    /// Neighbor counts that bring a dead cell to life.
    birth: Counts,
    /// Neighbor counts that keep a living cell alive.
    survival: Counts,
}

impl RuleSet {
    /// Constructs a new rule from the birth and survival sets.
    pub fn new(birth: Counts, survival: Counts) -> Self {
        RuleSet { birth, survival }
    }

    /// Parses the birth and survival digit strings, e.g. `"3"` and `"23"`.
    ///
    /// Both strings are checked before anything is built, so an error in
    /// either of them never yields a half-updated rule.
    pub fn parse(birth: &str, survival: &str) -> Result<Self, Error> {
        let birth = birth.parse()?;
        let survival = survival.parse()?;
        Ok(RuleSet { birth, survival })
    }

    #[inline]
    pub fn birth(&self) -> Counts {
        self.birth
    }

    #[inline]
    pub fn survival(&self) -> Counts {
        self.survival
    }

    /// The state of a cell in the next generation, given its current state
    /// and its number of living neighbors.
    #[inline]
    pub fn next_state(&self, alive: bool, neighbors: u8) -> bool {
        if alive {
            self.survival.has(neighbors)
        } else {
            self.birth.has(neighbors)
        }
    }
}

/// Conway's Game of Life, `B3/S23`.
impl Default for RuleSet {
    fn default() -> Self {
        RuleSet {
            birth: Counts::N3,
            survival: Counts::N2 | Counts::N3,
        }
    }
}

/// Displays the rule in `B/S` notation, e.g. `B3/S23`.
impl Display for RuleSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "B{}/S{}", self.birth, self.survival)
    }
}

/// A parser for the rule.
impl ParseLife for RuleSet {
    fn from_bs(b: Vec<u8>, s: Vec<u8>) -> Self {
        RuleSet {
            birth: Counts::from_slice(&b),
            survival: Counts::from_slice(&s),
        }
    }
}

/// Parses a whole rulestring, e.g. `B36/S23` or `23/3`.
impl FromStr for RuleSet {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let rule: RuleSet = ParseLife::parse_rule(input).map_err(Error::ParseRuleError)?;
        Ok(rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_conway() {
        let rules = RuleSet::default();
        assert_eq!(rules, RuleSet::parse("3", "23").unwrap());
        assert_eq!(rules.to_string(), "B3/S23");
    }

    #[test]
    fn round_trip() {
        let rules = RuleSet::parse("3", "23").unwrap();
        let birth = rules.birth().to_string();
        let survival = rules.survival().to_string();
        assert!(birth.contains('3'));
        assert!(survival.contains('2') && survival.contains('3'));
        assert_eq!(RuleSet::parse(&birth, &survival), Ok(rules));
    }

    #[test]
    fn invalid_birth_or_survival() {
        assert_eq!(RuleSet::parse("3a", "23"), Err(Error::InvalidRuleChar('a')));
        assert_eq!(RuleSet::parse("3", "2 3"), Err(Error::InvalidRuleChar(' ')));
    }

    #[test]
    fn empty_sets() {
        let rules = RuleSet::parse("", "").unwrap();
        assert_eq!(rules.to_string(), "B/S");
        assert!((0..=8).all(|n| !rules.next_state(true, n) && !rules.next_state(false, n)));
    }

    #[test]
    fn next_state() {
        let rules = RuleSet::default();
        assert!(rules.next_state(false, 3));
        assert!(!rules.next_state(false, 2));
        assert!(rules.next_state(true, 2));
        assert!(rules.next_state(true, 3));
        assert!(!rules.next_state(true, 4));
    }

    #[test]
    fn rulestring() {
        let highlife: RuleSet = "B36/S23".parse().unwrap();
        assert_eq!(highlife, RuleSet::parse("63", "32").unwrap());
        assert!("B3/S23x".parse::<RuleSet>().is_err());
    }
}
