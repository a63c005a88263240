//! Cellular automata rules.
//!
//! For the notations of rule strings, please see
//! [this article on LifeWiki](https://conwaylife.com/wiki/Rulestring).

mod counts;
mod life;

pub use counts::Counts;
pub use life::RuleSet;
