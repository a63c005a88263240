//! Game configuration.

use crate::{
    cells::{CellSize, Extent},
    error::Error,
    game::Game,
    grid::{check_density, Grid, DEFAULT_DENSITY},
    rules::RuleSet,
    scheduler::DEFAULT_INTERVAL_MS,
};
use educe::Educe;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Game configuration.
///
/// The game will be generated from this configuration.
/// Nothing is checked until [`game`](Self::game) is called.
#[derive(Clone, Debug, Educe, PartialEq)]
#[educe(Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Width of the panel, in pixels.
    #[educe(Default = 1300)]
    pub width: u32,

    /// Height of the panel, in pixels.
    #[educe(Default = 700)]
    pub height: u32,

    /// Pixels per cell.
    pub cell_size: CellSize,

    /// The rule string of the cellular automaton.
    #[educe(Default = "B3/S23")]
    pub rule_string: String,

    /// Milliseconds between two generations.
    #[educe(Default(expression = "DEFAULT_INTERVAL_MS"))]
    pub interval_ms: u64,

    /// Probability for a cell to be alive when randomizing.
    #[educe(Default(expression = "DEFAULT_DENSITY"))]
    pub density: f64,
}

impl Config {
    /// Sets up a new configuration with given panel size.
    pub fn new(width: u32, height: u32) -> Self {
        Config {
            width,
            height,
            ..Config::default()
        }
    }

    /// Sets the cell size.
    pub fn set_cell_size(mut self, cell_size: CellSize) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// Sets the rule string.
    pub fn set_rule_string<S: Into<String>>(mut self, rule_string: S) -> Self {
        self.rule_string = rule_string.into();
        self
    }

    /// Sets the rule.
    pub fn set_rules(mut self, rules: RuleSet) -> Self {
        self.rule_string = rules.to_string();
        self
    }

    /// Sets the time between two generations.
    pub fn set_interval_ms(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Sets the density used when randomizing.
    pub fn set_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    /// The panel extent.
    pub fn extent(&self) -> Result<Extent, Error> {
        Extent::new(self.width, self.height)
    }

    /// The rule.
    pub fn rules(&self) -> Result<RuleSet, Error> {
        self.rule_string.parse()
    }

    /// Creates an empty grid from the configuration.
    pub fn grid(&self) -> Result<Grid, Error> {
        Ok(Grid::new(self.extent()?, self.cell_size))
    }

    /// Creates a new stopped game from the configuration.
    pub fn game(&self) -> Result<Game, Error> {
        check_density(self.density)?;
        Game::new(self.grid()?, self.rules()?, self.interval_ms, self.density)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default() {
        let config = Config::default();
        assert_eq!(config.width, 1300);
        assert_eq!(config.height, 700);
        assert_eq!(config.cell_size, CellSize::Medium);
        assert_eq!(config.rules(), Ok(RuleSet::default()));
        assert_eq!(config.interval_ms, 500);
        assert_eq!(config.density, 0.2);
    }

    #[test]
    fn invalid() {
        assert!(Config::new(32, 700).game().is_err());
        assert!(Config::default().set_rule_string("B3/S2x").game().is_err());
        assert!(Config::default().set_interval_ms(0).game().is_err());
        assert!(Config::default().set_density(1.0).game().is_err());
    }

    #[test]
    fn builder() {
        let rules = RuleSet::parse("36", "23").unwrap();
        let config = Config::new(640, 960)
            .set_cell_size(CellSize::Small)
            .set_rules(rules)
            .set_interval_ms(100);
        assert_eq!(config.rule_string, "B36/S23");
        assert_eq!(config.rules(), Ok(rules));
        assert_eq!(config.grid().unwrap().dimensions(), (20, 30));
    }

    #[test]
    #[cfg(feature = "serde")]
    fn partial_json() {
        let config: Config =
            serde_json::from_str(r#"{ "cell_size": 32, "rule_string": "B36/S23" }"#).unwrap();
        assert_eq!(config.cell_size, CellSize::Small);
        assert_eq!(config.width, 1300);
        assert_eq!(config.interval_ms, 500);
        assert!(serde_json::from_str::<Config>(r#"{ "cell_size": 20 }"#).is_err());
    }

    #[test]
    #[cfg(feature = "serde")]
    fn json_round_trip() {
        let config = Config::new(640, 960).set_cell_size(CellSize::ExtraLarge);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<Config>(&json).unwrap(), config);
    }
}
