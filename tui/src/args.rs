//! Parsing command-line arguments.

use clap::{
    builder::{NonEmptyStringValueParser, TypedValueParser},
    command,
    error::{ErrorKind, Result as ClapResult},
    value_parser, Arg, ArgAction, ArgMatches, Command, Error,
};
use std::{ffi::OsString, fs, path::Path, path::PathBuf};
use torus_life_lib::{parse_interval, CellSize, Config, Counts, Game, RuleSet};

/// A struct to store the parse results.
pub(crate) struct Args {
    pub(crate) game: Game,
    pub(crate) load: Option<PathBuf>,
    pub(crate) output: Option<PathBuf>,
    pub(crate) yes: bool,
    pub(crate) generations: u64,
    #[cfg(feature = "tui")]
    pub(crate) no_tui: bool,
}

fn parse_density(s: &str) -> Result<f64, String> {
    let density: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if density > 0.0 && density < 1.0 {
        Ok(density)
    } else {
        Err(String::from("density must be strictly between 0 and 1"))
    }
}

fn command() -> Command {
    let app = command!()
        .long_about(
            "Conway's Game of Life on a toroidal grid\n\
             \n\
             The grid wraps around: cells on the left edge are neighbors \
             of cells on the right edge, and likewise for top and bottom.\n\
             \n\
             The grid is laid on a panel of WIDTH x HEIGHT pixels, so its \
             dimensions in cells depend on the cell size.",
        )
        .arg(
            Arg::new("WIDTH")
                .help("Width of the panel, in pixels")
                .short('W')
                .long("width")
                .value_parser(value_parser!(u32).range(64..)),
        )
        .arg(
            Arg::new("HEIGHT")
                .help("Height of the panel, in pixels")
                .short('H')
                .long("height")
                .value_parser(value_parser!(u32).range(64..)),
        )
        .arg(
            Arg::new("SIZE")
                .help("Grid size")
                .long_help(
                    "Grid size\n\
                     xs, s, m, l, xl for Extra Small to Extra Large, \
                     or the cell size in pixels: 64, 32, 16, 8, 4.\n\
                     The smaller the cells, the larger the grid.",
                )
                .short('s')
                .long("size")
                .value_parser(|s: &str| s.parse::<CellSize>().map_err(|e| e.to_string())),
        )
        .arg(
            Arg::new("RULE")
                .help("Rule of the cellular automaton")
                .long_help(
                    "Rule of the cellular automaton\n\
                     Supports Life-like rules in B/S notation, e.g. B3/S23 or B36/S23.",
                )
                .short('r')
                .long("rule")
                .conflicts_with_all(["BIRTH", "SURVIVAL"])
                .value_parser(|s: &str| s.parse::<RuleSet>().map_err(|e| e.to_string())),
        )
        .arg(
            Arg::new("BIRTH")
                .help("Neighbor counts that bring a dead cell to life, e.g. 3")
                .short('b')
                .long("birth")
                .value_parser(|s: &str| s.parse::<Counts>().map_err(|e| e.to_string())),
        )
        .arg(
            Arg::new("SURVIVAL")
                .help("Neighbor counts that keep a living cell alive, e.g. 23")
                .short('S')
                .long("survival")
                .value_parser(|s: &str| s.parse::<Counts>().map_err(|e| e.to_string())),
        )
        .arg(
            Arg::new("INTERVAL")
                .help("Time between generations, in milliseconds")
                .short('i')
                .long("interval")
                .value_parser(|s: &str| parse_interval(s).map_err(|e| e.to_string())),
        )
        .arg(
            Arg::new("DENSITY")
                .help("Probability for a cell to be alive when randomizing")
                .short('d')
                .long("density")
                .value_parser(parse_density),
        )
        .arg(
            Arg::new("CONFIG")
                .help("Reads the configuration from a JSON, YAML or TOML file")
                .long_help(
                    "Reads the configuration from a JSON, YAML or TOML file\n\
                     The format is chosen by the extension. Options given on \
                     the command line override the file.",
                )
                .short('c')
                .long("config")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("LOAD")
                .help("Loads a saved grid")
                .short('l')
                .long("load")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("YES")
                .help("Resizes the grid without asking when a loaded grid needs it")
                .short('y')
                .long("yes")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("OUTPUT")
                .help("Where to save the grid")
                .long_help(
                    "Where to save the grid\n\
                     In the TUI, [s] saves here (default: grid.json).\n\
                     With --no-tui, the grid is saved here after the last generation.",
                )
                .short('o')
                .long("output")
                .value_parser(NonEmptyStringValueParser::new().map(PathBuf::from)),
        )
        .arg(
            Arg::new("GENERATIONS")
                .help("Number of generations to run without the TUI")
                .short('g')
                .long("generations")
                .value_parser(value_parser!(u64))
                .default_value("1"),
        );

    #[cfg(feature = "tui")]
    let app = app.arg(
        Arg::new("NOTUI")
            .help("Runs the generations and prints the grid, without entering the TUI")
            .short('n')
            .long("no-tui")
            .action(ArgAction::SetTrue),
    );

    app
}

/// Reads a configuration file, choosing the format by the extension.
fn read_config(path: &Path) -> Result<Config, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("json") => serde_json::from_str(&text).map_err(|e| e.to_string()),
        Some("yaml") | Some("yml") => serde_yaml::from_str(&text).map_err(|e| e.to_string()),
        Some("toml") => toml::from_str(&text).map_err(|e| e.to_string()),
        _ => Err(format!(
            "{}: unknown configuration format, expected .json, .yaml or .toml",
            path.display()
        )),
    }
}

/// Applies the options given on the command line on top of `config`.
fn override_config(mut config: Config, matches: &ArgMatches) -> Result<Config, String> {
    if let Some(&width) = matches.get_one::<u32>("WIDTH") {
        config.width = width;
    }
    if let Some(&height) = matches.get_one::<u32>("HEIGHT") {
        config.height = height;
    }
    if let Some(&cell_size) = matches.get_one::<CellSize>("SIZE") {
        config = config.set_cell_size(cell_size);
    }
    if let Some(&rules) = matches.get_one::<RuleSet>("RULE") {
        config = config.set_rules(rules);
    }
    let birth = matches.get_one::<Counts>("BIRTH");
    let survival = matches.get_one::<Counts>("SURVIVAL");
    if birth.is_some() || survival.is_some() {
        let base = config.rules().map_err(|e| e.to_string())?;
        let rules = RuleSet::new(
            birth.copied().unwrap_or_else(|| base.birth()),
            survival.copied().unwrap_or_else(|| base.survival()),
        );
        config = config.set_rules(rules);
    }
    if let Some(&interval_ms) = matches.get_one::<u64>("INTERVAL") {
        config = config.set_interval_ms(interval_ms);
    }
    if let Some(&density) = matches.get_one::<f64>("DENSITY") {
        config = config.set_density(density);
    }
    Ok(config)
}

impl Args {
    /// Parses the command-line arguments.
    pub(crate) fn parse() -> ClapResult<Self> {
        Self::parse_from(std::env::args_os())
    }

    /// Parses the given arguments. The first one is the binary name.
    pub(crate) fn parse_from<I, T>(iter: I) -> ClapResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut app = command();
        let matches = app.try_get_matches_from_mut(iter)?;
        let invalid = |app: &mut Command, message: String| -> Error {
            app.error(ErrorKind::InvalidValue, message)
        };

        let config = match matches.get_one::<PathBuf>("CONFIG") {
            Some(path) => read_config(path).map_err(|e| invalid(&mut app, e))?,
            None => Config::default(),
        };
        let config = override_config(config, &matches).map_err(|e| invalid(&mut app, e))?;
        let game = config.game().map_err(|e| invalid(&mut app, e.to_string()))?;

        Ok(Args {
            game,
            load: matches.get_one::<PathBuf>("LOAD").cloned(),
            output: matches.get_one::<PathBuf>("OUTPUT").cloned(),
            yes: matches.get_flag("YES"),
            generations: matches.get_one::<u64>("GENERATIONS").copied().unwrap_or(1),
            #[cfg(feature = "tui")]
            no_tui: matches.get_flag("NOTUI"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_command() {
        command().debug_assert();
    }

    #[test]
    fn defaults() {
        let args = Args::parse_from(["torus-life"]).unwrap();
        assert_eq!(args.game.status().to_string(), "stopped || B3/S23 || 500 ms");
        assert_eq!(args.game.snapshot().grid().dimensions(), (81, 43));
        assert_eq!(args.generations, 1);
        assert!(args.load.is_none());
        assert!(!args.yes);
    }

    #[test]
    fn options() {
        let args = Args::parse_from([
            "torus-life", "-W", "640", "-H", "960", "--size", "s", "-r", "B36/S23", "-i", "100",
            "-g", "10",
        ])
        .unwrap();
        assert_eq!(args.game.status().to_string(), "stopped || B36/S23 || 100 ms");
        assert_eq!(args.game.snapshot().grid().dimensions(), (20, 30));
        assert_eq!(args.generations, 10);
    }

    #[test]
    fn birth_and_survival() {
        let args = Args::parse_from(["torus-life", "-b", "36"]).unwrap();
        assert_eq!(args.game.rules().to_string(), "B36/S23");
        let args = Args::parse_from(["torus-life", "-b", "3", "-S", ""]).unwrap();
        assert_eq!(args.game.rules().to_string(), "B3/S");
    }

    #[test]
    fn invalid() {
        for args in [
            &["torus-life", "-b", "3a"][..],
            &["torus-life", "-S", "9"],
            &["torus-life", "-r", "B3/S23", "-b", "3"],
            &["torus-life", "-i", "fast"],
            &["torus-life", "-i", "0"],
            &["torus-life", "-d", "1.5"],
            &["torus-life", "-s", "20"],
            &["torus-life", "-W", "10"],
        ] {
            assert!(Args::parse_from(args.iter().copied()).is_err(), "{:?}", args);
        }
    }

    #[test]
    fn config_file() {
        let dir = std::env::temp_dir().join(format!("torus-life-args-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "cell_size = 32\nrule_string = \"B36/S23\"\ninterval_ms = 250\n").unwrap();

        let args = Args::parse_from([
            OsString::from("torus-life"),
            OsString::from("-c"),
            path.clone().into_os_string(),
            OsString::from("-i"),
            OsString::from("300"),
        ])
        .unwrap();
        assert_eq!(args.game.status().to_string(), "stopped || B36/S23 || 300 ms");
        assert_eq!(args.game.snapshot().grid().dimensions(), (40, 21));

        let yaml = dir.join("config.yaml");
        fs::write(&yaml, "width: 640\nheight: 960\ncell_size: 64\n").unwrap();
        let args = Args::parse_from([
            OsString::from("torus-life"),
            OsString::from("--config"),
            yaml.into_os_string(),
        ])
        .unwrap();
        assert_eq!(args.game.snapshot().grid().dimensions(), (10, 15));

        let unknown = dir.join("config.ini");
        fs::write(&unknown, "").unwrap();
        assert!(Args::parse_from([
            OsString::from("torus-life"),
            OsString::from("-c"),
            unknown.into_os_string(),
        ])
        .is_err());

        fs::remove_dir_all(&dir).unwrap();
    }
}
