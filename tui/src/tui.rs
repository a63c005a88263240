//! The terminal interface.

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Attribute, Print, SetAttribute},
    terminal::{self, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::{
    io::{self, Stdout, Write},
    path::PathBuf,
    time::Duration,
};
use torus_life_lib::{CellSize, Error, Game, LoadOutcome};

/// How long to wait for a key before redrawing.
const REFRESH: Duration = Duration::from_millis(50);

/// How much [+] and [-] change the interval.
const INTERVAL_STEP_MS: u64 = 50;

const KEYS: &str = "[space] run/stop  [n] step  [c] clear  [r] random  [1-5] size  \
                    [+/-] speed  [i] interval  [b] rule  [s] save  [l] load  [q] quit";

/// Cuts or pads `text` to exactly `width` characters.
fn fit(text: &str, width: u16) -> String {
    let width = width as usize;
    let mut line: String = text.chars().take(width).collect();
    let len = line.chars().count();
    line.extend(std::iter::repeat(' ').take(width - len));
    line
}

/// Draws a highlighted bar on the given row.
fn bar(stdout: &mut Stdout, row: u16, text: &str) -> io::Result<()> {
    let (cols, _) = terminal::size()?;
    queue!(
        stdout,
        MoveTo(0, row),
        SetAttribute(Attribute::Reverse),
        Print(fit(text, cols)),
        SetAttribute(Attribute::Reset)
    )
}

fn bottom_bar(stdout: &mut Stdout, text: &str) -> io::Result<()> {
    let (_, rows) = terminal::size()?;
    bar(stdout, rows.saturating_sub(1), text)?;
    stdout.flush()
}

fn key_press(event: Event) -> Option<KeyEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(key),
        _ => None,
    }
}

/// Asks a yes-or-no question on the bottom bar.
fn confirm(stdout: &mut Stdout, question: &str) -> io::Result<bool> {
    bottom_bar(stdout, &format!("{} [Y/n]", question))?;
    loop {
        if let Some(key) = key_press(event::read()?) {
            match key.code {
                KeyCode::Char('Y') | KeyCode::Char('y') | KeyCode::Enter => return Ok(true),
                KeyCode::Char('N') | KeyCode::Char('n') | KeyCode::Esc => return Ok(false),
                _ => (),
            }
        }
    }
}

struct GameWindow {
    game: Game,
    /// Where [s] saves.
    output: PathBuf,
    stdout: Stdout,
    /// The last error or notice, shown until the next key.
    message: Option<String>,
}

impl GameWindow {
    fn new(game: Game, output: PathBuf) -> io::Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, Hide)?;
        Ok(GameWindow {
            game,
            output,
            stdout,
            message: None,
        })
    }

    /// Draws the top bar and the current generation.
    fn draw_world(&mut self) -> io::Result<()> {
        let (cols, rows) = terminal::size()?;
        let visible = rows.saturating_sub(2) as usize;
        let (top, lines) = self.game.with_world(|world| {
            let grid = world.grid();
            let top = format!(
                "Gen: {}  Cells: {}  Size: {}  Grid: {}x{}",
                world.generation(),
                grid.population(),
                grid.cell_size(),
                grid.width(),
                grid.height()
            );
            let lines: Vec<String> = (0..grid.height().min(visible))
                .map(|y| grid.live().row(y).chars().take(cols as usize).collect())
                .collect();
            (top, lines)
        });

        bar(&mut self.stdout, 0, &top)?;
        for y in 0..visible {
            let line = lines.get(y).map_or("", String::as_str);
            queue!(
                self.stdout,
                MoveTo(0, y as u16 + 1),
                Print(line),
                terminal::Clear(ClearType::UntilNewLine)
            )?;
        }
        Ok(())
    }

    fn draw(&mut self) -> io::Result<()> {
        self.draw_world()?;
        let status = format!(
            "{}  {}",
            self.game.status(),
            self.message.as_deref().unwrap_or(KEYS)
        );
        bottom_bar(&mut self.stdout, &status)
    }

    /// Reads a line on the bottom bar, while the world keeps being drawn.
    /// Returns `None` if cancelled with [Esc].
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let mut input = String::new();
        loop {
            self.draw_world()?;
            bottom_bar(&mut self.stdout, &format!("{}{}", prompt, input))?;
            if !event::poll(REFRESH)? {
                continue;
            }
            if let Some(key) = key_press(event::read()?) {
                match key.code {
                    KeyCode::Enter => return Ok(Some(input)),
                    KeyCode::Esc => return Ok(None),
                    KeyCode::Backspace => {
                        input.pop();
                    }
                    KeyCode::Char(c) => input.push(c),
                    _ => (),
                }
            }
        }
    }

    fn report(&mut self, result: Result<(), Error>) {
        if let Err(e) = result {
            self.message = Some(e.to_string());
        }
    }

    fn toggle_running(&mut self) {
        if self.game.is_running() {
            self.game.stop();
        } else {
            let result = self.game.start();
            self.report(result);
        }
    }

    fn change_interval(&mut self, longer: bool) {
        let interval_ms = self.game.interval_ms();
        let interval_ms = if longer {
            interval_ms.saturating_add(INTERVAL_STEP_MS)
        } else {
            interval_ms.saturating_sub(INTERVAL_STEP_MS).max(1)
        };
        let result = self.game.set_interval(interval_ms);
        self.report(result);
    }

    fn set_interval(&mut self) -> io::Result<()> {
        if let Some(input) = self.read_line("Interval in ms: ")? {
            let result = self.game.set_interval_str(input.trim());
            self.report(result);
        }
        Ok(())
    }

    fn set_rule(&mut self) -> io::Result<()> {
        let prompt = format!("Rule [{}]: ", self.game.rules());
        if let Some(input) = self.read_line(&prompt)? {
            let result = self.game.set_rule_string(input.trim());
            self.report(result);
        }
        Ok(())
    }

    fn save(&mut self) {
        self.message = Some(match self.game.save_to_path(&self.output) {
            Ok(path) => format!("Saved to {}", path.display()),
            Err(e) => e.to_string(),
        });
    }

    fn load(&mut self) -> io::Result<()> {
        let prompt = format!("Load from [{}]: ", self.output.display());
        let input = match self.read_line(&prompt)? {
            Some(input) => input,
            None => return Ok(()),
        };
        let path = match input.trim() {
            "" => self.output.clone(),
            path => PathBuf::from(path),
        };

        let stdout = &mut self.stdout;
        let result = self.game.load_from_path(&path, |size| {
            let question = format!("The saved grid needs the {} grid size. Resize the grid?", size);
            confirm(stdout, &question).unwrap_or(false)
        });
        self.message = Some(match result {
            Ok(LoadOutcome::Applied) => format!("Loaded {}", path.display()),
            Ok(LoadOutcome::Resized(size)) => format!("Loaded {} at {}", path.display(), size),
            Ok(LoadOutcome::Declined) => String::from("Kept the current grid"),
            Err(e) => e.to_string(),
        });
        Ok(())
    }

    fn main_loop(&mut self) -> io::Result<()> {
        loop {
            self.draw()?;
            if !event::poll(REFRESH)? {
                continue;
            }
            // Anything but a key press, e.g. a resize, only needs a redraw.
            let key = match key_press(event::read()?) {
                Some(key) => key,
                None => continue,
            };
            self.message = None;
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Ok(());
            }
            match key.code {
                KeyCode::Char('q') => {
                    if confirm(&mut self.stdout, "Are you sure to quit?")? {
                        return Ok(());
                    }
                }
                KeyCode::Char(' ') | KeyCode::Enter => self.toggle_running(),
                KeyCode::Char('n') => self.game.step(),
                KeyCode::Char('c') => self.game.clear(),
                KeyCode::Char('r') => {
                    let result = self.game.randomize();
                    self.report(result);
                }
                KeyCode::Char(c @ '1'..='5') => {
                    let size = CellSize::ALL[c as usize - '1' as usize];
                    self.game.resize(size);
                }
                KeyCode::Char('+') | KeyCode::Char('=') => self.change_interval(true),
                KeyCode::Char('-') => self.change_interval(false),
                KeyCode::Char('i') => self.set_interval()?,
                KeyCode::Char('b') => self.set_rule()?,
                KeyCode::Char('s') => self.save(),
                KeyCode::Char('l') => self.load()?,
                _ => (),
            }
        }
    }
}

impl Drop for GameWindow {
    fn drop(&mut self) {
        self.game.stop();
        let _ = execute!(self.stdout, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Runs the game in the terminal until [q] is pressed, then prints the
/// last generation.
pub(crate) fn run(game: Game, output: PathBuf) -> io::Result<()> {
    let (grid, status) = {
        let mut window = GameWindow::new(game, output)?;
        window.main_loop()?;
        window.game.stop();
        (window.game.snapshot().grid().plaintext(), window.game.status())
    };
    print!("{}", grid);
    println!("{}", status);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_to_width() {
        assert_eq!(fit("Gen: 3", 8), "Gen: 3  ");
        assert_eq!(fit("Gen: 3", 3), "Gen");
        assert_eq!(fit("", 2), "  ");
    }
}
