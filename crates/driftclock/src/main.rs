use std::time::{Duration, Instant};

use chrono::{Local, Timelike};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use directories::ProjectDirs;
use driftclock_clock::DigitalClock;
use driftclock_config::Config;
use driftclock_core::{Moment, SimSettings};
use driftclock_sim::{Simulation, TickInput};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout},
    style::Stylize,
    text::Line,
};

mod render;

/// How long a status message stays on screen.
const STATUS_TIMEOUT: Duration = Duration::from_secs(4);

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_logging();
    let config = Config::load().unwrap_or_else(|err| {
        log::warn!("{err}, using default settings");
        Config::default()
    });
    let terminal = ratatui::init();
    let result = match terminal.size() {
        Ok(size) => App::new(config, size.width, size.height).run(terminal),
        Err(err) => Err(err.into()),
    };
    ratatui::restore();
    result
}

/// Send log output to a file so it never tears through the terminal UI.
fn init_logging() {
    let Some(dirs) = ProjectDirs::from("", "", "driftclock") else {
        return;
    };
    let dir = dirs.cache_dir();
    let log_file = std::fs::create_dir_all(dir)
        .and_then(|_| std::fs::File::create(dir.join("driftclock.log")));
    let Ok(file) = log_file else {
        return;
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
}

fn now() -> Moment {
    let now = Local::now();
    Moment::new(now.hour(), now.minute(), now.second())
}

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    config: Config,
    /// Time between simulation ticks.
    tick: Duration,
    sim: Simulation,
    clock: DigitalClock,
    /// Something besides the simulation changed on screen.
    dirty: bool,
    status: Option<(String, Instant)>,
}

impl App {
    /// Construct a new instance of [`App`] for a terminal of `cols` x `rows`.
    pub fn new(config: Config, cols: u16, rows: u16) -> Self {
        let (width, height) = grid_size(cols, rows);
        let settings = sim_settings(&config);
        Self {
            running: false,
            tick: config.tick(),
            sim: Simulation::new(width, height, settings),
            clock: DigitalClock::new(width, height, config.hue_mode, config.time_format),
            config,
            dirty: true,
            status: Some((
                "q quit  e erupt  m sand/snow  h hue  t 12/24h  s save".to_string(),
                Instant::now(),
            )),
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;
        let mut next_tick = Instant::now();
        while self.running {
            if Instant::now() >= next_tick {
                self.on_tick();
                next_tick = Instant::now() + self.tick;
            }
            if self.dirty || self.sim.needs_paint() {
                terminal.draw(|frame| self.render(frame))?;
                self.sim.mark_painted();
                self.dirty = false;
            }
            self.handle_crossterm_events(next_tick.saturating_duration_since(Instant::now()))?;
        }
        Ok(())
    }

    /// Advance the clock face and the simulation by one tick.
    fn on_tick(&mut self) {
        let moment = now();
        let color = self.clock.color();
        let shape_changed = self.clock.set_time(moment);
        if shape_changed || self.clock.color() != color {
            self.dirty = true;
        }
        if self
            .status
            .as_ref()
            .is_some_and(|(_, shown)| shown.elapsed() > STATUS_TIMEOUT)
        {
            self.status = None;
            self.dirty = true;
        }

        let input = TickInput::new(&self.clock, moment)
            .shape_changed(shape_changed)
            .color(self.clock.color())
            .regions(self.clock.regions());
        self.sim.tick(&input);
    }

    /// Renders the user interface.
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        render::render_field(frame, area, &self.sim, &self.clock);

        if let Some((message, _)) = &self.status {
            let chunks = Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).split(area);
            frame.render_widget(Line::from(message.as_str().dark_gray()).centered(), chunks[1]);
        }
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Waits at most until the next tick is due.
    fn handle_crossterm_events(&mut self, timeout: Duration) -> color_eyre::Result<()> {
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Resize(cols, rows) => self.resize(cols, rows),
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char('e')) => self.erupt(),
            (_, KeyCode::Char('m')) => self.toggle_material(),
            (_, KeyCode::Char('h')) => self.cycle_hue_mode(),
            (_, KeyCode::Char('t')) => self.toggle_time_format(),
            (_, KeyCode::Char('s')) => self.save_config(),
            _ => {}
        }
    }

    /// Rebuild the simulation and the face for a new terminal size.
    fn resize(&mut self, cols: u16, rows: u16) {
        let (width, height) = grid_size(cols, rows);
        self.sim.resize(width, height);
        self.clock = DigitalClock::new(width, height, self.config.hue_mode, self.config.time_format);
        self.dirty = true;
    }

    fn erupt(&mut self) {
        self.sim.erupt();
    }

    /// Switch between sand and snow, starting over with the new preset.
    fn toggle_material(&mut self) {
        self.config.material = self.config.material.toggle();
        self.tick = self.config.tick();
        self.sim = Simulation::new(self.sim.width(), self.sim.height(), sim_settings(&self.config));
        self.clock = DigitalClock::new(
            self.sim.width(),
            self.sim.height(),
            self.config.hue_mode,
            self.config.time_format,
        );
        self.set_status(format!("{:?}", self.config.material).to_lowercase());
    }

    /// Cycle through available hue modes.
    fn cycle_hue_mode(&mut self) {
        self.config.hue_mode = self.config.hue_mode.next();
        self.clock.set_hue_mode(self.config.hue_mode);
    }

    /// Toggle between 12-hour and 24-hour time format.
    fn toggle_time_format(&mut self) {
        self.config.time_format = self.config.time_format.toggle();
        self.clock.set_time_format(self.config.time_format);
    }

    fn save_config(&mut self) {
        match self.config.save() {
            Ok(path) => self.set_status(format!("saved {}", path.display())),
            Err(err) => {
                log::warn!("could not save config: {err}");
                self.set_status(format!("save failed: {err}"));
            }
        }
    }

    fn set_status(&mut self, message: String) {
        self.status = Some((message, Instant::now()));
        self.dirty = true;
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}

/// Grid dimensions for a terminal: two pixels per cell vertically.
fn grid_size(cols: u16, rows: u16) -> (i32, i32) {
    (i32::from(cols.max(1)), i32::from(rows.max(1)) * 2)
}

fn sim_settings(config: &Config) -> SimSettings {
    config.sim_settings().unwrap_or_else(|err| {
        log::warn!("{err}, using the {:?} preset", config.material);
        config.material.settings()
    })
}
