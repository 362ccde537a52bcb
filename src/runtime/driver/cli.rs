use std::io::{self, Write};
use std::time::Instant;

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
};
use thiserror::Error;

use crate::error::SpatialError;
use crate::geometry::Size;
use crate::metrics::MetricSnapshot;
use crate::repository::SpatialRepository;
use crate::runtime::ViewerRuntime;

/// Smallest terminal that fits the header, status line, a few list rows and
/// a minimal floor canvas.
pub const MIN_SCREEN: Size = Size::new(24, 8);

pub type DriverResult<T> = std::result::Result<T, CliDriverError>;

#[derive(Debug, Error)]
pub enum CliDriverError {
    #[error("runtime error: {0}")]
    Runtime(#[from] SpatialError),
    #[error("terminal error: {0}")]
    Terminal(String),
    #[error("terminal is {width}x{height}, the viewer needs at least {min_width}x{min_height}")]
    ScreenTooSmall {
        width: u16,
        height: u16,
        min_width: u16,
        min_height: u16,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Runs a `ViewerRuntime` on the real terminal.
///
/// The screen size is checked before raw mode is entered, so a terminal that
/// is too small fails with a readable message instead of a garbled frame.
/// Raw mode and the alternate screen are restored even when the loop fails.
pub struct CliDriver<R> {
    runtime: ViewerRuntime<R>,
    title: Option<String>,
}

impl<R: SpatialRepository> CliDriver<R> {
    pub fn new(runtime: ViewerRuntime<R>) -> Self {
        Self {
            runtime,
            title: None,
        }
    }

    /// Window title override. Defaults to `floorgrid: <building id>`.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn window_title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("floorgrid: {}", self.runtime.controller().building_id()))
    }

    /// Run until the user quits and return the session's final counters.
    pub fn run(mut self) -> DriverResult<MetricSnapshot> {
        let (width, height) = terminal::size()?;
        let screen = checked_screen(width, height)?;
        let started = Instant::now();

        let mut stdout = io::stdout();
        self.enter(&mut stdout)?;
        self.runtime.resize(screen);
        let result = self.runtime.run(&mut stdout);
        self.exit(&mut stdout);
        result?;

        Ok(self.runtime.metrics().snapshot(started.elapsed()))
    }

    fn enter(&self, stdout: &mut impl Write) -> DriverResult<()> {
        terminal::enable_raw_mode().map_err(|err| CliDriverError::Terminal(err.to_string()))?;
        execute!(
            stdout,
            EnterAlternateScreen,
            SetTitle(self.window_title()),
            Hide,
            Clear(ClearType::All)
        )?;
        Ok(())
    }

    fn exit(&self, stdout: &mut impl Write) {
        execute!(stdout, Show, LeaveAlternateScreen).ok();
        terminal::disable_raw_mode().ok();
    }
}

/// Terminal dimensions as a viewer screen, rejecting anything below
/// [`MIN_SCREEN`] on either axis.
pub fn checked_screen(width: u16, height: u16) -> DriverResult<Size> {
    if width < MIN_SCREEN.width || height < MIN_SCREEN.height {
        return Err(CliDriverError::ScreenTooSmall {
            width,
            height,
            min_width: MIN_SCREEN.width,
            min_height: MIN_SCREEN.height,
        });
    }
    Ok(Size::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::model::Building;
    use crate::repository::{BuildingSnapshot, InMemoryRepository};

    fn runtime() -> ViewerRuntime<InMemoryRepository> {
        let repo = InMemoryRepository::new()
            .with_building(BuildingSnapshot::new(Building::new("b1", "Annex")));
        ViewerRuntime::new(repo, "b1", ViewerConfig::default(), Size::new(80, 24)).unwrap()
    }

    #[test]
    fn small_terminals_are_rejected() {
        let err = checked_screen(80, 5).unwrap_err();
        assert!(matches!(
            err,
            CliDriverError::ScreenTooSmall {
                width: 80,
                height: 5,
                ..
            }
        ));
        assert!(err.to_string().contains("at least 24x8"));
        assert!(checked_screen(10, 40).is_err());
    }

    #[test]
    fn minimum_terminal_is_accepted() {
        assert_eq!(checked_screen(24, 8).unwrap(), MIN_SCREEN);
        assert_eq!(checked_screen(120, 40).unwrap(), Size::new(120, 40));
    }

    #[test]
    fn title_defaults_to_building_id() {
        let driver = CliDriver::new(runtime());
        assert_eq!(driver.window_title(), "floorgrid: b1");
        let driver = driver.with_title("Annex viewer");
        assert_eq!(driver.window_title(), "Annex viewer");
    }
}
