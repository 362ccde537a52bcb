use std::io::Write;

use blake3::Hash;

use crate::error::Result;
use crate::geometry::Size;
use crate::width::pad_to_width;

/// Presenter runtime parameters.
#[derive(Debug, Clone, Default)]
pub struct PresenterSettings {
    pub restore_cursor: Option<(u16, u16)>,
}

/// Writes whole frames to a terminal handle with absolute cursor positioning.
///
/// Frames whose content hash matches the previous frame are skipped.
pub struct FramePresenter {
    settings: PresenterSettings,
    last_frame: Option<Hash>,
}

impl FramePresenter {
    pub fn new(settings: PresenterSettings) -> Self {
        Self {
            settings,
            last_frame: None,
        }
    }

    pub fn with_default() -> Self {
        Self::new(PresenterSettings::default())
    }

    pub fn settings_mut(&mut self) -> &mut PresenterSettings {
        &mut self.settings
    }

    /// Forget the previous frame so the next one is always written.
    pub fn invalidate(&mut self) {
        self.last_frame = None;
    }

    /// Returns `false` when the frame was identical to the last one.
    pub fn present(
        &mut self,
        writer: &mut impl Write,
        lines: &[String],
        screen: Size,
    ) -> Result<bool> {
        let hash = frame_hash(lines, screen);
        if self.last_frame == Some(hash) {
            return Ok(false);
        }

        let width = usize::from(screen.width);
        for row in 0..usize::from(screen.height) {
            let line = lines.get(row).map(String::as_str).unwrap_or("");
            write!(writer, "\x1b[{};1H", row + 1)?;
            write!(writer, "{}", pad_to_width(line, width))?;
        }

        if let Some((row, col)) = self.settings.restore_cursor {
            write!(writer, "\x1b[{};{}H", row + 1, col + 1)?;
        }

        writer.flush()?;
        self.last_frame = Some(hash);
        Ok(true)
    }
}

fn frame_hash(lines: &[String], screen: Size) -> Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&screen.width.to_le_bytes());
    hasher.update(&screen.height.to_le_bytes());
    for line in lines {
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|line| line.to_string()).collect()
    }

    #[test]
    fn presenter_writes_cursor_sequences() {
        let mut output = Vec::new();
        let mut presenter = FramePresenter::with_default();
        let written = presenter
            .present(&mut output, &frame(&["hi"]), Size::new(4, 2))
            .unwrap();
        assert!(written);
        let rendered = String::from_utf8(output).unwrap();
        assert!(rendered.contains("\u{1b}[1;1Hhi  "));
        assert!(rendered.contains("\u{1b}[2;1H    "));
    }

    #[test]
    fn identical_frames_are_skipped() {
        let mut presenter = FramePresenter::with_default();
        let lines = frame(&["┌─┐", "└─┘"]);
        let mut first = Vec::new();
        assert!(presenter.present(&mut first, &lines, Size::new(3, 2)).unwrap());
        let mut second = Vec::new();
        assert!(!presenter.present(&mut second, &lines, Size::new(3, 2)).unwrap());
        assert!(second.is_empty());

        presenter.invalidate();
        let mut third = Vec::new();
        assert!(presenter.present(&mut third, &lines, Size::new(3, 2)).unwrap());
    }

    #[test]
    fn long_lines_are_truncated_to_screen() {
        let mut output = Vec::new();
        let mut presenter = FramePresenter::with_default();
        presenter
            .present(&mut output, &frame(&["abcdef"]), Size::new(3, 1))
            .unwrap();
        let rendered = String::from_utf8(output).unwrap();
        assert!(rendered.ends_with("\u{1b}[1;1Habc"));
    }

    #[test]
    fn restore_cursor_is_applied() {
        let mut output = Vec::new();
        let mut presenter = FramePresenter::with_default();
        presenter.settings_mut().restore_cursor = Some((4, 2));
        presenter
            .present(&mut output, &frame(&["x"]), Size::new(1, 1))
            .unwrap();
        assert!(String::from_utf8(output).unwrap().ends_with("\u{1b}[5;3H"));
    }
}
