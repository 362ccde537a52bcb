//! Full-screen frame text for the current navigation state.

use crate::geometry::Size;
use crate::model::Equipment;
use crate::navigation::{NavLevel, NavigationController};
use crate::render::{GridRenderer, RenderOptions};

const CURSOR_MARK: &str = "> ";
const ITEM_INDENT: &str = "  ";
const KEY_HINTS: &str =
    "↑/↓ move · enter open · ← back · home · r refresh · +/- zoom · g grid · t labels · q quit";

/// Header, status line, item list (or equipment details) and, below a
/// floor, that floor's canvas sized to the rows that remain.
pub fn compose_frame(
    controller: &NavigationController,
    renderer: &GridRenderer,
    opts: &RenderOptions,
    screen: Size,
    list_rows: u16,
) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} [{}]",
            controller.breadcrumb_path(),
            controller.level().as_str()
        ),
        status_line(controller),
        String::new(),
    ];

    match controller.level() {
        NavLevel::Equipment => lines.extend(equipment_lines(controller.current_equipment())),
        _ => lines.extend(item_lines(controller, usize::from(list_rows.max(1)))),
    }

    if let Some(data) = controller.floor_data() {
        lines.push(String::new());
        // One row for the floor title above the canvas.
        let used = lines.len() as u16 + 1;
        let viewport = Size::new(screen.width, screen.height.saturating_sub(used));
        if !viewport.is_empty() {
            match renderer.render(&data, opts, viewport) {
                Ok(rendered) => lines.extend(rendered.lines()),
                Err(err) => lines.push(format!("! {err}")),
            }
        }
    }

    lines
}

fn status_line(controller: &NavigationController) -> String {
    if let Some(err) = controller.last_error() {
        return format!("! {err}");
    }
    if controller.pending().is_some() {
        return "loading…".to_string();
    }
    KEY_HINTS.to_string()
}

fn item_lines(controller: &NavigationController, rows: usize) -> Vec<String> {
    let items = controller.items();
    if items.is_empty() {
        let note = if controller.pending().is_some() {
            "(loading)"
        } else {
            "(no items)"
        };
        return vec![format!("{ITEM_INDENT}{note}")];
    }

    let cursor = controller.cursor();
    let start = (cursor + 1).saturating_sub(rows);
    let end = (start + rows).min(items.len());
    let mut lines: Vec<String> = items[start..end]
        .iter()
        .enumerate()
        .map(|(offset, item)| {
            let mark = if start + offset == cursor {
                CURSOR_MARK
            } else {
                ITEM_INDENT
            };
            format!("{mark}{}", item.label)
        })
        .collect();
    if items.len() > rows {
        lines.push(format!(
            "{ITEM_INDENT}{}-{} of {}",
            start + 1,
            end,
            items.len()
        ));
    }
    lines
}

fn equipment_lines(item: Option<&Equipment>) -> Vec<String> {
    let Some(item) = item else {
        return vec![format!("{ITEM_INDENT}(equipment not loaded)")];
    };
    let position = item
        .position
        .map(|pos| format!("({:.2}, {:.2}, {:.2})", pos.x, pos.y, pos.z))
        .unwrap_or_else(|| "-".to_string());
    let source = if item.position_source.is_empty() {
        String::new()
    } else {
        format!(" ({})", item.position_source)
    };
    vec![
        format!("{ITEM_INDENT}id         {}", item.id),
        format!("{ITEM_INDENT}name       {}", item.name),
        format!("{ITEM_INDENT}type       {}", item.kind),
        format!("{ITEM_INDENT}status     {}", item.status),
        format!("{ITEM_INDENT}position   {position}"),
        format!("{ITEM_INDENT}confidence {}{source}", item.confidence.as_str()),
        format!(
            "{ITEM_INDENT}room       {}",
            item.room_id.as_deref().unwrap_or("-")
        ),
    ]
}
