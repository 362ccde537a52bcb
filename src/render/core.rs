use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::{BoundingBox, Point3D, Size};
use crate::model::{Equipment, FloorSpatialData, Room};
use crate::projection::{CoordinateProjector, Projection};
use crate::symbols::SymbolRegistry;
use crate::width::{display_width, pad_to_width};

use super::canvas::{Canvas, GRID_DOT};

const GRID_SPACING: i64 = 5;
const MIN_LABEL_WIDTH: i64 = 5;
const MIN_LABEL_HEIGHT: i64 = 3;
const LEGEND_COLUMNS: usize = 4;
const LEGEND_CELL: usize = 16;

/// The only configuration the renderer recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Meters per cell.
    pub scale: f64,
    pub show_grid: bool,
    pub show_labels: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 0.5,
            show_grid: false,
            show_labels: true,
        }
    }
}

impl RenderOptions {
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_grid(mut self, enabled: bool) -> Self {
        self.show_grid = enabled;
        self
    }

    pub fn with_labels(mut self, enabled: bool) -> Self {
        self.show_labels = enabled;
        self
    }

    pub fn validate(&self) -> Result<()> {
        CoordinateProjector::new(self.scale).map(|_| ())
    }
}

/// Where an equipment item ended up relative to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Glyph stamped at this cell (it may still lose a collision later).
    Stamped { x: u16, y: u16 },
    /// Outside a viewport smaller than the floor.
    Clipped { x: i64, y: i64 },
    /// Projected outside the floor's canvas.
    OffCanvas { x: i64, y: i64 },
    /// No recorded position.
    Unplaced,
}

impl Placement {
    fn grid_text(&self) -> String {
        match self {
            Self::Stamped { x, y } => format!("({x},{y})"),
            Self::Clipped { x, y } | Self::OffCanvas { x, y } => format!("({x},{y})"),
            Self::Unplaced => "-".to_string(),
        }
    }

    fn state_text(&self) -> &'static str {
        match self {
            Self::Stamped { .. } => "shown",
            Self::Clipped { .. } => "clipped",
            Self::OffCanvas { .. } => "off-canvas",
            Self::Unplaced => "no position",
        }
    }
}

/// One row of the equipment listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedEquipment {
    pub id: String,
    pub kind: String,
    pub glyph: char,
    pub position: Option<Point3D>,
    pub placement: Placement,
}

/// Output of a floor render: canvas plus the text appended below it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFloor {
    pub title: String,
    pub canvas: Canvas,
    pub legend: Vec<String>,
    pub table: Vec<String>,
    pub placements: Vec<PlacedEquipment>,
    pub scale: f64,
}

impl RenderedFloor {
    pub fn canvas_lines(&self) -> Vec<String> {
        self.canvas.lines()
    }

    pub fn clipped_count(&self) -> usize {
        self.placements
            .iter()
            .filter(|item| matches!(item.placement, Placement::Clipped { .. }))
            .count()
    }

    pub fn lines(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(
            self.legend.len() + self.table.len() + usize::from(self.canvas.size().height) + 3,
        );
        out.push(self.title.clone());
        out.extend(self.canvas.lines());
        out.push(String::new());
        out.extend(self.legend.iter().cloned());
        out.push(String::new());
        out.extend(self.table.iter().cloned());
        out
    }
}

impl fmt::Display for RenderedFloor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

/// Paints a single floor's 2-D projection.
#[derive(Debug, Clone, Default)]
pub struct GridRenderer {
    symbols: SymbolRegistry,
}

impl GridRenderer {
    pub fn new(symbols: SymbolRegistry) -> Self {
        Self { symbols }
    }

    pub fn with_default() -> Self {
        Self::new(SymbolRegistry::new())
    }

    pub fn symbols(&self) -> &SymbolRegistry {
        &self.symbols
    }

    pub fn symbols_mut(&mut self) -> &mut SymbolRegistry {
        &mut self.symbols
    }

    pub fn render_to_string(
        &self,
        data: &FloorSpatialData,
        opts: &RenderOptions,
        viewport: Size,
    ) -> Result<String> {
        self.render(data, opts, viewport)
            .map(|rendered| rendered.to_string())
    }

    /// Render `data` into a canvas no larger than `viewport`.
    ///
    /// Only an invalid scale is an error; degenerate floor data always yields
    /// output.
    pub fn render(
        &self,
        data: &FloorSpatialData,
        opts: &RenderOptions,
        viewport: Size,
    ) -> Result<RenderedFloor> {
        let projector = CoordinateProjector::new(opts.scale)?;
        let bounds = data.bounds();
        let canvas_size = projector.canvas_size(bounds.as_ref(), viewport);
        let mut canvas = Canvas::new(canvas_size);

        match bounds.as_ref() {
            Some(bbox) if !data.floor.rooms.is_empty() => {
                for room in &data.floor.rooms {
                    draw_room(&mut canvas, &projector, bbox, room, opts.show_labels);
                }
            }
            _ => draw_outer_wall(&mut canvas),
        }

        if opts.show_grid {
            overlay_grid(&mut canvas);
        }

        let placements =
            self.stamp_equipment(&mut canvas, &projector, bounds.as_ref(), viewport, data);

        let title = format!(
            "{} [{} confidence]",
            data.floor.label(),
            data.floor.confidence.as_str()
        );

        Ok(RenderedFloor {
            title,
            legend: self.legend_lines(&projector, canvas_size, &placements),
            table: table_lines(&placements),
            canvas,
            placements,
            scale: projector.scale(),
        })
    }

    fn stamp_equipment(
        &self,
        canvas: &mut Canvas,
        projector: &CoordinateProjector,
        bounds: Option<&BoundingBox>,
        viewport: Size,
        data: &FloorSpatialData,
    ) -> Vec<PlacedEquipment> {
        let canvas_size = canvas.size();
        data.equipment
            .iter()
            .map(|item| {
                let glyph = self.symbols.resolve(&item.kind);
                let placement = match (item.position, bounds) {
                    (Some(pos), Some(bbox)) => {
                        let projection = projector.project(pos.planar(), bbox, viewport);
                        place(projector, bbox, pos, projection, canvas_size)
                    }
                    _ => Placement::Unplaced,
                };
                if let Placement::Stamped { x, y } = placement {
                    canvas.set(i64::from(x), i64::from(y), glyph);
                }
                placed(item, glyph, placement)
            })
            .collect()
    }

    fn legend_lines(
        &self,
        projector: &CoordinateProjector,
        canvas_size: Size,
        placements: &[PlacedEquipment],
    ) -> Vec<String> {
        let mut lines = vec!["Legend:".to_string()];
        let entries: Vec<String> = self
            .symbols
            .legend()
            .into_iter()
            .map(|(glyph, kind)| pad_to_width(&format!("{glyph} {kind}"), LEGEND_CELL))
            .collect();
        for chunk in entries.chunks(LEGEND_COLUMNS) {
            lines.push(format!("  {}", chunk.concat()).trim_end().to_string());
        }
        lines.push(
            "  Unmapped types use the upper-cased first letter of their type (empty type: ?)"
                .to_string(),
        );
        lines.push(format!(
            "Scale: 1 cell = {} m · canvas {}x{} cells",
            projector.scale(),
            canvas_size.width,
            canvas_size.height
        ));
        let clipped = placements
            .iter()
            .filter(|item| matches!(item.placement, Placement::Clipped { .. }))
            .count();
        if clipped > 0 {
            lines.push(format!(
                "{clipped} of {} equipment items clipped by the viewport",
                placements.len()
            ));
        }
        lines
    }
}

fn placed(item: &Equipment, glyph: char, placement: Placement) -> PlacedEquipment {
    PlacedEquipment {
        id: item.id.clone(),
        kind: item.kind.clone(),
        glyph,
        position: item.position,
        placement,
    }
}

/// Resolve a projection against the canvas, snapping points that sit exactly
/// on the floor's far edge into the last cell.
fn place(
    projector: &CoordinateProjector,
    bbox: &BoundingBox,
    pos: Point3D,
    projection: Projection,
    canvas: Size,
) -> Placement {
    if projection.clipped {
        return Placement::Clipped {
            x: projection.x,
            y: projection.y,
        };
    }

    let (natural_w, natural_h) = projector.natural_extent(bbox);
    let snapped = Projection {
        x: snap_edge(projection.x, natural_w, canvas.width, pos.x <= bbox.max.x),
        y: snap_edge(projection.y, natural_h, canvas.height, pos.y <= bbox.max.y),
        clipped: false,
    };

    match snapped.cell_within(canvas) {
        Some((x, y)) => Placement::Stamped { x, y },
        None => Placement::OffCanvas {
            x: projection.x,
            y: projection.y,
        },
    }
}

fn snap_edge(index: i64, natural: u64, canvas: u16, within_bounds: bool) -> i64 {
    let on_edge = natural > 0 && natural == u64::from(canvas) && index == natural as i64;
    if on_edge && within_bounds {
        index - 1
    } else {
        index
    }
}

fn draw_outer_wall(canvas: &mut Canvas) {
    let size = canvas.size();
    if size.is_empty() {
        return;
    }
    canvas.draw_box(
        0,
        0,
        i64::from(size.width) - 1,
        i64::from(size.height) - 1,
    );
}

fn draw_room(
    canvas: &mut Canvas,
    projector: &CoordinateProjector,
    bbox: &BoundingBox,
    room: &Room,
    show_labels: bool,
) {
    let extent = room.extent();
    let (x0, y0) = room_corner(canvas, projector, bbox, extent.min);
    let (x1, y1) = room_corner(canvas, projector, bbox, extent.max);
    canvas.draw_box(x0, y0, x1, y1);

    let width = x1.saturating_sub(x0).saturating_add(1);
    let height = y1.saturating_sub(y0).saturating_add(1);
    if show_labels && width >= MIN_LABEL_WIDTH && height >= MIN_LABEL_HEIGHT {
        canvas.write_centered(
            x0.saturating_add(1),
            x1.saturating_sub(1),
            y0.saturating_add(height / 2),
            room.display_name(),
        );
    }
}

/// Cell for a room corner. Corners on the floor's far edge land in the last
/// cell, the same as equipment placed there.
fn room_corner(
    canvas: &Canvas,
    projector: &CoordinateProjector,
    bbox: &BoundingBox,
    corner: Point3D,
) -> (i64, i64) {
    let (x, y) = projector.cell(corner.planar(), bbox);
    let (natural_w, natural_h) = projector.natural_extent(bbox);
    let size = canvas.size();
    (
        snap_edge(x, natural_w, size.width, corner.x <= bbox.max.x),
        snap_edge(y, natural_h, size.height, corner.y <= bbox.max.y),
    )
}

fn overlay_grid(canvas: &mut Canvas) {
    let size = canvas.size();
    for y in 0..i64::from(size.height) {
        for x in 0..i64::from(size.width) {
            let on_line = x % GRID_SPACING == 0 || y % GRID_SPACING == 0;
            if on_line && canvas.is_blank(x, y) {
                canvas.set(x, y, GRID_DOT);
            }
        }
    }
}

fn format_position(position: Option<Point3D>) -> String {
    match position {
        Some(pos) => format!("({:.2}, {:.2}, {:.2})", pos.x, pos.y, pos.z),
        None => "-".to_string(),
    }
}

fn table_lines(placements: &[PlacedEquipment]) -> Vec<String> {
    let header = ["ID", "SYM", "TYPE", "POSITION (m)", "GRID", "STATE"];
    let rows: Vec<[String; 6]> = placements
        .iter()
        .map(|item| {
            [
                item.id.clone(),
                item.glyph.to_string(),
                item.kind.clone(),
                format_position(item.position),
                item.placement.grid_text(),
                item.placement.state_text().to_string(),
            ]
        })
        .collect();

    let mut widths = header.map(display_width);
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }

    let format_row = |cells: [&str; 6]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| pad_to_width(cell, *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format!("Equipment ({})", placements.len()), format_row(header)];
    lines.push(
        widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in &rows {
        lines.push(format_row([
            row[0].as_str(),
            row[1].as_str(),
            row[2].as_str(),
            row[3].as_str(),
            row[4].as_str(),
            row[5].as_str(),
        ]));
    }
    lines
}
