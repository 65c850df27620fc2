use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// A grid that materializes only the rows inside the viewport.
///
/// The caller supplies a cell renderer that is invoked exclusively for
/// visible indices, so large sections cost no more to draw than what
/// fits on screen.
#[derive(Debug)]
pub struct VirtualizedGrid {
  columns: usize,
  scroll_row: usize,
  selected: usize,
}

impl VirtualizedGrid {
  pub fn new(columns: usize) -> Self {
    Self {
      columns: columns.max(1),
      scroll_row: 0,
      selected: 0,
    }
  }

  pub fn selected(&self) -> usize {
    self.selected
  }

  pub fn reset(&mut self) {
    self.scroll_row = 0;
    self.selected = 0;
  }

  /// Move the selection by whole cells horizontally and by rows
  /// vertically, clamped to `total` items.
  pub fn move_selection(&mut self, dx: i32, dy: i32, total: usize) {
    if total == 0 {
      self.selected = 0;
      return;
    }
    let step = dx + dy * self.columns as i32;
    let next = self.selected as i32 + step;
    self.selected = next.clamp(0, total as i32 - 1) as usize;
  }

  /// The half-open cell index range visible in a viewport of
  /// `rows_visible` rows, after scrolling the selection into view.
  pub fn visible_range(&mut self, total: usize, rows_visible: usize) -> std::ops::Range<usize> {
    if total == 0 || rows_visible == 0 {
      return 0..0;
    }
    self.selected = self.selected.min(total - 1);

    let selected_row = self.selected / self.columns;
    if selected_row < self.scroll_row {
      self.scroll_row = selected_row;
    } else if selected_row >= self.scroll_row + rows_visible {
      self.scroll_row = selected_row + 1 - rows_visible;
    }

    let start = self.scroll_row * self.columns;
    let end = ((self.scroll_row + rows_visible) * self.columns).min(total);
    start..end
  }

  /// Render the visible window. `cell` is called once per visible index
  /// and returns the cell's label.
  pub fn render(
    &mut self,
    frame: &mut Frame,
    area: Rect,
    total: usize,
    title: &str,
    cell: &dyn Fn(usize) -> String,
  ) {
    let block = Block::default()
      .title(title.to_string())
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if total == 0 || inner.height == 0 || inner.width == 0 {
      return;
    }

    let range = self.visible_range(total, inner.height as usize);
    let cell_width = (inner.width as usize / self.columns).max(8);

    let mut lines: Vec<Line> = Vec::new();
    let mut row: Vec<Span> = Vec::new();
    for idx in range {
      let label = format!(
        "{:<width$}",
        super::super::truncate(&cell(idx), cell_width.saturating_sub(1)),
        width = cell_width
      );
      if idx == self.selected {
        row.push(Span::styled(
          label,
          Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
        ));
      } else {
        row.push(Span::raw(label));
      }
      if row.len() == self.columns {
        lines.push(Line::from(std::mem::take(&mut row)));
      }
    }
    if !row.is_empty() {
      lines.push(Line::from(row));
    }

    frame.render_widget(Paragraph::new(lines), inner);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_visible_range_covers_viewport_only() {
    let mut grid = VirtualizedGrid::new(3);
    // 30 cells, 4 visible rows of 3 = 12 visible cells.
    assert_eq!(grid.visible_range(30, 4), 0..12);
  }

  #[test]
  fn test_selection_scrolls_window_down_and_up() {
    let mut grid = VirtualizedGrid::new(3);

    // Jump to cell 20 (row 6); window of 4 rows must include it.
    for _ in 0..7 {
      grid.move_selection(0, 1, 30);
    }
    assert_eq!(grid.selected(), 21);
    let range = grid.visible_range(30, 4);
    assert!(range.contains(&21), "{range:?}");

    // Back to the top.
    for _ in 0..7 {
      grid.move_selection(0, -1, 30);
    }
    assert_eq!(grid.visible_range(30, 4), 0..12);
  }

  #[test]
  fn test_move_selection_clamps_at_edges() {
    let mut grid = VirtualizedGrid::new(3);
    grid.move_selection(-1, 0, 10);
    assert_eq!(grid.selected(), 0);

    grid.move_selection(0, 1, 10);
    grid.move_selection(0, 1, 10);
    grid.move_selection(0, 1, 10);
    assert_eq!(grid.selected(), 9);
    grid.move_selection(1, 0, 10);
    assert_eq!(grid.selected(), 9);
  }

  #[test]
  fn test_last_partial_row_is_clamped() {
    let mut grid = VirtualizedGrid::new(4);
    // 10 cells in rows of 4: last row has 2 cells.
    for _ in 0..3 {
      grid.move_selection(0, 1, 10);
    }
    assert_eq!(grid.selected(), 9);
    let range = grid.visible_range(10, 2);
    assert_eq!(range.end, 10);
  }

  #[test]
  fn test_empty_grid_yields_empty_range() {
    let mut grid = VirtualizedGrid::new(3);
    assert_eq!(grid.visible_range(0, 5), 0..0);
  }
}
