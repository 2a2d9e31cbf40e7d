use crate::app::App;
use crate::braille;
use crate::motion;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::time::Instant;

const SIDEBAR_WIDTH: u16 = 24;

/// Max scroll for help content (generous to account for text wrapping on small screens)
pub const HELP_CONTENT_LINES: u16 = 40;

// UI color scheme
const BORDER_COLOR: Color = Color::Cyan;
const FLASH_COLOR: Color = Color::White;
const HIGHLIGHT_COLOR: Color = Color::Yellow;
const TEXT_COLOR: Color = Color::White;
const DIM_TEXT_COLOR: Color = Color::Gray;

/// Creates a standard styled block with rounded borders
fn styled_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .title(title)
}

/// Main render function
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if app.fullscreen_mode {
        render_canvas(frame, area, app);
    } else {
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(area);

        render_sidebar(frame, layout[0], app);
        render_canvas(frame, layout[1], app);
    }

    if app.show_help {
        render_help_overlay(frame, area, app);
    }
}

/// Calculate the canvas size (excluding borders)
pub fn get_canvas_size(frame_area: Rect, fullscreen: bool) -> (u16, u16) {
    if fullscreen {
        (frame_area.width.saturating_sub(2), frame_area.height.saturating_sub(2))
    } else {
        let canvas_width = frame_area.width.saturating_sub(SIDEBAR_WIDTH + 2);
        let canvas_height = frame_area.height.saturating_sub(2);
        (canvas_width, canvas_height)
    }
}

fn render_sidebar(frame: &mut Frame, area: Rect, app: &App) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(11), // Status
            Constraint::Min(6),     // Controls
        ])
        .split(area);

    render_status_box(frame, sections[0], app);
    render_controls_box(frame, sections[1], app);
}

fn render_status_box(frame: &mut Frame, area: Rect, app: &App) {
    let block = styled_block(" Snow Globe ");

    let speed = app.globe.speed();
    let accel = app.host.tilt.sample();
    let geometry = app.geometry();
    let stats = app.globe.stats();
    let walk = app.last_report.walk;

    let (state_text, state_color) = if app.paused {
        ("PAUSED", HIGHLIGHT_COLOR)
    } else if app.globe.is_shake_pending() {
        ("SHAKING", FLASH_COLOR)
    } else {
        ("FALLING", BORDER_COLOR)
    };

    let make_line = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<8}", label), Style::default().fg(DIM_TEXT_COLOR)),
            Span::styled(value, Style::default().fg(TEXT_COLOR)),
        ])
    };

    let mut content = vec![
        make_line("Flakes", format!("{}", app.globe.particles().len())),
        make_line("Canvas", format!("{}x{}", geometry.width, geometry.height)),
        make_line("Tilt", format!("{}, {}", accel.x, accel.y)),
        make_line("Speed", format!("{}/{}", speed.numerator, speed.denominator)),
        make_line("Walk", format!("{}/{}", walk.moved, motion::walk_span(accel, speed))),
        make_line("Settles", format!("{}", stats.settle_passes)),
        make_line("Shakes", format!("{}", stats.shakes)),
        Line::from(Span::styled(state_text, Style::default().fg(state_color))),
    ];
    if let Some(status) = &app.status {
        content.push(Line::from(Span::styled(
            status.clone(),
            Style::default().fg(DIM_TEXT_COLOR),
        )));
    }

    let paragraph = Paragraph::new(content).block(block);
    frame.render_widget(paragraph, area);
}

fn render_controls_box(frame: &mut Frame, area: Rect, app: &App) {
    let key_style = Style::default().fg(HIGHLIGHT_COLOR);
    let desc_style = Style::default().fg(DIM_TEXT_COLOR);

    // Helper to create a control line
    let make_control = |key: &str, desc: String| -> Line<'_> {
        Line::from(vec![
            Span::styled(format!("{:>5}", key), key_style),
            Span::styled(format!(" {}", desc), desc_style),
        ])
    };

    let content = vec![
        make_control("←→↑↓", format!("tilt ±{}", app.config.tilt_step)),
        make_control("0", "level".to_string()),
        make_control("Space", "shake".to_string()),
        make_control("P", if app.paused { "resume" } else { "pause" }.to_string()),
        make_control("S", "snapshot".to_string()),
        make_control("+/-", "speed".to_string()),
        make_control("[/]", "flakes".to_string()),
        make_control("C", format!("clock: {}", app.config.settings.clock_format.name())),
        make_control("V", "fullscreen".to_string()),
        make_control("H", "help".to_string()),
        make_control("Q", "quit".to_string()),
    ];

    let paragraph = Paragraph::new(content).block(styled_block(" Controls "));
    frame.render_widget(paragraph, area);
}

fn render_canvas(frame: &mut Frame, area: Rect, app: &App) {
    let border_color = if app.is_flashing(Instant::now()) {
        FLASH_COLOR
    } else {
        BORDER_COLOR
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cells = braille::render_bitmap_to_braille(&app.bitmap, inner.width, inner.height);
    let buffer = frame.buffer_mut();
    for cell in cells {
        let x = inner.x + cell.x;
        let y = inner.y + cell.y;
        if let Some(target) = buffer.cell_mut((x, y)) {
            target.set_char(cell.char).set_fg(TEXT_COLOR);
        }
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect, app: &App) {
    // Calculate the canvas area (exclude sidebar unless fullscreen)
    let canvas_x = if app.fullscreen_mode { 0 } else { SIDEBAR_WIDTH };
    let canvas_width = if app.fullscreen_mode {
        area.width
    } else {
        area.width.saturating_sub(SIDEBAR_WIDTH)
    };

    // Center the help dialog within the canvas
    let help_width = 56.min(canvas_width.saturating_sub(4));
    let help_height = area.height.saturating_sub(4).min(30);
    let x = canvas_x + (canvas_width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = Rect {
        x: area.x + x,
        y: area.y + y,
        width: help_width,
        height: help_height,
    };

    // Clear the background
    frame.render_widget(Clear, help_area);

    let settings = &app.config.settings;
    let content = vec![
        Line::from(""),
        Line::from(Span::styled("SNOW GLOBE", Style::default().fg(BORDER_COLOR))),
        Line::from(""),
        Line::from("Flakes drift with the tilt and pile up on each other and on the clock. Each flake only moves into an empty pixel."),
        Line::from(""),
        Line::from(Span::styled("TILT (arrows, 0 = level):", Style::default().fg(HIGHLIGHT_COLOR))),
        Line::from("Snow drifts the way the arrows point. Stronger tilt moves more flakes per frame. Level (0), the snow stays completely still until you tilt or shake."),
        Line::from(""),
        Line::from(Span::styled("SHAKE (Space/T):", Style::default().fg(HIGHLIGHT_COLOR))),
        Line::from("Throws the flakes around and redraws the clock at once."),
        Line::from(""),
        Line::from(Span::styled("CLOCK:", Style::default().fg(HIGHLIGHT_COLOR))),
        Line::from(format!(
            "Redrawn every {}s ({}); flakes resting on it are shaken loose.",
            settings.settle_interval_secs,
            settings.clock_format.name()
        )),
        Line::from(""),
        Line::from(Span::styled("BASIC CONTROLS:", Style::default().fg(HIGHLIGHT_COLOR))),
        Line::from("P=Pause, S=Snapshot (PNG), +/-=Speed, [/]=Flakes, C=12h/24h, V=Fullscreen, Q=Quit"),
        Line::from(""),
    ];

    let content_height = content.len() as u16;
    let visible_height = help_height.saturating_sub(2); // minus borders
    let max_scroll = content_height.saturating_sub(visible_height);
    let is_scrollable = max_scroll > 0;

    // Update title to show scroll hint if scrollable
    let title = if is_scrollable {
        " Help (J/K scroll, H to close) "
    } else {
        " Help (H to close) "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(HIGHLIGHT_COLOR))
        .title(title);

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.help_scroll, 0));

    frame.render_widget(paragraph, help_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use ratatui::{backend::TestBackend, Terminal};

    fn app(fullscreen: bool) -> App {
        let config = AppConfig {
            seed: Some(3),
            ..AppConfig::default()
        };
        let area = Rect::new(0, 0, 80, 30);
        let (w, h) = get_canvas_size(area, fullscreen);
        let mut app = App::new(config, w, h).unwrap();
        app.fullscreen_mode = fullscreen;
        app
    }

    #[test]
    fn test_canvas_size_excludes_sidebar_and_borders() {
        let area = Rect::new(0, 0, 80, 30);
        assert_eq!(get_canvas_size(area, true), (78, 28));
        assert_eq!(get_canvas_size(area, false), (80 - SIDEBAR_WIDTH - 2, 28));
        assert_eq!(get_canvas_size(Rect::new(0, 0, 5, 1), false), (0, 0));
    }

    #[test]
    fn test_render_draws_snow() {
        let mut app = app(true);
        app.tick(Instant::now());

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let buffer = terminal.backend().buffer();
        let braille_cells = buffer
            .content()
            .iter()
            .filter(|cell| cell.symbol().chars().any(|c| ('\u{2801}'..='\u{28FF}').contains(&c)))
            .count();
        assert!(braille_cells > 0);
    }

    #[test]
    fn test_render_with_sidebar_and_help() {
        let mut app = app(false);
        app.tick(Instant::now());
        app.toggle_help();

        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("Snow Globe"));
        assert!(text.contains("SNOW GLOBE"));
    }

    #[test]
    fn test_help_says_level_snow_is_still() {
        let mut app = app(false);
        app.tick(Instant::now());
        app.toggle_help();

        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(text.contains("completely still"));
        assert!(!text.contains("barely"));
    }
}
