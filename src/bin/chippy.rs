use std::{
    fs::File,
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use clap_num::maybe_hex;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use chippy::{Config, Emulator, Quirks, u4};

/// The hex keypad as laid out on the COSMAC VIP, paired with the keyboard
/// key in the same position of the 1234/QWER/ASDF/ZXCV block.
const KEYPAD_ROWS: [[(u8, char); 4]; 4] = [
    [(0x1, '1'), (0x2, '2'), (0x3, '3'), (0xC, '4')],
    [(0x4, 'q'), (0x5, 'w'), (0x6, 'e'), (0xD, 'r')],
    [(0x7, 'a'), (0x8, 's'), (0x9, 'd'), (0xE, 'f')],
    [(0xA, 'z'), (0x0, 'x'), (0xB, 'c'), (0xF, 'v')],
];

fn keypad_key(code: KeyCode) -> Option<u4> {
    let KeyCode::Char(ch) = code else {
        return None;
    };
    let ch = ch.to_ascii_lowercase();

    KEYPAD_ROWS
        .iter()
        .flatten()
        .find(|(_, key)| *key == ch)
        .map(|&(hex, _)| u4::new(hex))
}

// Most terminals never report key releases, so a key counts as released
// once it has not been repeated for this long.
const KEY_RELEASE_TIMEOUT: Duration = Duration::from_millis(100);

// Upper bound on how long one loop iteration waits for input.
const INPUT_POLL: Duration = Duration::from_micros(200);

const SIDE_PANEL_WIDTH: u16 = 17;

struct App {
    emulator: Emulator,
    /// Last frame handed over by the emulator, one Vec per row.
    frame: Vec<Vec<bool>>,
    status: String,
    redraw: bool,
    should_quit: bool,
    last_tick: Instant,
    key_press_times: [Option<Instant>; 16],
}

impl App {
    fn new(emulator: Emulator) -> Self {
        let frame = emulator
            .display()
            .rows()
            .map(|row| row.to_vec())
            .collect();

        Self {
            emulator,
            frame,
            status: "Running".to_string(),
            redraw: true,
            should_quit: false,
            last_tick: Instant::now(),
            key_press_times: [None; 16],
        }
    }

    fn run(&mut self, terminal: &mut DefaultTerminal) -> anyhow::Result<()> {
        while !self.should_quit {
            let now = Instant::now();
            let dt = now - self.last_tick;
            self.last_tick = now;

            let report = self.emulator.update(dt);
            if let Some(fault) = report.fault {
                self.status = fault.to_string();
                self.redraw = true;
            }

            if let Some(display) = self.emulator.take_frame() {
                self.frame = display.rows().map(|row| row.to_vec()).collect();
                self.redraw = true;
            }

            if std::mem::take(&mut self.redraw) {
                terminal
                    .draw(|frame| self.draw(frame))
                    .context("Failed to draw terminal frame")?;
            }

            self.check_key_timeout();

            if event::poll(INPUT_POLL).context("Failed to poll terminal events")? {
                if let Event::Key(key) = event::read().context("Failed to read terminal event")? {
                    self.handle_key_event(key);
                }
            }
        }

        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }

    fn check_key_timeout(&mut self) {
        let now = Instant::now();

        for (idx, press_time) in self.key_press_times.iter_mut().enumerate() {
            if let Some(time) = press_time
                && now.duration_since(*time) > KEY_RELEASE_TIMEOUT
            {
                *press_time = None;
                self.emulator.set_key(u4::new(idx as u8), false);
                self.redraw = true;
            }
        }
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc
            || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
        {
            self.should_quit = true;
            return;
        }

        let Some(hex) = keypad_key(key.code) else {
            return;
        };
        let slot = &mut self.key_press_times[usize::from(hex)];

        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                *slot = Some(Instant::now());
                self.emulator.set_key(hex, true);
            }
            KeyEventKind::Release => {
                *slot = None;
                self.emulator.set_key(hex, false);
            }
        }
        self.redraw = true;
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let display = self.emulator.display();
        let display_width = display.width() as u16 + 2;
        let display_height = display.height() as u16 + 2;

        let min_width = display_width + SIDE_PANEL_WIDTH;
        let min_height = display_height + 3;
        if area.width < min_width || area.height < min_height {
            Paragraph::new(format!(
                "Terminal is too small ({}x{} min)",
                min_width, min_height
            ))
            .style(Style::default().fg(Color::Red))
            .alignment(Alignment::Center)
            .block(Block::bordered())
            .render(area, buf);

            return;
        }

        let [left, right] = Layout::horizontal([
            Constraint::Length(display_width),
            Constraint::Length(SIDE_PANEL_WIDTH),
        ])
        .areas(area);

        let [screen, status] =
            Layout::vertical([Constraint::Length(display_height), Constraint::Length(3)])
                .areas(left);

        let [registers, keypad, stack] = Layout::vertical([
            Constraint::Length(11 + 2),
            Constraint::Length(4 + 2),
            Constraint::Min(1 + 2),
        ])
        .areas(right);

        self.render_screen(screen, buf);
        self.render_status(status, buf);
        self.render_registers(registers, buf);
        self.render_keypad(keypad, buf);
        self.render_stack(stack, buf);
    }
}

impl App {
    fn render_screen(&self, area: Rect, buf: &mut Buffer) {
        let text: Vec<Line> = self
            .frame
            .iter()
            .map(|row| {
                row.iter()
                    .map(|pixel| Span::styled(if *pixel { "█" } else { " " }, Style::default().green()))
                    .collect()
            })
            .collect();

        Paragraph::new(text)
            .block(Block::bordered().title(" chippy "))
            .render(area, buf);
    }

    fn render_status(&self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.status.as_str())
            .block(Block::bordered().title(" Status "))
            .render(area, buf);
    }

    fn render_registers(&self, area: Rect, buf: &mut Buffer) {
        let cpu = self.emulator.cpu();
        let registers = cpu.registers();

        let mut lines = vec![
            Line::from(format!("PC: {:03X}  I: {:03X}", registers.pc, registers.i)),
            Line::from(format!(
                "DT: {:02X}   ST: {:02X}",
                cpu.delay_timer().value(),
                cpu.sound_timer()
            )),
            Line::from(""),
        ];

        for idx in 0..8 {
            lines.push(Line::from(format!(
                "V{:X}: {:02X}   V{:X}: {:02X}",
                idx,
                registers.v[idx],
                idx + 8,
                registers.v[idx + 8]
            )));
        }

        Paragraph::new(lines)
            .block(Block::bordered().title(" Registers "))
            .render(area, buf);
    }

    fn render_keypad(&self, area: Rect, buf: &mut Buffer) {
        let keys = self.emulator.keys().as_array();

        let lines: Vec<Line> = KEYPAD_ROWS
            .iter()
            .map(|row| {
                let cells = row.iter().map(|&(hex, _)| {
                    let style = if keys[usize::from(hex)] {
                        Style::default().fg(Color::Black).bg(Color::Green)
                    } else {
                        Style::default()
                    };
                    Span::styled(format!(" {hex:X} "), style)
                });
                Line::from_iter(cells)
            })
            .collect();

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::bordered().title(" Keypad "))
            .render(area, buf);
    }

    /// Innermost return address on top. The title tracks how far the
    /// growable stack has been extended.
    fn render_stack(&self, area: Rect, buf: &mut Buffer) {
        let stack = self.emulator.cpu().stack();
        let rows = usize::from(area.height.saturating_sub(2)).max(1);

        let mut lines: Vec<Line> = stack
            .as_slice()
            .iter()
            .rev()
            .take(rows)
            .map(|addr| Line::from(format!("{addr:03X}")))
            .collect();

        let hidden = stack.len().saturating_sub(rows);
        if hidden > 0 {
            lines.pop();
            lines.push(Line::styled(
                format!("+{} more", hidden + 1),
                Style::default().dim(),
            ));
        }

        let title = format!(" Stack {}/{} ", stack.len(), stack.capacity());
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(Block::bordered().title(title))
            .render(area, buf);
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum QuirksPreset {
    /// Original COSMAC VIP behavior
    CosmacVip,
    /// CHIP-48 / SUPER-CHIP era behavior
    Modern,
}

impl From<QuirksPreset> for Quirks {
    fn from(preset: QuirksPreset) -> Self {
        match preset {
            QuirksPreset::CosmacVip => Quirks::cosmac_vip(),
            QuirksPreset::Modern => Quirks::modern(),
        }
    }
}

/// CHIP-8 emulator in the terminal.
///
/// Keys 1-4, Q-R, A-F, Z-V map to the CHIP-8 hex keypad.
/// Escape or Ctrl+C exits.
#[derive(Parser, Debug)]
#[command(about)]
struct Args {
    /// Path to the CHIP-8 program file
    program_path: PathBuf,

    /// Path to a font image, defaults to the built-in hex font
    #[arg(long)]
    font: Option<PathBuf>,

    /// Compatibility preset for ambiguous opcodes
    #[arg(long, value_enum, default_value_t = QuirksPreset::CosmacVip)]
    quirks: QuirksPreset,

    /// Instructions executed per second
    #[arg(long, default_value_t = 700)]
    cpu_hz: u32,

    /// Address the program is loaded at and started from
    #[arg(long, value_parser = maybe_hex::<u16>, default_value = "0x200")]
    program_address: u16,

    /// Address the font is loaded at
    #[arg(long, value_parser = maybe_hex::<u16>, default_value = "0x50")]
    font_address: u16,

    /// Seed for the random number instruction
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file instead of stderr (filter with RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config::chip8().with_quirks(self.quirks.into());
        config.cpu.instruction_frequency = self.cpu_hz;
        config.cpu.seed = self.seed;
        config.memory.program_address = self.program_address;
        config.memory.font_address = self.font_address;
        config
    }
}

fn init_logging(log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::from_default_env();

    if let Some(path) = log_file {
        let file = File::create(path).context("Failed to create log file")?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.try_init().context("Failed to initialize logger")
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    let emulator = Emulator::from_files(args.config(), args.font.as_deref(), &args.program_path)
        .context("Failed to initialize emulator")?;
    let mut app = App::new(emulator);

    let mut terminal = ratatui::init();
    let app_result = app.run(&mut terminal);
    ratatui::restore();

    app_result
}
