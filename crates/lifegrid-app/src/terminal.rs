//! Crossterm-based frame renderer for board animations.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use lifegrid_core::{Board, Generation, Grid};
use supports_color::{Stream, on_cached};
use tracing::info;

const HEADLESS_ENV: &str = "LIFEGRID_HEADLESS";

/// Animate `frames` generations of `board` at `fps` frames per second.
///
/// Draws to an alternate screen and restores the terminal on the way out.
/// When `LIFEGRID_HEADLESS` is set, steps the board without drawing and logs
/// the final summary instead.
pub fn animate(board: &mut Board, frames: u32, fps: f64) -> Result<()> {
    if std::env::var_os(HEADLESS_ENV).is_some() {
        return run_headless(board, frames);
    }

    let colored = on_cached(Stream::Stdout).is_some();
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)
        .context("failed to enter alternate screen")?;

    let result = run_animation(&mut stdout, board, frames, fps, colored);

    if let Err(err) = execute!(stdout, cursor::Show, LeaveAlternateScreen) {
        tracing::error!(?err, "failed to restore terminal");
    }
    result
}

fn run_headless(board: &mut Board, frames: u32) -> Result<()> {
    for _ in 0..frames {
        board.step().context("failed to step board")?;
    }
    if let Some(summary) = board.history().last() {
        info!(
            generation = summary.generation.0,
            population = summary.population,
            "headless run completed",
        );
    }
    Ok(())
}

fn run_animation(
    stdout: &mut Stdout,
    board: &mut Board,
    frames: u32,
    fps: f64,
    colored: bool,
) -> Result<()> {
    let delay = Duration::from_secs_f64(1.0 / fps);

    // Show the initial configuration before the first transition.
    draw_frame(stdout, board.state()?, board.generation(), colored)?;
    std::thread::sleep(delay);

    for _ in 0..frames {
        board.step()?;
        draw_frame(stdout, board.state()?, board.generation(), colored)?;
        std::thread::sleep(delay);
    }
    Ok(())
}

fn draw_frame(
    stdout: &mut Stdout,
    grid: &Grid,
    generation: Generation,
    colored: bool,
) -> Result<()> {
    queue!(stdout, cursor::MoveTo(0, 0), Clear(ClearType::All))?;
    for row in grid.rows() {
        for &alive in row {
            match (alive, colored) {
                (true, true) => {
                    queue!(stdout, SetForegroundColor(Color::Green), Print('█'), ResetColor)?;
                }
                (false, true) => {
                    queue!(
                        stdout,
                        SetForegroundColor(Color::DarkGrey),
                        Print('·'),
                        ResetColor
                    )?;
                }
                (true, false) => queue!(stdout, Print('#'))?,
                (false, false) => queue!(stdout, Print('.'))?,
            }
        }
        queue!(stdout, Print("\r\n"))?;
    }
    queue!(
        stdout,
        Print(format!(
            "generation {generation}  population {}\r\n",
            grid.count_alive()
        ))
    )?;
    stdout.flush().context("failed to flush frame")?;
    Ok(())
}
