//! Retro marquee ASCII banner with gradient (FILMLENS).
//! Uses the standard figlet font bundled with figlet-rs.

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Marquee Gold (#f5c518).
const MARQUEE_GOLD: (u8, u8, u8) = (0xf5, 0xc5, 0x18);
/// Curtain Red (#c0392b).
const CURTAIN_RED: (u8, u8, u8) = (0xc0, 0x39, 0x2b);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// Prints the welcome banner: "FILMLENS" in figlet ASCII with a gradient from
/// Marquee Gold to Curtain Red, then the version line.
pub fn print_welcome() {
    let mut out = stdout();
    let font = FIGfont::standard().expect("figlet standard font");
    let figure = font.convert("FILMLENS").expect("figlet convert FILMLENS");
    let art = figure.to_string();
    let lines: Vec<&str> = art.lines().collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(MARQUEE_GOLD, CURTAIN_RED, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: MARQUEE_GOLD.0,
        g: MARQUEE_GOLD.1,
        b: MARQUEE_GOLD.2,
    }));
    let _ = out.execute(Print(format!("v{}\r\n", version)));
    let _ = out.execute(Print("Film success analysis, end to end\r\n"));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}
