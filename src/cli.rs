use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Interactive 3D car showroom viewer", version)]
pub struct Args {
    /// Show manifest JSON describing the model, font, textures, and
    /// material assignments
    #[arg(long, default_value = "assets/showroom.json")]
    pub show: PathBuf,

    /// Window size as WIDTHxHEIGHT
    #[arg(long, default_value = "1280x720", value_parser = parse_window_size)]
    pub window_size: WindowSize,

    /// Load and validate the show's assets, print a summary, and exit
    /// without creating a window; useful for headless automation
    #[arg(long)]
    pub headless: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

fn parse_window_size(value: &str) -> Result<WindowSize, String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in '{value}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in '{value}'"))?;
    if width == 0 || height == 0 {
        return Err(format!("window size must be non-zero, got '{value}'"));
    }
    Ok(WindowSize { width, height })
}
