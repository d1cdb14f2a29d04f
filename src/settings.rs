// ============================================================================
// SURFACE SETTINGS — `key = value` text file in the app data directory
// ============================================================================

use std::path::{Path, PathBuf};

use crate::canvas::Color;
use crate::components::history::DEFAULT_HISTORY_CAP;
use crate::components::tools::{DEFAULT_BRUSH_SIZE, clamp_brush_size};
use crate::{log_info, log_warn};

#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceSettings {
    /// Maximum number of undo snapshots (at least 1).
    pub max_undo_steps: usize,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub brush_size: f32,
    pub color: Color,
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            max_undo_steps: DEFAULT_HISTORY_CAP,
            canvas_width: 800,
            canvas_height: 600,
            brush_size: DEFAULT_BRUSH_SIZE,
            color: Color::BLACK,
        }
    }
}

impl SurfaceSettings {
    /// `<data_dir>/RasterPad/settings.cfg`
    pub fn settings_path() -> PathBuf {
        crate::logger::app_data_dir().join("settings.cfg")
    }

    /// Load from the default location, or defaults when absent.
    pub fn load() -> Self {
        Self::load_from(&Self::settings_path())
    }

    /// Load from `path`. A missing or unreadable file yields defaults.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                log_info!("Loaded settings from {}", path.display());
                Self::parse(&content)
            }
            Err(_) => Self::default(),
        }
    }

    /// Parse `key = value` lines. Blank lines and `#` comments are skipped,
    /// unknown keys ignored, bad values keep their default.
    pub fn parse(content: &str) -> Self {
        let mut s = Self::default();
        for (line_no, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else {
                log_warn!("settings line {}: expected key = value", line_no + 1);
                continue;
            };
            let key = key.trim();
            let val = val.trim();
            let ok = match key {
                "max_undo_steps" => val
                    .parse::<usize>()
                    .ok()
                    .filter(|&n| n >= 1)
                    .map(|n| s.max_undo_steps = n)
                    .is_some(),
                "canvas_width" => val
                    .parse::<u32>()
                    .ok()
                    .filter(|&n| n >= 1)
                    .map(|n| s.canvas_width = n)
                    .is_some(),
                "canvas_height" => val
                    .parse::<u32>()
                    .ok()
                    .filter(|&n| n >= 1)
                    .map(|n| s.canvas_height = n)
                    .is_some(),
                "brush_size" => val
                    .parse::<f32>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .map(|n| s.brush_size = clamp_brush_size(n))
                    .is_some(),
                "color" => Color::from_hex(val).map(|c| s.color = c).is_some(),
                _ => true,
            };
            if !ok {
                log_warn!("settings line {}: invalid value {:?} for {}", line_no + 1, val, key);
            }
        }
        s
    }

    pub fn to_config_string(&self) -> String {
        format!(
            "max_undo_steps={}\ncanvas_width={}\ncanvas_height={}\nbrush_size={}\ncolor={}\n",
            self.max_undo_steps,
            self.canvas_width,
            self.canvas_height,
            self.brush_size,
            self.color.to_hex(),
        )
    }

    pub fn save(&self) -> std::io::Result<()> {
        self.save_to(&Self::settings_path())
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_config_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_keys() {
        let s = SurfaceSettings::parse(
            "# comment\nmax_undo_steps = 5\ncanvas_width=64\ncanvas_height = 32\nbrush_size=3.5\ncolor=#FF0000\n",
        );
        assert_eq!(s.max_undo_steps, 5);
        assert_eq!((s.canvas_width, s.canvas_height), (64, 32));
        assert_eq!(s.brush_size, 3.5);
        assert_eq!(s.color, Color::rgb(255, 0, 0));
    }

    #[test]
    fn bad_values_keep_defaults() {
        let s = SurfaceSettings::parse(
            "max_undo_steps=0\ncanvas_width=wide\ncolor=red\nbrush_size=inf\nno separator\ntheme=dark\n",
        );
        assert_eq!(s, SurfaceSettings::default());
    }

    #[test]
    fn brush_size_is_clamped_on_load() {
        assert_eq!(SurfaceSettings::parse("brush_size=1000").brush_size, 100.0);
    }

    #[test]
    fn config_string_parses_back() {
        let s = SurfaceSettings {
            max_undo_steps: 7,
            canvas_width: 10,
            canvas_height: 11,
            brush_size: 2.0,
            color: Color::rgb(1, 2, 3),
        };
        assert_eq!(SurfaceSettings::parse(&s.to_config_string()), s);
    }

    #[test]
    fn save_and_load_through_a_file() {
        let dir = std::env::temp_dir().join(format!("rasterpad-settings-{}", std::process::id()));
        let path = dir.join("settings.cfg");
        let s = SurfaceSettings {
            max_undo_steps: 3,
            ..SurfaceSettings::default()
        };
        s.save_to(&path).expect("save settings");
        assert_eq!(SurfaceSettings::load_from(&path), s);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("rasterpad-definitely-missing").join("settings.cfg");
        assert_eq!(SurfaceSettings::load_from(&path), SurfaceSettings::default());
    }
}
