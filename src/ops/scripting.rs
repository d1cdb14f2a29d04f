// ============================================================================
// SCRIPTING — drive a DrawingSurface from a sandboxed Rhai script
// ============================================================================

use std::sync::{Arc, Mutex, MutexGuard};

use rhai::{AST, Array, Dynamic, Engine, EvalAltResult, ImmutableString, Position, Scope};

use crate::canvas::Color;
use crate::components::tools::Tool;
use crate::log_info;
use crate::surface::DrawingSurface;

/// A surface shared between the caller and the engine's host functions.
pub type SharedSurface = Arc<Mutex<DrawingSurface>>;

type RhaiResult<T> = Result<T, Box<EvalAltResult>>;

// ============================================================================
// Error type
// ============================================================================

#[derive(Debug, Clone)]
pub struct ScriptError {
    pub message: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl ScriptError {
    fn at(message: String, pos: Position) -> Self {
        Self {
            message,
            line: pos.line().filter(|&l| l > 0),
            column: pos.position().filter(|&c| c > 0),
        }
    }

    /// Error explanation with location and a hint for the common cases.
    pub fn friendly_message(&self) -> String {
        let raw = &self.message;
        let mut parts = Vec::new();

        match (self.line, self.column) {
            (Some(line), Some(col)) => parts.push(format!("Error on line {}, column {}:", line, col)),
            (Some(line), None) => parts.push(format!("Error on line {}:", line)),
            _ => parts.push("Script error:".to_string()),
        }

        let cleaned = raw.split(" (line ").next().unwrap_or(raw);
        if let Some(fn_desc) = raw.strip_prefix("Function not found: ") {
            let fn_desc = fn_desc.split(" (line ").next().unwrap_or(fn_desc);
            parts.push(format!("  Could not find function: {}", fn_desc.trim()));
            parts.push(String::new());
            parts.push(
                "  Tip: coordinates and sizes accept numbers; tool() and color() take strings."
                    .to_string(),
            );
        } else if raw.contains("Too many operations") {
            parts.push("  Script exceeded the maximum operation limit.".to_string());
            parts.push(String::new());
            parts.push("  Tip: check for a loop that never ends.".to_string());
        } else {
            parts.push(format!("  {}", cleaned));
        }

        parts.join("\n")
    }
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let (Some(line), Some(col)) = (self.line, self.column) {
            write!(f, "Line {}, Col {}: {}", line, col, self.message)
        } else if let Some(line) = self.line {
            write!(f, "Line {}: {}", line, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl std::error::Error for ScriptError {}

// ============================================================================
// Engine construction with sandbox + API registration
// ============================================================================

fn lock(surface: &SharedSurface) -> MutexGuard<'_, DrawingSurface> {
    surface.lock().unwrap_or_else(|e| e.into_inner())
}

fn create_engine(surface: SharedSurface, console: Arc<Mutex<Vec<String>>>) -> Engine {
    let mut engine = Engine::new();

    // ── Sandbox limits ──
    engine.set_max_operations(5_000_000);
    engine.set_max_call_levels(64);
    engine.set_max_expr_depths(64, 64);
    engine.set_max_string_size(10_000);
    engine.set_max_array_size(100_000);
    engine.set_max_map_size(1_000);

    engine.on_print(move |msg| {
        console
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(msg.to_string());
    });

    register_canvas_api(&mut engine, surface.clone());
    register_tool_api(&mut engine, surface.clone());
    register_pointer_api(&mut engine, surface.clone());
    register_history_api(&mut engine, surface);

    engine
}

// ============================================================================
// Canvas API
// ============================================================================

fn register_canvas_api(engine: &mut Engine, surface: SharedSurface) {
    let s = surface.clone();
    engine.register_fn("width", move || -> i64 { lock(&s).buffer().width() as i64 });

    let s = surface.clone();
    engine.register_fn("height", move || -> i64 { lock(&s).buffer().height() as i64 });

    let s = surface.clone();
    engine.register_fn("get_pixel", move |x: i64, y: i64| -> Array {
        let guard = lock(&s);
        let c = if x < 0 || y < 0 || x > u32::MAX as i64 || y > u32::MAX as i64 {
            Color::TRANSPARENT
        } else {
            guard.buffer().get_pixel(x as u32, y as u32)
        };
        [c.r, c.g, c.b, c.a]
            .iter()
            .map(|&v| Dynamic::from(v as i64))
            .collect()
    });

    let s = surface.clone();
    engine.register_fn("clear", move || lock(&s).clear());

    let s = surface;
    engine.register_fn("resize", move |w: i64, h: i64| -> RhaiResult<()> {
        if w < 1 || h < 1 || w > u32::MAX as i64 || h > u32::MAX as i64 {
            return Err(format!("resize({}, {}): dimensions must be positive", w, h).into());
        }
        lock(&s).resize(w as u32, h as u32);
        Ok(())
    });
}

// ============================================================================
// Tool API
// ============================================================================

fn register_tool_api(engine: &mut Engine, surface: SharedSurface) {
    let s = surface.clone();
    engine.register_fn("tool", move |name: ImmutableString| -> RhaiResult<()> {
        let tool = Tool::from_name(&name).ok_or_else(|| format!("unknown tool '{}'", name))?;
        lock(&s).set_tool(tool);
        Ok(())
    });

    let s = surface.clone();
    engine.register_fn("color", move |hex: ImmutableString| -> RhaiResult<()> {
        let color = Color::from_hex(&hex).ok_or_else(|| format!("invalid color '{}'", hex))?;
        lock(&s).set_color(color);
        Ok(())
    });

    let s = surface.clone();
    engine.register_fn("size", move |n: f64| lock(&s).set_brush_size(n as f32));
    let s = surface;
    engine.register_fn("size", move |n: i64| lock(&s).set_brush_size(n as f32));
}

// ============================================================================
// Pointer API
// ============================================================================

/// Register `name(x, y)` for both integer and float arguments.
fn register_xy<F>(engine: &mut Engine, name: &str, surface: SharedSurface, f: F)
where
    F: Fn(&mut DrawingSurface, f32, f32) + Clone + Send + Sync + 'static,
{
    let (s, g) = (surface.clone(), f.clone());
    engine.register_fn(name, move |x: f64, y: f64| g(&mut lock(&s), x as f32, y as f32));
    let (s, g) = (surface, f);
    engine.register_fn(name, move |x: i64, y: i64| g(&mut lock(&s), x as f32, y as f32));
}

fn point_from(item: &Dynamic) -> Option<(f32, f32)> {
    let pair = item.clone().try_cast::<Array>()?;
    if pair.len() != 2 {
        return None;
    }
    let num = |d: &Dynamic| {
        d.as_float()
            .ok()
            .or_else(|| d.as_int().ok().map(|i| i as f64))
            .map(|v| v as f32)
    };
    Some((num(&pair[0])?, num(&pair[1])?))
}

fn register_pointer_api(engine: &mut Engine, surface: SharedSurface) {
    register_xy(engine, "down", surface.clone(), |s, x, y| s.pointer_down(x, y));
    register_xy(engine, "move_to", surface.clone(), |s, x, y| s.pointer_move(x, y));

    let s = surface.clone();
    engine.register_fn("up", move || -> bool { lock(&s).pointer_up() });

    register_xy(engine, "fill", surface.clone(), |s, x, y| {
        let previous = s.properties().tool;
        s.set_tool(Tool::Fill);
        s.pointer_down(x, y);
        s.set_tool(previous);
    });

    let s = surface;
    engine.register_fn("stroke", move |points: Array| -> RhaiResult<()> {
        let mut coords = Vec::with_capacity(points.len());
        for (i, item) in points.iter().enumerate() {
            let p = point_from(item)
                .ok_or_else(|| format!("stroke: point {} is not an [x, y] pair", i))?;
            coords.push(p);
        }
        let Some((&first, rest)) = coords.split_first() else {
            return Ok(());
        };
        let mut guard = lock(&s);
        guard.pointer_down(first.0, first.1);
        for &(x, y) in rest {
            guard.pointer_move(x, y);
        }
        guard.pointer_up();
        Ok(())
    });
}

// ============================================================================
// History API
// ============================================================================

fn register_history_api(engine: &mut Engine, surface: SharedSurface) {
    let s = surface.clone();
    engine.register_fn("undo", move || -> bool { lock(&s).undo() });

    let s = surface.clone();
    engine.register_fn("redo", move || -> bool { lock(&s).redo() });

    let s = surface.clone();
    engine.register_fn("can_undo", move || -> bool { lock(&s).history().can_undo() });

    let s = surface.clone();
    engine.register_fn("can_redo", move || -> bool { lock(&s).history().can_redo() });

    let s = surface;
    engine.register_fn("history_len", move || -> i64 {
        lock(&s).history().undo_count() as i64
    });
}

// ============================================================================
// Public execution API
// ============================================================================

/// Compile a script and return the AST, or a ScriptError.
pub fn compile_script(source: &str) -> Result<AST, ScriptError> {
    let engine = Engine::new();
    engine
        .compile(source)
        .map_err(|e| ScriptError::at(e.to_string(), e.position()))
}

/// Run `source` against `surface` on the calling thread.
///
/// Returns the lines printed by the script. Whatever the script drew before
/// an error stays on the surface.
pub fn run_script(source: &str, surface: SharedSurface) -> Result<Vec<String>, ScriptError> {
    let console = Arc::new(Mutex::new(Vec::new()));
    let engine = create_engine(surface, console.clone());
    let mut scope = Scope::new();

    let ast = engine
        .compile(source)
        .map_err(|e| ScriptError::at(e.to_string(), e.position()))?;

    engine
        .run_ast_with_scope(&mut scope, &ast)
        .map_err(|e| ScriptError::at(e.to_string(), e.position()))?;

    let output = console.lock().unwrap_or_else(|e| e.into_inner()).clone();
    log_info!("Script finished ({} console lines)", output.len());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared(w: u32, h: u32) -> SharedSurface {
        Arc::new(Mutex::new(DrawingSurface::new(w, h)))
    }

    #[test]
    fn script_fills_and_reports_dimensions() {
        let surface = shared(6, 4);
        let out = run_script(
            r##"
                color("#ffffff");
                fill(0, 0);
                print(`${width()}x${height()}`);
            "##,
            surface.clone(),
        )
        .expect("script runs");
        assert_eq!(out, vec!["6x4".to_string()]);
        let guard = lock(&surface);
        assert_eq!(guard.buffer().get_pixel(5, 3), Color::WHITE);
        assert_eq!(guard.properties().tool, Tool::Brush);
        assert_eq!(guard.history().undo_count(), 2);
    }

    #[test]
    fn stroke_draws_and_commits_once() {
        let surface = shared(20, 20);
        run_script(
            r##"
                size(2);
                color("#ff0000");
                stroke([[2, 10], [10, 10.0], [18, 10]]);
                if history_len() != 2 { throw "expected one commit"; }
            "##,
            surface.clone(),
        )
        .expect("script runs");
        assert_eq!(lock(&surface).buffer().get_pixel(10, 9), Color::rgb(255, 0, 0));
    }

    #[test]
    fn undo_redo_are_exposed() {
        let surface = shared(3, 3);
        let out = run_script(
            r##"
                color("#000000");
                tool("rect");
                down(0, 0); move_to(2.5, 2.5); up();
                print(undo());
                print(undo());
                print(can_redo());
                print(redo());
                print(get_pixel(0, 0));
            "##,
            surface,
        )
        .expect("script runs");
        assert_eq!(out[0], "true");
        assert_eq!(out[1], "false");
        assert_eq!(out[2], "true");
        assert_eq!(out[3], "true");
        assert_eq!(out[4], "[0, 0, 0, 255]");
    }

    #[test]
    fn unknown_tool_is_a_runtime_error() {
        let err = run_script("tool(\"spray\");", shared(2, 2)).unwrap_err();
        assert!(err.message.contains("unknown tool"), "{}", err.message);
        assert_eq!(err.line, Some(1));
    }

    #[test]
    fn bad_color_and_bad_resize_fail() {
        assert!(run_script("color(\"blue\");", shared(2, 2)).is_err());
        assert!(run_script("resize(0, 5);", shared(2, 2)).is_err());
        assert!(run_script("stroke([[1, 2, 3]]);", shared(2, 2)).is_err());
    }

    #[test]
    fn syntax_errors_carry_a_location() {
        let err = compile_script("let x = ;").unwrap_err();
        assert_eq!(err.line, Some(1));
        assert!(err.friendly_message().starts_with("Error on line 1"));
    }

    #[test]
    fn runaway_loops_hit_the_operation_limit() {
        let err = run_script("loop { }", shared(1, 1)).unwrap_err();
        assert!(err.friendly_message().contains("operation limit"), "{}", err.message);
    }
}
