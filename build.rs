use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Fontconfig patterns tried in order for swatch labels
const FONT_PATTERNS: &[&str] = &[
    "DejaVu Sans:style=Bold",
    "Liberation Sans:style=Bold",
    "IBM Plex Sans:style=Bold",
    "sans-serif:style=Bold",
];

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let font_out = out_dir.join("font.ttf");

    // A stale copy can be read-only
    let _ = fs::remove_file(&font_out);

    match FONT_PATTERNS.iter().find_map(|pattern| fc_match(pattern)) {
        Some(path) => {
            println!("cargo:warning=Label font: {}", path.display());
            fs::copy(&path, &font_out).expect("Failed to copy font to OUT_DIR");
        }
        None => {
            println!("cargo:warning=No label font found, swatch labels will be omitted");
            fs::write(&font_out, b"").expect("Failed to write empty font");
        }
    }

    println!("cargo:rerun-if-changed=build.rs");
}

/// Resolve a fontconfig pattern to an existing TrueType/OpenType file
fn fc_match(pattern: &str) -> Option<PathBuf> {
    let output = Command::new("fc-match")
        .args(["--format=%{file}", pattern])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let path = PathBuf::from(String::from_utf8(output.stdout).ok()?.trim());
    is_outline_font(&path).then_some(path)
}

fn is_outline_font(path: &Path) -> bool {
    let outline = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"));
    outline && path.is_file()
}
