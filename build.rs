use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::process::Command;

fn hash_file(path: &Path) -> String {
    let content = fs::read(path).unwrap_or_default();
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("{:x}", hasher.finish())[..8].to_string()
}

fn build_grader_wasm() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let pkg_js = Path::new(&manifest_dir).join("static/pkg/exercise_grader.js");

    let status = Command::new("wasm-pack")
        .current_dir(Path::new(&manifest_dir).join("crates/exercise-grader"))
        .args([
            "build",
            "--target",
            "web",
            "--release",
            "--no-typescript",
            "--out-dir",
            "../../static/pkg",
        ])
        .status();

    match status {
        Ok(s) if s.success() => {}
        Ok(s) => {
            eprintln!("wasm-pack exited with status: {}", s);
            std::process::exit(1);
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            // Allow builds without wasm-pack if the bundle already exists
            if pkg_js.exists() {
                eprintln!("Warning: 'wasm-pack' not found, using existing static/pkg");
                return;
            }
            eprintln!("Error: 'wasm-pack' not found in PATH");
            eprintln!();
            eprintln!("Install it with: cargo install wasm-pack");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to run wasm-pack: {}", e);
            std::process::exit(1);
        }
    }
}

fn main() {
    // Re-run build script if relevant files change
    println!("cargo:rerun-if-changed=static/js/exercises.js");
    println!("cargo:rerun-if-changed=static/css/exercises.css");
    println!("cargo:rerun-if-changed=templates/");

    if std::env::var_os("CARGO_FEATURE_REBUILD_WASM").is_some() {
        println!("cargo:rerun-if-changed=crates/exercise-grader/src");
        build_grader_wasm();
    }

    // Hash static assets for cache busting
    let js_hash = hash_file(Path::new("static/js/exercises.js"));
    let css_hash = hash_file(Path::new("static/css/exercises.css"));

    // Write generated code to OUT_DIR
    let out_dir = std::env::var("OUT_DIR").unwrap();
    fs::write(
        Path::new(&out_dir).join("asset_hashes.rs"),
        format!(
            r#"/// Hash of exercises.js for cache busting
pub const EXERCISES_JS_HASH: &str = "{}";
/// Hash of exercises.css for cache busting
pub const EXERCISES_CSS_HASH: &str = "{}";"#,
            js_hash, css_hash
        ),
    )
    .unwrap();
}
