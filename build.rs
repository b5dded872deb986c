// Builds the wasm package when targeting wasm32 and mirrors `static/` into
// `dist/` for deployment.
use std::process::Command;
use std::{env, fs, path::Path};

use fs_extra::dir::{copy, CopyOptions};

const NESTED: &str = "PORTFOLIO_WASM_PACK_NESTED";

fn main() {
    println!("cargo:rerun-if-changed=static");
    println!("cargo:rerun-if-env-changed={NESTED}");

    // wasm-pack runs cargo again, which runs this script again.
    let target = env::var("TARGET").unwrap_or_default();
    if target == "wasm32-unknown-unknown" && env::var_os(NESTED).is_none() {
        let status = Command::new("wasm-pack")
            .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
            .env(NESTED, "1")
            .status();

        match status {
            Ok(st) if !st.success() => println!("cargo:warning=wasm-pack build failed"),
            Ok(_) => {}
            Err(_) => println!("cargo:warning=wasm-pack not installed, skipping"),
        }
    }

    let out_dir = Path::new("dist");
    if out_dir.exists() {
        fs::remove_dir_all(out_dir).ok();
    }
    if let Err(e) = fs::create_dir_all(out_dir) {
        println!("cargo:warning=cannot create dist/: {e}");
        return;
    }

    let static_dir = Path::new("static");
    if static_dir.exists() {
        let options = CopyOptions {
            overwrite: true,
            content_only: true,
            ..CopyOptions::new()
        };
        if let Err(e) = copy(static_dir, out_dir, &options) {
            println!("cargo:warning=copying static/ to dist/ failed: {e}");
        }
    }
}
