//! Host-side helper: `cargo run` builds the wasm package into `static/pkg`,
//! then serves `static/` locally so the portfolio can be opened in a browser.
//!
//! `PORT` overrides the default port; `ngrok` is started as well when it is
//! installed.

use std::io;
use std::process::{Child, Command, ExitCode, Stdio};
use std::{env, thread, time::Duration};

const DEFAULT_PORT: u16 = 8000;
const SITE_DIR: &str = "static";

fn build_package() -> io::Result<bool> {
    println!("Building wasm package …");
    let status = Command::new("wasm-pack")
        .args(["build", "--release", "--target", "web", "--out-dir"])
        .arg(format!("{SITE_DIR}/pkg"))
        .status();
    match status {
        Ok(st) => Ok(st.success()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            eprintln!("wasm-pack not found in PATH, serving whatever is already in {SITE_DIR}/pkg");
            Ok(true)
        }
        Err(e) => Err(e),
    }
}

fn serve(port: u16) -> io::Result<Child> {
    println!("Serving {SITE_DIR}/ at http://127.0.0.1:{port} …");
    Command::new("python3")
        .args(["-m", "http.server"])
        .arg(port.to_string())
        .args(["--directory", SITE_DIR])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
}

fn tunnel(port: u16) {
    match Command::new("ngrok")
        .args(["http", &port.to_string()])
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
    {
        Ok(_) => println!("ngrok tunnel starting …"),
        Err(_) => eprintln!("ngrok not found, the site is only reachable locally"),
    }
}

fn main() -> ExitCode {
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    match build_package() {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("wasm-pack finished with errors");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("could not run wasm-pack: {e}");
            return ExitCode::FAILURE;
        }
    }

    let mut server = match serve(port) {
        Ok(child) => child,
        Err(e) => {
            eprintln!("failed to start http server: {e}");
            return ExitCode::FAILURE;
        }
    };
    tunnel(port);

    loop {
        match server.try_wait() {
            Ok(Some(status)) => {
                eprintln!("http server exited: {status}");
                return ExitCode::FAILURE;
            }
            Ok(None) => thread::sleep(Duration::from_secs(5)),
            Err(e) => {
                eprintln!("lost track of the http server: {e}");
                return ExitCode::FAILURE;
            }
        }
    }
}
