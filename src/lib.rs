#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Scroll-driven visuals for a single-page portfolio: the scroll position
//! drives the background color, the current section and the progress chrome,
//! with a hidden developer console and a set of achievements on top.
//!
//! Everything outside [`wasm`] is plain Rust and tested on the host.

pub mod achievements;
pub mod color;
pub mod config;
pub mod devconsole;
pub mod error;
pub mod logging;
pub mod observe;
pub mod orbs;
pub mod scroll;
pub mod sections;
pub mod storage;
pub mod triggers;
pub mod visual;

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use std::cell::RefCell;

    use log::{info, LevelFilter};
    use wasm_bindgen::prelude::*;

    mod app;
    mod background;
    mod console;
    pub mod dom;
    mod easter_eggs;
    mod navigation;

    pub use app::App;

    thread_local! {
        static APP: RefCell<Option<App>> = RefCell::new(None);
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        if let Err(e) = crate::logging::init(LevelFilter::Info) {
            web_sys::console::warn_1(&JsValue::from_str(&e.to_string()));
        }
        let app = App::mount()?;
        APP.with(|slot| *slot.borrow_mut() = Some(app));
        Ok(())
    }

    /// Removes every listener and stops the background animation.
    #[wasm_bindgen]
    pub fn unmount() {
        let app = APP.with(|slot| slot.borrow_mut().take());
        if let Some(app) = app {
            let animating = app.is_animating();
            drop(app);
            info!("portfolio unmounted (frame loop was {})", if animating { "running" } else { "stopped" });
        }
    }
}

// When compiling for non-wasm targets (e.g., `cargo test` on host),
// provide an empty stub so the crate still builds.
#[cfg(not(target_arch = "wasm32"))]
pub fn main() {}
