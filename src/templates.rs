//! HTML page rendering
//!
//! Pages are handlebars templates compiled into the binary and registered
//! once at startup. `{{...}}` values are HTML-escaped, which is what keeps a
//! hostile `url` from breaking out of the iframe `src` attribute.

use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;

use crate::embed::force_https;

const HOME_TEMPLATE: &str = include_str!("../templates/home.hbs");
const PLAYER_TEMPLATE: &str = include_str!("../templates/player.hbs");
const ERROR_TEMPLATE: &str = include_str!("../templates/error.hbs");

/// Injected into every player page
pub const ADBLOCK_SCRIPT: &str = include_str!("../templates/adblock.js");

/// Permissions delegated to the embedded player
pub const IFRAME_ALLOW: &str =
    "autoplay; encrypted-media; fullscreen; picture-in-picture; accelerometer; gyroscope; clipboard-write";

const EXAMPLE_ID: &str = "0tmqi4jmtowr";
const EXAMPLE_URL: &str = "https://hglink.to/e/0tmqi4jmtowr";

#[derive(Serialize)]
struct HomePage<'a> {
    version: &'a str,
    example_id: &'a str,
    example_url: &'a str,
}

#[derive(Serialize)]
struct PlayerPage<'a> {
    src: &'a str,
    allow: &'a str,
    autoplay: bool,
    muted: bool,
    adblock_script: &'a str,
}

#[derive(Serialize)]
struct ErrorPage<'a> {
    title: &'a str,
    message: &'a str,
}

/// Compiled page templates
pub struct Templates {
    registry: Handlebars<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_template_string("home", HOME_TEMPLATE)?;
        registry.register_template_string("player", PLAYER_TEMPLATE)?;
        registry.register_template_string("error", ERROR_TEMPLATE)?;
        Ok(Self { registry })
    }

    pub fn home(&self) -> Result<String, RenderError> {
        self.registry.render(
            "home",
            &HomePage {
                version: env!("CARGO_PKG_VERSION"),
                example_id: EXAMPLE_ID,
                example_url: EXAMPLE_URL,
            },
        )
    }

    /// Full-viewport player wrapping `src` in a sandboxed iframe
    pub fn player(&self, src: &str, autoplay: bool, muted: bool) -> Result<String, RenderError> {
        let src = force_https(src);
        self.registry.render(
            "player",
            &PlayerPage {
                src: &src,
                allow: IFRAME_ALLOW,
                autoplay,
                muted,
                adblock_script: ADBLOCK_SCRIPT,
            },
        )
    }

    pub fn error(&self, title: &str, message: &str) -> Result<String, RenderError> {
        self.registry
            .render("error", &ErrorPage { title, message })
    }
}
