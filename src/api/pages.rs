use std::sync::LazyLock;

use minijinja::{context, Environment};

use crate::error::AppResult;

const APP_NAME: &str = "CineAI";

/// Shown on `/` while the artifacts are missing
pub const UNLOADED_PAGE_MESSAGE: &str =
    "Movie data not loaded. Please check server logs for details.";

// `.html` template names get HTML auto-escaping
static TEMPLATES: LazyLock<Environment<'static>> = LazyLock::new(|| {
    let mut env = Environment::new();
    env.add_template("index.html", include_str!("../../templates/index.html"))
        .expect("index template parses");
    env.add_template("error.html", include_str!("../../templates/error.html"))
        .expect("error template parses");
    env
});

pub fn render_index() -> AppResult<String> {
    let html = TEMPLATES
        .get_template("index.html")?
        .render(context! { app_name => APP_NAME })?;
    Ok(html)
}

pub fn render_error(message: &str) -> AppResult<String> {
    let html = TEMPLATES
        .get_template("error.html")?
        .render(context! { app_name => APP_NAME, error => message })?;
    Ok(html)
}
