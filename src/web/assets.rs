//! Front-end files compiled into the binary.

macro_rules! asset {
    ($file:literal) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/src/web/assets/", $file))
    };
}

pub const INDEX_HTML: &str = asset!("index.html");
pub const STYLES_CSS: &str = asset!("styles.css");
pub const APP_JS: &str = asset!("app.js");
