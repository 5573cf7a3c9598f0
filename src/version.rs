// Package identity baked in at build time

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Landing-page text for `GET /`.
pub fn banner() -> String {
    format!("{} {}: metrics are served on /metrics", NAME, VERSION)
}
