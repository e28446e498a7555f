pub mod link_preview;
pub mod search;
pub mod tags;
pub mod trending;
pub mod tweets;

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Route resolution will stop at the first match.
    link_preview::configure(conf);
    search::configure(conf);
    tags::configure(conf);
    trending::configure(conf);
    tweets::configure(conf);
}
