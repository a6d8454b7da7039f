// The résumé form: per-session state, the render-cycle controller,
// the view it produces, and the HTTP handlers that drive it.

pub mod controller;
pub mod handlers;
pub mod session;
pub mod view;
