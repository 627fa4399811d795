//! Dashboard HTTP server and embedded UI assets.
//!
//! ```text
//! ┌───────────┐  HTTP  ┌──────────────────────────────────────────────┐
//! │ Dashboard │ ─────> │ server.rs  (Router, ServerConfig, static)    │
//! │ (browser) │ <───── │   └─ api.rs  (handlers, AppState, ApiError)  │
//! └───────────┘        │        │ spawn_blocking                      │
//!                      │        v                                     │
//!                      │ controller::ProjectController                │
//!                      │   ├─ state::StateStore   (STATE.json)        │
//!                      │   ├─ supervisor          (auto-run loop)     │
//!                      │   └─ interrupt, guard, tasks, tail           │
//!                      └──────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod embedded;
pub mod server;
