//! Kesher core - on-device state and scoring for a peer-support app
//!
//! The app shell (mobile UI, push delivery, health-platform bridges) lives
//! outside this crate. Kesher core owns the data it collects and the values
//! derived from it:
//!
//! - **Check-ins**: daily mood reports and the consecutive-day streak
//! - **Risk scoring**: a four-level classification from recent moods and sleep
//! - **Buddies**: peer contacts, check-on alerts and message logs
//! - **Notifications**: in-app notifications with read tracking
//! - **Badges & training**: XP, levels and simulated support scenarios
//! - **Chat companion**: conversation log backed by a completion endpoint
//!
//! All mutations go through [`AppState::dispatch`]; the state serializes to
//! JSON for persistence. C entry points live in [`ffi`].

pub mod badges;
pub mod buddy;
pub mod chat;
pub mod config;
pub mod error;
pub mod health;
pub mod notifications;
pub mod risk;
pub mod store;
pub mod stories;
pub mod streak;
pub mod training;
pub mod types;
pub mod user;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use chat::{ChatSession, CompletionClient, OpenAiClient};
pub use config::Config;
pub use error::{ChatError, KesherError};
pub use risk::{assess, risk_level, RiskAssessment};
pub use store::{assess_risk_json, Action, AppState, StateSummary};
pub use types::{CheckIn, CheckInDraft, Mood, RiskLevel, SleepQuality, SleepSample};

/// Library version
pub const KESHER_VERSION: &str = env!("CARGO_PKG_VERSION");
