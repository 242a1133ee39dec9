//! Data models shared across the retiming engine.
//!
//! These types describe a single retiming unit (one episode's audio track):
//! the scene boundaries it carries, the rate used for every frame/time
//! conversion, and where its audio comes from and goes to.

mod rate;
mod scene;
mod unit;

pub use rate::{RateParseError, ScaleRate};
pub use scene::{ChapterMap, OffsetEntry, OffsetMap, SceneKey, SceneKeyParseError};
pub use unit::{BitrateId, UnitDescriptor};
