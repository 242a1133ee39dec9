//! Audio retiming engine.
//!
//! Applies per-scene frame corrections to a compressed audio track without
//! re-encoding it:
//!
//! - [`timecode`]: frame boundaries and offsets to millisecond cut points
//! - [`splicer`]: trim, pad with silence and rejoin one scene
//! - [`driver`]: walk a unit's scenes in order and commit the result
//!
//! The bitstream work itself is delegated to an [`AudioTools`]
//! implementation, normally [`DelayCutTools`].
//!
//! # Example
//!
//! ```no_run
//! use radar_core::models::ScaleRate;
//! use radar_core::retime::{DelayCutTools, Retimer, SilenceLibrary, UnitOutcome};
//! # let unit: radar_core::models::UnitDescriptor = unimplemented!();
//!
//! let tools = DelayCutTools::new("/opt/delaycut/delaycut", SilenceLibrary::new("ac3"));
//! tools.validate()?;
//!
//! let retimer = Retimer::new(tools, ScaleRate::NTSC, ".temp");
//! if let UnitOutcome::Failed(reason) = retimer.retime(&unit) {
//!     eprintln!("{}", reason);
//! }
//! # Ok::<(), radar_core::retime::RetimeError>(())
//! ```

pub mod driver;
pub mod errors;
pub mod splicer;
pub mod stream;
pub mod timecode;
pub mod tools;

pub use driver::{plan_scenes, RetimeReport, Retimer, ScenePlan, UnitOutcome};
pub use errors::{RetimeError, RetimeResult};
pub use splicer::{SpliceCase, Splicer};
pub use stream::WorkingStream;
pub use timecode::{convert, CutPlan};
pub use tools::{concat_files, AudioTools, DelayCutTools, SilenceLibrary};
