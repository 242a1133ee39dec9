//! Series catalog: which episodes exist, where their audio lives, and the
//! frame data that drives their corrections.

mod catalog;
mod frame_data;
mod layout;

pub use catalog::{pad_episode, EpisodeRange, RangeParseError, Series, SeriesParseError};
pub use frame_data::{EpisodeFrames, FrameData, FrameDataError, FrameDataResult};
pub use layout::SeriesLayout;
