//! Timeline reconstruction and enrichment.
//!
//! [`reconstruct`] turns raw transcript records into numbered steps plus
//! [`SessionMeta`](crate::models::SessionMeta). [`analyze`] then tags branch
//! points and re-tags failures as a separate pass, and [`summarize`] derives
//! the statistics shown by the renderers.

pub mod analyze;
pub mod builder;
pub mod failure;

use std::path::Path;

pub use analyze::{analyze, retag_failures, summarize, tag_branch_points};
pub use builder::reconstruct;
pub use failure::{BENIGN_STDERR_MARKERS, FailurePolicy, FailureSignal};

use crate::error::Result;
use crate::models::Timeline;
use crate::parsers::load_records;

/// Load a transcript and reconstruct its timeline, without enrichment
pub fn load_timeline(path: &Path) -> Result<Timeline> {
    let records = load_records(path)?;
    Ok(reconstruct(&records))
}

/// Load, reconstruct and enrich: what every renderer consumes
pub fn load_analyzed(path: &Path) -> Result<Timeline> {
    let mut timeline = load_timeline(path)?;
    analyze(&mut timeline.events);
    Ok(timeline)
}
