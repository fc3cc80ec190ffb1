//! Region-growing selection.
//!
//! This module provides the magic wand engine and the state around it:
//! - **Settings**: per-space tolerances, active spaces, connectivity
//! - **Groups**: seed and avoidance points grouped under a name and color
//! - **Avoidance mask**: pixels near any avoidance color
//! - **Magic wand**: contiguous flood fill or global threshold into a [`SelectionMask`]
//! - **Session**: committed and live-preview masks for interactive use

pub mod avoidance;
pub mod group;
pub mod magic_wand;
pub mod mask;
pub mod session;
pub mod settings;

pub use avoidance::{build_avoidance_mask, AvoidanceMask};
pub use group::{AvoidancePoint, GroupId, GroupKind, GroupPoints, SeedPoint, SegmentGroup};
pub use magic_wand::{build_mask, grow_region, paint_region, GrowthResult, GrowthSeeds};
pub use mask::SelectionMask;
pub use session::SelectionSession;
pub use settings::{Connectivity, SpaceSet, ToleranceSet, WandSettings};
