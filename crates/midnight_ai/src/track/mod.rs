//! Track domain: racing line, генератор, погодные условия.

pub mod builder;
pub mod conditions;
pub mod racing_line;


pub use builder::{corner_speed, menger_curvature, oval_centerline, RacingLineBuilder, RacingLineParams};
pub use conditions::TrackConditions;
pub use racing_line::{RacingLine, RacingLinePoint, MIN_RACING_LINE_POINTS};
