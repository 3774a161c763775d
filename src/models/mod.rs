pub mod form;
pub mod workout;

pub use form::{coerce_number, FormInput, MetricField};
pub use workout::{Coordinate, Workout, WorkoutId, WorkoutKind, WorkoutType};
