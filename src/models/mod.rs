//! Domain models for the feature sync.
//!
//! Everything here is built fresh from query results on each run and dropped
//! when the run ends.
//!
//! - [`ValueMap`]: project, release and EPMO metadata as returned by the SQL
//!   runner, with the crate's single notion of a "present" value.
//! - [`ImpactedSystem`]: a row of the assessment's Impacted Systems table.
//! - [`Feature`]: an IS PMO Feature already linked to the project.
//! - [`Milestone`]: a major milestone of the IT project.
//! - [`ProjectVariant`]: the IT project's request type.

mod feature;
mod impacted_system;
mod milestone;
mod value_map;
mod variant;

pub use feature::*;
pub use impacted_system::*;
pub use milestone::*;
pub use value_map::*;
pub use variant::*;
