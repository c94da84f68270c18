//! Domain models shared by the catalog client
//!
//! Records are read-mostly snapshots of backend state. Deserialization is
//! lenient about legacy wire shapes (numbers sent as strings, JSON-encoded
//! author lists, retired enum values) and always yields canonical values.

pub mod classification;
pub mod combination;
pub mod paper;
pub mod session;
pub mod wire;

pub use classification::{ArticleType, ReviewStatus, SuperconductorType};
pub use combination::{canonical_symbols, ElementCombination};
pub use paper::{PaperRecord, PhysicalDataPoint};
pub use session::{Session, SessionUser};
