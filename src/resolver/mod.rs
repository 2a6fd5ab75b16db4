//! Resolution tiers
//!
//! Each tier reads the shared [`AnswerRecord`], does nothing if an earlier
//! tier already answered, and recovers its own collaborator failures by
//! recording them in `error`. An `Err` from [`Resolver::resolve`] means
//! something unexpected escaped the tier; the pipeline turns it into a failed
//! record.

pub mod exact;
pub mod generative;
pub mod semantic;

pub use exact::ExactMatchResolver;
pub use generative::GenerativeResolver;
pub use semantic::{DEFAULT_THRESHOLD, SemanticResolver};

use crate::Result;
use crate::record::AnswerRecord;

pub trait Resolver: Send + Sync {
    /// Short tier name used in logs
    fn name(&self) -> &'static str;

    fn resolve(&self, record: &mut AnswerRecord) -> Result<()>;
}
