pub mod assessment;
pub mod batch;
pub mod selection;
pub mod submission;

pub use assessment::AssessmentType;
pub use batch::{Batch, BatchCandidates, Candidate, Question};
pub use selection::SelectionSet;
pub use submission::{
    AssessmentResult, AssessmentSubmission, MarkResponse, TheoryResult, TheorySubmission,
};
