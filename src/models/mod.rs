pub mod agent_response;
pub mod loaders;
pub mod rti_request;

pub use agent_response::AgentResponse;
pub use loaders::{load_all_submissions, load_submission, Submission};
pub use rti_request::{
    generate_tracking_id, validate_record, EducationStatus, Gender, LocationType, RequestStatus,
    RtiRequest,
};
