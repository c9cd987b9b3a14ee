//! Wire-level types for the virtualization engine's REST API.
//!
//! Everything here is plain serde data: the response envelope the engine
//! wraps every call in, job references and states, and the handful of
//! resource views the CLI reads. No I/O lives in this crate.

pub mod envelope;
pub mod job;
pub mod resource;

pub use envelope::{ApiErrorBody, ApiStatus, Envelope, LoginRequest, LoginResult};
pub use job::{JobRef, JobState, JobView};
pub use resource::{ContainerView, DatabaseView, NamedRef, ObjectRef, SourceView};
