/// Typed clients for the backend REST namespaces
///
/// One thin client per namespace, all sharing the same `Http` transport.
/// The contract is owned by the backend; these types are the boundary the
/// client depends on, nothing more.
pub mod appointments;
pub mod chat;
pub mod departments;
pub mod finance;
pub mod http;
pub mod patients;
pub mod radiology;
pub mod staff;

pub use http::Http;
