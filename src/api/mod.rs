//! HTTP surface: the `/api/test` probe group, the `/healthz` liveness probe
//! and the request-id middleware shared by both.

pub mod health;
pub mod probe;
pub mod request_id;
