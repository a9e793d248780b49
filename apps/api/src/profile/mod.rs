// Profile domain: questionnaire catalog, category merge, derived academic
// tracker, and the profile CRUD handlers.

pub mod handlers;
pub mod merge;
pub mod questions;
pub mod tracker;
