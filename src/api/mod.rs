//! API module - Backend service client

mod client;
mod models;

pub use client::{ApiClient, ApiError};
pub use models::{AnalysisResult, Credentials, HistoryRecord, LoginResponse, Profile, User};
