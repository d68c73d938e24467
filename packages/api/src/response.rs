// ABOUTME: Shared API response types
// ABOUTME: Provides consistent response format across all API endpoints

use serde::Serialize;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// List response wrapper carrying an extra meta block
#[derive(Serialize)]
pub struct ListResponse<T, M> {
    pub success: bool,
    pub data: Vec<T>,
    pub meta: M,
}

impl<T, M> ListResponse<T, M> {
    pub fn new(data: Vec<T>, meta: M) -> Self {
        ListResponse {
            success: true,
            data,
            meta,
        }
    }
}
