use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{file} row {row}: {message}")]
    Parse {
        file: String,
        row: usize,
        message: String,
    },

    #[error("Invalid month: {0} (expected YYYY-MM)")]
    InvalidMonth(String),

    #[error("Unknown volunteer: {0}")]
    UnknownVolunteer(String),

    #[error("Unknown shift: {0}")]
    UnknownShift(String),

    #[error("Volunteer {volunteer_id} is already assigned to shift {shift_id}")]
    AlreadyAssigned {
        volunteer_id: String,
        shift_id: String,
    },

    #[error("Shift {0} is already fully staffed")]
    ShiftFull(String),

    #[error("Invalid availability: {0}")]
    InvalidAvailability(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Roster store is unavailable")]
    StorePoisoned,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl RosterError {
    fn code(&self) -> &'static str {
        match self {
            RosterError::Io(_) => "IO_ERROR",
            RosterError::Csv(_) => "CSV_ERROR",
            RosterError::Parse { .. } => "PARSE_ERROR",
            RosterError::InvalidMonth(_) => "INVALID_MONTH",
            RosterError::UnknownVolunteer(_) => "UNKNOWN_VOLUNTEER",
            RosterError::UnknownShift(_) => "UNKNOWN_SHIFT",
            RosterError::AlreadyAssigned { .. } => "ALREADY_ASSIGNED",
            RosterError::ShiftFull(_) => "SHIFT_FULL",
            RosterError::InvalidAvailability(_) => "INVALID_AVAILABILITY",
            RosterError::NotFound(_) => "NOT_FOUND",
            RosterError::Unauthorized => "UNAUTHORIZED",
            RosterError::Config(_) => "CONFIG_ERROR",
            RosterError::StorePoisoned => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for RosterError {
    fn status_code(&self) -> StatusCode {
        match self {
            RosterError::InvalidMonth(_) | RosterError::InvalidAvailability(_) => {
                StatusCode::BAD_REQUEST
            }
            RosterError::UnknownVolunteer(_)
            | RosterError::UnknownShift(_)
            | RosterError::NotFound(_) => StatusCode::NOT_FOUND,
            RosterError::AlreadyAssigned { .. } | RosterError::ShiftFull(_) => {
                StatusCode::CONFLICT
            }
            RosterError::Unauthorized => StatusCode::UNAUTHORIZED,
            RosterError::Io(_)
            | RosterError::Csv(_)
            | RosterError::Parse { .. }
            | RosterError::Config(_)
            | RosterError::StorePoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let message = if status.is_server_error() {
            tracing::error!("Internal error: {}", self);
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: ErrorBody {
                code: self.code(),
                message,
            },
        })
    }
}

pub type RosterResult<T> = Result<T, RosterError>;
