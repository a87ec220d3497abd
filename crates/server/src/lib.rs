use api_types::errors::{ErrorBody, FieldError};
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use messages::MessageStyle;
pub use server::{Options, router, run, run_with_listener, spawn_with_listener};
pub use accounts::{AuthError, FormErrors};

pub mod accounts;
mod categories;
mod expenses;
mod messages;
mod server;
mod statistics;
mod user;
mod views;

pub mod types {
    pub mod user {
        pub use api_types::user::{Login, Profile, Signup};
    }

    pub mod expense {
        pub use api_types::expense::{
            Deletion, ExpenseCreated, ExpenseFilter, ExpenseList, ExpenseNew, ExpenseState,
            ExpenseView, Reloaded,
        };
    }

    pub mod stats {
        pub use api_types::stats::{Breakdown, Donut, Summary, Totals, TotalsQuery};
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    /// An authentication failure, worded according to the configured style.
    Auth(AuthError, MessageStyle),
    /// Signup or login form errors, always worded specifically.
    Form(FormErrors),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        EngineError::Storage(_)
        | EngineError::Database(_)
        | EngineError::Io(_)
        | EngineError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn body_for_engine_error(err: EngineError) -> ErrorBody {
    match err {
        EngineError::Validation(errors) => ErrorBody {
            error: "invalid expense".to_string(),
            fields: errors
                .errors()
                .iter()
                .map(|error| FieldError {
                    field: error.field().to_string(),
                    message: error.to_string(),
                })
                .collect(),
        },
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            ErrorBody {
                error: "internal server error".to_string(),
                fields: Vec::new(),
            }
        }
        other => {
            tracing::error!("storage error: {other}");
            ErrorBody {
                error: "operation failed".to_string(),
                fields: Vec::new(),
            }
        }
    }
}

fn body_for_auth_error(err: AuthError, style: MessageStyle) -> ErrorBody {
    let message = style.message(&err);
    if let AuthError::Hash(reason) = &err {
        tracing::error!("password hashing failed: {reason}");
    }
    let fields = err
        .field()
        .map(|field| FieldError {
            field: field.to_string(),
            message: message.clone(),
        })
        .into_iter()
        .collect();
    ErrorBody {
        error: message,
        fields,
    }
}

fn body_for_form_errors(errors: FormErrors) -> ErrorBody {
    ErrorBody {
        error: errors.to_string(),
        fields: errors
            .errors()
            .iter()
            .filter_map(|error| {
                error.field().map(|field| FieldError {
                    field: field.to_string(),
                    message: error.to_string(),
                })
            })
            .collect(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Auth(err, style) => (err.status(), body_for_auth_error(err, style)),
            ServerError::Form(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                body_for_form_errors(errors),
            ),
            ServerError::Generic(error) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error,
                    fields: Vec::new(),
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

impl From<sea_orm::DbErr> for ServerError {
    fn from(value: sea_orm::DbErr) -> Self {
        Self::Engine(EngineError::Database(value))
    }
}
