use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;

use crate::error::VouchrError;

/// `axum::Json` whose rejections come back in the API envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(VouchrError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for VouchrError {
    fn from(rejection: JsonRejection) -> Self {
        VouchrError::Validation(rejection_message(&rejection))
    }
}

fn rejection_message(rejection: &JsonRejection) -> String {
    let detail = rejection.body_text();
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Request body must be sent as application/json".to_string()
        }
        JsonRejection::JsonDataError(_) => match quoted_field(&detail) {
            Some(field) => format!("Missing required field: {field}"),
            None => format!("Malformed upload request: {detail}"),
        },
        JsonRejection::JsonSyntaxError(_) => format!("Request body is not valid JSON: {detail}"),
        _ => detail,
    }
}

/// serde reports absent fields as "missing field `name`".
fn quoted_field(detail: &str) -> Option<&str> {
    let (_, rest) = detail.split_once("missing field `")?;
    rest.split_once('`').map(|(field, _)| field)
}
