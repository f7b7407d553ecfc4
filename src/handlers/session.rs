//! Session inspection and logout handlers

use actix_web::{web, HttpRequest, HttpResponse};

use crate::auth::{Greenlight, DEFAULT_REDIRECT};
use crate::utils::{LoggingHelper, ResponseBuilder};

/// `GET {mount}/user`
pub async fn user_info(req: HttpRequest, greenlight: web::Data<Greenlight>) -> HttpResponse {
    match greenlight.get_user_data(&req) {
        Some(user) => HttpResponse::Ok().json(user),
        None => ResponseBuilder::no_session(),
    }
}

/// `GET {mount}/logout`
pub async fn logout(greenlight: web::Data<Greenlight>) -> HttpResponse {
    let mut response = ResponseBuilder::redirect(DEFAULT_REDIRECT, Vec::new());
    match greenlight.session_manager().clear_user_data(&mut response) {
        Ok(()) => LoggingHelper::log_session_cleared(),
        Err(e) => log::error!("Failed to clear session cookie: {e}"),
    }
    response
}
