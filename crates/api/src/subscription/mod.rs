mod set_subscription;

use actix_web::web;
use set_subscription::set_subscription_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/subscription",
        web::put().to(set_subscription_controller),
    );
}
