mod ack_deliveries;
mod get_deliveries;
pub mod send_notification;
mod sweep_deliveries;

use ack_deliveries::ack_deliveries_controller;
use actix_web::web;
use get_deliveries::get_deliveries_controller;
use send_notification::send_notification_admin_controller;
use sweep_deliveries::sweep_deliveries_admin_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Ad hoc notification outside any schedule
    cfg.route(
        "/notification",
        web::post().to(send_notification_admin_controller),
    );
    cfg.route("/delivery", web::get().to(get_deliveries_controller));
    cfg.route("/delivery/ack", web::post().to(ack_deliveries_controller));
    cfg.route(
        "/delivery/sweep",
        web::post().to(sweep_deliveries_admin_controller),
    );
}
