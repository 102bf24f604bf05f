mod create_schedule;
mod delete_schedule;
mod get_schedule_stats;
pub mod tick_schedule;

use actix_web::web;
use create_schedule::create_schedule_admin_controller;
use delete_schedule::delete_schedule_admin_controller;
use get_schedule_stats::get_schedule_stats_admin_controller;
use tick_schedule::tick_schedule_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/schedule", web::post().to(create_schedule_admin_controller));
    cfg.route(
        "/schedule/{schedule_id}",
        web::delete().to(delete_schedule_admin_controller),
    );
    cfg.route(
        "/schedule/{schedule_id}/stats",
        web::get().to(get_schedule_stats_admin_controller),
    );
    // Callback target registered with the external cron dispatcher
    cfg.route(
        "/schedule/{schedule_id}/tick",
        web::post().to(tick_schedule_controller),
    );
}
