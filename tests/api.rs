use actix_web::{test, web, App};
use nudge_api::configure_server_api;
use nudge_api_structs::{ack_deliveries, create_schedule, get_deliveries, sweep_deliveries, tick_schedule};
use nudge_domain::{DeliveryStatus, ACK_WINDOW_MILLIS, FORCED_CHECKOUT_REASON, ID};
use nudge_infra::{setup_test_context, NudgeContext, StaticTimeSys, TestCollaborators};
use std::sync::Arc;

const ADMIN_API_KEY_HEADER: &str = "nudge-admin-api-key";
const ADMIN_ID_HEADER: &str = "nudge-admin-id";
const EMPLOYEE_ID_HEADER: &str = "nudge-employee-id";
const WEBHOOK_SECRET_HEADER: &str = "nudge-webhook-key";

fn test_context(now: i64) -> (NudgeContext, TestCollaborators) {
    let (mut ctx, collaborators) = setup_test_context();
    ctx.sys = Arc::new(StaticTimeSys(now));
    (ctx, collaborators)
}

macro_rules! service {
    ($ctx:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($ctx.clone()))
                .service(web::scope("/api/v1").configure(configure_server_api)),
        )
        .await
    };
}

fn admin_req(ctx: &NudgeContext, req: test::TestRequest) -> test::TestRequest {
    req.insert_header((ADMIN_API_KEY_HEADER, ctx.config.admin_api_key.clone()))
        .insert_header((ADMIN_ID_HEADER, ID::new().as_string()))
}

fn create_schedule_body(employee_id: &ID, start_at: i64, stop_at: i64) -> create_schedule::RequestBody {
    create_schedule::RequestBody {
        employee_id: employee_id.clone(),
        title: "Lunch is over".into(),
        body: "Tap to confirm you are back".into(),
        url: None,
        every_minutes: 60,
        start_at,
        stop_at,
        timezone: "UTC".into(),
        metadata: None,
    }
}

async fn create_schedule(
    ctx: &NudgeContext,
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    employee_id: &ID,
    start_at: i64,
    stop_at: i64,
) -> create_schedule::APIResponse {
    let req = admin_req(ctx, test::TestRequest::post().uri("/api/v1/schedule"))
        .set_json(create_schedule_body(employee_id, start_at, stop_at))
        .to_request();
    let res = test::call_service(app, req).await;
    assert_eq!(res.status(), 201);
    test::read_body_json(res).await
}

async fn tick(
    ctx: &NudgeContext,
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    schedule_id: &ID,
) -> tick_schedule::APIResponse {
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/schedule/{}/tick", schedule_id))
        .insert_header((WEBHOOK_SECRET_HEADER, ctx.config.webhook_secret.clone()))
        .to_request();
    let res = test::call_service(app, req).await;
    assert!(res.status().is_success());
    test::read_body_json(res).await
}

async fn sweep(
    ctx: &NudgeContext,
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
) -> sweep_deliveries::APIResponse {
    let req = admin_req(ctx, test::TestRequest::post().uri("/api/v1/delivery/sweep")).to_request();
    let res = test::call_service(app, req).await;
    assert!(res.status().is_success());
    test::read_body_json(res).await
}

#[actix_web::test]
async fn unauthenticated_requests_are_rejected() {
    let (ctx, _) = test_context(0);
    let app = service!(ctx);

    // Admin surface without the api key
    let req = test::TestRequest::post()
        .uri("/api/v1/schedule")
        .set_json(create_schedule_body(&ID::new(), 0, 1000))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);

    // Tick without the webhook secret
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/schedule/{}/tick", ID::new()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);

    // Employee surface without the employee header
    let req = test::TestRequest::get()
        .uri("/api/v1/delivery")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);
}

#[actix_web::test]
async fn tick_sends_a_delivery_that_expires_after_the_ack_window() {
    let noon = 1000 * 60 * 60 * 12;
    let (ctx, _) = test_context(noon);
    let app = service!(ctx);

    let employee_id = ID::new();
    let created = create_schedule(&ctx, &app, &employee_id, noon - 1000, noon + 1000).await;

    let ticked = tick(&ctx, &app, &created.schedule.id).await;
    assert_eq!(ticked.status, "sent");
    let delivery_id = ticked.delivery_id.expect("a delivery id");

    let delivery = ctx.repos.deliveries.find(&delivery_id).await.unwrap();
    assert_eq!(delivery.sent_at, noon);
    assert_eq!(delivery.expires_at, Some(noon + ACK_WINDOW_MILLIS));

    // The employee sees it in their feed
    let req = test::TestRequest::get()
        .uri("/api/v1/delivery")
        .insert_header((EMPLOYEE_ID_HEADER, employee_id.as_string()))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert!(res.status().is_success());
    let feed: get_deliveries::APIResponse = test::read_body_json(res).await;
    assert_eq!(feed.deliveries.len(), 1);
    assert_eq!(feed.deliveries[0].id, delivery_id);
}

#[actix_web::test]
async fn acked_delivery_survives_the_sweep() {
    let noon = 1000 * 60 * 60 * 12;
    let (mut ctx, collaborators) = test_context(noon);
    let app = service!(ctx);

    let employee_id = ID::new();
    let created = create_schedule(&ctx, &app, &employee_id, noon - 1000, noon + 1000).await;
    let ticked = tick(&ctx, &app, &created.schedule.id).await;
    let delivery_id = ticked.delivery_id.unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/delivery/ack")
        .insert_header((EMPLOYEE_ID_HEADER, employee_id.as_string()))
        .set_json(ack_deliveries::RequestBody {
            delivery_ids: vec![delivery_id.clone()],
        })
        .to_request();
    let res = test::call_service(&app, req).await;
    assert!(res.status().is_success());
    let acked: ack_deliveries::APIResponse = test::read_body_json(res).await;
    assert_eq!(acked.matched, 1);
    assert_eq!(acked.modified, 1);

    // Well past the deadline now
    ctx.sys = Arc::new(StaticTimeSys(noon + ACK_WINDOW_MILLIS + 1));
    let app = service!(ctx);
    let swept = sweep(&ctx, &app).await;
    assert_eq!(swept.checked, 0);
    assert_eq!(swept.forced, 0);
    assert_eq!(collaborators.checkout.call_count(), 0);

    let delivery = ctx.repos.deliveries.find(&delivery_id).await.unwrap();
    assert_eq!(delivery.status, DeliveryStatus::Acked);
}

#[actix_web::test]
async fn unacked_delivery_is_expired_and_checkout_is_forced_once() {
    let noon = 1000 * 60 * 60 * 12;
    let (mut ctx, collaborators) = test_context(noon);
    let app = service!(ctx);

    let employee_id = ID::new();
    let created = create_schedule(&ctx, &app, &employee_id, noon - 1000, noon + 1000).await;
    let ticked = tick(&ctx, &app, &created.schedule.id).await;
    let delivery_id = ticked.delivery_id.unwrap();

    ctx.sys = Arc::new(StaticTimeSys(noon + ACK_WINDOW_MILLIS));
    let app = service!(ctx);

    let first = sweep(&ctx, &app).await;
    assert_eq!(first.checked, 1);
    assert_eq!(first.forced, 1);

    let delivery = ctx.repos.deliveries.find(&delivery_id).await.unwrap();
    assert_eq!(delivery.status, DeliveryStatus::Expired);
    assert!(delivery.forced_checkout_at.is_some());

    let calls = collaborators.checkout.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].employee_id, employee_id);
    assert_eq!(calls[0].reason, FORCED_CHECKOUT_REASON);
    drop(calls);

    // A second sweep has nothing left to do
    let second = sweep(&ctx, &app).await;
    assert_eq!(second.checked, 0);
    assert_eq!(second.forced, 0);
    assert_eq!(collaborators.checkout.calls_for(&delivery_id), 1);

    // And a late ack is a no-op
    let req = test::TestRequest::post()
        .uri("/api/v1/delivery/ack")
        .insert_header((EMPLOYEE_ID_HEADER, employee_id.as_string()))
        .set_json(ack_deliveries::RequestBody {
            delivery_ids: vec![delivery_id.clone()],
        })
        .to_request();
    let res = test::call_service(&app, req).await;
    let acked: ack_deliveries::APIResponse = test::read_body_json(res).await;
    assert_eq!(acked.matched, 1);
    assert_eq!(acked.modified, 0);
}

#[actix_web::test]
async fn employee_cannot_ack_another_employees_delivery() {
    let noon = 1000 * 60 * 60 * 12;
    let (ctx, _) = test_context(noon);
    let app = service!(ctx);

    let owner = ID::new();
    let created = create_schedule(&ctx, &app, &owner, noon - 1000, noon + 1000).await;
    let ticked = tick(&ctx, &app, &created.schedule.id).await;
    let delivery_id = ticked.delivery_id.unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/delivery/ack")
        .insert_header((EMPLOYEE_ID_HEADER, ID::new().as_string()))
        .set_json(ack_deliveries::RequestBody {
            delivery_ids: vec![delivery_id.clone()],
        })
        .to_request();
    let res = test::call_service(&app, req).await;
    assert!(res.status().is_success());
    let acked: ack_deliveries::APIResponse = test::read_body_json(res).await;
    assert_eq!(acked.matched, 0);
    assert_eq!(acked.modified, 0);

    let delivery = ctx.repos.deliveries.find(&delivery_id).await.unwrap();
    assert_eq!(delivery.status, DeliveryStatus::Sent);
}

#[actix_web::test]
async fn tick_past_the_stop_time_skips_and_deactivates() {
    let noon = 1000 * 60 * 60 * 12;
    let (mut ctx, _) = test_context(noon);
    let app = service!(ctx);

    let employee_id = ID::new();
    let created = create_schedule(&ctx, &app, &employee_id, noon - 1000, noon + 1000).await;

    ctx.sys = Arc::new(StaticTimeSys(noon + 2000));
    let app = service!(ctx);

    let ticked = tick(&ctx, &app, &created.schedule.id).await;
    assert_eq!(ticked.status, "skipped");
    assert!(ticked.delivery_id.is_none());

    let schedule = ctx
        .repos
        .schedules
        .find(&created.schedule.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!schedule.active);
    assert!(ctx
        .repos
        .deliveries
        .find_by_employee(&employee_id, 10)
        .await
        .is_empty());
}

#[actix_web::test]
async fn deleting_a_schedule_with_a_vanished_external_job_still_deactivates() {
    let noon = 1000 * 60 * 60 * 12;
    let (ctx, collaborators) = test_context(noon);
    let app = service!(ctx);

    let created = create_schedule(&ctx, &app, &ID::new(), noon - 1000, noon + 1000).await;
    collaborators.dispatcher.jobs.lock().unwrap().clear();

    let req = admin_req(
        &ctx,
        test::TestRequest::delete().uri(&format!("/api/v1/schedule/{}", created.schedule.id)),
    )
    .to_request();
    let res = test::call_service(&app, req).await;
    assert!(res.status().is_success());

    let schedule = ctx
        .repos
        .schedules
        .find(&created.schedule.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!schedule.active);
}
