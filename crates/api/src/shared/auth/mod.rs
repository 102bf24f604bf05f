use crate::error::NudgeError;
use actix_web::HttpRequest;
use nudge_domain::ID;
use nudge_infra::NudgeContext;

/// Credential identifying the office admin console
pub const ADMIN_API_KEY_HEADER: &str = "nudge-admin-api-key";
/// Acting admin user, injected by the admin console
pub const ADMIN_ID_HEADER: &str = "nudge-admin-id";
/// Authenticated employee, injected by the session gateway in front of this
/// service (session authentication itself is not this core's business)
pub const EMPLOYEE_ID_HEADER: &str = "nudge-employee-id";
/// Secret handed to the cron dispatcher at registration and echoed back on
/// every tick callback
pub const WEBHOOK_SECRET_HEADER: &str = "nudge-webhook-key";

/// The caller identity, resolved once at the boundary and passed explicitly
/// into every use case
#[derive(Debug, Clone)]
pub enum Actor {
    Admin(ID),
    Employee(ID),
}

impl Actor {
    pub fn id(&self) -> &ID {
        match self {
            Self::Admin(id) => id,
            Self::Employee(id) => id,
        }
    }

    /// The employee scope of this caller, `None` for admins who may act on
    /// any employee's rows
    pub fn employee_scope(&self) -> Option<&ID> {
        match self {
            Self::Admin(_) => None,
            Self::Employee(id) => Some(id),
        }
    }
}

fn header_value<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|value| value.to_str().ok())
}

pub fn protect_admin_route(req: &HttpRequest, ctx: &NudgeContext) -> Result<Actor, NudgeError> {
    match header_value(req, ADMIN_API_KEY_HEADER) {
        Some(api_key) if api_key == ctx.config.admin_api_key => {}
        Some(_) => return Err(NudgeError::Unauthorized("Invalid admin api key".into())),
        None => {
            return Err(NudgeError::Unauthorized(format!(
                "Missing the `{}` header",
                ADMIN_API_KEY_HEADER
            )))
        }
    };
    let admin_id = header_value(req, ADMIN_ID_HEADER).ok_or_else(|| {
        NudgeError::Unauthorized(format!("Missing the `{}` header", ADMIN_ID_HEADER))
    })?;
    admin_id
        .parse::<ID>()
        .map(Actor::Admin)
        .map_err(|e| NudgeError::Unauthorized(format!("{}", e)))
}

pub fn protect_employee_route(req: &HttpRequest) -> Result<Actor, NudgeError> {
    let employee_id = header_value(req, EMPLOYEE_ID_HEADER).ok_or_else(|| {
        NudgeError::Unauthorized(format!("Missing the `{}` header", EMPLOYEE_ID_HEADER))
    })?;
    employee_id
        .parse::<ID>()
        .map(Actor::Employee)
        .map_err(|e| NudgeError::Unauthorized(format!("{}", e)))
}

/// The tick endpoint is internet-reachable and triggers side effects, so
/// the dispatcher must prove itself with the secret it was handed at
/// registration time.
pub fn protect_tick_route(req: &HttpRequest, ctx: &NudgeContext) -> Result<(), NudgeError> {
    match header_value(req, WEBHOOK_SECRET_HEADER) {
        Some(secret) if secret == ctx.config.webhook_secret => Ok(()),
        Some(_) => Err(NudgeError::Unauthorized(
            "Invalid webhook secret".into(),
        )),
        None => Err(NudgeError::Unauthorized(format!(
            "Missing the `{}` header",
            WEBHOOK_SECRET_HEADER
        ))),
    }
}
