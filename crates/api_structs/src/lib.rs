mod delivery;
mod schedule;
mod status;
mod subscription;

pub mod dtos {
    pub use crate::delivery::dtos::*;
    pub use crate::schedule::dtos::*;
    pub use crate::subscription::dtos::*;
}

pub use crate::delivery::api::*;
pub use crate::schedule::api::*;
pub use crate::status::api::*;
pub use crate::subscription::api::*;
