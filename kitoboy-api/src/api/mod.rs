//! HTTP API handlers for kitoboy-api

pub mod attributes;
pub mod auth;
pub mod avatars;
pub mod dynamics;
pub mod health;
pub mod persons;
pub mod statuses;

pub use attributes::{add_attribute, add_posts_attributes, get_attributes, remove_attribute};
pub use auth::{auth_middleware, login, register, AuthUser};
pub use avatars::{create_avatar, get_avatar, get_avatars, update_avatar_status};
pub use dynamics::get_avatar_dynamics;
pub use health::health_routes;
pub use persons::{get_person_with_avatars, search_person, update_person, update_person_status};
pub use statuses::get_statuses;
