#![forbid(unsafe_code)]

pub mod auth;
pub mod catalog_service;
pub mod controller;
pub mod course_services;
pub mod error;
pub mod identity;
pub mod progress_store;

pub use course_core::Clock;

pub use auth::{AuthProvider, LocalAuthProvider, RestAuthProvider, Session};
pub use catalog_service::CatalogService;
pub use controller::{
    ControllerConfig, CourseController, LessonEntry, ModuleOverview, OpenLesson, ViewerSnapshot,
};
pub use course_services::CourseServices;
pub use error::{AuthError, CatalogError, ControllerError, ProgressError};
pub use identity::IdentityResolver;
pub use progress_store::ProgressStore;
