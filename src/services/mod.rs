pub mod attempt_service;
pub mod dashboard_service;
pub mod exam_service;
pub mod generator_service;
pub mod profile_service;
