pub mod attempt_dto;
pub mod dashboard_dto;
pub mod profile_dto;
pub mod test_dto;
