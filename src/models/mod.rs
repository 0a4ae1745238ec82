pub mod attempt_summary;
pub mod exam;
pub mod identity;
pub mod profile;
pub mod question;
pub mod test_question;
pub mod user_test_question;
