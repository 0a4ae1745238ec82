pub mod avatar;
pub mod shuffle;
