pub mod play_dto;
pub mod quiz_dto;
