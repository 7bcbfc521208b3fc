pub mod answer;
pub mod article;
pub mod question;
pub mod quiz;
pub mod user;
