pub mod health_service;
pub mod regex_service;
pub mod share_service;
