pub mod share;
pub mod share_id;
