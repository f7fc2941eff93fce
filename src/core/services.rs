pub mod decision;
pub mod notification;
pub mod provisioning;
