pub mod github;
#[cfg(test)]
pub mod memory;
pub mod resend;
pub mod slack;
