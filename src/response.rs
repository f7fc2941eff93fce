use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    success: bool,
    message: String,
    upgraded_role: bool,
}

impl DecisionResponse {
    pub fn processed(upgraded_role: bool) -> Self {
        DecisionResponse {
            success: true,
            message: "Application decision processed successfully".into(),
            upgraded_role,
        }
    }
}
