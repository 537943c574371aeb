use serde_json::{Value, json};

use crate::extract::Json;

pub(super) async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "MOA API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let Json(value) = health().await;
        assert_eq!(value["status"], "ok");
        assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
    }
}
