use once_cell::sync::Lazy;
use tracing::error;

/// Hash verified when the email is unknown so both login paths cost one bcrypt run
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| {
    bcrypt::hash("timing-equalizer", bcrypt::DEFAULT_COST)
        .map_err(|e| error!("Failed to prepare dummy bcrypt hash: {}", e))
        .ok()
});

/// Verify a password against a stored bcrypt hash ($2a/$2b/$2y) on the blocking pool
pub async fn verify(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}

/// Burn one bcrypt verification; result is always discarded
pub async fn verify_dummy(password: String) {
    let _ = tokio::task::spawn_blocking(move || {
        if let Some(hash) = DUMMY_HASH.as_deref() {
            let _ = bcrypt::verify(password, hash);
        }
    })
    .await;
}

/// Hash a new password (used by seeding and tests)
pub fn hash(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn verifies_matching_password() {
        let hashed = bcrypt::hash("s3cret", 4).unwrap();
        assert!(verify("s3cret".to_string(), hashed.clone()).await);
        assert!(!verify("wrong".to_string(), hashed).await);
    }

    #[tokio::test]
    async fn accepts_php_style_prefix() {
        let hashed = bcrypt::hash("s3cret", 4).unwrap().replacen("$2b$", "$2y$", 1);
        assert!(verify("s3cret".to_string(), hashed).await);
    }

    #[tokio::test]
    async fn malformed_hash_never_verifies() {
        assert!(!verify("anything".to_string(), "not-a-hash".to_string()).await);
        verify_dummy("anything".to_string()).await;
    }
}
