/**
 * Password Hashing
 *
 * bcrypt with a configurable cost. Every hash carries its own random salt.
 */

/// One-way salted password hasher
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash a plaintext password
    ///
    /// # Errors
    /// Returns an error only if bcrypt rejects the cost or fails internally
    pub fn hash(&self, plaintext: &str) -> Result<String, bcrypt::BcryptError> {
        bcrypt::hash(plaintext, self.cost)
    }

    /// Check a plaintext password against a stored hash
    ///
    /// A malformed hash verifies as `false`.
    pub fn verify(&self, plaintext: &str, hash: &str) -> bool {
        match bcrypt::verify(plaintext, hash) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!("Password verification failed on stored hash: {}", e);
                false
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}
