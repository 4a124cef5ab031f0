// Password hashing

use formguard_core::Error;
use serde::{Deserialize, Serialize};

/// Hashing settings (`[hashing]` section)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingSettings {
    /// bcrypt work factor, 4 through 31
    pub bcrypt_cost: u32,
}

impl Default for HashingSettings {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl formguard_config::Validate for HashingSettings {
    fn validate(&self) -> formguard_config::Result<()> {
        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(formguard_config::ConfigError::InvalidValue {
                key: "hashing.bcrypt_cost".to_string(),
                reason: format!("must be between 4 and 31, got {}", self.bcrypt_cost),
            });
        }
        Ok(())
    }
}

/// bcrypt password hasher
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(settings: HashingSettings) -> Self {
        Self {
            cost: settings.bcrypt_cost,
        }
    }

    /// Hash a password
    pub fn hash(&self, password: &str) -> Result<String, Error> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| Error::Internal(format!("password hashing failed: {}", e)))
    }

    /// Verify a password against a stored hash
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, Error> {
        bcrypt::verify(password, hash)
            .map_err(|e| Error::Internal(format!("password verification failed: {}", e)))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(HashingSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formguard_config::Validate;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(HashingSettings { bcrypt_cost: 4 })
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash("#rahasia123").unwrap();

        assert!(hash.starts_with("$2"));
        assert_ne!(hash, "#rahasia123");
        assert!(hasher.verify("#rahasia123", &hash).unwrap());
        assert!(!hasher.verify("rahasia123", &hash).unwrap());
    }

    #[test]
    fn test_cost_bounds() {
        assert!(HashingSettings { bcrypt_cost: 4 }.validate().is_ok());
        assert!(HashingSettings { bcrypt_cost: 3 }.validate().is_err());
        assert!(HashingSettings { bcrypt_cost: 32 }.validate().is_err());
    }
}
