use anyhow::Result;
use std::fmt;

mod library_argon2 {
    use anyhow::{anyhow, Result};
    use argon2::{
        password_hash::{
            rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        },
        Argon2,
    };

    pub fn hash(plain: &[u8]) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash_string = Argon2::default()
            .hash_password(plain, &salt)
            .map_err(|err| anyhow!("{}", err))?
            .to_string();
        Ok(hash_string)
    }

    pub fn verify(plain: &[u8], target_hash: &str) -> Result<bool> {
        let password_hash = PasswordHash::new(target_hash).map_err(|err| anyhow!("{}", err))?;
        Ok(Argon2::default()
            .verify_password(plain, &password_hash)
            .is_ok())
    }
}

/// A user password as it is kept in the store: an argon2 PHC string, salt
/// included. The only way to get one is to hash a plain password, so every
/// stored password can be verified.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredPassword(String);

impl StoredPassword {
    pub fn hash(plain: &str) -> Result<StoredPassword> {
        Ok(StoredPassword(library_argon2::hash(plain.as_bytes())?))
    }

    pub fn verify(&self, plain: &str) -> bool {
        // Cannot fail on a string produced by `hash`.
        library_argon2::verify(plain.as_bytes(), &self.0).unwrap_or(false)
    }
}

impl fmt::Debug for StoredPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StoredPassword(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash1 = StoredPassword::hash("123mypw").unwrap();
        let hash2 = StoredPassword::hash("123mypw").unwrap();

        // Fresh salt every time.
        assert_ne!(hash1, hash2);

        assert!(hash1.verify("123mypw"));
        assert!(hash2.verify("123mypw"));
        assert!(!hash1.verify("not the pw"));
        assert!(!hash1.verify(""));
    }

    #[test]
    fn debug_output_hides_the_hash() {
        let password = StoredPassword::hash("secret").unwrap();
        assert_eq!(format!("{:?}", password), "StoredPassword(..)");
    }
}
