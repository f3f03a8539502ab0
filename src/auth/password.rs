use crate::core::error::Error;

/// bcrypt ignores everything past this many bytes of input.
pub(crate) const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Clone, Copy, Debug)]
pub(crate) struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub(crate) fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub(crate) fn cost(&self) -> u32 {
        self.cost
    }

    pub(crate) fn check(password: &str) -> Result<(), Error> {
        if password.is_empty() {
            return Err(Error::InvalidPassword("Password must not be empty".into()));
        }

        if password.len() > MAX_PASSWORD_BYTES {
            return Err(Error::InvalidPassword(format!(
                "Password must be at most {MAX_PASSWORD_BYTES} bytes"
            )));
        }

        Ok(())
    }

    pub(crate) async fn hash(&self, password: &str) -> Result<String, Error> {
        Self::check(password)?;

        let password = password.to_owned();
        let cost = self.cost;

        Ok(tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??)
    }

    pub(crate) async fn verify(&self, password: &str, hash: &str) -> Result<bool, Error> {
        let password = password.to_owned();
        let hash = hash.to_owned();

        Ok(tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??)
    }
}
