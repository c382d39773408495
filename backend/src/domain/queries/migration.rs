//! Rewrite legacy plaintext passwords as Argon2id hashes.
//!
//! Values that are already hashes, Argon2 or bcrypt, are never touched:
//! hashing a hash would lock its owner out.

use serde_json::{Value, json};
use tracing::{info, warn};

use super::{DashboardQueries, failed};
use crate::domain::ports::{Collection, CollectionAccessor, Document, Filter, ID_FIELD};
use crate::domain::{Error, hash_password, is_password_hash};

/// Counts produced by [`DashboardQueries::migrate_password_hashes`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HashMigrationReport {
    /// User documents read.
    pub scanned: u64,
    /// Documents whose password was already a PHC or bcrypt hash.
    pub already_hashed: u64,
    /// Documents rewritten, or that would be rewritten in a dry run.
    pub migrated: u64,
    /// Documents without a usable id or password string.
    pub skipped: u64,
}

enum Verdict<'a> {
    Hashed,
    Plaintext { id: &'a str, password: &'a str },
    Unusable,
}

fn classify(document: &Document) -> Verdict<'_> {
    let id = document.get(ID_FIELD).and_then(Value::as_str);
    let password = document.get("password").and_then(Value::as_str);
    match (id, password) {
        (_, Some(stored)) if is_password_hash(stored) => Verdict::Hashed,
        (Some(id), Some(password)) if !id.trim().is_empty() => Verdict::Plaintext { id, password },
        _ => Verdict::Unusable,
    }
}

impl<A: CollectionAccessor + ?Sized> DashboardQueries<A> {
    /// Hash every stored password that is not already a hash.
    ///
    /// With `dry_run` nothing is written; the report still counts the
    /// documents that would change.
    pub async fn migrate_password_hashes(&self, dry_run: bool) -> Result<HashMigrationReport, Error> {
        let operation = "migrate password hashes";
        let documents = self
            .accessor
            .find_many(Collection::Users, &Filter::all())
            .await
            .map_err(failed(operation))?;

        let mut report = HashMigrationReport::default();
        for document in &documents {
            report.scanned += 1;
            let (id, password) = match classify(document) {
                Verdict::Hashed => {
                    report.already_hashed += 1;
                    continue;
                }
                Verdict::Unusable => {
                    warn!("user document without id or password string skipped");
                    report.skipped += 1;
                    continue;
                }
                Verdict::Plaintext { id, password } => (id, password),
            };

            report.migrated += 1;
            if dry_run {
                info!(user_id = id, "would hash stored password");
                continue;
            }
            let hash = hash_password(password).map_err(|err| {
                warn!(user_id = id, error = %err, "password hashing failed");
                Error::internal("Failed to migrate password hashes.")
            })?;
            let mut patch = Document::new();
            patch.insert("password".to_owned(), json!(hash.as_str()));
            self.accessor
                .update_one(Collection::Users, &Filter::by_id(id), patch)
                .await
                .map_err(failed(operation))?;
            info!(user_id = id, "stored password hashed");
        }
        Ok(report)
    }
}
