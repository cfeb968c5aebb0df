//! Statically declared secret-bearing fields.
//!
//! Entities that carry credentials list those fields explicitly through
//! [`SecretBearing::visit_secrets`]. Each field has a stable secret name used
//! as the key in the external secret vault. Secret fields are never written to
//! the JSON record (`#[serde(skip)]`).

/// Callback invoked once per secret-bearing field with the field's vault name
/// and a mutable handle on its value.
pub type SecretVisitor<'a> = dyn FnMut(&'static str, &mut Option<String>) + 'a;

/// An entity whose credentials live in an external secret vault.
pub trait SecretBearing {
    /// Identifier of the vault holding this entity's secrets.
    ///
    /// `None` means the entity has no vault configured; its secrets are
    /// neither saved nor loaded.
    fn vault_id(&self) -> Option<&str>;

    /// Visits every secret-bearing field present on the entity.
    ///
    /// Fields nested inside absent optional sections are not visited.
    fn visit_secrets(&mut self, visit: &mut SecretVisitor<'_>);

    /// Returns the `(secret name, value)` pairs currently set on the entity.
    fn collect_secrets(&mut self) -> Vec<(&'static str, Option<String>)> {
        let mut found = Vec::new();
        self.visit_secrets(&mut |name, value| found.push((name, value.clone())));
        found
    }

    /// Clears every secret-bearing field.
    fn clear_secrets(&mut self) {
        self.visit_secrets(&mut |_, value| *value = None);
    }
}
