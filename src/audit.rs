use crate::model::hashing;

///
/// The level an audit event is emitted at.
///
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AuditLevel {
    Info,
    Warn,
    Error,
}

///
/// Append-only, structured security event logging.
///
/// Events are emitted synchronously through tracing under the 'audit' target so they
/// can be routed separately from application logs. Any `email` metadata field is
/// irreversibly transformed before emission - the raw address never reaches a log
/// line. Callers must never pass passwords, token secrets or token hashes as metadata.
///
#[derive(Clone, Default)]
pub struct AuditLog;

impl AuditLog {
    ///
    /// Emit an audit event with ordered key/value metadata.
    ///
    pub fn log(&self, event: &str, metadata: Vec<(&str, String)>, level: AuditLevel) {
        let line = self.render(event, metadata);

        match level {
            AuditLevel::Info  => tracing::info!(target: "audit", "{}", line),
            AuditLevel::Warn  => tracing::warn!(target: "audit", "{}", line),
            AuditLevel::Error => tracing::error!(target: "audit", "{}", line),
        }
    }

    ///
    /// Build the log line for an event: 'EVENT | key: value | key: value'.
    ///
    /// An `email` field becomes `email_hash` (first 8 hex chars of a one-way hash,
    /// deterministic so events for the same address correlate) plus `email_domain`.
    ///
    pub fn render(&self, event: &str, metadata: Vec<(&str, String)>) -> String {
        let mut processed: Vec<(String, String)> = Vec::with_capacity(metadata.len() + 1);

        for (key, value) in metadata {
            match key {
                "email" => {
                    let domain = value.split('@').nth(1).unwrap_or("unknown").to_string();
                    processed.push((String::from("email_hash"), hash_sensitive(&value)));
                    processed.push((String::from("email_domain"), domain));
                },
                _ => processed.push((key.to_string(), value)),
            }
        }

        if processed.is_empty() {
            return event.to_string()
        }

        let rendered: Vec<String> = processed.iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect();

        format!("{} | {}", event, rendered.join(" | "))
    }
}

///
/// First 8 hex chars of a one-way hash - correlatable without being reversible.
///
fn hash_sensitive(data: &str) -> String {
    hashing::sha256_hex(data)[..8].to_string()
}
