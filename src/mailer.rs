use async_trait::async_trait;
use tracing::info;
use crate::db::mongo::generate_id;
use crate::utils::errors::AuthError;

///
/// A templated outbound email. The context carries template variables - for a
/// password-reset mail that includes the reset link, so neither the request nor
/// the context must ever be logged wholesale.
///
#[derive(Clone, Debug)]
pub struct MailRequest {
    pub to: String,
    pub subject: String,
    pub template: String,
    pub context: Vec<(String, String)>,
}

///
/// Outbound mail delivery. Returns a provider message id on success.
///
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, request: MailRequest) -> Result<String, AuthError>;
}

///
/// A delivery-less mailer that records the send in the logs - used when no mail
/// provider is configured. Logs the template and subject only, never the recipient
/// or the rendered context.
///
pub struct TracingMailer;

#[async_trait]
impl Mailer for TracingMailer {
    async fn send(&self, request: MailRequest) -> Result<String, AuthError> {
        let message_id = generate_id();

        info!("Mail dispatched: template {} subject '{}' message_id {}",
            request.template,
            request.subject,
            message_id);

        Ok(message_id)
    }
}
