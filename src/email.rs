use std::fs;
use std::path::Path;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::{Message, SmtpTransport, Transport};

use crate::config::{InvoiceConfig, MailConfig};
use crate::error::RunError;

/// First line of the `from` field, which templates write with `<br />`
/// separators.
fn sender_name(from: &str) -> &str {
    from.split("<br />").next().unwrap_or(from).trim()
}

fn subject(config: &InvoiceConfig) -> String {
    format!("Invoice {} from {}", config.number(), sender_name(&config.from))
}

fn body(config: &InvoiceConfig) -> String {
    format!(
        "Follows attached the Invoice {} for the PO {} from {}.",
        config.number(),
        config.po,
        sender_name(&config.from)
    )
}

/// Email the generated PDF when a recipient and the full SMTP credential set
/// are configured. Returns whether a delivery was attempted; an incomplete
/// mail configuration is a silent skip, not an error.
pub fn send_invoice(config: &InvoiceConfig, pdf_path: &Path) -> Result<bool, RunError> {
    let Some(mail) = &config.mail else {
        return Ok(false);
    };

    let filename = pdf_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("invoice.pdf")
        .to_string();
    let pdf = fs::read(pdf_path)?;
    let attachment = Attachment::new(filename).body(
        pdf,
        ContentType::parse("application/pdf").expect("static content type"),
    );

    let from = Mailbox::new(Some(sender_name(&config.from).to_string()), mail.user.parse()?);
    let message = Message::builder()
        .from(from)
        .to(mail.send_to.parse()?)
        .subject(subject(config))
        .multipart(
            MultiPart::mixed()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(body(config)),
                )
                .singlepart(attachment),
        )?;

    transport(mail)?.send(&message)?;
    Ok(true)
}

fn transport(mail: &MailConfig) -> Result<SmtpTransport, RunError> {
    Ok(SmtpTransport::starttls_relay(&mail.address)?
        .port(mail.port)
        .credentials(Credentials::new(mail.user.clone(), mail.password.clone()))
        .authentication(vec![Mechanism::Plain])
        .build())
}
