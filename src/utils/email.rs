use std::sync::Mutex;

use campusdesk_config::EmailConfig;
use campusdesk_core::AppError;
use campusdesk_models::admin::WorkReport;
use lettre::message::{MultiPart, SinglePart, header};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, instrument, warn};

use crate::metrics::track_email_sent;

/// Pooled SMTP transport shared by every `Mailer`. Built on first send and
/// dropped by [`Mailer::shutdown`].
static TRANSPORT: Mutex<Option<SmtpTransport>> = Mutex::new(None);

#[derive(Clone, Debug)]
pub struct Mailer {
    config: EmailConfig,
}

impl Mailer {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    #[instrument(skip(self, report))]
    pub async fn send_work_report(&self, to_email: &str, report: &WorkReport) -> Result<(), AppError> {
        let text_body = work_report_text(report);
        let html_body = work_report_html(report);

        self.send(to_email, "CampusDesk Work Report", &text_body, &html_body)
            .await?;
        track_email_sent("work_report");
        Ok(())
    }

    #[instrument(skip(self, html_body, text_body))]
    pub async fn send(
        &self,
        to_email: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), AppError> {
        if !self.config.enabled {
            info!(to = %to_email, subject = %subject, "SMTP disabled, skipping email");
            return Ok(());
        }

        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| AppError::internal_error(format!("Invalid from email: {}", e)))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| AppError::bad_request(anyhow::anyhow!("Invalid email address: {}", e)))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::internal_error(format!("Failed to build email: {}", e)))?;

        let transport = self.transport()?;

        tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .map_err(|e| AppError::internal_error(format!("Task join error: {}", e)))?
            .map_err(|e| AppError::internal_error(format!("Failed to send email: {}", e)))?;

        Ok(())
    }

    fn transport(&self) -> Result<SmtpTransport, AppError> {
        let mut guard = TRANSPORT
            .lock()
            .map_err(|_| AppError::internal_error("SMTP transport lock poisoned"))?;

        if let Some(transport) = guard.as_ref() {
            return Ok(transport.clone());
        }

        let transport = if self.config.smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::relay(&self.config.smtp_host)
                .map_err(|e| {
                    AppError::internal_error(format!("Failed to create SMTP relay: {}", e))
                })?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        *guard = Some(transport.clone());
        Ok(transport)
    }

    /// Drops the pooled SMTP connections. Called once on server shutdown.
    pub fn shutdown() {
        match TRANSPORT.lock() {
            Ok(mut guard) => {
                if guard.take().is_some() {
                    info!("SMTP transport closed");
                }
            }
            Err(_) => warn!("SMTP transport lock poisoned during shutdown"),
        }
    }
}

fn work_report_text(report: &WorkReport) -> String {
    let counts = &report.counts;
    let mut body = format!(
        "CampusDesk work report ({})\n\n\
         Total classes: {}\n\
         Total students: {}\n\
         Total faculty: {}\n\
         Total authorities: {}\n\
         Classes without a teacher: {}\n\
         Classes without students: {}\n\n\
         Classes created in the last 7 days:\n",
        report.generated_at.format("%Y-%m-%d %H:%M UTC"),
        counts.total_classes,
        counts.total_students,
        counts.total_faculty,
        counts.total_authorities,
        counts.classes_without_teacher,
        counts.classes_without_students,
    );

    if report.recent_classes.is_empty() {
        body.push_str("  (none)\n");
    }
    for class in &report.recent_classes {
        body.push_str(&format!(
            "  - {} ({}), created {}\n",
            class.name,
            class.teacher_name.as_deref().unwrap_or("no teacher"),
            class.created_at.format("%Y-%m-%d"),
        ));
    }

    body
}

fn work_report_html(report: &WorkReport) -> String {
    let counts = &report.counts;
    let rows = [
        ("Total classes", counts.total_classes),
        ("Total students", counts.total_students),
        ("Total faculty", counts.total_faculty),
        ("Total authorities", counts.total_authorities),
        ("Classes without a teacher", counts.classes_without_teacher),
        ("Classes without students", counts.classes_without_students),
    ]
    .iter()
    .map(|(label, value)| {
        format!(
            r#"<tr><td style="padding: 8px; border-bottom: 1px solid #eee;">{}</td><td style="padding: 8px; border-bottom: 1px solid #eee; text-align: right;"><strong>{}</strong></td></tr>"#,
            label, value
        )
    })
    .collect::<String>();

    let recent = if report.recent_classes.is_empty() {
        "<li>None</li>".to_string()
    } else {
        report
            .recent_classes
            .iter()
            .map(|class| {
                format!(
                    "<li>{} ({}), created {}</li>",
                    escape_html(&class.name),
                    escape_html(class.teacher_name.as_deref().unwrap_or("no teacher")),
                    class.created_at.format("%Y-%m-%d")
                )
            })
            .collect::<String>()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>CampusDesk Work Report</title>
</head>
<body style="margin: 0; padding: 20px; font-family: Arial, sans-serif; background-color: #f4f4f4;">
    <table width="600" cellpadding="0" cellspacing="0" align="center" style="background-color: #ffffff; border-radius: 8px;">
        <tr>
            <td style="background-color: #0F766E; padding: 24px; text-align: center;">
                <h1 style="margin: 0; color: #ffffff; font-size: 24px;">CampusDesk Work Report</h1>
                <p style="margin: 8px 0 0; color: #d1fae5;">Generated {}</p>
            </td>
        </tr>
        <tr>
            <td style="padding: 24px;">
                <table width="100%" cellpadding="0" cellspacing="0">{}</table>
                <h3 style="color: #333333;">Classes created in the last 7 days</h3>
                <ul>{}</ul>
            </td>
        </tr>
    </table>
</body>
</html>"#,
        report.generated_at.format("%Y-%m-%d %H:%M UTC"),
        rows,
        recent
    )
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
