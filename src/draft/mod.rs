//! Email drafting
//!
//! Turns recognized text (a flyer, a job post, a business card) into a short
//! outreach email addressed to one of the addresses found in it. The body and
//! subject come from two chat completions: the body first, then a subject
//! written for that body.
//!
//! Nothing is sent from here; the caller gets the draft back.

mod client;

pub use client::{ChatClient, ChatError, OpenAiChat};

#[cfg(test)]
pub use client::mock;

use serde::Serialize;

/// Subject used when the model returns nothing usable
pub const FALLBACK_SUBJECT: &str = "A personalized message for you";

/// Who the email is written on behalf of
#[derive(Debug, Clone, Default)]
pub struct SenderProfile {
    pub name: Option<String>,
    /// Free-form lines about the sender (role, experience, portfolio links)
    pub about: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailDraft {
    pub subject: String,
    pub body: String,
}

/// Draft an email to `recipient` based on `text`
pub async fn draft_email(
    chat: &dyn ChatClient,
    sender: &SenderProfile,
    recipient: &str,
    text: &str,
) -> Result<EmailDraft, ChatError> {
    let body = chat.complete(&body_prompt(sender, recipient, text)).await?;
    let body = body.trim().to_string();

    let subject = chat.complete(&subject_prompt(&body)).await?;
    let subject = subject.trim().trim_matches('"').trim();
    let subject = if subject.is_empty() {
        match &sender.name {
            Some(name) => format!("Message from {}", name),
            None => FALLBACK_SUBJECT.to_string(),
        }
    } else {
        subject.to_string()
    };

    Ok(EmailDraft { subject, body })
}

fn body_prompt(sender: &SenderProfile, recipient: &str, text: &str) -> String {
    let mut prompt = format!(
        "Write a professional, personalized and concise email to {} based on the following text:\n\"{}\"\n",
        recipient, text
    );

    if sender.name.is_some() || sender.about.is_some() {
        prompt.push_str("\nAbout the sender:\n");
        if let Some(name) = &sender.name {
            prompt.push_str(&format!("- Name: {}\n", name));
        }
        if let Some(about) = &sender.about {
            for line in about.lines().map(str::trim).filter(|l| !l.is_empty()) {
                prompt.push_str(&format!("- {}\n", line));
            }
        }
    }

    prompt.push_str(
        "\nInstructions:\n\
         - Keep the email short.\n\
         - Do not add a subject line.\n\
         - Only mention the sender's skills and links that relate to the text.\n\
         - End warmly with regards and the sender's name and contact details.\n",
    );
    prompt
}

fn subject_prompt(body: &str) -> String {
    format!(
        "Write a short, professional subject line for this email:\n\"{}\"\nKeep it under 60 characters. Reply with the subject line only.",
        body
    )
}
