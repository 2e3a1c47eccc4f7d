use askama::Template;

#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetHtml<'a> {
    greeting_name: &'a str,
    site_name: &'a str,
    reset_url: &'a str,
    valid_minutes: i64,
    year: i32,
}

#[derive(Template)]
#[template(path = "email/contact.html")]
struct ContactHtml<'a> {
    name: &'a str,
    email: &'a str,
    lines: Vec<&'a str>,
    site_name: &'a str,
    year: i32,
}

pub struct RenderedEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

pub fn render_password_reset(
    name: &str,
    site_name: &str,
    reset_url: &str,
    valid_minutes: i64,
    year: i32,
) -> Result<RenderedEmail, String> {
    let text_name = if name.trim().is_empty() { "User" } else { name };
    let html_name = if name.trim().is_empty() { "there" } else { name };

    let text = format!(
        "Hello {text_name},\n\n\
         You requested a password reset for your {site_name} account.\n\n\
         Reset your password here: {reset_url}\n\n\
         This link expires in {valid_minutes} minutes. If you didn't request this, just ignore this email.\n\n\
         \u{a9} {year} {site_name}"
    );

    let html = PasswordResetHtml {
        greeting_name: html_name,
        site_name,
        reset_url,
        valid_minutes,
        year,
    }
    .render()
    .map_err(|e| format!("Failed to render reset email: {e}"))?;

    Ok(RenderedEmail {
        subject: format!("Reset Your Password - {site_name}"),
        text,
        html,
    })
}

pub fn render_contact(
    name: &str,
    email: &str,
    message: &str,
    site_name: &str,
    year: i32,
) -> Result<RenderedEmail, String> {
    let text = format!(
        "You have a new contact form submission:\n\nName: {name}\nEmail: {email}\nMessage:\n{message}"
    );

    let html = ContactHtml {
        name,
        email,
        lines: message.lines().collect(),
        site_name,
        year,
    }
    .render()
    .map_err(|e| format!("Failed to render contact email: {e}"))?;

    Ok(RenderedEmail {
        subject: format!("New Contact Message from {name}"),
        text,
        html,
    })
}
