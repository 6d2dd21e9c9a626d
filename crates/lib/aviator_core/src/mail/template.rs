//! Minimal `{{key}}` placeholder rendering for email bodies.

/// HTML body for one-time-code emails. Placeholder: `{{otp}}`.
pub const OTP_TEMPLATE: &str = include_str!("../../templates/otp.html");

/// Replace every `{{key}}` occurrence with its value. Unknown placeholders are
/// left untouched.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |html, (key, value)| {
            html.replace(&format!("{{{{{key}}}}}"), value)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_every_occurrence() {
        let out = render("{{otp}} and {{otp}}", &[("otp", "4821")]);
        assert_eq!(out, "4821 and 4821");
    }

    #[test]
    fn leaves_unknown_placeholders() {
        let out = render("{{otp}} {{name}}", &[("otp", "1234")]);
        assert_eq!(out, "1234 {{name}}");
    }

    #[test]
    fn otp_template_has_placeholder() {
        assert!(OTP_TEMPLATE.contains("{{otp}}"));
        assert!(!render(OTP_TEMPLATE, &[("otp", "0000")]).contains("{{otp}}"));
    }
}
