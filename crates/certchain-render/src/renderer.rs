//! Placeholder resolution and markup substitution.

use std::collections::BTreeMap;

use thiserror::Error;

use certchain_model::{Certificate, DocumentBody, Template};

/// Errors from template rendering.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A placeholder required by the template has no resolvable value in
    /// the certificate data.
    #[error("missing placeholder: \"{name}\" has no resolvable value")]
    MissingPlaceholder {
        /// The unresolvable placeholder name.
        name: String,
    },

    /// The markup contains a `{{` without a matching `}}`.
    #[error("unclosed placeholder at byte offset {offset}")]
    UnclosedPlaceholder {
        /// Byte offset of the opening delimiter.
        offset: usize,
    },
}

/// Build the binding table for a certificate.
///
/// Keys are the placeholder names templates may reference. Optional fields
/// (`expiryDate`, `grade`, `courseName`, `imageUrl`) are only present when
/// the certificate carries them, so a template that requires them fails with
/// [`RenderError::MissingPlaceholder`] for certificates that do not.
pub fn binding_table(certificate: &Certificate) -> BTreeMap<String, String> {
    let mut bindings = BTreeMap::new();
    let mut bind = |name: &str, value: String| {
        bindings.insert(name.to_string(), value);
    };

    bind("title", certificate.title.clone());
    bind("description", certificate.description.clone());
    bind("issuerName", certificate.issuer_name.clone());
    bind("recipientName", certificate.recipient_name.clone());
    bind("recipientEmail", certificate.recipient_email.clone());
    bind("serialNumber", certificate.serial_number.as_str().to_string());
    bind("issueDate", certificate.issue_date.to_canonical_string());
    if let Some(expiry) = certificate.expiry_date {
        bind("expiryDate", expiry.to_canonical_string());
    }
    if let Some(grade) = &certificate.metadata.grade {
        bind("grade", grade.clone());
    }
    if let Some(course) = &certificate.metadata.course_name {
        bind("courseName", course.clone());
    }
    if let Some(image) = &certificate.image_url {
        bind("imageUrl", image.clone());
    }
    bindings
}

/// Render a certificate against a template.
///
/// Checks the template's declared placeholder list first (a declared name
/// that cannot resolve fails even if the markup never references it — the
/// declaration is the template author's contract), then substitutes every
/// `{{name}}` token in the markup.
pub fn render(certificate: &Certificate, template: &Template) -> Result<DocumentBody, RenderError> {
    let bindings = binding_table(certificate);

    for name in &template.placeholders {
        if !bindings.contains_key(name) {
            return Err(RenderError::MissingPlaceholder { name: name.clone() });
        }
    }

    let content = substitute(&template.markup, &bindings)?;
    Ok(DocumentBody {
        content,
        styles: template.styles.clone(),
    })
}

/// Substitute `{{name}}` tokens. Case-sensitive exact-name lookup; no
/// trimming inside the delimiters.
fn substitute(
    markup: &str,
    bindings: &BTreeMap<String, String>,
) -> Result<String, RenderError> {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;
    let mut offset = 0;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];
        let close = after_open
            .find("}}")
            .ok_or(RenderError::UnclosedPlaceholder {
                offset: offset + open,
            })?;
        let name = &after_open[..close];
        let value = bindings
            .get(name)
            .ok_or_else(|| RenderError::MissingPlaceholder {
                name: name.to_string(),
            })?;
        out.push_str(value);
        offset += open + 2 + close + 2;
        rest = &after_open[close + 2..];
    }
    out.push_str(rest);
    Ok(out)
}
