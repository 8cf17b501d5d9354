//! URL slug derivation for profiles.

use uuid::Uuid;

/// Normalizes free text into a URL-friendly slug base: lowercased, the
/// domain part of an email stripped, spaces collapsed to `-`, `&` spelled
/// out, everything outside `[a-z0-9_-]` dropped.
pub fn slug_base(text: &str) -> String {
    let trimmed = text.trim().to_lowercase();
    // For emails, keep only the local part.
    let local = trimmed.split('@').next().unwrap_or("");

    let mut out = String::with_capacity(local.len());
    let mut prev_dash = false;
    for c in local.chars() {
        match c {
            'a'..='z' | '0'..='9' | '_' => {
                out.push(c);
                prev_dash = false;
            }
            ' ' | '-' => {
                if !prev_dash && !out.is_empty() {
                    out.push('-');
                    prev_dash = true;
                }
            }
            '&' => {
                if !prev_dash && !out.is_empty() {
                    out.push('-');
                }
                out.push_str("and-");
                prev_dash = true;
            }
            _ => {}
        }
    }
    out.trim_end_matches('-').to_string()
}

/// A full slug: normalized base plus a random uniqueness suffix.
pub fn slugify(text: &str) -> String {
    let base = slug_base(text);
    let suffix = Uuid::new_v4();
    if base.is_empty() {
        suffix.to_string()
    } else {
        format!("{}-{}", base, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_lowercases_and_dashes() {
        assert_eq!(slug_base("Green Earth Fund"), "green-earth-fund");
    }

    #[test]
    fn base_strips_email_domain() {
        assert_eq!(slug_base("Jane.Doe@example.org"), "janedoe");
    }

    #[test]
    fn base_spells_out_ampersand() {
        assert_eq!(slug_base("Food & Shelter"), "food-and-shelter");
    }

    #[test]
    fn base_collapses_runs() {
        assert_eq!(slug_base("a  --  b"), "a-b");
    }

    #[test]
    fn slugify_appends_unique_suffix() {
        let a = slugify("acme");
        let b = slugify("acme");
        assert!(a.starts_with("acme-"));
        assert_ne!(a, b);
    }
}
