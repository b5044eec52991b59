use crate::{CoreError, ProductId};

/// Produces the SEO slug stored on an indexed product.
pub trait SlugGenerator: Send + Sync {
    /// Generate a slug for `text`, disambiguated by the product id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Slug`] if no slug can be derived from `text`.
    fn generate(&self, text: &str, id: ProductId) -> Result<String, CoreError>;
}

/// Slugifies the text and appends `-{id}` so that products sharing a name
/// still get distinct slugs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSlugGenerator;

impl SlugGenerator for DefaultSlugGenerator {
    fn generate(&self, text: &str, id: ProductId) -> Result<String, CoreError> {
        let base = slugify(text);
        if base.is_empty() {
            return Err(CoreError::Slug {
                product_id: id,
                reason: format!("{text:?} has no URL-safe characters"),
            });
        }
        Ok(format!("{base}-{id}"))
    }
}

/// Lowercase, transliterate common Latin accents, and collapse every run of
/// other characters into a single `-`.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        match transliterate(c) {
            Some(ascii) => folded.push_str(ascii),
            None if c.is_ascii_alphanumeric() => folded.push(c),
            None => folded.push('-'),
        }
    }

    folded
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn transliterate(c: char) -> Option<&'static str> {
    let ascii = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ą' => "a",
        'æ' => "ae",
        'ç' | 'ć' | 'č' => "c",
        'ď' => "d",
        'è' | 'é' | 'ê' | 'ë' | 'ę' | 'ě' => "e",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'ł' => "l",
        'ñ' | 'ń' | 'ň' => "n",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'œ' => "oe",
        'ř' => "r",
        'ß' => "ss",
        'ś' | 'š' => "s",
        'ť' => "t",
        'ù' | 'ú' | 'û' | 'ü' | 'ů' => "u",
        'ý' | 'ÿ' => "y",
        'ź' | 'ż' | 'ž' => "z",
        _ => return None,
    };
    Some(ascii)
}

#[cfg(test)]
#[path = "slug_test.rs"]
mod tests;
